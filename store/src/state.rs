//! Chat panel state: the newest-first message list and its paging cursor.
//!
//! DESIGN
//! ======
//! Three producers write into one list: the initial page, older pages, and
//! live inserts (including the confirmation of our own sends). Every path
//! goes through an id check, so a row delivered twice is kept once, and
//! every path preserves newest-first order.
//!
//! The state is plain data with no I/O. [`crate::ChatController`] performs
//! the store calls and applies their results here.

#[cfg(test)]
#[path = "state_test.rs"]
mod state_test;

use time::OffsetDateTime;

use crate::error::{StoreError, ValidationError};
use crate::model::{Message, NewMessage};

/// Boundary for the next backward page.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Cursor {
    /// Nothing fetched yet.
    #[default]
    Unloaded,
    /// Older messages may exist before this timestamp.
    Before(OffsetDateTime),
    /// No older messages remain.
    Exhausted,
}

/// State for the floating chat panel.
#[derive(Clone, Debug, Default)]
pub struct ChatState {
    pub open: bool,
    /// Composer author field; blank means the default name.
    pub author: String,
    /// Composer content field.
    pub draft: String,
    /// Text of the last failed send, for the blocking notification.
    pub send_error: Option<String>,
    /// Bumped whenever the view should scroll to the newest message.
    pub scroll_to_newest_seq: u64,
    messages: Vec<Message>,
    cursor: Cursor,
    loading_older: bool,
    initialized: bool,
}

impl ChatState {
    /// Messages, newest first.
    #[must_use]
    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    #[must_use]
    pub fn cursor(&self) -> Cursor {
        self.cursor
    }

    #[must_use]
    pub fn is_loading_older(&self) -> bool {
        self.loading_older
    }

    #[must_use]
    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    /// Whether the "load older" control should be shown.
    #[must_use]
    pub fn has_older(&self) -> bool {
        matches!(self.cursor, Cursor::Before(_))
    }

    /// Whether a "load older" trigger would start a fetch.
    #[must_use]
    pub fn can_load_older(&self) -> bool {
        self.has_older() && !self.loading_older
    }

    pub fn toggle_open(&mut self) -> bool {
        self.open = !self.open;
        self.open
    }

    /// Claim the one-time initialization. Returns `false` if already claimed.
    pub fn mark_initialized(&mut self) -> bool {
        !std::mem::replace(&mut self.initialized, true)
    }

    /// Replace the list with the newest page.
    ///
    /// Live rows that arrived while the page was in flight are kept when they
    /// are not older than the page's newest row and not part of it.
    /// Timestamps may tie, so a row sharing the newest timestamp survives.
    pub fn apply_latest_page(&mut self, mut page: Vec<Message>) {
        sort_newest_first(&mut page);
        let newest_in_page = page.first().map(|m| m.created_at);
        let mut merged: Vec<Message> = std::mem::take(&mut self.messages)
            .into_iter()
            .filter(|m| newest_in_page.is_none_or(|newest| m.created_at >= newest))
            .filter(|m| !page.iter().any(|p| p.id == m.id))
            .collect();

        self.cursor = page
            .last()
            .map_or(Cursor::Exhausted, |oldest| Cursor::Before(oldest.created_at));
        for msg in page {
            if !merged.iter().any(|m| m.id == msg.id) {
                merged.push(msg);
            }
        }
        self.messages = merged;
    }

    /// The newest page could not be fetched: keep live rows, stop paging.
    pub fn fail_latest_page(&mut self) {
        self.cursor = Cursor::Exhausted;
    }

    /// Start a backward page fetch.
    ///
    /// Returns the cursor timestamp to fetch before, or `None` when a fetch
    /// is already in flight or no older messages can exist.
    pub fn begin_load_older(&mut self) -> Option<OffsetDateTime> {
        if self.loading_older {
            return None;
        }
        let Cursor::Before(before) = self.cursor else {
            return None;
        };
        self.loading_older = true;
        Some(before)
    }

    /// Apply the result of a backward fetch started at `before`.
    ///
    /// Always clears the in-flight flag. A page for a cursor that has since
    /// moved is discarded. Returns the number of rows appended.
    pub fn finish_load_older(
        &mut self,
        before: OffsetDateTime,
        result: Result<Vec<Message>, StoreError>,
        page_size: usize,
    ) -> Result<usize, StoreError> {
        self.loading_older = false;
        let mut page = result?;
        if self.cursor != Cursor::Before(before) {
            return Ok(0);
        }

        sort_newest_first(&mut page);
        let full_page = page.len() >= page_size;
        let page_oldest = page.last().map(|m| m.created_at);

        let mut appended = 0;
        for msg in page {
            if msg.created_at < before && !self.contains(&msg) {
                self.messages.push(msg);
                appended += 1;
            }
        }

        self.cursor = match page_oldest {
            Some(oldest) if full_page => Cursor::Before(oldest),
            _ => Cursor::Exhausted,
        };
        Ok(appended)
    }

    /// Merge a row pushed by the live channel.
    ///
    /// The row lands ahead of every message that is not newer than it, which
    /// for store-ordered inserts is the head of the list. Returns `false` if
    /// the row is already present.
    pub fn receive_live(&mut self, msg: Message) -> bool {
        if self.contains(&msg) {
            return false;
        }
        let at = self
            .messages
            .iter()
            .position(|m| m.created_at <= msg.created_at)
            .unwrap_or(self.messages.len());
        self.messages.insert(at, msg);
        true
    }

    /// Validate the composer into an insert payload.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::EmptyContent`] for a blank draft.
    pub fn outgoing(&self, default_name: &str) -> Result<NewMessage, ValidationError> {
        NewMessage::from_draft(&self.author, &self.draft, default_name)
    }

    /// Record a confirmed send: clear the draft, scroll, merge the row.
    pub fn record_sent(&mut self, msg: Message) {
        self.draft.clear();
        self.send_error = None;
        self.scroll_to_newest_seq += 1;
        self.receive_live(msg);
    }

    /// Record a rejected send. The draft is left untouched.
    pub fn record_send_failure(&mut self, err: &StoreError) {
        self.send_error = Some(format!("Failed to send message: {err}"));
    }

    pub fn dismiss_send_error(&mut self) {
        self.send_error = None;
    }

    fn contains(&self, msg: &Message) -> bool {
        self.messages.iter().any(|m| m.id == msg.id)
    }
}

fn sort_newest_first(page: &mut [Message]) {
    page.sort_by(|a, b| b.created_at.cmp(&a.created_at));
}
