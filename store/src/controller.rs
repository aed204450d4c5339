//! Chat panel controller: drives store calls and applies them to state.
//!
//! SYSTEM CONTEXT
//! ==============
//! The controller owns a dependency-injected [`MessageStore`] and a handle
//! to the [`ChatState`] it mutates. The widget hands it a reactive signal,
//! the CLI and tests a plain `Rc<RefCell<_>>`; both go through
//! [`ChatStateCell`].
//!
//! CONCURRENCY
//! ===========
//! Operations are `async` on a single thread. The live-insert callback and
//! the paging flow interleave freely; `ChatState` keeps the list ordered and
//! de-duplicated, and its in-flight flag allows one backward fetch at a time.
//! No timeouts: a stalled fetch keeps the flag set.
//!
//! ERROR HANDLING
//! ==============
//! Fetch failures are logged and degrade to an unchanged list. Send failures
//! are returned to the caller and recorded on the state for the UI.

#[cfg(test)]
#[path = "controller_test.rs"]
mod controller_test;

use std::cell::RefCell;
use std::rc::Rc;

use crate::client::{InsertHandler, MessageStore, Subscription};
use crate::config::{ChatOptions, InitPolicy};
use crate::error::{ChatError, StoreError};
use crate::model::Message;
use crate::state::{ChatState, Cursor};

/// Shared, mutable access to a [`ChatState`].
///
/// Both methods return `None` once the underlying storage is gone (for
/// example a disposed reactive signal), so late callbacks become no-ops.
pub trait ChatStateCell: Clone + 'static {
    fn read<R>(&self, f: impl FnOnce(&ChatState) -> R) -> Option<R>;
    fn update<R>(&self, f: impl FnOnce(&mut ChatState) -> R) -> Option<R>;
}

impl ChatStateCell for Rc<RefCell<ChatState>> {
    fn read<R>(&self, f: impl FnOnce(&ChatState) -> R) -> Option<R> {
        Some(f(&self.borrow()))
    }

    fn update<R>(&self, f: impl FnOnce(&mut ChatState) -> R) -> Option<R> {
        Some(f(&mut self.borrow_mut()))
    }
}

/// Outcome of [`ChatController::load_older`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LoadOlder {
    /// A fetch was in flight or no older messages exist; nothing was sent.
    Skipped,
    /// Rows were appended and more may exist.
    Appended(usize),
    /// Rows were appended and the history is now exhausted.
    Exhausted(usize),
    /// The store call failed; list and cursor are unchanged.
    Failed,
}

/// Reconciles initial load, backward paging, and live inserts.
pub struct ChatController<S, C> {
    store: Rc<S>,
    state: C,
    options: ChatOptions,
    subscription: RefCell<Option<Subscription>>,
}

impl<S: MessageStore + 'static, C: ChatStateCell> ChatController<S, C> {
    pub fn new(store: Rc<S>, state: C, options: ChatOptions) -> Self {
        Self { store, state, options, subscription: RefCell::new(None) }
    }

    pub fn state(&self) -> &C {
        &self.state
    }

    pub fn options(&self) -> &ChatOptions {
        &self.options
    }

    /// Whether a live subscription is currently held.
    pub fn is_subscribed(&self) -> bool {
        self.subscription.borrow().is_some()
    }

    /// Run mount-time work according to the init policy.
    pub async fn mount(&self) {
        if self.options.init_policy == InitPolicy::Eager {
            self.initialize().await;
        }
    }

    /// Subscribe to live inserts and load the newest page.
    ///
    /// Runs at most once per controller; later calls return immediately.
    pub async fn initialize(&self) {
        if self.state.update(ChatState::mark_initialized) != Some(true) {
            return;
        }

        self.subscribe();

        match self.store.fetch_page(None, self.options.page_size).await {
            Ok(page) => {
                log::debug!("loaded {} newest messages", page.len());
                self.state.update(|s| s.apply_latest_page(page));
            }
            Err(err) => {
                log::warn!("initial message fetch failed: {err}");
                self.state.update(ChatState::fail_latest_page);
            }
        }
    }

    fn subscribe(&self) {
        let state = self.state.clone();
        let on_insert: InsertHandler = Rc::new(move |msg: Message| {
            state.update(|s| s.receive_live(msg));
        });

        match self.store.subscribe_inserts(on_insert) {
            Ok(sub) => *self.subscription.borrow_mut() = Some(sub),
            Err(StoreError::RealtimeUnavailable) => {
                log::debug!("realtime unavailable; own messages are merged from insert confirmations");
            }
            Err(err) => log::warn!("live subscription failed: {err}"),
        }
    }

    /// Flip panel visibility. Under [`InitPolicy::Lazy`] the first open
    /// initializes. Returns the new open state.
    pub async fn toggle(&self) -> bool {
        let open = self.state.update(ChatState::toggle_open).unwrap_or(false);
        if open && self.options.init_policy == InitPolicy::Lazy {
            self.initialize().await;
        }
        open
    }

    /// Fetch the page older than the cursor and append it.
    pub async fn load_older(&self) -> LoadOlder {
        let Some(Some(before)) = self.state.update(ChatState::begin_load_older) else {
            return LoadOlder::Skipped;
        };

        let result = self.store.fetch_page(Some(before), self.options.page_size).await;
        let page_size = self.options.page_size;
        let applied = self
            .state
            .update(|s| s.finish_load_older(before, result, page_size).map(|n| (n, s.cursor())));

        match applied {
            Some(Ok((appended, Cursor::Exhausted))) => LoadOlder::Exhausted(appended),
            Some(Ok((appended, _))) => LoadOlder::Appended(appended),
            Some(Err(err)) => {
                log::warn!("older message fetch failed: {err}");
                LoadOlder::Failed
            }
            None => LoadOlder::Failed,
        }
    }

    /// Validate the composer, insert the message, and merge the confirmed row.
    ///
    /// # Errors
    ///
    /// [`ChatError::Validation`] for a blank draft (no store call is made),
    /// [`ChatError::Store`] when the insert is rejected (the draft is kept),
    /// [`ChatError::Detached`] when the panel state is gone.
    pub async fn post_message(&self) -> Result<Message, ChatError> {
        let default_name = &self.options.default_name;
        let outgoing = self
            .state
            .read(|s| s.outgoing(default_name))
            .ok_or(ChatError::Detached)??;

        match self.store.insert_message(&outgoing).await {
            Ok(msg) => {
                self.state.update(|s| s.record_sent(msg.clone()));
                Ok(msg)
            }
            Err(err) => {
                self.state.update(|s| s.record_send_failure(&err));
                Err(err.into())
            }
        }
    }

    /// Release the live subscription. Safe to call more than once.
    pub fn teardown(&self) {
        let sub = self.subscription.borrow_mut().take();
        if let Some(sub) = sub {
            log::debug!("releasing live subscription");
            sub.unsubscribe();
        }
    }
}
