//! Message store client contract.
//!
//! SYSTEM CONTEXT
//! ==============
//! The chat controller talks to a remote, append-mostly table of messages
//! through [`MessageStore`]. [`crate::SupabaseStore`] is the hosted
//! implementation; tests supply in-memory fakes.
//!
//! Everything here is single-threaded: futures are `?Send` because browser
//! fetch and websocket handles cannot cross threads.

#[cfg(test)]
#[path = "client_test.rs"]
mod client_test;

use std::fmt;
use std::rc::Rc;

use async_trait::async_trait;
use time::OffsetDateTime;

use crate::error::StoreError;
use crate::model::{Message, NewMessage};

/// Callback invoked for every newly inserted row pushed by the store.
pub type InsertHandler = Rc<dyn Fn(Message)>;

/// Remote message table with a push channel for inserts.
#[async_trait(?Send)]
pub trait MessageStore {
    /// Fetch up to `limit` messages ordered newest-first.
    ///
    /// With `before` set, only messages strictly older than it are returned.
    async fn fetch_page(&self, before: Option<OffsetDateTime>, limit: usize) -> Result<Vec<Message>, StoreError>;

    /// Insert a message and return the persisted row.
    async fn insert_message(&self, message: &NewMessage) -> Result<Message, StoreError>;

    /// Register `on_insert` for rows inserted from now on.
    ///
    /// The subscription lasts until the returned handle is dropped or
    /// explicitly unsubscribed.
    fn subscribe_inserts(&self, on_insert: InsertHandler) -> Result<Subscription, StoreError>;
}

#[async_trait(?Send)]
impl<S: MessageStore + ?Sized> MessageStore for Rc<S> {
    async fn fetch_page(&self, before: Option<OffsetDateTime>, limit: usize) -> Result<Vec<Message>, StoreError> {
        (**self).fetch_page(before, limit).await
    }

    async fn insert_message(&self, message: &NewMessage) -> Result<Message, StoreError> {
        (**self).insert_message(message).await
    }

    fn subscribe_inserts(&self, on_insert: InsertHandler) -> Result<Subscription, StoreError> {
        (**self).subscribe_inserts(on_insert)
    }
}

/// Handle to a live subscription. Releases it on drop.
pub struct Subscription {
    release: Option<Box<dyn FnOnce()>>,
}

impl Subscription {
    /// Wrap a release action that runs exactly once.
    pub fn new(release: impl FnOnce() + 'static) -> Self {
        Self { release: Some(Box::new(release)) }
    }

    /// Release the subscription now.
    pub fn unsubscribe(mut self) {
        self.release_now();
    }

    fn release_now(&mut self) {
        if let Some(release) = self.release.take() {
            release();
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.release_now();
    }
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription")
            .field("active", &self.release.is_some())
            .finish()
    }
}
