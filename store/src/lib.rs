//! Headless chat core shared by the browser widget and the CLI.
//!
//! This crate owns the message model, the store client contract and its
//! Supabase-style implementation, the realtime channel protocol, and the
//! chat controller that merges paged history with live inserts into one
//! newest-first list. It has no UI dependency.
//!
//! SYSTEM CONTEXT
//! ==============
//! `client` defines what a store must offer, `rest` and `realtime` provide
//! the hosted-backend implementation, `state` holds the list/cursor
//! bookkeeping, and `controller` drives the three event sources (initial
//! load, backward paging, live inserts) against any [`MessageStore`].

pub mod client;
pub mod config;
pub mod controller;
pub mod error;
pub mod model;
pub mod realtime;
pub mod rest;
pub mod state;

pub use client::{InsertHandler, MessageStore, Subscription};
pub use config::{ChatOptions, InitPolicy, StoreConfig};
pub use controller::{ChatController, ChatStateCell, LoadOlder};
pub use error::{ChatError, ConfigError, StoreError, ValidationError};
pub use model::{Message, MessageId, NewMessage};
pub use realtime::RealtimeConnector;
pub use rest::SupabaseStore;
pub use state::{ChatState, Cursor};
