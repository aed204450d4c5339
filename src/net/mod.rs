//! Browser networking for the chat widget.
//!
//! SYSTEM CONTEXT
//! ==============
//! REST calls go through `store::SupabaseStore` (reqwest over `fetch`).
//! `socket` owns the realtime websocket and feeds live inserts back into the
//! store's subscription callback.

pub mod socket;
