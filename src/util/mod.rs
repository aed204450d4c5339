//! Utility helpers shared across widget components.
//!
//! SYSTEM CONTEXT
//! ==============
//! Browser-only concerns (locale formatting, blocking notifications) are
//! isolated here behind `hydrate` so components stay renderable natively.

pub mod notify;
pub mod time_label;
