//! Reactive state for the widget.
//!
//! DESIGN
//! ======
//! `ChatState` itself lives in the `store` crate so the reconciliation rules
//! are testable without a reactive runtime. This module only adapts a Leptos
//! signal to the controller's state-cell seam.

pub mod signal;
