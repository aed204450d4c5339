//! [`ChatStateCell`] over a Leptos `RwSignal`.

#[cfg(test)]
#[path = "signal_test.rs"]
mod signal_test;

use leptos::prelude::*;
use store::{ChatState, ChatStateCell};

/// Signal-backed chat state handle.
///
/// Reads are untracked so controller work never subscribes the caller.
/// Both accessors return `None` once the signal is disposed, which turns
/// late async completions into no-ops after the widget unmounts.
#[derive(Clone, Copy, Debug)]
pub struct SignalState(pub RwSignal<ChatState>);

impl ChatStateCell for SignalState {
    fn read<R>(&self, f: impl FnOnce(&ChatState) -> R) -> Option<R> {
        self.0.try_with_untracked(f)
    }

    fn update<R>(&self, f: impl FnOnce(&mut ChatState) -> R) -> Option<R> {
        self.0.try_update(f)
    }
}
