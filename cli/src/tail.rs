//! State cell for `tail`: the controller merges, this cell prints.
//!
//! Every update hands the list to [`ChatState`]'s own merge rules, then
//! prints the rows that have not been shown yet, oldest first. Rows from a
//! late initial page can therefore print after live rows that beat it.

#[cfg(test)]
#[path = "tail_test.rs"]
mod tail_test;

use std::cell::RefCell;
use std::collections::HashSet;
use std::rc::Rc;

use store::{ChatState, ChatStateCell, Message, MessageId};

use crate::Output;

#[derive(Clone, Debug)]
pub struct TailState {
    state: Rc<RefCell<ChatState>>,
    shown: Rc<RefCell<HashSet<MessageId>>>,
    output: Output,
}

impl TailState {
    pub fn new(output: Output) -> Self {
        Self { state: Rc::default(), shown: Rc::default(), output }
    }

    /// Rows not printed yet, oldest first. Marks them as shown.
    fn take_unshown(&self) -> Vec<Message> {
        let state = self.state.borrow();
        let mut shown = self.shown.borrow_mut();
        state
            .messages()
            .iter()
            .rev()
            .filter(|m| shown.insert(m.id.clone()))
            .cloned()
            .collect()
    }
}

impl ChatStateCell for TailState {
    fn read<R>(&self, f: impl FnOnce(&ChatState) -> R) -> Option<R> {
        Some(f(&self.state.borrow()))
    }

    fn update<R>(&self, f: impl FnOnce(&mut ChatState) -> R) -> Option<R> {
        let result = f(&mut self.state.borrow_mut());
        for msg in self.take_unshown() {
            if let Err(e) = self.output.print(&msg) {
                tracing::warn!(error = %e, "failed to print message");
            }
        }
        Some(result)
    }
}
