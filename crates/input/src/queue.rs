use std::sync::mpsc::{self, Receiver, Sender};

use tracing::trace;

use crate::action::{Action, Trigger};

/// Cloneable producer side of an [`InputQueue`]. Can be moved to whatever
/// thread delivers device or UI events.
#[derive(Debug, Clone)]
pub struct InputHandle {
    tx: Sender<Action>,
}

impl InputHandle {
    /// Queue an action. Returns `false` once the queue has been dropped.
    pub fn push(&self, action: Action) -> bool {
        self.tx.send(action).is_ok()
    }

    /// Map and queue a raw trigger. Returns whether an action was queued.
    pub fn trigger(&self, trigger: Trigger) -> bool {
        match trigger.action() {
            Some(action) => self.push(action),
            None => false,
        }
    }
}

/// Actions collected between ticks, drained once per tick.
#[derive(Debug)]
pub struct InputQueue {
    handle: InputHandle,
    rx: Receiver<Action>,
}

impl Default for InputQueue {
    fn default() -> Self {
        Self::new()
    }
}

impl InputQueue {
    pub fn new() -> Self {
        let (tx, rx) = mpsc::channel();
        Self {
            handle: InputHandle { tx },
            rx,
        }
    }

    pub fn handle(&self) -> InputHandle {
        self.handle.clone()
    }

    pub fn push(&self, action: Action) {
        self.handle.push(action);
    }

    pub fn trigger(&self, trigger: Trigger) -> bool {
        self.handle.trigger(trigger)
    }

    /// Everything queued so far, in arrival order.
    pub fn drain(&self) -> Vec<Action> {
        let actions: Vec<Action> = self.rx.try_iter().collect();
        if !actions.is_empty() {
            trace!(count = actions.len(), "Input drained");
        }
        actions
    }
}
