//! Single-slot blocking handoff between one producer and one consumer
//!
//! The mailbox also carries a per-stage configuration value `C` behind the same
//! lock as the slot. A consumer takes the line and a snapshot of `C` in one
//! critical section, so a reconfiguration is either fully visible to the next
//! line or not at all.

use parking_lot::{Condvar, Mutex};

use crate::line::Line;

/// Occupancy of the slot
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SlotStatus {
    Empty,
    Full,
}

#[derive(Debug)]
struct Slot<C> {
    buffer: Line,
    status: SlotStatus,
    closed: bool,
    config: C,
}

/// Single-slot mailbox with an attached configuration value
#[derive(Debug)]
pub struct Mailbox<C = ()> {
    slot: Mutex<Slot<C>>,
    /// Signaled on Empty -> Full
    ready: Condvar,
    /// Signaled on Full -> Empty
    drained: Condvar,
}

impl<C: Clone> Mailbox<C> {
    /// Create an empty mailbox holding `config`
    pub fn new(config: C) -> Self {
        Self {
            slot: Mutex::new(Slot {
                buffer: Line::default(),
                status: SlotStatus::Empty,
                closed: false,
                config,
            }),
            ready: Condvar::new(),
            drained: Condvar::new(),
        }
    }

    /// Hand `text` to the consumer.
    ///
    /// Blocks while a previous line is still waiting to be drained, so a slot
    /// is never overwritten. Returns `false` if the mailbox has been closed.
    pub fn send(&self, text: &Line) -> bool {
        let mut slot = self.slot.lock();
        while slot.status == SlotStatus::Full && !slot.closed {
            self.drained.wait(&mut slot);
        }
        if slot.closed {
            return false;
        }

        slot.buffer.copy_from(text);
        slot.status = SlotStatus::Full;
        drop(slot);

        self.ready.notify_one();
        true
    }

    /// Take the next line together with a snapshot of the configuration.
    ///
    /// Blocks while the slot is empty. Returns `None` once the mailbox is
    /// closed and nothing is left to drain.
    pub fn receive(&self) -> Option<(Line, C)> {
        let mut slot = self.slot.lock();
        // Wakeups may be spurious or coalesced
        while slot.status == SlotStatus::Empty {
            if slot.closed {
                return None;
            }
            self.ready.wait(&mut slot);
        }

        let line = slot.buffer.clone();
        let config = slot.config.clone();
        slot.status = SlotStatus::Empty;
        drop(slot);

        self.drained.notify_one();
        Some((line, config))
    }

    /// Mutate the configuration under the slot lock
    pub fn configure<R>(&self, update: impl FnOnce(&mut C) -> R) -> R {
        let mut slot = self.slot.lock();
        update(&mut slot.config)
    }

    /// Snapshot of the current configuration
    pub fn config(&self) -> C {
        self.slot.lock().config.clone()
    }

    pub fn status(&self) -> SlotStatus {
        self.slot.lock().status
    }

    /// Stop accepting lines and wake every waiter.
    ///
    /// A line already in the slot is still delivered before `receive`
    /// starts returning `None`.
    pub fn close(&self) {
        self.slot.lock().closed = true;
        self.ready.notify_all();
        self.drained.notify_all();
    }
}
