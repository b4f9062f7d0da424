//! Outbound notifications for the presentation and reward layers.
//!
//! The core pushes events onto a queue and never waits for anyone to
//! read them; the embedding layer drains the queue once per frame. A
//! queue nobody drains just grows — core logic does not depend on
//! whether anything is listening.

use serde::{Deserialize, Serialize};

use crate::components::{CustomerId, ItemKind, Outcome, OrderLine};

/// Everything the presentation/reward layers can react to.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum SimEvent {
    /// A customer claimed a counter. The order is frozen from here on.
    Spawned {
        customer: CustomerId,
        counter: u32,
        order: Vec<OrderLine>,
    },
    /// A delivery landed; snapshots of every line after the change.
    OrderUpdated {
        customer: CustomerId,
        lines: Vec<OrderLine>,
    },
    /// Most of the wait budget is gone.
    WarningEntered { customer: CustomerId },
    /// A delivery the order did not need.
    WrongDelivery {
        customer: CustomerId,
        kind: ItemKind,
        attempts: u32,
    },
    /// The visit ended, one way or the other.
    OutcomeReached {
        customer: CustomerId,
        outcome: Outcome,
        wrong_attempts: u32,
        wait_fraction: f32,
    },
    /// The running tallies moved.
    StatisticsChanged {
        served: u32,
        satisfied: u32,
        angry: u32,
        rate: f32,
    },
}

/// FIFO of pending events.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EventQueue {
    events: Vec<SimEvent>,
}

impl EventQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, event: SimEvent) {
        self.events.push(event);
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Hand every pending event to the caller, oldest first.
    pub fn drain(&mut self) -> Vec<SimEvent> {
        std::mem::take(&mut self.events)
    }
}
