//! Counter pool: the fixed set of mutually exclusive service slots.

use serde::{Deserialize, Serialize};

use crate::components::CustomerId;

/// Fixed-size pool of service counters. A counter holds at most one
/// customer, from the moment they are admitted until the end of their
/// exit walk.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CounterPool {
    slots: Vec<Option<CustomerId>>,
}

impl CounterPool {
    pub fn new(capacity: u32) -> Self {
        Self {
            slots: vec![None; capacity as usize],
        }
    }

    pub fn capacity(&self) -> u32 {
        self.slots.len() as u32
    }

    /// Claim the lowest-index free counter for `customer`. `None` means
    /// every counter is busy — backpressure, not an error.
    pub fn try_acquire(&mut self, customer: CustomerId) -> Option<u32> {
        let index = self.slots.iter().position(|slot| slot.is_none())?;
        self.slots[index] = Some(customer);
        Some(index as u32)
    }

    /// Free a counter. Releasing a counter that is not occupied is a
    /// caller bug; it is logged and ignored so the pool stays consistent.
    pub fn release(&mut self, counter: u32) -> bool {
        match self.slots.get_mut(counter as usize) {
            Some(slot) if slot.is_some() => {
                *slot = None;
                true
            }
            Some(_) => {
                log::warn!("release of counter {} that is not occupied", counter);
                false
            }
            None => {
                log::warn!("release of counter {} outside the pool", counter);
                false
            }
        }
    }

    pub fn occupant(&self, counter: u32) -> Option<CustomerId> {
        self.slots.get(counter as usize).copied().flatten()
    }

    pub fn available(&self) -> u32 {
        self.slots.iter().filter(|slot| slot.is_none()).count() as u32
    }

    pub fn occupied(&self) -> u32 {
        self.capacity() - self.available()
    }

    /// Free every counter at once (clear-all sweep / game reset).
    pub fn clear(&mut self) {
        for slot in &mut self.slots {
            *slot = None;
        }
    }
}
