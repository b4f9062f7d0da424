//! Running tally of visit outcomes.

use serde::{Deserialize, Serialize};

use crate::components::Outcome;

/// Served/satisfied/angry counters and the derived satisfaction rate.
/// Append-only; only an explicit game reset zeroes it.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct Statistics {
    pub served: u32,
    pub satisfied: u32,
    pub angry: u32,
}

impl Statistics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, outcome: Outcome) {
        self.served += 1;
        match outcome {
            Outcome::Satisfied => self.satisfied += 1,
            Outcome::Angry => self.angry += 1,
        }
    }

    /// Satisfied share of everyone served so far. A stall that has served
    /// nobody yet counts as fully satisfied.
    pub fn satisfaction_rate(&self) -> f32 {
        if self.served == 0 {
            1.0
        } else {
            self.satisfied as f32 / self.served as f32
        }
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}
