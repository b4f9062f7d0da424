//! Spawn pacing and the difficulty curve.

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::components::CustomerId;

/// Decides when the next walk-in is attempted. Intervals are drawn
/// uniformly from the configured range after every attempt, so arrivals
/// are bursty rather than periodic. An attempt that finds no free counter
/// is simply skipped; there is no backlog of deferred customers.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpawnScheduler {
    min_interval: f32,
    max_interval: f32,
    countdown: f32,
    next_customer_id: u32,
    spawning: bool,
}

impl SpawnScheduler {
    pub fn new(min_interval: f32, max_interval: f32, rng: &mut impl Rng) -> Self {
        Self {
            min_interval,
            max_interval,
            countdown: draw_interval(rng, min_interval, max_interval),
            next_customer_id: 1,
            spawning: true,
        }
    }

    /// Count down by `dt`; true means "attempt a spawn this tick". The
    /// next interval is drawn immediately, whether or not the attempt
    /// ends up succeeding.
    pub fn tick(&mut self, dt: f32, rng: &mut impl Rng) -> bool {
        if !self.spawning {
            return false;
        }

        self.countdown -= dt;
        if self.countdown > 0.0 {
            return false;
        }

        self.countdown = draw_interval(rng, self.min_interval, self.max_interval);
        true
    }

    /// Hand out the next customer id.
    pub fn allocate_id(&mut self) -> CustomerId {
        let id = self.next_customer_id;
        self.next_customer_id += 1;
        CustomerId(id)
    }

    pub fn set_spawning(&mut self, on: bool) {
        self.spawning = on;
    }

    pub fn is_spawning(&self) -> bool {
        self.spawning
    }

    /// Restart the id sequence and the spawn clock (game reset).
    pub fn reset(&mut self, rng: &mut impl Rng) {
        self.countdown = draw_interval(rng, self.min_interval, self.max_interval);
        self.next_customer_id = 1;
    }
}

fn draw_interval(rng: &mut impl Rng, min: f32, max: f32) -> f32 {
    rng.gen_range(min..=max)
}

/// Step-function difficulty curve: every `batch` served customers, the
/// wait budget handed to new arrivals drops by `decay_rate`, never below
/// `floor_wait_budget`. The budget is constant inside a batch window and
/// drops at the boundary, not continuously.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Difficulty {
    pub base_wait_budget: f32,
    pub decay_rate: f32,
    pub floor_wait_budget: f32,
    pub batch: u32,
}

impl Difficulty {
    pub fn wait_budget(&self, customers_served: u32) -> f32 {
        let steps = (customers_served / self.batch) as i32;
        (self.base_wait_budget * self.decay_rate.powi(steps)).max(self.floor_wait_budget)
    }
}
