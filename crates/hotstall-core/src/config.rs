//! Simulation tuning knobs and their validation.

use serde::{Deserialize, Serialize};

/// Every gameplay knob in one place. Validated once when the engine is
/// built; read-only afterwards.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    /// Number of service counters; bounds concurrent customers
    pub counter_capacity: u32,
    /// Shortest gap between spawn attempts, seconds
    pub min_spawn_interval: f32,
    /// Longest gap between spawn attempts, seconds
    pub max_spawn_interval: f32,
    /// Wait budget handed out before any difficulty decay, seconds
    pub base_wait_budget: f32,
    /// The wait budget never drops below this, seconds
    pub floor_wait_budget: f32,
    /// Multiplier applied to the wait budget at each difficulty step
    pub decay_rate: f32,
    /// Customers served per difficulty step
    pub decay_batch: u32,
    /// Fraction of the budget remaining when the customer starts fuming
    pub warning_fraction: f32,
    /// Smallest total item count of a generated order
    pub min_order_total: u32,
    /// Largest total item count of a generated order
    pub max_order_total: u32,
    /// Wrong deliveries tolerated before the customer storms off
    pub wrong_attempt_limit: u32,
    /// Walk-in time from the street edge to the counter, seconds
    pub enter_duration: f32,
    /// Walk-out time, seconds
    pub exit_duration: f32,
    /// Angry customers leave in this fraction of the exit time
    pub angry_exit_factor: f32,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            counter_capacity: 3,
            min_spawn_interval: 3.0,
            max_spawn_interval: 8.0,
            base_wait_budget: 20.0,
            floor_wait_budget: 8.0,
            decay_rate: 0.9,
            decay_batch: 5,
            warning_fraction: 0.25,
            min_order_total: 1,
            max_order_total: 3,
            wrong_attempt_limit: 3,
            enter_duration: 2.0,
            exit_duration: 1.5,
            angry_exit_factor: 0.6,
        }
    }
}

impl SimConfig {
    /// Reject out-of-range configuration. Called once at engine
    /// construction; nothing else in the core validates ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.counter_capacity == 0 {
            return Err(ConfigError::NoCounters);
        }
        if self.min_spawn_interval <= 0.0 || self.max_spawn_interval < self.min_spawn_interval {
            return Err(ConfigError::SpawnInterval {
                min: self.min_spawn_interval,
                max: self.max_spawn_interval,
            });
        }
        if self.base_wait_budget <= 0.0 || self.floor_wait_budget <= 0.0 {
            return Err(ConfigError::WaitBudget {
                base: self.base_wait_budget,
                floor: self.floor_wait_budget,
            });
        }
        if self.decay_rate <= 0.0 || self.decay_rate >= 1.0 {
            return Err(ConfigError::DecayRate(self.decay_rate));
        }
        if self.decay_batch == 0 {
            return Err(ConfigError::DecayBatch);
        }
        if self.warning_fraction <= 0.0 || self.warning_fraction >= 1.0 {
            return Err(ConfigError::WarningFraction(self.warning_fraction));
        }
        if self.min_order_total == 0 || self.max_order_total < self.min_order_total {
            return Err(ConfigError::OrderTotal {
                min: self.min_order_total,
                max: self.max_order_total,
            });
        }
        if self.wrong_attempt_limit == 0 {
            return Err(ConfigError::WrongAttemptLimit);
        }
        if self.enter_duration < 0.0
            || self.exit_duration < 0.0
            || self.angry_exit_factor <= 0.0
            || self.angry_exit_factor > 1.0
        {
            return Err(ConfigError::TransitTiming);
        }
        Ok(())
    }
}

/// Rejected configuration, produced once at engine construction
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigError {
    NoCounters,
    SpawnInterval { min: f32, max: f32 },
    WaitBudget { base: f32, floor: f32 },
    DecayRate(f32),
    DecayBatch,
    WarningFraction(f32),
    OrderTotal { min: u32, max: u32 },
    WrongAttemptLimit,
    TransitTiming,
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::NoCounters => write!(f, "counter capacity must be at least 1"),
            ConfigError::SpawnInterval { min, max } => {
                write!(f, "invalid spawn interval bounds: min {}, max {}", min, max)
            }
            ConfigError::WaitBudget { base, floor } => {
                write!(f, "wait budgets must be positive: base {}, floor {}", base, floor)
            }
            ConfigError::DecayRate(rate) => {
                write!(f, "decay rate must be inside (0, 1), got {}", rate)
            }
            ConfigError::DecayBatch => write!(f, "decay batch size must be at least 1"),
            ConfigError::WarningFraction(fraction) => {
                write!(f, "warning fraction must be inside (0, 1), got {}", fraction)
            }
            ConfigError::OrderTotal { min, max } => {
                write!(f, "invalid order total bounds: min {}, max {}", min, max)
            }
            ConfigError::WrongAttemptLimit => {
                write!(f, "wrong attempt limit must be at least 1")
            }
            ConfigError::TransitTiming => write!(f, "invalid enter/exit timing"),
        }
    }
}

impl std::error::Error for ConfigError {}
