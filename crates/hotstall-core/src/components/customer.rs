//! Customer components: lifecycle phase, wait timer, temper, counter binding.

use serde::{Deserialize, Serialize};

/// Marker component identifying an entity as a customer
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct Customer;

/// Stable customer id handed to the embedding layers. Unique for the
/// lifetime of the engine, issued from 1 upward.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CustomerId(pub u32);

/// Where a customer is in their visit.
///
/// Entering and Exiting are walk phases with a fixed duration; they hold
/// the counter but make no decisions. Satisfied and Angry are the two
/// mutually exclusive outcomes, both reached only from Waiting or Warning.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Phase {
    /// Walking in from the street edge to the counter
    Entering,
    /// The order bubble appears; passed through in the same tick
    Ordering,
    /// Standing at the counter, calm
    Waiting,
    /// Escalated: most of the wait budget is gone
    Warning,
    /// Order complete, about to leave happy
    Satisfied,
    /// Out of patience or fed up, about to storm off
    Angry,
    /// Walking out
    Exiting,
    /// Gone; the entity is despawned in the same tick this is set
    Terminated,
}

impl Phase {
    /// Deliveries only mean something while the customer stands at the
    /// counter with an open order.
    pub fn accepts_delivery(&self) -> bool {
        matches!(self, Phase::Waiting | Phase::Warning)
    }

    pub fn is_terminal_outcome(&self) -> bool {
        matches!(self, Phase::Satisfied | Phase::Angry)
    }
}

/// How a visit ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Outcome {
    Satisfied,
    Angry,
}

/// Lifecycle state: the current phase, when it was entered, and the
/// outcome once one has been reached. Transitions are one-way.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Lifecycle {
    pub phase: Phase,
    /// Sim time at which `phase` was entered
    pub since: f64,
    pub outcome: Option<Outcome>,
}

impl Lifecycle {
    pub fn new(now: f64) -> Self {
        Self {
            phase: Phase::Entering,
            since: now,
            outcome: None,
        }
    }

    pub fn advance(&mut self, phase: Phase, now: f64) {
        self.phase = phase;
        self.since = now;
    }

    /// Record a terminal outcome and move to the matching phase.
    pub fn conclude(&mut self, outcome: Outcome, now: f64) {
        let phase = match outcome {
            Outcome::Satisfied => Phase::Satisfied,
            Outcome::Angry => Phase::Angry,
        };
        self.outcome = Some(outcome);
        self.advance(phase, now);
    }

    pub fn elapsed_in_phase(&self, now: f64) -> f64 {
        now - self.since
    }
}

/// Wait timer against the difficulty-scaled budget. `elapsed` only moves
/// while the phase is Waiting or Warning.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Patience {
    pub elapsed: f32,
    pub budget: f32,
    /// Fraction of the budget remaining when escalation starts
    pub warning_fraction: f32,
}

impl Patience {
    pub fn new(budget: f32, warning_fraction: f32) -> Self {
        Self {
            elapsed: 0.0,
            budget,
            warning_fraction,
        }
    }

    /// Elapsed time at which only `warning_fraction` of the budget is left.
    pub fn warning_point(&self) -> f32 {
        self.budget * (1.0 - self.warning_fraction)
    }

    pub fn is_expired(&self) -> bool {
        self.elapsed >= self.budget
    }

    /// Elapsed wait as a fraction of the budget, clamped to [0, 1].
    pub fn fraction(&self) -> f32 {
        (self.elapsed / self.budget).clamp(0.0, 1.0)
    }
}

/// Wrong-delivery tally. Hitting the limit ends the visit on the spot.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Temper {
    pub wrong_attempts: u32,
    pub limit: u32,
}

impl Temper {
    pub fn new(limit: u32) -> Self {
        Self {
            wrong_attempts: 0,
            limit,
        }
    }

    /// Record a wrong delivery; true when the customer has had enough.
    pub fn record_wrong(&mut self) -> bool {
        self.wrong_attempts += 1;
        self.wrong_attempts >= self.limit
    }
}

/// The counter slot this customer occupies for the whole visit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServedAt {
    pub counter: u32,
}
