//! Hotstall Core - Street-Stall Service Simulation Engine
//!
//! Simulates a stream of customers arriving at a small row of service
//! counters. Each customer carries a multi-item order and a wait budget;
//! the unserved escalate, then storm off. Admission is gated by counter
//! availability and by a difficulty curve that tightens as more customers
//! are served.
//!
//! # Architecture
//!
//! Customers are ECS entities (via `hecs`) advanced by a single external
//! tick:
//! - **Components**: pure data attached to customers (Order, Patience,
//!   Lifecycle, ...)
//! - **Systems**: logic that queries and updates components
//! - **Engine**: one [`engine::SimulationEngine`] context owning the
//!   world, the counter pool, spawn pacing, and statistics — no globals
//!
//! Rendering, audio, and rewards live outside: they drain the engine's
//! event queue and poll customer snapshots.
//!
//! # Example
//!
//! ```rust,no_run
//! use hotstall_core::prelude::*;
//!
//! let mut engine = SimulationEngine::new(SimConfig::default()).unwrap();
//!
//! // Run simulation
//! loop {
//!     engine.update(1.0 / 60.0); // 60 FPS
//!     for event in engine.drain_events() {
//!         // feed presentation / reward layers
//!         let _ = event;
//!     }
//! }
//! ```

pub mod components;
pub mod config;
pub mod counters;
pub mod engine;
pub mod events;
pub mod generation;
pub mod scheduler;
pub mod stats;
pub mod systems;

/// Commonly used types for convenient importing
pub mod prelude {
    pub use crate::components::*;
    pub use crate::config::{ConfigError, SimConfig};
    pub use crate::counters::CounterPool;
    pub use crate::engine::{CustomerSnapshot, DeliveryResult, SimulationEngine};
    pub use crate::events::SimEvent;
    pub use crate::stats::Statistics;
}
