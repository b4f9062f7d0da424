//! Component definitions for the ECS simulation.
//!
//! Components are pure data structs attached to customer entities.
//! They have no behavior - that lives in systems and the engine.

mod customer;
mod order;

pub use customer::*;
pub use order::*;
