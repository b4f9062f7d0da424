//! Generation - procedural creation of customer orders.

mod order;

pub use order::*;
