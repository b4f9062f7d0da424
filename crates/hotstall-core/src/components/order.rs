//! Order components: what a customer wants and how much of it they got.

use serde::{Deserialize, Serialize};

/// The fillings the stall sells. A closed set — dispatch on it is always
/// an exhaustive match, never a string key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ItemKind {
    Sugar,
    Seed,
}

impl ItemKind {
    /// Every kind, in menu order.
    pub const ALL: [ItemKind; 2] = [ItemKind::Sugar, ItemKind::Seed];
}

/// One line of an order: an item kind, how many were asked for, and how
/// many have been handed over so far.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderLine {
    pub kind: ItemKind,
    pub requested: u32,
    pub fulfilled: u32,
}

impl OrderLine {
    pub fn new(kind: ItemKind, requested: u32) -> Self {
        Self {
            kind,
            requested,
            fulfilled: 0,
        }
    }

    pub fn is_complete(&self) -> bool {
        self.fulfilled == self.requested
    }
}

/// A customer's full order. Its line items are fixed at generation time
/// and unique per kind; only the fulfilled counts change afterwards.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Order {
    lines: Vec<OrderLine>,
}

impl Order {
    /// Build an order from per-kind lines. Zero-quantity lines are dropped
    /// and duplicate kinds are merged, so the per-kind uniqueness invariant
    /// holds no matter what the caller passes.
    pub fn new(lines: Vec<OrderLine>) -> Self {
        let mut merged: Vec<OrderLine> = Vec::with_capacity(lines.len());

        for line in lines {
            if line.requested == 0 {
                continue;
            }
            match merged.iter_mut().find(|l| l.kind == line.kind) {
                Some(existing) => {
                    existing.requested += line.requested;
                    existing.fulfilled += line.fulfilled;
                }
                None => merged.push(line),
            }
        }

        Self { lines: merged }
    }

    pub fn lines(&self) -> &[OrderLine] {
        &self.lines
    }

    pub fn is_complete(&self) -> bool {
        self.lines.iter().all(|l| l.is_complete())
    }

    pub fn total_requested(&self) -> u32 {
        self.lines.iter().map(|l| l.requested).sum()
    }

    /// Deliver one item of `kind`: the first incomplete matching line gains
    /// one unit. Returns the updated line, or `None` when nothing on the
    /// order still needs that kind.
    pub fn fulfill(&mut self, kind: ItemKind) -> Option<OrderLine> {
        let line = self
            .lines
            .iter_mut()
            .find(|l| l.kind == kind && !l.is_complete())?;
        line.fulfilled += 1;
        Some(*line)
    }
}
