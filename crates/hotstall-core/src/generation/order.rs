//! Order generation: how much of what a new customer asks for.

use rand::Rng;

use crate::components::{ItemKind, Order, OrderLine};

/// Roll a fresh order: a uniform total in `[min_total, max_total]`, split
/// across the menu by independent uniform kind draws. Kinds that get no
/// draws are left off the order entirely, so a multi-item order can still
/// be all one filling.
pub fn generate_order(rng: &mut impl Rng, min_total: u32, max_total: u32) -> Order {
    let total = rng.gen_range(min_total..=max_total);

    let mut counts = [0u32; ItemKind::ALL.len()];
    for _ in 0..total {
        counts[rng.gen_range(0..ItemKind::ALL.len())] += 1;
    }

    let lines = ItemKind::ALL
        .iter()
        .zip(counts.iter())
        .filter(|(_, &count)| count > 0)
        .map(|(&kind, &count)| OrderLine::new(kind, count))
        .collect();

    Order::new(lines)
}
