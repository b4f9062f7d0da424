//! Wait-timer system: advances patience and escalates waiting customers.

use hecs::World;

use crate::components::{CustomerId, Lifecycle, Outcome, Patience, Phase, Temper};
use crate::events::{EventQueue, SimEvent};

/// Advance wait timers for customers standing at the counter. Handles the
/// one-way Waiting → Warning escalation and the hard timeout into Angry.
/// The timer only runs in Waiting and Warning; transit phases cost the
/// customer nothing.
pub fn patience_system(world: &mut World, events: &mut EventQueue, now: f64, dt: f32) {
    for (_, (id, lifecycle, patience, temper)) in
        world.query_mut::<(&CustomerId, &mut Lifecycle, &mut Patience, &Temper)>()
    {
        if !lifecycle.phase.accepts_delivery() {
            continue;
        }

        patience.elapsed += dt;

        // Hard timeout, regardless of unfulfilled items or current phase
        if patience.is_expired() {
            lifecycle.conclude(Outcome::Angry, now);
            events.push(SimEvent::OutcomeReached {
                customer: *id,
                outcome: Outcome::Angry,
                wrong_attempts: temper.wrong_attempts,
                wait_fraction: patience.fraction(),
            });
            continue;
        }

        if lifecycle.phase == Phase::Waiting && patience.elapsed >= patience.warning_point() {
            lifecycle.advance(Phase::Warning, now);
            events.push(SimEvent::WarningEntered { customer: *id });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn waiting_customer(world: &mut World, budget: f32) -> hecs::Entity {
        let mut lifecycle = Lifecycle::new(0.0);
        lifecycle.advance(Phase::Waiting, 0.0);
        world.spawn((
            CustomerId(1),
            lifecycle,
            Patience::new(budget, 0.25),
            Temper::new(3),
        ))
    }

    #[test]
    fn test_warning_then_angry() {
        let mut world = World::new();
        let mut events = EventQueue::new();
        let entity = waiting_customer(&mut world, 10.0);

        let mut now = 0.0;
        for _ in 0..14 {
            now += 0.5;
            patience_system(&mut world, &mut events, now, 0.5);
        }
        // 7.0s elapsed: still below the 7.5s warning point
        assert_eq!(world.get::<&Lifecycle>(entity).unwrap().phase, Phase::Waiting);

        now += 0.5;
        patience_system(&mut world, &mut events, now, 0.5);
        assert_eq!(world.get::<&Lifecycle>(entity).unwrap().phase, Phase::Warning);
        assert!(events
            .drain()
            .iter()
            .any(|e| matches!(e, SimEvent::WarningEntered { .. })));

        for _ in 0..5 {
            now += 0.5;
            patience_system(&mut world, &mut events, now, 0.5);
        }
        let lifecycle = *world.get::<&Lifecycle>(entity).unwrap();
        assert_eq!(lifecycle.phase, Phase::Angry);
        assert_eq!(lifecycle.outcome, Some(Outcome::Angry));

        let drained = events.drain();
        assert!(drained.iter().any(|e| matches!(
            e,
            SimEvent::OutcomeReached {
                outcome: Outcome::Angry,
                ..
            }
        )));
    }

    #[test]
    fn test_no_reverse_transition_from_warning() {
        let mut world = World::new();
        let mut events = EventQueue::new();
        let entity = waiting_customer(&mut world, 10.0);

        patience_system(&mut world, &mut events, 8.0, 8.0);
        assert_eq!(world.get::<&Lifecycle>(entity).unwrap().phase, Phase::Warning);

        // Another tick in Warning stays in Warning until the budget is gone
        patience_system(&mut world, &mut events, 9.0, 1.0);
        assert_eq!(world.get::<&Lifecycle>(entity).unwrap().phase, Phase::Warning);
    }

    #[test]
    fn test_timer_frozen_outside_counter_phases() {
        let mut world = World::new();
        let mut events = EventQueue::new();
        let entity = world.spawn((
            CustomerId(1),
            Lifecycle::new(0.0),
            Patience::new(10.0, 0.25),
            Temper::new(3),
        ));

        patience_system(&mut world, &mut events, 5.0, 5.0);

        // Still Entering: no wait time accrued
        assert_eq!(world.get::<&Patience>(entity).unwrap().elapsed, 0.0);
        assert!(events.is_empty());
    }

    #[test]
    fn test_giant_tick_goes_straight_to_angry() {
        let mut world = World::new();
        let mut events = EventQueue::new();
        let entity = waiting_customer(&mut world, 10.0);

        patience_system(&mut world, &mut events, 30.0, 30.0);

        assert_eq!(world.get::<&Lifecycle>(entity).unwrap().phase, Phase::Angry);
        // Timeout reports a full wait
        assert!(events.drain().iter().any(|e| matches!(
            e,
            SimEvent::OutcomeReached {
                wait_fraction,
                ..
            } if *wait_fraction == 1.0
        )));
    }
}
