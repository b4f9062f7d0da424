//! Transit system: the walk in, the walk out, and the despawn at the end.

use hecs::{Entity, World};

use crate::components::{CustomerId, Lifecycle, Outcome, Phase, ServedAt};
use crate::config::SimConfig;

/// A visit that finished this tick: who, where, and how it went.
#[derive(Debug, Clone, Copy)]
pub struct Departure {
    pub entity: Entity,
    pub customer: CustomerId,
    pub counter: u32,
    pub outcome: Outcome,
}

/// Move customers through the non-blocking transit phases. Counter
/// occupancy is held through the entire walk; only the returned
/// departures give a counter back. The engine despawns them and records
/// their outcomes in the same tick.
pub fn transit_system(world: &mut World, config: &SimConfig, now: f64) -> Vec<Departure> {
    let mut departures = Vec::new();

    for (entity, (id, lifecycle, served_at)) in
        world.query_mut::<(&CustomerId, &mut Lifecycle, &ServedAt)>()
    {
        match lifecycle.phase {
            Phase::Entering => {
                if lifecycle.elapsed_in_phase(now) >= config.enter_duration as f64 {
                    // The order was frozen at spawn; Ordering is only the
                    // moment it becomes visible, so it gates nothing.
                    lifecycle.advance(Phase::Ordering, now);
                    lifecycle.advance(Phase::Waiting, now);
                }
            }
            Phase::Satisfied | Phase::Angry => {
                lifecycle.advance(Phase::Exiting, now);
            }
            Phase::Exiting => {
                let duration = match lifecycle.outcome {
                    Some(Outcome::Angry) => config.exit_duration * config.angry_exit_factor,
                    _ => config.exit_duration,
                };
                if lifecycle.elapsed_in_phase(now) >= duration as f64 {
                    lifecycle.advance(Phase::Terminated, now);
                    if let Some(outcome) = lifecycle.outcome {
                        departures.push(Departure {
                            entity,
                            customer: *id,
                            counter: served_at.counter,
                            outcome,
                        });
                    }
                }
            }
            _ => {}
        }
    }

    departures
}
