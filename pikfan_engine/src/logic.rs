//! Logic module
//!
//! One fixed tick of the simulation. Each pass walks the mob list in order and turns world
//! conditions into direct mob changes or script events:
//!
//! 1. whistle growth
//! 2. deferred script events that are due
//! 3. per-mob physics, chasing, awareness and script timers ([`mobs`])
//! 4. Pikmin decisions: calls, latching, fighting, carrying ([`pikmin`])
//! 5. leaders, group movement and the cursor ([`leaders`])
//! 6. chomping and deaths
//! 7. deliveries ([`delivery`])
//! 8. removal of deleted mobs
//!
//! Mobs are addressed by index for the whole tick. Nothing is removed from the list before the
//! final cleanup, and mobs spawned during the tick are appended, so indices stay valid throughout.

pub mod delivery;
pub mod leaders;
pub mod mobs;
pub mod pikmin;

use log::debug;

use crate::scheduler::OnBlockedPolicy;
use crate::script::{EventType, has_event, run_event};
use crate::world::World;

/// Advance `world` by one tick.
pub fn tick(world: &mut World) {
    let dt = world.config.dt();
    world.fx.set_tick(world.tick);

    leaders::tick_whistle(world, dt);
    check_scheduled_events(world);
    for idx in 0..world.mobs.len() {
        mobs::tick_mob(world, idx, dt);
    }
    pikmin::tick_pikmin(world, dt);
    leaders::tick_leaders(world);
    mobs::tick_chomps(world);
    mobs::tick_deaths(world);
    delivery::tick_delivery(world);
    remove_deleted(world);

    world.tick += 1;
}

/// Fire every deferred event that is due this tick.
///
/// An event is dropped if its mob is gone, has left the state it was scheduled from, or no longer
/// handles it. If the mob is busy with another suspended event the entry's blocked policy decides.
pub fn check_scheduled_events(world: &mut World) {
    let now = world.tick;
    while let Some(due) = world.scheduler.pop_due(now) {
        let Some(event) = due.event else {
            continue;
        };
        let Some(idx) = world.index_of(due.mob) else {
            continue;
        };
        let mob = &world.mobs[idx];
        if mob.to_delete || mob.fsm.cur_state != Some(due.state) || !has_event(world, idx, event) {
            continue;
        }
        if mob.fsm.is_suspended() && event != EventType::Death {
            let retry_on = match due.on_blocked {
                OnBlockedPolicy::Cancel => {
                    debug!("scheduled {} for mob {} canceled (busy)", event.as_key(), due.mob);
                    continue;
                },
                OnBlockedPolicy::RetryAfter(ticks) => now.saturating_add(ticks.max(1)),
                OnBlockedPolicy::RetryNextTick => now.saturating_add(1),
            };
            world
                .scheduler
                .schedule_on_if(retry_on, due.mob, due.state, event, due.on_blocked, due.note);
            continue;
        }
        run_event(world, idx, event);
    }
}

/// Drop every mob flagged for deletion and rebuild the id lookup.
fn remove_deleted(world: &mut World) {
    let before = world.mobs.len();
    world.mobs.retain(|m| !m.to_delete);
    if world.mobs.len() != before {
        world.reindex();
        debug!("{} mob(s) removed on tick {}", before - world.mobs.len(), world.tick);
    }
}
