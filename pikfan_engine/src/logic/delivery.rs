//! Deliveries: carried mobs arriving at an Onion or the ship get sucked in and turned into
//! rewards.

use std::sync::Arc;

use log::{info, warn};

use crate::carry;
use crate::fx::{Fx, ParticleKind};
use crate::mob::Activity;
use crate::mob_type::{MobCategory, MobKind};
use crate::world::World;

const DELIVERY_SMOKE: u32 = 6;

/// Run the delivery pass.
pub fn tick_delivery(world: &mut World) {
    let suck_time = world.config.simulation.delivery_suck_time;
    for idx in 0..world.mobs.len() {
        let mob = &world.mobs[idx];
        if mob.to_delete {
            continue;
        }
        match mob.activity {
            Activity::BeingCarried if mob.reached_destination => {
                let has_destination = mob
                    .carrier_info
                    .as_ref()
                    .is_some_and(|i| i.carry_to_ship || i.decided_type.is_some());
                if has_destination {
                    let mob = &mut world.mobs[idx];
                    mob.remove_target(true);
                    mob.set_activity(Activity::BeingDelivered);
                    info!("'{}' is being delivered", mob.name());
                }
            },
            Activity::BeingDelivered if mob.time_in_activity >= suck_time => deliver(world, idx),
            _ => {},
        }
    }
}

/// Hand out the rewards for the mob at `idx` and take it out of play.
fn deliver(world: &mut World, idx: usize) {
    let mob = &world.mobs[idx];
    let decided = mob.carrier_info.as_ref().and_then(|i| i.decided_type.clone());
    let at = mob.pos;
    let name = mob.name().to_string();
    let mob_type = Arc::clone(&mob.mob_type);

    match (&mob_type.kind, decided) {
        (MobKind::Pellet(pellet), Some(onion_type)) => {
            let seeds = if pellet.pikmin_type == onion_type {
                pellet.match_seeds
            } else {
                pellet.non_match_seeds
            };
            carry::give_to_onion(world, &onion_type, seeds);
        },
        (MobKind::Enemy(enemy), Some(onion_type)) => {
            let seeds = enemy.pikmin_seeds;
            carry::give_to_onion(world, &onion_type, seeds);
        },
        (MobKind::Treasure { value }, _) => {
            world.ship_collected += *value;
            info!("treasure '{name}' worth {value} collected ({} total)", world.ship_collected);
        },
        (_, decided) => warn!("'{name}' was delivered with nothing to give (destination {decided:?})"),
    }

    world.fx.push(Fx::Particles {
        kind: ParticleKind::Smoke,
        at,
        count: DELIVERY_SMOKE,
    });
    carry::make_uncarriable(world, idx);

    let mob = &mut world.mobs[idx];
    if mob.category == MobCategory::Leader {
        mob.health.restore();
        mob.dead = false;
        mob.set_activity(Activity::Idle);
    } else {
        mob.to_delete = true;
    }
    info!("'{name}' delivered");
}
