//! Carrying.
//!
//! Pellets, treasures and enemy corpses can be carried by Pikmin. A carriable mob has a ring of
//! carrier spots around it. A Pikmin first reserves a free spot and walks to it; only once it gets
//! there does it count as a carrier and add its strength. When the carriers' combined strength
//! reaches the mob's weight the mob starts moving towards an Onion (or the ship).

use std::collections::BTreeMap;
use std::f32::consts::TAU;

use log::{debug, info, warn};
use rand::Rng;

use crate::helpers::Point;
use crate::mob::{Activity, ChaseTarget, MobId};
use crate::mob_type::MobCategory;
use crate::world::World;

/// Carrying speed with no carriers, as a fraction of the full-crew speed.
pub const CARRY_SPEED_BASE_MULT: f32 = 0.5;
/// Global slowdown for carrying compared to walking.
pub const CARRY_SPEED_MAX_MULT: f32 = 0.8;
/// Slowdown per unit of weight.
pub const CARRY_SPEED_WEIGHT_MULT: f32 = 0.0004;
/// Gap left between the ship's hull and a delivered treasure.
const SHIP_DROP_MARGIN: f32 = 8.0;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum CarrySpot {
    #[default]
    Free,
    /// A Pikmin is on its way.
    Reserved(MobId),
    /// A Pikmin is holding on.
    Used(MobId),
}

impl CarrySpot {
    pub fn pikmin(self) -> Option<MobId> {
        match self {
            CarrySpot::Free => None,
            CarrySpot::Reserved(id) | CarrySpot::Used(id) => Some(id),
        }
    }
}

/// Carrying bookkeeping of a carriable mob.
#[derive(Debug, Clone, PartialEq)]
pub struct CarrierInfo {
    pub spots: Vec<CarrySpot>,
    /// Position of each spot relative to the carried mob's center.
    pub spot_offsets: Vec<Point>,
    /// Combined strength of the Pikmin in `Used` spots.
    pub strength: f32,
    pub n_carriers: usize,
    pub carry_to_ship: bool,
    /// Pikmin type whose Onion the mob is headed for.
    pub decided_type: Option<String>,
}

impl CarrierInfo {
    pub fn new(max_carriers: usize, radius: f32, carry_to_ship: bool) -> CarrierInfo {
        let max = max_carriers.max(1);
        #[allow(clippy::cast_precision_loss)]
        let spot_offsets = (0..max)
            .map(|c| Point::from_angle(TAU / max as f32 * c as f32, radius))
            .collect();
        CarrierInfo {
            spots: vec![CarrySpot::Free; max],
            spot_offsets,
            strength: 0.0,
            n_carriers: 0,
            carry_to_ship,
            decided_type: None,
        }
    }

    pub fn is_full(&self) -> bool {
        !self.spots.contains(&CarrySpot::Free)
    }

    pub fn is_empty(&self) -> bool {
        self.spots.iter().all(|s| *s == CarrySpot::Free)
    }

    /// Every Pikmin holding or reserving a spot.
    pub fn pikmin(&self) -> impl Iterator<Item = MobId> + '_ {
        self.spots.iter().filter_map(|s| s.pikmin())
    }

    fn spot_of(&self, pikmin: MobId) -> Option<usize> {
        self.spots.iter().position(|s| s.pikmin() == Some(pikmin))
    }
}

/// Give the mob at `idx` carrier spots, destined for an Onion or for the ship.
pub fn make_carriable(world: &mut World, idx: usize, to_ship: bool) {
    let mob = &mut world.mobs[idx];
    mob.carrier_info = Some(CarrierInfo::new(mob.mob_type.max_carriers, mob.radius(), to_ship));
}

/// Take away the mob's carrier spots, sending any carriers back to idling.
pub fn make_uncarriable(world: &mut World, idx: usize) {
    let Some(info) = world.mobs[idx].carrier_info.take() else {
        return;
    };
    for id in info.pikmin() {
        if let Some(p) = world.index_of(id) {
            release_carrier(world, p);
        }
    }
}

fn release_carrier(world: &mut World, p: usize) {
    let pik = &mut world.mobs[p];
    pik.carrying = None;
    pik.wants_to_carry = None;
    pik.remove_target(true);
    pik.set_activity(Activity::Idle);
}

/// Reserve a random free spot on the mob at `target` for the Pikmin at `pik` and send the Pikmin
/// towards it. Returns false if every spot is taken.
pub fn claim_spot(world: &mut World, pik: usize, target: usize) -> bool {
    let pik_id = world.mobs[pik].id;
    let target_id = world.mobs[target].id;
    let free: Vec<usize> = match &world.mobs[target].carrier_info {
        Some(info) => (0..info.spots.len()).filter(|s| info.spots[*s] == CarrySpot::Free).collect(),
        None => return false,
    };
    if free.is_empty() {
        return false;
    }
    let spot = free[world.rng.random_range(0..free.len())];
    let Some(info) = world.mobs[target].carrier_info.as_mut() else {
        return false;
    };
    info.spots[spot] = CarrySpot::Reserved(pik_id);
    let offset = info.spot_offsets[spot];

    let pikmin = &mut world.mobs[pik];
    pikmin.wants_to_carry = Some(target_id);
    pikmin.carrying_spot = spot;
    pikmin.set_target(ChaseTarget::mob(target_id, offset, false));
    pikmin.set_activity(Activity::MovingToCarrySpot);
    true
}

/// The Pikmin at `pik` has reached its reserved spot: it starts holding on and adds its strength.
/// If that is enough to lift the mob, carrying begins right away.
pub fn arrive_at_spot(world: &mut World, pik: usize) {
    let pik_id = world.mobs[pik].id;
    let strength = world.mobs[pik].mob_type.kind.pikmin().map_or(0.0, |t| t.carry_strength);
    let Some(target) = world.mobs[pik].wants_to_carry.and_then(|id| world.index_of(id)) else {
        release_carrier(world, pik);
        return;
    };
    let target_id = world.mobs[target].id;
    let weight = world.mobs[target].mob_type.weight;
    let spot = world.mobs[pik].carrying_spot;

    let Some(info) = world.mobs[target].carrier_info.as_mut() else {
        release_carrier(world, pik);
        return;
    };
    if info.spots.get(spot) != Some(&CarrySpot::Reserved(pik_id)) {
        release_carrier(world, pik);
        return;
    }
    info.spots[spot] = CarrySpot::Used(pik_id);
    info.strength += strength;
    info.n_carriers += 1;
    let offset = info.spot_offsets[spot];
    let total = info.strength;

    let pikmin = &mut world.mobs[pik];
    pikmin.wants_to_carry = None;
    pikmin.carrying = Some(target_id);
    pikmin.set_target(ChaseTarget::mob(target_id, offset, true));
    pikmin.set_activity(Activity::Carrying);
    debug!("carrier arrived at spot {spot}: strength {total}/{weight}");

    if total >= weight {
        start_carrying(world, target, Some(pik), None);
    }
}

/// The Pikmin at `pik` lets go of whatever it carries or was heading to carry.
///
/// If the remaining strength no longer covers the weight the mob stops; otherwise its destination
/// is re-evaluated without the leaver.
pub fn drop_carried(world: &mut World, pik: usize) {
    let pik_id = world.mobs[pik].id;
    let was_carrying = world.mobs[pik].carrying.is_some();
    let target = world.mobs[pik]
        .carrying
        .or(world.mobs[pik].wants_to_carry)
        .and_then(|id| world.index_of(id));
    release_carrier(world, pik);
    let Some(target) = target else {
        return;
    };
    let strength = world.mobs[pik].mob_type.kind.pikmin().map_or(0.0, |t| t.carry_strength);
    let weight = world.mobs[target].mob_type.weight;

    let Some(info) = world.mobs[target].carrier_info.as_mut() else {
        return;
    };
    let Some(spot) = info.spot_of(pik_id) else {
        return;
    };
    info.spots[spot] = CarrySpot::Free;
    if !was_carrying {
        return;
    }
    info.strength = (info.strength - strength).max(0.0);
    info.n_carriers = info.n_carriers.saturating_sub(1);

    if info.strength < weight {
        info.decided_type = None;
        let mob = &mut world.mobs[target];
        if mob.activity == Activity::BeingCarried {
            debug!("'{}' dropped: not enough strength", mob.name());
            mob.remove_target(true);
            mob.set_activity(Activity::Idle);
        }
    } else {
        start_carrying(world, target, None, Some(pik));
    }
}

/// Pick a destination for the mob at `idx` and start moving it there.
///
/// `joined` / `left` are the carrier whose arrival or departure prompted the call; they decide
/// whether a tie between Pikmin types is new (and re-rolled) or old (and kept).
pub fn start_carrying(world: &mut World, idx: usize, joined: Option<usize>, left: Option<usize>) {
    let Some(info) = world.mobs[idx].carrier_info.as_ref() else {
        return;
    };
    if world.mobs[idx].activity == Activity::BeingDelivered {
        return;
    }

    let destination = if info.carry_to_ship {
        let Some(ship) = world.mobs.iter().position(|m| m.category == MobCategory::Ship && !m.is_gone()) else {
            warn!("'{}' is bound for the ship, but there is no ship", world.mobs[idx].name());
            return;
        };
        let ship = &world.mobs[ship];
        let dest = Point::new(
            ship.pos.x + ship.radius() + world.mobs[idx].radius() + SHIP_DROP_MARGIN,
            ship.pos.y,
        );
        if let Some(info) = world.mobs[idx].carrier_info.as_mut() {
            info.decided_type = None;
        }
        dest
    } else {
        let Some(decided) = decide_onion_type(world, idx, joined, left) else {
            warn!("'{}' has no Onion to go to", world.mobs[idx].name());
            return;
        };
        let Some(onion) = find_onion(world, &decided) else {
            warn!("no Onion in the area for pikmin type '{decided}'");
            return;
        };
        let dest = world.mobs[onion].pos;
        if let Some(info) = world.mobs[idx].carrier_info.as_mut() {
            info.decided_type = Some(decided);
        }
        dest
    };

    let mob = &mut world.mobs[idx];
    if mob.activity != Activity::BeingCarried {
        info!("'{}' is being carried to ({:.0}, {:.0})", mob.name(), destination.x, destination.y);
    }
    mob.set_target(ChaseTarget::point(destination));
    mob.set_activity(Activity::BeingCarried);
}

/// Pikmin type the carried mob should be delivered to, by majority among its carriers.
fn decide_onion_type(world: &mut World, idx: usize, joined: Option<usize>, left: Option<usize>) -> Option<String> {
    let info = world.mobs[idx].carrier_info.as_ref()?;

    // Carriers per type, counting only types with an Onion here.
    let mut counts: BTreeMap<String, usize> = BTreeMap::new();
    for spot in &info.spots {
        let CarrySpot::Used(id) = spot else {
            continue;
        };
        let Some(p) = world.index_of(*id) else {
            continue;
        };
        let type_name = &world.mobs[p].mob_type.name;
        if find_onion(world, type_name).is_some() {
            *counts.entry(type_name.clone()).or_default() += 1;
        }
    }
    let most = counts.values().copied().max().unwrap_or(0);
    let mut majority: Vec<String> = counts.into_iter().filter(|(_, n)| *n == most).map(|(t, _)| t).collect();

    if majority.is_empty() {
        majority = onion_types(world);
    }
    let previous = info.decided_type.clone();

    match majority.len() {
        0 => None,
        1 => majority.pop(),
        _ => {
            let is_majority = |p: Option<usize>| {
                p.is_some_and(|p| majority.iter().any(|t| *t == world.mobs[p].mob_type.name))
            };
            let mut new_tie = is_majority(joined);
            if left.is_some() {
                new_tie = is_majority(left);
            }
            let previous = previous.filter(|t| majority.contains(t));
            match previous {
                Some(prev) if !new_tie => Some(prev),
                _ => {
                    let pick = world.rng.random_range(0..majority.len());
                    Some(majority.swap_remove(pick))
                },
            }
        },
    }
}

/// Index of a live Onion for the given Pikmin type.
pub fn find_onion(world: &World, pikmin_type: &str) -> Option<usize> {
    world
        .mobs
        .iter()
        .position(|m| !m.is_gone() && m.mob_type.kind.onion_type() == Some(pikmin_type))
}

/// Pikmin types that have an Onion in the area, sorted.
fn onion_types(world: &World) -> Vec<String> {
    let mut types: Vec<String> = world
        .mobs
        .iter()
        .filter(|m| !m.is_gone())
        .filter_map(|m| m.mob_type.kind.onion_type().map(str::to_string))
        .collect();
    types.sort();
    types.dedup();
    types
}

/// Speed the carried mob at `idx` moves at with its current crew.
pub fn carry_speed(world: &World, idx: usize) -> f32 {
    let mob = &world.mobs[idx];
    let Some(info) = mob.carrier_info.as_ref() else {
        return 0.0;
    };
    let speeds: Vec<f32> = info
        .spots
        .iter()
        .filter_map(|s| match s {
            CarrySpot::Used(id) => world.index_of(*id).map(|p| world.mobs[p].mob_type.move_speed),
            _ => None,
        })
        .collect();
    if speeds.is_empty() {
        return 0.0;
    }
    #[allow(clippy::cast_precision_loss)]
    let (n, max) = (speeds.len() as f32, info.spots.len() as f32);
    let max_speed =
        speeds.iter().sum::<f32>() / n * (1.0 - CARRY_SPEED_WEIGHT_MULT * mob.mob_type.weight) * CARRY_SPEED_MAX_MULT;
    max_speed * (CARRY_SPEED_BASE_MULT + n / max * (1.0 - CARRY_SPEED_BASE_MULT))
}

/// Hand `seeds` new Pikmin to the Onion of `pikmin_type`. Sprouts are spat out up to the field
/// limit; the rest are stored inside the Onion.
pub fn give_to_onion(world: &mut World, pikmin_type: &str, seeds: u32) {
    let Some(onion) = find_onion(world, pikmin_type) else {
        warn!("no Onion for pikmin type '{pikmin_type}', {seeds} seeds lost");
        return;
    };
    let in_field = world.pikmin_count();
    let room = world.config.pikmin.max_in_field.saturating_sub(in_field);
    let spit = seeds.min(u32::try_from(room).unwrap_or(u32::MAX));
    let stored = seeds - spit;
    let at = world.mobs[onion].pos;
    for _ in 0..spit {
        world.spit_seed(pikmin_type, at);
    }
    if stored > 0 {
        *world.pikmin_in_onions.entry(pikmin_type.to_string()).or_default() += stored;
    }
    info!("Onion '{pikmin_type}' received {seeds} seeds ({spit} sprouted, {stored} stored)");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn spots_ring_the_mob() {
        let info = CarrierInfo::new(4, 10.0, false);
        assert_eq!(info.spots.len(), 4);
        assert!((info.spot_offsets[0].x - 10.0).abs() < 1e-4);
        assert!((info.spot_offsets[1].y - 10.0).abs() < 1e-4);
        assert!(info.is_empty());
        assert!(!info.is_full());
    }

    #[test]
    fn spot_states() {
        let mut info = CarrierInfo::new(2, 5.0, true);
        let a = crate::idgen::new_id();
        let b = crate::idgen::new_id();
        info.spots[0] = CarrySpot::Reserved(a);
        info.spots[1] = CarrySpot::Used(b);
        assert!(info.is_full());
        assert_eq!(info.spot_of(b), Some(1));
        assert_eq!(info.pikmin().collect::<Vec<_>>(), vec![a, b]);
    }
}
