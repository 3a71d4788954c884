//! Parties.
//!
//! A leader's party is the group of Pikmin (and other leaders) following it around. Members stand
//! on spots arranged in concentric wheels around a party center, which trails behind the leader
//! or is pushed ahead of it when the group is being moved.

use std::f32::consts::TAU;

use log::debug;

use crate::carry;
use crate::helpers::Point;
use crate::mob::{Activity, ChaseTarget, MobId};
use crate::mob_type::MobCategory;
use crate::world::World;

/// Seconds a mob that just left a party ignores whistles and touches.
pub const UNCALLABLE_PERIOD: f32 = 0.6;
/// Gap between neighbouring party spots.
pub const PARTY_SPOT_INTERVAL: f32 = 2.0;
/// Size of one party spot.
pub const PARTY_SPOT_RADIUS: f32 = 12.0;
/// Furthest the cursor can be from the current leader.
pub const CURSOR_MAX_DIST: f32 = 200.0;
/// Furthest a party member can be from the leader and still be grabbed for a throw.
pub const MIN_GRAB_RANGE: f32 = 64.0;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Party {
    /// Member `i` stands on spot `i`.
    pub members: Vec<MobId>,
    pub center: Point,
}

impl Party {
    pub fn new(center: Point) -> Party {
        Party {
            members: Vec::new(),
            center,
        }
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    pub fn contains(&self, id: MobId) -> bool {
        self.members.contains(&id)
    }

    /// Wheel of the outermost occupied spot.
    pub fn current_wheel(&self) -> usize {
        self.members.len().checked_sub(1).map_or(0, |last| spot_wheel(last).0)
    }

    /// How far the party center sits from the leader when the group isn't being moved.
    #[allow(clippy::cast_precision_loss)]
    pub fn leader_to_center_dist(&self) -> f32 {
        let wheels = (self.current_wheel() + 1) as f32;
        wheels * PARTY_SPOT_RADIUS + wheels * PARTY_SPOT_INTERVAL
    }
}

/// Number of spots on wheel `w`. Wheel 0 is the single center spot.
#[allow(clippy::cast_precision_loss, clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn spots_on_wheel(w: usize) -> usize {
    if w == 0 {
        return 1;
    }
    let diameter = PARTY_SPOT_RADIUS + PARTY_SPOT_INTERVAL;
    let from_center = diameter * w as f32;
    let middle = (from_center * from_center - (diameter * 0.5) * (diameter * 0.5)).sqrt();
    let angular = 2.0 * diameter.atan2(2.0 * middle);
    // Nudged so an exact fit isn't lost to rounding.
    ((TAU / angular + 1e-3).floor() as usize).max(1)
}

/// `(wheel, index on that wheel)` of spot number `n`.
fn spot_wheel(n: usize) -> (usize, usize) {
    let mut w = 0;
    let mut first = 0;
    loop {
        let count = spots_on_wheel(w);
        if n < first + count {
            return (w, n - first);
        }
        first += count;
        w += 1;
    }
}

/// Offset of spot number `n` from the party center.
#[allow(clippy::cast_precision_loss)]
pub fn spot_offset(n: usize) -> Point {
    let (w, s) = spot_wheel(n);
    if w == 0 {
        return Point::ZERO;
    }
    let from_center = (PARTY_SPOT_RADIUS + PARTY_SPOT_INTERVAL) * w as f32;
    Point::from_angle(TAU / spots_on_wheel(w) as f32 * s as f32, from_center)
}

/// Add the mob at `member` to the party of the leader at `leader`.
pub fn add_to_party(world: &mut World, leader: usize, member: usize) {
    let leader_id = world.mobs[leader].id;
    if world.mobs[member].following == Some(leader_id) || leader == member {
        return;
    }
    if world.mobs[member].following.is_some() {
        remove_from_party(world, member);
    }
    let member_id = world.mobs[member].id;
    let Some(party) = world.mobs[leader].party.as_mut() else {
        return;
    };
    party.members.push(member_id);
    let offset = spot_offset(party.members.len() - 1);

    carry::make_uncarriable(world, member);
    let mob = &mut world.mobs[member];
    mob.following = Some(leader_id);
    mob.set_target(ChaseTarget::party_center(leader_id, offset));
    if mob.category == MobCategory::Pikmin {
        mob.set_activity(Activity::InGroup);
    }
    debug!("'{}' joined the party of leader {leader_id}", mob.name());
}

/// Take the mob at `member` out of whatever party it is in. The outermost member takes over its
/// spot so the wheels stay packed.
pub fn remove_from_party(world: &mut World, member: usize) {
    let member_id = world.mobs[member].id;
    let Some(leader) = world.mobs[member].following.and_then(|id| world.index_of(id)) else {
        leave(world, member);
        return;
    };
    let leader_id = world.mobs[leader].id;
    let moved = world.mobs[leader].party.as_mut().and_then(|party| {
        let pos = party.members.iter().position(|m| *m == member_id)?;
        party.members.swap_remove(pos);
        party.members.get(pos).map(|moved| (*moved, pos))
    });
    if let Some((moved, pos)) = moved
        && let Some(m) = world.index_of(moved)
    {
        world.mobs[m].set_target(ChaseTarget::party_center(leader_id, spot_offset(pos)));
    }
    leave(world, member);
}

fn leave(world: &mut World, member: usize) {
    let mob = &mut world.mobs[member];
    mob.following = None;
    mob.remove_target(false);
    mob.uncallable_period = UNCALLABLE_PERIOD;
    if mob.activity == Activity::InGroup {
        mob.set_activity(Activity::Idle);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_ring_has_six_spots() {
        assert_eq!(spots_on_wheel(0), 1);
        assert_eq!(spots_on_wheel(1), 6);
        assert!(spots_on_wheel(2) > 6);
        assert_eq!(spot_wheel(0), (0, 0));
        assert_eq!(spot_wheel(1), (1, 0));
        assert_eq!(spot_wheel(6), (1, 5));
        assert_eq!(spot_wheel(7), (2, 0));
    }

    #[test]
    fn spots_are_spread_around_the_center() {
        assert_eq!(spot_offset(0), Point::ZERO);
        let ring: Vec<Point> = (1..7).map(spot_offset).collect();
        for p in &ring {
            assert!((p.length() - (PARTY_SPOT_RADIUS + PARTY_SPOT_INTERVAL)).abs() < 1e-3);
        }
        assert!(ring[0].dist(ring[1]) > PARTY_SPOT_RADIUS);
    }

    #[test]
    fn center_distance_grows_with_wheels() {
        let mut party = Party::new(Point::ZERO);
        let one = party.leader_to_center_dist();
        assert!((one - (PARTY_SPOT_RADIUS + PARTY_SPOT_INTERVAL)).abs() < 1e-4);
        party.members = (0..8).map(|_| crate::idgen::new_id()).collect();
        assert_eq!(party.current_wheel(), 2);
        assert!(party.leader_to_center_dist() > one);
    }
}
