//! Leaders: the whistle, player movement, auto-pluck, group movement and the cursor.

use std::f32::consts::PI;

use log::{debug, info};

use crate::helpers::Point;
use crate::mob::{Activity, ChaseTarget};
use crate::mob_type::MobCategory;
use crate::party::{self, CURSOR_MAX_DIST};
use crate::world::World;

/// Stick input below this counts as no input.
const MOVE_DEAD_ZONE: f32 = 0.75;

/// Grow the whistle up to the current leader's range, then hold it there for a while.
pub fn tick_whistle(world: &mut World, dt: f32) {
    if !world.whistle.active {
        return;
    }
    let Some(range) = world
        .current_leader_idx()
        .and_then(|l| world.mobs[l].mob_type.kind.leader().map(|t| t.whistle_range))
    else {
        world.stop_whistling();
        return;
    };
    let whistle = &mut world.whistle;
    if whistle.radius < range {
        whistle.radius += world.config.whistle.growth_speed * dt;
        if whistle.radius >= range {
            whistle.radius = range;
            whistle.max_hold = world.config.whistle.max_hold_time;
        }
    } else {
        whistle.max_hold -= dt;
        if whistle.max_hold <= 0.0 {
            world.stop_whistling();
        }
    }
}

/// Run the leader pass.
pub fn tick_leaders(world: &mut World) {
    let Some(cur) = world.current_leader_idx() else {
        return;
    };
    carry_held_pikmin(world, cur);
    steer_current_leader(world, cur);

    for l in 0..world.mobs.len() {
        let leader = &world.mobs[l];
        if leader.category != MobCategory::Leader || leader.is_gone() {
            continue;
        }
        let whistled = l != cur
            && world.whistle.active
            && leader.pos.dist(world.cursor) <= world.whistle.radius
            && leader.following.is_none()
            && !leader.was_thrown;
        if whistled {
            join_party(world, cur, l);
        }
        auto_pluck(world, l);
    }

    move_group(world, cur);
    update_cursor(world, cur);
}

/// The Pikmin in the leader's hand sits just behind it.
fn carry_held_pikmin(world: &mut World, cur: usize) {
    let leader = &world.mobs[cur];
    let Some(held) = leader.holding.and_then(|id| world.index_of(id)) else {
        return;
    };
    let at = leader.pos + Point::from_angle(leader.angle + PI, leader.radius());
    let pik = &mut world.mobs[held];
    pik.pos = at;
    pik.z = 0.0;
    pik.speed = Point::ZERO;
}

/// Turn the movement input into a chase target just ahead of the leader.
fn steer_current_leader(world: &mut World, cur: usize) {
    let input = world.leader_move;
    let leader = &mut world.mobs[cur];
    if leader.auto_pluck_mode {
        return;
    }
    let mut intensity = input.length();
    if intensity < MOVE_DEAD_ZONE {
        intensity = 0.0;
    }
    if intensity == 0.0 {
        if leader.target.is_some() && leader.following.is_none() {
            leader.remove_target(true);
        }
        return;
    }
    let direction = input * (intensity.min(1.0) / input.length());
    leader.set_target(ChaseTarget::point(leader.pos + direction * leader.mob_type.move_speed));
}

/// The whistled leader `l` joins the current leader's party, bringing its own party along.
fn join_party(world: &mut World, cur: usize, l: usize) {
    let members: Vec<_> = world.mobs[l]
        .party
        .as_ref()
        .map(|p| p.members.clone())
        .unwrap_or_default();
    world.mobs[l].auto_pluck_mode = false;
    world.mobs[l].auto_pluck_target = None;
    party::add_to_party(world, cur, l);
    for id in members {
        if let Some(m) = world.index_of(id) {
            party::add_to_party(world, cur, m);
        }
    }
    info!(
        "leader '{}' joined '{}' with its party",
        world.mobs[l].name(),
        world.mobs[cur].name()
    );
}

/// Walk to the closest buried Pikmin, pluck it, and repeat until none are left in range.
fn auto_pluck(world: &mut World, l: usize) {
    let leader = &world.mobs[l];
    if !leader.auto_pluck_mode {
        if leader.auto_pluck_target.is_some() {
            let leader = &mut world.mobs[l];
            leader.auto_pluck_target = None;
            leader.remove_target(true);
        }
        return;
    }

    if let Some(target) = leader.auto_pluck_target {
        let reached = leader.reached_destination;
        match world.index_of(target) {
            Some(p) if world.mobs[p].activity == Activity::Buried => {
                if reached {
                    let top = leader.following.and_then(|id| world.index_of(id)).unwrap_or(l);
                    world.pluck(top, p);
                    world.mobs[l].auto_pluck_target = None;
                } else {
                    return;
                }
            },
            _ => world.mobs[l].auto_pluck_target = None,
        }
    }

    let radius = world.config.leader.auto_pluck_radius;
    let leader_pos = world.mobs[l].pos;
    let closest = world
        .mobs
        .iter()
        .filter(|m| m.category == MobCategory::Pikmin && m.activity == Activity::Buried && !m.is_gone())
        .filter(|m| m.z <= 0.0)
        .map(|m| (m.id, m.pos, m.pos.dist(leader_pos)))
        .filter(|(_, _, d)| *d <= radius)
        .min_by(|a, b| a.2.total_cmp(&b.2));

    let leader = &mut world.mobs[l];
    match closest {
        Some((id, pos, _)) => {
            leader.set_target(ChaseTarget::point(pos));
            leader.auto_pluck_target = Some(id);
        },
        None => {
            debug!("'{}' found nothing left to pluck", leader.name());
            leader.auto_pluck_mode = false;
            leader.remove_target(true);
        },
    }
}

/// Push the party center ahead of the leader while the group is being moved.
fn move_group(world: &mut World, cur: usize) {
    let input = world.group_move;
    let intensity = input.length().min(1.0);
    let was_moving = world.prev_group_intensity > 0.0;
    world.prev_group_intensity = intensity;
    if intensity > 0.0 {
        world.group_move_angle = input.y.atan2(input.x);
    }
    let angle = world.group_move_angle;

    let leader = &mut world.mobs[cur];
    let pos = leader.pos;
    let Some(party) = leader.party.as_mut() else {
        return;
    };
    if intensity > 0.0 {
        party.center = pos + Point::from_angle(angle, intensity * CURSOR_MAX_DIST);
    } else if was_moving {
        party.center = pos + Point::from_angle(angle, party.leader_to_center_dist());
    }
}

/// Keep the cursor within reach of the leader, and have the leader look at it.
fn update_cursor(world: &mut World, cur: usize) {
    let leader = &mut world.mobs[cur];
    let angle = leader.pos.angle_to(world.cursor);
    if leader.pos.dist(world.cursor) > CURSOR_MAX_DIST {
        world.cursor = leader.pos + Point::from_angle(angle, CURSOR_MAX_DIST);
    }
    if !leader.auto_pluck_mode && world.cursor != leader.pos {
        leader.face(angle);
    }
}
