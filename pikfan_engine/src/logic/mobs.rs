//! Per-mob tick: physics, chasing, turning, opponent awareness, script timers and animation.
//! Also the chomp and death passes that run once all mobs have moved.

use std::sync::Arc;

use log::{debug, trace};

use crate::carry;
use crate::fx::{Fx, ParticleKind};
use crate::helpers::{Point, move_point, turn_towards};
use crate::mob::{Activity, Anchor, MobId};
use crate::mob_type::{MobCategory, should_attack};
use crate::party;
use crate::script::{self, EventType, has_event, run_event};
use crate::world::World;

/// Distance at which a walking mob counts as having arrived.
const REACH_RADIUS: f32 = 0.5;

/// Advance the mob at `idx` by `dt` seconds.
pub fn tick_mob(world: &mut World, idx: usize, dt: f32) {
    if world.mobs[idx].to_delete {
        return;
    }
    let mob_type = Arc::clone(&world.mobs[idx].mob_type);
    let gravity = world.config.simulation.gravity;

    // Movement and gravity.
    let mob = &mut world.mobs[idx];
    let was_airborne = mob.z > 0.0;
    mob.pos += mob.speed * dt;
    mob.z += mob.speed_z * dt;
    mob.just_landed = false;
    if was_airborne && mob.z <= 0.0 {
        mob.z = 0.0;
        mob.speed = Point::ZERO;
        mob.speed_z = 0.0;
        mob.was_thrown = false;
        mob.just_landed = true;
    }
    if mob.z > 0.0 && mob.affected_by_gravity {
        mob.speed_z += gravity * dt;
    }

    chase(world, idx);

    let mob = &mut world.mobs[idx];
    mob.uncallable_period = (mob.uncallable_period - dt).max(0.0);
    mob.time_in_activity += dt;

    follow_leader(world, idx, dt);

    let mob = &mut world.mobs[idx];
    mob.angle = turn_towards(mob.angle, mob.intended_angle, mob_type.rotation_speed * dt);

    script::tick_wait(world, idx, dt);
    check_opponents(world, idx);
    check_timer(world, idx, dt);

    let mob = &mut world.mobs[idx];
    if mob.reached_destination && mob.target_is_home {
        mob.target_is_home = false;
        run_event(world, idx, EventType::ReachHome);
    }

    if world.mobs[idx].anim.tick(dt, &mob_type.animations) {
        script::on_animation_finished(world, idx);
        run_event(world, idx, EventType::AnimationEnd);
    }
}

/// Where the mob's chase target currently is, or `None` if its anchor is gone.
fn target_pos(world: &World, idx: usize) -> Option<Point> {
    let target = world.mobs[idx].target?;
    match target.anchor {
        Anchor::Fixed => Some(target.offset),
        Anchor::Mob(id) => world.mob(id).map(|m| m.pos + target.offset),
        Anchor::PartyCenter(leader) => world
            .mob(leader)
            .and_then(|l| l.party.as_ref())
            .map(|p| p.center + target.offset),
    }
}

/// Steer towards the chase target. Airborne mobs keep their momentum.
fn chase(world: &mut World, idx: usize) {
    let mob = &world.mobs[idx];
    if mob.speed_z != 0.0 {
        return;
    }
    let Some(target) = mob.target else {
        if mob.z <= 0.0 {
            world.mobs[idx].speed = Point::ZERO;
        }
        return;
    };
    let Some(dest) = target_pos(world, idx) else {
        trace!("'{}' lost its chase target", mob.name());
        world.mobs[idx].remove_target(true);
        return;
    };
    let speed = if mob.activity == Activity::BeingCarried {
        carry::carry_speed(world, idx)
    } else {
        mob.mob_type.move_speed * mob.speed_multiplier
    };
    let fps = world.config.simulation.game_fps;

    let mob = &mut world.mobs[idx];
    if target.instant {
        mob.pos = dest;
        mob.speed = Point::ZERO;
        mob.reached_destination = true;
        return;
    }
    let movement = move_point(mob.pos, dest, speed, REACH_RADIUS, fps);
    mob.speed = movement.velocity;
    mob.reached_destination = movement.reached;
    if let Some(angle) = movement.angle {
        mob.face(angle);
    }
}

/// Leaders drag their party center along; members that reached their spot look at the leader.
fn follow_leader(world: &mut World, idx: usize, dt: f32) {
    let fps = world.config.simulation.game_fps;
    let mob = &mut world.mobs[idx];
    if let Some(party) = mob.party.as_mut() {
        let reach = party.leader_to_center_dist();
        let movement = move_point(party.center, mob.pos, mob.mob_type.move_speed, reach, fps);
        party.center += movement.velocity * dt;
    }

    let mob = &world.mobs[idx];
    if mob.reached_destination
        && let Some(leader) = mob.following.and_then(|id| world.mob(id))
    {
        let angle = mob.pos.angle_to(leader.pos);
        world.mobs[idx].face(angle);
    }
}

/// Notice, approach and lose opponents.
fn check_opponents(world: &mut World, idx: usize) {
    let mob = &world.mobs[idx];
    let (sight, near) = (mob.mob_type.sight_radius, mob.mob_type.near_radius);

    if let Some(focus) = mob.focused_opponent {
        let opponent = world.mob(focus).filter(|o| !o.is_gone()).map(|o| o.pos);
        let dist = opponent.map(|p| mob.pos.dist(p));
        match dist {
            Some(d) if d <= sight => {
                if !mob.opponent_near && d <= near {
                    world.mobs[idx].opponent_near = true;
                    run_event(world, idx, EventType::NearOpponent);
                } else if mob.opponent_near && d > near {
                    world.mobs[idx].opponent_near = false;
                }
            },
            _ => {
                let mob = &mut world.mobs[idx];
                mob.focused_opponent = None;
                mob.opponent_near = false;
                run_event(world, idx, EventType::LoseOpponent);
            },
        }
        return;
    }

    if !has_event(world, idx, EventType::SeeOpponent) {
        return;
    }
    let seen = first_visible(world, idx, MobCategory::Pikmin).or_else(|| first_visible(world, idx, MobCategory::Leader));
    if let Some(seen) = seen {
        world.mobs[idx].focused_opponent = Some(seen);
        run_event(world, idx, EventType::SeeOpponent);
    }
}

/// First mob of `category` within sight that the mob at `idx` would attack.
fn first_visible(world: &World, idx: usize, category: MobCategory) -> Option<MobId> {
    let mob = &world.mobs[idx];
    world
        .mobs
        .iter()
        .filter(|o| o.category == category && !o.is_gone() && o.activity != Activity::Buried)
        .find(|o| o.pos.dist(mob.pos) <= mob.mob_type.sight_radius && should_attack(mob.team, o.team))
        .map(|o| o.id)
}

/// Count down the script timer and fire `on_timer` when it runs out.
fn check_timer(world: &mut World, idx: usize, dt: f32) {
    if !has_event(world, idx, EventType::Timer) {
        return;
    }
    let mob = &mut world.mobs[idx];
    if mob.timer_interval <= 0.0 || mob.timer <= 0.0 {
        return;
    }
    mob.timer -= dt;
    if mob.timer <= 0.0 {
        mob.timer = mob.timer_interval;
        run_event(world, idx, EventType::Timer);
    }
}

/// Grab Pikmin touching a live chomp hitbox, and carry the ones already grabbed along.
pub fn tick_chomps(world: &mut World) {
    for idx in 0..world.mobs.len() {
        let mob = &world.mobs[idx];
        if mob.is_gone() || mob.chomp_hitboxes.is_empty() {
            continue;
        }
        let max_chomp = mob.mob_type.kind.enemy().map_or(0, |e| e.max_chomp);
        let db = &mob.mob_type.animations;
        let active = mob.anim.active_hitboxes(db);
        let mouths: Vec<(Point, f32)> = mob
            .chomp_hitboxes
            .iter()
            .filter(|h| active.contains(h))
            .filter_map(|h| db.hitboxes.get(*h))
            .map(|h| (h.world_pos(mob.pos, mob.angle), h.radius))
            .collect();
        let Some(&(mouth, _)) = mouths.first() else {
            continue;
        };

        let mut grabbed = Vec::new();
        let mut room = max_chomp.saturating_sub(mob.chomping.len());
        for (p, pik) in world.mobs.iter().enumerate() {
            if room == 0 {
                break;
            }
            if pik.category != MobCategory::Pikmin
                || pik.is_gone()
                || matches!(pik.activity, Activity::Buried | Activity::Grabbed)
            {
                continue;
            }
            if mouths.iter().any(|(at, r)| pik.pos.dist(*at) <= pik.radius() + r) {
                grabbed.push(p);
                room -= 1;
            }
        }
        for p in grabbed {
            grab(world, idx, p);
        }

        let victims = world.mobs[idx].chomping.clone();
        for id in victims {
            if let Some(v) = world.mob_mut(id) {
                v.pos = mouth;
                v.z = 0.0;
            }
        }
    }
}

fn grab(world: &mut World, chomper: usize, p: usize) {
    carry::drop_carried(world, p);
    party::remove_from_party(world, p);
    let id = world.mobs[p].id;
    let pik = &mut world.mobs[p];
    pik.attacking = None;
    pik.latched = false;
    pik.remove_target(true);
    pik.speed_z = 0.0;
    pik.set_activity(Activity::Grabbed);
    debug!("'{}' grabbed by '{}'", world.mobs[p].name(), world.mobs[chomper].name());
    world.mobs[chomper].chomping.push(id);
}

/// Give `on_death` to every mob whose health ran out this tick. Dead Pikmin are removed; other
/// mobs stay for their death script to deal with.
pub fn tick_deaths(world: &mut World) {
    for idx in 0..world.mobs.len() {
        let mob = &world.mobs[idx];
        if mob.is_gone() || mob.health.current_hp() > 0.0 {
            continue;
        }
        world.mobs[idx].dead = true;
        debug!("'{}' ({}) died", world.mobs[idx].name(), world.mobs[idx].id);

        if world.mobs[idx].category == MobCategory::Pikmin {
            kill_pikmin(world, idx);
        } else {
            release_victims(world, idx);
            world.mobs[idx].remove_target(true);
        }
        if world.mobs[idx].following.is_some() {
            party::remove_from_party(world, idx);
        }
        run_event(world, idx, EventType::Death);
    }
}

fn kill_pikmin(world: &mut World, idx: usize) {
    carry::drop_carried(world, idx);
    let id = world.mobs[idx].id;
    for leader in &mut world.mobs {
        if leader.holding == Some(id) {
            leader.holding = None;
        }
    }
    let pik = &mut world.mobs[idx];
    pik.attacking = None;
    pik.to_delete = true;
    let at = pik.pos;
    world.fx.push(Fx::Particles {
        kind: ParticleKind::PikminSpirit,
        at,
        count: 1,
    });
}

/// Let go of every Pikmin in the mob's mouth.
fn release_victims(world: &mut World, idx: usize) {
    let victims = std::mem::take(&mut world.mobs[idx].chomping);
    for id in victims {
        if let Some(v) = world.mob_mut(id)
            && v.activity == Activity::Grabbed
        {
            v.set_activity(Activity::Idle);
        }
    }
}
