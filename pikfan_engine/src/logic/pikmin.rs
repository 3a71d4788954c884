//! Pikmin decisions.
//!
//! Whistles, touches, landings, carry spots and fighting are looked at every tick. Looking for new
//! work (something to fight or carry, nectar to drink) is spread over `ai_portions` ticks: a Pikmin
//! only thinks on ticks where `ordinal % portions == tick % portions`.

use log::debug;

use crate::carry;
use crate::fx::{Fx, ParticleKind};
use crate::helpers::Point;
use crate::mob::{Activity, ChaseTarget};
use crate::mob_type::{MobCategory, should_attack};
use crate::party;
use crate::script::{EventType, run_event};
use crate::world::World;

/// Run the Pikmin pass.
pub fn tick_pikmin(world: &mut World, dt: f32) {
    let portions = world.config.simulation.ai_portions.max(1);
    let leader = world.current_leader_idx();

    for p in 0..world.mobs.len() {
        let pik = &world.mobs[p];
        if pik.category != MobCategory::Pikmin || pik.is_gone() {
            continue;
        }
        let ai_turn = pik.ordinal % portions == world.tick % portions;
        if ai_turn {
            world.mobs[p].last_ai_tick = Some(world.tick);
        }

        if let Some(l) = leader {
            check_call(world, p, l);
        }
        if ai_turn {
            drink_nectar(world, p);
        }
        if world.mobs[p].was_thrown {
            check_latch(world, p);
        }
        if ai_turn && looking_for_work(world, p) && !find_fight(world, p) {
            find_carry(world, p);
        }
        check_carry_spot(world, p);
        fight(world, p, dt);
        check_attack_hitboxes(world, p);

        let pik = &world.mobs[p];
        if let Some(carried) = pik.carrying.and_then(|id| world.mob(id)) {
            let angle = pik.pos.angle_to(carried.pos);
            world.mobs[p].face(angle);
        }
        let celebrate_time = world.config.pikmin.celebrate_time;
        let pik = &mut world.mobs[p];
        if pik.activity == Activity::Celebrating && pik.time_in_activity >= celebrate_time {
            pik.set_activity(Activity::Idle);
        }
    }
}

/// Pull the Pikmin into the current leader's party if it is being whistled, or if the leader
/// walks into it while it's free.
fn check_call(world: &mut World, p: usize, leader: usize) {
    let pik = &world.mobs[p];
    let callable = pik.following.is_none()
        && !matches!(pik.activity, Activity::Buried | Activity::Grabbed)
        && pik.speed_z == 0.0
        && pik.uncallable_period <= 0.0;
    if !callable {
        return;
    }
    let l = &world.mobs[leader];
    let whistled = world.whistle.active && pik.pos.dist(world.cursor) <= world.whistle.radius;
    let touched = pik.pos.dist(l.pos) <= pik.radius() + l.radius() && l.carrier_info.is_none();
    let busy = pik.carrying.is_some() || pik.attacking.is_some();
    if !(whistled || (touched && !busy)) {
        return;
    }

    carry::drop_carried(world, p);
    let pik = &mut world.mobs[p];
    pik.attacking = None;
    pik.attacking_hitbox = None;
    pik.latched = false;
    pik.attack_time = 0.0;
    party::add_to_party(world, leader, p);
}

/// Drinking nectar matures a Pikmin fully.
fn drink_nectar(world: &mut World, p: usize) {
    let pik = &world.mobs[p];
    let free = pik.carrying.is_none()
        && pik.attacking.is_none()
        && pik.activity != Activity::Buried
        && pik.speed_z == 0.0
        && pik.maturity != 2;
    if !free {
        return;
    }
    let Some(n) = world.mobs.iter().position(|m| {
        m.category == MobCategory::Nectar
            && !m.is_gone()
            && m.nectar_left > 0
            && m.pos.dist(pik.pos) <= m.radius() + pik.radius()
    }) else {
        return;
    };
    let nectar = &mut world.mobs[n];
    nectar.nectar_left -= 1;
    if nectar.nectar_left == 0 {
        nectar.to_delete = true;
    }
    world.mobs[p].maturity = 2;
    debug!("'{}' drank nectar", world.mobs[p].name());
}

/// A thrown Pikmin that hits an enemy latches onto its closest hitbox.
fn check_latch(world: &mut World, p: usize) {
    let pik = &world.mobs[p];
    let victim = world.mobs.iter().enumerate().find_map(|(v, m)| {
        if v == p || m.is_gone() || !should_attack(pik.team, m.team) {
            return None;
        }
        if m.pos.dist(pik.pos) > m.radius() + pik.radius() {
            return None;
        }
        let hitbox = m.mob_type.animations.closest_hitbox(pik.pos, m.pos, m.angle)?;
        Some((v, hitbox))
    });
    let Some((v, hitbox)) = victim else {
        return;
    };
    let victim = &world.mobs[v];
    let victim_id = victim.id;
    let Some(hb_pos) = victim
        .mob_type
        .animations
        .hitboxes
        .get(hitbox)
        .map(|h| h.world_pos(victim.pos, victim.angle))
    else {
        return;
    };
    let latch_offset = (pik.pos - hb_pos).rotated(-victim.angle);

    let pik = &mut world.mobs[p];
    pik.attacking = Some(victim_id);
    pik.attacking_hitbox = Some(hitbox);
    pik.latched = true;
    pik.latch_offset = latch_offset;
    pik.was_thrown = false;
    pik.speed = Point::ZERO;
    pik.speed_z = 0.0;
    pik.z = 0.0;
    pik.attack_time = 0.0;
    pik.set_activity(Activity::Attacking);
    debug!("'{}' latched onto {victim_id}", pik.name());

    run_event(world, v, EventType::PikminLatch);
    run_event(world, v, EventType::PikminLand);
}

/// Free to pick up a task: idle on the ground, or in a party that is being moved as a group.
/// Party members only take on tasks while the party is being moved as a group.
fn looking_for_work(world: &World, p: usize) -> bool {
    let pik = &world.mobs[p];
    if pik.following.is_some() {
        return world.prev_group_intensity > 0.0 && pik.activity == Activity::InGroup;
    }
    pik.activity == Activity::Idle
        && pik.carrying.is_none()
        && pik.wants_to_carry.is_none()
        && pik.attacking.is_none()
        && pik.speed_z == 0.0
}

/// Start fighting the first attackable mob within reach.
fn find_fight(world: &mut World, p: usize) -> bool {
    let task_range = world.config.pikmin.task_range;
    let pik = &world.mobs[p];
    let target = world.mobs.iter().enumerate().find_map(|(v, m)| {
        if v == p || m.is_gone() || !should_attack(pik.team, m.team) {
            return None;
        }
        if m.pos.dist(pik.pos) > m.radius() + pik.radius() + task_range {
            return None;
        }
        let hitbox = m.mob_type.animations.closest_hitbox(pik.pos, m.pos, m.angle)?;
        Some((m.id, hitbox))
    });
    let Some((victim, hitbox)) = target else {
        return false;
    };
    party::remove_from_party(world, p);
    let pik = &mut world.mobs[p];
    pik.attacking = Some(victim);
    pik.attacking_hitbox = Some(hitbox);
    pik.latched = false;
    pik.attack_time = 0.0;
    pik.set_activity(Activity::Attacking);
    debug!("'{}' goes to fight {victim}", pik.name());
    true
}

/// Head for a free carrier spot on the first carriable mob within reach.
fn find_carry(world: &mut World, p: usize) -> bool {
    let task_range = world.config.pikmin.task_range;
    let pik = &world.mobs[p];
    let Some(target) = world.mobs.iter().enumerate().position(|(v, m)| {
        v != p
            && !m.to_delete
            && m.activity != Activity::BeingDelivered
            && m.carrier_info.as_ref().is_some_and(|i| !i.is_full())
            && m.pos.dist(pik.pos) <= m.radius() + pik.radius() + task_range
    }) else {
        return false;
    };
    party::remove_from_party(world, p);
    carry::claim_spot(world, p, target)
}

/// Reaching a reserved spot makes the Pikmin a carrier.
fn check_carry_spot(world: &mut World, p: usize) {
    let pik = &world.mobs[p];
    if pik.activity != Activity::MovingToCarrySpot {
        return;
    }
    let target_ok = pik
        .wants_to_carry
        .and_then(|id| world.mob(id))
        .is_some_and(|m| m.carrier_info.is_some() && !m.to_delete);
    if !target_ok {
        carry::drop_carried(world, p);
        return;
    }
    if pik.reached_destination {
        carry::arrive_at_spot(world, p);
        world.mobs[p].uncallable_period = 0.0;
    }
}

/// Walk up to the victim's hitbox (or hang on to it when latched) and strike it every
/// `attack_interval` seconds.
fn fight(world: &mut World, p: usize, dt: f32) {
    let pik = &world.mobs[p];
    let Some(victim_id) = pik.attacking else {
        return;
    };
    let Some(traits) = pik.mob_type.kind.pikmin().cloned() else {
        return;
    };
    let victim = world.index_of(victim_id).filter(|v| !world.mobs[*v].to_delete);
    let Some(v) = victim.filter(|v| !world.mobs[*v].dead) else {
        let pik = &mut world.mobs[p];
        pik.attacking = None;
        pik.attacking_hitbox = None;
        pik.latched = false;
        pik.remove_target(true);
        if victim.is_some() {
            pik.set_activity(Activity::Celebrating);
            debug!("'{}' celebrates", pik.name());
        } else {
            pik.set_activity(Activity::Idle);
        }
        return;
    };
    let victim = &world.mobs[v];
    let Some(hitbox) = pik
        .attacking_hitbox
        .and_then(|h| victim.mob_type.animations.hitboxes.get(h))
        .cloned()
    else {
        return;
    };
    let hb_pos = hitbox.world_pos(victim.pos, victim.angle);
    let (victim_pos, victim_angle) = (victim.pos, victim.angle);
    let attack_range = world.config.pikmin.attack_range;

    let pik = &mut world.mobs[p];
    if pik.latched {
        let offset = hb_pos - victim_pos + pik.latch_offset.rotated(victim_angle);
        pik.set_target(ChaseTarget::mob(victim_id, offset, true));
        pik.face(pik.pos.angle_to(victim_pos));
        if pik.attack_time == 0.0 {
            pik.attack_time = traits.attack_interval;
        }
    } else if pik.pos.dist(hb_pos) <= pik.radius() + hitbox.radius + attack_range {
        pik.remove_target(true);
        pik.face(pik.pos.angle_to(hb_pos));
        if pik.attack_time == 0.0 {
            pik.attack_time = traits.attack_interval;
        }
    } else {
        pik.set_target(ChaseTarget::mob(victim_id, hb_pos - victim_pos, false));
        pik.attack_time = traits.attack_interval;
        return;
    }

    pik.attack_time -= dt;
    if pik.attack_time > 0.0 {
        return;
    }
    pik.attack_time = traits.attack_interval;
    let power = traits.attack_power;
    let damage = power + f32::from(pik.maturity) * power * world.config.pikmin.maturity_power_mult;
    world.mobs[v].health.damage(damage);
    run_event(world, v, EventType::Damage);
    world.fx.push(Fx::Particles {
        kind: ParticleKind::Smack,
        at: hb_pos,
        count: 1,
    });
    world.fx.push(Fx::Sound {
        name: "pikmin_attack".to_string(),
        at: hb_pos,
    });
}

/// Touching a live attack hitbox of anything that isn't a Pikmin is fatal.
fn check_attack_hitboxes(world: &mut World, p: usize) {
    use crate::animation::HitboxKind;

    let pik = &world.mobs[p];
    if matches!(pik.activity, Activity::Buried | Activity::Grabbed) {
        return;
    }
    let hit = world.mobs.iter().any(|m| {
        if m.category == MobCategory::Pikmin || m.is_gone() {
            return false;
        }
        let db = &m.mob_type.animations;
        m.anim
            .active_hitboxes(db)
            .iter()
            .filter_map(|h| db.hitboxes.get(*h))
            .filter(|h| h.kind == HitboxKind::Attack)
            .any(|h| h.world_pos(m.pos, m.angle).dist(pik.pos) <= h.radius + pik.radius())
    });
    if hit {
        debug!("'{}' was hit by an attack hitbox", pik.name());
        world.mobs[p].health.set(0.0);
    }
}
