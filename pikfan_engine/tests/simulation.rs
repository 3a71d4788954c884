use pikfan_engine as pe;
use pe::carry::{arrive_at_spot, claim_spot, drop_carried};
use pe::mob_type::{EnemyTraits, LeaderTraits, PelletTraits, PikminTraits};
use pe::*;
use pikfan_data::{AnimationDef, HitboxDef};

use std::collections::HashSet;

fn pikmin_type(name: &str, carry_strength: f32) -> MobType {
    MobType {
        size: 16.0,
        move_speed: 80.0,
        max_health: 10.0,
        ..MobType::basic(
            name,
            MobKind::Pikmin(PikminTraits {
                carry_strength,
                attack_power: 10.0,
                attack_interval: 0.8,
            }),
        )
    }
}

fn onion_type(pikmin: &str) -> MobType {
    MobType {
        size: 64.0,
        ..MobType::basic(
            &format!("{pikmin} Onion"),
            MobKind::Onion {
                pikmin_type: pikmin.into(),
            },
        )
    }
}

fn pellet_type(name: &str, weight: f32, max_carriers: usize) -> MobType {
    MobType {
        size: 20.0,
        weight,
        max_carriers,
        ..MobType::basic(
            name,
            MobKind::Pellet(PelletTraits {
                pikmin_type: "Red Pikmin".into(),
                match_seeds: 2,
                non_match_seeds: 1,
            }),
        )
    }
}

fn world() -> World {
    let mut world = World::new_empty();
    world.types.insert(pikmin_type("Red Pikmin", 1.0));
    world.types.insert(onion_type("Red Pikmin"));
    world.types.insert(pellet_type("Pellet", 1.0, 1));
    world.types.insert(MobType {
        size: 24.0,
        move_speed: 130.0,
        ..MobType::basic("Olimar", MobKind::Leader(LeaderTraits { whistle_range: 80.0 }))
    });
    world.types.insert(MobType {
        size: 60.0,
        animations: pe::animation::AnimationDb::from_defs(
            &[AnimationDef {
                name: "bite".into(),
                duration: 1.0,
                looping: true,
                hitboxes: vec!["body".into(), "mouth".into()],
            }],
            &[
                HitboxDef {
                    name: "body".into(),
                    radius: 30.0,
                    ..HitboxDef::default()
                },
                HitboxDef {
                    name: "mouth".into(),
                    x: 30.0,
                    radius: 15.0,
                    ..HitboxDef::default()
                },
            ],
        ),
        ..MobType::basic(
            "Bulborb",
            MobKind::Enemy(EnemyTraits {
                drops_corpse: true,
                pikmin_seeds: 3,
                max_chomp: 2,
            }),
        )
    });
    world.types.insert(MobType {
        size: 24.0,
        ..MobType::basic("Nectar", MobKind::Nectar { amount: 1 })
    });
    world
}

fn spawn(world: &mut World, type_name: &str, x: f32, y: f32) -> usize {
    world
        .spawn_mob(type_name, Point::new(x, y), 0.0, SpawnOptions::default())
        .expect("type is registered")
}

fn spawn_buried(world: &mut World, x: f32, y: f32) -> usize {
    let options = SpawnOptions {
        buried: true,
        ..SpawnOptions::default()
    };
    world
        .spawn_mob("Red Pikmin", Point::new(x, y), 0.0, options)
        .expect("type is registered")
}

fn spawn_leader(world: &mut World, x: f32, y: f32) -> usize {
    let idx = spawn(world, "Olimar", x, y);
    let id = world.mobs[idx].id;
    assert!(world.set_current_leader(id));
    idx
}

#[test]
fn carrying_starts_only_once_arrived_strength_covers_the_weight() {
    let mut world = world();
    world.types.insert(pikmin_type("Strong Pikmin", 4.0));
    world.types.insert(pikmin_type("Weak Pikmin", 3.0));
    world.types.insert(onion_type("Strong Pikmin"));
    world.types.insert(pellet_type("Heavy Pellet", 10.0, 4));

    spawn(&mut world, "Strong Pikmin Onion", 300.0, 0.0);
    let pellet = spawn(&mut world, "Heavy Pellet", 0.0, 0.0);
    let a = spawn(&mut world, "Strong Pikmin", 0.0, 100.0);
    let b = spawn(&mut world, "Strong Pikmin", 20.0, 100.0);
    let weak = spawn(&mut world, "Weak Pikmin", 40.0, 100.0);
    let extra = spawn(&mut world, "Red Pikmin", 60.0, 100.0);
    let late = spawn(&mut world, "Red Pikmin", 80.0, 100.0);

    for p in [a, b, weak, extra] {
        assert!(claim_spot(&mut world, p, pellet));
        assert_eq!(world.mobs[p].activity, Activity::MovingToCarrySpot);
    }
    assert!(!claim_spot(&mut world, late, pellet));
    let info = world.mobs[pellet].carrier_info.as_ref().unwrap();
    assert!(info.is_full());
    assert!(info.strength.abs() < f32::EPSILON);

    arrive_at_spot(&mut world, a);
    arrive_at_spot(&mut world, b);
    assert_eq!(world.mobs[a].activity, Activity::Carrying);
    let info = world.mobs[pellet].carrier_info.as_ref().unwrap();
    assert!((info.strength - 8.0).abs() < f32::EPSILON);
    assert_eq!(info.n_carriers, 2);
    assert_eq!(world.mobs[pellet].activity, Activity::Idle);

    arrive_at_spot(&mut world, weak);
    assert_eq!(world.mobs[pellet].activity, Activity::BeingCarried);
    let info = world.mobs[pellet].carrier_info.as_ref().unwrap();
    assert_eq!(info.decided_type.as_deref(), Some("Strong Pikmin"));

    drop_carried(&mut world, weak);
    assert_eq!(world.mobs[weak].activity, Activity::Idle);
    assert_eq!(world.mobs[pellet].activity, Activity::Idle);
    let info = world.mobs[pellet].carrier_info.as_ref().unwrap();
    assert!((info.strength - 8.0).abs() < f32::EPSILON);
    assert_eq!(info.decided_type, None);
}

#[test]
fn pikmin_ai_is_spread_over_the_portions() {
    let mut world = world();
    world.config.simulation.ai_portions = 4;
    let pikmin: Vec<usize> = (0..40u8)
        .map(|i| spawn(&mut world, "Red Pikmin", f32::from(i) * 50.0, 0.0))
        .collect();

    let mut seen = HashSet::new();
    for _ in 0..4 {
        let tick = world.tick;
        world.step();
        let thought: Vec<usize> = pikmin
            .iter()
            .copied()
            .filter(|p| world.mobs[*p].last_ai_tick == Some(tick))
            .collect();
        assert_eq!(thought.len(), 10);
        for p in thought {
            assert!(seen.insert(p), "pikmin {p} thought twice");
        }
    }
    assert_eq!(seen.len(), 40);
}

/// One Pikmin next to a one-carrier pellet, with an Onion a short walk away.
fn deliver_one_pellet(max_in_field: usize) -> World {
    let mut world = world();
    world.config.pikmin.max_in_field = max_in_field;
    spawn(&mut world, "Red Pikmin Onion", 60.0, 0.0);
    spawn(&mut world, "Pellet", 0.0, 0.0);
    spawn(&mut world, "Red Pikmin", 0.0, 20.0);
    world.run_ticks(300);
    world
}

#[test]
fn delivered_pellet_becomes_seeds() {
    let mut world = deliver_one_pellet(100);
    assert!(world.mobs.iter().all(|m| m.category != MobCategory::Pellet));
    assert_eq!(world.pikmin_count(), 3);
    assert_eq!(
        world
            .mobs
            .iter()
            .filter(|m| m.category == MobCategory::Pikmin && m.activity == Activity::Idle)
            .count(),
        1
    );
    assert!(world.pikmin_in_onions.is_empty());
    let fx = world.drain_fx();
    assert!(
        fx.iter()
            .any(|e| matches!(&e.fx, Fx::Particles { kind: ParticleKind::Smoke, .. }))
    );
}

#[test]
fn seeds_past_the_field_limit_are_stored() {
    let world = deliver_one_pellet(1);
    assert_eq!(world.pikmin_count(), 1);
    assert_eq!(world.pikmin_in_onions.get("Red Pikmin"), Some(&2));
}

#[test]
fn whistle_calls_pikmin_into_the_party() {
    let mut world = world();
    let leader = spawn_leader(&mut world, 0.0, 0.0);
    let pik = spawn(&mut world, "Red Pikmin", 50.0, 0.0);
    let far = spawn(&mut world, "Red Pikmin", 50.0, 150.0);
    let leader_id = world.mobs[leader].id;

    world.start_whistling(Point::new(50.0, 0.0));
    world.step();
    assert_eq!(world.mobs[pik].following, Some(leader_id));
    assert_eq!(world.mobs[pik].activity, Activity::InGroup);
    assert_eq!(world.mobs[far].following, None);
    assert_eq!(world.mobs[leader].party.as_ref().map(|p| p.len()), Some(1));

    world.run_ticks(90);
    assert!(!world.whistle.active);
}

#[test]
fn walking_into_a_pikmin_calls_it() {
    let mut world = world();
    let leader = spawn_leader(&mut world, 0.0, 0.0);
    let pik = spawn(&mut world, "Red Pikmin", 15.0, 0.0);
    world.step();
    assert_eq!(world.mobs[pik].following, Some(world.mobs[leader].id));
}

#[test]
fn plucking_needs_a_buried_pikmin() {
    let mut world = world();
    let leader = spawn_leader(&mut world, 0.0, 0.0);
    let sprout = spawn_buried(&mut world, 30.0, 0.0);
    assert!(world.pluck(leader, sprout));
    assert_eq!(world.mobs[sprout].activity, Activity::InGroup);
    assert!(!world.pluck(leader, sprout));
}

#[test]
fn auto_pluck_clears_the_area() {
    let mut world = world();
    let leader = spawn_leader(&mut world, 0.0, 0.0);
    let sprouts = [
        spawn_buried(&mut world, 40.0, 0.0),
        spawn_buried(&mut world, -40.0, 0.0),
    ];
    let out_of_range = spawn_buried(&mut world, 400.0, 0.0);

    assert!(world.start_auto_pluck());
    world.run_ticks(150);
    for s in sprouts {
        assert_eq!(world.mobs[s].activity, Activity::InGroup);
    }
    assert_eq!(world.mobs[out_of_range].activity, Activity::Buried);
    assert!(!world.mobs[leader].auto_pluck_mode);
}

#[test]
fn thrown_pikmin_latches_on_and_fights() {
    let mut world = world();
    let leader = spawn_leader(&mut world, 0.0, 0.0);
    let pik = spawn(&mut world, "Red Pikmin", 10.0, 0.0);
    let enemy = spawn(&mut world, "Bulborb", 100.0, 0.0);
    let enemy_id = world.mobs[enemy].id;
    pe::party::add_to_party(&mut world, leader, pik);

    assert_eq!(world.grab_closest_member(), Some(world.mobs[pik].id));
    assert!(world.throw_held_pikmin(Point::new(100.0, 0.0)));
    assert!(world.mobs[pik].was_thrown);
    assert_eq!(world.mobs[pik].following, None);

    world.run_ticks(25);
    let thrown = &world.mobs[pik];
    assert!(thrown.latched);
    assert_eq!(thrown.attacking, Some(enemy_id));
    assert_eq!(thrown.activity, Activity::Attacking);

    world.run_ticks(60);
    assert!(world.mobs[enemy].health.current_hp() < 100.0);
    assert!(world.mobs[pik].latched);
}

#[test]
fn chomped_pikmin_go_free_when_the_enemy_dies() {
    let mut world = world();
    let enemy = spawn(&mut world, "Bulborb", 0.0, 0.0);
    {
        let bulborb = &mut world.mobs[enemy];
        bulborb.anim.change(0);
        bulborb.chomp_hitboxes = vec![1];
    }
    let victims: Vec<usize> = (0..3).map(|_| spawn(&mut world, "Red Pikmin", 30.0, 0.0)).collect();

    world.step();
    let grabbed = victims
        .iter()
        .filter(|v| world.mobs[**v].activity == Activity::Grabbed)
        .count();
    assert_eq!(grabbed, 2);
    assert_eq!(world.mobs[enemy].chomping.len(), 2);

    world.mobs[enemy].health.set(0.0);
    world.step();
    assert!(world.mobs[enemy].dead);
    assert!(world.mobs[enemy].chomping.is_empty());
    assert!(
        victims
            .iter()
            .all(|v| world.mobs[*v].activity != Activity::Grabbed)
    );
}

#[test]
fn dead_pikmin_leave_a_spirit() {
    let mut world = world();
    let pik = spawn(&mut world, "Red Pikmin", 0.0, 0.0);
    let id = world.mobs[pik].id;
    world.mobs[pik].health.set(0.0);
    world.step();
    assert!(world.mob(id).is_none());
    assert_eq!(world.pikmin_count(), 0);
    assert!(
        world
            .drain_fx()
            .iter()
            .any(|e| matches!(&e.fx, Fx::Particles { kind: ParticleKind::PikminSpirit, .. }))
    );
}

#[test]
fn nectar_drop_matures_one_pikmin() {
    let mut world = world();
    let nectar = spawn(&mut world, "Nectar", 0.0, 0.0);
    let nectar_id = world.mobs[nectar].id;
    let first = spawn(&mut world, "Red Pikmin", 5.0, 0.0);
    let second = spawn(&mut world, "Red Pikmin", -5.0, 0.0);
    let (first_id, second_id) = (world.mobs[first].id, world.mobs[second].id);

    world.step();
    assert!(world.mob(nectar_id).is_none());
    assert_eq!(world.mob(first_id).map(|m| m.maturity), Some(2));
    assert_eq!(world.mob(second_id).map(|m| m.maturity), Some(0));
}
