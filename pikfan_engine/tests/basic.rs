use pikfan_engine as pe;
use pe::loader::config::{load_config, try_load_config};
use pe::script::ScriptError;
use pe::*;

use std::fs;
use std::path::Path;

const SMALL_CONTENT: &str = r#"(
    mob_types: [
        (name: "Red Pikmin", category: Pikmin(carry_strength: 1.0, attack_power: 10.0, attack_interval: 0.8), size: 16.0),
        (name: "Olimar", category: Leader(whistle_range: 80.0), size: 24.0, move_speed: 130.0),
        (name: "Red Onion", category: Onion(pikmin_type: "Red Pikmin"), size: 64.0),
    ],
    area: (
        name: "test area",
        placements: [
            (mob_type: "Olimar", x: 0.0, y: 0.0),
            (mob_type: "Red Onion", x: -100.0, y: 0.0),
            (mob_type: "Red Pikmin", x: 30.0, y: 0.0, buried: true),
        ],
    ),
)"#;

#[test]
fn test_lib_version() {
    assert!(!pe::PIKFAN_VERSION.is_empty());
}

#[test]
fn test_idgen_uuid_deterministic() {
    let u1 = idgen::uuid_from_token(&idgen::NAMESPACE_MOB, "test");
    let u2 = idgen::uuid_from_token(&idgen::NAMESPACE_MOB, "test");
    assert_eq!(u1, u2);
    assert_ne!(idgen::new_id(), idgen::new_id());
}

#[test]
fn test_config_from_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.toml");
    fs::write(&path, "[simulation]\ngame_fps = 60.0\nai_portions = 3\n").unwrap();
    let config = try_load_config(&path).unwrap();
    assert!((config.simulation.game_fps - 60.0).abs() < f32::EPSILON);
    assert_eq!(config.simulation.ai_portions, 3);
    assert_eq!(config.pikmin.max_in_field, 100);
}

#[test]
fn test_config_problems_fall_back_to_defaults() {
    let dir = tempfile::tempdir().unwrap();
    let broken = dir.path().join("broken.toml");
    fs::write(&broken, "[simulation\ngame_fps = ").unwrap();
    assert!(try_load_config(&broken).is_err());
    assert_eq!(load_config(&broken), loader::config::SimConfig::default());

    let zero_fps = dir.path().join("zero.toml");
    fs::write(&zero_fps, "[simulation]\ngame_fps = 0.0\n").unwrap();
    assert!(try_load_config(&zero_fps).is_err());

    assert_eq!(
        load_config(&dir.path().join("missing.toml")),
        loader::config::SimConfig::default()
    );
}

#[test]
fn test_load_world_from_dir() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("content.ron"), SMALL_CONTENT).unwrap();
    let mut errors: Vec<ScriptError> = Vec::new();
    let world = load_world_from(dir.path(), &mut errors).unwrap();

    assert!(errors.is_empty());
    assert_eq!(world.types.len(), 3);
    assert_eq!(world.mobs.len(), 3);
    assert_eq!(world.area_name, "test area");
    assert_eq!(world.cur_leader, Some(world.mobs[0].id));
    assert_eq!(world.mobs[2].activity, Activity::Buried);
    assert_eq!(world.mobs[0].id, idgen::placed_mob_id("test area", 0));
}

#[test]
fn test_missing_content_is_an_error() {
    let dir = tempfile::tempdir().unwrap();
    let mut errors: Vec<ScriptError> = Vec::new();
    let err = load_world_from(dir.path(), &mut errors).unwrap_err();
    assert!(format!("{err:#}").contains("content.ron"));
}

#[test]
fn test_validation_errors_are_aggregated() {
    let dir = tempfile::tempdir().unwrap();
    let content = SMALL_CONTENT
        .replace(r#"(mob_type: "Red Onion""#, r#"(mob_type: "Blue Onion""#)
        .replace(r#"Onion(pikmin_type: "Red Pikmin")"#, r#"Onion(pikmin_type: "Yellow Pikmin")"#);
    fs::write(dir.path().join("content.ron"), content).unwrap();
    let mut errors: Vec<ScriptError> = Vec::new();
    let err = load_world_from(dir.path(), &mut errors).unwrap_err();
    let text = format!("{err:#}");
    assert!(text.contains("content validation failed"));
    assert!(text.contains("Blue Onion"));
    assert!(text.contains("Yellow Pikmin"));
}

#[test]
fn test_content_is_format_agnostic() {
    let json = r#"{
        "mob_types": [
            {"name": "Olimar", "category": {"Leader": {"whistle_range": 80.0}}, "move_speed": 130.0}
        ],
        "area": {"name": "json area", "placements": [{"mob_type": "Olimar", "x": 5.0, "y": 0.0}]}
    }"#;
    let content: pikfan_data::ContentDef = serde_json::from_str(json).unwrap();
    let mut errors: Vec<ScriptError> = Vec::new();
    let world = build_world(&content, loader::config::SimConfig::default(), &mut errors).unwrap();
    assert_eq!(world.mobs.len(), 1);
    assert_eq!(world.cur_leader, Some(world.mobs[0].id));
}

#[test]
fn test_shipped_content_loads_cleanly_and_runs() {
    let data = Path::new(env!("CARGO_MANIFEST_DIR")).join("data");
    let mut errors: Vec<ScriptError> = Vec::new();
    let mut world = load_world_from(&data, &mut errors).unwrap();
    assert!(errors.is_empty(), "script problems: {errors:?}");
    assert_eq!(world.mobs.len(), 22);

    let olimar = world.cur_leader.and_then(|id| world.mob(id)).unwrap();
    assert_eq!(olimar.name(), "Olimar");
    assert_eq!(olimar.var("active"), "yes");

    world.run_ticks(120);
    assert_eq!(world.tick, 120);
    let _ = world.drain_fx();
    assert!(world.fx.is_empty());
}
