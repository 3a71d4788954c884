//! Loader utilities for building a `World` from content files.
//!
//! Mob types and the area come from `content.ron` (a serialized `ContentDef`), while simulation
//! tuning stays in `config.toml`. Content that fails validation is rejected as a whole; problems
//! inside individual scripts are only reported, and the affected actions are skipped at runtime.

pub mod area;
pub mod config;
pub mod mob_types;

use std::path::Path;

use anyhow::{Context, Result, bail};
use log::{info, warn};
use pikfan_data::ContentDef;

use crate::data_paths::data_path;
use crate::loader::area::place_area;
use crate::loader::config::{SimConfig, load_config};
use crate::loader::mob_types::{build_registry, load_content};
use crate::script::{ErrorSink, LogSink};
use crate::world::World;

pub const CONTENT_FILE: &str = "content.ron";
pub const CONFIG_FILE: &str = "config.toml";

/// Load the `World` from the data directory, logging script problems.
///
/// # Errors
/// Errors bubble up from file IO, deserialization, content validation or placement.
pub fn load_world() -> Result<World> {
    let mut sink = LogSink::default();
    let world = load_world_files(&data_path(CONTENT_FILE), &data_path(CONFIG_FILE), &mut sink)?;
    if sink.reported > 0 {
        warn!("{} script problem(s) found while loading content", sink.reported);
    }
    Ok(world)
}

/// Load the `World` from `content.ron` and `config.toml` in `dir`, reporting script problems to
/// `sink`.
///
/// # Errors
/// Errors bubble up from file IO, deserialization, content validation or placement.
pub fn load_world_from(dir: &Path, sink: &mut dyn ErrorSink) -> Result<World> {
    load_world_files(&dir.join(CONTENT_FILE), &dir.join(CONFIG_FILE), sink)
}

fn load_world_files(content_path: &Path, config_path: &Path, sink: &mut dyn ErrorSink) -> Result<World> {
    let content = load_content(content_path).context("while loading content from file")?;
    let config = load_config(config_path);
    build_world(&content, config, sink)
}

/// Build a populated `World` from already deserialized content.
///
/// # Errors
/// - if the content fails validation
/// - if a placement can't be spawned
pub fn build_world(content: &ContentDef, config: SimConfig, sink: &mut dyn ErrorSink) -> Result<World> {
    validate_content(content)?;
    let mut world = World::new(config);
    world.types = build_registry(
        &content.mob_types,
        &world.specials,
        world.config.script.allow_partial_eat,
        sink,
    );
    info!("{} mob types added to World", world.types.len());

    place_area(&mut world, &content.area).context("while placing area mobs")?;
    info!("{} mobs placed in area '{}'", world.mobs.len(), world.area_name);
    Ok(world)
}

/// Validate the content and return a single aggregated error.
fn validate_content(content: &ContentDef) -> Result<()> {
    let errors = pikfan_data::validate_content(content);
    if errors.is_empty() {
        return Ok(());
    }
    let details = errors
        .into_iter()
        .map(|err| format!("- {err}"))
        .collect::<Vec<_>>()
        .join("\n");
    bail!("content validation failed:\n{details}");
}
