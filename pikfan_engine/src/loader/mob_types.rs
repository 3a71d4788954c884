//! Mob type loading: `MobTypeDef` to runtime `MobType`, scripts included.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use log::{debug, info};
use pikfan_data::{ContentDef, MobTypeDef};

use crate::animation::AnimationDb;
use crate::mob_type::{MobKind, MobType, MobTypeRegistry, Team};
use crate::script::{ErrorSink, Origin, ScriptContext, ScriptError, SpecialFunctionRegistry, load_script, state_index};

/// Load a `ContentDef` from a RON file.
///
/// # Errors
/// - if the file can't be read or isn't valid content RON
pub fn load_content(path: &Path) -> Result<ContentDef> {
    let text = fs::read_to_string(path).with_context(|| format!("reading content from '{}'", path.display()))?;
    let content: ContentDef =
        ron::from_str(&text).with_context(|| format!("parsing content RON from '{}'", path.display()))?;
    info!(
        "content loaded from '{}': {} mob types, {} placements",
        path.display(),
        content.mob_types.len(),
        content.area.placements.len()
    );
    Ok(content)
}

/// Build every mob type. Script problems go to `sink`; the types are built regardless.
pub fn build_registry(
    defs: &[MobTypeDef],
    specials: &SpecialFunctionRegistry,
    allow_partial_eat: bool,
    sink: &mut dyn ErrorSink,
) -> MobTypeRegistry {
    let mut registry = MobTypeRegistry::default();
    for def in defs {
        registry.insert(build_mob_type(def, specials, allow_partial_eat, sink));
    }
    registry
}

/// Convert one definition into a runtime mob type.
///
/// Script nodes without a source location are attributed to the mob type, so diagnostics still
/// say where to look.
pub fn build_mob_type(
    def: &MobTypeDef,
    specials: &SpecialFunctionRegistry,
    allow_partial_eat: bool,
    sink: &mut dyn ErrorSink,
) -> MobType {
    let kind = MobKind::from(&def.category);
    let team = def.team.map_or_else(|| Team::default_for(kind.category()), Team::from);
    let animations = AnimationDb::from_defs(&def.animations, &def.hitboxes);

    let script = match &def.script {
        Some(root) => {
            let mut root = root.clone();
            root.stamp_file(&format!("mob type '{}'", def.name));
            let ctx = ScriptContext {
                animations: &animations,
                specials,
                allow_partial_eat,
            };
            load_script(&root, &ctx, sink)
        },
        None => Vec::new(),
    };

    let first_state = match &def.first_state {
        Some(name) => {
            let found = state_index(&script, name);
            if found.is_none() {
                sink.report(ScriptError::UnknownState {
                    name: name.clone(),
                    origin: Origin {
                        file: format!("mob type '{}'", def.name),
                        line: 0,
                    },
                });
            }
            found.or_else(|| (!script.is_empty()).then_some(0))
        },
        None => (!script.is_empty()).then_some(0),
    };
    debug!(
        "mob type '{}' ({}) built with {} states",
        def.name,
        def.category.label(),
        script.len()
    );

    MobType {
        name: def.name.clone(),
        kind,
        team,
        size: def.size,
        move_speed: def.move_speed,
        rotation_speed: def.rotation_speed,
        max_health: def.max_health,
        weight: def.weight,
        max_carriers: def.max_carriers,
        sight_radius: def.sight_radius,
        near_radius: def.near_radius,
        animations,
        script,
        first_state,
    }
}
