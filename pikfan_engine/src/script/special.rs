//! Special functions: named native hooks that scripts call with `special_function = name`.
//!
//! Hooks are looked up by mob category first and fall back to hooks registered for any category,
//! so an enemy-only `die_end` can coexist with a generic one of the same name.

use std::collections::HashMap;

use log::{debug, trace};

use super::event::EventType;
use crate::carry;
use crate::fx::{Fx, ParticleKind};
use crate::mob_type::MobCategory;
use crate::scheduler::OnBlockedPolicy;
use crate::world::World;

/// Identifies the action being executed: which mob, and which state and event it belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ActionContext {
    pub mob: usize,
    pub state: usize,
    pub event: EventType,
}

pub type SpecialFn = fn(&mut World, &ActionContext);

#[derive(Debug, Clone, Default)]
pub struct SpecialFunctionRegistry {
    hooks: HashMap<(Option<MobCategory>, String), SpecialFn>,
}

impl SpecialFunctionRegistry {
    pub fn new() -> SpecialFunctionRegistry {
        SpecialFunctionRegistry::default()
    }

    /// Registry with the engine's own hooks already in place.
    pub fn with_builtins() -> SpecialFunctionRegistry {
        let mut registry = SpecialFunctionRegistry::new();
        registry.register(Some(MobCategory::Enemy), "die_start", enemy_die_start);
        registry.register(Some(MobCategory::Enemy), "die_end", enemy_die_end);
        registry.register(None, "loop", loop_event);
        registry
    }

    /// Register `hook` under `name`, for one category or (with `None`) for all of them.
    /// Replaces any hook already registered under the same key.
    pub fn register(&mut self, category: Option<MobCategory>, name: &str, hook: SpecialFn) {
        self.hooks.insert((category, name.to_string()), hook);
    }

    pub fn lookup(&self, category: MobCategory, name: &str) -> Option<SpecialFn> {
        self.hooks
            .get(&(Some(category), name.to_string()))
            .or_else(|| self.hooks.get(&(None, name.to_string())))
            .copied()
    }

    /// Whether any category has a hook called `name`.
    pub fn knows(&self, name: &str) -> bool {
        self.hooks.keys().any(|(_, n)| n == name)
    }
}

const DEATH_SPARKLES: u32 = 8;

/// Start of an enemy's death: a burst of sparkles.
fn enemy_die_start(world: &mut World, ctx: &ActionContext) {
    let at = world.mobs[ctx.mob].pos;
    world.fx.push(Fx::Particles {
        kind: ParticleKind::Sparkle,
        at,
        count: DEATH_SPARKLES,
    });
}

/// End of an enemy's death: the spirit leaves and, if the type drops one, the corpse becomes
/// carriable back to an Onion.
fn enemy_die_end(world: &mut World, ctx: &ActionContext) {
    let mob = &world.mobs[ctx.mob];
    let at = mob.pos;
    let drops_corpse = mob.mob_type.kind.enemy().is_some_and(|e| e.drops_corpse);
    debug!("enemy '{}' finished dying (corpse: {drops_corpse})", mob.mob_type.name);
    if drops_corpse {
        carry::make_carriable(world, ctx.mob, false);
    }
    world.fx.push(Fx::Particles {
        kind: ParticleKind::EnemySpirit,
        at,
        count: 1,
    });
}

/// Fire the calling event again on the next tick, once the mob's script is free.
fn loop_event(world: &mut World, ctx: &ActionContext) {
    let id = world.mobs[ctx.mob].id;
    let now = world.tick;
    let queued = world.scheduler.schedule_on_if(
        now + 1,
        id,
        ctx.state,
        ctx.event,
        OnBlockedPolicy::RetryNextTick,
        Some("loop".to_string()),
    );
    if !queued {
        trace!("loop for mob {id} already pending");
    }
}
