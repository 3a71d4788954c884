#![warn(clippy::pedantic)]
#![allow(clippy::must_use_candidate)]

pub const PIKFAN_VERSION: &str = env!("CARGO_PKG_VERSION");

// Core modules
pub mod animation;
pub mod carry;
pub mod data_paths;
pub mod fx;
pub mod health;
pub mod helpers;
pub mod idgen;
pub mod loader;
pub mod logic;
pub mod mob;
pub mod mob_type;
pub mod party;
pub mod scheduler;
pub mod script;
pub mod world;

// Re-exports for convenience
pub use fx::{Fx, FxEntry, ParticleKind};
pub use helpers::Point;
pub use loader::{build_world, load_world, load_world_from};
pub use mob::{Activity, Mob, MobId};
pub use mob_type::{MobCategory, MobKind, MobType, MobTypeRegistry, Team};
pub use script::{EventOutcome, EventType, ScriptError, SpecialFunctionRegistry};
pub use world::{SpawnOptions, World};
