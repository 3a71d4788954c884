use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::DataNode;

/// Everything the engine needs to populate a world: the mob types and one area.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ContentDef {
    #[serde(default)]
    pub mob_types: Vec<MobTypeDef>,
    #[serde(default)]
    pub area: AreaDef,
}

/// Category of a mob type along with the fields only that category uses.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub enum CategoryDef {
    Pikmin {
        carry_strength: f32,
        attack_power: f32,
        attack_interval: f32,
    },
    Leader {
        whistle_range: f32,
    },
    Enemy {
        #[serde(default)]
        drops_corpse: bool,
        #[serde(default)]
        pikmin_seeds: u32,
        #[serde(default = "default_max_chomp")]
        max_chomp: usize,
    },
    Treasure {
        value: u32,
    },
    Pellet {
        pikmin_type: String,
        match_seeds: u32,
        non_match_seeds: u32,
    },
    Onion {
        pikmin_type: String,
    },
    Ship,
    Nectar {
        amount: u32,
    },
    Bridge,
    #[default]
    Custom,
}

fn default_max_chomp() -> usize {
    3
}

impl CategoryDef {
    /// Short lowercase name, used in diagnostics.
    pub fn label(&self) -> &'static str {
        match self {
            CategoryDef::Pikmin { .. } => "pikmin",
            CategoryDef::Leader { .. } => "leader",
            CategoryDef::Enemy { .. } => "enemy",
            CategoryDef::Treasure { .. } => "treasure",
            CategoryDef::Pellet { .. } => "pellet",
            CategoryDef::Onion { .. } => "onion",
            CategoryDef::Ship => "ship",
            CategoryDef::Nectar { .. } => "nectar",
            CategoryDef::Bridge => "bridge",
            CategoryDef::Custom => "custom",
        }
    }
}

/// Optional team override; each category has its own default.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum TeamDef {
    None,
    Player,
    Enemy,
    Obstacle,
    Decoration,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
pub enum HitboxKindDef {
    #[default]
    Normal,
    Attack,
}

/// A named circle attached to a mob, relative to its center at angle 0.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct HitboxDef {
    pub name: String,
    #[serde(default)]
    pub kind: HitboxKindDef,
    #[serde(default)]
    pub x: f32,
    #[serde(default)]
    pub y: f32,
    pub radius: f32,
}

/// Animation timing and which hitboxes are live while it plays.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct AnimationDef {
    pub name: String,
    pub duration: f32,
    #[serde(default)]
    pub looping: bool,
    #[serde(default)]
    pub hitboxes: Vec<String>,
}

/// Definition of one mob type.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct MobTypeDef {
    pub name: String,
    pub category: CategoryDef,
    pub team: Option<TeamDef>,
    /// Diameter.
    pub size: f32,
    pub move_speed: f32,
    /// Radians per second.
    pub rotation_speed: f32,
    pub max_health: f32,
    pub weight: f32,
    pub max_carriers: usize,
    pub sight_radius: f32,
    pub near_radius: f32,
    pub animations: Vec<AnimationDef>,
    pub hitboxes: Vec<HitboxDef>,
    /// Root of the script tree: `{ state { event { action = args } } }`.
    pub script: Option<DataNode>,
    pub first_state: Option<String>,
}

impl Default for MobTypeDef {
    fn default() -> Self {
        Self {
            name: String::new(),
            category: CategoryDef::Custom,
            team: None,
            size: 32.0,
            move_speed: 0.0,
            rotation_speed: std::f32::consts::TAU,
            max_health: 100.0,
            weight: 1.0,
            max_carriers: 1,
            sight_radius: 0.0,
            near_radius: 0.0,
            animations: Vec::new(),
            hitboxes: Vec::new(),
            script: None,
            first_state: None,
        }
    }
}

/// An area: a name plus the mobs placed in it at startup.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct AreaDef {
    pub name: String,
    #[serde(default)]
    pub placements: Vec<PlacementDef>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct PlacementDef {
    pub mob_type: String,
    pub x: f32,
    pub y: f32,
    #[serde(default)]
    pub angle: f32,
    /// Only meaningful for Pikmin: start planted in the ground.
    #[serde(default)]
    pub buried: bool,
    /// Initial script variables.
    #[serde(default)]
    pub vars: BTreeMap<String, String>,
}
