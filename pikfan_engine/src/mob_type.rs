//! Mob types: the shared, read-only description of a kind of mob.
//!
//! A type is loaded once and handed to every mob of that kind through an `Arc`. Replacing a type
//! in the [`MobTypeRegistry`] only affects mobs spawned afterwards.

use std::collections::HashMap;
use std::sync::Arc;

use pikfan_data::{CategoryDef, TeamDef};
use serde::{Deserialize, Serialize};
use variantly::Variantly;

use crate::animation::AnimationDb;
use crate::script::{State, state_index};

/// Broad kind of a mob. Decides which per-tick logic applies to it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Variantly)]
pub enum MobCategory {
    Pikmin,
    Leader,
    Enemy,
    Treasure,
    Pellet,
    Onion,
    Ship,
    Nectar,
    Bridge,
    Custom,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PikminTraits {
    pub carry_strength: f32,
    pub attack_power: f32,
    /// Seconds between hits while latched.
    pub attack_interval: f32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LeaderTraits {
    pub whistle_range: f32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct EnemyTraits {
    pub drops_corpse: bool,
    /// Seeds an Onion produces when the corpse is delivered.
    pub pikmin_seeds: u32,
    /// How many Pikmin it can hold in its mouth at once.
    pub max_chomp: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PelletTraits {
    pub pikmin_type: String,
    pub match_seeds: u32,
    pub non_match_seeds: u32,
}

/// Category plus the data only that category uses.
#[derive(Debug, Clone, PartialEq)]
pub enum MobKind {
    Pikmin(PikminTraits),
    Leader(LeaderTraits),
    Enemy(EnemyTraits),
    Treasure { value: u32 },
    Pellet(PelletTraits),
    Onion { pikmin_type: String },
    Ship,
    Nectar { amount: u32 },
    Bridge,
    Custom,
}

impl From<&CategoryDef> for MobKind {
    fn from(def: &CategoryDef) -> Self {
        match def {
            CategoryDef::Pikmin {
                carry_strength,
                attack_power,
                attack_interval,
            } => MobKind::Pikmin(PikminTraits {
                carry_strength: *carry_strength,
                attack_power: *attack_power,
                attack_interval: *attack_interval,
            }),
            CategoryDef::Leader { whistle_range } => MobKind::Leader(LeaderTraits {
                whistle_range: *whistle_range,
            }),
            CategoryDef::Enemy {
                drops_corpse,
                pikmin_seeds,
                max_chomp,
            } => MobKind::Enemy(EnemyTraits {
                drops_corpse: *drops_corpse,
                pikmin_seeds: *pikmin_seeds,
                max_chomp: *max_chomp,
            }),
            CategoryDef::Treasure { value } => MobKind::Treasure { value: *value },
            CategoryDef::Pellet {
                pikmin_type,
                match_seeds,
                non_match_seeds,
            } => MobKind::Pellet(PelletTraits {
                pikmin_type: pikmin_type.clone(),
                match_seeds: *match_seeds,
                non_match_seeds: *non_match_seeds,
            }),
            CategoryDef::Onion { pikmin_type } => MobKind::Onion {
                pikmin_type: pikmin_type.clone(),
            },
            CategoryDef::Ship => MobKind::Ship,
            CategoryDef::Nectar { amount } => MobKind::Nectar { amount: *amount },
            CategoryDef::Bridge => MobKind::Bridge,
            CategoryDef::Custom => MobKind::Custom,
        }
    }
}

impl MobKind {
    pub fn category(&self) -> MobCategory {
        match self {
            MobKind::Pikmin(_) => MobCategory::Pikmin,
            MobKind::Leader(_) => MobCategory::Leader,
            MobKind::Enemy(_) => MobCategory::Enemy,
            MobKind::Treasure { .. } => MobCategory::Treasure,
            MobKind::Pellet(_) => MobCategory::Pellet,
            MobKind::Onion { .. } => MobCategory::Onion,
            MobKind::Ship => MobCategory::Ship,
            MobKind::Nectar { .. } => MobCategory::Nectar,
            MobKind::Bridge => MobCategory::Bridge,
            MobKind::Custom => MobCategory::Custom,
        }
    }

    pub fn pikmin(&self) -> Option<&PikminTraits> {
        match self {
            MobKind::Pikmin(traits) => Some(traits),
            _ => None,
        }
    }

    pub fn leader(&self) -> Option<&LeaderTraits> {
        match self {
            MobKind::Leader(traits) => Some(traits),
            _ => None,
        }
    }

    pub fn enemy(&self) -> Option<&EnemyTraits> {
        match self {
            MobKind::Enemy(traits) => Some(traits),
            _ => None,
        }
    }

    pub fn pellet(&self) -> Option<&PelletTraits> {
        match self {
            MobKind::Pellet(traits) => Some(traits),
            _ => None,
        }
    }

    /// Pikmin type an Onion takes in and spits out.
    pub fn onion_type(&self) -> Option<&str> {
        match self {
            MobKind::Onion { pikmin_type } => Some(pikmin_type),
            _ => None,
        }
    }
}

/// Which side a mob is on. Decides who attacks whom.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Variantly)]
pub enum Team {
    /// Attacks anything.
    None,
    Player,
    Enemy,
    Obstacle,
    /// Never attacked.
    Decoration,
}

impl From<TeamDef> for Team {
    fn from(def: TeamDef) -> Self {
        match def {
            TeamDef::None => Team::None,
            TeamDef::Player => Team::Player,
            TeamDef::Enemy => Team::Enemy,
            TeamDef::Obstacle => Team::Obstacle,
            TeamDef::Decoration => Team::Decoration,
        }
    }
}

impl Team {
    pub fn default_for(category: MobCategory) -> Team {
        match category {
            MobCategory::Pikmin | MobCategory::Leader => Team::Player,
            MobCategory::Enemy => Team::Enemy,
            MobCategory::Bridge => Team::Obstacle,
            MobCategory::Treasure
            | MobCategory::Pellet
            | MobCategory::Onion
            | MobCategory::Ship
            | MobCategory::Nectar
            | MobCategory::Custom => Team::Decoration,
        }
    }
}

/// Whether a mob on team `attacker` would go after one on team `victim`.
pub fn should_attack(attacker: Team, victim: Team) -> bool {
    if victim == Team::Decoration {
        return false;
    }
    attacker == Team::None || attacker != victim
}

#[derive(Debug, Clone, PartialEq)]
pub struct MobType {
    pub name: String,
    pub kind: MobKind,
    pub team: Team,
    /// Diameter.
    pub size: f32,
    pub move_speed: f32,
    /// Radians per second.
    pub rotation_speed: f32,
    pub max_health: f32,
    /// Carrying strength needed to lift it.
    pub weight: f32,
    pub max_carriers: usize,
    pub sight_radius: f32,
    pub near_radius: f32,
    pub animations: AnimationDb,
    pub script: Vec<State>,
    /// State new mobs start in. `None` for types without a script.
    pub first_state: Option<usize>,
}

impl MobType {
    /// A scriptless type with neutral stats, to build on with struct update syntax.
    pub fn basic(name: &str, kind: MobKind) -> MobType {
        let team = Team::default_for(kind.category());
        MobType {
            name: name.to_string(),
            kind,
            team,
            size: 32.0,
            move_speed: 0.0,
            rotation_speed: std::f32::consts::TAU,
            max_health: 100.0,
            weight: 1.0,
            max_carriers: 1,
            sight_radius: 0.0,
            near_radius: 0.0,
            animations: AnimationDb::default(),
            script: Vec::new(),
            first_state: None,
        }
    }

    pub fn category(&self) -> MobCategory {
        self.kind.category()
    }

    pub fn radius(&self) -> f32 {
        self.size * 0.5
    }

    pub fn state_index(&self, name: &str) -> Option<usize> {
        state_index(&self.script, name)
    }
}

/// All loaded mob types by name.
#[derive(Debug, Clone, Default)]
pub struct MobTypeRegistry {
    types: HashMap<String, Arc<MobType>>,
}

impl MobTypeRegistry {
    /// Add or replace a type. Returns the type previously registered under that name.
    pub fn insert(&mut self, mob_type: MobType) -> Option<Arc<MobType>> {
        self.types.insert(mob_type.name.clone(), Arc::new(mob_type))
    }

    pub fn get(&self, name: &str) -> Option<Arc<MobType>> {
        self.types.get(name).cloned()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.types.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Arc<MobType>> {
        self.types.values()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn team_rules() {
        assert!(should_attack(Team::Enemy, Team::Player));
        assert!(should_attack(Team::None, Team::None));
        assert!(!should_attack(Team::Player, Team::Player));
        assert!(!should_attack(Team::None, Team::Decoration));
        assert!(should_attack(Team::Player, Team::Obstacle));
    }

    #[test]
    fn category_defaults() {
        assert_eq!(Team::default_for(MobCategory::Bridge), Team::Obstacle);
        assert_eq!(Team::default_for(MobCategory::Pellet), Team::Decoration);
        let kind = MobKind::from(&CategoryDef::Enemy {
            drops_corpse: true,
            pikmin_seeds: 5,
            max_chomp: 2,
        });
        assert_eq!(kind.category(), MobCategory::Enemy);
        assert_eq!(kind.enemy().map(|e| e.max_chomp), Some(2));
        assert!(kind.pikmin().is_none());
    }

    #[test]
    fn registry_replaces_by_name() {
        let mut registry = MobTypeRegistry::default();
        assert!(registry.insert(MobType::basic("rock", MobKind::Custom)).is_none());
        let old = registry.insert(MobType {
            size: 64.0,
            ..MobType::basic("rock", MobKind::Custom)
        });
        assert_eq!(old.map(|t| t.size), Some(32.0));
        assert_eq!(registry.len(), 1);
        assert!((registry.get("rock").map_or(0.0, |t| t.radius()) - 32.0).abs() < f32::EPSILON);
    }
}
