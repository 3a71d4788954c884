//! Simulation tuning loaded from `config.toml`.
//!
//! Every key is optional; anything missing takes its default. A missing or broken file is not an
//! error, the simulation just runs on defaults.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result, bail};
use log::{info, warn};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    pub simulation: SimulationConfig,
    pub pikmin: PikminConfig,
    pub whistle: WhistleConfig,
    pub leader: LeaderConfig,
    pub script: ScriptConfig,
}

impl SimConfig {
    /// Length of one tick in seconds.
    pub fn dt(&self) -> f32 {
        1.0 / self.simulation.game_fps
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    pub game_fps: f32,
    /// Pikmin AI is spread over this many ticks.
    pub ai_portions: u64,
    /// Seconds a delivered mob takes to get sucked in.
    pub delivery_suck_time: f32,
    pub gravity: f32,
    /// Seed for the world's random number generator.
    pub seed: u64,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            game_fps: 30.0,
            ai_portions: 1,
            delivery_suck_time: 2.0,
            gravity: -1300.0,
            seed: 0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PikminConfig {
    /// Reach for noticing something to carry or fight, beyond touching distance.
    pub task_range: f32,
    /// Reach for striking a hitbox, beyond touching distance.
    pub attack_range: f32,
    pub max_in_field: usize,
    pub maturity_power_mult: f32,
    pub celebrate_time: f32,
}

impl Default for PikminConfig {
    fn default() -> Self {
        Self {
            task_range: 20.0,
            attack_range: 4.0,
            max_in_field: 100,
            maturity_power_mult: 0.1,
            celebrate_time: 1.5,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WhistleConfig {
    pub growth_speed: f32,
    pub max_hold_time: f32,
}

impl Default for WhistleConfig {
    fn default() -> Self {
        Self {
            growth_speed: 180.0,
            max_hold_time: 1.5,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LeaderConfig {
    pub auto_pluck_radius: f32,
}

impl Default for LeaderConfig {
    fn default() -> Self {
        Self {
            auto_pluck_radius: 160.0,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScriptConfig {
    /// Accept `eat = N` in scripts.
    pub allow_partial_eat: bool,
}

/// Load simulation config from a TOML file, falling back to defaults if that fails.
pub fn load_config(toml_path: &Path) -> SimConfig {
    match try_load_config(toml_path) {
        Ok(config) => {
            info!(
                "simulation config loaded from '{}' ({} fps)",
                toml_path.display(),
                config.simulation.game_fps
            );
            config
        },
        Err(e) => {
            warn!(
                "Could not load simulation config from '{}': {e:#}. Using defaults.",
                toml_path.display()
            );
            SimConfig::default()
        },
    }
}

/// Attempts to load simulation config from a TOML file.
///
/// # Errors
/// Returns an error if the file cannot be read or parsed, or holds values the simulation can't run
/// with.
pub fn try_load_config(toml_path: &Path) -> Result<SimConfig> {
    let text = fs::read_to_string(toml_path)
        .with_context(|| format!("reading simulation config from '{}'", toml_path.display()))?;
    let config: SimConfig = toml::from_str(&text)
        .with_context(|| format!("parsing simulation config from '{}'", toml_path.display()))?;
    if config.simulation.game_fps.is_nan() || config.simulation.game_fps <= 0.0 {
        bail!("game_fps must be positive (got {})", config.simulation.game_fps);
    }
    if config.simulation.ai_portions == 0 {
        bail!("ai_portions must be at least 1");
    }
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_documented_values() {
        let config = SimConfig::default();
        assert!((config.dt() - 1.0 / 30.0).abs() < f32::EPSILON);
        assert_eq!(config.simulation.ai_portions, 1);
        assert_eq!(config.pikmin.max_in_field, 100);
        assert!(!config.script.allow_partial_eat);
    }

    #[test]
    fn partial_tables_fill_in_defaults() {
        let config: SimConfig = toml::from_str("[simulation]\nai_portions = 4\n[script]\nallow_partial_eat = true\n")
            .expect("valid toml");
        assert_eq!(config.simulation.ai_portions, 4);
        assert!((config.simulation.game_fps - 30.0).abs() < f32::EPSILON);
        assert!(config.script.allow_partial_eat);
        assert!((config.whistle.growth_speed - 180.0).abs() < f32::EPSILON);
    }
}
