//! Health Module
//!
//! Hit points for mobs. Health never goes below zero; a mob at zero is dead as far as the
//! simulation is concerned, whether or not its death has been processed yet.

use serde::{Deserialize, Serialize};

/// Represents the state of a mob's health.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct HealthState {
    max_hp: f32,
    current_hp: f32,
}

impl HealthState {
    /// Create a `HealthState` at full health.
    pub fn new_at_max(max_hp: f32) -> HealthState {
        let max_hp = max_hp.max(0.0);
        HealthState {
            max_hp,
            current_hp: max_hp,
        }
    }

    pub fn max_hp(&self) -> f32 {
        self.max_hp
    }

    pub fn current_hp(&self) -> f32 {
        self.current_hp
    }

    /// Return whether this mob is alive or dead.
    pub fn life_state(&self) -> LifeState {
        if self.current_hp > 0.0 {
            LifeState::Alive
        } else {
            LifeState::Dead
        }
    }

    /// Overwrite current health. Clamped at zero, but may exceed the maximum.
    pub fn set(&mut self, amount: f32) {
        self.current_hp = amount.max(0.0);
    }

    /// Add a (possibly negative) delta to current health. Clamped at zero.
    pub fn adjust(&mut self, delta: f32) {
        self.set(self.current_hp + delta);
    }

    /// Do damage to health. Saturates at zero.
    pub fn damage(&mut self, amount: f32) {
        self.adjust(-amount.max(0.0));
    }

    /// Back to full health.
    pub fn restore(&mut self) {
        self.current_hp = self.max_hp;
    }
}

/// Life state of a mob.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LifeState {
    Alive,
    Dead,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn relative_set_below_zero_clamps() {
        let mut health = HealthState::new_at_max(100.0);
        health.set(50.0);
        health.adjust(-70.0);
        assert!((health.current_hp() - 0.0).abs() < f32::EPSILON);
        assert_eq!(health.life_state(), LifeState::Dead);
    }

    #[test]
    fn absolute_set_may_exceed_max() {
        let mut health = HealthState::new_at_max(10.0);
        health.set(25.0);
        assert!((health.current_hp() - 25.0).abs() < f32::EPSILON);
        health.set(-3.0);
        assert!(health.current_hp().abs() < f32::EPSILON);
    }

    #[test]
    fn damage_ignores_negative_amounts_and_restore_refills() {
        let mut health = HealthState::new_at_max(10.0);
        health.damage(-5.0);
        assert!((health.current_hp() - 10.0).abs() < f32::EPSILON);
        health.damage(4.0);
        assert!((health.current_hp() - 6.0).abs() < f32::EPSILON);
        health.restore();
        assert_eq!(health.life_state(), LifeState::Alive);
        assert!((health.current_hp() - health.max_hp()).abs() < f32::EPSILON);
    }
}
