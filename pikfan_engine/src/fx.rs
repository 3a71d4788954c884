//! Fx module.
//!
//! The simulation doesn't render or play audio. Anything a frontend would want to show or play
//! (sounds, particle bursts) is queued here as it happens during a tick, and the host drains the
//! queue whenever it likes.

use std::fmt;

use variantly::Variantly;

use crate::helpers::Point;

/// Kinds of particle burst the engine emits on its own, plus script-named ones.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParticleKind {
    /// Requested by a script `particle` action.
    Named(String),
    Sparkle,
    EnemySpirit,
    PikminSpirit,
    Smoke,
    Smack,
}

impl fmt::Display for ParticleKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParticleKind::Named(name) => write!(f, "{name}"),
            ParticleKind::Sparkle => write!(f, "sparkle"),
            ParticleKind::EnemySpirit => write!(f, "enemy spirit"),
            ParticleKind::PikminSpirit => write!(f, "pikmin spirit"),
            ParticleKind::Smoke => write!(f, "smoke"),
            ParticleKind::Smack => write!(f, "smack"),
        }
    }
}

/// One presentation side effect.
#[derive(Debug, Clone, PartialEq, Variantly)]
pub enum Fx {
    Particles { kind: ParticleKind, at: Point, count: u32 },
    Sound { name: String, at: Point },
}

/// An `Fx` along with when it was queued.
#[derive(Debug, Clone, PartialEq)]
pub struct FxEntry {
    pub tick: u64,
    pub sequence: usize,
    pub fx: Fx,
}

#[derive(Debug, Clone, Default)]
pub struct FxQueue {
    items: Vec<FxEntry>,
    tick: u64,
    sequence: usize,
}

impl FxQueue {
    pub fn new() -> FxQueue {
        FxQueue::default()
    }

    /// Tick number stamped on everything pushed from now on.
    pub fn set_tick(&mut self, tick: u64) {
        self.tick = tick;
    }

    pub fn push(&mut self, fx: Fx) {
        self.items.push(FxEntry {
            tick: self.tick,
            sequence: self.sequence,
            fx,
        });
        self.sequence += 1;
    }

    /// Take everything queued so far, oldest first.
    pub fn drain(&mut self) -> Vec<FxEntry> {
        std::mem::take(&mut self.items)
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &FxEntry> {
        self.items.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn drain_returns_in_order_and_empties() {
        let mut queue = FxQueue::new();
        queue.set_tick(7);
        queue.push(Fx::Sound {
            name: "pluck".into(),
            at: Point::ZERO,
        });
        queue.push(Fx::Particles {
            kind: ParticleKind::Smoke,
            at: Point::new(1.0, 2.0),
            count: 3,
        });
        assert_eq!(queue.len(), 2);
        assert_eq!(queue.iter().filter(|e| e.fx.is_sound()).count(), 1);

        let drained = queue.drain();
        assert!(queue.is_empty());
        assert_eq!(drained[0].tick, 7);
        assert_eq!(drained[1].sequence, 1);
        assert!(drained[1].fx.is_particles());
    }
}
