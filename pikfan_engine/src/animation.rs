//! Animation timing and hitboxes.
//!
//! The engine doesn't draw anything, so an animation is only a duration, a loop flag and the set
//! of hitboxes that are live while it plays. Scripts switch animations by index and can wait for
//! the current one to finish.

use pikfan_data::{AnimationDef, HitboxDef, HitboxKindDef};

use crate::helpers::Point;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HitboxKind {
    /// Can be latched onto and struck.
    Normal,
    /// Kills Pikmin that touch it.
    Attack,
}

impl From<HitboxKindDef> for HitboxKind {
    fn from(value: HitboxKindDef) -> Self {
        match value {
            HitboxKindDef::Normal => HitboxKind::Normal,
            HitboxKindDef::Attack => HitboxKind::Attack,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Hitbox {
    pub name: String,
    pub kind: HitboxKind,
    /// Offset from the mob's center when it faces angle 0.
    pub offset: Point,
    pub radius: f32,
}

impl Hitbox {
    /// Where this hitbox is for a mob at `pos` facing `angle`.
    pub fn world_pos(&self, pos: Point, angle: f32) -> Point {
        pos + self.offset.rotated(angle)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Animation {
    pub name: String,
    pub duration: f32,
    pub looping: bool,
    /// Indices into [`AnimationDb::hitboxes`].
    pub active_hitboxes: Vec<usize>,
}

/// All animations and hitboxes of one mob type.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AnimationDb {
    pub animations: Vec<Animation>,
    pub hitboxes: Vec<Hitbox>,
}

impl AnimationDb {
    /// Build from definitions. Hitbox names an animation lists but the type lacks are dropped;
    /// content validation reports those.
    pub fn from_defs(animations: &[AnimationDef], hitboxes: &[HitboxDef]) -> AnimationDb {
        let hitboxes: Vec<Hitbox> = hitboxes
            .iter()
            .map(|h| Hitbox {
                name: h.name.clone(),
                kind: h.kind.into(),
                offset: Point::new(h.x, h.y),
                radius: h.radius,
            })
            .collect();
        let animations = animations
            .iter()
            .map(|a| Animation {
                name: a.name.clone(),
                duration: a.duration,
                looping: a.looping,
                active_hitboxes: a
                    .hitboxes
                    .iter()
                    .filter_map(|name| hitboxes.iter().position(|h| &h.name == name))
                    .collect(),
            })
            .collect();
        AnimationDb { animations, hitboxes }
    }

    pub fn find_animation(&self, name: &str) -> Option<usize> {
        self.animations.iter().position(|a| a.name == name)
    }

    pub fn find_hitbox(&self, name: &str) -> Option<usize> {
        self.hitboxes.iter().position(|h| h.name == name)
    }

    /// Index of the hitbox closest to `point` for a mob at `pos` facing `angle`.
    pub fn closest_hitbox(&self, point: Point, pos: Point, angle: f32) -> Option<usize> {
        self.hitboxes
            .iter()
            .enumerate()
            .map(|(i, h)| (i, h.world_pos(pos, angle).dist(point)))
            .min_by(|a, b| a.1.total_cmp(&b.1))
            .map(|(i, _)| i)
    }
}

/// Playback state of one mob's animation.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct AnimationInstance {
    pub current: Option<usize>,
    pub time: f32,
    done: bool,
}

impl AnimationInstance {
    /// Switch to another animation and start it from the beginning.
    pub fn change(&mut self, idx: usize) {
        self.current = Some(idx);
        self.time = 0.0;
        self.done = false;
    }

    /// Advance playback. Returns true on the tick the animation reaches its end (every loop for
    /// looping animations, once for the others).
    pub fn tick(&mut self, dt: f32, db: &AnimationDb) -> bool {
        let Some(anim) = self.current.and_then(|i| db.animations.get(i)) else {
            return false;
        };
        if self.done {
            return false;
        }
        self.time += dt;
        if self.time < anim.duration {
            return false;
        }
        if anim.looping && anim.duration > 0.0 {
            self.time %= anim.duration;
        } else {
            self.time = anim.duration;
            self.done = true;
        }
        true
    }

    /// Nothing playing, or a non-looping animation that has reached its end.
    pub fn is_finished(&self) -> bool {
        self.current.is_none() || self.done
    }

    /// Hitboxes live in the current animation.
    pub fn active_hitboxes<'a>(&self, db: &'a AnimationDb) -> &'a [usize] {
        self.current
            .and_then(|i| db.animations.get(i))
            .map_or(&[], |a| a.active_hitboxes.as_slice())
    }
}
