//! Helpers Module
//!
//! Small geometry helpers shared by the simulation: a 2D point type, chase movement and
//! angle normalization.

use std::f32::consts::{PI, TAU};
use std::ops::{Add, AddAssign, Mul, Sub};

use serde::{Deserialize, Serialize};

/// A position or displacement on the ground plane.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub const ZERO: Point = Point { x: 0.0, y: 0.0 };

    pub fn new(x: f32, y: f32) -> Point {
        Point { x, y }
    }

    /// Unit-angle vector scaled by `magnitude`.
    pub fn from_angle(angle: f32, magnitude: f32) -> Point {
        Point::new(angle.cos() * magnitude, angle.sin() * magnitude)
    }

    pub fn length(self) -> f32 {
        self.x.hypot(self.y)
    }

    pub fn dist(self, other: Point) -> f32 {
        (other - self).length()
    }

    /// Angle of the vector from `self` towards `other`.
    pub fn angle_to(self, other: Point) -> f32 {
        (other.y - self.y).atan2(other.x - self.x)
    }

    /// Rotate around the origin.
    pub fn rotated(self, angle: f32) -> Point {
        let (s, c) = angle.sin_cos();
        Point::new(self.x * c - self.y * s, self.x * s + self.y * c)
    }
}

impl Add for Point {
    type Output = Point;
    fn add(self, rhs: Point) -> Point {
        Point::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl AddAssign for Point {
    fn add_assign(&mut self, rhs: Point) {
        self.x += rhs.x;
        self.y += rhs.y;
    }
}

impl Sub for Point {
    type Output = Point;
    fn sub(self, rhs: Point) -> Point {
        Point::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl Mul<f32> for Point {
    type Output = Point;
    fn mul(self, rhs: f32) -> Point {
        Point::new(self.x * rhs, self.y * rhs)
    }
}

/// Result of one step of chase movement.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Movement {
    /// Velocity to apply, in units per second.
    pub velocity: Point,
    /// Direction of travel, `None` once arrived.
    pub angle: Option<f32>,
    pub reached: bool,
}

/// Velocity needed to move from `from` towards `to`.
///
/// Within `reach_radius` of the target the point counts as arrived. The speed eases off when a
/// full-speed step would overshoot, so the point settles on the target over a couple of ticks.
pub fn move_point(from: Point, to: Point, speed: f32, reach_radius: f32, fps: f32) -> Movement {
    let delta = to - from;
    let dist = delta.length();
    if dist > reach_radius {
        let move_amount = (dist * fps / 2.0).min(speed);
        let velocity = delta * (move_amount / dist);
        Movement {
            velocity,
            angle: Some(velocity.y.atan2(velocity.x)),
            reached: false,
        }
    } else {
        Movement {
            velocity: Point::ZERO,
            angle: None,
            reached: true,
        }
    }
}

/// Wrap an angle into `(-PI, PI]`.
pub fn normalize_angle(angle: f32) -> f32 {
    let mut a = angle % TAU;
    if a > PI {
        a -= TAU;
    } else if a <= -PI {
        a += TAU;
    }
    a
}

/// Move `current` towards `intended` by at most `max_step`, taking the short way round.
pub fn turn_towards(current: f32, intended: f32, max_step: f32) -> f32 {
    let diff = normalize_angle(normalize_angle(intended) - normalize_angle(current));
    normalize_angle(current + diff.signum() * max_step.min(diff.abs()))
}
