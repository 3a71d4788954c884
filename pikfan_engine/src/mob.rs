//! Mob module
//!
//! A mob is any live object in the area: leaders, Pikmin, enemies, pellets, Onions and the rest.
//! Category specific fields sit on the one struct and are simply unused by other categories, so
//! every mob can live in the world's single `Vec<Mob>` and be addressed by index during a tick.

use std::collections::HashMap;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use uuid::Uuid;
use variantly::Variantly;

use crate::animation::AnimationInstance;
use crate::carry::CarrierInfo;
use crate::health::HealthState;
use crate::helpers::Point;
use crate::mob_type::{MobCategory, MobKind, MobType, Team};
use crate::party::Party;
use crate::script::Fsm;

pub type MobId = Uuid;

/// What a chase target is relative to.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Anchor {
    Fixed,
    /// Another mob's position; the chase ends if that mob goes away.
    Mob(MobId),
    /// The party center of this leader.
    PartyCenter(MobId),
}

/// Where a mob is heading.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ChaseTarget {
    pub anchor: Anchor,
    /// Added to the anchor position. For `Fixed` this is the position itself.
    pub offset: Point,
    /// Snap to the target instead of walking there.
    pub instant: bool,
}

impl ChaseTarget {
    pub fn point(at: Point) -> ChaseTarget {
        ChaseTarget {
            anchor: Anchor::Fixed,
            offset: at,
            instant: false,
        }
    }

    pub fn mob(id: MobId, offset: Point, instant: bool) -> ChaseTarget {
        ChaseTarget {
            anchor: Anchor::Mob(id),
            offset,
            instant,
        }
    }

    pub fn party_center(leader: MobId, offset: Point) -> ChaseTarget {
        ChaseTarget {
            anchor: Anchor::PartyCenter(leader),
            offset,
            instant: false,
        }
    }
}

/// What a mob is currently busy with, as far as the engine's own logic is concerned.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, Variantly)]
pub enum Activity {
    #[default]
    Idle,
    /// Lifted and moving towards its destination.
    BeingCarried,
    /// At the destination, being sucked in.
    BeingDelivered,
    /// Planted; waiting to be plucked.
    Buried,
    InGroup,
    MovingToCarrySpot,
    Carrying,
    Attacking,
    /// In an enemy's mouth.
    Grabbed,
    Celebrating,
}

#[derive(Debug, Clone)]
pub struct Mob {
    pub id: MobId,
    pub mob_type: Arc<MobType>,
    pub category: MobCategory,
    pub team: Team,

    pub pos: Point,
    /// Height above the floor.
    pub z: f32,
    pub speed: Point,
    pub speed_z: f32,
    pub home: Point,
    pub angle: f32,
    pub intended_angle: f32,
    pub affected_by_gravity: bool,

    pub health: HealthState,
    /// Death has been processed. Only `on_death` is delivered from here on.
    pub dead: bool,
    /// Removed at the end of the tick.
    pub to_delete: bool,

    pub target: Option<ChaseTarget>,
    pub target_is_home: bool,
    pub reached_destination: bool,
    pub speed_multiplier: f32,

    pub fsm: Fsm,
    pub anim: AnimationInstance,
    pub vars: HashMap<String, String>,
    /// Seconds until `on_timer`; only counts while positive.
    pub timer: f32,
    pub timer_interval: f32,

    pub focused_opponent: Option<MobId>,
    pub opponent_near: bool,
    /// Hitboxes that currently grab Pikmin on touch.
    pub chomp_hitboxes: Vec<usize>,
    /// Grabbed Pikmin, oldest first.
    pub chomping: Vec<MobId>,

    pub activity: Activity,
    pub time_in_activity: f32,

    /// Present while the mob can be carried.
    pub carrier_info: Option<CarrierInfo>,
    /// Leader of the party this mob belongs to.
    pub following: Option<MobId>,
    /// Present on leaders.
    pub party: Option<Party>,

    // Pikmin
    pub carrying: Option<MobId>,
    pub wants_to_carry: Option<MobId>,
    pub carrying_spot: usize,
    pub attacking: Option<MobId>,
    pub attacking_hitbox: Option<usize>,
    pub latched: bool,
    /// Offset from the victim's center, in the victim's frame.
    pub latch_offset: Point,
    pub attack_time: f32,
    pub maturity: u8,
    pub was_thrown: bool,
    pub just_landed: bool,
    /// Seconds before the mob can be called into a party again.
    pub uncallable_period: f32,
    /// Spawn order among Pikmin, used to spread AI work across ticks.
    pub ordinal: u64,
    pub last_ai_tick: Option<u64>,

    /// Nectar only: drinks left.
    pub nectar_left: u32,

    // Leaders
    pub holding: Option<MobId>,
    pub auto_pluck_mode: bool,
    pub auto_pluck_target: Option<MobId>,
}

impl Mob {
    pub fn new(id: MobId, mob_type: Arc<MobType>, pos: Point, angle: f32) -> Mob {
        let category = mob_type.category();
        Mob {
            id,
            category,
            team: mob_type.team,
            pos,
            z: 0.0,
            speed: Point::ZERO,
            speed_z: 0.0,
            home: pos,
            angle,
            intended_angle: angle,
            affected_by_gravity: true,
            health: HealthState::new_at_max(mob_type.max_health),
            dead: false,
            to_delete: false,
            target: None,
            target_is_home: false,
            reached_destination: false,
            speed_multiplier: 1.0,
            fsm: Fsm::default(),
            anim: AnimationInstance::default(),
            vars: HashMap::new(),
            timer: 0.0,
            timer_interval: 0.0,
            focused_opponent: None,
            opponent_near: false,
            chomp_hitboxes: Vec::new(),
            chomping: Vec::new(),
            activity: Activity::Idle,
            time_in_activity: 0.0,
            carrier_info: None,
            following: None,
            party: None,
            carrying: None,
            wants_to_carry: None,
            carrying_spot: 0,
            attacking: None,
            attacking_hitbox: None,
            latched: false,
            latch_offset: Point::ZERO,
            attack_time: 0.0,
            maturity: 0,
            was_thrown: false,
            just_landed: false,
            uncallable_period: 0.0,
            ordinal: 0,
            last_ai_tick: None,
            nectar_left: match mob_type.kind {
                MobKind::Nectar { amount } => amount,
                _ => 0,
            },
            holding: None,
            auto_pluck_mode: false,
            auto_pluck_target: None,
            mob_type,
        }
    }

    pub fn name(&self) -> &str {
        &self.mob_type.name
    }

    pub fn radius(&self) -> f32 {
        self.mob_type.radius()
    }

    /// Script variable, empty if never set.
    pub fn var(&self, key: &str) -> &str {
        self.vars.get(key).map_or("", String::as_str)
    }

    pub fn set_activity(&mut self, activity: Activity) {
        if self.activity != activity {
            self.activity = activity;
            self.time_in_activity = 0.0;
        }
    }

    pub fn set_target(&mut self, target: ChaseTarget) {
        self.target = Some(target);
        self.target_is_home = false;
        self.reached_destination = false;
    }

    /// Stop chasing. With `stop`, horizontal movement halts right away.
    pub fn remove_target(&mut self, stop: bool) {
        self.target = None;
        self.target_is_home = false;
        if stop {
            self.speed = Point::ZERO;
        }
    }

    /// Start turning towards `angle`.
    pub fn face(&mut self, angle: f32) {
        self.intended_angle = angle;
    }

    /// On the ground and not part of anyone's business.
    pub fn is_idle_on_ground(&self) -> bool {
        self.activity == Activity::Idle && self.z <= 0.0 && self.speed_z == 0.0
    }

    pub fn is_gone(&self) -> bool {
        self.dead || self.to_delete
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::idgen::new_id;

    fn rock() -> Mob {
        Mob::new(
            new_id(),
            Arc::new(MobType::basic("rock", MobKind::Custom)),
            Point::new(3.0, 4.0),
            0.0,
        )
    }

    #[test]
    fn new_mob_starts_at_home_with_full_health() {
        let mob = rock();
        assert_eq!(mob.home, mob.pos);
        assert!((mob.health.current_hp() - 100.0).abs() < f32::EPSILON);
        assert_eq!(mob.team, Team::Decoration);
        assert_eq!(mob.var("anything"), "");
    }

    #[test]
    fn activity_change_resets_clock() {
        let mut mob = rock();
        mob.time_in_activity = 3.0;
        mob.set_activity(Activity::Idle);
        assert!((mob.time_in_activity - 3.0).abs() < f32::EPSILON);
        mob.set_activity(Activity::Celebrating);
        assert!(mob.time_in_activity.abs() < f32::EPSILON);
    }

    #[test]
    fn targets() {
        let mut mob = rock();
        mob.speed = Point::new(1.0, 1.0);
        mob.set_target(ChaseTarget::point(Point::new(10.0, 0.0)));
        assert!(mob.target.is_some());
        mob.remove_target(true);
        assert!(mob.target.is_none());
        assert_eq!(mob.speed, Point::ZERO);
    }
}
