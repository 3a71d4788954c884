//! The simulated world.
//!
//! [`World`] owns every mob in the area along with everything the per-tick logic needs: loaded
//! mob types, tuning, the special-function table, deferred events, the fx queue and the player's
//! inputs (cursor, whistle, movement). Mobs refer to one another by [`MobId`]; ids are turned into
//! indices on use and a missing id simply means the interaction doesn't happen.

use std::collections::{BTreeMap, HashMap};
use std::f32::consts::TAU;
use std::sync::Arc;

use anyhow::{Result, anyhow};
use log::{debug, info};
use pikfan_data::PlacementDef;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::carry;
use crate::fx::FxEntry;
use crate::fx::FxQueue;
use crate::helpers::Point;
use crate::idgen::{new_id, placed_mob_id};
use crate::loader::config::SimConfig;
use crate::logic;
use crate::mob::{Activity, Mob, MobId};
use crate::mob_type::{MobCategory, MobType, MobTypeRegistry};
use crate::party::{self, MIN_GRAB_RANGE, Party};
use crate::scheduler::Scheduler;
use crate::script::{self, EventOutcome, EventType, SpecialFunctionRegistry};

/// Height new sprouts are spat from.
const SEED_SPIT_Z: f32 = 320.0;
const SEED_SPIT_SPEED_Z: f32 = 200.0;
const SEED_SPIT_SPEED: f32 = 60.0;
/// Upwards speed of a thrown Pikmin.
pub const THROW_SPEED_Z: f32 = 500.0;

/// The current leader's whistle.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct WhistleState {
    pub active: bool,
    pub radius: f32,
    /// Seconds left at full size; counts only once the whistle stopped growing.
    pub max_hold: f32,
}

/// Extra setup for a freshly spawned mob.
#[derive(Debug, Clone, Default)]
pub struct SpawnOptions {
    /// Pikmin only: start planted in the ground.
    pub buried: bool,
    pub vars: BTreeMap<String, String>,
}

/// Complete state of the running simulation.
#[derive(Debug)]
pub struct World {
    pub mobs: Vec<Mob>,
    pub types: MobTypeRegistry,
    pub config: SimConfig,
    pub specials: SpecialFunctionRegistry,
    pub scheduler: Scheduler,
    pub fx: FxQueue,
    /// Number of ticks simulated so far.
    pub tick: u64,
    pub whistle: WhistleState,
    pub cursor: Point,
    pub cur_leader: Option<MobId>,
    /// Movement input for the current leader, each axis in `[-1, 1]`.
    pub leader_move: Point,
    /// Group-move input, each axis in `[-1, 1]`.
    pub group_move: Point,
    pub(crate) group_move_angle: f32,
    pub(crate) prev_group_intensity: f32,
    /// Pikmin stored inside Onions, by type.
    pub pikmin_in_onions: HashMap<String, u32>,
    /// Value of the treasures delivered to the ship so far.
    pub ship_collected: u32,
    pub area_name: String,
    pub rng: StdRng,
    index: HashMap<MobId, usize>,
    next_ordinal: u64,
}

impl World {
    pub fn new(config: SimConfig) -> World {
        let rng = StdRng::seed_from_u64(config.simulation.seed);
        World {
            mobs: Vec::new(),
            types: MobTypeRegistry::default(),
            config,
            specials: SpecialFunctionRegistry::with_builtins(),
            scheduler: Scheduler::default(),
            fx: FxQueue::new(),
            tick: 0,
            whistle: WhistleState::default(),
            cursor: Point::ZERO,
            cur_leader: None,
            leader_move: Point::ZERO,
            group_move: Point::ZERO,
            group_move_angle: 0.0,
            prev_group_intensity: 0.0,
            pikmin_in_onions: HashMap::new(),
            ship_collected: 0,
            area_name: String::new(),
            rng,
            index: HashMap::new(),
            next_ordinal: 0,
        }
    }

    /// Create a new empty world with default tuning.
    pub fn new_empty() -> World {
        let world = World::new(SimConfig::default());
        info!("new, empty 'World' created");
        world
    }

    pub fn index_of(&self, id: MobId) -> Option<usize> {
        self.index.get(&id).copied()
    }

    pub fn mob(&self, id: MobId) -> Option<&Mob> {
        self.index_of(id).map(|i| &self.mobs[i])
    }

    pub fn mob_mut(&mut self, id: MobId) -> Option<&mut Mob> {
        self.index_of(id).map(|i| &mut self.mobs[i])
    }

    pub fn current_leader_idx(&self) -> Option<usize> {
        self.cur_leader.and_then(|id| self.index_of(id))
    }

    /// Pikmin currently out in the field.
    pub fn pikmin_count(&self) -> usize {
        self.mobs
            .iter()
            .filter(|m| m.category == MobCategory::Pikmin && !m.to_delete)
            .count()
    }

    /// Rebuild the id lookup after mobs have been removed.
    pub(crate) fn reindex(&mut self) {
        self.index = self.mobs.iter().enumerate().map(|(i, m)| (m.id, i)).collect();
    }

    /// Add a mob of `mob_type` to the world and put it in its first state. Returns its index.
    pub fn spawn(&mut self, mob_type: Arc<MobType>, id: MobId, pos: Point, angle: f32, options: SpawnOptions) -> usize {
        let mut mob = Mob::new(id, mob_type, pos, angle);
        mob.vars.extend(options.vars);
        match mob.category {
            MobCategory::Leader => mob.party = Some(Party::new(pos)),
            MobCategory::Pikmin => {
                mob.ordinal = self.next_ordinal;
                self.next_ordinal += 1;
                if options.buried {
                    mob.activity = Activity::Buried;
                }
            },
            _ => {},
        }
        let first_state = mob.mob_type.first_state;
        let category = mob.category;
        debug!("spawned '{}' ({id}) at ({:.0}, {:.0})", mob.name(), pos.x, pos.y);

        let idx = self.mobs.len();
        self.mobs.push(mob);
        self.index.insert(id, idx);
        match category {
            MobCategory::Pellet => carry::make_carriable(self, idx, false),
            MobCategory::Treasure => carry::make_carriable(self, idx, true),
            _ => {},
        }
        if let Some(state) = first_state {
            script::set_state(self, idx, state);
        }
        idx
    }

    /// Spawn a mob by type name with a fresh random id.
    pub fn spawn_mob(&mut self, type_name: &str, pos: Point, angle: f32, options: SpawnOptions) -> Option<usize> {
        let mob_type = self.types.get(type_name)?;
        Some(self.spawn(mob_type, new_id(), pos, angle, options))
    }

    /// Spawn the `index`th placement of the current area, with a stable id.
    ///
    /// # Errors
    /// - if the placement names a mob type that isn't loaded
    pub fn place_mob(&mut self, index: usize, placement: &PlacementDef) -> Result<usize> {
        let mob_type = self.types.get(&placement.mob_type).ok_or_else(|| {
            anyhow!(
                "placement #{index} in area '{}' refers to unknown mob type '{}'",
                self.area_name,
                placement.mob_type
            )
        })?;
        let id = placed_mob_id(&self.area_name, index);
        let options = SpawnOptions {
            buried: placement.buried,
            vars: placement.vars.clone(),
        };
        Ok(self.spawn(
            mob_type,
            id,
            Point::new(placement.x, placement.y),
            placement.angle.to_radians(),
            options,
        ))
    }

    /// Shoot a new buried Pikmin of `pikmin_type` out of an Onion at `at`.
    pub(crate) fn spit_seed(&mut self, pikmin_type: &str, at: Point) {
        let angle = self.rng.random_range(0.0..TAU);
        let options = SpawnOptions {
            buried: true,
            ..SpawnOptions::default()
        };
        if let Some(idx) = self.spawn_mob(pikmin_type, at, angle, options) {
            let seed = &mut self.mobs[idx];
            seed.z = SEED_SPIT_Z;
            seed.speed_z = SEED_SPIT_SPEED_Z;
            seed.speed = Point::from_angle(angle, SEED_SPIT_SPEED);
        }
    }

    /// Deliver `event` to a mob from outside the simulation (hazards, walls and other occurrences
    /// the engine doesn't detect itself).
    pub fn dispatch(&mut self, id: MobId, event: EventType) -> Option<EventOutcome> {
        let idx = self.index_of(id)?;
        script::run_event(self, idx, event)
    }

    /// Make the leader `id` the one the player controls. A leader type with an `active` state is
    /// switched into it.
    pub fn set_current_leader(&mut self, id: MobId) -> bool {
        let Some(idx) = self.index_of(id) else {
            return false;
        };
        if self.mobs[idx].category != MobCategory::Leader {
            return false;
        }
        if let Some(old) = self.current_leader_idx() {
            self.mobs[old].holding = None;
        }
        self.stop_whistling();
        self.cur_leader = Some(id);
        if let Some(active) = self.mobs[idx].mob_type.state_index("active") {
            script::set_state(self, idx, active);
        }
        info!("current leader is now '{}'", self.mobs[idx].name());
        true
    }

    pub fn set_cursor(&mut self, at: Point) {
        self.cursor = at;
    }

    pub fn set_leader_movement(&mut self, input: Point) {
        self.leader_move = input;
    }

    pub fn set_group_movement(&mut self, input: Point) {
        self.group_move = input;
    }

    /// Start blowing the current leader's whistle at `cursor`.
    pub fn start_whistling(&mut self, cursor: Point) {
        self.cursor = cursor;
        self.whistle = WhistleState {
            active: true,
            radius: 0.0,
            max_hold: 0.0,
        };
    }

    pub fn stop_whistling(&mut self) {
        self.whistle = WhistleState::default();
    }

    /// Have the current leader pluck nearby buried Pikmin one after another.
    pub fn start_auto_pluck(&mut self) -> bool {
        let Some(leader) = self.current_leader_idx() else {
            return false;
        };
        let mob = &mut self.mobs[leader];
        mob.auto_pluck_mode = true;
        mob.auto_pluck_target = None;
        mob.remove_target(true);
        true
    }

    pub fn stop_auto_pluck(&mut self) {
        if let Some(leader) = self.current_leader_idx() {
            let mob = &mut self.mobs[leader];
            mob.auto_pluck_mode = false;
            mob.auto_pluck_target = None;
            mob.remove_target(true);
        }
    }

    /// Pull the buried Pikmin at `pikmin` out of the ground into the party of the leader at
    /// `leader`.
    pub fn pluck(&mut self, leader: usize, pikmin: usize) -> bool {
        if self.mobs[pikmin].activity != Activity::Buried || self.mobs[pikmin].z > 0.0 {
            return false;
        }
        self.mobs[pikmin].set_activity(Activity::Idle);
        party::add_to_party(self, leader, pikmin);
        let at = self.mobs[pikmin].pos;
        self.fx.push(crate::fx::Fx::Sound {
            name: "pikmin_pluck".to_string(),
            at,
        });
        true
    }

    /// Have the current leader grab the closest party Pikmin within reach, ready to throw.
    pub fn grab_closest_member(&mut self) -> Option<MobId> {
        let leader = self.current_leader_idx()?;
        if let Some(held) = self.mobs[leader].holding {
            return Some(held);
        }
        let leader_pos = self.mobs[leader].pos;
        let closest = self.mobs[leader]
            .party
            .as_ref()?
            .members
            .iter()
            .filter_map(|id| self.index_of(*id))
            .filter(|m| self.mobs[*m].category == MobCategory::Pikmin)
            .map(|m| (m, self.mobs[m].pos.dist(leader_pos)))
            .min_by(|a, b| a.1.total_cmp(&b.1))
            .filter(|(_, d)| *d <= MIN_GRAB_RANGE)
            .map(|(m, _)| m)?;
        let id = self.mobs[closest].id;
        self.mobs[closest].remove_target(true);
        self.mobs[leader].holding = Some(id);
        Some(id)
    }

    /// Throw the Pikmin the current leader is holding so that it lands on `target`.
    pub fn throw_held_pikmin(&mut self, target: Point) -> bool {
        let Some(leader) = self.current_leader_idx() else {
            return false;
        };
        let Some(held) = self.mobs[leader].holding.take().and_then(|id| self.index_of(id)) else {
            return false;
        };
        party::remove_from_party(self, held);
        let gravity = self.config.simulation.gravity.abs().max(f32::EPSILON);
        let flight_time = 2.0 * THROW_SPEED_Z / gravity;
        let pik = &mut self.mobs[held];
        pik.speed = (target - pik.pos) * (1.0 / flight_time);
        pik.speed_z = THROW_SPEED_Z;
        pik.was_thrown = true;
        pik.set_activity(Activity::Idle);
        debug!("'{}' thrown towards ({:.0}, {:.0})", pik.name(), target.x, target.y);
        true
    }

    /// Advance the simulation by one tick.
    pub fn step(&mut self) {
        logic::tick(self);
    }

    pub fn run_ticks(&mut self, n: u64) {
        for _ in 0..n {
            self.step();
        }
    }

    /// Take every sound and particle burst queued since the last drain.
    pub fn drain_fx(&mut self) -> Vec<FxEntry> {
        self.fx.drain()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mob_type::{MobKind, PikminTraits};

    fn world_with_pikmin_type() -> World {
        let mut world = World::new_empty();
        world.types.insert(MobType {
            move_speed: 80.0,
            ..MobType::basic(
                "red",
                MobKind::Pikmin(PikminTraits {
                    carry_strength: 1.0,
                    attack_power: 10.0,
                    attack_interval: 0.8,
                }),
            )
        });
        world
    }

    #[test]
    fn spawned_pikmin_get_increasing_ordinals() {
        let mut world = world_with_pikmin_type();
        let a = world.spawn_mob("red", Point::ZERO, 0.0, SpawnOptions::default());
        let b = world.spawn_mob("red", Point::ZERO, 0.0, SpawnOptions::default());
        let (a, b) = (a.expect("spawned"), b.expect("spawned"));
        assert_eq!(world.mobs[a].ordinal + 1, world.mobs[b].ordinal);
        assert_eq!(world.index_of(world.mobs[b].id), Some(b));
        assert_eq!(world.pikmin_count(), 2);
        assert!(world.spawn_mob("blue", Point::ZERO, 0.0, SpawnOptions::default()).is_none());
    }

    #[test]
    fn spit_seeds_fly_out_buried() {
        let mut world = world_with_pikmin_type();
        world.spit_seed("red", Point::new(10.0, 10.0));
        let seed = &world.mobs[0];
        assert_eq!(seed.activity, Activity::Buried);
        assert!((seed.z - SEED_SPIT_Z).abs() < f32::EPSILON);
        assert!((seed.speed.length() - SEED_SPIT_SPEED).abs() < 1e-3);
    }

    #[test]
    fn non_leaders_cannot_lead() {
        let mut world = world_with_pikmin_type();
        let idx = world
            .spawn_mob("red", Point::ZERO, 0.0, SpawnOptions::default())
            .expect("spawned");
        let id = world.mobs[idx].id;
        assert!(!world.set_current_leader(id));
        assert!(world.cur_leader.is_none());
    }
}
