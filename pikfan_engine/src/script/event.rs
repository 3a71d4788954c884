//! Script events: named occurrences that run an ordered list of actions.

use std::sync::Arc;

use log::trace;
use serde::{Deserialize, Serialize};

use super::action::{self, Action, Flow};
use super::fsm::Cursor;
use super::special::ActionContext;
use crate::world::World;

/// Every occurrence a script can listen for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum EventType {
    OnEnter,
    OnLeave,
    AnimationEnd,
    AttackHit,
    AttackMiss,
    BigDamage,
    Damage,
    Death,
    EnterHazard,
    Idle,
    LeaveHazard,
    LoseObject,
    LoseOpponent,
    NearObject,
    NearOpponent,
    PikminLand,
    PikminLatch,
    PikminTouch,
    ReachHome,
    Revival,
    SeeObject,
    SeeOpponent,
    Timer,
    Wall,
}

impl EventType {
    pub const ALL: [EventType; 24] = [
        EventType::OnEnter,
        EventType::OnLeave,
        EventType::AnimationEnd,
        EventType::AttackHit,
        EventType::AttackMiss,
        EventType::BigDamage,
        EventType::Damage,
        EventType::Death,
        EventType::EnterHazard,
        EventType::Idle,
        EventType::LeaveHazard,
        EventType::LoseObject,
        EventType::LoseOpponent,
        EventType::NearObject,
        EventType::NearOpponent,
        EventType::PikminLand,
        EventType::PikminLatch,
        EventType::PikminTouch,
        EventType::ReachHome,
        EventType::Revival,
        EventType::SeeObject,
        EventType::SeeOpponent,
        EventType::Timer,
        EventType::Wall,
    ];

    /// Name used in script data.
    pub fn as_key(self) -> &'static str {
        match self {
            EventType::OnEnter => "on_enter",
            EventType::OnLeave => "on_leave",
            EventType::AnimationEnd => "on_animation_end",
            EventType::AttackHit => "on_attack_hit",
            EventType::AttackMiss => "on_attack_miss",
            EventType::BigDamage => "on_big_damage",
            EventType::Damage => "on_damage",
            EventType::Death => "on_death",
            EventType::EnterHazard => "on_enter_hazard",
            EventType::Idle => "on_idle",
            EventType::LeaveHazard => "on_leave_hazard",
            EventType::LoseObject => "on_lose_object",
            EventType::LoseOpponent => "on_lose_opponent",
            EventType::NearObject => "on_near_object",
            EventType::NearOpponent => "on_near_opponent",
            EventType::PikminLand => "on_pikmin_land",
            EventType::PikminLatch => "on_pikmin_latch",
            EventType::PikminTouch => "on_pikmin_touch",
            EventType::ReachHome => "on_reach_home",
            EventType::Revival => "on_revival",
            EventType::SeeObject => "on_see_object",
            EventType::SeeOpponent => "on_see_opponent",
            EventType::Timer => "on_timer",
            EventType::Wall => "on_wall",
        }
    }

    pub fn from_key(key: &str) -> Option<EventType> {
        EventType::ALL.into_iter().find(|e| e.as_key() == key)
    }
}

/// An event handler of one state: the actions to run when its occurrence fires.
#[derive(Debug, Clone, PartialEq)]
pub struct Event {
    pub kind: EventType,
    pub actions: Vec<Action>,
}

/// How a run of an event's action list ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventOutcome {
    /// Ran to the end; the mob is free to take another event.
    Finished,
    /// Stopped at a wait; a cursor to the next action has been saved on the mob.
    Suspended,
    /// A state change cut the rest of the list off.
    Abandoned,
}

/// Run the `kind` event of `state` for the mob at `idx`, starting at action `start`.
///
/// Guards (dead mob, suspended on another event) are the FSM's business; this only executes.
pub(crate) fn run(world: &mut World, idx: usize, state: usize, kind: EventType, start: usize) -> EventOutcome {
    let Some(mob_type) = world.mobs.get(idx).map(|m| Arc::clone(&m.mob_type)) else {
        return EventOutcome::Finished;
    };
    let Some(event) = mob_type.script.get(state).and_then(|s| s.event(kind)) else {
        return EventOutcome::Finished;
    };
    trace!(
        "mob '{}': running {} from action {start}",
        mob_type.name,
        kind.as_key()
    );

    let ctx = ActionContext {
        mob: idx,
        state,
        event: kind,
    };
    let mut next = start;
    while next < event.actions.len() {
        let flow = action::execute(world, &ctx, &event.actions[next]);
        next += 1;
        match flow {
            Flow::Continue => {},
            Flow::SkipNext => next += 1,
            Flow::Suspend(wait) => {
                if let Some(mob) = world.mobs.get_mut(idx) {
                    mob.fsm.suspend(
                        wait,
                        Cursor {
                            state,
                            event: kind,
                            next,
                        },
                    );
                }
                return EventOutcome::Suspended;
            },
            Flow::Abandon => return EventOutcome::Abandoned,
        }
    }

    if let Some(mob) = world.mobs.get_mut(idx) {
        mob.fsm.clear_wait();
    }
    EventOutcome::Finished
}
