//! Per-mob finite state machine.
//!
//! A mob is always in at most one script state. Events are delivered through [`run_event`], which
//! enforces the delivery rules:
//!
//! * an event the current state doesn't handle is ignored,
//! * a dead mob only ever receives `on_death`,
//! * while an event is suspended on a `wait`, other events are ignored, except `on_death`, which
//!   discards the suspended run and takes over.
//!
//! A suspended run is continued later by [`tick_wait`] (timed waits) or
//! [`on_animation_finished`] (animation waits).

use std::sync::Arc;

use log::debug;

use super::event::{self, EventOutcome, EventType};
use crate::world::World;

/// What a suspended event is waiting for.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub enum ScriptWait {
    #[default]
    Idle,
    /// Seconds left.
    Timer(f32),
    AnimationEnd,
}

/// Where to pick a suspended event back up.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cursor {
    pub state: usize,
    pub event: EventType,
    /// Index of the first action not yet run.
    pub next: usize,
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Fsm {
    pub cur_state: Option<usize>,
    pub wait: ScriptWait,
    pub resume: Option<Cursor>,
}

impl Fsm {
    pub fn suspend(&mut self, wait: ScriptWait, cursor: Cursor) {
        self.wait = wait;
        self.resume = Some(cursor);
    }

    pub fn clear_wait(&mut self) {
        self.wait = ScriptWait::Idle;
        self.resume = None;
    }

    pub fn is_suspended(&self) -> bool {
        self.resume.is_some()
    }

    /// The event currently suspended, if any.
    pub fn suspended_on(&self) -> Option<EventType> {
        self.resume.map(|c| c.event)
    }
}

/// Whether the mob's current state handles `kind`.
pub fn has_event(world: &World, idx: usize, kind: EventType) -> bool {
    world.mobs.get(idx).is_some_and(|mob| {
        mob.fsm
            .cur_state
            .and_then(|s| mob.mob_type.script.get(s))
            .is_some_and(|s| s.has_event(kind))
    })
}

/// Deliver an event to the mob at `idx`. Returns `None` if the event was not delivered.
pub fn run_event(world: &mut World, idx: usize, kind: EventType) -> Option<EventOutcome> {
    let mob = world.mobs.get(idx)?;
    let state = mob.fsm.cur_state?;
    if !has_event(world, idx, kind) {
        return None;
    }
    let mob = &mut world.mobs[idx];
    if mob.dead && kind != EventType::Death {
        return None;
    }
    match mob.fsm.suspended_on() {
        Some(_) if kind == EventType::Death => mob.fsm.clear_wait(),
        Some(waiting) if waiting != kind => return None,
        // The same event again: start over.
        Some(_) => mob.fsm.clear_wait(),
        None => {},
    }
    Some(event::run(world, idx, state, kind, 0))
}

/// Switch the mob at `idx` to `new_state`: `on_leave` of the old state, then `on_enter` of the
/// new one. Any suspended run is discarded. Out of range states are ignored.
pub fn set_state(world: &mut World, idx: usize, new_state: usize) {
    let Some(mob) = world.mobs.get_mut(idx) else {
        return;
    };
    let mob_type = Arc::clone(&mob.mob_type);
    if new_state >= mob_type.script.len() {
        return;
    }
    mob.fsm.clear_wait();
    let old_state = mob.fsm.cur_state;

    if let Some(old) = old_state {
        event::run(world, idx, old, EventType::OnLeave, 0);
    }
    let mob = &mut world.mobs[idx];
    mob.fsm.clear_wait();
    mob.fsm.cur_state = Some(new_state);
    debug!(
        "mob '{}': state '{}' -> '{}'",
        mob_type.name,
        old_state.map_or("<none>", |s| mob_type.script[s].name.as_str()),
        mob_type.script[new_state].name
    );
    event::run(world, idx, new_state, EventType::OnEnter, 0);
}

/// Continue a suspended run from its cursor. Does nothing if there is none, or if the state has
/// changed underneath it.
pub fn resume(world: &mut World, idx: usize) -> Option<EventOutcome> {
    let mob = world.mobs.get_mut(idx)?;
    let cursor = mob.fsm.resume?;
    mob.fsm.clear_wait();
    if mob.fsm.cur_state != Some(cursor.state) {
        return None;
    }
    Some(event::run(world, idx, cursor.state, cursor.event, cursor.next))
}

/// Count down a timed wait and resume when it runs out.
pub fn tick_wait(world: &mut World, idx: usize, dt: f32) {
    let Some(mob) = world.mobs.get_mut(idx) else {
        return;
    };
    if let ScriptWait::Timer(left) = mob.fsm.wait {
        let left = left - dt;
        if left > 0.0 {
            mob.fsm.wait = ScriptWait::Timer(left);
        } else {
            resume(world, idx);
        }
    }
}

/// Resume a run that was waiting for the current animation to end.
pub fn on_animation_finished(world: &mut World, idx: usize) {
    if world
        .mobs
        .get(idx)
        .is_some_and(|m| m.fsm.wait == ScriptWait::AnimationEnd)
    {
        resume(world, idx);
    }
}
