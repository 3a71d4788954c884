//! Script actions.
//!
//! An [`Action`] is one instruction of an event's action list. Actions are parsed once per mob
//! type from the script tree and shared read-only by every mob of that type. Each variant carries
//! exactly the arguments it needs, already resolved (animation, hitbox and state names become
//! indices at load time).
//!
//! # Action vocabulary
//!
//! | key | value | variant |
//! |---|---|---|
//! | `move` | `opponent` / `home` / `stop` / `X Y` / `relative DX DY` | [`Action::Move`] |
//! | `animation` | animation name | [`Action::SetAnimation`] |
//! | `gravity` | boolean | [`Action::SetGravity`] |
//! | `health` | `N` / `relative N` | [`Action::SetHealth`] |
//! | `timer` | seconds | [`Action::SetTimer`] |
//! | `var` | `key value` | [`Action::SetVar`] |
//! | `if` | `key value` | [`Action::If`] |
//! | `state` | state name | [`Action::SetState`] |
//! | `chomp` | hitbox names | [`Action::ChompHitboxes`] |
//! | `eat` | `all` / `N` | [`Action::Eat`] |
//! | `special_function` | hook name | [`Action::SpecialFunction`] |
//! | `turn` | `opponent` / `home` / degrees | [`Action::Turn`] |
//! | `speed` | multiplier | [`Action::SetSpeed`] |
//! | `play_sound` | sound name | [`Action::PlaySound`] |
//! | `particle` | particle name | [`Action::SpawnParticle`] |
//! | `wait` | `animation` / seconds | [`Action::Wait`] |
//!
//! # Error Handling
//!
//! Parsing never fails outright. A malformed action is reported to the error sink and replaced by
//! [`Action::Invalid`], which keeps its slot in the list (so `if` still skips the right action)
//! and does nothing when executed.

use log::trace;
use pikfan_data::DataNode;

use super::error::{ErrorSink, Origin, ScriptError};
use super::event::EventType;
use super::fsm::{self, ScriptWait};
use super::special::ActionContext;
use super::state::ScriptContext;
use crate::fx::{Fx, ParticleKind};
use crate::helpers::Point;
use crate::mob::ChaseTarget;
use crate::world::World;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MoveKind {
    /// Chase the focused opponent; stop if there is none.
    Opponent,
    Home,
    Stop,
    Coords(Point),
    /// Offset from wherever the mob is when the action runs.
    Relative(Point),
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum HealthMode {
    Absolute,
    Relative,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EatAmount {
    All,
    /// Up to this many victims, oldest grab first.
    UpTo(usize),
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TurnKind {
    Opponent,
    Home,
    /// Absolute facing, in radians.
    Angle(f32),
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum WaitKind {
    Time(f32),
    Animation,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    Move(MoveKind),
    SetAnimation(usize),
    SetGravity(bool),
    SetHealth { mode: HealthMode, amount: f32 },
    SetTimer(f32),
    SetVar { key: String, value: String },
    If { key: String, value: String },
    SetState(usize),
    ChompHitboxes(Vec<usize>),
    Eat(EatAmount),
    SpecialFunction(String),
    Turn(TurnKind),
    SetSpeed(f32),
    PlaySound(String),
    SpawnParticle(String),
    Wait(WaitKind),
    /// Placeholder for an action that failed to load.
    Invalid { name: String },
}

/// What the event runner should do after an action.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) enum Flow {
    Continue,
    SkipNext,
    Suspend(ScriptWait),
    /// The state changed; drop the rest of this event.
    Abandon,
}

impl Action {
    /// Parse one action node (`name = value`).
    ///
    /// # Parameters
    ///
    /// * `node` - the action node; its name selects the opcode, its value holds the arguments
    /// * `state_names` - every state of the owning type, for resolving `state = X`
    /// * `ctx` - animations, hitboxes and hooks of the owning type
    /// * `event` - the event this action belongs to (`wait` is rejected inside `on_leave`)
    /// * `sink` - receives a diagnostic for every problem found
    pub fn parse(
        node: &DataNode,
        state_names: &[String],
        ctx: &ScriptContext<'_>,
        event: EventType,
        sink: &mut dyn ErrorSink,
    ) -> Action {
        match parse_inner(node, state_names, ctx, event) {
            Ok(action) => action,
            Err(err) => {
                sink.report(err);
                Action::Invalid {
                    name: node.name.clone(),
                }
            },
        }
    }

    pub fn is_valid(&self) -> bool {
        !matches!(self, Action::Invalid { .. })
    }
}

fn parse_inner(
    node: &DataNode,
    state_names: &[String],
    ctx: &ScriptContext<'_>,
    event: EventType,
) -> Result<Action, ScriptError> {
    let value = node.value.trim();
    let words = node.words();
    let invalid = || ScriptError::InvalidArgument {
        action: node.name.clone(),
        value: node.value.clone(),
        origin: Origin::of(node),
    };
    let number = |s: &str| s.parse::<f32>().ok().filter(|n| n.is_finite()).ok_or_else(invalid);

    let action = match node.name.as_str() {
        "move" => Action::Move(match words.as_slice() {
            ["opponent"] => MoveKind::Opponent,
            ["home"] => MoveKind::Home,
            ["stop"] => MoveKind::Stop,
            ["relative", dx, dy] => MoveKind::Relative(Point::new(number(*dx)?, number(*dy)?)),
            [x, y] => MoveKind::Coords(Point::new(number(*x)?, number(*y)?)),
            _ => return Err(invalid()),
        }),
        "animation" => Action::SetAnimation(ctx.animations.find_animation(value).ok_or_else(|| {
            ScriptError::UnknownAnimation {
                name: value.to_string(),
                origin: Origin::of(node),
            }
        })?),
        "gravity" => Action::SetGravity(parse_bool(value).ok_or_else(invalid)?),
        "health" => match words.as_slice() {
            ["relative", amount] => Action::SetHealth {
                mode: HealthMode::Relative,
                amount: number(*amount)?,
            },
            [amount] => Action::SetHealth {
                mode: HealthMode::Absolute,
                amount: number(*amount)?,
            },
            _ => return Err(invalid()),
        },
        "timer" => Action::SetTimer(non_negative(number(value)?).ok_or_else(invalid)?),
        "var" | "if" => {
            let [key, rest @ ..] = words.as_slice() else {
                return Err(invalid());
            };
            if rest.is_empty() {
                return Err(invalid());
            }
            let (key, value) = ((*key).to_string(), rest.join(" "));
            if node.name == "var" {
                Action::SetVar { key, value }
            } else {
                Action::If { key, value }
            }
        },
        "state" => Action::SetState(state_names.iter().position(|s| s == value).ok_or_else(|| {
            ScriptError::UnknownState {
                name: value.to_string(),
                origin: Origin::of(node),
            }
        })?),
        "chomp" => Action::ChompHitboxes(
            words
                .iter()
                .map(|name| {
                    ctx.animations
                        .find_hitbox(name)
                        .ok_or_else(|| ScriptError::UnknownHitbox {
                            name: (*name).to_string(),
                            origin: Origin::of(node),
                        })
                })
                .collect::<Result<Vec<_>, _>>()?,
        ),
        "eat" => match value {
            "all" => Action::Eat(EatAmount::All),
            n => {
                let n: usize = n.parse().map_err(|_| invalid())?;
                if !ctx.allow_partial_eat {
                    return Err(ScriptError::Unsupported {
                        action: node.name.clone(),
                        detail: format!("eating a number of victims ({n}); use 'eat = all'"),
                        origin: Origin::of(node),
                    });
                }
                Action::Eat(EatAmount::UpTo(n))
            },
        },
        "special_function" => {
            if !ctx.specials.knows(value) {
                return Err(ScriptError::UnknownSpecialFunction {
                    name: value.to_string(),
                    origin: Origin::of(node),
                });
            }
            Action::SpecialFunction(value.to_string())
        },
        "turn" => Action::Turn(match value {
            "opponent" => TurnKind::Opponent,
            "home" => TurnKind::Home,
            degrees => TurnKind::Angle(number(degrees)?.to_radians()),
        }),
        "speed" => Action::SetSpeed(non_negative(number(value)?).ok_or_else(invalid)?),
        "play_sound" if !value.is_empty() => Action::PlaySound(value.to_string()),
        "particle" if !value.is_empty() => Action::SpawnParticle(value.to_string()),
        "play_sound" | "particle" => return Err(invalid()),
        "wait" => {
            if event == EventType::OnLeave {
                return Err(ScriptError::WaitInLeave {
                    origin: Origin::of(node),
                });
            }
            match value {
                "animation" => Action::Wait(WaitKind::Animation),
                secs => Action::Wait(WaitKind::Time(non_negative(number(secs)?).ok_or_else(invalid)?)),
            }
        },
        "projectile" => {
            return Err(ScriptError::Unsupported {
                action: node.name.clone(),
                detail: "projectiles are not simulated".to_string(),
                origin: Origin::of(node),
            });
        },
        other => {
            return Err(ScriptError::UnknownAction {
                name: other.to_string(),
                origin: Origin::of(node),
            });
        },
    };
    Ok(action)
}

fn parse_bool(s: &str) -> Option<bool> {
    match s.to_ascii_lowercase().as_str() {
        "true" | "yes" | "y" | "t" | "1" => Some(true),
        "false" | "no" | "n" | "f" | "0" => Some(false),
        _ => None,
    }
}

fn non_negative(n: f32) -> Option<f32> {
    (n >= 0.0).then_some(n)
}

/// Execute one action for the mob `ctx.mob`.
pub(crate) fn execute(world: &mut World, ctx: &ActionContext, action: &Action) -> Flow {
    use Action::*;
    let idx = ctx.mob;
    if idx >= world.mobs.len() {
        return Flow::Continue;
    }
    match action {
        Move(kind) => move_mob(world, idx, *kind),
        SetAnimation(anim) => {
            trace!("└─ action: SetAnimation({anim})");
            world.mobs[idx].anim.change(*anim);
        },
        SetGravity(on) => {
            trace!("└─ action: SetGravity({on})");
            world.mobs[idx].affected_by_gravity = *on;
        },
        SetHealth { mode, amount } => {
            let health = &mut world.mobs[idx].health;
            match mode {
                HealthMode::Absolute => health.set(*amount),
                HealthMode::Relative => health.adjust(*amount),
            }
            trace!("└─ action: SetHealth({mode:?}, {amount}) -> {}", health.current_hp());
        },
        SetTimer(secs) => {
            trace!("└─ action: SetTimer({secs})");
            let mob = &mut world.mobs[idx];
            mob.timer = *secs;
            mob.timer_interval = *secs;
        },
        SetVar { key, value } => {
            trace!("└─ action: SetVar({key} = {value})");
            world.mobs[idx].vars.insert(key.clone(), value.clone());
        },
        If { key, value } => {
            let holds = world.mobs[idx].var(key) == value;
            trace!("└─ action: If({key} == {value}) -> {holds}");
            if !holds {
                return Flow::SkipNext;
            }
        },
        SetState(state) => {
            trace!("└─ action: SetState({state})");
            fsm::set_state(world, idx, *state);
            return Flow::Abandon;
        },
        ChompHitboxes(hitboxes) => {
            trace!("└─ action: ChompHitboxes({hitboxes:?})");
            world.mobs[idx].chomp_hitboxes.clone_from(hitboxes);
        },
        Eat(amount) => eat(world, idx, *amount),
        SpecialFunction(name) => {
            trace!("└─ action: SpecialFunction({name})");
            let category = world.mobs[idx].category;
            if let Some(hook) = world.specials.lookup(category, name) {
                hook(world, ctx);
            }
        },
        Turn(kind) => turn_mob(world, idx, *kind),
        SetSpeed(mult) => {
            trace!("└─ action: SetSpeed({mult})");
            world.mobs[idx].speed_multiplier = *mult;
        },
        PlaySound(name) => {
            trace!("└─ action: PlaySound({name})");
            let at = world.mobs[idx].pos;
            world.fx.push(Fx::Sound {
                name: name.clone(),
                at,
            });
        },
        SpawnParticle(name) => {
            trace!("└─ action: SpawnParticle({name})");
            let at = world.mobs[idx].pos;
            world.fx.push(Fx::Particles {
                kind: ParticleKind::Named(name.clone()),
                at,
                count: 1,
            });
        },
        Wait(WaitKind::Time(secs)) => {
            trace!("└─ action: Wait({secs}s)");
            if *secs > 0.0 {
                return Flow::Suspend(ScriptWait::Timer(*secs));
            }
        },
        Wait(WaitKind::Animation) => {
            trace!("└─ action: Wait(animation)");
            if !world.mobs[idx].anim.is_finished() {
                return Flow::Suspend(ScriptWait::AnimationEnd);
            }
        },
        Invalid { .. } => {},
    }
    Flow::Continue
}

fn move_mob(world: &mut World, idx: usize, kind: MoveKind) {
    trace!("└─ action: Move({kind:?})");
    let opponent = world.mobs[idx]
        .focused_opponent
        .filter(|id| world.index_of(*id).is_some());
    let mob = &mut world.mobs[idx];
    match kind {
        MoveKind::Opponent => match opponent {
            Some(id) => mob.set_target(ChaseTarget::mob(id, Point::ZERO, false)),
            None => mob.remove_target(true),
        },
        MoveKind::Home => {
            mob.set_target(ChaseTarget::point(mob.home));
            mob.target_is_home = true;
        },
        MoveKind::Stop => mob.remove_target(true),
        MoveKind::Coords(p) => mob.set_target(ChaseTarget::point(p)),
        MoveKind::Relative(offset) => mob.set_target(ChaseTarget::point(mob.pos + offset)),
    }
}

fn turn_mob(world: &mut World, idx: usize, kind: TurnKind) {
    trace!("└─ action: Turn({kind:?})");
    let opponent_pos = world.mobs[idx]
        .focused_opponent
        .and_then(|id| world.index_of(id))
        .map(|o| world.mobs[o].pos);
    let mob = &mut world.mobs[idx];
    match kind {
        TurnKind::Opponent => {
            if let Some(p) = opponent_pos {
                mob.face(mob.pos.angle_to(p));
            }
        },
        TurnKind::Home => {
            if mob.home != mob.pos {
                mob.face(mob.pos.angle_to(mob.home));
            }
        },
        TurnKind::Angle(a) => mob.face(a),
    }
}

fn eat(world: &mut World, idx: usize, amount: EatAmount) {
    let victims: Vec<_> = {
        let chomping = &mut world.mobs[idx].chomping;
        let n = match amount {
            EatAmount::All => chomping.len(),
            EatAmount::UpTo(n) => n.min(chomping.len()),
        };
        chomping.drain(..n).collect()
    };
    trace!("└─ action: Eat({amount:?}) -> {} victims", victims.len());
    for id in victims {
        if let Some(v) = world.index_of(id) {
            world.mobs[v].health.set(0.0);
        }
    }
}
