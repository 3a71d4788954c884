//! Mob scripting.
//!
//! Every mob type carries a script: a list of states, each with handlers for some events, each
//! handler an ordered list of actions. Scripts are loaded from a [`pikfan_data::DataNode`] tree
//! once per type; mobs share the loaded script and keep only their own FSM position.

pub mod action;
pub mod error;
pub mod event;
pub mod fsm;
pub mod special;
pub mod state;

pub use action::{Action, EatAmount, HealthMode, MoveKind, TurnKind, WaitKind};
pub use error::{ErrorSink, LogSink, Origin, ScriptError};
pub use event::{Event, EventOutcome, EventType};
pub use fsm::{Cursor, Fsm, ScriptWait, has_event, on_animation_finished, resume, run_event, set_state, tick_wait};
pub use special::{ActionContext, SpecialFn, SpecialFunctionRegistry};
pub use state::{ScriptContext, State, load_script, state_index};
