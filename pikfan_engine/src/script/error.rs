//! Load-time script diagnostics.
//!
//! Nothing in here is fatal: the script loader reports each problem to an [`ErrorSink`], marks the
//! offending action invalid (or drops the offending event) and keeps going.

use std::fmt;

use log::error;
use pikfan_data::DataNode;
use thiserror::Error;

/// Where a script node came from.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Origin {
    pub file: String,
    pub line: usize,
}

impl Origin {
    pub fn of(node: &DataNode) -> Origin {
        Origin {
            file: node.file.clone(),
            line: node.line,
        }
    }
}

impl fmt::Display for Origin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let file = if self.file.is_empty() { "<unknown>" } else { &self.file };
        if self.line == 0 {
            write!(f, "{file}")
        } else {
            write!(f, "{file} line {}", self.line)
        }
    }
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ScriptError {
    #[error("unknown script action name \"{name}\" ({origin})")]
    UnknownAction { name: String, origin: Origin },
    #[error("unknown script event name \"{name}\" ({origin})")]
    UnknownEvent { name: String, origin: Origin },
    #[error("unknown animation \"{name}\" ({origin})")]
    UnknownAnimation { name: String, origin: Origin },
    #[error("hitbox \"{name}\" not found ({origin})")]
    UnknownHitbox { name: String, origin: Origin },
    #[error("unknown state \"{name}\" ({origin})")]
    UnknownState { name: String, origin: Origin },
    #[error("unknown special function \"{name}\" ({origin})")]
    UnknownSpecialFunction { name: String, origin: Origin },
    #[error("invalid arguments for '{action}': \"{value}\" ({origin})")]
    InvalidArgument { action: String, value: String, origin: Origin },
    #[error("'wait' is not allowed inside on_leave ({origin})")]
    WaitInLeave { origin: Origin },
    #[error("event \"{name}\" appears twice in state \"{state}\", keeping the first ({origin})")]
    DuplicateEvent { name: String, state: String, origin: Origin },
    #[error("state \"{name}\" is defined twice ({origin})")]
    DuplicateState { name: String, origin: Origin },
    #[error("'{action}' is not yet supported: {detail} ({origin})")]
    Unsupported { action: String, detail: String, origin: Origin },
}

impl ScriptError {
    pub fn origin(&self) -> &Origin {
        match self {
            ScriptError::UnknownAction { origin, .. }
            | ScriptError::UnknownEvent { origin, .. }
            | ScriptError::UnknownAnimation { origin, .. }
            | ScriptError::UnknownHitbox { origin, .. }
            | ScriptError::UnknownState { origin, .. }
            | ScriptError::UnknownSpecialFunction { origin, .. }
            | ScriptError::InvalidArgument { origin, .. }
            | ScriptError::WaitInLeave { origin }
            | ScriptError::DuplicateEvent { origin, .. }
            | ScriptError::DuplicateState { origin, .. }
            | ScriptError::Unsupported { origin, .. } => origin,
        }
    }
}

/// Receives script diagnostics as they are found.
pub trait ErrorSink {
    fn report(&mut self, err: ScriptError);
}

impl ErrorSink for Vec<ScriptError> {
    fn report(&mut self, err: ScriptError) {
        self.push(err);
    }
}

/// Forwards every diagnostic to the error log and counts them.
#[derive(Debug, Default)]
pub struct LogSink {
    pub reported: usize,
}

impl ErrorSink for LogSink {
    fn report(&mut self, err: ScriptError) {
        self.reported += 1;
        error!("script: {err}");
    }
}
