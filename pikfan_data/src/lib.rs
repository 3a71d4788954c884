//! Shared content model for the pikfan engine.

pub mod data_node;
pub mod defs;
pub mod validate;

pub use data_node::DataNode;
pub use defs::*;
pub use validate::{ValidationError, validate_content};
