//! CLI command implementations.
//!
//! Commands orchestrate the library components to perform user tasks.

pub mod replay;

pub use replay::{execute_replay, validate_args, ReplayArgs};
