//! Batched call-graph aggregation engine.
//!
//! The engine receives profiling events grouped into discrete batches
//! (one batch per sampling tick or received data buffer), folds them
//! into a calling-context tree via a mode-specific [`GraphBackend`],
//! and notifies registered [`CctListener`]s at batch boundaries.
//!
//! Lifecycle: `startup` binds the profiling session, then the delivery
//! thread drives `on_batch_start` / `record` / `on_batch_stop` cycles;
//! `reset` discards accumulated state on demand and `shutdown` tears
//! the pipeline down. Batch boundaries are assumed non-overlapping;
//! the engine guards against a second `on_batch_start` without an
//! intervening stop.

pub mod builder;
pub mod listener;
pub mod session;

pub use builder::{CallGraphBuilder, GraphBackend};
pub use listener::{CctListener, ListenerSet};
pub use session::{ProfilingMode, ProfilingSession, SessionStatus};
