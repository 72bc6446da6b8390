//! Callgraph Studio
//!
//! Batched call-graph aggregation and flamegraph generation for
//! recorded profiling event streams.
//!
//! The core of the crate is the [`engine`] module: a batch-oriented
//! aggregation pipeline that folds profiling events into a
//! calling-context tree (CCT) and notifies registered listeners at
//! batch boundaries. Around it sit the pieces a usable tool needs:
//! per-mode aggregation backends, a recorded-stream parser, metrics,
//! SVG flamegraph generation and profile output writers.
//!
//! Most users should install and use the CLI:
//!
//! ```bash
//! cargo install callgraph-studio
//! callgraph --help
//! ```

pub mod builders;
pub mod cct;
pub mod commands;
pub mod engine;
pub mod flamegraph;
pub mod output;
pub mod parser;
pub mod source;
pub mod utils;
