//! Calling-context tree (CCT) data structures.
//!
//! The CCT is the aggregate produced by the engine: one node per
//! distinct frame in a calling context, weights accumulated over all
//! recorded events. Collapsed stacks derived from the tree are the
//! input format for flamegraph generation:
//! "parent;child;grandchild weight".

pub mod metrics;
pub mod node;

pub use metrics::{calculate_hot_paths, calculate_weight_distribution, WeightDistribution};
pub use node::{CctNode, CollapsedStack};
