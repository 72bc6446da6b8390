//! Mode-specific aggregation backends.
//!
//! Each profiling mode ships its own [`GraphBackend`] implementation,
//! selected at session-configuration time.
//!
//! [`GraphBackend`]: crate::engine::GraphBackend

pub mod allocations;
pub mod sampled;

pub use allocations::{AllocationEvent, AllocationsBackend};
pub use sampled::{SampledStacksBackend, StackSample};
