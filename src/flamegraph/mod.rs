//! Flamegraph generation from collapsed stacks.
//!
//! A hand-rolled SVG generator keeps the dependency tree small and
//! allows custom color coding per frame category and an inverted
//! layout (root at the bottom).

pub mod generator;

pub use generator::{generate_flamegraph, generate_text_summary, FlamegraphConfig};
