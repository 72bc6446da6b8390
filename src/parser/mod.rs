//! Recorded-stream parsing and schema definitions.
//!
//! This module handles:
//! - Parsing recorded profiling event streams from JSON
//! - Validating stream version and mode consistency
//! - Defining the output profile schema

pub mod schema;
pub mod stream;

pub use schema::{
    AllocationRecord, HotPath, Profile, RecordedBatch, RecordedStream, SampleRecord, SessionInfo,
};
pub use stream::{parse_stream, validate_stream};
