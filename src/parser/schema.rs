//! JSON schema definitions for recorded streams and profile output.
//!
//! Both schemas are versioned to allow future evolution; a major
//! version mismatch is rejected at parse time.

use crate::engine::ProfilingMode;
use serde::{Deserialize, Serialize};

/// A recorded profiling event stream, as read from disk or HTTP.
///
/// Batches appear in delivery order; each batch carries the records of
/// one delivery cycle for the session's mode.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecordedStream {
    /// Schema version for compatibility checking
    pub version: String,

    /// Session metadata captured at recording time
    pub session: SessionInfo,

    /// Event batches in delivery order
    #[serde(default)]
    pub batches: Vec<RecordedBatch>,
}

/// Session metadata embedded in a recorded stream
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionInfo {
    /// Display name of the profiled target
    pub name: String,

    /// Process id of the profiled target, if known
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pid: Option<u32>,

    /// Aggregation mode the stream was recorded under
    pub mode: ProfilingMode,
}

/// One delivery cycle worth of records.
///
/// Exactly one of the record kinds is populated, matching the
/// session mode; an empty batch is legal (it yields an empty-flagged
/// notification downstream).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RecordedBatch {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub samples: Vec<SampleRecord>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub allocations: Vec<AllocationRecord>,
}

impl RecordedBatch {
    pub fn record_count(&self) -> usize {
        self.samples.len() + self.allocations.len()
    }
}

/// One sampled call stack
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SampleRecord {
    /// Frames, outermost first
    pub stack: Vec<String>,

    /// Sample weight; defaults to 1 (one sample hit)
    #[serde(default = "default_weight")]
    pub weight: u64,
}

/// One allocation record
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AllocationRecord {
    /// Allocation site as a collapsed path ("outer;inner")
    pub site: String,

    /// Allocated class or type name
    pub class_name: String,

    /// Bytes allocated
    pub bytes: u64,

    /// Number of objects; defaults to 1
    #[serde(default = "default_weight")]
    pub count: u64,
}

fn default_weight() -> u64 {
    1
}

/// Top-level profile structure written to JSON
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Profile {
    /// Schema version for compatibility checking
    pub version: String,

    /// Name of the profiled session
    pub session_name: String,

    /// Aggregation mode
    pub mode: ProfilingMode,

    /// Total weight recorded (samples or bytes, per mode)
    pub total_weight: u64,

    /// Number of records replayed
    pub record_count: u64,

    /// Number of batches replayed
    pub batch_count: u64,

    /// Number of nodes in the final CCT
    pub node_count: u64,

    /// Top hot paths (ranked by weight)
    pub hot_paths: Vec<HotPath>,

    /// Timestamp when the profile was generated (RFC3339)
    pub generated_at: String,
}

/// A hot path in the aggregate (collapsed stack with weight)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HotPath {
    /// Collapsed stack representation (e.g., "main;execute;store")
    pub stack: String,

    /// Weight attributed to this path
    pub weight: u64,

    /// Percentage of total weight
    pub percentage: f64,
}
