//! Parser and validator for recorded event streams.

use super::schema::RecordedStream;
use crate::engine::ProfilingMode;
use crate::utils::config::SCHEMA_VERSION;
use crate::utils::error::ParseError;
use log::{debug, warn};

/// Parse a recorded stream from raw JSON
///
/// **Public** - main entry point for parsing
///
/// # Arguments
/// * `raw` - Raw JSON text of a recorded stream document
///
/// # Returns
/// Parsed and validated stream, ready for replay
///
/// # Errors
/// * `ParseError::JsonError` - malformed JSON
/// * `ParseError::UnsupportedVersion` - major version mismatch
/// * `ParseError::InvalidFormat` - mode/record inconsistencies
pub fn parse_stream(raw: &str) -> Result<RecordedStream, ParseError> {
    let stream: RecordedStream = serde_json::from_str(raw)?;
    validate_stream(&stream)?;

    debug!(
        "Parsed stream: session '{}', mode {}, {} batches",
        stream.session.name,
        stream.session.mode,
        stream.batches.len()
    );

    Ok(stream)
}

/// Validate a recorded stream against the schema rules
///
/// Checked here rather than during replay so a bad stream fails fast,
/// before any engine state exists.
pub fn validate_stream(stream: &RecordedStream) -> Result<(), ParseError> {
    check_version(&stream.version)?;

    if stream.batches.is_empty() {
        warn!("Stream contains no batches");
    }

    for (index, batch) in stream.batches.iter().enumerate() {
        match stream.session.mode {
            ProfilingMode::CpuSampled => {
                if !batch.allocations.is_empty() {
                    return Err(ParseError::InvalidFormat(format!(
                        "batch {} carries allocation records in a cpu-sampled stream",
                        index
                    )));
                }
                for sample in &batch.samples {
                    if sample.stack.is_empty() {
                        return Err(ParseError::InvalidFormat(format!(
                            "batch {} contains a sample with an empty stack",
                            index
                        )));
                    }
                    if sample.stack.iter().any(|f| f.is_empty()) {
                        return Err(ParseError::InvalidFormat(format!(
                            "batch {} contains a sample with an empty frame",
                            index
                        )));
                    }
                }
            }
            ProfilingMode::Allocations => {
                if !batch.samples.is_empty() {
                    return Err(ParseError::InvalidFormat(format!(
                        "batch {} carries stack samples in an allocations stream",
                        index
                    )));
                }
                for alloc in &batch.allocations {
                    if alloc.class_name.is_empty() {
                        return Err(ParseError::InvalidFormat(format!(
                            "batch {} contains an allocation with an empty class name",
                            index
                        )));
                    }
                }
            }
        }
    }

    Ok(())
}

/// Accept any stream whose major version matches ours
fn check_version(version: &str) -> Result<(), ParseError> {
    let major = version.split('.').next().unwrap_or("");
    let supported_major = SCHEMA_VERSION.split('.').next().unwrap_or("");

    if major.is_empty() || major != supported_major {
        return Err(ParseError::UnsupportedVersion(version.to_string()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cpu_stream(batches: &str) -> String {
        format!(
            r#"{{
                "version": "1.0.0",
                "session": {{ "name": "demo", "pid": 42, "mode": "cpu-sampled" }},
                "batches": {}
            }}"#,
            batches
        )
    }

    #[test]
    fn test_parse_valid_cpu_stream() {
        let raw = cpu_stream(
            r#"[ { "samples": [ { "stack": ["main", "work"], "weight": 3 } ] }, {} ]"#,
        );
        let stream = parse_stream(&raw).unwrap();

        assert_eq!(stream.session.name, "demo");
        assert_eq!(stream.batches.len(), 2);
        assert_eq!(stream.batches[0].record_count(), 1);
        assert_eq!(stream.batches[1].record_count(), 0);
    }

    #[test]
    fn test_default_sample_weight_is_one() {
        let raw = cpu_stream(r#"[ { "samples": [ { "stack": ["main"] } ] } ]"#);
        let stream = parse_stream(&raw).unwrap();
        assert_eq!(stream.batches[0].samples[0].weight, 1);
    }

    #[test]
    fn test_reject_unsupported_major_version() {
        let raw = r#"{
            "version": "2.0.0",
            "session": { "name": "demo", "mode": "cpu-sampled" },
            "batches": []
        }"#;
        let err = parse_stream(raw).unwrap_err();
        assert!(matches!(err, ParseError::UnsupportedVersion(_)));
    }

    #[test]
    fn test_reject_mode_mismatch() {
        let raw = cpu_stream(
            r#"[ { "allocations": [ { "site": "main", "class_name": "Buf", "bytes": 8 } ] } ]"#,
        );
        let err = parse_stream(&raw).unwrap_err();
        assert!(matches!(err, ParseError::InvalidFormat(_)));
    }

    #[test]
    fn test_reject_empty_stack() {
        let raw = cpu_stream(r#"[ { "samples": [ { "stack": [], "weight": 1 } ] } ]"#);
        let err = parse_stream(&raw).unwrap_err();
        assert!(matches!(err, ParseError::InvalidFormat(_)));
    }

    #[test]
    fn test_minor_version_drift_accepted() {
        let raw = r#"{
            "version": "1.3.7",
            "session": { "name": "demo", "mode": "allocations" },
            "batches": [ { "allocations": [
                { "site": "main", "class_name": "Vec", "bytes": 128, "count": 4 }
            ] } ]
        }"#;
        let stream = parse_stream(raw).unwrap();
        assert_eq!(stream.batches[0].allocations[0].count, 4);
    }
}
