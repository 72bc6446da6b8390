//! Replay command implementation.
//!
//! The replay command:
//! 1. Loads a recorded event stream (file or HTTP)
//! 2. Drives it through the aggregation engine batch-by-batch
//! 3. Collects the final CCT through a listener
//! 4. Calculates metrics and generates the flamegraph
//! 5. Writes output files

use crate::builders::{AllocationEvent, AllocationsBackend, SampledStacksBackend, StackSample};
use crate::cct::{calculate_hot_paths, calculate_weight_distribution, CctNode, CollapsedStack};
use crate::engine::{
    CallGraphBuilder, CctListener, GraphBackend, ProfilingMode, ProfilingSession, SessionStatus,
};
use crate::flamegraph::{generate_flamegraph, generate_text_summary, FlamegraphConfig};
use crate::output::{write_profile, write_svg};
use crate::parser::schema::{Profile, RecordedBatch, RecordedStream};
use crate::parser::stream::parse_stream;
use crate::source::fetch_stream;
use crate::utils::config::{DEFAULT_TOP_PATHS, SCHEMA_VERSION};
use crate::utils::error::EngineError;
use anyhow::{bail, Context, Result};
use chrono::Utc;
use log::{debug, info, warn};
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use std::time::Instant;

/// Arguments for the replay command
///
/// **Public** - used by main.rs to construct from CLI args
#[derive(Debug, Clone)]
pub struct ReplayArgs {
    /// Path to a recorded stream JSON file
    pub input: Option<PathBuf>,

    /// URL serving a recorded stream JSON document
    pub url: Option<String>,

    /// Output path for the JSON profile
    pub output_json: PathBuf,

    /// Output path for the SVG flamegraph (optional)
    pub output_svg: Option<PathBuf>,

    /// Number of top hot paths to include in the profile
    pub top_paths: usize,

    /// Flamegraph configuration
    pub flamegraph_config: Option<FlamegraphConfig>,

    /// Print text summary to stdout
    pub print_summary: bool,
}

impl Default for ReplayArgs {
    fn default() -> Self {
        Self {
            input: None,
            url: None,
            output_json: PathBuf::from("profile.json"),
            output_svg: None,
            top_paths: DEFAULT_TOP_PATHS,
            flamegraph_config: None,
            print_summary: false,
        }
    }
}

/// Validate replay arguments before doing any work
pub fn validate_args(args: &ReplayArgs) -> Result<()> {
    match (&args.input, &args.url) {
        (None, None) => bail!("either --input or --url must be given"),
        (Some(_), Some(_)) => bail!("--input and --url are mutually exclusive"),
        _ => {}
    }
    if args.top_paths == 0 {
        bail!("--top-paths must be at least 1");
    }
    Ok(())
}

/// Snapshot of the aggregate taken at the last batch boundary
#[derive(Debug, Clone, Default)]
struct CctSummary {
    stacks: Vec<CollapsedStack>,
    total_weight: u64,
    node_count: usize,
}

/// Listener that keeps the most recent batch-boundary snapshot
#[derive(Default)]
struct SummaryCollector {
    latest: Mutex<Option<CctSummary>>,
}

impl SummaryCollector {
    fn take(&self) -> Option<CctSummary> {
        self.latest.lock().unwrap_or_else(|e| e.into_inner()).take()
    }
}

impl CctListener for SummaryCollector {
    fn cct_established(&self, root: &CctNode, empty: bool) {
        debug!(
            "Batch boundary: {} nodes, total weight {}, empty: {}",
            root.node_count(),
            root.total_weight,
            empty
        );

        let summary = CctSummary {
            stacks: root.collapsed_stacks(),
            total_weight: root.total_weight,
            node_count: root.node_count(),
        };
        *self.latest.lock().unwrap_or_else(|e| e.into_inner()) = Some(summary);
    }

    fn cct_reset(&self) {
        *self.latest.lock().unwrap_or_else(|e| e.into_inner()) = None;
    }
}

/// Execute the replay command
///
/// **Public** - main entry point called from main.rs
///
/// # Errors
/// * Stream load/parse failures
/// * Engine failures (mode mismatch, batch protocol violations)
/// * File write errors
pub fn execute_replay(args: ReplayArgs) -> Result<()> {
    let start_time = Instant::now();

    // Step 1: Load the recorded stream
    info!("Step 1/5: Loading recorded stream...");
    let stream = load_stream(&args).context("Failed to load recorded stream")?;

    info!(
        "Replaying session '{}' ({} mode, {} batches)",
        stream.session.name,
        stream.session.mode,
        stream.batches.len()
    );

    // Step 2: Drive the stream through the engine
    info!("Step 2/5: Replaying batches through the engine...");
    let session = Arc::new(ProfilingSession::new(
        stream.session.name.clone(),
        stream.session.pid,
        stream.session.mode,
    ));
    session.set_status(SessionStatus::Running);

    let collector = Arc::new(SummaryCollector::default());
    let record_count = replay_stream(&stream, &session, &collector)
        .context("Engine failure during replay")?;

    session.set_status(SessionStatus::Terminated);
    debug!("Replayed {} records", record_count);

    let summary = collector.take().unwrap_or_default();
    if summary.stacks.is_empty() {
        warn!("Stream produced no aggregate data");
    }

    // Step 3: Calculate metrics
    info!("Step 3/5: Calculating top {} hot paths...", args.top_paths);
    let distribution = calculate_weight_distribution(&summary.stacks);
    info!("Weight distribution: {}", distribution.summary());

    let hot_paths = calculate_hot_paths(&summary.stacks, summary.total_weight, args.top_paths);

    // Step 4: Generate flamegraph (if requested)
    let svg_content = match &args.output_svg {
        Some(_) if summary.stacks.is_empty() => {
            warn!("Step 4/5: Skipping flamegraph (no data)");
            None
        }
        Some(_) => {
            info!("Step 4/5: Generating flamegraph...");
            let svg = generate_flamegraph(&summary.stacks, args.flamegraph_config.as_ref())
                .context("Failed to generate flamegraph")?;
            Some(svg)
        }
        None => {
            info!("Step 4/5: Skipping flamegraph (not requested)");
            None
        }
    };

    // Step 5: Write outputs
    info!("Step 5/5: Writing output files...");
    let profile = Profile {
        version: SCHEMA_VERSION.to_string(),
        session_name: stream.session.name.clone(),
        mode: stream.session.mode,
        total_weight: summary.total_weight,
        record_count,
        batch_count: stream.batches.len() as u64,
        node_count: summary.node_count as u64,
        hot_paths,
        generated_at: Utc::now().to_rfc3339(),
    };

    write_profile(&profile, &args.output_json).context("Failed to write profile JSON")?;

    if let (Some(svg), Some(path)) = (svg_content, &args.output_svg) {
        write_svg(&svg, path).context("Failed to write flamegraph SVG")?;
    }

    if args.print_summary {
        println!(
            "{}",
            generate_text_summary(&summary.stacks, args.top_paths, summary.total_weight)
        );
    }

    info!("Replay finished in {:.2?}", start_time.elapsed());
    Ok(())
}

fn load_stream(args: &ReplayArgs) -> Result<RecordedStream> {
    if let Some(path) = &args.input {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("Cannot read {}", path.display()))?;
        Ok(parse_stream(&raw)?)
    } else if let Some(url) = &args.url {
        Ok(fetch_stream(url)?)
    } else {
        bail!("no stream source given")
    }
}

/// Replay all batches with the backend matching the session mode
fn replay_stream(
    stream: &RecordedStream,
    session: &Arc<ProfilingSession>,
    collector: &Arc<SummaryCollector>,
) -> Result<u64, EngineError> {
    match stream.session.mode {
        ProfilingMode::CpuSampled => drive(
            SampledStacksBackend::new(),
            session,
            collector,
            &stream.batches,
            |batch| {
                batch
                    .samples
                    .iter()
                    .map(|s| StackSample {
                        frames: s.stack.clone(),
                        weight: s.weight,
                    })
                    .collect()
            },
        ),
        ProfilingMode::Allocations => drive(
            AllocationsBackend::new(),
            session,
            collector,
            &stream.batches,
            |batch| {
                batch
                    .allocations
                    .iter()
                    .map(|a| AllocationEvent {
                        site: a.site.clone(),
                        class_name: a.class_name.clone(),
                        bytes: a.bytes,
                        count: a.count,
                    })
                    .collect()
            },
        ),
    }
}

fn drive<B: GraphBackend>(
    backend: B,
    session: &Arc<ProfilingSession>,
    collector: &Arc<SummaryCollector>,
    batches: &[RecordedBatch],
    mut events: impl FnMut(&RecordedBatch) -> Vec<B::Event>,
) -> Result<u64, EngineError> {
    let builder = CallGraphBuilder::new(backend);
    builder.startup(session)?;
    builder.add_listener(Arc::clone(collector) as Arc<dyn CctListener>);

    let mut record_count = 0u64;
    for batch in batches {
        builder.on_batch_start()?;
        for event in events(batch) {
            builder.record(event);
            record_count += 1;
        }
        builder.on_batch_stop()?;
    }

    builder.shutdown()?;
    Ok(record_count)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_args_requires_a_source() {
        let args = ReplayArgs::default();
        assert!(validate_args(&args).is_err());
    }

    #[test]
    fn test_validate_args_rejects_both_sources() {
        let args = ReplayArgs {
            input: Some(PathBuf::from("stream.json")),
            url: Some("http://localhost/stream.json".to_string()),
            ..ReplayArgs::default()
        };
        assert!(validate_args(&args).is_err());
    }

    #[test]
    fn test_validate_args_accepts_single_source() {
        let args = ReplayArgs {
            input: Some(PathBuf::from("stream.json")),
            ..ReplayArgs::default()
        };
        assert!(validate_args(&args).is_ok());
    }

    #[test]
    fn test_validate_args_rejects_zero_top_paths() {
        let args = ReplayArgs {
            input: Some(PathBuf::from("stream.json")),
            top_paths: 0,
            ..ReplayArgs::default()
        };
        assert!(validate_args(&args).is_err());
    }
}
