//! Callgraph Studio CLI
//!
//! Replays recorded profiling event streams through the batched
//! call-graph aggregation engine and generates profiles and
//! flamegraphs.

use anyhow::Result;
use callgraph_studio::commands::{execute_replay, validate_args, ReplayArgs};
use callgraph_studio::flamegraph::FlamegraphConfig;
use callgraph_studio::output::read_profile;
use callgraph_studio::utils::config::{DEFAULT_FLAMEGRAPH_WIDTH, DEFAULT_TOP_PATHS, SCHEMA_VERSION};
use clap::{Parser, Subcommand};
use env_logger::Env;
use std::path::PathBuf;

/// Callgraph Studio - batched call-graph aggregation for profiling streams
#[derive(Parser, Debug)]
#[command(name = "callgraph")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

/// Available commands
#[derive(Subcommand, Debug)]
enum Commands {
    /// Replay a recorded event stream and profile it
    Replay {
        /// Path to a recorded stream JSON file
        #[arg(short, long)]
        input: Option<PathBuf>,

        /// URL serving a recorded stream JSON document
        #[arg(short, long, conflicts_with = "input")]
        url: Option<String>,

        /// Output path for the JSON profile
        #[arg(short, long, default_value = "profile.json")]
        output: PathBuf,

        /// Output path for the SVG flamegraph (optional)
        #[arg(short, long)]
        flamegraph: Option<PathBuf>,

        /// Number of top hot paths to include
        #[arg(long, default_value_t = DEFAULT_TOP_PATHS)]
        top_paths: usize,

        /// Flamegraph title
        #[arg(long)]
        title: Option<String>,

        /// Flamegraph width in pixels
        #[arg(long, default_value_t = DEFAULT_FLAMEGRAPH_WIDTH)]
        width: usize,

        /// Print text summary to stdout
        #[arg(long)]
        summary: bool,
    },

    /// Validate a profile JSON file
    Validate {
        /// Path to profile JSON file
        #[arg(short, long)]
        file: PathBuf,
    },

    /// Display version information
    Version,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let log_level = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(Env::default().default_filter_or(log_level)).init();

    match cli.command {
        Commands::Replay {
            input,
            url,
            output,
            flamegraph,
            top_paths,
            title,
            width,
            summary,
        } => {
            let fg_config = flamegraph.is_some().then(|| {
                let mut config = FlamegraphConfig::new().with_width(width);
                if let Some(title) = title {
                    config = config.with_title(title);
                }
                config
            });

            let args = ReplayArgs {
                input,
                url,
                output_json: output,
                output_svg: flamegraph,
                top_paths,
                flamegraph_config: fg_config,
                print_summary: summary,
            };

            validate_args(&args)?;
            execute_replay(args)?;
        }

        Commands::Validate { file } => {
            validate_profile_file(file)?;
        }

        Commands::Version => {
            display_version();
        }
    }

    Ok(())
}

/// Validate a profile JSON file
fn validate_profile_file(file_path: PathBuf) -> Result<()> {
    println!("Validating profile: {}", file_path.display());

    let profile = read_profile(&file_path)?;

    println!("OK - valid profile JSON");
    println!("  Version: {}", profile.version);
    println!("  Session: {}", profile.session_name);
    println!("  Mode: {}", profile.mode);
    println!("  Total weight: {}", profile.total_weight);
    println!("  Records: {}", profile.record_count);
    println!("  Batches: {}", profile.batch_count);
    println!("  Hot paths: {}", profile.hot_paths.len());

    Ok(())
}

/// Display version information
fn display_version() {
    println!("callgraph-studio {}", env!("CARGO_PKG_VERSION"));
    println!("schema version {}", SCHEMA_VERSION);
}
