//! Configuration and constants for the CLI.

use std::time::Duration;

/// Default timeout for HTTP stream fetches
pub const DEFAULT_HTTP_TIMEOUT: Duration = Duration::from_secs(30);

/// Current profile/stream schema version
pub const SCHEMA_VERSION: &str = "1.0.0";

/// Default number of hot paths included in a profile
pub const DEFAULT_TOP_PATHS: usize = 20;

/// Default flamegraph width in pixels
pub const DEFAULT_FLAMEGRAPH_WIDTH: usize = 1200;
