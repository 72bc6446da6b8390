//! HTTP client for fetching recorded streams from a remote endpoint.

use crate::parser::schema::RecordedStream;
use crate::parser::stream::validate_stream;
use crate::utils::config::DEFAULT_HTTP_TIMEOUT;
use crate::utils::error::SourceError;
use log::{debug, info};
use reqwest::blocking::Client;
use reqwest::StatusCode;

/// Fetch a recorded stream document over HTTP
///
/// **Public** - main entry point for remote stream input
///
/// # Arguments
/// * `url` - URL serving a recorded stream JSON document
///
/// # Returns
/// Parsed and validated stream, ready for replay
///
/// # Errors
/// * `SourceError::RequestFailed` - connection or protocol failure
/// * `SourceError::NotFound` - endpoint returned 404
/// * `SourceError::InvalidResponse` - non-success status or bad payload
pub fn fetch_stream(url: &str) -> Result<RecordedStream, SourceError> {
    info!("Fetching recorded stream from: {}", url);

    let client = Client::builder()
        .timeout(DEFAULT_HTTP_TIMEOUT)
        .build()
        .map_err(SourceError::RequestFailed)?;

    let response = client.get(url).send().map_err(SourceError::RequestFailed)?;

    if response.status() == StatusCode::NOT_FOUND {
        return Err(SourceError::NotFound(url.to_string()));
    }

    if !response.status().is_success() {
        return Err(SourceError::InvalidResponse(format!(
            "HTTP {}: {}",
            response.status(),
            response.text().unwrap_or_default()
        )));
    }

    let stream: RecordedStream = response.json().map_err(SourceError::RequestFailed)?;

    validate_stream(&stream)
        .map_err(|e| SourceError::InvalidResponse(format!("invalid stream document: {}", e)))?;

    debug!(
        "Fetched stream: session '{}', {} batches",
        stream.session.name,
        stream.batches.len()
    );

    Ok(stream)
}
