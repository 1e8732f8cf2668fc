//! Error types for the retrieval chat client
//!
//! Library code returns these `thiserror` enums; the front end wraps them
//! in `anyhow` where it only needs to report.

use std::time::Duration;

use thiserror::Error;

/// Failure of a request to the retrieval service.
///
/// Every variant is shown to the user as `Error: <message>`.
#[derive(Error, Debug)]
pub enum RetrievalError {
    /// Request could not be sent or no response was received
    #[error("network failure: {0}")]
    Network(String),

    /// Service answered with a non-2xx status
    #[error("HTTP error! status: {}{}", .status, fmt_body(.body))]
    Server { status: u16, body: String },

    /// Request deadline elapsed before the service answered
    #[error("request timed out after {}s", .0.as_secs_f32())]
    Timeout(Duration),

    #[error("request cancelled")]
    Cancelled,

    /// 2xx response whose body was not the expected JSON
    #[error("invalid response body: {0}")]
    Decode(String),
}

fn fmt_body(body: &str) -> String {
    let body = body.trim();
    if body.is_empty() {
        String::new()
    } else {
        format!(" ({})", body)
    }
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("could not determine config directory")]
    NoConfigDir,

    #[error("config I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("config parse error: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("invalid config value: {0}")]
    Invalid(String),
}
