/// Error types shared across the panel
///
/// None of these are fatal: the session controller and the app shell
/// turn every one of them into a log line plus a safe UI state.

use std::path::PathBuf;
use thiserror::Error;

/// Failures talking to the image service
#[derive(Debug, Error)]
pub enum ApiError {
    /// Connection refused, DNS failure, broken body stream...
    #[error("request to {url} failed: {source}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    /// The server answered with something other than 2xx
    #[error("{url} returned HTTP {status}")]
    Status { url: String, status: u16 },

    /// The body was not the JSON shape we expect
    #[error("malformed response payload: {0}")]
    Payload(#[from] serde_json::Error),

    /// The image bytes could not be decoded into a bitmap
    #[error("could not decode image: {0}")]
    Decode(#[from] image::ImageError),
}

/// Failures loading the optional config file
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config in {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}
