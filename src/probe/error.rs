//! Error types for the probe module.
//!
//! Every variant except [`ProbeError::ClientBuild`] is local to a single
//! dispatched task: it is reported on the diagnostic stream and ends that task
//! only. The `Display` output of those variants is the diagnostic line itself.

use std::error::Error as StdError;
use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur while probing a single URL.
#[derive(Debug, Error)]
pub enum ProbeError {
    /// The request could not be assembled (bad method, header, or body).
    #[error("failed to create request: {reason}")]
    BuildRequest {
        /// The raw input line.
        url: String,
        /// Why the request was rejected.
        reason: String,
    },

    /// Network-level failure: DNS, connect, TLS, timeout, protocol.
    #[error("request failed: {}", chain(source))]
    Request {
        /// The raw input line.
        url: String,
        /// The underlying transport error.
        #[source]
        source: reqwest::Error,
    },

    /// The response body could not be fully buffered.
    #[error("failed to read body: {}", chain(source))]
    ReadBody {
        /// The raw input line.
        url: String,
        /// The underlying transport error.
        #[source]
        source: reqwest::Error,
    },

    /// The artifact's parent directories could not be created.
    #[error("failed to create dir: {}: {source}", path.display())]
    CreateDir {
        /// Directory that could not be created.
        path: PathBuf,
        /// The underlying IO error.
        #[source]
        source: std::io::Error,
    },

    /// The artifact file could not be written.
    #[error("failed to write file contents: {}: {source}", path.display())]
    WriteFile {
        /// Artifact path.
        path: PathBuf,
        /// The underlying IO error.
        #[source]
        source: std::io::Error,
    },

    /// The shared HTTP client could not be constructed.
    #[error("failed to build HTTP client: {}", chain(source))]
    ClientBuild {
        /// The underlying builder error.
        #[source]
        source: reqwest::Error,
    },
}

impl ProbeError {
    /// Creates a request-construction error.
    pub fn build_request(url: impl Into<String>, reason: impl ToString) -> Self {
        Self::BuildRequest {
            url: url.into(),
            reason: reason.to_string(),
        }
    }

    /// Creates a transport error.
    pub fn request(url: impl Into<String>, source: reqwest::Error) -> Self {
        Self::Request {
            url: url.into(),
            source,
        }
    }

    /// Creates a body-read error.
    pub fn read_body(url: impl Into<String>, source: reqwest::Error) -> Self {
        Self::ReadBody {
            url: url.into(),
            source,
        }
    }

    /// Creates a directory-creation error.
    pub fn create_dir(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::CreateDir {
            path: path.into(),
            source,
        }
    }

    /// Creates a file-write error.
    pub fn write_file(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::WriteFile {
            path: path.into(),
            source,
        }
    }
}

/// Renders an error followed by its source chain, `outer: inner: root`.
///
/// reqwest keeps the interesting part (connection refused, timed out) in the
/// source chain rather than in its own `Display`.
fn chain(err: &dyn StdError) -> String {
    let mut rendered = err.to_string();
    let mut current = err.source();
    while let Some(source) = current {
        let text = source.to_string();
        if !rendered.ends_with(&text) {
            rendered.push_str(": ");
            rendered.push_str(&text);
        }
        current = source.source();
    }
    rendered
}
