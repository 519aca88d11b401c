//! Content-addressed artifacts capturing one request/response exchange.
//!
//! Artifacts live at `output_dir/<hostname>/<normalized path>/<sha1 hex>`.
//! The digest covers method, raw URL, request body and the joined header
//! list, so re-running the same probe rewrites the same file.
//!
//! The file layout is:
//!
//! ```text
//! GET http://example.com/
//!
//! > X-Header: value
//!
//! <request body, only when configured>
//!
//! < HTTP/1.1 200 OK
//! < Content-Type: text/plain
//! \r\n
//! <response body bytes>
//! ```

use std::fmt;
use std::path::{Path, PathBuf};

use sha1::{Digest, Sha1};
use tokio::fs::DirBuilder;
use tracing::{debug, instrument};

use super::constants::DIR_MODE;
use super::error::ProbeError;
use super::normalize::normalize_path;
use super::record::{RequestSpec, ResponseRecord};

/// SHA-1 digest identifying an artifact by its request inputs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ArtifactKey([u8; 20]);

impl ArtifactKey {
    /// Hashes `method + raw_url + body + headers.join(", ")`.
    #[must_use]
    pub fn compute(method: &str, raw_url: &str, body: &str, joined_headers: &str) -> Self {
        let mut hasher = Sha1::new();
        hasher.update(method.as_bytes());
        hasher.update(raw_url.as_bytes());
        hasher.update(body.as_bytes());
        hasher.update(joined_headers.as_bytes());
        Self(hasher.finalize().into())
    }

    /// Key for a request.
    #[must_use]
    pub fn for_request(request: &RequestSpec) -> Self {
        Self::compute(
            &request.method,
            &request.raw_url,
            request.body.as_deref().unwrap_or_default(),
            &request.joined_headers(),
        )
    }

    /// Lower-case hex rendering (40 characters).
    #[must_use]
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }
}

impl fmt::Display for ArtifactKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

/// Builds `output_dir/hostname/normalized_path/hex(key)`.
///
/// Empty, `.` and `..` components are dropped so the artifact never lands
/// outside `output_dir/hostname`.
#[must_use]
pub fn artifact_path(
    output_dir: &Path,
    hostname: &str,
    normalized_path: &str,
    key: &ArtifactKey,
) -> PathBuf {
    let mut path = output_dir.to_path_buf();
    let components = std::iter::once(hostname).chain(normalized_path.split('/'));
    for component in components.filter(|c| !matches!(*c, "" | "." | "..")) {
        path.push(component);
    }
    path.push(key.to_hex());
    path
}

/// Serializes a request/response pair into the artifact text format.
#[must_use]
pub fn render_artifact(request: &RequestSpec, response: &ResponseRecord) -> Vec<u8> {
    let mut out = String::new();

    out.push_str(&format!("{} {}\n\n", request.method, request.raw_url));

    for header in request.headers.iter() {
        out.push_str(&format!("> {header}\n"));
    }
    out.push('\n');

    if let Some(body) = request.body.as_deref() {
        out.push_str(body);
        out.push_str("\n\n");
    }

    out.push_str(&format!("< {} {}\n", response.proto, response.status_line));
    for (name, value) in &response.headers {
        out.push_str(&format!("< {name}: {value}\n"));
    }
    out.push_str("\r\n");

    let mut bytes = out.into_bytes();
    bytes.extend_from_slice(&response.body);
    bytes
}

/// Writes artifacts below a fixed output directory.
#[derive(Debug, Clone)]
pub struct ArtifactWriter {
    output_dir: PathBuf,
}

impl ArtifactWriter {
    /// Creates a writer rooted at `output_dir`. Nothing is created until the
    /// first write.
    #[must_use]
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
        }
    }

    /// Where the artifact for `request` is written.
    #[must_use]
    pub fn path_for(&self, request: &RequestSpec) -> PathBuf {
        let normalized = normalize_path(&request.decoded_path());
        let key = ArtifactKey::for_request(request);
        artifact_path(&self.output_dir, &request.hostname(), &normalized, &key)
    }

    /// Creates parent directories and writes the artifact, replacing any
    /// existing file at the same path.
    ///
    /// # Errors
    ///
    /// Returns [`ProbeError::CreateDir`] if the directories cannot be created
    /// and [`ProbeError::WriteFile`] if the file cannot be written.
    #[instrument(skip_all, fields(url = %request.raw_url))]
    pub async fn write(
        &self,
        request: &RequestSpec,
        response: &ResponseRecord,
    ) -> Result<PathBuf, ProbeError> {
        let path = self.path_for(request);

        if let Some(parent) = path.parent() {
            let mut builder = DirBuilder::new();
            builder.recursive(true);
            #[cfg(unix)]
            builder.mode(DIR_MODE);
            builder
                .create(parent)
                .await
                .map_err(|e| ProbeError::create_dir(parent, e))?;
        }

        let content = render_artifact(request, response);
        tokio::fs::write(&path, &content)
            .await
            .map_err(|e| ProbeError::write_file(path.clone(), e))?;

        debug!(path = %path.display(), bytes = content.len(), "artifact written");
        Ok(path)
    }
}
