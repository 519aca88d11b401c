//! Fetch, filter and persist pipeline.
//!
//! - [`HttpClient`] builds the shared transport and buffers responses
//! - [`SavePolicy`] decides which responses are worth keeping
//! - [`normalize_path`] turns a URL path into a safe directory path
//! - [`ArtifactWriter`] writes the content-addressed request/response file
//! - [`Dispatcher`] runs one task per input line and waits for all of them
//!
//! # Example
//!
//! ```
//! use fff_core::probe::SavePolicy;
//!
//! let policy = SavePolicy {
//!     ignore_empty: true,
//!     match_string: Some("foo".to_string()),
//!     ..SavePolicy::default()
//! };
//! assert!(policy.evaluate(200, b"foobar").save);
//! assert!(!policy.evaluate(200, b"").save);
//! ```

mod artifact;
mod client;
pub mod constants;
mod decision;
mod engine;
mod error;
mod normalize;
mod record;
mod report;

pub use artifact::{ArtifactKey, ArtifactWriter, artifact_path, render_artifact};
pub use client::{ClientOptions, HttpClient};
pub use decision::{DecisionReason, SaveDecision, SavePolicy, looks_like_html};
pub use engine::{DispatchStats, Dispatcher, EngineError, probe};
pub use error::ProbeError;
pub use normalize::normalize_path;
pub use record::{RequestSpec, ResponseRecord, canonical_header_name};
pub use report::{Outcome, spawn_output_writer};
