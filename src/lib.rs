//! fff core library
//!
//! Requests every URL from a line-oriented input as fast as a pacing delay
//! allows, and keeps the interesting responses as content-addressed files
//! capturing both request and response.
//!
//! # Architecture
//!
//! - [`config`] - user settings and the immutable run configuration
//! - [`probe`] - HTTP client, save policies, artifact writer, dispatcher

// Clippy lints - strict for library code
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod config;
pub mod probe;

// Re-export commonly used types
pub use config::{ProbeConfig, ProbeSettings};
pub use probe::{
    ArtifactKey, ArtifactWriter, DispatchStats, Dispatcher, EngineError, HttpClient, Outcome,
    ProbeError, SaveDecision, SavePolicy, normalize_path, spawn_output_writer,
};
