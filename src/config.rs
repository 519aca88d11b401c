//! Run configuration.
//!
//! [`ProbeSettings`] holds the options as the user gave them. It is turned
//! into a [`ProbeConfig`] exactly once, before dispatching starts; the config
//! is then shared read-only by every task.

use std::collections::BTreeSet;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use url::Url;

use crate::probe::constants::{DEFAULT_DELAY_MS, DEFAULT_METHOD, DEFAULT_OUTPUT_DIR};
use crate::probe::{ClientOptions, RequestSpec, SavePolicy};

/// User-facing options, before derivation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProbeSettings {
    /// HTTP method.
    pub method: String,
    /// Request body; empty means none.
    pub body: String,
    /// Raw `Name: Value` headers in the order given.
    pub headers: Vec<String>,
    /// Persist every response.
    pub save_all: bool,
    /// Persist responses with these status codes.
    pub save_status: Vec<u16>,
    /// Skip persisting HTML-looking bodies.
    pub ignore_html: bool,
    /// Skip persisting empty bodies.
    pub ignore_empty: bool,
    /// Always persist bodies containing this string; empty disables.
    pub match_string: String,
    /// Artifact root.
    pub output_dir: PathBuf,
    /// Pacing delay between task launches, in milliseconds.
    pub delay_ms: u64,
    /// Reuse connections.
    pub keep_alive: bool,
    /// Proxy URL; empty means direct.
    pub proxy: String,
    /// Maximum tasks in flight; 0 means unbounded.
    pub concurrency: usize,
}

impl Default for ProbeSettings {
    fn default() -> Self {
        Self {
            method: DEFAULT_METHOD.to_string(),
            body: String::new(),
            headers: Vec::new(),
            save_all: false,
            save_status: Vec::new(),
            ignore_html: false,
            ignore_empty: false,
            match_string: String::new(),
            output_dir: PathBuf::from(DEFAULT_OUTPUT_DIR),
            delay_ms: DEFAULT_DELAY_MS,
            keep_alive: false,
            proxy: String::new(),
            concurrency: 0,
        }
    }
}

impl ProbeSettings {
    /// Derives the immutable run configuration.
    #[must_use]
    pub fn into_config(self) -> ProbeConfig {
        let body = Some(self.body).filter(|b| !b.is_empty());
        let method = effective_method(&self.method, body.as_deref());

        ProbeConfig {
            method: Arc::from(method),
            body: body.map(Arc::from),
            headers: Arc::from(self.headers),
            policy: SavePolicy {
                save_all: self.save_all,
                save_status: self.save_status.into_iter().collect::<BTreeSet<_>>(),
                ignore_html: self.ignore_html,
                ignore_empty: self.ignore_empty,
                match_string: Some(self.match_string).filter(|m| !m.is_empty()),
            },
            output_dir: self.output_dir,
            delay: Duration::from_millis(self.delay_ms),
            client: ClientOptions {
                keep_alive: self.keep_alive,
                proxy: Some(self.proxy).filter(|p| !p.is_empty()),
            },
            concurrency: self.concurrency,
        }
    }
}

/// A body cannot be sent with GET, so GET is upgraded to POST when a body is
/// configured. Other methods are kept.
#[must_use]
pub fn effective_method(method: &str, body: Option<&str>) -> String {
    match body {
        Some(body) if !body.is_empty() && method == DEFAULT_METHOD => "POST".to_string(),
        _ => method.to_string(),
    }
}

/// Immutable configuration shared by all tasks of a run.
#[derive(Debug, Clone)]
pub struct ProbeConfig {
    /// Effective method, already upgraded to POST when needed.
    pub method: Arc<str>,
    /// Request body.
    pub body: Option<Arc<str>>,
    /// Raw headers, in order, duplicates kept.
    pub headers: Arc<[String]>,
    /// Save-decision policies.
    pub policy: SavePolicy,
    /// Artifact root.
    pub output_dir: PathBuf,
    /// Pacing delay before each task launch.
    pub delay: Duration,
    /// Transport settings.
    pub client: ClientOptions,
    /// Maximum tasks in flight; 0 means unbounded.
    pub concurrency: usize,
}

impl Default for ProbeConfig {
    fn default() -> Self {
        ProbeSettings::default().into_config()
    }
}

impl ProbeConfig {
    /// Builds the request for one input line.
    ///
    /// Returns `None` when the line is not an absolute URL; such lines are
    /// skipped without any report.
    #[must_use]
    pub fn request_for(&self, raw_url: &str) -> Option<RequestSpec> {
        let url = Url::parse(raw_url).ok()?;
        Some(RequestSpec {
            method: Arc::clone(&self.method),
            raw_url: raw_url.to_string(),
            url,
            body: self.body.clone(),
            headers: Arc::clone(&self.headers),
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ProbeConfig::default();
        assert_eq!(&*config.method, "GET");
        assert!(config.body.is_none());
        assert!(config.headers.is_empty());
        assert_eq!(config.output_dir, PathBuf::from("out"));
        assert_eq!(config.delay, Duration::from_millis(100));
        assert_eq!(config.policy, SavePolicy::default());
        assert_eq!(config.client, ClientOptions::default());
        assert_eq!(config.concurrency, 0);
    }

    #[test]
    fn test_get_with_body_becomes_post() {
        let config = ProbeSettings {
            body: "a=1".to_string(),
            ..ProbeSettings::default()
        }
        .into_config();
        assert_eq!(&*config.method, "POST");
        assert_eq!(config.body.as_deref(), Some("a=1"));
    }

    #[test]
    fn test_explicit_method_with_body_is_kept() {
        assert_eq!(effective_method("PUT", Some("x")), "PUT");
        assert_eq!(effective_method("get", Some("x")), "get");
    }

    #[test]
    fn test_empty_body_is_no_body() {
        assert_eq!(effective_method("GET", Some("")), "GET");
        let config = ProbeSettings::default().into_config();
        assert!(config.body.is_none());
    }

    #[test]
    fn test_policy_fields_are_carried() {
        let config = ProbeSettings {
            save_status: vec![200, 403, 200],
            ignore_html: true,
            ignore_empty: true,
            match_string: "secret".to_string(),
            ..ProbeSettings::default()
        }
        .into_config();
        assert_eq!(config.policy.save_status, BTreeSet::from([200, 403]));
        assert!(config.policy.ignore_html);
        assert!(config.policy.ignore_empty);
        assert_eq!(config.policy.match_string.as_deref(), Some("secret"));
    }

    #[test]
    fn test_empty_proxy_means_direct() {
        let config = ProbeSettings::default().into_config();
        assert!(config.client.proxy.is_none());
    }

    #[test]
    fn test_request_for_shares_configuration() {
        let config = ProbeSettings {
            headers: vec!["X-A: 1".to_string(), "X-A: 1".to_string()],
            ..ProbeSettings::default()
        }
        .into_config();
        let request = config.request_for("https://example.com/a?b=c").unwrap();
        assert_eq!(request.raw_url, "https://example.com/a?b=c");
        assert_eq!(request.url.path(), "/a");
        assert_eq!(request.headers.len(), 2);
        assert!(Arc::ptr_eq(&request.headers, &config.headers));
    }

    #[test]
    fn test_request_for_rejects_relative_and_garbage_lines() {
        let config = ProbeConfig::default();
        assert!(config.request_for("").is_none());
        assert!(config.request_for("example.com/path").is_none());
        assert!(config.request_for("/just/a/path").is_none());
        assert!(config.request_for("not a url").is_none());
    }
}
