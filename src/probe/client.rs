//! Shared HTTP client used by every probe.
//!
//! The client is built once per run and cloned cheaply into each task. It
//! never verifies TLS certificates, never follows redirects, and bounds every
//! request by a fixed overall timeout.

use reqwest::header::{CONNECTION, HeaderMap, HeaderName, HeaderValue};
use reqwest::{Client, ClientBuilder, Method, Proxy, redirect};
use tracing::{debug, instrument};
use url::Url;

use super::constants::{
    CONNECT_TIMEOUT, POOL_IDLE_TIMEOUT, POOL_MAX_IDLE_PER_HOST, REQUEST_TIMEOUT, TCP_KEEPALIVE,
};
use super::error::ProbeError;
use super::record::{RequestSpec, ResponseRecord, canonical_header_name};

/// Transport settings for the shared client.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClientOptions {
    /// Reuse connections between requests.
    pub keep_alive: bool,
    /// Proxy URL; empty or unparsable values mean a direct connection.
    pub proxy: Option<String>,
}

/// HTTP client for probing URLs.
#[derive(Debug, Clone)]
pub struct HttpClient {
    client: Client,
}

impl HttpClient {
    /// Builds the shared client.
    ///
    /// # Errors
    ///
    /// Returns [`ProbeError::ClientBuild`] if the TLS backend or resolver
    /// cannot be initialised.
    #[instrument(level = "debug")]
    pub fn new(options: &ClientOptions) -> Result<Self, ProbeError> {
        let client = client_builder(options)
            .build()
            .map_err(|source| ProbeError::ClientBuild { source })?;
        Ok(Self { client })
    }

    /// Sends `request` and buffers the whole response.
    ///
    /// # Errors
    ///
    /// - [`ProbeError::BuildRequest`] for an invalid method or header
    /// - [`ProbeError::Request`] for any transport failure
    /// - [`ProbeError::ReadBody`] if the body cannot be read
    pub async fn fetch(&self, request: &RequestSpec) -> Result<ResponseRecord, ProbeError> {
        let method = Method::from_bytes(request.method.as_bytes())
            .map_err(|e| ProbeError::build_request(&request.raw_url, e))?;
        let headers = wire_headers(&request.headers)
            .map_err(|reason| ProbeError::build_request(&request.raw_url, reason))?;

        let mut builder = self
            .client
            .request(method, request.url.clone())
            .headers(headers);
        if let Some(body) = request.body.as_deref() {
            builder = builder.body(body.to_string());
        }
        let built = builder
            .build()
            .map_err(|e| ProbeError::build_request(&request.raw_url, e))?;

        let response = self
            .client
            .execute(built)
            .await
            .map_err(|e| ProbeError::request(&request.raw_url, e))?;

        let status = response.status();
        let proto = format!("{:?}", response.version());
        let status_line = match status.canonical_reason() {
            Some(reason) => format!("{} {reason}", status.as_u16()),
            None => status.as_u16().to_string(),
        };
        let headers = response
            .headers()
            .iter()
            .map(|(name, value)| {
                (
                    canonical_header_name(name.as_str()),
                    String::from_utf8_lossy(value.as_bytes()).into_owned(),
                )
            })
            .collect();

        let body = response
            .bytes()
            .await
            .map_err(|e| ProbeError::read_body(&request.raw_url, e))?;

        Ok(ResponseRecord {
            status: status.as_u16(),
            proto,
            status_line,
            headers,
            body: body.to_vec(),
        })
    }
}

fn client_builder(options: &ClientOptions) -> ClientBuilder {
    let mut builder = Client::builder()
        .danger_accept_invalid_certs(true)
        .redirect(redirect::Policy::none())
        .connect_timeout(CONNECT_TIMEOUT)
        .timeout(REQUEST_TIMEOUT)
        .tcp_keepalive(TCP_KEEPALIVE)
        .pool_idle_timeout(POOL_IDLE_TIMEOUT)
        .gzip(true)
        .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")));

    if options.keep_alive {
        builder = builder.pool_max_idle_per_host(POOL_MAX_IDLE_PER_HOST);
    } else {
        let mut defaults = HeaderMap::new();
        defaults.insert(CONNECTION, HeaderValue::from_static("close"));
        builder = builder.pool_max_idle_per_host(0).default_headers(defaults);
    }

    match options.proxy.as_deref().and_then(parse_proxy) {
        Some(proxy) => builder.proxy(proxy),
        None => builder.no_proxy(),
    }
}

/// Parses a proxy URL, ignoring empty and invalid values.
fn parse_proxy(raw: &str) -> Option<Proxy> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    match Url::parse(raw).map(Proxy::all) {
        Ok(Ok(proxy)) => {
            debug!(proxy = %raw, "routing requests through proxy");
            Some(proxy)
        }
        Ok(Err(e)) => {
            debug!(proxy = %raw, error = %e, "ignoring unusable proxy");
            None
        }
        Err(e) => {
            debug!(proxy = %raw, error = %e, "ignoring unparsable proxy");
            None
        }
    }
}

/// Converts raw `Name: Value` strings into a header map.
///
/// Strings without a colon are skipped. Name and value are trimmed, and a
/// later header replaces an earlier one with the same name.
fn wire_headers(raw: &[String]) -> Result<HeaderMap, String> {
    let mut headers = HeaderMap::new();
    for line in raw {
        let Some((name, value)) = line.split_once(':') else {
            continue;
        };
        let name = HeaderName::from_bytes(name.trim().as_bytes())
            .map_err(|e| format!("invalid header name {:?}: {e}", name.trim()))?;
        let value = HeaderValue::from_str(value.trim())
            .map_err(|e| format!("invalid value for header {name}: {e}"))?;
        headers.insert(name, value);
    }
    Ok(headers)
}
