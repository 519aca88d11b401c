//! Request and response data captured for one probe.

use std::sync::Arc;

use url::{Host, Url};

/// A request ready to be sent for one input line.
///
/// `method`, `body` and `headers` come from the run configuration and are
/// shared by every task; only the URL is per-task.
#[derive(Debug, Clone)]
pub struct RequestSpec {
    /// Effective HTTP method.
    pub method: Arc<str>,
    /// The input line exactly as read.
    pub raw_url: String,
    /// The parsed target URL.
    pub url: Url,
    /// Request body, when one is configured.
    pub body: Option<Arc<str>>,
    /// Raw `Name: Value` header strings in the order given.
    pub headers: Arc<[String]>,
}

impl RequestSpec {
    /// Host name of the target without port or IPv6 brackets.
    #[must_use]
    pub fn hostname(&self) -> String {
        match self.url.host() {
            Some(Host::Domain(domain)) => domain.to_string(),
            Some(Host::Ipv4(addr)) => addr.to_string(),
            Some(Host::Ipv6(addr)) => addr.to_string(),
            None => String::new(),
        }
    }

    /// Percent-decoded path of the target URL.
    #[must_use]
    pub fn decoded_path(&self) -> String {
        let decoded = urlencoding::decode_binary(self.url.path().as_bytes());
        String::from_utf8_lossy(&decoded).into_owned()
    }

    /// Header strings joined the way they are fed into the artifact key.
    #[must_use]
    pub fn joined_headers(&self) -> String {
        self.headers.join(", ")
    }
}

/// A fully buffered HTTP response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResponseRecord {
    /// Numeric status code.
    pub status: u16,
    /// Protocol, e.g. `HTTP/1.1`.
    pub proto: String,
    /// Status code and its canonical reason, e.g. `404 Not Found`.
    ///
    /// The reason text sent by the server is not kept. Codes without a
    /// registered reason are written as the bare number, e.g. `599`.
    pub status_line: String,
    /// Headers in server order; repeated names keep one entry per value.
    pub headers: Vec<(String, String)>,
    /// Body bytes, possibly empty.
    pub body: Vec<u8>,
}

/// Canonical MIME form of a header name: `x-forwarded-for` → `X-Forwarded-For`.
#[must_use]
pub fn canonical_header_name(name: &str) -> String {
    let mut canonical = String::with_capacity(name.len());
    let mut upper = true;
    for c in name.chars() {
        if upper {
            canonical.push(c.to_ascii_uppercase());
        } else {
            canonical.push(c.to_ascii_lowercase());
        }
        upper = c == '-';
    }
    canonical
}
