//! Save-decision policies.
//!
//! A response is persisted when [`SavePolicy::evaluate`] says so. The policies
//! are applied in a fixed order, each one refining the previous result:
//!
//! 1. save-all, or the status code is in the save set
//! 2. `ignore_html` vetoes bodies containing an `<html` marker
//! 3. `ignore_empty` vetoes bodies that are empty after trimming whitespace
//! 4. a body containing the match string is always saved, overriding 1-3

use std::collections::BTreeSet;
use std::fmt;
use std::sync::LazyLock;

use memchr::memmem;
use regex::bytes::Regex;

/// Case-insensitive HTML marker. Content-Type is not trusted.
#[allow(clippy::expect_used)]
static HTML_MARKER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)<html").expect("HTML marker regex is valid") // Static pattern, safe to panic
});

/// Which policy produced the final decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecisionReason {
    /// No policy asked for the response to be saved.
    NotSelected,
    /// `--save` is set.
    SaveAll,
    /// The status code is in the save set.
    StatusMatch,
    /// Selected, then vetoed because the body looks like HTML.
    HtmlIgnored,
    /// Selected, then vetoed because the body is empty.
    EmptyIgnored,
    /// The body contains the match string.
    BodyMatch,
}

impl fmt::Display for DecisionReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotSelected => write!(f, "not selected"),
            Self::SaveAll => write!(f, "save all"),
            Self::StatusMatch => write!(f, "status match"),
            Self::HtmlIgnored => write!(f, "html ignored"),
            Self::EmptyIgnored => write!(f, "empty ignored"),
            Self::BodyMatch => write!(f, "body match"),
        }
    }
}

/// Outcome of evaluating a response against a [`SavePolicy`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SaveDecision {
    /// Whether the response should be persisted.
    pub save: bool,
    /// The policy step that decided.
    pub reason: DecisionReason,
}

impl SaveDecision {
    const fn new(save: bool, reason: DecisionReason) -> Self {
        Self { save, reason }
    }
}

/// The set of independently toggleable persistence policies.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SavePolicy {
    /// Persist every response.
    pub save_all: bool,
    /// Persist responses with one of these status codes.
    pub save_status: BTreeSet<u16>,
    /// Never persist bodies that look like HTML (unless matched).
    pub ignore_html: bool,
    /// Never persist whitespace-only bodies (unless matched).
    pub ignore_empty: bool,
    /// Always persist bodies containing this byte string.
    pub match_string: Option<String>,
}

impl SavePolicy {
    /// Decides whether a response with `status` and `body` should be saved.
    ///
    /// Pure: identical inputs always give identical decisions.
    #[must_use]
    pub fn evaluate(&self, status: u16, body: &[u8]) -> SaveDecision {
        let mut decision = if self.save_all {
            SaveDecision::new(true, DecisionReason::SaveAll)
        } else if self.save_status.contains(&status) {
            SaveDecision::new(true, DecisionReason::StatusMatch)
        } else {
            SaveDecision::new(false, DecisionReason::NotSelected)
        };

        if self.ignore_html && decision.save && looks_like_html(body) {
            decision = SaveDecision::new(false, DecisionReason::HtmlIgnored);
        }

        if self.ignore_empty && decision.save && body.trim_ascii().is_empty() {
            decision = SaveDecision::new(false, DecisionReason::EmptyIgnored);
        }

        if let Some(needle) = self.match_string.as_deref().filter(|m| !m.is_empty())
            && memmem::find(body, needle.as_bytes()).is_some()
        {
            decision = SaveDecision::new(true, DecisionReason::BodyMatch);
        }

        decision
    }
}

/// Whether `body` contains `<html` in any letter case.
#[must_use]
pub fn looks_like_html(body: &[u8]) -> bool {
    HTML_MARKER.is_match(body)
}
