//! Maps a URL path to a filesystem-safe string.

use std::sync::LazyLock;

use regex::Regex;

/// Runs of characters that are not safe in an artifact directory name.
#[allow(clippy::expect_used)]
static UNSAFE_PATH_CHARS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"[^a-zA-Z0-9/._-]+").expect("path regex is valid") // Static pattern, safe to panic
});

/// Replaces every maximal run of characters outside `[a-zA-Z0-9/._-]` with a
/// single `-`.
///
/// ```
/// use fff_core::probe::normalize_path;
///
/// assert_eq!(normalize_path("/a b!!c"), "/a-b-c");
/// ```
#[must_use]
pub fn normalize_path(path: &str) -> String {
    UNSAFE_PATH_CHARS.replace_all(path, "-").into_owned()
}
