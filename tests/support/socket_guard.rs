use std::net::TcpListener;

use wiremock::MockServer;

/// Starts a mock server, or returns `None` when localhost sockets cannot be
/// bound (sandboxed CI) so the calling test can skip.
///
/// Set `FFF_REQUIRE_SOCKET_TESTS=1` to fail instead of skipping.
pub async fn start_mock_server_or_skip() -> Option<MockServer> {
    if TcpListener::bind("127.0.0.1:0").is_ok() {
        return Some(MockServer::start().await);
    }

    let required = std::env::var("FFF_REQUIRE_SOCKET_TESTS")
        .is_ok_and(|value| matches!(value.to_ascii_lowercase().as_str(), "1" | "true" | "yes"));
    assert!(
        !required,
        "[socket-bound-test] cannot bind a localhost socket and FFF_REQUIRE_SOCKET_TESTS is set"
    );

    eprintln!("[socket-bound-test] cannot bind a localhost socket; skipping wiremock-based test");
    None
}
