//! Constants for the probe module (timeouts, connection pool, defaults).

use std::time::Duration;

/// Dial timeout for new connections (10 seconds).
pub const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Overall per-request timeout, covering connect, TLS, and body read (10 seconds).
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// TCP keep-alive interval on dialed sockets.
pub const TCP_KEEPALIVE: Duration = Duration::from_secs(1);

/// How long an idle pooled connection is kept around.
pub const POOL_IDLE_TIMEOUT: Duration = Duration::from_secs(1);

/// Maximum idle pooled connections per host when keep-alive is enabled.
pub const POOL_MAX_IDLE_PER_HOST: usize = 30;

/// Default pacing delay between task launches, in milliseconds.
pub const DEFAULT_DELAY_MS: u64 = 100;

/// Default output directory for artifacts.
pub const DEFAULT_OUTPUT_DIR: &str = "out";

/// Default HTTP method.
pub const DEFAULT_METHOD: &str = "GET";

/// Permission bits for artifact directories on Unix.
pub const DIR_MODE: u32 = 0o750;
