//! Constants for the transfer engine (timeouts).

/// Default HTTP connect timeout (30 seconds).
pub const CONNECT_TIMEOUT_SECS: u64 = 30;

/// Default HTTP read timeout (5 minutes, streams are large).
pub const READ_TIMEOUT_SECS: u64 = 300;
