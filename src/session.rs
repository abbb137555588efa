//! Shared HTTP session construction.
//!
//! One [`reqwest::Client`] is built per run and reused everywhere, taking
//! advantage of connection pooling. The default header map carries the
//! constant browser User-Agent; request-scoped overrides (`Range`, the
//! per-stream User-Agent) are applied on individual request builders so no
//! override can leak into subsequent unrelated requests.

use std::time::Duration;

use reqwest::Client;
use reqwest::header::{HeaderMap, HeaderValue, USER_AGENT};

use crate::config::DEFAULT_USER_AGENT;
use crate::download::constants::{CONNECT_TIMEOUT_SECS, READ_TIMEOUT_SECS};

/// Builds the session client with default headers and timeouts.
///
/// # Panics
///
/// Panics if the HTTP client builder fails to build with the static
/// configuration. This should never happen in practice.
#[must_use]
#[allow(clippy::expect_used)]
pub fn build_session() -> Client {
    let mut headers = HeaderMap::new();
    headers.insert(USER_AGENT, HeaderValue::from_static(DEFAULT_USER_AGENT));

    Client::builder()
        .default_headers(headers)
        .connect_timeout(Duration::from_secs(CONNECT_TIMEOUT_SECS))
        .read_timeout(Duration::from_secs(READ_TIMEOUT_SECS))
        .build()
        .expect("failed to build HTTP client with static configuration")
}
