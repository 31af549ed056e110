//! Common test utilities shared across integration test files.
//!
//! Usage in test files:
//! ```ignore
//! mod common;
//! use common::*;
//! ```

use genai_net::Client;
use std::env;
use std::future::Future;
use std::time::Duration;

/// API key sent to mock servers.
#[allow(dead_code)]
pub const TEST_API_KEY: &str = "test-key";

/// Creates a client from the GEMINI_API_KEY environment variable.
/// Returns None if the API key is not set.
#[allow(dead_code)]
pub fn get_client() -> Option<Client> {
    env::var("GEMINI_API_KEY")
        .ok()
        .filter(|key| !key.is_empty())
        .map(Client::new)
}

/// Client whose REST calls go to a local mock server.
#[allow(dead_code)]
pub fn mock_client(base_url: &str) -> Client {
    Client::builder(TEST_API_KEY)
        .base_url(base_url)
        .timeout(Duration::from_secs(10))
        .build()
        .expect("client should build")
}

/// Client whose Live sessions go to a local WebSocket server.
#[allow(dead_code)]
pub fn live_client(live_base_url: &str) -> Client {
    Client::builder(TEST_API_KEY)
        .live_base_url(live_base_url)
        .build()
        .expect("client should build")
}

/// Default timeout for tests that talk to a server (60 seconds).
#[allow(dead_code)]
pub const TEST_TIMEOUT: Duration = Duration::from_secs(60);

/// Wraps a future with a timeout, panicking if the timeout is exceeded.
///
/// # Panics
///
/// Panics with a descriptive message if the timeout is exceeded.
#[allow(dead_code)]
pub async fn with_timeout<F, T>(duration: Duration, future: F) -> T
where
    F: Future<Output = T>,
{
    tokio::time::timeout(duration, future)
        .await
        .unwrap_or_else(|_| panic!("Test timed out after {:?}", duration))
}

/// Small 1x1 red PNG image encoded as base64
#[allow(dead_code)]
pub const TINY_RED_PNG_BASE64: &str = "iVBORw0KGgoAAAANSUhEUgAAAAEAAAABCAYAAAAfFcSJAAAADUlEQVR42mP8z8DwHwAFBQIAX8jx0gAAAABJRU5ErkJggg==";
