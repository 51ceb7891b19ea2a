//! HTTP fetcher with retry and backoff
//!
//! This module handles all HTTP requests for the harvester, including:
//! - Building HTTP clients with the fixed header set
//! - Fetching one logical page with a bounded retry loop
//! - Classifying transport failures into the two retry policies
//!
//! Every concurrently executing task builds its own client; clients are
//! never shared across tasks.

use crate::config::{HttpConfig, ACCEPT_HEADER};
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT};
use reqwest::Client;

/// How a failed attempt should be retried
#[derive(Debug)]
enum FetchFailure {
    /// Connection refused or TLS handshake failure; retried with
    /// exponential backoff
    Transient(String),

    /// HTTP error status, timeout, or body read failure; retried with the
    /// flat base delay
    Protocol(String),
}

impl FetchFailure {
    fn message(&self) -> &str {
        match self {
            FetchFailure::Transient(msg) | FetchFailure::Protocol(msg) => msg,
        }
    }
}

/// Builds an HTTP client with the harvester's fixed header set
///
/// The User-Agent comes from configuration; the Accept header is constant
/// across all requests.
///
/// # Arguments
///
/// * `http` - The HTTP configuration
///
/// # Returns
///
/// * `Ok(Client)` - Successfully built HTTP client
/// * `Err(reqwest::Error)` - Failed to build client
pub fn build_http_client(http: &HttpConfig) -> Result<Client, reqwest::Error> {
    let mut headers = HeaderMap::new();
    if let Ok(accept) = HeaderValue::from_str(ACCEPT_HEADER) {
        headers.insert(ACCEPT, accept);
    }

    Client::builder()
        .user_agent(http.user_agent.clone())
        .default_headers(headers)
        .timeout(http.request_timeout())
        .gzip(true)
        .brotli(true)
        .build()
}

/// Fetches a URL, returning the page body or `None` after exhausting retries
///
/// # Retry Logic
///
/// Up to `max_retries` attempts. Before every attempt the task sleeps the
/// configured warm-up interval to throttle request rate regardless of retry
/// state. The delay between attempts depends on the failure class:
///
/// | Condition | Delay before next attempt |
/// |-----------|---------------------------|
/// | Connection refused / TLS failure | `retry_delay * 2^attempt` |
/// | HTTP error status | `retry_delay` |
/// | Timeout | `retry_delay` |
/// | Body read failure | `retry_delay` |
///
/// Exhausting all attempts is not an error at this layer; callers decide
/// whether a missing document is fatal.
///
/// # Arguments
///
/// * `client` - The HTTP client to use
/// * `url` - The URL to fetch
/// * `http` - The HTTP configuration
///
/// # Returns
///
/// * `Some(String)` - The response body of a successful attempt
/// * `None` - All attempts failed
pub async fn fetch_page(client: &Client, url: &str, http: &HttpConfig) -> Option<String> {
    for attempt in 0..http.max_retries {
        tokio::time::sleep(http.warmup_delay()).await;

        let failure = match try_fetch(client, url).await {
            Ok(body) => return Some(body),
            Err(failure) => failure,
        };

        let delay = match &failure {
            FetchFailure::Transient(_) => http.retry_delay() * 2u32.saturating_pow(attempt),
            FetchFailure::Protocol(_) => http.retry_delay(),
        };

        tracing::warn!(
            "Error fetching {} (attempt {}/{}): {}",
            url,
            attempt + 1,
            http.max_retries,
            failure.message()
        );

        if attempt + 1 < http.max_retries {
            tokio::time::sleep(delay).await;
        }
    }

    None
}

/// Performs a single GET attempt and classifies any failure
async fn try_fetch(client: &Client, url: &str) -> Result<String, FetchFailure> {
    let response = client
        .get(url)
        .send()
        .await
        .map_err(classify_send_error)?;

    let response = response
        .error_for_status()
        .map_err(|e| FetchFailure::Protocol(e.to_string()))?;

    response
        .text()
        .await
        .map_err(|e| FetchFailure::Protocol(e.to_string()))
}

/// Classifies a send-stage error into a retry policy
///
/// Connection-level errors (refused connections, TLS handshakes) are the
/// transient class; everything else, including timeouts, takes the flat
/// delay.
fn classify_send_error(error: reqwest::Error) -> FetchFailure {
    if error.is_connect() {
        FetchFailure::Transient(error.to_string())
    } else {
        FetchFailure::Protocol(error.to_string())
    }
}
