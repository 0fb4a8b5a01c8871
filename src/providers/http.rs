// src/providers/http.rs
//
// Shared HTTP plumbing for provider adapters: one client configuration and
// a retry wrapper for transient upstream failures. A hanging catalog must
// not hang the request, so every client carries a hard timeout.

use std::time::Duration;

use reqwest::{Client, RequestBuilder, Response};

use crate::error::{AppError, AppResult};

const HTTP_TIMEOUT: Duration = Duration::from_secs(30);
const MAX_RETRIES: u32 = 2;
const BACKOFF_BASE_MS: u64 = 250;

/// Build the HTTP client used by all adapters.
pub fn build_client() -> Client {
    Client::builder()
        .timeout(HTTP_TIMEOUT)
        .user_agent(concat!("medialog/", env!("CARGO_PKG_VERSION")))
        .build()
        .expect("Failed to create HTTP client")
}

/// Send a request, retrying transient failures (connect and timeout errors,
/// 5xx responses) with exponential backoff.
///
/// The final response is returned whatever its status; adapters own the
/// mapping of non-2xx statuses to not-found or error.
pub async fn send_with_retry(request: RequestBuilder) -> AppResult<Response> {
    let mut attempt: u32 = 0;

    loop {
        let req = request
            .try_clone()
            .ok_or_else(|| AppError::Other("HTTP request is not retryable".to_string()))?;

        let result = req.send().await;

        let transient = match &result {
            Ok(response) => response.status().is_server_error(),
            Err(err) => err.is_connect() || err.is_timeout(),
        };

        if !transient || attempt >= MAX_RETRIES {
            return result.map_err(AppError::from);
        }

        let backoff = Duration::from_millis(BACKOFF_BASE_MS << attempt);
        attempt += 1;
        match &result {
            Ok(response) => log::warn!(
                "upstream returned {}, retry {} in {:?}",
                response.status(),
                attempt,
                backoff
            ),
            Err(err) => log::warn!("upstream request failed ({}), retry {} in {:?}", err, attempt, backoff),
        }
        tokio::time::sleep(backoff).await;
    }
}
