//! HTTP client construction, politeness throttling and status mapping

use crate::{Error, Result, RetryPolicy};
use governor::{Quota, RateLimiter};
use std::num::NonZeroU32;
use std::time::Duration;

/// Total request timeout
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Connection establishment timeout
pub const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Longest error body kept in [`Error::Http`]
const MAX_ERROR_BODY: usize = 500;

/// Unkeyed in-memory rate limiter
pub type DirectRateLimiter = RateLimiter<
    governor::state::direct::NotKeyed,
    governor::state::InMemoryState,
    governor::clock::DefaultClock,
>;

/// Build a client with the shared timeouts and user agent
pub fn build_client(user_agent: &str) -> Result<reqwest::Client> {
    reqwest::Client::builder()
        .user_agent(user_agent)
        .timeout(REQUEST_TIMEOUT)
        .connect_timeout(CONNECT_TIMEOUT)
        .build()
        .map_err(|e| Error::Config(format!("HTTP client build failed: {}", e)))
}

/// Rate limiter allowing `per_second` requests per second (minimum 1)
pub fn rate_limiter(per_second: u32) -> DirectRateLimiter {
    let per_second = NonZeroU32::new(per_second).unwrap_or(NonZeroU32::MIN);
    RateLimiter::direct(Quota::per_second(per_second))
}

/// Send a request under `policy`, waiting on `limiter` before every attempt
///
/// `build` is invoked once per attempt because a `RequestBuilder` is consumed
/// by `send`. Non-success statuses become [`Error::Http`] so the policy can
/// classify them.
pub async fn send_with_retry<F>(
    policy: &RetryPolicy,
    limiter: &DirectRateLimiter,
    operation: &str,
    build: F,
) -> Result<reqwest::Response>
where
    F: Fn() -> reqwest::RequestBuilder,
{
    let build = &build;
    policy
        .run(operation, move || async move {
            limiter.until_ready().await;

            tracing::debug!(operation, "Sending request");
            let response = build().send().await?;
            let status = response.status();

            if status.is_success() {
                return Ok(response);
            }

            let mut body = response.text().await.unwrap_or_default();
            if body.len() > MAX_ERROR_BODY {
                let cut = (0..=MAX_ERROR_BODY)
                    .rev()
                    .find(|i| body.is_char_boundary(*i))
                    .unwrap_or(0);
                body.truncate(cut);
            }

            Err(Error::Http {
                operation: operation.to_string(),
                status: status.as_u16(),
                body,
            })
        })
        .await
}
