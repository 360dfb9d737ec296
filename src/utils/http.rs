use reqwest::StatusCode;
use std::time::Duration;

/// Backoff schedule for [`request_with_retry`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_retries: u32,
    pub initial_delay: Duration,
    pub max_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 2,
            initial_delay: Duration::from_millis(1000),
            max_delay: Duration::from_secs(60),
        }
    }
}

impl RetryPolicy {
    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }
}

/// Retries a request closure with exponential backoff.
/// Retries on:
/// - Network errors
/// - 429 Too Many Requests (respects Retry-After header)
/// - 5xx Server Errors
///
/// Returns the last Response (even with an error status) or the last network error.
pub async fn request_with_retry<F, Fut>(
    mut task: F,
    policy: RetryPolicy,
) -> Result<reqwest::Response, reqwest::Error>
where
    F: FnMut() -> Fut,
    Fut: std::future::Future<Output = Result<reqwest::Response, reqwest::Error>>,
{
    let mut attempt = 0;
    let mut delay = policy.initial_delay;

    loop {
        attempt += 1;
        match task().await {
            Ok(response) => {
                let status = response.status();
                if status.is_success() || attempt > policy.max_retries {
                    return Ok(response);
                }

                if status == StatusCode::TOO_MANY_REQUESTS || status.is_server_error() {
                    let retry_delay = retry_after(&response).unwrap_or(delay);
                    tracing::warn!(
                        "[HTTP] Request failed with status {}, retrying in {:?} (attempt {}/{})",
                        status,
                        retry_delay,
                        attempt,
                        policy.max_retries
                    );
                    tokio::time::sleep(retry_delay).await;
                    delay = std::cmp::min(delay * 2, policy.max_delay);
                    continue;
                }

                // 400/401/404 and friends will not get better on retry
                return Ok(response);
            }
            Err(e) => {
                if attempt > policy.max_retries {
                    tracing::error!("[HTTP] Giving up after {} attempts: {}", attempt, e);
                    return Err(e);
                }
                tracing::warn!(
                    "[HTTP] Network error: {}, retrying in {:?} (attempt {}/{})",
                    e,
                    delay,
                    attempt,
                    policy.max_retries
                );
                tokio::time::sleep(delay).await;
                delay = std::cmp::min(delay * 2, policy.max_delay);
            }
        }
    }
}

fn retry_after(response: &reqwest::Response) -> Option<Duration> {
    response
        .headers()
        .get(reqwest::header::RETRY_AFTER)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.trim().parse::<u64>().ok())
        .map(Duration::from_secs)
}
