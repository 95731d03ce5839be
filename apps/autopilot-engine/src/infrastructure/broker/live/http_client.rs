//! HTTP client wrapper with retry logic.

use std::time::Duration;

use rand::Rng;
use reqwest::{Client, Method, StatusCode};
use serde::Serialize;
use serde::de::DeserializeOwned;

use super::config::{LiveBrokerConfig, RetryConfig};
use super::error::{GatewayErrorResponse, LiveBrokerError};

/// JSON client for the broker gateway with bearer auth and retries.
#[derive(Debug, Clone)]
pub struct GatewayHttpClient {
    client: Client,
    api_token: String,
    base_url: String,
    retry_config: RetryConfig,
}

impl GatewayHttpClient {
    /// Create a new HTTP client from config.
    ///
    /// # Errors
    ///
    /// Returns an error if the token is empty or the client cannot be built.
    pub fn new(config: &LiveBrokerConfig) -> Result<Self, LiveBrokerError> {
        if config.api_token.is_empty() {
            return Err(LiveBrokerError::AuthenticationFailed);
        }

        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| LiveBrokerError::Network(e.to_string()))?;

        Ok(Self {
            client,
            api_token: config.api_token.clone(),
            base_url: config.base_url.clone(),
            retry_config: config.retry.clone(),
        })
    }

    /// Make a POST request.
    pub async fn post<T, B>(&self, path: &str, body: &B) -> Result<T, LiveBrokerError>
    where
        T: DeserializeOwned,
        B: Serialize + Sync,
    {
        self.request(Method::POST, path, body).await
    }

    /// Make a PATCH request.
    pub async fn patch<T, B>(&self, path: &str, body: &B) -> Result<T, LiveBrokerError>
    where
        T: DeserializeOwned,
        B: Serialize + Sync,
    {
        self.request(Method::PATCH, path, body).await
    }

    /// Internal request implementation with retry logic.
    async fn request<T, B>(
        &self,
        method: Method,
        path: &str,
        body: &B,
    ) -> Result<T, LiveBrokerError>
    where
        T: DeserializeOwned,
        B: Serialize + Sync,
    {
        let url = format!("{}{path}", self.base_url);
        let mut backoff = ExponentialBackoff::new(&self.retry_config);

        loop {
            let request = self
                .client
                .request(method.clone(), &url)
                .bearer_auth(&self.api_token)
                .json(body);

            let response = match request.send().await {
                Ok(resp) => resp,
                Err(e) => {
                    if let Some(delay) = backoff.next_backoff() {
                        tracing::warn!(
                            error = %e,
                            delay_ms = delay.as_millis(),
                            attempt = backoff.attempt,
                            "Network error, retrying"
                        );
                        tokio::time::sleep(delay).await;
                        continue;
                    }
                    return Err(LiveBrokerError::MaxRetriesExceeded {
                        attempts: backoff.attempt,
                        last_error: e.to_string(),
                    });
                }
            };

            let status = response.status();

            if status.is_success() {
                let text = response
                    .text()
                    .await
                    .map_err(|e| LiveBrokerError::Network(e.to_string()))?;
                return serde_json::from_str(&text)
                    .map_err(|e| LiveBrokerError::JsonParse(e.to_string()));
            }

            let retry_after = response
                .headers()
                .get("Retry-After")
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.parse::<u64>().ok());

            let error_body = response.text().await.unwrap_or_default();
            let (error_code, error_message) =
                match serde_json::from_str::<GatewayErrorResponse>(&error_body) {
                    Ok(err) => (
                        err.code.unwrap_or_else(|| status.as_u16().to_string()),
                        err.message,
                    ),
                    Err(_) => (status.as_u16().to_string(), error_body),
                };

            match categorize_status(status) {
                ErrorCategory::RateLimited => {
                    let delay = backoff
                        .next_backoff()
                        .map(|d| retry_after.map_or(d, Duration::from_secs));
                    if let Some(delay) = delay {
                        tracing::warn!(
                            code = %error_code,
                            delay_ms = delay.as_millis(),
                            "Rate limited, retrying"
                        );
                        tokio::time::sleep(delay).await;
                        continue;
                    }
                    return Err(LiveBrokerError::RateLimited {
                        retry_after_secs: retry_after.unwrap_or(60),
                    });
                }
                ErrorCategory::Retryable => {
                    if let Some(delay) = backoff.next_backoff() {
                        tracing::warn!(
                            code = %error_code,
                            message = %error_message,
                            delay_ms = delay.as_millis(),
                            "Retryable error, retrying"
                        );
                        tokio::time::sleep(delay).await;
                        continue;
                    }
                    return Err(LiveBrokerError::MaxRetriesExceeded {
                        attempts: backoff.attempt,
                        last_error: format!("{error_code} - {error_message}"),
                    });
                }
                ErrorCategory::NonRetryable => {
                    return Err(match status {
                        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
                            LiveBrokerError::AuthenticationFailed
                        }
                        StatusCode::NOT_FOUND => LiveBrokerError::NotFound {
                            path: path.to_string(),
                        },
                        StatusCode::BAD_REQUEST | StatusCode::UNPROCESSABLE_ENTITY => {
                            LiveBrokerError::Rejected(error_message)
                        }
                        _ => LiveBrokerError::Api {
                            code: error_code,
                            message: error_message,
                        },
                    });
                }
            }
        }
    }
}

/// Error category for determining retry behavior.
enum ErrorCategory {
    RateLimited,
    Retryable,
    NonRetryable,
}

/// Categorize HTTP status code for retry handling.
const fn categorize_status(status: StatusCode) -> ErrorCategory {
    match status.as_u16() {
        429 => ErrorCategory::RateLimited,
        408 | 500..=599 => ErrorCategory::Retryable,
        _ => ErrorCategory::NonRetryable,
    }
}

/// Exponential backoff calculator.
struct ExponentialBackoff {
    attempt: u32,
    max_attempts: u32,
    current_backoff: Duration,
    max_backoff: Duration,
    multiplier: f64,
    jitter: bool,
}

impl ExponentialBackoff {
    const fn new(config: &RetryConfig) -> Self {
        Self {
            attempt: 1,
            max_attempts: config.max_attempts,
            current_backoff: config.initial_backoff,
            max_backoff: config.max_backoff,
            multiplier: config.multiplier,
            jitter: config.jitter,
        }
    }

    /// Delay before the next attempt, or `None` once attempts are spent.
    fn next_backoff(&mut self) -> Option<Duration> {
        if self.attempt >= self.max_attempts {
            return None;
        }
        self.attempt += 1;

        let backoff = self.current_backoff;
        self.current_backoff = Duration::from_secs_f64(
            (self.current_backoff.as_secs_f64() * self.multiplier)
                .min(self.max_backoff.as_secs_f64()),
        );

        if self.jitter {
            Some(backoff.mul_f64(rand::rng().random_range(0.9..=1.1)))
        } else {
            Some(backoff)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn categorize_rate_limited() {
        assert!(matches!(
            categorize_status(StatusCode::TOO_MANY_REQUESTS),
            ErrorCategory::RateLimited
        ));
    }

    #[test]
    fn categorize_retryable() {
        assert!(matches!(
            categorize_status(StatusCode::REQUEST_TIMEOUT),
            ErrorCategory::Retryable
        ));
        assert!(matches!(
            categorize_status(StatusCode::BAD_GATEWAY),
            ErrorCategory::Retryable
        ));
    }

    #[test]
    fn categorize_non_retryable() {
        assert!(matches!(
            categorize_status(StatusCode::BAD_REQUEST),
            ErrorCategory::NonRetryable
        ));
        assert!(matches!(
            categorize_status(StatusCode::NOT_FOUND),
            ErrorCategory::NonRetryable
        ));
    }

    #[test]
    fn exponential_backoff_increments_then_stops() {
        let config = RetryConfig {
            max_attempts: 4,
            initial_backoff: Duration::from_millis(100),
            max_backoff: Duration::from_secs(10),
            multiplier: 2.0,
            jitter: false,
        };
        let mut backoff = ExponentialBackoff::new(&config);

        assert_eq!(backoff.next_backoff(), Some(Duration::from_millis(100)));
        assert_eq!(backoff.next_backoff(), Some(Duration::from_millis(200)));
        assert_eq!(backoff.next_backoff(), Some(Duration::from_millis(400)));
        assert_eq!(backoff.next_backoff(), None);
        assert_eq!(backoff.attempt, 4);
    }

    #[test]
    fn exponential_backoff_respects_max() {
        let config = RetryConfig {
            max_attempts: 10,
            initial_backoff: Duration::from_secs(1),
            max_backoff: Duration::from_secs(5),
            multiplier: 10.0,
            jitter: false,
        };
        let mut backoff = ExponentialBackoff::new(&config);

        backoff.next_backoff();
        assert_eq!(backoff.next_backoff(), Some(Duration::from_secs(5)));
    }

    #[test]
    fn jitter_stays_within_ten_percent() {
        let mut backoff = ExponentialBackoff::new(&RetryConfig {
            max_attempts: 2,
            initial_backoff: Duration::from_millis(1000),
            ..RetryConfig::default()
        });
        let delay = backoff.next_backoff().unwrap();
        assert!(delay >= Duration::from_millis(899) && delay <= Duration::from_millis(1101));
    }

    #[test]
    fn single_attempt_never_retries() {
        let mut backoff = ExponentialBackoff::new(&RetryConfig::none());
        assert!(backoff.next_backoff().is_none());
    }

    #[test]
    fn empty_token_is_rejected() {
        let config = LiveBrokerConfig::new("http://localhost", "");
        assert!(matches!(
            GatewayHttpClient::new(&config),
            Err(LiveBrokerError::AuthenticationFailed)
        ));
    }
}
