//! OpenAI HTTP client with rate limiting and bounded backoff

use super::types::ApiError;
use crate::providers::{invalid_api_key, invalid_response, rate_limited, request_failed};
use decree_core::{DecreeError, DecreeResult, OracleError};
use reqwest::{Client, StatusCode};
use serde::{de::DeserializeOwned, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Semaphore;

const INITIAL_BACKOFF_MS: f64 = 1_000.0;
const BACKOFF_BASE: f64 = 2.0;

/// OpenAI API client with request-rate limiting.
///
/// Rate-limit responses (HTTP 429) are retried internally with
/// exponential backoff and random jitter, bounded by `max_retries`;
/// exceeding the bound yields a terminal error. All other failures
/// propagate immediately.
pub struct OpenAIClient {
    client: Client,
    api_key: String,
    base_url: String,
    rate_limiter: Arc<Semaphore>,
    last_request: Arc<AtomicU64>,
    min_request_interval_ms: u64,
    start_time: Instant,
    max_retries: u32,
}

impl OpenAIClient {
    /// Create a new OpenAI client.
    ///
    /// # Arguments
    /// * `api_key` - OpenAI API key
    /// * `requests_per_minute` - Maximum requests per minute (default: 60)
    pub fn new(api_key: impl Into<String>, requests_per_minute: u32) -> Self {
        let rpm = requests_per_minute.max(1);
        let permits = rpm as usize;
        let min_interval_ms = (60_000 / rpm as u64).max(10);

        Self {
            client: Client::new(),
            api_key: api_key.into(),
            base_url: "https://api.openai.com/v1".to_string(),
            rate_limiter: Arc::new(Semaphore::new(permits)),
            last_request: Arc::new(AtomicU64::new(0)),
            min_request_interval_ms: min_interval_ms,
            start_time: Instant::now(),
            max_retries: 2,
        }
    }

    /// Override the bounded rate-limit retry count.
    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }

    /// Make an API request, retrying rate-limit responses with
    /// exponential backoff and jitter up to the configured bound.
    pub async fn request_with_backoff<Req, Res>(
        &self,
        endpoint: &str,
        body: &Req,
    ) -> DecreeResult<Res>
    where
        Req: Serialize + Sync,
        Res: DeserializeOwned,
    {
        let mut retries = 0u32;
        let mut delay_ms = INITIAL_BACKOFF_MS;

        loop {
            match self.request(endpoint, body).await {
                Err(DecreeError::Oracle(OracleError::RateLimited { retry_after_ms, .. })) => {
                    retries += 1;
                    if retries > self.max_retries {
                        return Err(OracleError::RetriesExhausted {
                            attempts: self.max_retries,
                        }
                        .into());
                    }

                    delay_ms *= BACKOFF_BASE * (1.0 + rand::random::<f64>());
                    let wait_ms = if retry_after_ms > 0 {
                        retry_after_ms as u64
                    } else {
                        delay_ms as u64
                    };
                    tokio::time::sleep(Duration::from_millis(wait_ms)).await;
                }
                other => return other,
            }
        }
    }

    /// Make a single API request with automatic rate limiting.
    pub async fn request<Req, Res>(&self, endpoint: &str, body: &Req) -> DecreeResult<Res>
    where
        Req: Serialize + Sync,
        Res: DeserializeOwned,
    {
        // Rate limiting: acquire permit
        let _permit = self
            .rate_limiter
            .acquire()
            .await
            .map_err(|e| request_failed("openai", 0, format!("Rate limiter error: {}", e)))?;

        // Enforce minimum interval between requests
        let now_ms = self.start_time.elapsed().as_millis() as u64;
        let last_ms = self.last_request.load(Ordering::Relaxed);
        let elapsed = now_ms.saturating_sub(last_ms);

        if elapsed < self.min_request_interval_ms {
            let wait_ms = self.min_request_interval_ms - elapsed;
            tokio::time::sleep(Duration::from_millis(wait_ms)).await;
        }

        self.last_request.store(now_ms, Ordering::Relaxed);

        // Make HTTP request
        let url = format!("{}/{}", self.base_url, endpoint);
        let response = self
            .client
            .post(&url)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("Content-Type", "application/json")
            .json(body)
            .send()
            .await
            .map_err(|e| request_failed("openai", 0, format!("HTTP request failed: {}", e)))?;

        // Handle response
        let status = response.status();
        let retry_after_ms = parse_retry_after_ms(response.headers()).unwrap_or(0);

        if status.is_success() {
            response
                .json()
                .await
                .map_err(|e| invalid_response("openai", format!("Failed to parse response: {}", e)))
        } else {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());

            let error_msg = if let Ok(api_error) = serde_json::from_str::<ApiError>(&error_text) {
                api_error.error.message
            } else {
                error_text
            };

            Err(match status {
                StatusCode::TOO_MANY_REQUESTS => rate_limited("openai", retry_after_ms),
                StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => invalid_api_key("openai"),
                _ => request_failed("openai", status.as_u16() as i32, error_msg),
            })
        }
    }
}

fn parse_retry_after_ms(headers: &reqwest::header::HeaderMap) -> Option<i64> {
    headers
        .get("retry-after")
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.parse::<f64>().ok())
        .map(|seconds| (seconds * 1000.0) as i64)
}

impl std::fmt::Debug for OpenAIClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OpenAIClient")
            .field("base_url", &self.base_url)
            .field("api_key", &"[REDACTED]")
            .field("max_retries", &self.max_retries)
            .finish()
    }
}
