use std::{fmt::Debug, time::Duration};

use async_trait::async_trait;
use reqwest::{Client, StatusCode, Url};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, warn};

use crate::error::WeatherError;

/// Status line and body of one HTTP exchange.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub body: String,
}

/// Minimal HTTP GET seam used by the retry loop.
#[async_trait]
pub trait Transport: Send + Sync + Debug {
    /// Returns `Err(WeatherError::Network)` only when no response arrived.
    async fn get(&self, url: &Url) -> Result<HttpResponse, WeatherError>;
}

#[derive(Debug, Clone, Default)]
pub struct ReqwestTransport {
    http: Client,
}

impl ReqwestTransport {
    pub fn new(http: Client) -> Self {
        Self { http }
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn get(&self, url: &Url) -> Result<HttpResponse, WeatherError> {
        let res = self
            .http
            .get(url.clone())
            .send()
            .await
            .map_err(|e| WeatherError::Network(e.without_url().to_string()))?;

        let status = res.status().as_u16();
        let body = res.text().await.map_err(|e| WeatherError::Network(e.without_url().to_string()))?;

        Ok(HttpResponse { status, body })
    }
}

/// Bounded exponential backoff: `initial_delay`, then twice that, and so on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    #[serde(rename = "initial_delay_ms", with = "millis")]
    pub initial_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self { max_attempts: 3, initial_delay: Duration::from_millis(400) }
    }
}

mod millis {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(d: &Duration, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_u64(d.as_millis().try_into().unwrap_or(u64::MAX))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Duration, D::Error> {
        u64::deserialize(d).map(Duration::from_millis)
    }
}

/// GETs `url` and parses the body as JSON, retrying transient failures.
///
/// Network errors and 5xx answers are retried until `policy.max_attempts` is
/// reached; the last error is returned. Any other failure status ends the
/// loop immediately.
pub async fn fetch_with_retry(
    transport: &dyn Transport,
    url: &Url,
    policy: &RetryPolicy,
) -> Result<Value, WeatherError> {
    let max_attempts = policy.max_attempts.max(1);
    let mut delay = policy.initial_delay;
    let mut attempt = 1;

    loop {
        debug!(endpoint = url.path(), attempt, max_attempts, "Sending request");

        match fetch_once(transport, url).await {
            Ok(value) => return Ok(value),
            Err(err) if err.is_retryable() && attempt < max_attempts => {
                warn!(
                    endpoint = url.path(),
                    attempt,
                    error = %err,
                    "Transient failure, retrying in {}ms",
                    delay.as_millis()
                );
                tokio::time::sleep(delay).await;
                delay = delay.saturating_mul(2);
                attempt += 1;
            }
            Err(err) => {
                debug!(endpoint = url.path(), attempt, error = %err, "Giving up");
                return Err(err);
            }
        }
    }
}

async fn fetch_once(transport: &dyn Transport, url: &Url) -> Result<Value, WeatherError> {
    let res = transport.get(url).await?;

    if (200..300).contains(&res.status) {
        return serde_json::from_str(&res.body)
            .map_err(|e| WeatherError::parse(format!("{} response JSON", url.path()), e));
    }

    let message = failure_message(res.status, &res.body);
    if res.status >= 500 {
        Err(WeatherError::Server { status: res.status, message })
    } else {
        Err(WeatherError::Client { status: res.status, message })
    }
}

/// Body text if any, else the canonical reason phrase.
fn failure_message(status: u16, body: &str) -> String {
    let body = body.trim();
    if !body.is_empty() {
        return truncate_body(body);
    }

    StatusCode::from_u16(status)
        .ok()
        .and_then(|s| s.canonical_reason())
        .unwrap_or("Unknown error")
        .to_string()
}

fn truncate_body(body: &str) -> String {
    const MAX: usize = 200;
    match body.char_indices().nth(MAX) {
        Some((cut, _)) => format!("{}...", &body[..cut]),
        None => body.to_string(),
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use std::{
        collections::VecDeque,
        sync::Mutex,
    };

    use super::*;

    /// Replays scripted answers and records when each request arrived.
    #[derive(Debug, Default)]
    pub struct ScriptedTransport {
        script: Mutex<VecDeque<Result<HttpResponse, WeatherError>>>,
        calls: Mutex<Vec<(String, tokio::time::Instant)>>,
    }

    impl ScriptedTransport {
        pub fn new(script: impl IntoIterator<Item = Result<HttpResponse, WeatherError>>) -> Self {
            Self { script: Mutex::new(script.into_iter().collect()), calls: Mutex::default() }
        }

        pub fn status(status: u16, body: &str) -> Result<HttpResponse, WeatherError> {
            Ok(HttpResponse { status, body: body.to_string() })
        }

        pub fn attempts(&self) -> usize {
            self.calls.lock().unwrap().len()
        }

        pub fn call_times(&self) -> Vec<tokio::time::Instant> {
            self.calls.lock().unwrap().iter().map(|(_, at)| *at).collect()
        }

        pub fn urls(&self) -> Vec<String> {
            self.calls.lock().unwrap().iter().map(|(url, _)| url.clone()).collect()
        }
    }

    #[async_trait]
    impl Transport for ScriptedTransport {
        async fn get(&self, url: &Url) -> Result<HttpResponse, WeatherError> {
            self.calls.lock().unwrap().push((url.to_string(), tokio::time::Instant::now()));
            self.script
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| Err(WeatherError::Network("script exhausted".into())))
        }
    }
}
