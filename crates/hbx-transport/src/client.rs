//! HTTP client for the Hummingbot API.
//!
//! Every call carries Basic Auth and a per-call timeout. Transient
//! failures (connect/timeout/5xx) are retried with a fixed delay up to
//! the policy budget; the retry loop checks the cancellation token
//! between attempts, never mid-request.

use crate::auth::Credentials;
use crate::error::{connectivity_hint, TransportError, TransportResult};
use crate::policy::RetryPolicy;
use reqwest::{Method, StatusCode};
use serde_json::Value;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// Default per-call timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Authenticated transport to one Hummingbot API server.
pub struct ApiTransport {
    client: reqwest::Client,
    base_url: String,
    credentials: Credentials,
    policy: RetryPolicy,
    cancel: CancellationToken,
}

impl ApiTransport {
    /// Create a transport with the default timeout and retry policy.
    pub fn new(base_url: impl Into<String>, credentials: Credentials) -> TransportResult<Self> {
        Self::with_options(
            base_url,
            credentials,
            DEFAULT_TIMEOUT,
            RetryPolicy::default(),
            CancellationToken::new(),
        )
    }

    /// Create a transport with explicit timeout, retry policy, and
    /// cancellation token.
    pub fn with_options(
        base_url: impl Into<String>,
        credentials: Credentials,
        timeout: Duration,
        policy: RetryPolicy,
        cancel: CancellationToken,
    ) -> TransportResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| TransportError::Client(e.to_string()))?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            credentials,
            policy,
            cancel,
        })
    }

    /// Base URL this transport talks to.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Username the transport authenticates as (password stays private).
    pub fn identity(&self) -> String {
        self.credentials.masked()
    }

    /// Token that aborts the retry loop between attempts.
    pub fn cancellation_token(&self) -> &CancellationToken {
        &self.cancel
    }

    /// Perform a request with retry on transient failure.
    ///
    /// Returns the parsed JSON response body (`Value::Null` for empty
    /// bodies). A body carrying a `detail` field is a server-reported
    /// error regardless of HTTP status and surfaces as `Validation`.
    pub async fn request(
        &self,
        method: Method,
        path: &str,
        body: Option<&Value>,
    ) -> TransportResult<Value> {
        let url = format!("{}/{}", self.base_url, path.trim_start_matches('/'));
        let mut attempt = 0u32;

        loop {
            attempt += 1;
            if self.cancel.is_cancelled() {
                return Err(TransportError::Cancelled);
            }

            match self.execute_once(&method, &url, body).await {
                Ok(value) => {
                    if attempt > 1 {
                        info!(url = %url, attempt, "request succeeded after retry");
                    }
                    return Ok(value);
                }
                Err(err) if self.policy.should_retry(&err, attempt) => {
                    warn!(
                        url = %url,
                        attempt,
                        max_attempts = self.policy.max_retries,
                        error = %err,
                        "transient failure, retrying"
                    );
                    tokio::select! {
                        _ = self.cancel.cancelled() => return Err(TransportError::Cancelled),
                        _ = tokio::time::sleep(self.policy.delay) => {}
                    }
                }
                Err(err) => return Err(err),
            }
        }
    }

    /// GET a path.
    pub async fn get(&self, path: &str) -> TransportResult<Value> {
        self.request(Method::GET, path, None).await
    }

    /// POST a JSON body to a path.
    pub async fn post(&self, path: &str, body: &Value) -> TransportResult<Value> {
        self.request(Method::POST, path, Some(body)).await
    }

    /// DELETE a path.
    pub async fn delete(&self, path: &str) -> TransportResult<Value> {
        self.request(Method::DELETE, path, None).await
    }

    async fn execute_once(
        &self,
        method: &Method,
        url: &str,
        body: Option<&Value>,
    ) -> TransportResult<Value> {
        debug!(method = %method, url = %url, user = %self.credentials.username(), "API request");

        let mut request = self
            .client
            .request(method.clone(), url)
            .basic_auth(self.credentials.username(), Some(self.credentials.password()));
        if let Some(body) = body {
            request = request.json(body);
        }

        let response = request.send().await.map_err(|e| {
            let message = if e.is_timeout() {
                "request timed out".to_string()
            } else if e.is_connect() {
                format!("connection failed: {e}")
            } else {
                e.to_string()
            };
            TransportError::Connectivity {
                url: url.to_string(),
                message,
                hint: connectivity_hint(url),
            }
        })?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| TransportError::Decode {
                url: url.to_string(),
                message: e.to_string(),
            })?;

        self.classify(url, status, text)
    }

    fn classify(&self, url: &str, status: StatusCode, text: String) -> TransportResult<Value> {
        if status == StatusCode::UNAUTHORIZED {
            return Err(TransportError::Authentication {
                url: url.to_string(),
                username: self.credentials.username().to_string(),
            });
        }

        if status.is_success() {
            let value: Value = if text.trim().is_empty() {
                Value::Null
            } else {
                serde_json::from_str(&text).map_err(|e| TransportError::Decode {
                    url: url.to_string(),
                    message: format!("{e} (body: {})", truncate(&text)),
                })?
            };
            // The API distinguishes error payloads by the presence of a
            // `detail` field, even under a success status.
            if let Some(detail) = extract_detail(&value) {
                return Err(TransportError::Validation {
                    url: url.to_string(),
                    detail,
                });
            }
            return Ok(value);
        }

        let detail = serde_json::from_str::<Value>(&text)
            .ok()
            .as_ref()
            .and_then(extract_detail)
            .unwrap_or_else(|| truncate(&text));

        match status.as_u16() {
            400 | 422 => Err(TransportError::Validation {
                url: url.to_string(),
                detail,
            }),
            404 => Err(TransportError::NotFound {
                url: url.to_string(),
                detail,
            }),
            409 => Err(TransportError::Conflict {
                url: url.to_string(),
                detail,
            }),
            s if s >= 500 => Err(TransportError::Server {
                url: url.to_string(),
                status: s,
                body: truncate(&text),
            }),
            s => Err(TransportError::UnexpectedStatus {
                url: url.to_string(),
                status: s,
                body: truncate(&text),
            }),
        }
    }
}

/// Pull the `detail` field out of an error payload.
fn extract_detail(value: &Value) -> Option<String> {
    let detail = value.as_object()?.get("detail")?;
    Some(match detail {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    })
}

fn truncate(text: &str) -> String {
    const MAX: usize = 256;
    if text.len() <= MAX {
        text.to_string()
    } else {
        format!("{}...", &text[..MAX])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn transport() -> ApiTransport {
        ApiTransport::new("http://localhost:8000/", Credentials::default()).unwrap()
    }

    #[test]
    fn test_base_url_trailing_slash_stripped() {
        assert_eq!(transport().base_url(), "http://localhost:8000");
    }

    #[test]
    fn test_extract_detail_variants() {
        let err = serde_json::json!({"detail": "Executor not found"});
        assert_eq!(extract_detail(&err), Some("Executor not found".to_string()));

        let structured = serde_json::json!({"detail": {"field": "stop_loss"}});
        assert_eq!(
            extract_detail(&structured),
            Some("{\"field\":\"stop_loss\"}".to_string())
        );

        let ok = serde_json::json!({"id": "abc"});
        assert_eq!(extract_detail(&ok), None);
        assert_eq!(extract_detail(&Value::Null), None);
    }

    #[test]
    fn test_classify_statuses() {
        let t = transport();
        let url = "http://localhost:8000/api/v1/executors";

        assert!(matches!(
            t.classify(url, StatusCode::UNAUTHORIZED, String::new()),
            Err(TransportError::Authentication { .. })
        ));
        assert!(matches!(
            t.classify(url, StatusCode::NOT_FOUND, "{\"detail\":\"gone\"}".into()),
            Err(TransportError::NotFound { .. })
        ));
        assert!(matches!(
            t.classify(url, StatusCode::CONFLICT, "{\"detail\":\"exists\"}".into()),
            Err(TransportError::Conflict { .. })
        ));
        assert!(matches!(
            t.classify(url, StatusCode::UNPROCESSABLE_ENTITY, "{}".into()),
            Err(TransportError::Validation { .. })
        ));
        assert!(matches!(
            t.classify(url, StatusCode::BAD_GATEWAY, String::new()),
            Err(TransportError::Server { status: 502, .. })
        ));
        assert!(matches!(
            t.classify(url, StatusCode::IM_A_TEAPOT, String::new()),
            Err(TransportError::UnexpectedStatus { status: 418, .. })
        ));
    }

    #[test]
    fn test_success_with_detail_is_error() {
        let t = transport();
        let result = t.classify(
            "http://localhost:8000/api/v1/executors",
            StatusCode::OK,
            "{\"detail\":\"invalid executor_config\"}".into(),
        );
        assert!(matches!(result, Err(TransportError::Validation { detail, .. })
            if detail == "invalid executor_config"));
    }

    #[test]
    fn test_success_empty_body_is_null() {
        let t = transport();
        let value = t
            .classify("http://localhost:8000/x", StatusCode::OK, String::new())
            .unwrap();
        assert!(value.is_null());
    }
}
