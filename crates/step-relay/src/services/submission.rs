//! HTTP submission client for the remote step-count endpoint
//!
//! The endpoint speaks form-encoded requests and answers with a small JSON
//! envelope (`code`, `msg`, `data`). `submit` never returns an error: every
//! failure is folded into a failed `SubmissionOutcome` so callers always have
//! something to record.

use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, ACCEPT_LANGUAGE, ORIGIN, REFERER, USER_AGENT};
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, warn};

use crate::config::SubmissionConfig;
use crate::errors::SubmissionError;
use crate::models::{Account, AttemptStatus};

const MOBILE_USER_AGENT: &str = "Mozilla/5.0 (iPhone; CPU iPhone OS 17_6_1 like Mac OS X) AppleWebKit/605.1.15 (KHTML, like Gecko) Version/17.6 Mobile/15E148 Safari/604.1";

/// Result of one submission attempt, ready for recording
#[derive(Debug, Clone)]
pub struct SubmissionOutcome {
    pub status: AttemptStatus,
    pub message: String,
    pub response_code: i32,
}

impl SubmissionOutcome {
    pub fn is_success(&self) -> bool {
        self.status == AttemptStatus::Success
    }

    fn failed(error: &SubmissionError) -> Self {
        Self {
            status: AttemptStatus::Failed,
            message: error.to_string(),
            response_code: 0,
        }
    }
}

/// JSON envelope returned by the step endpoint
#[derive(Debug, Deserialize)]
pub struct EndpointResponse {
    pub code: Option<i32>,
    pub msg: Option<String>,
    pub data: Option<serde_json::Value>,
}

pub struct SubmissionClient {
    http_client: reqwest::Client,
    endpoint: String,
    default_auth_token: String,
    default_time_token: String,
}

impl SubmissionClient {
    pub fn new(config: &SubmissionConfig) -> anyhow::Result<Self> {
        let timeout = config.timeout_duration()?;

        let mut headers = HeaderMap::new();
        headers.insert(USER_AGENT, HeaderValue::from_static(MOBILE_USER_AGENT));
        headers.insert(ACCEPT, HeaderValue::from_static("*/*"));
        headers.insert(
            ACCEPT_LANGUAGE,
            HeaderValue::from_static("zh-TW,zh-Hant;q=0.9"),
        );
        headers.insert(
            "X-Requested-With",
            HeaderValue::from_static("XMLHttpRequest"),
        );
        if let Some(origin) = Self::origin_for(&config.endpoint) {
            if let Ok(value) = HeaderValue::from_str(&origin) {
                headers.insert(ORIGIN, value);
            }
            if let Ok(value) = HeaderValue::from_str(&format!("{origin}/bushu/")) {
                headers.insert(REFERER, value);
            }
        }

        let http_client = reqwest::Client::builder()
            .timeout(timeout)
            .default_headers(headers)
            .build()?;

        Ok(Self {
            http_client,
            endpoint: config.endpoint.clone(),
            default_auth_token: config.default_auth_token.clone(),
            default_time_token: config.default_time_token.clone(),
        })
    }

    /// Submit one account's step count.
    ///
    /// Infallible by contract: transport, parse, and header failures all come
    /// back as a failed outcome carrying the error text as its message.
    pub async fn submit(&self, account: &Account) -> SubmissionOutcome {
        match self.try_submit(account).await {
            Ok(outcome) => outcome,
            Err(e) => {
                warn!("Submission for account {} failed: {}", account.phone, e);
                SubmissionOutcome::failed(&e)
            }
        }
    }

    async fn try_submit(&self, account: &Account) -> Result<SubmissionOutcome, SubmissionError> {
        let auth_token = Self::or_default(&account.auth_token, &self.default_auth_token);
        let time_token = Self::or_default(&account.time_token, &self.default_time_token);

        // Per-account header values come from user input; reject bad ones
        // before reqwest panics on them
        let auth_value = HeaderValue::from_str(auth_token)
            .map_err(|e| SubmissionError::Unknown(format!("invalid auth token: {e}")))?;
        let time_value = HeaderValue::from_str(time_token)
            .map_err(|e| SubmissionError::Unknown(format!("invalid time token: {e}")))?;

        let steps = account.steps.to_string();
        let form = [
            ("phone", account.phone.as_str()),
            ("pwd", account.password.as_str()),
            ("num", steps.as_str()),
        ];

        debug!(
            "Submitting {} steps for account {} to {}",
            account.steps, account.phone, self.endpoint
        );

        let response = self
            .http_client
            .post(&self.endpoint)
            .header("Authorization", auth_value)
            .header("time", time_value)
            .form(&form)
            .send()
            .await
            .map_err(|e| SubmissionError::Transport(e.to_string()))?;

        let body = response
            .text()
            .await
            .map_err(|e| SubmissionError::Transport(e.to_string()))?;

        let parsed: EndpointResponse = serde_json::from_str(&body)
            .map_err(|e| SubmissionError::Parse(e.to_string()))?;

        Ok(interpret_response(&parsed))
    }

    fn or_default<'a>(value: &'a str, default: &'a str) -> &'a str {
        if value.is_empty() { default } else { value }
    }

    /// Scheme and host of the endpoint URL, for Origin/Referer headers
    fn origin_for(endpoint: &str) -> Option<String> {
        let parsed = url::Url::parse(endpoint).ok()?;
        let host = parsed.host_str()?;
        match parsed.port() {
            Some(port) => Some(format!("{}://{}:{}", parsed.scheme(), host, port)),
            None => Some(format!("{}://{}", parsed.scheme(), host)),
        }
    }
}

/// Map the endpoint envelope to an outcome.
///
/// Success requires both `code == 200` and `msg == "success"`. The recorded
/// message prefers a non-empty `data` payload, then `msg`, then a fixed
/// fallback.
pub fn interpret_response(response: &EndpointResponse) -> SubmissionOutcome {
    let success =
        response.code == Some(200) && response.msg.as_deref() == Some("success");

    let message = data_message(response.data.as_ref())
        .or_else(|| {
            response
                .msg
                .as_ref()
                .filter(|m| !m.is_empty())
                .cloned()
        })
        .unwrap_or_else(|| "Unknown response".to_string());

    SubmissionOutcome {
        status: if success {
            AttemptStatus::Success
        } else {
            AttemptStatus::Failed
        },
        message,
        response_code: response.code.unwrap_or(0),
    }
}

fn data_message(data: Option<&serde_json::Value>) -> Option<String> {
    match data? {
        serde_json::Value::Null => None,
        serde_json::Value::String(s) if s.is_empty() => None,
        serde_json::Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}
