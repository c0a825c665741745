use reqwest::{Client, Method, StatusCode};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{json, Value};
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, warn};

use crate::logging::redact_secrets;
use crate::tui::models::{
    HealthBody, HealthReport, ModelStat, ModelStatsResponse, PromptResult, ProviderTestReport,
};

pub const PROCESS_PATH: &str = "/api/v1/prompts/process";
pub const STATS_PATH: &str = "/api/v1/models/stats";
pub const PROVIDERS_TEST_PATH: &str = "/api/v1/providers/test";
pub const HEALTH_PATH: &str = "/health";

/// Backend rejects prompts longer than this.
pub const MAX_PROMPT_CHARS: usize = 10_000;

// ── Errors ────────────────────────────────────────────────────────────────────

/// Input rejected locally, before any request is made.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Enter a prompt")]
    EmptyPrompt,
    #[error("Prompt is too long: {len} characters (maximum {max})")]
    PromptTooLong { len: usize, max: usize },
}

/// Any failed request: bad status, transport failure, unreadable body.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Non-success status; message is the server `detail` or a generic fallback.
    #[error("{message}")]
    Status { status: StatusCode, message: String },
    #[error("Request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("Invalid response: {0}")]
    Decode(#[from] serde_json::Error),
}

impl ApiError {
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            ApiError::Status { status, .. } => Some(*status),
            ApiError::Transport(e) => e.status(),
            ApiError::Decode(_) => None,
        }
    }
}

/// Trim and bound-check a prompt before submission.
pub fn validate_prompt(raw: &str) -> Result<String, ValidationError> {
    let prompt = raw.trim();
    if prompt.is_empty() {
        return Err(ValidationError::EmptyPrompt);
    }
    let len = prompt.chars().count();
    if len > MAX_PROMPT_CHARS {
        return Err(ValidationError::PromptTooLong { len, max: MAX_PROMPT_CHARS });
    }
    Ok(prompt.to_string())
}

#[derive(Deserialize)]
struct ErrorBody {
    #[serde(default)]
    detail: Option<Value>,
}

/// Message for a non-success response: the body's `detail` string when
/// present, otherwise `API error <status>`.
pub fn error_message(status: StatusCode, body: &str) -> String {
    serde_json::from_str::<ErrorBody>(body)
        .ok()
        .and_then(|b| b.detail)
        .and_then(|d| match d {
            Value::String(s) if !s.trim().is_empty() => Some(s),
            _ => None,
        })
        .unwrap_or_else(|| format!("API error {}", status.as_u16()))
}

// ── Client ────────────────────────────────────────────────────────────────────

/// Thin typed client over the selector backend. Cheap to clone.
#[derive(Clone, Debug)]
pub struct ApiClient {
    client: Client,
    base_url: String,
}

impl ApiClient {
    pub fn new(base_url: &str, timeout: Option<Duration>) -> Result<Self, ApiError> {
        let mut builder = Client::builder();
        if let Some(t) = timeout {
            builder = builder.timeout(t);
        }
        Ok(ApiClient {
            client: builder.build()?,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Shared request helper: JSON content type, status check, JSON decode.
    async fn call<T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        body: Option<Value>,
    ) -> Result<T, ApiError> {
        let url = format!("{}{}", self.base_url, path);
        debug!(%method, %url, "api request");
        let mut req = self
            .client
            .request(method.clone(), &url)
            .header("content-type", "application/json");
        if let Some(body) = body {
            req = req.json(&body);
        }

        let resp = req.send().await.inspect_err(|e| {
            warn!(%method, path, error = %redact_secrets(&e.to_string()), "transport failure");
        })?;
        let status = resp.status();
        let text = resp.text().await?;

        if !status.is_success() {
            let message = error_message(status, &text);
            warn!(%method, path, status = status.as_u16(), message = %redact_secrets(&message), "api error");
            return Err(ApiError::Status { status, message });
        }

        serde_json::from_str::<T>(&text).map_err(|e| {
            warn!(%method, path, error = %e, "undecodable response");
            ApiError::Decode(e)
        })
    }

    pub async fn process_prompt(&self, prompt: &str) -> Result<PromptResult, ApiError> {
        self.call(Method::POST, PROCESS_PATH, Some(json!({ "prompt": prompt })))
            .await
    }

    pub async fn model_stats(&self) -> Result<ModelStatsResponse, ApiError> {
        self.call(Method::GET, STATS_PATH, None).await
    }

    /// Stats sorted for display, highest reliability first.
    pub async fn ranked_models(&self) -> Result<Vec<ModelStat>, ApiError> {
        let mut models = self.model_stats().await?.models;
        crate::tui::models::sort_by_reliability(&mut models);
        Ok(models)
    }

    pub async fn test_providers(&self) -> Result<ProviderTestReport, ApiError> {
        self.call(Method::POST, PROVIDERS_TEST_PATH, None).await
    }

    /// Never fails: any error maps to an unreachable report.
    pub async fn health(&self) -> HealthReport {
        match self.call::<HealthBody>(Method::GET, HEALTH_PATH, None).await {
            Ok(body) => HealthReport::from_body(body),
            Err(e) => {
                debug!(error = %redact_secrets(&e.to_string()), "health check failed");
                HealthReport::unreachable()
            }
        }
    }
}
