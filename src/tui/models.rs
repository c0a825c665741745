use serde::{Deserialize, Deserializer};
use serde_json::Value;

// ── Wire / view-model records ─────────────────────────────────────────────────

pub const UNKNOWN: &str = "Unknown";
pub const MISSING: &str = "—";

/// Result of `POST /api/v1/prompts/process`.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct PromptResult {
    #[serde(default)]
    pub selected_model: Option<String>,
    #[serde(default)]
    pub provider: Option<String>,
    #[serde(default, deserialize_with = "opt_number")]
    pub response_time_seconds: Option<f64>,
    #[serde(default)]
    pub response: Option<String>,
}

impl PromptResult {
    pub fn model_label(&self) -> &str {
        non_empty(self.selected_model.as_deref()).unwrap_or(UNKNOWN)
    }

    pub fn provider_label(&self) -> &str {
        non_empty(self.provider.as_deref()).unwrap_or(UNKNOWN)
    }

    pub fn time_label(&self) -> String {
        format_time(self.response_time_seconds)
    }

    pub fn response_text(&self) -> &str {
        non_empty(self.response.as_deref()).unwrap_or("No response")
    }
}

/// One row of `GET /api/v1/models/stats`.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct ModelStat {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub provider: Option<String>,
    #[serde(default, deserialize_with = "opt_number")]
    pub reliability_score: Option<f64>,
    #[serde(default, deserialize_with = "opt_number")]
    pub success_rate: Option<f64>,
    #[serde(default)]
    pub is_active: Option<bool>,
    #[serde(default, deserialize_with = "opt_number")]
    pub average_response_time: Option<f64>,
    #[serde(default)]
    pub total_requests: Option<u64>,
}

impl ModelStat {
    /// Score used for ranking; missing counts as zero.
    pub fn rank_score(&self) -> f64 {
        self.reliability_score.unwrap_or(0.0)
    }

    pub fn name_label(&self) -> &str {
        non_empty(self.name.as_deref()).unwrap_or(MISSING)
    }

    pub fn provider_label(&self) -> &str {
        non_empty(self.provider.as_deref()).unwrap_or(MISSING)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct ModelStatsResponse {
    #[serde(default)]
    pub models: Vec<ModelStat>,
    #[serde(default)]
    pub total_models: Option<u64>,
}

/// One entry of `POST /api/v1/providers/test`.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct ProviderTestResult {
    #[serde(default)]
    pub provider: Option<String>,
    #[serde(default)]
    pub model: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default, deserialize_with = "opt_number")]
    pub response_time: Option<f64>,
    #[serde(default)]
    pub error: Option<String>,
}

impl ProviderTestResult {
    pub fn is_success(&self) -> bool {
        self.status.as_deref() == Some("success")
    }

    pub fn provider_label(&self) -> &str {
        non_empty(self.provider.as_deref()).unwrap_or(MISSING)
    }

    pub fn model_label(&self) -> &str {
        non_empty(self.model.as_deref()).unwrap_or(MISSING)
    }

    pub fn error_label(&self) -> &str {
        non_empty(self.error.as_deref()).unwrap_or("Error")
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct ProviderTestReport {
    #[serde(default)]
    pub successful: u64,
    #[serde(default)]
    pub failed: u64,
    #[serde(default)]
    pub total_providers: u64,
    #[serde(default)]
    pub results: Vec<ProviderTestResult>,
}

impl ProviderTestReport {
    /// Share of working providers, `None` when nothing was tested.
    pub fn success_percent(&self) -> Option<f64> {
        if self.total_providers == 0 {
            None
        } else {
            Some(self.successful as f64 / self.total_providers as f64 * 100.0)
        }
    }

    /// Successful result with the lowest response time.
    pub fn fastest(&self) -> Option<&ProviderTestResult> {
        self.results
            .iter()
            .filter(|r| r.is_success())
            .filter(|r| r.response_time.is_some())
            .min_by(|a, b| {
                a.response_time
                    .unwrap_or(f64::INFINITY)
                    .total_cmp(&b.response_time.unwrap_or(f64::INFINITY))
            })
    }

    pub fn summary_line(&self) -> String {
        format!(
            "✓ {} / ✗ {} of {} providers",
            self.successful, self.failed, self.total_providers
        )
    }
}

// ── Health ────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HealthStatus {
    Healthy,
    Degraded,
    Unreachable,
}

impl HealthStatus {
    pub fn indicator(&self) -> &'static str {
        match self {
            HealthStatus::Healthy => "Online",
            HealthStatus::Degraded => "Degraded",
            HealthStatus::Unreachable => "Offline",
        }
    }
}

/// Body of `GET /health`. Only `status` drives the indicator.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct HealthBody {
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub service: Option<String>,
    #[serde(default)]
    pub version: Option<String>,
    #[serde(default)]
    pub data_api_connection: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct HealthReport {
    pub status: HealthStatus,
    pub service: Option<String>,
    pub version: Option<String>,
    pub data_api_connection: Option<String>,
}

impl HealthReport {
    pub fn unreachable() -> Self {
        HealthReport {
            status: HealthStatus::Unreachable,
            service: None,
            version: None,
            data_api_connection: None,
        }
    }

    pub fn from_body(body: HealthBody) -> Self {
        let status = if body.status.as_deref() == Some("healthy") {
            HealthStatus::Healthy
        } else {
            HealthStatus::Degraded
        };
        HealthReport {
            status,
            service: body.service,
            version: body.version,
            data_api_connection: body.data_api_connection,
        }
    }
}

// ── Ranking / formatting ──────────────────────────────────────────────────────

/// Sort by reliability score, highest first. Stable: ties keep server order.
pub fn sort_by_reliability(models: &mut [ModelStat]) {
    models.sort_by(|a, b| b.rank_score().total_cmp(&a.rank_score()));
}

/// Decorative marker for the podium positions (1-based rank).
pub fn rank_marker(rank: usize) -> Option<&'static str> {
    match rank {
        1 => Some("🥇"),
        2 => Some("🥈"),
        3 => Some("🥉"),
        _ => None,
    }
}

/// Marker for the top three, the plain rank number afterwards.
pub fn rank_label(rank: usize) -> String {
    rank_marker(rank)
        .map(str::to_string)
        .unwrap_or_else(|| rank.to_string())
}

pub fn format_time(seconds: Option<f64>) -> String {
    match seconds {
        Some(s) => format!("{s:.2}s"),
        None => MISSING.to_string(),
    }
}

pub fn format_percent(value: Option<f64>) -> String {
    match value {
        Some(v) => format!("{:.1}%", v * 100.0),
        None => MISSING.to_string(),
    }
}

pub fn format_score(value: Option<f64>) -> String {
    match value {
        Some(v) => format!("{v:.2}"),
        None => MISSING.to_string(),
    }
}

fn non_empty(s: Option<&str>) -> Option<&str> {
    s.filter(|v| !v.trim().is_empty())
}

/// Accepts a JSON number, a numeric string (decimals are serialised as
/// strings by the backend) or null.
fn opt_number<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(Value::Number(n)) => n.as_f64(),
        Some(Value::String(s)) => s.trim().parse::<f64>().ok(),
        _ => None,
    })
}
