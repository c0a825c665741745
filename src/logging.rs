use anyhow::{Context, Result};
use regex::Regex;
use std::fs::OpenOptions;
use std::path::{Path, PathBuf};
use std::sync::{LazyLock, Mutex};
use tracing_subscriber::EnvFilter;

/// Default log location: `<data_local_dir>/ai-selector/ai-selector.log`.
pub fn default_log_path() -> Option<PathBuf> {
    dirs::data_local_dir().map(|d| d.join("ai-selector").join("ai-selector.log"))
}

/// Install a global `tracing` subscriber writing to `path`.
///
/// The TUI owns stdout, so logs always go to a file. Level comes from
/// `RUST_LOG`, defaulting to `info`.
pub fn init(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create log directory {}", parent.display()))?;
    }
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("Failed to open log file {}", path.display()))?;

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_ansi(false)
        .with_target(false)
        .with_writer(Mutex::new(file))
        .try_init()
        .map_err(|e| anyhow::anyhow!("Failed to install log subscriber: {e}"))?;
    Ok(())
}

// ── Secret redaction ──────────────────────────────────────────────────────────

static SECRET_PATTERNS: LazyLock<Vec<(Regex, &'static str)>> = LazyLock::new(|| {
    [
        (r"AIza[A-Za-z0-9_-]{35}", "AIza***"),
        (r"sk-[A-Za-z0-9]{48,}", "sk-***"),
        (r"hf_[A-Za-z0-9]{34,}", "hf_***"),
        (r"gsk_[A-Za-z0-9_]{50,}", "gsk_***"),
        (r"r8_[A-Za-z0-9]{30,}", "r8_***"),
        (r"(?i)Bearer [A-Za-z0-9_\-\.]{20,}", "Bearer ***"),
        (r"(?i)Basic [A-Za-z0-9+/=]{20,}", "Basic ***"),
        (
            r"(?i)([?&](?:key|api_key|apikey|token|access_token|secret|password|pwd)=)[^&\s]+",
            "${1}***",
        ),
    ]
    .into_iter()
    .filter_map(|(pattern, replacement)| Regex::new(pattern).ok().map(|re| (re, replacement)))
    .collect()
});

/// Mask API keys, bearer/basic credentials and secret query parameters so
/// error text can be logged safely.
pub fn redact_secrets(message: &str) -> String {
    let mut out = message.to_string();
    for (re, replacement) in SECRET_PATTERNS.iter() {
        out = re.replace_all(&out, *replacement).into_owned();
    }
    out
}
