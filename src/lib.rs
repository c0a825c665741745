pub mod config;
pub mod logging;
pub mod tui;

pub use config::Config;
pub use tui::{
    render_to_buffer, ApiClient, ApiError, App, HealthStatus, Tab, ValidationError,
};

use anyhow::{bail, Context, Result};
use std::path::Path;

use crate::tui::draw::{provider_entries, provider_summary, stats_rows, STATS_HEADER};
use crate::tui::models::{HealthReport, ModelStat, PromptResult, ProviderTestReport};
use crate::tui::util::{sanitize_inline, sanitize_text};

// ── Plain-text renderings for non-interactive mode ────────────────────────────

pub fn render_prompt_result(result: &PromptResult) -> String {
    format!(
        "{}\n\nModel    : {}\nProvider : {}\nTime     : {}\n",
        sanitize_text(result.response_text()).trim_end(),
        sanitize_inline(result.model_label()),
        sanitize_inline(result.provider_label()),
        result.time_label(),
    )
}

/// Ranked table with space-padded columns.
pub fn render_stats(models: &[ModelStat]) -> String {
    let rows = stats_rows(models);
    let mut widths: Vec<usize> = STATS_HEADER.iter().map(|h| h.chars().count()).collect();
    for row in &rows {
        for (w, cell) in widths.iter_mut().zip(row) {
            *w = (*w).max(cell.chars().count());
        }
    }
    let fmt_row = |cells: Vec<String>| -> String {
        cells
            .iter()
            .zip(&widths)
            .map(|(c, w)| format!("{c:<w$}", w = *w))
            .collect::<Vec<_>>()
            .join("  ")
            .trim_end()
            .to_string()
    };
    let mut out = fmt_row(STATS_HEADER.iter().map(|h| h.to_string()).collect());
    out.push('\n');
    for row in rows {
        out.push_str(&fmt_row(row));
        out.push('\n');
    }
    out
}

pub fn render_provider_report(report: &ProviderTestReport) -> String {
    let mut out = String::new();
    for line in provider_entries(report) {
        out.push_str(&line);
        out.push('\n');
    }
    out.push_str("───────────────\n");
    for line in provider_summary(report) {
        out.push_str(&line);
        out.push('\n');
    }
    out
}

pub fn render_health(api_url: &str, report: &HealthReport) -> String {
    let mut out = format!("{api_url}: {}\n", report.status.indicator());
    if let Some(service) = &report.service {
        out.push_str(&format!("Service  : {}\n", sanitize_inline(service)));
    }
    if let Some(version) = &report.version {
        out.push_str(&format!("Version  : {}\n", sanitize_inline(version)));
    }
    if let Some(conn) = &report.data_api_connection {
        out.push_str(&format!("Data API : {}\n", sanitize_inline(conn)));
    }
    out
}

// ── Commands ──────────────────────────────────────────────────────────────────

pub async fn prompt(client: &ApiClient, text: &str) -> Result<()> {
    let prompt = tui::api::validate_prompt(text)?;
    let result = client.process_prompt(&prompt).await?;
    print!("{}", render_prompt_result(&result));
    Ok(())
}

pub async fn stats(client: &ApiClient) -> Result<()> {
    let models = client.ranked_models().await?;
    print!("{}", render_stats(&models));
    Ok(())
}

pub async fn test_providers(client: &ApiClient) -> Result<()> {
    eprintln!("Testing all providers, this can take 10-30 seconds…");
    let report = client.test_providers().await?;
    print!("{}", render_provider_report(&report));
    Ok(())
}

/// Prints the health report; errors unless the backend reports healthy.
pub async fn health(client: &ApiClient) -> Result<()> {
    let report = client.health().await;
    print!("{}", render_health(client.base_url(), &report));
    if report.status != HealthStatus::Healthy {
        bail!("Backend is {}", report.status.indicator().to_lowercase());
    }
    Ok(())
}

pub fn show_config(config: &Config, path: Option<&Path>, save: bool) -> Result<()> {
    if save {
        let path = path.context("No configuration directory available on this platform")?;
        config.save_to(path)?;
        println!("Saved configuration to {}", path.display());
    }
    if let Some(path) = path {
        println!("# {}", path.display());
    }
    print!("{}", toml::to_string_pretty(config).context("Failed to serialise config")?);
    Ok(())
}
