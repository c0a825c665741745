use ratatui::widgets::{ListState, TableState};
use std::time::{Duration, Instant};

use crate::tui::api::validate_prompt;
use crate::tui::input::PromptInput;
use crate::tui::models::{
    sort_by_reliability, HealthReport, ModelStat, ModelStatsResponse, PromptResult,
    ProviderTestReport, ProviderTestResult,
};

// ── Tabs ──────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tab {
    Chat,
    Rating,
    Providers,
}

impl Tab {
    pub fn all() -> [Tab; 3] {
        [Tab::Chat, Tab::Rating, Tab::Providers]
    }

    pub fn title(&self) -> &'static str {
        match self {
            Tab::Chat => "Chat",
            Tab::Rating => "Rating",
            Tab::Providers => "Providers",
        }
    }

    pub fn index(&self) -> usize {
        match self {
            Tab::Chat => 0,
            Tab::Rating => 1,
            Tab::Providers => 2,
        }
    }

    pub fn next(&self) -> Tab {
        Tab::all()[(self.index() + 1) % 3]
    }

    pub fn prev(&self) -> Tab {
        Tab::all()[(self.index() + 2) % 3]
    }
}

// ── Background work ───────────────────────────────────────────────────────────

/// A request the UI wants performed off the UI task.
#[derive(Debug, Clone, PartialEq)]
pub enum Job {
    SubmitPrompt(String),
    LoadStats,
    TestProviders,
    CheckHealth,
}

/// Completion of a [`Job`], delivered back to the UI task. Errors arrive as
/// display-ready messages.
#[derive(Debug, Clone, PartialEq)]
pub enum ApiEvent {
    Prompt(Result<PromptResult, String>),
    Stats(Result<ModelStatsResponse, String>),
    Providers(Result<ProviderTestReport, String>),
    Health(HealthReport),
}

// ── Panels ────────────────────────────────────────────────────────────────────

#[derive(Debug, Default)]
pub struct ChatPanel {
    pub input: PromptInput,
    pub loading: bool,
    pub result: Option<PromptResult>,
    pub error: Option<String>,
    /// Scroll offset of the response panel.
    pub scroll: u16,
    pub input_scroll: u16,
}

#[derive(Debug, Default)]
pub struct StatsPanel {
    pub loading: bool,
    /// `None` until the first successful load; hidden while loading.
    pub models: Option<Vec<ModelStat>>,
    pub total_models: Option<u64>,
    pub error: Option<String>,
    pub table_state: TableState,
}

#[derive(Debug, Default)]
pub struct ProvidersPanel {
    pub loading: bool,
    pub report: Option<ProviderTestReport>,
    pub error: Option<String>,
    pub list_state: ListState,
}

// ── App state ─────────────────────────────────────────────────────────────────

pub struct App {
    pub tab: Tab,
    pub api_url: String,
    /// Latest health check; `None` until the first one completes.
    pub health: Option<HealthReport>,
    pub chat: ChatPanel,
    pub stats: StatsPanel,
    pub providers: ProvidersPanel,
    /// Transient footer message (e.g. clipboard feedback).
    pub status: String,
    pub status_at: Option<Instant>,
    pub spinner: usize,
}

const STATUS_TTL: Duration = Duration::from_secs(3);

pub const SPINNER: &[&str] = &["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"];

impl App {
    pub fn new(api_url: impl Into<String>) -> Self {
        App {
            tab: Tab::Chat,
            api_url: api_url.into(),
            health: None,
            chat: ChatPanel::default(),
            stats: StatsPanel::default(),
            providers: ProvidersPanel::default(),
            status: String::new(),
            status_at: None,
            spinner: 0,
        }
    }

    pub fn is_busy(&self) -> bool {
        self.chat.loading || self.stats.loading || self.providers.loading
    }

    pub fn spinner_frame(&self) -> &'static str {
        SPINNER[self.spinner % SPINNER.len()]
    }

    pub fn set_status(&mut self, message: impl Into<String>) {
        self.status = message.into();
        self.status_at = Some(Instant::now());
    }

    /// Advance the spinner and expire the footer message.
    pub fn tick(&mut self) {
        if self.is_busy() {
            self.spinner = self.spinner.wrapping_add(1);
        }
        if let Some(at) = self.status_at {
            if at.elapsed() >= STATUS_TTL {
                self.status.clear();
                self.status_at = None;
            }
        }
    }

    /// Switch tabs. Entering the rating tab reloads the statistics.
    pub fn select_tab(&mut self, tab: Tab) -> Option<Job> {
        self.tab = tab;
        self.status.clear();
        self.status_at = None;
        if tab == Tab::Rating {
            self.begin_load_stats()
        } else {
            None
        }
    }

    // ── submitPrompt ──────────────────────────────────────────────────────────

    /// Validate the editor contents and mark the chat panel busy.
    ///
    /// Returns `None` (and issues nothing) when a submission is already in
    /// flight or when validation fails; a validation failure is shown in the
    /// chat error panel.
    pub fn begin_submit(&mut self) -> Option<Job> {
        if self.chat.loading {
            return None;
        }
        match validate_prompt(&self.chat.input.value) {
            Err(e) => {
                self.chat.result = None;
                self.chat.error = Some(e.to_string());
                None
            }
            Ok(prompt) => {
                self.chat.loading = true;
                self.chat.result = None;
                self.chat.error = None;
                self.chat.scroll = 0;
                Some(Job::SubmitPrompt(prompt))
            }
        }
    }

    pub fn finish_submit(&mut self, outcome: Result<PromptResult, String>) {
        self.chat.loading = false;
        match outcome {
            Ok(result) => {
                self.chat.result = Some(result);
                self.chat.error = None;
            }
            Err(message) => {
                self.chat.result = None;
                self.chat.error = Some(message);
            }
        }
    }

    // ── loadStats ─────────────────────────────────────────────────────────────

    pub fn begin_load_stats(&mut self) -> Option<Job> {
        if self.stats.loading {
            return None;
        }
        self.stats.loading = true;
        self.stats.models = None;
        self.stats.error = None;
        Some(Job::LoadStats)
    }

    pub fn finish_load_stats(&mut self, outcome: Result<ModelStatsResponse, String>) {
        self.stats.loading = false;
        match outcome {
            Ok(resp) => {
                let mut models = resp.models;
                sort_by_reliability(&mut models);
                self.stats.table_state.select(if models.is_empty() { None } else { Some(0) });
                self.stats.total_models = resp.total_models;
                self.stats.models = Some(models);
                self.stats.error = None;
            }
            Err(message) => {
                self.stats.models = None;
                self.stats.error = Some(message);
            }
        }
    }

    // ── testProviders ─────────────────────────────────────────────────────────

    pub fn begin_test_providers(&mut self) -> Option<Job> {
        if self.providers.loading {
            return None;
        }
        self.providers.loading = true;
        self.providers.report = None;
        self.providers.error = None;
        Some(Job::TestProviders)
    }

    pub fn finish_test_providers(&mut self, outcome: Result<ProviderTestReport, String>) {
        self.providers.loading = false;
        match outcome {
            Ok(report) => {
                let selected = if report.results.is_empty() { None } else { Some(0) };
                self.providers.list_state.select(selected);
                self.providers.report = Some(report);
                self.providers.error = None;
            }
            Err(message) => {
                self.providers.report = None;
                self.providers.error = Some(message);
            }
        }
    }

    pub fn selected_provider_result(&self) -> Option<&ProviderTestResult> {
        let report = self.providers.report.as_ref()?;
        report.results.get(self.providers.list_state.selected()?)
    }

    pub fn select_provider_offset(&mut self, delta: isize) {
        let len = self.providers.report.as_ref().map(|r| r.results.len()).unwrap_or(0);
        let next = offset_selection(self.providers.list_state.selected(), len, delta);
        self.providers.list_state.select(next);
    }

    pub fn select_model_offset(&mut self, delta: isize) {
        let len = self.stats.models.as_ref().map(Vec::len).unwrap_or(0);
        let next = offset_selection(self.stats.table_state.selected(), len, delta);
        self.stats.table_state.select(next);
    }

    // ── checkHealth ───────────────────────────────────────────────────────────

    pub fn apply_health(&mut self, report: HealthReport) {
        self.health = Some(report);
    }

    /// Route a finished job to its panel.
    pub fn apply_event(&mut self, event: ApiEvent) {
        match event {
            ApiEvent::Prompt(outcome) => self.finish_submit(outcome),
            ApiEvent::Stats(outcome) => self.finish_load_stats(outcome),
            ApiEvent::Providers(outcome) => self.finish_test_providers(outcome),
            ApiEvent::Health(report) => self.apply_health(report),
        }
    }
}

fn offset_selection(current: Option<usize>, len: usize, delta: isize) -> Option<usize> {
    if len == 0 {
        return None;
    }
    let current = current.unwrap_or(0) as isize;
    Some((current + delta).clamp(0, len as isize - 1) as usize)
}
