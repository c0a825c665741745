use anyhow::Result;
use arboard::Clipboard;
use crossterm::{
    event::{
        Event, EventStream, KeyCode, KeyEvent, KeyEventKind, KeyModifiers,
        KeyboardEnhancementFlags, PopKeyboardEnhancementFlags, PushKeyboardEnhancementFlags,
    },
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use futures_util::StreamExt;
use ratatui::{backend::CrosstermBackend, Terminal};
use std::{io, time::Duration, time::Instant};
use tokio::sync::mpsc;
use tokio::time::MissedTickBehavior;
use tracing::{info, warn};

use crate::config::Config;
use crate::logging::redact_secrets;
use crate::tui::api::ApiClient;
use crate::tui::draw::draw;
use crate::tui::input::handle_prompt_key;
use crate::tui::state::{ApiEvent, App, Job, Tab};

// ── Entry point ───────────────────────────────────────────────────────────────

pub async fn run(config: Config) -> Result<()> {
    let client = ApiClient::new(&config.api_url, config.timeout())?;
    info!(api_url = client.base_url(), "starting interactive session");

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    // Kitty keyboard protocol lets supporting terminals report Shift+Enter.
    let kitty_supported = execute!(
        stdout,
        PushKeyboardEnhancementFlags(KeyboardEnhancementFlags::DISAMBIGUATE_ESCAPE_CODES)
    )
    .is_ok();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let mut app = App::new(client.base_url());
    let result = event_loop(&mut terminal, &mut app, &client, config.health_interval()).await;

    disable_raw_mode()?;
    if kitty_supported {
        let _ = execute!(terminal.backend_mut(), PopKeyboardEnhancementFlags);
    }
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;
    info!("interactive session ended");
    result
}

// ── Event loop ────────────────────────────────────────────────────────────────

async fn event_loop(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
    client: &ApiClient,
    health_every: Duration,
) -> Result<()> {
    let mut event_stream = EventStream::new();
    let mut tick = tokio::time::interval(Duration::from_millis(100));
    // First tick fires immediately: the startup health check.
    let mut health_tick = tokio::time::interval(health_every);
    health_tick.set_missed_tick_behavior(MissedTickBehavior::Delay);
    let (tx, mut rx) = mpsc::unbounded_channel::<ApiEvent>();

    loop {
        terminal.draw(|f| draw(f, app))?;

        tokio::select! {
            _ = tick.tick() => app.tick(),

            _ = health_tick.tick() => spawn_job(Job::CheckHealth, client, tx.clone()),

            Some(event) = rx.recv() => app.apply_event(event),

            Some(Ok(event)) = event_stream.next() => {
                let Event::Key(key) = event else { continue };
                if key.kind == KeyEventKind::Release {
                    continue;
                }
                match handle_key(app, key) {
                    Action::Quit => return Ok(()),
                    Action::Run(job) => spawn_job(job, client, tx.clone()),
                    Action::CopyResponse => copy_response(app),
                    Action::None => {}
                }
            }
        }
    }
}

// ── Jobs ──────────────────────────────────────────────────────────────────────

/// Run `job` on its own task and post the outcome back to the UI.
pub fn spawn_job(job: Job, client: &ApiClient, tx: mpsc::UnboundedSender<ApiEvent>) {
    let client = client.clone();
    tokio::spawn(async move {
        let event = run_job(&client, job).await;
        let _ = tx.send(event);
    });
}

pub async fn run_job(client: &ApiClient, job: Job) -> ApiEvent {
    let started = Instant::now();
    match job {
        Job::SubmitPrompt(prompt) => {
            info!(chars = prompt.chars().count(), "submitting prompt");
            let outcome = client.process_prompt(&prompt).await;
            match &outcome {
                Ok(r) => info!(
                    model = r.model_label(),
                    provider = r.provider_label(),
                    elapsed_ms = started.elapsed().as_millis() as u64,
                    "prompt processed"
                ),
                Err(e) => warn!(error = %redact_secrets(&e.to_string()), "prompt failed"),
            }
            ApiEvent::Prompt(outcome.map_err(|e| e.to_string()))
        }
        Job::LoadStats => {
            let outcome = client.model_stats().await;
            match &outcome {
                Ok(s) => info!(models = s.models.len(), "model statistics loaded"),
                Err(e) => warn!(error = %redact_secrets(&e.to_string()), "statistics failed"),
            }
            ApiEvent::Stats(outcome.map_err(|e| e.to_string()))
        }
        Job::TestProviders => {
            info!("testing providers");
            let outcome = client.test_providers().await;
            match &outcome {
                Ok(r) => info!(
                    successful = r.successful,
                    total = r.total_providers,
                    elapsed_ms = started.elapsed().as_millis() as u64,
                    "provider test finished"
                ),
                Err(e) => warn!(error = %redact_secrets(&e.to_string()), "provider test failed"),
            }
            ApiEvent::Providers(outcome.map_err(|e| e.to_string()))
        }
        Job::CheckHealth => {
            let report = client.health().await;
            info!(status = report.status.indicator(), "health check");
            ApiEvent::Health(report)
        }
    }
}

// ── Key handling ──────────────────────────────────────────────────────────────

/// What the event loop should do after a key press.
#[derive(Debug, PartialEq)]
pub enum Action {
    None,
    Quit,
    Run(Job),
    CopyResponse,
}

impl From<Option<Job>> for Action {
    fn from(job: Option<Job>) -> Self {
        job.map(Action::Run).unwrap_or(Action::None)
    }
}

pub fn handle_key(app: &mut App, key: KeyEvent) -> Action {
    let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
    match key.code {
        KeyCode::Char('c') if ctrl => return Action::Quit,
        KeyCode::Esc => return Action::Quit,
        KeyCode::Tab => return app.select_tab(app.tab.next()).into(),
        KeyCode::BackTab => return app.select_tab(app.tab.prev()).into(),
        KeyCode::F(n @ 1..=3) => return app.select_tab(Tab::all()[n as usize - 1]).into(),
        _ => {}
    }

    match app.tab {
        Tab::Chat => handle_chat_key(app, key),
        Tab::Rating => match key.code {
            KeyCode::Char('q') => Action::Quit,
            KeyCode::Char('r') | KeyCode::F(5) => app.begin_load_stats().into(),
            KeyCode::Up | KeyCode::Char('k') => {
                app.select_model_offset(-1);
                Action::None
            }
            KeyCode::Down | KeyCode::Char('j') => {
                app.select_model_offset(1);
                Action::None
            }
            _ => Action::None,
        },
        Tab::Providers => match key.code {
            KeyCode::Char('q') => Action::Quit,
            KeyCode::Enter | KeyCode::Char('t') => app.begin_test_providers().into(),
            KeyCode::Up | KeyCode::Char('k') => {
                app.select_provider_offset(-1);
                Action::None
            }
            KeyCode::Down | KeyCode::Char('j') => {
                app.select_provider_offset(1);
                Action::None
            }
            _ => Action::None,
        },
    }
}

fn handle_chat_key(app: &mut App, key: KeyEvent) -> Action {
    let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
    match key.code {
        // Shift+Enter needs the kitty protocol; Ctrl+J works everywhere.
        KeyCode::Enter if key.modifiers.contains(KeyModifiers::SHIFT) => {
            app.chat.input.insert_newline();
            Action::None
        }
        KeyCode::Char('j') if ctrl => {
            app.chat.input.insert_newline();
            Action::None
        }
        KeyCode::Enter => app.begin_submit().into(),
        KeyCode::Char('y') if ctrl => Action::CopyResponse,
        KeyCode::PageUp => {
            app.chat.scroll = app.chat.scroll.saturating_sub(5);
            Action::None
        }
        KeyCode::PageDown => {
            app.chat.scroll = app.chat.scroll.saturating_add(5);
            Action::None
        }
        _ => {
            handle_prompt_key(&mut app.chat.input, key);
            Action::None
        }
    }
}

fn copy_response(app: &mut App) {
    let Some(text) = app.chat.result.as_ref().and_then(|r| r.response.clone()) else {
        app.set_status("Nothing to copy");
        return;
    };
    match Clipboard::new().and_then(|mut cb| cb.set_text(text)) {
        Ok(()) => app.set_status("📋 Response copied to clipboard"),
        Err(e) => {
            warn!(error = %e, "clipboard unavailable");
            app.set_status(format!("Clipboard unavailable: {e}"));
        }
    }
}
