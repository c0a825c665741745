use ratatui::{
    backend::TestBackend,
    buffer::Buffer,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, List, ListItem, Paragraph, Row, Table, Tabs, Wrap},
    Frame, Terminal,
};

use crate::tui::models::{
    format_percent, format_score, format_time, rank_label, HealthStatus, ModelStat,
    ProviderTestReport, MISSING,
};
use crate::tui::state::{App, Tab};
use crate::tui::util::{sanitize_inline, sanitize_text, truncate_chars};

const BG: Color = Color::Rgb(15, 15, 25);
const BORDER: Color = Color::Rgb(50, 50, 80);

// ── Drawing ───────────────────────────────────────────────────────────────────

pub fn draw(f: &mut Frame, app: &mut App) {
    let area = f.area();

    f.render_widget(Block::default().style(Style::default().bg(BG)), area);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(2),
            Constraint::Length(1),
            Constraint::Min(0),
            Constraint::Length(1),
        ])
        .split(area);

    draw_header(f, chunks[0], app);
    draw_tabs(f, chunks[1], app);

    match app.tab {
        Tab::Chat => draw_chat(f, chunks[2], app),
        Tab::Rating => draw_rating(f, chunks[2], app),
        Tab::Providers => draw_providers(f, chunks[2], app),
    }

    draw_footer(f, chunks[3], app);
}

fn panel(title: &str) -> Block<'_> {
    Block::default()
        .title(title)
        .title_style(Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD))
        .borders(Borders::ALL)
        .border_style(Style::default().fg(BORDER))
}

fn draw_header(f: &mut Frame, area: Rect, app: &App) {
    let cols = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Min(0), Constraint::Length(40)])
        .split(area);

    let title = Paragraph::new(Line::from(vec![
        Span::styled(" ◆ AI Selector", Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD)),
        Span::styled(format!("  v{}", env!("CARGO_PKG_VERSION")), Style::default().fg(Color::DarkGray)),
        Span::styled(format!("  {}", app.api_url), Style::default().fg(Color::DarkGray)),
    ]))
    .block(Block::default().borders(Borders::BOTTOM).border_style(Style::default().fg(BORDER)));
    f.render_widget(title, cols[0]);

    let (dot_color, label) = match &app.health {
        None => (Color::DarkGray, "Checking…".to_string()),
        Some(report) => {
            let color = match report.status {
                HealthStatus::Healthy => Color::Green,
                HealthStatus::Degraded => Color::Yellow,
                HealthStatus::Unreachable => Color::Red,
            };
            let mut label = report.status.indicator().to_string();
            if let Some(version) = &report.version {
                label.push_str(&format!(" · v{}", sanitize_inline(version)));
            }
            (color, label)
        }
    };
    let health = Paragraph::new(Line::from(vec![
        Span::styled("● ", Style::default().fg(dot_color)),
        Span::styled(label, Style::default().fg(Color::White)),
        Span::raw(" "),
    ]))
    .alignment(Alignment::Right)
    .block(Block::default().borders(Borders::BOTTOM).border_style(Style::default().fg(BORDER)));
    f.render_widget(health, cols[1]);
}

fn draw_tabs(f: &mut Frame, area: Rect, app: &App) {
    let titles: Vec<Line> = Tab::all()
        .iter()
        .enumerate()
        .map(|(i, t)| Line::from(format!(" {} [F{}] ", t.title(), i + 1)))
        .collect();
    let tabs = Tabs::new(titles)
        .select(app.tab.index())
        .style(Style::default().fg(Color::DarkGray))
        .highlight_style(Style::default().fg(Color::Black).bg(Color::Cyan).add_modifier(Modifier::BOLD))
        .divider("│");
    f.render_widget(tabs, area);
}

fn draw_footer(f: &mut Frame, area: Rect, app: &App) {
    let hint = match app.tab {
        Tab::Chat => " Enter Send   Shift+Enter/Ctrl+J Newline   PgUp/PgDn Scroll   Ctrl+Y Copy   Tab Next   Esc Quit ",
        Tab::Rating => " r Reload   ↑↓ Select   Tab Next   q/Esc Quit ",
        Tab::Providers => " Enter/t Run test   ↑↓ Select   Tab Next   q/Esc Quit ",
    };
    let line = if app.status.is_empty() {
        Line::from(Span::styled(hint, Style::default().fg(Color::DarkGray)))
    } else {
        Line::from(vec![
            Span::styled(format!(" {} ", app.status), Style::default().fg(Color::Yellow)),
            Span::styled(hint, Style::default().fg(Color::DarkGray)),
        ])
    };
    let footer = Paragraph::new(line)
        .style(Style::default().bg(BG))
        .alignment(Alignment::Center);
    f.render_widget(footer, area);
}

fn loading_line(app: &App, text: &str) -> Paragraph<'static> {
    Paragraph::new(Line::from(vec![
        Span::styled(format!(" {} ", app.spinner_frame()), Style::default().fg(Color::Cyan)),
        Span::styled(text.to_string(), Style::default().fg(Color::Yellow)),
    ]))
}

fn error_panel(message: &str) -> Paragraph<'static> {
    Paragraph::new(Span::styled(
        format!(" {}", sanitize_text(message)),
        Style::default().fg(Color::Red),
    ))
    .block(
        Block::default()
            .title(" Error ")
            .title_style(Style::default().fg(Color::Red).add_modifier(Modifier::BOLD))
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Red)),
    )
    .wrap(Wrap { trim: false })
}

fn hint_panel(title: &str, hint: &str) -> Paragraph<'static> {
    Paragraph::new(vec![
        Line::from(""),
        Line::from(Span::styled(format!("  {hint}"), Style::default().fg(Color::DarkGray))),
    ])
    .block(
        Block::default()
            .title(format!(" {title} "))
            .title_style(Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD))
            .borders(Borders::ALL)
            .border_style(Style::default().fg(BORDER)),
    )
}

// ── Chat ──────────────────────────────────────────────────────────────────────

fn draw_chat(f: &mut Frame, area: Rect, app: &mut App) {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(7), Constraint::Length(1), Constraint::Min(0)])
        .split(area);

    // Prompt editor with a visible cursor cell
    let input_width = rows[0].width.saturating_sub(2) as usize;
    let input_height = rows[0].height.saturating_sub(2);
    let cursor_style = if app.chat.loading {
        Style::default().fg(Color::DarkGray)
    } else {
        Style::default().add_modifier(Modifier::REVERSED)
    };
    let text_style = Style::default().fg(Color::White);

    // Rows are wrapped here, not by the paragraph, so scrolling and the
    // cursor row agree.
    let input = &app.chat.input;
    let cursor_row = input.cursor_row(input_width);
    let lines: Vec<Line> = input
        .visual_rows(input_width)
        .into_iter()
        .enumerate()
        .map(|(i, row)| {
            let text = &input.value[row.clone()];
            if i != cursor_row as usize {
                return Line::from(Span::styled(text.to_string(), text_style));
            }
            let (before, rest) = text.split_at(input.cursor - row.start);
            let mut chars = rest.chars();
            let cell = chars.next().map_or_else(|| " ".to_string(), String::from);
            Line::from(vec![
                Span::styled(before.to_string(), text_style),
                Span::styled(cell, cursor_style),
                Span::styled(chars.as_str().to_string(), text_style),
            ])
        })
        .collect();

    if cursor_row < app.chat.input_scroll {
        app.chat.input_scroll = cursor_row;
    } else if input_height > 0 && cursor_row >= app.chat.input_scroll + input_height {
        app.chat.input_scroll = cursor_row + 1 - input_height;
    }

    let editor_title = format!(" Prompt  ({} chars) ", app.chat.input.char_count());
    let editor_color = if app.chat.loading { BORDER } else { Color::Yellow };
    let editor = Paragraph::new(lines)
        .block(
            Block::default()
                .title(editor_title)
                .title_style(Style::default().fg(editor_color))
                .borders(Borders::ALL)
                .border_style(Style::default().fg(editor_color)),
        )
        .scroll((app.chat.input_scroll, 0));
    f.render_widget(editor, rows[0]);

    if app.chat.loading {
        f.render_widget(loading_line(app, "Selecting the best model…"), rows[1]);
    }

    if let Some(message) = &app.chat.error {
        f.render_widget(error_panel(message), rows[2]);
    } else if let Some(result) = &app.chat.result {
        let field = |label: &str, value: String, color: Color| {
            Line::from(vec![
                Span::styled(format!("  {label:<9}: "), Style::default().fg(Color::DarkGray)),
                Span::styled(value, Style::default().fg(color)),
            ])
        };
        let mut lines = vec![
            field("Model", sanitize_inline(result.model_label()), Color::Cyan),
            field("Provider", sanitize_inline(result.provider_label()), Color::Cyan),
            field("Time", result.time_label(), Color::Green),
            Line::from(""),
        ];
        for line in sanitize_text(result.response_text()).lines() {
            lines.push(Line::from(Span::styled(format!("  {line}"), Style::default().fg(Color::White))));
        }
        let response = Paragraph::new(lines)
            .block(panel(" Response "))
            .wrap(Wrap { trim: false })
            .scroll((app.chat.scroll, 0));
        f.render_widget(response, rows[2]);
    }
}

// ── Rating ────────────────────────────────────────────────────────────────────

pub const STATS_HEADER: [&str; 8] = [
    "#",
    "Model",
    "Provider",
    "Reliability",
    "Success",
    "Avg time",
    "Requests",
    "Active",
];

/// Cell texts for the ranking table. An empty model list yields exactly one
/// "No data" row.
pub fn stats_rows(models: &[ModelStat]) -> Vec<Vec<String>> {
    if models.is_empty() {
        let mut row = vec![String::new(); STATS_HEADER.len()];
        row[1] = "No data".to_string();
        return vec![row];
    }
    models
        .iter()
        .enumerate()
        .map(|(i, m)| {
            let active = match m.is_active {
                Some(true) => "✓",
                Some(false) => "✗",
                None => "—",
            };
            vec![
                rank_label(i + 1),
                sanitize_inline(m.name_label()),
                sanitize_inline(m.provider_label()),
                format_score(m.reliability_score),
                format_percent(m.success_rate),
                format_time(m.average_response_time),
                m.total_requests.map_or_else(|| MISSING.to_string(), |n| n.to_string()),
                active.to_string(),
            ]
        })
        .collect()
}

fn draw_rating(f: &mut Frame, area: Rect, app: &mut App) {
    if app.stats.loading {
        let rows = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(1), Constraint::Min(0)])
            .split(area);
        f.render_widget(loading_line(app, "Loading model statistics…"), rows[0]);
        return;
    }
    if let Some(message) = &app.stats.error {
        f.render_widget(error_panel(message), area);
        return;
    }
    let Some(models) = &app.stats.models else {
        f.render_widget(hint_panel("Model rating", "Press r to load statistics"), area);
        return;
    };

    let header = Row::new(STATS_HEADER.iter().map(|h| Cell::from(*h)))
        .style(Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD));
    let rows: Vec<Row> = stats_rows(models)
        .into_iter()
        .enumerate()
        .map(|(i, cells)| {
            let style = if models.is_empty() {
                Style::default().fg(Color::DarkGray)
            } else if i < 3 {
                Style::default().fg(Color::Yellow)
            } else {
                Style::default().fg(Color::White)
            };
            Row::new(cells.into_iter().map(Cell::from)).style(style)
        })
        .collect();

    let title = match app.stats.total_models {
        Some(total) => format!(" Model rating ({total} models) "),
        None => format!(" Model rating ({} models) ", models.len()),
    };
    let table = Table::new(
        rows,
        [
            Constraint::Length(4),
            Constraint::Percentage(30),
            Constraint::Percentage(18),
            Constraint::Length(12),
            Constraint::Length(9),
            Constraint::Length(9),
            Constraint::Length(9),
            Constraint::Length(7),
        ],
    )
    .header(header)
    .block(panel(&title))
    .row_highlight_style(Style::default().bg(Color::Rgb(40, 40, 70)));
    f.render_stateful_widget(table, area, &mut app.stats.table_state);
}

// ── Providers ─────────────────────────────────────────────────────────────────

/// One line of text per tested provider: latency on success, the (shortened)
/// error otherwise.
pub fn provider_entries(report: &ProviderTestReport) -> Vec<String> {
    report
        .results
        .iter()
        .map(|r| {
            let head = format!(
                "{:<16} {:<28}",
                truncate_chars(&sanitize_inline(r.provider_label()), 16),
                truncate_chars(&sanitize_inline(r.model_label()), 28)
            );
            if r.is_success() {
                format!("✓ {head} {}", format_time(r.response_time))
            } else {
                format!("✗ {head} {}", truncate_chars(&sanitize_inline(r.error_label()), 48))
            }
        })
        .collect()
}

pub fn provider_summary(report: &ProviderTestReport) -> Vec<String> {
    let mut lines = vec![report.summary_line()];
    if let Some(pct) = report.success_percent() {
        lines[0].push_str(&format!("  ({pct:.1}% working)"));
    }
    if let Some(fastest) = report.fastest() {
        lines.push(format!(
            "Fastest: {} ({})",
            sanitize_inline(fastest.provider_label()),
            format_time(fastest.response_time)
        ));
    }
    lines
}

fn draw_providers(f: &mut Frame, area: Rect, app: &mut App) {
    if app.providers.loading {
        let rows = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(1), Constraint::Min(0)])
            .split(area);
        f.render_widget(
            loading_line(app, "Testing all providers, this can take 10-30 seconds…"),
            rows[0],
        );
        return;
    }
    if let Some(message) = &app.providers.error {
        f.render_widget(error_panel(message), area);
        return;
    }
    let Some(report) = &app.providers.report else {
        f.render_widget(
            hint_panel("Providers", "Press Enter or t to test all providers"),
            area,
        );
        return;
    };

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(4), Constraint::Min(3), Constraint::Length(5)])
        .split(area);

    let summary: Vec<Line> = provider_summary(report)
        .into_iter()
        .map(|l| Line::from(Span::styled(format!(" {l}"), Style::default().fg(Color::White))))
        .collect();
    f.render_widget(Paragraph::new(summary).block(panel(" Summary ")), rows[0]);

    let items: Vec<ListItem> = provider_entries(report)
        .into_iter()
        .zip(report.results.iter())
        .map(|(text, r)| {
            let color = if r.is_success() { Color::Green } else { Color::Red };
            ListItem::new(Span::styled(text, Style::default().fg(color)))
        })
        .collect();
    let list = List::new(items)
        .block(panel(" Results "))
        .highlight_style(Style::default().bg(Color::Rgb(40, 40, 70)))
        .highlight_symbol("▶ ");
    f.render_stateful_widget(list, rows[1], &mut app.providers.list_state);

    // Full text of the selected entry
    let detail = match app.selected_provider_result() {
        Some(r) if !r.is_success() => sanitize_text(r.error.as_deref().unwrap_or("Error")),
        Some(r) => format!(
            "{} · {} responded in {}",
            sanitize_inline(r.provider_label()),
            sanitize_inline(r.model_label()),
            format_time(r.response_time)
        ),
        None => String::new(),
    };
    let detail = Paragraph::new(detail)
        .style(Style::default().fg(Color::Gray))
        .block(panel(" Details "))
        .wrap(Wrap { trim: false });
    f.render_widget(detail, rows[2]);
}

// ── Test helpers ──────────────────────────────────────────────────────────────

/// Render the current app state into an in-memory buffer using `TestBackend`.
pub fn render_to_buffer(app: &mut App, width: u16, height: u16) -> Buffer {
    let backend = TestBackend::new(width, height);
    let mut terminal = Terminal::new(backend).expect("TestBackend terminal");
    terminal.draw(|f| draw(f, app)).expect("draw");
    terminal.backend().buffer().clone()
}
