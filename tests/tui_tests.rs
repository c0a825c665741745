use ai_selector_cli::tui::draw::{provider_entries, provider_summary, stats_rows};
use ai_selector_cli::tui::models::{
    HealthBody, HealthReport, HealthStatus, ModelStat, ModelStatsResponse, PromptResult,
    ProviderTestReport, ProviderTestResult,
};
use ai_selector_cli::tui::util::{sanitize_inline, sanitize_text, truncate_chars};
use ai_selector_cli::tui::{handle_key, render_to_buffer, Action, App, Job, PromptInput, Tab};
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::style::Modifier;

// ── helpers ───────────────────────────────────────────────────────────────────

fn app() -> App {
    App::new("http://localhost:8000")
}

fn key(code: KeyCode) -> KeyEvent {
    KeyEvent::new(code, KeyModifiers::NONE)
}

fn ctrl(c: char) -> KeyEvent {
    KeyEvent::new(KeyCode::Char(c), KeyModifiers::CONTROL)
}

fn type_text(app: &mut App, text: &str) {
    for c in text.chars() {
        handle_key(app, key(KeyCode::Char(c)));
    }
}

/// Collect all visible characters from a buffer row into a String.
fn buffer_row(buf: &ratatui::buffer::Buffer, row: u16) -> String {
    let width = buf.area().width;
    (0..width).map(|col| buf[(col, row)].symbol().chars().next().unwrap_or(' ')).collect()
}

/// Collect the entire buffer as a single string (rows joined by newline).
fn buffer_text(buf: &ratatui::buffer::Buffer) -> String {
    let height = buf.area().height;
    (0..height).map(|r| buffer_row(buf, r)).collect::<Vec<_>>().join("\n")
}

fn screen(app: &mut App) -> String {
    buffer_text(&render_to_buffer(app, 110, 32))
}

fn model(name: &str, score: Option<f64>) -> ModelStat {
    ModelStat {
        name: Some(name.to_string()),
        provider: Some("prov".to_string()),
        reliability_score: score,
        success_rate: Some(0.5),
        ..ModelStat::default()
    }
}

fn provider_ok(name: &str, secs: f64) -> ProviderTestResult {
    ProviderTestResult {
        provider: Some(name.to_string()),
        model: Some(format!("{name}-model")),
        status: Some("success".to_string()),
        response_time: Some(secs),
        error: None,
    }
}

fn provider_err(name: &str, error: &str) -> ProviderTestResult {
    ProviderTestResult {
        provider: Some(name.to_string()),
        model: Some(format!("{name}-model")),
        status: Some("error".to_string()),
        response_time: None,
        error: Some(error.to_string()),
    }
}

fn sample_report() -> ProviderTestReport {
    ProviderTestReport {
        successful: 2,
        failed: 1,
        total_providers: 3,
        results: vec![
            provider_ok("Cerebras", 0.87),
            provider_ok("Groq", 1.5),
            provider_err("Broken", "HTTPError: 401 Unauthorized for https://api.example.com"),
        ],
    }
}

// ── App::new ──────────────────────────────────────────────────────────────────

#[test]
fn app_new_starts_on_chat_tab() {
    let app = app();
    assert_eq!(app.tab, Tab::Chat);
    assert!(!app.is_busy());
    assert!(app.health.is_none());
}

#[test]
fn app_new_panels_are_empty() {
    let app = app();
    assert!(app.chat.result.is_none());
    assert!(app.chat.error.is_none());
    assert!(app.stats.models.is_none());
    assert!(app.providers.report.is_none());
}

// ── Tabs ──────────────────────────────────────────────────────────────────────

#[test]
fn tab_next_and_prev_wrap_around() {
    assert_eq!(Tab::Chat.next(), Tab::Rating);
    assert_eq!(Tab::Providers.next(), Tab::Chat);
    assert_eq!(Tab::Chat.prev(), Tab::Providers);
    assert_eq!(Tab::Rating.prev(), Tab::Chat);
}

#[test]
fn entering_rating_tab_loads_stats() {
    let mut app = app();
    assert_eq!(app.select_tab(Tab::Rating), Some(Job::LoadStats));
    assert!(app.stats.loading);
}

#[test]
fn entering_other_tabs_issues_nothing() {
    let mut app = app();
    assert_eq!(app.select_tab(Tab::Providers), None);
    assert_eq!(app.select_tab(Tab::Chat), None);
    assert!(!app.is_busy());
}

#[test]
fn tab_key_moves_to_rating_and_requests_stats() {
    let mut app = app();
    assert_eq!(handle_key(&mut app, key(KeyCode::Tab)), Action::Run(Job::LoadStats));
    assert_eq!(app.tab, Tab::Rating);
}

#[test]
fn function_keys_select_tabs() {
    let mut app = app();
    assert_eq!(handle_key(&mut app, key(KeyCode::F(3))), Action::None);
    assert_eq!(app.tab, Tab::Providers);
    assert_eq!(handle_key(&mut app, key(KeyCode::F(2))), Action::Run(Job::LoadStats));
    assert_eq!(app.tab, Tab::Rating);
}

// ── submitPrompt ──────────────────────────────────────────────────────────────

#[test]
fn empty_prompt_shows_validation_error_without_request() {
    let mut app = app();
    assert_eq!(app.begin_submit(), None);
    assert_eq!(app.chat.error.as_deref(), Some("Enter a prompt"));
    assert!(!app.chat.loading);
}

#[test]
fn whitespace_prompt_is_rejected_on_enter() {
    let mut app = app();
    type_text(&mut app, "   ");
    assert_eq!(handle_key(&mut app, key(KeyCode::Enter)), Action::None);
    assert_eq!(app.chat.error.as_deref(), Some("Enter a prompt"));
    assert!(screen(&mut app).contains("Enter a prompt"));
}

#[test]
fn overlong_prompt_is_rejected_locally() {
    let mut app = app();
    app.chat.input.set(&"x".repeat(10_001));
    assert_eq!(app.begin_submit(), None);
    assert!(app.chat.error.as_deref().unwrap().contains("too long"));
    assert!(!app.chat.loading);
}

#[test]
fn valid_prompt_is_trimmed_and_marks_loading() {
    let mut app = app();
    type_text(&mut app, "  hello  ");
    assert_eq!(
        handle_key(&mut app, key(KeyCode::Enter)),
        Action::Run(Job::SubmitPrompt("hello".to_string()))
    );
    assert!(app.chat.loading);
    assert!(app.chat.error.is_none());
}

#[test]
fn submit_is_single_flight() {
    let mut app = app();
    app.chat.input.set("hello");
    assert!(app.begin_submit().is_some());
    assert_eq!(app.begin_submit(), None);
}

#[test]
fn loading_indicator_is_rendered_while_submitting() {
    let mut app = app();
    app.chat.input.set("hello");
    app.begin_submit();
    assert!(screen(&mut app).contains("Selecting the best model"));
}

#[test]
fn successful_response_renders_model_provider_time_and_text() {
    let mut app = app();
    app.chat.input.set("hello");
    app.begin_submit();
    app.finish_submit(Ok(PromptResult {
        selected_model: Some("gpt-x".to_string()),
        provider: Some("openai".to_string()),
        response_time_seconds: Some(1.23),
        response: Some("hello from the model".to_string()),
    }));
    assert!(!app.chat.loading);
    let text = screen(&mut app);
    assert!(text.contains("Model    : gpt-x"));
    assert!(text.contains("Provider : openai"));
    assert!(text.contains("Time     : 1.23s"));
    assert!(text.contains("hello from the model"));
    assert!(!text.contains("Selecting the best model"));
}

#[test]
fn prompt_result_labels_fall_back() {
    let r = PromptResult::default();
    assert_eq!(r.model_label(), "Unknown");
    assert_eq!(r.provider_label(), "Unknown");
    assert_eq!(r.time_label(), "—");
    assert_eq!(r.response_text(), "No response");
}

#[test]
fn failed_submit_shows_error_and_hides_loader() {
    let mut app = app();
    app.chat.input.set("hello");
    app.begin_submit();
    app.finish_submit(Err("All providers failed".to_string()));
    assert!(!app.chat.loading);
    let text = screen(&mut app);
    assert!(text.contains("All providers failed"));
    assert!(!text.contains("Selecting the best model"));
    // the control is usable again
    assert!(app.begin_submit().is_some());
}

#[test]
fn new_submit_clears_previous_result() {
    let mut app = app();
    app.chat.input.set("hello");
    app.begin_submit();
    app.finish_submit(Ok(PromptResult::default()));
    app.begin_submit();
    assert!(app.chat.result.is_none());
}

#[test]
fn shift_enter_and_ctrl_j_insert_newlines() {
    let mut app = app();
    type_text(&mut app, "a");
    handle_key(&mut app, KeyEvent::new(KeyCode::Enter, KeyModifiers::SHIFT));
    type_text(&mut app, "b");
    handle_key(&mut app, ctrl('j'));
    type_text(&mut app, "c");
    assert_eq!(app.chat.input.value, "a\nb\nc");
    assert!(!app.chat.loading);
}

#[test]
fn q_is_text_in_chat_but_quits_elsewhere() {
    let mut app = app();
    assert_eq!(handle_key(&mut app, key(KeyCode::Char('q'))), Action::None);
    assert_eq!(app.chat.input.value, "q");
    app.select_tab(Tab::Providers);
    assert_eq!(handle_key(&mut app, key(KeyCode::Char('q'))), Action::Quit);
}

#[test]
fn esc_and_ctrl_c_quit() {
    let mut app = app();
    assert_eq!(handle_key(&mut app, key(KeyCode::Esc)), Action::Quit);
    assert_eq!(handle_key(&mut app, ctrl('c')), Action::Quit);
}

#[test]
fn ctrl_y_requests_copy() {
    let mut app = app();
    assert_eq!(handle_key(&mut app, ctrl('y')), Action::CopyResponse);
}

#[test]
fn page_keys_scroll_response() {
    let mut app = app();
    handle_key(&mut app, key(KeyCode::PageDown));
    assert_eq!(app.chat.scroll, 5);
    handle_key(&mut app, key(KeyCode::PageUp));
    handle_key(&mut app, key(KeyCode::PageUp));
    assert_eq!(app.chat.scroll, 0);
}

// ── loadStats ─────────────────────────────────────────────────────────────────

#[test]
fn stats_sort_descending_with_stable_ties() {
    let mut app = app();
    app.begin_load_stats();
    app.finish_load_stats(Ok(ModelStatsResponse {
        models: vec![model("first", Some(0.9)), model("low", Some(0.5)), model("second", Some(0.9))],
        total_models: Some(3),
    }));
    let names: Vec<&str> = app
        .stats
        .models
        .as_ref()
        .unwrap()
        .iter()
        .map(|m| m.name_label())
        .collect();
    assert_eq!(names, ["first", "second", "low"]);
}

#[test]
fn missing_score_ranks_as_zero() {
    let mut app = app();
    app.begin_load_stats();
    app.finish_load_stats(Ok(ModelStatsResponse {
        models: vec![model("none", None), model("neg", Some(-0.1)), model("some", Some(0.1))],
        total_models: None,
    }));
    let names: Vec<&str> = app.stats.models.as_ref().unwrap().iter().map(|m| m.name_label()).collect();
    assert_eq!(names, ["some", "none", "neg"]);
}

#[test]
fn only_top_three_get_rank_markers() {
    let models = vec![
        model("a", Some(0.9)),
        model("b", Some(0.8)),
        model("c", Some(0.7)),
        model("d", Some(0.6)),
    ];
    let rows = stats_rows(&models);
    assert_eq!(rows.len(), 4);
    assert_eq!(rows[0][0], "🥇");
    assert_eq!(rows[1][0], "🥈");
    assert_eq!(rows[2][0], "🥉");
    assert_eq!(rows[3][0], "4");
}

#[test]
fn stats_rows_format_values() {
    let mut m = model("gpt", Some(0.9));
    m.success_rate = Some(0.956);
    m.is_active = Some(true);
    let rows = stats_rows(&[m, ModelStat::default()]);
    assert_eq!(rows[0], ["🥇", "gpt", "prov", "0.90", "95.6%", "—", "—", "✓"]);
    assert_eq!(rows[1], ["🥈", "—", "—", "—", "—", "—", "—", "—"]);
}

#[test]
fn stats_show_average_time_and_request_count() {
    let mut m = model("llama-70b", Some(0.9));
    m.average_response_time = Some(1.37);
    m.total_requests = Some(4242);
    let rows = stats_rows(std::slice::from_ref(&m));
    assert_eq!(rows[0][5], "1.37s");
    assert_eq!(rows[0][6], "4242");

    let mut app = app();
    app.select_tab(Tab::Rating);
    app.finish_load_stats(Ok(ModelStatsResponse { models: vec![m], total_models: Some(1) }));
    let text = screen(&mut app);
    assert!(text.contains("Avg time"));
    assert!(text.contains("Requests"));
    assert!(text.contains("1.37s"));
    assert!(text.contains("4242"));
}

#[test]
fn empty_model_list_renders_single_no_data_row() {
    let rows = stats_rows(&[]);
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0][1], "No data");

    let mut app = app();
    app.select_tab(Tab::Rating);
    app.finish_load_stats(Ok(ModelStatsResponse::default()));
    let text = screen(&mut app);
    assert_eq!(text.matches("No data").count(), 1);
}

#[test]
fn stats_loading_hides_table_and_is_single_flight() {
    let mut app = app();
    app.select_tab(Tab::Rating);
    assert!(app.stats.models.is_none());
    assert_eq!(app.begin_load_stats(), None);
    assert!(screen(&mut app).contains("Loading model statistics"));
}

#[test]
fn stats_error_shows_panel_and_hides_loader() {
    let mut app = app();
    app.select_tab(Tab::Rating);
    app.finish_load_stats(Err("API error 500".to_string()));
    assert!(!app.stats.loading);
    let text = screen(&mut app);
    assert!(text.contains("API error 500"));
    assert!(!text.contains("Loading model statistics"));
}

#[test]
fn r_reloads_stats() {
    let mut app = app();
    app.select_tab(Tab::Rating);
    app.finish_load_stats(Ok(ModelStatsResponse::default()));
    assert_eq!(handle_key(&mut app, key(KeyCode::Char('r'))), Action::Run(Job::LoadStats));
}

#[test]
fn rendered_table_shows_models() {
    let mut app = app();
    app.select_tab(Tab::Rating);
    app.finish_load_stats(Ok(ModelStatsResponse {
        models: vec![model("llama-70b", Some(0.91))],
        total_models: Some(1),
    }));
    let text = screen(&mut app);
    assert!(text.contains("llama-70b"));
    assert!(text.contains("0.91"));
    assert!(text.contains("(1 models)"));
}

// ── testProviders ─────────────────────────────────────────────────────────────

#[test]
fn provider_report_summary_and_entries() {
    let report = sample_report();
    let entries = provider_entries(&report);
    assert_eq!(entries.len(), 3);
    assert!(entries[0].starts_with("✓ Cerebras"));
    assert!(entries[0].ends_with("0.87s"));
    assert!(entries[2].starts_with("✗ Broken"));
    assert!(entries[2].contains("HTTPError: 401"));

    let summary = provider_summary(&report);
    assert!(summary[0].starts_with("✓ 2 / ✗ 1 of 3 providers"));
    assert!(summary[0].contains("66.7% working"));
    assert_eq!(summary[1], "Fastest: Cerebras (0.87s)");
}

#[test]
fn failed_entry_without_error_text_says_error() {
    let mut r = provider_err("X", "");
    r.error = None;
    let report = ProviderTestReport { failed: 1, total_providers: 1, results: vec![r], ..Default::default() };
    assert!(provider_entries(&report)[0].ends_with("Error"));
}

#[test]
fn empty_report_has_no_fastest_or_percentage() {
    let report = ProviderTestReport::default();
    assert_eq!(report.success_percent(), None);
    assert!(report.fastest().is_none());
    assert_eq!(provider_summary(&report), vec!["✓ 0 / ✗ 0 of 0 providers".to_string()]);
}

#[test]
fn test_key_starts_provider_test_once() {
    let mut app = app();
    app.select_tab(Tab::Providers);
    assert_eq!(handle_key(&mut app, key(KeyCode::Char('t'))), Action::Run(Job::TestProviders));
    assert_eq!(handle_key(&mut app, key(KeyCode::Enter)), Action::None);
    assert!(screen(&mut app).contains("Testing all providers"));
}

#[test]
fn provider_results_render_and_selection_shows_full_error() {
    let mut app = app();
    app.select_tab(Tab::Providers);
    app.begin_test_providers();
    app.finish_test_providers(Ok(sample_report()));
    assert_eq!(app.providers.list_state.selected(), Some(0));
    handle_key(&mut app, key(KeyCode::Down));
    handle_key(&mut app, key(KeyCode::Down));
    handle_key(&mut app, key(KeyCode::Down));
    assert_eq!(app.providers.list_state.selected(), Some(2));
    let selected = app.selected_provider_result().unwrap();
    assert_eq!(selected.provider_label(), "Broken");
    let text = screen(&mut app);
    assert!(text.contains("https://api.example.com"));
    assert!(text.contains("Groq"));
}

#[test]
fn provider_error_shows_panel_and_hides_loader() {
    let mut app = app();
    app.select_tab(Tab::Providers);
    app.begin_test_providers();
    app.finish_test_providers(Err("Failed to test providers: boom".to_string()));
    assert!(!app.providers.loading);
    let text = screen(&mut app);
    assert!(text.contains("Failed to test providers: boom"));
    assert!(!text.contains("Testing all providers"));
}

// ── checkHealth ───────────────────────────────────────────────────────────────

#[test]
fn health_body_maps_to_status() {
    let healthy = HealthBody { status: Some("healthy".to_string()), ..Default::default() };
    let down = HealthBody { status: Some("down".to_string()), ..Default::default() };
    assert_eq!(HealthReport::from_body(healthy).status, HealthStatus::Healthy);
    assert_eq!(HealthReport::from_body(down).status, HealthStatus::Degraded);
    assert_eq!(HealthReport::from_body(HealthBody::default()).status, HealthStatus::Degraded);
    assert_eq!(HealthReport::unreachable().status, HealthStatus::Unreachable);
}

#[test]
fn header_shows_health_indicator() {
    let mut app = app();
    assert!(screen(&mut app).contains("Checking…"));

    app.apply_health(HealthReport::from_body(HealthBody {
        status: Some("healthy".to_string()),
        version: Some("1.2.0".to_string()),
        ..Default::default()
    }));
    assert!(screen(&mut app).contains("Online · v1.2.0"));

    app.apply_health(HealthReport::from_body(HealthBody {
        status: Some("unhealthy".to_string()),
        ..Default::default()
    }));
    assert!(screen(&mut app).contains("Degraded"));

    app.apply_health(HealthReport::unreachable());
    assert!(screen(&mut app).contains("Offline"));
}

// ── Sanitising ────────────────────────────────────────────────────────────────

#[test]
fn sanitize_keeps_plain_text() {
    assert_eq!(sanitize_text("héllo wörld"), "héllo wörld");
}

#[test]
fn sanitize_removes_csi_sequences() {
    assert_eq!(sanitize_text("\x1b[31mred\x1b[0m text"), "red text");
    assert_eq!(sanitize_text("\x1b[2J\x1b[Hcleared"), "cleared");
}

#[test]
fn sanitize_removes_osc_sequences() {
    assert_eq!(sanitize_text("\x1b]0;pwned\x07title"), "title");
    assert_eq!(sanitize_text("\x1b]8;;http://x\x1b\\link"), "link");
}

#[test]
fn sanitize_removes_charset_and_two_byte_escapes() {
    assert_eq!(sanitize_text("\x1b(Bhello"), "hello");
    assert_eq!(sanitize_text("\x1b)0box\x1b#8"), "box");
    assert_eq!(sanitize_text("\x1b7saved\x1b8"), "saved");
}

#[test]
fn sanitize_removes_c1_and_string_sequences() {
    assert_eq!(sanitize_text("\u{9b}31mred"), "red");
    assert_eq!(sanitize_text("\x1bPq#0;2\x1b\\after"), "after");
    assert_eq!(sanitize_text("a\u{85}b"), "ab");
}

#[test]
fn sanitize_drops_dangling_escape() {
    assert_eq!(sanitize_text("text\x1b"), "text");
}

#[test]
fn sanitize_drops_control_characters_but_keeps_newlines() {
    assert_eq!(sanitize_text("a\rb\x08c\nd\x00"), "abc\nd");
    assert_eq!(sanitize_text("a\tb"), "a    b");
}

#[test]
fn sanitize_inline_joins_lines() {
    assert_eq!(sanitize_inline("  line one\n\nline two \n"), "line one line two");
}

#[test]
fn truncate_adds_ellipsis() {
    assert_eq!(truncate_chars("abcdef", 4), "abc…");
    assert_eq!(truncate_chars("abc", 4), "abc");
}

#[test]
fn response_escape_sequences_never_reach_the_buffer() {
    let mut app = app();
    app.finish_submit(Ok(PromptResult {
        response: Some("\x1b[2Jsafe\x1b]0;title\x07 text".to_string()),
        ..Default::default()
    }));
    let text = screen(&mut app);
    assert!(text.contains("safe text"));
    assert!(!text.contains('\x1b'));
}

// ── PromptInput ───────────────────────────────────────────────────────────────

#[test]
fn input_insert_and_backspace_handle_multibyte() {
    let mut input = PromptInput::new();
    for c in "añb".chars() {
        input.insert_char(c);
    }
    input.move_left();
    input.backspace();
    assert_eq!(input.value, "ab");
    assert_eq!(input.cursor, 1);
}

#[test]
fn input_vertical_movement_keeps_column() {
    let mut input = PromptInput::new();
    input.set("abcd\nxy\nlonger");
    input.move_up();
    assert_eq!(input.cursor, "abcd\n".len() + 2);
    input.move_up();
    assert_eq!(input.cursor, 2);
    input.move_down();
    input.move_down();
    assert_eq!(input.cursor, "abcd\nxy\n".len() + 2);
    input.move_down();
    assert_eq!(input.cursor, input.value.len());
}

#[test]
fn input_delete_word() {
    let mut input = PromptInput::new();
    input.set("hello big world  ");
    input.delete_word();
    assert_eq!(input.value, "hello big ");
    input.delete_word();
    input.delete_word();
    assert_eq!(input.value, "");
}

#[test]
fn input_delete_word_crosses_newlines_and_tabs() {
    let mut input = PromptInput::new();
    input.set("abc\n");
    input.delete_word();
    assert_eq!(input.value, "");

    input.set("one two\t");
    input.delete_word();
    assert_eq!(input.value, "one ");
    assert_eq!(input.cursor, 4);
}

#[test]
fn input_visual_rows_hard_wrap_each_line() {
    let mut input = PromptInput::new();
    input.set("abcdef\n\nxy");
    assert_eq!(input.visual_rows(3), vec![0..3, 3..6, 7..7, 8..10]);
    assert_eq!(input.cursor_row(3), 3);
}

#[test]
fn input_full_row_at_cursor_gets_an_empty_row() {
    let mut input = PromptInput::new();
    input.set("abc");
    assert_eq!(input.visual_rows(3), vec![0..3, 3..3]);
    assert_eq!(input.cursor_row(3), 1);
    input.move_left();
    assert_eq!(input.visual_rows(3), vec![0..3]);
    assert_eq!(input.cursor_row(3), 0);
}

#[test]
fn input_cursor_row_accounts_for_wrap() {
    let mut input = PromptInput::new();
    input.set("abcdefgh\nij");
    assert_eq!(input.cursor_row(4), 2);
    input.set("abcdefghij");
    assert_eq!(input.cursor_row(4), 2);
    input.move_line_start();
    assert_eq!(input.cursor_row(4), 0);
}

#[test]
fn editor_scrolls_to_keep_cursor_visible() {
    let words: Vec<String> = ('a'..='l').map(|c| c.to_string().repeat(10)).collect();
    let mut app = app();
    app.chat.input.set(&words.join(" "));

    // 20 columns inside the border, 5 rows of editor
    let buf = render_to_buffer(&mut app, 22, 20);
    assert_eq!(app.chat.input_scroll, 2);
    let text = buffer_text(&buf);
    assert!(text.contains("llllllllll"));
    assert!(!text.contains("aaaaaaaaaa"));
    assert!(buf.content().iter().any(|c| c.modifier.contains(Modifier::REVERSED)));
}

#[test]
fn footer_shows_status_message() {
    let mut app = app();
    app.select_tab(Tab::Providers);
    app.set_status("Nothing to copy");
    assert!(screen(&mut app).contains("Nothing to copy"));
}
