use regex::Regex;
use std::sync::LazyLock;

// ── Sanitise server-supplied text before it reaches the terminal ─────────────

const TAB: &str = "    ";

/// Escape sequences, longest forms first: CSI (7-bit and C1), OSC up to BEL or
/// ST, DCS/SOS/PM/APC strings, nF sequences such as charset designation
/// `ESC ( B`, then two-byte `ESC x`.
static ESCAPE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(concat!(
        r"\x1b\[[\x30-\x3f]*[\x20-\x2f]*[\x40-\x7e]",
        r"|\x{9b}[\x30-\x3f]*[\x20-\x2f]*[\x40-\x7e]",
        r"|\x1b\][^\x07\x1b]*(?:\x07|\x1b\\)?",
        r"|\x1b[P_^X][^\x1b]*(?:\x1b\\)?",
        r"|\x1b[\x20-\x2f]+[\x30-\x7e]",
        r"|\x1b[\x30-\x7e]",
    ))
    .expect("escape regex must compile")
});

/// C0 and C1 control characters except `\t` and `\n`, plus DEL and any ESC
/// left over from a truncated sequence.
static CONTROL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"[\x00-\x08\x0b-\x1f\x7f\x{80}-\x{9f}]").expect("control regex must compile")
});

/// Remove terminal control sequences from untrusted text.
///
/// Escape sequences are dropped entirely, tabs expand to spaces, and any
/// remaining control character other than `\n` is removed, so `\r\n`
/// collapses to `\n`. Printable text, including non-ASCII, passes through
/// unchanged.
pub fn sanitize_text(text: &str) -> String {
    let stripped = ESCAPE_RE.replace_all(text, "");
    let expanded = stripped.replace('\t', TAB);
    CONTROL_RE.replace_all(&expanded, "").into_owned()
}

/// Sanitise a single-line field (names, providers, error text in lists):
/// newlines become spaces and surrounding whitespace is trimmed.
pub fn sanitize_inline(text: &str) -> String {
    sanitize_text(text)
        .split('\n')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Truncate to at most `max` characters, appending `…` when shortened.
pub fn truncate_chars(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        return text.to_string();
    }
    let keep = max.saturating_sub(1);
    let mut out: String = text.chars().take(keep).collect();
    out.push('…');
    out
}
