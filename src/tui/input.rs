use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use std::ops::Range;

// ── Prompt editor ─────────────────────────────────────────────────────────────

/// Multi-line text buffer with a byte-offset cursor.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct PromptInput {
    pub value: String,
    pub cursor: usize,
}

impl PromptInput {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn char_count(&self) -> usize {
        self.value.chars().count()
    }

    pub fn clear(&mut self) {
        self.value.clear();
        self.cursor = 0;
    }

    pub fn set(&mut self, text: &str) {
        self.value = text.to_string();
        self.cursor = self.value.len();
    }

    pub fn insert_char(&mut self, c: char) {
        self.value.insert(self.cursor, c);
        self.cursor += c.len_utf8();
    }

    pub fn insert_newline(&mut self) {
        self.insert_char('\n');
    }

    pub fn backspace(&mut self) {
        if let Some(prev) = self.prev_boundary() {
            self.value.remove(prev);
            self.cursor = prev;
        }
    }

    pub fn delete(&mut self) {
        if self.cursor < self.value.len() {
            self.value.remove(self.cursor);
        }
    }

    /// Delete the word before the cursor (Ctrl+W).
    pub fn delete_word(&mut self) {
        let before = &self.value[..self.cursor];
        let trimmed = before.trim_end();
        let start = trimmed
            .rfind(|c: char| c.is_whitespace())
            .map(|i| i + trimmed[i..].chars().next().map(char::len_utf8).unwrap_or(1))
            .unwrap_or(0);
        self.value.replace_range(start..self.cursor, "");
        self.cursor = start;
    }

    pub fn move_left(&mut self) {
        if let Some(prev) = self.prev_boundary() {
            self.cursor = prev;
        }
    }

    pub fn move_right(&mut self) {
        if let Some(ch) = self.value[self.cursor..].chars().next() {
            self.cursor += ch.len_utf8();
        }
    }

    /// Start of the current logical line.
    pub fn move_line_start(&mut self) {
        self.cursor = self.line_start();
    }

    /// End of the current logical line.
    pub fn move_line_end(&mut self) {
        self.cursor = self.value[self.cursor..]
            .find('\n')
            .map(|i| self.cursor + i)
            .unwrap_or(self.value.len());
    }

    pub fn move_up(&mut self) {
        let start = self.line_start();
        if start == 0 {
            self.cursor = 0;
            return;
        }
        let col = self.value[start..self.cursor].chars().count();
        let prev_end = start - 1;
        let prev_start = self.value[..prev_end].rfind('\n').map(|i| i + 1).unwrap_or(0);
        self.cursor = Self::offset_at_col(&self.value, prev_start, prev_end, col);
    }

    pub fn move_down(&mut self) {
        let Some(nl) = self.value[self.cursor..].find('\n') else {
            self.cursor = self.value.len();
            return;
        };
        let col = self.value[self.line_start()..self.cursor].chars().count();
        let next_start = self.cursor + nl + 1;
        let next_end = self.value[next_start..]
            .find('\n')
            .map(|i| next_start + i)
            .unwrap_or(self.value.len());
        self.cursor = Self::offset_at_col(&self.value, next_start, next_end, col);
    }

    /// Byte ranges of the rows the text occupies when hard-wrapped at `width`
    /// columns. Newlines are not part of any row. A full row ending at the
    /// cursor is followed by an empty row holding the cursor cell.
    pub fn visual_rows(&self, width: usize) -> Vec<Range<usize>> {
        let width = width.max(1);
        let mut rows = Vec::new();
        let mut line_start = 0;
        for line in self.value.split('\n') {
            let line_end = line_start + line.len();
            let mut row_start = line_start;
            let mut count = 0;
            for (i, _) in line.char_indices() {
                if count == width {
                    rows.push(row_start..line_start + i);
                    row_start = line_start + i;
                    count = 0;
                }
                count += 1;
            }
            rows.push(row_start..line_end);
            if count == width && self.cursor == line_end {
                rows.push(line_end..line_end);
            }
            line_start = line_end + 1;
        }
        rows
    }

    /// Index into [`visual_rows`](Self::visual_rows) of the row holding the cursor.
    pub fn cursor_row(&self, width: usize) -> u16 {
        self.visual_rows(width)
            .iter()
            .rposition(|r| r.start <= self.cursor && self.cursor <= r.end)
            .unwrap_or(0) as u16
    }

    fn prev_boundary(&self) -> Option<usize> {
        self.value[..self.cursor].char_indices().next_back().map(|(i, _)| i)
    }

    fn line_start(&self) -> usize {
        self.value[..self.cursor].rfind('\n').map(|i| i + 1).unwrap_or(0)
    }

    fn offset_at_col(value: &str, start: usize, end: usize, col: usize) -> usize {
        value[start..end]
            .char_indices()
            .nth(col)
            .map(|(i, _)| start + i)
            .unwrap_or(end)
    }
}

// ── Key handling ──────────────────────────────────────────────────────────────

/// Apply an editing key. Returns `false` when the key is not an editing key.
pub fn handle_prompt_key(input: &mut PromptInput, key: KeyEvent) -> bool {
    let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
    match key.code {
        KeyCode::Char('w') if ctrl => input.delete_word(),
        KeyCode::Char('u') if ctrl => input.clear(),
        KeyCode::Char('a') if ctrl => input.move_line_start(),
        KeyCode::Char('e') if ctrl => input.move_line_end(),
        KeyCode::Char(_) if ctrl => return false,
        KeyCode::Char(c) => input.insert_char(c),
        KeyCode::Backspace => input.backspace(),
        KeyCode::Delete => input.delete(),
        KeyCode::Left => input.move_left(),
        KeyCode::Right => input.move_right(),
        KeyCode::Home => input.move_line_start(),
        KeyCode::End => input.move_line_end(),
        KeyCode::Up => input.move_up(),
        KeyCode::Down => input.move_down(),
        _ => return false,
    }
    true
}
