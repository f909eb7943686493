//! Single-line text input with cursor management.

/// Which characters a buffer accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CharFilter {
    #[default]
    Any,
    /// Digits plus the separators an adjustment entry may contain: `12+4`, `3, 5`, `7.5`.
    Adjustment,
    /// An optionally signed whole number.
    Signed,
}

impl CharFilter {
    fn accepts(self, c: char) -> bool {
        match self {
            Self::Any => !c.is_control(),
            Self::Adjustment => c.is_ascii_digit() || matches!(c, ' ' | '+' | ',' | '.' | '-'),
            Self::Signed => c.is_ascii_digit() || c == '-',
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct InputBuffer {
    content: String,
    cursor: usize,
    filter: CharFilter,
}

impl InputBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_filter(filter: CharFilter) -> Self {
        Self {
            filter,
            ..Self::default()
        }
    }

    /// Returns `false` when the filter rejects the character.
    pub fn insert_char(&mut self, c: char) -> bool {
        if !self.filter.accepts(c) {
            return false;
        }
        self.content.insert(self.cursor, c);
        self.cursor += c.len_utf8();
        true
    }

    pub fn backspace(&mut self) {
        if self.cursor > 0 {
            let prev = self.prev_boundary();
            self.content.drain(prev..self.cursor);
            self.cursor = prev;
        }
    }

    pub fn delete(&mut self) {
        if self.cursor < self.content.len() {
            let next = self.next_boundary();
            self.content.drain(self.cursor..next);
        }
    }

    pub fn move_left(&mut self) {
        self.cursor = self.prev_boundary();
    }

    pub fn move_right(&mut self) {
        self.cursor = self.next_boundary();
    }

    pub fn move_home(&mut self) {
        self.cursor = 0;
    }

    pub fn move_end(&mut self) {
        self.cursor = self.content.len();
    }

    /// Replace the content, placing the cursor at the end. Filtered characters are dropped.
    pub fn set_text(&mut self, text: &str) {
        self.clear();
        for c in text.chars() {
            self.insert_char(c);
        }
    }

    /// Take the content out, resetting the buffer.
    pub fn take(&mut self) -> String {
        self.cursor = 0;
        std::mem::take(&mut self.content)
    }

    pub fn clear(&mut self) {
        self.content.clear();
        self.cursor = 0;
    }

    pub fn is_empty(&self) -> bool {
        self.content.trim().is_empty()
    }

    pub fn text(&self) -> &str {
        &self.content
    }

    /// Cursor column in characters, for placing the terminal cursor.
    pub fn cursor_column(&self) -> usize {
        self.content[..self.cursor].chars().count()
    }

    fn prev_boundary(&self) -> usize {
        self.content[..self.cursor]
            .char_indices()
            .next_back()
            .map(|(i, _)| i)
            .unwrap_or(0)
    }

    fn next_boundary(&self) -> usize {
        self.content[self.cursor..]
            .char_indices()
            .nth(1)
            .map(|(i, _)| self.cursor + i)
            .unwrap_or(self.content.len())
    }
}
