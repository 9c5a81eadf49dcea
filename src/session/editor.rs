/// Snapshot of the input line; `cursor` is a character index into `text`
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EditorBuffer {
    pub text: String,
    pub cursor: usize,
}

impl EditorBuffer {
    /// Text left of the cursor, the character under it, and the rest
    pub fn split_at_cursor(&self) -> (&str, Option<char>, &str) {
        let byte = self
            .text
            .char_indices()
            .nth(self.cursor)
            .map(|(i, _)| i)
            .unwrap_or(self.text.len());
        let (before, rest) = self.text.split_at(byte);
        let mut chars = rest.chars();
        let under = chars.next();
        (before, under, chars.as_str())
    }
}

/// Single-line input buffer with a cursor
#[derive(Debug, Clone, Default)]
pub struct LineEditor {
    chars: Vec<char>,
    cursor: usize,
}

impl LineEditor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Splice `text` in at the cursor and move past it
    pub fn insert(&mut self, text: &str) {
        let inserted: Vec<char> = text.chars().collect();
        let count = inserted.len();
        self.chars.splice(self.cursor..self.cursor, inserted);
        self.cursor += count;
    }

    pub fn insert_char(&mut self, ch: char) {
        self.chars.insert(self.cursor, ch);
        self.cursor += 1;
    }

    /// Backspace
    pub fn delete_backward(&mut self) {
        if self.cursor > 0 {
            self.cursor -= 1;
            self.chars.remove(self.cursor);
        }
    }

    /// Delete key
    pub fn delete_forward(&mut self) {
        if self.cursor < self.chars.len() {
            self.chars.remove(self.cursor);
        }
    }

    /// Move by `delta` characters, clamped to the buffer
    pub fn move_cursor(&mut self, delta: isize) {
        let target = self.cursor as isize + delta;
        self.cursor = target.clamp(0, self.chars.len() as isize) as usize;
    }

    pub fn move_home(&mut self) {
        self.cursor = 0;
    }

    pub fn move_end(&mut self) {
        self.cursor = self.chars.len();
    }

    pub fn reset(&mut self) {
        self.chars.clear();
        self.cursor = 0;
    }

    /// Return the current text and clear the buffer
    pub fn take(&mut self) -> String {
        let text = self.text();
        self.reset();
        text
    }

    pub fn text(&self) -> String {
        self.chars.iter().collect()
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn len(&self) -> usize {
        self.chars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chars.is_empty()
    }

    pub fn is_blank(&self) -> bool {
        self.chars.iter().all(|c| c.is_whitespace())
    }

    pub fn snapshot(&self) -> EditorBuffer {
        EditorBuffer {
            text: self.text(),
            cursor: self.cursor,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insert_advances_cursor() {
        let mut editor = LineEditor::new();
        editor.insert("helo");
        editor.move_cursor(-1);
        editor.insert("l");
        assert_eq!(editor.snapshot(), EditorBuffer { text: "hello".to_string(), cursor: 4 });
    }

    #[test]
    fn test_delete_backward_at_start_is_noop() {
        let mut editor = LineEditor::new();
        editor.insert("ab");
        editor.move_home();
        editor.delete_backward();
        assert_eq!(editor.text(), "ab");
        assert_eq!(editor.cursor(), 0);

        editor.move_end();
        editor.delete_backward();
        assert_eq!(editor.text(), "a");
        assert_eq!(editor.cursor(), 1);
    }

    #[test]
    fn test_delete_forward() {
        let mut editor = LineEditor::new();
        editor.insert("abc");
        editor.move_home();
        editor.delete_forward();
        assert_eq!(editor.text(), "bc");
        editor.move_end();
        editor.delete_forward();
        assert_eq!(editor.text(), "bc");
    }

    #[test]
    fn test_move_cursor_clamps() {
        let mut editor = LineEditor::new();
        editor.insert("abc");
        editor.move_cursor(100);
        assert_eq!(editor.cursor(), 3);
        editor.move_cursor(-100);
        assert_eq!(editor.cursor(), 0);
        editor.move_cursor(isize::MIN);
        assert_eq!(editor.cursor(), 0);
    }

    #[test]
    fn test_multibyte_characters() {
        let mut editor = LineEditor::new();
        editor.insert("héllo 👋");
        assert_eq!(editor.cursor(), 7);
        editor.delete_backward();
        assert_eq!(editor.text(), "héllo ");
        editor.move_cursor(-5);
        editor.delete_backward();
        assert_eq!(editor.text(), "éllo ");
    }

    #[test]
    fn test_take_resets() {
        let mut editor = LineEditor::new();
        editor.insert("/model gemma2");
        assert_eq!(editor.take(), "/model gemma2");
        assert!(editor.is_empty());
        assert_eq!(editor.cursor(), 0);
    }

    #[test]
    fn test_cursor_stays_in_bounds_for_any_sequence() {
        // Deterministic pseudo-random walk over the edit operations
        let mut editor = LineEditor::new();
        let mut seed: u64 = 0x2545_f491_4f6c_dd1d;
        for _ in 0..5_000 {
            seed ^= seed << 13;
            seed ^= seed >> 7;
            seed ^= seed << 17;
            match seed % 6 {
                0 => editor.insert("xy"),
                1 => editor.insert_char('é'),
                2 => editor.delete_backward(),
                3 => editor.delete_forward(),
                4 => editor.move_cursor((seed % 11) as isize - 5),
                _ => editor.move_cursor(-((seed % 3) as isize)),
            }
            assert!(editor.cursor() <= editor.len());
        }
    }

    #[test]
    fn test_split_at_cursor() {
        let buffer = EditorBuffer { text: "héllo".to_string(), cursor: 1 };
        assert_eq!(buffer.split_at_cursor(), ("h", Some('é'), "llo"));

        let buffer = EditorBuffer { text: "hi".to_string(), cursor: 2 };
        assert_eq!(buffer.split_at_cursor(), ("hi", None, ""));
    }
}
