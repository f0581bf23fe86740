//! The reusable input line behind prompt sessions.
//!
//! One of these exists per semantic domain ("filename", "search", …) and is
//! reactivated for every question in that domain, which is what keeps
//! per-domain history alive across sessions. Editing is the familiar
//! emacs-lite set; accept/cancel/cycle keystrokes are not consumed as edits,
//! they are reported so the session loop can act on them.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use unicode_width::UnicodeWidthStr;

/// What one keystroke did to the line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineOutcome {
    /// The text changed; shown completion candidates are stale now.
    Edited,
    /// Only the cursor moved.
    Moved,
    /// The cycle-completions key (Tab).
    Cycle,
    /// Accept the current text (Enter).
    Accept,
    /// Cancel the session (Esc).
    Cancel,
    /// Not a key this line responds to.
    Ignored,
}

#[derive(Debug, Default)]
pub(crate) struct InputLine {
    text: String,
    /// Cursor as a char offset into `text`.
    cursor: usize,
    history: Vec<String>,
    history_pos: Option<usize>,
    /// In-progress text stashed while navigating history.
    stash: Option<String>,
    active: bool,
}

impl InputLine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    /// Display column of the cursor within the text.
    pub fn cursor_col(&self) -> u16 {
        self.text[..self.byte_at(self.cursor)].width() as u16
    }

    /// Begin a session: seed the text (or keep the previous one when no
    /// default is given) and put the cursor at the end.
    pub fn activate(&mut self, default: Option<&str>) {
        if let Some(default) = default {
            self.text = default.to_string();
        }
        self.cursor = self.text.chars().count();
        self.history_pos = None;
        self.stash = None;
        self.active = true;
    }

    /// End a session. Accepted non-empty answers go to the history.
    pub fn deactivate(&mut self, accepted: bool) {
        if accepted && !self.text.is_empty() && self.history.last() != Some(&self.text) {
            self.history.push(self.text.clone());
        }
        self.active = false;
    }

    pub fn handle_key(&mut self, key: &KeyEvent) -> LineOutcome {
        if !self.active {
            return LineOutcome::Ignored;
        }
        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
        let alt = key.modifiers.contains(KeyModifiers::ALT);

        match key.code {
            KeyCode::Enter => LineOutcome::Accept,
            KeyCode::Esc => LineOutcome::Cancel,
            KeyCode::Tab => LineOutcome::Cycle,

            KeyCode::Char(c) if !ctrl && !alt => {
                self.insert_char(c);
                LineOutcome::Edited
            }
            KeyCode::Char('a') if ctrl => {
                self.cursor = 0;
                LineOutcome::Moved
            }
            KeyCode::Char('e') if ctrl => {
                self.cursor = self.char_len();
                LineOutcome::Moved
            }
            KeyCode::Char('k') if ctrl => {
                if self.cursor == self.char_len() {
                    LineOutcome::Ignored
                } else {
                    let at = self.byte_at(self.cursor);
                    self.text.truncate(at);
                    LineOutcome::Edited
                }
            }
            KeyCode::Backspace if ctrl || alt => {
                if self.delete_word_backward() {
                    LineOutcome::Edited
                } else {
                    LineOutcome::Ignored
                }
            }
            KeyCode::Backspace => {
                if self.cursor == 0 {
                    LineOutcome::Ignored
                } else {
                    self.cursor -= 1;
                    self.remove_char(self.cursor);
                    LineOutcome::Edited
                }
            }
            KeyCode::Delete => {
                if self.cursor == self.char_len() {
                    LineOutcome::Ignored
                } else {
                    self.remove_char(self.cursor);
                    LineOutcome::Edited
                }
            }
            KeyCode::Left => {
                self.cursor = self.cursor.saturating_sub(1);
                LineOutcome::Moved
            }
            KeyCode::Right => {
                self.cursor = (self.cursor + 1).min(self.char_len());
                LineOutcome::Moved
            }
            KeyCode::Home => {
                self.cursor = 0;
                LineOutcome::Moved
            }
            KeyCode::End => {
                self.cursor = self.char_len();
                LineOutcome::Moved
            }
            KeyCode::Up => {
                if self.history_prev() {
                    LineOutcome::Edited
                } else {
                    LineOutcome::Ignored
                }
            }
            KeyCode::Down => {
                if self.history_next() {
                    LineOutcome::Edited
                } else {
                    LineOutcome::Ignored
                }
            }
            _ => LineOutcome::Ignored,
        }
    }

    /// Replace the whole text, cursor to the end. Used by completion fills.
    pub fn set_text(&mut self, text: &str) {
        self.text = text.to_string();
        self.cursor = self.char_len();
    }

    fn char_len(&self) -> usize {
        self.text.chars().count()
    }

    fn byte_at(&self, char_offset: usize) -> usize {
        self.text
            .char_indices()
            .nth(char_offset)
            .map_or(self.text.len(), |(idx, _)| idx)
    }

    fn insert_char(&mut self, c: char) {
        let at = self.byte_at(self.cursor);
        self.text.insert(at, c);
        self.cursor += 1;
    }

    fn remove_char(&mut self, char_offset: usize) {
        let at = self.byte_at(char_offset);
        self.text.remove(at);
    }

    fn delete_word_backward(&mut self) -> bool {
        if self.cursor == 0 {
            return false;
        }
        let chars: Vec<char> = self.text.chars().collect();
        let mut new_cursor = self.cursor;
        while new_cursor > 0 && chars[new_cursor - 1].is_whitespace() {
            new_cursor -= 1;
        }
        while new_cursor > 0 && !chars[new_cursor - 1].is_whitespace() {
            new_cursor -= 1;
        }
        let start = self.byte_at(new_cursor);
        let end = self.byte_at(self.cursor);
        self.text.replace_range(start..end, "");
        self.cursor = new_cursor;
        true
    }

    fn history_prev(&mut self) -> bool {
        let pos = match self.history_pos {
            Some(0) => return false,
            Some(pos) => pos - 1,
            None if self.history.is_empty() => return false,
            None => {
                self.stash = Some(self.text.clone());
                self.history.len() - 1
            }
        };
        self.history_pos = Some(pos);
        let entry = self.history[pos].clone();
        self.set_text(&entry);
        true
    }

    fn history_next(&mut self) -> bool {
        let Some(pos) = self.history_pos else {
            return false;
        };
        if pos + 1 < self.history.len() {
            self.history_pos = Some(pos + 1);
            let entry = self.history[pos + 1].clone();
            self.set_text(&entry);
        } else {
            self.history_pos = None;
            let restored = self.stash.take().unwrap_or_default();
            self.set_text(&restored);
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn ctrl(c: char) -> KeyEvent {
        KeyEvent::new(KeyCode::Char(c), KeyModifiers::CONTROL)
    }

    fn type_text(line: &mut InputLine, text: &str) {
        for c in text.chars() {
            assert_eq!(line.handle_key(&key(KeyCode::Char(c))), LineOutcome::Edited);
        }
    }

    #[test]
    fn character_input_and_backspace() {
        let mut line = InputLine::new();
        line.activate(None);
        type_text(&mut line, "hi");
        assert_eq!(line.text(), "hi");
        assert_eq!(line.handle_key(&key(KeyCode::Backspace)), LineOutcome::Edited);
        assert_eq!(line.text(), "h");
    }

    #[test]
    fn backspace_at_start_is_ignored() {
        let mut line = InputLine::new();
        line.activate(None);
        assert_eq!(line.handle_key(&key(KeyCode::Backspace)), LineOutcome::Ignored);
    }

    #[test]
    fn cursor_movement_and_mid_insert() {
        let mut line = InputLine::new();
        line.activate(Some("bc"));
        assert_eq!(line.handle_key(&key(KeyCode::Home)), LineOutcome::Moved);
        type_text(&mut line, "a");
        assert_eq!(line.text(), "abc");
        assert_eq!(line.handle_key(&key(KeyCode::End)), LineOutcome::Moved);
        type_text(&mut line, "d");
        assert_eq!(line.text(), "abcd");
    }

    #[test]
    fn emacs_bindings() {
        let mut line = InputLine::new();
        line.activate(Some("hello world"));
        assert_eq!(line.handle_key(&ctrl('a')), LineOutcome::Moved);
        assert_eq!(line.cursor_col(), 0);
        assert_eq!(line.handle_key(&ctrl('e')), LineOutcome::Moved);
        assert_eq!(line.cursor_col(), 11);
        // Kill to end from after "hello".
        for _ in 0..6 {
            line.handle_key(&key(KeyCode::Left));
        }
        assert_eq!(line.handle_key(&ctrl('k')), LineOutcome::Edited);
        assert_eq!(line.text(), "hello");
    }

    #[test]
    fn word_delete_backward() {
        let mut line = InputLine::new();
        line.activate(Some("one two  "));
        let event = KeyEvent::new(KeyCode::Backspace, KeyModifiers::CONTROL);
        assert_eq!(line.handle_key(&event), LineOutcome::Edited);
        assert_eq!(line.text(), "one ");
        assert_eq!(line.handle_key(&event), LineOutcome::Edited);
        assert_eq!(line.text(), "");
        assert_eq!(line.handle_key(&event), LineOutcome::Ignored);
    }

    #[test]
    fn terminators_are_not_consumed_as_edits() {
        let mut line = InputLine::new();
        line.activate(Some("x"));
        assert_eq!(line.handle_key(&key(KeyCode::Enter)), LineOutcome::Accept);
        assert_eq!(line.handle_key(&key(KeyCode::Esc)), LineOutcome::Cancel);
        assert_eq!(line.handle_key(&key(KeyCode::Tab)), LineOutcome::Cycle);
        assert_eq!(line.text(), "x");
    }

    #[test]
    fn reactivation_with_default_overwrites_text() {
        let mut line = InputLine::new();
        line.activate(Some("first"));
        line.deactivate(true);
        line.activate(Some("second"));
        assert_eq!(line.text(), "second");
        line.deactivate(false);
        line.activate(None);
        assert_eq!(line.text(), "second", "no default keeps the previous text");
    }

    #[test]
    fn history_navigation_round_trips() {
        let mut line = InputLine::new();
        line.activate(Some("alpha"));
        line.deactivate(true);
        line.activate(Some("beta"));
        line.deactivate(true);

        line.activate(Some("draft"));
        assert_eq!(line.handle_key(&key(KeyCode::Up)), LineOutcome::Edited);
        assert_eq!(line.text(), "beta");
        assert_eq!(line.handle_key(&key(KeyCode::Up)), LineOutcome::Edited);
        assert_eq!(line.text(), "alpha");
        assert_eq!(line.handle_key(&key(KeyCode::Up)), LineOutcome::Ignored);
        line.handle_key(&key(KeyCode::Down));
        assert_eq!(line.text(), "beta");
        line.handle_key(&key(KeyCode::Down));
        assert_eq!(line.text(), "draft", "leaving history restores the draft");
    }

    #[test]
    fn cancelled_sessions_leave_history_alone() {
        let mut line = InputLine::new();
        line.activate(Some("keep"));
        line.deactivate(true);
        line.activate(Some("drop"));
        line.deactivate(false);
        line.activate(Some(""));
        line.handle_key(&key(KeyCode::Up));
        assert_eq!(line.text(), "keep");
    }
}
