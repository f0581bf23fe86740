//! In-memory terminal surface for tests.
//!
//! Keeps a character grid plus a per-cell style grid, and serves key events
//! from a scripted queue. Cloning yields another handle onto the same
//! surface, so a test can keep inspecting the grid after handing the surface
//! to a session.

use std::collections::VecDeque;
use std::io;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use super::{CellStyle, TerminalSurface};

/// Polls allowed on an empty key queue before the surface reports an error.
/// A blocking loop that outlives its script is a test bug; erroring out of
/// the poll turns a would-be hang into a failing test.
const EMPTY_POLL_LIMIT: u32 = 1000;

struct Inner {
    rows: u16,
    cols: u16,
    chars: Vec<Vec<char>>,
    styles: Vec<Vec<CellStyle>>,
    keys: VecDeque<Option<KeyEvent>>,
    empty_polls: u32,
    cursor: (u16, u16),
    cursor_visible: bool,
    suspended: bool,
    flushes: u32,
    refreshes: u32,
    clears: u32,
}

/// A scripted, inspectable terminal double.
#[derive(Clone)]
pub struct TestSurface {
    inner: Arc<Mutex<Inner>>,
}

impl TestSurface {
    pub fn new(rows: u16, cols: u16) -> Self {
        let inner = Inner {
            rows,
            cols,
            chars: vec![vec![' '; cols as usize]; rows as usize],
            styles: vec![vec![CellStyle::default(); cols as usize]; rows as usize],
            keys: VecDeque::new(),
            empty_polls: 0,
            cursor: (0, 0),
            cursor_visible: false,
            suspended: false,
            flushes: 0,
            refreshes: 0,
            clears: 0,
        };
        Self {
            inner: Arc::new(Mutex::new(inner)),
        }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Queue a key event for the next poll.
    pub fn push_key(&self, code: KeyCode, modifiers: KeyModifiers) {
        self.lock()
            .keys
            .push_back(Some(KeyEvent::new(code, modifiers)));
    }

    /// Queue each character of `text` as an unmodified keystroke.
    pub fn push_text(&self, text: &str) {
        let mut inner = self.lock();
        for c in text.chars() {
            inner
                .keys
                .push_back(Some(KeyEvent::new(KeyCode::Char(c), KeyModifiers::NONE)));
        }
    }

    /// Queue one "no event" poll result, for exercising timeout paths.
    pub fn push_empty_poll(&self) {
        self.lock().keys.push_back(None);
    }

    pub fn row_text(&self, row: u16) -> String {
        let inner = self.lock();
        inner.chars[row as usize].iter().collect::<String>()
    }

    /// The whole grid, rows joined with newlines, trailing spaces kept.
    pub fn screen_to_string(&self) -> String {
        let inner = self.lock();
        inner
            .chars
            .iter()
            .map(|row| row.iter().collect::<String>())
            .collect::<Vec<_>>()
            .join("\n")
    }

    pub fn contains(&self, needle: &str) -> bool {
        self.screen_to_string().contains(needle)
    }

    pub fn style_at(&self, row: u16, col: u16) -> CellStyle {
        self.lock().styles[row as usize][col as usize]
    }

    pub fn cursor(&self) -> (u16, u16) {
        self.lock().cursor
    }

    pub fn cursor_visible(&self) -> bool {
        self.lock().cursor_visible
    }

    pub fn suspended(&self) -> bool {
        self.lock().suspended
    }

    pub fn flush_count(&self) -> u32 {
        self.lock().flushes
    }

    pub fn refresh_count(&self) -> u32 {
        self.lock().refreshes
    }

    pub fn clear_count(&self) -> u32 {
        self.lock().clears
    }

    /// Number of scripted events not yet consumed.
    pub fn pending_keys(&self) -> usize {
        self.lock().keys.len()
    }
}

impl TerminalSurface for TestSurface {
    fn size(&self) -> (u16, u16) {
        let inner = self.lock();
        (inner.rows, inner.cols)
    }

    fn move_cursor(&mut self, row: u16, col: u16) -> io::Result<()> {
        self.lock().cursor = (row, col);
        Ok(())
    }

    fn set_cursor_visible(&mut self, visible: bool) -> io::Result<()> {
        self.lock().cursor_visible = visible;
        Ok(())
    }

    fn write_at(&mut self, row: u16, col: u16, text: &str, style: &CellStyle) -> io::Result<()> {
        let mut inner = self.lock();
        if row >= inner.rows {
            return Ok(());
        }
        let mut x = col as usize;
        for c in text.chars() {
            if x >= inner.cols as usize {
                break;
            }
            let r = row as usize;
            inner.chars[r][x] = c;
            inner.styles[r][x] = *style;
            x += 1;
        }
        Ok(())
    }

    fn clear_all(&mut self) -> io::Result<()> {
        let mut inner = self.lock();
        for row in inner.chars.iter_mut() {
            row.fill(' ');
        }
        for row in inner.styles.iter_mut() {
            row.fill(CellStyle::default());
        }
        inner.clears += 1;
        Ok(())
    }

    fn flush(&mut self) -> io::Result<()> {
        self.lock().flushes += 1;
        Ok(())
    }

    fn refresh(&mut self) -> io::Result<()> {
        self.lock().refreshes += 1;
        Ok(())
    }

    fn poll_key(&mut self, _timeout: Duration) -> io::Result<Option<KeyEvent>> {
        let mut inner = self.lock();
        match inner.keys.pop_front() {
            Some(event) => {
                inner.empty_polls = 0;
                Ok(event)
            }
            None => {
                inner.empty_polls += 1;
                if inner.empty_polls > EMPTY_POLL_LIMIT {
                    Err(io::Error::new(
                        io::ErrorKind::TimedOut,
                        "TestSurface key queue exhausted",
                    ))
                } else {
                    Ok(None)
                }
            }
        }
    }

    fn suspend(&mut self) -> io::Result<()> {
        self.lock().suspended = true;
        Ok(())
    }

    fn resume(&mut self) -> io::Result<()> {
        self.lock().suspended = false;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn write_clips_at_grid_edge() {
        let mut surface = TestSurface::new(2, 5);
        surface
            .write_at(0, 3, "abcdef", &CellStyle::default())
            .unwrap();
        assert_eq!(surface.row_text(0), "   ab");
    }

    #[test]
    fn write_below_grid_is_dropped() {
        let mut surface = TestSurface::new(2, 5);
        surface.write_at(7, 0, "x", &CellStyle::default()).unwrap();
        assert!(!surface.contains("x"));
    }

    #[test]
    fn scripted_keys_come_back_in_order() {
        let mut surface = TestSurface::new(2, 5);
        surface.push_text("ab");
        surface.push_empty_poll();
        let timeout = Duration::from_millis(1);
        assert_eq!(
            surface.poll_key(timeout).unwrap().map(|k| k.code),
            Some(KeyCode::Char('a'))
        );
        assert_eq!(
            surface.poll_key(timeout).unwrap().map(|k| k.code),
            Some(KeyCode::Char('b'))
        );
        assert_eq!(surface.poll_key(timeout).unwrap(), None);
    }

    #[test]
    fn exhausted_queue_eventually_errors() {
        let mut surface = TestSurface::new(1, 1);
        let timeout = Duration::from_millis(1);
        for _ in 0..EMPTY_POLL_LIMIT {
            assert!(surface.poll_key(timeout).unwrap().is_none());
        }
        assert!(surface.poll_key(timeout).is_err());
    }
}
