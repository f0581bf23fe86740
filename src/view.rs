//! The view capability traits and the frame views draw through.
//!
//! A view is the pluggable behavior hosted inside a buffer: it renders into
//! the buffer's content area, consumes keystrokes while focused, and gets
//! lifecycle callbacks as the buffer moves through the stack. Concrete views
//! live in the embedding application; this crate only ships the small
//! internal ones the session itself needs (the completion list and the
//! directory browser).

use crossterm::event::KeyEvent;
use unicode_width::UnicodeWidthChar;

use crate::config::Colors;
use crate::terminal::{CellStyle, TerminalSurface};

/// A drawable, focusable, input-consuming unit hosted by a buffer.
///
/// `draw`, `resize`, `focus` and `blur` are invoked mid-paint with the
/// screen lock held; they must not call back into the session. `handle_input`
/// and `cleanup` are invoked with no locks held.
pub trait View {
    /// Short kind name shown in the buffer's status line, e.g. `"inbox"`.
    fn name(&self) -> &str;

    /// Free-form status text appended to the buffer's status line.
    fn status(&self) -> String {
        String::new()
    }

    /// Paint the content area. The frame is clipped to the buffer's content
    /// region; out-of-bounds writes are silently dropped.
    fn draw(&mut self, frame: &mut Frame<'_>);

    /// The content area changed to `rows` by `cols`.
    fn resize(&mut self, rows: u16, cols: u16) {
        let _ = (rows, cols);
    }

    fn focus(&mut self) {}

    fn blur(&mut self) {}

    /// Consume one keystroke. Return false to leave it unhandled.
    fn handle_input(&mut self, key: &KeyEvent) -> bool {
        let _ = key;
        false
    }

    /// Invoked exactly once, when the hosting buffer is killed.
    fn cleanup(&mut self) {}

    /// Whether the safe kill paths may destroy this view.
    fn killable(&self) -> bool {
        true
    }

    /// Persistent views are skipped (not refused) by
    /// `kill_all_buffers_safely`.
    fn persistent(&self) -> bool {
        false
    }
}

/// The extra capability modal views need: completion detection and a result
/// value handed back by the blocking modal loop.
pub trait ModalView: View {
    type Output;

    /// True once the view has produced its result and the modal loop should
    /// exit.
    fn is_done(&self) -> bool;

    /// Take the result out of the view. Called exactly once, after the loop
    /// ends (also on cancellation, in which case the view reports whatever
    /// its cancelled state is — typically an empty value).
    fn take_value(&mut self) -> Self::Output;
}

/// A bounds-checked window onto the terminal, covering one buffer's content
/// area. All coordinates are relative to the area's top-left corner.
pub struct Frame<'a> {
    surface: &'a mut dyn TerminalSurface,
    origin_row: u16,
    origin_col: u16,
    rows: u16,
    cols: u16,
    colors: &'a Colors,
}

/// Options for a single [`Frame::write`] call.
#[derive(Debug, Clone, Copy)]
pub struct WriteOptions {
    /// Pad to the right edge with spaces, erasing stale content. On by
    /// default; suppress for partial-line updates.
    pub fill: bool,
    pub style: CellStyle,
}

impl Default for WriteOptions {
    fn default() -> Self {
        Self {
            fill: true,
            style: CellStyle::default(),
        }
    }
}

impl WriteOptions {
    pub fn styled(style: CellStyle) -> Self {
        Self { fill: true, style }
    }

    pub fn no_fill(mut self) -> Self {
        self.fill = false;
        self
    }
}

impl<'a> Frame<'a> {
    pub(crate) fn new(
        surface: &'a mut dyn TerminalSurface,
        origin_row: u16,
        origin_col: u16,
        rows: u16,
        cols: u16,
        colors: &'a Colors,
    ) -> Self {
        Self {
            surface,
            origin_row,
            origin_col,
            rows,
            cols,
            colors,
        }
    }

    /// Content rows available to the view.
    pub fn rows(&self) -> u16 {
        self.rows
    }

    /// Content columns available to the view.
    pub fn cols(&self) -> u16 {
        self.cols
    }

    /// The configured color roles.
    pub fn colors(&self) -> &Colors {
        self.colors
    }

    /// Bounds-checked single-line write. A start position outside the area
    /// is a no-op; text is truncated to the available display width and the
    /// remainder of the line is space-padded unless suppressed.
    pub fn write(&mut self, row: u16, col: u16, text: &str, opts: &WriteOptions) {
        if row >= self.rows || col >= self.cols {
            return;
        }
        let avail = (self.cols - col) as usize;
        let (clipped, used) = clip_to_width(text, avail);
        let mut line = clipped.to_string();
        if opts.fill && used < avail {
            line.extend(std::iter::repeat(' ').take(avail - used));
        }
        let _ = self.surface.write_at(
            self.origin_row + row,
            self.origin_col + col,
            &line,
            &opts.style,
        );
    }

    /// Blank out a whole content row.
    pub fn clear_row(&mut self, row: u16) {
        self.write(row, 0, "", &WriteOptions::default());
    }
}

/// Truncate `text` to at most `avail` display columns. Returns the clipped
/// slice and the columns it occupies (which can be one less than `avail`
/// when a wide character would straddle the edge).
pub(crate) fn clip_to_width(text: &str, avail: usize) -> (&str, usize) {
    let mut used = 0;
    let mut end = 0;
    for (idx, c) in text.char_indices() {
        let w = c.width().unwrap_or(0);
        if used + w > avail {
            break;
        }
        used += w;
        end = idx + c.len_utf8();
    }
    (&text[..end], used)
}
