//! The terminal surface abstraction.
//!
//! Everything the session layer needs from a terminal is behind the
//! [`TerminalSurface`] trait: a character grid addressed by (row, col),
//! cursor control, styled bounded writes, a batched flush, and a
//! non-blocking key poll with a timeout. The production implementation
//! drives a real terminal through crossterm; [`TestSurface`] keeps an
//! in-memory grid and a scripted key queue for the test suite.

mod crossterm_surface;
mod test_surface;

pub use crossterm_surface::CrosstermSurface;
pub use test_surface::TestSurface;

use std::io;
use std::time::Duration;

use crossterm::event::KeyEvent;
use crossterm::style::Color;
use serde::{Deserialize, Serialize};

/// Style applied to a single bounded write.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct CellStyle {
    /// Foreground color; `None` keeps the terminal default.
    #[serde(default)]
    pub fg: Option<Color>,
    /// Background color; `None` keeps the terminal default.
    #[serde(default)]
    pub bg: Option<Color>,
    #[serde(default)]
    pub bold: bool,
    /// Reverse video; used for standout status lines and selections.
    #[serde(default)]
    pub reverse: bool,
}

impl CellStyle {
    /// The same style with reverse video toggled on.
    pub fn highlighted(mut self) -> Self {
        self.reverse = true;
        self
    }
}

/// A terminal seen as a character grid with batched output.
///
/// All coordinates are (row, col), zero-based, rows growing downward. Writes
/// are buffered; nothing is guaranteed to reach the screen until [`flush`]
/// (the batched update) or [`refresh`] (an immediate one).
///
/// [`flush`]: TerminalSurface::flush
/// [`refresh`]: TerminalSurface::refresh
pub trait TerminalSurface {
    /// Current grid dimensions as (rows, cols). Re-queried by the compositor
    /// on every pass, so window resizes are picked up without a dedicated
    /// event.
    fn size(&self) -> (u16, u16);

    fn move_cursor(&mut self, row: u16, col: u16) -> io::Result<()>;

    fn set_cursor_visible(&mut self, visible: bool) -> io::Result<()>;

    /// Write `text` starting at (row, col) with the given style. The
    /// implementation clips at the grid edge; callers are expected to have
    /// truncated to their own region already.
    fn write_at(&mut self, row: u16, col: u16, text: &str, style: &CellStyle) -> io::Result<()>;

    /// Erase the whole grid.
    fn clear_all(&mut self) -> io::Result<()>;

    /// Push all buffered writes out in one batched update.
    fn flush(&mut self) -> io::Result<()>;

    /// Force an immediate repaint of the physical screen.
    fn refresh(&mut self) -> io::Result<()>;

    /// Poll for the next key event, waiting at most `timeout`. `Ok(None)`
    /// means "no event yet" and is not an error.
    fn poll_key(&mut self, timeout: Duration) -> io::Result<Option<KeyEvent>>;

    /// Release the terminal to an external process (leave the UI screen,
    /// restore cooked mode).
    fn suspend(&mut self) -> io::Result<()>;

    /// Reclaim the terminal after [`suspend`](TerminalSurface::suspend).
    fn resume(&mut self) -> io::Result<()>;
}
