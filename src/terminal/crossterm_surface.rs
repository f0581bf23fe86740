//! Crossterm-backed terminal surface.

use std::io::{self, Stdout, Write};
use std::time::Duration;

use crossterm::cursor::{Hide, MoveTo, Show};
use crossterm::event::{self, Event, KeyEvent, KeyEventKind};
use crossterm::style::{Attribute, Print, ResetColor, SetAttribute, SetBackgroundColor, SetForegroundColor};
use crossterm::terminal::{
    disable_raw_mode, enable_raw_mode, Clear, ClearType, EnterAlternateScreen, LeaveAlternateScreen,
};
use crossterm::QueueableCommand;

use super::{CellStyle, TerminalSurface};

/// The production surface: raw mode plus the alternate screen, with writes
/// queued on stdout and pushed out in one batch per compositor pass.
pub struct CrosstermSurface {
    out: Stdout,
    suspended: bool,
}

impl CrosstermSurface {
    /// Take over the terminal: enable raw mode, enter the alternate screen
    /// and hide the cursor. Restored on drop.
    pub fn new() -> io::Result<Self> {
        let mut out = io::stdout();
        enable_raw_mode()?;
        out.queue(EnterAlternateScreen)?;
        out.queue(Hide)?;
        out.flush()?;
        Ok(Self {
            out,
            suspended: false,
        })
    }

    fn queue_style(&mut self, style: &CellStyle) -> io::Result<()> {
        self.out.queue(ResetColor)?;
        self.out.queue(SetAttribute(Attribute::Reset))?;
        if let Some(fg) = style.fg {
            self.out.queue(SetForegroundColor(fg))?;
        }
        if let Some(bg) = style.bg {
            self.out.queue(SetBackgroundColor(bg))?;
        }
        if style.bold {
            self.out.queue(SetAttribute(Attribute::Bold))?;
        }
        if style.reverse {
            self.out.queue(SetAttribute(Attribute::Reverse))?;
        }
        Ok(())
    }
}

impl TerminalSurface for CrosstermSurface {
    fn size(&self) -> (u16, u16) {
        let (cols, rows) = crossterm::terminal::size().unwrap_or((80, 24));
        (rows, cols)
    }

    fn move_cursor(&mut self, row: u16, col: u16) -> io::Result<()> {
        self.out.queue(MoveTo(col, row))?;
        Ok(())
    }

    fn set_cursor_visible(&mut self, visible: bool) -> io::Result<()> {
        if visible {
            self.out.queue(Show)?;
        } else {
            self.out.queue(Hide)?;
        }
        Ok(())
    }

    fn write_at(&mut self, row: u16, col: u16, text: &str, style: &CellStyle) -> io::Result<()> {
        self.queue_style(style)?;
        self.out.queue(MoveTo(col, row))?;
        self.out.queue(Print(text))?;
        self.out.queue(ResetColor)?;
        self.out.queue(SetAttribute(Attribute::Reset))?;
        Ok(())
    }

    fn clear_all(&mut self) -> io::Result<()> {
        self.out.queue(Clear(ClearType::All))?;
        Ok(())
    }

    fn flush(&mut self) -> io::Result<()> {
        self.out.flush()
    }

    fn refresh(&mut self) -> io::Result<()> {
        // Crossterm has no deferred-update model beyond the stdout buffer, so
        // an immediate refresh is the same flush.
        self.out.flush()
    }

    fn poll_key(&mut self, timeout: Duration) -> io::Result<Option<KeyEvent>> {
        if !event::poll(timeout)? {
            return Ok(None);
        }
        match event::read()? {
            Event::Key(key) if key.kind != KeyEventKind::Release => Ok(Some(key)),
            // Resize and the rest surface as "no event"; the next compositor
            // pass re-queries the grid size anyway.
            _ => Ok(None),
        }
    }

    fn suspend(&mut self) -> io::Result<()> {
        disable_raw_mode()?;
        self.out.queue(LeaveAlternateScreen)?;
        self.out.queue(Show)?;
        self.out.flush()?;
        self.suspended = true;
        Ok(())
    }

    fn resume(&mut self) -> io::Result<()> {
        self.out.queue(EnterAlternateScreen)?;
        self.out.queue(Hide)?;
        self.out.flush()?;
        enable_raw_mode()?;
        self.suspended = false;
        Ok(())
    }
}

impl Drop for CrosstermSurface {
    fn drop(&mut self) {
        if !self.suspended {
            let _ = disable_raw_mode();
            let _ = self.out.queue(LeaveAlternateScreen);
            let _ = self.out.queue(Show);
            let _ = self.out.flush();
        }
    }
}
