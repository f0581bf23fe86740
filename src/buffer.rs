//! A buffer: one view plus its on-screen geometry and presentation state.
//!
//! Buffers own the redraw/commit protocol for their region. The status line
//! occupies the last row; everything above it is the view's content area.

use std::cell::RefCell;
use std::rc::Rc;

use crate::config::Colors;
use crate::terminal::TerminalSurface;
use crate::view::{clip_to_width, Frame, View, WriteOptions};

/// Stable handle to a buffer in the stack. Handles stay valid until the
/// buffer is killed; operations on a dead handle fail with
/// `Error::UnknownBuffer`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BufferId(pub(crate) u64);

pub struct Buffer {
    id: BufferId,
    title: String,
    view: Rc<RefCell<dyn View>>,
    // Position is always (0, 0) today; kept explicit because the write
    // protocol is defined in terms of it.
    x: u16,
    y: u16,
    width: u16,
    height: u16,
    dirty: bool,
    focused: bool,
    force_to_top: bool,
}

impl Buffer {
    pub(crate) fn new(
        id: BufferId,
        title: String,
        view: Rc<RefCell<dyn View>>,
        width: u16,
        height: u16,
        force_to_top: bool,
    ) -> Self {
        Self {
            id,
            title,
            view,
            x: 0,
            y: 0,
            width,
            height: height.max(1),
            dirty: true,
            focused: false,
            force_to_top,
        }
    }

    pub fn id(&self) -> BufferId {
        self.id
    }

    /// The realized (collision-free) title.
    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn view(&self) -> &Rc<RefCell<dyn View>> {
        &self.view
    }

    pub fn size(&self) -> (u16, u16) {
        (self.height, self.width)
    }

    /// Content rows available to the view (the status line takes one row).
    pub fn content_rows(&self) -> u16 {
        self.height - 1
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    pub fn is_focused(&self) -> bool {
        self.focused
    }

    pub fn force_to_top(&self) -> bool {
        self.force_to_top
    }

    pub(crate) fn clear_force_to_top(&mut self) {
        self.force_to_top = false;
    }

    /// Update geometry. A no-op if unchanged; otherwise marks dirty and
    /// forwards the new content-area size to the view.
    pub fn resize(&mut self, rows: u16, cols: u16) {
        let rows = rows.max(1);
        if rows == self.height && cols == self.width {
            return;
        }
        self.height = rows;
        self.width = cols;
        self.dirty = true;
        self.view.borrow_mut().resize(rows - 1, cols);
    }

    /// Repaint: full draw when dirty, otherwise just the status line. Always
    /// commits.
    pub(crate) fn redraw(&mut self, surface: &mut dyn TerminalSurface, colors: &Colors) {
        if self.dirty {
            self.draw(surface, colors);
            return;
        }
        self.paint_status(surface, colors);
        self.commit();
    }

    /// Unconditional full repaint of content and status line, then commit.
    pub(crate) fn draw(&mut self, surface: &mut dyn TerminalSurface, colors: &Colors) {
        {
            let mut frame = Frame::new(
                surface,
                self.y,
                self.x,
                self.height - 1,
                self.width,
                colors,
            );
            self.view.borrow_mut().draw(&mut frame);
        }
        self.paint_status(surface, colors);
        self.commit();
    }

    /// Clear the dirty flag. Output stays buffered on the surface until the
    /// compositor's batched flush.
    pub(crate) fn commit(&mut self) {
        self.dirty = false;
    }

    /// Bounds-checked single-line write into the buffer region (status row
    /// included), relative to the buffer origin.
    pub fn write(
        &self,
        surface: &mut dyn TerminalSurface,
        row: u16,
        col: u16,
        text: &str,
        opts: &WriteOptions,
    ) {
        if row >= self.height || col >= self.width {
            return;
        }
        let avail = (self.width - col) as usize;
        let (clipped, used) = clip_to_width(text, avail);
        let mut line = clipped.to_string();
        if opts.fill && used < avail {
            line.extend(std::iter::repeat(' ').take(avail - used));
        }
        let _ = surface.write_at(self.y + row, self.x + col, &line, &opts.style);
    }

    pub(crate) fn focus(&mut self) {
        self.focused = true;
        self.dirty = true;
        self.view.borrow_mut().focus();
    }

    pub(crate) fn blur(&mut self) {
        self.focused = false;
        self.dirty = true;
        self.view.borrow_mut().blur();
    }

    fn paint_status(&self, surface: &mut dyn TerminalSurface, colors: &Colors) {
        let view = self.view.borrow();
        let status = format!(" [{}] {}   {}", view.name(), self.title, view.status());
        self.write(
            surface,
            self.height - 1,
            0,
            &status,
            &WriteOptions::styled(colors.status),
        );
    }
}

impl std::fmt::Debug for Buffer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Buffer")
            .field("id", &self.id)
            .field("title", &self.title)
            .field("size", &(self.height, self.width))
            .field("dirty", &self.dirty)
            .field("focused", &self.focused)
            .field("force_to_top", &self.force_to_top)
            .finish()
    }
}
