//! The ordered buffer stack and focus bookkeeping.
//!
//! Stack order is z-order: the last element is the topmost, visible buffer.
//! New buffers enter at the bottom and are normally raised immediately. The
//! name map and the ordered sequence always hold the same set of buffers.
//!
//! This is the pure data structure; the session wraps it in the screen lock
//! and is responsible for invoking view cleanup outside that lock (which is
//! why [`BufferStack::kill`] hands the view back instead of cleaning it up).

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use crate::buffer::{Buffer, BufferId};
use crate::error::{Error, Result};
use crate::view::View;

/// Options for spawning a buffer.
#[derive(Debug, Clone, Copy, Default)]
pub struct SpawnOptions {
    /// Buffer width; defaults to the full screen width.
    pub width: Option<u16>,
    /// Buffer height; defaults to the screen height minus one row for the
    /// minibuffer.
    pub height: Option<u16>,
    /// Spawn at the bottom of the stack instead of raising to the top. A
    /// hidden spawn still takes focus if nothing has it.
    pub hidden: bool,
    /// Pin the buffer above normal stacking until the next roll.
    pub force_to_top: bool,
}

pub(crate) struct BufferStack {
    /// Oldest-first; the last element is the top of the stack.
    order: Vec<BufferId>,
    by_id: HashMap<BufferId, Buffer>,
    by_name: HashMap<String, BufferId>,
    focus: Option<BufferId>,
    next_id: u64,
}

impl BufferStack {
    pub fn new() -> Self {
        Self {
            order: Vec::new(),
            by_id: HashMap::new(),
            by_name: HashMap::new(),
            focus: None,
            next_id: 0,
        }
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    pub fn top(&self) -> Option<BufferId> {
        self.order.last().copied()
    }

    pub fn focused(&self) -> Option<BufferId> {
        self.focus
    }

    pub fn contains(&self, id: BufferId) -> bool {
        self.by_id.contains_key(&id)
    }

    pub fn get(&self, id: BufferId) -> Option<&Buffer> {
        self.by_id.get(&id)
    }

    pub fn get_mut(&mut self, id: BufferId) -> Option<&mut Buffer> {
        self.by_id.get_mut(&id)
    }

    /// Look a buffer up by its realized title.
    pub fn find(&self, title: &str) -> Option<BufferId> {
        self.by_name.get(title).copied()
    }

    /// Ids bottom-first (top of stack last).
    pub fn ids(&self) -> Vec<BufferId> {
        self.order.clone()
    }

    /// Append ` <2>`, ` <3>`, … until the title is unique in the active set.
    fn realize_title(&self, requested: &str) -> String {
        if !self.by_name.contains_key(requested) {
            return requested.to_string();
        }
        let mut n = 2;
        loop {
            let candidate = format!("{requested} <{n}>");
            if !self.by_name.contains_key(&candidate) {
                return candidate;
            }
            n += 1;
        }
    }

    /// Create a buffer around `view` and insert it. Returns the new id; the
    /// realized title is available through [`Buffer::title`].
    pub fn spawn(
        &mut self,
        title: &str,
        view: Rc<RefCell<dyn View>>,
        opts: SpawnOptions,
        screen_rows: u16,
        screen_cols: u16,
    ) -> BufferId {
        let realized = self.realize_title(title);
        let width = opts.width.unwrap_or(screen_cols);
        let height = opts.height.unwrap_or_else(|| screen_rows.saturating_sub(1));
        let id = BufferId(self.next_id);
        self.next_id += 1;

        let buffer = Buffer::new(id, realized.clone(), view, width, height, opts.force_to_top);
        self.by_name.insert(realized.clone(), id);
        self.by_id.insert(id, buffer);
        self.order.insert(0, id);
        tracing::info!(title = %realized, ?id, hidden = opts.hidden, "spawned buffer");

        if opts.hidden {
            if self.focus.is_none() {
                self.focus_on(id);
            }
        } else {
            // Membership was just established; raising cannot fail.
            let _ = self.raise_to_front(id);
        }
        id
    }

    /// Raise an existing buffer, or lazily materialize a view and spawn it.
    pub fn spawn_unless_exists<F>(
        &mut self,
        title: &str,
        opts: SpawnOptions,
        screen_rows: u16,
        screen_cols: u16,
        provider: F,
    ) -> BufferId
    where
        F: FnOnce() -> Rc<RefCell<dyn View>>,
    {
        if let Some(id) = self.find(title) {
            if !opts.hidden {
                let _ = self.raise_to_front(id);
            }
            return id;
        }
        self.spawn(title, provider(), opts, screen_rows, screen_cols)
    }

    /// Move a buffer to the top of the stack and focus it — unless the
    /// current top is pinned, in which case the buffer lands just below it
    /// and focus is left alone.
    pub fn raise_to_front(&mut self, id: BufferId) -> Result<()> {
        if !self.by_id.contains_key(&id) {
            return Err(Error::UnknownBuffer(id));
        }
        self.order.retain(|&other| other != id);
        let top_pinned = self
            .order
            .last()
            .and_then(|top| self.by_id.get(top))
            .map(|buf| buf.force_to_top())
            .unwrap_or(false);
        if top_pinned {
            self.order.insert(self.order.len() - 1, id);
        } else {
            self.order.push(id);
            self.focus_on(id);
        }
        tracing::debug!(?id, below_pinned_top = top_pinned, "raised buffer");
        Ok(())
    }

    /// Cycle: clear the top's pin, then raise the bottom buffer.
    pub fn roll(&mut self) {
        if self.is_empty() {
            return;
        }
        let top = self.order[self.order.len() - 1];
        if let Some(buf) = self.by_id.get_mut(&top) {
            buf.clear_force_to_top();
        }
        let first = self.order[0];
        let _ = self.raise_to_front(first);
    }

    /// Cycle the other way: clear the top's pin, then raise the buffer just
    /// below the top. No-op with fewer than two buffers.
    pub fn roll_backwards(&mut self) {
        if self.order.len() < 2 {
            return;
        }
        let top = self.order[self.order.len() - 1];
        if let Some(buf) = self.by_id.get_mut(&top) {
            buf.clear_force_to_top();
        }
        let below = self.order[self.order.len() - 2];
        let _ = self.raise_to_front(below);
    }

    /// Remove a buffer from the stack. Focus moves to the new top, if any.
    /// Returns the removed buffer's view so the caller can run its cleanup
    /// hook outside the screen lock.
    pub fn kill(&mut self, id: BufferId) -> Result<Rc<RefCell<dyn View>>> {
        let buffer = self.by_id.remove(&id).ok_or(Error::UnknownBuffer(id))?;
        self.order.retain(|&other| other != id);
        self.by_name.remove(buffer.title());
        if self.focus == Some(id) {
            self.focus = None;
        }
        tracing::info!(title = %buffer.title(), ?id, "killed buffer");
        if let Some(top) = self.top() {
            let _ = self.raise_to_front(top);
        }
        Ok(buffer.view().clone())
    }

    fn focus_on(&mut self, id: BufferId) {
        if self.focus == Some(id) {
            return;
        }
        if let Some(old) = self.focus.take() {
            if let Some(buf) = self.by_id.get_mut(&old) {
                buf.blur();
            }
        }
        if let Some(buf) = self.by_id.get_mut(&id) {
            buf.focus();
            self.focus = Some(id);
        }
    }
}
