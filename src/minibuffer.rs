//! The minibuffer composer.
//!
//! Three independent sources share the bottom region of the screen: an
//! active prompt line, a transient flash, and a stack of persistent status
//! lines addressed by stable handles. The composer owns that state and
//! flattens it into the lines actually painted; the session serializes all
//! access behind its minibuffer lock so no torn snapshot can be composed.
//!
//! Status slots are a handle→text map plus a next-handle counter. Clearing
//! the current maximum live handle rewinds the counter past the new maximum,
//! so trailing holes vanish while interior holes persist and keep
//! concurrently-open handles stable.

use std::collections::BTreeMap;

/// Stable handle to one persistent status line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct StatusHandle(pub(crate) usize);

#[derive(Debug, Default)]
pub(crate) struct Minibuffer {
    flash: Option<String>,
    /// Rendered prompt content (question plus current input); `Some` while a
    /// prompt session is active.
    prompt_line: Option<String>,
    slots: BTreeMap<usize, String>,
    next_slot: usize,
}

impl Minibuffer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocate the next slot. The caller is responsible for the full-screen
    /// redraw this implies (the region may have grown).
    pub fn say(&mut self, text: &str) -> StatusHandle {
        let handle = StatusHandle(self.next_slot);
        self.slots.insert(self.next_slot, text.to_string());
        self.next_slot += 1;
        handle
    }

    /// Replace an existing slot in place. Re-opens the slot if it was
    /// cleared; handles above it are unaffected either way.
    pub fn say_at(&mut self, handle: StatusHandle, text: &str) {
        self.slots.insert(handle.0, text.to_string());
        if handle.0 >= self.next_slot {
            self.next_slot = handle.0 + 1;
        }
    }

    /// Drop a slot. Clearing the maximum live handle trims trailing holes by
    /// rewinding the next-handle counter; interior holes persist.
    pub fn clear(&mut self, handle: StatusHandle) {
        self.slots.remove(&handle.0);
        if self.next_slot > 0 && handle.0 == self.next_slot - 1 {
            self.next_slot = self.slots.keys().next_back().map_or(0, |&k| k + 1);
        }
    }

    pub fn flash(&mut self, text: &str) {
        self.flash = Some(text.to_string());
    }

    /// Clear the flash. The next natural redraw omits it; nothing repaints
    /// here.
    pub fn erase_flash(&mut self) {
        self.flash = None;
    }

    pub fn prompt_active(&self) -> bool {
        self.prompt_line.is_some()
    }

    pub fn set_prompt_line(&mut self, line: Option<String>) {
        self.prompt_line = line;
    }

    /// Number of live (non-hole) status slots.
    pub fn live_slots(&self) -> usize {
        self.slots.len()
    }

    /// Height of the rendered region: at least one line, even when empty.
    pub fn height(&self) -> u16 {
        let lines =
            self.prompt_line.iter().count() + self.flash.iter().count() + self.live_slots();
        lines.max(1) as u16
    }

    /// The lines to paint, top to bottom: prompt, flash, then live slots in
    /// handle order; one blank line when nothing would render.
    pub fn render_lines(&self) -> Vec<String> {
        let mut lines = Vec::new();
        if let Some(prompt) = &self.prompt_line {
            lines.push(prompt.clone());
        }
        if let Some(flash) = &self.flash {
            lines.push(flash.clone());
        }
        for text in self.slots.values() {
            lines.push(text.clone());
        }
        if lines.is_empty() {
            lines.push(String::new());
        }
        lines
    }

    #[cfg(test)]
    fn slot_text(&self, handle: StatusHandle) -> Option<&str> {
        self.slots.get(&handle.0).map(String::as_str)
    }
}
