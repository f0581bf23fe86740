//! The session: single owner of the terminal, the buffer stack and the
//! minibuffer, and the home of every blocking interaction loop.
//!
//! Constructed once at startup and passed by reference to whatever needs it;
//! there is no global instance. Two locks guard the shared state: the screen
//! lock (terminal surface plus buffer stack — every compositor pass and
//! every direct terminal mutation holds it) and the narrower minibuffer
//! lock (flash, prompt line, status slots, which `say`/`clear` mutate from
//! outside compositor passes). Lock order is screen before minibuffer;
//! nested compositor calls go through the `_locked` variants instead of
//! re-acquiring.
//!
//! View `handle_input` and `cleanup` hooks run with no locks held, so the
//! embedding application may drive the session from code those hooks
//! trigger. Draw/resize/focus/blur hooks run inside a compositor pass and
//! must not.

use std::cell::RefCell;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::process::Command;
use std::rc::Rc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, MutexGuard};
use std::time::Duration;

use crossterm::event::{KeyCode, KeyEvent};
use unicode_width::UnicodeWidthStr;

use crate::buffer::BufferId;
use crate::completion::{
    common_prefix, complete_path, expand_tilde, AccountDirectory, Candidate, EtcPasswdAccounts,
};
use crate::config::Config;
use crate::error::{Error, Result};
use crate::input_line::{InputLine, LineOutcome};
use crate::minibuffer::{Minibuffer, StatusHandle};
use crate::stack::{BufferStack, SpawnOptions};
use crate::terminal::TerminalSurface;
use crate::browser::DirBrowser;
use crate::view::{clip_to_width, Frame, ModalView, View, WriteOptions};

/// Options for one compositor pass.
#[derive(Debug, Clone, Copy, Default)]
pub struct DrawOpts {
    /// Force an immediate hardware refresh after the batched flush.
    pub refresh: bool,
    /// Leave the minibuffer region alone.
    pub skip_minibuf: bool,
}

struct ScreenState {
    surface: Box<dyn TerminalSurface>,
    stack: BufferStack,
    /// Global dirty flag: the next pass does a full draw of the top buffer
    /// instead of a status-line-only repaint.
    dirty: bool,
}

/// The screen/session layer: buffer stack, minibuffer, prompts, compositor.
pub struct Session {
    config: Config,
    screen: Mutex<ScreenState>,
    minibuf: Mutex<Minibuffer>,
    /// One reusable input line per prompt domain.
    lines: Mutex<HashMap<String, InputLine>>,
    accounts: Box<dyn AccountDirectory>,
    /// While shelled out the compositor refuses to paint.
    shelled_out: AtomicBool,
}

impl Session {
    pub fn new(surface: Box<dyn TerminalSurface>, config: Config) -> Self {
        Self::with_accounts(surface, config, Box::new(EtcPasswdAccounts))
    }

    /// Like [`Session::new`] with a custom account lookup (tests, unusual
    /// systems).
    pub fn with_accounts(
        surface: Box<dyn TerminalSurface>,
        config: Config,
        accounts: Box<dyn AccountDirectory>,
    ) -> Self {
        Self {
            config,
            screen: Mutex::new(ScreenState {
                surface,
                stack: BufferStack::new(),
                dirty: true,
            }),
            minibuf: Mutex::new(Minibuffer::new()),
            lines: Mutex::new(HashMap::new()),
            accounts,
            shelled_out: AtomicBool::new(false),
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    fn screen(&self) -> MutexGuard<'_, ScreenState> {
        self.screen.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn minibuf_state(&self) -> MutexGuard<'_, Minibuffer> {
        self.minibuf.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn poll_timeout(&self) -> Duration {
        Duration::from_millis(self.config.poll_interval_ms)
    }

    // ---- buffer stack operations -------------------------------------------

    /// Spawn a buffer around `view`. Unless `opts.hidden` it is raised and
    /// focused immediately. Returns the buffer's stable id; the realized
    /// (collision-free) title is available via [`Session::buffer_title`].
    pub fn spawn<V: View + 'static>(
        &self,
        title: &str,
        view: V,
        opts: SpawnOptions,
    ) -> Result<BufferId> {
        self.spawn_shared(title, Rc::new(RefCell::new(view)), opts)
    }

    /// [`Session::spawn`] for a view the caller keeps a handle to.
    pub fn spawn_shared(
        &self,
        title: &str,
        view: Rc<RefCell<dyn View>>,
        opts: SpawnOptions,
    ) -> Result<BufferId> {
        let mut screen = self.screen();
        let (rows, cols) = screen.surface.size();
        let id = screen.stack.spawn(title, view, opts, rows, cols);
        screen.dirty = true;
        self.draw_screen_locked(&mut screen, DrawOpts::default())?;
        Ok(id)
    }

    /// Raise the buffer with this title, or spawn one from `provider` if no
    /// such buffer exists. The provider only runs in the second case.
    pub fn spawn_unless_exists<F>(
        &self,
        title: &str,
        opts: SpawnOptions,
        provider: F,
    ) -> Result<BufferId>
    where
        F: FnOnce() -> Rc<RefCell<dyn View>>,
    {
        let mut screen = self.screen();
        let (rows, cols) = screen.surface.size();
        let id = screen
            .stack
            .spawn_unless_exists(title, opts, rows, cols, provider);
        screen.dirty = true;
        self.draw_screen_locked(&mut screen, DrawOpts::default())?;
        Ok(id)
    }

    /// Kill a buffer: cleanup hook, removal from the stack, focus handed to
    /// the new top. Fails on a dead handle.
    pub fn kill_buffer(&self, id: BufferId) -> Result<()> {
        let view = {
            let mut screen = self.screen();
            let view = screen.stack.kill(id)?;
            screen.dirty = true;
            view
        };
        // Outside the screen lock: cleanup may call back into the session.
        view.borrow_mut().cleanup();
        self.draw_screen(DrawOpts::default())
    }

    /// Kill a buffer only if its view permits it.
    pub fn kill_buffer_safely(&self, id: BufferId) -> Result<()> {
        {
            let screen = self.screen();
            let buffer = screen.stack.get(id).ok_or(Error::UnknownBuffer(id))?;
            if !buffer.view().borrow().killable() {
                return Err(Error::NotKillable(buffer.title().to_string()));
            }
        }
        self.kill_buffer(id)
    }

    /// Kill every killable buffer. Persistent views are skipped; the first
    /// non-killable, non-persistent view aborts the batch.
    pub fn kill_all_buffers_safely(&self) -> Result<()> {
        loop {
            let candidate = {
                let screen = self.screen();
                let mut found = None;
                for id in screen.stack.ids() {
                    let Some(buffer) = screen.stack.get(id) else {
                        continue;
                    };
                    let view = buffer.view().borrow();
                    if view.persistent() {
                        continue;
                    }
                    if !view.killable() {
                        return Err(Error::NotKillable(buffer.title().to_string()));
                    }
                    found = Some(id);
                    break;
                }
                found
            };
            match candidate {
                Some(id) => self.kill_buffer(id)?,
                None => return Ok(()),
            }
        }
    }

    /// Move a buffer to the top of the stack (or just below a pinned top).
    pub fn raise_to_front(&self, id: BufferId) -> Result<()> {
        let mut screen = self.screen();
        screen.stack.raise_to_front(id)?;
        screen.dirty = true;
        self.draw_screen_locked(&mut screen, DrawOpts::default())
    }

    /// Cycle forward through the stack.
    pub fn roll_buffers(&self) -> Result<()> {
        let mut screen = self.screen();
        screen.stack.roll();
        screen.dirty = true;
        self.draw_screen_locked(&mut screen, DrawOpts::default())
    }

    /// Cycle backward through the stack.
    pub fn roll_buffers_backwards(&self) -> Result<()> {
        let mut screen = self.screen();
        screen.stack.roll_backwards();
        screen.dirty = true;
        self.draw_screen_locked(&mut screen, DrawOpts::default())
    }

    pub fn buffer_count(&self) -> usize {
        self.screen().stack.len()
    }

    pub fn top_buffer(&self) -> Option<BufferId> {
        self.screen().stack.top()
    }

    pub fn focused_buffer(&self) -> Option<BufferId> {
        self.screen().stack.focused()
    }

    /// Look a buffer up by realized title; `None` is the expected-absence
    /// result, not an error.
    pub fn find_buffer(&self, title: &str) -> Option<BufferId> {
        self.screen().stack.find(title)
    }

    pub fn buffer_title(&self, id: BufferId) -> Option<String> {
        self.screen()
            .stack
            .get(id)
            .map(|buffer| buffer.title().to_string())
    }

    // ---- input routing -----------------------------------------------------

    /// Route one keystroke to the focused buffer's view. Returns whether it
    /// was consumed; a consumed keystroke triggers a compositor pass.
    pub fn handle_input(&self, key: &KeyEvent) -> Result<bool> {
        let target = {
            let screen = self.screen();
            screen
                .stack
                .focused()
                .and_then(|id| screen.stack.get(id).map(|buf| (id, buf.view().clone())))
        };
        let Some((id, view)) = target else {
            return Ok(false);
        };
        let consumed = view.borrow_mut().handle_input(key);
        if consumed {
            let mut screen = self.screen();
            if let Some(buffer) = screen.stack.get_mut(id) {
                buffer.mark_dirty();
            }
            self.draw_screen_locked(&mut screen, DrawOpts::default())?;
        }
        Ok(consumed)
    }

    /// Poll the terminal for the next key event.
    pub fn poll_key(&self) -> Result<Option<KeyEvent>> {
        let timeout = self.poll_timeout();
        let mut screen = self.screen();
        Ok(screen.surface.poll_key(timeout)?)
    }

    // ---- compositor --------------------------------------------------------

    /// One compositor pass: resize and paint the top buffer, paint the
    /// minibuffer, batched flush. No-op while shelled out.
    pub fn draw_screen(&self, opts: DrawOpts) -> Result<()> {
        if self.shelled_out.load(Ordering::Relaxed) {
            return Ok(());
        }
        let mut screen = self.screen();
        self.draw_screen_locked(&mut screen, opts)
    }

    /// The pass body, for callers already holding the screen lock.
    fn draw_screen_locked(&self, screen: &mut ScreenState, opts: DrawOpts) -> Result<()> {
        if self.shelled_out.load(Ordering::Relaxed) {
            return Ok(());
        }
        let (rows, cols) = screen.surface.size();
        let minibuf_rows = self.minibuf_state().height();
        let full_draw = screen.dirty;
        tracing::debug!(rows, cols, minibuf_rows, full_draw, "compositor pass");

        if let Some(top) = screen.stack.top() {
            let ScreenState { surface, stack, .. } = screen;
            if let Some(buffer) = stack.get_mut(top) {
                buffer.resize(rows.saturating_sub(minibuf_rows), cols);
                if full_draw {
                    buffer.draw(surface.as_mut(), &self.config.colors);
                } else {
                    buffer.redraw(surface.as_mut(), &self.config.colors);
                }
            }
        }
        if !opts.skip_minibuf {
            self.paint_minibuf_locked(screen)?;
        }
        screen.dirty = false;
        screen.surface.flush()?;
        if opts.refresh {
            screen.surface.refresh()?;
        }
        Ok(())
    }

    /// Clear the physical terminal and repaint everything. Used after
    /// external disruption, e.g. returning from a shelled-out process.
    pub fn completely_redraw_screen(&self) -> Result<()> {
        if self.shelled_out.load(Ordering::Relaxed) {
            return Ok(());
        }
        let mut screen = self.screen();
        screen.surface.clear_all()?;
        screen.dirty = true;
        self.draw_screen_locked(
            &mut screen,
            DrawOpts {
                refresh: true,
                skip_minibuf: false,
            },
        )
    }

    /// Force the next pass to be a full draw, and run it.
    fn force_redraw(&self) -> Result<()> {
        if self.shelled_out.load(Ordering::Relaxed) {
            return Ok(());
        }
        let mut screen = self.screen();
        screen.dirty = true;
        self.draw_screen_locked(&mut screen, DrawOpts::default())
    }

    fn paint_minibuf_locked(&self, screen: &mut ScreenState) -> Result<()> {
        let (rows, cols) = screen.surface.size();
        let (lines, prompt_active) = {
            let minibuf = self.minibuf_state();
            (minibuf.render_lines(), minibuf.prompt_active())
        };
        let start = rows.saturating_sub(lines.len() as u16);
        for (i, line) in lines.iter().enumerate() {
            let style = if prompt_active && i == 0 {
                self.config.colors.prompt
            } else {
                self.config.colors.text
            };
            let (clipped, used) = clip_to_width(line, cols as usize);
            let mut text = clipped.to_string();
            text.extend(std::iter::repeat(' ').take((cols as usize).saturating_sub(used)));
            screen
                .surface
                .write_at(start + i as u16, 0, &text, &style)?;
        }
        Ok(())
    }

    // ---- minibuffer messaging ----------------------------------------------

    /// Add a persistent status line. The region may have grown, so this
    /// triggers a full-screen redraw.
    pub fn say(&self, text: &str) -> Result<StatusHandle> {
        tracing::debug!(%text, "say");
        let handle = self.minibuf_state().say(text);
        self.force_redraw()?;
        Ok(handle)
    }

    /// Replace an existing status line in place; only the minibuffer region
    /// repaints.
    pub fn say_at(&self, handle: StatusHandle, text: &str) -> Result<()> {
        self.minibuf_state().say_at(handle, text);
        let mut screen = self.screen();
        self.paint_minibuf_locked(&mut screen)?;
        screen.surface.flush()?;
        Ok(())
    }

    /// [`Session::say`] scoped to a closure: the handle is cleared when the
    /// closure finishes, however it finishes.
    pub fn say_scoped<R>(&self, text: &str, f: impl FnOnce() -> R) -> Result<R> {
        struct ClearOnDrop<'a> {
            session: &'a Session,
            handle: StatusHandle,
        }
        impl Drop for ClearOnDrop<'_> {
            fn drop(&mut self) {
                let _ = self.session.clear(self.handle);
            }
        }
        let handle = self.say(text)?;
        let _guard = ClearOnDrop {
            session: self,
            handle,
        };
        Ok(f())
    }

    /// Drop a status line. The region may have shrunk, so this triggers a
    /// full-screen redraw.
    pub fn clear(&self, handle: StatusHandle) -> Result<()> {
        self.minibuf_state().clear(handle);
        self.force_redraw()
    }

    /// Set the transient flashed message and redraw.
    pub fn flash(&self, text: &str) -> Result<()> {
        tracing::debug!(%text, "flash");
        self.minibuf_state().flash(text);
        self.force_redraw()
    }

    /// Drop the flash without repainting; the next natural redraw omits it.
    pub fn erase_flash(&self) {
        self.minibuf_state().erase_flash();
    }

    /// Rendered minibuffer height in rows (always at least one).
    pub fn minibuf_height(&self) -> u16 {
        self.minibuf_state().height()
    }

    // ---- modal loop --------------------------------------------------------

    /// Spawn `view` and run a nested blocking input loop until it reports
    /// completion or the user cancels with Esc. The buffer is killed on the
    /// way out and the view's result value returned.
    pub fn run_modal<V>(&self, title: &str, view: V, opts: SpawnOptions) -> Result<V::Output>
    where
        V: ModalView + 'static,
    {
        let shared = Rc::new(RefCell::new(view));
        let id = self.spawn_shared(title, shared.clone(), opts)?;
        tracing::info!(title, "entering modal loop");

        let timeout = self.poll_timeout();
        loop {
            if shared.borrow().is_done() {
                break;
            }
            let key = {
                let mut screen = self.screen();
                screen.surface.poll_key(timeout)?
            };
            let Some(key) = key else { continue };
            if key.code == KeyCode::Esc {
                break;
            }
            shared.borrow_mut().handle_input(&key);
            let mut screen = self.screen();
            if let Some(buffer) = screen.stack.get_mut(id) {
                buffer.mark_dirty();
            }
            self.draw_screen_locked(&mut screen, DrawOpts::default())?;
        }

        let value = shared.borrow_mut().take_value();
        self.kill_buffer(id)?;
        tracing::info!(title, "modal loop finished");
        Ok(value)
    }

    // ---- prompt sessions ---------------------------------------------------

    /// Ask a question and block until the user answers or cancels.
    /// `Ok(None)` is cancellation; starting a second session while one is
    /// active fails with [`Error::PromptActive`].
    pub fn ask(&self, domain: &str, question: &str, default: Option<&str>) -> Result<Option<String>> {
        self.ask_impl(domain, question, default, None)
    }

    /// [`Session::ask`] with live completion. Tab fills the longest common
    /// prefix and opens a completion-list buffer; a second Tab cycles its
    /// selection.
    pub fn ask_with_completion(
        &self,
        domain: &str,
        question: &str,
        default: Option<&str>,
        provider: &dyn Fn(&str) -> Vec<Candidate>,
    ) -> Result<Option<String>> {
        self.ask_impl(domain, question, default, Some(provider))
    }

    /// Ask for a path with filename completion (`~name` expansion included).
    /// The answer comes back tilde-expanded.
    pub fn ask_for_filename(
        &self,
        domain: &str,
        question: &str,
        default: Option<&str>,
    ) -> Result<Option<PathBuf>> {
        let provider = |text: &str| complete_path(text, self.accounts.as_ref());
        Ok(self
            .ask_impl(domain, question, default, Some(&provider))?
            .map(|answer| expand_tilde(&answer, self.accounts.as_ref())))
    }

    /// Ask for one or more paths. An empty or directory answer opens the
    /// directory browser instead; cancellation yields an empty list.
    pub fn ask_for_filenames(
        &self,
        domain: &str,
        question: &str,
        default_dir: &Path,
    ) -> Result<Vec<PathBuf>> {
        let provider = |text: &str| complete_path(text, self.accounts.as_ref());
        let Some(answer) = self.ask_impl(domain, question, None, Some(&provider))? else {
            return Ok(Vec::new());
        };
        if answer.trim().is_empty() {
            return self.browse_directory(default_dir.to_path_buf());
        }
        let expanded = expand_tilde(&answer, self.accounts.as_ref());
        if expanded.is_dir() {
            return self.browse_directory(expanded);
        }
        Ok(vec![expanded])
    }

    fn browse_directory(&self, dir: PathBuf) -> Result<Vec<PathBuf>> {
        self.run_modal("file browser", DirBrowser::new(dir), SpawnOptions::default())
    }

    fn ask_impl(
        &self,
        domain: &str,
        question: &str,
        default: Option<&str>,
        provider: Option<&dyn Fn(&str) -> Vec<Candidate>>,
    ) -> Result<Option<String>> {
        {
            let mut minibuf = self.minibuf_state();
            if minibuf.prompt_active() {
                return Err(Error::PromptActive);
            }
            minibuf.set_prompt_line(Some(question.to_string()));
        }
        tracing::info!(domain, question, "prompt session started");

        let mut line = {
            let mut lines = self.lines.lock().unwrap_or_else(|e| e.into_inner());
            lines.remove(domain).unwrap_or_else(InputLine::new)
        };
        line.activate(default);

        // The prompt line changed the minibuffer height; repaint everything,
        // then park the cursor at the end of the seeded text.
        self.force_redraw()?;
        {
            let mut screen = self.screen();
            screen.surface.set_cursor_visible(true)?;
        }

        let mut shown: Option<ShownCompletions> = None;
        let timeout = self.poll_timeout();
        let accepted = loop {
            self.paint_prompt(question, &line)?;
            let key = {
                let mut screen = self.screen();
                screen.surface.poll_key(timeout)?
            };
            let Some(key) = key else { continue };
            match line.handle_key(&key) {
                LineOutcome::Accept => break Some(line.text().to_string()),
                LineOutcome::Cancel => break None,
                LineOutcome::Edited => {
                    if let Some(provider) = provider {
                        // The edit invalidated whatever candidates are on
                        // screen; an unopened list stays closed.
                        if shown.is_some() {
                            self.refresh_completions(provider, &mut line, &mut shown, false)?;
                        }
                    }
                }
                LineOutcome::Cycle => {
                    if let Some(provider) = provider {
                        if let Some(current) = shown.as_ref() {
                            current.list.borrow_mut().advance();
                            let mut screen = self.screen();
                            if let Some(buffer) = screen.stack.get_mut(current.buffer) {
                                buffer.mark_dirty();
                            }
                            self.draw_screen_locked(&mut screen, DrawOpts::default())?;
                        } else {
                            self.refresh_completions(provider, &mut line, &mut shown, true)?;
                        }
                    }
                }
                LineOutcome::Moved | LineOutcome::Ignored => {}
            }
        };

        if let Some(current) = shown.take() {
            self.kill_buffer(current.buffer)?;
        }
        self.minibuf_state().set_prompt_line(None);
        line.deactivate(accepted.is_some());
        {
            let mut lines = self.lines.lock().unwrap_or_else(|e| e.into_inner());
            lines.insert(domain.to_string(), line);
        }
        {
            let mut screen = self.screen();
            screen.surface.set_cursor_visible(false)?;
        }
        self.force_redraw()?;
        tracing::info!(domain, accepted = accepted.is_some(), "prompt session ended");
        Ok(accepted)
    }

    /// Repaint the minibuffer region with the current prompt content and
    /// park the terminal cursor at the input cursor.
    fn paint_prompt(&self, question: &str, line: &InputLine) -> Result<()> {
        self.minibuf_state()
            .set_prompt_line(Some(format!("{question}{}", line.text())));
        let mut screen = self.screen();
        self.paint_minibuf_locked(&mut screen)?;
        let (rows, cols) = screen.surface.size();
        let height = self.minibuf_state().height();
        let row = rows.saturating_sub(height);
        let col = (question.width() as u16 + line.cursor_col()).min(cols.saturating_sub(1));
        screen.surface.move_cursor(row, col)?;
        screen.surface.flush()?;
        Ok(())
    }

    /// Re-run the provider and reconcile the completion-list buffer: kill a
    /// stale list, spawn a fresh one, or leave an identical one in place. On
    /// the first request the longest common prefix is filled into the line
    /// first, and a sole candidate is taken outright.
    fn refresh_completions(
        &self,
        provider: &dyn Fn(&str) -> Vec<Candidate>,
        line: &mut InputLine,
        shown: &mut Option<ShownCompletions>,
        first_request: bool,
    ) -> Result<()> {
        let candidates = provider(line.text());
        tracing::debug!(count = candidates.len(), first_request, "completions");

        if let Some(current) = shown.as_ref() {
            if current.candidates == candidates {
                return Ok(());
            }
            let stale = current.buffer;
            *shown = None;
            self.kill_buffer(stale)?;
        }
        if candidates.is_empty() {
            return Ok(());
        }
        if first_request {
            if let Some(prefix) = common_prefix(&candidates) {
                if prefix.len() > line.text().len() {
                    line.set_text(&prefix);
                }
            }
            if candidates.len() == 1 {
                line.set_text(&candidates[0].value);
                return Ok(());
            }
        }

        let labels: Vec<String> = candidates.iter().map(|c| c.label.clone()).collect();
        let list = Rc::new(RefCell::new(CompletionList::new(labels)));
        let height = candidates
            .len()
            .min(self.config.completion_rows as usize) as u16
            + 1;
        let buffer = self.spawn_shared(
            "completions",
            list.clone(),
            SpawnOptions {
                height: Some(height),
                ..SpawnOptions::default()
            },
        )?;
        *shown = Some(ShownCompletions {
            buffer,
            list,
            candidates,
        });
        Ok(())
    }

    // ---- single-keystroke dialogs ------------------------------------------

    /// Flash a question and block for one keystroke. With an accepted set,
    /// other keys are ignored and polling continues; Esc always cancels.
    pub fn ask_getch(
        &self,
        question: &str,
        accepted: Option<&[char]>,
    ) -> Result<Option<KeyEvent>> {
        self.flash(question)?;
        {
            let mut screen = self.screen();
            screen.surface.set_cursor_visible(true)?;
            screen.surface.flush()?;
        }

        let timeout = self.poll_timeout();
        let answer = loop {
            let key = {
                let mut screen = self.screen();
                screen.surface.poll_key(timeout)?
            };
            let Some(key) = key else { continue };
            if key.code == KeyCode::Esc {
                break None;
            }
            match accepted {
                None => break Some(key),
                Some(set) => {
                    if let KeyCode::Char(c) = key.code {
                        if set.contains(&c) {
                            break Some(key);
                        }
                    }
                }
            }
        };

        {
            let mut screen = self.screen();
            screen.surface.set_cursor_visible(false)?;
        }
        self.erase_flash();
        self.force_redraw()?;
        Ok(answer)
    }

    /// `y`/`Y` → true, Esc → `None`, any other accepted key → false.
    pub fn ask_yes_or_no(&self, question: &str) -> Result<Option<bool>> {
        Ok(self
            .ask_getch(question, Some(&['y', 'n', 'Y', 'N']))?
            .map(|key| matches!(key.code, KeyCode::Char('y') | KeyCode::Char('Y'))))
    }

    // ---- shelling out ------------------------------------------------------

    /// Hand the terminal to an external command and wait for it. The
    /// compositor refuses to paint while the command runs; afterwards the
    /// screen is cleared and fully repainted. Returns whether the command
    /// exited successfully (its output is not inspected).
    pub fn shell_out(&self, command: &str) -> Result<bool> {
        tracing::info!(command, "shelling out");
        self.shelled_out.store(true, Ordering::Relaxed);
        {
            let mut screen = self.screen();
            screen.surface.suspend()?;
        }

        let status = Command::new(detect_shell()).arg("-c").arg(command).status();

        {
            let mut screen = self.screen();
            screen.surface.resume()?;
        }
        self.shelled_out.store(false, Ordering::Relaxed);
        self.completely_redraw_screen()?;

        match status {
            Ok(status) => {
                tracing::info!(success = status.success(), "shelled-out command finished");
                Ok(status.success())
            }
            Err(err) => {
                tracing::error!(%err, "failed to spawn shell");
                Err(err.into())
            }
        }
    }
}

/// The transient completion-list buffer's bookkeeping during a prompt
/// session.
struct ShownCompletions {
    buffer: BufferId,
    list: Rc<RefCell<CompletionList>>,
    candidates: Vec<Candidate>,
}

/// Internal view listing completion labels; Tab advances the selection.
struct CompletionList {
    labels: Vec<String>,
    selected: usize,
    scroll: usize,
}

impl CompletionList {
    fn new(labels: Vec<String>) -> Self {
        Self {
            labels,
            selected: 0,
            scroll: 0,
        }
    }

    fn advance(&mut self) {
        if !self.labels.is_empty() {
            self.selected = (self.selected + 1) % self.labels.len();
        }
    }
}

impl View for CompletionList {
    fn name(&self) -> &str {
        "completions"
    }

    fn status(&self) -> String {
        format!("{} candidates", self.labels.len())
    }

    fn draw(&mut self, frame: &mut Frame<'_>) {
        let visible = frame.rows() as usize;
        if visible == 0 {
            return;
        }
        if self.selected < self.scroll {
            self.scroll = self.selected;
        } else if self.selected >= self.scroll + visible {
            self.scroll = self.selected + 1 - visible;
        }
        for row in 0..visible {
            let idx = self.scroll + row;
            let Some(label) = self.labels.get(idx) else {
                frame.clear_row(row as u16);
                continue;
            };
            let style = if idx == self.selected {
                frame.colors().selection
            } else {
                frame.colors().text
            };
            frame.write(row as u16, 0, label, &WriteOptions::styled(style));
        }
    }
}

/// Pick the shell for `shell_out`: `$SHELL`, then the usual suspects.
fn detect_shell() -> String {
    if let Ok(shell) = std::env::var("SHELL") {
        if !shell.is_empty() {
            return shell;
        }
    }
    for candidate in ["/bin/bash", "/bin/sh"] {
        if Path::new(candidate).exists() {
            return candidate.to_string();
        }
    }
    "sh".to_string()
}
