// Common test utilities: a session harness over the in-memory surface and a
// few canned views.

#![allow(dead_code)]

use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::path::PathBuf;
use std::rc::Rc;

use bufstack::{
    AccountDirectory, Config, Frame, Session, TestSurface, View, WriteOptions,
};
use crossterm::event::KeyEvent;

/// Account lookup fixture: a couple of fixed names, no filesystem access.
#[derive(Default)]
pub struct FakeAccounts(pub HashMap<String, PathBuf>);

impl FakeAccounts {
    pub fn with(entries: &[(&str, &str)]) -> Self {
        Self(
            entries
                .iter()
                .map(|(name, home)| (name.to_string(), PathBuf::from(home)))
                .collect(),
        )
    }
}

impl AccountDirectory for FakeAccounts {
    fn account_names(&self) -> Vec<String> {
        self.0.keys().cloned().collect()
    }

    fn home_dir(&self, name: &str) -> Option<PathBuf> {
        self.0.get(name).cloned()
    }
}

/// A view that fills its first row with a body string and records its
/// lifecycle, for asserting on cleanup counts and key routing.
pub struct TestView {
    pub label: String,
    pub body: String,
    pub killable: bool,
    pub persistent: bool,
    pub cleanups: Rc<Cell<usize>>,
    pub seen_keys: Rc<RefCell<Vec<KeyEvent>>>,
}

impl TestView {
    pub fn new(label: &str, body: &str) -> Self {
        Self {
            label: label.to_string(),
            body: body.to_string(),
            killable: true,
            persistent: false,
            cleanups: Rc::new(Cell::new(0)),
            seen_keys: Rc::new(RefCell::new(Vec::new())),
        }
    }

    pub fn unkillable(mut self) -> Self {
        self.killable = false;
        self
    }

    pub fn persistent(mut self) -> Self {
        self.persistent = true;
        self
    }

    pub fn cleanup_counter(&self) -> Rc<Cell<usize>> {
        self.cleanups.clone()
    }

    pub fn key_log(&self) -> Rc<RefCell<Vec<KeyEvent>>> {
        self.seen_keys.clone()
    }
}

impl View for TestView {
    fn name(&self) -> &str {
        &self.label
    }

    fn draw(&mut self, frame: &mut Frame<'_>) {
        frame.write(0, 0, &self.body, &WriteOptions::default());
        for row in 1..frame.rows() {
            frame.clear_row(row);
        }
    }

    fn handle_input(&mut self, key: &KeyEvent) -> bool {
        self.seen_keys.borrow_mut().push(*key);
        true
    }

    fn cleanup(&mut self) {
        self.cleanups.set(self.cleanups.get() + 1);
    }

    fn killable(&self) -> bool {
        self.killable
    }

    fn persistent(&self) -> bool {
        self.persistent
    }
}

/// A session over a scripted [`TestSurface`], with the surface handle kept
/// for inspection.
pub struct SessionHarness {
    pub surface: TestSurface,
    pub session: Session,
}

impl SessionHarness {
    pub fn new(rows: u16, cols: u16) -> Self {
        Self::with_accounts(rows, cols, FakeAccounts::default())
    }

    pub fn with_accounts(rows: u16, cols: u16, accounts: FakeAccounts) -> Self {
        let surface = TestSurface::new(rows, cols);
        let session = Session::with_accounts(
            Box::new(surface.clone()),
            Config::default(),
            Box::new(accounts),
        );
        Self { surface, session }
    }

    pub fn assert_screen_contains(&self, needle: &str) {
        assert!(
            self.surface.contains(needle),
            "expected {needle:?} on screen:\n{}",
            self.surface.screen_to_string()
        );
    }

    pub fn assert_screen_not_contains(&self, needle: &str) {
        assert!(
            !self.surface.contains(needle),
            "expected {needle:?} to be absent from screen:\n{}",
            self.surface.screen_to_string()
        );
    }
}
