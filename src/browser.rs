//! Built-in directory-browsing modal view.
//!
//! `ask_for_filenames` falls back to this when the typed answer is empty or
//! names a directory. Directories sort first and carry a trailing separator;
//! Enter descends into a directory or accepts a single file, `m` toggles a
//! mark, `A` accepts everything marked.

use std::fs;
use std::path::{Path, PathBuf};

use crossterm::event::{KeyCode, KeyEvent};

use crate::view::{Frame, ModalView, View, WriteOptions};

#[derive(Debug, Clone)]
struct Entry {
    name: String,
    path: PathBuf,
    is_dir: bool,
}

/// A modal directory listing yielding the selected paths.
pub struct DirBrowser {
    dir: PathBuf,
    entries: Vec<Entry>,
    selected: usize,
    scroll: usize,
    marked: Vec<PathBuf>,
    accepted: Vec<PathBuf>,
    done: bool,
    rows: u16,
}

impl DirBrowser {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        let dir = dir.into();
        let entries = read_entries(&dir);
        Self {
            dir,
            entries,
            selected: 0,
            scroll: 0,
            marked: Vec::new(),
            accepted: Vec::new(),
            done: false,
            rows: 0,
        }
    }

    /// The directory currently listed.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn descend(&mut self, dir: PathBuf) {
        tracing::debug!(dir = %dir.display(), "descending into directory");
        self.entries = read_entries(&dir);
        self.dir = dir;
        self.selected = 0;
        self.scroll = 0;
    }

    fn keep_selection_visible(&mut self) {
        let visible = self.rows.max(1) as usize;
        if self.selected < self.scroll {
            self.scroll = self.selected;
        } else if self.selected >= self.scroll + visible {
            self.scroll = self.selected + 1 - visible;
        }
    }
}

fn read_entries(dir: &Path) -> Vec<Entry> {
    let mut entries: Vec<Entry> = match fs::read_dir(dir) {
        Ok(listing) => listing
            .filter_map(|entry| entry.ok())
            .map(|entry| {
                let is_dir = entry.file_type().map(|t| t.is_dir()).unwrap_or(false);
                Entry {
                    name: entry.file_name().to_string_lossy().into_owned(),
                    path: entry.path(),
                    is_dir,
                }
            })
            .collect(),
        Err(err) => {
            tracing::warn!(dir = %dir.display(), %err, "failed to list directory");
            Vec::new()
        }
    };
    entries.sort_by(|a, b| b.is_dir.cmp(&a.is_dir).then(a.name.cmp(&b.name)));
    // ".." first, so there is always a way up.
    if let Some(parent) = dir.parent() {
        entries.insert(
            0,
            Entry {
                name: "..".into(),
                path: parent.to_path_buf(),
                is_dir: true,
            },
        );
    }
    entries
}

impl View for DirBrowser {
    fn name(&self) -> &str {
        "dir-browser"
    }

    fn status(&self) -> String {
        format!("{} ({} marked)", self.dir.display(), self.marked.len())
    }

    fn draw(&mut self, frame: &mut Frame<'_>) {
        self.rows = frame.rows();
        self.keep_selection_visible();
        let visible = frame.rows() as usize;
        for row in 0..visible {
            let idx = self.scroll + row;
            let Some(entry) = self.entries.get(idx) else {
                frame.clear_row(row as u16);
                continue;
            };
            let mark = if self.marked.contains(&entry.path) {
                '*'
            } else {
                ' '
            };
            let sep = if entry.is_dir { "/" } else { "" };
            let line = format!("{mark} {}{sep}", entry.name);
            let style = if idx == self.selected {
                frame.colors().selection
            } else {
                frame.colors().text
            };
            frame.write(row as u16, 0, &line, &WriteOptions::styled(style));
        }
    }

    fn resize(&mut self, rows: u16, _cols: u16) {
        self.rows = rows;
    }

    fn handle_input(&mut self, key: &KeyEvent) -> bool {
        match key.code {
            KeyCode::Up => {
                self.selected = self.selected.saturating_sub(1);
                true
            }
            KeyCode::Down => {
                if self.selected + 1 < self.entries.len() {
                    self.selected += 1;
                }
                true
            }
            KeyCode::Enter => {
                let Some(entry) = self.entries.get(self.selected).cloned() else {
                    return true;
                };
                if entry.is_dir {
                    self.descend(entry.path);
                } else {
                    self.accepted = vec![entry.path];
                    self.done = true;
                }
                true
            }
            KeyCode::Char('m') => {
                let Some(entry) = self.entries.get(self.selected) else {
                    return true;
                };
                if entry.name == ".." {
                    return true;
                }
                if let Some(pos) = self.marked.iter().position(|p| p == &entry.path) {
                    self.marked.remove(pos);
                } else {
                    self.marked.push(entry.path.clone());
                }
                true
            }
            KeyCode::Char('A') => {
                self.accepted = std::mem::take(&mut self.marked);
                self.done = true;
                true
            }
            _ => false,
        }
    }
}

impl ModalView for DirBrowser {
    type Output = Vec<PathBuf>;

    fn is_done(&self) -> bool {
        self.done
    }

    fn take_value(&mut self) -> Vec<PathBuf> {
        std::mem::take(&mut self.accepted)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::KeyModifiers;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn fixture() -> tempfile::TempDir {
        let tmp = tempfile::tempdir().unwrap();
        fs::create_dir(tmp.path().join("sub")).unwrap();
        fs::write(tmp.path().join("b.txt"), "").unwrap();
        fs::write(tmp.path().join("a.txt"), "").unwrap();
        tmp
    }

    #[test]
    fn entries_sort_directories_first() {
        let tmp = fixture();
        let browser = DirBrowser::new(tmp.path());
        let names: Vec<_> = browser.entries.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, vec!["..", "sub", "a.txt", "b.txt"]);
    }

    #[test]
    fn enter_on_file_accepts_it() {
        let tmp = fixture();
        let mut browser = DirBrowser::new(tmp.path());
        browser.handle_input(&key(KeyCode::Down));
        browser.handle_input(&key(KeyCode::Down));
        browser.handle_input(&key(KeyCode::Enter));
        assert!(browser.is_done());
        assert_eq!(browser.take_value(), vec![tmp.path().join("a.txt")]);
    }

    #[test]
    fn enter_on_directory_descends() {
        let tmp = fixture();
        let mut browser = DirBrowser::new(tmp.path());
        browser.handle_input(&key(KeyCode::Down));
        browser.handle_input(&key(KeyCode::Enter));
        assert!(!browser.is_done());
        assert_eq!(browser.dir(), tmp.path().join("sub"));
    }

    #[test]
    fn marks_accumulate_and_accept_in_order() {
        let tmp = fixture();
        let mut browser = DirBrowser::new(tmp.path());
        browser.handle_input(&key(KeyCode::Down));
        browser.handle_input(&key(KeyCode::Down));
        browser.handle_input(&key(KeyCode::Char('m')));
        browser.handle_input(&key(KeyCode::Down));
        browser.handle_input(&key(KeyCode::Char('m')));
        browser.handle_input(&key(KeyCode::Char('A')));
        assert!(browser.is_done());
        assert_eq!(
            browser.take_value(),
            vec![tmp.path().join("a.txt"), tmp.path().join("b.txt")]
        );
    }

    #[test]
    fn mark_toggles_off() {
        let tmp = fixture();
        let mut browser = DirBrowser::new(tmp.path());
        browser.handle_input(&key(KeyCode::Down));
        browser.handle_input(&key(KeyCode::Down));
        browser.handle_input(&key(KeyCode::Char('m')));
        browser.handle_input(&key(KeyCode::Char('m')));
        browser.handle_input(&key(KeyCode::Char('A')));
        assert_eq!(browser.take_value(), Vec::<PathBuf>::new());
    }

    #[test]
    fn cancelled_browser_yields_nothing() {
        let tmp = fixture();
        let mut browser = DirBrowser::new(tmp.path());
        browser.handle_input(&key(KeyCode::Char('m')));
        assert_eq!(browser.take_value(), Vec::<PathBuf>::new());
    }
}
