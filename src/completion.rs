//! Completion candidates and the filename completion policy.
//!
//! A completion provider is any `Fn(&str) -> Vec<Candidate>`: given the
//! current input text it returns a ranked list of candidates, each carrying
//! the full replacement value and a short display label. The filename
//! provider here handles the two interesting cases — leading `~name` account
//! expansion and prefix-based directory listing — on top of the
//! [`AccountDirectory`] OS collaborator.

use std::fs;
use std::path::{Path, PathBuf};

/// One completion candidate: the full value the input becomes when the
/// candidate is taken, and the short label shown in the completion list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Candidate {
    pub value: String,
    pub label: String,
}

impl Candidate {
    pub fn new(value: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            label: label.into(),
        }
    }
}

/// User-account lookup for `~name` expansion. Lookup misses are expected
/// absences, not errors.
pub trait AccountDirectory {
    /// All local account names.
    fn account_names(&self) -> Vec<String>;

    /// The home directory of one account, if it exists.
    fn home_dir(&self, name: &str) -> Option<PathBuf>;
}

/// Production account lookup backed by the system account database.
#[derive(Debug, Default)]
pub struct EtcPasswdAccounts;

impl AccountDirectory for EtcPasswdAccounts {
    fn account_names(&self) -> Vec<String> {
        let Ok(contents) = fs::read_to_string("/etc/passwd") else {
            return Vec::new();
        };
        contents
            .lines()
            .filter_map(|line| line.split(':').next())
            .filter(|name| !name.is_empty())
            .map(String::from)
            .collect()
    }

    fn home_dir(&self, name: &str) -> Option<PathBuf> {
        let contents = fs::read_to_string("/etc/passwd").ok()?;
        for line in contents.lines() {
            let mut fields = line.split(':');
            if fields.next() == Some(name) {
                return fields.nth(4).map(PathBuf::from);
            }
        }
        None
    }
}

/// Expand a leading `~` or `~name` to the corresponding home directory.
/// Unresolvable names come back unchanged.
pub fn expand_tilde(text: &str, accounts: &dyn AccountDirectory) -> PathBuf {
    let Some(rest) = text.strip_prefix('~') else {
        return PathBuf::from(text);
    };
    let (name, tail) = match rest.find('/') {
        Some(idx) => (&rest[..idx], &rest[idx + 1..]),
        None => (rest, ""),
    };
    let home = if name.is_empty() {
        dirs::home_dir()
    } else {
        accounts.home_dir(name)
    };
    match home {
        Some(home) if tail.is_empty() => home,
        Some(home) => home.join(tail),
        None => PathBuf::from(text),
    }
}

/// The filename completion policy: `~name` prefixes complete against account
/// names; everything else is a prefix listing of the containing directory,
/// with a trailing separator appended to directory entries.
pub fn complete_path(text: &str, accounts: &dyn AccountDirectory) -> Vec<Candidate> {
    if let Some(rest) = text.strip_prefix('~') {
        if !rest.contains('/') {
            return complete_account(rest, accounts);
        }
        // `~name/partial` expands the home and completes inside it.
        let expanded = expand_tilde(text, accounts);
        return complete_listing(&expanded.to_string_lossy());
    }
    complete_listing(text)
}

fn complete_account(prefix: &str, accounts: &dyn AccountDirectory) -> Vec<Candidate> {
    let mut names: Vec<String> = accounts
        .account_names()
        .into_iter()
        .filter(|name| name.starts_with(prefix))
        .collect();
    names.sort();
    names
        .into_iter()
        .map(|name| Candidate::new(format!("~{name}/"), format!("~{name}")))
        .collect()
}

fn complete_listing(text: &str) -> Vec<Candidate> {
    let (dir, prefix) = match text.rfind('/') {
        Some(idx) => (&text[..idx + 1], &text[idx + 1..]),
        None => ("", text),
    };
    let list_in: &Path = if dir.is_empty() { Path::new(".") } else { Path::new(dir) };
    let Ok(entries) = fs::read_dir(list_in) else {
        return Vec::new();
    };

    let mut matches: Vec<(String, bool)> = entries
        .filter_map(|entry| entry.ok())
        .filter_map(|entry| {
            let name = entry.file_name().to_string_lossy().into_owned();
            if !name.starts_with(prefix) {
                return None;
            }
            let is_dir = entry.file_type().map(|t| t.is_dir()).unwrap_or(false);
            Some((name, is_dir))
        })
        .collect();
    matches.sort();

    matches
        .into_iter()
        .map(|(name, is_dir)| {
            let sep = if is_dir { "/" } else { "" };
            Candidate::new(format!("{dir}{name}{sep}"), format!("{name}{sep}"))
        })
        .collect()
}

/// The longest common prefix of all candidate values; used to fill the input
/// line on the first completion request.
pub(crate) fn common_prefix(candidates: &[Candidate]) -> Option<String> {
    let first = &candidates.first()?.value;
    let mut end = first.len();
    for candidate in &candidates[1..] {
        let shared = first[..end]
            .char_indices()
            .take_while(|&(idx, c)| candidate.value[idx..].chars().next() == Some(c))
            .last()
            .map_or(0, |(idx, c)| idx + c.len_utf8());
        end = end.min(shared);
    }
    Some(first[..end].to_string())
}
