//! Prompt sessions end-to-end over a scripted surface: editing, completion,
//! cancellation, single-keystroke dialogs.

mod common;

use std::cell::RefCell;

use bufstack::{Candidate, Error};
use common::{FakeAccounts, SessionHarness};
use crossterm::event::{KeyCode, KeyModifiers};

#[test]
fn ask_returns_the_typed_answer() {
    let h = SessionHarness::new(12, 60);
    h.surface.push_text("hello");
    h.surface.push_key(KeyCode::Enter, KeyModifiers::NONE);

    let answer = h.session.ask("search", "Find: ", None).unwrap();
    assert_eq!(answer.as_deref(), Some("hello"));
    // The prompt line is gone and the cursor is hidden again.
    h.assert_screen_not_contains("Find: ");
    assert!(!h.surface.cursor_visible());
}

#[test]
fn ask_edits_before_accepting() {
    let h = SessionHarness::new(12, 60);
    h.surface.push_text("hxi");
    h.surface.push_key(KeyCode::Left, KeyModifiers::NONE);
    h.surface.push_key(KeyCode::Backspace, KeyModifiers::NONE);
    h.surface.push_key(KeyCode::Enter, KeyModifiers::NONE);

    let answer = h.session.ask("search", "Find: ", None).unwrap();
    assert_eq!(answer.as_deref(), Some("hi"));
}

#[test]
fn ask_seeds_the_default_value() {
    let h = SessionHarness::new(12, 60);
    h.surface.push_key(KeyCode::Enter, KeyModifiers::NONE);
    let answer = h.session.ask("search", "Find: ", Some("previous")).unwrap();
    assert_eq!(answer.as_deref(), Some("previous"));
}

#[test]
fn cancelled_ask_returns_none() {
    let h = SessionHarness::new(12, 60);
    h.surface.push_text("typed");
    h.surface.push_key(KeyCode::Esc, KeyModifiers::NONE);
    let answer = h.session.ask("search", "Find: ", None).unwrap();
    assert_eq!(answer, None);
}

#[test]
fn poll_timeouts_keep_the_session_alive() {
    let h = SessionHarness::new(12, 60);
    h.surface.push_empty_poll();
    h.surface.push_text("ok");
    h.surface.push_empty_poll();
    h.surface.push_key(KeyCode::Enter, KeyModifiers::NONE);
    let answer = h.session.ask("search", "Find: ", None).unwrap();
    assert_eq!(answer.as_deref(), Some("ok"));
}

#[test]
fn prompt_line_shows_question_and_input() {
    let h = SessionHarness::new(12, 60);
    let seen = RefCell::new(Vec::new());
    let provider = |text: &str| {
        // Runs mid-session: the prompt row shows question plus input and the
        // cursor is parked on it.
        seen.borrow_mut().push(h.surface.row_text(11));
        assert!(h.surface.cursor_visible());
        assert_eq!(h.surface.cursor().0, 11);
        let _ = text;
        Vec::new()
    };
    h.surface.push_text("abc");
    h.surface.push_key(KeyCode::Tab, KeyModifiers::NONE);
    h.surface.push_key(KeyCode::Enter, KeyModifiers::NONE);
    h.session
        .ask_with_completion("search", "Find: ", None, &provider)
        .unwrap();
    let rows = seen.borrow();
    assert_eq!(rows.len(), 1);
    assert!(rows[0].starts_with("Find: abc"));
}

#[test]
fn tab_fills_common_prefix_and_lists_candidates() {
    let h = SessionHarness::new(16, 60);
    let live_list = RefCell::new(false);
    let provider = |text: &str| {
        if h.session.find_buffer("completions").is_some() {
            *live_list.borrow_mut() = true;
        }
        ["alpha", "alto"]
            .iter()
            .filter(|value| value.starts_with(text))
            .map(|value| Candidate::new(*value, format!("{value}*")))
            .collect()
    };

    h.surface.push_text("a");
    h.surface.push_key(KeyCode::Tab, KeyModifiers::NONE); // fill "al", open list
    h.surface.push_text("p");
    h.surface.push_key(KeyCode::Tab, KeyModifiers::NONE); // cycle the refreshed list
    h.surface.push_key(KeyCode::Enter, KeyModifiers::NONE);

    let answer = h
        .session
        .ask_with_completion("word", "Word: ", None, &provider)
        .unwrap();
    assert_eq!(answer.as_deref(), Some("alp"));
    assert!(
        *live_list.borrow(),
        "the candidate list buffer existed while the session ran"
    );
    // The transient list is killed with the session.
    assert_eq!(h.session.find_buffer("completions"), None);
    assert_eq!(h.session.buffer_count(), 0);
}

#[test]
fn sole_candidate_is_taken_outright() {
    let h = SessionHarness::new(12, 60);
    let provider =
        |_: &str| vec![Candidate::new("inbox/drafts", "drafts")];
    h.surface.push_text("inb");
    h.surface.push_key(KeyCode::Tab, KeyModifiers::NONE);
    h.surface.push_key(KeyCode::Enter, KeyModifiers::NONE);
    let answer = h
        .session
        .ask_with_completion("path", "Path: ", None, &provider)
        .unwrap();
    assert_eq!(answer.as_deref(), Some("inbox/drafts"));
    assert_eq!(h.session.find_buffer("completions"), None);
}

#[test]
fn second_concurrent_session_fails_fast() {
    let h = SessionHarness::new(12, 60);
    let nested_error = RefCell::new(None);
    let provider = |_: &str| {
        let err = h.session.ask("other", "Nested? ", None).unwrap_err();
        *nested_error.borrow_mut() = Some(err);
        Vec::new()
    };
    h.surface.push_key(KeyCode::Tab, KeyModifiers::NONE);
    h.surface.push_key(KeyCode::Enter, KeyModifiers::NONE);
    h.session
        .ask_with_completion("outer", "Outer: ", None, &provider)
        .unwrap();
    assert!(matches!(
        nested_error.borrow().as_ref(),
        Some(Error::PromptActive)
    ));
}

#[test]
fn domain_history_is_reachable_with_up() {
    let h = SessionHarness::new(12, 60);
    h.surface.push_text("first answer");
    h.surface.push_key(KeyCode::Enter, KeyModifiers::NONE);
    h.session.ask("search", "Find: ", None).unwrap();

    h.surface.push_key(KeyCode::Up, KeyModifiers::NONE);
    h.surface.push_key(KeyCode::Enter, KeyModifiers::NONE);
    let answer = h.session.ask("search", "Find: ", Some("")).unwrap();
    assert_eq!(answer.as_deref(), Some("first answer"));
}

#[test]
fn ask_getch_takes_any_key_without_a_set() {
    let h = SessionHarness::new(12, 60);
    h.surface.push_key(KeyCode::Char('q'), KeyModifiers::NONE);
    let key = h.session.ask_getch("Press any key", None).unwrap();
    assert_eq!(key.map(|k| k.code), Some(KeyCode::Char('q')));
    assert!(!h.surface.cursor_visible());
}

#[test]
fn ask_getch_ignores_keys_outside_the_accepted_set() {
    let h = SessionHarness::new(12, 60);
    h.surface.push_key(KeyCode::Char('x'), KeyModifiers::NONE);
    h.surface.push_key(KeyCode::Char('7'), KeyModifiers::NONE);
    h.surface.push_empty_poll();
    h.surface.push_key(KeyCode::Char('n'), KeyModifiers::NONE);
    let key = h
        .session
        .ask_getch("Proceed? ", Some(&['y', 'n', 'Y', 'N']))
        .unwrap();
    assert_eq!(key.map(|k| k.code), Some(KeyCode::Char('n')));
}

#[test]
fn ask_yes_or_no_maps_keys() {
    let h = SessionHarness::new(12, 60);

    h.surface.push_key(KeyCode::Char('y'), KeyModifiers::NONE);
    assert_eq!(h.session.ask_yes_or_no("Proceed? ").unwrap(), Some(true));

    h.surface.push_key(KeyCode::Char('Y'), KeyModifiers::SHIFT);
    assert_eq!(h.session.ask_yes_or_no("Proceed? ").unwrap(), Some(true));

    h.surface.push_key(KeyCode::Char('n'), KeyModifiers::NONE);
    assert_eq!(h.session.ask_yes_or_no("Proceed? ").unwrap(), Some(false));

    h.surface.push_key(KeyCode::Esc, KeyModifiers::NONE);
    assert_eq!(h.session.ask_yes_or_no("Proceed? ").unwrap(), None);
}

#[test]
fn filename_prompt_expands_tilde_names() {
    let tmp = tempfile::tempdir().unwrap();
    let home = tmp.path().join("will");
    std::fs::create_dir(&home).unwrap();
    let accounts = FakeAccounts::with(&[("will", home.to_str().unwrap())]);
    let h = SessionHarness::with_accounts(12, 60, accounts);

    h.surface.push_text("~w");
    h.surface.push_key(KeyCode::Tab, KeyModifiers::NONE);
    h.surface.push_key(KeyCode::Enter, KeyModifiers::NONE);
    let answer = h.session.ask_for_filename("file", "Save to: ", None).unwrap();
    assert_eq!(answer, Some(home));
}
