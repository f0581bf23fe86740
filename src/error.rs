//! Error types for the screen/session layer.
//!
//! Contract violations (operating on a buffer that left the stack, starting
//! a second prompt session) get their own variants so callers can fail fast
//! on what is always a programming error. Expected absences (no such named
//! buffer, empty completion results) are represented as `Option`/empty
//! collections by the APIs themselves and never show up here.

use crate::buffer::BufferId;

/// Errors surfaced by session and stack operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The buffer id is not a member of the stack. Indicates a caller bug:
    /// the handle outlived the buffer it referred to.
    #[error("buffer {0:?} is not a member of the stack")]
    UnknownBuffer(BufferId),

    /// A prompt session was started while another one is active. Only one
    /// session may run at a time.
    #[error("a prompt session is already active")]
    PromptActive,

    /// A safe kill was refused by the view's killable predicate.
    #[error("buffer \"{0}\" is not killable")]
    NotKillable(String),

    /// Terminal I/O failed.
    #[error("terminal I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
