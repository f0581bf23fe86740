//! bufstack — the screen/session layer for stacked-buffer terminal
//! applications.
//!
//! The crate multiplexes logical buffers (full-screen views) onto one
//! terminal: a z-ordered buffer stack with a single focused buffer, a
//! composed minibuffer region (flash, prompt line, persistent status
//! lines), blocking prompt and modal-dialog loops with live completion, and
//! a lock-disciplined compositor. Application views implement [`View`] (and
//! [`ModalView`] for dialogs); the terminal itself sits behind
//! [`TerminalSurface`].
//!
//! A minimal embedding:
//!
//! ```no_run
//! use bufstack::{Config, CrosstermSurface, Session};
//!
//! # fn main() -> bufstack::Result<()> {
//! let surface = CrosstermSurface::new()?;
//! let session = Session::new(Box::new(surface), Config::default());
//! // session.spawn("inbox", inbox_view, Default::default())?;
//! loop {
//!     if let Some(key) = session.poll_key()? {
//!         session.handle_input(&key)?;
//!     }
//!     # break;
//! }
//! # Ok(())
//! # }
//! ```

pub mod browser;
pub mod buffer;
pub mod completion;
pub mod config;
pub mod error;
pub mod input_line;
pub mod minibuffer;
pub mod session;
pub mod stack;
pub mod terminal;
pub mod tracing_setup;
pub mod view;

pub use browser::DirBrowser;
pub use buffer::{Buffer, BufferId};
pub use completion::{AccountDirectory, Candidate, EtcPasswdAccounts};
pub use config::{Colors, Config};
pub use error::{Error, Result};
pub use input_line::LineOutcome;
pub use minibuffer::StatusHandle;
pub use session::{DrawOpts, Session};
pub use stack::SpawnOptions;
pub use terminal::{CellStyle, CrosstermSurface, TerminalSurface, TestSurface};
pub use view::{Frame, ModalView, View, WriteOptions};
