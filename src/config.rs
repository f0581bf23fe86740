//! Session configuration.

use serde::{Deserialize, Serialize};

use crate::terminal::CellStyle;
use crossterm::style::Color;

/// Main configuration structure. Every field has a default so a partial
/// JSON document (or none at all) is fine.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Input poll timeout in milliseconds. Blocking loops wake at least this
    /// often even with no input.
    #[serde(default = "default_poll_interval")]
    pub poll_interval_ms: u64,

    /// Maximum number of visible rows in a completion-list buffer.
    #[serde(default = "default_completion_rows")]
    pub completion_rows: u16,

    #[serde(default)]
    pub colors: Colors,
}

fn default_poll_interval() -> u64 {
    100
}

fn default_completion_rows() -> u16 {
    10
}

/// Styles for the color roles the core paints with. Views receive these
/// through the draw frame and are free to ignore them.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Colors {
    /// Ordinary buffer and minibuffer text.
    #[serde(default)]
    pub text: CellStyle,

    /// Buffer status lines.
    #[serde(default = "default_standout")]
    pub status: CellStyle,

    /// The prompt question and input text.
    #[serde(default = "default_bold")]
    pub prompt: CellStyle,

    /// The selected completion-list entry.
    #[serde(default = "default_standout")]
    pub selection: CellStyle,
}

fn default_standout() -> CellStyle {
    CellStyle {
        reverse: true,
        ..CellStyle::default()
    }
}

fn default_bold() -> CellStyle {
    CellStyle {
        bold: true,
        ..CellStyle::default()
    }
}

impl Default for Colors {
    fn default() -> Self {
        Self {
            text: CellStyle::default(),
            status: default_standout(),
            prompt: default_bold(),
            selection: default_standout(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            poll_interval_ms: default_poll_interval(),
            completion_rows: default_completion_rows(),
            colors: Colors::default(),
        }
    }
}

impl Config {
    /// Parse a configuration from a JSON document. Missing fields fall back
    /// to their defaults.
    pub fn from_json_str(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Serialize to pretty-printed JSON.
    pub fn to_json_str(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// A config with a custom status foreground, as a convenience for
    /// embedders that only want to recolor the chrome.
    pub fn with_status_fg(mut self, color: Color) -> Self {
        self.colors.status.fg = Some(color);
        self
    }
}
