use serde::{Deserialize, Serialize};

use crate::database::FetchMode;

/// Composer configuration.
///
/// - `placeholder_sigil` prefixes placeholder tokens in the SQL text.
/// - `statement_terminator` is appended to each registered raw statement.
/// - `default_fetch_mode` shapes results when `execute` is given no mode.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct ComposerConfig {
    pub placeholder_sigil: char,
    pub statement_terminator: String,
    pub default_fetch_mode: FetchMode,
}

impl Default for ComposerConfig {
    fn default() -> Self {
        Self {
            placeholder_sigil: ':',
            statement_terminator: ";".to_string(),
            default_fetch_mode: FetchMode::default(),
        }
    }
}

impl ComposerConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from(placeholder_sigil: char, statement_terminator: &str, default_fetch_mode: FetchMode) -> Self {
        Self {
            placeholder_sigil,
            statement_terminator: statement_terminator.to_string(),
            default_fetch_mode,
        }
    }

    /// Convenience: default config with another placeholder sigil.
    pub fn sigil(placeholder_sigil: char) -> Self {
        Self { placeholder_sigil, ..Self::default() }
    }

    pub fn with_fetch_mode(mut self, mode: FetchMode) -> Self {
        self.default_fetch_mode = mode;
        self
    }

    pub fn with_terminator(mut self, terminator: &str) -> Self {
        self.statement_terminator = terminator.to_string();
        self
    }
}
