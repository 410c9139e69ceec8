//! User settings for split-ledger
//!
//! Preferences stored in `config.json`: default currency for new groups,
//! display formats, the recurring look-ahead window, and which member name
//! stands for "you" in labels.

use chrono::format::{Item, StrftimeItems};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::paths::LedgerPaths;
use crate::error::SplitError;
use crate::storage::write_json_atomic;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    /// Schema version for migration support
    #[serde(default = "default_schema_version")]
    pub schema_version: u32,

    /// Currency code for newly created groups
    #[serde(default = "default_currency")]
    pub default_currency: String,

    #[serde(default = "default_currency_symbol")]
    pub currency_symbol: String,

    /// Date format preference (strftime format)
    #[serde(default = "default_date_format")]
    pub date_format: String,

    /// How many months ahead recurring expenses are generated
    #[serde(default = "default_look_ahead_months")]
    pub look_ahead_months: u32,

    /// Member name used for "you owe" / "you lent" labels
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current_user: Option<String>,
}

fn default_schema_version() -> u32 {
    1
}

fn default_currency() -> String {
    "USD".to_string()
}

fn default_currency_symbol() -> String {
    "$".to_string()
}

fn default_date_format() -> String {
    "%Y-%m-%d".to_string()
}

fn default_look_ahead_months() -> u32 {
    3
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            schema_version: default_schema_version(),
            default_currency: default_currency(),
            currency_symbol: default_currency_symbol(),
            date_format: default_date_format(),
            look_ahead_months: default_look_ahead_months(),
            current_user: None,
        }
    }
}

impl Settings {
    /// Load settings from disk, or return defaults if the file doesn't exist
    pub fn load_or_create(paths: &LedgerPaths) -> Result<Self, SplitError> {
        let settings_path = paths.settings_file();

        if !settings_path.exists() {
            // Don't save yet - let caller decide when to persist
            return Ok(Settings::default());
        }

        let contents = std::fs::read_to_string(&settings_path)
            .map_err(|e| SplitError::Io(format!("Failed to read settings file: {}", e)))?;

        serde_json::from_str(&contents)
            .map_err(|e| SplitError::Config(format!("Failed to parse settings file: {}", e)))
    }

    pub fn save(&self, paths: &LedgerPaths) -> Result<(), SplitError> {
        paths.ensure_directories()?;
        write_json_atomic(paths.settings_file(), self)
    }

    /// Render a date with the configured format
    ///
    /// A malformed format from a hand-edited settings file falls back to ISO dates.
    pub fn format_date(&self, date: NaiveDate) -> String {
        if is_valid_date_format(&self.date_format) {
            date.format(&self.date_format).to_string()
        } else {
            date.format("%Y-%m-%d").to_string()
        }
    }
}

/// Whether `format` is a non-empty strftime pattern chrono can render
pub fn is_valid_date_format(format: &str) -> bool {
    !format.trim().is_empty() && StrftimeItems::new(format).all(|item| !matches!(item, Item::Error))
}
