//! Path management for split-ledger
//!
//! ## Path Resolution Order
//!
//! 1. `SPLIT_LEDGER_DATA_DIR` environment variable (if set)
//! 2. The platform config directory (`~/.config/split-ledger` on Linux,
//!    `~/Library/Application Support/split-ledger` on macOS,
//!    `%APPDATA%\split-ledger` on Windows)

use std::path::PathBuf;

use directories::BaseDirs;

use crate::error::SplitError;

pub const DATA_DIR_ENV: &str = "SPLIT_LEDGER_DATA_DIR";

/// Manages all paths used by split-ledger
#[derive(Debug, Clone)]
pub struct LedgerPaths {
    base_dir: PathBuf,
}

impl LedgerPaths {
    /// Resolve the base directory from the environment or the platform default
    ///
    /// # Errors
    ///
    /// Returns an error if no home directory can be determined.
    pub fn new() -> Result<Self, SplitError> {
        let base_dir = match std::env::var_os(DATA_DIR_ENV) {
            Some(custom) if !custom.is_empty() => PathBuf::from(custom),
            _ => BaseDirs::new()
                .map(|dirs| dirs.config_dir().join("split-ledger"))
                .ok_or_else(|| {
                    SplitError::Config("Could not determine the home directory".into())
                })?,
        };

        Ok(Self { base_dir })
    }

    /// Use a custom base directory (useful for testing)
    pub fn with_base_dir(base_dir: PathBuf) -> Self {
        Self { base_dir }
    }

    pub fn base_dir(&self) -> &PathBuf {
        &self.base_dir
    }

    pub fn data_dir(&self) -> PathBuf {
        self.base_dir.join("data")
    }

    pub fn settings_file(&self) -> PathBuf {
        self.base_dir.join("config.json")
    }

    pub fn audit_log(&self) -> PathBuf {
        self.base_dir.join("audit.log")
    }

    pub fn groups_file(&self) -> PathBuf {
        self.data_dir().join("groups.json")
    }

    pub fn expenses_file(&self) -> PathBuf {
        self.data_dir().join("expenses.json")
    }

    pub fn settlements_file(&self) -> PathBuf {
        self.data_dir().join("settlements.json")
    }

    /// Ensure the base and data directories exist
    pub fn ensure_directories(&self) -> Result<(), SplitError> {
        std::fs::create_dir_all(&self.base_dir)
            .map_err(|e| SplitError::Io(format!("Failed to create base directory: {}", e)))?;

        std::fs::create_dir_all(self.data_dir())
            .map_err(|e| SplitError::Io(format!("Failed to create data directory: {}", e)))?;

        Ok(())
    }

    /// Check if split-ledger has been initialized (config file exists)
    pub fn is_initialized(&self) -> bool {
        self.settings_file().exists()
    }
}
