//! Configuration module for split-ledger
//!
//! - Platform-aware path resolution
//! - User settings persistence

pub mod paths;
pub mod settings;

pub use paths::LedgerPaths;
pub use settings::{is_valid_date_format, Settings};
