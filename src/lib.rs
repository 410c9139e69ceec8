//! split-ledger - shared expense tracking for groups
//!
//! This library provides the core of the `splitledger` command-line tool:
//! members of a group record who paid for what and how each expense is
//! shared, and the ledger works out who owes whom.
//!
//! # Architecture
//!
//! The crate is organized into the following modules:
//!
//! - `ledger`: Pure calculations (split checks, recurrence dates, balances)
//! - `models`: Core data models (groups, members, expenses, settlements)
//! - `config`: Configuration and path management
//! - `error`: Custom error types
//! - `storage`: JSON file storage layer
//! - `audit`: Audit logging system
//! - `services`: Business logic layer
//! - `reports`: Spending reports
//! - `export`: CSV and JSON export
//! - `display`: Terminal formatting
//! - `cli`: Command handlers
//!
//! # Example
//!
//! ```rust,ignore
//! use split_ledger::config::{LedgerPaths, Settings};
//! use split_ledger::services::SettlementService;
//! use split_ledger::storage::Storage;
//!
//! let paths = LedgerPaths::new()?;
//! let storage = Storage::new(paths)?;
//! storage.load_all()?;
//! let balances = SettlementService::new(&storage).balances(group_id)?;
//! ```

pub mod audit;
pub mod cli;
pub mod config;
pub mod display;
pub mod error;
pub mod export;
pub mod ledger;
pub mod models;
pub mod reports;
pub mod services;
pub mod storage;

pub use error::{SplitError, SplitResult};

use std::sync::Once;

static TRACING_INIT: Once = Once::new();

/// Install the global `tracing` subscriber, writing to stderr
///
/// `RUST_LOG` overrides the default `split_ledger=info` filter. Safe to call
/// more than once.
pub fn init_tracing() {
    TRACING_INIT.call_once(|| {
        use tracing_subscriber::{fmt, EnvFilter};

        let filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new("split_ledger=info"));

        fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .with_target(false)
            .init();
    });
}
