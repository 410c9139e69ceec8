//! Export module for split-ledger
//!
//! - CSV: a group's expenses (with their shares) or settlements, for spreadsheets
//! - JSON: a full, versioned snapshot of one group

pub mod csv;
pub mod json;

pub use csv::{export_expenses_csv, export_settlements_csv};
pub use json::{export_group_json, GroupExport, EXPORT_SCHEMA_VERSION};
