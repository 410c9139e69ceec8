//! CLI command for data export

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::PathBuf;

use clap::{Args, ValueEnum};

use crate::error::{SplitError, SplitResult};
use crate::export::{export_expenses_csv, export_group_json, export_settlements_csv};
use crate::services::GroupService;
use crate::storage::Storage;

/// Export format options
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ExportFormat {
    /// CSV, one row per expense followed by its shares
    Csv,
    /// JSON snapshot of the group, its expenses, settlements and balances
    Json,
}

/// Arguments for `export`
#[derive(Args, Debug)]
pub struct ExportArgs {
    /// Group name or ID
    pub group: String,

    /// Output file path (defaults to stdout)
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Export format
    #[arg(short, long, value_enum, default_value = "csv")]
    pub format: ExportFormat,

    /// Export settlements instead of expenses (CSV only)
    #[arg(long)]
    pub settlements: bool,
}

/// Handle the export command
pub fn handle_export_command(storage: &Storage, args: ExportArgs) -> SplitResult<()> {
    let group = GroupService::new(storage).require(&args.group)?;

    if args.settlements && args.format != ExportFormat::Csv {
        return Err(SplitError::Validation(
            "--settlements is only available for CSV export".into(),
        ));
    }

    let mut writer: Box<dyn Write> = match &args.output {
        Some(path) => {
            let file = File::create(path).map_err(|e| {
                SplitError::Export(format!("Failed to create {}: {}", path.display(), e))
            })?;
            Box::new(BufWriter::new(file))
        }
        None => Box::new(std::io::stdout().lock()),
    };

    let summary = match args.format {
        ExportFormat::Csv if args.settlements => {
            let count = export_settlements_csv(storage, group.id, &mut writer)?;
            format!("{} settlement(s)", count)
        }
        ExportFormat::Csv => {
            let count = export_expenses_csv(storage, group.id, &mut writer)?;
            format!("{} expense(s)", count)
        }
        ExportFormat::Json => {
            export_group_json(storage, group.id, &mut writer)?;
            format!("group '{}'", group.name)
        }
    };

    writer
        .flush()
        .map_err(|e| SplitError::Export(e.to_string()))?;

    if let Some(path) = &args.output {
        println!("Exported {} to {}", summary, path.display());
    }

    Ok(())
}
