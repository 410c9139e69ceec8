//! Report CLI commands

use clap::Args;

use crate::error::SplitResult;
use crate::reports::SpendingReport;
use crate::services::GroupService;
use crate::storage::Storage;

use super::parse_date;

/// Arguments for `report`
#[derive(Args)]
pub struct ReportArgs {
    /// Group name or ID
    pub group: String,
    /// Earliest date (YYYY-MM-DD)
    #[arg(long)]
    pub from: Option<String>,
    /// Latest date (YYYY-MM-DD)
    #[arg(long)]
    pub to: Option<String>,
    /// Print the category breakdown as CSV
    #[arg(long)]
    pub csv: bool,
}

/// Print a spending report for a group
pub fn handle_report_command(storage: &Storage, args: ReportArgs) -> SplitResult<()> {
    let group = GroupService::new(storage).require(&args.group)?;
    let start = args.from.as_deref().map(parse_date).transpose()?;
    let end = args.to.as_deref().map(parse_date).transpose()?;

    let report = SpendingReport::generate(storage, group.id, start, end)?;

    if args.csv {
        report.export_csv(std::io::stdout().lock())?;
    } else {
        print!("{}", report.format_terminal());
    }

    Ok(())
}
