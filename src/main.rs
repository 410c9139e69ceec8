use anyhow::Result;
use clap::{Args, Parser, Subcommand};

use split_ledger::cli::{
    handle_balance_command, handle_expense_command, handle_export_command, handle_group_command,
    handle_recurring_command, handle_report_command, handle_settle_command, BalanceArgs,
    ExpenseCommands, ExportArgs, GroupCommands, RecurringCommands, ReportArgs, SettleArgs,
};
use split_ledger::config::{is_valid_date_format, LedgerPaths, Settings};
use split_ledger::models::is_valid_currency_code;
use split_ledger::storage::Storage;
use split_ledger::SplitError;

#[derive(Parser)]
#[command(
    name = "splitledger",
    version,
    about = "Track shared expenses and settle up from the terminal",
    long_about = "split-ledger records who paid for what in a group, how each expense \
                  is shared, and works out who owes whom. Data is stored as JSON under \
                  SPLIT_LEDGER_DATA_DIR or the platform config directory."
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize the data directory and settings
    Init,

    /// Show or change configuration
    Config(ConfigArgs),

    /// Group and member management
    #[command(subcommand)]
    Group(GroupCommands),

    /// Expense management
    #[command(subcommand, alias = "exp")]
    Expense(ExpenseCommands),

    /// Recurring expense generation
    #[command(subcommand)]
    Recurring(RecurringCommands),

    /// Show who owes whom in a group
    Balance(BalanceArgs),

    /// Record a payment between two members
    Settle(SettleArgs),

    /// Spending report for a group
    Report(ReportArgs),

    /// Export a group's data
    Export(ExportArgs),
}

#[derive(Args)]
struct ConfigArgs {
    /// Your member name, used for "you owe" labels and as the default payer
    #[arg(long)]
    user: Option<String>,
    /// Default currency code for new groups
    #[arg(long)]
    currency: Option<String>,
    /// Currency symbol used when printing amounts
    #[arg(long)]
    symbol: Option<String>,
    /// Date format for printed dates (strftime, e.g. "%d/%m/%Y")
    #[arg(long)]
    date_format: Option<String>,
    /// Months ahead to generate recurring expenses for
    #[arg(long)]
    look_ahead: Option<u32>,
}

fn main() -> Result<()> {
    split_ledger::init_tracing();

    let cli = Cli::parse();

    let paths = LedgerPaths::new()?;
    let mut settings = Settings::load_or_create(&paths)?;

    let storage = Storage::new(paths.clone())?;
    storage.load_all()?;

    match cli.command {
        Some(Commands::Init) => {
            if paths.is_initialized() {
                println!("split-ledger is already initialized at {}", paths.base_dir().display());
            } else {
                settings.save(&paths)?;
                storage.save_all()?;
                println!("Initialized split-ledger at {}", paths.base_dir().display());
                println!();
                println!("Next steps:");
                println!("  splitledger config --user <your name>");
                println!("  splitledger group create <name>");
            }
        }
        Some(Commands::Config(args)) => handle_config(&paths, &mut settings, args)?,
        Some(Commands::Group(cmd)) => handle_group_command(&storage, &settings, cmd)?,
        Some(Commands::Expense(cmd)) => handle_expense_command(&storage, &settings, cmd)?,
        Some(Commands::Recurring(cmd)) => handle_recurring_command(&storage, &settings, cmd)?,
        Some(Commands::Balance(args)) => handle_balance_command(&storage, &settings, args)?,
        Some(Commands::Settle(args)) => handle_settle_command(&storage, &settings, args)?,
        Some(Commands::Report(args)) => handle_report_command(&storage, args)?,
        Some(Commands::Export(args)) => handle_export_command(&storage, args)?,
        None => {
            println!("split-ledger - shared expenses for groups");
            println!();
            println!("Run 'splitledger --help' for usage information.");
        }
    }

    Ok(())
}

fn handle_config(paths: &LedgerPaths, settings: &mut Settings, args: ConfigArgs) -> Result<()> {
    let mut changed = false;

    if let Some(user) = args.user {
        let user = user.trim().to_string();
        settings.current_user = (!user.is_empty()).then_some(user);
        changed = true;
    }
    if let Some(currency) = args.currency {
        let currency = currency.trim().to_uppercase();
        if !is_valid_currency_code(&currency) {
            return Err(SplitError::Validation(format!(
                "Invalid currency code '{}'. Use a three-letter code such as USD",
                currency
            ))
            .into());
        }
        settings.default_currency = currency;
        changed = true;
    }
    if let Some(symbol) = args.symbol {
        settings.currency_symbol = symbol;
        changed = true;
    }
    if let Some(format) = args.date_format {
        if !is_valid_date_format(&format) {
            return Err(SplitError::Validation(format!(
                "Invalid date format '{}'. Use strftime specifiers such as %Y-%m-%d",
                format
            ))
            .into());
        }
        settings.date_format = format;
        changed = true;
    }
    if let Some(months) = args.look_ahead {
        settings.look_ahead_months = months;
        changed = true;
    }

    if changed {
        settings.save(paths)?;
        println!("Configuration saved.");
        println!();
    }

    println!("split-ledger Configuration");
    println!("==========================");
    println!("Base directory:  {}", paths.base_dir().display());
    println!("Data directory:  {}", paths.data_dir().display());
    println!("Audit log:       {}", paths.audit_log().display());
    println!();
    println!("Settings:");
    println!(
        "  Current user:      {}",
        settings.current_user.as_deref().unwrap_or("(not set)")
    );
    println!("  Default currency:  {}", settings.default_currency);
    println!("  Currency symbol:   {}", settings.currency_symbol);
    println!("  Date format:       {}", settings.date_format);
    println!("  Look-ahead months: {}", settings.look_ahead_months);

    Ok(())
}
