//! Group CLI commands
//!
//! Implements CLI commands for groups and their members.

use clap::Subcommand;

use crate::config::Settings;
use crate::display::group::{format_group_details, format_group_list};
use crate::error::SplitResult;
use crate::models::MemberRole;
use crate::services::GroupService;
use crate::storage::Storage;

/// Group subcommands
#[derive(Subcommand)]
pub enum GroupCommands {
    /// Create a new group
    Create {
        /// Group name
        name: String,
        /// Three-letter currency code (defaults to the configured currency)
        #[arg(short, long)]
        currency: Option<String>,
        /// Name of the first member, who becomes an admin (defaults to the current user)
        #[arg(long)]
        creator: Option<String>,
    },
    /// List all groups
    List,
    /// Show a group and its members
    Show {
        /// Group name or ID
        group: String,
    },
    /// Add a member to a group
    AddMember {
        /// Group name or ID
        group: String,
        /// Member name
        name: String,
        /// Make the member an admin
        #[arg(long)]
        admin: bool,
    },
    /// Remove a member who has no expenses or outstanding balance
    RemoveMember {
        /// Group name or ID
        group: String,
        /// Member name or ID
        member: String,
    },
    /// Rename a group
    Rename {
        /// Group name or ID
        group: String,
        /// New name
        name: String,
    },
    /// Delete a group with all of its expenses and settlements
    Delete {
        /// Group name or ID
        group: String,
    },
}

/// Handle a group command
pub fn handle_group_command(
    storage: &Storage,
    settings: &Settings,
    cmd: GroupCommands,
) -> SplitResult<()> {
    let service = GroupService::new(storage);

    match cmd {
        GroupCommands::Create {
            name,
            currency,
            creator,
        } => {
            let currency = currency.unwrap_or_else(|| settings.default_currency.clone());
            let creator = creator.or_else(|| settings.current_user.clone());
            let group = service.create(&name, &currency, creator.as_deref())?;

            println!("Created group: {}", group.name);
            println!("  Currency: {}", group.currency);
            if let Some(admin) = group.members.first() {
                println!("  Admin: {}", admin.name);
            }
            println!("  ID: {}", group.id);
        }

        GroupCommands::List => {
            let groups = service.list()?;
            print!("{}", format_group_list(&groups));
        }

        GroupCommands::Show { group } => {
            let found = service.require(&group)?;
            print!("{}", format_group_details(&found));
        }

        GroupCommands::AddMember { group, name, admin } => {
            let found = service.require(&group)?;
            let role = if admin {
                MemberRole::Admin
            } else {
                MemberRole::Member
            };
            let member = service.add_member(found.id, &name, role)?;
            println!("Added {} to {} ({})", member.name, found.name, member.id);
        }

        GroupCommands::RemoveMember { group, member } => {
            let found = service.require(&group)?;
            let removed = service.remove_member(found.id, &member)?;
            println!("Removed {} from {}", removed.name, found.name);
        }

        GroupCommands::Rename { group, name } => {
            let found = service.require(&group)?;
            let renamed = service.rename(found.id, &name)?;
            println!("Renamed '{}' to '{}'", found.name, renamed.name);
        }

        GroupCommands::Delete { group } => {
            let found = service.require(&group)?;
            let deletion = service.delete(found.id)?;
            println!(
                "Deleted group '{}' ({} expense(s), {} settlement(s))",
                found.name, deletion.expenses_removed, deletion.settlements_removed
            );
        }
    }

    Ok(())
}
