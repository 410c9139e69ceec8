//! Group display formatting

use crate::models::Group;

/// Format a list of groups
pub fn format_group_list(groups: &[Group]) -> String {
    if groups.is_empty() {
        return "No groups found. Create one with `splitledger group create <name>`.".to_string();
    }

    let name_width = groups
        .iter()
        .map(|g| g.name.len())
        .max()
        .unwrap_or(4)
        .max(4);

    let mut output = String::new();
    output.push_str(&format!(
        "{:<12}  {:<name_width$}  {:<8}  {:>7}\n",
        "ID",
        "Name",
        "Currency",
        "Members",
        name_width = name_width,
    ));
    output.push_str(&format!(
        "{:-<12}  {:-<name_width$}  {:-<8}  {:->7}\n",
        "",
        "",
        "",
        "",
        name_width = name_width,
    ));

    for group in groups {
        output.push_str(&format!(
            "{:<12}  {:<name_width$}  {:<8}  {:>7}\n",
            group.id.to_string(),
            group.name,
            group.currency,
            group.members.len(),
            name_width = name_width,
        ));
    }

    output
}

/// Format a single group with its members
pub fn format_group_details(group: &Group) -> String {
    let mut output = String::new();

    output.push_str(&format!("Group: {}\n", group.name));
    output.push_str(&format!("  ID:        {}\n", group.id));
    output.push_str(&format!("  Currency:  {}\n", group.currency));
    output.push_str(&format!(
        "  Created:   {}\n",
        group.created_at.format("%Y-%m-%d")
    ));

    if group.members.is_empty() {
        output.push_str("\n  No members yet.\n");
        return output;
    }

    output.push_str(&format!("\n  Members ({}):\n", group.members.len()));
    for member in &group.members {
        output.push_str(&format!(
            "    {:<20} {:<12} {}\n",
            member.name,
            member.id.to_string(),
            if member.is_admin() { "admin" } else { "" }
        ));
    }

    output
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::MemberRole;

    #[test]
    fn test_format_group_list() {
        assert!(format_group_list(&[]).starts_with("No groups found"));

        let mut group = Group::new("Ski Trip", "EUR");
        group.add_member("Alice", MemberRole::Admin).unwrap();
        let output = format_group_list(&[group]);
        assert!(output.contains("Ski Trip"));
        assert!(output.contains("EUR"));
    }

    #[test]
    fn test_format_group_details() {
        let mut group = Group::new("Flat", "USD");
        assert!(format_group_details(&group).contains("No members yet."));

        group.add_member("Alice", MemberRole::Admin).unwrap();
        group.add_member("Bob", MemberRole::Member).unwrap();
        let output = format_group_details(&group);
        assert!(output.contains("Members (2):"));
        assert!(output.contains("admin"));
    }
}
