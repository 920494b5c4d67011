//! Role minting
//!
//! Matches eligible names against the group inventory. Matching is exact,
//! case-sensitive equality on `group_name`; names without a group are
//! dropped silently since catalogs routinely list groups a given directory
//! does not have.

use crate::catalog::EligibleName;
use adrole_core::types::{Group, Role};
use std::collections::{HashMap, HashSet};
use tracing::{debug, trace, warn};

/// Mints one role per matched group
#[derive(Debug, Clone, Default)]
pub struct RoleMinter;

impl RoleMinter {
    pub fn new() -> Self {
        Self
    }

    /// Mint roles in eligible-name order
    ///
    /// When several groups share a name the first one in inventory order
    /// anchors the role. A group id anchors at most one role.
    pub fn mint(&self, eligible: &[EligibleName], groups: &[Group]) -> Vec<Role> {
        let mut by_name: HashMap<&str, &Group> = HashMap::with_capacity(groups.len());
        for group in groups {
            if let Some(first) = by_name.get(group.group_name.as_str()) {
                warn!(
                    group_name = %group.group_name,
                    kept = %first.group_id,
                    ignored = %group.group_id,
                    "Duplicate group name in inventory, first group anchors any role"
                );
                continue;
            }
            by_name.insert(group.group_name.as_str(), group);
        }

        let mut anchored: HashSet<&str> = HashSet::new();
        let mut roles = Vec::new();

        for entry in eligible {
            let Some(group) = by_name.get(entry.name.as_str()) else {
                trace!(name = %entry.name, "Catalog name has no matching group");
                continue;
            };
            if !anchored.insert(group.group_id.as_str()) {
                continue;
            }

            trace!(role_id = %group.group_id, role_name = %group.group_name, source = %entry.category, "Minted role");
            roles.push(Role {
                role_id: group.group_id.clone(),
                role_name: group.group_name.clone(),
                description: group.description.clone(),
                source: entry.category.clone(),
            });
        }

        debug!(eligible = eligible.len(), groups = groups.len(), roles = roles.len(), "Minted roles");
        roles
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn eligible(entries: &[(&str, &str)]) -> Vec<EligibleName> {
        entries
            .iter()
            .map(|(name, category)| EligibleName {
                name: name.to_string(),
                category: category.to_string(),
            })
            .collect()
    }

    fn inventory() -> Vec<Group> {
        vec![
            Group::new("G1", "Administrators", "Admin Group"),
            Group::new("G2", "Users", "Regular Users"),
            Group::new("G3", "Exchange Admins", "Exchange Admins"),
            Group::new("G4", "Custom Group", "Custom Group"),
        ]
    }

    #[test]
    fn test_mint_matching_groups() {
        let names = eligible(&[
            ("Administrators", "Original_Role_Groups"),
            ("Users", "Original_Role_Groups"),
            ("Domain Admins", "BuiltIn_AD_Groups"),
            ("Exchange Admins", "Exchange_Server_Groups"),
        ]);

        let roles = RoleMinter::new().mint(&names, &inventory());

        assert_eq!(roles.len(), 3);
        assert_eq!(roles[0].role_id, "G1");
        assert_eq!(roles[0].role_name, "Administrators");
        assert_eq!(roles[0].description, "Admin Group");
        assert_eq!(roles[0].source, "Original_Role_Groups");
        assert_eq!(roles[2].role_id, "G3");
        assert_eq!(roles[2].source, "Exchange_Server_Groups");
        assert!(roles.iter().all(|r| r.role_name != "Custom Group"));
    }

    #[test]
    fn test_match_is_case_sensitive() {
        let names = eligible(&[("administrators", "A"), ("USERS", "A")]);
        assert!(RoleMinter::new().mint(&names, &inventory()).is_empty());
    }

    #[test]
    fn test_duplicate_group_names_first_wins() {
        let groups = vec![
            Group::new("G1", "Administrators", "first"),
            Group::new("G9", "Administrators", "second"),
        ];
        let roles = RoleMinter::new().mint(&eligible(&[("Administrators", "A")]), &groups);

        assert_eq!(roles.len(), 1);
        assert_eq!(roles[0].role_id, "G1");
        assert_eq!(roles[0].description, "first");
    }

    #[test]
    fn test_duplicate_eligible_names_mint_once() {
        let names = eligible(&[("Users", "A"), ("Users", "B")]);
        let roles = RoleMinter::new().mint(&names, &inventory());
        assert_eq!(roles.len(), 1);
        assert_eq!(roles[0].source, "A");
    }

    #[test]
    fn test_no_matches() {
        let roles = RoleMinter::new().mint(&eligible(&[("Nobody", "A")]), &inventory());
        assert!(roles.is_empty());
        assert!(RoleMinter::new().mint(&[], &inventory()).is_empty());
    }
}
