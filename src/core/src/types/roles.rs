//! Derived role relations

use serde::{Deserialize, Serialize};

/// A role minted from a catalog-matched group
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Role {
    /// Role identifier; always the anchor group's `group_id`
    pub role_id: String,

    /// The anchor group's name
    pub role_name: String,

    /// The anchor group's description
    #[serde(default)]
    pub description: String,

    /// Catalog category the role was minted from
    #[serde(default)]
    pub source: String,
}

/// A group holding a role, either as anchor or through nesting
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct GroupRole {
    pub group_id: String,
    pub role_id: String,
}

impl GroupRole {
    pub fn new(group_id: impl Into<String>, role_id: impl Into<String>) -> Self {
        Self {
            group_id: group_id.into(),
            role_id: role_id.into(),
        }
    }
}

/// A user holding a role through some group in the role's closure
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct UserRole {
    pub user_id: String,
    pub role_id: String,
}

impl UserRole {
    pub fn new(user_id: impl Into<String>, role_id: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            role_id: role_id.into(),
        }
    }
}

/// Output of one engine run
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Resolution {
    pub roles: Vec<Role>,
    pub group_roles: Vec<GroupRole>,
    pub user_roles: Vec<UserRole>,
}

impl Resolution {
    /// True when no role matched the catalog
    pub fn is_empty(&self) -> bool {
        self.roles.is_empty() && self.group_roles.is_empty() && self.user_roles.is_empty()
    }

    /// Role ids held by `user_id`, in output order
    pub fn roles_for_user<'a>(&'a self, user_id: &'a str) -> impl Iterator<Item = &'a str> + 'a {
        self.user_roles
            .iter()
            .filter(move |ur| ur.user_id == user_id)
            .map(|ur| ur.role_id.as_str())
    }

    /// Group ids holding `role_id`, in output order
    pub fn groups_for_role<'a>(&'a self, role_id: &'a str) -> impl Iterator<Item = &'a str> + 'a {
        self.group_roles
            .iter()
            .filter(move |gr| gr.role_id == role_id)
            .map(|gr| gr.group_id.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolution_queries() {
        let resolution = Resolution {
            roles: vec![],
            group_roles: vec![GroupRole::new("G1", "G1"), GroupRole::new("G2", "G1")],
            user_roles: vec![UserRole::new("U1", "G1"), UserRole::new("U2", "G3")],
        };

        assert_eq!(resolution.groups_for_role("G1").collect::<Vec<_>>(), vec!["G1", "G2"]);
        assert_eq!(resolution.roles_for_user("U1").collect::<Vec<_>>(), vec!["G1"]);
        assert_eq!(resolution.roles_for_user("U9").count(), 0);
        assert!(!resolution.is_empty());
        assert!(Resolution::default().is_empty());
    }
}
