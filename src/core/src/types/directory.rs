//! Directory snapshot types: users, groups and the two membership relations

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A directory group
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Group {
    /// Group identifier, unique within a snapshot
    pub group_id: String,

    /// Display name; catalog entries match this exactly
    pub group_name: String,

    /// Free-form description, carried onto any role the group anchors
    #[serde(default)]
    pub description: String,
}

impl Group {
    /// Create a new group
    pub fn new(
        group_id: impl Into<String>,
        group_name: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        Self {
            group_id: group_id.into(),
            group_name: group_name.into(),
            description: description.into(),
        }
    }
}

/// A directory user
///
/// Only `user_id` is meaningful to role resolution; every other column is
/// passed through untouched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    /// User identifier
    pub user_id: String,

    /// Remaining columns (username, email, enabled, ...)
    #[serde(flatten)]
    pub attributes: Map<String, Value>,
}

impl User {
    /// Create a new user with no extra attributes
    pub fn new(user_id: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            attributes: Map::new(),
        }
    }

    /// Add a passthrough attribute to the user
    pub fn with_attribute(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.attributes.insert(key.into(), value.into());
        self
    }
}

/// Direct membership of a user in a group
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Membership {
    pub user_id: String,
    pub group_id: String,
}

impl Membership {
    pub fn new(user_id: impl Into<String>, group_id: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            group_id: group_id.into(),
        }
    }
}

/// Nesting relation: `child_group_id` is a member of `parent_group_id`
///
/// Whatever the parent confers flows down to the child and to the child's
/// members.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NestingEdge {
    pub parent_group_id: String,
    pub child_group_id: String,
}

impl NestingEdge {
    pub fn new(parent_group_id: impl Into<String>, child_group_id: impl Into<String>) -> Self {
        Self {
            parent_group_id: parent_group_id.into(),
            child_group_id: child_group_id.into(),
        }
    }
}

/// Read-only directory snapshot consumed by the role engine
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Directory {
    #[serde(default)]
    pub users: Vec<User>,
    #[serde(default)]
    pub groups: Vec<Group>,
    #[serde(default)]
    pub memberships: Vec<Membership>,
    #[serde(default)]
    pub nesting: Vec<NestingEdge>,
}

impl Directory {
    /// Create an empty directory snapshot
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_users(mut self, users: Vec<User>) -> Self {
        self.users = users;
        self
    }

    pub fn with_groups(mut self, groups: Vec<Group>) -> Self {
        self.groups = groups;
        self
    }

    pub fn with_memberships(mut self, memberships: Vec<Membership>) -> Self {
        self.memberships = memberships;
        self
    }

    pub fn with_nesting(mut self, nesting: Vec<NestingEdge>) -> Self {
        self.nesting = nesting;
        self
    }
}
