//! Workbook schema validation
//!
//! Turns raw sheets into a typed [`Directory`], back-filling identifiers the
//! way directory exports expect:
//!
//! - `user_id` falls back to `email`, then `username`
//! - `full_name` is joined from `first_name` and `last_name`
//! - a missing `group_id` gets the next free number, counting from 1
//! - a missing group `description` copies `group_name`
//!
//! Schema problems are collected and returned together as one
//! [`CoreError::Validation`]. Relationship problems (dangling references,
//! nesting cycles) are only warnings; the engine ignores dangling edges and
//! terminates on cycles.

use adrole_core::error::{CoreError, Result};
use adrole_core::types::{Directory, Group, Membership, NestingEdge, Row, User, Workbook};
use adrole_engine::ClosureIndex;
use chrono::DateTime;
use serde_json::Value;
use std::collections::{BTreeSet, HashSet};
use tracing::{debug, warn};

pub const USERS: &str = "Users";
pub const GROUPS: &str = "Groups";
pub const USER_GROUPS: &str = "User_Groups";
pub const GROUP_GROUPS: &str = "Group_Groups";
pub const ROLES: &str = "Roles";
pub const GROUP_ROLES: &str = "Group_Roles";
pub const USER_ROLES: &str = "User_Roles";

/// Sheets every input workbook must carry
pub const REQUIRED_SHEETS: [&str; 4] = [USERS, GROUPS, USER_GROUPS, GROUP_GROUPS];

const DATETIME_FIELDS: [&str; 3] = ["created_at", "updated_at", "last_login_at"];

/// Non-fatal findings
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationReport {
    pub warnings: Vec<String>,
}

impl ValidationReport {
    fn warn(&mut self, message: String) {
        warn!("{}", message);
        self.warnings.push(message);
    }

    pub fn is_clean(&self) -> bool {
        self.warnings.is_empty()
    }
}

/// A validated, back-filled directory snapshot
#[derive(Debug, Clone)]
pub struct ValidatedDataset {
    pub directory: Directory,
    pub report: ValidationReport,
}

/// Validates raw workbooks into directory snapshots
#[derive(Debug, Clone, Default)]
pub struct SchemaValidator;

impl SchemaValidator {
    pub fn new() -> Self {
        Self
    }

    pub fn validate(&self, workbook: &Workbook) -> Result<ValidatedDataset> {
        let missing: Vec<String> = REQUIRED_SHEETS
            .iter()
            .filter(|name| !workbook.contains(name))
            .map(|name| format!("Missing required sheet: {}", name))
            .collect();
        if !missing.is_empty() {
            return Err(CoreError::validation(missing));
        }

        let mut errors = Vec::new();
        let mut report = ValidationReport::default();

        let users = validate_users(rows(workbook, USERS), &mut errors, &mut report);
        let groups = validate_groups(rows(workbook, GROUPS), &mut errors);
        let memberships = validate_edges(
            rows(workbook, USER_GROUPS),
            USER_GROUPS,
            ("user_id", "group_id"),
            &mut errors,
        )
        .into_iter()
        .map(|(user, group)| Membership::new(user, group))
        .collect();
        let nesting = validate_edges(
            rows(workbook, GROUP_GROUPS),
            GROUP_GROUPS,
            ("parent_group_id", "child_group_id"),
            &mut errors,
        )
        .into_iter()
        .map(|(parent, child)| NestingEdge::new(parent, child))
        .collect();

        if !errors.is_empty() {
            return Err(CoreError::validation(errors));
        }

        let directory = Directory::new()
            .with_users(users)
            .with_groups(groups)
            .with_memberships(memberships)
            .with_nesting(nesting);

        check_relationships(&directory, &mut report);

        debug!(
            users = directory.users.len(),
            groups = directory.groups.len(),
            memberships = directory.memberships.len(),
            nesting = directory.nesting.len(),
            warnings = report.warnings.len(),
            "Validated workbook"
        );

        Ok(ValidatedDataset { directory, report })
    }
}

fn rows<'a>(workbook: &'a Workbook, name: &str) -> &'a [Row] {
    workbook.sheet(name).map(|s| s.rows.as_slice()).unwrap_or(&[])
}

/// Non-empty text of a cell; numbers are stringified
fn cell(row: &Row, key: &str) -> Option<String> {
    match row.get(key)? {
        Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn is_blank(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(s) => s.trim().is_empty(),
        _ => false,
    }
}

fn is_boolean_like(value: &Value) -> bool {
    match value {
        Value::Bool(_) => true,
        Value::Number(n) => matches!(n.as_i64(), Some(0) | Some(1)),
        Value::String(s) => matches!(
            s.trim().to_lowercase().as_str(),
            "yes" | "no" | "true" | "false" | "1" | "0"
        ),
        _ => false,
    }
}

fn validate_users(rows: &[Row], errors: &mut Vec<String>, report: &mut ValidationReport) -> Vec<User> {
    if rows.is_empty() {
        errors.push(format!("Sheet '{}' is empty", USERS));
        return Vec::new();
    }

    let mut users = Vec::with_capacity(rows.len());
    let mut seen: HashSet<String> = HashSet::new();
    let mut missing_names = 0;

    for (i, row) in rows.iter().enumerate() {
        let line = i + 1;

        let Some(user_id) = cell(row, "user_id")
            .or_else(|| cell(row, "email"))
            .or_else(|| cell(row, "username"))
        else {
            errors.push(format!(
                "{} row {}: one of user_id, username or email is required",
                USERS, line
            ));
            continue;
        };

        for field in DATETIME_FIELDS {
            match row.get(field) {
                Some(value) if !is_blank(value) => {
                    let parsed = value
                        .as_str()
                        .map(|s| DateTime::parse_from_rfc3339(s.trim()).is_ok())
                        .unwrap_or(false);
                    if !parsed {
                        errors.push(format!(
                            "{} row {}: {} must be an ISO 8601 timestamp with timezone",
                            USERS, line, field
                        ));
                    }
                }
                _ => {}
            }
        }

        if let Some(enabled) = row.get("enabled") {
            if !is_blank(enabled) && !is_boolean_like(enabled) {
                errors.push(format!("{} row {}: enabled must be a boolean", USERS, line));
            }
        }

        let mut attributes = row.clone();
        attributes.remove("user_id");

        if cell(row, "full_name").is_none() {
            match (cell(row, "first_name"), cell(row, "last_name")) {
                (Some(first), Some(last)) => {
                    attributes.insert("full_name".to_string(), Value::String(format!("{} {}", first, last)));
                }
                _ => missing_names += 1,
            }
        }

        if !seen.insert(user_id.clone()) {
            report.warn(format!("Duplicate user_id in {}: {}", USERS, user_id));
        }

        users.push(User { user_id, attributes });
    }

    if missing_names > 0 {
        report.warn(format!(
            "{} user(s) have neither full_name nor first_name and last_name",
            missing_names
        ));
    }

    users
}

fn validate_groups(rows: &[Row], errors: &mut Vec<String>) -> Vec<Group> {
    if rows.is_empty() {
        errors.push(format!("Sheet '{}' is empty", GROUPS));
        return Vec::new();
    }

    let used: HashSet<String> = rows.iter().filter_map(|row| cell(row, "group_id")).collect();
    let mut next_id: u64 = 1;
    let mut seen: HashSet<String> = HashSet::new();
    let mut groups = Vec::with_capacity(rows.len());

    for (i, row) in rows.iter().enumerate() {
        let line = i + 1;
        let id = cell(row, "group_id");
        let name = cell(row, "group_name");

        if id.is_none() && name.is_none() {
            errors.push(format!(
                "{} row {}: one of group_id or group_name is required",
                GROUPS, line
            ));
            continue;
        }

        let group_id = id.unwrap_or_else(|| {
            while used.contains(&next_id.to_string()) {
                next_id += 1;
            }
            let assigned = next_id.to_string();
            next_id += 1;
            assigned
        });
        let group_name = name.unwrap_or_else(|| group_id.clone());
        let description = cell(row, "description").unwrap_or_else(|| group_name.clone());

        if !seen.insert(group_id.clone()) {
            errors.push(format!("{} row {}: duplicate group_id {}", GROUPS, line, group_id));
            continue;
        }

        groups.push(Group {
            group_id,
            group_name,
            description,
        });
    }

    groups
}

fn validate_edges(
    rows: &[Row],
    sheet: &str,
    (left, right): (&str, &str),
    errors: &mut Vec<String>,
) -> Vec<(String, String)> {
    let mut edges = Vec::with_capacity(rows.len());

    for (i, row) in rows.iter().enumerate() {
        match (cell(row, left), cell(row, right)) {
            (Some(a), Some(b)) => edges.push((a, b)),
            (a, _) => {
                let column = if a.is_none() { left } else { right };
                errors.push(format!("{} row {}: missing {}", sheet, i + 1, column));
            }
        }
    }

    edges
}

fn check_relationships(directory: &Directory, report: &mut ValidationReport) {
    let user_ids: HashSet<&str> = directory.users.iter().map(|u| u.user_id.as_str()).collect();
    let group_ids: HashSet<&str> = directory.groups.iter().map(|g| g.group_id.as_str()).collect();

    let unknown_users: BTreeSet<&str> = directory
        .memberships
        .iter()
        .map(|m| m.user_id.as_str())
        .filter(|id| !user_ids.contains(id))
        .collect();
    if !unknown_users.is_empty() {
        report.warn(format!("Unknown user_ids in {}: {}", USER_GROUPS, join(&unknown_users)));
    }

    let unknown_groups: BTreeSet<&str> = directory
        .memberships
        .iter()
        .map(|m| m.group_id.as_str())
        .filter(|id| !group_ids.contains(id))
        .collect();
    if !unknown_groups.is_empty() {
        report.warn(format!("Unknown group_ids in {}: {}", USER_GROUPS, join(&unknown_groups)));
    }

    let unknown_nested: BTreeSet<&str> = directory
        .nesting
        .iter()
        .flat_map(|e| [e.parent_group_id.as_str(), e.child_group_id.as_str()])
        .filter(|id| !group_ids.contains(id))
        .collect();
    if !unknown_nested.is_empty() {
        report.warn(format!("Unknown group_ids in {}: {}", GROUP_GROUPS, join(&unknown_nested)));
    }

    let index = ClosureIndex::new(&directory.groups, &directory.nesting);
    for cycle in index.cycles() {
        report.warn(format!("Circular nesting between groups: {}", cycle.join(", ")));
    }
}

fn join(ids: &BTreeSet<&str>) -> String {
    ids.iter().copied().collect::<Vec<_>>().join(", ")
}
