//! # adrole Core
//!
//! Shared directory model, role catalog and error handling for the adrole
//! workspace. The engine and the workbook tooling both depend on this crate
//! so neither has to know about the other.

pub mod types;
pub mod traits;
pub mod error;

// Re-export commonly used types
pub use error::{CoreError, Result};
pub use types::{
    Catalog, Directory, Group, GroupRole, Membership, NestingEdge, Resolution, Role, User,
    UserRole, Workbook,
};
pub use traits::{DatasetSink, DatasetSource};

/// Identifier of a directory group
pub type GroupId = String;

/// Identifier of a directory user
pub type UserId = String;

/// Identifier of a minted role (always the anchor group's id)
pub type RoleId = String;

/// Category name used when no other priority category is configured
pub const DEFAULT_PRIORITY_CATEGORY: &str = "Original_Role_Groups";
