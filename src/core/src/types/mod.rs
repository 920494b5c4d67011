//! Shared types for adrole

pub mod directory;
pub mod roles;
pub mod catalog;
pub mod workbook;

// Re-export commonly used types
pub use directory::{Directory, Group, Membership, NestingEdge, User};
pub use roles::{GroupRole, Resolution, Role, UserRole};
pub use catalog::{Catalog, CatalogCategory};
pub use workbook::{Row, Sheet, Workbook};
