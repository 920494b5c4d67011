//! # adrole Engine
//!
//! Derives role assignments from a directory's group graph.
//!
//! ## Stages
//!
//! - **Catalog normalization**: one deduplicated, priority-ordered list of
//!   role-eligible group names
//! - **Role minting**: one role per group whose name exactly matches
//! - **Closure indexing**: memoized, cycle-safe transitive closure of the
//!   nested-group graph
//! - **Projection**: group-role and user-role pairs, deduplicated, in a
//!   deterministic order
//!
//! ## Example
//!
//! ```rust
//! use adrole_core::types::{Catalog, Directory, Group};
//! use adrole_engine::RoleEngine;
//!
//! let directory = Directory::new().with_groups(vec![Group::new("G1", "Domain Admins", "")]);
//! let catalog = Catalog::new().with_category("BuiltIn_AD_Groups", ["Domain Admins"]);
//!
//! let resolution = RoleEngine::default().resolve(&directory, &catalog);
//! assert_eq!(resolution.roles[0].source, "BuiltIn_AD_Groups");
//! ```

pub mod catalog;
pub mod minter;
pub mod closure;
pub mod projector;
pub mod engine;
pub mod error;

// Re-export commonly used types
pub use catalog::{CatalogNormalizer, EligibleName};
pub use minter::RoleMinter;
pub use closure::{CacheStats, ClosureIndex, GroupSet};
pub use projector::{MembershipIndex, RoleProjection, RoleProjector};
pub use engine::{EngineConfig, RoleEngine};
pub use error::{EngineError, Result};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
