//! Role engine facade
//!
//! Runs the four stages in order: catalog normalization, role minting,
//! closure indexing and projection. Every run is a pure function of the
//! directory snapshot and the catalog.

use crate::catalog::CatalogNormalizer;
use crate::closure::ClosureIndex;
use crate::error::{EngineError, Result};
use crate::minter::RoleMinter;
use crate::projector::RoleProjector;
use adrole_core::types::{Catalog, Directory, Resolution};
use adrole_core::DEFAULT_PRIORITY_CATEGORY;
use serde::{Deserialize, Serialize};
use tracing::{info, info_span};

/// Role engine configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Catalog category whose names take precedence over every other
    #[serde(default = "default_priority_category")]
    pub priority_category: String,

    /// Project roles on a thread pool
    #[serde(default)]
    pub parallel: bool,
}

fn default_priority_category() -> String {
    DEFAULT_PRIORITY_CATEGORY.to_string()
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            priority_category: default_priority_category(),
            parallel: false,
        }
    }
}

impl EngineConfig {
    pub fn with_priority_category(mut self, category: impl Into<String>) -> Self {
        self.priority_category = category.into();
        self
    }

    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.priority_category.trim().is_empty() {
            return Err(EngineError::InvalidConfig(
                "priority category cannot be empty".to_string(),
            ));
        }
        Ok(())
    }
}

/// Derives roles, group-role and user-role relations from a directory
///
/// # Example
///
/// ```rust
/// use adrole_core::types::{Catalog, Directory, Group, Membership, NestingEdge};
/// use adrole_engine::{EngineConfig, RoleEngine};
///
/// let directory = Directory::new()
///     .with_groups(vec![
///         Group::new("G1", "Administrators", "Admin Group"),
///         Group::new("G2", "SubGroup", ""),
///     ])
///     .with_nesting(vec![NestingEdge::new("G1", "G2")])
///     .with_memberships(vec![Membership::new("U1", "G2")]);
/// let catalog = Catalog::new().with_category("Original_Role_Groups", ["Administrators"]);
///
/// let engine = RoleEngine::new(EngineConfig::default()).unwrap();
/// let resolution = engine.resolve(&directory, &catalog);
///
/// assert_eq!(resolution.roles.len(), 1);
/// assert_eq!(resolution.group_roles.len(), 2);
/// assert_eq!(resolution.user_roles.len(), 1);
/// ```
#[derive(Debug, Clone)]
pub struct RoleEngine {
    config: EngineConfig,
    normalizer: CatalogNormalizer,
    minter: RoleMinter,
    projector: RoleProjector,
}

impl RoleEngine {
    pub fn new(config: EngineConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            normalizer: CatalogNormalizer::new(config.priority_category.clone()),
            minter: RoleMinter::new(),
            projector: RoleProjector::new().with_parallel(config.parallel),
            config,
        })
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Resolve roles for a directory snapshot
    ///
    /// Never fails: unmatched names, dangling references and nesting cycles
    /// only shrink the result.
    pub fn resolve(&self, directory: &Directory, catalog: &Catalog) -> Resolution {
        let span = info_span!("resolve", groups = directory.groups.len(), users = directory.users.len());
        let _guard = span.enter();

        let eligible = self.normalizer.normalize(catalog);
        let roles = self.minter.mint(&eligible, &directory.groups);

        let index = ClosureIndex::new(&directory.groups, &directory.nesting);
        let (group_roles, user_roles) =
            self.projector
                .project(&roles, &index, &directory.memberships);

        let stats = index.stats();
        info!(
            roles = roles.len(),
            group_roles = group_roles.len(),
            user_roles = user_roles.len(),
            memo_entries = stats.entries,
            memo_shared = stats.shared,
            "Resolved role assignments"
        );

        Resolution {
            roles,
            group_roles,
            user_roles,
        }
    }
}

impl Default for RoleEngine {
    fn default() -> Self {
        let config = EngineConfig::default();
        Self {
            normalizer: CatalogNormalizer::new(config.priority_category.clone()),
            minter: RoleMinter::new(),
            projector: RoleProjector::new(),
            config,
        }
    }
}
