//! Catalog normalization
//!
//! Flattens a categorized catalog into one priority-ordered list of
//! role-eligible names. Names from the priority category come first, in
//! their original order; every other category follows in declaration order.
//! A name is emitted once, attributed to the first category that listed it.

use adrole_core::types::Catalog;
use adrole_core::DEFAULT_PRIORITY_CATEGORY;
use std::collections::HashSet;
use tracing::debug;

/// A role-eligible group name and the category it was taken from
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EligibleName {
    pub name: String,
    pub category: String,
}

/// Produces the deduplicated, priority-ordered eligible name list
#[derive(Debug, Clone)]
pub struct CatalogNormalizer {
    priority_category: String,
}

impl CatalogNormalizer {
    /// Create a normalizer with an explicit priority category
    pub fn new(priority_category: impl Into<String>) -> Self {
        Self {
            priority_category: priority_category.into(),
        }
    }

    pub fn priority_category(&self) -> &str {
        &self.priority_category
    }

    /// Normalize a catalog into eligible names
    ///
    /// The priority category may be missing from the catalog, in which case
    /// plain declaration order applies.
    pub fn normalize(&self, catalog: &Catalog) -> Vec<EligibleName> {
        let mut seen: HashSet<&str> = HashSet::new();
        let mut eligible = Vec::with_capacity(catalog.len());

        let priority = catalog.category(&self.priority_category);
        let rest = catalog
            .categories()
            .iter()
            .filter(|c| c.name != self.priority_category);

        for category in priority.into_iter().chain(rest) {
            for name in &category.groups {
                if !seen.insert(name.as_str()) {
                    continue;
                }
                eligible.push(EligibleName {
                    name: name.clone(),
                    category: category.name.clone(),
                });
            }
        }

        debug!(
            categories = catalog.categories().len(),
            listed = catalog.len(),
            eligible = eligible.len(),
            priority = %self.priority_category,
            "Normalized role catalog"
        );

        eligible
    }
}

impl Default for CatalogNormalizer {
    fn default() -> Self {
        Self::new(DEFAULT_PRIORITY_CATEGORY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(eligible: &[EligibleName]) -> Vec<(&str, &str)> {
        eligible
            .iter()
            .map(|e| (e.name.as_str(), e.category.as_str()))
            .collect()
    }

    #[test]
    fn test_priority_category_first() {
        let catalog = Catalog::new()
            .with_category("BuiltIn_AD_Groups", ["Domain Admins"])
            .with_category("Original_Role_Groups", ["Administrators", "Users"])
            .with_category("Exchange_Server_Groups", ["Exchange Admins"]);

        let eligible = CatalogNormalizer::default().normalize(&catalog);

        assert_eq!(
            names(&eligible),
            vec![
                ("Administrators", "Original_Role_Groups"),
                ("Users", "Original_Role_Groups"),
                ("Domain Admins", "BuiltIn_AD_Groups"),
                ("Exchange Admins", "Exchange_Server_Groups"),
            ]
        );
    }

    #[test]
    fn test_priority_category_wins_duplicates() {
        let catalog = Catalog::new()
            .with_category("Exchange_Server_Groups", ["Administrators", "Exchange Admins"])
            .with_category("Original_Role_Groups", ["Administrators"]);

        let eligible = CatalogNormalizer::default().normalize(&catalog);

        assert_eq!(
            names(&eligible),
            vec![
                ("Administrators", "Original_Role_Groups"),
                ("Exchange Admins", "Exchange_Server_Groups"),
            ]
        );
    }

    #[test]
    fn test_duplicates_within_and_across_other_categories() {
        let catalog = Catalog::new()
            .with_category("A", ["x", "y", "x"])
            .with_category("B", ["y", "z"]);

        let eligible = CatalogNormalizer::default().normalize(&catalog);
        assert_eq!(names(&eligible), vec![("x", "A"), ("y", "A"), ("z", "B")]);
    }

    #[test]
    fn test_custom_priority_category() {
        let catalog = Catalog::new()
            .with_category("A", ["x"])
            .with_category("Tier0", ["x", "y"]);

        let eligible = CatalogNormalizer::new("Tier0").normalize(&catalog);
        assert_eq!(names(&eligible), vec![("x", "Tier0"), ("y", "Tier0")]);
    }

    #[test]
    fn test_missing_priority_category_keeps_declaration_order() {
        let catalog = Catalog::new()
            .with_category("B", ["b"])
            .with_category("A", ["a"]);

        let eligible = CatalogNormalizer::default().normalize(&catalog);
        assert_eq!(names(&eligible), vec![("b", "B"), ("a", "A")]);
    }

    #[test]
    fn test_empty_catalog() {
        assert!(CatalogNormalizer::default().normalize(&Catalog::new()).is_empty());
    }

    #[test]
    fn test_empty_name_is_an_ordinary_name() {
        let catalog = Catalog::new()
            .with_category("A", ["", "x"])
            .with_category("B", [""]);
        let eligible = CatalogNormalizer::default().normalize(&catalog);
        assert_eq!(names(&eligible), vec![("", "A"), ("x", "A")]);
    }
}
