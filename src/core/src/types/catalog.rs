//! Categorized catalog of role-eligible group names
//!
//! A catalog is an *ordered* mapping from category name to group names. It
//! is usually loaded from a JSON object such as:
//!
//! ```json
//! {
//!     "BuiltIn_AD_Groups": ["Domain Admins"],
//!     "Original_Role_Groups": ["Administrators", "Users"],
//!     "Exchange_Server_Groups": ["Exchange Admins"]
//! }
//! ```
//!
//! Declaration order decides precedence between categories, so the
//! (de)serializers below keep document order instead of going through a
//! hash or sorted map.

use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

/// One catalog category and its group names, in declaration order
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogCategory {
    pub name: String,
    pub groups: Vec<String>,
}

/// Ordered category → group-name mapping
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Catalog {
    categories: Vec<CatalogCategory>,
}

impl Catalog {
    /// Create an empty catalog
    pub fn new() -> Self {
        Self::default()
    }

    /// Append group names to a category
    ///
    /// A category that already exists keeps its original position; the new
    /// names are appended to it.
    pub fn with_category<I, S>(mut self, name: impl Into<String>, groups: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.push_category(name.into(), groups.into_iter().map(Into::into).collect());
        self
    }

    fn push_category(&mut self, name: String, groups: Vec<String>) {
        match self.categories.iter_mut().find(|c| c.name == name) {
            Some(existing) => existing.groups.extend(groups),
            None => self.categories.push(CatalogCategory { name, groups }),
        }
    }

    /// Categories in declaration order
    pub fn categories(&self) -> &[CatalogCategory] {
        &self.categories
    }

    /// Look up a category by name
    pub fn category(&self, name: &str) -> Option<&CatalogCategory> {
        self.categories.iter().find(|c| c.name == name)
    }

    pub fn is_empty(&self) -> bool {
        self.categories.iter().all(|c| c.groups.is_empty())
    }

    /// Total number of names across all categories, duplicates included
    pub fn len(&self) -> usize {
        self.categories.iter().map(|c| c.groups.len()).sum()
    }
}

impl Serialize for Catalog {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.categories.len()))?;
        for category in &self.categories {
            map.serialize_entry(&category.name, &category.groups)?;
        }
        map.end()
    }
}

struct CatalogVisitor;

impl<'de> Visitor<'de> for CatalogVisitor {
    type Value = Catalog;

    fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str("an object mapping category names to lists of group names")
    }

    fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Catalog, A::Error> {
        let mut catalog = Catalog::new();
        while let Some((name, groups)) = access.next_entry::<String, Vec<String>>()? {
            catalog.push_category(name, groups);
        }
        Ok(catalog)
    }
}

impl<'de> Deserialize<'de> for Catalog {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_map(CatalogVisitor)
    }
}
