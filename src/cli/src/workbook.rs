//! JSON workbook storage
//!
//! A workbook file is a JSON object of sheet name → array of row objects,
//! the same sheet layout as the spreadsheet exports it replaces.

use adrole_core::error::{CoreError, Result};
use adrole_core::traits::{DatasetSink, DatasetSource};
use adrole_core::types::{Catalog, Workbook};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Workbook stored as a JSON file
#[derive(Debug, Clone)]
pub struct JsonWorkbook {
    path: PathBuf,
}

impl JsonWorkbook {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl DatasetSource for JsonWorkbook {
    fn load(&self) -> Result<Workbook> {
        if !self.path.exists() {
            return Err(CoreError::not_found(format!(
                "input file {}",
                self.path.display()
            )));
        }

        let contents = fs::read_to_string(&self.path)?;
        let workbook: Workbook = serde_json::from_str(&contents).map_err(|e| {
            CoreError::serialization(format!("{}: {}", self.path.display(), e))
        })?;

        debug!(
            path = %self.path.display(),
            sheets = ?workbook.sheets().iter().map(|s| s.name.as_str()).collect::<Vec<_>>(),
            "Loaded workbook"
        );
        Ok(workbook)
    }

    fn describe(&self) -> String {
        self.path.display().to_string()
    }
}

impl DatasetSink for JsonWorkbook {
    fn store(&self, workbook: &Workbook) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        let contents = serde_json::to_string_pretty(workbook)?;
        fs::write(&self.path, contents)?;

        info!(path = %self.path.display(), sheets = workbook.sheets().len(), "Wrote workbook");
        Ok(())
    }

    fn describe(&self) -> String {
        self.path.display().to_string()
    }
}

/// Load a role catalog from a JSON file
pub fn load_catalog(path: &Path) -> Result<Catalog> {
    if !path.exists() {
        return Err(CoreError::not_found(format!(
            "builtin groups file {}",
            path.display()
        )));
    }

    let contents = fs::read_to_string(path)?;
    let catalog: Catalog = serde_json::from_str(&contents)
        .map_err(|e| CoreError::serialization(format!("{}: {}", path.display(), e)))?;

    debug!(
        path = %path.display(),
        categories = catalog.categories().len(),
        names = catalog.len(),
        "Loaded role catalog"
    );
    Ok(catalog)
}
