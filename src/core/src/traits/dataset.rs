//! Dataset storage traits
//!
//! The role engine never touches storage formats. Whatever reads an
//! exported directory snapshot, or writes the augmented one back, sits
//! behind these traits.

use crate::error::Result;
use crate::types::Workbook;

/// Something a raw workbook can be loaded from
pub trait DatasetSource {
    /// Load every sheet
    fn load(&self) -> Result<Workbook>;

    /// Human-readable location, used in logs
    fn describe(&self) -> String;
}

/// Something a workbook can be written to
pub trait DatasetSink {
    /// Persist the workbook, replacing any previous content
    fn store(&self, workbook: &Workbook) -> Result<()>;

    /// Human-readable location, used in logs
    fn describe(&self) -> String;
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;

    struct MemoryStore {
        inner: RefCell<Workbook>,
    }

    impl DatasetSource for MemoryStore {
        fn load(&self) -> Result<Workbook> {
            Ok(self.inner.borrow().clone())
        }

        fn describe(&self) -> String {
            "memory".to_string()
        }
    }

    impl DatasetSink for MemoryStore {
        fn store(&self, workbook: &Workbook) -> Result<()> {
            *self.inner.borrow_mut() = workbook.clone();
            Ok(())
        }

        fn describe(&self) -> String {
            "memory".to_string()
        }
    }

    #[test]
    fn test_store_then_load() {
        let store = MemoryStore {
            inner: RefCell::new(Workbook::new()),
        };
        let mut workbook = Workbook::new();
        workbook.insert_sheet("Roles", vec![]);

        DatasetSink::store(&store, &workbook).unwrap();
        let loaded = DatasetSource::load(&store).unwrap();
        assert!(loaded.contains("Roles"));
    }
}
