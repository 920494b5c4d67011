//! Sheet-oriented dataset container
//!
//! A workbook is an ordered set of named sheets, each a list of rows keyed
//! by column name. Input snapshots arrive with `Users`, `Groups`,
//! `User_Groups` and `Group_Groups`; output adds `Roles`, `Group_Roles` and
//! `User_Roles`.

use crate::error::{CoreError, Result};
use serde::de::{DeserializeOwned, MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map, Value};
use std::fmt;

/// One sheet row, column name → cell
pub type Row = Map<String, Value>;

/// A named sheet
#[derive(Debug, Clone, PartialEq)]
pub struct Sheet {
    pub name: String,
    pub rows: Vec<Row>,
}

/// Ordered collection of sheets
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Workbook {
    sheets: Vec<Sheet>,
}

impl Workbook {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sheets in insertion order
    pub fn sheets(&self) -> &[Sheet] {
        &self.sheets
    }

    pub fn sheet(&self, name: &str) -> Option<&Sheet> {
        self.sheets.iter().find(|s| s.name == name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.sheet(name).is_some()
    }

    /// Insert or replace a sheet; a replaced sheet keeps its position
    pub fn insert_sheet(&mut self, name: impl Into<String>, rows: Vec<Row>) {
        let name = name.into();
        match self.sheets.iter_mut().find(|s| s.name == name) {
            Some(existing) => existing.rows = rows,
            None => self.sheets.push(Sheet { name, rows }),
        }
    }

    /// Serialize typed records into a sheet
    pub fn insert_records<T: Serialize>(&mut self, name: impl Into<String>, records: &[T]) -> Result<()> {
        let name = name.into();
        let mut rows = Vec::with_capacity(records.len());
        for record in records {
            match serde_json::to_value(record)? {
                Value::Object(row) => rows.push(row),
                other => {
                    return Err(CoreError::serialization(format!(
                        "sheet '{}' record is not an object: {}",
                        name, other
                    )))
                }
            }
        }
        self.insert_sheet(name, rows);
        Ok(())
    }

    /// Deserialize every row of a sheet into typed records
    pub fn records<T: DeserializeOwned>(&self, name: &str) -> Result<Vec<T>> {
        let sheet = self
            .sheet(name)
            .ok_or_else(|| CoreError::not_found(format!("sheet '{}'", name)))?;

        sheet
            .rows
            .iter()
            .enumerate()
            .map(|(i, row)| {
                serde_json::from_value(Value::Object(row.clone())).map_err(|e| {
                    CoreError::serialization(format!("sheet '{}' row {}: {}", name, i + 1, e))
                })
            })
            .collect()
    }
}

impl Serialize for Workbook {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.sheets.len()))?;
        for sheet in &self.sheets {
            map.serialize_entry(&sheet.name, &sheet.rows)?;
        }
        map.end()
    }
}

struct WorkbookVisitor;

impl<'de> Visitor<'de> for WorkbookVisitor {
    type Value = Workbook;

    fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str("an object mapping sheet names to arrays of row objects")
    }

    fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> std::result::Result<Workbook, A::Error> {
        let mut workbook = Workbook::new();
        while let Some((name, rows)) = access.next_entry::<String, Vec<Row>>()? {
            workbook.insert_sheet(name, rows);
        }
        Ok(workbook)
    }
}

impl<'de> Deserialize<'de> for Workbook {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        deserializer.deserialize_map(WorkbookVisitor)
    }
}
