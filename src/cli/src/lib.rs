//! adrole command line library
//!
//! Workbook storage, schema validation, configuration and the
//! load → validate → resolve → write pipeline behind the `adrole` binary.

pub mod config;
pub mod pipeline;
pub mod validate;
pub mod workbook;

pub use config::AppConfig;
pub use pipeline::{map_dataset, run_batch, validate_only, BatchReport, MapSummary};
pub use validate::{SchemaValidator, ValidatedDataset, ValidationReport};
pub use workbook::{load_catalog, JsonWorkbook};
