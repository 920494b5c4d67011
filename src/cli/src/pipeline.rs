//! Load → validate → resolve → write

use crate::validate::{
    SchemaValidator, ValidatedDataset, GROUPS, GROUP_GROUPS, GROUP_ROLES, ROLES, USERS,
    USER_GROUPS, USER_ROLES,
};
use crate::workbook::JsonWorkbook;
use adrole_core::error::Result;
use adrole_core::traits::{DatasetSink, DatasetSource};
use adrole_core::types::{Catalog, Directory, Resolution, Workbook};
use adrole_engine::RoleEngine;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{info, info_span, warn};

/// Counts reported after a mapping run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MapSummary {
    pub users: usize,
    pub groups: usize,
    pub roles: usize,
    pub group_roles: usize,
    pub user_roles: usize,
    pub warnings: usize,
    pub output: String,
}

impl fmt::Display for MapSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Processing Summary:")?;
        writeln!(f, "  Users:        {}", self.users)?;
        writeln!(f, "  Groups:       {}", self.groups)?;
        writeln!(f, "  Roles:        {}", self.roles)?;
        writeln!(f, "  Group roles:  {}", self.group_roles)?;
        writeln!(f, "  User roles:   {}", self.user_roles)?;
        writeln!(f, "  Warnings:     {}", self.warnings)?;
        write!(f, "  Output:       {}", self.output)
    }
}

/// Assemble the output workbook: validated input sheets, then the three role sheets
pub fn build_output_workbook(directory: &Directory, resolution: &Resolution) -> Result<Workbook> {
    let mut workbook = Workbook::new();
    workbook.insert_records(USERS, &directory.users)?;
    workbook.insert_records(GROUPS, &directory.groups)?;
    workbook.insert_records(USER_GROUPS, &directory.memberships)?;
    workbook.insert_records(GROUP_GROUPS, &directory.nesting)?;
    workbook.insert_records(ROLES, &resolution.roles)?;
    workbook.insert_records(GROUP_ROLES, &resolution.group_roles)?;
    workbook.insert_records(USER_ROLES, &resolution.user_roles)?;
    Ok(workbook)
}

/// Validate a workbook read from `source`
pub fn validate_only(source: &dyn DatasetSource) -> Result<ValidatedDataset> {
    let workbook = source.load()?;
    SchemaValidator::new().validate(&workbook)
}

/// Run one workbook through the engine and write the result to `sink`
pub fn map_dataset(
    source: &dyn DatasetSource,
    sink: &dyn DatasetSink,
    catalog: &Catalog,
    engine: &RoleEngine,
) -> Result<MapSummary> {
    let span = info_span!("map", input = %source.describe());
    let _enter = span.enter();

    let dataset = validate_only(source)?;
    let resolution = engine.resolve(&dataset.directory, catalog);
    let output = build_output_workbook(&dataset.directory, &resolution)?;
    sink.store(&output)?;

    let summary = MapSummary {
        users: dataset.directory.users.len(),
        groups: dataset.directory.groups.len(),
        roles: resolution.roles.len(),
        group_roles: resolution.group_roles.len(),
        user_roles: resolution.user_roles.len(),
        warnings: dataset.report.warnings.len(),
        output: sink.describe(),
    };

    info!(
        roles = summary.roles,
        group_roles = summary.group_roles,
        user_roles = summary.user_roles,
        output = %summary.output,
        "Mapping complete"
    );

    Ok(summary)
}

/// JSON workbooks directly inside `dir`, sorted by file name
pub fn discover_workbooks(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut paths = Vec::new();
    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        let is_json = path
            .extension()
            .map(|ext| ext.eq_ignore_ascii_case("json"))
            .unwrap_or(false);
        if path.is_file() && is_json {
            paths.push(path);
        }
    }
    paths.sort();
    Ok(paths)
}

/// Outcome of a batch run; failures carry the input path and error text
#[derive(Debug, Default)]
pub struct BatchReport {
    pub processed: Vec<MapSummary>,
    pub failed: Vec<(PathBuf, String)>,
}

impl BatchReport {
    pub fn is_success(&self) -> bool {
        self.failed.is_empty()
    }
}

/// Map every workbook in `input_dir` to `output_dir/processed_<name>`
///
/// One bad workbook does not stop the rest; its error lands in
/// [`BatchReport::failed`].
pub fn run_batch(
    input_dir: &Path,
    output_dir: &Path,
    catalog: &Catalog,
    engine: &RoleEngine,
) -> Result<BatchReport> {
    let inputs = discover_workbooks(input_dir)?;
    if inputs.is_empty() {
        return Err(adrole_core::CoreError::not_found(format!(
            "JSON workbooks in {}",
            input_dir.display()
        )));
    }

    info!(count = inputs.len(), input_dir = %input_dir.display(), "Starting batch");

    let mut report = BatchReport::default();
    for input in inputs {
        let Some(name) = input.file_name().and_then(|n| n.to_str()) else {
            continue;
        };
        let source = JsonWorkbook::new(&input);
        let sink = JsonWorkbook::new(output_dir.join(format!("processed_{}", name)));

        match map_dataset(&source, &sink, catalog, engine) {
            Ok(summary) => report.processed.push(summary),
            Err(e) => {
                warn!(input = %input.display(), error = %e, "Failed to process workbook");
                report.failed.push((input, e.to_string()));
            }
        }
    }

    Ok(report)
}
