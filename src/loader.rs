// 🚚 Loader - feeds the area list and the selected datasets into a registry

use crate::config::SourceErrorPolicy;
use crate::datasets::{areas_source, DatasetSource};
use crate::error::{Error, Result};
use crate::filters::Filters;
use crate::input::InputFile;
use crate::parser::ImportSummary;
use crate::registry::AreaRegistry;
use std::path::Path;
use tracing::{info, warn};

/// Outcome of loading a list of datasets
#[derive(Debug, Default)]
pub struct LoadReport {
    /// Dataset code and row counts, in import order
    pub imported: Vec<(String, ImportSummary)>,

    /// Dataset code and error message for every skipped source
    pub failed: Vec<(String, String)>,
}

/// Open one dataset file from `dir` and ingest it
pub fn load_dataset(
    registry: &mut AreaRegistry,
    dir: &Path,
    dataset: &DatasetSource,
    filters: &Filters,
) -> Result<ImportSummary> {
    let input = InputFile::new(dir.join(dataset.file));
    let attempt = input.open().and_then(|mut reader| {
        registry.populate(&mut reader, dataset.format, &dataset.columns, filters)
    });

    attempt.map_err(|e| e.in_source(input.path()))
}

/// Load the area list. Only the area filter applies; the list has no measures.
pub fn load_areas(registry: &mut AreaRegistry, dir: &Path, filters: &Filters) -> Result<ImportSummary> {
    let areas_only = Filters::all().with_areas(filters.areas.clone());
    let summary = load_dataset(registry, dir, &areas_source(), &areas_only)?;
    info!(areas = registry.size(), "area list loaded");
    Ok(summary)
}

/// Load every dataset in order.
///
/// With `SourceErrorPolicy::Abort` the first failure is returned; rows merged
/// before it stay in the registry. With `Skip` the failure is logged and
/// recorded in the report.
pub fn load_datasets(
    registry: &mut AreaRegistry,
    dir: &Path,
    datasets: &[DatasetSource],
    filters: &Filters,
    policy: SourceErrorPolicy,
) -> Result<LoadReport> {
    let mut report = LoadReport::default();

    for dataset in datasets {
        match load_dataset(registry, dir, dataset, filters) {
            Ok(summary) => {
                info!(dataset = dataset.code, name = dataset.name, "dataset loaded");
                report.imported.push((dataset.code.to_string(), summary));
            }
            Err(err) => match policy {
                SourceErrorPolicy::Abort => return Err(err),
                SourceErrorPolicy::Skip => {
                    warn!(dataset = dataset.code, error = %err, "skipping dataset");
                    report.failed.push((dataset.code.to_string(), err.to_string()));
                }
            },
        }
    }

    Ok(report)
}

impl LoadReport {
    pub fn has_failures(&self) -> bool {
        !self.failed.is_empty()
    }
}

/// Unwrap a loader error down to the failure inside the source
pub fn root_cause(err: &Error) -> &Error {
    match err {
        Error::Source { source, .. } => root_cause(source),
        other => other,
    }
}
