// Area Stats - Core Library
// Ingests area statistics from CSV and JSON sources into one registry and
// reports on them. Used by the CLI and by tests.

pub mod area;
pub mod config;
pub mod datasets;
pub mod error;
pub mod filters;
pub mod input;
pub mod loader;
pub mod measure;
pub mod parser;
pub mod registry;
pub mod report;

// Re-export commonly used types
pub use area::{Area, LANG_ENGLISH, LANG_WELSH};
pub use config::{
    parse_areas_arg, parse_datasets_arg, parse_measures_arg, parse_output_arg, parse_years_arg,
    RunConfig, SourceErrorPolicy,
};
pub use datasets::{areas_source, builtin_datasets, find_dataset, DatasetSource};
pub use error::{Error, Result};
pub use filters::{AreaFilter, Filters, MeasureFilter, YearFilter};
pub use input::InputFile;
pub use loader::{load_areas, load_dataset, load_datasets, LoadReport};
pub use measure::Measure;
pub use parser::{
    get_parser, ColumnMapping, ImportSummary, SourceColumn, SourceFormat, SourceParser,
    AuthorityByYearCsvParser, AuthorityCodeCsvParser, StatsWalesJsonParser,
};
pub use registry::AreaRegistry;
pub use report::{render_table, to_json, write_table, OutputMode};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
