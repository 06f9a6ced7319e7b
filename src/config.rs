// ⚙️ Run configuration - everything one invocation needs, parsed from raw
// command-line values

use crate::datasets::{builtin_datasets, find_dataset, DatasetSource};
use crate::error::{Error, Result};
use crate::filters::{AreaFilter, Filters, MeasureFilter, YearFilter};
use crate::report::OutputMode;
use std::path::PathBuf;

/// What to do when a dataset fails to ingest
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SourceErrorPolicy {
    /// Stop the run at the first failing source
    #[default]
    Abort,
    /// Log the failure and carry on with the next source
    Skip,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RunConfig {
    pub data_dir: PathBuf,
    pub datasets: Vec<DatasetSource>,
    pub filters: Filters,
    pub output: OutputMode,
    pub json: bool,
    pub on_source_error: SourceErrorPolicy,
}

impl RunConfig {
    /// Every dataset, no filters, full table output
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        RunConfig {
            data_dir: data_dir.into(),
            datasets: builtin_datasets(),
            filters: Filters::all(),
            output: OutputMode::All,
            json: false,
            on_source_error: SourceErrorPolicy::Abort,
        }
    }
}

fn is_all(values: &[String]) -> bool {
    values.is_empty() || values.iter().any(|v| v.trim().eq_ignore_ascii_case("all"))
}

/// Datasets named on the command line; none or "all" selects every dataset
pub fn parse_datasets_arg(values: &[String]) -> Result<Vec<DatasetSource>> {
    if is_all(values) {
        return Ok(builtin_datasets());
    }
    values.iter().map(|code| find_dataset(code.trim())).collect()
}

pub fn parse_areas_arg(values: &[String]) -> AreaFilter {
    AreaFilter::from_values(values.iter().map(String::as_str))
}

pub fn parse_measures_arg(values: &[String]) -> MeasureFilter {
    MeasureFilter::from_values(values)
}

fn parse_year(value: &str, raw: &str) -> Result<i32> {
    if value.len() != 4 || !value.chars().all(|c| c.is_ascii_digit()) {
        return Err(Error::configuration(format!(
            "Invalid years '{}', expected YYYY or YYYY-ZZZZ",
            raw
        )));
    }
    value
        .parse()
        .map_err(|_| Error::configuration(format!("Invalid year '{}'", value)))
}

/// Parse `YYYY` or `YYYY-ZZZZ`. Empty, "0", "0-0" and "all" select every year.
pub fn parse_years_arg(value: &str) -> Result<YearFilter> {
    let value = value.trim();
    if value.is_empty() || value.eq_ignore_ascii_case("all") || value == "0" || value == "0-0" {
        return Ok(YearFilter::All);
    }

    let (start, end) = match value.split_once('-') {
        Some((start, end)) => (parse_year(start.trim(), value)?, parse_year(end.trim(), value)?),
        None => {
            let year = parse_year(value, value)?;
            (year, year)
        }
    };

    if start > end {
        return Err(Error::configuration(format!(
            "Invalid years '{}', start is after end",
            value
        )));
    }
    Ok(YearFilter::range(start, end))
}

pub fn parse_output_arg(value: &str) -> Result<OutputMode> {
    value.parse()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strings(values: &[&str]) -> Vec<String> {
        values.iter().map(|v| v.to_string()).collect()
    }

    #[test]
    fn test_parse_datasets_all() {
        assert_eq!(parse_datasets_arg(&[]).unwrap().len(), 7);
        assert_eq!(parse_datasets_arg(&strings(&["popden", "all"])).unwrap().len(), 7);
    }

    #[test]
    fn test_parse_datasets_keeps_order() {
        let datasets = parse_datasets_arg(&strings(&["trains", "popden"])).unwrap();
        let codes: Vec<&str> = datasets.iter().map(|d| d.code).collect();
        assert_eq!(codes, vec!["trains", "popden"]);
    }

    #[test]
    fn test_parse_datasets_unknown_key() {
        let err = parse_datasets_arg(&strings(&["popden", "nope"])).unwrap_err();
        assert!(matches!(err, Error::Configuration(_)));
    }

    #[test]
    fn test_parse_areas_and_measures() {
        assert!(parse_areas_arg(&[]).is_all());
        let areas = parse_areas_arg(&strings(&["W06000011", "Powys"]));
        assert_eq!(areas.needles().map(|n| n.len()), Some(2));

        let measures = parse_measures_arg(&strings(&["Pop"]));
        assert!(measures.admits("pop"));
        assert_eq!(parse_measures_arg(&strings(&["ALL"])), MeasureFilter::All);
    }

    #[test]
    fn test_parse_years() {
        assert_eq!(parse_years_arg("0").unwrap(), YearFilter::All);
        assert_eq!(parse_years_arg("").unwrap(), YearFilter::All);
        assert_eq!(parse_years_arg("0-0").unwrap(), YearFilter::All);
        assert_eq!(parse_years_arg("2010").unwrap(), YearFilter::range(2010, 2010));
        assert_eq!(
            parse_years_arg("2010-2015").unwrap(),
            YearFilter::range(2010, 2015)
        );
    }

    #[test]
    fn test_parse_years_rejects_malformed() {
        for value in ["20", "2010-", "abcd", "2010-15", "2015-2010", "2010-2012-2014"] {
            assert!(
                matches!(parse_years_arg(value), Err(Error::Configuration(_))),
                "accepted {:?}",
                value
            );
        }
    }

    #[test]
    fn test_parse_output() {
        assert_eq!(parse_output_arg("trend").unwrap(), OutputMode::Trend);
        assert!(parse_output_arg("sum").is_err());
    }

    #[test]
    fn test_run_config_defaults() {
        let config = RunConfig::new("datasets");
        assert_eq!(config.datasets.len(), 7);
        assert_eq!(config.filters, Filters::all());
        assert_eq!(config.output, OutputMode::All);
        assert_eq!(config.on_source_error, SourceErrorPolicy::Abort);
        assert!(!config.json);
    }
}
