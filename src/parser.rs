// 🏗️ Parser Framework - one format adapter per source layout
//
// Every adapter streams its input, applies the filters row by row, and merges
// straight into the registry. A malformed row aborts the adapter with a
// format error; rows merged before it are kept.

use crate::area::{Area, LANG_ENGLISH, LANG_WELSH};
use crate::error::{Error, Result};
use crate::filters::Filters;
use crate::measure::Measure;
use crate::registry::AreaRegistry;
use serde_json::Value;
use std::collections::HashMap;
use std::io::BufRead;
use tracing::debug;

// ============================================================================
// CORE TYPES
// ============================================================================

/// SourceFormat - which layout a source file uses
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SourceFormat {
    /// Entity registry: code, English name, Welsh name
    AuthorityCodeCsv,

    /// One row per area, one column per year, single measure
    AuthorityByYearCsv,

    /// StatsWales JSON export: `{"value": [ {..record..}, .. ]}`
    StatsWalesJson,
}

impl SourceFormat {
    /// Human-readable name for display and error messages
    pub fn name(&self) -> &'static str {
        match self {
            SourceFormat::AuthorityCodeCsv => "AuthorityCodeCSV",
            SourceFormat::AuthorityByYearCsv => "AuthorityByYearCSV",
            SourceFormat::StatsWalesJson => "WelshStatsJSON",
        }
    }
}

/// Logical columns a dataset can map onto its own headings / field names
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SourceColumn {
    AuthCode,
    AuthNameEng,
    AuthNameCym,
    MeasureCode,
    MeasureName,
    /// Fixed measure code when the file holds a single measure
    SingleMeasureCode,
    /// Fixed measure label when the file holds a single measure
    SingleMeasureName,
    Year,
    Value,
}

/// Mapping from logical columns to the names used by one dataset
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ColumnMapping {
    columns: HashMap<SourceColumn, String>,
}

impl ColumnMapping {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder pattern: map a column
    pub fn with(mut self, column: SourceColumn, name: impl Into<String>) -> Self {
        self.columns.insert(column, name.into());
        self
    }

    pub fn get(&self, column: SourceColumn) -> Option<&str> {
        self.columns.get(&column).map(String::as_str)
    }

    /// Mapped name for a column the format cannot work without
    pub fn require(&self, column: SourceColumn, format: SourceFormat) -> Result<&str> {
        self.get(column).ok_or_else(|| {
            Error::configuration(format!(
                "{} requires a {:?} column in the column mapping",
                format.name(),
                column
            ))
        })
    }
}

/// Row counts for one ingestion call
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ImportSummary {
    pub rows_read: usize,
    pub rows_imported: usize,
    pub rows_skipped: usize,
}

impl ImportSummary {
    fn skip(&mut self) {
        self.rows_skipped += 1;
    }

    fn import(&mut self) {
        self.rows_imported += 1;
    }
}

// ============================================================================
// PARSER TRAIT + FACTORY
// ============================================================================

/// SourceParser - one implementation per SourceFormat
pub trait SourceParser {
    /// Parse the whole stream into the registry
    fn parse(
        &self,
        reader: &mut dyn BufRead,
        registry: &mut AreaRegistry,
        columns: &ColumnMapping,
        filters: &Filters,
    ) -> Result<ImportSummary>;

    /// The format this parser handles
    fn format(&self) -> SourceFormat;
}

/// Get the parser for a source format
pub fn get_parser(format: SourceFormat) -> Box<dyn SourceParser> {
    match format {
        SourceFormat::AuthorityCodeCsv => Box::new(AuthorityCodeCsvParser),
        SourceFormat::AuthorityByYearCsv => Box::new(AuthorityByYearCsvParser),
        SourceFormat::StatsWalesJson => Box::new(StatsWalesJsonParser),
    }
}

fn csv_reader(reader: &mut dyn BufRead) -> csv::Reader<&mut dyn BufRead> {
    csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(reader)
}

/// Line a record came from, falling back to its position after the header
fn record_line(record: &csv::StringRecord, index: usize) -> usize {
    record
        .position()
        .map(|p| p.line() as usize)
        .unwrap_or(index + 2)
}

fn csv_error(format: SourceFormat, fallback_line: usize, err: csv::Error) -> Error {
    let line = err
        .position()
        .map(|p| p.line() as usize)
        .unwrap_or(fallback_line);
    Error::format(format.name(), line, err.to_string())
}

// ============================================================================
// ENTITY REGISTRY CSV
// ============================================================================

/// Parser for the area list: `code,english name,welsh name`
pub struct AuthorityCodeCsvParser;

impl SourceParser for AuthorityCodeCsvParser {
    fn parse(
        &self,
        reader: &mut dyn BufRead,
        registry: &mut AreaRegistry,
        _columns: &ColumnMapping,
        filters: &Filters,
    ) -> Result<ImportSummary> {
        let format = self.format();
        let mut reader = csv_reader(reader);
        let mut summary = ImportSummary::default();

        // Layout is positional, the header only needs to be readable
        reader.headers().map_err(|e| csv_error(format, 1, e))?;

        for (index, result) in reader.records().enumerate() {
            let record = result.map_err(|e| csv_error(format, index + 2, e))?;
            let line = record_line(&record, index);
            summary.rows_read += 1;

            if record.len() != 3 {
                return Err(Error::format(
                    format.name(),
                    line,
                    format!("expected 3 columns, found {}", record.len()),
                ));
            }

            let (code, english, welsh) = (&record[0], &record[1], &record[2]);
            if code.is_empty() {
                return Err(Error::format(format.name(), line, "missing authority code"));
            }

            if let Some(needles) = filters.areas.needles() {
                let matches = AreaRegistry::wildcard_match(needles, code)
                    + AreaRegistry::wildcard_match(needles, english)
                    + AreaRegistry::wildcard_match(needles, welsh);
                if matches == 0 {
                    debug!(line, code, "area filtered out");
                    summary.skip();
                    continue;
                }
            }

            let area = Area::new(code)
                .with_name(LANG_ENGLISH, english)?
                .with_name(LANG_WELSH, welsh)?;
            registry.merge_area(area);
            summary.import();
        }

        Ok(summary)
    }

    fn format(&self) -> SourceFormat {
        SourceFormat::AuthorityCodeCsv
    }
}

// ============================================================================
// AUTHORITY BY YEAR CSV
// ============================================================================

/// Header cell of a wide year table
#[derive(Debug, Clone, Copy, PartialEq)]
enum YearTableColumn {
    AuthorityCode,
    Year(i32),
}

/// Parser for wide tables: one authority-code column plus one column per year.
/// The file holds a single measure whose code and label come from the mapping.
pub struct AuthorityByYearCsvParser;

impl AuthorityByYearCsvParser {
    fn read_layout(
        format: SourceFormat,
        headers: &csv::StringRecord,
        auth_column: &str,
    ) -> Result<(Vec<YearTableColumn>, usize)> {
        let layout = headers
            .iter()
            .map(|cell| {
                if cell == auth_column {
                    Ok(YearTableColumn::AuthorityCode)
                } else {
                    cell.parse::<i32>().map(YearTableColumn::Year).map_err(|_| {
                        Error::format(
                            format.name(),
                            1,
                            format!(
                                "column heading '{}' is neither '{}' nor a year",
                                cell, auth_column
                            ),
                        )
                    })
                }
            })
            .collect::<Result<Vec<_>>>()?;

        let auth_index = layout
            .iter()
            .position(|c| *c == YearTableColumn::AuthorityCode)
            .ok_or_else(|| {
                Error::format(
                    format.name(),
                    1,
                    format!("header has no '{}' column", auth_column),
                )
            })?;

        Ok((layout, auth_index))
    }
}

impl SourceParser for AuthorityByYearCsvParser {
    fn parse(
        &self,
        reader: &mut dyn BufRead,
        registry: &mut AreaRegistry,
        columns: &ColumnMapping,
        filters: &Filters,
    ) -> Result<ImportSummary> {
        let format = self.format();
        let auth_column = columns.require(SourceColumn::AuthCode, format)?;
        let measure_code = columns.require(SourceColumn::SingleMeasureCode, format)?;
        let measure_label = columns.require(SourceColumn::SingleMeasureName, format)?;

        let mut reader = csv_reader(reader);
        let mut summary = ImportSummary::default();

        let headers = reader.headers().map_err(|e| csv_error(format, 1, e))?.clone();
        let (layout, auth_index) = Self::read_layout(format, &headers, auth_column)?;

        if !filters.measures.admits(measure_code) {
            debug!(measure = measure_code, "measure filtered out, skipping source");
            return Ok(summary);
        }

        for (index, result) in reader.records().enumerate() {
            let record = result.map_err(|e| csv_error(format, index + 2, e))?;
            let line = record_line(&record, index);
            summary.rows_read += 1;

            if record.len() > layout.len() {
                return Err(Error::format(
                    format.name(),
                    line,
                    format!(
                        "row has {} cells but the header has {}",
                        record.len(),
                        layout.len()
                    ),
                ));
            }

            let code = match record.get(auth_index) {
                Some(code) if !code.is_empty() => code,
                _ => {
                    return Err(Error::format(format.name(), line, "missing authority code"));
                }
            };

            if !registry.admits_area(&filters.areas, code) {
                debug!(line, code, "area filtered out");
                summary.skip();
                continue;
            }

            // Parse the whole row before touching the registry
            let mut measure = Measure::new(measure_code, measure_label);
            for (cell, column) in record.iter().zip(&layout) {
                let year = match column {
                    YearTableColumn::Year(year) => *year,
                    YearTableColumn::AuthorityCode => continue,
                };
                if !filters.years.admits(year) || cell.is_empty() {
                    continue;
                }
                let value = cell.parse::<f64>().ok().filter(|v| v.is_finite());
                let value = value.ok_or_else(|| {
                    Error::format(
                        format.name(),
                        line,
                        format!("could not parse '{}' for year {}", cell, year),
                    )
                })?;
                measure.set(year, value);
            }

            let code = registry.resolve_code(code).unwrap_or(code).to_string();
            registry.merge_area(Area::new(code).with_measure(measure));
            summary.import();
        }

        Ok(summary)
    }

    fn format(&self) -> SourceFormat {
        SourceFormat::AuthorityByYearCsv
    }
}

// ============================================================================
// STATSWALES JSON
// ============================================================================

/// Where a record's measure code and label come from
enum MeasureSource<'a> {
    /// Read from these fields of every record
    PerRecord { code_field: &'a str, label_field: &'a str },

    /// The same for every record
    Fixed { code: &'a str, label: &'a str },
}

/// Parser for StatsWales JSON exports: a `value` array of flat records
pub struct StatsWalesJsonParser;

impl StatsWalesJsonParser {
    fn measure_source(columns: &ColumnMapping, format: SourceFormat) -> Result<MeasureSource<'_>> {
        let per_record = (
            columns.get(SourceColumn::MeasureCode),
            columns.get(SourceColumn::MeasureName),
        );
        if let (Some(code_field), Some(label_field)) = per_record {
            return Ok(MeasureSource::PerRecord {
                code_field,
                label_field,
            });
        }

        let fixed = (
            columns.get(SourceColumn::SingleMeasureCode),
            columns.get(SourceColumn::SingleMeasureName),
        );
        if let (Some(code), Some(label)) = fixed {
            return Ok(MeasureSource::Fixed { code, label });
        }

        Err(Error::configuration(format!(
            "{} needs MeasureCode/MeasureName or SingleMeasureCode/SingleMeasureName",
            format.name()
        )))
    }

    fn text_field(&self, record: &Value, field: &str, row: usize) -> Result<String> {
        match record.get(field) {
            Some(Value::String(s)) => Ok(s.clone()),
            Some(Value::Number(n)) => Ok(n.to_string()),
            _ => Err(Error::format(
                self.format().name(),
                row,
                format!("field '{}' is missing or not text", field),
            )),
        }
    }

    /// Years are usually strings ("1991") but numbers are accepted too
    fn year_field(&self, record: &Value, field: &str, row: usize) -> Result<i32> {
        let parsed = match record.get(field) {
            Some(Value::String(s)) => s.trim().parse::<i32>().ok(),
            Some(Value::Number(n)) => n.as_i64().and_then(|y| i32::try_from(y).ok()),
            _ => None,
        };
        parsed.ok_or_else(|| {
            Error::format(
                self.format().name(),
                row,
                format!("field '{}' is not a valid year", field),
            )
        })
    }

    /// Some datasets store numbers as strings
    fn value_field(&self, record: &Value, field: &str, row: usize) -> Result<f64> {
        let parsed = match record.get(field) {
            Some(Value::Number(n)) => n.as_f64(),
            Some(Value::String(s)) => s.trim().parse::<f64>().ok(),
            _ => None,
        };
        // Readings must be finite
        parsed.filter(|v| v.is_finite()).ok_or_else(|| {
            Error::format(
                self.format().name(),
                row,
                format!("field '{}' is not a number", field),
            )
        })
    }
}

impl SourceParser for StatsWalesJsonParser {
    fn parse(
        &self,
        reader: &mut dyn BufRead,
        registry: &mut AreaRegistry,
        columns: &ColumnMapping,
        filters: &Filters,
    ) -> Result<ImportSummary> {
        let format = self.format();
        let code_field = columns.require(SourceColumn::AuthCode, format)?;
        let name_field = columns.require(SourceColumn::AuthNameEng, format)?;
        let year_field = columns.require(SourceColumn::Year, format)?;
        let value_field = columns.require(SourceColumn::Value, format)?;
        let measure_source = Self::measure_source(columns, format)?;

        let document: Value = serde_json::from_reader(reader)
            .map_err(|e| Error::format(format.name(), e.line().max(1), format!("invalid JSON: {}", e)))?;

        let records = document
            .get("value")
            .and_then(Value::as_array)
            .ok_or_else(|| Error::format(format.name(), 1, "JSON missing 'value' array"))?;

        let mut summary = ImportSummary::default();

        for (index, record) in records.iter().enumerate() {
            let row = index + 1;
            summary.rows_read += 1;

            let code = self.text_field(record, code_field, row)?;
            let english = self.text_field(record, name_field, row)?;

            if let Some(needles) = filters.areas.needles() {
                let matches = AreaRegistry::wildcard_match(needles, &code)
                    + AreaRegistry::wildcard_match(needles, &english);

                // Welsh names are not in these files, but an area loaded
                // earlier may already know one
                let welsh_matches = registry
                    .get(&code)
                    .and_then(|area| area.get_name(LANG_WELSH).ok())
                    .map_or(0, |welsh| AreaRegistry::wildcard_match(needles, welsh));

                if matches == 0 && welsh_matches == 0 {
                    debug!(row, code = %code, "area filtered out");
                    summary.skip();
                    continue;
                }
            }

            let (measure_code, measure_label) = match &measure_source {
                MeasureSource::PerRecord {
                    code_field,
                    label_field,
                } => (
                    self.text_field(record, code_field, row)?,
                    self.text_field(record, label_field, row)?,
                ),
                MeasureSource::Fixed { code, label } => (code.to_string(), label.to_string()),
            };

            let measure_code = measure_code.to_lowercase();
            if !filters.measures.admits(&measure_code) {
                summary.skip();
                continue;
            }

            let year = self.year_field(record, year_field, row)?;
            if !filters.years.admits(year) {
                summary.skip();
                continue;
            }

            let value = self.value_field(record, value_field, row)?;

            // Known areas keep the names they already have
            let mut area = Area::new(code.as_str());
            let has_english = registry
                .get(&code)
                .is_some_and(|existing| existing.get_name(LANG_ENGLISH).is_ok());
            if !has_english {
                area.set_name(LANG_ENGLISH, english)?;
            }

            let measure = Measure::new(&measure_code, measure_label).with_reading(year, value);
            registry.merge_area(area.with_measure(measure));
            summary.import();
        }

        Ok(summary)
    }

    fn format(&self) -> SourceFormat {
        SourceFormat::StatsWalesJson
    }
}

// ============================================================================
// TESTS
// ============================================================================
