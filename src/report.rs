// 📊 Reports - table and JSON views over a populated registry
//
// Everything here is read-only. Areas come out in code order and measures in
// measure-code order because both are stored in BTreeMaps.

use crate::area::Area;
use crate::error::{Error, Result};
use crate::measure::Measure;
use crate::registry::AreaRegistry;
use serde::Serialize;
use std::collections::BTreeMap;
use std::io::Write;
use std::str::FromStr;

/// Which columns the table report shows for each measure
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OutputMode {
    /// Every year, then Average, Diff. and % Diff.
    #[default]
    All,
    /// Average only
    Average,
    /// First year, last year, Diff. and % Diff.
    Trend,
}

impl FromStr for OutputMode {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "all" => Ok(OutputMode::All),
            "average" => Ok(OutputMode::Average),
            "trend" => Ok(OutputMode::Trend),
            other => Err(Error::configuration(format!(
                "Unknown output '{}', expected all, average or trend",
                other
            ))),
        }
    }
}

// ============================================================================
// TABLE
// ============================================================================

fn format_value(value: f64) -> String {
    format!("{:.6}", value)
}

/// (heading, value) pairs shown for one measure
fn measure_columns(measure: &Measure, mode: OutputMode) -> Vec<(String, String)> {
    let mut columns = Vec::new();

    match mode {
        OutputMode::All => {
            for (year, value) in measure.iter() {
                columns.push((year.to_string(), format_value(value)));
            }
        }
        OutputMode::Average => {}
        OutputMode::Trend => {
            for (year, value) in measure.first().into_iter().chain(measure.last()) {
                columns.push((year.to_string(), format_value(value)));
            }
        }
    }

    if mode != OutputMode::Trend {
        columns.push(("Average".to_string(), format_value(measure.average())));
    }
    if mode != OutputMode::Average {
        columns.push(("Diff.".to_string(), format_value(measure.difference())));
        columns.push((
            "% Diff.".to_string(),
            format_value(measure.percent_difference()),
        ));
    }

    columns
}

/// Label line plus the heading and value rows, without a trailing newline
fn render_measure(measure: &Measure, mode: OutputMode) -> String {
    let label = format!("{} ({})", measure.label(), measure.code());
    if measure.is_empty() {
        return format!("{}\n<no data>", label);
    }

    let mut headings = Vec::new();
    let mut values = Vec::new();
    for (heading, value) in measure_columns(measure, mode) {
        let width = heading.chars().count().max(value.chars().count());
        headings.push(format!("{:>width$}", heading, width = width));
        values.push(format!("{:>width$}", value, width = width));
    }

    format!("{}\n{}\n{}", label, headings.join(" "), values.join(" "))
}

fn render_area(area: &Area, mode: OutputMode) -> String {
    if area.size() == 0 {
        return format!("{}\n<no measures>", area.header());
    }

    let blocks: Vec<String> = area
        .measures()
        .map(|measure| render_measure(measure, mode))
        .collect();

    // One blank line between measure blocks
    format!("{}\n{}", area.header(), blocks.join("\n\n"))
}

/// Render the whole registry as a text table. Areas are separated by two
/// blank lines; an empty registry renders as an empty string.
pub fn render_table(registry: &AreaRegistry, mode: OutputMode) -> String {
    let areas: Vec<String> = registry
        .iter()
        .map(|area| render_area(area, mode))
        .collect();

    if areas.is_empty() {
        return String::new();
    }
    format!("{}\n", areas.join("\n\n\n"))
}

pub fn write_table<W: Write>(registry: &AreaRegistry, mode: OutputMode, out: &mut W) -> Result<()> {
    out.write_all(render_table(registry, mode).as_bytes())
        .map_err(|e| Error::io("Failed to write report", e))
}

// ============================================================================
// JSON
// ============================================================================

#[derive(Serialize)]
struct AreaJson<'a> {
    names: &'a BTreeMap<String, String>,
    measures: BTreeMap<&'a str, BTreeMap<String, f64>>,
}

impl<'a> AreaJson<'a> {
    fn from_area(area: &'a Area) -> Self {
        let measures = area
            .measures()
            .map(|measure| {
                let readings = measure
                    .iter()
                    .map(|(year, value)| (year.to_string(), value))
                    .collect();
                (measure.code(), readings)
            })
            .collect();

        AreaJson {
            names: area.names(),
            measures,
        }
    }
}

/// Serialize the registry as `{code: {"names": {..}, "measures": {..}}}`
pub fn to_json(registry: &AreaRegistry) -> Result<String> {
    let areas: BTreeMap<&str, AreaJson> = registry
        .iter()
        .map(|area| (area.code(), AreaJson::from_area(area)))
        .collect();

    Ok(serde_json::to_string(&areas)?)
}

// ============================================================================
// TESTS
// ============================================================================
