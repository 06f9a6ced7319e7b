// 🗃️ Built-in datasets - which file holds what, and how to read it

use crate::error::{Error, Result};
use crate::parser::{ColumnMapping, SourceColumn, SourceFormat};

/// One known source file in the data directory
#[derive(Debug, Clone, PartialEq)]
pub struct DatasetSource {
    /// Key used on the command line
    pub code: &'static str,
    pub name: &'static str,
    /// File name inside the data directory
    pub file: &'static str,
    pub format: SourceFormat,
    pub columns: ColumnMapping,
}

/// The area list, always loaded before any dataset
pub fn areas_source() -> DatasetSource {
    DatasetSource {
        code: "areas",
        name: "areas",
        file: "areas.csv",
        format: SourceFormat::AuthorityCodeCsv,
        // Read by position: code, English name, Welsh name
        columns: ColumnMapping::new(),
    }
}

fn stats_wales(
    code: &'static str,
    name: &'static str,
    file: &'static str,
    columns: ColumnMapping,
) -> DatasetSource {
    DatasetSource {
        code,
        name,
        file,
        format: SourceFormat::StatsWalesJson,
        columns: columns
            .with(SourceColumn::Year, "Year_Code")
            .with(SourceColumn::Value, "Data"),
    }
}

fn complete_table(
    code: &'static str,
    name: &'static str,
    file: &'static str,
    measure_code: &'static str,
) -> DatasetSource {
    DatasetSource {
        code,
        name,
        file,
        format: SourceFormat::AuthorityByYearCsv,
        columns: ColumnMapping::new()
            .with(SourceColumn::AuthCode, "AuthorityCode")
            .with(SourceColumn::SingleMeasureCode, measure_code)
            .with(SourceColumn::SingleMeasureName, name),
    }
}

/// Every importable dataset, in import order
pub fn builtin_datasets() -> Vec<DatasetSource> {
    vec![
        stats_wales(
            "popden",
            "Population density",
            "popu1009.json",
            ColumnMapping::new()
                .with(SourceColumn::AuthCode, "Localauthority_Code")
                .with(SourceColumn::AuthNameEng, "Localauthority_ItemName_ENG")
                .with(SourceColumn::MeasureCode, "Measure_Code")
                .with(SourceColumn::MeasureName, "Measure_ItemName_ENG"),
        ),
        stats_wales(
            "biz",
            "Active Businesses",
            "econ0080.json",
            ColumnMapping::new()
                .with(SourceColumn::AuthCode, "Area_Code")
                .with(SourceColumn::AuthNameEng, "Area_ItemName_ENG")
                .with(SourceColumn::MeasureCode, "Variable_Code")
                .with(SourceColumn::MeasureName, "Variable_ItemNotes_ENG"),
        ),
        stats_wales(
            "aqi",
            "Air Quality Indicators",
            "envi0201.json",
            ColumnMapping::new()
                .with(SourceColumn::AuthCode, "Area_Code")
                .with(SourceColumn::AuthNameEng, "Area_ItemName_ENG")
                .with(SourceColumn::MeasureCode, "Pollutant_ItemName_ENG")
                .with(SourceColumn::MeasureName, "Pollutant_ItemName_ENG"),
        ),
        stats_wales(
            "trains",
            "Rail passenger journeys",
            "tran0152.json",
            ColumnMapping::new()
                .with(SourceColumn::AuthCode, "LocalAuthority_Code")
                .with(SourceColumn::AuthNameEng, "LocalAuthority_ItemName_ENG")
                .with(SourceColumn::SingleMeasureCode, "rail")
                .with(SourceColumn::SingleMeasureName, "Rail passenger journeys"),
        ),
        complete_table(
            "complete-popden",
            "Population density",
            "complete-popu1009-popden.csv",
            "Dens",
        ),
        complete_table(
            "complete-pop",
            "Population",
            "complete-popu1009-pop.csv",
            "Pop",
        ),
        complete_table(
            "complete-area",
            "Land area",
            "complete-popu1009-area.csv",
            "Area",
        ),
    ]
}

/// Look up a dataset by its command-line key
pub fn find_dataset(code: &str) -> Result<DatasetSource> {
    builtin_datasets()
        .into_iter()
        .find(|dataset| dataset.code == code)
        .ok_or_else(|| Error::configuration(format!("No dataset matches key {}", code)))
}
