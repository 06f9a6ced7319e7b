// 🗂️ Area Registry - owner of every Area for one ingestion run
//
// Areas are indexed by code (the identity) and by every display name learned
// along the way, so formats that only carry a name can still find their area.
// The name index is last-write-wins and may be ambiguous across languages.

use crate::area::Area;
use crate::error::{Error, Result};
use crate::filters::{AreaFilter, Filters};
use crate::input;
use crate::parser::{get_parser, ColumnMapping, ImportSummary, SourceFormat};
use std::collections::{BTreeMap, HashMap, HashSet};
use std::io::BufRead;
use tracing::{debug, info};

#[derive(Debug, Default)]
pub struct AreaRegistry {
    /// Code -> area, iterated in code order
    by_code: BTreeMap<String, Area>,

    /// Display name -> code
    by_name: HashMap<String, String>,
}

impl AreaRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert an area, or merge it into the one already registered under its
    /// code. Names are upserted, measures merged, the code is never replaced.
    pub fn merge_area(&mut self, area: Area) {
        let code = area.code().to_string();
        for name in area.names().values() {
            self.by_name.insert(name.clone(), code.clone());
        }

        match self.by_code.get_mut(&code) {
            Some(existing) => existing.absorb(area),
            None => {
                debug!(code = %code, "registered new area");
                self.by_code.insert(code, area);
            }
        }
    }

    /// Look up an area by code, then by any known name
    pub fn resolve(&self, key: &str) -> Result<&Area> {
        self.resolve_code(key)
            .and_then(|code| self.by_code.get(code))
            .ok_or_else(|| Error::not_found(format!("No area found matching {}", key)))
    }

    pub fn resolve_mut(&mut self, key: &str) -> Result<&mut Area> {
        let code = self
            .resolve_code(key)
            .map(str::to_string)
            .ok_or_else(|| Error::not_found(format!("No area found matching {}", key)))?;
        self.by_code
            .get_mut(&code)
            .ok_or_else(|| Error::not_found(format!("No area found matching {}", key)))
    }

    /// Code registered for `key`, which may itself be a code or a name
    pub fn resolve_code(&self, key: &str) -> Option<&str> {
        if let Some((code, _)) = self.by_code.get_key_value(key) {
            return Some(code.as_str());
        }
        self.by_name
            .get(key)
            .filter(|code| self.by_code.contains_key(code.as_str()))
            .map(String::as_str)
    }

    /// Area registered under exactly this code
    pub fn get(&self, code: &str) -> Option<&Area> {
        self.by_code.get(code)
    }

    pub fn contains(&self, code: &str) -> bool {
        self.by_code.contains_key(code)
    }

    /// Number of areas
    pub fn size(&self) -> usize {
        self.by_code.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_code.is_empty()
    }

    /// Areas in ascending code order
    pub fn iter(&self) -> impl Iterator<Item = &Area> {
        self.by_code.values()
    }

    /// Count how many needles match `haystack`.
    ///
    /// An exact match of the whole haystack counts once, and every needle
    /// found anywhere inside the haystack (ignoring case) counts once more.
    /// "W060" therefore matches any code containing it, not just prefixes.
    pub fn wildcard_match(needles: &HashSet<String>, haystack: &str) -> usize {
        let exact = usize::from(needles.contains(haystack));
        let haystack_upper = haystack.to_uppercase();

        let partial = needles
            .iter()
            .filter(|needle| haystack_upper.contains(&needle.to_uppercase()))
            .count();

        exact + partial
    }

    /// Whether the area filter admits `code`.
    ///
    /// When the code itself does not match, an area that is already known can
    /// still be admitted through any of its names.
    pub fn admits_area(&self, filter: &AreaFilter, code: &str) -> bool {
        let needles = match filter.needles() {
            None => return true,
            Some(needles) => needles,
        };

        if Self::wildcard_match(needles, code) > 0 {
            return true;
        }

        self.by_code.get(code).is_some_and(|area| {
            area.names()
                .values()
                .any(|name| Self::wildcard_match(needles, name) > 0)
        })
    }

    /// Ingest one source stream in the given format.
    ///
    /// Rows merged before a format error stay in the registry.
    pub fn populate<R: BufRead>(
        &mut self,
        reader: &mut R,
        format: SourceFormat,
        columns: &ColumnMapping,
        filters: &Filters,
    ) -> Result<ImportSummary> {
        if input::is_empty(reader)? {
            return Err(Error::format(format.name(), 1, "source contains no data"));
        }

        let parser = get_parser(format);
        let summary = parser.parse(reader, self, columns, filters)?;

        info!(
            format = format.name(),
            rows_read = summary.rows_read,
            rows_imported = summary.rows_imported,
            rows_skipped = summary.rows_skipped,
            areas = self.size(),
            "source ingested"
        );

        Ok(summary)
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filters::{MeasureFilter, YearFilter};
    use crate::measure::Measure;
    use crate::parser::SourceColumn;
    use std::io::Cursor;

    fn needles(values: &[&str]) -> HashSet<String> {
        values.iter().map(|v| v.to_string()).collect()
    }

    fn anglesey() -> Area {
        Area::new("W06000001")
            .with_name("eng", "Isle of Anglesey")
            .unwrap()
            .with_name("cym", "Ynys Môn")
            .unwrap()
    }

    #[test]
    fn test_merge_area_inserts_and_indexes_names() {
        let mut registry = AreaRegistry::new();
        registry.merge_area(anglesey());

        assert_eq!(registry.size(), 1);
        assert_eq!(registry.resolve("W06000001").unwrap().code(), "W06000001");
        assert_eq!(registry.resolve("Ynys Môn").unwrap().code(), "W06000001");
        assert_eq!(registry.resolve("Isle of Anglesey").unwrap().code(), "W06000001");
    }

    #[test]
    fn test_merge_area_enriches_existing() {
        let mut registry = AreaRegistry::new();
        registry.merge_area(
            Area::new("W06000001")
                .with_measure(Measure::new("pop", "Population").with_reading(1991, 1.0)),
        );
        registry.merge_area(
            anglesey().with_measure(
                Measure::new("Pop", "Population (mid-year)")
                    .with_reading(1991, 2.0)
                    .with_reading(1992, 3.0),
            ),
        );

        assert_eq!(registry.size(), 1);
        let area = registry.resolve("W06000001").unwrap();
        assert_eq!(area.get_name("cym").unwrap(), "Ynys Môn");

        let pop = area.get_measure("pop").unwrap();
        assert_eq!(pop.size(), 2);
        assert_eq!(pop.get(1991).unwrap(), 2.0);
        assert_eq!(pop.label(), "Population (mid-year)");
    }

    #[test]
    fn test_resolve_unknown_is_not_found() {
        let registry = AreaRegistry::new();
        assert!(registry.resolve("W06000099").unwrap_err().is_not_found());
    }

    #[test]
    fn test_resolve_mut_by_name() {
        let mut registry = AreaRegistry::new();
        registry.merge_area(anglesey());

        registry
            .resolve_mut("Isle of Anglesey")
            .unwrap()
            .set_name("fra", "Anglesey")
            .unwrap();
        assert_eq!(
            registry.get("W06000001").unwrap().get_name("fra").unwrap(),
            "Anglesey"
        );
    }

    #[test]
    fn test_wildcard_match_substring_case_insensitive() {
        let set = needles(&["W0600001"]);
        assert!(AreaRegistry::wildcard_match(&set, "isle of anglesey (w0600001)") >= 1);
        assert_eq!(AreaRegistry::wildcard_match(&set, "W0600001"), 2);
        assert_eq!(AreaRegistry::wildcard_match(&set, "W06000002"), 0);

        let prefix = needles(&["W060"]);
        assert_eq!(AreaRegistry::wildcard_match(&prefix, "XW0600"), 1);
    }

    #[test]
    fn test_admits_area_through_known_names() {
        let mut registry = AreaRegistry::new();
        registry.merge_area(anglesey());

        let filter = AreaFilter::from_values(["anglesey"]);
        assert!(registry.admits_area(&filter, "W06000001"));
        assert!(!registry.admits_area(&filter, "W06000002"));
        assert!(registry.admits_area(&AreaFilter::All, "W06000002"));
    }

    #[test]
    fn test_populate_rejects_empty_stream() {
        let mut registry = AreaRegistry::new();
        let mut reader = Cursor::new(Vec::<u8>::new());
        let err = registry
            .populate(
                &mut reader,
                SourceFormat::AuthorityCodeCsv,
                &ColumnMapping::new(),
                &Filters::all(),
            )
            .unwrap_err();
        assert!(matches!(err, Error::Format { line: 1, .. }));
    }

    #[test]
    fn test_populate_entity_file_end_to_end() {
        let csv = "Local authority code,Name (eng),Name (cym)\n\
                   W06000001,Isle of Anglesey,Ynys Môn\n\
                   W06000002,Gwynedd,Gwynedd\n";
        let mut registry = AreaRegistry::new();
        registry
            .populate(
                &mut Cursor::new(csv),
                SourceFormat::AuthorityCodeCsv,
                &ColumnMapping::new(),
                &Filters::all(),
            )
            .unwrap();

        assert_eq!(registry.size(), 2);
        assert_eq!(
            registry.resolve("W06000001").unwrap().get_name("eng").unwrap(),
            "Isle of Anglesey"
        );
    }

    #[test]
    fn test_populate_wide_table_end_to_end() {
        let columns = ColumnMapping::new()
            .with(SourceColumn::AuthCode, "AuthorityCode")
            .with(SourceColumn::SingleMeasureCode, "Area")
            .with(SourceColumn::SingleMeasureName, "Land area");
        let csv = "AuthorityCode,1991,1992\nW06000001,711.68,711.68\n";

        let mut registry = AreaRegistry::new();
        registry
            .populate(
                &mut Cursor::new(csv),
                SourceFormat::AuthorityByYearCsv,
                &columns,
                &Filters::all(),
            )
            .unwrap();

        let area = registry.resolve("W06000001").unwrap();
        let measure = area.get_measure("area").unwrap();
        assert_eq!(measure.get(1991).unwrap(), 711.68);
        assert_eq!(measure.get(1992).unwrap(), 711.68);

        // Same import, restricted to a year that is not present
        let mut filtered = AreaRegistry::new();
        filtered
            .populate(
                &mut Cursor::new(csv),
                SourceFormat::AuthorityByYearCsv,
                &columns,
                &Filters::all()
                    .with_years(YearFilter::from_tuple((1995, 1995)))
                    .with_measures(MeasureFilter::All),
            )
            .unwrap();
        let measure = filtered
            .resolve("W06000001")
            .unwrap()
            .get_measure("area")
            .unwrap();
        assert_eq!(measure.size(), 0);
    }
}
