// 🗺️ Area Entity - stable authority code + localized names + measures
//
// "The code is IDENTITY (never changes), names and measures are VALUES"
//
// An area is created the first time any source mentions its code, then only
// ever enriched: later sources add names and merge measures into it.

use crate::error::{Error, Result};
use crate::measure::Measure;
use std::collections::BTreeMap;

pub const LANG_ENGLISH: &str = "eng";
pub const LANG_WELSH: &str = "cym";

#[derive(Debug, Clone, PartialEq)]
pub struct Area {
    /// Authority code, e.g. "W06000001"
    code: String,

    /// Three-letter lowercase language code -> display name
    names: BTreeMap<String, String>,

    /// Lowercase measure code -> measure
    measures: BTreeMap<String, Measure>,
}

impl Area {
    pub fn new(code: impl Into<String>) -> Self {
        Area {
            code: code.into(),
            names: BTreeMap::new(),
            measures: BTreeMap::new(),
        }
    }

    /// Builder pattern: add a name, failing on an invalid language code
    pub fn with_name(mut self, lang: &str, name: impl Into<String>) -> Result<Self> {
        self.set_name(lang, name)?;
        Ok(self)
    }

    /// Builder pattern: merge a measure under its own code
    pub fn with_measure(mut self, measure: Measure) -> Self {
        let code = measure.code().to_string();
        self.merge_measure(&code, measure);
        self
    }

    pub fn code(&self) -> &str {
        &self.code
    }

    /// Set (or replace) the name for a language.
    ///
    /// The language code must be exactly three ASCII letters; it is stored in
    /// lowercase.
    pub fn set_name(&mut self, lang: &str, name: impl Into<String>) -> Result<()> {
        let lang = normalize_language(lang)?;
        self.names.insert(lang, name.into());
        Ok(())
    }

    pub fn get_name(&self, lang: &str) -> Result<&str> {
        self.names
            .get(&lang.to_lowercase())
            .map(String::as_str)
            .ok_or_else(|| {
                Error::not_found(format!("No name for language '{}' in area {}", lang, self.code))
            })
    }

    pub fn names(&self) -> &BTreeMap<String, String> {
        &self.names
    }

    /// Merge a measure into this area.
    ///
    /// With no measure under `code` the incoming one is stored as is. Otherwise
    /// the existing measure takes the incoming label and every incoming reading
    /// is upserted into it.
    pub fn merge_measure(&mut self, code: &str, measure: Measure) {
        let key = code.to_lowercase();
        match self.measures.get_mut(&key) {
            Some(existing) => existing.absorb(&measure),
            None => {
                self.measures.insert(key, measure);
            }
        }
    }

    /// Fold another area's names and measures into this one. The code of
    /// `self` is kept regardless of `other`'s.
    pub fn absorb(&mut self, other: Area) {
        // Keys were validated when `other` was built
        self.names.extend(other.names);
        for (code, measure) in other.measures {
            self.merge_measure(&code, measure);
        }
    }

    pub fn get_measure(&self, code: &str) -> Result<&Measure> {
        self.measures.get(&code.to_lowercase()).ok_or_else(|| {
            Error::not_found(format!("No measure '{}' in area {}", code, self.code))
        })
    }

    pub fn get_measure_mut(&mut self, code: &str) -> Option<&mut Measure> {
        self.measures.get_mut(&code.to_lowercase())
    }

    /// Measures ordered by code
    pub fn measures(&self) -> impl Iterator<Item = &Measure> {
        self.measures.values()
    }

    /// Number of measures
    pub fn size(&self) -> usize {
        self.measures.len()
    }

    /// Header line used by the reports.
    ///
    /// "Isle of Anglesey / Ynys Môn (W06000001)", a single known name, or
    /// "Unnamed (W06000001)".
    pub fn header(&self) -> String {
        let english = self.names.get(LANG_ENGLISH);
        let welsh = self.names.get(LANG_WELSH);

        let display = match (english, welsh) {
            (Some(eng), Some(cym)) => format!("{} / {}", eng, cym),
            (Some(name), None) | (None, Some(name)) => name.clone(),
            (None, None) => "Unnamed".to_string(),
        };

        format!("{} ({})", display, self.code)
    }
}

/// Validate and lowercase a three-letter language code
fn normalize_language(lang: &str) -> Result<String> {
    if lang.len() != 3 || !lang.chars().all(|c| c.is_ascii_alphabetic()) {
        return Err(Error::configuration(format!(
            "Language code must be three alphabetical letters only, got '{}'",
            lang
        )));
    }
    Ok(lang.to_ascii_lowercase())
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_and_get_name() {
        let mut area = Area::new("W06000023");
        area.set_name("eng", "Powys").unwrap();
        area.set_name("CYM", "Powys").unwrap();

        assert_eq!(area.get_name("eng").unwrap(), "Powys");
        assert_eq!(area.get_name("cym").unwrap(), "Powys");
        assert_eq!(area.get_name("Cym").unwrap(), "Powys");
        assert_eq!(area.names().len(), 2);
    }

    #[test]
    fn test_set_name_replaces() {
        let mut area = Area::new("W06000023");
        area.set_name("eng", "Powis").unwrap();
        area.set_name("eng", "Powys").unwrap();
        assert_eq!(area.get_name("eng").unwrap(), "Powys");
        assert_eq!(area.names().len(), 1);
    }

    #[test]
    fn test_invalid_language_codes_rejected() {
        let mut area = Area::new("W06000023");
        for lang in ["en", "engl", "e1g", "", "é_g"] {
            let err = area.set_name(lang, "Powys").unwrap_err();
            assert!(matches!(err, Error::Configuration(_)), "accepted {:?}", lang);
        }
        assert!(area.names().is_empty());
    }

    #[test]
    fn test_missing_name_is_not_found() {
        let area = Area::new("W06000023");
        assert!(area.get_name("eng").unwrap_err().is_not_found());
    }

    #[test]
    fn test_merge_measure_inserts_then_merges() {
        let mut area = Area::new("W06000011");
        area.merge_measure(
            "Pop",
            Measure::new("Pop", "Population")
                .with_reading(1990, 1.0)
                .with_reading(1991, 2.0),
        );
        assert_eq!(area.size(), 1);

        area.merge_measure(
            "pop",
            Measure::new("pop", "Residents")
                .with_reading(1991, 3.0)
                .with_reading(1992, 4.0),
        );
        assert_eq!(area.size(), 1);

        let measure = area.get_measure("POP").unwrap();
        assert_eq!(measure.size(), 3);
        assert_eq!(measure.get(1990).unwrap(), 1.0);
        assert_eq!(measure.get(1991).unwrap(), 3.0);
        assert_eq!(measure.get(1992).unwrap(), 4.0);
        assert_eq!(measure.label(), "Residents");
    }

    #[test]
    fn test_distinct_measures_are_kept_apart() {
        let area = Area::new("W06000011")
            .with_measure(Measure::new("pop", "Population"))
            .with_measure(Measure::new("dens", "Population density"));

        assert_eq!(area.size(), 2);
        let codes: Vec<&str> = area.measures().map(|m| m.code()).collect();
        assert_eq!(codes, vec!["dens", "pop"]);
    }

    #[test]
    fn test_get_measure_mut_edits_in_place() {
        let mut area = Area::new("W06000011").with_measure(Measure::new("pop", "Population"));

        let measure = area.get_measure_mut("POP").unwrap();
        measure.set_label("Residents");
        measure.set(2001, 5.0);

        let measure = area.get_measure("pop").unwrap();
        assert_eq!(measure.label(), "Residents");
        assert_eq!(measure.get(2001).unwrap(), 5.0);
        assert!(area.get_measure_mut("dens").is_none());
    }

    #[test]
    fn test_header_variants() {
        let both = Area::new("W06000001")
            .with_name("eng", "Isle of Anglesey")
            .unwrap()
            .with_name("cym", "Ynys Môn")
            .unwrap();
        assert_eq!(both.header(), "Isle of Anglesey / Ynys Môn (W06000001)");

        let welsh_only = Area::new("W06000001").with_name("cym", "Ynys Môn").unwrap();
        assert_eq!(welsh_only.header(), "Ynys Môn (W06000001)");

        let unnamed = Area::new("W06000001");
        assert_eq!(unnamed.header(), "Unnamed (W06000001)");
    }
}
