// 🔎 Import filters - area, measure and year
//
// Each filter is explicit about "everything" versus a selection, so adapters
// can skip unwanted rows while parsing instead of discarding them afterwards.

use std::collections::HashSet;

/// Which areas to import, matched by code or name (case-insensitive substring)
#[derive(Debug, Clone, Default, PartialEq)]
pub enum AreaFilter {
    #[default]
    All,
    Subset(HashSet<String>),
}

impl AreaFilter {
    /// Build from user-supplied values; empty input or "all" imports everything
    pub fn from_values<I, S>(values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let set: HashSet<String> = values
            .into_iter()
            .map(Into::into)
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
            .collect();

        if set.is_empty() || set.iter().any(|v| v.eq_ignore_ascii_case("all")) {
            AreaFilter::All
        } else {
            AreaFilter::Subset(set)
        }
    }

    pub fn is_all(&self) -> bool {
        matches!(self, AreaFilter::All)
    }

    /// The selected needles, or None when everything is admitted
    pub fn needles(&self) -> Option<&HashSet<String>> {
        match self {
            AreaFilter::All => None,
            AreaFilter::Subset(set) => Some(set),
        }
    }
}

/// Which measures to import, matched exactly on the lowercase code
#[derive(Debug, Clone, Default, PartialEq)]
pub enum MeasureFilter {
    #[default]
    All,
    Subset(HashSet<String>),
}

impl MeasureFilter {
    /// Build from user-supplied values; codes are lowercased and "all" (any
    /// case) imports everything
    pub fn from_values<I, S>(values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let set: HashSet<String> = values
            .into_iter()
            .map(|v| v.as_ref().trim().to_lowercase())
            .filter(|v| !v.is_empty())
            .collect();

        if set.is_empty() || set.contains("all") {
            MeasureFilter::All
        } else {
            MeasureFilter::Subset(set)
        }
    }

    pub fn admits(&self, code: &str) -> bool {
        match self {
            MeasureFilter::All => true,
            MeasureFilter::Subset(set) => set.contains(&code.to_lowercase()),
        }
    }
}

/// Inclusive range of years to import
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum YearFilter {
    #[default]
    All,
    Range { start: i32, end: i32 },
}

impl YearFilter {
    pub fn range(start: i32, end: i32) -> Self {
        YearFilter::Range { start, end }
    }

    /// A (0, 0) pair, or any pair with a zero bound, means no filter
    pub fn from_tuple((start, end): (i32, i32)) -> Self {
        if start == 0 || end == 0 {
            YearFilter::All
        } else {
            YearFilter::Range { start, end }
        }
    }

    pub fn admits(&self, year: i32) -> bool {
        match *self {
            YearFilter::All => true,
            YearFilter::Range { start, end } => year >= start && year <= end,
        }
    }
}

/// The three filters passed into every ingestion call
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Filters {
    pub areas: AreaFilter,
    pub measures: MeasureFilter,
    pub years: YearFilter,
}

impl Filters {
    /// Import everything
    pub fn all() -> Self {
        Self::default()
    }

    pub fn with_areas(mut self, areas: AreaFilter) -> Self {
        self.areas = areas;
        self
    }

    pub fn with_measures(mut self, measures: MeasureFilter) -> Self {
        self.measures = measures;
        self
    }

    pub fn with_years(mut self, years: YearFilter) -> Self {
        self.years = years;
        self
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_area_filter_empty_or_all_is_all() {
        assert!(AreaFilter::from_values(Vec::<String>::new()).is_all());
        assert!(AreaFilter::from_values(["W06000001", "ALL"]).is_all());
        assert!(AreaFilter::from_values([" "]).is_all());
    }

    #[test]
    fn test_area_filter_keeps_values_verbatim() {
        let filter = AreaFilter::from_values(["W06000001", "Gwynedd"]);
        let needles = filter.needles().unwrap();
        assert!(needles.contains("W06000001"));
        assert!(needles.contains("Gwynedd"));
    }

    #[test]
    fn test_measure_filter_lowercases() {
        let filter = MeasureFilter::from_values(["Pop", "DENS"]);
        assert!(filter.admits("pop"));
        assert!(filter.admits("Dens"));
        assert!(!filter.admits("area"));
        assert_eq!(MeasureFilter::from_values(["All"]), MeasureFilter::All);
    }

    #[test]
    fn test_year_filter_range_is_inclusive() {
        let filter = YearFilter::range(1991, 1993);
        assert!(!filter.admits(1990));
        assert!(filter.admits(1991));
        assert!(filter.admits(1993));
        assert!(!filter.admits(1994));
        assert!(YearFilter::All.admits(1066));
    }

    #[test]
    fn test_year_filter_zero_tuple_is_all() {
        assert_eq!(YearFilter::from_tuple((0, 0)), YearFilter::All);
        assert_eq!(YearFilter::from_tuple((1995, 0)), YearFilter::All);
        assert_eq!(YearFilter::from_tuple((1995, 1995)), YearFilter::range(1995, 1995));
    }

    #[test]
    fn test_filters_builder() {
        let filters = Filters::all()
            .with_measures(MeasureFilter::from_values(["pop"]))
            .with_years(YearFilter::range(2000, 2001));
        assert!(filters.areas.is_all());
        assert!(filters.measures.admits("pop"));
        assert!(!filters.years.admits(1999));
    }
}
