// 📈 Measure - one indicator's readings over time for one area
//
// Readings are keyed by year and kept in chronological order. A running sum is
// maintained on every write so the average never needs a full scan.

use crate::error::{Error, Result};
use std::collections::BTreeMap;

#[derive(Debug, Clone)]
pub struct Measure {
    /// Lowercase indicator code, e.g. "pop"
    code: String,

    /// Human-readable label, replaced by later merges
    label: String,

    readings: BTreeMap<i32, f64>,

    /// Always the total of every value in `readings`
    sum: f64,
}

impl Measure {
    /// Create an empty measure; the code is normalized to lowercase
    pub fn new(code: impl AsRef<str>, label: impl Into<String>) -> Self {
        Measure {
            code: code.as_ref().to_lowercase(),
            label: label.into(),
            readings: BTreeMap::new(),
            sum: 0.0,
        }
    }

    /// Builder pattern: add a reading
    pub fn with_reading(mut self, year: i32, value: f64) -> Self {
        self.set(year, value);
        self
    }

    pub fn code(&self) -> &str {
        &self.code
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn set_label(&mut self, label: impl Into<String>) {
        self.label = label.into();
    }

    /// Value recorded for `year`
    pub fn get(&self, year: i32) -> Result<f64> {
        self.readings
            .get(&year)
            .copied()
            .ok_or_else(|| Error::not_found(format!("No value found for year {}", year)))
    }

    /// Insert or replace the value for `year`, keeping the sum consistent
    pub fn set(&mut self, year: i32, value: f64) {
        if let Some(previous) = self.readings.insert(year, value) {
            self.sum -= previous;
        }
        self.sum += value;
    }

    /// Number of years with a reading
    pub fn size(&self) -> usize {
        self.readings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.readings.is_empty()
    }

    /// Readings in chronological order
    pub fn iter(&self) -> impl Iterator<Item = (i32, f64)> + '_ {
        self.readings.iter().map(|(year, value)| (*year, *value))
    }

    /// Earliest (year, value) pair
    pub fn first(&self) -> Option<(i32, f64)> {
        self.readings.iter().next().map(|(y, v)| (*y, *v))
    }

    /// Latest (year, value) pair
    pub fn last(&self) -> Option<(i32, f64)> {
        self.readings.iter().next_back().map(|(y, v)| (*y, *v))
    }

    pub fn sum(&self) -> f64 {
        self.sum
    }

    /// Mean of all readings, 0 when there are none
    pub fn average(&self) -> f64 {
        if self.readings.is_empty() {
            return 0.0;
        }
        self.sum / self.readings.len() as f64
    }

    /// Latest value minus earliest value, 0 when there are none
    pub fn difference(&self) -> f64 {
        match (self.first(), self.last()) {
            (Some((_, first)), Some((_, last))) => last - first,
            _ => 0.0,
        }
    }

    /// Difference relative to the earliest value, as a percentage.
    ///
    /// An empty series or an earliest value of zero yields 0 instead of an
    /// infinite or NaN result.
    pub fn percent_difference(&self) -> f64 {
        match self.first() {
            Some((_, first)) if first != 0.0 => self.difference() / first * 100.0,
            _ => 0.0,
        }
    }

    /// Upsert every reading of `other` into this measure and take its label
    pub fn absorb(&mut self, other: &Measure) {
        self.label = other.label.clone();
        for (year, value) in other.iter() {
            self.set(year, value);
        }
    }
}

// The sum is derived state, so equality only looks at identity and readings
impl PartialEq for Measure {
    fn eq(&self, other: &Self) -> bool {
        self.code == other.code && self.label == other.label && self.readings == other.readings
    }
}

// ============================================================================
// TESTS
// ============================================================================
