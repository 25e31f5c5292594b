//! Units attached to cubes and coordinates.
//!
//! This is deliberately not a general unit-algebra engine. Fixes and
//! derivations need exactly two capabilities: convert between a small,
//! fixed set of unit pairs (scale/offset), and recognise CF time-reference
//! strings (`days since 1850-01-01`) so malformed references can be
//! rewritten textually. Everything else compares as an opaque string.

use std::fmt;

use chrono::NaiveDate;
use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};

/// A unit string, trimmed, compared verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Units(String);

/// Linear conversion `y = x * scale + offset`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Conversion {
    pub scale: f64,
    pub offset: f64,
}

impl Conversion {
    pub const IDENTITY: Conversion = Conversion {
        scale: 1.0,
        offset: 0.0,
    };

    pub fn apply(&self, value: f64) -> f64 {
        value * self.scale + self.offset
    }

    fn inverse(&self) -> Conversion {
        Conversion {
            scale: 1.0 / self.scale,
            offset: -self.offset / self.scale,
        }
    }
}

/// Known conversions, stored one direction; the inverse is derived.
const CONVERSIONS: &[(&str, &str, f64, f64)] = &[
    ("%", "1", 0.01, 0.0),
    ("degC", "K", 1.0, 273.15),
    ("hPa", "Pa", 100.0, 0.0),
    ("km", "m", 1000.0, 0.0),
    ("cm", "m", 0.01, 0.0),
    ("1e-6", "1", 1e-6, 0.0),
    ("1e-9", "1", 1e-9, 0.0),
    ("1e-9", "1e-6", 1e-3, 0.0),
];

/// Spellings folded together before table lookup.
const ALIASES: &[(&str, &str)] = &[
    ("percent", "%"),
    ("deg_C", "degC"),
    ("degrees_C", "degC"),
    ("1.0", "1"),
];

impl Units {
    pub fn new(units: impl Into<String>) -> Self {
        Self(units.into().trim().to_string())
    }

    pub fn unknown() -> Self {
        Self("unknown".to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_unknown(&self) -> bool {
        self.0 == "unknown" || self.0.is_empty()
    }

    fn canonical(&self) -> &str {
        for (alias, canonical) in ALIASES {
            if self.0 == *alias {
                return canonical;
            }
        }
        &self.0
    }

    /// Conversion from `self` to `target`, if the pair is known.
    pub fn conversion_to(&self, target: &Units) -> Option<Conversion> {
        let from = self.canonical();
        let to = target.canonical();
        if from == to {
            return Some(Conversion::IDENTITY);
        }
        for (a, b, scale, offset) in CONVERSIONS {
            if from == *a && to == *b {
                return Some(Conversion {
                    scale: *scale,
                    offset: *offset,
                });
            }
            if from == *b && to == *a {
                return Some(
                    Conversion {
                        scale: *scale,
                        offset: *offset,
                    }
                    .inverse(),
                );
            }
        }
        None
    }

    pub fn is_convertible_to(&self, target: &Units) -> bool {
        self.conversion_to(target).is_some()
    }

    /// Parse this unit as a CF time reference, if it is one.
    pub fn time_reference(&self) -> Option<TimeReference> {
        TimeReference::parse(&self.0)
    }

    pub fn is_time_reference(&self) -> bool {
        self.time_reference().is_some()
    }
}

impl fmt::Display for Units {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Units {
    fn from(value: &str) -> Self {
        Units::new(value)
    }
}

/// A decomposed `"<step> since <date>"` time unit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimeReference {
    /// Counting unit, normalised to plural ("days", "hours", ...).
    pub step: String,
    pub year: i32,
    pub month: u32,
    pub day: u32,
    /// Whatever followed the date, verbatim (may be empty).
    pub rest: String,
}

lazy_static! {
    static ref TIME_REFERENCE: Regex = Regex::new(
        r"^(?P<step>seconds?|minutes?|hours?|days?|months?|years?)\s+since\s+(?P<y>\d{1,4})-(?P<m>\d{1,2})-(?P<d>\d{1,2})(?P<rest>.*)$"
    )
    .expect("time-reference pattern");
    static ref TIME_SUFFIX: Regex =
        Regex::new(r"^\s+\d{1,2}:\d{1,2}:\d{1,2}(\.\d+)?$").expect("time-suffix pattern");
}

impl TimeReference {
    pub fn parse(text: &str) -> Option<Self> {
        let caps = TIME_REFERENCE.captures(text.trim())?;
        let mut step = caps["step"].to_string();
        if !step.ends_with('s') {
            step.push('s');
        }
        Some(Self {
            step,
            year: caps["y"].parse().ok()?,
            month: caps["m"].parse().ok()?,
            day: caps["d"].parse().ok()?,
            rest: caps["rest"].to_string(),
        })
    }

    /// Whether the reference date exists in the proleptic Gregorian
    /// calendar. Year zero is rejected: CF counts it as invalid even though
    /// the astronomical calendar has one.
    pub fn has_valid_date(&self) -> bool {
        self.year != 0 && NaiveDate::from_ymd_opt(self.year, self.month, self.day).is_some()
    }

    /// Zero-padded canonical form. A well-formed `HH:MM:SS` tail is kept;
    /// any other tail (datetime spelled with dashes, stray text) is dropped.
    pub fn canonical(&self) -> Units {
        let date = format!(
            "{} since {:04}-{:02}-{:02}",
            self.step, self.year, self.month, self.day
        );
        if TIME_SUFFIX.is_match(&self.rest) {
            Units::new(format!("{}{}", date, self.rest))
        } else {
            Units::new(date)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identity_and_alias_conversions() {
        let percent = Units::new("%");
        assert_eq!(
            percent.conversion_to(&Units::new("percent")),
            Some(Conversion::IDENTITY)
        );
        let conv = percent.conversion_to(&Units::new("1")).unwrap();
        assert_eq!(conv.apply(50.0), 0.5);
    }

    #[test]
    fn inverse_conversions_round_trip() {
        let k = Units::new("K");
        let degc = Units::new("degC");
        let down = degc.conversion_to(&k).unwrap();
        let up = k.conversion_to(&degc).unwrap();
        assert_eq!(up.apply(down.apply(21.5)), 21.5);
        assert_eq!(down.apply(0.0), 273.15);
    }

    #[test]
    fn unlisted_pairs_are_not_convertible() {
        assert!(!Units::new("kg m-2 s-1").is_convertible_to(&Units::new("W m-2")));
        assert!(!Units::new("m").is_convertible_to(&Units::new("K")));
    }

    #[test]
    fn time_reference_parsing() {
        let units = Units::new("days since 1850-1-1");
        let reference = units.time_reference().unwrap();
        assert_eq!(reference.step, "days");
        assert_eq!((reference.year, reference.month, reference.day), (1850, 1, 1));
        assert_eq!(reference.canonical(), Units::new("days since 1850-01-01"));
        assert!(reference.has_valid_date());

        assert!(!Units::new("K").is_time_reference());
        assert!(Units::new("day since 0001-01-01").is_time_reference());
    }

    #[test]
    fn year_zero_is_invalid() {
        let reference = Units::new("days since 0000-01-01").time_reference().unwrap();
        assert!(!reference.has_valid_date());
    }

    #[test]
    fn datetime_tails() {
        let kept = Units::new("days since 1850-01-01 00:00:00")
            .time_reference()
            .unwrap();
        assert_eq!(kept.canonical(), Units::new("days since 1850-01-01 00:00:00"));

        let dropped = Units::new("days since 1850-01-01-00-00-00")
            .time_reference()
            .unwrap();
        assert_eq!(dropped.canonical(), Units::new("days since 1850-01-01"));
    }
}
