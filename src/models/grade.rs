//! Grade and grade-band models.
//!
//! Grades are kindergarten or 1 through 12. A [`GradeBand`] is the inclusive
//! grade range a calendar applies to.

use std::fmt;
use std::str::FromStr;

use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::{EngineError, EngineResult};

/// A student grade level.
///
/// Kindergarten orders before every numeric grade.
///
/// # Example
///
/// ```
/// use attendance_engine::models::Grade;
///
/// let k: Grade = "K".parse().unwrap();
/// let five: Grade = "5".parse().unwrap();
/// assert!(k < five);
/// assert!("PK".parse::<Grade>().is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Grade {
    /// Kindergarten.
    Kindergarten,
    /// Grades 1 through 12.
    Numeric(u8),
}

impl Grade {
    /// The highest numeric grade.
    pub const MAX_NUMERIC: u8 = 12;

    /// Creates a numeric grade, rejecting values outside 1..=12.
    pub fn numeric(value: u8) -> EngineResult<Self> {
        if (1..=Self::MAX_NUMERIC).contains(&value) {
            Ok(Grade::Numeric(value))
        } else {
            Err(EngineError::InvalidGrade {
                value: value.to_string(),
            })
        }
    }
}

impl FromStr for Grade {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed.eq_ignore_ascii_case("k") {
            return Ok(Grade::Kindergarten);
        }

        trimmed
            .parse::<u8>()
            .ok()
            .and_then(|n| Grade::numeric(n).ok())
            .ok_or_else(|| EngineError::InvalidGrade {
                value: s.to_string(),
            })
    }
}

impl fmt::Display for Grade {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Grade::Kindergarten => write!(f, "K"),
            Grade::Numeric(n) => write!(f, "{}", n),
        }
    }
}

impl Serialize for Grade {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

struct GradeVisitor;

impl Visitor<'_> for GradeVisitor {
    type Value = Grade;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("\"K\" or a grade number from 1 to 12")
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<Grade, E> {
        v.parse().map_err(E::custom)
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<Grade, E> {
        u8::try_from(v)
            .ok()
            .and_then(|n| Grade::numeric(n).ok())
            .ok_or_else(|| E::custom(format!("invalid grade {}", v)))
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<Grade, E> {
        u64::try_from(v)
            .map_err(|_| E::custom(format!("invalid grade {}", v)))
            .and_then(|n| self.visit_u64(n))
    }
}

impl<'de> Deserialize<'de> for Grade {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(GradeVisitor)
    }
}

/// The inclusive grade range a calendar applies to.
///
/// # Example
///
/// ```
/// use attendance_engine::models::{Grade, GradeBand};
///
/// let band = GradeBand::new(Grade::Kindergarten, Grade::Numeric(5));
/// assert!(band.contains(Grade::Numeric(5)));
/// assert!(!band.contains(Grade::Numeric(6)));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GradeBand {
    /// The lowest grade in the band.
    pub start_grade: Grade,
    /// The highest grade in the band.
    pub end_grade: Grade,
}

impl GradeBand {
    /// Creates a band from its two bounds.
    pub fn new(start_grade: Grade, end_grade: Grade) -> Self {
        Self {
            start_grade,
            end_grade,
        }
    }

    /// The full K..12 band.
    pub fn all() -> Self {
        Self::new(Grade::Kindergarten, Grade::Numeric(Grade::MAX_NUMERIC))
    }

    /// Returns true if `grade` lies within the band, bounds included.
    pub fn contains(&self, grade: Grade) -> bool {
        grade >= self.start_grade && grade <= self.end_grade
    }

    /// Parses `grade` and tests containment.
    ///
    /// A grade that does not parse never matches any band.
    pub fn contains_raw(&self, grade: &str) -> bool {
        grade.parse().is_ok_and(|g| self.contains(g))
    }
}

impl fmt::Display for GradeBand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.start_grade, self.end_grade)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_kindergarten_case_insensitive() {
        assert_eq!("K".parse::<Grade>().unwrap(), Grade::Kindergarten);
        assert_eq!(" k ".parse::<Grade>().unwrap(), Grade::Kindergarten);
    }

    #[test]
    fn test_parse_numeric_grades() {
        assert_eq!("1".parse::<Grade>().unwrap(), Grade::Numeric(1));
        assert_eq!("12".parse::<Grade>().unwrap(), Grade::Numeric(12));
        assert_eq!("07".parse::<Grade>().unwrap(), Grade::Numeric(7));
    }

    #[test]
    fn test_parse_rejects_out_of_range_and_garbage() {
        for raw in ["0", "13", "PK", "", "5th", "-1"] {
            match raw.parse::<Grade>() {
                Err(EngineError::InvalidGrade { value }) => assert_eq!(value, raw),
                other => panic!("expected InvalidGrade for {:?}, got {:?}", raw, other),
            }
        }
    }

    #[test]
    fn test_kindergarten_orders_first() {
        assert!(Grade::Kindergarten < Grade::Numeric(1));
        assert!(Grade::Numeric(2) < Grade::Numeric(10));
    }

    #[test]
    fn test_band_k_to_5_applies_to_5_not_6() {
        let band = GradeBand::new(Grade::Kindergarten, Grade::Numeric(5));
        assert!(band.contains_raw("5"));
        assert!(!band.contains_raw("6"));
    }

    #[test]
    fn test_band_k_to_12_applies_to_k() {
        assert!(GradeBand::all().contains_raw("K"));
    }

    #[test]
    fn test_unparsable_grade_matches_no_band() {
        // A band starting at K must not swallow garbage grades.
        assert!(!GradeBand::all().contains_raw("X"));
        assert!(!GradeBand::all().contains_raw(""));
    }

    #[test]
    fn test_grade_deserializes_from_string_or_integer() {
        let band: GradeBand =
            serde_yaml::from_str("start_grade: K\nend_grade: 12\n").unwrap();
        assert_eq!(band, GradeBand::all());

        let band: GradeBand =
            serde_json::from_str(r#"{"start_grade": "6", "end_grade": 8}"#).unwrap();
        assert_eq!(band.start_grade, Grade::Numeric(6));
        assert_eq!(band.end_grade, Grade::Numeric(8));
    }

    #[test]
    fn test_grade_rejects_invalid_integer() {
        assert!(serde_json::from_str::<Grade>("13").is_err());
        assert!(serde_json::from_str::<Grade>("-2").is_err());
    }

    #[test]
    fn test_grade_serializes_as_string() {
        assert_eq!(serde_json::to_string(&Grade::Kindergarten).unwrap(), "\"K\"");
        assert_eq!(serde_json::to_string(&Grade::Numeric(9)).unwrap(), "\"9\"");
    }

    #[test]
    fn test_band_display() {
        assert_eq!(GradeBand::all().to_string(), "K-12");
    }
}
