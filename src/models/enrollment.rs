//! Student enrollment records.
//!
//! An [`EnrollmentRecord`] carries the dates the attendance calculation
//! needs: district entry and exit, plus the start dates of the two most
//! recent special-education (IEP) eligibility spans.

use std::cmp::Ordering;
use std::fmt;

use chrono::NaiveDate;
use serde::de::{self, Deserializer, Visitor};
use serde::{Deserialize, Serialize};

use super::Grade;
use crate::error::{EngineError, EngineResult};

/// One student's enrollment at a charter school.
///
/// # Example
///
/// ```
/// use attendance_engine::models::EnrollmentRecord;
/// use chrono::NaiveDate;
///
/// let student = EnrollmentRecord {
///     student_id: "1001".to_string(),
///     first_name: "Ada".to_string(),
///     last_name: "Lovelace".to_string(),
///     district_aun: "101260303".to_string(),
///     grade: "3".to_string(),
///     district_entry_date: Some(NaiveDate::from_ymd_opt(2023, 9, 1).unwrap()),
///     exit_date: None,
///     current_iep_date: None,
///     prior_iep_date: None,
/// };
///
/// let sept_1 = NaiveDate::from_ymd_opt(2023, 9, 1).unwrap();
/// let sept_30 = NaiveDate::from_ymd_opt(2023, 9, 30).unwrap();
/// assert!(student.attended_entire_period(sept_1, sept_30));
/// assert!(!student.is_special_education_on_date(sept_30));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnrollmentRecord {
    /// State student number.
    pub student_id: String,
    /// Given name.
    #[serde(default)]
    pub first_name: String,
    /// Surname.
    #[serde(default)]
    pub last_name: String,
    /// AUN of the school district of residence.
    pub district_aun: String,
    /// Grade as recorded at import; parsed on use.
    #[serde(deserialize_with = "grade_text")]
    pub grade: String,
    /// Date the student entered the charter school. Required for any
    /// attendance calculation.
    #[serde(default)]
    pub district_entry_date: Option<NaiveDate>,
    /// Date the student left. Unset means still enrolled.
    #[serde(default)]
    pub exit_date: Option<NaiveDate>,
    /// Start of the current IEP span.
    #[serde(default)]
    pub current_iep_date: Option<NaiveDate>,
    /// Start of the prior IEP span.
    #[serde(default)]
    pub prior_iep_date: Option<NaiveDate>,
}

impl EnrollmentRecord {
    /// Returns the district entry date.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::MissingEntryDate`] when the date is unset.
    pub fn entry_date(&self) -> EngineResult<NaiveDate> {
        self.district_entry_date
            .ok_or_else(|| EngineError::MissingEntryDate {
                student_id: self.student_id.clone(),
            })
    }

    /// Parses the recorded grade.
    pub fn parsed_grade(&self) -> EngineResult<Grade> {
        self.grade.parse()
    }

    /// Returns true if the student counts as special education on `date`.
    ///
    /// With no IEP dates the student is never special education. With only a
    /// current IEP date, the student becomes special education on that date.
    /// Any prior IEP date makes the student special education on every date.
    pub fn is_special_education_on_date(&self, date: NaiveDate) -> bool {
        match (self.current_iep_date, self.prior_iep_date) {
            (None, None) => false,
            (Some(current), None) if current > date => false,
            _ => true,
        }
    }

    /// The student's billing classification on `date`.
    pub fn classification_on(&self, date: NaiveDate) -> Classification {
        if self.is_special_education_on_date(date) {
            Classification::SpecialEducation
        } else {
            Classification::NonSpecialEducation
        }
    }

    /// Returns true if the student was enrolled for all of `[start, end]`.
    pub fn attended_entire_period(&self, start: NaiveDate, end: NaiveDate) -> bool {
        let entered_in_time = self.district_entry_date.is_some_and(|entry| entry <= start);
        let stayed_through = self.exit_date.is_none_or(|exit| exit >= end);
        entered_in_time && stayed_through
    }

    /// Checks the record's internal consistency.
    ///
    /// The entry date must be set, the grade must parse, and any exit date
    /// must not precede entry.
    pub fn validate(&self) -> EngineResult<()> {
        let entry = self.entry_date()?;
        self.parsed_grade()?;
        if let Some(exit) = self.exit_date.filter(|exit| *exit < entry) {
            return Err(EngineError::InvalidEnrollment {
                student_id: self.student_id.clone(),
                message: format!("exit date {} is before entry date {}", exit, entry),
            });
        }
        Ok(())
    }
}

/// The billing bucket a student falls in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Classification {
    /// Special education, reported as "SP".
    #[serde(rename = "SP")]
    SpecialEducation,
    /// Non special education, reported as "NS".
    #[serde(rename = "NS")]
    NonSpecialEducation,
}

impl Classification {
    /// The two-letter report code.
    pub fn code(&self) -> &'static str {
        match self {
            Classification::SpecialEducation => "SP",
            Classification::NonSpecialEducation => "NS",
        }
    }
}

impl fmt::Display for Classification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// Sorts a roster by grade, then surname, then given name.
///
/// Grades that do not parse sort after every valid grade. The sort is
/// stable, so equal keys keep their import order.
pub fn sort_roster(roster: &mut [EnrollmentRecord]) {
    roster.sort_by(compare_roster_order);
}

fn compare_roster_order(a: &EnrollmentRecord, b: &EnrollmentRecord) -> Ordering {
    let grade_key = |r: &EnrollmentRecord| match r.parsed_grade() {
        Ok(g) => (0, Some(g)),
        Err(_) => (1, None),
    };

    grade_key(a)
        .cmp(&grade_key(b))
        .then_with(|| a.last_name.cmp(&b.last_name))
        .then_with(|| a.first_name.cmp(&b.first_name))
}

// Rosters exported from spreadsheets carry grades as numbers or text.
fn grade_text<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    struct GradeTextVisitor;

    impl Visitor<'_> for GradeTextVisitor {
        type Value = String;

        fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.write_str("a grade as text or a number")
        }

        fn visit_str<E: de::Error>(self, v: &str) -> Result<String, E> {
            Ok(v.trim().to_string())
        }

        fn visit_u64<E: de::Error>(self, v: u64) -> Result<String, E> {
            Ok(v.to_string())
        }

        fn visit_i64<E: de::Error>(self, v: i64) -> Result<String, E> {
            Ok(v.to_string())
        }
    }

    deserializer.deserialize_any(GradeTextVisitor)
}
