//! Charter school calendar model.
//!
//! A [`Calendar`] is the academic calendar of one charter school for one
//! grade band and one school year: its first and last instructional dates
//! plus the exception dates (holidays, closures) on which no instruction
//! takes place.

use std::collections::HashSet;

use chrono::{Datelike, NaiveDate, Utc, Weekday};
use serde::{Deserialize, Serialize};

use super::{BillingPeriod, Grade, GradeBand};
use crate::error::{EngineError, EngineResult};

/// The reason a date is excluded from instruction.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExceptionKind {
    /// A scheduled holiday.
    #[default]
    Holiday,
    /// A teacher in-service or professional development day.
    InService,
    /// An unscheduled closure such as a weather day.
    Closure,
    /// Any other non-instructional date.
    Other,
}

/// A non-instructional date on a calendar.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ExceptionDate {
    /// The excluded date.
    pub date: NaiveDate,
    /// Why the date is excluded.
    #[serde(default)]
    pub kind: ExceptionKind,
}

/// A school-year calendar for one charter school and grade band.
///
/// # Example
///
/// ```
/// use attendance_engine::models::{Calendar, ExceptionDate, ExceptionKind, Grade};
/// use chrono::NaiveDate;
///
/// let calendar = Calendar {
///     id: "acs-k12-2024".to_string(),
///     school_id: "acs".to_string(),
///     start_grade: Grade::Kindergarten,
///     end_grade: Grade::Numeric(12),
///     first_day: NaiveDate::from_ymd_opt(2023, 9, 1).unwrap(),
///     last_day: Some(NaiveDate::from_ymd_opt(2024, 6, 10).unwrap()),
///     exception_dates: vec![ExceptionDate {
///         date: NaiveDate::from_ymd_opt(2023, 11, 23).unwrap(),
///         kind: ExceptionKind::Holiday,
///     }],
/// };
///
/// assert!(calendar.applies_to_grade("K"));
/// assert!(!calendar.is_instructional_day(NaiveDate::from_ymd_opt(2023, 11, 23).unwrap()));
/// assert!(calendar.is_instructional_day(NaiveDate::from_ymd_opt(2023, 11, 22).unwrap()));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Calendar {
    /// Unique identifier of the calendar.
    pub id: String,
    /// The charter school the calendar belongs to.
    pub school_id: String,
    /// Lowest grade the calendar applies to.
    pub start_grade: Grade,
    /// Highest grade the calendar applies to.
    pub end_grade: Grade,
    /// First instructional date of the school year.
    pub first_day: NaiveDate,
    /// Last instructional date of the school year. Unset means today.
    #[serde(default)]
    pub last_day: Option<NaiveDate>,
    /// Non-instructional dates within the year.
    #[serde(default)]
    pub exception_dates: Vec<ExceptionDate>,
}

impl Calendar {
    /// The grade band this calendar applies to.
    pub fn grade_band(&self) -> GradeBand {
        GradeBand::new(self.start_grade, self.end_grade)
    }

    /// Returns true if the calendar's band contains `grade`.
    ///
    /// Grades that do not parse never match.
    pub fn applies_to_grade(&self, grade: &str) -> bool {
        self.grade_band().contains_raw(grade)
    }

    /// The last instructional date, falling back to today when unset.
    pub fn end_date(&self) -> NaiveDate {
        self.last_day.unwrap_or_else(|| Utc::now().date_naive())
    }

    /// Returns true if `date` lies within the calendar's school-year range.
    pub fn contains(&self, date: NaiveDate) -> bool {
        date >= self.first_day && date <= self.end_date()
    }

    /// Returns true if the calendar's range overlaps `[from, to]`.
    pub fn overlaps(&self, from: NaiveDate, to: NaiveDate) -> bool {
        from <= self.end_date() && to >= self.first_day
    }

    /// Returns true if `date` is one of the calendar's exception dates.
    pub fn is_exception(&self, date: NaiveDate) -> bool {
        self.exception_dates.iter().any(|e| e.date == date)
    }

    /// The exception dates as a set, for repeated membership tests.
    pub fn exception_set(&self) -> HashSet<NaiveDate> {
        self.exception_dates.iter().map(|e| e.date).collect()
    }

    /// Returns true if `date` is an instructional day.
    ///
    /// An instructional day is inside the school-year range, falls on a
    /// weekday, and is not an exception date.
    pub fn is_instructional_day(&self, date: NaiveDate) -> bool {
        self.contains(date) && is_weekday(date) && !self.is_exception(date)
    }

    /// Checks the calendar's internal consistency.
    pub fn validate(&self) -> EngineResult<()> {
        if let Some(last_day) = self.last_day.filter(|last| *last < self.first_day) {
            return Err(EngineError::InvalidCalendar {
                calendar_id: self.id.clone(),
                message: format!("last day {} is before first day {}", last_day, self.first_day),
            });
        }

        if self.start_grade > self.end_grade {
            return Err(EngineError::InvalidCalendar {
                calendar_id: self.id.clone(),
                message: format!(
                    "start grade {} is above end grade {}",
                    self.start_grade, self.end_grade
                ),
            });
        }

        Ok(())
    }

    /// Selects the calendar for a school, grade and billing period.
    ///
    /// The first calendar belonging to `school_id` whose grade band contains
    /// `grade` and whose date range overlaps the period is returned. A grade
    /// that does not parse matches no calendar.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::CalendarNotFound`] when nothing matches and
    /// [`EngineError::InvalidMonth`] for a malformed month period.
    pub fn resolve<'a, I>(
        calendars: I,
        school_id: &str,
        grade: &str,
        period: &BillingPeriod,
    ) -> EngineResult<&'a Calendar>
    where
        I: IntoIterator<Item = &'a Calendar>,
    {
        let (from, to) = period.bounds()?;
        let not_found = || EngineError::CalendarNotFound {
            school_id: school_id.to_string(),
            grade: grade.to_string(),
            period: period.to_string(),
        };

        let Ok(grade) = grade.parse::<Grade>() else {
            return Err(not_found());
        };

        calendars
            .into_iter()
            .find(|c| {
                c.school_id == school_id && c.grade_band().contains(grade) && c.overlaps(from, to)
            })
            .ok_or_else(not_found)
    }
}

/// Returns true for Monday through Friday.
pub fn is_weekday(date: NaiveDate) -> bool {
    !matches!(date.weekday(), Weekday::Sat | Weekday::Sun)
}
