//! Billing months in which a student was enrolled.

use chrono::Datelike;
use serde::{Deserialize, Serialize};

use super::billing::billing_months_for_school_year;
use crate::error::EngineResult;
use crate::models::{Calendar, Classification, EnrollmentRecord, month_bounds};

/// A billed month and the student's classification in it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnrollmentMonth {
    /// Month number, 1-12.
    pub month: u32,
    /// Calendar year of the month.
    pub year: i32,
    /// Classification on the month's last day.
    pub classification: Classification,
}

/// Lists the billing months, July through `month`, the student was enrolled.
///
/// A student who entered after the calendar's first day is listed from the
/// entry month. Months ending before the entry date are skipped, and
/// listing stops at the first month that begins after the exit date. Each
/// month is tagged with the student's classification on its last day.
///
/// # Errors
///
/// Returns [`crate::error::EngineError::MissingEntryDate`] when the record
/// has no entry date, and [`crate::error::EngineError::InvalidMonth`] for a
/// month outside 1-12.
///
/// # Example
///
/// ```
/// use attendance_engine::calculation::enrollment_months;
/// use attendance_engine::models::{Calendar, Classification, EnrollmentRecord, Grade};
/// use chrono::NaiveDate;
///
/// let calendar = Calendar {
///     id: "acs-2024".to_string(),
///     school_id: "acs".to_string(),
///     start_grade: Grade::Kindergarten,
///     end_grade: Grade::Numeric(12),
///     first_day: NaiveDate::from_ymd_opt(2023, 9, 1).unwrap(),
///     last_day: Some(NaiveDate::from_ymd_opt(2024, 6, 10).unwrap()),
///     exception_dates: vec![],
/// };
/// let student = EnrollmentRecord {
///     student_id: "1001".to_string(),
///     first_name: "Ada".to_string(),
///     last_name: "Lovelace".to_string(),
///     district_aun: "101260303".to_string(),
///     grade: "3".to_string(),
///     district_entry_date: Some(NaiveDate::from_ymd_opt(2023, 11, 6).unwrap()),
///     exit_date: None,
///     current_iep_date: None,
///     prior_iep_date: None,
/// };
///
/// let months = enrollment_months(&calendar, &student, 12, 2023).unwrap();
/// assert_eq!(months.len(), 2);
/// assert_eq!((months[0].month, months[0].year), (11, 2023));
/// assert_eq!(months[1].classification, Classification::NonSpecialEducation);
/// ```
pub fn enrollment_months(
    calendar: &Calendar,
    enrollment: &EnrollmentRecord,
    month: u32,
    year: i32,
) -> EngineResult<Vec<EnrollmentMonth>> {
    let entry = enrollment.entry_date()?;
    let billing_months = billing_months_for_school_year(month, year)?;

    // Students enrolled when the year opened are listed from July.
    let start = if entry > calendar.first_day {
        billing_months
            .iter()
            .position(|&(m, y)| (y, m) >= (entry.year(), entry.month()))
            .unwrap_or(billing_months.len())
    } else {
        0
    };

    let mut months = Vec::new();
    for &(m, y) in &billing_months[start..] {
        let (first, last) = month_bounds(m, y)?;
        if enrollment.exit_date.is_some_and(|exit| first > exit) {
            break;
        }
        if last < entry {
            continue;
        }
        months.push(EnrollmentMonth {
            month: m,
            year: y,
            classification: enrollment.classification_on(last),
        });
    }

    Ok(months)
}
