//! Roster-wide billing aggregation.
//!
//! Monthly totals sum membership fractions, which the invoice multiplies by
//! a district's per-student rate. Yearly totals report headcounts and
//! membership days side by side.

use tracing::debug;

use super::attendance::compute_period_attendance;
use super::instructional_days::{DayCountCache, Memoize};
use crate::error::EngineResult;
use crate::models::{
    Calendar, EnrollmentRecord, MonthlyTotals, SchoolYear, YearlyTotals, month_bounds,
};

/// Sums every student's membership fractions for one calendar month.
///
/// # Errors
///
/// Propagates the first validation error raised by a student's attendance
/// calculation, and [`crate::error::EngineError::InvalidMonth`] for a month
/// outside 1-12.
pub fn monthly_totals(
    calendar: Option<&Calendar>,
    roster: &[EnrollmentRecord],
    month: u32,
    year: i32,
    cache: &mut DayCountCache,
) -> EngineResult<MonthlyTotals> {
    let (start, end) = month_bounds(month, year)?;
    let mut totals = MonthlyTotals::empty(month, year);

    for student in roster {
        let result = compute_period_attendance(calendar, student, start, end, cache)?;
        totals.add(&result);
    }

    Ok(totals)
}

/// Accumulates headcounts and membership days over a school year.
///
/// The year runs from the calendar's first to last instructional date.
/// Without a calendar every student contributes nothing.
///
/// # Example
///
/// ```
/// use attendance_engine::calculation::{DayCountCache, yearly_totals};
/// use attendance_engine::models::{Calendar, EnrollmentRecord, Grade, SchoolYear};
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
///     district_entry_date: Some(NaiveDate::from_ymd_opt(2023, 9, 1).unwrap()),
///     exit_date: None,
///     current_iep_date: None,
///     prior_iep_date: None,
/// };
///
/// let mut cache = DayCountCache::new();
/// let totals = yearly_totals(Some(&calendar), &[student], SchoolYear::new(2024), &mut cache).unwrap();
/// assert_eq!(totals.non_sped_count, 1);
/// assert_eq!(totals.non_sped_days, totals.days_in_session);
/// ```
pub fn yearly_totals(
    calendar: Option<&Calendar>,
    roster: &[EnrollmentRecord],
    year: SchoolYear,
    cache: &mut DayCountCache,
) -> EngineResult<YearlyTotals> {
    let mut totals = YearlyTotals::default();

    let Some(cal) = calendar else {
        for student in roster {
            student.entry_date()?;
        }
        return Ok(totals);
    };

    let (start, end) = (cal.first_day, cal.end_date());
    totals.days_in_session = cache.count(cal, start, end, Memoize::FullYear);
    debug!(
        calendar_id = %cal.id,
        school_year = %year,
        days_in_session = totals.days_in_session,
        "Aggregating yearly totals"
    );

    for student in roster {
        let result = compute_period_attendance(Some(cal), student, start, end, cache)?;
        totals.add(&result);
    }

    Ok(totals)
}

/// Lists the months billed cumulatively by an invoice for `month`.
///
/// Billing within a school year is cumulative: an invoice for December
/// covers July through December. June closes the year and lists all twelve
/// months.
///
/// # Example
///
/// ```
/// use attendance_engine::calculation::billing_months_for_school_year;
///
/// let months = billing_months_for_school_year(2, 2024).unwrap();
/// assert_eq!(months.first(), Some(&(7, 2023)));
/// assert_eq!(months.last(), Some(&(2, 2024)));
/// assert_eq!(months.len(), 8);
/// ```
pub fn billing_months_for_school_year(month: u32, year: i32) -> EngineResult<Vec<(u32, i32)>> {
    let school_year = SchoolYear::for_month(month, year)?;
    let mut months = school_year.months();
    if let Some(pos) = months.iter().position(|m| *m == (month, year)) {
        months.truncate(pos + 1);
    }
    Ok(months)
}
