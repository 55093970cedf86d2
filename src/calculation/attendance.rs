//! Per-student attendance over a billing period.
//!
//! The calculation splits a student's membership in a period between the
//! special-education and non special-education buckets:
//!
//! - A student enrolled for the whole period with no IEP transition lands
//!   wholly in one bucket with a fraction of 1.
//! - A student enrolled for the whole period whose IEP began mid-period is
//!   split at the current IEP date. The non special-education fraction is
//!   `1 - sped fraction`, so the two always sum to exactly 1.
//! - A student who entered or exited mid-period is measured over the
//!   enrolled sub-range only. Each fraction is computed independently, so
//!   their sum is at most 1.

use chrono::NaiveDate;
use rust_decimal::Decimal;

use super::instructional_days::{DayCountCache, Memoize, count_instructional_days};
use super::rounding::membership_fraction;
use crate::error::EngineResult;
use crate::models::{AttendanceResult, BillingPeriod, Calendar, EnrollmentRecord};

/// Computes one student's attendance over `[period_start, period_end]`.
///
/// # Arguments
///
/// * `calendar` - The resolved calendar, or `None` when no calendar is
///   configured for the student's grade and period
/// * `enrollment` - The student's enrollment record
/// * `period_start` / `period_end` - The inclusive billing period
/// * `cache` - The run's memoized day counts
///
/// # Returns
///
/// An all-zero result when `calendar` is `None` or the period has no
/// instructional days.
///
/// # Errors
///
/// Returns [`crate::error::EngineError::MissingEntryDate`] when the record has no
/// district entry date.
///
/// # Example
///
/// ```
/// use attendance_engine::calculation::{DayCountCache, compute_period_attendance};
/// use attendance_engine::models::{Calendar, EnrollmentRecord, Grade};
/// use chrono::NaiveDate;
/// use rust_decimal::Decimal;
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
/// let result = compute_period_attendance(
///     Some(&calendar),
///     &student,
///     calendar.first_day,
///     calendar.end_date(),
///     &mut cache,
/// )
/// .unwrap();
///
/// assert_eq!(result.non_sped_membership, Decimal::ONE);
/// assert_eq!(result.sped_membership, Decimal::ZERO);
/// ```
pub fn compute_period_attendance(
    calendar: Option<&Calendar>,
    enrollment: &EnrollmentRecord,
    period_start: NaiveDate,
    period_end: NaiveDate,
    cache: &mut DayCountCache,
) -> EngineResult<AttendanceResult> {
    let entry_date = enrollment.entry_date()?;

    let Some(calendar) = calendar else {
        return Ok(AttendanceResult::zero());
    };

    let memoize = Memoize::for_range(calendar, period_start, period_end);
    let days_in_session = cache.count(calendar, period_start, period_end, memoize);
    if days_in_session == 0 {
        return Ok(AttendanceResult::zero());
    }

    if enrollment.attended_entire_period(period_start, period_end) {
        return Ok(whole_period(
            calendar,
            enrollment,
            period_start,
            period_end,
            days_in_session,
        ));
    }

    // Mid-period entry wins over mid-period exit when both apply.
    let (from, to) = if entry_date >= period_start {
        (entry_date, period_end)
    } else {
        (period_start, enrollment.exit_date.unwrap_or(period_end))
    };

    let total_days = count_instructional_days(calendar, from, to);
    let (sped_days, non_sped_days) = split_days(calendar, enrollment, from, to, total_days);

    Ok(AttendanceResult {
        sped_days,
        non_sped_days,
        sped_membership: membership_fraction(sped_days, days_in_session),
        non_sped_membership: membership_fraction(non_sped_days, days_in_session),
        days_in_session,
    })
}

/// Computes attendance over a [`BillingPeriod`].
///
/// Months span their first to last day; school years span the calendar's
/// own first and last instructional dates.
pub fn compute_billing_period_attendance(
    calendar: Option<&Calendar>,
    enrollment: &EnrollmentRecord,
    period: &BillingPeriod,
    cache: &mut DayCountCache,
) -> EngineResult<AttendanceResult> {
    match calendar {
        Some(cal) => {
            let (start, end) = period.range_for(cal)?;
            compute_period_attendance(Some(cal), enrollment, start, end, cache)
        }
        None => {
            let (start, end) = period.bounds()?;
            compute_period_attendance(None, enrollment, start, end, cache)
        }
    }
}

fn whole_period(
    calendar: &Calendar,
    enrollment: &EnrollmentRecord,
    period_start: NaiveDate,
    period_end: NaiveDate,
    days_in_session: u32,
) -> AttendanceResult {
    let sped_at_start = enrollment.is_special_education_on_date(period_start);
    let sped_at_end = enrollment.is_special_education_on_date(period_end);

    if sped_at_start == sped_at_end {
        let mut result = AttendanceResult::empty_session(days_in_session);
        if sped_at_start {
            result.sped_days = days_in_session;
            result.sped_membership = Decimal::ONE;
        } else {
            result.non_sped_days = days_in_session;
            result.non_sped_membership = Decimal::ONE;
        }
        return result;
    }

    let (sped_days, non_sped_days) =
        split_days(calendar, enrollment, period_start, period_end, days_in_session);
    let sped_membership = membership_fraction(sped_days, days_in_session);

    AttendanceResult {
        sped_days,
        non_sped_days,
        sped_membership,
        non_sped_membership: Decimal::ONE - sped_membership,
        days_in_session,
    }
}

/// Splits `total_days` in `[from, to]` into (sped, non-sped) days.
///
/// When the classification differs between `from` and `to`, special
/// education starts on the current IEP date.
fn split_days(
    calendar: &Calendar,
    enrollment: &EnrollmentRecord,
    from: NaiveDate,
    to: NaiveDate,
    total_days: u32,
) -> (u32, u32) {
    let sped_at_start = enrollment.is_special_education_on_date(from);
    let sped_at_end = enrollment.is_special_education_on_date(to);

    match (sped_at_start, sped_at_end) {
        (true, true) => (total_days, 0),
        (false, false) => (0, total_days),
        _ => {
            let sped_days = enrollment
                .current_iep_date
                .map_or(0, |iep| count_instructional_days(calendar, iep, to))
                .min(total_days);
            (sped_days, total_days - sped_days)
        }
    }
}
