//! Attendance results and aggregated billing totals.
//!
//! Membership values are fractions of a billing period (average daily
//! membership, ADM) held as [`Decimal`] so rounding is exact.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// One student's attendance over one billing period.
///
/// # Example
///
/// ```
/// use attendance_engine::models::AttendanceResult;
/// use rust_decimal::Decimal;
///
/// let result = AttendanceResult::zero();
/// assert_eq!(result.total_membership(), Decimal::ZERO);
/// assert_eq!(result.total_days(), 0);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttendanceResult {
    /// Instructional days counted as special education.
    pub sped_days: u32,
    /// Instructional days counted as non special education.
    pub non_sped_days: u32,
    /// Special-education fraction of the period.
    pub sped_membership: Decimal,
    /// Non special-education fraction of the period.
    pub non_sped_membership: Decimal,
    /// Instructional days in the whole period.
    pub days_in_session: u32,
}

impl AttendanceResult {
    /// A result with no attendance and no session days.
    pub fn zero() -> Self {
        Self::empty_session(0)
    }

    /// A result with no attendance over a period of `days_in_session` days.
    pub fn empty_session(days_in_session: u32) -> Self {
        Self {
            sped_days: 0,
            non_sped_days: 0,
            sped_membership: Decimal::ZERO,
            non_sped_membership: Decimal::ZERO,
            days_in_session,
        }
    }

    /// Days attended in either bucket.
    pub fn total_days(&self) -> u32 {
        self.sped_days + self.non_sped_days
    }

    /// Membership in either bucket.
    pub fn total_membership(&self) -> Decimal {
        self.sped_membership + self.non_sped_membership
    }
}

/// Roster-wide membership for one billing month.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonthlyTotals {
    /// Month number, 1-12.
    pub month: u32,
    /// Calendar year of the month.
    pub year: i32,
    /// Sum of special-education membership fractions.
    pub sped_membership: Decimal,
    /// Sum of non special-education membership fractions.
    pub non_sped_membership: Decimal,
}

impl MonthlyTotals {
    /// Totals with nothing accumulated yet.
    pub fn empty(month: u32, year: i32) -> Self {
        Self {
            month,
            year,
            sped_membership: Decimal::ZERO,
            non_sped_membership: Decimal::ZERO,
        }
    }

    /// Adds one student's result.
    pub fn add(&mut self, result: &AttendanceResult) {
        self.sped_membership += result.sped_membership;
        self.non_sped_membership += result.non_sped_membership;
    }

    /// Adds another roster's totals for the same month.
    pub fn merge(&mut self, other: &MonthlyTotals) {
        self.sped_membership += other.sped_membership;
        self.non_sped_membership += other.non_sped_membership;
    }
}

/// Roster-wide headcounts and membership days for one school year.
///
/// Headcounts answer how many distinct students spent any time in a bucket;
/// days answer how much instructional time was spent there.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct YearlyTotals {
    /// Students with any special-education membership.
    pub sped_count: u32,
    /// Special-education membership days.
    pub sped_days: u32,
    /// Students with any non special-education membership.
    pub non_sped_count: u32,
    /// Non special-education membership days.
    pub non_sped_days: u32,
    /// Instructional days in the school year.
    pub days_in_session: u32,
}

impl YearlyTotals {
    /// Adds one student's full-year result.
    ///
    /// A bucket's headcount grows by the ceiling of the student's fraction
    /// in that bucket, so any non-zero membership counts as one head.
    pub fn add(&mut self, result: &AttendanceResult) {
        self.sped_days += result.sped_days;
        self.non_sped_days += result.non_sped_days;
        self.sped_count += headcount(result.sped_membership);
        self.non_sped_count += headcount(result.non_sped_membership);
    }

    /// Adds totals computed on another calendar.
    ///
    /// Counts and days are summed. Calendars differ in length, so
    /// `days_in_session` keeps the longer of the two years.
    pub fn merge(&mut self, other: &YearlyTotals) {
        self.sped_count += other.sped_count;
        self.sped_days += other.sped_days;
        self.non_sped_count += other.non_sped_count;
        self.non_sped_days += other.non_sped_days;
        self.days_in_session = self.days_in_session.max(other.days_in_session);
    }
}

fn headcount(membership: Decimal) -> u32 {
    if membership > Decimal::ZERO {
        membership.ceil().try_into().unwrap_or(1)
    } else {
        0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn result(sped_days: u32, non_sped_days: u32, sped: &str, non_sped: &str) -> AttendanceResult {
        AttendanceResult {
            sped_days,
            non_sped_days,
            sped_membership: dec(sped),
            non_sped_membership: dec(non_sped),
            days_in_session: 180,
        }
    }

    #[test]
    fn test_empty_session_keeps_denominator() {
        let r = AttendanceResult::empty_session(20);
        assert_eq!(r.days_in_session, 20);
        assert_eq!(r.total_days(), 0);
    }

    #[test]
    fn test_monthly_totals_sum_fractions() {
        let mut totals = MonthlyTotals::empty(9, 2023);
        totals.add(&result(0, 20, "0", "1"));
        totals.add(&result(10, 0, "0.5", "0"));
        totals.add(&result(0, 5, "0", "0.25"));
        assert_eq!(totals.sped_membership, dec("0.5"));
        assert_eq!(totals.non_sped_membership, dec("1.25"));
    }

    #[test]
    fn test_yearly_totals_count_any_fraction_as_one_head() {
        let mut totals = YearlyTotals::default();
        totals.add(&result(80, 100, "0.444", "0.556"));
        totals.add(&result(0, 12, "0", "0.067"));

        assert_eq!(totals.sped_count, 1);
        assert_eq!(totals.non_sped_count, 2);
        assert_eq!(totals.sped_days, 80);
        assert_eq!(totals.non_sped_days, 112);
    }

    #[test]
    fn test_yearly_totals_merge_keeps_longer_year() {
        let mut elementary = YearlyTotals {
            sped_count: 1,
            sped_days: 102,
            non_sped_count: 2,
            non_sped_days: 278,
            days_in_session: 190,
        };
        let secondary = YearlyTotals {
            sped_count: 1,
            sped_days: 139,
            non_sped_count: 1,
            non_sped_days: 163,
            days_in_session: 197,
        };
        elementary.merge(&secondary);
        assert_eq!(elementary.sped_count, 2);
        assert_eq!(elementary.sped_days, 241);
        assert_eq!(elementary.non_sped_count, 3);
        assert_eq!(elementary.non_sped_days, 441);
        assert_eq!(elementary.days_in_session, 197);
    }

    #[test]
    fn test_monthly_totals_merge() {
        let mut a = MonthlyTotals::empty(10, 2023);
        a.add(&result(0, 20, "0", "1"));
        let mut b = MonthlyTotals::empty(10, 2023);
        b.add(&result(12, 0, "0.545", "0"));
        a.merge(&b);
        assert_eq!(a.sped_membership, dec("0.545"));
        assert_eq!(a.non_sped_membership, dec("1"));
    }

    #[test]
    fn test_headcount_zero_for_zero_membership() {
        assert_eq!(headcount(Decimal::ZERO), 0);
        assert_eq!(headcount(dec("0.001")), 1);
        assert_eq!(headcount(dec("1.000")), 1);
    }

    #[test]
    fn test_serialize_attendance_result_uses_string_decimals() {
        let json = serde_json::to_string(&result(0, 180, "0", "1.000")).unwrap();
        assert!(json.contains("\"non_sped_membership\":\"1.000\""));
        assert!(json.contains("\"days_in_session\":180"));
    }
}
