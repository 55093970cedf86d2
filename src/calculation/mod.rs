//! Calculation logic for the attendance engine.
//!
//! This module contains instructional day counting with its per-run cache,
//! membership rounding, per-student attendance over a billing period, and
//! the roster-wide aggregations built on it: monthly and yearly totals,
//! cumulative billing months, the days-attended schedule, enrollment months
//! and year-end reconciliation rows.

mod attendance;
mod billing;
mod days_attended;
mod enrollment_months;
mod instructional_days;
mod reconciliation;
mod rounding;

pub use attendance::{compute_billing_period_attendance, compute_period_attendance};
pub use billing::{billing_months_for_school_year, monthly_totals, yearly_totals};
pub use days_attended::{DaysAttendedRow, DaysAttendedSchedule, days_attended_schedule};
pub use enrollment_months::{EnrollmentMonth, enrollment_months};
pub use instructional_days::{DayCountCache, DayCountKey, Memoize, count_instructional_days};
pub use reconciliation::{ReconciliationEntry, reconciliation_entries};
pub use rounding::{MEMBERSHIP_DECIMAL_PLACES, membership_fraction, round_membership};
