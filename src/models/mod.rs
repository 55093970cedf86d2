//! Core data models for the attendance engine.
//!
//! This module contains all the domain models used throughout the engine.

mod attendance;
mod billing_period;
mod calendar;
mod enrollment;
mod grade;
mod rate;

pub use attendance::{AttendanceResult, MonthlyTotals, YearlyTotals};
pub use billing_period::{BillingPeriod, SCHOOL_YEAR_FIRST_MONTH, SchoolYear, month_bounds};
pub use calendar::{Calendar, ExceptionDate, ExceptionKind, is_weekday};
pub use enrollment::{Classification, EnrollmentRecord, sort_roster};
pub use grade::{Grade, GradeBand};
pub use rate::{DistrictRate, RateSchedule};
