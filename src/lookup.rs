//! Lookups the engine needs from its data source.
//!
//! The calculation itself performs no I/O. A billing run asks these traits
//! for calendars, rosters and rates, so the same run can be driven from a
//! configuration directory, a database layer or in-memory test data.

use std::collections::HashSet;

use chrono::NaiveDate;

use crate::error::EngineResult;
use crate::models::{BillingPeriod, Calendar, DistrictRate, EnrollmentRecord};

/// Finds school calendars.
pub trait CalendarLookup {
    /// Finds the calendar of `school_id` whose grade band contains `grade`
    /// and whose date range overlaps `period`.
    ///
    /// Returns `None` when nothing is configured; callers treat that as zero
    /// attendance rather than an error.
    fn find_calendar(
        &self,
        school_id: &str,
        grade: &str,
        period: &BillingPeriod,
    ) -> Option<&Calendar>;

    /// Returns the exception dates of a calendar, or an empty set for an
    /// unknown calendar.
    fn find_exception_dates(&self, calendar_id: &str) -> HashSet<NaiveDate>;
}

/// Finds enrolled students.
pub trait RosterLookup {
    /// Returns the students of `school_id` residing in `district_aun`,
    /// ordered by grade, then surname, then given name.
    fn find_students(&self, school_id: &str, district_aun: &str) -> Vec<EnrollmentRecord>;
}

/// Finds district billing rates.
pub trait RateLookup {
    /// Returns the most recent rate for `district_aun` effective on or before
    /// `as_of`.
    ///
    /// # Errors
    ///
    /// Returns [`crate::error::EngineError::RateNotFound`] when no rate is
    /// effective by that date.
    fn find_rate(&self, district_aun: &str, as_of: NaiveDate) -> EngineResult<DistrictRate>;
}
