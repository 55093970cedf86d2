//! Error types for the attendance engine.
//!
//! This module provides strongly-typed errors using the `thiserror` crate
//! for every condition the engine surfaces to its caller. Conditions the
//! engine resolves on its own (a period with zero instructional days, a
//! student with no configured calendar inside a batch run) never show up
//! here as failures.

use chrono::NaiveDate;
use thiserror::Error;

/// The main error type for the attendance engine.
///
/// # Example
///
/// ```
/// use attendance_engine::error::EngineError;
///
/// let error = EngineError::MissingEntryDate {
///     student_id: "1001".to_string(),
/// };
/// assert_eq!(error.to_string(), "Student '1001' has no district entry date");
/// assert!(error.is_validation());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EngineError {
    /// The enrollment record has no district entry date.
    #[error("Student '{student_id}' has no district entry date")]
    MissingEntryDate {
        /// The student whose record is incomplete.
        student_id: String,
    },

    /// A grade value could not be parsed.
    #[error("Invalid grade '{value}'")]
    InvalidGrade {
        /// The raw grade value.
        value: String,
    },

    /// An enrollment record is internally inconsistent.
    #[error("Invalid enrollment for student '{student_id}': {message}")]
    InvalidEnrollment {
        /// The student whose record is invalid.
        student_id: String,
        /// A description of the inconsistency.
        message: String,
    },

    /// A calendar is internally inconsistent.
    #[error("Invalid calendar '{calendar_id}': {message}")]
    InvalidCalendar {
        /// The calendar identifier.
        calendar_id: String,
        /// A description of the inconsistency.
        message: String,
    },

    /// A month number outside 1..=12 was supplied.
    #[error("Invalid month {month}")]
    InvalidMonth {
        /// The month number that was supplied.
        month: u32,
    },

    /// A calendar year outside the representable range was supplied.
    #[error("Invalid year {year}")]
    InvalidYear {
        /// The year that was supplied.
        year: i32,
    },

    /// No calendar matched the requested school, grade and period.
    #[error("No calendar for school '{school_id}', grade '{grade}', period {period}")]
    CalendarNotFound {
        /// The charter school identifier.
        school_id: String,
        /// The grade that was requested.
        grade: String,
        /// A description of the requested period.
        period: String,
    },

    /// No billing rate is effective for the district on the given date.
    #[error("Rate not found for district '{district_aun}' on date {date}")]
    RateNotFound {
        /// The district AUN.
        district_aun: String,
        /// The date for which the rate was requested.
        date: NaiveDate,
    },

    /// Configuration file was not found at the specified path.
    #[error("Configuration file not found: {path}")]
    ConfigNotFound {
        /// The path that was not found.
        path: String,
    },

    /// Configuration file could not be parsed.
    #[error("Failed to parse configuration file '{path}': {message}")]
    ConfigParseError {
        /// The path to the file that failed to parse.
        path: String,
        /// A description of the parse error.
        message: String,
    },
}

impl EngineError {
    /// Returns true for errors that indicate corrupt input data.
    ///
    /// Batch drivers use this to decide whether a single student can be
    /// skipped instead of aborting the whole run.
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            EngineError::MissingEntryDate { .. }
                | EngineError::InvalidGrade { .. }
                | EngineError::InvalidEnrollment { .. }
                | EngineError::InvalidCalendar { .. }
                | EngineError::InvalidMonth { .. }
                | EngineError::InvalidYear { .. }
        )
    }
}

/// A type alias for Results that return EngineError.
pub type EngineResult<T> = Result<T, EngineError>;
