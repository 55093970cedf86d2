//! School year and billing period models.
//!
//! School years run July 1 through June 30 and are labelled by the calendar
//! year they end in: school year 2024 spans July 2023 through June 2024.

use std::fmt;

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

use super::Calendar;
use crate::error::{EngineError, EngineResult};

/// The first month of a school year.
pub const SCHOOL_YEAR_FIRST_MONTH: u32 = 7;

/// A July-June school year, labelled by its ending calendar year.
///
/// # Example
///
/// ```
/// use attendance_engine::models::SchoolYear;
///
/// let year = SchoolYear::new(2024);
/// assert_eq!(year.start_year(), 2023);
/// assert_eq!(year.label(), "2023/2024");
/// assert_eq!(SchoolYear::for_month(9, 2023).unwrap(), year);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SchoolYear(i32);

impl SchoolYear {
    /// Creates the school year ending in `end_year`.
    pub fn new(end_year: i32) -> Self {
        Self(end_year)
    }

    /// Returns the school year a calendar month belongs to.
    ///
    /// July through December belong to the school year ending the following
    /// calendar year.
    pub fn for_month(month: u32, year: i32) -> EngineResult<Self> {
        validate_month(month)?;
        if month >= SCHOOL_YEAR_FIRST_MONTH {
            year.checked_add(1).map(Self).ok_or(EngineError::InvalidYear { year })
        } else {
            Ok(Self(year))
        }
    }

    /// Returns the school year containing `date`.
    pub fn containing(date: NaiveDate) -> Self {
        if date.month() >= SCHOOL_YEAR_FIRST_MONTH {
            Self(date.year().saturating_add(1))
        } else {
            Self(date.year())
        }
    }

    /// The calendar year the school year ends in.
    pub fn end_year(&self) -> i32 {
        self.0
    }

    /// The calendar year the school year starts in.
    pub fn start_year(&self) -> i32 {
        self.0 - 1
    }

    /// July 1 of the start year.
    pub fn first_day(&self) -> Option<NaiveDate> {
        NaiveDate::from_ymd_opt(self.start_year(), SCHOOL_YEAR_FIRST_MONTH, 1)
    }

    /// June 30 of the end year.
    pub fn last_day(&self) -> Option<NaiveDate> {
        NaiveDate::from_ymd_opt(self.end_year(), 6, 30)
    }

    /// Human-readable label such as "2023/2024".
    pub fn label(&self) -> String {
        format!("{}/{}", self.start_year(), self.end_year())
    }

    /// All twelve (month, year) pairs, July first.
    pub fn months(&self) -> Vec<(u32, i32)> {
        (SCHOOL_YEAR_FIRST_MONTH..=12)
            .map(|m| (m, self.start_year()))
            .chain((1..SCHOOL_YEAR_FIRST_MONTH).map(|m| (m, self.end_year())))
            .collect()
    }
}

impl fmt::Display for SchoolYear {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.label())
    }
}

/// A period over which attendance is aggregated for invoicing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum BillingPeriod {
    /// A single calendar month.
    Month {
        /// Month number, 1-12.
        month: u32,
        /// Calendar year of the month.
        year: i32,
    },
    /// A full school year.
    SchoolYear {
        /// The school year.
        year: SchoolYear,
    },
}

impl BillingPeriod {
    /// Creates a validated month period.
    pub fn month(month: u32, year: i32) -> EngineResult<Self> {
        validate_month(month)?;
        Ok(BillingPeriod::Month { month, year })
    }

    /// Creates a school-year period.
    pub fn school_year(year: SchoolYear) -> Self {
        BillingPeriod::SchoolYear { year }
    }

    /// The nominal date span of the period.
    ///
    /// Months span their first to last day; school years span July 1 to
    /// June 30.
    pub fn bounds(&self) -> EngineResult<(NaiveDate, NaiveDate)> {
        match *self {
            BillingPeriod::Month { month, year } => month_bounds(month, year),
            BillingPeriod::SchoolYear { year } => year
                .first_day()
                .zip(year.last_day())
                .ok_or(EngineError::InvalidMonth {
                    month: SCHOOL_YEAR_FIRST_MONTH,
                }),
        }
    }

    /// The span attendance is computed over for `calendar`.
    ///
    /// A school year uses the calendar's own first and last instructional
    /// dates rather than July 1 and June 30.
    pub fn range_for(&self, calendar: &Calendar) -> EngineResult<(NaiveDate, NaiveDate)> {
        match self {
            BillingPeriod::Month { .. } => self.bounds(),
            BillingPeriod::SchoolYear { .. } => Ok((calendar.first_day, calendar.end_date())),
        }
    }
}

impl fmt::Display for BillingPeriod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BillingPeriod::Month { month, year } => write!(f, "{}-{:02}", year, month),
            BillingPeriod::SchoolYear { year } => write!(f, "school year {}", year),
        }
    }
}

/// Returns the first and last day of a calendar month.
pub fn month_bounds(month: u32, year: i32) -> EngineResult<(NaiveDate, NaiveDate)> {
    validate_month(month)?;
    let first = NaiveDate::from_ymd_opt(year, month, 1).ok_or(EngineError::InvalidMonth { month })?;
    let next = if month == 12 {
        NaiveDate::from_ymd_opt(year + 1, 1, 1)
    } else {
        NaiveDate::from_ymd_opt(year, month + 1, 1)
    };
    let last = next
        .and_then(|d| d.pred_opt())
        .ok_or(EngineError::InvalidMonth { month })?;
    Ok((first, last))
}

fn validate_month(month: u32) -> EngineResult<()> {
    if (1..=12).contains(&month) {
        Ok(())
    } else {
        Err(EngineError::InvalidMonth { month })
    }
}
