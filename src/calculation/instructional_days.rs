//! Instructional day counting.
//!
//! Counting walks an inclusive date range day by day, clamped to the
//! calendar's own school-year range, and keeps weekdays that are not
//! exception dates. Batch runs query the same month or year totals once per
//! student, so [`DayCountCache`] memoizes full-month and full-year counts.
//! The cache is an ordinary value owned by the caller; each billing run
//! creates its own.

use std::collections::HashMap;

use chrono::{Datelike, NaiveDate};
use tracing::{debug, warn};

use crate::models::{Calendar, is_weekday, month_bounds};

/// Counts instructional days in `[from, to]` on `calendar`.
///
/// Days outside the calendar's school-year range are skipped rather than
/// rejected. An empty range yields zero.
///
/// # Example
///
/// ```
/// use attendance_engine::calculation::count_instructional_days;
/// use attendance_engine::models::{Calendar, Grade};
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
///
/// // Friday 2023-09-01 through Friday 2023-09-08
/// let from = NaiveDate::from_ymd_opt(2023, 9, 1).unwrap();
/// let to = NaiveDate::from_ymd_opt(2023, 9, 8).unwrap();
/// assert_eq!(count_instructional_days(&calendar, from, to), 6);
/// ```
pub fn count_instructional_days(calendar: &Calendar, from: NaiveDate, to: NaiveDate) -> u32 {
    let start = from.max(calendar.first_day);
    let end = to.min(calendar.end_date());
    if start > end {
        return 0;
    }

    let exceptions = calendar.exception_set();
    let count = start
        .iter_days()
        .take_while(|d| *d <= end)
        .filter(|d| is_weekday(*d) && !exceptions.contains(d))
        .count();

    u32::try_from(count).unwrap_or(u32::MAX)
}

/// Which memoized total, if any, a count should be stored under.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Memoize {
    /// Always scan; never read or write the cache.
    None,
    /// The range is a whole calendar month.
    FullMonth,
    /// The range is the calendar's whole school year.
    FullYear,
}

impl Memoize {
    /// Picks the memoization mode matching `[from, to]` exactly.
    ///
    /// Ranges that are neither the calendar's full year nor a whole
    /// calendar month are never memoized.
    pub fn for_range(calendar: &Calendar, from: NaiveDate, to: NaiveDate) -> Self {
        if from == calendar.first_day && to == calendar.end_date() {
            Memoize::FullYear
        } else if is_full_month(from, to) {
            Memoize::FullMonth
        } else {
            Memoize::None
        }
    }
}

/// Key of a memoized count.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum DayCountKey {
    /// The full school year of a calendar.
    FullYear {
        /// The calendar identifier.
        calendar_id: String,
        /// The resolved last day, which moves daily for open-ended calendars.
        end_date: NaiveDate,
    },
    /// One calendar month on a calendar.
    FullMonth {
        /// The calendar identifier.
        calendar_id: String,
        /// Calendar year of the month.
        year: i32,
        /// Month number, 1-12.
        month: u32,
    },
}

/// Memoized instructional day totals for one billing run.
///
/// Entries are keyed by calendar and by month or year. The caller decides
/// when a range qualifies as a full month or year; a memoized request whose
/// range is not aligned is served from (or stored under) the same key as the
/// aligned one.
///
/// # Example
///
/// ```
/// use attendance_engine::calculation::{DayCountCache, Memoize};
/// use attendance_engine::models::{Calendar, Grade};
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
///
/// let mut cache = DayCountCache::new();
/// let first = cache.count(&calendar, calendar.first_day, calendar.end_date(), Memoize::FullYear);
/// let second = cache.count(&calendar, calendar.first_day, calendar.end_date(), Memoize::FullYear);
/// assert_eq!(first, second);
/// assert_eq!(cache.hits(), 1);
/// ```
#[derive(Debug, Clone, Default)]
pub struct DayCountCache {
    entries: HashMap<DayCountKey, u32>,
    hits: u64,
    misses: u64,
}

impl DayCountCache {
    /// Creates an empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Counts instructional days, consulting the cache when `memoize` asks.
    pub fn count(
        &mut self,
        calendar: &Calendar,
        from: NaiveDate,
        to: NaiveDate,
        memoize: Memoize,
    ) -> u32 {
        let key = match memoize {
            Memoize::None => return count_instructional_days(calendar, from, to),
            Memoize::FullYear => {
                if from != calendar.first_day || to != calendar.end_date() {
                    warn!(
                        calendar_id = %calendar.id,
                        %from,
                        %to,
                        "Full-year day count requested for a range that is not the school year"
                    );
                }
                DayCountKey::FullYear {
                    calendar_id: calendar.id.clone(),
                    end_date: calendar.end_date(),
                }
            }
            Memoize::FullMonth => {
                if !is_full_month(from, to) {
                    warn!(
                        calendar_id = %calendar.id,
                        %from,
                        %to,
                        "Full-month day count requested for a range that is not a whole month"
                    );
                }
                DayCountKey::FullMonth {
                    calendar_id: calendar.id.clone(),
                    year: from.year(),
                    month: from.month(),
                }
            }
        };

        if let Some(days) = self.entries.get(&key) {
            self.hits += 1;
            debug!(?key, days, "Day count cache hit");
            return *days;
        }

        let days = count_instructional_days(calendar, from, to);
        self.misses += 1;
        debug!(?key, days, "Day count cache miss");
        self.entries.insert(key, days);
        days
    }

    /// Number of memoized totals.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if nothing is memoized.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of lookups served from the cache.
    pub fn hits(&self) -> u64 {
        self.hits
    }

    /// Number of memoized lookups that had to scan.
    pub fn misses(&self) -> u64 {
        self.misses
    }

    /// Drops every memoized total.
    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

fn is_full_month(from: NaiveDate, to: NaiveDate) -> bool {
    month_bounds(from.month(), from.year()).is_ok_and(|bounds| bounds == (from, to))
}
