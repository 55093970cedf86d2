//! Days-attended schedule for a school year.
//!
//! The schedule lists, for each student who attended at all during the
//! year, the instructional days attended in each month of the July-June
//! year, headed by the number of instructional days in each month.

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::attendance::compute_period_attendance;
use super::instructional_days::{DayCountCache, Memoize};
use crate::error::EngineResult;
use crate::models::{Calendar, EnrollmentRecord, SchoolYear, month_bounds};

/// One student's row in the schedule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DaysAttendedRow {
    /// State student number.
    pub student_id: String,
    /// Given name.
    pub first_name: String,
    /// Surname.
    pub last_name: String,
    /// Grade as recorded.
    pub grade: String,
    /// Days attended per month, July first.
    pub monthly_days: Vec<u32>,
    /// Days attended over the year.
    pub total_days: u32,
}

/// Monthly days attended for a roster over one school year.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DaysAttendedSchedule {
    /// The school year covered.
    pub school_year: SchoolYear,
    /// Instructional days per month, July first.
    pub days_in_session: Vec<u32>,
    /// One row per student with any attendance.
    pub rows: Vec<DaysAttendedRow>,
}

impl DaysAttendedSchedule {
    /// Instructional days in the whole year.
    pub fn total_days_in_session(&self) -> u32 {
        self.days_in_session.iter().sum()
    }
}

/// Builds the days-attended schedule for `roster` on `calendar`.
///
/// Students with no attendance over the full year are left out. Rows keep
/// the roster's order. A month whose attendance cannot be computed counts
/// as zero days.
///
/// # Errors
///
/// Propagates a validation error from a student's full-year attendance.
pub fn days_attended_schedule(
    calendar: &Calendar,
    roster: &[EnrollmentRecord],
    year: SchoolYear,
    cache: &mut DayCountCache,
) -> EngineResult<DaysAttendedSchedule> {
    let months = year.months();
    let mut days_in_session = Vec::with_capacity(months.len());
    let mut bounds = Vec::with_capacity(months.len());
    for &(month, month_year) in &months {
        let (start, end) = month_bounds(month, month_year)?;
        days_in_session.push(cache.count(calendar, start, end, Memoize::FullMonth));
        bounds.push((start, end));
    }

    let mut rows = Vec::new();
    for student in roster {
        let yearly = compute_period_attendance(
            Some(calendar),
            student,
            calendar.first_day,
            calendar.end_date(),
            cache,
        )?;
        if yearly.total_membership().is_zero() {
            debug!(student_id = %student.student_id, "No attendance during the year");
            continue;
        }

        let monthly_days: Vec<u32> = bounds
            .iter()
            .map(|&(start, end)| {
                compute_period_attendance(Some(calendar), student, start, end, cache)
                    .map_or(0, |r| r.total_days())
            })
            .collect();
        let total_days = monthly_days.iter().sum();

        rows.push(DaysAttendedRow {
            student_id: student.student_id.clone(),
            first_name: student.first_name.clone(),
            last_name: student.last_name.clone(),
            grade: student.grade.clone(),
            monthly_days,
            total_days,
        });
    }

    Ok(DaysAttendedSchedule {
        school_year: year,
        days_in_session,
        rows,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Grade;
    use chrono::NaiveDate;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn calendar() -> Calendar {
        Calendar {
            id: "acs-2024".to_string(),
            school_id: "acs".to_string(),
            start_grade: Grade::Kindergarten,
            end_grade: Grade::Numeric(12),
            first_day: date(2023, 9, 1),
            last_day: Some(date(2024, 6, 10)),
            exception_dates: vec![],
        }
    }

    fn student(id: &str) -> EnrollmentRecord {
        EnrollmentRecord {
            student_id: id.to_string(),
            first_name: "Test".to_string(),
            last_name: format!("Student{}", id),
            district_aun: "101260303".to_string(),
            grade: "3".to_string(),
            district_entry_date: Some(date(2023, 9, 1)),
            exit_date: None,
            current_iep_date: None,
            prior_iep_date: None,
        }
    }

    #[test]
    fn test_header_row_counts_month_days() {
        let mut cache = DayCountCache::new();
        let schedule =
            days_attended_schedule(&calendar(), &[], SchoolYear::new(2024), &mut cache).unwrap();
        assert_eq!(
            schedule.days_in_session,
            vec![0, 0, 21, 22, 22, 21, 23, 21, 21, 22, 23, 6]
        );
        assert_eq!(schedule.total_days_in_session(), 202);
        assert!(schedule.rows.is_empty());
    }

    #[test]
    fn test_full_year_student_matches_header() {
        let mut cache = DayCountCache::new();
        let schedule =
            days_attended_schedule(&calendar(), &[student("1")], SchoolYear::new(2024), &mut cache)
                .unwrap();
        let row = &schedule.rows[0];
        assert_eq!(row.monthly_days, schedule.days_in_session);
        assert_eq!(row.total_days, 202);
    }

    #[test]
    fn test_mid_october_entrant() {
        let mut entrant = student("2");
        entrant.district_entry_date = Some(date(2023, 10, 16));
        let mut cache = DayCountCache::new();
        let schedule =
            days_attended_schedule(&calendar(), &[entrant], SchoolYear::new(2024), &mut cache)
                .unwrap();
        let row = &schedule.rows[0];
        assert_eq!(&row.monthly_days[..4], &[0, 0, 0, 12]);
        assert_eq!(row.total_days, 171);
    }

    #[test]
    fn test_sped_and_non_sped_days_are_combined() {
        let mut transition = student("3");
        transition.current_iep_date = Some(date(2024, 1, 15));
        let mut cache = DayCountCache::new();
        let schedule =
            days_attended_schedule(&calendar(), &[transition], SchoolYear::new(2024), &mut cache)
                .unwrap();
        assert_eq!(schedule.rows[0].monthly_days[6], 23);
        assert_eq!(schedule.rows[0].total_days, 202);
    }

    #[test]
    fn test_students_without_attendance_are_omitted() {
        let mut left_early = student("4");
        left_early.district_entry_date = Some(date(2023, 7, 1));
        left_early.exit_date = Some(date(2023, 8, 15));
        let mut cache = DayCountCache::new();
        let schedule = days_attended_schedule(
            &calendar(),
            &[student("1"), left_early],
            SchoolYear::new(2024),
            &mut cache,
        )
        .unwrap();
        assert_eq!(schedule.rows.len(), 1);
        assert_eq!(schedule.rows[0].student_id, "1");
    }

    #[test]
    fn test_missing_entry_date_propagates() {
        let mut broken = student("5");
        broken.district_entry_date = None;
        let mut cache = DayCountCache::new();
        assert!(
            days_attended_schedule(&calendar(), &[broken], SchoolYear::new(2024), &mut cache)
                .is_err()
        );
    }
}
