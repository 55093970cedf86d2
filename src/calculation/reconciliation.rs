//! Year-end reconciliation rows.
//!
//! At year end every student is reported once per bucket they spent time
//! in, with that bucket's full-year ADM.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::attendance::compute_period_attendance;
use super::instructional_days::DayCountCache;
use crate::error::EngineResult;
use crate::models::{Calendar, Classification, EnrollmentRecord, SchoolYear};

/// One student's membership in one bucket over a school year.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReconciliationEntry {
    /// State student number.
    pub student_id: String,
    /// Given name.
    pub first_name: String,
    /// Surname.
    pub last_name: String,
    /// Grade as recorded.
    pub grade: String,
    /// AUN of the district billed.
    pub district_aun: String,
    /// The school year reconciled.
    pub school_year: SchoolYear,
    /// The bucket this row reports.
    pub classification: Classification,
    /// Full-year ADM in the bucket.
    pub membership: Decimal,
    /// Instructional days in the bucket.
    pub days: u32,
}

/// Builds reconciliation rows for `roster`.
///
/// A student yields a special-education row when their yearly sped ADM is
/// positive and a non special-education row when their yearly non-sped ADM
/// is positive, in that order.
///
/// # Errors
///
/// Propagates a validation error from a student's attendance calculation.
pub fn reconciliation_entries(
    calendar: &Calendar,
    roster: &[EnrollmentRecord],
    year: SchoolYear,
    cache: &mut DayCountCache,
) -> EngineResult<Vec<ReconciliationEntry>> {
    let mut entries = Vec::new();

    for student in roster {
        let result = compute_period_attendance(
            Some(calendar),
            student,
            calendar.first_day,
            calendar.end_date(),
            cache,
        )?;

        let buckets = [
            (
                Classification::SpecialEducation,
                result.sped_membership,
                result.sped_days,
            ),
            (
                Classification::NonSpecialEducation,
                result.non_sped_membership,
                result.non_sped_days,
            ),
        ];

        for (classification, membership, days) in buckets {
            if membership > Decimal::ZERO {
                entries.push(ReconciliationEntry {
                    student_id: student.student_id.clone(),
                    first_name: student.first_name.clone(),
                    last_name: student.last_name.clone(),
                    grade: student.grade.clone(),
                    district_aun: student.district_aun.clone(),
                    school_year: year,
                    classification,
                    membership,
                    days,
                });
            }
        }
    }

    Ok(entries)
}
