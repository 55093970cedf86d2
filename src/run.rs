//! Batch billing runs.
//!
//! A [`BillingRun`] produces the numbers behind one charter school's
//! invoices to one school district: cumulative monthly membership for a
//! monthly invoice, and per-calendar headcounts, reconciliation rows and
//! days-attended schedules at year end.
//!
//! Each student's calendar is resolved separately, since a roster mixes
//! grade bands. A student with no calendar contributes nothing. A student
//! whose record fails validation either aborts the run or is skipped,
//! depending on the run's [`ValidationPolicy`].

use std::time::Instant;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use uuid::Uuid;

use crate::calculation::{
    DayCountCache, DaysAttendedSchedule, EnrollmentMonth, ReconciliationEntry,
    billing_months_for_school_year, days_attended_schedule, enrollment_months, monthly_totals,
    reconciliation_entries, yearly_totals,
};
use crate::error::EngineResult;
use crate::lookup::{CalendarLookup, RateLookup, RosterLookup};
use crate::models::{
    BillingPeriod, Calendar, DistrictRate, EnrollmentRecord, MonthlyTotals, SchoolYear,
    YearlyTotals, month_bounds,
};

/// What a run does when a student's record fails validation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValidationPolicy {
    /// Stop the run and return the validation error.
    #[default]
    Abort,
    /// Log the error, leave the student out, and keep going.
    SkipStudent,
}

/// A student left out of a run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkippedStudent {
    /// State student number.
    pub student_id: String,
    /// The validation error, as displayed.
    pub reason: String,
}

/// The billing months a student appears in on an invoice.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StudentEnrollment {
    /// State student number.
    pub student_id: String,
    /// Given name.
    pub first_name: String,
    /// Surname.
    pub last_name: String,
    /// Grade as recorded.
    pub grade: String,
    /// Months enrolled, July first.
    pub months: Vec<EnrollmentMonth>,
}

/// Membership figures behind one monthly invoice.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonthlyInvoice {
    /// The run that produced the invoice.
    pub run_id: Uuid,
    /// The charter school.
    pub school_id: String,
    /// The district invoiced.
    pub district_aun: String,
    /// The invoice month.
    pub month: u32,
    /// Calendar year of the invoice month.
    pub year: i32,
    /// The school year the invoice belongs to.
    pub school_year: SchoolYear,
    /// The district rate effective at the end of the invoice month.
    pub rate: DistrictRate,
    /// Roster totals for every month from July through the invoice month.
    pub months: Vec<MonthlyTotals>,
    /// Months each student was enrolled.
    pub students: Vec<StudentEnrollment>,
    /// Students with no calendar for the school year.
    pub unconfigured_students: Vec<String>,
    /// Students left out for failing validation.
    pub skipped: Vec<SkippedStudent>,
}

impl MonthlyInvoice {
    /// Special-education membership summed over all billed months.
    pub fn sped_membership(&self) -> Decimal {
        self.months.iter().map(|m| m.sped_membership).sum()
    }

    /// Non special-education membership summed over all billed months.
    pub fn non_sped_membership(&self) -> Decimal {
        self.months.iter().map(|m| m.non_sped_membership).sum()
    }
}

/// Year-end figures for the students on one calendar.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CalendarReconciliation {
    /// The calendar the students were measured on.
    pub calendar_id: String,
    /// Headcounts and membership days.
    pub totals: YearlyTotals,
    /// One row per student and bucket.
    pub entries: Vec<ReconciliationEntry>,
    /// Monthly days attended.
    pub days_attended: DaysAttendedSchedule,
}

/// Membership figures behind a year-end reconciliation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct YearEndReconciliation {
    /// The run that produced the reconciliation.
    pub run_id: Uuid,
    /// The charter school.
    pub school_id: String,
    /// The district reconciled.
    pub district_aun: String,
    /// The school year reconciled.
    pub school_year: SchoolYear,
    /// The district rate effective on June 30.
    pub rate: DistrictRate,
    /// Figures per calendar, in roster order of first appearance.
    pub calendars: Vec<CalendarReconciliation>,
    /// Students with no calendar for the school year.
    pub unconfigured_students: Vec<String>,
    /// Students left out for failing validation.
    pub skipped: Vec<SkippedStudent>,
}

impl YearEndReconciliation {
    /// Totals merged across calendars.
    pub fn totals(&self) -> YearlyTotals {
        let mut totals = YearlyTotals::default();
        for calendar in &self.calendars {
            totals.merge(&calendar.totals);
        }
        totals
    }

    /// Reconciliation rows across calendars.
    pub fn entries(&self) -> impl Iterator<Item = &ReconciliationEntry> {
        self.calendars.iter().flat_map(|c| c.entries.iter())
    }
}

/// A roster after validation screening.
struct ScreenedRoster {
    students: Vec<EnrollmentRecord>,
    unconfigured: Vec<String>,
    skipped: Vec<SkippedStudent>,
}

/// A batch billing run over one data source.
///
/// The run owns the day-count cache its invoices share, and a `run_id`
/// attached to every log line and output.
///
/// # Example
///
/// ```no_run
/// use attendance_engine::config::ConfigLoader;
/// use attendance_engine::run::{BillingRun, ValidationPolicy};
///
/// let loader = ConfigLoader::load("./config/demo_charter").unwrap();
/// let mut run = BillingRun::new(&loader).with_policy(ValidationPolicy::SkipStudent);
///
/// let invoice = run.monthly_invoice("demo-charter", "101260303", 12, 2023).unwrap();
/// println!("Non special-education ADM: {}", invoice.non_sped_membership());
/// ```
#[derive(Debug)]
pub struct BillingRun<'a, S> {
    source: &'a S,
    policy: ValidationPolicy,
    cache: DayCountCache,
    run_id: Uuid,
}

impl<'a, S> BillingRun<'a, S>
where
    S: CalendarLookup + RosterLookup + RateLookup,
{
    /// Creates a run that aborts on the first invalid student.
    pub fn new(source: &'a S) -> Self {
        Self {
            source,
            policy: ValidationPolicy::default(),
            cache: DayCountCache::new(),
            run_id: Uuid::new_v4(),
        }
    }

    /// Sets the validation policy.
    pub fn with_policy(mut self, policy: ValidationPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// The run's correlation identifier.
    pub fn run_id(&self) -> Uuid {
        self.run_id
    }

    /// The run's validation policy.
    pub fn policy(&self) -> ValidationPolicy {
        self.policy
    }

    /// The run's day-count cache.
    pub fn cache(&self) -> &DayCountCache {
        &self.cache
    }

    /// Computes the cumulative membership behind a monthly invoice.
    ///
    /// # Errors
    ///
    /// Returns `InvalidMonth` for a month outside 1-12, `RateNotFound` when
    /// the district has no rate effective by the end of the month, and under
    /// [`ValidationPolicy::Abort`] the first student validation error.
    pub fn monthly_invoice(
        &mut self,
        school_id: &str,
        district_aun: &str,
        month: u32,
        year: i32,
    ) -> EngineResult<MonthlyInvoice> {
        let start_time = Instant::now();
        let school_year = SchoolYear::for_month(month, year)?;
        let year_period = BillingPeriod::school_year(school_year);
        let invoice_period = BillingPeriod::month(month, year)?;
        let (_, invoice_end) = month_bounds(month, year)?;

        let rate = self.source.find_rate(district_aun, invoice_end)?;
        let roster = self.source.find_students(school_id, district_aun);
        info!(
            run_id = %self.run_id,
            school_id,
            district_aun,
            period = %invoice_period,
            students = roster.len(),
            "Starting monthly invoice run"
        );

        let screened = self.screen_roster(school_id, roster, &year_period)?;
        let source = self.source;

        let mut months = Vec::new();
        for (m, y) in billing_months_for_school_year(month, year)? {
            let period = BillingPeriod::month(m, y)?;
            let mut totals = MonthlyTotals::empty(m, y);
            for (calendar, group) in group_by_calendar(source, school_id, &screened.students, &period)
            {
                let group_totals = monthly_totals(calendar, &group, m, y, &mut self.cache)?;
                totals.merge(&group_totals);
            }
            months.push(totals);
        }

        let mut students = Vec::new();
        for student in &screened.students {
            let Some(calendar) = source.find_calendar(school_id, &student.grade, &year_period)
            else {
                continue;
            };
            students.push(StudentEnrollment {
                student_id: student.student_id.clone(),
                first_name: student.first_name.clone(),
                last_name: student.last_name.clone(),
                grade: student.grade.clone(),
                months: enrollment_months(calendar, student, month, year)?,
            });
        }

        info!(
            run_id = %self.run_id,
            school_id,
            district_aun,
            period = %invoice_period,
            students = screened.students.len(),
            skipped = screened.skipped.len(),
            duration_us = start_time.elapsed().as_micros(),
            "Monthly invoice run completed"
        );

        Ok(MonthlyInvoice {
            run_id: self.run_id,
            school_id: school_id.to_string(),
            district_aun: district_aun.to_string(),
            month,
            year,
            school_year,
            rate,
            months,
            students,
            unconfigured_students: screened.unconfigured,
            skipped: screened.skipped,
        })
    }

    /// Computes the year-end reconciliation for a school year.
    ///
    /// # Errors
    ///
    /// Returns `RateNotFound` when the district has no rate effective by
    /// June 30, and under [`ValidationPolicy::Abort`] the first student
    /// validation error.
    pub fn year_end_reconciliation(
        &mut self,
        school_id: &str,
        district_aun: &str,
        school_year: SchoolYear,
    ) -> EngineResult<YearEndReconciliation> {
        let start_time = Instant::now();
        let period = BillingPeriod::school_year(school_year);
        let (_, year_end) = period.bounds()?;

        let rate = self.source.find_rate(district_aun, year_end)?;
        let roster = self.source.find_students(school_id, district_aun);
        info!(
            run_id = %self.run_id,
            school_id,
            district_aun,
            period = %period,
            students = roster.len(),
            "Starting year-end reconciliation run"
        );

        let screened = self.screen_roster(school_id, roster, &period)?;
        let source = self.source;

        let mut calendars = Vec::new();
        for (calendar, group) in group_by_calendar(source, school_id, &screened.students, &period) {
            let Some(calendar) = calendar else {
                continue;
            };
            calendars.push(CalendarReconciliation {
                calendar_id: calendar.id.clone(),
                totals: yearly_totals(Some(calendar), &group, school_year, &mut self.cache)?,
                entries: reconciliation_entries(calendar, &group, school_year, &mut self.cache)?,
                days_attended: days_attended_schedule(
                    calendar,
                    &group,
                    school_year,
                    &mut self.cache,
                )?,
            });
        }

        info!(
            run_id = %self.run_id,
            school_id,
            district_aun,
            period = %period,
            students = screened.students.len(),
            skipped = screened.skipped.len(),
            duration_us = start_time.elapsed().as_micros(),
            "Year-end reconciliation run completed"
        );

        Ok(YearEndReconciliation {
            run_id: self.run_id,
            school_id: school_id.to_string(),
            district_aun: district_aun.to_string(),
            school_year,
            rate,
            calendars,
            unconfigured_students: screened.unconfigured,
            skipped: screened.skipped,
        })
    }

    /// Applies the validation policy and notes students with no calendar.
    fn screen_roster(
        &self,
        school_id: &str,
        roster: Vec<EnrollmentRecord>,
        year_period: &BillingPeriod,
    ) -> EngineResult<ScreenedRoster> {
        let mut screened = ScreenedRoster {
            students: Vec::with_capacity(roster.len()),
            unconfigured: Vec::new(),
            skipped: Vec::new(),
        };

        for student in roster {
            match student.validate() {
                Ok(()) => {}
                Err(error)
                    if error.is_validation() && self.policy == ValidationPolicy::SkipStudent =>
                {
                    warn!(
                        run_id = %self.run_id,
                        student_id = %student.student_id,
                        error = %error,
                        "Skipping student with invalid enrollment"
                    );
                    screened.skipped.push(SkippedStudent {
                        student_id: student.student_id,
                        reason: error.to_string(),
                    });
                    continue;
                }
                Err(error) => {
                    warn!(
                        run_id = %self.run_id,
                        student_id = %student.student_id,
                        error = %error,
                        "Aborting run on invalid enrollment"
                    );
                    return Err(error);
                }
            }

            if self
                .source
                .find_calendar(school_id, &student.grade, year_period)
                .is_none()
            {
                warn!(
                    run_id = %self.run_id,
                    student_id = %student.student_id,
                    grade = %student.grade,
                    "No calendar configured for student; counting zero attendance"
                );
                screened.unconfigured.push(student.student_id.clone());
            }

            screened.students.push(student);
        }

        Ok(screened)
    }
}

/// Splits students by the calendar each resolves to for `period`, keeping
/// the order in which calendars first appear.
fn group_by_calendar<'s, S: CalendarLookup>(
    source: &'s S,
    school_id: &str,
    students: &[EnrollmentRecord],
    period: &BillingPeriod,
) -> Vec<(Option<&'s Calendar>, Vec<EnrollmentRecord>)> {
    let mut groups: Vec<(Option<&'s Calendar>, Vec<EnrollmentRecord>)> = Vec::new();

    for student in students {
        let calendar = source.find_calendar(school_id, &student.grade, period);
        let calendar_id = calendar.map(|c| c.id.as_str());
        match groups
            .iter_mut()
            .find(|(c, _)| c.map(|c| c.id.as_str()) == calendar_id)
        {
            Some((_, group)) => group.push(student.clone()),
            None => groups.push((calendar, vec![student.clone()])),
        }
    }

    groups
}
