//! Property tests for day counting and membership splitting.

use chrono::{Datelike, Days, NaiveDate};
use proptest::prelude::*;
use rust_decimal::Decimal;

use attendance_engine::calculation::{
    DayCountCache, Memoize, compute_period_attendance, count_instructional_days,
};
use attendance_engine::models::{
    Calendar, EnrollmentRecord, ExceptionDate, ExceptionKind, Grade, GradeBand, month_bounds,
};

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

/// A calendar wide enough that clamping never applies.
fn open_calendar() -> Calendar {
    Calendar {
        id: "wide".to_string(),
        school_id: "acs".to_string(),
        start_grade: Grade::Kindergarten,
        end_grade: Grade::Numeric(12),
        first_day: date(2019, 1, 1),
        last_day: Some(date(2031, 12, 31)),
        exception_dates: vec![],
    }
}

/// 2023-09-01..2024-06-10 with a handful of holidays.
fn school_calendar() -> Calendar {
    Calendar {
        id: "acs-2024".to_string(),
        school_id: "acs".to_string(),
        start_grade: Grade::Kindergarten,
        end_grade: Grade::Numeric(12),
        first_day: date(2023, 9, 1),
        last_day: Some(date(2024, 6, 10)),
        exception_dates: [
            date(2023, 11, 23),
            date(2023, 11, 24),
            date(2023, 12, 25),
            date(2024, 1, 1),
            date(2024, 5, 27),
        ]
        .into_iter()
        .map(|date| ExceptionDate {
            date,
            kind: ExceptionKind::Holiday,
        })
        .collect(),
    }
}

fn any_date() -> impl Strategy<Value = NaiveDate> {
    (2020i32..=2030, 1u32..=12, 1u32..=28).prop_map(|(y, m, d)| date(y, m, d))
}

/// Any date of the 2023/2024 school year.
fn school_year_date() -> impl Strategy<Value = NaiveDate> {
    (0u64..366).prop_map(|offset| date(2023, 7, 1) + Days::new(offset))
}

fn month() -> impl Strategy<Value = (u32, i32)> {
    prop_oneof![(7u32..=12).prop_map(|m| (m, 2023)), (1u32..=6).prop_map(|m| (m, 2024))]
}

fn enrollment(
    entry: NaiveDate,
    exit: Option<NaiveDate>,
    current_iep: Option<NaiveDate>,
) -> EnrollmentRecord {
    EnrollmentRecord {
        student_id: "1".to_string(),
        first_name: "Test".to_string(),
        last_name: "Student".to_string(),
        district_aun: "100".to_string(),
        grade: "5".to_string(),
        district_entry_date: Some(entry),
        exit_date: exit,
        current_iep_date: current_iep,
        prior_iep_date: None,
    }
}

mod props {
    use super::*;

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(100))]

        #[test]
        fn prop_any_week_has_five_instructional_days(start in any_date()) {
            let end = start + Days::new(6);
            prop_assert_eq!(count_instructional_days(&open_calendar(), start, end), 5);
        }

        #[test]
        fn prop_count_never_exceeds_calendar_days(
            a in school_year_date(),
            b in school_year_date(),
        ) {
            let (from, to) = if a <= b { (a, b) } else { (b, a) };
            let span = (to - from).num_days() as u32 + 1;
            prop_assert!(count_instructional_days(&school_calendar(), from, to) <= span);
        }

        #[test]
        fn prop_cached_count_matches_scan((m, y) in month()) {
            let calendar = school_calendar();
            let (start, end) = month_bounds(m, y).unwrap();
            let scanned = count_instructional_days(&calendar, start, end);

            let mut cache = DayCountCache::new();
            let first = cache.count(&calendar, start, end, Memoize::FullMonth);
            let second = cache.count(&calendar, start, end, Memoize::FullMonth);
            let unmemoized = cache.count(&calendar, start, end, Memoize::None);

            prop_assert_eq!(first, scanned);
            prop_assert_eq!(second, scanned);
            prop_assert_eq!(unmemoized, scanned);
            prop_assert_eq!(cache.hits(), 1);
        }

        #[test]
        fn prop_attended_days_within_session(
            entry in school_year_date(),
            exit in proptest::option::of(school_year_date()),
            iep in proptest::option::of(school_year_date()),
            (m, y) in month(),
        ) {
            let calendar = school_calendar();
            let student = enrollment(entry, exit, iep);
            let (start, end) = month_bounds(m, y).unwrap();
            let mut cache = DayCountCache::new();

            let result =
                compute_period_attendance(Some(&calendar), &student, start, end, &mut cache)
                    .unwrap();

            prop_assert!(result.sped_days + result.non_sped_days <= result.days_in_session);
            for membership in [result.sped_membership, result.non_sped_membership] {
                prop_assert!(membership >= Decimal::ZERO);
                prop_assert!(membership <= Decimal::ONE);
            }
        }

        #[test]
        fn prop_full_year_enrollment_sums_to_one(iep in proptest::option::of(school_year_date())) {
            let calendar = school_calendar();
            let student = enrollment(date(2020, 9, 1), None, iep);
            let mut cache = DayCountCache::new();

            let result = compute_period_attendance(
                Some(&calendar),
                &student,
                calendar.first_day,
                calendar.end_date(),
                &mut cache,
            )
            .unwrap();

            prop_assert_eq!(result.total_membership(), Decimal::ONE);
            prop_assert_eq!(result.total_days(), result.days_in_session);
        }

        #[test]
        fn prop_weekend_days_never_count(day in school_year_date()) {
            let calendar = school_calendar();
            let weekend = matches!(day.weekday(), chrono::Weekday::Sat | chrono::Weekday::Sun);
            if weekend {
                prop_assert_eq!(count_instructional_days(&calendar, day, day), 0);
            }
        }

        #[test]
        fn prop_band_bounds_are_inclusive(low in 1u8..=12, high in 1u8..=12, grade in 1u8..=12) {
            let (low, high) = if low <= high { (low, high) } else { (high, low) };
            let band = GradeBand::new(Grade::Numeric(low), Grade::Numeric(high));

            prop_assert!(band.contains(Grade::Numeric(low)));
            prop_assert!(band.contains(Grade::Numeric(high)));
            prop_assert_eq!(band.contains(Grade::Numeric(grade)), low <= grade && grade <= high);
            prop_assert!(!band.contains(Grade::Kindergarten));
            prop_assert!(GradeBand::all().contains(Grade::Numeric(grade)));
        }
    }
}
