//! District billing rates.
//!
//! Each school district publishes a per-student tuition rate for non
//! special-education and special-education students. Rates change over time,
//! so every rate carries the date it becomes effective.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::{EngineError, EngineResult};

/// A district's tuition rates effective from a given date.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DistrictRate {
    /// AUN of the school district.
    pub district_aun: String,
    /// The first date these rates apply.
    pub effective_date: NaiveDate,
    /// Rate for non special-education students.
    pub non_sped_rate: Decimal,
    /// Rate for special-education students.
    pub sped_rate: Decimal,
}

/// All known district rates, sorted oldest first.
///
/// # Example
///
/// ```
/// use attendance_engine::models::{DistrictRate, RateSchedule};
/// use chrono::NaiveDate;
/// use rust_decimal::Decimal;
///
/// let schedule = RateSchedule::new(vec![DistrictRate {
///     district_aun: "101260303".to_string(),
///     effective_date: NaiveDate::from_ymd_opt(2023, 7, 1).unwrap(),
///     non_sped_rate: Decimal::new(1250000, 2),
///     sped_rate: Decimal::new(2875000, 2),
/// }]);
///
/// let date = NaiveDate::from_ymd_opt(2024, 1, 31).unwrap();
/// let rate = schedule.rate_as_of("101260303", date).unwrap();
/// assert_eq!(rate.sped_rate, Decimal::new(2875000, 2));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RateSchedule {
    rates: Vec<DistrictRate>,
}

impl RateSchedule {
    /// Creates a schedule, sorting rates by effective date.
    pub fn new(rates: Vec<DistrictRate>) -> Self {
        let mut sorted_rates = rates;
        sorted_rates.sort_by(|a, b| a.effective_date.cmp(&b.effective_date));
        Self {
            rates: sorted_rates,
        }
    }

    /// Returns all rates, oldest first.
    pub fn rates(&self) -> &[DistrictRate] {
        &self.rates
    }

    /// Finds the most recent rate effective on or before `date`.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::RateNotFound`] if the district has no rate
    /// effective by `date`.
    pub fn rate_as_of(&self, district_aun: &str, date: NaiveDate) -> EngineResult<&DistrictRate> {
        self.rates
            .iter()
            .rfind(|r| r.district_aun == district_aun && r.effective_date <= date)
            .ok_or_else(|| EngineError::RateNotFound {
                district_aun: district_aun.to_string(),
                date,
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn rate(aun: &str, effective: NaiveDate, non_sped: &str, sped: &str) -> DistrictRate {
        DistrictRate {
            district_aun: aun.to_string(),
            effective_date: effective,
            non_sped_rate: dec(non_sped),
            sped_rate: dec(sped),
        }
    }

    fn schedule() -> RateSchedule {
        RateSchedule::new(vec![
            rate("200", date(2023, 7, 1), "11000.00", "24000.00"),
            rate("100", date(2024, 1, 1), "12800.00", "29100.00"),
            rate("100", date(2023, 7, 1), "12500.00", "28750.00"),
        ])
    }

    #[test]
    fn test_rates_sorted_oldest_first() {
        let s = schedule();
        assert!(s.rates().windows(2).all(|w| w[0].effective_date <= w[1].effective_date));
    }

    #[test]
    fn test_rate_as_of_picks_most_recent_effective() {
        let s = schedule();
        let r = s.rate_as_of("100", date(2023, 12, 31)).unwrap();
        assert_eq!(r.non_sped_rate, dec("12500.00"));

        let r = s.rate_as_of("100", date(2024, 1, 1)).unwrap();
        assert_eq!(r.non_sped_rate, dec("12800.00"));
    }

    #[test]
    fn test_rate_as_of_filters_by_district() {
        let s = schedule();
        let r = s.rate_as_of("200", date(2024, 3, 1)).unwrap();
        assert_eq!(r.sped_rate, dec("24000.00"));
    }

    #[test]
    fn test_rate_not_found_before_first_effective_date() {
        match schedule().rate_as_of("100", date(2023, 6, 30)) {
            Err(EngineError::RateNotFound { district_aun, date: d }) => {
                assert_eq!(district_aun, "100");
                assert_eq!(d, date(2023, 6, 30));
            }
            other => panic!("expected RateNotFound, got {:?}", other),
        }
    }

    #[test]
    fn test_rate_not_found_for_unknown_district() {
        assert!(schedule().rate_as_of("999", date(2024, 3, 1)).is_err());
    }

    #[test]
    fn test_deserialize_rate_from_yaml() {
        let yaml = r#"
district_aun: "100"
effective_date: 2023-07-01
non_sped_rate: 12500.00
sped_rate: "28750.00"
"#;
        let r: DistrictRate = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(r.non_sped_rate, dec("12500"));
        assert_eq!(r.sped_rate, dec("28750.00"));
    }
}
