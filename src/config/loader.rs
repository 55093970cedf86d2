//! Configuration loading functionality.
//!
//! This module provides the [`ConfigLoader`] type for loading a charter
//! school's configuration from YAML or JSON files.

use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::error::{EngineError, EngineResult};
use crate::lookup::{CalendarLookup, RateLookup, RosterLookup};
use crate::models::{BillingPeriod, Calendar, DistrictRate, EnrollmentRecord};

use super::types::{RatesConfig, RosterConfig, SchoolConfig, SchoolMetadata};

/// Extensions accepted for configuration documents.
const DOCUMENT_EXTENSIONS: [&str; 3] = ["yaml", "yml", "json"];

/// Loads and provides access to a charter school's configuration.
///
/// The `ConfigLoader` reads configuration files from a directory and
/// answers calendar, roster and rate lookups from them.
///
/// # Directory Structure
///
/// The configuration directory should have the following structure:
/// ```text
/// config/demo_charter/
/// ├── school.yaml          # School metadata
/// ├── rates.yaml           # Districts and their rates
/// ├── students.yaml        # Enrollment roster (students.json also accepted)
/// └── calendars/
///     ├── elementary-2024.yaml
///     └── secondary-2024.yaml
/// ```
///
/// # Example
///
/// ```no_run
/// use attendance_engine::config::ConfigLoader;
/// use attendance_engine::lookup::RateLookup;
/// use chrono::NaiveDate;
///
/// let loader = ConfigLoader::load("./config/demo_charter").unwrap();
///
/// let date = NaiveDate::from_ymd_opt(2024, 1, 31).unwrap();
/// let rate = loader.find_rate("101260303", date).unwrap();
/// println!("Non special-education rate: ${}", rate.non_sped_rate);
/// ```
#[derive(Debug, Clone)]
pub struct ConfigLoader {
    config: SchoolConfig,
}

impl ConfigLoader {
    /// Loads configuration from the specified directory.
    ///
    /// # Arguments
    ///
    /// * `path` - Path to the configuration directory (e.g., "./config/demo_charter")
    ///
    /// # Returns
    ///
    /// Returns a `ConfigLoader` instance on success, or an error if:
    /// - Any required file is missing (`ConfigNotFound`)
    /// - Any file contains invalid YAML or JSON (`ConfigParseError`)
    /// - A calendar is inconsistent or belongs to another school (`InvalidCalendar`)
    pub fn load<P: AsRef<Path>>(path: P) -> EngineResult<Self> {
        let path = path.as_ref();

        let metadata = Self::load_document::<SchoolMetadata>(&path.join("school.yaml"))?;
        let calendars = Self::load_calendars(&path.join("calendars"), &metadata.id)?;
        let rates = Self::load_document::<RatesConfig>(&path.join("rates.yaml"))?;
        let roster_path = Self::find_document(path, "students")?;
        let roster = Self::load_document::<RosterConfig>(&roster_path)?;

        debug!(
            school_id = %metadata.id,
            calendars = calendars.len(),
            rates = rates.rates.len(),
            students = roster.students.len(),
            "Loaded school configuration"
        );

        Ok(Self::from_config(SchoolConfig::new(
            metadata, calendars, rates, roster,
        )))
    }

    /// Wraps an already assembled configuration.
    pub fn from_config(config: SchoolConfig) -> Self {
        Self { config }
    }

    /// Loads and parses a YAML or JSON document, chosen by extension.
    fn load_document<T: DeserializeOwned>(path: &Path) -> EngineResult<T> {
        let path_str = path.display().to_string();

        let content = fs::read_to_string(path).map_err(|_| EngineError::ConfigNotFound {
            path: path_str.clone(),
        })?;

        let parse_error = |message: String| EngineError::ConfigParseError {
            path: path_str.clone(),
            message,
        };

        if path.extension().is_some_and(|ext| ext == "json") {
            serde_json::from_str(&content).map_err(|e| parse_error(e.to_string()))
        } else {
            serde_yaml::from_str(&content).map_err(|e| parse_error(e.to_string()))
        }
    }

    /// Finds `<dir>/<stem>.<ext>` for the first accepted extension present.
    fn find_document(dir: &Path, stem: &str) -> EngineResult<PathBuf> {
        DOCUMENT_EXTENSIONS
            .iter()
            .map(|ext| dir.join(format!("{}.{}", stem, ext)))
            .find(|candidate| candidate.exists())
            .ok_or_else(|| EngineError::ConfigNotFound {
                path: dir.join(format!("{}.yaml", stem)).display().to_string(),
            })
    }

    /// Loads all calendar files from the calendars directory.
    fn load_calendars(calendars_dir: &Path, school_id: &str) -> EngineResult<Vec<Calendar>> {
        let calendars_dir_str = calendars_dir.display().to_string();

        if !calendars_dir.exists() {
            return Err(EngineError::ConfigNotFound {
                path: calendars_dir_str,
            });
        }

        let entries = fs::read_dir(calendars_dir).map_err(|_| EngineError::ConfigNotFound {
            path: calendars_dir_str.clone(),
        })?;

        let mut paths = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|_| EngineError::ConfigNotFound {
                path: calendars_dir_str.clone(),
            })?;

            let path = entry.path();
            let is_document = path
                .extension()
                .and_then(|ext| ext.to_str())
                .is_some_and(|ext| DOCUMENT_EXTENSIONS.contains(&ext));
            if is_document {
                paths.push(path);
            }
        }
        paths.sort();

        let mut calendars = Vec::with_capacity(paths.len());
        let mut seen_ids = HashSet::new();
        for path in paths {
            let calendar = Self::load_document::<Calendar>(&path)?;
            calendar.validate()?;

            if calendar.school_id != school_id {
                return Err(EngineError::InvalidCalendar {
                    calendar_id: calendar.id,
                    message: format!(
                        "belongs to school '{}', not '{}'",
                        calendar.school_id, school_id
                    ),
                });
            }
            if !seen_ids.insert(calendar.id.clone()) {
                return Err(EngineError::InvalidCalendar {
                    calendar_id: calendar.id,
                    message: "duplicate calendar id".to_string(),
                });
            }

            calendars.push(calendar);
        }

        if calendars.is_empty() {
            return Err(EngineError::ConfigNotFound {
                path: format!("{} (no calendar files found)", calendars_dir_str),
            });
        }

        Ok(calendars)
    }

    /// Returns the underlying school configuration.
    pub fn config(&self) -> &SchoolConfig {
        &self.config
    }

    /// Returns the school metadata.
    pub fn school(&self) -> &SchoolMetadata {
        self.config.school()
    }

    /// Gets a calendar by its identifier.
    pub fn get_calendar(&self, calendar_id: &str) -> Option<&Calendar> {
        self.config.calendars().iter().find(|c| c.id == calendar_id)
    }

    /// Gets a district's name by its AUN.
    pub fn get_district_name(&self, district_aun: &str) -> Option<&str> {
        self.config
            .districts()
            .iter()
            .find(|d| d.aun == district_aun)
            .map(|d| d.name.as_str())
    }
}

impl CalendarLookup for ConfigLoader {
    fn find_calendar(
        &self,
        school_id: &str,
        grade: &str,
        period: &BillingPeriod,
    ) -> Option<&Calendar> {
        Calendar::resolve(self.config.calendars(), school_id, grade, period).ok()
    }

    fn find_exception_dates(&self, calendar_id: &str) -> HashSet<NaiveDate> {
        self.get_calendar(calendar_id)
            .map(Calendar::exception_set)
            .unwrap_or_default()
    }
}

impl RosterLookup for ConfigLoader {
    fn find_students(&self, school_id: &str, district_aun: &str) -> Vec<EnrollmentRecord> {
        if school_id != self.config.school().id {
            return Vec::new();
        }
        self.config
            .students()
            .iter()
            .filter(|s| s.district_aun == district_aun)
            .cloned()
            .collect()
    }
}

impl RateLookup for ConfigLoader {
    fn find_rate(&self, district_aun: &str, as_of: NaiveDate) -> EngineResult<DistrictRate> {
        self.config
            .rates()
            .rate_as_of(district_aun, as_of)
            .cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Grade, SchoolYear};
    use rust_decimal::Decimal;
    use std::str::FromStr;

    fn config_path() -> &'static str {
        "./config/demo_charter"
    }

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_load_valid_configuration() {
        let result = ConfigLoader::load(config_path());
        assert!(result.is_ok(), "Failed to load config: {:?}", result.err());

        let loader = result.unwrap();
        assert_eq!(loader.school().id, "demo-charter");
        assert_eq!(loader.school().name, "Demo Charter School");
        assert_eq!(loader.config().calendars().len(), 2);
        assert_eq!(loader.config().students().len(), 7);
    }

    #[test]
    fn test_calendars_sorted_by_first_day() {
        let loader = ConfigLoader::load(config_path()).unwrap();
        let ids: Vec<&str> = loader.config().calendars().iter().map(|c| c.id.as_str()).collect();
        assert_eq!(ids, vec!["secondary-2024", "elementary-2024"]);
    }

    #[test]
    fn test_calendar_grades_parse_from_text_and_numbers() {
        let loader = ConfigLoader::load(config_path()).unwrap();
        let elementary = loader.get_calendar("elementary-2024").unwrap();
        assert_eq!(elementary.start_grade, Grade::Kindergarten);
        assert_eq!(elementary.end_grade, Grade::Numeric(5));
        assert_eq!(elementary.exception_dates.len(), 10);
    }

    #[test]
    fn test_find_calendar_by_grade() {
        let loader = ConfigLoader::load(config_path()).unwrap();
        let period = BillingPeriod::month(10, 2023).unwrap();

        let k = loader.find_calendar("demo-charter", "K", &period).unwrap();
        assert_eq!(k.id, "elementary-2024");

        let nine = loader.find_calendar("demo-charter", "9", &period).unwrap();
        assert_eq!(nine.id, "secondary-2024");

        // Grade 6 falls between the two bands.
        assert!(loader.find_calendar("demo-charter", "6", &period).is_none());
        assert!(loader.find_calendar("demo-charter", "PK", &period).is_none());
        assert!(loader.find_calendar("other-school", "K", &period).is_none());
    }

    #[test]
    fn test_find_calendar_requires_overlap() {
        let loader = ConfigLoader::load(config_path()).unwrap();
        let august = BillingPeriod::month(8, 2023).unwrap();
        assert!(loader.find_calendar("demo-charter", "3", &august).is_none());
        assert!(loader.find_calendar("demo-charter", "9", &august).is_some());

        let year = BillingPeriod::school_year(SchoolYear::new(2024));
        assert!(loader.find_calendar("demo-charter", "3", &year).is_some());
    }

    #[test]
    fn test_find_exception_dates() {
        let loader = ConfigLoader::load(config_path()).unwrap();
        let dates = loader.find_exception_dates("secondary-2024");
        assert_eq!(dates.len(), 8);
        assert!(dates.contains(&date(2024, 2, 5)));
        assert!(loader.find_exception_dates("unknown").is_empty());
    }

    #[test]
    fn test_find_students_sorted_by_grade_then_name() {
        let loader = ConfigLoader::load(config_path()).unwrap();
        let students = loader.find_students("demo-charter", "101260303");
        let ids: Vec<&str> = students.iter().map(|s| s.student_id.as_str()).collect();
        assert_eq!(ids, vec!["1002", "1001", "1005", "1003", "1004"]);
    }

    #[test]
    fn test_find_students_unknown_school_is_empty() {
        let loader = ConfigLoader::load(config_path()).unwrap();
        assert!(loader.find_students("other-school", "101260303").is_empty());
    }

    #[test]
    fn test_find_rate_uses_most_recent_effective_rate() {
        let loader = ConfigLoader::load(config_path()).unwrap();

        let fall = loader.find_rate("101260303", date(2023, 12, 31)).unwrap();
        assert_eq!(fall.non_sped_rate, dec("12512.40"));

        let spring = loader.find_rate("101260303", date(2024, 1, 31)).unwrap();
        assert_eq!(spring.sped_rate, dec("29410.55"));
    }

    #[test]
    fn test_rate_not_found_for_date_before_effective() {
        let loader = ConfigLoader::load(config_path()).unwrap();

        let date = date(2020, 1, 1);
        match loader.find_rate("101260303", date) {
            Err(EngineError::RateNotFound {
                district_aun,
                date: d,
            }) => {
                assert_eq!(district_aun, "101260303");
                assert_eq!(d, date);
            }
            other => panic!("Expected RateNotFound error, got {:?}", other),
        }
    }

    #[test]
    fn test_district_names_loaded() {
        let loader = ConfigLoader::load(config_path()).unwrap();
        assert_eq!(
            loader.get_district_name("126515001"),
            Some("Philadelphia City School District")
        );
        assert_eq!(loader.get_district_name("000000000"), None);
    }

    #[test]
    fn test_load_missing_directory_returns_error() {
        let result = ConfigLoader::load("/nonexistent/path");

        match result {
            Err(EngineError::ConfigNotFound { path }) => {
                assert!(path.contains("school.yaml"));
            }
            other => panic!("Expected ConfigNotFound error, got {:?}", other),
        }
    }
}
