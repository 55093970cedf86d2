//! Configuration types for a charter school.
//!
//! This module contains the strongly-typed configuration structures that
//! are deserialized from YAML or JSON configuration files.

use serde::Deserialize;

use crate::models::{Calendar, DistrictRate, EnrollmentRecord, RateSchedule, sort_roster};

/// Metadata about the charter school.
#[derive(Debug, Clone, Deserialize)]
pub struct SchoolMetadata {
    /// The school identifier calendars refer to.
    pub id: String,
    /// The human-readable name of the school.
    pub name: String,
    /// The charter school's own AUN, if assigned.
    #[serde(default)]
    pub aun: Option<String>,
}

/// A school district billed by the charter school.
#[derive(Debug, Clone, Deserialize)]
pub struct District {
    /// The district AUN.
    pub aun: String,
    /// The district name.
    pub name: String,
}

/// Rates configuration file structure.
#[derive(Debug, Clone, Deserialize)]
pub struct RatesConfig {
    /// Districts known to the school.
    #[serde(default)]
    pub districts: Vec<District>,
    /// District rates, in any order.
    pub rates: Vec<DistrictRate>,
}

/// Roster configuration file structure.
#[derive(Debug, Clone, Deserialize)]
pub struct RosterConfig {
    /// Enrollment records, in any order.
    pub students: Vec<EnrollmentRecord>,
}

/// The complete school configuration loaded from a directory.
///
/// Calendars are kept in first-day order, then by lowest grade, and the
/// roster in report order (grade, surname, given name).
#[derive(Debug, Clone)]
pub struct SchoolConfig {
    metadata: SchoolMetadata,
    calendars: Vec<Calendar>,
    districts: Vec<District>,
    rates: RateSchedule,
    students: Vec<EnrollmentRecord>,
}

impl SchoolConfig {
    /// Creates a new SchoolConfig from its component parts.
    pub fn new(
        metadata: SchoolMetadata,
        calendars: Vec<Calendar>,
        rates: RatesConfig,
        roster: RosterConfig,
    ) -> Self {
        let mut sorted_calendars = calendars;
        sorted_calendars.sort_by(|a, b| {
            a.first_day
                .cmp(&b.first_day)
                .then_with(|| a.start_grade.cmp(&b.start_grade))
        });

        let mut students = roster.students;
        sort_roster(&mut students);

        Self {
            metadata,
            calendars: sorted_calendars,
            districts: rates.districts,
            rates: RateSchedule::new(rates.rates),
            students,
        }
    }

    /// Returns the school metadata.
    pub fn school(&self) -> &SchoolMetadata {
        &self.metadata
    }

    /// Returns all calendars.
    pub fn calendars(&self) -> &[Calendar] {
        &self.calendars
    }

    /// Returns the known districts.
    pub fn districts(&self) -> &[District] {
        &self.districts
    }

    /// Returns the rate schedule.
    pub fn rates(&self) -> &RateSchedule {
        &self.rates
    }

    /// Returns the sorted roster.
    pub fn students(&self) -> &[EnrollmentRecord] {
        &self.students
    }
}
