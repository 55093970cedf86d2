//! Configuration loading and management for the attendance engine.
//!
//! This module provides functionality to load a charter school's
//! configuration from YAML or JSON files: school metadata, calendars,
//! district rates and the enrollment roster.
//!
//! # Example
//!
//! ```no_run
//! use attendance_engine::config::ConfigLoader;
//!
//! let config = ConfigLoader::load("./config/demo_charter").unwrap();
//! println!("Loaded school: {}", config.school().name);
//! ```

mod loader;
mod types;

pub use loader::ConfigLoader;
pub use types::{District, RatesConfig, RosterConfig, SchoolConfig, SchoolMetadata};
