//! Attendance and billing-period calculation engine for charter schools.
//!
//! This crate computes each student's average daily membership (ADM) over a
//! billing month or school year, split between special-education and non
//! special-education buckets, and aggregates it across a roster into the
//! figures a charter school invoices its students' home districts for.

#![warn(missing_docs)]

pub mod calculation;
pub mod config;
pub mod error;
pub mod lookup;
pub mod models;
pub mod run;
