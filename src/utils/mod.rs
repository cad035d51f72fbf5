//! Utility modules shared by the services.
//!
//! - [`datetime`] - Parsing of caller-supplied dates and timestamp helpers

pub mod datetime;
