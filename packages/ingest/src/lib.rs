#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Turns the raw casualty CSV into normalized [`Incident`] records.
//!
//! Loading is two steps: [`table::parse_rows`] reads the delimited bytes into
//! loosely typed rows (one [`serde_json::Value`] object per record, keyed by
//! header), and [`normalize::normalize`] converts those rows into incidents
//! with derived midpoint and separation distance. Rows without a single
//! usable coordinate pair never reach the output.

pub mod normalize;
pub mod parsing;
pub mod table;

use casualty_map_incident_models::Incident;

/// Errors that can occur while loading the casualty CSV.
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    /// The input contained no data at all.
    #[error("No data received: the casualty file is empty")]
    Empty,

    /// The CSV has no header row to key records by.
    #[error("CSV file contains no header row")]
    NoHeader,

    /// The CSV reader failed before any record could be read.
    #[error("CSV parse error: {0}")]
    Csv(#[from] csv::Error),

    /// A row handed to the normalizer is not a column -> value mapping.
    #[error("Malformed row {index}: {reason}")]
    MalformedRow {
        /// Zero-based index of the offending row.
        index: usize,
        /// Description of what was wrong with it.
        reason: String,
    },
}

/// Parses and normalizes CSV input in one call.
///
/// # Errors
///
/// Returns [`LoadError`] if the input is empty, has no header, or cannot be
/// read as CSV at all. Individual unreadable records are skipped with a
/// warning.
pub fn load_csv(input: impl AsRef<[u8]>) -> Result<Vec<Incident>, LoadError> {
    let rows = table::parse_rows(input)?;
    normalize::normalize(&rows)
}
