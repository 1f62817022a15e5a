#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Maritime casualty incident types shared across the casualty map.
//!
//! An [`Incident`] is produced once by the ingest normalizer and is
//! read-only afterwards. Everything else in the workspace (indexes, filtered
//! views, search results, render payloads) is derived from a slice of
//! incidents plus a [`FilterSpec`] or a query string.

use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};

/// Fallback marker colour for casualty types missing from the palette.
pub const DEFAULT_CASUALTY_COLOR: &str = "#94a3b8";

/// Marker colour per known casualty type.
pub const CASUALTY_TYPE_COLORS: &[(&str, &str)] = &[
    ("Other", "#94a3b8"),
    ("Mechanical Fault", "#f59e0b"),
    ("Engine Fault", "#ef4444"),
    ("Collision", "#dc2626"),
    ("Beached/Grounded", "#d97706"),
    ("Fire", "#ea580c"),
    ("Medical Emergency", "#06b6d4"),
    ("Sank", "#7c3aed"),
    ("Detained/Arrested", "#4b5563"),
    ("War Damage", "#991b1b"),
    ("Piracy", "#be123c"),
    ("Cargo Loss", "#0891b2"),
    ("Capsize", "#6366f1"),
    ("Electrical Fault", "#eab308"),
    ("Man Overboard", "#0ea5e9"),
];

/// Returns the marker colour for a casualty type, falling back to
/// [`DEFAULT_CASUALTY_COLOR`].
#[must_use]
pub fn casualty_type_color(casualty_type: &str) -> &'static str {
    CASUALTY_TYPE_COLORS
        .iter()
        .find(|(name, _)| *name == casualty_type)
        .map_or(DEFAULT_CASUALTY_COLOR, |&(_, color)| color)
}

/// A WGS84 position.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Position {
    /// Latitude in degrees.
    pub latitude: f64,
    /// Longitude in degrees.
    pub longitude: f64,
}

impl Position {
    /// Creates a new position.
    #[must_use]
    pub const fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }
}

/// One recorded maritime casualty.
///
/// Serialized field names match the source CSV columns, so a serialized
/// incident can be fed back through the normalizer unchanged.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Incident {
    /// Position of this incident in the normalized collection.
    pub id: usize,

    /// Vessel name.
    pub vessel_name: Option<String>,
    /// IMO number in string form.
    pub imo: Option<String>,
    /// Maritime Mobile Service Identity in string form.
    pub mmsi: Option<String>,
    /// Radio call sign.
    pub call_sign: Option<String>,
    /// Flag state.
    pub flag: Option<String>,
    /// Ship type (tanker, bulk carrier, ...).
    pub ship_type: Option<String>,
    /// Build year in string form.
    pub build_year: Option<String>,

    /// Casualty category. Never absent; a missing source value becomes `""`.
    pub casualty_type: String,
    /// Free-text narrative.
    pub details: Option<String>,
    /// Casualty date exactly as it appeared in the source.
    pub casualty_date: String,
    /// Parsed casualty date, `None` when the source value is unparseable.
    #[serde(skip)]
    pub occurred_at: Option<DateTime<Utc>>,

    /// Observation time of the first position report.
    pub timestamp: Option<String>,
    /// First reported latitude.
    pub latitude: Option<f64>,
    /// First reported longitude.
    pub longitude: Option<f64>,
    /// Observation time of the second position report.
    pub timestamp_2: Option<String>,
    /// Second reported latitude.
    pub latitude_2: Option<f64>,
    /// Second reported longitude.
    pub longitude_2: Option<f64>,

    /// Midpoint latitude of the available position(s).
    pub midpoint_lat: f64,
    /// Midpoint longitude of the available position(s).
    pub midpoint_lon: f64,
    /// Great-circle separation between the two positions, `0` if only one.
    pub distance_km: f64,
}

impl Incident {
    /// Returns the first position if both of its coordinates are present.
    #[must_use]
    pub fn first_position(&self) -> Option<Position> {
        Some(Position::new(self.latitude?, self.longitude?))
    }

    /// Returns the second position if both of its coordinates are present.
    #[must_use]
    pub fn second_position(&self) -> Option<Position> {
        Some(Position::new(self.latitude_2?, self.longitude_2?))
    }

    /// Returns the derived midpoint.
    #[must_use]
    pub const fn midpoint(&self) -> Position {
        Position::new(self.midpoint_lat, self.midpoint_lon)
    }

    /// Returns the grouping key for the vessel involved in this incident.
    #[must_use]
    pub fn vessel_key(&self) -> VesselKey {
        VesselKey::new(self.imo.as_deref(), self.vessel_name.as_deref())
    }

    /// Returns the vessel name, or `"Unknown Vessel"` when absent.
    #[must_use]
    pub fn display_name(&self) -> &str {
        self.vessel_name
            .as_deref()
            .filter(|name| !name.is_empty())
            .unwrap_or("Unknown Vessel")
    }

    /// Returns the marker colour for this incident's casualty type.
    #[must_use]
    pub fn color(&self) -> &'static str {
        casualty_type_color(&self.casualty_type)
    }
}

/// Grouping key for "the same vessel" across casualty records: the pair
/// `(IMO, vessel name)`, with absent values as empty strings.
///
/// Two records with the same IMO and name but different MMSI share a key,
/// and every record without an IMO shares the empty-IMO bucket for its name.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct VesselKey {
    /// IMO number, `""` when absent.
    pub imo: String,
    /// Vessel name, `""` when absent.
    pub name: String,
}

impl VesselKey {
    /// Builds a key from optional identity fields.
    #[must_use]
    pub fn new(imo: Option<&str>, name: Option<&str>) -> Self {
        Self {
            imo: imo.unwrap_or_default().to_owned(),
            name: name.unwrap_or_default().to_owned(),
        }
    }
}

impl std::fmt::Display for VesselKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}-{}", self.imo, self.name)
    }
}

/// Inclusive date interval.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DateRange {
    /// First instant included.
    pub start: DateTime<Utc>,
    /// Last instant included.
    pub end: DateTime<Utc>,
}

impl DateRange {
    /// Creates a new range.
    #[must_use]
    pub const fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        Self { start, end }
    }

    /// A zero-length range at the current instant, used when a collection
    /// has no parseable dates.
    #[must_use]
    pub fn now() -> Self {
        let now = Utc::now();
        Self::new(now, now)
    }

    /// Whether `at` lies within `[start, end]`.
    #[must_use]
    pub fn contains(&self, at: DateTime<Utc>) -> bool {
        self.start <= at && at <= self.end
    }
}

/// Which point layer the user chose to display.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum ViewMode {
    /// Density heatmap.
    Heatmap,
    /// Individual circle markers.
    Markers,
}

/// User-chosen filter parameters applied to the full collection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FilterSpec {
    /// Inclusive casualty date interval.
    pub date_range: DateRange,
    /// Accepted casualty types. Empty accepts nothing.
    pub casualty_types: BTreeSet<String>,
    /// Accepted flags. Empty accepts everything.
    pub flags: BTreeSet<String>,
    /// Accepted ship types. Empty accepts everything.
    pub ship_types: BTreeSet<String>,
    /// Heatmap layer enabled.
    pub show_heatmap: bool,
    /// Marker layer enabled.
    pub show_markers: bool,
}

impl FilterSpec {
    /// Builds the initial spec for a freshly loaded collection: every value
    /// selected, the full date span, heatmap view.
    #[must_use]
    pub fn accept_all(
        date_range: DateRange,
        casualty_types: &[String],
        flags: &[String],
        ship_types: &[String],
    ) -> Self {
        Self {
            date_range,
            casualty_types: casualty_types.iter().cloned().collect(),
            flags: flags.iter().cloned().collect(),
            ship_types: ship_types.iter().cloned().collect(),
            show_heatmap: true,
            show_markers: false,
        }
    }
}
