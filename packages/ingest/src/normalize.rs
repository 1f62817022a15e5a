//! Row normalization and per-record geometry.
//!
//! A row is kept only if at least one of its two coordinate pairs is fully
//! present. With both pairs the midpoint is the component-wise mean and the
//! distance is the haversine separation; with one pair the midpoint is that
//! pair and the distance is zero.

use casualty_map_incident_models::{Incident, Position};

use crate::LoadError;
use crate::parsing::{get_f64, get_text, parse_casualty_date};

/// Mean Earth radius used for the separation distance.
pub const EARTH_RADIUS_KM: f64 = 6371.0;

/// Great-circle distance in kilometres between two positions.
///
/// `a = sin²(Δlat/2) + cos(lat1)·cos(lat2)·sin²(Δlon/2)`,
/// `c = 2·atan2(√a, √(1−a))`, `d = R·c`.
#[must_use]
pub fn haversine_km(from: Position, to: Position) -> f64 {
    let d_lat = (to.latitude - from.latitude).to_radians();
    let d_lon = (to.longitude - from.longitude).to_radians();
    let a = (d_lat / 2.0).sin().powi(2)
        + from.latitude.to_radians().cos()
            * to.latitude.to_radians().cos()
            * (d_lon / 2.0).sin().powi(2);
    let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());
    EARTH_RADIUS_KM * c
}

/// Derives `(midpoint, distance_km)` from the two optional positions, or
/// `None` when neither is usable.
#[must_use]
pub fn resolve_geometry(first: Option<Position>, second: Option<Position>) -> Option<(Position, f64)> {
    match (first, second) {
        (Some(a), Some(b)) => {
            let midpoint = Position::new(
                (a.latitude + b.latitude) / 2.0,
                (a.longitude + b.longitude) / 2.0,
            );
            Some((midpoint, haversine_km(a, b)))
        }
        (Some(only), None) | (None, Some(only)) => Some((only, 0.0)),
        (None, None) => None,
    }
}

/// Normalizes loosely typed rows into incidents, preserving input order.
///
/// Rows without a usable coordinate pair are dropped. Missing optional
/// fields are never an error.
///
/// # Errors
///
/// Returns [`LoadError::MalformedRow`] if any row is not a JSON object.
pub fn normalize(rows: &[serde_json::Value]) -> Result<Vec<Incident>, LoadError> {
    let mut incidents = Vec::with_capacity(rows.len());
    let mut dropped = 0_usize;

    for (index, row) in rows.iter().enumerate() {
        if !row.is_object() {
            return Err(LoadError::MalformedRow {
                index,
                reason: format!("expected a column -> value mapping, got {row}"),
            });
        }

        let latitude = get_f64(row, "latitude");
        let longitude = get_f64(row, "longitude");
        let latitude_2 = get_f64(row, "latitude_2");
        let longitude_2 = get_f64(row, "longitude_2");

        let first = latitude.zip(longitude).map(|(la, lo)| Position::new(la, lo));
        let second = latitude_2
            .zip(longitude_2)
            .map(|(la, lo)| Position::new(la, lo));

        let Some((midpoint, distance_km)) = resolve_geometry(first, second) else {
            dropped += 1;
            continue;
        };

        let casualty_date = get_text(row, "casualty_date").unwrap_or_default();
        let occurred_at = parse_casualty_date(&casualty_date);

        incidents.push(Incident {
            id: incidents.len(),
            vessel_name: get_text(row, "vessel_name"),
            imo: get_text(row, "imo"),
            mmsi: get_text(row, "mmsi"),
            call_sign: get_text(row, "call_sign"),
            flag: get_text(row, "flag"),
            ship_type: get_text(row, "ship_type"),
            build_year: get_text(row, "build_year"),
            casualty_type: get_text(row, "casualty_type").unwrap_or_default(),
            details: get_text(row, "details"),
            casualty_date,
            occurred_at,
            timestamp: get_text(row, "timestamp"),
            latitude,
            longitude,
            timestamp_2: get_text(row, "timestamp_2"),
            latitude_2,
            longitude_2,
            midpoint_lat: midpoint.latitude,
            midpoint_lon: midpoint.longitude,
            distance_km,
        });
    }

    if dropped > 0 {
        log::warn!("Dropped {dropped} records without a usable position");
    }
    log::info!("Normalized {} incidents", incidents.len());

    Ok(incidents)
}
