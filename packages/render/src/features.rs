//! `GeoJSON` export of incidents.
//!
//! Each incident becomes a `Point` feature at its midpoint. Properties are
//! the incident's serialized columns plus the marker `color`.

use casualty_map_incident_models::Incident;
use geojson::{Feature, FeatureCollection, Geometry, JsonObject, JsonValue};

/// Builds the feature for a single incident.
#[must_use]
pub fn incident_feature(incident: &Incident) -> Feature {
    let point = geo::Point::new(incident.midpoint_lon, incident.midpoint_lat);

    let mut properties = match serde_json::to_value(incident) {
        Ok(JsonValue::Object(map)) => map,
        Ok(other) => {
            log::warn!(
                "Incident {} serialized to a non-object value: {other}",
                incident.id
            );
            JsonObject::new()
        }
        Err(e) => {
            log::warn!("Failed to serialize incident {}: {e}", incident.id);
            JsonObject::new()
        }
    };
    properties.insert(
        "color".to_string(),
        JsonValue::String(incident.color().to_string()),
    );

    Feature {
        bbox: None,
        geometry: Some(Geometry::new(geojson::Value::from(&point))),
        id: None,
        properties: Some(properties),
        foreign_members: None,
    }
}

/// Builds a collection with one feature per incident, in iteration order.
#[must_use]
pub fn feature_collection<'a, I>(incidents: I) -> FeatureCollection
where
    I: IntoIterator<Item = &'a Incident>,
{
    FeatureCollection {
        bbox: None,
        features: incidents.into_iter().map(incident_feature).collect(),
        foreign_members: None,
    }
}
