//! Text shown when a single marker is clicked.

use casualty_map_incident_models::Incident;
use serde::Serialize;

/// Shown when an incident carries no narrative.
pub const NO_DETAILS: &str = "No details available";

/// Popup content for one incident.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IncidentPopup {
    /// Vessel name, or `"Unknown Vessel"`.
    pub title: String,
    /// Casualty category.
    pub casualty_type: String,
    /// Formatted casualty date, or the raw source value when it did not
    /// parse.
    pub date: String,
    /// Ship type, when known.
    pub ship_type: Option<String>,
    /// Flag state, when known.
    pub flag: Option<String>,
    /// Distance between the two reported positions, e.g. `"12.3 km"`. Absent
    /// for single-position incidents.
    pub distance: Option<String>,
    /// Narrative.
    pub details: String,
}

impl IncidentPopup {
    /// Builds the popup for `incident`.
    #[must_use]
    pub fn new(incident: &Incident) -> Self {
        let date = incident.occurred_at.map_or_else(
            || incident.casualty_date.clone(),
            |at| at.format("%b %-d, %Y").to_string(),
        );

        Self {
            title: incident.display_name().to_string(),
            casualty_type: incident.casualty_type.clone(),
            date,
            ship_type: non_empty(incident.ship_type.as_deref()),
            flag: non_empty(incident.flag.as_deref()),
            distance: (incident.distance_km > 0.0)
                .then(|| format!("{:.1} km", incident.distance_km)),
            details: non_empty(incident.details.as_deref())
                .unwrap_or_else(|| NO_DETAILS.to_string()),
        }
    }
}

fn non_empty(value: Option<&str>) -> Option<String> {
    value.filter(|v| !v.is_empty()).map(str::to_string)
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone as _, Utc};

    use super::*;
    use crate::fixtures::incident;

    #[test]
    fn full_popup() {
        let mut i = incident(0, "Ocean Star");
        i.casualty_type = "Grounding".to_string();
        i.occurred_at = Some(Utc.with_ymd_and_hms(2024, 3, 5, 0, 0, 0).unwrap());
        i.ship_type = Some("Tanker".to_string());
        i.flag = Some("Panama".to_string());
        i.distance_km = 12.345;
        i.details = Some("Ran aground near the harbour entrance".to_string());

        let popup = IncidentPopup::new(&i);
        assert_eq!(popup.title, "Ocean Star");
        assert_eq!(popup.date, "Mar 5, 2024");
        assert_eq!(popup.ship_type.as_deref(), Some("Tanker"));
        assert_eq!(popup.flag.as_deref(), Some("Panama"));
        assert_eq!(popup.distance.as_deref(), Some("12.3 km"));
        assert_eq!(popup.details, "Ran aground near the harbour entrance");
    }

    #[test]
    fn sparse_popup_uses_fallbacks() {
        let mut i = incident(0, "");
        i.vessel_name = None;
        i.occurred_at = None;
        i.casualty_date = "sometime in 2019".to_string();
        i.flag = Some(String::new());

        let popup = IncidentPopup::new(&i);
        assert_eq!(popup.title, "Unknown Vessel");
        assert_eq!(popup.date, "sometime in 2019");
        assert!(popup.flag.is_none());
        assert!(popup.ship_type.is_none());
        assert!(popup.distance.is_none());
        assert_eq!(popup.details, NO_DETAILS);
    }
}
