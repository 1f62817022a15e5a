#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Applies a [`FilterSpec`] to the casualty collection.
//!
//! An incident is visible iff all four predicates hold:
//!
//! 1. its casualty date parses and lies in the filter's inclusive interval
//! 2. its casualty type is selected (an empty selection hides everything)
//! 3. its flag is selected, absent, or no flags are selected
//! 4. its ship type is selected, absent, or no ship types are selected
//!
//! Rules 3 and 4 share [`optional_value_passes`]; rule 2 deliberately does
//! not, since the casualty type is always present.

pub mod actions;
pub mod slider;

use std::collections::BTreeSet;

use casualty_map_incident_models::{DateRange, FilterSpec, Incident};

/// Returns the incidents passing `spec`, in collection order.
#[must_use]
pub fn evaluate<'a>(incidents: &'a [Incident], spec: &FilterSpec) -> Vec<&'a Incident> {
    let visible: Vec<&Incident> = incidents.iter().filter(|i| passes(i, spec)).collect();
    log::debug!(
        "Filter kept {} of {} incidents",
        visible.len(),
        incidents.len()
    );
    visible
}

/// Whether a single incident passes every predicate of `spec`.
#[must_use]
pub fn passes(incident: &Incident, spec: &FilterSpec) -> bool {
    in_date_range(incident, &spec.date_range)
        && casualty_type_selected(incident, &spec.casualty_types)
        && optional_value_passes(&spec.flags, incident.flag.as_deref())
        && optional_value_passes(&spec.ship_types, incident.ship_type.as_deref())
}

/// Date predicate. Incidents whose date did not parse never pass.
#[must_use]
pub fn in_date_range(incident: &Incident, range: &DateRange) -> bool {
    incident.occurred_at.is_some_and(|at| range.contains(at))
}

/// Casualty-type predicate: strict set membership, no exemptions.
#[must_use]
pub fn casualty_type_selected(incident: &Incident, selected: &BTreeSet<String>) -> bool {
    selected.contains(&incident.casualty_type)
}

/// Absence-tolerant predicate used for flag and ship type.
///
/// Passes when nothing is selected, when the incident has no value, or when
/// its value is selected. Only an explicit value outside a non-empty
/// selection is rejected.
#[must_use]
pub fn optional_value_passes(selected: &BTreeSet<String>, value: Option<&str>) -> bool {
    if selected.is_empty() {
        return true;
    }
    match value {
        None | Some("") => true,
        Some(v) => selected.contains(v),
    }
}


#[cfg(test)]
mod tests {
    use casualty_map_index::{Domains, date_range};
    use chrono::{TimeZone as _, Utc};

    use super::fixtures::incident;
    use super::*;

    fn set(values: &[&str]) -> BTreeSet<String> {
        values.iter().map(|v| (*v).to_string()).collect()
    }

    fn collection() -> Vec<Incident> {
        let mut late = incident(3, "Fire", Some("Malta"), None);
        late.occurred_at = Some(Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap());
        let mut undated = incident(4, "Fire", None, None);
        undated.occurred_at = None;
        vec![
            incident(0, "Fire", Some("Panama"), Some("Tanker")),
            incident(1, "Collision", None, Some("Bulk Carrier")),
            incident(2, "Sank", Some("Liberia"), None),
            late,
            undated,
        ]
    }

    fn accept_everything(incidents: &[Incident]) -> FilterSpec {
        let domains = Domains::build(incidents);
        FilterSpec::accept_all(
            date_range(incidents).unwrap(),
            &domains.casualty_types,
            &domains.flags,
            &domains.ship_types,
        )
    }

    fn ids(visible: &[&Incident]) -> Vec<usize> {
        visible.iter().map(|i| i.id).collect()
    }

    #[test]
    fn empty_selection_accepts_any_value() {
        assert!(optional_value_passes(&BTreeSet::new(), Some("Panama")));
        assert!(optional_value_passes(&BTreeSet::new(), None));
    }

    #[test]
    fn missing_value_passes_any_selection() {
        assert!(optional_value_passes(&set(&["Panama"]), None));
        assert!(optional_value_passes(&set(&["Panama"]), Some("")));
    }

    #[test]
    fn unselected_value_is_rejected() {
        assert!(!optional_value_passes(&set(&["Panama"]), Some("Liberia")));
        assert!(optional_value_passes(&set(&["Panama"]), Some("Panama")));
    }

    #[test]
    fn accept_all_spec_keeps_every_dated_incident() {
        let incidents = collection();
        let spec = accept_everything(&incidents);
        assert_eq!(ids(&evaluate(&incidents, &spec)), vec![0, 1, 2, 3]);
    }

    #[test]
    fn empty_casualty_type_set_hides_everything() {
        let incidents = collection();
        let mut spec = accept_everything(&incidents);
        spec.casualty_types.clear();
        assert!(evaluate(&incidents, &spec).is_empty());
    }

    #[test]
    fn flagless_incidents_survive_any_flag_filter() {
        let incidents = collection();
        let mut spec = accept_everything(&incidents);
        spec.flags = set(&["Malta"]);
        assert_eq!(ids(&evaluate(&incidents, &spec)), vec![1, 3]);
    }

    #[test]
    fn ship_type_filter_follows_the_same_absence_rule() {
        let incidents = collection();
        let mut spec = accept_everything(&incidents);
        spec.ship_types = set(&["Tanker"]);
        assert_eq!(ids(&evaluate(&incidents, &spec)), vec![0, 2, 3]);
    }

    #[test]
    fn date_bounds_are_inclusive() {
        let incidents = collection();
        let mut spec = accept_everything(&incidents);
        let day = Utc.with_ymd_and_hms(2024, 6, 1, 0, 0, 0).unwrap();
        spec.date_range = DateRange::new(day, day);
        assert_eq!(ids(&evaluate(&incidents, &spec)), vec![0, 1, 2]);
    }

    #[test]
    fn predicates_intersect() {
        let incidents = collection();
        let mut spec = accept_everything(&incidents);
        spec.casualty_types = set(&["Fire"]);
        spec.flags = set(&["Panama"]);
        assert_eq!(ids(&evaluate(&incidents, &spec)), vec![0]);
    }

    #[test]
    fn evaluation_is_repeatable() {
        let incidents = collection();
        let mut spec = accept_everything(&incidents);
        spec.flags = set(&["Liberia"]);
        let first = ids(&evaluate(&incidents, &spec));
        let second = ids(&evaluate(&incidents, &spec));
        assert_eq!(first, second);
    }
}
