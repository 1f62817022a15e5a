#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Lookup structures derived from the normalized casualty collection.
//!
//! All three are pure functions of the collection and can be rebuilt at any
//! time:
//!
//! * [`date_range`]: min/max of the parseable casualty dates
//! * [`Domains`]: sorted distinct casualty types, flags and ship types
//! * [`VesselIndex`]: incidents grouped by [`VesselKey`]

use std::collections::{BTreeMap, BTreeSet};

use casualty_map_incident_models::{DateRange, Incident, VesselKey};

/// Returns the span of all parseable casualty dates, or `None` when no date
/// parses. Callers supply their own fallback, usually [`DateRange::now`].
#[must_use]
pub fn date_range(incidents: &[Incident]) -> Option<DateRange> {
    let mut dates = incidents.iter().filter_map(|i| i.occurred_at);
    let first = dates.next()?;

    let (min, max) = dates.fold((first, first), |(min, max), d| (min.min(d), max.max(d)));

    Some(DateRange::new(min, max))
}

/// Collects the non-empty distinct values of one field, sorted ascending.
#[must_use]
pub fn distinct_values<'a, F>(incidents: &'a [Incident], field: F) -> Vec<String>
where
    F: Fn(&'a Incident) -> Option<&'a str>,
{
    incidents
        .iter()
        .filter_map(field)
        .filter(|v| !v.is_empty())
        .collect::<BTreeSet<&str>>()
        .into_iter()
        .map(str::to_owned)
        .collect()
}

/// Filter-option domains for the categorical fields.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Domains {
    /// Distinct casualty types.
    pub casualty_types: Vec<String>,
    /// Distinct flags.
    pub flags: Vec<String>,
    /// Distinct ship types.
    pub ship_types: Vec<String>,
}

impl Domains {
    /// Builds all three domains from the collection.
    #[must_use]
    pub fn build(incidents: &[Incident]) -> Self {
        Self {
            casualty_types: distinct_values(incidents, |i| Some(i.casualty_type.as_str())),
            flags: distinct_values(incidents, |i| i.flag.as_deref()),
            ship_types: distinct_values(incidents, |i| i.ship_type.as_deref()),
        }
    }
}

/// Incidents grouped by vessel identity.
///
/// Groups hold positions into the collection the index was built from, in
/// collection order.
#[derive(Debug, Clone, Default)]
pub struct VesselIndex {
    groups: BTreeMap<VesselKey, Vec<usize>>,
}

impl VesselIndex {
    /// Builds the index with a single pass over the collection.
    #[must_use]
    pub fn build(incidents: &[Incident]) -> Self {
        let mut groups: BTreeMap<VesselKey, Vec<usize>> = BTreeMap::new();

        for (position, incident) in incidents.iter().enumerate() {
            groups.entry(incident.vessel_key()).or_default().push(position);
        }

        log::debug!(
            "Indexed {} incidents into {} vessel groups",
            incidents.len(),
            groups.len()
        );

        Self { groups }
    }

    /// Number of distinct vessels.
    #[must_use]
    pub fn len(&self) -> usize {
        self.groups.len()
    }

    /// Whether the index has no vessels.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    /// Positions of every incident sharing `key`, empty if the key is unknown.
    #[must_use]
    pub fn positions(&self, key: &VesselKey) -> &[usize] {
        self.groups.get(key).map_or(&[], Vec::as_slice)
    }

    /// Resolves the group for `key` against the collection the index was
    /// built from.
    #[must_use]
    pub fn group<'a>(&self, key: &VesselKey, incidents: &'a [Incident]) -> Vec<&'a Incident> {
        self.positions(key)
            .iter()
            .filter_map(|&p| incidents.get(p))
            .collect()
    }

    /// Iterates over `(key, positions)` in key order.
    pub fn iter(&self) -> impl Iterator<Item = (&VesselKey, &[usize])> {
        self.groups.iter().map(|(k, v)| (k, v.as_slice()))
    }
}
