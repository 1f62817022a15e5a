#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Free-text vessel search.
//!
//! A query is matched as a case-insensitive substring against, in order,
//! the vessel name, IMO, MMSI and call sign of every incident in the full
//! collection (not the filtered view). Each vessel appears at most once:
//! the first incident of a vessel that matches becomes its representative
//! and carries the vessel's whole incident group.
//!
//! Results whose identity fields *start* with the query rank ahead of
//! contains-only matches; each tier is ordered by vessel name.

use std::collections::BTreeSet;
use std::ops::Range;

use casualty_map_incident_models::{Incident, VesselKey};
use casualty_map_index::VesselIndex;
use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};

/// Queries shorter than this (in characters) produce no results.
pub const MIN_QUERY_CHARS: usize = 3;

/// Maximum number of results returned for a query.
pub const MAX_RESULTS: usize = 10;

/// Which identity field produced a match.
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
pub enum MatchField {
    /// Vessel name.
    Name,
    /// IMO number.
    Imo,
    /// MMSI.
    Mmsi,
    /// Call sign.
    #[serde(rename = "callsign")]
    #[strum(serialize = "callsign")]
    CallSign,
}

impl MatchField {
    /// Fields in the order they are tested.
    pub const PRIORITY: [Self; 4] = [Self::Name, Self::Imo, Self::Mmsi, Self::CallSign];

    /// The field's value on `incident`, `""` when absent.
    #[must_use]
    pub fn value_of(self, incident: &Incident) -> &str {
        let value = match self {
            Self::Name => incident.vessel_name.as_deref(),
            Self::Imo => incident.imo.as_deref(),
            Self::Mmsi => incident.mmsi.as_deref(),
            Self::CallSign => incident.call_sign.as_deref(),
        };
        value.unwrap_or_default()
    }
}

/// One vessel matching a query.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchResult<'a> {
    /// First matching incident for the vessel.
    pub incident: &'a Incident,
    /// Every incident sharing the vessel's identity key.
    pub incidents: Vec<&'a Incident>,
    /// Field the query matched on.
    pub match_field: MatchField,
    /// Size of [`Self::incidents`].
    pub record_count: usize,
}

impl SearchResult<'_> {
    /// Display label for the vessel.
    #[must_use]
    pub fn label(&self) -> &str {
        self.incident.display_name()
    }

    /// `"1 record"` or `"N records"`.
    #[must_use]
    pub fn record_label(&self) -> String {
        if self.record_count == 1 {
            "1 record".to_string()
        } else {
            format!("{} records", self.record_count)
        }
    }

    /// Identity key of the matched vessel.
    #[must_use]
    pub fn vessel_key(&self) -> VesselKey {
        self.incident.vessel_key()
    }
}

/// Runs a vessel search.
///
/// `index` must have been built from `incidents`. Returns at most
/// [`MAX_RESULTS`] results, and none for queries under
/// [`MIN_QUERY_CHARS`] characters.
#[must_use]
pub fn search<'a>(incidents: &'a [Incident], index: &VesselIndex, query: &str) -> Vec<SearchResult<'a>> {
    if query.chars().count() < MIN_QUERY_CHARS {
        return Vec::new();
    }

    let needle = query.to_lowercase();
    let mut emitted: BTreeSet<VesselKey> = BTreeSet::new();
    let mut ranked: Vec<(bool, String, SearchResult<'a>)> = Vec::new();

    for incident in incidents {
        let key = incident.vessel_key();
        if emitted.contains(&key) {
            continue;
        }

        let lowered = MatchField::PRIORITY.map(|field| field.value_of(incident).to_lowercase());
        let Some(slot) = lowered.iter().position(|value| value.contains(&needle)) else {
            continue;
        };

        let mut group = index.group(&key, incidents);
        if group.is_empty() {
            group.push(incident);
        }

        let starts_with = lowered.iter().any(|value| value.starts_with(&needle));
        let name = lowered[0].clone();

        ranked.push((
            starts_with,
            name,
            SearchResult {
                incident,
                record_count: group.len(),
                incidents: group,
                match_field: MatchField::PRIORITY[slot],
            },
        ));
        emitted.insert(key);
    }

    ranked.sort_by(|(a_prefix, a_name, _), (b_prefix, b_name, _)| {
        b_prefix.cmp(a_prefix).then_with(|| a_name.cmp(b_name))
    });

    log::debug!("Vessel search {query:?}: {} vessels matched", ranked.len());

    ranked
        .into_iter()
        .take(MAX_RESULTS)
        .map(|(_, _, result)| result)
        .collect()
}

/// Byte range of the first case-insensitive occurrence of `query` in
/// `text`, for emphasising the matched part of a label.
#[must_use]
pub fn highlight_span(text: &str, query: &str) -> Option<Range<usize>> {
    let needle = query.to_lowercase();
    if needle.is_empty() {
        return None;
    }

    for (start, _) in text.char_indices() {
        let mut lowered = String::new();
        for (offset, c) in text[start..].char_indices() {
            lowered.extend(c.to_lowercase());
            if !needle.starts_with(lowered.as_str()) {
                break;
            }
            if lowered.len() == needle.len() {
                return Some(start..start + offset + c.len_utf8());
            }
        }
    }

    None
}
