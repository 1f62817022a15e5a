//! User filter actions.
//!
//! A [`FilterSpec`] is only ever changed through [`FilterAction::apply`], which
//! returns a new spec and leaves the old one untouched.

use std::collections::BTreeSet;

use casualty_map_incident_models::{DateRange, FilterSpec, ViewMode};
use casualty_map_index::Domains;
use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};

/// A categorical filter dimension.
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
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum Dimension {
    /// Casualty type.
    CasualtyType,
    /// Flag state.
    Flag,
    /// Ship type.
    ShipType,
}

/// One explicit user edit to the filter spec.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum FilterAction {
    /// Adds the value if it is not selected, removes it otherwise.
    Toggle {
        /// Dimension being edited.
        dimension: Dimension,
        /// Value to toggle.
        value: String,
    },
    /// Selects the whole domain of a dimension.
    SelectAll {
        /// Dimension being edited.
        dimension: Dimension,
    },
    /// Clears a dimension's selection.
    DeselectAll {
        /// Dimension being edited.
        dimension: Dimension,
    },
    /// Switches to exactly one point layer.
    SetViewMode {
        /// Layer to show.
        mode: ViewMode,
    },
    /// Enables or disables the heatmap layer independently.
    SetHeatmap {
        /// New state.
        enabled: bool,
    },
    /// Enables or disables the marker layer independently.
    SetMarkers {
        /// New state.
        enabled: bool,
    },
    /// Replaces the date interval.
    SetDateRange {
        /// New interval.
        range: DateRange,
    },
}

impl FilterAction {
    /// Applies this action to `spec`, returning the edited copy.
    ///
    /// `domains` supplies the full value lists for [`Self::SelectAll`].
    #[must_use]
    pub fn apply(&self, spec: &FilterSpec, domains: &Domains) -> FilterSpec {
        let mut next = spec.clone();

        match self {
            Self::Toggle { dimension, value } => {
                let set = selection_mut(&mut next, *dimension);
                if !set.remove(value) {
                    set.insert(value.clone());
                }
            }
            Self::SelectAll { dimension } => {
                let all = domain(domains, *dimension).iter().cloned().collect();
                *selection_mut(&mut next, *dimension) = all;
            }
            Self::DeselectAll { dimension } => {
                selection_mut(&mut next, *dimension).clear();
            }
            Self::SetViewMode { mode } => {
                next.show_heatmap = *mode == ViewMode::Heatmap;
                next.show_markers = *mode == ViewMode::Markers;
            }
            Self::SetHeatmap { enabled } => next.show_heatmap = *enabled,
            Self::SetMarkers { enabled } => next.show_markers = *enabled,
            Self::SetDateRange { range } => next.date_range = *range,
        }

        next
    }
}

fn selection_mut(spec: &mut FilterSpec, dimension: Dimension) -> &mut BTreeSet<String> {
    match dimension {
        Dimension::CasualtyType => &mut spec.casualty_types,
        Dimension::Flag => &mut spec.flags,
        Dimension::ShipType => &mut spec.ship_types,
    }
}

fn domain(domains: &Domains, dimension: Dimension) -> &[String] {
    match dimension {
        Dimension::CasualtyType => &domains.casualty_types,
        Dimension::Flag => &domains.flags,
        Dimension::ShipType => &domains.ship_types,
    }
}
