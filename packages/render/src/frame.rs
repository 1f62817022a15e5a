//! The full payload handed to the map renderer for one state.

use casualty_map_incident_models::{FilterSpec, Incident};
use geo::BoundingRect as _;
use geojson::FeatureCollection;
use serde::{Deserialize, Serialize};

use crate::features::feature_collection;
use crate::selection::SelectionState;

/// Geographic bounding box in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    /// Western longitude boundary.
    pub west: f64,
    /// Southern latitude boundary.
    pub south: f64,
    /// Eastern longitude boundary.
    pub east: f64,
    /// Northern latitude boundary.
    pub north: f64,
}

impl BoundingBox {
    /// Creates a new bounding box from the given coordinates.
    #[must_use]
    pub const fn new(west: f64, south: f64, east: f64, north: f64) -> Self {
        Self {
            west,
            south,
            east,
            north,
        }
    }

    /// Smallest box containing every incident midpoint, `None` for no
    /// incidents.
    #[must_use]
    pub fn around<'a, I>(incidents: I) -> Option<Self>
    where
        I: IntoIterator<Item = &'a Incident>,
    {
        let points: geo::MultiPoint<f64> = incidents
            .into_iter()
            .map(|i| geo::Point::new(i.midpoint_lon, i.midpoint_lat))
            .collect();

        points
            .bounding_rect()
            .map(|rect| Self::new(rect.min().x, rect.min().y, rect.max().x, rect.max().y))
    }
}

/// Which point layers are drawn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ViewFlags {
    /// Heatmap layer.
    pub heatmap: bool,
    /// Individual markers.
    pub markers: bool,
}

impl ViewFlags {
    /// Layers to draw: the filter's choice, except that an active vessel search
    /// always shows markers without the heatmap.
    #[must_use]
    pub fn effective(spec: &FilterSpec, selection: &SelectionState) -> Self {
        if selection.is_scoped() {
            Self {
                heatmap: false,
                markers: true,
            }
        } else {
            Self {
                heatmap: spec.show_heatmap,
                markers: spec.show_markers,
            }
        }
    }
}

/// Header counts shown above the map.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Summary {
    /// Every loaded incident.
    pub total: usize,
    /// Incidents passing the current filter.
    pub filtered: usize,
}

/// Everything the map needs to draw one state.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RenderFrame {
    /// Incidents drawn at full opacity.
    pub active: FeatureCollection,
    /// Incidents drawn dimmed behind an active search.
    pub inactive: FeatureCollection,
    /// The searched vessel's incidents, drawn with a highlight ring.
    pub highlight: FeatureCollection,
    /// Layers to draw.
    pub view: ViewFlags,
    /// Camera target, present only while a focus animation is pending.
    pub focus_bounds: Option<BoundingBox>,
    /// Header counts.
    pub summary: Summary,
}

impl RenderFrame {
    /// Assembles the frame from the full collection, its filtered subset and
    /// the current selection.
    ///
    /// With no search active, `active` is the filtered subset. With a search
    /// active, `active` is the whole searched vessel group (filters do not
    /// hide a vessel the user asked for) and `inactive` is the rest of the
    /// filtered subset.
    #[must_use]
    pub fn build(
        incidents: &[Incident],
        filtered: &[&Incident],
        spec: &FilterSpec,
        selection: &SelectionState,
    ) -> Self {
        let scoped = selection.scoped(incidents);

        let (active, inactive) = if selection.is_scoped() {
            (
                feature_collection(scoped.iter().copied()),
                feature_collection(selection.dimmed(filtered)),
            )
        } else {
            (
                feature_collection(filtered.iter().copied()),
                feature_collection(std::iter::empty()),
            )
        };

        let focus_bounds = if selection.focus_pending() {
            BoundingBox::around(selection.focused(incidents))
        } else {
            None
        };

        Self {
            active,
            inactive,
            highlight: feature_collection(scoped),
            view: ViewFlags::effective(spec, selection),
            focus_bounds,
            summary: Summary {
                total: incidents.len(),
                filtered: filtered.len(),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use casualty_map_incident_models::DateRange;
    use chrono::{TimeZone as _, Utc};

    use super::*;
    use crate::fixtures::incident;

    fn spec() -> FilterSpec {
        let at = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        FilterSpec::accept_all(DateRange::new(at, at), &[], &[], &[])
    }

    fn placed(id: usize, name: &str, lat: f64, lon: f64) -> Incident {
        let mut i = incident(id, name);
        i.midpoint_lat = lat;
        i.midpoint_lon = lon;
        i
    }

    fn collection() -> Vec<Incident> {
        vec![
            placed(0, "Alpha", 10.0, 20.0),
            placed(1, "Beta", 0.0, 0.0),
            placed(2, "Alpha", -5.0, 30.0),
        ]
    }

    #[test]
    fn bounding_box_spans_midpoints() {
        let incidents = collection();
        let bbox = BoundingBox::around(&incidents).unwrap();
        assert_eq!(bbox, BoundingBox::new(0.0, -5.0, 30.0, 10.0));
        assert!(BoundingBox::around(std::iter::empty()).is_none());
    }

    #[test]
    fn unscoped_frame_shows_filtered_set() {
        let incidents = collection();
        let filtered: Vec<&Incident> = incidents.iter().take(2).collect();
        let frame = RenderFrame::build(&incidents, &filtered, &spec(), &SelectionState::new());

        assert_eq!(frame.active.features.len(), 2);
        assert!(frame.inactive.features.is_empty());
        assert!(frame.highlight.features.is_empty());
        assert!(frame.focus_bounds.is_none());
        assert_eq!(frame.view, ViewFlags { heatmap: true, markers: false });
        assert_eq!(frame.summary, Summary { total: 3, filtered: 2 });
    }

    #[test]
    fn scoped_frame_splits_active_and_dimmed() {
        let incidents = collection();
        let filtered: Vec<&Incident> = incidents.iter().take(2).collect();
        let mut selection = SelectionState::new();
        selection.select([&incidents[0], &incidents[2]]);

        let frame = RenderFrame::build(&incidents, &filtered, &spec(), &selection);

        assert_eq!(frame.active.features.len(), 2);
        assert_eq!(frame.inactive.features.len(), 1);
        assert_eq!(frame.highlight.features.len(), 2);
        assert_eq!(frame.view, ViewFlags { heatmap: false, markers: true });
        assert_eq!(
            frame.focus_bounds,
            Some(BoundingBox::new(20.0, -5.0, 30.0, 10.0))
        );
    }

    #[test]
    fn focus_bounds_disappear_after_consume() {
        let incidents = collection();
        let filtered: Vec<&Incident> = incidents.iter().collect();
        let mut selection = SelectionState::new();
        selection.select(&incidents[..1]);
        selection.consume_focus();

        let frame = RenderFrame::build(&incidents, &filtered, &spec(), &selection);
        assert!(frame.focus_bounds.is_none());
        assert_eq!(frame.highlight.features.len(), 1);
        assert_eq!(frame.inactive.features.len(), 2);
    }

    #[test]
    fn view_flags_follow_spec_without_scope() {
        let mut both = spec();
        both.show_markers = true;
        let flags = ViewFlags::effective(&both, &SelectionState::new());
        assert!(flags.heatmap && flags.markers);
    }
}
