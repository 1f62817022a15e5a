//! Immutable view of one loaded dataset plus its derived indexes.

use casualty_map_filter::slider::DateSlider;
use casualty_map_incident_models::{DateRange, FilterSpec, Incident};
use casualty_map_index::{Domains, VesselIndex, date_range};

/// A loaded collection and everything derived from it. Never mutated after
/// construction; a reload builds a new snapshot.
#[derive(Debug, Clone)]
pub struct Snapshot {
    incidents: Vec<Incident>,
    domains: Domains,
    vessels: VesselIndex,
    date_bounds: DateRange,
}

impl Snapshot {
    /// Derives the indexes for `incidents`. When no casualty date parses the
    /// date bounds collapse to the current instant.
    #[must_use]
    pub fn build(incidents: Vec<Incident>) -> Self {
        let domains = Domains::build(&incidents);
        let vessels = VesselIndex::build(&incidents);
        let date_bounds = date_range(&incidents).unwrap_or_else(|| {
            log::warn!("No casualty date could be parsed; defaulting the date range to now");
            DateRange::now()
        });

        log::info!(
            "Snapshot ready: {} incidents, {} vessels, {} casualty types",
            incidents.len(),
            vessels.len(),
            domains.casualty_types.len()
        );

        Self {
            incidents,
            domains,
            vessels,
            date_bounds,
        }
    }

    /// The normalized collection.
    #[must_use]
    pub fn incidents(&self) -> &[Incident] {
        &self.incidents
    }

    /// Distinct categorical values.
    #[must_use]
    pub const fn domains(&self) -> &Domains {
        &self.domains
    }

    /// Vessel grouping index.
    #[must_use]
    pub const fn vessels(&self) -> &VesselIndex {
        &self.vessels
    }

    /// Earliest and latest parsed casualty date.
    #[must_use]
    pub const fn date_bounds(&self) -> DateRange {
        self.date_bounds
    }

    /// Slider spanning [`Self::date_bounds`].
    #[must_use]
    pub const fn slider(&self) -> DateSlider {
        DateSlider::new(self.date_bounds)
    }

    /// The accept-everything spec a fresh session starts from.
    #[must_use]
    pub fn initial_spec(&self) -> FilterSpec {
        FilterSpec::accept_all(
            self.date_bounds,
            &self.domains.casualty_types,
            &self.domains.flags,
            &self.domains.ship_types,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_collection_collapses_date_bounds() {
        let snapshot = Snapshot::build(Vec::new());
        let bounds = snapshot.date_bounds();

        assert_eq!(bounds.start, bounds.end);
        assert!(snapshot.incidents().is_empty());
        assert!(snapshot.vessels().is_empty());

        let spec = snapshot.initial_spec();
        assert!(spec.casualty_types.is_empty());
        assert!(spec.flags.is_empty());
        assert!(spec.ship_types.is_empty());
        assert_eq!(spec.date_range, bounds);
    }

    #[test]
    fn unparseable_dates_still_build_a_snapshot() {
        let incidents = casualty_map_ingest::load_csv(
            "vessel_name,casualty_type,casualty_date,latitude,longitude\n\
             Ocean Star,Fire,someday,10,20\n\
             Sea Breeze,Sank,,0,0\n",
        )
        .unwrap();
        let snapshot = Snapshot::build(incidents);
        let bounds = snapshot.date_bounds();

        assert_eq!(bounds.start, bounds.end);
        assert_eq!(snapshot.vessels().len(), 2);

        let spec = snapshot.initial_spec();
        assert!(spec.casualty_types.contains("Fire"));
        assert!(spec.casualty_types.contains("Sank"));
        assert!(casualty_map_filter::evaluate(snapshot.incidents(), &spec).is_empty());
    }
}
