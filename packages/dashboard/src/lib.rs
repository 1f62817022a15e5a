#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Session state for the casualty map dashboard.
//!
//! A [`Dashboard`] owns the password gate, the load lifecycle and the user's
//! current choices (filter spec, search query, selection). Everything shown
//! on screen (visible incidents, search results, the render frame) is
//! re-derived from those on demand.

pub mod config;
pub mod snapshot;

use casualty_map_filter::actions::FilterAction;
use casualty_map_filter::slider::DateSlider;
use casualty_map_incident_models::{FilterSpec, Incident, VesselKey};
use casualty_map_ingest::LoadError;
use casualty_map_render::{IncidentPopup, RenderFrame, SelectionState};
use casualty_map_search::SearchResult;
use casualty_map_storage::{BlobStore, StorageError};
use serde::Serialize;
use strum_macros::{AsRefStr, Display};

pub use config::{AuthGate, DashboardConfig};
pub use snapshot::Snapshot;

/// Errors surfaced by the dashboard session.
#[derive(Debug, thiserror::Error)]
pub enum DashboardError {
    /// Fetching the dataset failed.
    #[error(transparent)]
    Storage(#[from] StorageError),

    /// The fetched dataset could not be parsed.
    #[error(transparent)]
    Load(#[from] LoadError),

    /// A load was requested while another is still running.
    #[error("A load is already in progress")]
    LoadInProgress,

    /// Data was requested before the gate was unlocked.
    #[error("Dashboard is locked")]
    Locked,

    /// A load result arrived without a matching [`Dashboard::begin_load`].
    #[error("No load is in progress")]
    NotLoading,

    /// Missing required configuration.
    #[error("Missing environment variable: {name}")]
    Config {
        /// Name of the missing environment variable.
        name: String,
    },
}

/// Where the dataset load currently stands.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Display, AsRefStr)]
#[serde(tag = "phase", content = "message", rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum LoadPhase {
    /// Nothing requested yet.
    Idle,
    /// Download or parse running.
    Loading,
    /// A snapshot is available.
    Ready,
    /// The last load failed with this message.
    Failed(String),
}

/// One user session.
#[derive(Debug)]
pub struct Dashboard {
    gate: AuthGate,
    phase: LoadPhase,
    snapshot: Option<Snapshot>,
    spec: Option<FilterSpec>,
    query: String,
    selection: SelectionState,
}

impl Dashboard {
    /// Creates a locked, empty session.
    #[must_use]
    pub const fn new(gate: AuthGate) -> Self {
        Self {
            gate,
            phase: LoadPhase::Idle,
            snapshot: None,
            spec: None,
            query: String::new(),
            selection: SelectionState::new(),
        }
    }

    /// Creates a session gated by the configured password.
    #[must_use]
    pub fn from_config(config: &DashboardConfig) -> Self {
        Self::new(AuthGate::new(config.password.clone()))
    }

    /// Tries to unlock the session. Returns whether it is now unlocked.
    pub fn unlock(&mut self, attempt: &str) -> bool {
        self.gate.try_unlock(attempt)
    }

    /// Whether the gate has been unlocked.
    #[must_use]
    pub const fn is_unlocked(&self) -> bool {
        self.gate.is_unlocked()
    }

    /// Current load phase.
    #[must_use]
    pub const fn phase(&self) -> &LoadPhase {
        &self.phase
    }

    /// Marks a load as started.
    ///
    /// Hosts that run the download themselves call this, then
    /// [`Self::finish_load`] with the result.
    ///
    /// # Errors
    ///
    /// * [`DashboardError::Locked`] if the gate is still locked
    /// * [`DashboardError::LoadInProgress`] if a load is already running
    pub fn begin_load(&mut self) -> Result<(), DashboardError> {
        if !self.gate.is_unlocked() {
            return Err(DashboardError::Locked);
        }
        if self.phase == LoadPhase::Loading {
            return Err(DashboardError::LoadInProgress);
        }
        self.phase = LoadPhase::Loading;
        Ok(())
    }

    /// Completes a load started with [`Self::begin_load`].
    ///
    /// On success the snapshot is replaced, the filter spec is reset to
    /// accept everything, and any query or selection is dropped. On failure
    /// the previous snapshot is discarded too, so a failed reload never keeps
    /// serving stale data.
    ///
    /// # Errors
    ///
    /// * [`DashboardError::Locked`] if the gate is still locked
    /// * [`DashboardError::NotLoading`] if no load was started
    /// * the fetch or parse error, after which the phase is
    ///   [`LoadPhase::Failed`]
    pub fn finish_load(
        &mut self,
        fetched: Result<Vec<u8>, StorageError>,
    ) -> Result<(), DashboardError> {
        if !self.gate.is_unlocked() {
            return Err(DashboardError::Locked);
        }
        if self.phase != LoadPhase::Loading {
            return Err(DashboardError::NotLoading);
        }

        let result = fetched
            .map_err(DashboardError::from)
            .and_then(|bytes| casualty_map_ingest::load_csv(&bytes).map_err(DashboardError::from));
        self.query.clear();
        self.selection.clear();

        match result {
            Ok(incidents) => {
                let snapshot = Snapshot::build(incidents);
                self.spec = Some(snapshot.initial_spec());
                self.snapshot = Some(snapshot);
                self.phase = LoadPhase::Ready;
                Ok(())
            }
            Err(e) => {
                log::error!("Failed to load casualty data: {e}");
                self.snapshot = None;
                self.spec = None;
                self.phase = LoadPhase::Failed(e.to_string());
                Err(e)
            }
        }
    }

    /// Downloads and loads the dataset from `store`.
    ///
    /// # Errors
    ///
    /// See [`Self::begin_load`] and [`Self::finish_load`].
    pub async fn load(&mut self, store: &dyn BlobStore) -> Result<(), DashboardError> {
        self.begin_load()?;
        let fetched = store.fetch_bytes().await;
        self.finish_load(fetched)
    }

    /// The loaded snapshot, if any.
    #[must_use]
    pub const fn snapshot(&self) -> Option<&Snapshot> {
        self.snapshot.as_ref()
    }

    /// The current filter spec, if data is loaded.
    #[must_use]
    pub const fn spec(&self) -> Option<&FilterSpec> {
        self.spec.as_ref()
    }

    /// Date slider over the loaded date span.
    #[must_use]
    pub fn slider(&self) -> Option<DateSlider> {
        self.snapshot.as_ref().map(Snapshot::slider)
    }

    /// Applies a filter edit. Ignored until data is loaded.
    pub fn apply(&mut self, action: &FilterAction) {
        let (Some(snapshot), Some(spec)) = (&self.snapshot, &self.spec) else {
            log::debug!("Ignoring filter action before data is loaded");
            return;
        };
        self.spec = Some(action.apply(spec, snapshot.domains()));
    }

    /// Incidents passing the current filter.
    #[must_use]
    pub fn visible(&self) -> Vec<&Incident> {
        match (&self.snapshot, &self.spec) {
            (Some(snapshot), Some(spec)) => casualty_map_filter::evaluate(snapshot.incidents(), spec),
            _ => Vec::new(),
        }
    }

    /// Replaces the search query.
    pub fn set_query(&mut self, query: impl Into<String>) {
        self.query = query.into();
    }

    /// Current search query.
    #[must_use]
    pub fn query(&self) -> &str {
        &self.query
    }

    /// Vessels matching the current query.
    #[must_use]
    pub fn search_results(&self) -> Vec<SearchResult<'_>> {
        self.snapshot.as_ref().map_or_else(Vec::new, |snapshot| {
            casualty_map_search::search(snapshot.incidents(), snapshot.vessels(), &self.query)
        })
    }

    /// Selects a vessel, typically one picked from
    /// [`Self::search_results`], and clears the query. Returns `false` if the
    /// vessel is unknown.
    pub fn select_vessel(&mut self, key: &VesselKey) -> bool {
        let Some(snapshot) = &self.snapshot else {
            return false;
        };
        let group = snapshot.vessels().group(key, snapshot.incidents());
        if group.is_empty() {
            log::debug!("No incidents for vessel {key}");
            return false;
        }

        self.selection.select(group);
        self.query.clear();
        true
    }

    /// Reports that the map finished animating to the selection.
    pub fn consume_focus(&mut self) {
        self.selection.consume_focus();
    }

    /// Drops the vessel selection and the query.
    pub fn clear_search(&mut self) {
        self.selection.clear();
        self.query.clear();
    }

    /// Current selection state.
    #[must_use]
    pub const fn selection(&self) -> &SelectionState {
        &self.selection
    }

    /// Builds the render payload for the current state.
    #[must_use]
    pub fn render(&self) -> Option<RenderFrame> {
        let (snapshot, spec) = (self.snapshot.as_ref()?, self.spec.as_ref()?);
        let filtered = casualty_map_filter::evaluate(snapshot.incidents(), spec);
        Some(RenderFrame::build(
            snapshot.incidents(),
            &filtered,
            spec,
            &self.selection,
        ))
    }

    /// Popup content for the incident with `id`.
    #[must_use]
    pub fn popup(&self, id: usize) -> Option<IncidentPopup> {
        self.snapshot
            .as_ref()?
            .incidents()
            .get(id)
            .map(IncidentPopup::new)
    }
}

#[cfg(test)]
mod tests {
    use async_trait::async_trait;
    use casualty_map_filter::actions::Dimension;
    use casualty_map_incident_models::ViewMode;

    use super::*;

    const CSV: &str = "\
vessel_name,imo,mmsi,call_sign,flag,ship_type,casualty_type,casualty_date,latitude,longitude,latitude_2,longitude_2,details
Ocean Star,9123456,235000001,ABCD1,Panama,Tanker,Fire,2024-01-15,10,20,,,Engine room fire
Ocean Star,9123456,235000001,ABCD1,Panama,Tanker,Collision,2024-03-02,11,21,11,22,
Sea Breeze,9000001,,,Liberia,Bulk Carrier,Sank,2024-02-10,0,0,,,
Harbour Tug,,,,,,Collision,2024-04-01,5,5,,,
";

    struct Memory(Result<&'static str, u16>);

    #[async_trait]
    impl BlobStore for Memory {
        async fn fetch_bytes(&self) -> Result<Vec<u8>, StorageError> {
            self.0.map(|text| text.as_bytes().to_vec()).map_err(|status| StorageError::Status {
                bucket: "casualties-data".to_string(),
                path: "merged.csv".to_string(),
                status,
            })
        }
    }

    async fn loaded() -> Dashboard {
        let mut dashboard = Dashboard::new(AuthGate::new("secret"));
        assert!(dashboard.unlock("secret"));
        dashboard.load(&Memory(Ok(CSV))).await.unwrap();
        dashboard
    }

    #[tokio::test]
    async fn locked_dashboard_refuses_to_load() {
        let mut dashboard = Dashboard::new(AuthGate::new("secret"));
        assert!(!dashboard.unlock("wrong"));
        let err = dashboard.load(&Memory(Ok(CSV))).await.unwrap_err();
        assert!(matches!(err, DashboardError::Locked));
        assert_eq!(dashboard.phase(), &LoadPhase::Idle);
    }

    #[tokio::test]
    async fn load_initialises_accept_all_spec() {
        let dashboard = loaded().await;
        assert_eq!(dashboard.phase(), &LoadPhase::Ready);
        assert_eq!(dashboard.visible().len(), 4);

        let spec = dashboard.spec().unwrap();
        assert!(spec.show_heatmap);
        assert!(!spec.show_markers);
        assert_eq!(spec.casualty_types.len(), 3);
    }

    #[tokio::test]
    async fn second_load_while_loading_is_rejected() {
        let mut dashboard = Dashboard::new(AuthGate::new("secret"));
        dashboard.unlock("secret");
        dashboard.begin_load().unwrap();
        assert!(matches!(
            dashboard.begin_load(),
            Err(DashboardError::LoadInProgress)
        ));
        dashboard.finish_load(Ok(CSV.as_bytes().to_vec())).unwrap();
        assert_eq!(dashboard.phase(), &LoadPhase::Ready);
    }

    #[tokio::test]
    async fn failed_fetch_is_reported_and_retryable() {
        let mut dashboard = Dashboard::new(AuthGate::new("secret"));
        dashboard.unlock("secret");

        let err = dashboard.load(&Memory(Err(404))).await.unwrap_err();
        assert!(matches!(err, DashboardError::Storage(StorageError::Status { status: 404, .. })));
        assert!(matches!(dashboard.phase(), LoadPhase::Failed(message) if message.contains("404")));
        assert!(dashboard.render().is_none());

        dashboard.load(&Memory(Ok(CSV))).await.unwrap();
        assert_eq!(dashboard.phase(), &LoadPhase::Ready);
    }

    #[test]
    fn finish_without_unlock_is_refused() {
        let mut dashboard = Dashboard::new(AuthGate::new("secret"));
        let err = dashboard
            .finish_load(Ok(CSV.as_bytes().to_vec()))
            .unwrap_err();
        assert!(matches!(err, DashboardError::Locked));
        assert_eq!(dashboard.phase(), &LoadPhase::Idle);
        assert!(dashboard.snapshot().is_none());
        assert!(dashboard.render().is_none());
    }

    #[test]
    fn finish_without_begin_is_refused() {
        let mut dashboard = Dashboard::new(AuthGate::new("secret"));
        dashboard.unlock("secret");
        let err = dashboard
            .finish_load(Ok(CSV.as_bytes().to_vec()))
            .unwrap_err();
        assert!(matches!(err, DashboardError::NotLoading));
        assert_eq!(dashboard.phase(), &LoadPhase::Idle);
        assert!(dashboard.render().is_none());
    }

    #[tokio::test]
    async fn failed_reload_drops_the_previous_snapshot() {
        let mut dashboard = loaded().await;
        dashboard.set_query("ocean");

        let err = dashboard.load(&Memory(Err(503))).await.unwrap_err();
        assert!(matches!(err, DashboardError::Storage(_)));
        assert!(matches!(dashboard.phase(), LoadPhase::Failed(_)));
        assert!(dashboard.snapshot().is_none());
        assert!(dashboard.spec().is_none());
        assert!(dashboard.visible().is_empty());
        assert!(dashboard.render().is_none());
        assert_eq!(dashboard.query(), "");
    }

    #[tokio::test]
    async fn header_only_file_loads_an_empty_map() {
        let mut dashboard = Dashboard::new(AuthGate::new("secret"));
        dashboard.unlock("secret");
        dashboard
            .load(&Memory(Ok("vessel_name,latitude,longitude\n")))
            .await
            .unwrap();

        assert_eq!(dashboard.phase(), &LoadPhase::Ready);
        assert!(dashboard.visible().is_empty());
        let frame = dashboard.render().unwrap();
        assert_eq!(frame.summary.total, 0);
        assert_eq!(frame.summary.filtered, 0);
        assert!(frame.active.features.is_empty());
    }

    #[tokio::test]
    async fn empty_file_fails_the_load() {
        let mut dashboard = Dashboard::new(AuthGate::new("secret"));
        dashboard.unlock("secret");
        let err = dashboard.load(&Memory(Ok(""))).await.unwrap_err();
        assert!(matches!(err, DashboardError::Load(_)));
    }

    #[tokio::test]
    async fn filter_actions_change_the_visible_set() {
        let mut dashboard = loaded().await;
        dashboard.apply(&FilterAction::Toggle {
            dimension: Dimension::CasualtyType,
            value: "Collision".to_string(),
        });
        assert_eq!(dashboard.visible().len(), 2);

        dashboard.apply(&FilterAction::DeselectAll {
            dimension: Dimension::Flag,
        });
        assert_eq!(dashboard.visible().len(), 2);

        dashboard.apply(&FilterAction::SetViewMode {
            mode: ViewMode::Markers,
        });
        let frame = dashboard.render().unwrap();
        assert!(frame.view.markers);
        assert!(!frame.view.heatmap);
        assert_eq!(frame.summary.total, 4);
        assert_eq!(frame.summary.filtered, 2);
    }

    #[tokio::test]
    async fn search_select_and_clear() {
        let mut dashboard = loaded().await;
        dashboard.set_query("ocean");

        let key = {
            let results = dashboard.search_results();
            assert_eq!(results.len(), 1);
            assert_eq!(results[0].record_count, 2);
            results[0].vessel_key()
        };

        assert!(dashboard.select_vessel(&key));
        assert_eq!(dashboard.query(), "");
        assert!(dashboard.search_results().is_empty());

        let frame = dashboard.render().unwrap();
        assert_eq!(frame.active.features.len(), 2);
        assert_eq!(frame.inactive.features.len(), 2);
        assert!(frame.focus_bounds.is_some());
        assert!(frame.view.markers && !frame.view.heatmap);

        dashboard.consume_focus();
        let frame = dashboard.render().unwrap();
        assert!(frame.focus_bounds.is_none());
        assert_eq!(frame.highlight.features.len(), 2);

        dashboard.clear_search();
        let frame = dashboard.render().unwrap();
        assert_eq!(frame.active.features.len(), 4);
        assert!(frame.highlight.features.is_empty());
        assert!(frame.view.heatmap);
    }

    #[tokio::test]
    async fn unknown_vessel_is_not_selected() {
        let mut dashboard = loaded().await;
        dashboard.set_query("abc");
        assert!(!dashboard.select_vessel(&VesselKey::new(None, Some("Ghost"))));
        assert_eq!(dashboard.query(), "abc");
        assert!(!dashboard.selection().is_scoped());
    }

    #[tokio::test]
    async fn popup_for_loaded_incident() {
        let dashboard = loaded().await;
        let popup = dashboard.popup(0).unwrap();
        assert_eq!(popup.title, "Ocean Star");
        assert_eq!(popup.details, "Engine room fire");
        assert!(dashboard.popup(99).is_none());
    }

    #[test]
    fn load_phase_names() {
        assert_eq!(LoadPhase::Loading.to_string(), "loading");
        assert_eq!(LoadPhase::Failed("x".to_string()).as_ref(), "failed");
    }
}
