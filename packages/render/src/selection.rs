//! Vessel selection state.
//!
//! Two independent pieces of state with different lifetimes:
//!
//! * the **focus pulse** (`active_group` + `focus_pulse`): raised by
//!   [`SelectionState::select`], consumed once the map has animated to the
//!   group, so re-selecting the same vessel animates again
//! * the **search scope**: kept until [`SelectionState::clear`]; while it is
//!   set, unrelated incidents are dimmed and markers are forced on

use std::collections::BTreeSet;

use casualty_map_incident_models::Incident;

/// Selection and highlight state for the map.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SelectionState {
    active_group: Vec<usize>,
    focus_pulse: bool,
    search_scope: BTreeSet<usize>,
}

impl SelectionState {
    /// Creates an empty selection.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            active_group: Vec::new(),
            focus_pulse: false,
            search_scope: BTreeSet::new(),
        }
    }

    /// Selects a vessel's incident group: sets the active group and the
    /// search scope, and raises the focus pulse. An empty group is ignored.
    pub fn select<'a, I>(&mut self, group: I)
    where
        I: IntoIterator<Item = &'a Incident>,
    {
        let ids: Vec<usize> = group.into_iter().map(|i| i.id).collect();
        if ids.is_empty() {
            log::debug!("Ignoring selection of an empty vessel group");
            return;
        }

        self.search_scope = ids.iter().copied().collect();
        self.active_group = ids;
        self.focus_pulse = true;
    }

    /// Marks the focus animation as done. Clears the active group and the
    /// pulse; the search scope stays.
    pub fn consume_focus(&mut self) {
        self.active_group.clear();
        self.focus_pulse = false;
    }

    /// Drops the selection entirely.
    pub fn clear(&mut self) {
        self.active_group.clear();
        self.focus_pulse = false;
        self.search_scope.clear();
    }

    /// Ids of the group awaiting focus, empty once consumed.
    #[must_use]
    pub fn active_group(&self) -> &[usize] {
        &self.active_group
    }

    /// Whether the renderer should animate to [`Self::active_group`].
    #[must_use]
    pub const fn focus_pending(&self) -> bool {
        self.focus_pulse
    }

    /// Ids of the incidents in the search scope.
    #[must_use]
    pub const fn search_scope(&self) -> &BTreeSet<usize> {
        &self.search_scope
    }

    /// Whether a vessel search is currently scoping the view.
    #[must_use]
    pub fn is_scoped(&self) -> bool {
        !self.search_scope.is_empty()
    }

    /// Whether `incident` is part of the search scope.
    #[must_use]
    pub fn in_scope(&self, incident: &Incident) -> bool {
        self.search_scope.contains(&incident.id)
    }

    /// Filtered incidents outside the search scope, rendered dimmed. Empty
    /// when no search is active.
    #[must_use]
    pub fn dimmed<'a>(&self, filtered: &[&'a Incident]) -> Vec<&'a Incident> {
        if !self.is_scoped() {
            return Vec::new();
        }
        filtered
            .iter()
            .copied()
            .filter(|i| !self.in_scope(i))
            .collect()
    }

    /// Resolves the search scope against the collection.
    #[must_use]
    pub fn scoped<'a>(&self, incidents: &'a [Incident]) -> Vec<&'a Incident> {
        resolve(&self.search_scope, incidents)
    }

    /// Resolves the pending focus group against the collection.
    #[must_use]
    pub fn focused<'a>(&self, incidents: &'a [Incident]) -> Vec<&'a Incident> {
        resolve(&self.active_group, incidents)
    }
}

fn resolve<'a, 'b>(
    ids: impl IntoIterator<Item = &'b usize>,
    incidents: &'a [Incident],
) -> Vec<&'a Incident> {
    ids.into_iter()
        .filter_map(|&id| incidents.get(id).filter(|i| i.id == id))
        .collect()
}
