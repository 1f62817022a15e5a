#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Selection state and renderer payloads for the casualty map.
//!
//! Nothing here draws. The map layer consumes a [`RenderFrame`] of `GeoJSON`
//! collections and flags, and reports back through
//! [`SelectionState::consume_focus`] once it has animated to a selection.

pub mod features;
pub mod frame;
pub mod popup;
pub mod selection;

pub use features::{feature_collection, incident_feature};
pub use frame::{BoundingBox, RenderFrame, Summary, ViewFlags};
pub use popup::IncidentPopup;
pub use selection::SelectionState;
