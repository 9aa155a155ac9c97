//! Configuration for a navigation session.
//!
//! Every field has a serde default so a scenario file only needs to name
//! what it overrides. `NavigationConfig::validate` is called once when a
//! session is created; nothing downstream re-checks these values.

use crate::error::{Result, WaymarkError};
use serde::{Deserialize, Serialize};

/// Main configuration structure
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct NavigationConfig {
    #[serde(default)]
    pub path: PathConfig,
    #[serde(default)]
    pub tracking: TrackingConfig,
    #[serde(default)]
    pub markers: MarkerConfig,
    #[serde(default)]
    pub acquisition: AcquisitionConfig,
    #[serde(default)]
    pub announcer: AnnouncerConfig,
}

/// Densification settings
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PathConfig {
    /// Target spacing between path vertices in meters, must exceed 0.1 (default: 10.0)
    #[serde(default = "default_spacing")]
    pub spacing_m: f64,

    /// Longest route the densifier is expected to handle in meters (default: 20000.0).
    /// Bounds the number of vertices emitted for any single segment.
    #[serde(default = "default_max_route_length")]
    pub max_route_length_m: f64,
}

/// Progress tracking and visibility window settings
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TrackingConfig {
    /// Vertices searched behind the last closest index (default: 5)
    #[serde(default = "default_look_back")]
    pub look_back: usize,

    /// Vertices searched ahead of the last closest index (default: 20)
    #[serde(default = "default_look_ahead")]
    pub look_ahead: usize,

    /// Path distance kept visible behind the observer in meters (default: 10.0)
    #[serde(default = "default_behind_distance")]
    pub behind_distance_m: f64,

    /// Path distance kept visible ahead of the observer in meters (default: 50.0)
    #[serde(default = "default_ahead_distance")]
    pub ahead_distance_m: f64,

    /// Observer displacement that triggers a window recomputation in meters (default: 2.0)
    #[serde(default = "default_update_threshold")]
    pub update_threshold_m: f64,
}

/// Marker pool and visual settings
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MarkerConfig {
    /// Number of pre-allocated markers (default: 20)
    #[serde(default = "default_pool_size")]
    pub pool_size: usize,

    /// Uniform scale of a marker at or below the near distance (default: 1.0)
    #[serde(default = "default_base_scale")]
    pub base_scale: f64,

    /// Offset of the marker along its anchor's up axis in meters (default: 0.1)
    #[serde(default = "default_height_offset")]
    pub height_offset_m: f64,

    /// Distance at which markers start growing in meters (default: 5.0)
    #[serde(default = "default_near_scale_distance")]
    pub near_scale_distance_m: f64,

    /// Distance at which markers reach the far multiplier in meters (default: 50.0)
    #[serde(default = "default_far_scale_distance")]
    pub far_scale_distance_m: f64,

    /// Scale multiplier applied at and beyond the far distance (default: 2.0)
    #[serde(default = "default_far_scale_multiplier")]
    pub far_scale_multiplier: f64,

    /// Assumed ground depth below the observer when the surface probe misses (default: 1.5)
    #[serde(default = "default_fallback_ground_offset")]
    pub fallback_ground_offset_m: f64,
}

/// Acquisition sequence settings
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AcquisitionConfig {
    /// Skip plane detection, heading alignment and waiting at the start (default: false)
    #[serde(default)]
    pub offline_mode: bool,

    /// Location fix timeout in seconds (default: 20.0)
    #[serde(default = "default_location_timeout")]
    pub location_timeout_secs: f64,

    /// Ground plane detection timeout in seconds (default: 30.0)
    #[serde(default = "default_plane_timeout")]
    pub plane_timeout_secs: f64,

    /// Minimum plane area accepted as walkable ground in square meters (default: 0.5)
    #[serde(default = "default_min_plane_area")]
    pub min_plane_area_m2: f64,

    /// Time given to the compass to settle before reading it in seconds (default: 1.0)
    #[serde(default = "default_heading_settle")]
    pub heading_settle_secs: f64,

    /// Cadence of the distance-to-start check in seconds (default: 1.0)
    #[serde(default = "default_start_poll_interval")]
    pub start_poll_interval_secs: f64,

    /// Distance to the first route point that counts as arrived in meters (default: 25.0)
    #[serde(default = "default_start_proximity")]
    pub start_proximity_m: f64,
}

/// Turn-by-turn announcement settings
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AnnouncerConfig {
    /// Announcements start disabled and are toggled at runtime (default: false)
    #[serde(default)]
    pub enabled: bool,

    /// Distance to a maneuver that triggers its announcement in meters (default: 20.0)
    #[serde(default = "default_announce_proximity")]
    pub proximity_m: f64,
}

impl Default for PathConfig {
    fn default() -> Self {
        Self {
            spacing_m: default_spacing(),
            max_route_length_m: default_max_route_length(),
        }
    }
}

impl Default for TrackingConfig {
    fn default() -> Self {
        Self {
            look_back: default_look_back(),
            look_ahead: default_look_ahead(),
            behind_distance_m: default_behind_distance(),
            ahead_distance_m: default_ahead_distance(),
            update_threshold_m: default_update_threshold(),
        }
    }
}

impl Default for MarkerConfig {
    fn default() -> Self {
        Self {
            pool_size: default_pool_size(),
            base_scale: default_base_scale(),
            height_offset_m: default_height_offset(),
            near_scale_distance_m: default_near_scale_distance(),
            far_scale_distance_m: default_far_scale_distance(),
            far_scale_multiplier: default_far_scale_multiplier(),
            fallback_ground_offset_m: default_fallback_ground_offset(),
        }
    }
}

impl Default for AcquisitionConfig {
    fn default() -> Self {
        Self {
            offline_mode: false,
            location_timeout_secs: default_location_timeout(),
            plane_timeout_secs: default_plane_timeout(),
            min_plane_area_m2: default_min_plane_area(),
            heading_settle_secs: default_heading_settle(),
            start_poll_interval_secs: default_start_poll_interval(),
            start_proximity_m: default_start_proximity(),
        }
    }
}

impl Default for AnnouncerConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            proximity_m: default_announce_proximity(),
        }
    }
}

// Default value functions
pub(crate) fn default_spacing() -> f64 {
    10.0
}
fn default_max_route_length() -> f64 {
    20_000.0
}
fn default_look_back() -> usize {
    5
}
fn default_look_ahead() -> usize {
    20
}
fn default_behind_distance() -> f64 {
    10.0
}
fn default_ahead_distance() -> f64 {
    50.0
}
fn default_update_threshold() -> f64 {
    2.0
}
fn default_pool_size() -> usize {
    20
}
fn default_base_scale() -> f64 {
    1.0
}
fn default_height_offset() -> f64 {
    0.1
}
fn default_near_scale_distance() -> f64 {
    5.0
}
fn default_far_scale_distance() -> f64 {
    50.0
}
fn default_far_scale_multiplier() -> f64 {
    2.0
}
fn default_fallback_ground_offset() -> f64 {
    1.5
}
fn default_location_timeout() -> f64 {
    20.0
}
fn default_plane_timeout() -> f64 {
    30.0
}
fn default_min_plane_area() -> f64 {
    0.5
}
fn default_heading_settle() -> f64 {
    1.0
}
fn default_start_poll_interval() -> f64 {
    1.0
}
fn default_start_proximity() -> f64 {
    25.0
}
fn default_announce_proximity() -> f64 {
    20.0
}

impl NavigationConfig {
    /// Checks every value the session relies on. Spacing is the one exception:
    /// a spacing of 0.1 m or less is replaced by the default inside the densifier.
    pub fn validate(&self) -> Result<()> {
        let invalid = |what: &str| Err(WaymarkError::InvalidInput(what.to_string()));

        if !(self.path.max_route_length_m > 0.0) {
            return invalid("path.max_route_length_m must be positive");
        }
        if !(self.tracking.behind_distance_m >= 0.0) || !(self.tracking.ahead_distance_m >= 0.0)
        {
            return invalid("tracking window distances must be non-negative");
        }
        if !(self.tracking.update_threshold_m >= 0.0) {
            return invalid("tracking.update_threshold_m must be non-negative");
        }
        if self.tracking.look_ahead == 0 {
            return invalid("tracking.look_ahead must be at least 1");
        }
        if !(self.markers.base_scale > 0.0) || !(self.markers.far_scale_multiplier > 0.0) {
            return invalid("marker scales must be positive");
        }
        if !(self.markers.far_scale_distance_m > self.markers.near_scale_distance_m) {
            return invalid("markers.far_scale_distance_m must exceed near_scale_distance_m");
        }
        if !(self.acquisition.location_timeout_secs > 0.0)
            || !(self.acquisition.plane_timeout_secs > 0.0)
        {
            return invalid("acquisition timeouts must be positive");
        }
        if !(self.acquisition.start_poll_interval_secs > 0.0) {
            return invalid("acquisition.start_poll_interval_secs must be positive");
        }
        if !(self.acquisition.start_proximity_m >= 0.0)
            || !(self.acquisition.heading_settle_secs >= 0.0)
        {
            return invalid("acquisition distances and settle time must be non-negative");
        }
        if !(self.announcer.proximity_m >= 0.0) {
            return invalid("announcer.proximity_m must be non-negative");
        }
        Ok(())
    }
}
