// waymark_sim/src/simulation/config/structs.rs

//! The scenario file schema. Every section has defaults, so a scenario only
//! needs to name the route and whatever it wants to change.

use bevy::prelude::Resource;
use serde::{Deserialize, Serialize};
use waymark_core::config::NavigationConfig;
use waymark_core::types::{GeoPoint, RoutingProfile};
use waymark_core::view::ObserverView;

/// The root of a scenario file.
#[derive(Resource, Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ScenarioConfig {
    #[serde(default)]
    pub simulation: SimulationConfig,
    #[serde(default)]
    pub world: WorldConfig,
    #[serde(default)]
    pub observer: ObserverConfig,
    #[serde(default)]
    pub route: RouteConfig,
    #[serde(default)]
    pub sensors: SensorsConfig,
    #[serde(default)]
    pub navigation: NavigationConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationConfig {
    /// Seed for every random draw. `None` seeds from entropy.
    #[serde(default)]
    pub seed: Option<u64>,
    /// Simulated seconds before the app exits.
    #[serde(default = "default_duration")]
    pub duration_secs: f64,
    /// Rate of the fixed step the session is ticked on.
    #[serde(default = "default_frame_rate")]
    pub frame_rate_hz: f64,
    /// Seconds between diagnostics snapshots in the log.
    #[serde(default = "default_snapshot_interval")]
    pub snapshot_interval_secs: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorldConfig {
    /// Height of the walkable ground in the session frame.
    #[serde(default)]
    pub ground_height_m: f64,
    /// Half extent of the square ground collider.
    #[serde(default = "default_ground_half_extent")]
    pub ground_half_extent_m: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ObserverConfig {
    /// Camera height above the ground.
    #[serde(default = "default_eye_height")]
    pub eye_height_m: f64,
    #[serde(default = "default_walk_speed")]
    pub walk_speed_mps: f64,
    /// Where the walker starts, [east, north] meters from the route start.
    #[serde(default)]
    pub start_offset_m: [f64; 2],
    /// Initial facing, degrees clockwise from north.
    #[serde(default)]
    pub start_heading_deg: f64,
    #[serde(default)]
    pub view: ObserverView,
}

/// A turn-by-turn step as the routing service would report it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StepConfig {
    pub location: GeoPoint,
    pub instruction: String,
    #[serde(default)]
    pub distance_m: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RouteConfig {
    pub start: GeoPoint,
    pub destination: GeoPoint,
    #[serde(default)]
    pub profile: RoutingProfile,
    /// Intermediate geometry the simulated router returns between start and destination.
    #[serde(default)]
    pub waypoints: Vec<GeoPoint>,
    #[serde(default)]
    pub steps: Vec<StepConfig>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SensorsConfig {
    #[serde(default)]
    pub gps: GpsConfig,
    #[serde(default)]
    pub compass: CompassConfig,
    #[serde(default)]
    pub planes: PlaneDetectionConfig,
    #[serde(default)]
    pub routing: RoutingConfig,
    #[serde(default)]
    pub anchors: AnchorConfig,
    #[serde(default)]
    pub probe: ProbeConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GpsConfig {
    /// Seconds the service reports `Initializing` before its first fix.
    #[serde(default = "default_gps_warmup")]
    pub warmup_secs: f64,
    /// Fixes per second once running.
    #[serde(default = "default_gps_rate")]
    pub rate_hz: f64,
    /// Horizontal noise per axis, in meters.
    #[serde(default = "default_gps_noise")]
    pub noise_stddev_m: f64,
    /// Report `Failed` instead of ever producing a fix.
    #[serde(default)]
    pub fail: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompassConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,
    #[serde(default = "default_compass_noise")]
    pub noise_stddev_deg: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlaneDetectionConfig {
    /// Seconds before the first ground plane shows up. `None` never detects one.
    #[serde(default = "default_plane_delay")]
    pub detect_after_secs: Option<f64>,
    /// How fast the detected plane's area grows once it shows up.
    #[serde(default = "default_plane_growth")]
    pub area_growth_m2_per_sec: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoutingConfig {
    #[serde(default = "default_routing_latency")]
    pub latency_secs: f64,
    /// Fail every request with a backend error.
    #[serde(default)]
    pub fail: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AnchorConfig {
    /// Probability that a single anchor creation fails.
    #[serde(default)]
    pub failure_rate: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProbeConfig {
    #[serde(default = "default_probe_distance")]
    pub max_distance_m: f64,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            seed: None,
            duration_secs: default_duration(),
            frame_rate_hz: default_frame_rate(),
            snapshot_interval_secs: default_snapshot_interval(),
        }
    }
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            ground_height_m: 0.0,
            ground_half_extent_m: default_ground_half_extent(),
        }
    }
}

impl Default for ObserverConfig {
    fn default() -> Self {
        Self {
            eye_height_m: default_eye_height(),
            walk_speed_mps: default_walk_speed(),
            start_offset_m: [0.0, 0.0],
            start_heading_deg: 0.0,
            view: ObserverView::default(),
        }
    }
}

impl Default for GpsConfig {
    fn default() -> Self {
        Self {
            warmup_secs: default_gps_warmup(),
            rate_hz: default_gps_rate(),
            noise_stddev_m: default_gps_noise(),
            fail: false,
        }
    }
}

impl Default for CompassConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            noise_stddev_deg: default_compass_noise(),
        }
    }
}

impl Default for PlaneDetectionConfig {
    fn default() -> Self {
        Self {
            detect_after_secs: default_plane_delay(),
            area_growth_m2_per_sec: default_plane_growth(),
        }
    }
}

impl Default for RoutingConfig {
    fn default() -> Self {
        Self {
            latency_secs: default_routing_latency(),
            fail: false,
        }
    }
}

impl Default for ProbeConfig {
    fn default() -> Self {
        Self {
            max_distance_m: default_probe_distance(),
        }
    }
}

fn default_duration() -> f64 {
    180.0
}
fn default_frame_rate() -> f64 {
    30.0
}
fn default_snapshot_interval() -> f64 {
    5.0
}
fn default_ground_half_extent() -> f64 {
    1000.0
}
fn default_eye_height() -> f64 {
    1.6
}
fn default_walk_speed() -> f64 {
    1.4
}
fn default_true() -> bool {
    true
}
fn default_gps_warmup() -> f64 {
    2.0
}
fn default_gps_rate() -> f64 {
    1.0
}
fn default_gps_noise() -> f64 {
    1.5
}
fn default_compass_noise() -> f64 {
    2.0
}
fn default_plane_delay() -> Option<f64> {
    Some(3.0)
}
fn default_plane_growth() -> f64 {
    0.4
}
fn default_routing_latency() -> f64 {
    1.0
}
fn default_probe_distance() -> f64 {
    100.0
}
