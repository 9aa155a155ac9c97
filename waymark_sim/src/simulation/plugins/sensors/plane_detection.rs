use bevy::prelude::*;
use nalgebra::{Isometry3, Point3, Translation3, UnitQuaternion};

use crate::prelude::*;
use waymark_core::interfaces::{GroundPlaneSource, PlaneAlignment, PlaneObservation, PlaneTracking};

const GROUND_PLANE_ID: u64 = 1;

/// The simulated plane detector. After a configurable delay it reports one
/// upward-facing plane at ground height, centered where the observer stood
/// when it was found, whose area keeps growing as more of it is "seen".
#[derive(Resource, Debug)]
pub struct SimulatedPlanes {
    detect_after_secs: Option<f64>,
    area_growth_m2_per_sec: f64,
    ground_height: f64,
    elapsed: f64,
    ground: Option<PlaneObservation>,
    locked: bool,
}

impl SimulatedPlanes {
    pub fn new(config: &PlaneDetectionConfig, ground_height: f64) -> Self {
        Self {
            detect_after_secs: config.detect_after_secs,
            area_growth_m2_per_sec: config.area_growth_m2_per_sec.max(0.0),
            ground_height,
            elapsed: 0.0,
            ground: None,
            locked: false,
        }
    }

    pub fn update(&mut self, dt: f64, observer_position: &Point3<f64>) {
        self.elapsed += dt;
        let Some(delay) = self.detect_after_secs else {
            return;
        };
        if self.elapsed < delay {
            return;
        }
        let area = self.area_growth_m2_per_sec * (self.elapsed - delay);
        match self.ground.as_mut() {
            Some(plane) => plane.area_m2 = area,
            None => {
                info!("[PLANES] Ground plane found after {:.1}s", self.elapsed);
                self.ground = Some(PlaneObservation {
                    id: GROUND_PLANE_ID,
                    alignment: PlaneAlignment::HorizontalUp,
                    tracking: PlaneTracking::Tracking,
                    area_m2: area,
                    pose: Isometry3::from_parts(
                        Translation3::new(observer_position.x, observer_position.y, self.ground_height),
                        UnitQuaternion::identity(),
                    ),
                });
            }
        }
    }

    pub fn is_locked(&self) -> bool {
        self.locked
    }

    /// Marks the plane as the session's ground. Called when the session
    /// reports having locked onto it.
    pub fn mark_locked(&mut self) {
        self.locked = self.ground.is_some();
    }
}

impl GroundPlaneSource for SimulatedPlanes {
    fn planes(&self) -> Vec<PlaneObservation> {
        self.ground.iter().cloned().collect()
    }

    fn release_lock(&mut self, id: u64) {
        if id == GROUND_PLANE_ID && self.locked {
            info!("[PLANES] Ground plane {} released", id);
        }
        self.locked = false;
    }
}

pub struct PlaneDetectionPlugin;

impl Plugin for PlaneDetectionPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(
            OnEnter(AppState::SceneBuilding),
            spawn_plane_detector.in_set(SceneBuildSet::Services),
        )
        .add_systems(
            FixedUpdate,
            plane_detection_system.in_set(SimulationSet::Sensors),
        );
    }
}

fn spawn_plane_detector(mut commands: Commands, config: Res<ScenarioConfig>) {
    match config.sensors.planes.detect_after_secs {
        Some(delay) => info!("  -> Starting plane detection, ground appears after {:.1}s", delay),
        None => warn!("  -> Plane detection will never find the ground."),
    }
    commands.insert_resource(SimulatedPlanes::new(
        &config.sensors.planes,
        config.world.ground_height_m,
    ));
}

fn plane_detection_system(
    time: Res<Time>,
    observer: Res<WalkingObserver>,
    mut planes: ResMut<SimulatedPlanes>,
) {
    planes.update(time.delta_secs_f64(), &observer.position());
}
