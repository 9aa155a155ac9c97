// waymark_sim/src/simulation/plugins/observer/mod.rs

//! The scripted user: walks to the route start, then along the route.
//!
//! The simulated AR session frame is ENU with its origin at the route start,
//! so the walker's pose doubles as the ground truth every simulated sensor
//! samples from.

use crate::prelude::*;
use crate::simulation::core::transforms::observer_camera_transform;
use crate::simulation::plugins::navigation::ActiveSession;
use nalgebra::{Isometry3, Point3, Translation3, UnitQuaternion, Vector3};
use waymark_core::geo::bearing_deg;
use waymark_core::view::observer_forward;

/// Marks the camera that renders what the observer sees.
#[derive(Component)]
pub struct ObserverCamera;

#[derive(Resource, Debug, Clone)]
pub struct WalkingObserver {
    /// Feet position in the session frame.
    position: Point3<f64>,
    yaw_rad: f64,
    eye_height: f64,
    speed: f64,
    waypoints: Vec<Point3<f64>>,
    next_waypoint: usize,
    view: ObserverView,
}

impl WalkingObserver {
    pub fn new(config: &ScenarioConfig) -> Self {
        let projector = GeoProjector::new(config.route.start, 0.0);
        let ground = config.world.ground_height_m;
        let waypoints = std::iter::once(config.route.start)
            .chain(config.route.waypoints.iter().copied())
            .chain(std::iter::once(config.route.destination))
            .map(|point| {
                let local = projector.to_local(&point);
                Point3::new(local.x, local.y, ground)
            })
            .collect();

        let [east, north] = config.observer.start_offset_m;
        Self {
            position: Point3::new(east, north, ground),
            // Compass heading is clockwise from north, yaw is counter-clockwise from east.
            yaw_rad: (90.0 - config.observer.start_heading_deg).to_radians(),
            eye_height: config.observer.eye_height_m,
            speed: config.observer.walk_speed_mps,
            waypoints,
            next_waypoint: 0,
            view: config.observer.view,
        }
    }

    /// Camera pose in the session frame, FLU body.
    pub fn pose(&self) -> Isometry3<f64> {
        Isometry3::from_parts(
            Translation3::new(self.position.x, self.position.y, self.position.z + self.eye_height),
            UnitQuaternion::from_axis_angle(&Vector3::z_axis(), self.yaw_rad),
        )
    }

    pub fn position(&self) -> Point3<f64> {
        self.position
    }

    pub fn view(&self) -> ObserverView {
        self.view
    }

    /// True compass heading of the observer's facing, in [0, 360).
    pub fn heading_deg(&self) -> f64 {
        bearing_deg(&observer_forward(&self.pose())).rem_euclid(360.0)
    }

    pub fn has_arrived(&self) -> bool {
        self.next_waypoint >= self.waypoints.len()
    }

    /// Moves toward the next waypoint(s) for `dt` seconds, turning to face
    /// the direction of travel.
    pub fn walk(&mut self, dt: f64) {
        let mut budget = self.speed * dt.max(0.0);
        while budget > 0.0 {
            let Some(target) = self.waypoints.get(self.next_waypoint).copied() else {
                return;
            };
            let to_target = target - self.position;
            let distance = to_target.norm();
            if distance > 1e-9 {
                self.yaw_rad = to_target.y.atan2(to_target.x);
            }
            if distance <= budget {
                self.position = target;
                self.next_waypoint += 1;
                budget -= distance;
            } else {
                self.position += to_target * (budget / distance);
                budget = 0.0;
            }
        }
    }
}

pub struct ObserverPlugin;

impl Plugin for ObserverPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(
            OnEnter(AppState::SceneBuilding),
            spawn_observer.in_set(SceneBuildSet::Observer),
        )
        .add_systems(
            FixedUpdate,
            (
                walk_observer_system.in_set(SimulationSet::Observer),
                sync_observer_camera.in_set(SimulationSet::Presentation),
            ),
        );
    }
}

fn spawn_observer(mut commands: Commands, config: Res<ScenarioConfig>) {
    let observer = WalkingObserver::new(&config);
    info!(
        "[SPAWN] Observer at ({:.1}, {:.1}) with {} route waypoints",
        observer.position.x,
        observer.position.y,
        observer.waypoints.len()
    );
    commands.insert_resource(observer);
}

/// Walks only once the session wants the user to move: toward the start
/// while waiting there, along the route while navigating.
fn walk_observer_system(
    time: Res<Time>,
    session: Option<Res<ActiveSession>>,
    mut observer: ResMut<WalkingObserver>,
) {
    let Some(session) = session else {
        return;
    };
    let stage = session.0.stage();
    if stage == SessionStage::WaitingAtPathStart || stage.is_navigating() {
        let was_arrived = observer.has_arrived();
        observer.walk(time.delta_secs_f64());
        if observer.has_arrived() && !was_arrived {
            info!("[OBSERVER] Reached the destination.");
        }
    }
}

fn sync_observer_camera(
    observer: Res<WalkingObserver>,
    mut cameras: Query<&mut Transform, With<ObserverCamera>>,
) {
    let camera_transform = observer_camera_transform(&observer.pose());
    for mut transform in &mut cameras {
        *transform = camera_transform;
    }
}
