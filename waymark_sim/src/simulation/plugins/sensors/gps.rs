use bevy::prelude::*;
use nalgebra::{Point3, Vector3};
use rand::Rng;
use rand_distr::StandardNormal;

// --- Simulation Crate Imports ---
use crate::prelude::*;

// --- Core Library Imports ---
use waymark_core::interfaces::{LocationSource, LocationStatus};

// =========================================================================
// == GPS Resource & Plugin ==
// =========================================================================

/// The simulated location service. Samples the walker's true position,
/// converts it to geographic coordinates and adds horizontal noise.
#[derive(Resource, Debug)]
pub struct SimulatedGps {
    status: LocationStatus,
    fix: Option<GeoPoint>,
    projector: GeoProjector,
    warmup_remaining: f64,
    noise_stddev_m: f64,
    timer: Timer,
}

impl SimulatedGps {
    pub fn new(config: &GpsConfig, origin: GeoPoint) -> Self {
        let status = if config.fail {
            LocationStatus::Failed
        } else {
            LocationStatus::Initializing
        };
        Self {
            status,
            fix: None,
            projector: GeoProjector::new(origin, 0.0),
            warmup_remaining: config.warmup_secs.max(0.0),
            noise_stddev_m: config.noise_stddev_m.max(0.0),
            timer: Timer::from_seconds(1.0 / config.rate_hz.max(0.01) as f32, TimerMode::Repeating),
        }
    }

    /// Advances the service by `dt`, producing a fix from `true_position` when due.
    pub fn update(&mut self, dt: f64, true_position: &Point3<f64>, rng: &mut impl Rng) {
        match self.status {
            LocationStatus::Failed | LocationStatus::Stopped => return,
            LocationStatus::Initializing => {
                self.warmup_remaining -= dt;
                if self.warmup_remaining > 0.0 {
                    return;
                }
                info!("[GPS] Location service running.");
                self.status = LocationStatus::Running;
                self.sample(true_position, rng);
            }
            LocationStatus::Running => {
                self.timer.tick(std::time::Duration::from_secs_f64(dt));
                if self.timer.just_finished() {
                    self.sample(true_position, rng);
                }
            }
        }
    }

    fn sample(&mut self, true_position: &Point3<f64>, rng: &mut impl Rng) {
        let east: f64 = rng.sample(StandardNormal);
        let north: f64 = rng.sample(StandardNormal);
        let noisy = true_position + Vector3::new(east, north, 0.0) * self.noise_stddev_m;
        self.fix = Some(self.projector.to_geo(&noisy));
    }
}

impl LocationSource for SimulatedGps {
    fn status(&self) -> LocationStatus {
        self.status
    }

    fn last_fix(&self) -> Option<GeoPoint> {
        self.fix
    }
}

pub struct GpsPlugin;

impl Plugin for GpsPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(
            OnEnter(AppState::SceneBuilding),
            spawn_gps.in_set(SceneBuildSet::Services),
        )
        .add_systems(
            FixedUpdate,
            gps_sensor_system.in_set(SimulationSet::Sensors),
        );
    }
}

// =========================================================================
// == Spawning System ==
// =========================================================================

fn spawn_gps(mut commands: Commands, config: Res<ScenarioConfig>) {
    let gps_config = &config.sensors.gps;
    info!(
        "  -> Starting GPS: warmup {:.1}s, {:.1} Hz, noise {:.1}m{}",
        gps_config.warmup_secs,
        gps_config.rate_hz,
        gps_config.noise_stddev_m,
        if gps_config.fail { " (failing)" } else { "" }
    );
    commands.insert_resource(SimulatedGps::new(gps_config, config.route.start));
}

// =========================================================================
// == Runtime System ==
// =========================================================================

fn gps_sensor_system(
    time: Res<Time>,
    observer: Res<WalkingObserver>,
    mut gps: ResMut<SimulatedGps>,
    mut rng: ResMut<SimulationRng>,
) {
    gps.update(time.delta_secs_f64(), &observer.position(), &mut rng.0);
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    #[test]
    fn reports_initializing_until_warmup_elapses() {
        let config = GpsConfig {
            warmup_secs: 2.0,
            noise_stddev_m: 0.0,
            ..GpsConfig::default()
        };
        let mut gps = SimulatedGps::new(&config, GeoPoint::new(10.0, 20.0));
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let position = Point3::new(0.0, 111.32, 0.0);

        gps.update(1.5, &position, &mut rng);
        assert_eq!(gps.status(), LocationStatus::Initializing);
        assert!(gps.last_fix().is_none());

        gps.update(1.0, &position, &mut rng);
        assert_eq!(gps.status(), LocationStatus::Running);
        let fix = gps.last_fix().unwrap();
        assert_abs_diff_eq!(fix.latitude, 10.001, epsilon = 1e-9);
        assert_abs_diff_eq!(fix.longitude, 20.0, epsilon = 1e-9);
    }

    #[test]
    fn failing_service_never_produces_a_fix() {
        let config = GpsConfig {
            fail: true,
            ..GpsConfig::default()
        };
        let mut gps = SimulatedGps::new(&config, GeoPoint::new(0.0, 0.0));
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        gps.update(60.0, &Point3::origin(), &mut rng);
        assert_eq!(gps.status(), LocationStatus::Failed);
        assert!(gps.last_fix().is_none());
    }
}
