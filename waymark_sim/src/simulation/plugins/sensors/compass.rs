use bevy::prelude::*;
use rand::Rng;
use rand_distr::StandardNormal;

use crate::prelude::*;
use waymark_core::interfaces::HeadingSource;

/// The simulated magnetometer heading. Reads the walker's true facing plus
/// Gaussian noise, or nothing at all on devices without a compass.
#[derive(Resource, Debug)]
pub struct SimulatedCompass {
    enabled: bool,
    noise_stddev_deg: f64,
    reading: Option<f64>,
}

impl SimulatedCompass {
    pub fn new(config: &CompassConfig) -> Self {
        Self {
            enabled: config.enabled,
            noise_stddev_deg: config.noise_stddev_deg.max(0.0),
            reading: None,
        }
    }

    pub fn update(&mut self, true_heading_deg: f64, rng: &mut impl Rng) {
        if !self.enabled {
            return;
        }
        let noise: f64 = rng.sample(StandardNormal);
        self.reading = Some((true_heading_deg + noise * self.noise_stddev_deg).rem_euclid(360.0));
    }
}

impl HeadingSource for SimulatedCompass {
    fn heading_degrees(&self) -> Option<f64> {
        self.reading
    }
}

pub struct CompassPlugin;

impl Plugin for CompassPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(
            OnEnter(AppState::SceneBuilding),
            spawn_compass.in_set(SceneBuildSet::Services),
        )
        .add_systems(
            FixedUpdate,
            compass_sensor_system.in_set(SimulationSet::Sensors),
        );
    }
}

fn spawn_compass(mut commands: Commands, config: Res<ScenarioConfig>) {
    let compass_config = &config.sensors.compass;
    if compass_config.enabled {
        info!(
            "  -> Starting compass with {:.1}° noise",
            compass_config.noise_stddev_deg
        );
    } else {
        warn!("  -> No compass on this device, heading alignment will fall back.");
    }
    commands.insert_resource(SimulatedCompass::new(compass_config));
}

fn compass_sensor_system(
    observer: Res<WalkingObserver>,
    mut compass: ResMut<SimulatedCompass>,
    mut rng: ResMut<SimulationRng>,
) {
    compass.update(observer.heading_deg(), &mut rng.0);
}
