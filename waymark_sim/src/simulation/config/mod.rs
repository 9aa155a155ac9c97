// waymark_sim/src/simulation/config/mod.rs

//! This module handles loading and validating the scenario configuration
//! from disk.

pub mod structs;

use bevy::prelude::*;
use figment::{
    providers::{Format, Serialized, Toml},
    Figment, Provider,
};
use std::path::Path;

use crate::cli::Cli;
use crate::prelude::AppState;
pub use structs::ScenarioConfig;

pub struct ConfigPlugin;

impl Plugin for ConfigPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<ScenarioConfig>()
            .add_systems(OnEnter(AppState::AssetLoading), load_scenario);
    }
}

/// Layers a scenario source over the built-in defaults.
pub fn scenario_figment(source: impl Provider) -> Figment {
    Figment::from(Serialized::defaults(ScenarioConfig::default())).merge(source)
}

/// Reads and validates a scenario TOML file.
pub fn load_scenario_file(path: &Path) -> Result<ScenarioConfig, figment::Error> {
    if !path.is_file() {
        return Err(figment::Error::from(format!(
            "scenario file '{}' does not exist",
            path.display()
        )));
    }
    let config: ScenarioConfig = scenario_figment(Toml::file(path)).extract()?;
    config.validate().map_err(figment::Error::from)?;
    Ok(config)
}

impl ScenarioConfig {
    /// Checks what the simulation itself relies on. The navigation section is
    /// validated by the session when it is created.
    pub fn validate(&self) -> Result<(), String> {
        if !(self.simulation.frame_rate_hz > 0.0) || !(self.simulation.duration_secs > 0.0) {
            return Err("simulation.frame_rate_hz and duration_secs must be positive".to_string());
        }
        if !(self.observer.walk_speed_mps > 0.0) {
            return Err("observer.walk_speed_mps must be positive".to_string());
        }
        if !(0.0..=1.0).contains(&self.sensors.anchors.failure_rate) {
            return Err("sensors.anchors.failure_rate must be within [0, 1]".to_string());
        }
        let route = &self.route;
        let all_finite = route.start.is_finite()
            && route.destination.is_finite()
            && route.waypoints.iter().all(|p| p.is_finite());
        if !all_finite {
            return Err("route coordinates must be finite".to_string());
        }
        Ok(())
    }
}

fn load_scenario(
    mut commands: Commands,
    cli: Res<Cli>,
    mut next_state: ResMut<NextState<AppState>>,
    mut exit: EventWriter<AppExit>,
) {
    info!("Loading scenario from: {}", cli.scenario.display());

    let mut config = match load_scenario_file(&cli.scenario) {
        Ok(config) => config,
        Err(e) => {
            error!("Failed to load scenario file at {}: {}", cli.scenario.display(), e);
            exit.write(AppExit::from_code(1));
            return;
        }
    };

    if cli.offline {
        info!("Offline mode requested on the command line.");
        config.navigation.acquisition.offline_mode = true;
    }

    if cli.dump_config {
        match toml::to_string_pretty(&config) {
            Ok(text) => info!("Resolved scenario:\n{}", text),
            Err(e) => warn!("Could not render the resolved scenario: {}", e),
        }
    }

    commands.insert_resource(config);
    info!("Configuration loading complete. Transitioning to SceneBuilding state.");
    next_state.set(AppState::SceneBuilding);
}

#[cfg(test)]
mod tests {
    use super::*;
    use waymark_core::types::RoutingProfile;

    const SCENARIO: &str = r#"
        [simulation]
        seed = 7
        duration_secs = 60.0

        [route]
        start = { latitude = 47.6062, longitude = -122.3321 }
        destination = { latitude = 47.6072, longitude = -122.3321 }
        profile = "walking"

        [[route.steps]]
        location = { latitude = 47.6062, longitude = -122.3321 }
        instruction = "Head north"
        distance_m = 111.0

        [navigation.markers]
        pool_size = 12

        [navigation.acquisition]
        offline_mode = true
    "#;

    #[test]
    fn partial_scenario_keeps_defaults() {
        let config: ScenarioConfig = scenario_figment(Toml::string(SCENARIO)).extract().unwrap();
        assert_eq!(config.simulation.seed, Some(7));
        assert_eq!(config.simulation.frame_rate_hz, 30.0);
        assert_eq!(config.route.profile, RoutingProfile::Walking);
        assert_eq!(config.route.steps.len(), 1);
        assert_eq!(config.navigation.markers.pool_size, 12);
        assert_eq!(config.navigation.markers.base_scale, 1.0);
        assert!(config.navigation.acquisition.offline_mode);
        assert_eq!(config.navigation.path.spacing_m, 10.0);
        assert_eq!(config.sensors.planes.detect_after_secs, Some(3.0));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn kebab_case_profiles_parse() {
        let toml = r#"
            [route]
            start = { latitude = 0.0, longitude = 0.0 }
            destination = { latitude = 0.001, longitude = 0.0 }
            profile = "driving-traffic"
        "#;
        let config: ScenarioConfig = scenario_figment(Toml::string(toml)).extract().unwrap();
        assert_eq!(config.route.profile, RoutingProfile::DrivingTraffic);
    }

    #[test]
    fn out_of_range_failure_rate_is_rejected() {
        let mut config = ScenarioConfig::default();
        config.sensors.anchors.failure_rate = 1.5;
        assert!(config.validate().is_err());
    }

    #[test]
    fn missing_file_is_an_error() {
        assert!(load_scenario_file(Path::new("does/not/exist.toml")).is_err());
    }

    #[test]
    fn bundled_scenario_loads() {
        let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("assets/scenarios/00_city_walk.toml");
        let config = load_scenario_file(&path).unwrap();
        assert!(config.route.waypoints.len() >= 1);
        assert!(config.navigation.validate().is_ok());
    }
}
