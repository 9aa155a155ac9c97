// waymark_sim/src/lib.rs

use bevy::prelude::*;

// Import the plugins defined within the simulation crate.
use crate::simulation::config::ConfigPlugin;
use crate::simulation::core::simulation_setup::SimulationSetupPlugin;
use crate::simulation::plugins::debugging::DebuggingPlugin;
use crate::simulation::plugins::navigation::NavigationPlugin;
use crate::simulation::plugins::observer::ObserverPlugin;
use crate::simulation::plugins::routing::RoutingPlugin;
use crate::simulation::plugins::sensors::compass::CompassPlugin;
use crate::simulation::plugins::sensors::gps::GpsPlugin;
use crate::simulation::plugins::sensors::plane_detection::PlaneDetectionPlugin;
use crate::simulation::plugins::world::spawner::WorldSpawnerPlugin;

// This prelude is for convenience for other files WITHIN the waymark_sim crate.
pub mod prelude;

// This module contains all the simulation-specific logic.
pub mod cli;
pub mod simulation;

/// The main plugin that brings together all the simulation parts.
/// `main.rs` only adds this one plugin to the Bevy App.
pub struct WaymarkSimulationPlugin;

impl Plugin for WaymarkSimulationPlugin {
    fn build(&self, app: &mut App) {
        app.add_plugins((
            // Loads the scenario file and moves the app into SceneBuilding.
            ConfigPlugin,
            // States, schedules and the seeded PRNG.
            SimulationSetupPlugin,
            // Spawns the ground collider, lighting, camera.
            WorldSpawnerPlugin,
            // The scripted walker that plays the user.
            ObserverPlugin,
            // Simulated platform services
            GpsPlugin,
            CompassPlugin,
            PlaneDetectionPlugin,
            RoutingPlugin,
            // The navigation session and its scene bridge.
            NavigationPlugin,
            DebuggingPlugin,
        ));
    }
}
