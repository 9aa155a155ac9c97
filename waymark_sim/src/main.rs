// waymark_sim/src/main.rs

//! Runs one simulated navigation session.
//!
//! `cargo run -p waymark_sim -- --scenario assets/scenarios/00_city_walk.toml`
//! `cargo run -p waymark_sim -- --headless --offline`

use avian3d::prelude::*;
use bevy::{
    app::ScheduleRunnerPlugin,
    log::LogPlugin,
    prelude::*,
    render::{settings::WgpuSettings, RenderPlugin},
    window::ExitCondition,
    winit::WinitPlugin,
};
use clap::Parser;
use std::time::Duration;

use waymark_sim::cli::Cli;
use waymark_sim::WaymarkSimulationPlugin;

fn main() -> AppExit {
    let cli = Cli::parse();

    let log_plugin = LogPlugin {
        level: bevy::log::Level::INFO,
        // A good filter for focusing on our crate's logs during development.
        filter: "info,wgpu_core=error,wgpu_hal=error,waymark_sim=debug,waymark_core=info"
            .to_string(),
        ..default()
    };

    let mut app = App::new();

    if cli.headless {
        // No window and no GPU. Assets and transforms still run so the
        // physics world and the scene bridge behave exactly as with a window.
        app.add_plugins(
            DefaultPlugins
                .set(log_plugin)
                .set(WindowPlugin {
                    primary_window: None,
                    exit_condition: ExitCondition::DontExit,
                    ..default()
                })
                .set(RenderPlugin {
                    render_creation: WgpuSettings {
                        backends: None,
                        ..default()
                    }
                    .into(),
                    ..default()
                })
                .disable::<WinitPlugin>()
                .add(ScheduleRunnerPlugin::run_loop(Duration::from_secs_f64(
                    1.0 / 120.0,
                ))),
        );
    } else {
        app.add_plugins(DefaultPlugins.set(log_plugin));
    }

    app
        // The Avian3D physics plugins, used for the ground collider and raycasts.
        .add_plugins(PhysicsPlugins::default())
        .insert_resource(cli);

    // This single line brings in the whole simulation: config loading, the
    // simulated platform services and the navigation session itself.
    app.add_plugins(WaymarkSimulationPlugin);

    info!("Starting Waymark Simulation...");
    app.run()
}
