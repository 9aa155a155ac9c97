// src/simulation/core/app_state.rs

use bevy::{ecs::schedule::SystemSet, prelude::States};

/// Defines the major phases of the application's lifecycle.
#[derive(States, Debug, Clone, Eq, PartialEq, Hash, Default)]
pub enum AppState {
    /// The initial state. The scenario file is read here.
    #[default]
    AssetLoading,

    /// The scenario is loaded. We are now spawning the world, the observer and
    /// the simulated services, then creating the session.
    SceneBuilding,

    /// The scene is built. The session is ticked every fixed step.
    Running,
}

/// System sets to control the order of execution during the SceneBuilding state.
#[derive(SystemSet, Debug, Clone, PartialEq, Eq, Hash)]
pub enum SceneBuildSet {
    /// Pass 1: Ground, lighting, camera.
    World,

    /// Pass 2: The walking observer and the marker assets.
    Observer,

    /// Pass 3: Simulated platform services (GPS, compass, planes, routing).
    Services,

    /// Pass 4: The navigation session, once everything it talks to exists.
    Session,
}

// =========================================================================
// == Main Simulation Sets (The per-step data flow) ==
// =========================================================================

#[derive(SystemSet, Debug, Clone, PartialEq, Eq, Hash)]
pub enum SimulationSet {
    /// The scripted walker moves the observer. Runs first.
    Observer,

    /// Simulated services sample the observer's ground truth.
    Sensors,

    /// The navigation session is ticked once.
    Session,

    /// Reacting to session events and syncing the camera.
    Presentation,

    /// Diagnostics and exit checks. Runs last.
    Validation,
}
