use bevy::prelude::*;

// --- Sub-modules for organization ---
mod components;
mod systems;

pub use components::{DebugOverlay, SnapshotTimer};

use crate::prelude::{AppState, SceneBuildSet, SimulationSet};

/// Path overlays, hotkeys and the periodic session report.
pub struct DebuggingPlugin;

impl Plugin for DebuggingPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<DebugOverlay>()
            .add_systems(
                OnEnter(AppState::SceneBuilding),
                systems::setup_snapshot_timer.in_set(SceneBuildSet::Session),
            )
            .add_systems(
                Update,
                (
                    systems::toggle_path_overlay,
                    systems::draw_path_overlay,
                    systems::draw_guidance_overlay,
                )
                    .run_if(in_state(AppState::Running)),
            )
            // Logged from FixedUpdate so reports line up with session steps.
            .add_systems(
                FixedUpdate,
                systems::log_session_snapshot
                    .in_set(SimulationSet::Validation)
                    .run_if(in_state(AppState::Running)),
            );
    }
}
