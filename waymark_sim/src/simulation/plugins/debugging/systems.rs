use bevy::prelude::*;

use super::components::{DebugOverlay, SnapshotTimer};
use crate::prelude::*;
use crate::simulation::core::transforms::enu_vector_to_bevy_vector;
use crate::simulation::plugins::navigation::scene_bridge::MarkerRegistry;
use crate::simulation::plugins::navigation::ActiveSession;
use crate::simulation::plugins::routing::SimulatedRouter;

const PATH_COLOR: Color = Color::srgb(1.0, 0.85, 0.1);
const GUIDANCE_ON_SCREEN: Color = Color::srgb(0.2, 0.9, 0.3);
const GUIDANCE_OFF_SCREEN: Color = Color::srgb(0.95, 0.3, 0.9);
// Lifts the overlay off the ground so it does not z-fight with the surface.
const OVERLAY_LIFT_M: f32 = 0.02;

pub fn setup_snapshot_timer(mut commands: Commands, config: Res<ScenarioConfig>) {
    let interval = config.simulation.snapshot_interval_secs.max(0.1);
    commands.insert_resource(SnapshotTimer(Timer::from_seconds(
        interval as f32,
        TimerMode::Repeating,
    )));
}

// =========================================================================
// == Toggle Systems (Hotkeys) ==
// =========================================================================

/// Toggles the path overlay with the G key.
pub fn toggle_path_overlay(
    keyboard: Option<Res<ButtonInput<KeyCode>>>,
    mut overlay: ResMut<DebugOverlay>,
) {
    let Some(keyboard) = keyboard else {
        return;
    };
    if keyboard.just_pressed(KeyCode::KeyG) {
        overlay.show_path = !overlay.show_path;
        info!(
            "[Debug] Toggled path overlay {}",
            if overlay.show_path { "ON" } else { "OFF" }
        );
    }
}

// =========================================================================
// == Drawing and Logging Systems ==
// =========================================================================

/// Draws the densified path as a line strip, with the tracked vertex marked.
pub fn draw_path_overlay(
    mut gizmos: Gizmos,
    overlay: Res<DebugOverlay>,
    session: Option<Res<ActiveSession>>,
) {
    if !overlay.show_path {
        return;
    }
    let Some(session) = session else {
        return;
    };
    let Some(path) = session.0.path() else {
        return;
    };

    let lift = Vec3::Y * OVERLAY_LIFT_M;
    gizmos.linestrip(
        path.vertices()
            .iter()
            .map(|vertex| enu_vector_to_bevy_vector(&vertex.local_position.coords) + lift),
        PATH_COLOR,
    );

    if let Some(vertex) = session.0.closest_index().and_then(|i| path.get(i)) {
        let position = enu_vector_to_bevy_vector(&vertex.local_position.coords) + lift;
        gizmos.sphere(Isometry3d::from_translation(position), 0.3, PATH_COLOR);
    }
}

/// A line from the observer to the current guidance target, colored by
/// whether the target is on screen.
pub fn draw_guidance_overlay(
    mut gizmos: Gizmos,
    overlay: Res<DebugOverlay>,
    session: Option<Res<ActiveSession>>,
    observer: Res<WalkingObserver>,
) {
    if !overlay.show_path {
        return;
    }
    let Some(guidance) = session.and_then(|s| s.0.guidance()) else {
        return;
    };
    let color = match guidance {
        GuidanceTarget::OnScreen { .. } => GUIDANCE_ON_SCREEN,
        GuidanceTarget::OffScreen { .. } => GUIDANCE_OFF_SCREEN,
    };
    let from = enu_vector_to_bevy_vector(&observer.position().coords);
    let to = enu_vector_to_bevy_vector(&guidance.target().coords);
    gizmos.line(from, to, color);
}

/// Periodically logs the session snapshot alongside the simulated services.
pub fn log_session_snapshot(
    time: Res<Time>,
    timer: Option<ResMut<SnapshotTimer>>,
    session: Option<Res<ActiveSession>>,
    router: Option<Res<SimulatedRouter>>,
    registry: Res<MarkerRegistry>,
) {
    let (Some(mut timer), Some(session)) = (timer, session) else {
        return;
    };
    if !timer.0.tick(time.delta()).just_finished() {
        return;
    }

    info!("[SNAPSHOT] {}", session.0.snapshot());
    let guidance = match session.0.guidance() {
        Some(GuidanceTarget::OnScreen { .. }) => "on screen".to_string(),
        Some(GuidanceTarget::OffScreen { angle_rad, .. }) => {
            format!("off screen at {:.0} deg", angle_rad.to_degrees())
        }
        None => "none".to_string(),
    };
    debug!(
        "[SNAPSHOT] {} marker entities | router busy: {} | guidance: {}",
        registry.len(),
        router.is_some_and(|r| r.is_busy()),
        guidance
    );
}
