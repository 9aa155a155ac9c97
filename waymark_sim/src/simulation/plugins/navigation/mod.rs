// waymark_sim/src/simulation/plugins/navigation/mod.rs

//! Owns the navigation session and drives it once per fixed step.
//!
//! Each step the simulated services, the physics probe and the entity-backed
//! scene are lent to the session as its collaborators. Whatever it reports
//! back is re-published as [`NavigationEvent`]s.

pub mod scene_bridge;

use crate::prelude::*;
use crate::simulation::plugins::routing::SimulatedRouter;
use crate::simulation::plugins::sensors::compass::SimulatedCompass;
use crate::simulation::plugins::sensors::gps::SimulatedGps;
use crate::simulation::plugins::sensors::plane_detection::SimulatedPlanes;
use crate::simulation::plugins::world::surface_probe::PhysicsSurfaceProbe;
use avian3d::prelude::SpatialQuery;
use scene_bridge::{build_marker_assets, EntityAnchors, EntityScene, MarkerAssets, MarkerRegistry};
use std::cell::RefCell;

/// The one session this simulation runs.
#[derive(Resource)]
pub struct ActiveSession(pub NavigationSession);

/// User requests that need the collaborators and therefore wait for the
/// next session step.
#[derive(Resource, Debug, Default)]
pub struct NavigationControls {
    pub cancel_requested: bool,
}

pub struct NavigationPlugin;

impl Plugin for NavigationPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<NavigationControls>()
            .init_resource::<MarkerRegistry>()
            .add_systems(
                OnEnter(AppState::SceneBuilding),
                (
                    spawn_marker_assets.in_set(SceneBuildSet::Observer),
                    create_session.in_set(SceneBuildSet::Session),
                ),
            )
            .add_systems(
                FixedUpdate,
                (
                    navigation_tick_system.in_set(SimulationSet::Session),
                    react_to_navigation_events.in_set(SimulationSet::Presentation),
                ),
            )
            .add_systems(
                Update,
                navigation_hotkeys.run_if(in_state(AppState::Running)),
            );
    }
}

// =========================================================================
// == Scene Building ==
// =========================================================================

fn spawn_marker_assets(
    mut commands: Commands,
    meshes: Option<ResMut<Assets<Mesh>>>,
    materials: Option<ResMut<Assets<StandardMaterial>>>,
) {
    let (Some(mut meshes), Some(mut materials)) = (meshes, materials) else {
        warn!("[SPAWN] No mesh assets available, markers will be invisible.");
        return;
    };
    commands.insert_resource(build_marker_assets(&mut meshes, &mut materials));
}

fn create_session(
    mut commands: Commands,
    config: Res<ScenarioConfig>,
    mut exit: EventWriter<AppExit>,
) {
    let request = SessionRequest {
        start: config.route.start,
        destination: config.route.destination,
        profile: config.route.profile,
    };
    match NavigationSession::new(config.navigation.clone(), request) {
        Ok(session) => {
            info!(
                "[SPAWN] Navigation session created ({} mode, pool of {})",
                if config.navigation.acquisition.offline_mode {
                    "offline"
                } else {
                    "AR"
                },
                config.navigation.markers.pool_size
            );
            commands.insert_resource(ActiveSession(session));
        }
        Err(e) => {
            error!("Could not create the navigation session: {}", e);
            exit.write(AppExit::from_code(1));
        }
    }
}

// =========================================================================
// == Runtime Systems ==
// =========================================================================

#[allow(clippy::too_many_arguments)]
fn navigation_tick_system(
    commands: Commands,
    time: Res<Time>,
    config: Res<ScenarioConfig>,
    session: Option<ResMut<ActiveSession>>,
    mut controls: ResMut<NavigationControls>,
    observer: Res<WalkingObserver>,
    gps: Res<SimulatedGps>,
    compass: Res<SimulatedCompass>,
    mut planes: ResMut<SimulatedPlanes>,
    mut router: ResMut<SimulatedRouter>,
    mut registry: ResMut<MarkerRegistry>,
    marker_assets: Option<Res<MarkerAssets>>,
    mut rng: ResMut<SimulationRng>,
    spatial_query: SpatialQuery,
    mut writer: EventWriter<NavigationEvent>,
) {
    let Some(mut session) = session else {
        return;
    };

    let frame = FrameInput {
        dt: time.delta_secs_f64(),
        observer: observer.pose(),
        view: observer.view(),
    };

    // Scene objects and anchors both spawn entities, so they share one
    // command buffer.
    let commands = RefCell::new(commands);
    let mut surface =
        PhysicsSurfaceProbe::new(&spatial_query, &frame, config.sensors.probe.max_distance_m);
    let mut scene = EntityScene::new(&commands, &mut registry, marker_assets.as_deref());
    let mut anchors = EntityAnchors::new(
        &commands,
        &mut rng.0,
        config.sensors.anchors.failure_rate,
    );
    let mut collaborators = Collaborators {
        location: &*gps,
        heading: &*compass,
        planes: &mut *planes,
        surface: &mut surface,
        routing: &mut *router,
        scene: &mut scene,
        anchors: &mut anchors,
    };

    let events = if std::mem::take(&mut controls.cancel_requested) {
        info!("[NAV] Cancelling navigation on request.");
        session.0.cancel(&mut collaborators)
    } else {
        session.0.tick(&frame, &mut collaborators)
    };

    if session.0.plane_lock().is_some() && !planes.is_locked() {
        planes.mark_locked();
    }
    writer.write_batch(events.into_iter().map(NavigationEvent));
}

fn react_to_navigation_events(
    mut events: EventReader<NavigationEvent>,
    mut exit: EventWriter<AppExit>,
) {
    for NavigationEvent(event) in events.read() {
        match event {
            SessionEvent::StageChanged { from, to } => {
                info!("[NAV] Stage {} -> {}", from, to);
                if let SessionStage::Aborted(reason) = to {
                    if *reason == FailureReason::Cancelled {
                        exit.write(AppExit::Success);
                    } else {
                        error!("[NAV] Navigation aborted: {}", reason.status_message());
                        exit.write(AppExit::from_code(1));
                    }
                }
            }
            SessionEvent::StatusChanged(status) => {
                info!("[STATUS] {}", status.replace('\n', " "));
            }
            SessionEvent::Announcement(text) => {
                info!("[ANNOUNCE] {}", text);
            }
            SessionEvent::MarkersReconciled(report) => {
                debug!(
                    "[NAV] Markers +{:?} -{:?} failed {:?}",
                    report.spawned, report.despawned, report.failed
                );
            }
        }
    }
}

/// `V` toggles spoken turn announcements, `Escape` cancels navigation.
fn navigation_hotkeys(
    keyboard: Option<Res<ButtonInput<KeyCode>>>,
    session: Option<ResMut<ActiveSession>>,
    mut controls: ResMut<NavigationControls>,
) {
    let (Some(keyboard), Some(mut session)) = (keyboard, session) else {
        return;
    };
    if keyboard.just_pressed(KeyCode::KeyV) {
        let enabled = !session.0.announcements_enabled();
        session.0.set_announcements_enabled(enabled);
    }
    if keyboard.just_pressed(KeyCode::Escape) {
        controls.cancel_requested = true;
    }
}
