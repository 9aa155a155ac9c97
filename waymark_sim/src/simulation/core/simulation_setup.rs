// waymark_sim/src/simulation/core/simulation_setup.rs

use crate::prelude::*;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use std::time::Duration;

pub struct SimulationSetupPlugin;

impl Plugin for SimulationSetupPlugin {
    fn build(&self, app: &mut App) {
        app.init_state::<AppState>()
            .add_event::<NavigationEvent>()
            .configure_sets(
                OnEnter(AppState::SceneBuilding),
                (
                    SceneBuildSet::World,
                    SceneBuildSet::Observer,
                    SceneBuildSet::Services,
                    SceneBuildSet::Session,
                )
                    .chain(), // .chain() enforces the order of the tuples/sets
            )
            .configure_sets(
                FixedUpdate,
                (
                    SimulationSet::Observer,
                    SimulationSet::Sensors,
                    SimulationSet::Session,
                    SimulationSet::Presentation,
                    SimulationSet::Validation,
                )
                    .chain()
                    .run_if(in_state(AppState::Running)),
            )
            .add_systems(
                OnEnter(AppState::SceneBuilding),
                (
                    setup_simulation_clock.in_set(SceneBuildSet::World),
                    transition_to_running.after(SceneBuildSet::Session),
                ),
            )
            .add_systems(
                FixedUpdate,
                end_of_scenario_system.in_set(SimulationSet::Validation),
            );
    }
}

/// Seeds the PRNG and fixes the simulation step from the scenario.
fn setup_simulation_clock(mut commands: Commands, config: Res<ScenarioConfig>) {
    let rng = match config.simulation.seed {
        Some(seed) => {
            info!("[SETUP] Seeding simulation RNG with {}", seed);
            ChaCha8Rng::seed_from_u64(seed)
        }
        None => {
            info!("[SETUP] No seed given, seeding simulation RNG from entropy");
            ChaCha8Rng::from_entropy()
        }
    };
    commands.insert_resource(SimulationRng(rng));

    let rate = config.simulation.frame_rate_hz.max(1.0);
    commands.insert_resource(Time::<Fixed>::from_duration(Duration::from_secs_f64(
        1.0 / rate,
    )));
}

/// Runs once at the end of the `OnEnter(SceneBuilding)` chain.
/// Its only job is to move the app into the main `Running` state.
fn transition_to_running(mut next_state: ResMut<NextState<AppState>>) {
    info!("Scene building complete. Transitioning to Running state.");
    next_state.set(AppState::Running);
}

/// Ends the app once the scenario's duration has run out.
fn end_of_scenario_system(
    time: Res<Time<Fixed>>,
    config: Res<ScenarioConfig>,
    mut exit: EventWriter<AppExit>,
    mut finished: Local<bool>,
) {
    if *finished {
        return;
    }
    if time.elapsed_secs_f64() >= config.simulation.duration_secs {
        info!(
            "[SIM] Scenario finished after {:.1}s of simulated time.",
            time.elapsed_secs_f64()
        );
        *finished = true;
        exit.write(AppExit::Success);
    }
}
