// waymark_sim/src/prelude.rs

// Re-export the entire Bevy prelude for convenience.
pub use bevy::prelude::*;

// Re-export the entire waymark_core prelude so you can easily access
// pure types like `GeoPoint`, `NavigationSession`, `SessionEvent`, etc.
pub use waymark_core::prelude::*;

// Re-export common simulation-specific types for easy access in other plugins.
pub use crate::cli::Cli;
pub use crate::simulation::config::structs::*;
pub use crate::simulation::core::app_state::{AppState, SceneBuildSet, SimulationSet};
pub use crate::simulation::core::events::NavigationEvent;
pub use crate::simulation::core::prng::SimulationRng;
pub use crate::simulation::plugins::observer::WalkingObserver;
