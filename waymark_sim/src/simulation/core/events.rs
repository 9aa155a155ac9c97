// waymark_sim/src/simulation/core/events.rs
use bevy::prelude::Event;
// Import the pure data enum from the core library
use waymark_core::session::SessionEvent;

// This is the Bevy-specific event. It can derive `Event`.
#[derive(Event, Clone, Debug)]
pub struct NavigationEvent(pub SessionEvent);
