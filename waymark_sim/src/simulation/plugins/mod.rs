// waymark_sim/src/simulation/plugins/mod.rs

pub mod debugging;
pub mod navigation;
pub mod observer;
pub mod routing;
pub mod sensors;
pub mod world;
