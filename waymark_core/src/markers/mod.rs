// waymark_core/src/markers/mod.rs

pub mod lifecycle;
pub mod pool;
pub mod scaling;

pub use lifecycle::{face_along_ground, MarkerCoordinator, MarkerFrame, ReconcileReport};
pub use pool::{MarkerHandle, MarkerPool};
pub use scaling::{distance_scale, DistanceScaling};
