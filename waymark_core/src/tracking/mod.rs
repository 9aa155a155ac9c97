// waymark_core/src/tracking/mod.rs

pub mod progress;
pub mod window;

pub use progress::{ProgressState, ProgressTracker};
pub use window::{compute_window, VisibilityWindow, VisibilityWindowManager};
