use bevy::prelude::*;

/// Whether the densified path and guidance line are drawn.
#[derive(Resource, Debug)]
pub struct DebugOverlay {
    pub show_path: bool,
}

impl Default for DebugOverlay {
    fn default() -> Self {
        Self { show_path: true }
    }
}

/// Paces the periodic session report.
#[derive(Resource, Debug)]
pub struct SnapshotTimer(pub Timer);
