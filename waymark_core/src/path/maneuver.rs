// waymark_core/src/path/maneuver.rs

use crate::geo::GeoProjector;
use crate::interfaces::RouteStep;
use nalgebra::Point3;

/// A turn-by-turn instruction placed in the local frame.
#[derive(Debug, Clone, PartialEq)]
pub struct ManeuverPoint {
    pub step_index: usize,
    pub local_position: Point3<f64>,
    pub instruction: String,
    pub distance_meters: f64,
}

/// Projects every route step with the session projector. Steps with
/// non-finite coordinates are skipped.
pub fn derive_maneuvers(steps: &[RouteStep], projector: &GeoProjector) -> Vec<ManeuverPoint> {
    steps
        .iter()
        .enumerate()
        .filter(|(_, step)| step.location.is_finite())
        .map(|(step_index, step)| ManeuverPoint {
            step_index,
            local_position: projector.to_local(&step.location),
            instruction: step.instruction.clone(),
            distance_meters: step.distance_m,
        })
        .collect()
}
