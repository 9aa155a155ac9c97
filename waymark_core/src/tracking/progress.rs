// waymark_core/src/tracking/progress.rs

use crate::config::TrackingConfig;
use crate::path::DensifiedPath;
use nalgebra::Point3;

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ProgressState {
    pub last_closest_index: usize,
    pub last_observer_position: Option<Point3<f64>>,
}

/// Incremental nearest-vertex search along a densified path.
///
/// Each update only looks at `[last - look_back, last + look_ahead]`, so the
/// cost per frame is constant regardless of path length. The flip side is that
/// a jump further than `look_ahead` vertices (a teleport or a long tracking
/// loss) takes several updates to catch up.
#[derive(Debug, Clone)]
pub struct ProgressTracker {
    look_back: usize,
    look_ahead: usize,
    state: ProgressState,
}

impl ProgressTracker {
    pub fn new(look_back: usize, look_ahead: usize) -> Self {
        Self {
            look_back,
            look_ahead,
            state: ProgressState::default(),
        }
    }

    pub fn from_config(config: &TrackingConfig) -> Self {
        Self::new(config.look_back, config.look_ahead)
    }

    /// Returns the closest vertex index to `observer` within the search range.
    /// Distance is measured in the ground plane. Ties keep the lowest index.
    pub fn update(&mut self, observer: &Point3<f64>, path: &DensifiedPath) -> usize {
        let last_index = path.len() - 1;
        let anchor = self.state.last_closest_index.min(last_index);
        let low = anchor.saturating_sub(self.look_back);
        let high = anchor.saturating_add(self.look_ahead).min(last_index);

        let mut closest = low;
        let mut closest_distance = f64::INFINITY;
        for vertex in &path.vertices()[low..=high] {
            let dx = vertex.local_position.x - observer.x;
            let dy = vertex.local_position.y - observer.y;
            let distance = dx * dx + dy * dy;
            if distance < closest_distance {
                closest_distance = distance;
                closest = vertex.index;
            }
        }

        self.state = ProgressState {
            last_closest_index: closest,
            last_observer_position: Some(*observer),
        };
        closest
    }

    pub fn state(&self) -> &ProgressState {
        &self.state
    }

    pub fn closest_index(&self) -> usize {
        self.state.last_closest_index
    }

    pub fn reset(&mut self) {
        self.state = ProgressState::default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geo::{GeoProjector, METERS_PER_DEGREE_LAT};
    use crate::path::densify;
    use crate::types::GeoPoint;

    fn straight_path(length: f64) -> DensifiedPath {
        let projector = GeoProjector::new(GeoPoint::new(0.0, 0.0), 0.0);
        let raw = [
            GeoPoint::new(0.0, 0.0),
            GeoPoint::new(length / METERS_PER_DEGREE_LAT, 0.0),
        ];
        densify(&raw, &projector, 10.0, 20_000.0).unwrap()
    }

    #[test]
    fn forward_motion_never_decreases_the_index() {
        let path = straight_path(200.0);
        let mut tracker = ProgressTracker::new(5, 20);
        let mut previous = 0;
        for step in 0..=400 {
            let observer = Point3::new(0.8, step as f64 * 0.5, 1.6);
            let index = tracker.update(&observer, &path);
            assert!(index >= previous, "index went back from {previous} to {index}");
            previous = index;
        }
        assert_eq!(previous, path.len() - 1);
    }

    #[test]
    fn jumps_are_followed_gradually() {
        let path = straight_path(1000.0);
        let mut tracker = ProgressTracker::new(5, 20);
        let far_away = Point3::new(0.0, 900.0, 0.0);

        assert_eq!(tracker.update(&far_away, &path), 20);
        assert_eq!(tracker.update(&far_away, &path), 40);
        for _ in 0..10 {
            tracker.update(&far_away, &path);
        }
        assert_eq!(tracker.closest_index(), 90);
    }

    #[test]
    fn first_minimum_wins_on_ties() {
        let path = straight_path(100.0);
        let mut tracker = ProgressTracker::new(5, 20);
        // Exactly between vertex 2 (20 m) and vertex 3 (30 m).
        assert_eq!(tracker.update(&Point3::new(0.0, 25.0, 0.0), &path), 2);
    }

    #[test]
    fn reset_returns_to_the_start() {
        let path = straight_path(100.0);
        let mut tracker = ProgressTracker::new(5, 20);
        tracker.update(&Point3::new(0.0, 60.0, 0.0), &path);
        assert_eq!(tracker.closest_index(), 6);
        tracker.reset();
        assert_eq!(tracker.state(), &ProgressState::default());
    }
}
