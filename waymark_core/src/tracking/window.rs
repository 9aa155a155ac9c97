// waymark_core/src/tracking/window.rs

use crate::config::TrackingConfig;
use crate::path::DensifiedPath;
use nalgebra::Point3;
use std::ops::Range;

/// The contiguous run of path indices that must currently have a marker.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct VisibilityWindow {
    indices: Range<usize>,
}

impl VisibilityWindow {
    pub fn new(indices: Range<usize>) -> Self {
        Self { indices }
    }

    pub fn indices(&self) -> Range<usize> {
        self.indices.clone()
    }

    pub fn contains(&self, index: usize) -> bool {
        self.indices.contains(&index)
    }

    pub fn len(&self) -> usize {
        self.indices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }
}

/// Indices whose cumulative distance lies in `[d - behind, d + ahead]`, both
/// ends inclusive, where `d` is the cumulative distance at `closest_index`.
pub fn compute_window(
    path: &DensifiedPath,
    closest_index: usize,
    behind: f64,
    ahead: f64,
) -> VisibilityWindow {
    let vertices = path.vertices();
    let Some(current) = vertices.get(closest_index.min(vertices.len().saturating_sub(1))) else {
        return VisibilityWindow::default();
    };
    let low = current.cumulative_distance - behind;
    let high = current.cumulative_distance + ahead;

    let start = vertices.partition_point(|v| v.cumulative_distance < low);
    let end = vertices.partition_point(|v| v.cumulative_distance <= high);
    VisibilityWindow::new(start..end.max(start))
}

/// Recomputes the visibility window only after the observer has moved far
/// enough, so marker churn stays low while standing still.
#[derive(Debug, Clone)]
pub struct VisibilityWindowManager {
    behind_distance: f64,
    ahead_distance: f64,
    update_threshold: f64,
    last_update_position: Option<Point3<f64>>,
    force_recompute: bool,
    current: VisibilityWindow,
}

impl VisibilityWindowManager {
    pub fn new(config: &TrackingConfig) -> Self {
        Self {
            behind_distance: config.behind_distance_m,
            ahead_distance: config.ahead_distance_m,
            update_threshold: config.update_threshold_m,
            last_update_position: None,
            force_recompute: false,
            current: VisibilityWindow::default(),
        }
    }

    /// `Some(window)` when a recomputation happened this call.
    pub fn update(
        &mut self,
        observer: &Point3<f64>,
        closest_index: usize,
        path: &DensifiedPath,
    ) -> Option<VisibilityWindow> {
        let moved_enough = match self.last_update_position {
            None => true,
            Some(last) => (observer - last).norm() > self.update_threshold,
        };
        if !moved_enough && !self.force_recompute {
            return None;
        }

        self.force_recompute = false;
        self.last_update_position = Some(*observer);
        self.current = compute_window(path, closest_index, self.behind_distance, self.ahead_distance);
        tracing::debug!(
            "Visibility window recomputed at index {}: {:?}",
            closest_index,
            self.current.indices()
        );
        Some(self.current.clone())
    }

    /// Makes the next `update` recompute regardless of movement.
    pub fn force_next(&mut self) {
        self.force_recompute = true;
    }

    pub fn current(&self) -> &VisibilityWindow {
        &self.current
    }

    pub fn reset(&mut self) {
        self.last_update_position = None;
        self.force_recompute = false;
        self.current = VisibilityWindow::default();
    }
}
