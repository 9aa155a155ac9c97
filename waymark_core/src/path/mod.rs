// waymark_core/src/path/mod.rs

use nalgebra::Point3;

pub mod densifier;
pub mod maneuver;

pub use densifier::densify;
pub use maneuver::{derive_maneuvers, ManeuverPoint};

/// One vertex of the densified path, in the session's local frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PathVertex {
    pub index: usize,
    pub local_position: Point3<f64>,
    /// Arc length from vertex 0 along the projected route.
    pub cumulative_distance: f64,
}

/// The uniformly spaced vertex sequence derived from sparse route geometry.
///
/// Always holds at least two vertices and cumulative distances are strictly
/// increasing. Immutable once built.
#[derive(Debug, Clone)]
pub struct DensifiedPath {
    vertices: Vec<PathVertex>,
    spacing: f64,
    truncated_segments: usize,
}

impl DensifiedPath {
    pub(crate) fn new(vertices: Vec<PathVertex>, spacing: f64, truncated_segments: usize) -> Self {
        debug_assert!(vertices.len() >= 2);
        Self {
            vertices,
            spacing,
            truncated_segments,
        }
    }

    pub fn vertices(&self) -> &[PathVertex] {
        &self.vertices
    }

    pub fn len(&self) -> usize {
        self.vertices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&PathVertex> {
        self.vertices.get(index)
    }

    /// The spacing actually used, after substituting the default for invalid input.
    pub fn spacing(&self) -> f64 {
        self.spacing
    }

    pub fn total_length(&self) -> f64 {
        self.vertices
            .last()
            .map_or(0.0, |vertex| vertex.cumulative_distance)
    }

    pub fn first(&self) -> &PathVertex {
        &self.vertices[0]
    }

    pub fn last(&self) -> &PathVertex {
        &self.vertices[self.vertices.len() - 1]
    }

    /// Number of segments whose densification hit the safety cap.
    pub fn truncated_segments(&self) -> usize {
        self.truncated_segments
    }
}
