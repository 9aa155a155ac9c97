//! Route densification.
//!
//! Turns sparse route geometry into vertices spaced at a fixed distance along
//! the path. Spacing is measured as arc length, so a vertex that falls past a
//! corner continues on the next segment with the carried-over remainder.

use nalgebra::{Point3, Vector3};

use super::{DensifiedPath, PathVertex};
use crate::config::default_spacing;
use crate::error::{Result, WaymarkError};
use crate::geo::GeoProjector;
use crate::types::GeoPoint;

/// An interpolated vertex closer than this to the end of its segment is dropped
/// so the final raw waypoint never lands on top of it.
const MERGE_TOLERANCE_M: f64 = 1e-3;

/// Spacings at or below this are treated as invalid.
pub const MIN_SPACING_M: f64 = 0.1;

/// Hard upper bound on the vertices of one densified path, endpoint included.
pub const MAX_PATH_VERTICES: usize = 100_000;

/// Densifies `raw` with the given spacing.
///
/// A non-finite `spacing`, or one at or below [`MIN_SPACING_M`], is replaced by
/// the 10 m default. `max_route_length` bounds the vertices emitted per segment
/// at `max_route_length / spacing`, and the whole path never exceeds
/// [`MAX_PATH_VERTICES`]. A segment that would exceed either is cut short and
/// counted in [`DensifiedPath::truncated_segments`].
pub fn densify(
    raw: &[GeoPoint],
    projector: &GeoProjector,
    spacing: f64,
    max_route_length: f64,
) -> Result<DensifiedPath> {
    if raw.len() < 2 {
        return Err(WaymarkError::InvalidInput(format!(
            "route needs at least 2 points, got {}",
            raw.len()
        )));
    }
    if let Some(bad) = raw.iter().position(|p| !p.is_finite()) {
        return Err(WaymarkError::InvalidInput(format!(
            "route point {bad} is not a finite coordinate"
        )));
    }

    let spacing = if spacing.is_finite() && spacing > MIN_SPACING_M {
        spacing
    } else {
        let fallback = default_spacing();
        tracing::warn!("Invalid marker spacing {spacing}, defaulting to {fallback}m");
        fallback
    };
    let segment_cap = ((max_route_length / spacing)
        .ceil()
        .min(MAX_PATH_VERTICES as f64) as usize)
        .max(1);

    let sparse: Vec<Point3<f64>> = raw.iter().map(|p| projector.to_local(p)).collect();

    let mut vertices = Vec::with_capacity(estimate_capacity(&sparse, spacing, segment_cap));
    vertices.push(PathVertex {
        index: 0,
        local_position: sparse[0],
        cumulative_distance: 0.0,
    });

    // Offset of the last emitted vertex relative to the current segment start.
    // Zero or negative once carried into a new segment.
    let mut offset = 0.0;
    let mut travelled = 0.0;
    let mut truncated_segments = 0;

    for (segment, pair) in sparse.windows(2).enumerate() {
        let (start, end) = (pair[0], pair[1]);
        let delta: Vector3<f64> = end - start;
        let length = delta.norm();
        if length <= f64::EPSILON {
            continue;
        }
        let direction = delta / length;

        let mut emitted = 0;
        while offset + spacing < length - MERGE_TOLERANCE_M {
            // One slot stays free for the final raw point.
            if emitted >= segment_cap || vertices.len() + 1 >= MAX_PATH_VERTICES {
                tracing::warn!(
                    "Densification of segment {segment} hit the point cap, aborting segment"
                );
                truncated_segments += 1;
                offset = length;
                break;
            }
            offset += spacing;
            emitted += 1;
            vertices.push(PathVertex {
                index: vertices.len(),
                local_position: start + direction * offset,
                cumulative_distance: travelled + offset,
            });
        }

        offset -= length;
        travelled += length;
    }

    if travelled <= f64::EPSILON {
        return Err(WaymarkError::InvalidInput(
            "route has zero length".to_string(),
        ));
    }

    vertices.push(PathVertex {
        index: vertices.len(),
        local_position: sparse[sparse.len() - 1],
        cumulative_distance: travelled,
    });

    tracing::info!(
        "Densified route from {} to {} points ({:.1}m, spacing {}m)",
        raw.len(),
        vertices.len(),
        travelled,
        spacing
    );

    Ok(DensifiedPath::new(vertices, spacing, truncated_segments))
}

fn estimate_capacity(sparse: &[Point3<f64>], spacing: f64, segment_cap: usize) -> usize {
    let length: f64 = sparse.windows(2).map(|p| (p[1] - p[0]).norm()).sum();
    let estimate = ((length / spacing).ceil() as usize).saturating_add(2);
    estimate
        .min(segment_cap.saturating_mul(sparse.len()).saturating_add(2))
        .min(MAX_PATH_VERTICES)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    const MAX_ROUTE: f64 = 20_000.0;

    fn projector() -> GeoProjector {
        GeoProjector::new(GeoPoint::new(0.0, 0.0), 0.0)
    }

    /// A point `meters` north of the equator origin.
    fn north(meters: f64) -> GeoPoint {
        GeoPoint::new(meters / crate::geo::METERS_PER_DEGREE_LAT, 0.0)
    }

    /// A point `meters` east of the equator origin.
    fn east(meters: f64) -> GeoPoint {
        GeoPoint::new(0.0, meters / crate::geo::METERS_PER_DEGREE_LAT)
    }

    #[test]
    fn single_point_route_is_an_error() {
        let result = densify(&[GeoPoint::new(0.0, 0.0)], &projector(), 10.0, MAX_ROUTE);
        assert!(matches!(result, Err(WaymarkError::InvalidInput(_))));
    }

    #[test]
    fn empty_route_is_an_error() {
        assert!(densify(&[], &projector(), 10.0, MAX_ROUTE).is_err());
    }

    #[test]
    fn coincident_points_are_an_error() {
        let p = GeoPoint::new(1.0, 1.0);
        assert!(densify(&[p, p], &projector(), 10.0, MAX_ROUTE).is_err());
    }

    #[test]
    fn exact_multiple_yields_floor_plus_one_vertices() {
        let path = densify(&[north(0.0), north(100.0)], &projector(), 10.0, MAX_ROUTE).unwrap();
        assert_eq!(path.len(), 11);
        for (i, vertex) in path.vertices().iter().enumerate() {
            assert_eq!(vertex.index, i);
            assert_abs_diff_eq!(vertex.cumulative_distance, 10.0 * i as f64, epsilon = 1e-6);
        }
    }

    #[test]
    fn straight_path_spacing_is_uniform_with_short_final_segment() {
        let raw = [north(0.0), north(111.32)];
        let path = densify(&raw, &projector(), 10.0, MAX_ROUTE).unwrap();

        // Vertices at 0, 10, ..., 110 and the endpoint.
        assert_eq!(path.len(), 13);
        let end = projector().to_local(&raw[1]);
        assert_eq!(path.last().local_position, end);

        let vertices = path.vertices();
        for pair in vertices[..vertices.len() - 1].windows(2) {
            let step = (pair[1].local_position - pair[0].local_position).norm();
            assert_abs_diff_eq!(step, 10.0, epsilon = 1e-6);
        }
        let last_step = (vertices[12].local_position - vertices[11].local_position).norm();
        assert!(last_step <= 10.0);
        assert_abs_diff_eq!(last_step, 1.32, epsilon = 1e-6);
    }

    #[test]
    fn spacing_carries_around_corners() {
        // 15 m north then 15 m east: the vertex at 20 m sits 5 m along the second leg.
        let corner = north(15.0);
        let raw = [north(0.0), corner, GeoPoint::new(corner.latitude, east(15.0).longitude)];
        let path = densify(&raw, &projector(), 10.0, MAX_ROUTE).unwrap();

        let distances: Vec<f64> = path.vertices().iter().map(|v| v.cumulative_distance).collect();
        assert_eq!(distances.len(), 4);
        assert_abs_diff_eq!(distances[1], 10.0, epsilon = 1e-6);
        assert_abs_diff_eq!(distances[2], 20.0, epsilon = 1e-6);
        assert_abs_diff_eq!(distances[3], 30.0, epsilon = 1e-6);

        let second = path.get(2).unwrap().local_position;
        assert_abs_diff_eq!(second.x, 5.0, epsilon = 1e-6);
        assert_abs_diff_eq!(second.y, 15.0, epsilon = 1e-6);
    }

    #[test]
    fn cumulative_distance_strictly_increases() {
        let raw = [
            north(0.0),
            north(3.0),
            north(3.0),
            GeoPoint::new(north(40.0).latitude, east(7.0).longitude),
            GeoPoint::new(north(41.0).latitude, east(70.0).longitude),
        ];
        let path = densify(&raw, &projector(), 4.0, MAX_ROUTE).unwrap();
        for pair in path.vertices().windows(2) {
            assert!(pair[1].cumulative_distance > pair[0].cumulative_distance);
        }
    }

    #[test]
    fn non_positive_spacing_uses_default() {
        let path = densify(&[north(0.0), north(100.0)], &projector(), 0.0, MAX_ROUTE).unwrap();
        assert_eq!(path.spacing(), 10.0);
        assert_eq!(path.len(), 11);

        let path = densify(&[north(0.0), north(100.0)], &projector(), f64::NAN, MAX_ROUTE).unwrap();
        assert_eq!(path.spacing(), 10.0);
    }

    #[test]
    fn tiny_spacing_falls_back_to_default() {
        let raw = [north(0.0), north(1000.0)];
        let path = densify(&raw, &projector(), 1e-7, MAX_ROUTE).unwrap();
        assert_eq!(path.spacing(), 10.0);
        assert_eq!(path.len(), 101);
        assert_eq!(path.truncated_segments(), 0);

        let path = densify(&raw, &projector(), MIN_SPACING_M, MAX_ROUTE).unwrap();
        assert_eq!(path.spacing(), 10.0);
    }

    #[test]
    fn path_never_exceeds_vertex_budget() {
        // 30 km at 0.2 m would be 150k vertices, and the route length cap is
        // large enough that only the global budget applies.
        let raw = [north(0.0), north(30_000.0)];
        let path = densify(&raw, &projector(), 0.2, f64::INFINITY).unwrap();
        assert_eq!(path.len(), MAX_PATH_VERTICES);
        assert_eq!(path.truncated_segments(), 1);
        assert_eq!(path.last().local_position, projector().to_local(&raw[1]));
    }

    #[test]
    fn segment_cap_truncates_instead_of_looping() {
        // Cap of 5 points per segment on a 1 km segment at 1 m spacing.
        let path = densify(&[north(0.0), north(1000.0)], &projector(), 1.0, 5.0).unwrap();
        assert_eq!(path.truncated_segments(), 1);
        assert_eq!(path.len(), 7);
        assert_abs_diff_eq!(path.total_length(), 1000.0, epsilon = 1e-6);
    }
}
