// waymark_core/src/geo/mod.rs

//! Conversion between geographic coordinates and the session's local ENU frame.
//!
//! The projection is equirectangular around a fixed origin: one degree of
//! latitude is a constant distance, one degree of longitude shrinks with the
//! cosine of the origin latitude. This is accurate to well under a meter within
//! a few kilometers of the origin, which covers a walking route. Beyond
//! roughly 5 km (or close to the poles) the error grows quickly and routes that
//! long should be split into several sessions.

use crate::types::GeoPoint;
use nalgebra::{Point3, Rotation3, Vector3};

/// Meters per degree of latitude used by the local projection.
pub const METERS_PER_DEGREE_LAT: f64 = 111_320.0;

/// Mean Earth radius used for great-circle distances.
pub const EARTH_RADIUS_M: f64 = 6_371_000.0;

/// Projects geographic points into the local ENU frame of one session.
///
/// `heading_deg` is the compass heading (clockwise from true north) of the
/// local frame's +Y axis. A point due east of the origin therefore lands on
/// local +Y when the heading is 90°.
#[derive(Debug, Clone)]
pub struct GeoProjector {
    origin: GeoPoint,
    heading_deg: f64,
    meters_per_degree_lon: f64,
    alignment: Rotation3<f64>,
}

impl GeoProjector {
    pub fn new(origin: GeoPoint, heading_deg: f64) -> Self {
        let meters_per_degree_lon = METERS_PER_DEGREE_LAT * origin.latitude.to_radians().cos();
        let alignment = Rotation3::from_axis_angle(&Vector3::z_axis(), heading_deg.to_radians());
        Self {
            origin,
            heading_deg,
            meters_per_degree_lon,
            alignment,
        }
    }

    pub fn origin(&self) -> GeoPoint {
        self.origin
    }

    pub fn heading_deg(&self) -> f64 {
        self.heading_deg
    }

    /// Geographic point to local position. The vertical component is always zero.
    pub fn to_local(&self, point: &GeoPoint) -> Point3<f64> {
        let east = (point.longitude - self.origin.longitude) * self.meters_per_degree_lon;
        let north = (point.latitude - self.origin.latitude) * METERS_PER_DEGREE_LAT;
        let aligned = self.alignment * Vector3::new(east, north, 0.0);
        Point3::new(aligned.x, aligned.y, 0.0)
    }

    /// Inverse of [`GeoProjector::to_local`]. The vertical component is ignored.
    pub fn to_geo(&self, local: &Point3<f64>) -> GeoPoint {
        let enu = self.alignment.inverse() * Vector3::new(local.x, local.y, 0.0);
        GeoPoint {
            latitude: self.origin.latitude + enu.y / METERS_PER_DEGREE_LAT,
            longitude: self.origin.longitude + enu.x / self.meters_per_degree_lon,
        }
    }
}

/// Great-circle distance in meters.
pub fn haversine_distance(a: &GeoPoint, b: &GeoPoint) -> f64 {
    let dlat = (b.latitude - a.latitude).to_radians();
    let dlon = (b.longitude - a.longitude).to_radians();
    let h = (dlat / 2.0).sin().powi(2)
        + a.latitude.to_radians().cos() * b.latitude.to_radians().cos() * (dlon / 2.0).sin().powi(2);
    let c = 2.0 * h.sqrt().atan2((1.0 - h).sqrt());
    EARTH_RADIUS_M * c
}

/// Compass bearing (degrees clockwise from local +Y) of a horizontal direction.
pub fn bearing_deg(direction: &Vector3<f64>) -> f64 {
    direction.x.atan2(direction.y).to_degrees()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    const EPS: f64 = 1e-6;

    #[test]
    fn origin_maps_to_zero() {
        let origin = GeoPoint::new(28.4575, 77.4969);
        let projector = GeoProjector::new(origin, 37.0);
        let local = projector.to_local(&origin);
        assert_abs_diff_eq!(local.coords.norm(), 0.0, epsilon = EPS);
    }

    #[test]
    fn north_offset_without_heading_is_positive_y() {
        let projector = GeoProjector::new(GeoPoint::new(0.0, 0.0), 0.0);
        let local = projector.to_local(&GeoPoint::new(0.001, 0.0));
        assert_abs_diff_eq!(local.x, 0.0, epsilon = EPS);
        assert_abs_diff_eq!(local.y, 111.32, epsilon = EPS);
        assert_eq!(local.z, 0.0);
    }

    #[test]
    fn longitude_scales_with_origin_latitude() {
        let projector = GeoProjector::new(GeoPoint::new(60.0, 10.0), 0.0);
        let local = projector.to_local(&GeoPoint::new(60.0, 10.001));
        assert_abs_diff_eq!(local.x, 111.32 * 0.5, epsilon = 1e-6);
    }

    #[test]
    fn heading_rotates_east_onto_local_forward() {
        let projector = GeoProjector::new(GeoPoint::new(0.0, 0.0), 90.0);
        let local = projector.to_local(&GeoPoint::new(0.0, 0.001));
        assert_abs_diff_eq!(local.x, 0.0, epsilon = EPS);
        assert_abs_diff_eq!(local.y, 111.32, epsilon = EPS);
    }

    #[test]
    fn inverse_recovers_geo_point() {
        let origin = GeoPoint::new(28.4575, 77.4969);
        let projector = GeoProjector::new(origin, -123.4);
        let target = GeoPoint::new(28.4572, 77.4984);
        let back = projector.to_geo(&projector.to_local(&target));
        assert_abs_diff_eq!(back.latitude, target.latitude, epsilon = 1e-9);
        assert_abs_diff_eq!(back.longitude, target.longitude, epsilon = 1e-9);
    }

    #[test]
    fn haversine_matches_projection_over_short_distance() {
        let origin = GeoPoint::new(28.4575, 77.4969);
        let target = GeoPoint::new(28.4585, 77.4979);
        let projector = GeoProjector::new(origin, 0.0);
        let planar = projector.to_local(&target).coords.norm();
        let great_circle = haversine_distance(&origin, &target);
        // Both are approximations, they must agree to within half a percent here.
        assert!((planar - great_circle).abs() / great_circle < 5e-3);
    }

    #[test]
    fn bearing_of_east_is_ninety_degrees() {
        assert_abs_diff_eq!(bearing_deg(&Vector3::new(1.0, 0.0, 0.0)), 90.0, epsilon = EPS);
        assert_abs_diff_eq!(bearing_deg(&Vector3::new(0.0, 1.0, 0.0)), 0.0, epsilon = EPS);
    }
}
