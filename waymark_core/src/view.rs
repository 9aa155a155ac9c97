// waymark_core/src/view.rs

//! Pinhole model of the observer's camera.
//!
//! The observer pose maps the camera body frame into the local frame. The body
//! frame is forward-left-up: +X looks out of the screen, +Y is screen left, +Z
//! is screen up. Pixels have their origin at the top-left corner with `v`
//! growing downward.

use nalgebra::{Isometry3, Point2, Point3, Unit, Vector2, Vector3};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ObserverView {
    pub width_px: f64,
    pub height_px: f64,
    pub focal_length_px: f64,
    /// Points closer than this along the optical axis do not project.
    #[serde(default = "default_near_clip")]
    pub near_clip_m: f64,
}

fn default_near_clip() -> f64 {
    0.05
}

impl Default for ObserverView {
    /// A 1080x1920 portrait phone screen with a ~60° horizontal field of view.
    fn default() -> Self {
        Self {
            width_px: 1080.0,
            height_px: 1920.0,
            focal_length_px: 935.0,
            near_clip_m: default_near_clip(),
        }
    }
}

impl ObserverView {
    pub fn center(&self) -> Point2<f64> {
        Point2::new(self.width_px / 2.0, self.height_px / 2.0)
    }

    /// Projects a local-frame point to a pixel. `None` when the point is behind
    /// the near clip plane.
    pub fn project(&self, observer: &Isometry3<f64>, world: &Point3<f64>) -> Option<Point2<f64>> {
        let body = observer.inverse_transform_point(world);
        if body.x <= self.near_clip_m {
            return None;
        }
        let center = self.center();
        Some(Point2::new(
            center.x - self.focal_length_px * body.y / body.x,
            center.y - self.focal_length_px * body.z / body.x,
        ))
    }

    /// Strictly inside the image bounds.
    pub fn contains(&self, pixel: &Point2<f64>) -> bool {
        pixel.x > 0.0 && pixel.x < self.width_px && pixel.y > 0.0 && pixel.y < self.height_px
    }

    /// Unit direction in the local frame of the ray through `pixel`.
    pub fn ray_direction(&self, observer: &Isometry3<f64>, pixel: &Point2<f64>) -> Unit<Vector3<f64>> {
        let center = self.center();
        let body = Vector3::new(
            1.0,
            (center.x - pixel.x) / self.focal_length_px,
            (center.y - pixel.y) / self.focal_length_px,
        );
        Unit::new_normalize(observer.rotation * body)
    }

    /// Direction of `world` as seen on screen, right and up from the image
    /// center. Valid for points behind the observer as well.
    pub fn screen_direction(&self, observer: &Isometry3<f64>, world: &Point3<f64>) -> Vector2<f64> {
        let body = observer.inverse_transform_point(world);
        Vector2::new(-body.y, body.z)
    }
}

/// Horizontal facing of the observer, the body +X axis flattened onto the ground.
pub fn observer_forward(observer: &Isometry3<f64>) -> Vector3<f64> {
    let forward = observer.rotation * Vector3::x();
    Vector3::new(forward.x, forward.y, 0.0)
}
