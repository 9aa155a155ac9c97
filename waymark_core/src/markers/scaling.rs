// waymark_core/src/markers/scaling.rs

use crate::config::MarkerConfig;
use num_traits::Float;

/// Uniform marker scale as a function of distance to the observer.
///
/// `t = clamp((d - near) / (far - near), 0, 1)` and the scale is
/// `base * lerp(1, far_multiplier, t)`, so distant markers stay legible.
pub fn distance_scale<T: Float>(distance: T, near: T, far: T, base: T, far_multiplier: T) -> T {
    let span = far - near;
    let t = if span > T::zero() {
        ((distance - near) / span).max(T::zero()).min(T::one())
    } else if distance >= far {
        T::one()
    } else {
        T::zero()
    };
    base * (T::one() + (far_multiplier - T::one()) * t)
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DistanceScaling {
    pub near: f64,
    pub far: f64,
    pub base: f64,
    pub far_multiplier: f64,
}

impl DistanceScaling {
    pub fn from_config(config: &MarkerConfig) -> Self {
        Self {
            near: config.near_scale_distance_m,
            far: config.far_scale_distance_m,
            base: config.base_scale,
            far_multiplier: config.far_scale_multiplier,
        }
    }

    pub fn scale_at(&self, distance: f64) -> f64 {
        distance_scale(distance, self.near, self.far, self.base, self.far_multiplier)
    }
}
