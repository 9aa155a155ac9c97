// waymark_core/src/session/guidance.rs

use crate::view::ObserverView;
use nalgebra::{Isometry3, Point3};
use std::f64::consts::FRAC_PI_2;

/// Where the host should point the guidance beacon.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GuidanceTarget {
    /// The target is visible, no beacon needed.
    OnScreen { target: Point3<f64> },
    /// The target is off-screen. `angle_rad` is the beacon's rotation in the
    /// screen plane, zero pointing up and positive counter-clockwise.
    OffScreen { target: Point3<f64>, angle_rad: f64 },
}

impl GuidanceTarget {
    pub fn target(&self) -> Point3<f64> {
        match self {
            GuidanceTarget::OnScreen { target } | GuidanceTarget::OffScreen { target, .. } => *target,
        }
    }
}

pub fn evaluate_guidance(
    view: &ObserverView,
    observer: &Isometry3<f64>,
    target: Point3<f64>,
) -> GuidanceTarget {
    if let Some(pixel) = view.project(observer, &target) {
        if view.contains(&pixel) {
            return GuidanceTarget::OnScreen { target };
        }
    }
    let direction = view.screen_direction(observer, &target);
    GuidanceTarget::OffScreen {
        target,
        angle_rad: direction.y.atan2(direction.x) - FRAC_PI_2,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn target_ahead_is_on_screen() {
        let guidance = evaluate_guidance(
            &ObserverView::default(),
            &Isometry3::identity(),
            Point3::new(10.0, 0.0, -1.0),
        );
        assert!(matches!(guidance, GuidanceTarget::OnScreen { .. }));
    }

    #[test]
    fn target_to_the_right_points_beacon_right() {
        let guidance = evaluate_guidance(
            &ObserverView::default(),
            &Isometry3::identity(),
            Point3::new(1.0, -10.0, 0.0),
        );
        match guidance {
            GuidanceTarget::OffScreen { angle_rad, .. } => {
                assert_abs_diff_eq!(angle_rad, -FRAC_PI_2, epsilon = 1e-9)
            }
            other => panic!("expected off-screen guidance, got {other:?}"),
        }
    }

    #[test]
    fn target_behind_and_left_points_beacon_left() {
        let guidance = evaluate_guidance(
            &ObserverView::default(),
            &Isometry3::identity(),
            Point3::new(-5.0, 3.0, 0.5),
        );
        match guidance {
            GuidanceTarget::OffScreen { angle_rad, .. } => {
                let expected = 0.5_f64.atan2(-3.0) - FRAC_PI_2;
                assert_abs_diff_eq!(angle_rad, expected, epsilon = 1e-9);
                assert!(angle_rad > 0.0 && angle_rad < std::f64::consts::PI);
            }
            other => panic!("expected off-screen guidance, got {other:?}"),
        }
    }
}
