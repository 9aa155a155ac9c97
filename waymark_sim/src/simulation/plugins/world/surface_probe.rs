// waymark_sim/src/simulation/plugins/world/surface_probe.rs
use avian3d::prelude::{SpatialQuery, SpatialQueryFilter};
use bevy::prelude::*;
use nalgebra::{Isometry3, Point2, Translation3, UnitQuaternion, Vector3};

use crate::simulation::core::transforms::{bevy_vector_to_enu_vector, enu_vector_to_bevy_vector};
use waymark_core::interfaces::SurfaceProbe;
use waymark_core::session::FrameInput;
use waymark_core::view::ObserverView;

/// Answers the session's surface probes with physics raycasts through the
/// observer's view, the way an AR hit test would.
pub struct PhysicsSurfaceProbe<'a, 'w, 's> {
    spatial_query: &'a SpatialQuery<'w, 's>,
    observer: Isometry3<f64>,
    view: ObserverView,
    max_distance: f32,
}

impl<'a, 'w, 's> PhysicsSurfaceProbe<'a, 'w, 's> {
    pub fn new(spatial_query: &'a SpatialQuery<'w, 's>, frame: &FrameInput, max_distance: f64) -> Self {
        Self {
            spatial_query,
            observer: frame.observer,
            view: frame.view,
            max_distance: max_distance as f32,
        }
    }
}

impl SurfaceProbe for PhysicsSurfaceProbe<'_, '_, '_> {
    fn probe(&mut self, view_point: Point2<f64>) -> Option<Isometry3<f64>> {
        let direction_enu = self.view.ray_direction(&self.observer, &view_point).into_inner();
        let origin = enu_vector_to_bevy_vector(&self.observer.translation.vector);
        let direction = Dir3::new(enu_vector_to_bevy_vector(&direction_enu)).ok()?;

        let hit = self.spatial_query.cast_ray(
            origin,
            direction,
            self.max_distance,
            true,
            &SpatialQueryFilter::default(),
        )?;

        let point = origin + direction * hit.distance;
        let normal = bevy_vector_to_enu_vector(&hit.normal).try_normalize(1e-6)?;
        // +Z of the returned pose is the surface normal.
        let rotation = UnitQuaternion::rotation_between(&Vector3::z(), &normal)
            .unwrap_or_else(UnitQuaternion::identity);
        Some(Isometry3::from_parts(
            Translation3::from(bevy_vector_to_enu_vector(&point)),
            rotation,
        ))
    }
}
