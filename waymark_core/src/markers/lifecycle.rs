// waymark_core/src/markers/lifecycle.rs

//! Keeps the set of spawned markers equal to the visibility window.
//!
//! Every marker lives on its own anchor. A marker is despawned by returning its
//! slot to the pool and destroying the detached anchor; a marker is spawned by
//! probing the ground under its path vertex, creating an anchor at the hit (or
//! at an estimated ground pose) and parenting a pooled object to it.

use super::pool::MarkerPool;
use super::scaling::DistanceScaling;
use crate::config::MarkerConfig;
use crate::interfaces::{pose_up, Collaborators, SceneObjectFactory};
use crate::path::DensifiedPath;
use crate::tracking::VisibilityWindow;
use crate::types::MarkerCategory;
use crate::view::ObserverView;
use nalgebra::{Isometry3, Point3, Rotation3, Translation3, UnitQuaternion, Vector3};
use std::collections::BTreeMap;

/// Per-frame observer information the coordinator needs to place markers.
#[derive(Debug, Clone, Copy)]
pub struct MarkerFrame<'a> {
    pub observer: &'a Isometry3<f64>,
    pub view: &'a ObserverView,
    /// Height of the locked ground plane, if one is known.
    pub ground_height: Option<f64>,
}

/// Outcome of one reconciliation pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReconcileReport {
    pub spawned: Vec<usize>,
    pub despawned: Vec<usize>,
    /// Indices that could not be spawned and should be retried.
    pub failed: Vec<usize>,
}

impl ReconcileReport {
    pub fn is_empty(&self) -> bool {
        self.spawned.is_empty() && self.despawned.is_empty() && self.failed.is_empty()
    }

    pub fn needs_retry(&self) -> bool {
        !self.failed.is_empty()
    }
}

pub struct MarkerCoordinator {
    config: MarkerConfig,
    scaling: DistanceScaling,
    pool: MarkerPool,
    /// World position of every spawned marker, keyed by path index.
    placements: BTreeMap<usize, Point3<f64>>,
}

impl MarkerCoordinator {
    pub fn new(config: &MarkerConfig, scene: &mut dyn SceneObjectFactory) -> Self {
        Self {
            config: config.clone(),
            scaling: DistanceScaling::from_config(config),
            pool: MarkerPool::initialize(config.pool_size, scene),
            placements: BTreeMap::new(),
        }
    }

    pub fn reconcile(
        &mut self,
        window: &VisibilityWindow,
        path: &DensifiedPath,
        frame: &MarkerFrame<'_>,
        collaborators: &mut Collaborators<'_>,
    ) -> ReconcileReport {
        let mut report = ReconcileReport::default();

        for index in self.pool.bound_indices() {
            if !window.contains(index) {
                self.despawn(index, collaborators);
                report.despawned.push(index);
            }
        }

        for index in window.indices() {
            if self.pool.slot_for_index(index).is_some() {
                continue;
            }
            if self.spawn(index, path, frame, collaborators) {
                report.spawned.push(index);
            } else {
                report.failed.push(index);
            }
        }

        if !report.is_empty() {
            tracing::debug!(
                "Reconciled markers: +{} -{} failed {} (active {})",
                report.spawned.len(),
                report.despawned.len(),
                report.failed.len(),
                self.pool.bound_count()
            );
        }
        report
    }

    fn despawn(&mut self, index: usize, collaborators: &mut Collaborators<'_>) {
        let Some(slot) = self.pool.slot_for_index(index) else {
            return;
        };
        if let Some(anchor) = self.pool.release(slot, &mut *collaborators.scene) {
            collaborators.anchors.destroy_anchor(anchor);
        }
        self.placements.remove(&index);
    }

    fn spawn(
        &mut self,
        index: usize,
        path: &DensifiedPath,
        frame: &MarkerFrame<'_>,
        collaborators: &mut Collaborators<'_>,
    ) -> bool {
        let Some(vertex) = path.get(index) else {
            return false;
        };
        let slot = self.pool.acquire(&mut *collaborators.scene);

        let fallback_height = frame.observer.translation.vector.z - self.config.fallback_ground_offset_m;
        let ground = Point3::new(
            vertex.local_position.x,
            vertex.local_position.y,
            frame.ground_height.unwrap_or(fallback_height),
        );
        let pose = frame
            .view
            .project(frame.observer, &ground)
            .filter(|pixel| frame.view.contains(pixel))
            .and_then(|pixel| collaborators.surface.probe(pixel))
            .unwrap_or_else(|| {
                Isometry3::from_parts(
                    Translation3::new(ground.x, ground.y, fallback_height),
                    UnitQuaternion::identity(),
                )
            });

        let anchor = match collaborators.anchors.create_anchor(&pose) {
            Ok(anchor) => anchor,
            Err(e) => {
                tracing::warn!("Skipping marker {}: {}", index, e);
                self.pool.release(slot, &mut *collaborators.scene);
                return false;
            }
        };
        if let Err(e) = self.pool.bind(slot, index, anchor) {
            tracing::error!("Could not bind marker {}: {}", index, e);
            self.pool.release(slot, &mut *collaborators.scene);
            collaborators.anchors.destroy_anchor(anchor);
            return false;
        }

        let Some(object) = self.pool.handle(slot).map(|handle| handle.object) else {
            return false;
        };
        let world_rotation = path
            .get(index + 1)
            .and_then(|next| face_along_ground(&pose, &next.local_position));
        let local_rotation = world_rotation
            .map(|rotation| pose.rotation.inverse() * rotation)
            .unwrap_or_else(UnitQuaternion::identity);
        let local = Isometry3::from_parts(
            Translation3::new(0.0, 0.0, self.config.height_offset_m),
            local_rotation,
        );

        let scene = &mut *collaborators.scene;
        scene.set_parent(object, Some(anchor));
        scene.set_transform(object, &local);
        scene.set_category(object, MarkerCategory::for_index(index, path.len()));
        scene.set_scale(object, self.config.base_scale);
        scene.set_visible(object, true);

        let position = pose.transform_point(&Point3::from(local.translation.vector));
        self.placements.insert(index, position);
        true
    }

    /// Applies distance scaling to every spawned marker.
    pub fn update_scales(&self, observer: &Point3<f64>, scene: &mut dyn SceneObjectFactory) {
        for (index, position) in &self.placements {
            let Some(handle) = self
                .pool
                .slot_for_index(*index)
                .and_then(|slot| self.pool.handle(slot))
            else {
                continue;
            };
            let distance = (position - observer).norm();
            scene.set_scale(handle.object, self.scaling.scale_at(distance));
        }
    }

    /// Despawns every marker and destroys the pool.
    pub fn clear(&mut self, collaborators: &mut Collaborators<'_>) {
        for index in self.pool.bound_indices() {
            self.despawn(index, collaborators);
        }
        for anchor in self.pool.teardown(&mut *collaborators.scene) {
            collaborators.anchors.destroy_anchor(anchor);
        }
        self.placements.clear();
    }

    /// Position of the first spawned marker at or after `closest_index`.
    pub fn next_marker_ahead(&self, closest_index: usize) -> Option<Point3<f64>> {
        self.placements
            .range(closest_index..)
            .next()
            .map(|(_, position)| *position)
    }

    pub fn pool(&self) -> &MarkerPool {
        &self.pool
    }

    pub fn active_count(&self) -> usize {
        self.pool.bound_count()
    }

    pub fn placement(&self, index: usize) -> Option<Point3<f64>> {
        self.placements.get(&index).copied()
    }
}

/// Rotation whose +X points from `pose` toward `target` flattened onto the
/// pose's ground plane, with +Z along the pose's up axis. `None` when the
/// target is (nearly) straight above or below.
pub fn face_along_ground(pose: &Isometry3<f64>, target: &Point3<f64>) -> Option<UnitQuaternion<f64>> {
    let up = pose_up(pose).normalize();
    let origin = Point3::from(pose.translation.vector);
    let direction = target - origin;
    let on_plane: Vector3<f64> = direction - up * direction.dot(&up);
    if on_plane.norm_squared() <= 1e-3 {
        return None;
    }
    let forward = on_plane.normalize();
    let left = up.cross(&forward);
    let basis = Rotation3::from_basis_unchecked(&[forward, left, up]);
    Some(UnitQuaternion::from_rotation_matrix(&basis))
}
