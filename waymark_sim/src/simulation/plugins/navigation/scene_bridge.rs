// waymark_sim/src/simulation/plugins/navigation/scene_bridge.rs

//! Entity-backed implementations of the core's scene contracts.
//!
//! Markers and anchors are ordinary entities. Handles carry the entity bits,
//! parenting uses Bevy's hierarchy, and every change is issued as a command
//! so it lands at the next sync point of the frame.

use crate::prelude::*;
use crate::simulation::core::transforms::enu_iso_to_bevy_transform;
use nalgebra::Isometry3;
use rand::Rng;
use rand_chacha::ChaCha8Rng;
use std::cell::RefCell;
use std::collections::HashMap;

/// A marker visual. Its category picks the material.
#[derive(Component, Debug, Clone, Copy, PartialEq, Eq)]
pub struct PathMarker {
    pub category: MarkerCategory,
}

/// A world anchor created for one path vertex.
#[derive(Component, Debug)]
pub struct MarkerAnchor;

/// Meshes and materials shared by every marker.
#[derive(Resource, Debug, Clone)]
pub struct MarkerAssets {
    pub mesh: Handle<Mesh>,
    pub start: Handle<StandardMaterial>,
    pub mid: Handle<StandardMaterial>,
    pub end: Handle<StandardMaterial>,
}

impl MarkerAssets {
    pub fn material(&self, category: MarkerCategory) -> Handle<StandardMaterial> {
        match category {
            MarkerCategory::Start => self.start.clone(),
            MarkerCategory::Mid => self.mid.clone(),
            MarkerCategory::End => self.end.clone(),
        }
    }
}

/// Local transforms of live marker visuals. Pose and scale arrive through
/// separate calls, so the last full transform is kept here and re-inserted.
#[derive(Resource, Debug, Default)]
pub struct MarkerRegistry {
    transforms: HashMap<Entity, Transform>,
}

impl MarkerRegistry {
    pub fn len(&self) -> usize {
        self.transforms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.transforms.is_empty()
    }
}

// =========================================================================
// == Scene Objects ==
// =========================================================================

pub struct EntityScene<'a, 'w, 's> {
    commands: &'a RefCell<Commands<'w, 's>>,
    registry: &'a mut MarkerRegistry,
    assets: Option<&'a MarkerAssets>,
}

impl<'a, 'w, 's> EntityScene<'a, 'w, 's> {
    pub fn new(
        commands: &'a RefCell<Commands<'w, 's>>,
        registry: &'a mut MarkerRegistry,
        assets: Option<&'a MarkerAssets>,
    ) -> Self {
        Self {
            commands,
            registry,
            assets,
        }
    }

    fn update_transform(&mut self, entity: Entity, change: impl FnOnce(&mut Transform)) {
        let transform = self.registry.transforms.entry(entity).or_default();
        change(transform);
        let transform = *transform;
        self.commands.borrow_mut().entity(entity).insert(transform);
    }
}

impl SceneObjectFactory for EntityScene<'_, '_, '_> {
    fn instantiate(&mut self) -> SceneObjectHandle {
        let mut commands = self.commands.borrow_mut();
        let mut marker = commands.spawn((
            Name::new("Path Marker"),
            PathMarker {
                category: MarkerCategory::Mid,
            },
            Transform::IDENTITY,
            Visibility::Hidden,
        ));
        if let Some(assets) = self.assets {
            marker.insert((
                Mesh3d(assets.mesh.clone()),
                MeshMaterial3d(assets.material(MarkerCategory::Mid)),
            ));
        }
        let entity = marker.id();
        self.registry.transforms.insert(entity, Transform::IDENTITY);
        SceneObjectHandle::from_entity(entity)
    }

    fn destroy(&mut self, object: SceneObjectHandle) {
        let entity = object.to_entity();
        self.registry.transforms.remove(&entity);
        self.commands.borrow_mut().entity(entity).despawn();
    }

    fn set_transform(&mut self, object: SceneObjectHandle, transform: &Isometry3<f64>) {
        let pose = enu_iso_to_bevy_transform(transform);
        self.update_transform(object.to_entity(), |current| {
            current.translation = pose.translation;
            current.rotation = pose.rotation;
        });
    }

    fn set_parent(&mut self, object: SceneObjectHandle, parent: Option<AnchorHandle>) {
        let entity = object.to_entity();
        let mut commands = self.commands.borrow_mut();
        match parent {
            Some(anchor) => {
                commands.entity(anchor.to_entity()).add_child(entity);
            }
            None => {
                commands.entity(entity).remove::<ChildOf>();
            }
        }
    }

    fn set_category(&mut self, object: SceneObjectHandle, category: MarkerCategory) {
        let mut commands = self.commands.borrow_mut();
        let mut marker = commands.entity(object.to_entity());
        marker.insert(PathMarker { category });
        if let Some(assets) = self.assets {
            marker.insert(MeshMaterial3d(assets.material(category)));
        }
    }

    fn set_visible(&mut self, object: SceneObjectHandle, visible: bool) {
        let visibility = if visible {
            Visibility::Inherited
        } else {
            Visibility::Hidden
        };
        self.commands
            .borrow_mut()
            .entity(object.to_entity())
            .insert(visibility);
    }

    fn set_scale(&mut self, object: SceneObjectHandle, scale: f64) {
        self.update_transform(object.to_entity(), |current| {
            current.scale = Vec3::splat(scale as f32);
        });
    }
}

// =========================================================================
// == Anchors ==
// =========================================================================

/// Creates anchors as plain entities. A configurable share of creations
/// fails, standing in for anchors the platform could not resolve.
pub struct EntityAnchors<'a, 'w, 's> {
    commands: &'a RefCell<Commands<'w, 's>>,
    rng: &'a mut ChaCha8Rng,
    failure_rate: f64,
}

impl<'a, 'w, 's> EntityAnchors<'a, 'w, 's> {
    pub fn new(
        commands: &'a RefCell<Commands<'w, 's>>,
        rng: &'a mut ChaCha8Rng,
        failure_rate: f64,
    ) -> Self {
        Self {
            commands,
            rng,
            failure_rate: failure_rate.clamp(0.0, 1.0),
        }
    }
}

impl AnchorProvider for EntityAnchors<'_, '_, '_> {
    fn create_anchor(&mut self, pose: &Isometry3<f64>) -> Result<AnchorHandle, AnchorError> {
        if self.failure_rate > 0.0 && self.rng.gen_bool(self.failure_rate) {
            return Err(AnchorError("anchor could not be resolved".to_string()));
        }
        let entity = self
            .commands
            .borrow_mut()
            .spawn((
                Name::new("Marker Anchor"),
                MarkerAnchor,
                enu_iso_to_bevy_transform(pose),
                Visibility::default(),
            ))
            .id();
        Ok(AnchorHandle::from_entity(entity))
    }

    fn destroy_anchor(&mut self, anchor: AnchorHandle) {
        self.commands.borrow_mut().entity(anchor.to_entity()).despawn();
    }
}

/// Builds the shared marker mesh and the three category materials.
pub fn build_marker_assets(
    meshes: &mut Assets<Mesh>,
    materials: &mut Assets<StandardMaterial>,
) -> MarkerAssets {
    // A flat tile, long along +X so it reads as pointing down the path.
    let mesh = meshes.add(Cuboid::new(0.6, 0.05, 0.3));
    let mut material = |color: Color| {
        materials.add(StandardMaterial {
            base_color: color,
            unlit: true,
            ..default()
        })
    };
    MarkerAssets {
        mesh,
        start: material(Color::srgb(0.2, 0.85, 0.3)),
        mid: material(Color::srgb(0.2, 0.6, 1.0)),
        end: material(Color::srgb(0.95, 0.25, 0.2)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bevy::ecs::system::RunSystemOnce;
    use nalgebra::{Translation3, UnitQuaternion};
    use rand::SeedableRng;

    #[derive(Resource, Default)]
    struct Spawned(Vec<(SceneObjectHandle, AnchorHandle)>);

    fn world() -> World {
        let mut world = World::new();
        world.init_resource::<MarkerRegistry>();
        world.init_resource::<Spawned>();
        world
    }

    fn spawn_one(
        commands: Commands,
        mut registry: ResMut<MarkerRegistry>,
        mut spawned: ResMut<Spawned>,
    ) {
        let commands = RefCell::new(commands);
        let mut rng = ChaCha8Rng::seed_from_u64(5);
        let mut scene = EntityScene::new(&commands, &mut registry, None);
        let mut anchors = EntityAnchors::new(&commands, &mut rng, 0.0);

        let object = scene.instantiate();
        let pose = Isometry3::from_parts(Translation3::new(0.0, 10.0, 0.0), UnitQuaternion::identity());
        let anchor = anchors.create_anchor(&pose).unwrap();
        scene.set_parent(object, Some(anchor));
        scene.set_transform(object, &Isometry3::translation(0.0, 0.0, 0.1));
        scene.set_category(object, MarkerCategory::End);
        scene.set_scale(object, 2.0);
        scene.set_visible(object, true);
        spawned.0.push((object, anchor));
    }

    fn release_one(
        commands: Commands,
        mut registry: ResMut<MarkerRegistry>,
        spawned: Res<Spawned>,
    ) {
        let commands = RefCell::new(commands);
        let mut rng = ChaCha8Rng::seed_from_u64(5);
        let (object, anchor) = spawned.0[0];
        let mut scene = EntityScene::new(&commands, &mut registry, None);
        scene.set_parent(object, None);
        scene.set_visible(object, false);
        let mut anchors = EntityAnchors::new(&commands, &mut rng, 0.0);
        anchors.destroy_anchor(anchor);
        scene.destroy(object);
    }

    #[test]
    fn marker_is_parented_to_its_anchor_in_bevy_frame() {
        let mut world = world();
        world.run_system_once(spawn_one).unwrap();

        let (object, anchor) = world.resource::<Spawned>().0[0];
        let marker = world.entity(object.to_entity());
        assert_eq!(marker.get::<ChildOf>().map(|c| c.0), Some(anchor.to_entity()));
        assert_eq!(marker.get::<PathMarker>().unwrap().category, MarkerCategory::End);
        assert_eq!(marker.get::<Visibility>(), Some(&Visibility::Inherited));

        let local = marker.get::<Transform>().unwrap();
        assert!((local.translation - Vec3::new(0.0, 0.1, 0.0)).length() < 1e-6);
        assert_eq!(local.scale, Vec3::splat(2.0));

        let anchor_transform = world.entity(anchor.to_entity()).get::<Transform>().unwrap();
        assert!((anchor_transform.translation - Vec3::new(0.0, 0.0, -10.0)).length() < 1e-6);
        assert!(world.entity(anchor.to_entity()).contains::<MarkerAnchor>());
        assert_eq!(world.resource::<MarkerRegistry>().len(), 1);
    }

    #[test]
    fn release_and_destroy_remove_every_entity() {
        let mut world = world();
        world.run_system_once(spawn_one).unwrap();
        world.run_system_once(release_one).unwrap();

        assert_eq!(world.query::<&PathMarker>().iter(&world).count(), 0);
        assert_eq!(world.query::<&MarkerAnchor>().iter(&world).count(), 0);
        assert!(world.resource::<MarkerRegistry>().is_empty());
    }

    #[test]
    fn certain_failure_rate_refuses_anchors() {
        let mut world = world();
        let mut rng = ChaCha8Rng::seed_from_u64(9);
        let mut queue = bevy::ecs::world::CommandQueue::default();
        let commands = RefCell::new(Commands::new(&mut queue, &world));
        let mut anchors = EntityAnchors::new(&commands, &mut rng, 1.0);
        assert!(anchors.create_anchor(&Isometry3::identity()).is_err());
        drop(anchors);
        drop(commands);
        queue.apply(&mut world);
        assert_eq!(world.query::<&MarkerAnchor>().iter(&world).count(), 0);
    }
}
