use crate::prelude::*;
use crate::simulation::core::transforms::observer_camera_transform;
use crate::simulation::plugins::observer::ObserverCamera;
use avian3d::prelude::*;

const GROUND_THICKNESS: f32 = 0.1;

pub struct WorldSpawnerPlugin;

impl Plugin for WorldSpawnerPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(
            OnEnter(AppState::SceneBuilding),
            (
                spawn_lighting,
                spawn_ground.in_set(SceneBuildSet::World),
                // The camera starts at the observer's pose, so it needs the walker.
                spawn_observer_camera.after(SceneBuildSet::Observer),
            ),
        );
    }
}

fn spawn_lighting(mut commands: Commands) {
    commands.spawn((
        Name::new("Sun"),
        DirectionalLight {
            shadows_enabled: true,
            illuminance: 15_000.0,
            ..default()
        },
        Transform::from_xyz(0.0, 50.0, 0.0).looking_at(Vec3::new(10.0, 0.0, -20.0), Vec3::Y),
    ));
}

/// The walkable ground: a static collider for the surface probe to hit, with a
/// visual plane on top when rendering is available.
fn spawn_ground(
    mut commands: Commands,
    config: Res<ScenarioConfig>,
    meshes: Option<ResMut<Assets<Mesh>>>,
    materials: Option<ResMut<Assets<StandardMaterial>>>,
) {
    let extent = (config.world.ground_half_extent_m * 2.0) as f32;
    let height = config.world.ground_height_m as f32;
    info!(
        "[SCENE] Spawning {:.0}m ground at height {:.2}m",
        extent, height
    );

    let ground = commands
        .spawn((
            Name::new("Ground"),
            RigidBody::Static,
            Collider::cuboid(extent, GROUND_THICKNESS, extent),
            Transform::from_xyz(0.0, height - GROUND_THICKNESS / 2.0, 0.0),
            Visibility::default(),
        ))
        .id();

    if let (Some(mut meshes), Some(mut materials)) = (meshes, materials) {
        let plane = commands
            .spawn((
                Name::new("Ground Surface"),
                Mesh3d(meshes.add(Plane3d::default().mesh().size(extent, extent))),
                MeshMaterial3d(materials.add(Color::srgb(0.35, 0.38, 0.35))),
                Transform::from_xyz(0.0, GROUND_THICKNESS / 2.0, 0.0),
            ))
            .id();
        commands.entity(ground).add_child(plane);
    }
}

fn spawn_observer_camera(mut commands: Commands, observer: Res<WalkingObserver>) {
    commands.spawn((
        Name::new("Observer Camera"),
        Camera3d::default(),
        ObserverCamera,
        observer_camera_transform(&observer.pose()),
    ));
}
