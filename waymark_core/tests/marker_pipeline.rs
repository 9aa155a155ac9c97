// waymark_core/tests/marker_pipeline.rs

mod common;

use common::*;
use nalgebra::{Isometry3, Point3, Translation3, UnitQuaternion};
use waymark_core::markers::MarkerFrame;
use waymark_core::prelude::*;

fn projector() -> GeoProjector {
    GeoProjector::new(GeoPoint::new(0.0, 0.0), 0.0)
}

/// An L-shaped walk: 200 m north, then 150 m east.
fn l_shaped_path() -> DensifiedPath {
    let corner = GeoPoint::new(200.0 / 111_320.0, 0.0);
    let end = GeoPoint::new(corner.latitude, 150.0 / 111_320.0);
    densify(&[GeoPoint::new(0.0, 0.0), corner, end], &projector(), 10.0, 20_000.0).unwrap()
}

#[test]
fn endpoint_window_matches_the_first_four_vertices() {
    let path = densify(&[GeoPoint::new(0.0, 0.0), NORTH_111M], &projector(), 10.0, 20_000.0).unwrap();
    let window = compute_window(&path, 0, 5.0, 30.0);
    assert_eq!(window.indices(), 0..4);
}

#[test]
fn bound_markers_always_equal_the_window() {
    let path = l_shaped_path();
    let mut world = FakeWorld::new(straight_route());
    let config = NavigationConfig::default();
    let mut markers = MarkerCoordinator::new(&config.markers, &mut world.scene);
    let mut tracker = ProgressTracker::from_config(&config.tracking);
    let view = ObserverView::default();

    // Walk along, stop, step back a little, then continue around the corner.
    let mut positions: Vec<Point3<f64>> = (0..=190).map(|y| Point3::new(0.5, y as f64, 1.6)).collect();
    positions.extend((0..20).map(|i| Point3::new(0.5, 190.0 - i as f64, 1.6)));
    positions.extend((170..=200).map(|y| Point3::new(0.5, y as f64, 1.6)));
    positions.extend((0..=150).map(|x| Point3::new(x as f64, 200.5, 1.6)));

    let mut previous_closest = 0;
    for position in positions {
        let observer = Isometry3::from_parts(Translation3::from(position.coords), UnitQuaternion::identity());
        let closest = tracker.update(&position, &path);
        assert!(closest + 5 >= previous_closest, "tracker jumped back more than its look-back");
        previous_closest = closest;

        let window = compute_window(&path, closest, 10.0, 50.0);
        let frame = MarkerFrame {
            observer: &observer,
            view: &view,
            ground_height: Some(0.0),
        };
        markers.reconcile(&window, &path, &frame, &mut world.collaborators());

        let expected: Vec<usize> = window.indices().collect();
        assert_eq!(markers.pool().bound_indices(), expected);
        assert_eq!(world.anchors.alive.len(), expected.len());
    }

    assert_eq!(tracker.closest_index(), path.len() - 1);
    markers.clear(&mut world.collaborators());
    assert!(world.anchors.alive.is_empty());
    assert!(world.scene.alive.is_empty());
}

#[test]
fn end_markers_are_styled_as_the_end() {
    let path = l_shaped_path();
    let mut world = FakeWorld::new(straight_route());
    let config = NavigationConfig::default();
    let mut markers = MarkerCoordinator::new(&config.markers, &mut world.scene);
    let observer = Isometry3::translation(150.0, 200.0, 1.6);
    let view = ObserverView::default();

    let last = path.len() - 1;
    let window = compute_window(&path, last, 25.0, 50.0);
    assert_eq!(window.indices(), last - 2..last + 1);
    let frame = MarkerFrame {
        observer: &observer,
        view: &view,
        ground_height: None,
    };
    markers.reconcile(&window, &path, &frame, &mut world.collaborators());

    for index in [last - 1, last] {
        let slot = markers.pool().slot_for_index(index).unwrap();
        let object = markers.pool().handle(slot).unwrap().object;
        assert_eq!(world.scene.categories[&object.0], MarkerCategory::End);
    }
    let slot = markers.pool().slot_for_index(last - 2).unwrap();
    let object = markers.pool().handle(slot).unwrap().object;
    assert_eq!(world.scene.categories[&object.0], MarkerCategory::Mid);
}

#[test]
fn only_on_screen_markers_are_probed() {
    let path = densify(&[GeoPoint::new(0.0, 0.0), NORTH_111M], &projector(), 10.0, 20_000.0).unwrap();
    let mut world = FakeWorld::new(straight_route());
    let config = NavigationConfig::default();
    let mut markers = MarkerCoordinator::new(&config.markers, &mut world.scene);
    let view = ObserverView::default();

    // 5 m west of the path looking east: the vertex at y = 50 is straight
    // ahead, its neighbours at y = 40 and y = 60 are far off to the sides.
    let observer = Isometry3::translation(-5.0, 50.0, 1.6);
    let window = compute_window(&path, 5, 10.0, 10.0);
    assert_eq!(window.indices(), 4..7);
    let frame = MarkerFrame {
        observer: &observer,
        view: &view,
        ground_height: Some(0.0),
    };
    markers.reconcile(&window, &path, &frame, &mut world.collaborators());

    assert_eq!(world.probe.calls, 1);
    assert_eq!(markers.pool().bound_indices(), vec![4, 5, 6]);
    assert_eq!(world.anchors.alive.len(), 3);
}
