// waymark_core/tests/common/mod.rs

//! In-memory collaborators for driving a session without a device.

#![allow(dead_code)]

use nalgebra::{Isometry3, Point2, Translation3, UnitQuaternion};
use std::collections::{HashMap, HashSet};
use std::f64::consts::FRAC_PI_2;
use std::task::Poll;
use waymark_core::prelude::*;

pub const NORTH_111M: GeoPoint = GeoPoint::new(0.001, 0.0);

pub struct FakeLocation {
    pub status: LocationStatus,
    pub fix: Option<GeoPoint>,
}

impl LocationSource for FakeLocation {
    fn status(&self) -> LocationStatus {
        self.status
    }
    fn last_fix(&self) -> Option<GeoPoint> {
        self.fix
    }
}

pub struct FakeHeading(pub Option<f64>);

impl HeadingSource for FakeHeading {
    fn heading_degrees(&self) -> Option<f64> {
        self.0
    }
}

#[derive(Default)]
pub struct FakePlanes {
    pub planes: Vec<PlaneObservation>,
    pub released: Vec<u64>,
}

impl GroundPlaneSource for FakePlanes {
    fn planes(&self) -> Vec<PlaneObservation> {
        self.planes.clone()
    }
    fn release_lock(&mut self, id: u64) {
        self.released.push(id);
    }
}

/// Never hits, so every marker falls back to the estimated ground pose.
#[derive(Default)]
pub struct FakeProbe {
    pub calls: usize,
}

impl SurfaceProbe for FakeProbe {
    fn probe(&mut self, _view_point: Point2<f64>) -> Option<Isometry3<f64>> {
        self.calls += 1;
        None
    }
}

#[derive(Default)]
pub struct FakeRouter {
    pub response: Option<Result<Route, RoutingError>>,
    pub pending_polls: usize,
    pub submitted: Vec<RouteRequest>,
    pub cancelled: usize,
}

impl RoutingBackend for FakeRouter {
    fn submit(&mut self, request: RouteRequest) {
        self.submitted.push(request);
    }
    fn poll(&mut self) -> Poll<Result<Route, RoutingError>> {
        if self.pending_polls > 0 {
            self.pending_polls -= 1;
            return Poll::Pending;
        }
        match self.response.take() {
            Some(response) => Poll::Ready(response),
            None => Poll::Pending,
        }
    }
    fn cancel(&mut self) {
        self.cancelled += 1;
    }
}

#[derive(Default)]
pub struct FakeScene {
    next: u64,
    pub alive: HashSet<u64>,
    pub visible: HashSet<u64>,
    pub parents: HashMap<u64, AnchorHandle>,
    pub categories: HashMap<u64, MarkerCategory>,
    pub scales: HashMap<u64, f64>,
}

impl SceneObjectFactory for FakeScene {
    fn instantiate(&mut self) -> SceneObjectHandle {
        self.next += 1;
        self.alive.insert(self.next);
        SceneObjectHandle(self.next)
    }
    fn destroy(&mut self, object: SceneObjectHandle) {
        assert!(self.alive.remove(&object.0), "object {} destroyed twice", object.0);
        self.visible.remove(&object.0);
        self.parents.remove(&object.0);
    }
    fn set_transform(&mut self, object: SceneObjectHandle, _transform: &Isometry3<f64>) {
        assert!(self.alive.contains(&object.0));
    }
    fn set_parent(&mut self, object: SceneObjectHandle, parent: Option<AnchorHandle>) {
        match parent {
            Some(anchor) => self.parents.insert(object.0, anchor),
            None => self.parents.remove(&object.0),
        };
    }
    fn set_category(&mut self, object: SceneObjectHandle, category: MarkerCategory) {
        self.categories.insert(object.0, category);
    }
    fn set_visible(&mut self, object: SceneObjectHandle, visible: bool) {
        if visible {
            self.visible.insert(object.0);
        } else {
            self.visible.remove(&object.0);
        }
    }
    fn set_scale(&mut self, object: SceneObjectHandle, scale: f64) {
        self.scales.insert(object.0, scale);
    }
}

#[derive(Default)]
pub struct FakeAnchors {
    next: u64,
    pub alive: HashSet<u64>,
    /// The next `fail_next` creations return an error.
    pub fail_next: usize,
    pub failures: usize,
}

impl AnchorProvider for FakeAnchors {
    fn create_anchor(&mut self, _pose: &Isometry3<f64>) -> Result<AnchorHandle, AnchorError> {
        if self.fail_next > 0 {
            self.fail_next -= 1;
            self.failures += 1;
            return Err(AnchorError("tracking lost".to_string()));
        }
        self.next += 1;
        self.alive.insert(self.next);
        Ok(AnchorHandle(self.next))
    }
    fn destroy_anchor(&mut self, anchor: AnchorHandle) {
        assert!(self.alive.remove(&anchor.0), "anchor {} destroyed twice", anchor.0);
    }
}

pub struct FakeWorld {
    pub location: FakeLocation,
    pub heading: FakeHeading,
    pub planes: FakePlanes,
    pub probe: FakeProbe,
    pub router: FakeRouter,
    pub scene: FakeScene,
    pub anchors: FakeAnchors,
}

impl FakeWorld {
    /// Location running at the route start, compass pointing north, no
    /// planes yet and a router that answers with `route` on the first poll.
    pub fn new(route: Route) -> Self {
        Self {
            location: FakeLocation {
                status: LocationStatus::Running,
                fix: route.geometry.first().copied(),
            },
            heading: FakeHeading(Some(0.0)),
            planes: FakePlanes::default(),
            probe: FakeProbe::default(),
            router: FakeRouter {
                response: Some(Ok(route)),
                ..Default::default()
            },
            scene: FakeScene::default(),
            anchors: FakeAnchors::default(),
        }
    }

    pub fn collaborators(&mut self) -> Collaborators<'_> {
        Collaborators {
            location: &self.location,
            heading: &self.heading,
            planes: &mut self.planes,
            surface: &mut self.probe,
            routing: &mut self.router,
            scene: &mut self.scene,
            anchors: &mut self.anchors,
        }
    }
}

pub fn straight_route() -> Route {
    Route {
        geometry: vec![GeoPoint::new(0.0, 0.0), NORTH_111M],
        steps: vec![RouteStep {
            location: GeoPoint::new(0.0, 0.0),
            instruction: "Head north".to_string(),
            distance_m: 111.32,
        }],
    }
}

pub fn request() -> SessionRequest {
    SessionRequest {
        start: GeoPoint::new(0.0, 0.0),
        destination: NORTH_111M,
        profile: RoutingProfile::Walking,
    }
}

pub fn ground_plane(id: u64, height: f64) -> PlaneObservation {
    PlaneObservation {
        id,
        alignment: PlaneAlignment::HorizontalUp,
        tracking: PlaneTracking::Tracking,
        area_m2: 4.0,
        pose: Isometry3::from_parts(Translation3::new(0.0, 0.0, height), UnitQuaternion::identity()),
    }
}

/// Observer standing at local `(x, y)` with eyes 1.6 m up, facing local north.
pub fn frame_at(x: f64, y: f64, dt: f64) -> FrameInput {
    FrameInput {
        dt,
        observer: Isometry3::from_parts(
            Translation3::new(x, y, 1.6),
            UnitQuaternion::from_euler_angles(0.0, 0.0, FRAC_PI_2),
        ),
        view: ObserverView::default(),
    }
}

/// Ticks until `done` holds or `max_ticks` is reached, returning all events.
pub fn tick_until(
    session: &mut NavigationSession,
    world: &mut FakeWorld,
    frame: &FrameInput,
    max_ticks: usize,
    done: impl Fn(&NavigationSession) -> bool,
) -> Vec<SessionEvent> {
    let mut events = Vec::new();
    for _ in 0..max_ticks {
        if done(session) {
            break;
        }
        events.extend(session.tick(frame, &mut world.collaborators()));
    }
    events
}

pub fn statuses(events: &[SessionEvent]) -> Vec<String> {
    events
        .iter()
        .filter_map(|event| match event {
            SessionEvent::StatusChanged(status) => Some(status.clone()),
            _ => None,
        })
        .collect()
}
