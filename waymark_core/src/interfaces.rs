// waymark_core/src/interfaces.rs

//! Contracts for everything the core consumes but does not implement.
//!
//! The session never owns a collaborator. The host lends them for the
//! duration of one `tick` through [`Collaborators`].

use crate::error::{AnchorError, RoutingError};
use crate::types::{AnchorHandle, GeoPoint, MarkerCategory, RoutingProfile, SceneObjectHandle};
use nalgebra::{Isometry3, Point2, Vector3};
use std::task::Poll;

// --- LOCATION ---

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LocationStatus {
    Stopped,
    Initializing,
    Running,
    Failed,
}

pub trait LocationSource {
    fn status(&self) -> LocationStatus;

    /// Most recent fix, if the service has produced one.
    fn last_fix(&self) -> Option<GeoPoint>;
}

// --- GROUND PLANES ---

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PlaneAlignment {
    HorizontalUp,
    HorizontalDown,
    Vertical,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PlaneTracking {
    Tracking,
    Limited,
    Lost,
}

/// A detected surface as reported by the platform.
#[derive(Debug, Clone, PartialEq)]
pub struct PlaneObservation {
    pub id: u64,
    pub alignment: PlaneAlignment,
    pub tracking: PlaneTracking,
    pub area_m2: f64,
    /// Plane center and orientation in the local frame. +Z is the plane normal.
    pub pose: Isometry3<f64>,
}

impl PlaneObservation {
    /// Walkable ground: facing up, actively tracked and larger than `min_area`.
    pub fn is_walkable(&self, min_area: f64) -> bool {
        self.alignment == PlaneAlignment::HorizontalUp
            && self.tracking == PlaneTracking::Tracking
            && self.area_m2 > min_area
    }

    pub fn height(&self) -> f64 {
        self.pose.translation.vector.z
    }
}

pub trait GroundPlaneSource {
    fn planes(&self) -> Vec<PlaneObservation>;

    /// Lets the platform stop treating `id` as the session's ground.
    fn release_lock(&mut self, id: u64);
}

// --- SURFACE PROBE ---

pub trait SurfaceProbe {
    /// Casts from a view-space pixel onto detected surfaces. Returns the hit pose
    /// in the local frame, +Z along the surface normal.
    fn probe(&mut self, view_point: Point2<f64>) -> Option<Isometry3<f64>>;
}

// --- HEADING ---

pub trait HeadingSource {
    /// Compass heading of the observer's facing, degrees clockwise from true north.
    fn heading_degrees(&self) -> Option<f64>;
}

// --- ROUTING ---

#[derive(Debug, Clone, PartialEq)]
pub struct RouteRequest {
    pub start: GeoPoint,
    pub destination: GeoPoint,
    pub profile: RoutingProfile,
}

/// A single turn-by-turn instruction attached to a route.
#[derive(Debug, Clone, PartialEq)]
pub struct RouteStep {
    pub location: GeoPoint,
    pub instruction: String,
    pub distance_m: f64,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Route {
    pub geometry: Vec<GeoPoint>,
    pub steps: Vec<RouteStep>,
}

/// An asynchronous routing service driven by polling.
pub trait RoutingBackend {
    fn submit(&mut self, request: RouteRequest);

    /// `Poll::Pending` until the submitted request resolves.
    fn poll(&mut self) -> Poll<Result<Route, RoutingError>>;

    /// Drops the in-flight request, if any.
    fn cancel(&mut self);
}

// --- SCENE ---

/// Creates and mutates marker visuals. Transforms are relative to the parent
/// anchor when one is set, otherwise to the local frame.
pub trait SceneObjectFactory {
    fn instantiate(&mut self) -> SceneObjectHandle;
    fn destroy(&mut self, object: SceneObjectHandle);
    fn set_transform(&mut self, object: SceneObjectHandle, transform: &Isometry3<f64>);
    fn set_parent(&mut self, object: SceneObjectHandle, parent: Option<AnchorHandle>);
    fn set_category(&mut self, object: SceneObjectHandle, category: MarkerCategory);
    fn set_visible(&mut self, object: SceneObjectHandle, visible: bool);
    fn set_scale(&mut self, object: SceneObjectHandle, scale: f64);
}

pub trait AnchorProvider {
    fn create_anchor(&mut self, pose: &Isometry3<f64>) -> Result<AnchorHandle, AnchorError>;
    fn destroy_anchor(&mut self, anchor: AnchorHandle);
}

/// Everything a session needs for one tick.
pub struct Collaborators<'a> {
    pub location: &'a dyn LocationSource,
    pub heading: &'a dyn HeadingSource,
    pub planes: &'a mut dyn GroundPlaneSource,
    pub surface: &'a mut dyn SurfaceProbe,
    pub routing: &'a mut dyn RoutingBackend,
    pub scene: &'a mut dyn SceneObjectFactory,
    pub anchors: &'a mut dyn AnchorProvider,
}

/// Up axis of a pose, +Z of its rotation.
pub(crate) fn pose_up(pose: &Isometry3<f64>) -> Vector3<f64> {
    pose.rotation * Vector3::z()
}
