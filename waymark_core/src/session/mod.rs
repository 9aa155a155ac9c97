// waymark_core/src/session/mod.rs

//! The navigation session: one route, from sensor acquisition to live markers.
//!
//! The host owns the frame loop and calls [`NavigationSession::tick`] once per
//! frame, lending the collaborators for that call. Everything the session
//! wants the host to know about comes back as [`SessionEvent`]s.

pub mod acquisition;
pub mod announcer;
pub mod guidance;
pub mod snapshot;

pub use acquisition::{SessionStage, StageClock};
pub use announcer::{format_announcement, ManeuverAnnouncer};
pub use guidance::{evaluate_guidance, GuidanceTarget};
pub use snapshot::SessionSnapshot;

use crate::config::NavigationConfig;
use crate::error::{FailureReason, Result, TimedStage, WaymarkError};
use crate::geo::{bearing_deg, haversine_distance, GeoProjector};
use crate::interfaces::{Collaborators, LocationStatus, PlaneObservation, Route, RouteRequest};
use crate::markers::{MarkerCoordinator, MarkerFrame, ReconcileReport};
use crate::path::{densify, derive_maneuvers, DensifiedPath, ManeuverPoint};
use crate::tracking::{ProgressTracker, VisibilityWindowManager};
use crate::types::{GeoPoint, RoutingProfile};
use crate::view::{observer_forward, ObserverView};
use nalgebra::{Isometry3, Point3};
use std::task::Poll;

/// What the user asked for. Handed to the session at construction.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionRequest {
    pub start: GeoPoint,
    pub destination: GeoPoint,
    pub profile: RoutingProfile,
}

/// Per-frame input from the host.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameInput {
    /// Seconds since the previous tick.
    pub dt: f64,
    /// Camera pose in the local frame.
    pub observer: Isometry3<f64>,
    pub view: ObserverView,
}

#[derive(Debug, Clone, PartialEq)]
pub enum SessionEvent {
    StageChanged { from: SessionStage, to: SessionStage },
    StatusChanged(String),
    Announcement(String),
    MarkersReconciled(ReconcileReport),
}

/// Everything that only exists once the route has been densified.
struct ActiveRoute {
    projector: GeoProjector,
    path: DensifiedPath,
    maneuvers: Vec<ManeuverPoint>,
    tracker: ProgressTracker,
    window: VisibilityWindowManager,
    markers: MarkerCoordinator,
}

pub struct NavigationSession {
    config: NavigationConfig,
    request: SessionRequest,
    stage: SessionStage,
    clock: StageClock,
    status: String,
    plane_lock: Option<PlaneObservation>,
    heading_alignment_deg: Option<f64>,
    route_pending: bool,
    route: Option<Route>,
    active: Option<ActiveRoute>,
    announcer: ManeuverAnnouncer,
    last_frame: Option<FrameInput>,
}

impl NavigationSession {
    pub fn new(config: NavigationConfig, request: SessionRequest) -> Result<Self> {
        config.validate()?;
        if !request.start.is_finite() || !request.destination.is_finite() {
            return Err(WaymarkError::InvalidInput(
                "start and destination must be finite coordinates".to_string(),
            ));
        }
        let announcer = ManeuverAnnouncer::new(&config.announcer);
        Ok(Self {
            config,
            request,
            stage: SessionStage::Idle,
            clock: StageClock::default(),
            status: SessionStage::Idle.entry_status(),
            plane_lock: None,
            heading_alignment_deg: None,
            route_pending: false,
            route: None,
            active: None,
            announcer,
            last_frame: None,
        })
    }

    /// Advances the session by one frame.
    pub fn tick(&mut self, frame: &FrameInput, collaborators: &mut Collaborators<'_>) -> Vec<SessionEvent> {
        let mut events = Vec::new();
        let frame = FrameInput {
            dt: if frame.dt.is_finite() && frame.dt > 0.0 { frame.dt } else { 0.0 },
            ..*frame
        };
        self.last_frame = Some(frame);

        match self.stage {
            SessionStage::Idle => self.advance(&mut events),
            SessionStage::AcquiringLocation => self.poll_location(&frame, collaborators, &mut events),
            SessionStage::DetectingPlane => self.poll_planes(&frame, collaborators, &mut events),
            SessionStage::AligningHeading => self.poll_heading(&frame, collaborators, &mut events),
            SessionStage::FetchingRoute => self.poll_route(collaborators, &mut events),
            SessionStage::WaitingAtPathStart => self.poll_start(&frame, collaborators, &mut events),
            SessionStage::Densifying => self.build_route(collaborators, &mut events),
            SessionStage::Navigating => self.navigate(&frame, collaborators, &mut events),
            SessionStage::Aborted(_) => {}
        }
        events
    }

    // =========================================================================
    // == Stage Polling ==
    // =========================================================================

    fn poll_location(
        &mut self,
        frame: &FrameInput,
        collaborators: &mut Collaborators<'_>,
        events: &mut Vec<SessionEvent>,
    ) {
        let location = collaborators.location;
        if location.status() == LocationStatus::Running && location.last_fix().is_some() {
            self.advance(events);
            return;
        }

        let timeout = self.config.acquisition.location_timeout_secs;
        let waited = self.clock.advance(frame.dt);
        if waited >= timeout {
            let error = WaymarkError::Timeout {
                stage: TimedStage::Location,
                waited_secs: waited,
            };
            tracing::error!("{}", error);
            self.abort(FailureReason::from(&error), collaborators, events);
            return;
        }
        let status = format!("Waiting for GPS lock... ({:.0})", self.clock.remaining_secs(timeout));
        self.set_status(status, events);
    }

    fn poll_planes(
        &mut self,
        frame: &FrameInput,
        collaborators: &mut Collaborators<'_>,
        events: &mut Vec<SessionEvent>,
    ) {
        let min_area = self.config.acquisition.min_plane_area_m2;
        if let Some(plane) = collaborators
            .planes
            .planes()
            .into_iter()
            .find(|plane| plane.is_walkable(min_area))
        {
            tracing::info!("Locked onto ground plane {} ({:.2} m²)", plane.id, plane.area_m2);
            self.plane_lock = Some(plane);
            self.advance(events);
            return;
        }

        let waited = self.clock.advance(frame.dt);
        if waited >= self.config.acquisition.plane_timeout_secs {
            let error = WaymarkError::Timeout {
                stage: TimedStage::PlaneDetection,
                waited_secs: waited,
            };
            tracing::error!("{}", error);
            self.abort(FailureReason::from(&error), collaborators, events);
        }
    }

    fn poll_heading(
        &mut self,
        frame: &FrameInput,
        collaborators: &mut Collaborators<'_>,
        events: &mut Vec<SessionEvent>,
    ) {
        if self.clock.advance(frame.dt) < self.config.acquisition.heading_settle_secs {
            return;
        }

        let forward = observer_forward(&frame.observer);
        let facing = if forward.norm_squared() > 1e-6 {
            bearing_deg(&forward)
        } else {
            0.0
        };
        let alignment = match collaborators.heading.heading_degrees().filter(|h| h.is_finite()) {
            Some(compass) => {
                tracing::info!("Compass aligned: {:.1}°", compass);
                compass - facing
            }
            None => {
                tracing::warn!("No compass heading, using camera direction as north");
                -facing
            }
        };
        self.heading_alignment_deg = Some(alignment);
        self.advance(events);
    }

    fn poll_route(&mut self, collaborators: &mut Collaborators<'_>, events: &mut Vec<SessionEvent>) {
        if !self.route_pending {
            collaborators.routing.submit(RouteRequest {
                start: self.request.start,
                destination: self.request.destination,
                profile: self.request.profile,
            });
            self.route_pending = true;
            tracing::info!("Requested {} route", self.request.profile.as_str());
        }

        match collaborators.routing.poll() {
            Poll::Pending => {}
            Poll::Ready(Ok(route)) => {
                self.route_pending = false;
                if route.geometry.len() < 2 {
                    tracing::error!(
                        "Route has {} points, at least 2 are required",
                        route.geometry.len()
                    );
                    self.abort(FailureReason::RouteUnavailable, collaborators, events);
                    return;
                }
                tracing::info!(
                    "Received route with {} points and {} steps",
                    route.geometry.len(),
                    route.steps.len()
                );
                self.route = Some(route);
                self.advance(events);
            }
            Poll::Ready(Err(e)) => {
                self.route_pending = false;
                let error = WaymarkError::from(e);
                tracing::error!("{}", error);
                self.abort(FailureReason::from(&error), collaborators, events);
            }
        }
    }

    fn poll_start(
        &mut self,
        frame: &FrameInput,
        collaborators: &mut Collaborators<'_>,
        events: &mut Vec<SessionEvent>,
    ) {
        let location = collaborators.location;
        if !self.clock.has_polled() && location.status() != LocationStatus::Running {
            self.abort(FailureReason::LocationUnavailable, collaborators, events);
            return;
        }
        if !self.clock.poll_due(frame.dt, self.config.acquisition.start_poll_interval_secs) {
            return;
        }

        let Some(start) = self.route.as_ref().and_then(|route| route.geometry.first().copied()) else {
            self.abort(FailureReason::InvalidRoute, collaborators, events);
            return;
        };
        let Some(fix) = location.last_fix() else {
            return;
        };
        let distance = haversine_distance(&fix, &start);
        if distance <= self.config.acquisition.start_proximity_m {
            tracing::info!("Observer reached the start of the route ({:.1}m)", distance);
            self.advance(events);
        } else {
            self.set_status(format!("Proceed to starting point\n({distance:.0}m away)"), events);
        }
    }

    fn build_route(&mut self, collaborators: &mut Collaborators<'_>, events: &mut Vec<SessionEvent>) {
        let Some(route) = self.route.as_ref() else {
            self.abort(FailureReason::InvalidRoute, collaborators, events);
            return;
        };
        let origin = route.geometry.first().copied().unwrap_or_default();
        let projector = GeoProjector::new(origin, self.heading_alignment_deg.unwrap_or(0.0));

        let path = match densify(
            &route.geometry,
            &projector,
            self.config.path.spacing_m,
            self.config.path.max_route_length_m,
        ) {
            Ok(path) => path,
            Err(e) => {
                tracing::error!("Route processing failed: {}", e);
                self.abort(FailureReason::from(&e), collaborators, events);
                return;
            }
        };
        let maneuvers = derive_maneuvers(&route.steps, &projector);
        let markers = MarkerCoordinator::new(&self.config.markers, &mut *collaborators.scene);

        let mut window = VisibilityWindowManager::new(&self.config.tracking);
        window.force_next();
        self.active = Some(ActiveRoute {
            projector,
            path,
            maneuvers,
            tracker: ProgressTracker::from_config(&self.config.tracking),
            window,
            markers,
        });
        self.announcer.reset();
        self.advance(events);
    }

    fn navigate(
        &mut self,
        frame: &FrameInput,
        collaborators: &mut Collaborators<'_>,
        events: &mut Vec<SessionEvent>,
    ) {
        let ground_height = self.plane_lock.as_ref().map(PlaneObservation::height);
        let Some(active) = self.active.as_mut() else {
            return;
        };
        let observer = Point3::from(frame.observer.translation.vector);

        let closest = active.tracker.update(&observer, &active.path);
        if let Some(window) = active.window.update(&observer, closest, &active.path) {
            let marker_frame = MarkerFrame {
                observer: &frame.observer,
                view: &frame.view,
                ground_height,
            };
            let report = active
                .markers
                .reconcile(&window, &active.path, &marker_frame, collaborators);
            if report.needs_retry() {
                active.window.force_next();
            }
            if !report.is_empty() {
                events.push(SessionEvent::MarkersReconciled(report));
            }
        }
        active.markers.update_scales(&observer, &mut *collaborators.scene);

        if let Some(text) = self.announcer.check(&observer, &active.maneuvers) {
            events.push(SessionEvent::Announcement(text));
        }
    }

    // =========================================================================
    // == Transitions ==
    // =========================================================================

    fn advance(&mut self, events: &mut Vec<SessionEvent>) {
        let offline = self.config.acquisition.offline_mode;
        match self.stage.successor(offline) {
            Some(next) => self.enter(next, events),
            None => tracing::debug!("{} has no successor stage", self.stage),
        }
    }

    fn enter(&mut self, next: SessionStage, events: &mut Vec<SessionEvent>) {
        let previous = self.stage;
        tracing::info!("Navigation stage {} -> {}", previous, next);
        self.stage = next;
        self.clock = StageClock::default();
        events.push(SessionEvent::StageChanged {
            from: previous,
            to: next,
        });
        self.set_status(next.entry_status(), events);
    }

    fn set_status(&mut self, status: String, events: &mut Vec<SessionEvent>) {
        if self.status != status {
            self.status = status.clone();
            events.push(SessionEvent::StatusChanged(status));
        }
    }

    /// Ends the session and releases everything it acquired. A session that is
    /// already aborted is left untouched.
    fn abort(
        &mut self,
        reason: FailureReason,
        collaborators: &mut Collaborators<'_>,
        events: &mut Vec<SessionEvent>,
    ) {
        if self.stage.is_aborted() {
            return;
        }
        tracing::warn!("Aborting navigation in {}: {:?}", self.stage, reason);

        if let Some(mut active) = self.active.take() {
            active.markers.clear(collaborators);
        }
        if let Some(plane) = self.plane_lock.take() {
            collaborators.planes.release_lock(plane.id);
        }
        if self.route_pending {
            collaborators.routing.cancel();
            self.route_pending = false;
        }
        self.enter(SessionStage::Aborted(reason), events);
    }

    /// Stops the session from any stage, releasing markers, anchors, the
    /// plane lock and any in-flight route request.
    pub fn cancel(&mut self, collaborators: &mut Collaborators<'_>) -> Vec<SessionEvent> {
        let mut events = Vec::new();
        self.abort(FailureReason::Cancelled, collaborators, &mut events);
        events
    }

    // =========================================================================
    // == Queries ==
    // =========================================================================

    pub fn stage(&self) -> SessionStage {
        self.stage
    }

    pub fn status(&self) -> &str {
        &self.status
    }

    pub fn failure_reason(&self) -> Option<FailureReason> {
        match self.stage {
            SessionStage::Aborted(reason) => Some(reason),
            _ => None,
        }
    }

    pub fn config(&self) -> &NavigationConfig {
        &self.config
    }

    pub fn request(&self) -> &SessionRequest {
        &self.request
    }

    pub fn plane_lock(&self) -> Option<&PlaneObservation> {
        self.plane_lock.as_ref()
    }

    pub fn heading_alignment_deg(&self) -> Option<f64> {
        self.heading_alignment_deg
    }

    pub fn route(&self) -> Option<&Route> {
        self.route.as_ref()
    }

    pub fn projector(&self) -> Option<&GeoProjector> {
        self.active.as_ref().map(|active| &active.projector)
    }

    pub fn path(&self) -> Option<&DensifiedPath> {
        self.active.as_ref().map(|active| &active.path)
    }

    pub fn maneuvers(&self) -> &[ManeuverPoint] {
        self.active
            .as_ref()
            .map_or(&[][..], |active| active.maneuvers.as_slice())
    }

    pub fn markers(&self) -> Option<&MarkerCoordinator> {
        self.active.as_ref().map(|active| &active.markers)
    }

    pub fn closest_index(&self) -> Option<usize> {
        self.active.as_ref().map(|active| active.tracker.closest_index())
    }

    pub fn set_announcements_enabled(&mut self, enabled: bool) {
        self.announcer.set_enabled(enabled);
    }

    pub fn announcements_enabled(&self) -> bool {
        self.announcer.is_enabled()
    }

    /// Where the guidance beacon should point, based on the last tick.
    ///
    /// While waiting at the start this is the first route point. While
    /// navigating it is the next spawned marker ahead. Otherwise there is no
    /// target.
    pub fn guidance(&self) -> Option<GuidanceTarget> {
        let frame = self.last_frame.as_ref()?;
        let target = match self.stage {
            // The route's first point is the local origin.
            SessionStage::WaitingAtPathStart => {
                let fallback = frame.observer.translation.vector.z
                    - self.config.markers.fallback_ground_offset_m;
                let ground = self
                    .plane_lock
                    .as_ref()
                    .map_or(fallback, PlaneObservation::height);
                Point3::new(0.0, 0.0, ground)
            }
            SessionStage::Navigating => {
                let active = self.active.as_ref()?;
                active
                    .markers
                    .next_marker_ahead(active.tracker.closest_index())?
            }
            _ => return None,
        };
        Some(evaluate_guidance(&frame.view, &frame.observer, target))
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        let pool = self.active.as_ref().map(|active| active.markers.pool());
        SessionSnapshot {
            stage: self.stage,
            status: self.status.clone(),
            plane_locked: self.plane_lock.is_some(),
            heading_alignment_deg: self.heading_alignment_deg,
            path_vertices: self.path().map_or(0, DensifiedPath::len),
            path_length_m: self.path().map_or(0.0, DensifiedPath::total_length),
            active_markers: pool.map_or(0, |pool| pool.bound_count()),
            pool_capacity: pool.map_or(self.config.markers.pool_size, |pool| pool.capacity()),
            free_markers: pool.map_or(0, |pool| pool.free_count()),
            overflow_markers: pool.map_or(0, |pool| pool.overflow_count()),
            observer_position: self
                .last_frame
                .as_ref()
                .map(|frame| Point3::from(frame.observer.translation.vector)),
            closest_index: self.closest_index(),
        }
    }
}
