// waymark_sim/src/simulation/plugins/routing/mod.rs

//! A routing service stand-in. Answers every request with the scenario's
//! route geometry after a fixed latency.

use crate::prelude::*;
use std::task::Poll;
use waymark_core::interfaces::{Route, RouteRequest, RouteStep, RoutingBackend};

#[derive(Resource, Debug)]
pub struct SimulatedRouter {
    waypoints: Vec<GeoPoint>,
    steps: Vec<RouteStep>,
    latency_secs: f64,
    fail: bool,
    in_flight: Option<InFlight>,
}

#[derive(Debug)]
struct InFlight {
    request: RouteRequest,
    remaining_secs: f64,
}

impl SimulatedRouter {
    pub fn new(route: &RouteConfig, config: &RoutingConfig) -> Self {
        let steps = route
            .steps
            .iter()
            .map(|step| RouteStep {
                location: step.location,
                instruction: step.instruction.clone(),
                distance_m: step.distance_m,
            })
            .collect();
        Self {
            waypoints: route.waypoints.clone(),
            steps,
            latency_secs: config.latency_secs.max(0.0),
            fail: config.fail,
            in_flight: None,
        }
    }

    /// Lets simulated time pass for the in-flight request.
    pub fn advance(&mut self, dt: f64) {
        if let Some(in_flight) = self.in_flight.as_mut() {
            in_flight.remaining_secs -= dt;
        }
    }

    pub fn is_busy(&self) -> bool {
        self.in_flight.is_some()
    }
}

impl RoutingBackend for SimulatedRouter {
    fn submit(&mut self, request: RouteRequest) {
        info!(
            "[ROUTING] {} route requested from ({:.5}, {:.5}) to ({:.5}, {:.5})",
            request.profile.as_str(),
            request.start.latitude,
            request.start.longitude,
            request.destination.latitude,
            request.destination.longitude
        );
        self.in_flight = Some(InFlight {
            request,
            remaining_secs: self.latency_secs,
        });
    }

    fn poll(&mut self) -> Poll<Result<Route, RoutingError>> {
        let Some(in_flight) = self.in_flight.as_ref() else {
            return Poll::Ready(Err(RoutingError::Backend("no request in flight".to_string())));
        };
        if in_flight.remaining_secs > 0.0 {
            return Poll::Pending;
        }
        let Some(InFlight { request, .. }) = self.in_flight.take() else {
            return Poll::Pending;
        };
        if self.fail {
            return Poll::Ready(Err(RoutingError::Backend(
                "simulated service unavailable".to_string(),
            )));
        }

        let geometry: Vec<GeoPoint> = std::iter::once(request.start)
            .chain(self.waypoints.iter().copied())
            .chain(std::iter::once(request.destination))
            .collect();
        info!(
            "[ROUTING] Route ready: {} points, {} steps",
            geometry.len(),
            self.steps.len()
        );
        Poll::Ready(Ok(Route {
            geometry,
            steps: self.steps.clone(),
        }))
    }

    fn cancel(&mut self) {
        if self.in_flight.take().is_some() {
            info!("[ROUTING] In-flight request cancelled");
        }
    }
}

pub struct RoutingPlugin;

impl Plugin for RoutingPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(
            OnEnter(AppState::SceneBuilding),
            spawn_router.in_set(SceneBuildSet::Services),
        )
        .add_systems(
            FixedUpdate,
            routing_latency_system.in_set(SimulationSet::Sensors),
        );
    }
}

fn spawn_router(mut commands: Commands, config: Res<ScenarioConfig>) {
    info!(
        "  -> Starting routing service with {:.1}s latency",
        config.sensors.routing.latency_secs
    );
    commands.insert_resource(SimulatedRouter::new(&config.route, &config.sensors.routing));
}

fn routing_latency_system(time: Res<Time>, mut router: ResMut<SimulatedRouter>) {
    router.advance(time.delta_secs_f64());
}

#[cfg(test)]
mod tests {
    use super::*;

    fn route() -> RouteConfig {
        RouteConfig {
            start: GeoPoint::new(0.0, 0.0),
            destination: GeoPoint::new(0.002, 0.0),
            waypoints: vec![GeoPoint::new(0.001, 0.0)],
            steps: vec![StepConfig {
                location: GeoPoint::new(0.0, 0.0),
                instruction: "Head north".to_string(),
                distance_m: 222.6,
            }],
            ..RouteConfig::default()
        }
    }

    fn request() -> RouteRequest {
        RouteRequest {
            start: GeoPoint::new(0.0, 0.0),
            destination: GeoPoint::new(0.002, 0.0),
            profile: RoutingProfile::Walking,
        }
    }

    #[test]
    fn answers_after_latency_with_request_endpoints() {
        let mut router = SimulatedRouter::new(&route(), &RoutingConfig { latency_secs: 1.0, fail: false });
        router.submit(request());
        assert!(router.poll().is_pending());
        router.advance(0.6);
        assert!(router.poll().is_pending());
        router.advance(0.6);
        match router.poll() {
            Poll::Ready(Ok(route)) => {
                assert_eq!(route.geometry.len(), 3);
                assert_eq!(route.geometry[2], GeoPoint::new(0.002, 0.0));
                assert_eq!(route.steps[0].instruction, "Head north");
            }
            other => panic!("expected a route, got {other:?}"),
        }
        assert!(!router.is_busy());
    }

    #[test]
    fn failing_backend_reports_an_error() {
        let mut router = SimulatedRouter::new(&route(), &RoutingConfig { latency_secs: 0.0, fail: true });
        router.submit(request());
        assert!(matches!(router.poll(), Poll::Ready(Err(RoutingError::Backend(_)))));
    }

    #[test]
    fn cancel_drops_the_request() {
        let mut router = SimulatedRouter::new(&route(), &RoutingConfig::default());
        router.submit(request());
        router.cancel();
        assert!(!router.is_busy());
    }
}
