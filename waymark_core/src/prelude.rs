// waymark_core/src/prelude.rs

// --- Host Contracts ---
pub use crate::interfaces::{
    AnchorProvider, Collaborators, GroundPlaneSource, HeadingSource, LocationSource,
    LocationStatus, PlaneAlignment, PlaneObservation, PlaneTracking, Route, RouteRequest,
    RouteStep, RoutingBackend, SceneObjectFactory, SurfaceProbe,
};

// --- Core Data Structures ---
pub use crate::config::NavigationConfig;
pub use crate::error::{AnchorError, FailureReason, RoutingError, WaymarkError};
pub use crate::path::{DensifiedPath, ManeuverPoint, PathVertex};
pub use crate::types::{AnchorHandle, GeoPoint, MarkerCategory, RoutingProfile, SceneObjectHandle, SlotId};
pub use crate::view::ObserverView;

// --- Algorithms ---
pub use crate::geo::{haversine_distance, GeoProjector};
pub use crate::markers::{MarkerCoordinator, MarkerPool, ReconcileReport};
pub use crate::path::densify;
pub use crate::tracking::{compute_window, ProgressTracker, VisibilityWindow, VisibilityWindowManager};

// --- Session ---
pub use crate::session::{
    FrameInput, GuidanceTarget, NavigationSession, SessionEvent, SessionRequest, SessionSnapshot,
    SessionStage,
};
