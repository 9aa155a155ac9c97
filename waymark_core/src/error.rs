//! Error types for waymark_core

use std::fmt;
use thiserror::Error;

/// Stages of the acquisition sequence that can run out of time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TimedStage {
    Location,
    PlaneDetection,
}

impl fmt::Display for TimedStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TimedStage::Location => write!(f, "location acquisition"),
            TimedStage::PlaneDetection => write!(f, "ground plane detection"),
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum WaymarkError {
    /// Malformed or insufficient input (route geometry, configuration).
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Timed out during {stage} after {waited_secs:.1}s")]
    Timeout { stage: TimedStage, waited_secs: f64 },

    /// A collaborator (routing backend, surface probe) returned nothing usable.
    #[error("External failure: {0}")]
    ExternalFailure(String),

    /// Non-fatal. Raised only for logging when the marker pool overflows.
    #[error("Marker pool exhausted ({capacity} pre-allocated), allocated overflow slot {slot}")]
    ResourceExhaustion { capacity: usize, slot: usize },

    #[error("Path index {index} is already bound to slot {slot}")]
    DuplicateBinding { index: usize, slot: usize },
}

pub type Result<T> = std::result::Result<T, WaymarkError>;

/// Failure reported by a `RoutingBackend`.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum RoutingError {
    #[error("No route found between the requested points")]
    NoRoute,

    #[error("Routing request was cancelled")]
    Cancelled,

    #[error("Routing backend error: {0}")]
    Backend(String),
}

/// Failure reported by an `AnchorProvider`. Recovered per index.
#[derive(Error, Debug, Clone, PartialEq)]
#[error("Anchor creation failed: {0}")]
pub struct AnchorError(pub String);

impl From<RoutingError> for WaymarkError {
    fn from(error: RoutingError) -> Self {
        WaymarkError::ExternalFailure(error.to_string())
    }
}

/// Machine-checkable cause carried by an aborted session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FailureReason {
    LocationTimeout,
    LocationUnavailable,
    PlaneTimeout,
    RouteUnavailable,
    InvalidRoute,
    Cancelled,
}

impl FailureReason {
    /// The human-readable status shown to the user for this failure.
    pub fn status_message(&self) -> &'static str {
        match self {
            FailureReason::LocationTimeout => "GPS signal lost or timed out.",
            FailureReason::LocationUnavailable => "GPS not running. Cannot verify start position.",
            FailureReason::PlaneTimeout => {
                "Failed to detect ground. Please restart and point camera down."
            }
            FailureReason::RouteUnavailable => "Route request failed.",
            FailureReason::InvalidRoute => "Invalid route data.",
            FailureReason::Cancelled => "Navigation cancelled.",
        }
    }
}

impl From<&WaymarkError> for FailureReason {
    fn from(error: &WaymarkError) -> Self {
        match error {
            WaymarkError::InvalidInput(_) => FailureReason::InvalidRoute,
            WaymarkError::Timeout {
                stage: TimedStage::Location,
                ..
            } => FailureReason::LocationTimeout,
            WaymarkError::Timeout {
                stage: TimedStage::PlaneDetection,
                ..
            } => FailureReason::PlaneTimeout,
            WaymarkError::ExternalFailure(_) => FailureReason::RouteUnavailable,
            // Neither of these reaches the acquisition sequence, map them to the closest cause.
            WaymarkError::ResourceExhaustion { .. } | WaymarkError::DuplicateBinding { .. } => {
                FailureReason::InvalidRoute
            }
        }
    }
}
