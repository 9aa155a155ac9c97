// waymark_core/src/session/acquisition.rs

//! Stages of the acquisition sequence and the clocks that drive them.
//!
//! Nothing here blocks. The session evaluates the current stage once per tick
//! and a stage either resumes (moves on), keeps waiting, or runs out of time.

use crate::error::FailureReason;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SessionStage {
    Idle,
    AcquiringLocation,
    DetectingPlane,
    AligningHeading,
    FetchingRoute,
    WaitingAtPathStart,
    Densifying,
    Navigating,
    Aborted(FailureReason),
}

impl SessionStage {
    /// The stage entered after `self` completes successfully. Offline sessions
    /// skip plane detection, heading alignment and waiting at the start.
    pub fn successor(&self, offline: bool) -> Option<SessionStage> {
        use SessionStage::*;
        let next = match (self, offline) {
            (Idle, _) => AcquiringLocation,
            (AcquiringLocation, false) => DetectingPlane,
            (AcquiringLocation, true) => FetchingRoute,
            (DetectingPlane, _) => AligningHeading,
            (AligningHeading, _) => FetchingRoute,
            (FetchingRoute, false) => WaitingAtPathStart,
            (FetchingRoute, true) => Densifying,
            (WaitingAtPathStart, _) => Densifying,
            (Densifying, _) => Navigating,
            (Navigating, _) | (Aborted(_), _) => return None,
        };
        Some(next)
    }

    pub fn is_aborted(&self) -> bool {
        matches!(self, SessionStage::Aborted(_))
    }

    pub fn is_navigating(&self) -> bool {
        matches!(self, SessionStage::Navigating)
    }

    /// Status shown when the stage is entered. Waiting stages refine it while
    /// they poll.
    pub fn entry_status(&self) -> String {
        match self {
            SessionStage::Idle => "Idle".to_string(),
            SessionStage::AcquiringLocation => "Waiting for GPS lock...".to_string(),
            SessionStage::DetectingPlane => "Step 1/4: Detecting ground...".to_string(),
            SessionStage::AligningHeading => "Step 2/4: Aligning compass...".to_string(),
            SessionStage::FetchingRoute => "Step 3/4: Fetching route...".to_string(),
            SessionStage::WaitingAtPathStart => "Step 4/4: Waiting for user at start...".to_string(),
            SessionStage::Densifying => "Processing route...".to_string(),
            SessionStage::Navigating => "Navigation Ready. Follow the arrows!".to_string(),
            SessionStage::Aborted(reason) => reason.status_message().to_string(),
        }
    }
}

impl fmt::Display for SessionStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SessionStage::Aborted(reason) => write!(f, "Aborted({:?})", reason),
            other => write!(f, "{:?}", other),
        }
    }
}

/// Elapsed time in the current stage plus an optional polling cadence.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct StageClock {
    elapsed: f64,
    until_poll: Option<f64>,
}

impl StageClock {
    pub fn advance(&mut self, dt: f64) -> f64 {
        self.elapsed += dt;
        self.elapsed
    }

    pub fn elapsed(&self) -> f64 {
        self.elapsed
    }

    /// True on the first call and then once every `interval` seconds.
    pub fn poll_due(&mut self, dt: f64, interval: f64) -> bool {
        match self.until_poll {
            None => {
                self.until_poll = Some(interval);
                true
            }
            Some(remaining) => {
                let remaining = remaining - dt;
                if remaining <= 0.0 {
                    self.until_poll = Some(remaining + interval);
                    true
                } else {
                    self.until_poll = Some(remaining);
                    false
                }
            }
        }
    }

    pub fn has_polled(&self) -> bool {
        self.until_poll.is_some()
    }

    /// Whole seconds left before `timeout`, as shown in countdown statuses.
    pub fn remaining_secs(&self, timeout: f64) -> f64 {
        (timeout - self.elapsed).max(0.0).ceil()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn online_sequence_visits_every_stage() {
        let mut stage = SessionStage::Idle;
        let mut visited = vec![stage];
        while let Some(next) = stage.successor(false) {
            visited.push(next);
            stage = next;
        }
        assert_eq!(visited.len(), 8);
        assert_eq!(stage, SessionStage::Navigating);
    }

    #[test]
    fn offline_sequence_skips_device_stages() {
        let mut stage = SessionStage::Idle;
        let mut visited = vec![];
        while let Some(next) = stage.successor(true) {
            visited.push(next);
            stage = next;
        }
        assert_eq!(
            visited,
            vec![
                SessionStage::AcquiringLocation,
                SessionStage::FetchingRoute,
                SessionStage::Densifying,
                SessionStage::Navigating,
            ]
        );
    }

    #[test]
    fn aborted_is_terminal() {
        let aborted = SessionStage::Aborted(FailureReason::PlaneTimeout);
        assert_eq!(aborted.successor(false), None);
        assert_eq!(
            aborted.entry_status(),
            "Failed to detect ground. Please restart and point camera down."
        );
    }

    #[test]
    fn poll_is_due_immediately_then_on_cadence() {
        let mut clock = StageClock::default();
        assert!(clock.poll_due(0.25, 1.0));
        assert!(!clock.poll_due(0.25, 1.0));
        assert!(!clock.poll_due(0.25, 1.0));
        assert!(!clock.poll_due(0.25, 1.0));
        assert!(clock.poll_due(0.25, 1.0));
    }

    #[test]
    fn countdown_rounds_up() {
        let mut clock = StageClock::default();
        clock.advance(0.4);
        assert_eq!(clock.remaining_secs(20.0), 20.0);
        clock.advance(19.7);
        assert_eq!(clock.remaining_secs(20.0), 0.0);
    }
}
