// waymark_core/src/session/announcer.rs

use crate::config::AnnouncerConfig;
use crate::path::ManeuverPoint;
use nalgebra::Point3;

/// Walks through the route's maneuvers in order and produces a spoken
/// instruction once the observer gets close to the next one.
#[derive(Debug, Clone)]
pub struct ManeuverAnnouncer {
    enabled: bool,
    proximity: f64,
    next_step: usize,
}

impl ManeuverAnnouncer {
    pub fn new(config: &AnnouncerConfig) -> Self {
        Self {
            enabled: config.enabled,
            proximity: config.proximity_m,
            next_step: 0,
        }
    }

    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
        tracing::info!(
            "Announcements have been {}",
            if enabled { "ENABLED" } else { "DISABLED" }
        );
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Index into the maneuver list of the next instruction to announce.
    pub fn next_step(&self) -> usize {
        self.next_step
    }

    /// At most one announcement per call. Distance is measured on the ground
    /// plane. Nothing advances while disabled.
    pub fn check(&mut self, observer: &Point3<f64>, maneuvers: &[ManeuverPoint]) -> Option<String> {
        if !self.enabled {
            return None;
        }
        let maneuver = maneuvers.get(self.next_step)?;
        let dx = maneuver.local_position.x - observer.x;
        let dy = maneuver.local_position.y - observer.y;
        if dx.hypot(dy) >= self.proximity {
            return None;
        }

        self.next_step += 1;
        let text = format_announcement(&maneuver.instruction, maneuver.distance_meters);
        tracing::info!("Announcing: '{}'", text);
        Some(text)
    }

    pub fn reset(&mut self) {
        self.next_step = 0;
    }
}

pub fn format_announcement(instruction: &str, distance_meters: f64) -> String {
    format!("{instruction}, in {distance_meters:.0} meters.")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn maneuver(step_index: usize, y: f64, instruction: &str, distance: f64) -> ManeuverPoint {
        ManeuverPoint {
            step_index,
            local_position: Point3::new(0.0, y, 0.0),
            instruction: instruction.to_string(),
            distance_meters: distance,
        }
    }

    fn enabled() -> ManeuverAnnouncer {
        ManeuverAnnouncer::new(&AnnouncerConfig {
            enabled: true,
            proximity_m: 20.0,
        })
    }

    #[test]
    fn announces_within_proximity_and_advances() {
        let maneuvers = vec![
            maneuver(0, 0.0, "Head north on Main Street", 120.4),
            maneuver(1, 120.0, "Turn left onto Oak Avenue", 80.0),
        ];
        let mut announcer = enabled();

        let first = announcer.check(&Point3::new(0.0, 5.0, 1.6), &maneuvers);
        assert_eq!(first.as_deref(), Some("Head north on Main Street, in 120 meters."));
        assert_eq!(announcer.next_step(), 1);

        assert_eq!(announcer.check(&Point3::new(0.0, 50.0, 1.6), &maneuvers), None);
        assert!(announcer.check(&Point3::new(0.0, 105.0, 1.6), &maneuvers).is_some());
        assert_eq!(announcer.check(&Point3::new(0.0, 120.0, 1.6), &maneuvers), None);
    }

    #[test]
    fn disabled_announcer_stays_silent_and_does_not_advance() {
        let maneuvers = vec![maneuver(0, 0.0, "Head north", 10.0)];
        let mut announcer = ManeuverAnnouncer::new(&AnnouncerConfig::default());
        assert_eq!(announcer.check(&Point3::origin(), &maneuvers), None);
        assert_eq!(announcer.next_step(), 0);

        announcer.set_enabled(true);
        assert!(announcer.check(&Point3::origin(), &maneuvers).is_some());
    }
}
