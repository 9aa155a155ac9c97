// waymark_core/src/session/snapshot.rs

use super::acquisition::SessionStage;
use nalgebra::Point3;
use std::fmt;

/// Point-in-time diagnostics of a session, for on-screen or log display.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionSnapshot {
    pub stage: SessionStage,
    pub status: String,
    pub plane_locked: bool,
    pub heading_alignment_deg: Option<f64>,
    pub path_vertices: usize,
    pub path_length_m: f64,
    pub active_markers: usize,
    pub pool_capacity: usize,
    pub free_markers: usize,
    pub overflow_markers: usize,
    pub observer_position: Option<Point3<f64>>,
    pub closest_index: Option<usize>,
}

impl fmt::Display for SessionSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Waymark Navigation Debug")?;
        writeln!(f, "Stage: {}", self.stage)?;
        writeln!(f, "Status: {}", self.status.replace('\n', " "))?;
        writeln!(f, "Plane: {}", if self.plane_locked { "locked" } else { "none" })?;
        match self.heading_alignment_deg {
            Some(heading) => writeln!(f, "Heading: {heading:.1}°")?,
            None => writeln!(f, "Heading: -")?,
        }
        writeln!(
            f,
            "Route Points: {} ({:.1}m)",
            self.path_vertices, self.path_length_m
        )?;
        writeln!(
            f,
            "Active Markers: {}/{} (overflow {})",
            self.active_markers, self.pool_capacity, self.overflow_markers
        )?;
        writeln!(f, "Pool Available: {}", self.free_markers)?;
        match self.observer_position {
            Some(p) => writeln!(f, "Observer: ({:.1}, {:.1}, {:.1})", p.x, p.y, p.z)?,
            None => writeln!(f, "Observer: -")?,
        }
        match self.closest_index {
            Some(index) => write!(f, "Closest Index: {index}"),
            None => write!(f, "Closest Index: -"),
        }
    }
}
