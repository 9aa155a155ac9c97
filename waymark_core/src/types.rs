// waymark_core/src/types.rs

use serde::{Deserialize, Serialize};

// --- Geographic Coordinate ---

/// A latitude/longitude pair in degrees (WGS84).
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct GeoPoint {
    pub latitude: f64,
    pub longitude: f64,
}

impl GeoPoint {
    pub const fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    pub fn is_finite(&self) -> bool {
        self.latitude.is_finite() && self.longitude.is_finite()
    }
}

// --- Opaque Handles ---
// Handles are plain integers so the core never depends on a scene graph.
// In the Bevy host they carry the bits of an `Entity`.

/// Identifies one slot in the marker pool. Stable for the lifetime of the pool.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SlotId(pub usize);

/// A real-world anchor created by an `AnchorProvider`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct AnchorHandle(pub u64);

/// A marker visual created by a `SceneObjectFactory`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct SceneObjectHandle(pub u64);

macro_rules! entity_conversions {
    ($handle:ty) => {
        impl $handle {
            // A convenience method for use in the Bevy adapter crate.
            #[cfg(feature = "bevy")] // This will only compile if the "bevy" feature is enabled
            pub fn from_entity(entity: bevy_ecs::prelude::Entity) -> Self {
                Self(entity.to_bits())
            }

            #[cfg(feature = "bevy")]
            pub fn to_entity(self) -> bevy_ecs::prelude::Entity {
                bevy_ecs::prelude::Entity::from_bits(self.0)
            }
        }
    };
}

entity_conversions!(AnchorHandle);
entity_conversions!(SceneObjectHandle);

// --- Marker Styling ---

/// Discrete visual category used by the renderer to style a marker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MarkerCategory {
    Start,
    Mid,
    End,
}

impl MarkerCategory {
    /// First index is the start, the last two path vertices are the end.
    pub fn for_index(index: usize, path_len: usize) -> Self {
        if index == 0 {
            MarkerCategory::Start
        } else if index + 2 >= path_len {
            MarkerCategory::End
        } else {
            MarkerCategory::Mid
        }
    }
}

// --- Routing ---

/// Travel profile forwarded to the routing backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RoutingProfile {
    #[default]
    Walking,
    Cycling,
    Driving,
    DrivingTraffic,
}

impl RoutingProfile {
    pub fn as_str(&self) -> &'static str {
        match self {
            RoutingProfile::Walking => "walking",
            RoutingProfile::Cycling => "cycling",
            RoutingProfile::Driving => "driving",
            RoutingProfile::DrivingTraffic => "driving-traffic",
        }
    }
}
