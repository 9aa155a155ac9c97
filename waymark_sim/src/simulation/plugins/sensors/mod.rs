pub mod compass;
pub mod gps;
pub mod plane_detection;
