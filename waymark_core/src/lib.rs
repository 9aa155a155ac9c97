// waymark_core/src/lib.rs

//! Pooled, anchor-backed markers for walking navigation in AR.
//!
//! A sparse route is densified into evenly spaced vertices, the observer's
//! progress along them is tracked incrementally, and a small pool of marker
//! objects is kept bound to just the vertices around the observer.
//! [`session::NavigationSession`] sequences all of it behind sensor
//! acquisition and is driven once per frame by the host.

pub mod config;
pub mod error;
pub mod geo;
pub mod interfaces;
pub mod markers;
pub mod path;
pub mod prelude;
pub mod session;
pub mod tracking;
pub mod types;
pub mod view;
