// waymark_sim/src/simulation/core/transforms.rs

//! Conversions between the session's local ENU frame and Bevy's world frame.
//!
//! The simulated AR session frame is the Bevy world: ENU x (east) is Bevy +X,
//! ENU y (north) is Bevy -Z and ENU z (up) is Bevy +Y. Poses produced by the
//! core are expressed in ENU with FLU bodies (+X forward, +Y left, +Z up).

use bevy::prelude::{Quat as BevyQuat, Transform as BevyTransform, Vec3 as BevyVec3};
use nalgebra::{Isometry3, UnitQuaternion, Vector3};
use std::f64::consts::FRAC_PI_2;

// --- ENU <-> BEVY Transformations ---
thread_local! {
    /// Rotation from the ENU frame to the Bevy frame.
    /// ENU's X-axis (1,0,0) stays (1,0,0) in Bevy coords.
    /// ENU's Y-axis (0,1,0) (North) becomes (0,0,-1) in Bevy coords (Bevy -Z).
    /// ENU's Z-axis (0,0,1) (Up) becomes (0,1,0) in Bevy coords (Bevy Y).
    /// This corresponds to a -90 degree rotation around the X-axis.
    pub static Q_ENU_FRAME_TO_BEVY_FRAME: UnitQuaternion<f64> =
        UnitQuaternion::from_axis_angle(&Vector3::x_axis(), -FRAC_PI_2);
}

/// Converts a 3D coordinate vector from ENU to Bevy world.
pub fn enu_vector_to_bevy_vector(enu_vec: &Vector3<f64>) -> BevyVec3 {
    BevyVec3::new(
        enu_vec.x as f32,  // East -> Bevy X
        enu_vec.z as f32,  // ENU Up -> Bevy Y
        -enu_vec.y as f32, // ENU North -> Bevy -Z
    )
}

/// Converts a 3D coordinate vector from Bevy world to ENU.
pub fn bevy_vector_to_enu_vector(bevy_vec: &BevyVec3) -> Vector3<f64> {
    Vector3::new(
        bevy_vec.x as f64,  // Bevy X -> ENU East
        -bevy_vec.z as f64, // Bevy -Z -> ENU North
        bevy_vec.y as f64,  // Bevy Y -> ENU Up
    )
}

/// Converts an object's orientation from ENU frame to Bevy world frame.
pub fn enu_quat_to_bevy_quat(enu_obj_quat: &UnitQuaternion<f64>) -> BevyQuat {
    // q_obj_in_Bevy = Q_Frame(Bevy_from_ENU) * q_obj_in_ENU * Q_Frame(Bevy_from_ENU)_inverse
    let final_rot_f64 = Q_ENU_FRAME_TO_BEVY_FRAME.with(|q_enu_to_bevy_frame| {
        *q_enu_to_bevy_frame * enu_obj_quat * q_enu_to_bevy_frame.inverse()
    });

    BevyQuat::from_xyzw(
        final_rot_f64.coords.x as f32,
        final_rot_f64.coords.y as f32,
        final_rot_f64.coords.z as f32,
        final_rot_f64.coords.w as f32,
    )
}

/// Converts a full pose (Isometry3) from ENU frame to Bevy Transform.
///
/// Works for world poses and for poses relative to a parent alike, since
/// both sides of the parent-child chain go through the same frame change.
pub fn enu_iso_to_bevy_transform(enu_pose: &Isometry3<f64>) -> BevyTransform {
    BevyTransform {
        translation: enu_vector_to_bevy_vector(&enu_pose.translation.vector),
        rotation: enu_quat_to_bevy_quat(&enu_pose.rotation),
        scale: BevyVec3::ONE,
    }
}

/// Bevy camera transform for an observer pose with an FLU body.
///
/// A Bevy camera looks down its local -Z with +Y up, so the body's forward
/// and up axes are used directly instead of converting the rotation.
pub fn observer_camera_transform(observer: &Isometry3<f64>) -> BevyTransform {
    let forward = enu_vector_to_bevy_vector(&(observer.rotation * Vector3::x()));
    let up = enu_vector_to_bevy_vector(&(observer.rotation * Vector3::z()));
    BevyTransform::from_translation(enu_vector_to_bevy_vector(&observer.translation.vector))
        .looking_to(forward, up)
}
