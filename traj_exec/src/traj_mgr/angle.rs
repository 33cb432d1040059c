//! # Angle utilities
//!
//! Angles are in radians. Headings and angular errors handed to the controllers are kept in
//! `(-pi, pi]` so that the sign of an error always gives the shortest rotation.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use std::f64::consts::{PI, TAU};
use nalgebra::{Point2, Vector2};

// Internal
use crate::robot::Pose;
use super::GEOMETRY_EPSILON_MM;
use util::maths::{rem_euclid, strip_periods};

// ---------------------------------------------------------------------------
// PUBLIC FUNCTIONS
// ---------------------------------------------------------------------------

/// Return the rotation equivalent to `a` which is the shortest, in `(-pi, pi]`.
///
/// Values already in range are returned untouched, so this is idempotent.
pub fn best_delta_angle_rad(a: f64) -> f64 {
    if in_half_turn(a) {
        return a;
    }

    let r = simple_modulo_2pi(a);
    if in_half_turn(r) {
        r
    }
    else {
        // More than one turn away, can't be fixed by a single correction
        PI - rem_euclid(PI - a, TAU)
    }
}

/// Bring `a` into `(-pi, pi]` with at most one full turn correction, knowing that `a` is in
/// `(-3pi, 3pi)`.
pub fn simple_modulo_2pi(a: f64) -> f64 {
    if a > PI {
        a - TAU
    }
    else if a <= -PI {
        a + TAU
    }
    else {
        a
    }
}

/// Bring an angle of any magnitude into `(-pi, pi]`.
pub fn modulo_2pi(a: f64) -> f64 {
    simple_modulo_2pi(strip_periods(a, TAU))
}

/// Angle of a vector to the positive X axis, or `None` for a null vector.
pub fn vec_angle_rad(v: &Vector2<f64>) -> Option<f64> {
    if v.norm() < GEOMETRY_EPSILON_MM {
        None
    }
    else {
        Some(v.y.atan2(v.x))
    }
}

/// Shortest rotation from the robot's heading to the angle `a`.
pub fn angle_2_x_rad(pose: &Pose, a: f64) -> f64 {
    best_delta_angle_rad(a - pose.heading_rad)
}

/// Shortest rotation from the robot's heading to its velocity vector heading plus `offset`.
pub fn angle_2_speed_rad(pose: &Pose, offset: f64) -> f64 {
    best_delta_angle_rad(modulo_2pi(pose.velocity_heading_rad + offset) - pose.heading_rad)
}

/// Shortest rotation needed for the robot to face `point`, or `None` if the robot is on it.
pub fn angle_facepoint_rad(pose: &Pose, point: &Point2<f64>) -> Option<f64> {
    vec_angle_rad(&(point - pose.position_mm))
        .map(|a_fp| best_delta_angle_rad(a_fp - pose.heading_rad))
}

/// Convert an angle into the integer degrees the drive accepts.
pub fn to_deg_i32(a: f64) -> i32 {
    a.to_degrees().round() as i32
}

// ---------------------------------------------------------------------------
// PRIVATE FUNCTIONS
// ---------------------------------------------------------------------------

fn in_half_turn(a: f64) -> bool {
    a > -PI && a <= PI
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------
