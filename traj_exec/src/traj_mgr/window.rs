//! # Arrival windows
//!
//! Geometric tests deciding when a sub-goal is satisfied.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use nalgebra::{distance, Point2};

// Internal
use crate::robot::Pose;
use super::angle::best_delta_angle_rad;

// ---------------------------------------------------------------------------
// PUBLIC FUNCTIONS
// ---------------------------------------------------------------------------

/// True if the robot is strictly closer than `d_win` to `target`.
pub fn robot_in_xy_window(pose: &Pose, target: &Point2<f64>, d_win: f64) -> bool {
    distance(&pose.position_mm, target) < d_win
}

/// True if the robot's heading is within an angular window of total width `a_win_rad` centred
/// on `a_target`.
///
/// The heading error is taken the short way round, so a target just above zero and a heading
/// just below two pi are close. Headings and targets may be given in any range.
pub fn robot_in_angle_window(pose: &Pose, a_target: f64, a_win_rad: f64) -> bool {
    let d_a = best_delta_angle_rad(a_target - pose.heading_rad).abs();

    d_a < a_win_rad / 2.0
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use std::f64::consts::{PI, TAU};
    use super::*;

    #[test]
    fn test_xy_window() {
        let pose = Pose::new(95.0, 0.0, 0.0);
        let target = Point2::new(100.0, 0.0);

        assert!(robot_in_xy_window(&pose, &target, 10.0));
        assert!(!robot_in_xy_window(&pose, &target, 4.0));

        // Strictly less than
        assert!(!robot_in_xy_window(&pose, &target, 5.0));
    }

    #[test]
    fn test_angle_window() {
        // Either side of the wraparound
        let pose = Pose::new(0.0, 0.0, TAU - 0.05);
        assert!(robot_in_angle_window(&pose, 0.05, 0.3));
        assert!(!robot_in_angle_window(&pose, 0.05, 0.15));

        let pose = Pose::new(0.0, 0.0, 0.05);
        assert!(robot_in_angle_window(&pose, TAU - 0.05, 0.3));

        // Plain case
        let pose = Pose::new(0.0, 0.0, 1.0);
        assert!(robot_in_angle_window(&pose, 1.1, 0.3));
        assert!(!robot_in_angle_window(&pose, 1.2, 0.3));
        assert!(!robot_in_angle_window(&pose, -1.0, 0.3));
    }

    #[test]
    fn test_angle_window_far_apart() {
        // Heading in (pi, 2pi), target in (-pi, 0): 2.917 rad apart the short way
        let pose = Pose::new(0.0, 0.0, 6.2);
        assert!(!robot_in_angle_window(&pose, -3.0, 0.05));
        assert!(!robot_in_angle_window(&pose, -3.0, 2.0 * PI - 1.0));

        // Same physical angle given two turns apart
        let pose = Pose::new(0.0, 0.0, 2.0 * TAU + 0.01);
        assert!(robot_in_angle_window(&pose, 0.0, 0.05));
        assert!(robot_in_angle_window(&pose, -TAU, 0.05));
    }
}
