//! # Simulated holonomic robot
//!
//! Integrates the consigns passed by the trajectory manager to produce a pose. A holonomic robot
//! translates along any direction independently of its heading, so the speed is applied along
//! the direction consign in the table frame, and the angular speed only changes the heading.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use std::f64::consts::PI;
use nalgebra::Vector2;
use serde::{Deserialize, Serialize};

// Internal
use crate::{
    robot::{DriveSink, Pose, PositionSource},
    traj_mgr::angle::modulo_2pi
};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Parameters of the simulation and of the executable running it.
#[derive(Deserialize, Debug, Clone)]
#[serde(default)]
pub struct SimParams {
    /// Initial position of the robot.
    ///
    /// Units: millimeters
    pub initial_position_mm: [f64; 2],

    /// Initial heading of the robot.
    ///
    /// Units: radians
    pub initial_heading_rad: f64,

    /// Linear speed per unit of speed consign.
    ///
    /// Units: millimeters/second
    pub speed_scale: f64,

    /// Angular speed per unit of angular speed consign.
    ///
    /// Units: radians/second
    pub omega_scale: f64,

    /// Maximum number of events in the scheduler.
    pub scheduler_capacity: usize,

    /// Period of the executable's main loop.
    ///
    /// Units: seconds
    pub cycle_period_s: f64,

    /// The executable stops after this long even if the trajectory isn't finished.
    ///
    /// Units: seconds
    pub max_duration_s: f64
}

/// A simulated holonomic robot.
#[derive(Debug, Clone, Serialize)]
pub struct SimRobot {
    pose: Pose,

    speed: i32,
    direction_deg: i32,
    omega: i32,

    speed_scale: f64,
    omega_scale: f64
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Default for SimParams {
    fn default() -> Self {
        Self {
            initial_position_mm: [0.0, 0.0],
            initial_heading_rad: 0.0,
            speed_scale: 1.0,
            omega_scale: 0.01,
            scheduler_capacity: 8,
            cycle_period_s: 0.005,
            max_duration_s: 120.0
        }
    }
}

impl SimParams {
    pub fn initial_pose(&self) -> Pose {
        Pose::new(
            self.initial_position_mm[0], 
            self.initial_position_mm[1], 
            self.initial_heading_rad
        )
    }
}

impl SimRobot {
    /// Create a robot at rest at `pose`.
    pub fn new(pose: Pose, speed_scale: f64, omega_scale: f64) -> Self {
        Self {
            pose,
            speed: 0,
            direction_deg: 0,
            omega: 0,
            speed_scale,
            omega_scale
        }
    }

    pub fn from_params(params: &SimParams) -> Self {
        Self::new(params.initial_pose(), params.speed_scale, params.omega_scale)
    }

    /// Move the robot by `dt_s` seconds at the current consigns.
    pub fn step(&mut self, dt_s: f64) {
        if self.speed != 0 {
            let mut dir_rad = (self.direction_deg as f64).to_radians();
            if self.speed < 0 {
                dir_rad += PI;
            }

            let v_mm_s = (self.speed as f64).abs() * self.speed_scale;
            self.pose.position_mm += Vector2::new(dir_rad.cos(), dir_rad.sin()) * v_mm_s * dt_s;
            self.pose.velocity_heading_rad = modulo_2pi(dir_rad);
        }

        self.pose.heading_rad = modulo_2pi(
            self.pose.heading_rad + (self.omega as f64) * self.omega_scale * dt_s
        );
    }

    /// The last consigns received, as `(speed, direction_deg, omega)`.
    pub fn consigns(&self) -> (i32, i32, i32) {
        (self.speed, self.direction_deg, self.omega)
    }
}

impl PositionSource for SimRobot {
    fn pose(&self) -> Pose {
        self.pose
    }
}

impl DriveSink for SimRobot {
    fn set_speed(&mut self, speed: i32) {
        self.speed = speed;
    }

    fn set_direction(&mut self, direction_deg: i32) {
        self.direction_deg = direction_deg;
    }

    fn set_rotation_speed(&mut self, omega: i32) {
        self.omega = omega;
    }
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------
