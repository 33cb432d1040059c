//! # Robot interfaces
//!
//! The trajectory manager doesn't own the robot. It reads the pose from a [`PositionSource`] and
//! writes consigns to a [`DriveSink`], both shared with the rest of the executable through a
//! [`Shared`] handle. Evaluation is single threaded, so a `RefCell` is enough.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use std::cell::RefCell;
use std::rc::Rc;
use nalgebra::Point2;
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// TYPES
// ---------------------------------------------------------------------------

/// A handle on an object shared between the trajectory manager and its owner.
pub type Shared<T> = Rc<RefCell<T>>;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// The current pose of the robot on the table.
#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
pub struct Pose {
    /// Position of the robot centre.
    ///
    /// Units: millimeters
    pub position_mm: Point2<f64>,

    /// Heading of the robot, angle to the positive X axis.
    ///
    /// Units: radians
    pub heading_rad: f64,

    /// Angle of the robot's velocity vector to the positive X axis. For a holonomic robot this
    /// is independent of the heading.
    ///
    /// Units: radians
    pub velocity_heading_rad: f64
}

// ---------------------------------------------------------------------------
// TRAITS
// ---------------------------------------------------------------------------

/// Provides the current pose of the robot.
pub trait PositionSource {
    /// Return the current pose.
    fn pose(&self) -> Pose;
}

/// Accepts the consigns computed on each tick.
///
/// Any acceleration limiting below the trajectory manager's own speed ramp is the sink's
/// responsibility.
pub trait DriveSink {
    /// Set the linear speed consign.
    fn set_speed(&mut self, speed: i32);

    /// Set the direction of the speed vector, in degrees from the positive X axis.
    fn set_direction(&mut self, direction_deg: i32);

    /// Set the angular speed consign, positive is counter-clockwise.
    fn set_rotation_speed(&mut self, omega: i32);
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Pose {
    /// Build a pose from its components.
    pub fn new(x_mm: f64, y_mm: f64, heading_rad: f64) -> Self {
        Self {
            position_mm: Point2::new(x_mm, y_mm),
            heading_rad,
            velocity_heading_rad: heading_rad
        }
    }

    /// True if every component is a finite number.
    pub fn is_finite(&self) -> bool {
        self.position_mm.x.is_finite()
            && self.position_mm.y.is_finite()
            && self.heading_rad.is_finite()
            && self.velocity_heading_rad.is_finite()
    }
}

impl Default for Pose {
    fn default() -> Self {
        Pose::new(0.0, 0.0, 0.0)
    }
}

/// Wrap a value into a [`Shared`] handle.
pub fn shared<T>(value: T) -> Shared<T> {
    Rc::new(RefCell::new(value))
}
