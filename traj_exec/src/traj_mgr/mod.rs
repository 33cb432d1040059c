//! # Trajectory manager module
//!
//! The trajectory manager drives a holonomic robot towards a goal made of two independent parts:
//!
//! - a moving part, which is either a straight line to a point or an arc of circle around a
//!   centre,
//! - a turning part, which holds a fixed cap, faces a point, or keeps a fixed offset from the
//!   robot's velocity vector.
//!
//! Issuing a command updates one part of the goal and registers the manager's periodic event
//! with the scheduler. On each event [`TrajMgr::evaluate`] reads the robot's pose, computes the
//! speed, direction and angular speed consigns and passes them to the drive. Each part of the
//! goal is finished on its own once the robot is inside the arrival windows, and when nothing is
//! left to do the event removes itself from the scheduler and raises the end of trajectory flag.
//!
//! Arcs are followed by chasing a keyframe, a point on the circle a fixed angle ahead of the
//! robot, which is recomputed on every tick. Arcs are walked clockwise.

// ---------------------------------------------------------------------------
// MODULES
// ---------------------------------------------------------------------------

pub mod angle;
mod eval;
mod params;
mod ramp;
mod state;
pub mod window;

#[cfg(test)]
mod test_utils;

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// Internal
pub use eval::{arc_arrival_point, circle_keyframe, StatusReport};
pub use params::Params;
pub use ramp::SpeedRamp;
pub use state::*;
use crate::sched::SchedulerError;

// ---------------------------------------------------------------------------
// CONSTANTS
// ---------------------------------------------------------------------------

/// Distances below this are treated as zero when an angle has to be taken from them.
///
/// Units: millimeters
pub const GEOMETRY_EPSILON_MM: f64 = 1e-6;

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// Possible errors that can occur during trajectory manager operation.
#[derive(Debug, thiserror::Error)]
pub enum TrajMgrError {
    #[error("No position source or drive sink is bound to the trajectory manager")]
    NotBound,

    #[error("No scheduler is bound to the trajectory manager")]
    NoScheduler,

    #[error("Invalid trajectory geometry: {0}")]
    InvalidGeometry(String),

    #[error("Invalid arrival windows (d_win = {0} mm, a_win = {1} rad)")]
    InvalidWindow(f64, f64),

    #[error("Could not schedule the trajectory event: {0}")]
    SchedulerError(SchedulerError)
}
