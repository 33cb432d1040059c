//! # Trajectory library.
//!
//! Motion control core of a holonomic robot. A high level goal (go to a point, follow an arc,
//! hold a heading, face a point) is turned into speed, direction and angular speed consigns for
//! the robot's drive, evaluated periodically under a cooperative scheduler.

// ------------------------------------------------------------------------------------------------
// MODULES
// ------------------------------------------------------------------------------------------------

/// Robot interfaces - the pose source and drive sink the trajectory manager is bound to
pub mod robot;

/// Periodic scheduler - registers and dispatches periodic events
pub mod sched;

/// Simulated holonomic robot
pub mod sim;

/// Trajectory manager - turns trajectory goals into drive consigns
pub mod traj_mgr;
