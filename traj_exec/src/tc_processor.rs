//! # Telecommand processor module
//!
//! Passes trajectory telecommands on to the trajectory manager.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use log::{info, warn};

// Internal
use comms_if::tc::{Tc, traj_mgr::TrajCmd};
use traj_lib::traj_mgr::{TrajMgr, TrajMgrError};

// ---------------------------------------------------------------------------
// PUBLIC FUNCTIONS
// ---------------------------------------------------------------------------

/// Execute a telecommand.
///
/// A command the trajectory manager refuses is reported and otherwise ignored.
pub(crate) fn exec(traj: &mut TrajMgr, tc: &Tc) {
    info!("Recieved TC: {:?}", tc.cmd);

    match dispatch(traj, &tc.cmd) {
        Ok(()) => (),
        Err(e) => warn!("Could not execute {:?}: {}", tc.cmd, e)
    }
}

// ---------------------------------------------------------------------------
// PRIVATE FUNCTIONS
// ---------------------------------------------------------------------------

fn dispatch(traj: &mut TrajMgr, cmd: &TrajCmd) -> Result<(), TrajMgrError> {
    match *cmd {
        TrajCmd::Goto { x_mm, y_mm } => traj.goto_xy_abs(x_mm, y_mm),
        TrajCmd::Circle { x_center_mm, y_center_mm, arc_angle_rad } => 
            traj.circle(x_center_mm, y_center_mm, arc_angle_rad),
        TrajCmd::Cap { cap_rad } => traj.turn_cap(cap_rad),
        TrajCmd::FacePoint { x_mm, y_mm } => traj.face_point(x_mm, y_mm),
        TrajCmd::SpeedOffset { offset_rad } => traj.turn_with_speed_offset(offset_rad),
        TrajCmd::Windows { d_win_mm, a_win_rad } => traj.set_windows(d_win_mm, a_win_rad),
        TrajCmd::Consigns { speed, direction_deg, omega } => 
            traj.set_consigns(speed, direction_deg, omega),
        TrajCmd::Stop => {
            traj.stop();
            Ok(())
        }
    }
}
