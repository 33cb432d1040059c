//! # Trajectory manager telecommands

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use serde::{Serialize, Deserialize};
use structopt::StructOpt;

// ------------------------------------------------------------------------------------------------
// ENUMS
// ------------------------------------------------------------------------------------------------

/// A command for the holonomic trajectory manager.
///
/// Moving commands (`Goto`, `Circle`) and turning commands (`Cap`, `FacePoint`, `SpeedOffset`)
/// act on independent axes, so a moving command is mixed with the current turning command and
/// vice versa.
#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize, StructOpt)]
#[serde(tag = "type", content = "payload", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TrajCmd {
    /// Go to a point in a straight line.
    #[structopt(name = "goto")]
    Goto {
        /// Absolute X coordinate of the target, in millimeters.
        #[structopt(allow_hyphen_values = true)]
        x_mm: f64,

        /// Absolute Y coordinate of the target, in millimeters.
        #[structopt(allow_hyphen_values = true)]
        y_mm: f64
    },

    /// Follow an arc of circle around a centre, starting from the current position.
    ///
    /// The radius is the distance between the robot and the centre when the command is issued.
    #[structopt(name = "circle")]
    Circle {
        /// Absolute X coordinate of the centre, in millimeters.
        #[structopt(allow_hyphen_values = true)]
        x_center_mm: f64,

        /// Absolute Y coordinate of the centre, in millimeters.
        #[structopt(allow_hyphen_values = true)]
        y_center_mm: f64,

        /// Portion of the circle to travel in radians (2*pi is a full circle).
        arc_angle_rad: f64
    },

    /// Hold the robot's heading at a fixed cap.
    #[structopt(name = "cap")]
    Cap {
        /// The cap in radians.
        #[structopt(allow_hyphen_values = true)]
        cap_rad: f64
    },

    /// Keep the robot facing a point.
    #[structopt(name = "face")]
    FacePoint {
        /// Absolute X coordinate of the point, in millimeters.
        #[structopt(allow_hyphen_values = true)]
        x_mm: f64,

        /// Absolute Y coordinate of the point, in millimeters.
        #[structopt(allow_hyphen_values = true)]
        y_mm: f64
    },

    /// Keep the robot's heading at a fixed offset from its velocity vector.
    #[structopt(name = "offset")]
    SpeedOffset {
        /// The offset in radians.
        #[structopt(allow_hyphen_values = true)]
        offset_rad: f64
    },

    /// Set the arrival windows.
    #[structopt(name = "windows")]
    Windows {
        /// Maximum distance to the target to be considered arrived, in millimeters.
        d_win_mm: f64,

        /// Angular window around the target heading, in radians.
        a_win_rad: f64
    },

    /// Send consigns directly to the drive.
    #[structopt(name = "consigns")]
    Consigns {
        /// Speed consign.
        #[structopt(allow_hyphen_values = true)]
        speed: i32,

        /// Direction of the speed vector in degrees.
        #[structopt(allow_hyphen_values = true)]
        direction_deg: i32,

        /// Angular speed consign.
        #[structopt(allow_hyphen_values = true)]
        omega: i32
    },

    /// Stop the robot and end the current trajectory.
    #[structopt(name = "stop")]
    Stop
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl TrajCmd {
    /// The JSON `type` tags of every command.
    pub const TYPES: [&'static str; 8] = [
        "GOTO",
        "CIRCLE",
        "CAP",
        "FACE_POINT",
        "SPEED_OFFSET",
        "WINDOWS",
        "CONSIGNS",
        "STOP"
    ];
}
