//! Trajectory manager parameters

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use serde::Deserialize;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Parameters for the trajectory manager.
///
/// Missing keys in the parameter file take their default value.
#[derive(Deserialize, Debug, Clone)]
#[serde(default)]
pub struct Params {

    // ---- MOVING ----

    /// Nominal cruise speed for straight lines.
    pub cruise_speed: i32,

    /// Distance to the target under which the straight line speed is tapered.
    ///
    /// Units: millimeters
    pub taper_distance_mm: f64,

    /// Speed per millimeter of remaining distance inside the taper.
    pub taper_gain: f64,

    /// Arcs are driven at the cruise speed divided by this.
    pub circle_speed_divisor: i32,

    /// Angle between the robot and its keyframe on an arc.
    ///
    /// Units: radians
    pub angle_inc_rad: f64,

    // ---- TURNING ----

    /// Magnitude of the angular speed consign.
    pub omega_consign: i32,

    // ---- RAMP ----

    /// Maximum change of the issued speed per tick.
    pub ramp_step: i32,

    /// Issued speed under which the robot is considered stopped.
    pub settled_speed: i32,

    // ---- SCHEDULING ----

    /// Period of the trajectory event.
    ///
    /// Units: seconds
    pub evt_period_s: f64,

    /// Priority of the trajectory event.
    pub evt_priority: u8,

    // ---- WINDOWS ----

    /// Arrival distance window used until one is set.
    ///
    /// Units: millimeters
    pub default_d_win_mm: f64,

    /// Arrival angle window used until one is set.
    ///
    /// Units: radians
    pub default_a_win_rad: f64
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Default for Params {
    fn default() -> Self {
        Self {
            cruise_speed: 500,
            taper_distance_mm: 250.0,
            taper_gain: 2.0,
            circle_speed_divisor: 5,
            angle_inc_rad: 0.05,
            omega_consign: 50,
            ramp_step: 20,
            settled_speed: 20,
            evt_period_s: 0.025,
            evt_priority: 30,
            default_d_win_mm: 20.0,
            default_a_win_rad: 0.05
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_partial_params_file() {
        let p: Params = util::params::from_str(
            "cruise_speed = 300\nevt_priority = 10\n"
        ).unwrap();

        assert_eq!(p.cruise_speed, 300);
        assert_eq!(p.evt_priority, 10);
        assert_eq!(p.ramp_step, Params::default().ramp_step);
    }
}
