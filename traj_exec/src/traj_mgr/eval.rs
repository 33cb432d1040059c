//! # Trajectory evaluation
//!
//! The periodic step of the trajectory manager. Each axis of the goal is computed by its own
//! function, which returns the consign for that axis and whether the axis has arrived. The step
//! then combines both to decide whether to finish the trajectory or to pass the consigns to the
//! drive.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use log::{debug, info, trace};
use nalgebra::{distance, Point2, Vector2};
use serde::Serialize;

// Internal
use super::{
    angle::{
        angle_2_speed_rad, angle_2_x_rad, angle_facepoint_rad, best_delta_angle_rad,
        to_deg_i32, vec_angle_rad
    },
    window::{robot_in_angle_window, robot_in_xy_window},
    ArcGoal, MovingState, TrajMgr, TrajMgrError, TurningState
};
use crate::robot::Pose;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Summary of one evaluation of the trajectory.
#[derive(Debug, Clone, Serialize)]
pub struct StatusReport {
    /// Distance between the robot and the moving target (the keyframe for arcs).
    ///
    /// Units: millimeters
    pub distance_to_target_mm: f64,

    /// Shortest rotation to the turning target, `None` if there is none.
    ///
    /// Units: radians
    pub heading_error_rad: Option<f64>,

    /// Speed requested before the ramp.
    pub speed_consign: i32,

    /// Speed passed to the drive after the ramp.
    pub issued_speed: i32,

    pub direction_deg: i32,

    pub omega_consign: i32,

    pub moving_state: MovingState,
    pub turning_state: TurningState,

    /// The trajectory finished during this evaluation.
    pub finished: bool,

    /// The geometry was degenerate and some consigns were held from the previous tick.
    pub geometry_noop: bool
}

/// Output of the moving axis for one tick.
#[derive(Debug, Copy, Clone)]
pub(crate) struct MovingAxis {
    pub speed: i32,

    /// `None` if the direction can't be computed.
    pub direction_rad: Option<f64>,

    pub distance_mm: f64,

    pub arrived: bool
}

/// Output of the turning axis for one tick.
#[derive(Debug, Copy, Clone)]
pub(crate) struct TurningAxis {
    /// `None` if the angular speed can't be computed.
    pub omega: Option<i32>,

    pub error_rad: Option<f64>,

    pub arrived: bool
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl StatusReport {
    fn new(mgr: &TrajMgr) -> Self {
        Self {
            distance_to_target_mm: 0.0,
            heading_error_rad: None,
            speed_consign: 0,
            issued_speed: mgr.ramp.last_issued(),
            direction_deg: mgr.last_direction_deg,
            omega_consign: mgr.last_omega,
            moving_state: mgr.moving_state,
            turning_state: mgr.turning_state,
            finished: false,
            geometry_noop: false
        }
    }
}

impl TrajMgr {
    /// Evaluate the trajectory once, passing new consigns to the drive or finishing the
    /// trajectory.
    ///
    /// Must be called each time the trajectory's periodic event is due. Does nothing if no event
    /// is scheduled.
    pub fn evaluate(&mut self) -> Result<StatusReport, TrajMgrError> {
        if self.scheduler_task.is_none() {
            debug!("Trajectory evaluated with no event scheduled");
            return Ok(StatusReport::new(self));
        }

        let pose = self.read_pose()?;
        let mut report = StatusReport::new(self);

        if !pose.is_finite() {
            trace!("Non-finite pose {:?}, consigns held", pose);
            report.geometry_noop = true;
            return Ok(report);
        }

        // Nothing left to do
        if self.moving_state == MovingState::Idle && self.turning_state == TurningState::Idle {
            self.finish(&mut report);
            return Ok(report);
        }

        if self.moving_state == MovingState::Circle {
            match advance_arc(&mut self.arc, &pose, self.params.angle_inc_rad) {
                Some(keyframe) => self.xy_target = keyframe,
                None => {
                    trace!("Robot on the circle's centre, keyframe held");
                    report.geometry_noop = true;
                }
            }
        }

        let moving = moving_axis(self, &pose);
        let turning = turning_axis(self, &pose);

        report.distance_to_target_mm = moving.distance_mm;
        report.heading_error_rad = turning.error_rad;

        let mut speed = moving.speed;

        // Arrival of the moving axis, the turning axis being idle
        if moving.arrived && self.turning_state == TurningState::Idle {
            if self.moving_state == MovingState::Circle
                || self.ramp.last_issued().abs() < self.params.settled_speed 
            {
                info!("Moving target reached, trajectory finished");
                self.moving_state = MovingState::Idle;
                self.finish(&mut report);
                return Ok(report);
            }

            // Let the ramp bring the robot to a stop first
            speed = 0;
        }
        // Arrival of the moving axis while still turning
        else if moving.arrived {
            info!("Moving target reached, still turning");
            self.moving_state = MovingState::Idle;
            speed = 0;
        }

        // Arrival of the turning axis, the moving axis being idle
        if turning.arrived && self.moving_state == MovingState::Idle {
            info!("Turning target reached, trajectory finished");
            self.turning_state = TurningState::Idle;
            self.finish(&mut report);
            return Ok(report);
        }

        let direction_deg = match moving.direction_rad {
            Some(d) => to_deg_i32(d),
            None => {
                if self.moving_state != MovingState::Idle {
                    trace!("Direction undefined, previous direction held");
                    report.geometry_noop = true;
                }
                self.last_direction_deg
            }
        };

        let omega = match turning.omega {
            Some(o) => o,
            None => {
                trace!("Angular speed undefined, previous angular speed held");
                report.geometry_noop = true;
                self.last_omega
            }
        };

        self.send_consigns(speed, direction_deg, omega);

        report.speed_consign = speed;
        report.issued_speed = self.ramp.last_issued();
        report.direction_deg = direction_deg;
        report.omega_consign = omega;
        report.moving_state = self.moving_state;
        report.turning_state = self.turning_state;

        Ok(report)
    }

    fn finish(&mut self, report: &mut StatusReport) {
        self.delete_event();

        report.speed_consign = 0;
        report.issued_speed = 0;
        report.direction_deg = self.last_direction_deg;
        report.omega_consign = 0;
        report.moving_state = self.moving_state;
        report.turning_state = self.turning_state;
        report.finished = true;
    }
}

// ---------------------------------------------------------------------------
// FUNCTIONS
// ---------------------------------------------------------------------------

/// Compute the moving axis consigns.
pub(crate) fn moving_axis(mgr: &TrajMgr, pose: &Pose) -> MovingAxis {
    let p = &mgr.params;
    let distance_mm = distance(&pose.position_mm, &mgr.xy_target);
    let direction_rad = vec_angle_rad(&(mgr.xy_target - pose.position_mm));

    match mgr.moving_state {
        MovingState::Straight => {
            let speed = if distance_mm < p.taper_distance_mm {
                ((p.taper_gain * distance_mm).round() as i32).min(p.cruise_speed)
            }
            else {
                p.cruise_speed
            };

            MovingAxis {
                speed,
                direction_rad,
                distance_mm,
                arrived: robot_in_xy_window(pose, &mgr.xy_target, mgr.d_win_mm)
            }
        },
        MovingState::Circle => {
            let arrived = mgr.arc.travelled_rad > mgr.arc.arc_angle_rad / 2.0
                && robot_in_xy_window(pose, &arc_arrival_point(&mgr.arc), mgr.d_win_mm);

            MovingAxis {
                speed: p.cruise_speed / p.circle_speed_divisor.max(1),
                direction_rad,
                distance_mm,
                arrived
            }
        },
        MovingState::Idle => MovingAxis {
            speed: 0,
            direction_rad: None,
            distance_mm,
            arrived: false
        }
    }
}

/// Compute the turning axis consigns.
pub(crate) fn turning_axis(mgr: &TrajMgr, pose: &Pose) -> TurningAxis {
    let half_win = mgr.a_win_rad / 2.0;
    let omega_mag = mgr.params.omega_consign;

    let (error_rad, arrived) = match mgr.turning_state {
        TurningState::Cap => (
            Some(angle_2_x_rad(pose, mgr.a_target)),
            robot_in_angle_window(pose, mgr.a_target, mgr.a_win_rad)
        ),
        TurningState::SpeedOffset => {
            let e = angle_2_speed_rad(pose, mgr.speed_offset_rad);
            (Some(e), e.abs() < half_win)
        },
        TurningState::FacePoint => match angle_facepoint_rad(pose, &mgr.point_to_face) {
            Some(e) => (Some(e), e.abs() < half_win),
            None => (None, false)
        },
        TurningState::Idle => return TurningAxis {
            omega: Some(0),
            error_rad: None,
            arrived: false
        }
    };

    let omega = error_rad.map(|e| {
        if arrived {
            0
        }
        else if e > 0.0 {
            omega_mag
        }
        else {
            -omega_mag
        }
    });

    TurningAxis {
        omega,
        error_rad,
        arrived
    }
}

/// Update the progress along the arc and return the new keyframe, or `None` if the robot is on
/// the centre.
pub(crate) fn advance_arc(
    arc: &mut ArcGoal, 
    pose: &Pose, 
    angle_inc_rad: f64
) -> Option<Point2<f64>> {
    let polar_rad = vec_angle_rad(&(pose.position_mm - arc.center_mm))?;

    // Clockwise is positive
    arc.travelled_rad += best_delta_angle_rad(arc.prev_angle_rad - polar_rad);
    arc.prev_angle_rad = polar_rad;

    Some(circle_keyframe(arc, polar_rad, angle_inc_rad))
}

/// Point on the arc's circle `angle_inc_rad` ahead (clockwise) of the polar angle `polar_rad`.
pub fn circle_keyframe(arc: &ArcGoal, polar_rad: f64, angle_inc_rad: f64) -> Point2<f64> {
    let a = polar_rad - angle_inc_rad;
    arc.center_mm + Vector2::new(a.cos(), a.sin()) * arc.radius_mm
}

/// Point at which the arc ends.
pub fn arc_arrival_point(arc: &ArcGoal) -> Point2<f64> {
    circle_keyframe(arc, arc.start_angle_rad, arc.arc_angle_rad)
}


// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use std::f64::consts::{FRAC_PI_2, PI};
    use super::*;
    use super::super::test_utils::{fake_setup, sim_setup};
    use crate::{robot::PositionSource, sched::EventId};

    const DT_S: f64 = 0.025;
    const MAX_TICKS: usize = 2000;

    #[test]
    fn test_straight_taper() {
        let (mut mgr, _, _) = fake_setup(Pose::new(900.0, 0.0, 0.0));
        mgr.goto_xy_abs(1000.0, 0.0).unwrap();

        let report = mgr.evaluate().unwrap();

        assert_eq!(report.speed_consign, 200);
        assert_eq!(report.issued_speed, 20);
        assert_eq!(report.direction_deg, 0);
        assert!(!report.finished);
    }

    #[test]
    fn test_straight_cruise() {
        let (mut mgr, robot, _) = fake_setup(Pose::new(0.0, 0.0, 0.0));
        mgr.goto_xy_abs(0.0, 1000.0).unwrap();

        let report = mgr.evaluate().unwrap();

        assert_eq!(report.speed_consign, 500);
        assert_eq!(report.direction_deg, 90);
        assert_eq!(robot.borrow().directions, vec![90]);
        assert_eq!(robot.borrow().omegas, vec![0]);
    }

    #[test]
    fn test_straight_end_to_end() {
        let (mut mgr, robot, sched) = sim_setup(Pose::new(0.0, 0.0, 0.0));
        mgr.set_windows(50.0, 0.05).unwrap();
        mgr.goto_xy_abs(1000.0, 0.0).unwrap();

        let mut prev_dist = f64::MAX;
        let mut prev_issued = 0;
        let mut finished = false;

        for _ in 0..MAX_TICKS {
            let report = mgr.evaluate().unwrap();
            if report.finished {
                finished = true;
                break;
            }

            assert!(report.distance_to_target_mm <= prev_dist + 1e-9);
            assert!(report.speed_consign <= 500);
            if report.distance_to_target_mm >= 250.0 {
                assert_eq!(report.speed_consign, 500);
            }

            prev_dist = report.distance_to_target_mm;
            prev_issued = report.issued_speed;
            robot.borrow_mut().step(DT_S);
        }

        assert!(finished);
        assert!(mgr.end_of_traj());
        assert!(prev_issued < 20);
        assert_eq!(mgr.moving_state(), MovingState::Idle);
        assert_eq!(mgr.scheduler_task(), None);
        assert_eq!(sched.borrow().deleted, vec![EventId(0)]);

        let pose = robot.borrow().pose();
        assert!((pose.position_mm.x - 1000.0).abs() < 50.0);
        assert!(pose.position_mm.y.abs() < 1e-6);
        assert_eq!(robot.borrow().consigns(), (0, 0, 0));
    }

    #[test]
    fn test_hold_heading_end_to_end() {
        let (mut mgr, robot, sched) = sim_setup(Pose::new(0.0, 0.0, 0.0));
        mgr.turn_cap(FRAC_PI_2).unwrap();

        let mut ticks = 0;
        let mut finished = false;

        for _ in 0..MAX_TICKS {
            let report = mgr.evaluate().unwrap();
            if report.finished {
                finished = true;
                break;
            }

            assert_eq!(report.omega_consign, 50);
            assert_eq!(report.speed_consign, 0);

            ticks += 1;
            robot.borrow_mut().step(DT_S);
        }

        assert!(finished);
        assert!(ticks > 0);
        assert_eq!(mgr.turning_state(), TurningState::Idle);
        assert_eq!(mgr.scheduler_task(), None);
        assert_eq!(sched.borrow().deleted.len(), 1);

        let heading = robot.borrow().pose().heading_rad;
        assert!((heading - FRAC_PI_2).abs() < 0.025);
    }

    #[test]
    fn test_hold_heading_takes_shortest_rotation() {
        let (mut mgr, _, _) = fake_setup(Pose::new(0.0, 0.0, 3.0));
        mgr.turn_cap(-3.0).unwrap();

        // Through pi rather than through zero
        let report = mgr.evaluate().unwrap();
        assert_eq!(report.omega_consign, 50);
    }

    #[test]
    fn test_hold_heading_with_unwrapped_heading() {
        // Heading reported in [0, 2pi), target on the other side of the wrap
        let (mut mgr, _, sched) = fake_setup(Pose::new(0.0, 0.0, 6.2));
        mgr.turn_cap(-3.0).unwrap();

        let report = mgr.evaluate().unwrap();

        assert!(!report.finished);
        assert_eq!(mgr.turning_state(), TurningState::Cap);
        assert!((report.heading_error_rad.unwrap() + 2.917).abs() < 1e-3);
        assert_eq!(report.omega_consign, -50);
        assert!(sched.borrow().deleted.is_empty());
    }

    #[test]
    fn test_circle_end_to_end() {
        let (mut mgr, robot, sched) = sim_setup(Pose::new(1000.0, 0.0, 0.0));
        mgr.circle(0.0, 0.0, FRAC_PI_2).unwrap();

        let center = Point2::new(0.0, 0.0);
        let mut finished = false;

        for _ in 0..MAX_TICKS {
            let report = mgr.evaluate().unwrap();
            if report.finished {
                finished = true;
                break;
            }

            assert_eq!(report.speed_consign, 100);

            // The keyframe always lies on the circle
            let r = distance(&mgr.xy_target(), &center);
            assert!((r - 1000.0).abs() < 1e-6);

            robot.borrow_mut().step(DT_S);
        }

        assert!(finished);
        assert_eq!(mgr.moving_state(), MovingState::Idle);
        assert_eq!(sched.borrow().deleted.len(), 1);
        assert!(mgr.arc().travelled_rad > FRAC_PI_2 / 2.0);

        let pose = robot.borrow().pose();
        assert!(distance(&pose.position_mm, &Point2::new(0.0, -1000.0)) < 25.0);
    }

    #[test]
    fn test_circle_keyframe() {
        let arc = ArcGoal {
            center_mm: Point2::new(100.0, -50.0),
            radius_mm: 300.0,
            arc_angle_rad: PI,
            ..Default::default()
        };

        for i in 0..50 {
            let polar = -PI + (i as f64) * 0.13;
            let kf = circle_keyframe(&arc, polar, 0.05);

            assert!((distance(&kf, &arc.center_mm) - 300.0).abs() < 1e-9);
        }

        // Arcs end clockwise from their start
        let end = arc_arrival_point(&ArcGoal { arc_angle_rad: FRAC_PI_2, ..arc });
        assert!((end.x - 100.0).abs() < 1e-9);
        assert!((end.y + 350.0).abs() < 1e-9);
    }

    #[test]
    fn test_full_circle_does_not_finish_at_start() {
        let (mut mgr, _, _) = fake_setup(Pose::new(1000.0, 0.0, 0.0));
        mgr.circle(0.0, 0.0, 2.0 * PI).unwrap();

        let report = mgr.evaluate().unwrap();
        assert!(!report.finished);
        assert_eq!(mgr.moving_state(), MovingState::Circle);
    }

    #[test]
    fn test_force_stop_during_circle() {
        let (mut mgr, robot, sched) = sim_setup(Pose::new(1000.0, 0.0, 0.0));
        mgr.circle(0.0, 0.0, PI).unwrap();

        for _ in 0..10 {
            mgr.evaluate().unwrap();
            robot.borrow_mut().step(DT_S);
        }
        assert!(robot.borrow().consigns().0 > 0);

        mgr.stop();

        assert_eq!(mgr.scheduler_task(), None);
        assert_eq!(sched.borrow().deleted, vec![EventId(0)]);
        assert_eq!(robot.borrow().consigns().0, 0);
        assert_eq!(robot.borrow().consigns().2, 0);
        assert!(mgr.end_of_traj());
        assert_eq!(mgr.last_issued_speed(), 0);

        // Stale events do nothing
        let report = mgr.evaluate().unwrap();
        assert!(!report.finished);
        assert_eq!(robot.borrow().consigns().0, 0);
    }

    #[test]
    fn test_move_and_turn() {
        let (mut mgr, robot, _) = sim_setup(Pose::new(0.0, 0.0, 0.0));
        mgr.goto_xy_abs(500.0, 0.0).unwrap();
        mgr.turn_cap(FRAC_PI_2).unwrap();

        let mut finished = false;
        for _ in 0..MAX_TICKS {
            if mgr.evaluate().unwrap().finished {
                finished = true;
                break;
            }
            robot.borrow_mut().step(DT_S);
        }

        assert!(finished);
        assert_eq!(mgr.moving_state(), MovingState::Idle);
        assert_eq!(mgr.turning_state(), TurningState::Idle);

        let pose = robot.borrow().pose();
        assert!((pose.position_mm.x - 500.0).abs() < 25.0);
        assert!((pose.heading_rad - FRAC_PI_2).abs() < 0.025);
    }

    #[test]
    fn test_face_point_on_robot_holds_omega() {
        let (mut mgr, robot, _) = fake_setup(Pose::new(100.0, 100.0, 0.0));
        mgr.face_point(100.0, 100.0).unwrap();

        let report = mgr.evaluate().unwrap();

        assert!(report.geometry_noop);
        assert!(!report.finished);
        assert_eq!(report.omega_consign, 0);
        assert_eq!(robot.borrow().omegas, vec![0]);
    }

    #[test]
    fn test_face_point() {
        let (mut mgr, _, _) = fake_setup(Pose::new(0.0, 0.0, 0.0));
        mgr.face_point(0.0, -100.0).unwrap();

        let report = mgr.evaluate().unwrap();
        assert_eq!(report.omega_consign, -50);
        assert!((report.heading_error_rad.unwrap() + FRAC_PI_2).abs() < 1e-9);

        // Inside the window with nothing else to do
        let (mut mgr, _, _) = fake_setup(Pose::new(0.0, 0.0, -FRAC_PI_2));
        mgr.face_point(0.0, -100.0).unwrap();
        assert!(mgr.evaluate().unwrap().finished);
    }

    #[test]
    fn test_speed_offset() {
        let (mut mgr, robot, _) = fake_setup(Pose::new(0.0, 0.0, 0.0));
        robot.borrow_mut().pose.velocity_heading_rad = 1.0;
        mgr.turn_with_speed_offset(-0.5).unwrap();

        let report = mgr.evaluate().unwrap();
        assert_eq!(report.omega_consign, 50);
        assert!((report.heading_error_rad.unwrap() - 0.5).abs() < 1e-9);
    }

    #[test]
    fn test_non_finite_pose() {
        let (mut mgr, robot, _) = fake_setup(Pose::new(0.0, 0.0, 0.0));
        mgr.goto_xy_abs(100.0, 0.0).unwrap();
        robot.borrow_mut().pose.position_mm.x = f64::NAN;

        let report = mgr.evaluate().unwrap();

        assert!(report.geometry_noop);
        assert!(!report.finished);
        assert!(robot.borrow().speeds.is_empty());
    }
}
