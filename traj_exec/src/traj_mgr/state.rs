//! Trajectory manager state and commands

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use std::time::Duration;
use log::{debug, info, warn};
use nalgebra::Point2;
use serde::Serialize;

// Internal
use super::{
    angle::{modulo_2pi, to_deg_i32},
    Params, SpeedRamp, TrajMgrError, GEOMETRY_EPSILON_MM
};
use crate::{
    robot::{DriveSink, Pose, PositionSource, Shared},
    sched::{EventId, Scheduler, SchedulerError}
};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// A complete instance of the trajectory manager, one per robot.
pub struct TrajMgr {
    pub(crate) params: Params,

    pub(crate) moving_state: MovingState,
    pub(crate) turning_state: TurningState,

    /// Target of the moving part. Replaced by the keyframe on every tick of an arc.
    pub(crate) xy_target: Point2<f64>,

    /// Target heading of the turning part, in `(-pi, pi]`.
    pub(crate) a_target: f64,

    /// Arc goal for `MovingState::Circle`.
    pub(crate) arc: ArcGoal,

    /// Point to face for `TurningState::FacePoint`.
    pub(crate) point_to_face: Point2<f64>,

    /// Offset from the velocity vector for `TurningState::SpeedOffset`.
    pub(crate) speed_offset_rad: f64,

    /// Arrival windows
    pub(crate) d_win_mm: f64,
    pub(crate) a_win_rad: f64,

    pub(crate) end_of_traj: bool,

    pub(crate) ramp: SpeedRamp,

    /// Consigns held when the geometry leaves them undefined.
    pub(crate) last_direction_deg: i32,
    pub(crate) last_omega: i32,

    /// Id of the periodic event, `None` when not scheduled.
    pub(crate) scheduler_task: Option<EventId>,

    position: Option<Shared<dyn PositionSource>>,
    drive: Option<Shared<dyn DriveSink>>,
    scheduler: Option<Shared<dyn Scheduler>>
}

/// An arc of circle to follow.
#[derive(Debug, Copy, Clone, Serialize)]
pub struct ArcGoal {
    pub center_mm: Point2<f64>,

    /// Distance between the robot and the centre when the arc was commanded.
    pub radius_mm: f64,

    /// Portion of the circle to travel, 2*pi is a full circle.
    pub arc_angle_rad: f64,

    /// Polar angle of the robot around the centre when the arc was commanded.
    pub start_angle_rad: f64,

    /// Angle travelled so far, clockwise positive.
    pub travelled_rad: f64,

    /// Polar angle of the robot on the previous tick.
    pub prev_angle_rad: f64
}

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// Moving part of a trajectory.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize)]
pub enum MovingState {
    Straight,
    Circle,
    Idle
}

/// Turning part of a trajectory.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize)]
pub enum TurningState {
    /// Hold a fixed heading
    Cap,
    /// Keep a fixed offset from the velocity vector
    SpeedOffset,
    /// Face a point
    FacePoint,
    Idle
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Default for ArcGoal {
    fn default() -> Self {
        Self {
            center_mm: Point2::origin(),
            radius_mm: 0.0,
            arc_angle_rad: 0.0,
            start_angle_rad: 0.0,
            travelled_rad: 0.0,
            prev_angle_rad: 0.0
        }
    }
}

impl TrajMgr {
    /// Create an idle trajectory manager, not bound to any robot.
    pub fn new(params: Params) -> Self {
        Self {
            ramp: SpeedRamp::new(params.ramp_step),
            d_win_mm: params.default_d_win_mm,
            a_win_rad: params.default_a_win_rad,
            params,
            moving_state: MovingState::Idle,
            turning_state: TurningState::Idle,
            xy_target: Point2::origin(),
            a_target: 0.0,
            arc: ArcGoal::default(),
            point_to_face: Point2::origin(),
            speed_offset_rad: 0.0,
            end_of_traj: false,
            last_direction_deg: 0,
            last_omega: 0,
            scheduler_task: None,
            position: None,
            drive: None,
            scheduler: None
        }
    }

    /// Bind the robot used to compute the trajectory.
    pub fn bind(
        &mut self, 
        position: Shared<dyn PositionSource>, 
        drive: Shared<dyn DriveSink>
    ) {
        self.position = Some(position);
        self.drive = Some(drive);
    }

    /// Bind the scheduler the periodic event is registered with.
    pub fn bind_scheduler(&mut self, scheduler: Shared<dyn Scheduler>) {
        self.scheduler = Some(scheduler);
    }

    /// Set the arrival windows.
    ///
    /// The robot has arrived at a point when it is closer than `d_win_mm`, and at a heading when
    /// its heading error is less than half of `a_win_rad`.
    pub fn set_windows(&mut self, d_win_mm: f64, a_win_rad: f64) -> Result<(), TrajMgrError> {
        if !(d_win_mm.is_finite() && d_win_mm > 0.0 && a_win_rad.is_finite() && a_win_rad > 0.0) {
            return Err(TrajMgrError::InvalidWindow(d_win_mm, a_win_rad));
        }

        self.d_win_mm = d_win_mm;
        self.a_win_rad = a_win_rad;

        Ok(())
    }

    /// Go to a point in a straight line.
    ///
    /// This is mixed with the current turning command.
    pub fn goto_xy_abs(&mut self, x_abs_mm: f64, y_abs_mm: f64) -> Result<(), TrajMgrError> {
        self.check_bound()?;
        check_finite(&[x_abs_mm, y_abs_mm], "target point")?;

        self.schedule_event()?;

        self.xy_target = Point2::new(x_abs_mm, y_abs_mm);
        self.moving_state = MovingState::Straight;
        self.end_of_traj = false;

        info!("Moving straight to ({:.1}, {:.1}) mm", x_abs_mm, y_abs_mm);

        Ok(())
    }

    /// Follow an arc of circle around the given centre, starting from the current position.
    ///
    /// The radius is the current distance to the centre, and `arc_angle_rad` the portion of the
    /// circle to travel (2*pi for a full circle). This is mixed with the current turning command.
    pub fn circle(
        &mut self, 
        x_center_abs_mm: f64, 
        y_center_abs_mm: f64, 
        arc_angle_rad: f64
    ) -> Result<(), TrajMgrError> {
        self.check_bound()?;
        check_finite(&[x_center_abs_mm, y_center_abs_mm], "circle centre")?;

        if !(arc_angle_rad.is_finite() && arc_angle_rad > 0.0) {
            return Err(TrajMgrError::InvalidGeometry(format!(
                "arc angle must be positive, got {}", arc_angle_rad
            )));
        }

        let pose = self.read_pose()?;
        if !pose.is_finite() {
            return Err(TrajMgrError::InvalidGeometry(format!(
                "robot pose is not finite: {:?}", pose
            )));
        }

        let center = Point2::new(x_center_abs_mm, y_center_abs_mm);
        let rel = pose.position_mm - center;
        let radius_mm = rel.norm();

        if radius_mm < GEOMETRY_EPSILON_MM {
            return Err(TrajMgrError::InvalidGeometry(String::from(
                "the robot is on the circle's centre"
            )));
        }

        self.schedule_event()?;

        let start_angle_rad = rel.y.atan2(rel.x);
        self.arc = ArcGoal {
            center_mm: center,
            radius_mm,
            arc_angle_rad,
            start_angle_rad,
            travelled_rad: 0.0,
            prev_angle_rad: start_angle_rad
        };

        // The keyframe is recomputed from the pose on the next tick
        self.xy_target = pose.position_mm;
        self.moving_state = MovingState::Circle;
        self.end_of_traj = false;

        info!(
            "Moving on a {:.3} rad arc around ({:.1}, {:.1}) mm, radius {:.1} mm",
            arc_angle_rad, x_center_abs_mm, y_center_abs_mm, radius_mm
        );

        Ok(())
    }

    /// Hold the heading at a fixed cap.
    ///
    /// This is mixed with the current moving command.
    pub fn turn_cap(&mut self, cap_rad: f64) -> Result<(), TrajMgrError> {
        self.check_bound()?;
        check_finite(&[cap_rad], "cap")?;

        self.schedule_event()?;

        self.a_target = modulo_2pi(cap_rad);
        self.turning_state = TurningState::Cap;
        self.end_of_traj = false;

        info!("Turning to cap {:.3} rad", self.a_target);

        Ok(())
    }

    /// Keep the robot facing a point.
    ///
    /// This is mixed with the current moving command.
    pub fn face_point(&mut self, x_abs_mm: f64, y_abs_mm: f64) -> Result<(), TrajMgrError> {
        self.check_bound()?;
        check_finite(&[x_abs_mm, y_abs_mm], "point to face")?;

        self.schedule_event()?;

        self.point_to_face = Point2::new(x_abs_mm, y_abs_mm);
        self.turning_state = TurningState::FacePoint;
        self.end_of_traj = false;

        info!("Facing point ({:.1}, {:.1}) mm", x_abs_mm, y_abs_mm);

        Ok(())
    }

    /// Keep the heading at a fixed offset from the velocity vector.
    ///
    /// This is mixed with the current moving command.
    pub fn turn_with_speed_offset(&mut self, offset_rad: f64) -> Result<(), TrajMgrError> {
        self.check_bound()?;
        check_finite(&[offset_rad], "speed offset")?;

        self.schedule_event()?;

        self.speed_offset_rad = modulo_2pi(offset_rad);
        self.turning_state = TurningState::SpeedOffset;
        self.end_of_traj = false;

        info!("Turning with an offset of {:.3} rad from the speed vector", offset_rad);

        Ok(())
    }

    /// Manually pass consigns to the drive.
    ///
    /// The speed still goes through the ramp. The goal is left untouched, so if the periodic
    /// event is scheduled these consigns only last until the next tick.
    pub fn set_consigns(
        &mut self, 
        speed: i32, 
        direction_deg: i32, 
        omega: i32
    ) -> Result<(), TrajMgrError> {
        if self.drive.is_none() {
            return Err(TrajMgrError::NotBound);
        }

        self.send_consigns(speed, direction_deg, omega);

        Ok(())
    }

    /// Stop the robot now and end the trajectory.
    pub fn stop(&mut self) {
        info!("Trajectory stopped");

        self.moving_state = MovingState::Idle;
        self.turning_state = TurningState::Idle;
        self.delete_event();
    }

    /// True when the trajectory is finished.
    pub fn end_of_traj(&self) -> bool {
        self.end_of_traj
    }

    pub fn moving_state(&self) -> MovingState {
        self.moving_state
    }

    pub fn turning_state(&self) -> TurningState {
        self.turning_state
    }

    pub fn xy_target(&self) -> Point2<f64> {
        self.xy_target
    }

    pub fn a_target(&self) -> f64 {
        self.a_target
    }

    pub fn arc(&self) -> &ArcGoal {
        &self.arc
    }

    /// The arrival windows as `(d_win_mm, a_win_rad)`.
    pub fn windows(&self) -> (f64, f64) {
        (self.d_win_mm, self.a_win_rad)
    }

    /// Id of the periodic event if one is scheduled.
    pub fn scheduler_task(&self) -> Option<EventId> {
        self.scheduler_task
    }

    /// The speed issued to the drive on the previous tick.
    pub fn last_issued_speed(&self) -> i32 {
        self.ramp.last_issued()
    }

    pub fn params(&self) -> &Params {
        &self.params
    }

    // ---- INTERNALS ----

    /// Read the robot's pose.
    pub(crate) fn read_pose(&self) -> Result<Pose, TrajMgrError> {
        match self.position {
            Some(ref p) => Ok(p.borrow().pose()),
            None => Err(TrajMgrError::NotBound)
        }
    }

    /// Pass consigns to the drive, with the speed going through the ramp.
    pub(crate) fn send_consigns(&mut self, speed: i32, direction_deg: i32, omega: i32) {
        let drive = match self.drive {
            Some(ref d) => d,
            None => return
        };

        let ramped = self.ramp.do_ramp(speed);

        let mut drive = drive.borrow_mut();
        drive.set_speed(ramped);
        drive.set_direction(direction_deg);
        drive.set_rotation_speed(omega);

        self.last_direction_deg = direction_deg;
        self.last_omega = omega;
    }

    /// Schedule the trajectory event, if it isn't already.
    pub(crate) fn schedule_event(&mut self) -> Result<(), TrajMgrError> {
        if let Some(id) = self.scheduler_task {
            warn!("Trajectory event already scheduled as {:?}", id);
            return Ok(());
        }

        let scheduler = match self.scheduler {
            Some(ref s) => s,
            None => return Err(TrajMgrError::NoScheduler)
        };

        let period = Duration::try_from_secs_f64(self.params.evt_period_s)
            .map_err(|_| TrajMgrError::SchedulerError(SchedulerError::InvalidPeriod))?;

        let id = scheduler
            .borrow_mut()
            .add_periodic_event(period, self.params.evt_priority)
            .map_err(TrajMgrError::SchedulerError)?;

        debug!("Trajectory event scheduled as {:?}", id);
        self.scheduler_task = Some(id);

        Ok(())
    }

    /// Stop the robot, remove the event if any, and flag the end of the trajectory.
    pub(crate) fn delete_event(&mut self) {
        self.ramp.reset();

        // Leave the direction along the current velocity vector
        let direction_deg = match self.read_pose() {
            Ok(p) if p.is_finite() => to_deg_i32(p.velocity_heading_rad),
            _ => self.last_direction_deg
        };

        // Zero the drive directly, without going through the ramp
        if let Some(ref drive) = self.drive {
            let mut drive = drive.borrow_mut();
            drive.set_speed(0);
            drive.set_direction(direction_deg);
            drive.set_rotation_speed(0);
        }
        self.last_direction_deg = direction_deg;
        self.last_omega = 0;

        match self.scheduler_task.take() {
            Some(id) => {
                debug!("Delete event {:?}", id);
                if let Some(ref s) = self.scheduler {
                    s.borrow_mut().del_event(id);
                }
            },
            None => debug!("Delete event, no event scheduled")
        }

        self.end_of_traj = true;
    }

    /// Check everything needed to evaluate the trajectory is bound.
    fn check_bound(&self) -> Result<(), TrajMgrError> {
        if self.position.is_none() || self.drive.is_none() {
            return Err(TrajMgrError::NotBound);
        }
        if self.scheduler.is_none() {
            return Err(TrajMgrError::NoScheduler);
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// FUNCTIONS
// ---------------------------------------------------------------------------

fn check_finite(values: &[f64], what: &str) -> Result<(), TrajMgrError> {
    if values.iter().all(|v| v.is_finite()) {
        Ok(())
    }
    else {
        Err(TrajMgrError::InvalidGeometry(format!("{} is not finite: {:?}", what, values)))
    }
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------
