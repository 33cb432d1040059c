//! Fakes used by the trajectory manager tests

use std::time::Duration;

use super::{Params, TrajMgr};
use crate::{
    robot::{shared, DriveSink, Pose, PositionSource, Shared},
    sched::{EventId, Scheduler, SchedulerError},
    sim::SimRobot
};

/// A robot which never moves and records every consign it gets.
pub struct FakeRobot {
    pub pose: Pose,
    pub speeds: Vec<i32>,
    pub directions: Vec<i32>,
    pub omegas: Vec<i32>
}

/// A scheduler which records registrations and removals.
#[derive(Default)]
pub struct FakeScheduler {
    pub added: Vec<(EventId, Duration, u8)>,
    pub deleted: Vec<EventId>,
    pub full: bool,
    next_id: usize
}

impl FakeRobot {
    pub fn new(pose: Pose) -> Self {
        Self {
            pose,
            speeds: vec![],
            directions: vec![],
            omegas: vec![]
        }
    }
}

impl PositionSource for FakeRobot {
    fn pose(&self) -> Pose {
        self.pose
    }
}

impl DriveSink for FakeRobot {
    fn set_speed(&mut self, speed: i32) {
        self.speeds.push(speed);
    }

    fn set_direction(&mut self, direction_deg: i32) {
        self.directions.push(direction_deg);
    }

    fn set_rotation_speed(&mut self, omega: i32) {
        self.omegas.push(omega);
    }
}

impl Scheduler for FakeScheduler {
    fn add_periodic_event(
        &mut self, 
        period: Duration, 
        priority: u8
    ) -> Result<EventId, SchedulerError> {
        if self.full {
            return Err(SchedulerError::NoFreeSlot);
        }

        let id = EventId(self.next_id);
        self.next_id += 1;
        self.added.push((id, period, priority));

        Ok(id)
    }

    fn del_event(&mut self, id: EventId) {
        self.deleted.push(id);
    }
}

/// Build a manager bound to a fake robot at `pose` and a fake scheduler.
pub fn fake_setup(pose: Pose) -> (TrajMgr, Shared<FakeRobot>, Shared<FakeScheduler>) {
    let robot = shared(FakeRobot::new(pose));
    let sched = shared(FakeScheduler::default());

    let mut mgr = TrajMgr::new(Params::default());
    mgr.bind(robot.clone(), robot.clone());
    mgr.bind_scheduler(sched.clone());

    (mgr, robot, sched)
}

/// Build a manager bound to a simulated robot at `pose` and a fake scheduler.
pub fn sim_setup(pose: Pose) -> (TrajMgr, Shared<SimRobot>, Shared<FakeScheduler>) {
    let robot = shared(SimRobot::new(pose, 1.0, 0.01));
    let sched = shared(FakeScheduler::default());

    let mut mgr = TrajMgr::new(Params::default());
    mgr.bind(robot.clone(), robot.clone());
    mgr.bind_scheduler(sched.clone());

    (mgr, robot, sched)
}
