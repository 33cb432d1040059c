//! # Trajectory Evaluation Benchmark

use criterion::{criterion_group, criterion_main, Criterion};
use std::f64::consts::PI;

use traj_lib::{
    robot::{shared, Pose, PositionSource},
    sched::PeriodicScheduler,
    sim::SimRobot,
    traj_mgr::{Params, TrajMgr},
};

const DT_S: f64 = 0.025;

fn traj_tick_benchmark(c: &mut Criterion) {
    // ---- Straight line with a fixed cap ----

    let robot = shared(SimRobot::new(Pose::new(0.0, 0.0, 0.0), 1.0, 0.01));
    let sched = shared(PeriodicScheduler::new(4));

    let mut traj = TrajMgr::new(Params::default());
    traj.bind(robot.clone(), robot.clone());
    traj.bind_scheduler(sched.clone());

    c.bench_function("straight_and_cap_tick", |b| {
        b.iter(|| {
            if traj.scheduler_task().is_none() {
                // Go back and forth along X
                let x_mm = robot.borrow().pose().position_mm.x;
                let target_mm = if x_mm < 500.0 { 1000.0 } else { 0.0 };
                traj.goto_xy_abs(target_mm, 0.0).unwrap();
                traj.turn_cap(PI / 3.0).unwrap();
            }
            traj.evaluate().unwrap();
            robot.borrow_mut().step(DT_S);
        })
    });

    // ---- Arc of circle ----

    let robot = shared(SimRobot::new(Pose::new(1000.0, 0.0, 0.0), 1.0, 0.01));
    let sched = shared(PeriodicScheduler::new(4));

    let mut traj = TrajMgr::new(Params::default());
    traj.bind(robot.clone(), robot.clone());
    traj.bind_scheduler(sched.clone());

    c.bench_function("circle_tick", |b| {
        b.iter(|| {
            if traj.scheduler_task().is_none() {
                traj.circle(0.0, 0.0, 2.0 * PI).unwrap();
            }
            traj.evaluate().unwrap();
            robot.borrow_mut().step(DT_S);
        })
    });
}

criterion_group!(benches, traj_tick_benchmark);
criterion_main!(benches);
