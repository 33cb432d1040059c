//! Holonomic trajectory executable entry point.
//!
//! # Architecture
//!
//! Runs the trajectory manager against a simulated holonomic robot:
//!
//!     - Initialise the session, logger, parameters and modules
//!     - Main loop:
//!         - Telecommand processing, from a script or from the command line
//!         - Dispatch of the scheduler's due events to the trajectory manager
//!         - Simulation of the robot over the cycle
//!     - Stop once the commands are exhausted and the trajectory is finished
//!
//! # Usage
//!
//!     traj_exec --script scripts/square.tcs
//!     traj_exec goto 1000 0

// ---------------------------------------------------------------------------
// USE MODULES FROM LIBRARY
// ---------------------------------------------------------------------------

use comms_if::tc::{Tc, traj_mgr::TrajCmd};
use traj_lib::{
    robot::{shared, Pose, PositionSource},
    sched::PeriodicScheduler,
    sim::{SimParams, SimRobot},
    traj_mgr::{Params, StatusReport, TrajMgr}
};

mod tc_processor;

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use log::{debug, info, warn};
use serde::Serialize;
use std::path::PathBuf;
use std::thread;
use std::time::{Duration, Instant};
use color_eyre::{Report, eyre::{WrapErr, eyre}};
use structopt::StructOpt;

// Internal
use util::{
    logger::{logger_init, LevelFilter, LoggerConfig},
    session::Session,
    script_interpreter::{ScriptInterpreter, PendingTcs}
};

// ---------------------------------------------------------------------------
// CONSTANTS
// ---------------------------------------------------------------------------

/// Module path of the periodic evaluation, quietened unless running verbose.
const TICK_LOG_TARGET: &str = "traj_lib::traj_mgr";

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Command line options.
#[derive(Debug, StructOpt)]
#[structopt(name = "traj_exec", about = "Run the trajectory manager on a simulated robot")]
struct Opt {
    /// Timed telecommand script to execute.
    #[structopt(short, long, parse(from_os_str))]
    script: Option<PathBuf>,

    /// Log every trajectory evaluation.
    #[structopt(short, long)]
    verbose: bool,

    /// A single command to execute instead of a script.
    #[structopt(subcommand)]
    cmd: Option<TrajCmd>
}

/// Summary saved into the session at the end of the run.
#[derive(Debug, Serialize)]
struct RunSummary {
    num_cycles: u64,
    duration_s: f64,
    final_pose: Pose,
    end_of_traj: bool,
    last_report: Option<StatusReport>
}

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// Various sources for the telecommands incoming to the exec.
enum TcSource {
    Script(ScriptInterpreter),

    /// A command from the command line, taken on the first cycle
    Single(Option<Tc>)
}

// ---------------------------------------------------------------------------
// FUNCTIONS
// ---------------------------------------------------------------------------

/// Executable main function, entry point.
fn main() -> Result<(), Report> {
    color_eyre::install()?;

    let opt = Opt::from_args();

    // ---- EARLY INITIALISATION ----

    // Initialise session
    let session = Session::new(
        "traj_exec", 
        "sessions"
    ).wrap_err("Failed to create the session")?;

    // Initialise logger
    let log_config = match opt.verbose {
        true => LoggerConfig::new(LevelFilter::Trace),
        false => LoggerConfig::new(LevelFilter::Debug)
            .with_tick_target(TICK_LOG_TARGET, LevelFilter::Info)
    };
    logger_init(&log_config, &session)
        .wrap_err("Failed to initialise logging")?;

    info!("Holonomic Trajectory Executable\n");
    info!("Session directory: {:?}\n", session.session_root);

    // ---- LOAD PARAMETERS ----

    let traj_params: Params = util::params::load(
        "traj_mgr.toml"
    ).wrap_err("Could not load trajectory manager params")?;

    let sim_params: SimParams = util::params::load(
        "sim.toml"
    ).wrap_err("Could not load simulation params")?;

    info!("Exec parameters loaded");

    // ---- INITIALISE TC SOURCE ----

    let mut tc_source = match (opt.script, opt.cmd) {
        (Some(path), None) => {
            info!("Loading script from {:?}", path);

            let si = ScriptInterpreter::new(&path)
                .wrap_err("Failed to load script")?;

            info!(
                "Loaded script lasts {:.02} s and contains {} TCs\n",
                si.get_duration(),
                si.get_num_tcs()
            );

            TcSource::Script(si)
        },
        (None, Some(cmd)) => {
            info!("Executing a single command: {:?}\n", cmd);
            TcSource::Single(Some(Tc::from(cmd)))
        },
        (Some(_), Some(_)) => return Err(eyre!(
            "Expected either a script or a command, found both"
        )),
        (None, None) => return Err(eyre!(
            "Expected either a script or a command, found neither"
        ))
    };

    // ---- INITIALISE MODULES ----

    info!("Initialising modules...");

    let robot = shared(SimRobot::from_params(&sim_params));
    let sched = shared(PeriodicScheduler::new(sim_params.scheduler_capacity));

    let mut traj = TrajMgr::new(traj_params);
    traj.bind(robot.clone(), robot.clone());
    traj.bind_scheduler(sched.clone());

    info!("Module initialisation complete\n");

    let cycle_period = Duration::try_from_secs_f64(sim_params.cycle_period_s)
        .wrap_err("Invalid cycle period")?;
    let cycles_per_second = ((1.0 / cycle_period.as_secs_f64()).round() as u64).max(1);

    // ---- MAIN LOOP ----

    info!("Begining main loop\n");

    let start_instant = Instant::now();
    let mut prev_elapsed = Duration::default();
    let mut num_cycles: u64 = 0;
    let mut tcs_exhausted = false;
    let mut last_report: Option<StatusReport> = None;

    loop {

        // Get cycle start time
        let cycle_start_instant = Instant::now();
        let elapsed = cycle_start_instant - start_instant;

        // ---- TELECOMMAND PROCESSING ----

        match tc_source {
            TcSource::Script(ref mut si) => 
                match si.get_pending_tcs(elapsed.as_secs_f64()) {
                    PendingTcs::None => (),
                    PendingTcs::Some(tc_vec) => {
                        for tc in tc_vec.iter() {
                            tc_processor::exec(&mut traj, tc);
                        }
                    },
                    PendingTcs::EndOfScript => {
                        if !tcs_exhausted {
                            info!("End of TC script reached");
                        }
                        tcs_exhausted = true;
                    }
                },
            TcSource::Single(ref mut tc) => {
                if let Some(tc) = tc.take() {
                    tc_processor::exec(&mut traj, &tc);
                }
                tcs_exhausted = true;
            }
        }

        // ---- TRAJECTORY PROCESSING ----

        let due_events = sched.borrow_mut().due_events(elapsed);

        for id in due_events {
            if traj.scheduler_task() != Some(id) {
                debug!("No handler for event {:?}", id);
                continue;
            }

            match traj.evaluate() {
                Ok(r) => {
                    if r.finished {
                        info!("Trajectory finished");
                    }
                    last_report = Some(r);
                },
                Err(e) => warn!("Error during trajectory evaluation: {}", e)
            }
        }

        // ---- SIMULATION ----

        robot.borrow_mut().step((elapsed - prev_elapsed).as_secs_f64());
        prev_elapsed = elapsed;

        if num_cycles % cycles_per_second == 0 {
            let pose = robot.borrow().pose();
            info!(
                "Robot at ({:.1}, {:.1}) mm, heading {:.3} rad",
                pose.position_mm.x,
                pose.position_mm.y,
                pose.heading_rad
            );
        }

        // ---- EXIT CONDITIONS ----

        if tcs_exhausted && traj.scheduler_task().is_none() {
            info!("All commands executed and no trajectory running, stopping");
            break;
        }

        if elapsed.as_secs_f64() > sim_params.max_duration_s {
            warn!(
                "Maximum duration of {:.02} s exceeded, stopping the trajectory", 
                sim_params.max_duration_s
            );
            traj.stop();
            break;
        }

        // ---- CYCLE MANAGEMENT ----

        let cycle_dur = Instant::now() - cycle_start_instant;

        match cycle_period.checked_sub(cycle_dur) {
            Some(d) => thread::sleep(d),
            None => warn!(
                "Cycle overran by {:.06} s", 
                cycle_dur.as_secs_f64() - cycle_period.as_secs_f64()
            )
        }

        num_cycles += 1;
    }

    // ---- SHUTDOWN ----

    let summary = RunSummary {
        num_cycles,
        duration_s: start_instant.elapsed().as_secs_f64(),
        final_pose: robot.borrow().pose(),
        end_of_traj: traj.end_of_traj(),
        last_report
    };

    session.save_json("run_summary.json", &summary)
        .wrap_err("Failed to save the run summary")?;

    info!("End of execution");

    Ok(())
}
