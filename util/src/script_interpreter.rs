//! # Trajectory script interpreter module
//!
//! This module provides an interpreter for timed trajectory scripts, allowing
//! telecommands to be executed at set times. Each command in a script is
//! written as:
//!
//! ```text
//! <exec time in seconds>: <telecommand JSON>;
//! ```
//!
//! Lines which don't match this form are ignored, so they can be used for
//! comments.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use std::collections::VecDeque;
use std::path::{Path, PathBuf};
use std::fs;
use regex::RegexBuilder;
use thiserror::Error;

// Internal
use comms_if::tc::{Tc, TcParseError};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// A command which is scripted to occur at a specific time.
#[derive(Debug)]
pub struct Command {
    /// The time the command is supposed to execute at
    exec_time_s: f64,

    /// The Telecommand to run
    tc: Tc
}

/// A script interpreter.
///
/// After initialising with the path to the script to run use
/// `.get_pending_tcs` to acquire a list of telecommands that need executing.
#[derive(Debug)]
pub struct ScriptInterpreter {
    _script_path: Option<PathBuf>,
    cmds: VecDeque<Command>
}

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

#[derive(Debug, Error)]
pub enum ScriptError {
    #[error("Could not find the script at {0:?}")]
    ScriptNotFound(PathBuf),

    #[error("Could not load the script: {0}")]
    ScriptLoadError(std::io::Error),

    #[error("The script is empty (or is so bad it can't be read)")]
    ScriptEmpty,

    #[error("Could not build the script pattern: {0}")]
    PatternError(regex::Error),

    #[error(
        "Script contains an invalid timestamp: {0}. \
        Should be a float (like 1.0)")]
    InvalidTimestamp(String),

    #[error("Script contains an invalid TC at {0} s: {1}")]
    InvalidTc(f64, TcParseError),

    #[error("Script commands are not in time order at {0} s")]
    OutOfOrder(f64)
}

#[derive(Debug)]
pub enum PendingTcs {
    None,
    Some(Vec<Tc>),
    EndOfScript
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl ScriptInterpreter {

    /// Create a new interpreter from the given script path.
    pub fn new<P: AsRef<Path>>(script_path: P) -> Result<Self, ScriptError> {

        // Get the path in a buffer
        let path = PathBuf::from(script_path.as_ref());
        
        // Check that the script file exists.
        if !path.exists() {
            return Err(ScriptError::ScriptNotFound(path));
        }

        // Load the script into a string
        let script = fs::read_to_string(&path)
            .map_err(ScriptError::ScriptLoadError)?;

        let mut si = Self::from_str(&script)?;
        si._script_path = Some(path);

        Ok(si)
    }

    /// Create a new interpreter from the contents of a script.
    pub fn from_str(script: &str) -> Result<Self, ScriptError> {

        // Empty queue of commands
        let mut tc_queue: VecDeque<Command> = VecDeque::new();

        // Go through the script executing __the magic regex__.
        let re = RegexBuilder::
            new(r"^\s*(\d+(\.\d+)?)\s*:\s*([^;]*);")
            .multi_line(true)
            .build()
            .map_err(ScriptError::PatternError)?;

        for cap in re.captures_iter(script) {
            // Parse the exec time
            let exec_time_s: f64 = cap[1].parse()
                .map_err(|e| ScriptError::InvalidTimestamp(format!("{}", e)))?;

            // Commands are popped from the front, so they must be sorted
            if let Some(prev) = tc_queue.back() {
                if prev.exec_time_s > exec_time_s {
                    return Err(ScriptError::OutOfOrder(exec_time_s));
                }
            }

            // Parse the TC from the payload. The scripts contain JSON only.
            let tc = Tc::from_json(&cap[3])
                .map_err(|e| ScriptError::InvalidTc(exec_time_s, e))?;

            tc_queue.push_back(Command {
                exec_time_s,
                tc
            });
        }

        if tc_queue.is_empty() {
            return Err(ScriptError::ScriptEmpty)
        }

        Ok(ScriptInterpreter {
            _script_path: None,
            cmds: tc_queue
        })
    }

    /// Return the TCs whose execution time is at or before `current_time_s`.
    pub fn get_pending_tcs(&mut self, current_time_s: f64) -> PendingTcs {

        // If the queue is empty the script is over and we return the end of
        // script variant
        if self.cmds.is_empty() {
            return PendingTcs::EndOfScript
        }

        let mut tc_vec: Vec<Tc> = vec![];

        while let Some(cmd) = self.cmds.front() {
            if cmd.exec_time_s > current_time_s {
                break;
            }
            if let Some(cmd) = self.cmds.pop_front() {
                tc_vec.push(cmd.tc);
            }
        }

        // If the vector is longer than 0 return Some, otherwise None
        if tc_vec.len() > 0 {
            PendingTcs::Some(tc_vec)
        }
        else {
            PendingTcs::None
        }
    }

    /// Get the number of TCs in the script
    pub fn get_num_tcs(&self) -> usize {
        self.cmds.len()
    }

    /// Get the length of the script in seconds
    pub fn get_duration(&self) -> f64 {
        match self.cmds.back() {
            Some(c) => c.exec_time_s,
            None => 0f64
        }
    }
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;
    use comms_if::tc::TrajCmd;

    const SCRIPT: &str = r#"
# Square corner with a heading change
0.0: {"type": "WINDOWS", "payload": {"d_win_mm": 50.0, "a_win_rad": 0.1}};
0.0: {"type": "GOTO", "payload": {"x_mm": 1000.0, "y_mm": 0.0}};
5.5: {"type": "CAP", "payload": {"cap_rad": 1.57}};
12: {"type": "STOP"};
"#;

    #[test]
    fn test_script_pending() {
        let mut si = ScriptInterpreter::from_str(SCRIPT).unwrap();
        assert_eq!(si.get_num_tcs(), 4);
        assert_eq!(si.get_duration(), 12.0);

        match si.get_pending_tcs(0.0) {
            PendingTcs::Some(tcs) => {
                assert_eq!(tcs.len(), 2);
                assert_eq!(tcs[1].cmd, TrajCmd::Goto { x_mm: 1000.0, y_mm: 0.0 });
            },
            p => panic!("Expected two TCs, got {:?}", p)
        }

        match si.get_pending_tcs(3.0) {
            PendingTcs::None => (),
            p => panic!("Expected no TCs, got {:?}", p)
        }

        match si.get_pending_tcs(20.0) {
            PendingTcs::Some(tcs) => {
                assert_eq!(tcs.len(), 2);
                assert_eq!(tcs[1].cmd, TrajCmd::Stop);
            },
            p => panic!("Expected two TCs, got {:?}", p)
        }

        match si.get_pending_tcs(21.0) {
            PendingTcs::EndOfScript => (),
            p => panic!("Expected end of script, got {:?}", p)
        }
    }

    #[test]
    fn test_script_errors() {
        match ScriptInterpreter::from_str("# nothing here\n") {
            Err(ScriptError::ScriptEmpty) => (),
            r => panic!("Expected empty script, got {:?}", r)
        }

        match ScriptInterpreter::from_str("1.0: {\"type\": \"FLY\"};\n") {
            Err(ScriptError::InvalidTc(t, _)) => assert_eq!(t, 1.0),
            r => panic!("Expected invalid TC, got {:?}", r)
        }

        match ScriptInterpreter::from_str(
            "2.0: {\"type\": \"STOP\"};\n1.0: {\"type\": \"STOP\"};\n"
        ) {
            Err(ScriptError::OutOfOrder(t)) => assert_eq!(t, 1.0),
            r => panic!("Expected out of order, got {:?}", r)
        }

        match ScriptInterpreter::new("no/such/script.traj") {
            Err(ScriptError::ScriptNotFound(_)) => (),
            r => panic!("Expected script not found, got {:?}", r)
        }
    }
}
