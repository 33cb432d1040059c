//! # Telecommand module
//!
//! A telecommand is a single trajectory instruction. Telecommands are written
//! as JSON objects with a `type` and an optional `payload`, for example:
//!
//! ```json
//! {"type": "GOTO", "payload": {"x_mm": 1000.0, "y_mm": 0.0}}
//! ```

// ---------------------------------------------------------------------------
// MODULES
// ---------------------------------------------------------------------------

pub mod traj_mgr;

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use serde::{Serialize, Deserialize};
use thiserror::Error;

// Internal
pub use traj_mgr::TrajCmd;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// A telecommand, i.e. an instruction sent to the trajectory executable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Tc {
    pub cmd: TrajCmd
}

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// Possible parsing errors.
#[derive(Debug, Error)]
pub enum TcParseError {
    #[error("TC contains invalid JSON: {0}")]
    InvalidJson(serde_json::Error),

    #[error("TC has an invalid type ({0})")]
    InvalidType(String),
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Tc {

    /// Parse a new TC from a JSON packet
    pub fn from_json(json_str: &str) -> Result<Self, TcParseError> {
        // Parse the string into a generic value first so that a bad type can
        // be told apart from a bad payload.
        let val: serde_json::Value = serde_json::from_str(json_str)
            .map_err(TcParseError::InvalidJson)?;

        match val["type"].as_str() {
            Some(t) if TrajCmd::TYPES.contains(&t) => (),
            Some(t) => return Err(TcParseError::InvalidType(
                format!("{} is not a recognised TC type", t)
            )),
            None => return Err(TcParseError::InvalidType(String::from(
                "Expected \"type\" to be a string"
            )))
        }

        let cmd = serde_json::from_value(val)
            .map_err(TcParseError::InvalidJson)?;

        Ok(Tc { cmd })
    }

    /// Serialise the TC into its JSON form.
    pub fn to_json(&self) -> Result<String, TcParseError> {
        serde_json::to_string(self).map_err(TcParseError::InvalidJson)
    }
}

impl From<TrajCmd> for Tc {
    fn from(cmd: TrajCmd) -> Self {
        Tc { cmd }
    }
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------
