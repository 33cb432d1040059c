//! # Communications interface crate.
//!
//! Provides the command definitions shared between the trajectory executable
//! and the tools that drive it (scripts, command line).

// ------------------------------------------------------------------------------------------------
// MODULES
// ------------------------------------------------------------------------------------------------

/// Telecommands accepted by the trajectory executable
pub mod tc;
