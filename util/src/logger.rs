//! Logger initialisation
//!
//! All crates in the workspace log through the `log` facade. The executable
//! calls [`logger_init`] once to dispatch records to stdout and to the session
//! log file.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External imports
use log::{self, info};
use colored::{ColoredString, Colorize};
use thiserror::Error;

// Internal imports
use crate::session;

// Re-exports
pub use log::LevelFilter;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Logger configuration.
#[derive(Debug, Clone)]
pub struct LoggerConfig {
    /// Minimum level for all records. Must be at least as verbose as `Info`.
    pub min_level: LevelFilter,

    /// Level override for high rate targets (periodic evaluation loops), so
    /// that per-tick records can be silenced without losing the rest.
    pub tick_level: LevelFilter,

    /// Targets considered high rate, matched as module path prefixes.
    pub tick_targets: Vec<String>,
}

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// Errors associated with initialising the logger.
#[derive(Debug, Error)]
pub enum LoggerInitError {
    #[error("Expected a log level at least as verbose as `INFO`, found `{0}`")]
    InvalidMinLogLevel(log::LevelFilter),

    #[error("Error initialising the log file: {0}")]
    LogFileInitError(std::io::Error),

    #[error("An error occured while setting up the logger: {0}")]
    FernInitError(log::SetLoggerError)
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl LoggerConfig {
    /// Config with the given minimum level and no tick override.
    pub fn new(min_level: LevelFilter) -> Self {
        Self {
            min_level,
            tick_level: min_level,
            tick_targets: Vec::new(),
        }
    }

    /// Quieten the given high rate target down to `level`.
    pub fn with_tick_target(mut self, target: &str, level: LevelFilter) -> Self {
        self.tick_targets.push(String::from(target));
        self.tick_level = level;
        self
    }

    /// Check the configuration is usable.
    pub fn validate(&self) -> Result<(), LoggerInitError> {
        if self.min_level < log::Level::Info {
            return Err(LoggerInitError::InvalidMinLogLevel(self.min_level))
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// PUBLIC FUNCTIONS
// ---------------------------------------------------------------------------

/// Initialise the logger for this execution.
/// 
/// # Safety
/// 
/// - This function must only be called once to prevent corrupting logs.
pub fn logger_init(
    config: &LoggerConfig,
    session: &session::Session
) -> Result<(), LoggerInitError> {

    config.validate()?;

    let mut dispatch = fern::Dispatch::new()
        .format(|out, message, record| {
            // Debug and trace records carry their target
            if record.level() > log::Level::Info {
                out.finish(format_args!(
                    "[{:10.6} {}] {}: {}",
                    session::get_elapsed_seconds(),
                    level_to_str(record.level()),
                    record.target(),
                    message
                ))
            }
            else {
                out.finish(format_args!(
                    "[{:10.6} {}] {}",
                    session::get_elapsed_seconds(),
                    level_to_str(record.level()),
                    message
                ))
            }
        })
        .level(config.min_level);

    for target in config.tick_targets.iter() {
        dispatch = dispatch.level_for(target.clone(), config.tick_level);
    }

    let log_file = fern::log_file(session.log_file_path.clone())
        .map_err(LoggerInitError::LogFileInitError)?;

    dispatch
        .chain(std::io::stdout())
        .chain(log_file)
        .apply()
        .map_err(LoggerInitError::FernInitError)?;
    
    info!("Logging initialised");
    if let Some(epoch) = session::get_epoch() {
        info!("    Session epoch: {}", epoch);
    }
    info!("    Log level: {:?}", config.min_level);
    for target in config.tick_targets.iter() {
        info!("    Log level for {}: {:?}", target, config.tick_level);
    }
    info!("    Log file path: {:?}", session.log_file_path);

    Ok(())
}

// ---------------------------------------------------------------------------
// PRIVATE FUNCTIONS
// ---------------------------------------------------------------------------

/// Get the string representation of a log level
fn level_to_str(level: log::Level) -> ColoredString {
    match level {
        log::Level::Trace => "TRC".dimmed().italic(),
        log::Level::Debug => "DBG".dimmed(),
        log::Level::Info  => "INF".normal(),
        log::Level::Warn  => "WRN".yellow(),
        log::Level::Error => "ERR".red().bold()
    }
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_config_validate() {
        assert!(LoggerConfig::new(LevelFilter::Trace).validate().is_ok());
        assert!(LoggerConfig::new(LevelFilter::Info).validate().is_ok());
        assert!(LoggerConfig::new(LevelFilter::Warn).validate().is_err());

        let cfg = LoggerConfig::new(LevelFilter::Debug)
            .with_tick_target("traj_lib::traj_mgr", LevelFilter::Info);
        assert_eq!(cfg.tick_targets, vec![String::from("traj_lib::traj_mgr")]);
        assert_eq!(cfg.tick_level, LevelFilter::Info);
    }
}
