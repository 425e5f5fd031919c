use std::path::PathBuf;

use thiserror::Error;

use crate::blocks::BlockGridError;
use crate::queue::QueueKind;
use crate::scheduler::SchedulerError;
use crate::window::WindowError;

#[derive(Debug, Error)]
pub enum ConfigError {
    /// The config file could not be read
    #[error("Failed to read config file {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The config text is not valid TOML for this schema
    #[error("Failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    /// A queue window failed validation
    #[error("Queue '{queue}' has an invalid window: {source}")]
    Window {
        queue: String,
        #[source]
        source: WindowError,
    },

    /// A non-list queue was configured without a factory for its kind
    #[error("No factory for {kind} queue '{queue}'")]
    UnsupportedKind { queue: String, kind: QueueKind },

    /// Run start is not before run stop
    #[error("Run must start before it stops, got {start} to {stop}")]
    InvalidRunBounds { start: f64, stop: f64 },

    /// A required setting was absent
    #[error("Missing setting '{0}'")]
    Missing(&'static str),

    /// The `[blocks]` section describes an invalid grid
    #[error("Invalid block grid: {0}")]
    Grid(#[from] BlockGridError),

    /// Registry construction failed
    #[error(transparent)]
    Scheduler(#[from] SchedulerError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unsupported_kind_display() {
        let e = ConfigError::UnsupportedKind {
            queue: "night_opt".to_string(),
            kind: QueueKind::Optimized,
        };
        assert_eq!(e.to_string(), "No factory for optimized queue 'night_opt'");
    }

    #[test]
    fn test_scheduler_errors_pass_through() {
        let e: ConfigError = SchedulerError::MissingDefault.into();
        assert_eq!(e.to_string(), SchedulerError::MissingDefault.to_string());
    }
}
