use thiserror::Error;

use crate::history::HistoryError;
use crate::scheduler::SchedulerError;

#[derive(Debug, Error)]
pub enum RunnerError {
    /// Start is not strictly before stop, or a bound is NaN
    #[error("Run bounds are invalid: start {start} must be before stop {stop}")]
    InvalidBounds { start: f64, stop: f64 },

    /// The resource clock did not move during a wait
    #[error("Resource clock did not advance while waiting at MJD {at}")]
    ClockStalled { at: f64 },

    /// Persisting an observation failed
    #[error(transparent)]
    History(#[from] HistoryError),

    /// Registry lookup failed while retiring work
    #[error(transparent)]
    Scheduler(#[from] SchedulerError),

    /// The whole-night optimizer rejected the plan
    #[error("Nightly optimizer failed: {0}")]
    Optimizer(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_bounds_display() {
        let e = RunnerError::InvalidBounds {
            start: 59000.5,
            stop: 59000.25,
        };
        assert_eq!(
            e.to_string(),
            "Run bounds are invalid: start 59000.5 must be before stop 59000.25"
        );
    }

    #[test]
    fn test_scheduler_errors_pass_through() {
        let e: RunnerError = SchedulerError::UnknownQueue("gone".to_string()).into();
        assert_eq!(e.to_string(), "Requested queue 'gone' is not registered");
    }
}
