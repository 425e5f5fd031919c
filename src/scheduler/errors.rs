use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SchedulerError {
    /// Named queue is not in the registry
    #[error("Requested queue '{0}' is not registered")]
    UnknownQueue(String),

    /// A queue with this name is already registered
    #[error("Queue '{0}' already exists")]
    QueueExists(String),

    /// The initial queue set has no `default` queue
    #[error("Registry requires a '{}' queue", crate::queue::DEFAULT_QUEUE)]
    MissingDefault,

    /// The initial queue set was empty
    #[error("Registry cannot be built from an empty queue set")]
    EmptyRegistry,

    /// Exposure or readout time out of range
    #[error("Invalid capacity model: {0}")]
    InvalidCapacityModel(String),
}
