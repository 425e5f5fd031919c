use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum QueueError {
    /// Queue cannot produce work for the given resource state
    #[error("Queue '{queue}' has no eligible work for the current resource state")]
    NoEligibleWork { queue: String },

    /// Kind name did not match any known queue kind
    #[error("Unknown queue kind: {0}")]
    UnknownKind(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_eligible_work_display() {
        let e = QueueError::NoEligibleWork {
            queue: "default".to_string(),
        };
        assert_eq!(
            e.to_string(),
            "Queue 'default' has no eligible work for the current resource state"
        );
    }

    #[test]
    fn test_unknown_kind_display() {
        assert_eq!(
            QueueError::UnknownKind("fifo".to_string()).to_string(),
            "Unknown queue kind: fifo"
        );
    }
}
