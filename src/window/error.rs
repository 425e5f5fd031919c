use thiserror::Error;

/// Errors raised while building a validity window.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum WindowError {
    /// Start is not strictly before end
    #[error("Malformed validity window: start {start} must be before end {end}")]
    Malformed { start: f64, end: f64 },

    /// A bound was NaN
    #[error("Validity window bound is NaN")]
    NaNBound,

    /// A bound was infinite; windows must be closed on both sides
    #[error("Validity window [{start}, {end}) must have finite bounds")]
    InfiniteBound { start: f64, end: f64 },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_malformed_display() {
        let e = WindowError::Malformed {
            start: 59001.0,
            end: 59000.5,
        };
        assert_eq!(
            e.to_string(),
            "Malformed validity window: start 59001 must be before end 59000.5"
        );
    }

    #[test]
    fn test_infinite_display() {
        let e = WindowError::InfiniteBound {
            start: 59000.25,
            end: f64::INFINITY,
        };
        assert_eq!(
            e.to_string(),
            "Validity window [59000.25, inf) must have finite bounds"
        );
    }

    #[test]
    fn test_nan_display() {
        assert_eq!(WindowError::NaNBound.to_string(), "Validity window bound is NaN");
    }
}
