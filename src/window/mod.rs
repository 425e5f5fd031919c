//! Half-open validity windows on the MJD axis.

mod error;

pub use error::WindowError;

use std::fmt::Display;

use crate::units::Mjd;

/// Half-open range `[start, end)` during which a queue may be dispatched.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ValidityWindow {
    start: Mjd,
    end: Mjd,
}

impl ValidityWindow {
    /// Creates window `[start, end)`.
    ///
    /// Fails when `start >= end` or either bound is NaN or infinite.
    pub fn new(start: Mjd, end: Mjd) -> Result<Self, WindowError> {
        if start.value().is_nan() || end.value().is_nan() {
            return Err(WindowError::NaNBound);
        }
        if start.value().is_infinite() || end.value().is_infinite() {
            return Err(WindowError::InfiniteBound {
                start: start.value(),
                end: end.value(),
            });
        }
        if start.value() >= end.value() {
            return Err(WindowError::Malformed {
                start: start.value(),
                end: end.value(),
            });
        }
        Ok(Self { start, end })
    }

    pub fn from_mjd(start: f64, end: f64) -> Result<Self, WindowError> {
        Self::new(Mjd::new(start), Mjd::new(end))
    }

    pub const fn start(&self) -> Mjd {
        self.start
    }

    pub const fn end(&self) -> Mjd {
        self.end
    }

    /// Returns true if `t` ∈ `[start, end)`.
    pub fn contains(&self, t: Mjd) -> bool {
        self.start.value() <= t.value() && t.value() < self.end.value()
    }

    /// True once the window has fully elapsed at `t`.
    pub fn has_elapsed(&self, t: Mjd) -> bool {
        t.value() >= self.end.value()
    }
}

impl Display for ValidityWindow {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{:.5}, {:.5})", self.start.value(), self.end.value())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn w(start: f64, end: f64) -> ValidityWindow {
        ValidityWindow::from_mjd(start, end).unwrap()
    }

    #[test]
    fn test_rejects_inverted_and_empty_windows() {
        assert!(matches!(
            ValidityWindow::from_mjd(59001.0, 59000.0),
            Err(WindowError::Malformed { .. })
        ));
        assert!(matches!(
            ValidityWindow::from_mjd(59000.0, 59000.0),
            Err(WindowError::Malformed { .. })
        ));
        assert_eq!(
            ValidityWindow::from_mjd(f64::NAN, 59000.0),
            Err(WindowError::NaNBound)
        );
    }

    #[test]
    fn test_contains_is_half_open() {
        let win = w(59000.25, 59000.5);
        assert!(win.contains(Mjd::new(59000.25)));
        assert!(win.contains(Mjd::new(59000.4)));
        assert!(!win.contains(Mjd::new(59000.5)));
        assert!(!win.contains(Mjd::new(59000.2)));
    }

    #[test]
    fn test_elapsed_at_end() {
        let win = w(59000.25, 59000.5);
        assert!(!win.has_elapsed(Mjd::new(59000.0)));
        assert!(!win.has_elapsed(Mjd::new(59000.3)));
        assert!(win.has_elapsed(Mjd::new(59000.5)));
    }

    #[test]
    fn test_rejects_infinite_bounds() {
        assert_eq!(
            ValidityWindow::from_mjd(59000.25, f64::INFINITY),
            Err(WindowError::InfiniteBound {
                start: 59000.25,
                end: f64::INFINITY
            })
        );
        assert!(ValidityWindow::from_mjd(f64::NEG_INFINITY, 59000.5).is_err());
    }
}
