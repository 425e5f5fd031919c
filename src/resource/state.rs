//! Snapshots of the resource state used for dispatch and history.

use std::fmt::Display;

use crate::units::Mjd;

/// Equatorial pointing in degrees.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Target {
    pub ra_deg: f64,
    pub dec_deg: f64,
}

impl Target {
    pub const fn new(ra_deg: f64, dec_deg: f64) -> Self {
        Self { ra_deg, dec_deg }
    }
}

impl Display for Target {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "(ra={:.4}, dec={:.4})", self.ra_deg, self.dec_deg)
    }
}

/// Point-in-time view of the resource handed to queues when selecting work.
#[derive(Debug, Clone, PartialEq)]
pub struct ResourceState {
    pub current_time: Mjd,
    /// Where the resource currently points, if it has slewed at all.
    pub pointing: Option<Target>,
    pub filter_id: Option<u32>,
}

impl ResourceState {
    pub fn at(current_time: Mjd) -> Self {
        Self {
            current_time,
            pointing: None,
            filter_id: None,
        }
    }

    pub fn with_pointing(mut self, target: Target) -> Self {
        self.pointing = Some(target);
        self
    }

    pub fn with_filter(mut self, filter_id: u32) -> Self {
        self.filter_id = Some(filter_id);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_sets_optional_fields() {
        let s = ResourceState::at(Mjd::new(59000.2))
            .with_pointing(Target::new(10.0, -5.0))
            .with_filter(2);
        assert_eq!(s.pointing, Some(Target::new(10.0, -5.0)));
        assert_eq!(s.filter_id, Some(2));
        assert_eq!(s.current_time.value(), 59000.2);
    }

    #[test]
    fn test_target_display() {
        assert_eq!(Target::new(1.5, -2.25).to_string(), "(ra=1.5000, dec=-2.2500)");
    }
}
