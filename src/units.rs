//! Time units shared across the scheduler.
//!
//! Timestamps live on the MJD axis (`Quantity<Day>`), while request durations
//! are naturally expressed in seconds. The traits here let the two meet
//! without hand-written scale factors.

use qtty::{Day, Quantity, Second, Unit};

/// A Modified Julian Date.
pub type Mjd = Quantity<Day>;

/// A duration in seconds.
pub type Seconds = Quantity<Second>;

/// Marker trait for units that share the same physical dimension.
///
/// Automatically implemented for any pair of units where `From::Dim == To::Dim`.
pub trait SameDim<To: Unit>: Unit<Dim = To::Dim> {}

impl<From, To> SameDim<To> for From
where
    From: Unit,
    To: Unit<Dim = From::Dim>,
{
}

/// Converts a quantity to another unit of the same dimension.
///
/// ```ignore
/// use qtty::{Quantity, Second, Day};
/// use skyqueue::units::convert;
///
/// let exposure = Quantity::<Second>::new(86400.0);
/// let on_axis: Quantity<Day> = convert(exposure);
/// assert!((on_axis.value() - 1.0).abs() < 1e-12);
/// ```
#[inline]
pub const fn convert<From, To>(q: Quantity<From>) -> Quantity<To>
where
    From: SameDim<To>,
    To: Unit,
{
    q.to_const::<To>()
}

/// Start of the MJD day containing `t`.
pub fn night_start(t: Mjd) -> Mjd {
    Mjd::new(t.value().floor())
}

/// Advances an MJD timestamp by a duration in seconds.
pub fn advance(t: Mjd, by: Seconds) -> Mjd {
    t + convert::<Second, Day>(by)
}

#[cfg(test)]
mod tests {
    use super::*;
    use qtty::Minute;

    #[test]
    fn test_seconds_to_days() {
        let days: Mjd = convert(Seconds::new(43200.0));
        assert!((days.value() - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_minutes_to_seconds() {
        let s: Seconds = convert(Quantity::<Minute>::new(20.0));
        assert!((s.value() - 1200.0).abs() < 1e-9);
    }

    #[test]
    fn test_night_start_floors_to_day() {
        assert_eq!(night_start(Mjd::new(59000.75)).value(), 59000.0);
        assert_eq!(night_start(Mjd::new(59001.0)).value(), 59001.0);
    }

    #[test]
    fn test_advance_moves_forward_by_seconds() {
        let t = advance(Mjd::new(59000.0), Seconds::new(8640.0));
        assert!((t.value() - 59000.1).abs() < 1e-9);
    }
}
