//! GPS week / seconds-of-week helpers
use crate::{
    constants::SECONDS_PER_WEEK,
    prelude::{Epoch, TimeScale},
};

/// Builds a GPST [Epoch] from week counter and (fractional) seconds of week.
/// Seconds are rounded to the nanosecond, so identical wire timestamps
/// always produce equal [Epoch]s. Seconds must be finite, see [gpst_checked]
/// for untrusted input.
pub fn gpst(week: u32, seconds_of_week: f64) -> Epoch {
    debug_assert!(
        seconds_of_week.is_finite(),
        "non finite seconds of week: {}",
        seconds_of_week
    );
    let nanos = (seconds_of_week * 1.0E9).round() as u64;
    Epoch::from_time_of_week(week, nanos, TimeScale::GPST)
}

/// [gpst] for untrusted input: None unless seconds of week are finite
/// and within the week.
pub fn gpst_checked(week: u32, seconds_of_week: f64) -> Option<Epoch> {
    if seconds_of_week.is_finite() && (0.0..SECONDS_PER_WEEK as f64).contains(&seconds_of_week) {
        Some(gpst(week, seconds_of_week))
    } else {
        None
    }
}

/// Builds a GPST [Epoch] from whole seconds elapsed since the GPS origin.
pub fn gpst_from_seconds(gps_seconds: u64) -> Epoch {
    let week = gps_seconds / SECONDS_PER_WEEK;
    let sow = gps_seconds - week * SECONDS_PER_WEEK;
    gpst(week as u32, sow as f64)
}

/// Splits an [Epoch] into GPS week counter and seconds of week.
pub fn week_seconds(t: Epoch) -> (u32, f64) {
    let (week, nanos) = t.to_time_scale(TimeScale::GPST).to_time_of_week();
    (week, nanos as f64 * 1.0E-9)
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn gps_seconds_split() {
        let t = gpst_from_seconds(2 * SECONDS_PER_WEEK + 3_600);
        let (week, sow) = week_seconds(t);
        assert_eq!(week, 2);
        assert_eq!(sow, 3_600.0);
        assert_eq!(t, gpst(2, 3_600.0));
    }

    #[test]
    fn fractional_seconds_are_stable() {
        assert_eq!(gpst(2100, 345_600.1), gpst(2100, 345_600.100_000_000_1));
        assert!(gpst(2100, 1.0) < gpst(2100, 2.0));
        assert!(gpst(2100, 604_799.0) < gpst(2101, 0.0));
    }

    #[test]
    fn checked_seconds_of_week() {
        assert_eq!(gpst_checked(2100, 10.5), Some(gpst(2100, 10.5)));
        assert_eq!(gpst_checked(2100, 0.0), Some(gpst(2100, 0.0)));
        for sow in [f64::NAN, f64::INFINITY, -1.0, 604_800.0, 1.0E300] {
            assert!(gpst_checked(2100, sow).is_none(), "{} accepted", sow);
        }
    }
}
