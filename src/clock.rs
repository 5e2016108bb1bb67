//! Clock parsing and travel-time arithmetic.
//!
//! All times are times of day on the single simulated delivery day.

use chrono::{Duration, NaiveTime};

use crate::config::constant::{DAY_END, DAY_START, SPEED};
use crate::error::{Result, RoutingError};

/// Time of day from a literal hour and minute.
///
/// Out-of-range values panic, so constants built with `hm` fail to compile.
pub const fn hm(hour: u32, minute: u32) -> NaiveTime {
    match NaiveTime::from_hms_opt(hour, minute, 0) {
        Some(time) => time,
        None => panic!("hour or minute out of range"),
    }
}

/// Parse a status check time given as `HHMM` or `HH:MM`.
///
/// Accepted times lie between 08:00 and 17:00 inclusive; seconds are zero.
pub fn parse_check_time(raw: &str) -> Result<NaiveTime> {
    let trimmed = raw.trim();
    let parsed = NaiveTime::parse_from_str(trimmed, "%H%M")
        .or_else(|_| NaiveTime::parse_from_str(trimmed, "%H:%M"))
        .map_err(|_| RoutingError::InvalidCheckTime {
            raw: raw.to_string(),
            reason: "expected HHMM",
        })?;

    if parsed < DAY_START || parsed > DAY_END {
        return Err(RoutingError::InvalidCheckTime {
            raw: raw.to_string(),
            reason: "outside 0800-1700",
        });
    }
    Ok(parsed)
}

/// Parse a truck departure clock, `HH:MM:SS`.
pub fn parse_departure(raw: &str) -> Result<NaiveTime> {
    NaiveTime::parse_from_str(raw.trim(), "%H:%M:%S").map_err(|_| {
        RoutingError::InvalidDeparture {
            raw: raw.to_string(),
        }
    })
}

/// Time needed to drive `distance` at the fleet speed, to the microsecond.
pub fn travel_time(distance: f64) -> Duration {
    let micros = (distance / SPEED * 3_600_000_000.0).round() as i64;
    Duration::microseconds(micros)
}

/// Arrival clock after driving `distance` from `clock`.
///
/// `None` when the arrival would roll past midnight.
pub fn arrival_after(clock: NaiveTime, distance: f64) -> Option<NaiveTime> {
    let (arrival, wrapped) = clock.overflowing_add_signed(travel_time(distance));
    (wrapped == 0).then_some(arrival)
}

pub fn format_clock(time: NaiveTime) -> String {
    time.format("%H:%M:%S").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("0800", hm(8, 0))]
    #[case("1700", hm(17, 0))]
    #[case("12:45", hm(12, 45))]
    #[case(" 0930 ", hm(9, 30))]
    fn accepts_times_inside_the_day(#[case] raw: &str, #[case] expected: NaiveTime) {
        assert_eq!(parse_check_time(raw).expect("valid check time"), expected);
    }

    #[rstest]
    #[case("0759")]
    #[case("1701")]
    #[case("1260")]
    #[case("abc")]
    #[case("")]
    fn rejects_malformed_or_out_of_window(#[case] raw: &str) {
        assert!(matches!(
            parse_check_time(raw),
            Err(RoutingError::InvalidCheckTime { .. })
        ));
    }

    #[rstest]
    fn departure_keeps_seconds() {
        let t = parse_departure("08:00:01").expect("valid departure");
        assert_eq!(t, NaiveTime::from_hms_opt(8, 0, 1).unwrap());
        assert!(parse_departure("8am").is_err());
    }

    #[rstest]
    fn eighteen_units_take_an_hour() {
        assert_eq!(travel_time(18.0), Duration::hours(1));
        assert_eq!(travel_time(4.5), Duration::minutes(15));
        assert_eq!(arrival_after(hm(8, 0), 9.0), Some(hm(8, 30)));
    }

    #[rstest]
    fn configured_times_of_day() {
        use crate::config::constant::{ADDRESS_CORRECTION, DELAYED_ARRIVAL};
        assert_eq!(DAY_START, NaiveTime::from_hms_opt(8, 0, 0).unwrap());
        assert_eq!(DAY_END, NaiveTime::from_hms_opt(17, 0, 0).unwrap());
        assert_eq!(ADDRESS_CORRECTION, NaiveTime::from_hms_opt(10, 5, 0).unwrap());
        assert_eq!(DELAYED_ARRIVAL, NaiveTime::from_hms_opt(9, 5, 0).unwrap());
    }

    #[rstest]
    #[should_panic(expected = "out of range")]
    fn literal_out_of_range_panics() {
        let _ = hm(24, 0);
    }

    #[rstest]
    fn arrival_past_midnight_is_none() {
        let late = NaiveTime::from_hms_opt(23, 30, 0).unwrap();
        assert_eq!(arrival_after(late, 18.0), None);
    }
}
