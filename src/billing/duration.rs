use bigdecimal::{BigDecimal, One, Zero};
use chrono::{NaiveTime, Timelike};

use super::rounding::round;
use crate::error::BillingError;

const TIME_FORMAT: &str = "%H:%M";

fn minute_of_day(time: NaiveTime) -> i64 {
    i64::from(time.hour() * 60 + time.minute())
}

/// Whole minutes between two wall-clock times on the same day.
///
/// Seconds are ignored and the order of the arguments does not matter.
pub fn duration_minutes(start: NaiveTime, end: NaiveTime) -> i64 {
    (minute_of_day(end) - minute_of_day(start)).abs()
}

/// Hours between two wall-clock times, rounded to three decimal places.
pub fn duration_hours(start: NaiveTime, end: NaiveTime) -> BigDecimal {
    let minutes = BigDecimal::from(duration_minutes(start, end));
    round(&(minutes / BigDecimal::from(60_i64)), 3)
}

fn plural(count: &BigDecimal, unit: &str) -> String {
    if *count == BigDecimal::one() {
        format!("{count} {unit}")
    } else {
        format!("{count} {unit}s")
    }
}

/// Renders fractional hours as e.g. `1 hour, 30 mins`.
///
/// Minutes are `round(fraction * 60)`; when that rounds up to 60 they carry
/// into the hour, so `0.999` renders as `1 hour` rather than `60 mins`. Zero
/// segments are left out and a zero duration renders as an empty string.
pub fn pretty_duration(hours: &BigDecimal) -> String {
    let sixty = BigDecimal::from(60_i64);
    let total_minutes = round(&(hours.abs() * &sixty), 0);
    let whole_hours = (&total_minutes / &sixty).with_scale(0);
    let minutes = (&total_minutes - &whole_hours * &sixty).with_scale(0);

    let mut segments = Vec::with_capacity(2);
    if !whole_hours.is_zero() {
        segments.push(plural(&whole_hours, "hour"));
    }
    if !minutes.is_zero() {
        segments.push(plural(&minutes, "min"));
    }

    segments.join(", ")
}

/// Parses a `HH:mm` time as typed into an activity row.
pub fn parse_time(input: &str) -> Result<NaiveTime, BillingError> {
    NaiveTime::parse_from_str(input.trim(), TIME_FORMAT)
        .map_err(|_| BillingError::InvalidTime(input.to_string()))
}

pub fn format_time(time: NaiveTime) -> String {
    time.format(TIME_FORMAT).to_string()
}
