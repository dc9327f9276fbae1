//! Unit and time conversion helpers.
//!
//! Forecast bundles are always fetched in metric base units (°C, m/s).
//! The unit preference is applied at render time only, so toggling units
//! never refetches data.

use chrono::{DateTime, Datelike, FixedOffset, Timelike};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Session-wide measurement system preference.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Units {
    #[default]
    Metric,
    Imperial,
}

impl FromStr for Units {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "metric" => Ok(Units::Metric),
            "imperial" => Ok(Units::Imperial),
            _ => Err(()),
        }
    }
}

impl fmt::Display for Units {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Units::Metric => write!(f, "metric"),
            Units::Imperial => write!(f, "imperial"),
        }
    }
}

/// Convert a temperature from the Celsius base into the display unit.
pub fn convert_temperature(units: Units, celsius: f64) -> f64 {
    match units {
        Units::Metric => celsius,
        Units::Imperial => celsius * 9.0 / 5.0 + 32.0,
    }
}

/// Convert a speed from the m/s base into the display unit (m/s or mph).
pub fn convert_speed(units: Units, metres_per_second: f64) -> f64 {
    match units {
        Units::Metric => metres_per_second,
        Units::Imperial => metres_per_second * 2.23694,
    }
}

/// Format a temperature with its unit suffix, e.g. `"21 °C"` / `"70 °F"`.
pub fn format_temperature(units: Units, celsius: f64) -> String {
    let value = convert_temperature(units, celsius).round();
    match units {
        Units::Metric => format!("{} °C", value),
        Units::Imperial => format!("{} °F", value),
    }
}

/// Calendar fields extracted from a Unix timestamp in a location's local time.
///
/// `year` is two-digit, matching the compact date labels on the daily graph.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CalendarParts {
    pub day: u32,
    pub month: u32,
    pub year: u32,
    pub hour: u32,
    pub minute: u32,
    pub weekday: &'static str,
}

impl CalendarParts {
    /// Compact `MM/DD/YY` date label.
    pub fn date_label(&self) -> String {
        format!("{:02}/{:02}/{:02}", self.month, self.day, self.year)
    }
}

/// Convert a Unix timestamp plus a UTC offset (seconds) into calendar fields.
///
/// Returns `None` when the timestamp or offset is out of range.
pub fn calendar_parts(unix_seconds: i64, offset_seconds: i32) -> Option<CalendarParts> {
    let offset = FixedOffset::east_opt(offset_seconds)?;
    let utc = DateTime::from_timestamp(unix_seconds, 0)?;
    let local = utc.with_timezone(&offset);

    const WEEKDAYS: [&str; 7] = [
        "Monday",
        "Tuesday",
        "Wednesday",
        "Thursday",
        "Friday",
        "Saturday",
        "Sunday",
    ];

    Some(CalendarParts {
        day: local.day(),
        month: local.month(),
        year: (local.year().rem_euclid(100)) as u32,
        hour: local.hour(),
        minute: local.minute(),
        weekday: WEEKDAYS[local.weekday().num_days_from_monday() as usize],
    })
}
