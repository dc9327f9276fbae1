//! Formatted view models for the current and hourly forecast widgets.
//!
//! These carry display-ready strings (unit-converted temperatures, local hour
//! labels, percentage values) so widget templates stay data-driven.

use crate::helpers::{calendar_parts, convert_speed, format_temperature, Units};
use crate::services::openweather::{ConditionTag, ForecastBundle};

/// Current-conditions widget data.
#[derive(Debug, Clone, PartialEq)]
pub struct CurrentView {
    pub temperature: String,
    pub feels_like: String,
    /// Wind speed in the display unit (m/s or mph), one decimal.
    pub wind_speed: f64,
    pub humidity_pct: u32,
    pub uv_index: u32,
    pub condition: String,
    pub icon: String,
}

/// One hourly widget entry.
#[derive(Debug, Clone, PartialEq)]
pub struct HourlyView {
    /// Local hour label, e.g. "15:00".
    pub hour_label: String,
    pub temperature: String,
    pub precipitation_pct: u32,
    pub icon: String,
}

fn condition_fields(tags: &[ConditionTag]) -> (String, String) {
    tags.first()
        .map(|t| (t.description.clone(), t.icon.clone()))
        .unwrap_or_default()
}

pub fn current_view(bundle: &ForecastBundle, units: Units) -> CurrentView {
    let current = &bundle.current;
    let (condition, icon) = condition_fields(&current.weather);
    CurrentView {
        temperature: format_temperature(units, current.temp),
        feels_like: format_temperature(units, current.feels_like),
        wind_speed: (convert_speed(units, current.wind_speed) * 10.0).round() / 10.0,
        humidity_pct: current.humidity.round() as u32,
        uv_index: current.uvi.round() as u32,
        condition,
        icon,
    }
}

pub fn hourly_views(bundle: &ForecastBundle, units: Units) -> Vec<HourlyView> {
    bundle
        .hourly
        .iter()
        .map(|hour| {
            let hour_label = calendar_parts(hour.dt, bundle.timezone_offset)
                .map(|parts| format!("{:02}:{:02}", parts.hour, parts.minute))
                .unwrap_or_default();
            let (_, icon) = condition_fields(&hour.weather);
            HourlyView {
                hour_label,
                temperature: format_temperature(units, hour.temp),
                precipitation_pct: (hour.pop * 100.0).round() as u32,
                icon,
            }
        })
        .collect()
}
