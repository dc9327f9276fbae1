//! Server-side SVG rendering of the daily temperature-range ribbon chart.
//!
//! One shared vertical gradient (userSpaceOnUse, so every polygon samples the
//! same temperature band regardless of its own bounding box), one polygon per
//! day-to-day segment, plus min/max dots, temperature labels and date labels.

use crate::helpers::{calendar_parts, format_temperature, Units};
use crate::render::graph::{ribbon_segments, GraphError, TemperatureScale, GRADIENT_PALETTE};
use crate::services::openweather::ForecastBundle;

/// Pixel width of one day-to-day segment.
const SEGMENT_WIDTH: f64 = 150.0;
/// Pixel height of the graph band.
const GRAPH_HEIGHT: f64 = 250.0;
/// Extra room below the band for date labels.
const LABEL_STRIP: f64 = 30.0;

/// Render the daily ribbon chart for a bundle in the given display unit.
pub fn daily_graph_svg(bundle: &ForecastBundle, units: Units) -> Result<String, GraphError> {
    let daily = &bundle.daily;
    let scale = TemperatureScale::from_daily(daily, units)?;
    let stops = scale.gradient_stops(units);
    let segments = ribbon_segments(daily, &scale, units);

    let width = SEGMENT_WIDTH * daily.len() as f64;
    let height = GRAPH_HEIGHT + LABEL_STRIP;

    let mut svg = format!(
        r#"<svg xmlns="http://www.w3.org/2000/svg" width="{}" height="{}" viewBox="0 0 {} {}">"#,
        width, height, width, height
    );
    svg.push('\n');

    // Shared gradient: coldest color at the bottom of the band.
    svg.push_str(&format!(
        r#"  <linearGradient id="tempRibbon" gradientUnits="userSpaceOnUse" x1="0" y1="{}" x2="0" y2="0">"#,
        GRAPH_HEIGHT
    ));
    svg.push('\n');
    for ((r, g, b), offset) in GRADIENT_PALETTE.iter().zip(stops.iter()) {
        svg.push_str(&format!(
            r#"    <stop offset="{:.2}%" stop-color="rgb({},{},{})"/>"#,
            offset, r, g, b
        ));
        svg.push('\n');
    }
    svg.push_str("  </linearGradient>\n");

    for (index, segment) in segments.iter().enumerate() {
        let Some(segment) = segment else {
            // First day: empty placeholder, nothing to connect to.
            continue;
        };

        let x_left = SEGMENT_WIDTH * (index - 1) as f64;
        let points: Vec<String> = segment
            .points
            .iter()
            .map(|(x_pct, y_pct)| {
                let x = x_left + SEGMENT_WIDTH * x_pct / 100.0;
                let y = GRAPH_HEIGHT * y_pct / 100.0;
                format!("{:.1},{:.1}", x, y)
            })
            .collect();
        svg.push_str(&format!(
            r#"  <polygon points="{}" fill="url(#tempRibbon)"/>"#,
            points.join(" ")
        ));
        svg.push('\n');

        let day = &daily[index];
        let x_right = x_left + SEGMENT_WIDTH;
        let y_max = GRAPH_HEIGHT * scale.height_pct(day.temp.max, units) / 100.0;
        let y_min = GRAPH_HEIGHT * scale.height_pct(day.temp.min, units) / 100.0;

        svg.push_str(&format!(
            r#"  <circle cx="{:.1}" cy="{:.1}" r="4" fill="white"/>"#,
            x_right, y_max
        ));
        svg.push('\n');
        svg.push_str(&format!(
            r#"  <text x="{:.1}" y="{:.1}" text-anchor="end" font-size="14">{}</text>"#,
            x_right - 8.0,
            y_max - 8.0,
            format_temperature(units, day.temp.max)
        ));
        svg.push('\n');

        svg.push_str(&format!(
            r#"  <circle cx="{:.1}" cy="{:.1}" r="4" fill="white"/>"#,
            x_right, y_min
        ));
        svg.push('\n');
        svg.push_str(&format!(
            r#"  <text x="{:.1}" y="{:.1}" text-anchor="end" font-size="14">{}</text>"#,
            x_right - 8.0,
            y_min + 18.0,
            format_temperature(units, day.temp.min)
        ));
        svg.push('\n');

        if let Some(parts) = calendar_parts(day.dt, bundle.timezone_offset) {
            svg.push_str(&format!(
                r#"  <text x="{:.1}" y="{:.1}" text-anchor="middle" font-size="13">{}</text>"#,
                x_left + SEGMENT_WIDTH / 2.0,
                GRAPH_HEIGHT + 20.0,
                parts.date_label()
            ));
            svg.push('\n');
        }
    }

    svg.push_str("</svg>");
    Ok(svg)
}
