//! Daily temperature-range graph math.
//!
//! Pure functions (no I/O): bundle-wide min/max reduction, calibration-point
//! gradient stops, and the ribbon polygon geometry connecting each day's
//! min/max to its neighbour's. The SVG renderer in `render::svg` consumes
//! these values.

use crate::helpers::{convert_temperature, Units};
use crate::services::openweather::DailyForecast;

/// Calibration temperatures anchoring the gradient colors, in °C.
pub const CALIBRATION_C: [f64; 10] = [
    -40.0, -30.0, -20.0, -10.0, 0.0, 10.0, 20.0, 25.0, 30.0, 50.0,
];

/// Calibration temperatures anchoring the gradient colors, in °F.
pub const CALIBRATION_F: [f64; 10] = [
    -40.0, -22.0, -4.0, 14.0, 32.0, 50.0, 68.0, 77.0, 86.0, 122.0,
];

/// Fixed ten-color gradient, violet (coldest) through red (hottest).
pub const GRADIENT_PALETTE: [(u8, u8, u8); 10] = [
    (130, 22, 146),
    (130, 87, 219),
    (32, 140, 236),
    (32, 196, 232),
    (35, 221, 221),
    (194, 255, 40),
    (255, 240, 40),
    (255, 194, 40),
    (252, 128, 20),
    (255, 0, 0),
];

/// Calibration palette for the given display unit.
pub fn calibration_points(units: Units) -> &'static [f64; 10] {
    match units {
        Units::Metric => &CALIBRATION_C,
        Units::Imperial => &CALIBRATION_F,
    }
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum GraphError {
    #[error("daily forecast sequence is empty")]
    EmptyDaily,

    /// Every day shares one temperature value, so the graph scale would
    /// divide by zero.
    #[error("daily temperatures span no range")]
    FlatTemperatureRange,
}

/// Temperature scale of a bundle: the rounded display-unit min/max over all
/// daily records. Construction fails unless the range is strictly positive.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TemperatureScale {
    pub min: f64,
    pub max: f64,
}

impl TemperatureScale {
    pub fn from_daily(daily: &[DailyForecast], units: Units) -> Result<Self, GraphError> {
        if daily.is_empty() {
            return Err(GraphError::EmptyDaily);
        }

        let mut min = f64::INFINITY;
        let mut max = f64::NEG_INFINITY;
        for day in daily {
            min = min.min(convert_temperature(units, day.temp.min).round());
            max = max.max(convert_temperature(units, day.temp.max).round());
        }

        if max - min <= 0.0 {
            return Err(GraphError::FlatTemperatureRange);
        }

        Ok(Self { min, max })
    }

    pub fn range(&self) -> f64 {
        self.max - self.min
    }

    /// Gradient color-stop offsets, one percentage per calibration point.
    ///
    /// Calibration points below the bundle min map to 0%, points above the
    /// bundle max map to 100%, and interior points land at their proportional
    /// distance through `[min, max]`. The output is non-decreasing.
    pub fn gradient_stops(&self, units: Units) -> [f64; 10] {
        calibration_points(units)
            .map(|point| (100.0 * (point - self.min) / self.range()).clamp(0.0, 100.0))
    }

    /// Vertical position of a temperature as a percentage from the top.
    ///
    /// The ribbon occupies the band between 15% (bundle max) and 95%
    /// (bundle min) of the graph height.
    pub fn height_pct(&self, celsius: f64, units: Units) -> f64 {
        let t = convert_temperature(units, celsius).round();
        95.0 - 80.0 * (t - self.min) / self.range()
    }
}

/// One day-to-day ribbon segment: a four-point polygon in percentage
/// coordinates, `(x%, y%)`, connecting the previous day's min/max edge to
/// this day's.
#[derive(Debug, Clone, PartialEq)]
pub struct RibbonSegment {
    pub points: [(f64, f64); 4],
}

/// Ribbon segments for the daily sequence, one entry per day.
///
/// The first record has no prior day to connect to and yields an empty
/// placeholder (`None`).
pub fn ribbon_segments(
    daily: &[DailyForecast],
    scale: &TemperatureScale,
    units: Units,
) -> Vec<Option<RibbonSegment>> {
    daily
        .iter()
        .enumerate()
        .map(|(index, day)| {
            if index == 0 {
                return None;
            }
            let prev = &daily[index - 1];
            Some(RibbonSegment {
                points: [
                    (100.0, scale.height_pct(day.temp.min, units)),
                    (0.0, scale.height_pct(prev.temp.min, units)),
                    (0.0, scale.height_pct(prev.temp.max, units)),
                    (100.0, scale.height_pct(day.temp.max, units)),
                ],
            })
        })
        .collect()
}
