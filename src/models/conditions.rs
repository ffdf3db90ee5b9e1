//! Current weather observations and display helpers

use serde::{Deserialize, Serialize};

/// Current observations at one coordinate pair
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct CurrentConditions {
    /// Air temperature at 2 m in Celsius
    pub temperature_c: f64,
    /// Apparent ("feels like") temperature in Celsius
    pub feels_like_c: f64,
    /// Relative humidity at 2 m in percent
    pub humidity_pct: f64,
    /// Wind speed at 10 m in km/h
    pub wind_kph: f64,
    /// Precipitation in mm
    pub precipitation_mm: f64,
    /// WMO weather code
    pub weather_code: i32,
}

impl CurrentConditions {
    /// Temperature rounded to a whole degree
    #[must_use]
    pub fn rounded_temperature(&self) -> i64 {
        round_half_up(self.temperature_c)
    }

    /// Apparent temperature rounded to a whole degree
    #[must_use]
    pub fn rounded_feels_like(&self) -> i64 {
        round_half_up(self.feels_like_c)
    }

    /// Format temperature with unit
    #[must_use]
    pub fn format_temperature(&self) -> String {
        format!("{}°C", self.rounded_temperature())
    }

    /// Humidity as reported, without rounding
    #[must_use]
    pub fn format_humidity(&self) -> String {
        format!("{}%", self.humidity_pct)
    }

    /// Wind speed as reported, without rounding
    #[must_use]
    pub fn format_wind(&self) -> String {
        format!("{} km/h", self.wind_kph)
    }
}

/// Halves round towards positive infinity: 2.5 -> 3, -2.5 -> -2.
#[allow(clippy::cast_possible_truncation)]
fn round_half_up(value: f64) -> i64 {
    (value + 0.5).floor() as i64
}
