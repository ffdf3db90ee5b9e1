//! Weather summary shown as the bot's answer

use serde::Serialize;
use std::fmt::Display;

use crate::condition::{ConditionLabel, map_code};
use crate::conversation::escape_html;
use crate::models::{CurrentConditions, ResolvedPlace};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WeatherReport {
    pub place: ResolvedPlace,
    pub conditions: CurrentConditions,
    pub condition: ConditionLabel,
}

impl WeatherReport {
    #[must_use]
    pub fn new(place: ResolvedPlace, conditions: CurrentConditions) -> Self {
        let condition = map_code(conditions.weather_code);
        Self {
            place,
            conditions,
            condition,
        }
    }

    /// HTML weather card for the chat bubble
    #[must_use]
    pub fn to_markup(&self) -> String {
        format!(
            r#"<div class="weather-card">
    <div class="weather-header">
        <span>{icon}</span>
        <span>{place}</span>
    </div>
    <div class="weather-temp">{temperature}</div>
    <div>{condition} • Feels like {feels_like}°C</div>
    <div class="weather-details">
        <div>💧 Humidity: {humidity}</div>
        <div>💨 Wind: {wind}</div>
    </div>
</div>"#,
            icon = self.condition.icon,
            place = escape_html(&self.place.display_name()),
            temperature = self.conditions.format_temperature(),
            condition = self.condition.text,
            feels_like = self.conditions.rounded_feels_like(),
            humidity = self.conditions.format_humidity(),
            wind = self.conditions.format_wind(),
        )
    }
}

impl Display for WeatherReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "{} {}", self.condition.icon, self.place.display_name())?;
        writeln!(f, "   🌡️ {}", self.conditions.format_temperature())?;
        writeln!(
            f,
            "   {} • Feels like {}°C",
            self.condition.text,
            self.conditions.rounded_feels_like()
        )?;
        writeln!(f, "   💧 Humidity: {}", self.conditions.format_humidity())?;
        write!(f, "   💨 Wind: {}", self.conditions.format_wind())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn paris_report(weather_code: i32) -> WeatherReport {
        WeatherReport::new(
            ResolvedPlace::with_country("Paris", "France", 48.85341, 2.3488),
            CurrentConditions {
                temperature_c: 17.6,
                feels_like_c: 16.4,
                humidity_pct: 65.0,
                wind_kph: 12.3,
                precipitation_mm: 0.0,
                weather_code,
            },
        )
    }

    #[test]
    fn test_markup_contains_summary() {
        let markup = paris_report(2).to_markup();
        assert!(markup.contains("Partly Cloudy"));
        assert!(markup.contains("Paris, France"));
        assert!(markup.contains("⛅"));
        assert!(markup.contains("18°C"));
        assert!(markup.contains("Feels like 16°C"));
        assert!(markup.contains("Humidity: 65%"));
        assert!(markup.contains("Wind: 12.3 km/h"));
    }

    #[test]
    fn test_markup_escapes_place_name() {
        let mut report = paris_report(0);
        report.place.name = "<img src=x>".to_string();
        let markup = report.to_markup();
        assert!(markup.contains("&lt;img src=x&gt;, France"));
        assert!(!markup.contains("<img"));
    }

    #[test]
    fn test_display() {
        let text = paris_report(63).to_string();
        assert!(text.starts_with("🌧️ Paris, France"));
        assert!(text.contains("Rainy • Feels like 16°C"));
    }
}
