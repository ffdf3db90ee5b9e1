//! Weather code to condition label mapping
//!
//! Collapses WMO weather codes into a handful of display conditions. Codes
//! outside the listed ranges (4-44, 49-50, 68-70, 78-94, negatives) show as
//! clear sky.

use serde::Serialize;

/// Human-readable condition with its icon glyph
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ConditionLabel {
    pub text: &'static str,
    pub icon: &'static str,
}

const CLEAR: ConditionLabel = ConditionLabel {
    text: "Clear",
    icon: "☀️",
};

/// Map a WMO weather code to its label. First matching range wins.
#[must_use]
pub fn map_code(code: i32) -> ConditionLabel {
    match code {
        1..=3 => ConditionLabel {
            text: "Partly Cloudy",
            icon: "⛅",
        },
        45..=48 => ConditionLabel {
            text: "Foggy",
            icon: "🌫️",
        },
        51..=67 => ConditionLabel {
            text: "Rainy",
            icon: "🌧️",
        },
        71..=77 => ConditionLabel {
            text: "Snowy",
            icon: "❄️",
        },
        95.. => ConditionLabel {
            text: "Thunderstorm",
            icon: "⚡",
        },
        _ => CLEAR,
    }
}
