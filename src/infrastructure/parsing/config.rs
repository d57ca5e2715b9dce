//! Parsing configuration for dashboard extraction
//!
//! Centralized CSS selectors for every field group. Defaults match the live
//! dashboard layout; a config file may override any of them.

use serde::{Deserialize, Serialize};

/// CSS selectors used by the extractors
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DashboardSelectors {
    /// Headline AQI figure; value read from `title`, falling back to text
    pub aqi: String,

    /// Weather condition caption
    pub weather_condition: String,

    /// Primary temperature layout: big value span + separate unit span
    pub temperature_value: String,
    pub temperature_unit: String,

    /// Secondary temperature layout: single label with value and unit
    pub temperature_fallback: String,

    /// Weather component blocks (humidity, wind speed, UV index)
    pub weather_component: String,
    pub component_indicator: String,
    pub component_value: String,

    /// Pollutant table entries
    pub pollutant_block: String,
    pub pollutant_name: String,
    pub pollutant_value: String,
    pub pollutant_value_fallback: String,
    pub pollutant_unit: String,
}

impl Default for DashboardSelectors {
    fn default() -> Self {
        Self {
            aqi: "span.font-extrabold".to_string(),
            weather_condition: "span.condition-text".to_string(),
            temperature_value: r"span.text-\[2\.5rem\]".to_string(),
            temperature_unit: r"span.text-\[1\.7rem\]".to_string(),
            temperature_fallback: ".air-quality-forecast-container-weather__label".to_string(),
            weather_component: ".component".to_string(),
            component_indicator: "img".to_string(),
            component_value: "span".to_string(),
            pollutant_block: ".major-pollutant".to_string(),
            pollutant_name: ".sensor-name".to_string(),
            pollutant_value: "span.font-bold".to_string(),
            pollutant_value_fallback: "span".to_string(),
            pollutant_unit: ".sensor-unit".to_string(),
        }
    }
}

impl DashboardSelectors {
    /// Every selector with its field name, for up-front validation.
    pub fn entries(&self) -> [(&'static str, &str); 13] {
        [
            ("aqi", &self.aqi),
            ("weather_condition", &self.weather_condition),
            ("temperature_value", &self.temperature_value),
            ("temperature_unit", &self.temperature_unit),
            ("temperature_fallback", &self.temperature_fallback),
            ("weather_component", &self.weather_component),
            ("component_indicator", &self.component_indicator),
            ("component_value", &self.component_value),
            ("pollutant_block", &self.pollutant_block),
            ("pollutant_name", &self.pollutant_name),
            ("pollutant_value", &self.pollutant_value),
            ("pollutant_value_fallback", &self.pollutant_value_fallback),
            ("pollutant_unit", &self.pollutant_unit),
        ]
    }
}
