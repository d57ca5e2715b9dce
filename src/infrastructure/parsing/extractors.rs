//! DOM extractors for the air quality dashboard
//!
//! One routine per field group. Each locates its nodes through [`PageNode`],
//! composes the raw text and runs it through the matching validator. Fallback
//! layouts are tried when the primary layout is absent.

use tracing::{debug, warn};

use super::config::DashboardSelectors;
use super::error::{ParsingResult, ValidationResult};
use super::page_node::PageNode;
use super::validators::{
    validate_aqi, validate_humidity, validate_pollutant_value, validate_temperature,
    validate_uv_index, validate_weather_condition, validate_wind_speed,
};
use crate::domain::measurement::{PollutantReadings, Reading};
use crate::domain::pollutant::{PollutantKey, normalize_pollutant_name};

/// Humidity, wind speed and UV index, read from the weather component blocks.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WeatherComponents {
    pub humidity: Reading,
    pub wind_speed: Reading,
    pub uv_index: Reading,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ComponentSlot {
    Humidity,
    WindSpeed,
    UvIndex,
}

impl ComponentSlot {
    /// Match an indicator label, case-insensitively, in the order humidity, wind speed, UV index.
    fn from_label(label: &str) -> Option<Self> {
        let label = label.trim().to_lowercase();
        if label.contains("humidity") {
            Some(Self::Humidity)
        } else if label.contains("wind speed") {
            Some(Self::WindSpeed)
        } else if label.contains("uv index") {
            Some(Self::UvIndex)
        } else {
            None
        }
    }
}

/// Turn a validator verdict into a reading, logging the rejection.
fn into_reading(result: ValidationResult) -> Reading {
    match result {
        Ok(value) => Reading::Value(value),
        Err(e) => {
            debug!("Rejected field value: {}", e);
            Reading::Missing
        }
    }
}

fn first_child_texts<N: PageNode>(node: &N) -> ParsingResult<Vec<String>> {
    Ok(node
        .find_all("span")?
        .iter()
        .map(PageNode::trimmed_text)
        .collect())
}

/// Specialized extractor for the dashboard page
#[derive(Debug, Clone, Default)]
pub struct DashboardExtractor {
    selectors: DashboardSelectors,
}

impl DashboardExtractor {
    pub const fn new(selectors: DashboardSelectors) -> Self {
        Self { selectors }
    }

    /// Headline AQI. The `title` attribute wins over the visible text.
    ///
    /// A failed query is returned to the caller: without the AQI indicator the
    /// page is not considered loaded.
    pub fn extract_aqi<N: PageNode>(&self, root: &N) -> ParsingResult<Reading> {
        let Some(element) = root.find_one(&self.selectors.aqi)? else {
            debug!("AQI element '{}' not found", self.selectors.aqi);
            return Ok(Reading::Missing);
        };
        let raw = element
            .attr("title")
            .filter(|title| !title.trim().is_empty())
            .unwrap_or_else(|| element.trimmed_text());
        Ok(into_reading(validate_aqi(&raw)))
    }

    pub fn extract_weather_condition<N: PageNode>(&self, root: &N) -> ParsingResult<Reading> {
        let raw = root
            .find_one(&self.selectors.weather_condition)?
            .map(|element| element.text())
            .unwrap_or_default();
        Ok(into_reading(validate_weather_condition(&raw)))
    }

    /// Temperature from the value/unit pair, or from the single label layout
    /// when the pair is absent or unreadable.
    pub fn extract_temperature<N: PageNode>(&self, root: &N) -> ParsingResult<Reading> {
        let value = root.find_one(&self.selectors.temperature_value)?;
        let unit = root.find_one(&self.selectors.temperature_unit)?;

        if let (Some(value), Some(unit)) = (value, unit) {
            let raw = format!("{}{}", value.trimmed_text(), unit.trimmed_text());
            match validate_temperature(&raw) {
                Ok(celsius) => return Ok(Reading::Value(celsius)),
                Err(e) => debug!("Primary temperature layout rejected: {}", e),
            }
        }

        let raw = root
            .find_one(&self.selectors.temperature_fallback)?
            .map(|element| element.text())
            .unwrap_or_default();
        Ok(into_reading(validate_temperature(&raw)))
    }

    /// Scan the component blocks and fill the humidity, wind and UV slots.
    ///
    /// A block that fails to read is logged and skipped; the other blocks are
    /// still processed.
    pub fn extract_weather_components<N: PageNode>(
        &self,
        root: &N,
    ) -> ParsingResult<WeatherComponents> {
        let mut components = WeatherComponents::default();

        for block in root.find_all(&self.selectors.weather_component)? {
            match self.read_component(&block) {
                Ok(Some((slot, reading))) => match slot {
                    ComponentSlot::Humidity => components.humidity = reading,
                    ComponentSlot::WindSpeed => components.wind_speed = reading,
                    ComponentSlot::UvIndex => components.uv_index = reading,
                },
                Ok(None) => {}
                Err(e) => warn!("Skipping weather component: {}", e),
            }
        }

        Ok(components)
    }

    fn read_component<N: PageNode>(
        &self,
        block: &N,
    ) -> ParsingResult<Option<(ComponentSlot, Reading)>> {
        let Some(indicator) = block.find_one(&self.selectors.component_indicator)? else {
            return Ok(None);
        };
        let Some(slot) = indicator.attr("alt").as_deref().and_then(ComponentSlot::from_label)
        else {
            return Ok(None);
        };

        let values = block.find_all(&self.selectors.component_value)?;
        let Some(value) = values.get(1) else {
            return Ok(None);
        };

        let spans = first_child_texts(value)?;
        let reading = match slot {
            ComponentSlot::Humidity => {
                let raw = spans
                    .first()
                    .map_or_else(|| value.trimmed_text(), |v| format!("{v}%"));
                into_reading(validate_humidity(&raw))
            }
            ComponentSlot::WindSpeed => {
                let raw = match spans.as_slice() {
                    [] => value.trimmed_text(),
                    [speed] => format!("{speed} km/h"),
                    [speed, unit, ..] => format!("{speed} {unit}"),
                };
                into_reading(validate_wind_speed(&raw))
            }
            ComponentSlot::UvIndex => {
                let raw = spans.first().cloned().unwrap_or_else(|| value.trimmed_text());
                into_reading(validate_uv_index(&raw))
            }
        };
        Ok(Some((slot, reading)))
    }

    /// Scan every pollutant entry. The result always holds the six canonical
    /// pollutants; the ones never shown are marked not available.
    pub fn extract_pollutants<N: PageNode>(&self, root: &N) -> ParsingResult<PollutantReadings> {
        let mut readings = PollutantReadings::new();

        for (index, block) in root
            .find_all(&self.selectors.pollutant_block)?
            .iter()
            .enumerate()
        {
            match self.read_pollutant(block) {
                Ok(Some((key, reading))) => {
                    debug!("Pollutant {} = {:?}", key, reading);
                    readings.insert(key, reading);
                }
                Ok(None) => debug!("Pollutant entry {} has no name or value", index),
                Err(e) => warn!("Error extracting pollutant entry {}: {}", index, e),
            }
        }

        Ok(readings.completed())
    }

    fn read_pollutant<N: PageNode>(
        &self,
        block: &N,
    ) -> ParsingResult<Option<(PollutantKey, Reading)>> {
        let name = block
            .find_one(&self.selectors.pollutant_name)?
            .map(|n| n.trimmed_text())
            .filter(|n| !n.is_empty());

        let value_node = match block.find_one(&self.selectors.pollutant_value)? {
            Some(node) => Some(node),
            None => block.find_one(&self.selectors.pollutant_value_fallback)?,
        };
        let value = value_node
            .map(|v| v.trimmed_text())
            .filter(|v| !v.is_empty());

        let unit = block
            .find_one(&self.selectors.pollutant_unit)?
            .map(|u| u.trimmed_text());

        let (Some(name), Some(value)) = (name, value) else {
            return Ok(None);
        };
        let key = normalize_pollutant_name(&name);
        let reading = into_reading(validate_pollutant_value(&value, unit.as_deref()));
        Ok(Some((key, reading)))
    }
}
