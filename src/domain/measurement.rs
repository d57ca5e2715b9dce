//! Measurement records
//!
//! A record always carries every column of [`RECORD_HEADER`]. Only values may be
//! absent, never keys, so downstream consumers can index any column blindly.

use std::collections::BTreeMap;

use chrono::{DateTime, FixedOffset, Offset, SecondsFormat, Utc};
use serde::ser::{Serialize, SerializeMap, Serializer};

use super::pollutant::PollutantKey;

/// Records are stamped in Indochina Time (UTC+7).
pub const ICT_OFFSET_SECONDS: i32 = 7 * 3600;

#[must_use]
pub fn ict_offset() -> FixedOffset {
    FixedOffset::east_opt(ICT_OFFSET_SECONDS).unwrap_or_else(|| Utc.fix())
}

/// Current time in Indochina Time.
#[must_use]
pub fn ict_now() -> DateTime<FixedOffset> {
    Utc::now().with_timezone(&ict_offset())
}

/// Fixed CSV column order.
pub const RECORD_HEADER: [&str; 14] = [
    "timestamp",
    "city",
    "aqi",
    "weather_condition",
    "wind_speed",
    "humidity",
    "temperature",
    "uv_index",
    "pm25",
    "pm10",
    "o3",
    "no2",
    "so2",
    "co",
];

/// A validated field value, or the reason there is none.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Reading {
    Value(String),
    /// Extraction or validation failed.
    #[default]
    Missing,
    /// The page never showed this pollutant.
    NotAvailable,
}

impl Reading {
    #[must_use]
    pub fn as_value(&self) -> Option<&str> {
        match self {
            Self::Value(v) => Some(v),
            Self::Missing | Self::NotAvailable => None,
        }
    }

    /// CSV rendering: both absence kinds become an empty field.
    #[must_use]
    pub fn to_csv_field(&self) -> &str {
        self.as_value().unwrap_or_default()
    }
}

impl Serialize for Reading {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.as_value().serialize(serializer)
    }
}

/// Pollutant readings keyed by normalized name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PollutantReadings {
    values: BTreeMap<PollutantKey, Reading>,
}

impl PollutantReadings {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Later entries for the same key replace earlier ones.
    pub fn insert(&mut self, key: PollutantKey, reading: Reading) {
        self.values.insert(key, reading);
    }

    /// Fill every canonical pollutant that was never seen with [`Reading::NotAvailable`].
    #[must_use]
    pub fn completed(mut self) -> Self {
        for key in PollutantKey::CANONICAL {
            self.values.entry(key).or_insert(Reading::NotAvailable);
        }
        self
    }

    #[must_use]
    pub fn get(&self, key: &PollutantKey) -> &Reading {
        const ABSENT: &Reading = &Reading::NotAvailable;
        self.values.get(key).unwrap_or(ABSENT)
    }

    /// Pollutants outside the canonical six, e.g. `radon`. A label that names a
    /// fixed column (a block titled "AQI") is not an extra and is left out.
    pub fn extras(&self) -> impl Iterator<Item = (&PollutantKey, &Reading)> {
        self.values.iter().filter(|(key, _)| {
            !key.is_canonical() && !RECORD_HEADER.iter().any(|column| *column == key.as_str())
        })
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// One crawl result for one city.
#[derive(Debug, Clone, PartialEq)]
pub struct MeasurementRecord {
    pub timestamp: DateTime<FixedOffset>,
    pub city: String,
    pub aqi: Reading,
    pub weather_condition: Reading,
    pub wind_speed: Reading,
    pub humidity: Reading,
    pub temperature: Reading,
    pub uv_index: Reading,
    pub pollutants: PollutantReadings,
}

impl MeasurementRecord {
    /// ISO-8601 with microseconds and the fixed offset, e.g. `2025-03-01T08:30:00.000000+07:00`.
    #[must_use]
    pub fn timestamp_iso(&self) -> String {
        self.timestamp.to_rfc3339_opts(SecondsFormat::Micros, false)
    }

    /// Values in [`RECORD_HEADER`] order. `None` marks an absent value.
    #[must_use]
    pub fn values(&self) -> [Option<String>; 14] {
        let reading = |r: &Reading| r.as_value().map(str::to_string);
        let pollutant = |k: PollutantKey| reading(self.pollutants.get(&k));
        [
            Some(self.timestamp_iso()),
            Some(self.city.clone()),
            reading(&self.aqi),
            reading(&self.weather_condition),
            reading(&self.wind_speed),
            reading(&self.humidity),
            reading(&self.temperature),
            reading(&self.uv_index),
            pollutant(PollutantKey::Pm25),
            pollutant(PollutantKey::Pm10),
            pollutant(PollutantKey::O3),
            pollutant(PollutantKey::No2),
            pollutant(PollutantKey::So2),
            pollutant(PollutantKey::Co),
        ]
    }

    /// One CSV row; absent values render as empty fields.
    #[must_use]
    pub fn csv_row(&self) -> Vec<String> {
        self.values()
            .into_iter()
            .map(Option::unwrap_or_default)
            .collect()
    }
}

impl Serialize for MeasurementRecord {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let extras: Vec<_> = self.pollutants.extras().collect();
        let mut map = serializer.serialize_map(Some(RECORD_HEADER.len() + extras.len()))?;
        for (name, value) in RECORD_HEADER.iter().zip(self.values()) {
            map.serialize_entry(name, &value)?;
        }
        for (key, reading) in extras {
            map.serialize_entry(key.as_str(), reading)?;
        }
        map.end()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use proptest::prelude::*;

    fn ict() -> FixedOffset {
        FixedOffset::east_opt(7 * 3600).unwrap()
    }

    fn sample_record(pollutants: PollutantReadings) -> MeasurementRecord {
        MeasurementRecord {
            timestamp: ict().with_ymd_and_hms(2025, 3, 1, 8, 30, 0).unwrap(),
            city: "Hà Nội".to_string(),
            aqi: Reading::Value("152".into()),
            weather_condition: Reading::Value("Haze".into()),
            wind_speed: Reading::Missing,
            humidity: Reading::Value("78%".into()),
            temperature: Reading::Value("24.0°C".into()),
            uv_index: Reading::Missing,
            pollutants,
        }
    }

    #[test]
    fn test_completed_fills_canonical_keys() {
        let mut readings = PollutantReadings::new();
        readings.insert(PollutantKey::Pm25, Reading::Value("55 µg/m³".into()));
        let readings = readings.completed();

        assert_eq!(readings.len(), 6);
        assert_eq!(readings.get(&PollutantKey::Pm25).as_value(), Some("55 µg/m³"));
        assert_eq!(readings.get(&PollutantKey::Co), &Reading::NotAvailable);
    }

    #[test]
    fn test_completed_keeps_missing_distinct_from_not_available() {
        let mut readings = PollutantReadings::new();
        readings.insert(PollutantKey::No2, Reading::Missing);
        let readings = readings.completed();
        assert_eq!(readings.get(&PollutantKey::No2), &Reading::Missing);
        assert_eq!(readings.get(&PollutantKey::So2), &Reading::NotAvailable);
        assert_eq!(readings.get(&PollutantKey::No2).to_csv_field(), "");
        assert_eq!(readings.get(&PollutantKey::So2).to_csv_field(), "");
    }

    #[test]
    fn test_csv_row_follows_header_order() {
        let mut readings = PollutantReadings::new();
        readings.insert(PollutantKey::O3, Reading::Value("12".into()));
        let row = sample_record(readings.completed()).csv_row();

        assert_eq!(row.len(), RECORD_HEADER.len());
        assert_eq!(row[0], "2025-03-01T08:30:00.000000+07:00");
        assert_eq!(row[1], "Hà Nội");
        assert_eq!(row[2], "152");
        assert_eq!(row[4], "");
        assert_eq!(row[10], "12");
        assert_eq!(row[13], "");
    }

    #[test]
    fn test_json_has_every_header_key_and_extras() {
        let mut readings = PollutantReadings::new();
        readings.insert(PollutantKey::Other("radon".into()), Reading::Value("3".into()));
        let json = serde_json::to_value(sample_record(readings.completed())).unwrap();
        let object = json.as_object().unwrap();

        for key in RECORD_HEADER {
            assert!(object.contains_key(key), "missing {key}");
        }
        assert_eq!(object["uv_index"], serde_json::Value::Null);
        assert_eq!(object["radon"], "3");
        assert_eq!(object.len(), RECORD_HEADER.len() + 1);
    }

    #[test]
    fn test_pollutant_named_like_a_column_does_not_shadow_it() {
        let mut readings = PollutantReadings::new();
        readings.insert(PollutantKey::Other("aqi".into()), Reading::Value("7".into()));
        readings.insert(PollutantKey::Other("radon".into()), Reading::Value("3".into()));
        let record = sample_record(readings.completed());

        let text = serde_json::to_string(&record).unwrap();
        assert_eq!(text.matches("\"aqi\"").count(), 1);

        let json: serde_json::Value = serde_json::from_str(&text).unwrap();
        assert_eq!(json["aqi"], "152");
        assert_eq!(json["radon"], "3");
        assert_eq!(json.as_object().unwrap().len(), RECORD_HEADER.len() + 1);
    }

    proptest! {
        #[test]
        fn prop_record_always_has_all_columns(present in proptest::collection::vec(any::<bool>(), 6)) {
            let mut readings = PollutantReadings::new();
            for (key, keep) in PollutantKey::CANONICAL.into_iter().zip(present) {
                if keep {
                    readings.insert(key, Reading::Value("1".into()));
                }
            }
            let record = sample_record(readings.completed());
            prop_assert_eq!(record.csv_row().len(), RECORD_HEADER.len());
            let json = serde_json::to_value(&record).unwrap();
            for key in RECORD_HEADER {
                prop_assert!(json.get(key).is_some());
            }
        }
    }
}
