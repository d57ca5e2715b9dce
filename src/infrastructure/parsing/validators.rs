//! Field validators
//!
//! Pure functions from raw page text to the canonical form of one field. A
//! rejected value comes back as a [`ValidationError`] describing why; callers turn
//! that into an absent reading. Nothing here panics on malformed input.

use lazy_static::lazy_static;
use regex::Regex;

use super::error::{ValidationError, ValidationResult};

/// mph → km/h
pub const MPH_TO_KMH: f64 = 1.609_34;

pub const AQI_MAX: u32 = 500;
pub const UV_INDEX_MAX: u8 = 11;
pub const TEMPERATURE_LIMIT_C: f64 = 50.0;

lazy_static! {
    static ref WIND_SPEED: Regex =
        Regex::new(r"^(\d+(?:\.\d+)?)\s*(km/h|mph)$").expect("wind speed pattern compiles");
    static ref HUMIDITY: Regex = Regex::new(r"^\d{1,3}%$").expect("humidity pattern compiles");
    static ref UV_INDEX: Regex = Regex::new(r"^\d{1,2}$").expect("uv index pattern compiles");
}

fn non_empty<'a>(field: &'static str, raw: &'a str) -> Result<&'a str, ValidationError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        Err(ValidationError::Empty { field })
    } else {
        Ok(trimmed)
    }
}

/// AQI: an integer in `0..=500` once non-digits are stripped ("AQI 42" → "42").
///
/// A minus sign directly before the first digit makes the value negative and
/// therefore out of range.
pub fn validate_aqi(raw: &str) -> ValidationResult {
    const FIELD: &str = "aqi";
    let trimmed = non_empty(FIELD, raw)?;

    let first_digit = trimmed
        .find(|c: char| c.is_ascii_digit())
        .ok_or_else(|| ValidationError::malformed(FIELD, trimmed))?;
    if trimmed[..first_digit].trim_end().ends_with('-') {
        return Err(ValidationError::out_of_range(FIELD, trimmed, "0..=500"));
    }

    let digits: String = trimmed.chars().filter(char::is_ascii_digit).collect();
    match digits.parse::<u32>() {
        Ok(value) if value <= AQI_MAX => Ok(value.to_string()),
        _ => Err(ValidationError::out_of_range(FIELD, trimmed, "0..=500")),
    }
}

/// Weather condition: any non-blank text, trimmed.
pub fn validate_weather_condition(raw: &str) -> ValidationResult {
    non_empty("weather_condition", raw).map(str::to_string)
}

/// Wind speed: `<number> km/h` passes through, `<number> mph` is converted to
/// km/h with one decimal.
pub fn validate_wind_speed(raw: &str) -> ValidationResult {
    const FIELD: &str = "wind_speed";
    let trimmed = non_empty(FIELD, raw)?;

    let Some(caps) = WIND_SPEED.captures(trimmed) else {
        return if trimmed.starts_with(|c: char| c.is_ascii_digit()) {
            Err(ValidationError::UnsupportedUnit {
                field: FIELD,
                raw: trimmed.to_string(),
            })
        } else {
            Err(ValidationError::malformed(FIELD, trimmed))
        };
    };

    if &caps[2] == "mph" {
        let mph: f64 = caps[1]
            .parse()
            .map_err(|_| ValidationError::malformed(FIELD, trimmed))?;
        Ok(format!("{:.1} km/h", mph * MPH_TO_KMH))
    } else {
        Ok(trimmed.to_string())
    }
}

/// Humidity: one to three digits followed by `%`, kept as is.
pub fn validate_humidity(raw: &str) -> ValidationResult {
    const FIELD: &str = "humidity";
    let trimmed = non_empty(FIELD, raw)?;
    if HUMIDITY.is_match(trimmed) {
        Ok(trimmed.to_string())
    } else {
        Err(ValidationError::malformed(FIELD, trimmed))
    }
}

/// Temperature in °C with one decimal.
///
/// Everything except digits, `.` and `-` is stripped before parsing. Readings
/// above 50 are taken to be Fahrenheit and converted; the result must then lie
/// within `-50..=50` °C.
pub fn validate_temperature(raw: &str) -> ValidationResult {
    const FIELD: &str = "temperature";
    let trimmed = non_empty(FIELD, raw)?;

    let numeric: String = trimmed
        .chars()
        .filter(|&c| c.is_ascii_digit() || matches!(c, '.' | '-'))
        .collect();
    let mut celsius: f64 = numeric
        .parse()
        .map_err(|_| ValidationError::malformed(FIELD, trimmed))?;

    if celsius > TEMPERATURE_LIMIT_C {
        celsius = (celsius - 32.0) * 5.0 / 9.0;
    }
    if (-TEMPERATURE_LIMIT_C..=TEMPERATURE_LIMIT_C).contains(&celsius) {
        Ok(format!("{celsius:.1}°C"))
    } else {
        Err(ValidationError::out_of_range(FIELD, trimmed, "-50..=50 °C"))
    }
}

/// UV index: a one or two digit integer in `0..=11`.
pub fn validate_uv_index(raw: &str) -> ValidationResult {
    const FIELD: &str = "uv_index";
    let trimmed = non_empty(FIELD, raw)?;
    if !UV_INDEX.is_match(trimmed) {
        return Err(ValidationError::malformed(FIELD, trimmed));
    }
    match trimmed.parse::<u8>() {
        Ok(value) if value <= UV_INDEX_MAX => Ok(value.to_string()),
        _ => Err(ValidationError::out_of_range(FIELD, trimmed, "0..=11")),
    }
}

/// Pollutant concentration: the digits and decimal points of `value`, followed
/// by the unit when one is shown ("55 µg/m³"). A value without any digit is rejected.
pub fn validate_pollutant_value(value: &str, unit: Option<&str>) -> ValidationResult {
    const FIELD: &str = "pollutant";
    let trimmed = non_empty(FIELD, value)?;

    if !trimmed.chars().any(|c| c.is_ascii_digit()) {
        return Err(ValidationError::malformed(FIELD, trimmed));
    }
    let numeric: String = trimmed
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == '.')
        .collect();

    match unit.map(str::trim).filter(|u| !u.is_empty()) {
        Some(unit) => Ok(format!("{numeric} {unit}")),
        None => Ok(numeric),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rstest::rstest;

    #[rstest]
    #[case("42", "42")]
    #[case("0", "0")]
    #[case("500", "500")]
    #[case(" 087 ", "87")]
    #[case("AQI 152", "152")]
    fn test_aqi_accepts(#[case] raw: &str, #[case] expected: &str) {
        assert_eq!(validate_aqi(raw).as_deref(), Ok(expected));
    }

    #[rstest]
    #[case("501")]
    #[case("-1")]
    #[case("- 3")]
    #[case("abc")]
    #[case("")]
    #[case("   ")]
    #[case("99999999999999999999")]
    fn test_aqi_rejects(#[case] raw: &str) {
        assert!(validate_aqi(raw).is_err(), "{raw:?} should be rejected");
    }

    #[test]
    fn test_aqi_error_kinds() {
        assert_eq!(validate_aqi(""), Err(ValidationError::Empty { field: "aqi" }));
        assert!(matches!(validate_aqi("abc"), Err(ValidationError::Malformed { .. })));
        assert!(matches!(validate_aqi("-1"), Err(ValidationError::OutOfRange { .. })));
    }

    #[rstest]
    #[case("25 mph", "40.2 km/h")]
    #[case("10 km/h", "10 km/h")]
    #[case("3.5km/h", "3.5km/h")]
    #[case("0 mph", "0.0 km/h")]
    fn test_wind_speed_accepts(#[case] raw: &str, #[case] expected: &str) {
        assert_eq!(validate_wind_speed(raw).as_deref(), Ok(expected));
    }

    #[test]
    fn test_wind_speed_rejects() {
        assert!(matches!(
            validate_wind_speed("10 knots"),
            Err(ValidationError::UnsupportedUnit { .. })
        ));
        assert!(matches!(validate_wind_speed("calm"), Err(ValidationError::Malformed { .. })));
        assert!(validate_wind_speed("").is_err());
    }

    #[rstest]
    #[case("78%", Some("78%"))]
    #[case("100%", Some("100%"))]
    #[case("5%", Some("5%"))]
    #[case("1000%", None)]
    #[case("78", None)]
    #[case("78 %", None)]
    fn test_humidity(#[case] raw: &str, #[case] expected: Option<&str>) {
        assert_eq!(validate_humidity(raw).ok().as_deref(), expected);
    }

    #[rstest]
    #[case("98.6", Some("37.0°C"))]
    #[case("20", Some("20.0°C"))]
    #[case("31°C", Some("31.0°C"))]
    #[case("-5.5 °C", Some("-5.5°C"))]
    #[case("50", Some("50.0°C"))]
    #[case("86°F", Some("30.0°C"))]
    #[case("200", None)]
    #[case("-60", None)]
    #[case("warm", None)]
    #[case("", None)]
    fn test_temperature(#[case] raw: &str, #[case] expected: Option<&str>) {
        assert_eq!(validate_temperature(raw).ok().as_deref(), expected);
    }

    #[rstest]
    #[case("0", Some("0"))]
    #[case("7", Some("7"))]
    #[case("11", Some("11"))]
    #[case("07", Some("7"))]
    #[case("12", None)]
    #[case("100", None)]
    #[case("high", None)]
    fn test_uv_index(#[case] raw: &str, #[case] expected: Option<&str>) {
        assert_eq!(validate_uv_index(raw).ok().as_deref(), expected);
    }

    #[test]
    fn test_weather_condition() {
        assert_eq!(validate_weather_condition("  Haze \n").as_deref(), Ok("Haze"));
        assert!(validate_weather_condition("   ").is_err());
    }

    #[rstest]
    #[case("55", Some("µg/m³"), "55 µg/m³")]
    #[case("12.4", None, "12.4")]
    #[case("~ 7 ppb", Some("  "), "7")]
    #[case("1,204", Some("ppb"), "1204 ppb")]
    fn test_pollutant_value_accepts(
        #[case] value: &str,
        #[case] unit: Option<&str>,
        #[case] expected: &str,
    ) {
        assert_eq!(validate_pollutant_value(value, unit).as_deref(), Ok(expected));
    }

    #[test]
    fn test_pollutant_value_rejects_without_digits() {
        assert!(validate_pollutant_value("-", Some("ppb")).is_err());
        assert!(validate_pollutant_value("...", None).is_err());
        assert!(validate_pollutant_value("", None).is_err());
    }

    proptest! {
        #[test]
        fn prop_aqi_accepts_iff_in_range(value in 0u32..100_000) {
            let result = validate_aqi(&value.to_string());
            if value <= AQI_MAX {
                prop_assert_eq!(result, Ok(value.to_string()));
            } else {
                prop_assert!(result.is_err());
            }
        }

        #[test]
        fn prop_negative_aqi_is_rejected(value in 1u32..1_000) {
            let raw = format!("-{value}");
            prop_assert!(validate_aqi(&raw).is_err());
        }

        #[test]
        fn prop_validators_never_panic(raw in "\\PC*") {
            let _ = validate_aqi(&raw);
            let _ = validate_wind_speed(&raw);
            let _ = validate_humidity(&raw);
            let _ = validate_temperature(&raw);
            let _ = validate_uv_index(&raw);
            let _ = validate_pollutant_value(&raw, Some(&raw));
        }
    }
}
