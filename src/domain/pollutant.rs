//! Pollutant name normalization
//!
//! The dashboard labels pollutants with free-form text ("PM2.5", "NO2 ", "CO (ppb)").
//! Labels are folded into a canonical short key so every record carries the same columns.

use serde::Serialize;

/// Canonical pollutant key, or the lowercased label when the name is not recognized.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(into = "String")]
pub enum PollutantKey {
    Pm25,
    Pm10,
    O3,
    No2,
    So2,
    Co,
    Other(String),
}

impl PollutantKey {
    /// The six canonical pollutants, in CSV column order.
    pub const CANONICAL: [Self; 6] = [
        Self::Pm25,
        Self::Pm10,
        Self::O3,
        Self::No2,
        Self::So2,
        Self::Co,
    ];

    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Pm25 => "pm25",
            Self::Pm10 => "pm10",
            Self::O3 => "o3",
            Self::No2 => "no2",
            Self::So2 => "so2",
            Self::Co => "co",
            Self::Other(name) => name,
        }
    }

    #[must_use]
    pub const fn is_canonical(&self) -> bool {
        !matches!(self, Self::Other(_))
    }
}

impl std::fmt::Display for PollutantKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<PollutantKey> for String {
    fn from(key: PollutantKey) -> Self {
        key.as_str().to_string()
    }
}

/// Map a pollutant label to its key.
///
/// Matching is case-insensitive substring search, first match wins, in the
/// order pm2.5, pm10, co, so2, no2, o3. "co" is tested before "so2"/"no2", so a
/// label that contains "co" anywhere resolves to carbon monoxide.
#[must_use]
pub fn normalize_pollutant_name(label: &str) -> PollutantKey {
    let name = label.to_lowercase();
    if name.contains("pm2.5") {
        PollutantKey::Pm25
    } else if name.contains("pm10") {
        PollutantKey::Pm10
    } else if name.contains("co") {
        PollutantKey::Co
    } else if name.contains("so2") {
        PollutantKey::So2
    } else if name.contains("no2") {
        PollutantKey::No2
    } else if name.contains("o3") {
        PollutantKey::O3
    } else {
        PollutantKey::Other(name.trim().to_string())
    }
}
