use std::fmt;

use serde::{Deserialize, Serialize};

/// Sky condition classes, ordered from least to most severe.
///
/// The derived `Ord` follows declaration order, so reducing several
/// conditions with `max` keeps the worst one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize)]
pub enum Condition {
    #[default]
    Clear,
    Cloudy,
    Rain,
    Snow,
    Fog,
    Thunder,
}

impl Condition {
    /// Classify a sky condition code such as `"partlycloudy_day"` or
    /// `"heavyrainandthunder"`.
    ///
    /// Matching is a case-insensitive substring test, most severe first.
    /// Unknown and empty codes are `Clear`.
    pub fn classify(sky_code: &str) -> Self {
        let code = sky_code.to_ascii_lowercase();
        let has = |needles: &[&str]| needles.iter().any(|n| code.contains(n));

        if has(&["thunder"]) {
            Condition::Thunder
        } else if has(&["fog", "mist"]) {
            Condition::Fog
        } else if has(&["snow"]) {
            Condition::Snow
        } else if has(&["rain", "drizzle"]) {
            Condition::Rain
        } else if has(&["cloud", "overcast", "partlycloudy"]) {
            Condition::Cloudy
        } else {
            Condition::Clear
        }
    }

    /// Classify the code of a current reading. A missing code is shown as
    /// `Cloudy` rather than `Clear`.
    pub fn classify_current(sky_code: Option<&str>) -> Self {
        match sky_code {
            Some(code) if !code.is_empty() => Self::classify(code),
            _ => Condition::Cloudy,
        }
    }

    /// Worst condition among `codes`, `Clear` when there are none.
    pub fn worst_of<I, S>(codes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        codes
            .into_iter()
            .map(|c| Self::classify(c.as_ref()))
            .max()
            .unwrap_or_default()
    }

    /// Ordinal severity, `0` (clear) to `5` (thunderstorm).
    pub fn severity(self) -> u8 {
        self as u8
    }

    pub fn label(self) -> &'static str {
        match self {
            Condition::Clear => "Clear",
            Condition::Cloudy => "Cloudy",
            Condition::Rain => "Rain",
            Condition::Snow => "Snow",
            Condition::Fog => "Fog",
            Condition::Thunder => "Thunderstorm",
        }
    }
}

impl fmt::Display for Condition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Units {
    #[default]
    Metric,
    Imperial,
}

/// One timestamped sample from the feed.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Observation {
    /// ISO 8601, e.g. "2024-02-14T08:00:00Z"
    pub timestamp: String,
    /// Degrees Celsius
    #[serde(default)]
    pub temperature: Option<f64>,
    #[serde(default)]
    pub sky_code: Option<String>,
}

impl Observation {
    pub fn new(timestamp: &str, temperature: Option<f64>, sky_code: Option<&str>) -> Self {
        Self {
            timestamp: timestamp.to_string(),
            temperature,
            sky_code: sky_code.map(str::to_string),
        }
    }

    /// Temperature to fold, `0.0` when missing or not finite.
    pub fn temperature_or_zero(&self) -> f64 {
        self.temperature.filter(|t| t.is_finite()).unwrap_or(0.0)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CurrentSnapshot {
    pub temperature: f64,
    pub sky_code: Option<String>,
    pub condition: Condition,
}

impl CurrentSnapshot {
    pub fn from_observation(obs: &Observation) -> Self {
        Self {
            temperature: obs.temperature_or_zero(),
            sky_code: obs.sky_code.clone(),
            condition: Condition::classify_current(obs.sky_code.as_deref()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DailySummary {
    /// Short weekday name, e.g. "Wed"
    pub day_label: String,
    /// Day and month, e.g. "14 Feb"
    pub date_label: String,
    pub high_temp: f64,
    pub low_temp: f64,
    pub condition: Condition,
}

/// Counts of what a pass left out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct SkipCounts {
    pub malformed: usize,
    pub stale: usize,
    /// Observations left unprocessed once four days were collected.
    pub unreached: usize,
    pub dropped_codes: usize,
}

/// Published result of one aggregation pass. Replaced as a whole on every
/// refresh, never patched.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Forecast {
    pub current: CurrentSnapshot,
    /// Index 0 is today; at most four entries.
    pub days: Vec<DailySummary>,
    pub skipped: SkipCounts,
}
