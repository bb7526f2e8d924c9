//! Loading observation feeds from JSON documents.
//!
//! Accepts the met.no locationforecast "compact" envelope as well as a plain
//! array of observations.

use std::fs;
use std::path::Path;

use log::debug;
use serde::Deserialize;

use crate::error::FeedError;
use crate::weather::Observation;

#[derive(Deserialize, Debug)]
#[serde(untagged)]
enum Document {
    Locationforecast(Locationforecast),
    Flat(Vec<Observation>),
}

#[derive(Deserialize, Debug)]
struct Locationforecast {
    properties: Properties,
}

#[derive(Deserialize, Debug)]
struct Properties {
    timeseries: Vec<TimeStep>,
}

#[derive(Deserialize, Debug)]
struct TimeStep {
    time: String,
    data: Data,
}

#[derive(Deserialize, Debug)]
struct Data {
    instant: Instant,
    next_1_hours: Option<Period>,
    next_6_hours: Option<Period>,
    next_12_hours: Option<Period>,
}

#[derive(Deserialize, Debug)]
struct Instant {
    details: InstantDetails,
}

#[derive(Deserialize, Debug)]
struct InstantDetails {
    air_temperature: Option<f64>,
}

#[derive(Deserialize, Debug)]
struct Period {
    summary: Option<Summary>,
}

#[derive(Deserialize, Debug)]
struct Summary {
    symbol_code: Option<String>,
}

impl Period {
    fn symbol_code(&self) -> Option<&str> {
        self.summary.as_ref()?.symbol_code.as_deref()
    }
}

impl From<TimeStep> for Observation {
    fn from(step: TimeStep) -> Self {
        let data = step.data;
        let sky_code = [&data.next_1_hours, &data.next_6_hours, &data.next_12_hours]
            .into_iter()
            .flatten()
            .find_map(Period::symbol_code)
            .map(str::to_string);

        Observation {
            timestamp: step.time,
            temperature: data.instant.details.air_temperature,
            sky_code,
        }
    }
}

/// Decode a feed document.
pub fn parse(json: &str) -> Result<Vec<Observation>, FeedError> {
    let document: Document = serde_json::from_str(json)?;
    let observations = match document {
        Document::Locationforecast(doc) => doc
            .properties
            .timeseries
            .into_iter()
            .map(Observation::from)
            .collect(),
        Document::Flat(observations) => observations,
    };
    Ok(observations)
}

/// Read and decode a feed document from `path`.
pub fn load(path: &Path) -> Result<Vec<Observation>, FeedError> {
    let json = fs::read_to_string(path).map_err(|source| FeedError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let observations = parse(&json)?;
    debug!("loaded {} observation(s) from {}", observations.len(), path.display());
    Ok(observations)
}
