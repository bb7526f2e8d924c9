//! Feed timestamp parsing.
//!
//! The feed stamps every entry in UTC with a literal `Z` suffix, with or
//! without milliseconds. Anything else is rejected.

use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeZone, Timelike, Utc};

use crate::error::ForecastError;

const WITH_FRACTION: &str = "%Y-%m-%dT%H:%M:%S%.fZ";
const WHOLE_SECONDS: &str = "%Y-%m-%dT%H:%M:%SZ";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParsedTimestamp {
    /// Whole-second instant.
    pub instant: DateTime<Utc>,
    /// Date as written in the feed.
    pub feed_date: NaiveDate,
}

impl ParsedTimestamp {
    /// The instant seen from `tz`.
    pub fn local<Tz: TimeZone>(&self, tz: &Tz) -> DateTime<Tz> {
        self.instant.with_timezone(tz)
    }

    /// Calendar date of the instant in `tz`. This is the date observations
    /// are bucketed by.
    pub fn local_date<Tz: TimeZone>(&self, tz: &Tz) -> NaiveDate {
        self.local(tz).date_naive()
    }
}

pub fn parse(iso: &str) -> Result<ParsedTimestamp, ForecastError> {
    let naive = NaiveDateTime::parse_from_str(iso, WITH_FRACTION)
        .or_else(|_| NaiveDateTime::parse_from_str(iso, WHOLE_SECONDS))
        .map_err(|_| ForecastError::MalformedTimestamp(iso.to_string()))?;

    let naive = naive
        .with_nanosecond(0)
        .ok_or_else(|| ForecastError::MalformedTimestamp(iso.to_string()))?;

    Ok(ParsedTimestamp {
        instant: Utc.from_utc_datetime(&naive),
        feed_date: naive.date(),
    })
}
