//! Single pass reduction of an observation feed into current conditions and
//! up to four daily summaries.
//!
//! A pass keeps one bucket per calendar date, today first. All state lives
//! in the pass and is handed back in one piece when it finishes.

use std::fmt::Display;

use chrono::{DateTime, Local, NaiveDate, TimeZone};
use log::{debug, info, warn};

use crate::error::ForecastError;
use crate::timestamp;
use crate::weather::{
    Condition, CurrentSnapshot, DailySummary, Forecast, Observation, SkipCounts,
};

/// Today plus the next three days.
pub const FORECAST_DAYS: usize = 4;

/// Hourly feed over one day.
pub const MAX_CODES_PER_DAY: usize = 24;

#[derive(Debug, Clone)]
struct DayBucket {
    date: NaiveDate,
    day_label: String,
    date_label: String,
    temp_min: f64,
    temp_max: f64,
    samples: usize,
    sky_codes: Vec<String>,
}

impl DayBucket {
    fn open<Tz>(date: NaiveDate, local: &DateTime<Tz>) -> Self
    where
        Tz: TimeZone,
        Tz::Offset: Display,
    {
        Self {
            date,
            day_label: local.format("%a").to_string(),
            date_label: local.format("%-d %b").to_string(),
            temp_min: f64::INFINITY,
            temp_max: f64::NEG_INFINITY,
            samples: 0,
            sky_codes: Vec::with_capacity(MAX_CODES_PER_DAY),
        }
    }

    fn fold_temperature(&mut self, temperature: f64) {
        self.temp_min = self.temp_min.min(temperature);
        self.temp_max = self.temp_max.max(temperature);
        self.samples += 1;
    }

    /// Returns false when the bucket is full and the code was dropped.
    fn push_code(&mut self, code: &str) -> bool {
        if self.sky_codes.len() >= MAX_CODES_PER_DAY {
            return false;
        }
        self.sky_codes.push(code.to_string());
        true
    }

    fn finish(self) -> Option<DailySummary> {
        if self.samples == 0 {
            return None;
        }
        Some(DailySummary {
            condition: Condition::worst_of(&self.sky_codes),
            day_label: self.day_label,
            date_label: self.date_label,
            high_temp: self.temp_max,
            low_temp: self.temp_min,
        })
    }
}

/// One aggregation pass.
///
/// `today` and the display zone are fixed when the pass is created. Feed
/// instants are converted into that zone and bucketed by the local date,
/// so the "before today" filter and the day labels agree.
pub struct Pass<'a, Tz: TimeZone> {
    tz: &'a Tz,
    today: NaiveDate,
    buckets: Vec<DayBucket>,
    current: Option<CurrentSnapshot>,
    skipped: SkipCounts,
    full: bool,
}

impl<'a, Tz> Pass<'a, Tz>
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    pub fn new(today: NaiveDate, tz: &'a Tz) -> Self {
        Self {
            tz,
            today,
            buckets: Vec::with_capacity(FORECAST_DAYS),
            current: None,
            skipped: SkipCounts::default(),
            full: false,
        }
    }

    /// Fold one observation into the pass. Once a fifth distinct date shows
    /// up the pass stops taking observations; that one and every later push
    /// count as unreached.
    pub fn push(&mut self, obs: &Observation) {
        if self.full {
            self.skipped.unreached += 1;
            return;
        }

        let parsed = match timestamp::parse(&obs.timestamp) {
            Ok(parsed) => parsed,
            Err(e) => {
                warn!("skipping observation: {e}");
                self.skipped.malformed += 1;
                return;
            }
        };

        let local = parsed.local(self.tz);
        let date = local.date_naive();
        if date < self.today {
            debug!("skipping stale observation at {}", obs.timestamp);
            self.skipped.stale += 1;
            return;
        }

        let idx = match self.buckets.iter().position(|b| b.date == date) {
            Some(idx) => idx,
            None if self.buckets.len() == FORECAST_DAYS => {
                debug!("{FORECAST_DAYS} days collected, ignoring the rest of the feed");
                self.full = true;
                self.skipped.unreached += 1;
                return;
            }
            None => {
                self.buckets.push(DayBucket::open(date, &local));
                self.buckets.len() - 1
            }
        };

        let bucket = &mut self.buckets[idx];
        bucket.fold_temperature(obs.temperature_or_zero());
        if let Some(code) = obs.sky_code.as_deref() {
            if !bucket.push_code(code) {
                debug!("{date}: sky code buffer full, dropping {code:?}");
                self.skipped.dropped_codes += 1;
            }
        }

        if self.current.is_none() {
            self.current = Some(CurrentSnapshot::from_observation(obs));
        }
    }

    /// Number of days opened so far.
    pub fn day_count(&self) -> usize {
        self.buckets.len()
    }

    pub fn finish(self) -> Result<Forecast, ForecastError> {
        let skipped = self.skipped;
        let Some(current) = self.current else {
            info!("pass retained no observations ({skipped:?})");
            return Err(ForecastError::EmptyFeed);
        };

        let days: Vec<DailySummary> = self.buckets.into_iter().filter_map(DayBucket::finish).collect();
        debug!("pass produced {} day(s), skipped {skipped:?}", days.len());

        Ok(Forecast {
            current,
            days,
            skipped,
        })
    }
}

/// Run a full pass over `observations`.
pub fn aggregate<Tz>(
    observations: &[Observation],
    today: NaiveDate,
    tz: &Tz,
) -> Result<Forecast, ForecastError>
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    let mut pass = Pass::new(today, tz);
    for (i, obs) in observations.iter().enumerate() {
        pass.push(obs);
        if pass.full {
            pass.skipped.unreached += observations.len() - i - 1;
            break;
        }
    }
    pass.finish()
}

/// Run a pass against the process clock and local time zone.
pub fn aggregate_local(observations: &[Observation]) -> Result<Forecast, ForecastError> {
    let today = Local::now().date_naive();
    aggregate(observations, today, &Local)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{FixedOffset, Utc};

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn obs(ts: &str, temp: f64, code: &str) -> Observation {
        Observation::new(ts, Some(temp), Some(code))
    }

    #[test]
    fn test_two_day_feed() {
        let feed = vec![
            obs("2024-02-14T08:00:00Z", 5.0, "cloudy"),
            obs("2024-02-14T09:00:00Z", 7.0, "rain"),
            obs("2024-02-15T08:00:00Z", 1.0, "snow"),
        ];
        let fc = aggregate(&feed, date(2024, 2, 14), &Utc).unwrap();

        assert_eq!(fc.days.len(), 2);
        assert_eq!(fc.days[0].low_temp, 5.0);
        assert_eq!(fc.days[0].high_temp, 7.0);
        assert_eq!(fc.days[0].condition, Condition::Rain);
        assert_eq!(fc.days[0].day_label, "Wed");
        assert_eq!(fc.days[0].date_label, "14 Feb");
        assert_eq!(fc.days[1].low_temp, 1.0);
        assert_eq!(fc.days[1].high_temp, 1.0);
        assert_eq!(fc.days[1].condition, Condition::Snow);
        assert_eq!(fc.days[1].day_label, "Thu");

        assert_eq!(fc.current.temperature, 5.0);
        assert_eq!(fc.current.sky_code.as_deref(), Some("cloudy"));
        assert_eq!(fc.current.condition, Condition::Cloudy);
    }

    #[test]
    fn test_stale_first_observation_is_not_current() {
        let feed = vec![
            obs("2024-02-13T23:00:00Z", -20.0, "thunder"),
            obs("2024-02-14T00:00:00Z", 2.0, "clearsky_night"),
        ];
        let fc = aggregate(&feed, date(2024, 2, 14), &Utc).unwrap();

        assert_eq!(fc.days.len(), 1);
        assert_eq!(fc.days[0].low_temp, 2.0);
        assert_eq!(fc.days[0].condition, Condition::Clear);
        assert_eq!(fc.current.temperature, 2.0);
        assert_eq!(fc.skipped.stale, 1);
    }

    #[test]
    fn test_fifth_day_is_never_opened() {
        let feed: Vec<_> = (14..=18)
            .map(|d| obs(&format!("2024-02-{d}T12:00:00Z"), d as f64, "rain"))
            .collect();
        let fc = aggregate(&feed, date(2024, 2, 14), &Utc).unwrap();

        assert_eq!(fc.days.len(), FORECAST_DAYS);
        assert_eq!(fc.days[3].date_label, "17 Feb");
        assert_eq!(fc.days[3].high_temp, 17.0);
        assert_eq!(fc.skipped.unreached, 1);
    }

    #[test]
    fn test_unreached_counts_every_unread_observation() {
        let feed: Vec<_> = (14..=20)
            .map(|d| obs(&format!("2024-02-{d}T12:00:00Z"), d as f64, "rain"))
            .collect();
        let fc = aggregate(&feed, date(2024, 2, 14), &Utc).unwrap();
        assert_eq!(fc.days.len(), FORECAST_DAYS);
        assert_eq!(fc.skipped.unreached, 3);

        let mut pass = Pass::new(date(2024, 2, 14), &Utc);
        for o in &feed {
            pass.push(o);
        }
        assert_eq!(pass.finish().unwrap().skipped.unreached, 3);
    }

    #[test]
    fn test_sky_codes_are_capped() {
        let mut pass = Pass::new(date(2024, 2, 14), &Utc);
        for minute in 0..30 {
            let code = if minute < MAX_CODES_PER_DAY { "cloudy" } else { "thunder" };
            pass.push(&obs(&format!("2024-02-14T10:{minute:02}:00Z"), 3.0, code));
        }
        assert_eq!(pass.day_count(), 1);
        assert_eq!(pass.buckets[0].sky_codes.len(), MAX_CODES_PER_DAY);

        let fc = pass.finish().unwrap();
        // the thunder codes arrived after the buffer filled
        assert_eq!(fc.days[0].condition, Condition::Cloudy);
        assert_eq!(fc.skipped.dropped_codes, 6);
    }

    #[test]
    fn test_malformed_is_skipped() {
        let feed = vec![
            obs("not a time", 99.0, "thunder"),
            obs("2024-02-14T10:00:00Z", 4.0, "fog"),
        ];
        let fc = aggregate(&feed, date(2024, 2, 14), &Utc).unwrap();
        assert_eq!(fc.skipped.malformed, 1);
        assert_eq!(fc.days[0].high_temp, 4.0);
        assert_eq!(fc.current.condition, Condition::Fog);
    }

    #[test]
    fn test_missing_values_use_defaults() {
        let feed = vec![
            Observation::new("2024-02-14T10:00:00Z", None, None),
            Observation::new("2024-02-14T11:00:00Z", Some(6.5), None),
        ];
        let fc = aggregate(&feed, date(2024, 2, 14), &Utc).unwrap();
        assert_eq!(fc.days[0].low_temp, 0.0);
        assert_eq!(fc.days[0].high_temp, 6.5);
        assert_eq!(fc.days[0].condition, Condition::Clear);
        assert_eq!(fc.current.temperature, 0.0);
        assert_eq!(fc.current.condition, Condition::Cloudy);
    }

    #[test]
    fn test_non_finite_temperatures_fold_as_zero() {
        let only_nan = vec![Observation::new("2024-02-14T08:00:00Z", Some(f64::NAN), Some("rain"))];
        let fc = aggregate(&only_nan, date(2024, 2, 14), &Utc).unwrap();
        assert_eq!((fc.days[0].low_temp, fc.days[0].high_temp), (0.0, 0.0));
        assert_eq!(fc.current.temperature, 0.0);

        let mixed = vec![
            Observation::new("2024-02-14T08:00:00Z", Some(f64::INFINITY), None),
            Observation::new("2024-02-14T09:00:00Z", Some(4.0), None),
            Observation::new("2024-02-14T10:00:00Z", Some(f64::NEG_INFINITY), None),
        ];
        let fc = aggregate(&mixed, date(2024, 2, 14), &Utc).unwrap();
        let day = &fc.days[0];
        assert!(day.low_temp <= day.high_temp);
        assert_eq!((day.low_temp, day.high_temp), (0.0, 4.0));
    }

    #[test]
    fn test_empty_feed() {
        assert_eq!(aggregate(&[], date(2024, 2, 14), &Utc), Err(ForecastError::EmptyFeed));

        let stale = vec![obs("2024-02-10T10:00:00Z", 1.0, "rain"), obs("bad", 1.0, "rain")];
        assert_eq!(aggregate(&stale, date(2024, 2, 14), &Utc), Err(ForecastError::EmptyFeed));
    }

    #[test]
    fn test_buckets_by_display_zone() {
        // 23:30 UTC on the 13th is already the 14th at UTC+1
        let cet = FixedOffset::east_opt(3600).unwrap();
        let feed = vec![
            obs("2024-02-13T23:30:00Z", 1.0, "cloudy"),
            obs("2024-02-14T22:30:00Z", 3.0, "rain"),
            obs("2024-02-14T23:30:00Z", 8.0, "snow"),
        ];
        let fc = aggregate(&feed, date(2024, 2, 14), &cet).unwrap();

        assert_eq!(fc.days.len(), 2);
        assert_eq!(fc.days[0].date_label, "14 Feb");
        assert_eq!((fc.days[0].low_temp, fc.days[0].high_temp), (1.0, 3.0));
        assert_eq!(fc.days[1].date_label, "15 Feb");
        assert_eq!(fc.current.temperature, 1.0);
    }

    #[test]
    fn test_out_of_order_dates_reuse_bucket() {
        let feed = vec![
            obs("2024-02-15T10:00:00Z", 2.0, "cloudy"),
            obs("2024-02-14T10:00:00Z", 9.0, "clearsky_day"),
            obs("2024-02-15T11:00:00Z", -1.0, "snow"),
        ];
        let fc = aggregate(&feed, date(2024, 2, 14), &Utc).unwrap();
        assert_eq!(fc.days.len(), 2);
        assert_eq!(fc.days[0].date_label, "15 Feb");
        assert_eq!((fc.days[0].low_temp, fc.days[0].high_temp), (-1.0, 2.0));
        assert_eq!(fc.days[0].condition, Condition::Snow);
    }
}
