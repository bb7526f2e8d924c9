//! Reduce an hourly weather feed to current conditions and a four day
//! summary: today plus the next three days, each with a high, a low and the
//! worst sky condition seen that day.

pub mod aggregate;
pub mod app;
pub mod cli;
pub mod config;
pub mod error;
pub mod feed;
pub mod logging;
pub mod timestamp;
pub mod units;
pub mod weather;

pub use aggregate::{aggregate, aggregate_local, Pass, FORECAST_DAYS, MAX_CODES_PER_DAY};
pub use error::{FeedError, ForecastError};
pub use weather::{Condition, CurrentSnapshot, DailySummary, Forecast, Observation, SkipCounts, Units};
