//! Core library for the `weather` CLI.
//!
//! This crate defines:
//! - Configuration & credentials handling
//! - A retrying fetcher for the OpenWeatherMap current and forecast endpoints
//! - The forecast pipeline: day bucketing, daily summaries, unit conversion
//! - Location label resolution
//!
//! It is used by `weather-cli`, but can also be reused by other binaries or services.

pub mod bucket;
pub mod client;
pub mod config;
pub mod error;
pub mod fetch;
pub mod label;
pub mod model;
pub mod provider;
pub mod summary;
pub mod units;

pub use bucket::group_by_day;
pub use client::{ClientSettings, WeatherClient};
pub use config::Config;
pub use error::WeatherError;
pub use fetch::{RetryPolicy, Transport, fetch_with_retry};
pub use label::{resolve_label, title_case};
pub use model::{
    Comfort, CurrentWeather, DayBucket, DaySummary, ForecastSample, Query, TrendPoint,
    WeatherReport,
};
pub use summary::{MAX_FORECAST_DAYS, summarize, summarize_days, temperature_trend};
pub use units::{TemperatureUnit, kelvin_to_celsius, kelvin_to_fahrenheit};
