use std::time::Duration;

use anyhow::Context;
use chrono_tz::Tz;
use reqwest::Client;
use secrecy::SecretString;
use tracing::{debug, instrument};

use crate::{
    bucket::group_by_day,
    config::Config,
    error::WeatherError,
    fetch::{RetryPolicy, ReqwestTransport, Transport, fetch_with_retry},
    label::resolve_label,
    model::{Query, WeatherReport},
    provider::{
        Endpoint,
        openweather::{parse_current, parse_forecast},
    },
    summary::{summarize_days, temperature_trend},
    units::TemperatureUnit,
};

const HTTP_CONNECT_TIMEOUT_SECS: u64 = 5;

/// Everything a search needs besides the transport.
#[derive(Debug)]
pub struct ClientSettings {
    pub api_key: SecretString,
    pub base_url: String,
    pub units: TemperatureUnit,
    /// Zone whose calendar days the forecast is bucketed into.
    pub zone: Tz,
    pub retry: RetryPolicy,
    /// Limit for the whole search, both requests and their retries.
    pub timeout: Option<Duration>,
}

impl ClientSettings {
    pub fn new(api_key: impl Into<String>) -> Self {
        let api_key: String = api_key.into();
        let defaults = Config::default();
        let timeout = defaults.request_timeout();
        Self {
            api_key: SecretString::new(api_key.into()),
            base_url: defaults.base_url,
            units: defaults.units,
            zone: Tz::UTC,
            retry: defaults.retry,
            timeout,
        }
    }

    pub fn from_config(config: &Config) -> anyhow::Result<Self> {
        Ok(Self {
            api_key: SecretString::new(config.api_key()?.into()),
            base_url: config.base_url.clone(),
            units: config.units,
            zone: config.reference_zone()?,
            retry: config.retry,
            timeout: config.request_timeout(),
        })
    }
}

#[derive(Debug)]
pub struct WeatherClient {
    transport: Box<dyn Transport>,
    settings: ClientSettings,
}

impl WeatherClient {
    pub fn new(transport: Box<dyn Transport>, settings: ClientSettings) -> Self {
        Self { transport, settings }
    }

    /// Client backed by a pooled `reqwest` HTTP client.
    pub fn from_config(config: &Config) -> anyhow::Result<Self> {
        let http = Client::builder()
            .connect_timeout(Duration::from_secs(HTTP_CONNECT_TIMEOUT_SECS))
            .user_agent(concat!("weather/", env!("CARGO_PKG_VERSION")))
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self::new(Box::new(ReqwestTransport::new(http)), ClientSettings::from_config(config)?))
    }

    pub fn settings(&self) -> &ClientSettings {
        &self.settings
    }

    pub async fn search_by_place_name(&self, text: &str) -> Result<WeatherReport, WeatherError> {
        self.search(&Query::Place(text.trim().to_string())).await
    }

    pub async fn search_by_coordinates(&self, lat: f64, lon: f64) -> Result<WeatherReport, WeatherError> {
        self.search(&Query::Coordinates { lat, lon }).await
    }

    #[instrument(skip(self), fields(units = %self.settings.units, zone = %self.settings.zone))]
    pub async fn search(&self, query: &Query) -> Result<WeatherReport, WeatherError> {
        validate(query)?;

        let work = self.fetch_report(query);
        match self.settings.timeout {
            Some(limit) => tokio::time::timeout(limit, work)
                .await
                .map_err(|_| WeatherError::Timeout(limit))?,
            None => work.await,
        }
    }

    async fn fetch_report(&self, query: &Query) -> Result<WeatherReport, WeatherError> {
        let settings = &self.settings;
        let current_url = Endpoint::Current.url(&settings.base_url, query, &settings.api_key)?;
        let forecast_url = Endpoint::Forecast.url(&settings.base_url, query, &settings.api_key)?;

        let (current_json, forecast_json) = tokio::try_join!(
            fetch_with_retry(self.transport.as_ref(), &current_url, &settings.retry),
            fetch_with_retry(self.transport.as_ref(), &forecast_url, &settings.retry)
        )?;

        let current = parse_current(&current_json)?;
        let samples = parse_forecast(&forecast_json)?;
        let label = resolve_label(&current_json, &query.fallback_label());

        let trend = temperature_trend(&samples, settings.units);
        let buckets = group_by_day(samples, settings.zone);
        let days = summarize_days(&buckets, settings.units);

        debug!(label = %label, buckets = buckets.len(), days = days.len(), "Search complete");

        Ok(WeatherReport { label, unit: settings.units, current, days, trend })
    }
}

fn validate(query: &Query) -> Result<(), WeatherError> {
    match query {
        Query::Place(text) if text.trim().is_empty() => {
            Err(WeatherError::InvalidQuery("enter a city or ZIP".to_string()))
        }
        Query::Coordinates { lat, lon } if !(-90.0..=90.0).contains(lat) || !(-180.0..=180.0).contains(lon) => {
            Err(WeatherError::InvalidQuery(format!(
                "coordinates out of range: lat {lat}, lon {lon}"
            )))
        }
        _ => Ok(()),
    }
}
