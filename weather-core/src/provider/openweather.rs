use chrono::{DateTime, Utc};
use reqwest::Url;
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use serde_json::Value;

use crate::{
    error::WeatherError,
    model::{CurrentWeather, ForecastSample, Query},
};

pub const DEFAULT_BASE_URL: &str = "https://api.openweathermap.org/data/2.5";

const UNKNOWN_CONDITION: &str = "n/a";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endpoint {
    Current,
    Forecast,
}

impl Endpoint {
    pub fn path(self) -> &'static str {
        match self {
            Endpoint::Current => "weather",
            Endpoint::Forecast => "forecast",
        }
    }

    /// Full request URL including the `appid` credential.
    pub fn url(self, base_url: &str, query: &Query, api_key: &SecretString) -> Result<Url, WeatherError> {
        let base = format!("{}/{}", base_url.trim_end_matches('/'), self.path());

        let mut params: Vec<(&str, String)> = match query {
            Query::Place(text) => vec![("q", text.clone())],
            Query::Coordinates { lat, lon } => vec![("lat", lat.to_string()), ("lon", lon.to_string())],
        };
        params.push(("appid", api_key.expose_secret().to_string()));

        Url::parse_with_params(&base, &params)
            .map_err(|e| WeatherError::InvalidQuery(format!("cannot build URL from '{base_url}': {e}")))
    }
}

#[derive(Debug, Deserialize)]
struct OwForecastMain {
    temp: f64,
}

#[derive(Debug, Deserialize)]
struct OwWeather {
    description: Option<String>,
    icon: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct OwWind {
    speed: Option<f64>,
}

#[derive(Debug, Default, Deserialize)]
struct OwSys {
    country: Option<String>,
}

#[derive(Debug, Deserialize)]
struct OwCurrentResponse {
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    sys: OwSys,
    dt: i64,
    main: OwCurrentMain,
    #[serde(default)]
    weather: Vec<OwWeather>,
    #[serde(default)]
    wind: OwWind,
}

/// `feels_like` is required for the current reading.
#[derive(Debug, Deserialize)]
struct OwCurrentMain {
    temp: f64,
    feels_like: f64,
    humidity: Option<u8>,
}

#[derive(Debug, Deserialize)]
struct OwForecastEntry {
    dt: i64,
    main: OwForecastMain,
    #[serde(default)]
    weather: Vec<OwWeather>,
}

#[derive(Debug, Deserialize)]
struct OwForecastResponse {
    list: Vec<OwForecastEntry>,
}

pub fn parse_current(value: &Value) -> Result<CurrentWeather, WeatherError> {
    let parsed = OwCurrentResponse::deserialize(value)
        .map_err(|e| WeatherError::parse("current weather JSON", e))?;

    let first = parsed.weather.first();

    Ok(CurrentWeather {
        location_name: parsed.name.unwrap_or_default(),
        country_code: parsed.sys.country.filter(|c| !c.is_empty()),
        observed_at: unix_to_utc(parsed.dt)?,
        temperature_kelvin: parsed.main.temp,
        feels_like_kelvin: parsed.main.feels_like,
        condition_description: condition_of(first),
        wind_speed: parsed.wind.speed.unwrap_or(0.0),
        humidity_pct: parsed.main.humidity.unwrap_or(0).min(100),
    })
}

pub fn parse_forecast(value: &Value) -> Result<Vec<ForecastSample>, WeatherError> {
    let parsed = OwForecastResponse::deserialize(value)
        .map_err(|e| WeatherError::parse("forecast JSON", e))?;

    parsed
        .list
        .into_iter()
        .map(|entry| {
            let first = entry.weather.first();
            Ok(ForecastSample {
                timestamp: unix_to_utc(entry.dt)?,
                temperature_kelvin: entry.main.temp,
                condition_description: condition_of(first),
                icon_id: first.and_then(|w| w.icon.clone()),
            })
        })
        .collect()
}

fn condition_of(weather: Option<&OwWeather>) -> String {
    weather
        .and_then(|w| w.description.clone())
        .filter(|d| !d.is_empty())
        .unwrap_or_else(|| UNKNOWN_CONDITION.to_string())
}

fn unix_to_utc(ts: i64) -> Result<DateTime<Utc>, WeatherError> {
    DateTime::from_timestamp(ts, 0)
        .ok_or_else(|| WeatherError::parse("timestamp", format!("{ts} is out of range")))
}
