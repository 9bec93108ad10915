use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::units::TemperatureUnit;

/// What the caller is searching for.
#[derive(Debug, Clone, PartialEq)]
pub enum Query {
    Place(String),
    Coordinates { lat: f64, lon: f64 },
}

impl Query {
    /// Label used when the provider response carries no location name.
    pub fn fallback_label(&self) -> String {
        match self {
            Query::Place(text) => text.clone(),
            Query::Coordinates { lat, lon } => format!("{lat:.4}, {lon:.4}"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CurrentWeather {
    pub location_name: String,
    pub country_code: Option<String>,
    pub observed_at: DateTime<Utc>,
    pub temperature_kelvin: f64,
    pub feels_like_kelvin: f64,
    pub condition_description: String,
    pub wind_speed: f64,
    pub humidity_pct: u8,
}

impl CurrentWeather {
    pub fn comfort(&self) -> Comfort {
        Comfort::assess(self.humidity_pct, self.wind_speed)
    }
}

/// Rough comfort badge shown next to the humidity reading.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Comfort {
    Comfortable,
    Muggy,
    Humid,
}

impl Comfort {
    pub fn assess(humidity_pct: u8, wind_speed: f64) -> Self {
        if humidity_pct < 65 && wind_speed < 7.0 {
            Comfort::Comfortable
        } else if humidity_pct <= 80 {
            Comfort::Muggy
        } else {
            Comfort::Humid
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Comfort::Comfortable => "Comfortable",
            Comfort::Muggy => "Muggy",
            Comfort::Humid => "Humid",
        }
    }
}

/// One 3-hour forecast data point.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastSample {
    pub timestamp: DateTime<Utc>,
    pub temperature_kelvin: f64,
    pub condition_description: String,
    pub icon_id: Option<String>,
}

/// Samples sharing one calendar date, in encounter order. Never empty.
#[derive(Debug, Clone, PartialEq)]
pub struct DayBucket {
    date: NaiveDate,
    samples: Vec<ForecastSample>,
}

impl DayBucket {
    pub fn new(date: NaiveDate, first: ForecastSample) -> Self {
        Self { date, samples: vec![first] }
    }

    pub(crate) fn push(&mut self, sample: ForecastSample) {
        self.samples.push(sample);
    }

    pub fn date(&self) -> NaiveDate {
        self.date
    }

    /// Calendar date formatted as `YYYY-MM-DD`.
    pub fn day_key(&self) -> String {
        self.date.format("%Y-%m-%d").to_string()
    }

    pub fn samples(&self) -> &[ForecastSample] {
        &self.samples
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DaySummary {
    pub date: NaiveDate,
    pub min_temperature: i32,
    pub max_temperature: i32,
    pub dominant_condition: String,
    pub representative_icon_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrendPoint {
    pub timestamp: DateTime<Utc>,
    pub temperature: f64,
}

/// Everything one search produces.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherReport {
    pub label: String,
    pub unit: TemperatureUnit,
    pub current: CurrentWeather,
    pub days: Vec<DaySummary>,
    pub trend: Vec<TrendPoint>,
}
