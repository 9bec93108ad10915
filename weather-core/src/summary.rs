use indexmap::IndexMap;

use crate::{
    label::title_case,
    model::{DayBucket, DaySummary, ForecastSample, TrendPoint},
    units::TemperatureUnit,
};

/// Number of days a forecast is cut down to.
pub const MAX_FORECAST_DAYS: usize = 5;

/// Number of leading samples in the temperature trend series.
pub const TREND_SAMPLES: usize = 16;

/// Reduces one day's samples into its displayed summary.
///
/// Min/max are rounded half away from zero. The dominant condition is the most
/// frequent description (case-insensitive); on a tie the one seen first wins.
/// The icon comes from the sample at the temporal midpoint of the bucket.
pub fn summarize(bucket: &DayBucket, unit: TemperatureUnit) -> DaySummary {
    let samples = bucket.samples();

    let (min, max) = samples
        .iter()
        .map(|s| unit.convert_kelvin(s.temperature_kelvin))
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), t| (lo.min(t), hi.max(t)));

    let representative_icon_id =
        samples.get(samples.len() / 2).and_then(|mid| mid.icon_id.clone());

    DaySummary {
        date: bucket.date(),
        min_temperature: round_whole(min),
        max_temperature: round_whole(max),
        dominant_condition: title_case(&dominant_condition(samples)),
        representative_icon_id,
    }
}

/// Summarizes the first [`MAX_FORECAST_DAYS`] buckets in order.
pub fn summarize_days(buckets: &[DayBucket], unit: TemperatureUnit) -> Vec<DaySummary> {
    buckets.iter().take(MAX_FORECAST_DAYS).map(|b| summarize(b, unit)).collect()
}

/// The first [`TREND_SAMPLES`] readings, rounded to one decimal.
pub fn temperature_trend(samples: &[ForecastSample], unit: TemperatureUnit) -> Vec<TrendPoint> {
    samples
        .iter()
        .take(TREND_SAMPLES)
        .map(|s| TrendPoint {
            timestamp: s.timestamp,
            temperature: (unit.convert_kelvin(s.temperature_kelvin) * 10.0).round() / 10.0,
        })
        .collect()
}

pub(crate) fn round_whole(value: f64) -> i32 {
    value.round() as i32
}

fn dominant_condition(samples: &[ForecastSample]) -> String {
    let mut counts: IndexMap<String, usize> = IndexMap::new();
    for sample in samples {
        *counts.entry(sample.condition_description.to_lowercase()).or_default() += 1;
    }

    let mut best: Option<(&str, usize)> = None;
    for (description, &count) in &counts {
        if best.is_none_or(|(_, n)| count > n) {
            best = Some((description.as_str(), count));
        }
    }

    best.map(|(d, _)| d.to_string()).unwrap_or_else(|| "n/a".to_string())
}
