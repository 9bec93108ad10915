use chrono::NaiveDate;
use chrono_tz::Tz;
use indexmap::IndexMap;

use crate::model::{DayBucket, ForecastSample};

/// Groups samples by calendar date in `zone`, keeping first-seen day order.
pub fn group_by_day(samples: impl IntoIterator<Item = ForecastSample>, zone: Tz) -> Vec<DayBucket> {
    let mut buckets: IndexMap<NaiveDate, DayBucket> = IndexMap::new();

    for sample in samples {
        let date = sample.timestamp.with_timezone(&zone).date_naive();
        match buckets.get_mut(&date) {
            Some(bucket) => bucket.push(sample),
            None => {
                buckets.insert(date, DayBucket::new(date, sample));
            }
        }
    }

    buckets.into_values().collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, TimeZone, Utc};

    fn sample_at(ts: DateTime<Utc>, kelvin: f64) -> ForecastSample {
        ForecastSample {
            timestamp: ts,
            temperature_kelvin: kelvin,
            condition_description: "clear sky".into(),
            icon_id: Some("01d".into()),
        }
    }

    fn utc(y: i32, m: u32, d: u32, h: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, h, 0, 0).unwrap()
    }

    #[test]
    fn empty_input_yields_no_buckets() {
        assert!(group_by_day(Vec::new(), Tz::UTC).is_empty());
    }

    #[test]
    fn single_day_keeps_every_sample_in_order() {
        let samples: Vec<_> =
            (0..8).map(|i| sample_at(utc(2024, 5, 1, i * 3), 280.0 + f64::from(i))).collect();

        let buckets = group_by_day(samples.clone(), Tz::UTC);

        assert_eq!(buckets.len(), 1);
        assert_eq!(buckets[0].day_key(), "2024-05-01");
        assert_eq!(buckets[0].samples(), samples.as_slice());
    }

    #[test]
    fn day_order_follows_first_occurrence() {
        let samples = vec![
            sample_at(utc(2024, 5, 3, 0), 280.0),
            sample_at(utc(2024, 5, 1, 0), 281.0),
            sample_at(utc(2024, 5, 3, 6), 282.0),
            sample_at(utc(2024, 5, 2, 0), 283.0),
            sample_at(utc(2024, 5, 1, 9), 284.0),
        ];

        let buckets = group_by_day(samples, Tz::UTC);
        let keys: Vec<_> = buckets.iter().map(DayBucket::day_key).collect();
        assert_eq!(keys, ["2024-05-03", "2024-05-01", "2024-05-02"]);

        let first_day: Vec<_> = buckets[0].samples().iter().map(|s| s.temperature_kelvin).collect();
        assert_eq!(first_day, [280.0, 282.0]);
        let total: usize = buckets.iter().map(|b| b.samples().len()).sum();
        assert_eq!(total, 5);
    }

    #[test]
    fn reference_zone_moves_day_boundaries() {
        // 03:00 UTC on May 2 is still May 1 in Denver (UTC-6 in summer).
        let samples = vec![sample_at(utc(2024, 5, 1, 21), 280.0), sample_at(utc(2024, 5, 2, 3), 281.0)];

        assert_eq!(group_by_day(samples.clone(), Tz::UTC).len(), 2);

        let denver = group_by_day(samples, chrono_tz::America::Denver);
        assert_eq!(denver.len(), 1);
        assert_eq!(denver[0].day_key(), "2024-05-01");
    }
}
