use std::fmt;

use chrono_tz::Tz;
use colored::{ColoredString, Colorize};
use weather_core::{Comfort, DaySummary, TrendPoint, WeatherReport, title_case};

/// Formats a report the way `weather show` prints it.
pub fn report(report: &WeatherReport, zone: Tz) -> String {
    ReportView { report, zone }.to_string()
}

/// A report paired with the zone its observation time is shown in.
pub struct ReportView<'a> {
    pub report: &'a WeatherReport,
    pub zone: Tz,
}

impl fmt::Display for ReportView<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let unit = self.report.unit;
        let current = &self.report.current;

        let observed = current.observed_at.with_timezone(&self.zone).format("%a, %b %-d %-I:%M %p");
        let now = format!("{:.1} {}", unit.convert_kelvin(current.temperature_kelvin), unit.symbol());
        let feels = format!("{:.1} {}", unit.convert_kelvin(current.feels_like_kelvin), unit.symbol());

        writeln!(f, "\n{}", self.report.label.cyan().bold())?;
        writeln!(f, "{}", observed.to_string().bright_black())?;
        writeln!(
            f,
            "Now: {}  {}  (feels like {feels})",
            now.yellow(),
            title_case(&current.condition_description)
        )?;
        writeln!(
            f,
            "Wind: {} m/s  Humidity: {}% {}\n",
            current.wind_speed,
            current.humidity_pct,
            badge(current.comfort())
        )?;

        for day in &self.report.days {
            writeln!(f, "{}", day_line(day, unit.symbol()))?;
        }

        if let Some(line) = trend_line(&self.report.trend, unit.symbol()) {
            writeln!(f, "\n{line}")?;
        }
        writeln!(f)
    }
}

fn day_line(day: &DaySummary, symbol: &str) -> String {
    format!(
        "{}: high {} {symbol}  low {} {symbol}  {}",
        day.date.format("%a, %b %-d").to_string().green(),
        day.max_temperature,
        day.min_temperature,
        day.dominant_condition
    )
}

fn badge(comfort: Comfort) -> ColoredString {
    let text = comfort.as_str();
    match comfort {
        Comfort::Comfortable => text.green(),
        Comfort::Muggy => text.yellow(),
        Comfort::Humid => text.red(),
    }
}

fn trend_line(points: &[TrendPoint], symbol: &str) -> Option<String> {
    let values: Vec<f64> = points.iter().map(|p| p.temperature).collect();
    let min = values.iter().copied().reduce(f64::min)?;
    let max = values.iter().copied().reduce(f64::max)?;

    Some(format!("Next {}h: {}  {min:.1}-{max:.1} {symbol}", values.len() * 3, sparkline(&values)))
}

fn sparkline(values: &[f64]) -> String {
    const BARS: [char; 8] = ['▁', '▂', '▃', '▄', '▅', '▆', '▇', '█'];

    let min = values.iter().copied().fold(f64::INFINITY, f64::min);
    let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let span = (max - min).max(0.001);

    values
        .iter()
        .map(|v| {
            let norm = ((v - min) / span).clamp(0.0, 1.0);
            BARS[(norm * (BARS.len() - 1) as f64).round() as usize]
        })
        .collect()
}
