use anyhow::Context;
use chrono_tz::Tz;
use clap::{Parser, Subcommand};
use inquire::{Password, PasswordDisplayMode, Select, Text};
use tracing::info;
use weather_core::{Config, TemperatureUnit, WeatherClient, WeatherReport, config::parse_zone};

use crate::render;

/// Place searched when `show` gets neither a query nor coordinates.
const DEFAULT_QUERY: &str = "Rexburg";

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "weather", version, about = "Current weather and 5-day forecast from OpenWeatherMap")]
pub struct Cli {
    /// Print debug logs to stderr.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Store the API key, display units and time zone.
    Configure,

    /// Show current weather and the daily forecast.
    Show {
        /// City name or ZIP, e.g. "new york" or "83440,us".
        #[arg(conflicts_with = "lat")]
        query: Vec<String>,

        /// Latitude; use together with --lon.
        #[arg(long, requires = "lon", allow_negative_numbers = true)]
        lat: Option<f64>,

        /// Longitude; use together with --lat.
        #[arg(long, requires = "lat", allow_negative_numbers = true)]
        lon: Option<f64>,

        /// Display units for this call: fahrenheit (f) or celsius (c).
        #[arg(long)]
        units: Option<String>,

        /// IANA time zone used to group the forecast into days.
        #[arg(long)]
        tz: Option<String>,

        /// Print the report as JSON.
        #[arg(long)]
        json: bool,

        /// Save the resolved location to favorites.
        #[arg(long)]
        save: bool,
    },

    /// Manage saved locations.
    Favorites {
        #[command(subcommand)]
        action: FavoritesAction,
    },
}

#[derive(Debug, Subcommand)]
pub enum FavoritesAction {
    /// List saved locations.
    List,
    /// Save a location label.
    Add { label: Vec<String> },
    /// Remove every saved location.
    Clear,
}

impl Cli {
    pub async fn run(self) -> anyhow::Result<()> {
        match self.command {
            Command::Configure => configure(),
            Command::Show { query, lat, lon, units, tz, json, save } => {
                let mut config = Config::load()?;
                if let Some(units) = units {
                    config.units = units.parse()?;
                }
                if let Some(tz) = tz {
                    config.timezone = tz;
                }

                let (report, zone) = search(&config, &query, lat.zip(lon)).await?;

                if json {
                    println!("{}", serde_json::to_string_pretty(&report)?);
                } else {
                    print!("{}", render::report(&report, zone));
                }

                if save {
                    // Reload so one-off --units/--tz overrides are not persisted.
                    let mut stored = Config::load()?;
                    if stored.add_favorite(&report.label) {
                        stored.save()?;
                        eprintln!("Saved favorite: {}", report.label);
                    } else {
                        eprintln!("Already in favorites");
                    }
                }
                Ok(())
            }
            Command::Favorites { action } => favorites(action),
        }
    }
}

async fn search(
    config: &Config,
    query: &[String],
    coordinates: Option<(f64, f64)>,
) -> anyhow::Result<(WeatherReport, Tz)> {
    let client = WeatherClient::from_config(config)?;
    let zone = client.settings().zone;

    let report = match coordinates {
        Some((lat, lon)) => client.search_by_coordinates(lat, lon).await?,
        None => {
            let text = query.join(" ");
            let text = if text.trim().is_empty() { DEFAULT_QUERY } else { text.as_str() };
            client.search_by_place_name(text).await?
        }
    };

    info!(label = %report.label, days = report.days.len(), "Loaded report");
    Ok((report, zone))
}

fn configure() -> anyhow::Result<()> {
    let mut config = Config::load()?;

    let api_key = Password::new("OpenWeatherMap API key (leave empty to keep the current one):")
        .without_confirmation()
        .with_display_mode(PasswordDisplayMode::Masked)
        .prompt()
        .context("Failed to read API key")?;
    let api_key = api_key.trim();
    if !api_key.is_empty() {
        config.set_api_key(api_key.to_string());
    } else if config.api_key.is_none() {
        anyhow::bail!("An API key is required. Get one at https://openweathermap.org/api");
    }

    let start = TemperatureUnit::all().iter().position(|u| *u == config.units).unwrap_or(0);
    config.units = Select::new("Display units:", TemperatureUnit::all().to_vec())
        .with_starting_cursor(start)
        .prompt()
        .context("Failed to read display units")?;

    let timezone = Text::new("Time zone for daily grouping:")
        .with_default(&config.timezone)
        .prompt()
        .context("Failed to read time zone")?;
    parse_zone(&timezone)?;
    config.timezone = timezone.trim().to_string();

    config.save()?;
    println!("Saved configuration to {}", Config::config_file_path()?.display());
    Ok(())
}

fn favorites(action: FavoritesAction) -> anyhow::Result<()> {
    let mut config = Config::load()?;

    match action {
        FavoritesAction::List => {
            if config.favorites.is_empty() {
                println!("No favorites saved.");
            }
            for (i, label) in config.favorites.iter().enumerate() {
                println!("{:>2}. {label}", i + 1);
            }
        }
        FavoritesAction::Add { label } => {
            let label = label.join(" ");
            if config.add_favorite(&label) {
                config.save()?;
                println!("Saved favorite: {}", label.trim());
            } else if label.trim().is_empty() {
                anyhow::bail!("Nothing to save");
            } else {
                println!("Already in favorites");
            }
        }
        FavoritesAction::Clear => {
            config.clear_favorites();
            config.save()?;
            println!("Cleared favorites");
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn show_joins_free_text_query() {
        let cli = Cli::parse_from(["weather", "show", "salt", "lake", "city", "--units", "c"]);
        match cli.command {
            Command::Show { query, units, lat, .. } => {
                assert_eq!(query.join(" "), "salt lake city");
                assert_eq!(units.as_deref(), Some("c"));
                assert_eq!(lat, None);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn show_accepts_negative_coordinates() {
        let cli = Cli::parse_from(["weather", "-v", "show", "--lat", "43.82", "--lon", "-111.79"]);
        assert!(cli.verbose);
        match cli.command {
            Command::Show { lat, lon, query, .. } => {
                assert_eq!(lat.zip(lon), Some((43.82, -111.79)));
                assert!(query.is_empty());
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn lat_requires_lon() {
        let err = Cli::try_parse_from(["weather", "show", "--lat", "43.82"]).unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::MissingRequiredArgument);
    }

    #[test]
    fn favorites_subcommands_parse() {
        let cli = Cli::parse_from(["weather", "favorites", "add", "Rexburg,", "US"]);
        match cli.command {
            Command::Favorites { action: FavoritesAction::Add { label } } => {
                assert_eq!(label.join(" "), "Rexburg, US");
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }
}
