use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

const KELVIN_OFFSET: f64 = 273.15;

pub fn kelvin_to_celsius(k: f64) -> f64 {
    k - KELVIN_OFFSET
}

pub fn kelvin_to_fahrenheit(k: f64) -> f64 {
    kelvin_to_celsius(k) * 9.0 / 5.0 + 32.0
}

/// Unit temperatures are displayed in. The provider always reports Kelvin.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TemperatureUnit {
    #[default]
    Fahrenheit,
    Celsius,
}

impl TemperatureUnit {
    pub fn convert_kelvin(self, k: f64) -> f64 {
        match self {
            TemperatureUnit::Fahrenheit => kelvin_to_fahrenheit(k),
            TemperatureUnit::Celsius => kelvin_to_celsius(k),
        }
    }

    pub fn symbol(self) -> &'static str {
        match self {
            TemperatureUnit::Fahrenheit => "°F",
            TemperatureUnit::Celsius => "°C",
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            TemperatureUnit::Fahrenheit => "fahrenheit",
            TemperatureUnit::Celsius => "celsius",
        }
    }

    pub const fn all() -> &'static [TemperatureUnit] {
        &[TemperatureUnit::Fahrenheit, TemperatureUnit::Celsius]
    }
}

impl fmt::Display for TemperatureUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TemperatureUnit {
    type Err = anyhow::Error;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.to_lowercase().as_str() {
            "f" | "fahrenheit" | "imperial" => Ok(TemperatureUnit::Fahrenheit),
            "c" | "celsius" | "metric" => Ok(TemperatureUnit::Celsius),
            _ => Err(anyhow::anyhow!(
                "Unknown unit '{value}'. Supported units: fahrenheit (f), celsius (c)."
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_close(actual: f64, expected: f64) {
        assert!((actual - expected).abs() < 1e-9, "{actual} != {expected}");
    }

    #[test]
    fn freezing_point() {
        assert_close(kelvin_to_celsius(273.15), 0.0);
        assert_close(kelvin_to_fahrenheit(273.15), 32.0);
    }

    #[test]
    fn known_values() {
        assert_close(kelvin_to_fahrenheit(300.0), 80.33);
        assert_close(kelvin_to_celsius(0.0), -273.15);
        assert_close(kelvin_to_fahrenheit(0.0), -459.67);
    }

    #[test]
    fn fahrenheit_follows_celsius_formula() {
        let mut k = 0.0;
        while k < 400.0 {
            assert_eq!(kelvin_to_fahrenheit(k), (k - 273.15) * 9.0 / 5.0 + 32.0);
            k += 7.3;
        }
    }

    #[test]
    fn unit_dispatch_and_parsing() {
        assert_close(TemperatureUnit::Celsius.convert_kelvin(300.0), 26.85);
        assert_close(TemperatureUnit::Fahrenheit.convert_kelvin(300.0), 80.33);

        for unit in TemperatureUnit::all() {
            assert_eq!(unit.as_str().parse::<TemperatureUnit>().unwrap(), *unit);
        }
        assert_eq!("C".parse::<TemperatureUnit>().unwrap(), TemperatureUnit::Celsius);
        assert_eq!("imperial".parse::<TemperatureUnit>().unwrap(), TemperatureUnit::Fahrenheit);

        let err = "rankine".parse::<TemperatureUnit>().unwrap_err();
        assert!(err.to_string().contains("Unknown unit"));
    }
}
