//! Discrete weather conditions and their effect parameters.
//!
//! The condition is what the simulation tracks; [`WeatherParameters`] are the
//! continuous intensities rendering and audio consume. Parameters are always
//! derived from a condition through the [`EffectParameterTable`].

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use stormrunner_core::error::validate_unit;
use stormrunner_core::{lerp, ConfigError};

/// Weather condition tracked by the state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum WeatherCondition {
    /// Clear skies, no precipitation.
    #[default]
    Clear,
    /// Drizzle with a light breeze.
    LightRain,
    /// Sustained rain, gusty wind, occasional lightning risk.
    HeavyRain,
    /// Full storm; the only condition that produces lightning strikes.
    Storm,
}

impl WeatherCondition {
    /// Every condition, in table order.
    pub const ALL: [WeatherCondition; 4] = [
        WeatherCondition::Clear,
        WeatherCondition::LightRain,
        WeatherCondition::HeavyRain,
        WeatherCondition::Storm,
    ];

    /// Conditions the cycle driver picks from when it rolls for bad weather.
    pub const STORM_FAMILY: [WeatherCondition; 3] = [
        WeatherCondition::LightRain,
        WeatherCondition::HeavyRain,
        WeatherCondition::Storm,
    ];

    /// Stable snake_case name.
    pub fn name(self) -> &'static str {
        match self {
            WeatherCondition::Clear => "clear",
            WeatherCondition::LightRain => "light_rain",
            WeatherCondition::HeavyRain => "heavy_rain",
            WeatherCondition::Storm => "storm",
        }
    }

    /// Check if the condition carries precipitation.
    pub fn is_precipitating(self) -> bool {
        !matches!(self, WeatherCondition::Clear)
    }

    /// Check if lightning strikes should run.
    pub fn is_storm(self) -> bool {
        self == WeatherCondition::Storm
    }

    fn index(self) -> usize {
        match self {
            WeatherCondition::Clear => 0,
            WeatherCondition::LightRain => 1,
            WeatherCondition::HeavyRain => 2,
            WeatherCondition::Storm => 3,
        }
    }
}

impl fmt::Display for WeatherCondition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for WeatherCondition {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase().replace('-', "_");
        match normalized.as_str() {
            "clear" | "sun" | "sunny" => Ok(WeatherCondition::Clear),
            "light_rain" | "lightrain" | "drizzle" => Ok(WeatherCondition::LightRain),
            "heavy_rain" | "heavyrain" | "rain" => Ok(WeatherCondition::HeavyRain),
            "storm" | "thunderstorm" | "thunder" => Ok(WeatherCondition::Storm),
            _ => Err(ConfigError::UnknownCondition(s.to_string())),
        }
    }
}

impl TryFrom<u8> for WeatherCondition {
    type Error = ConfigError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        WeatherCondition::ALL
            .get(usize::from(value))
            .copied()
            .ok_or_else(|| ConfigError::UnknownCondition(value.to_string()))
    }
}

/// Continuous effect intensities, each in `[0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct WeatherParameters {
    /// Precipitation strength.
    pub rain_intensity: f32,
    /// Wind strength.
    pub wind_intensity: f32,
    /// How lightning-prone the sky looks (drives light dimming).
    pub lightning_proneness: f32,
}

impl WeatherParameters {
    /// Calm parameters (all zero).
    pub const CALM: Self = Self::new(0.0, 0.0, 0.0);

    /// Build a parameter tuple.
    pub const fn new(rain_intensity: f32, wind_intensity: f32, lightning_proneness: f32) -> Self {
        Self {
            rain_intensity,
            wind_intensity,
            lightning_proneness,
        }
    }

    /// Component-wise interpolation.
    pub fn lerp(self, target: Self, t: f32) -> Self {
        Self {
            rain_intensity: lerp(self.rain_intensity, target.rain_intensity, t),
            wind_intensity: lerp(self.wind_intensity, target.wind_intensity, t),
            lightning_proneness: lerp(self.lightning_proneness, target.lightning_proneness, t),
        }
    }

    /// Values as `[rain, wind, lightning]`.
    pub fn to_array(self) -> [f32; 3] {
        [
            self.rain_intensity,
            self.wind_intensity,
            self.lightning_proneness,
        ]
    }

    /// Reject any component outside `[0, 1]`.
    pub fn validate(&self) -> Result<(), ConfigError> {
        validate_unit("rain_intensity", self.rain_intensity)?;
        validate_unit("wind_intensity", self.wind_intensity)?;
        validate_unit("lightning_proneness", self.lightning_proneness)?;
        Ok(())
    }
}

/// Lookup from condition to target parameters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EffectParameterTable {
    /// Targets for [`WeatherCondition::Clear`].
    pub clear: WeatherParameters,
    /// Targets for [`WeatherCondition::LightRain`].
    pub light_rain: WeatherParameters,
    /// Targets for [`WeatherCondition::HeavyRain`].
    pub heavy_rain: WeatherParameters,
    /// Targets for [`WeatherCondition::Storm`].
    pub storm: WeatherParameters,
}

impl EffectParameterTable {
    /// The stock intensities.
    pub const STANDARD: Self = Self {
        clear: WeatherParameters::CALM,
        light_rain: WeatherParameters::new(0.3, 0.2, 0.0),
        heavy_rain: WeatherParameters::new(0.7, 0.5, 0.3),
        storm: WeatherParameters::new(1.0, 1.0, 1.0),
    };

    /// Target parameters for `condition`.
    pub fn get(&self, condition: WeatherCondition) -> WeatherParameters {
        self.entries()[condition.index()]
    }

    /// Every entry must lie within `[0, 1]`.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.entries().iter().try_for_each(WeatherParameters::validate)
    }

    fn entries(&self) -> [WeatherParameters; 4] {
        [self.clear, self.light_rain, self.heavy_rain, self.storm]
    }
}

impl Default for EffectParameterTable {
    fn default() -> Self {
        Self::STANDARD
    }
}

/// Event emitted when a transition settles on a new condition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WeatherChanged {
    /// Previous resting condition.
    pub from: WeatherCondition,
    /// New resting condition.
    pub to: WeatherCondition,
}

impl WeatherChanged {
    /// Create a weather change event.
    pub fn new(from: WeatherCondition, to: WeatherCondition) -> Self {
        Self { from, to }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_condition_is_clear() {
        assert_eq!(WeatherCondition::default(), WeatherCondition::Clear);
        assert!(!WeatherCondition::Clear.is_precipitating());
        assert!(WeatherCondition::LightRain.is_precipitating());
        assert!(WeatherCondition::Storm.is_storm());
    }

    #[test]
    fn conditions_parse_from_names() {
        assert_eq!("clear".parse(), Ok(WeatherCondition::Clear));
        assert_eq!("Light-Rain".parse(), Ok(WeatherCondition::LightRain));
        assert_eq!("heavy_rain".parse(), Ok(WeatherCondition::HeavyRain));
        assert_eq!(" thunderstorm ".parse(), Ok(WeatherCondition::Storm));
        assert_eq!(
            "hail".parse::<WeatherCondition>(),
            Err(ConfigError::UnknownCondition("hail".into()))
        );
    }

    #[test]
    fn conditions_from_index_reject_out_of_range() {
        assert_eq!(WeatherCondition::try_from(3u8), Ok(WeatherCondition::Storm));
        assert!(matches!(
            WeatherCondition::try_from(4u8),
            Err(ConfigError::UnknownCondition(_))
        ));
    }

    #[test]
    fn names_round_trip_through_display() {
        for condition in WeatherCondition::ALL {
            assert_eq!(condition.to_string().parse(), Ok(condition));
        }
    }

    #[test]
    fn standard_table_matches_stock_intensities() {
        let table = EffectParameterTable::default();
        assert_eq!(table.get(WeatherCondition::Clear), WeatherParameters::CALM);
        assert_eq!(
            table.get(WeatherCondition::HeavyRain),
            WeatherParameters::new(0.7, 0.5, 0.3)
        );
        assert_eq!(
            table.get(WeatherCondition::Storm),
            WeatherParameters::new(1.0, 1.0, 1.0)
        );
        assert!(table.validate().is_ok());
    }

    #[test]
    fn table_rejects_out_of_range_entries() {
        let table = EffectParameterTable {
            storm: WeatherParameters::new(1.2, 1.0, 1.0),
            ..EffectParameterTable::STANDARD
        };
        assert!(matches!(
            table.validate(),
            Err(ConfigError::OutOfUnitRange {
                name: "rain_intensity",
                ..
            })
        ));
    }

    #[test]
    fn parameters_interpolate_componentwise() {
        let a = WeatherParameters::CALM;
        let b = WeatherParameters::new(1.0, 0.5, 0.0);
        assert_eq!(a.lerp(b, 0.5), WeatherParameters::new(0.5, 0.25, 0.0));
    }

    #[test]
    fn weather_changed_event_tracks_transition() {
        let event = WeatherChanged::new(WeatherCondition::Clear, WeatherCondition::Storm);
        assert_eq!(event.from, WeatherCondition::Clear);
        assert_eq!(event.to, WeatherCondition::Storm);
    }
}
