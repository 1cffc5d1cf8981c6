use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Deserializer};
use thiserror::Error;

use crate::predict::{GroundStation, DEFAULT_TRAJECTORY_STEP_SECONDS};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("YAML parse error: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("invalid station location: {0}")]
    InvalidLocation(String),
}

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub station: StationConfig,
    #[serde(default)]
    pub web: WebConfig,
    #[serde(default)]
    pub predict: Option<PredictConfig>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct WebConfig {
    #[serde(default = "default_bind")]
    pub bind: String,
}

impl Default for WebConfig {
    fn default() -> Self {
        Self {
            bind: default_bind(),
        }
    }
}

fn default_bind() -> String {
    "0.0.0.0:8080".to_string()
}

#[derive(Debug, Clone, Deserialize)]
pub struct StationConfig {
    pub name: Option<String>,
    /// `"lat,lon"` or a Maidenhead locator.
    pub location: String,
    #[serde(default)]
    pub altitude_m: f64,
}

impl StationConfig {
    pub fn ground_station(&self) -> Result<GroundStation, ConfigError> {
        GroundStation::from_coordinates(&self.location, Some(self.altitude_m))
            .ok_or_else(|| ConfigError::InvalidLocation(self.location.clone()))
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct PredictConfig {
    pub tle_folder: PathBuf,
    #[serde(default)]
    pub default_min_elevation: f64,
    #[serde(default = "default_window", deserialize_with = "deserialize_duration")]
    pub default_window: Duration,
    #[serde(
        default = "default_trajectory_step",
        deserialize_with = "deserialize_duration"
    )]
    pub trajectory_step: Duration,
    /// Longest search window a request may ask for.
    #[serde(default = "default_max_window", deserialize_with = "deserialize_duration")]
    pub max_window: Duration,
}

fn default_window() -> Duration {
    Duration::from_secs(7 * 24 * 3600)
}

fn default_max_window() -> Duration {
    Duration::from_secs(14 * 24 * 3600)
}

fn default_trajectory_step() -> Duration {
    Duration::from_secs(DEFAULT_TRAJECTORY_STEP_SECONDS as u64)
}

fn deserialize_duration<'de, D>(deserializer: D) -> Result<Duration, D::Error>
where
    D: Deserializer<'de>,
{
    let s = String::deserialize(deserializer)?;
    humantime::parse_duration(s.trim()).map_err(serde::de::Error::custom)
}

impl Config {
    pub fn from_file(path: &str) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml(&content)
    }

    /// Parse and validate; the station location must resolve.
    pub fn from_yaml(yaml: &str) -> Result<Self, ConfigError> {
        let config: Config = serde_yaml::from_str(yaml)?;
        config.station.ground_station()?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn full_config() {
        let config = Config::from_yaml(
            r#"
station:
  name: Lisbon
  location: "38.7223,-9.1393"
  altitude_m: 50
web:
  bind: 127.0.0.1:9000
predict:
  tle_folder: ./tle
  default_min_elevation: 10
  default_window: 3d
  trajectory_step: 15s
  max_window: 10d
"#,
        )
        .unwrap();

        assert_eq!(config.station.name.as_deref(), Some("Lisbon"));
        assert_eq!(config.web.bind, "127.0.0.1:9000");
        let predict = config.predict.unwrap();
        assert_eq!(predict.tle_folder, PathBuf::from("./tle"));
        assert_eq!(predict.default_min_elevation, 10.0);
        assert_eq!(predict.default_window, Duration::from_secs(3 * 86400));
        assert_eq!(predict.trajectory_step, Duration::from_secs(15));
        assert_eq!(predict.max_window, Duration::from_secs(10 * 86400));
    }

    #[test]
    fn defaults_and_locator_station() {
        let config = Config::from_yaml("station:\n  location: IM58kr\n").unwrap();
        assert_eq!(config.web.bind, "0.0.0.0:8080");
        assert!(config.predict.is_none());
        let station = config.station.ground_station().unwrap();
        assert!((station.latitude_deg - 38.729).abs() < 0.01);
        assert_eq!(station.altitude_m, 0.0);

        let config =
            Config::from_yaml("station:\n  location: IM58\npredict:\n  tle_folder: tle\n").unwrap();
        let predict = config.predict.unwrap();
        assert_eq!(predict.default_window, Duration::from_secs(7 * 86400));
        assert_eq!(predict.trajectory_step, Duration::from_secs(30));
        assert_eq!(predict.max_window, Duration::from_secs(14 * 86400));
    }

    #[test]
    fn rejects_bad_location() {
        let err = Config::from_yaml("station:\n  location: nowhere\n").unwrap_err();
        assert!(matches!(err, ConfigError::InvalidLocation(_)));
    }

    #[test]
    fn rejects_bad_duration() {
        let err = Config::from_yaml(
            "station:\n  location: IM58\npredict:\n  tle_folder: tle\n  default_window: soon\n",
        )
        .unwrap_err();
        assert!(matches!(err, ConfigError::Yaml(_)));
    }
}
