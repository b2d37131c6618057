//! Configuration loading for the vivarium simulation: a small JSON file with
//! world, population, and run sections, all optional with sane defaults.

use serde::Deserialize;
use std::fs;
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse config file: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("invalid configuration: {0}")]
    Validation(String),
}

// --- Configuration Sections ---

#[derive(Deserialize, Debug, Clone)]
pub struct WorldSettings {
    #[serde(default = "default_width")]
    pub width: u32,
    #[serde(default = "default_height")]
    pub height: u32,
    #[serde(default = "default_sight_distance")]
    pub sight_distance: u32,
}

fn default_width() -> u32 {
    100
}
fn default_height() -> u32 {
    100
}
fn default_sight_distance() -> u32 {
    1
}

impl Default for WorldSettings {
    fn default() -> Self {
        Self {
            width: default_width(),
            height: default_height(),
            sight_distance: default_sight_distance(),
        }
    }
}

#[derive(Deserialize, Debug, Clone)]
pub struct PopulationSettings {
    #[serde(default = "default_people")]
    pub people: u32,
    #[serde(default = "default_food")]
    pub food: u32,
}

fn default_people() -> u32 {
    5
}
fn default_food() -> u32 {
    10
}

impl Default for PopulationSettings {
    fn default() -> Self {
        Self {
            people: default_people(),
            food: default_food(),
        }
    }
}

#[derive(Deserialize, Debug, Clone)]
pub struct RunSettings {
    #[serde(default = "default_ticks")]
    pub ticks: u64,
    /// RNG seed; omitted means a fresh seed from OS entropy per run.
    #[serde(default)]
    pub seed: Option<u64>,
}

fn default_ticks() -> u64 {
    1000
}

impl Default for RunSettings {
    fn default() -> Self {
        Self {
            ticks: default_ticks(),
            seed: None,
        }
    }
}

// --- Top-Level Config Struct ---

#[derive(Deserialize, Debug, Clone, Default)]
pub struct Config {
    #[serde(default)]
    pub world: WorldSettings,
    #[serde(default)]
    pub population: PopulationSettings,
    #[serde(default)]
    pub run: RunSettings,
}

impl Config {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.world.width == 0 || self.world.height == 0 {
            return Err(ConfigError::Validation(
                "world dimensions must be at least 1x1".to_string(),
            ));
        }
        if self.world.sight_distance == 0 {
            return Err(ConfigError::Validation(
                "sight_distance must be at least 1".to_string(),
            ));
        }
        if self.run.ticks == 0 {
            return Err(ConfigError::Validation(
                "ticks must be at least 1".to_string(),
            ));
        }
        // One occupant of each variant per cell: the grid cannot hold more
        // of a variant than it has cells.
        let cells = u64::from(self.world.width) * u64::from(self.world.height);
        if u64::from(self.population.people) > cells {
            return Err(ConfigError::Validation(format!(
                "cannot place {} people on a {} cell grid",
                self.population.people, cells
            )));
        }
        if u64::from(self.population.food) > cells {
            return Err(ConfigError::Validation(format!(
                "cannot place {} food on a {} cell grid",
                self.population.food, cells
            )));
        }
        Ok(())
    }
}

// --- Loading Function ---

pub fn load_config(path: &Path) -> Result<Config, ConfigError> {
    let content = fs::read_to_string(path)?;
    let config: Config = serde_json::from_str(&content)?;
    config.validate()?;
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn write_config(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, "{}", content).unwrap();
        file
    }

    #[test]
    fn load_valid_config() {
        let file = write_config(
            r#"{
              "world": { "width": 40, "height": 30, "sight_distance": 2 },
              "population": { "people": 8, "food": 12 },
              "run": { "ticks": 500, "seed": 7 }
            }"#,
        );
        let config = load_config(file.path()).unwrap();

        assert_eq!(config.world.width, 40);
        assert_eq!(config.world.height, 30);
        assert_eq!(config.world.sight_distance, 2);
        assert_eq!(config.population.people, 8);
        assert_eq!(config.population.food, 12);
        assert_eq!(config.run.ticks, 500);
        assert_eq!(config.run.seed, Some(7));
    }

    #[test]
    fn missing_sections_fall_back_to_defaults() {
        let file = write_config(r#"{ "population": { "people": 3 } }"#);
        let config = load_config(file.path()).unwrap();

        assert_eq!(config.world.width, 100);
        assert_eq!(config.world.height, 100);
        assert_eq!(config.world.sight_distance, 1);
        assert_eq!(config.population.people, 3);
        assert_eq!(config.population.food, 10);
        assert_eq!(config.run.ticks, 1000);
        assert_eq!(config.run.seed, None);
    }

    #[test]
    fn zero_dimensions_are_rejected() {
        let file = write_config(r#"{ "world": { "width": 0, "height": 10 } }"#);
        let result = load_config(file.path());
        assert!(matches!(result, Err(ConfigError::Validation(_))));
    }

    #[test]
    fn zero_ticks_are_rejected() {
        let file = write_config(r#"{ "run": { "ticks": 0 } }"#);
        let result = load_config(file.path());
        assert!(matches!(result, Err(ConfigError::Validation(_))));
    }

    #[test]
    fn overcrowded_population_is_rejected() {
        let file = write_config(
            r#"{
              "world": { "width": 3, "height": 3 },
              "population": { "people": 10, "food": 1 }
            }"#,
        );
        let result = load_config(file.path());
        assert!(matches!(result, Err(ConfigError::Validation(_))));
    }

    #[test]
    fn malformed_json_is_a_parse_error() {
        let file = write_config("{ not json");
        let result = load_config(file.path());
        assert!(matches!(result, Err(ConfigError::Parse(_))));
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let result = load_config(Path::new("/definitely/not/here.json"));
        assert!(matches!(result, Err(ConfigError::Io(_))));
    }
}
