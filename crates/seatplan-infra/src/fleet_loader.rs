//! Fleet override loaded from TOML
//!
//! ```toml
//! [[vehicles]]
//! name = "Mercedes Sprinter"
//! capacity = 19
//! ```

use std::fs;
use std::path::Path;

use serde::Deserialize;

use seatplan_domain::model::{Fleet, Vehicle};
use seatplan_types::{ConfigError, Error, Result};

/// Container for parsing fleet.toml
#[derive(Debug, Deserialize)]
struct FleetFile {
    vehicles: Vec<Vehicle>,
}

pub struct FleetLoader;

impl FleetLoader {
    pub fn load_from_file(path: &Path) -> Result<Fleet> {
        let content = fs::read_to_string(path).map_err(|e| {
            Error::Config(ConfigError::ParseError(format!(
                "Failed to read fleet file {}: {}",
                path.display(),
                e
            )))
        })?;

        Self::load_from_str(&content)
    }

    pub fn load_from_str(toml_content: &str) -> Result<Fleet> {
        let file: FleetFile = toml::from_str(toml_content).map_err(|e| {
            Error::Config(ConfigError::ParseError(format!(
                "Failed to parse fleet TOML: {}",
                e
            )))
        })?;

        Ok(Fleet::new(file.vehicles)?)
    }
}
