//! Configuration management for seatplan
//!
//! Config stored at: ~/.config/seatplan/config.json

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use seatplan_domain::service::DEFAULT_BATCH_SIZE;
use seatplan_infra::{LoadOptions, RosterColumns};
use seatplan_planner::PlannerConfig;
use seatplan_types::{ConfigError, OutputFormat, Result, Strategy};

/// Fixed start and end of every route
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RouteEndpoints {
    #[serde(default)]
    pub origin: String,
    #[serde(default)]
    pub destination: String,
}

/// Application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Grouping strategy (greedy, llm)
    #[serde(default)]
    pub strategy: Strategy,

    /// Students per assigner call
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,

    /// Chat-completions endpoint for the llm strategy
    #[serde(default = "default_llm_endpoint")]
    pub llm_endpoint: String,

    #[serde(default = "default_model")]
    pub model: String,

    #[serde(default = "default_temperature")]
    pub temperature: f32,

    /// Environment variable holding the API key
    #[serde(default = "default_api_key_env")]
    pub api_key_env: String,

    /// Directions URL prefix; stops are appended as path segments
    #[serde(default = "default_maps_base_url")]
    pub maps_base_url: String,

    /// Route endpoints when no per-file rule matches
    #[serde(default)]
    pub default_route: RouteEndpoints,

    /// Route endpoints keyed by roster file index
    #[serde(default)]
    pub file_routes: BTreeMap<usize, RouteEndpoints>,

    /// Roster header names
    #[serde(default)]
    pub columns: RosterColumns,

    #[serde(default = "default_true")]
    pub strip_accents: bool,

    /// Default output format (json, table)
    #[serde(default)]
    pub output_format: OutputFormat,
}

fn default_batch_size() -> usize {
    DEFAULT_BATCH_SIZE
}

fn default_llm_endpoint() -> String {
    PlannerConfig::default().endpoint
}

fn default_model() -> String {
    PlannerConfig::default().model
}

fn default_temperature() -> f32 {
    PlannerConfig::default().temperature
}

fn default_api_key_env() -> String {
    "OPENAI_API_KEY".to_string()
}

fn default_maps_base_url() -> String {
    "https://www.google.com/maps/dir".to_string()
}

fn default_true() -> bool {
    true
}

impl Default for Config {
    fn default() -> Self {
        Self {
            strategy: Strategy::default(),
            batch_size: default_batch_size(),
            llm_endpoint: default_llm_endpoint(),
            model: default_model(),
            temperature: default_temperature(),
            api_key_env: default_api_key_env(),
            maps_base_url: default_maps_base_url(),
            default_route: RouteEndpoints::default(),
            file_routes: BTreeMap::new(),
            columns: RosterColumns::default(),
            strip_accents: true,
            output_format: OutputFormat::default(),
        }
    }
}

impl Config {
    /// Get the config directory path
    pub fn config_dir() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or(ConfigError::NotFound)?
            .join("seatplan");
        Ok(config_dir)
    }

    /// Get the config file path
    pub fn config_path() -> Result<PathBuf> {
        Ok(Self::config_dir()?.join("config.json"))
    }

    /// Load config from the default location, or defaults
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_path()?)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if path.exists() {
            let content = std::fs::read_to_string(path)?;
            let config: Config = serde_json::from_str(&content)
                .map_err(|e| ConfigError::ParseError(format!("{}: {}", path.display(), e)))?;
            config.validate()?;
            Ok(config)
        } else {
            Ok(Config::default())
        }
    }

    /// Save config to the default location
    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_path()?)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        self.validate()?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    pub fn validate(&self) -> std::result::Result<(), ConfigError> {
        if self.batch_size == 0 {
            return Err(ConfigError::Invalid("batch_size must be at least 1".to_string()));
        }
        if !(0.0..=2.0).contains(&self.temperature) {
            return Err(ConfigError::Invalid(format!(
                "temperature {} is outside 0.0-2.0",
                self.temperature
            )));
        }
        Ok(())
    }

    /// Read the API key from the configured environment variable
    pub fn api_key(&self) -> std::result::Result<String, ConfigError> {
        std::env::var(&self.api_key_env)
            .ok()
            .filter(|k| !k.trim().is_empty())
            .ok_or_else(|| ConfigError::MissingApiKey(self.api_key_env.clone()))
    }

    pub fn load_options(&self) -> LoadOptions {
        LoadOptions {
            columns: self.columns.clone(),
            strip_accents: self.strip_accents,
        }
    }

    pub fn planner_config(&self) -> PlannerConfig {
        PlannerConfig::default()
            .with_endpoint(&self.llm_endpoint)
            .with_model(Some(self.model.clone()))
            .with_temperature(self.temperature)
    }

    /// Endpoints for a route whose first stop came from roster file `source_index`
    pub fn route_for(&self, source_index: usize) -> &RouteEndpoints {
        self.file_routes
            .get(&source_index)
            .unwrap_or(&self.default_route)
    }
}

fn or_unset(value: &str) -> &str {
    if value.is_empty() {
        "(unset)"
    } else {
        value
    }
}

impl std::fmt::Display for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Seatplan Configuration")?;
        writeln!(f, "======================")?;
        writeln!(f)?;
        writeln!(f, "Strategy:       {}", self.strategy)?;
        writeln!(f, "Batch size:     {}", self.batch_size)?;
        writeln!(f, "LLM endpoint:   {}", self.llm_endpoint)?;
        writeln!(f, "Model:          {}", self.model)?;
        writeln!(f, "Temperature:    {}", self.temperature)?;
        writeln!(f, "API key env:    {}", self.api_key_env)?;
        writeln!(f, "Maps base URL:  {}", self.maps_base_url)?;
        writeln!(
            f,
            "Default route:  {} -> {}",
            or_unset(&self.default_route.origin),
            or_unset(&self.default_route.destination)
        )?;
        for (index, route) in &self.file_routes {
            writeln!(
                f,
                "File {} route:   {} -> {}",
                index,
                or_unset(&route.origin),
                or_unset(&route.destination)
            )?;
        }
        writeln!(f, "Strip accents:  {}", self.strip_accents)?;
        writeln!(f, "Output format:  {}", self.output_format)?;

        if let Ok(path) = Self::config_path() {
            writeln!(f)?;
            writeln!(f, "Config file:    {}", path.display())?;
        }

        Ok(())
    }
}
