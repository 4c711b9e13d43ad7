use std::collections::HashMap;
use std::env;
use std::fs;
use std::path::PathBuf;
use anyhow::{Context, Result};
use toml::Value;
use log::{debug, info};
use crate::plugin::ReportsConfig;

/// Configuration storage - section_name -> key -> value
pub type Configuration = HashMap<String, HashMap<String, Value>>;

/// Environment variable naming an explicit configuration file
pub const CONFIG_ENV_VAR: &str = "BACKUP_REPORTS_CONFIG";

/// Configuration manager
pub struct ConfigManager {
    config: Configuration,
    config_file_path: Option<PathBuf>,
}

impl ConfigManager {
    /// Create a new ConfigManager from a Configuration (primarily for testing)
    pub fn from_config(config: Configuration) -> Self {
        Self {
            config,
            config_file_path: None,
        }
    }

    /// Load configuration using discovery hierarchy
    pub fn load() -> Result<Self> {
        debug!("Starting configuration discovery");

        for path in discover_config_files() {
            debug!("Attempting to load config from: {}", path.display());
            if path.exists() {
                return Self::load_from_file(path);
            }
        }

        info!("No configuration file found, using empty configuration");
        Ok(Self::from_config(Configuration::new()))
    }

    /// Load configuration from explicit file path
    pub fn load_from_file(path: PathBuf) -> Result<Self> {
        debug!("Loading configuration from file: {}", path.display());

        let content = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config = parse_toml_config(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        info!("Loaded configuration from: {}", path.display());
        Ok(Self {
            config,
            config_file_path: Some(path),
        })
    }

    pub fn config_file_path(&self) -> Option<&PathBuf> {
        self.config_file_path.as_ref()
    }

    fn get_raw(&self, section: &str, key: &str) -> Option<&Value> {
        self.config.get(section).and_then(|s| s.get(key))
    }

    /// Get a scalar value as a string
    pub fn get_value(&self, section: &str, key: &str) -> Option<String> {
        self.get_raw(section, key).map(toml_value_to_string)
    }

    /// Get a list of strings; a single string counts as a one-element list
    pub fn get_string_list(&self, section: &str, key: &str) -> Result<Option<Vec<String>>> {
        match self.get_raw(section, key) {
            None => Ok(None),
            Some(Value::String(s)) => Ok(Some(vec![s.clone()])),
            Some(Value::Array(items)) => items
                .iter()
                .map(|item| match item {
                    Value::String(s) => Ok(s.clone()),
                    other => Err(anyhow::anyhow!(
                        "Invalid entry in {}.{}: expected a string, got {}", section, key, other
                    )),
                })
                .collect::<Result<Vec<_>>>()
                .map(Some),
            Some(other) => Err(anyhow::anyhow!(
                "Invalid value for {}.{}: expected a list of strings, got {}", section, key, other
            )),
        }
    }

    /// Get log level value with type conversion
    pub fn get_log_level(&self, section: &str, key: &str) -> Result<Option<log::LevelFilter>> {
        match self.get_value(section, key) {
            Some(value) => Ok(Some(crate::logging::parse_log_level(&value)?)),
            None => Ok(None),
        }
    }

    /// Get path value with type conversion
    pub fn get_path(&self, section: &str, key: &str) -> Option<PathBuf> {
        self.get_value(section, key).map(PathBuf::from)
    }

    /// Recipients from the `[reports]` section, if present
    pub fn get_reports_config(&self) -> Result<Option<ReportsConfig>> {
        let to = match self.get_string_list("reports", "to")? {
            Some(to) => to,
            None => return Ok(None),
        };

        let config = ReportsConfig { to };
        config.validate()
            .with_context(|| "Reports configuration validation failed")?;
        Ok(Some(config))
    }
}

/// Discover configuration files in order of precedence
fn discover_config_files() -> Vec<PathBuf> {
    let mut paths = Vec::new();

    if let Ok(env_path) = env::var(CONFIG_ENV_VAR) {
        paths.push(PathBuf::from(env_path));
    }

    if let Some(config_dir) = dirs::config_dir() {
        paths.push(config_dir.join("backup-reports").join("config.toml"));
    }

    if let Some(home_dir) = dirs::home_dir() {
        paths.push(home_dir.join(".backup-reports.toml"));
    }

    paths.push(PathBuf::from("./.backup-reports.toml"));

    debug!("Config discovery paths: {:?}", paths);
    paths
}

/// Parse TOML content into sections
fn parse_toml_config(content: &str) -> Result<Configuration> {
    let toml_value: Value = content.parse()
        .context("Failed to parse TOML content")?;

    let mut config = Configuration::new();

    if let Value::Table(table) = toml_value {
        flatten_toml_table(&table, String::new(), &mut config);
    }

    debug!("Parsed configuration: {:?}", config);
    Ok(config)
}

/// Recursively flatten TOML tables into section.subsection format
fn flatten_toml_table(table: &toml::Table, prefix: String, config: &mut Configuration) {
    for (key, value) in table {
        let section_name = if prefix.is_empty() {
            key.clone()
        } else {
            format!("{}.{}", prefix, key)
        };

        match value {
            Value::Table(subtable) if subtable.values().all(|v| !matches!(v, Value::Table(_))) => {
                let section = subtable
                    .iter()
                    .map(|(subkey, subvalue)| (subkey.clone(), subvalue.clone()))
                    .collect();
                config.insert(section_name, section);
            }
            Value::Table(subtable) => flatten_toml_table(subtable, section_name, config),
            _ => {
                // Top-level key outside any table
                config
                    .entry(if prefix.is_empty() { "base".to_string() } else { prefix.clone() })
                    .or_default()
                    .insert(key.clone(), value.clone());
            }
        }
    }
}

/// Convert TOML Value to string representation
fn toml_value_to_string(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Integer(i) => i.to_string(),
        Value::Float(f) => f.to_string(),
        Value::Boolean(b) => b.to_string(),
        other => other.to_string(),
    }
}
