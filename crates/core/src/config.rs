//! Layered service configuration.
//!
//! `AppConfig::load` starts from built-in defaults, merges an optional TOML
//! file, then `CUSTOMERS_*` environment variables, then programmatic
//! overrides, and validates the result. Every setting has a dotted name
//! (`server.port`) listed in [`SETTINGS`]; its environment variable is derived
//! from that name by [`env_key`].

use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const DEFAULT_CONFIG_FILE: &str = "customers.toml";

const ENV_PREFIX: &str = "CUSTOMERS_";

const LOG_LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error"];

/// Dotted names of every setting that can be overridden from the environment.
pub const SETTINGS: &[&str] = &[
    "database.url",
    "database.max_connections",
    "database.timeout_secs",
    "server.bind_address",
    "server.port",
    "server.graceful_shutdown_secs",
    "logging.level",
    "logging.format",
];

#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AppConfig {
    pub database: DatabaseConfig,
    pub server: ServerConfig,
    pub logging: LoggingConfig,
}

#[derive(Clone, Debug, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
    pub timeout_secs: u64,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self { url: "sqlite://customers.db".to_string(), max_connections: 5, timeout_secs: 30 }
    }
}

#[derive(Clone, Debug, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ServerConfig {
    pub bind_address: String,
    pub port: u16,
    pub graceful_shutdown_secs: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self { bind_address: "127.0.0.1".to_string(), port: 8080, graceful_shutdown_secs: 15 }
    }
}

#[derive(Clone, Debug, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LoggingConfig {
    pub level: String,
    pub format: LogFormat,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self { level: "info".to_string(), format: LogFormat::Compact }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogFormat {
    #[default]
    Compact,
    Pretty,
    Json,
}

impl LogFormat {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Compact => "compact",
            Self::Pretty => "pretty",
            Self::Json => "json",
        }
    }
}

impl FromStr for LogFormat {
    type Err = ConfigError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        [Self::Compact, Self::Pretty, Self::Json]
            .into_iter()
            .find(|format| format.as_str().eq_ignore_ascii_case(value.trim()))
            .ok_or_else(|| {
                ConfigError::Validation(format!(
                    "logging.format `{value}` is not one of compact|pretty|json"
                ))
            })
    }
}

/// Values that win over every other layer; used by tests and embedding code.
#[derive(Clone, Debug, Default)]
pub struct ConfigOverrides {
    pub database_url: Option<String>,
    pub log_level: Option<String>,
    pub bind_address: Option<String>,
    pub port: Option<u16>,
}

#[derive(Clone, Debug, Default)]
pub struct LoadOptions {
    pub config_path: Option<PathBuf>,
    pub require_file: bool,
    pub overrides: ConfigOverrides,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read `{path}`: {source}")]
    ReadFile { path: PathBuf, source: std::io::Error },
    #[error("failed to parse `{path}`: {source}")]
    ParseFile { path: PathBuf, source: toml::de::Error },
    #[error("config file `{0}` does not exist")]
    MissingConfigFile(PathBuf),
    #[error("`${{{var}}}` referenced in the config file is not set")]
    MissingEnvInterpolation { var: String },
    #[error("`${{` in the config file has no closing `}}`")]
    UnterminatedInterpolation,
    #[error("`{key}` has an unusable value `{value}`")]
    InvalidEnvOverride { key: String, value: String },
    #[error("invalid configuration: {0}")]
    Validation(String),
}

/// Environment variable that overrides `setting`, e.g. `server.port` ->
/// `CUSTOMERS_SERVER_PORT`.
pub fn env_key(setting: &str) -> String {
    format!("{ENV_PREFIX}{}", setting.replace('.', "_").to_ascii_uppercase())
}

/// Config file `load` would read for `explicit_path`, if one exists.
pub fn resolve_config_path(explicit_path: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = explicit_path {
        return path.exists().then(|| path.to_path_buf());
    }

    [PathBuf::from(DEFAULT_CONFIG_FILE), Path::new("config").join(DEFAULT_CONFIG_FILE)]
        .into_iter()
        .find(|candidate| candidate.exists())
}

struct InvalidValue;

fn parse<T: FromStr>(raw: &str) -> Result<T, InvalidValue> {
    raw.parse().map_err(|_| InvalidValue)
}

impl AppConfig {
    pub fn load(options: LoadOptions) -> Result<Self, ConfigError> {
        let mut config = match resolve_config_path(options.config_path.as_deref()) {
            Some(path) => Self::from_file(&path)?,
            None if options.require_file => {
                let expected = options.config_path.unwrap_or_else(|| DEFAULT_CONFIG_FILE.into());
                return Err(ConfigError::MissingConfigFile(expected));
            }
            None => Self::default(),
        };

        config.apply_env()?;
        config.apply_overrides(options.overrides);
        config.validate()?;
        Ok(config)
    }

    fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let raw = fs::read_to_string(path)
            .map_err(|source| ConfigError::ReadFile { path: path.to_path_buf(), source })?;
        toml::from_str(&expand_env(&raw)?)
            .map_err(|source| ConfigError::ParseFile { path: path.to_path_buf(), source })
    }

    /// Current value of a setting named in [`SETTINGS`], rendered as text.
    pub fn setting(&self, name: &str) -> Option<String> {
        let value = match name {
            "database.url" => self.database.url.clone(),
            "database.max_connections" => self.database.max_connections.to_string(),
            "database.timeout_secs" => self.database.timeout_secs.to_string(),
            "server.bind_address" => self.server.bind_address.clone(),
            "server.port" => self.server.port.to_string(),
            "server.graceful_shutdown_secs" => self.server.graceful_shutdown_secs.to_string(),
            "logging.level" => self.logging.level.clone(),
            "logging.format" => self.logging.format.as_str().to_string(),
            _ => return None,
        };
        Some(value)
    }

    fn set(&mut self, name: &str, raw: &str) -> Result<(), InvalidValue> {
        match name {
            "database.url" => self.database.url = raw.to_string(),
            "database.max_connections" => self.database.max_connections = parse(raw)?,
            "database.timeout_secs" => self.database.timeout_secs = parse(raw)?,
            "server.bind_address" => self.server.bind_address = raw.to_string(),
            "server.port" => self.server.port = parse(raw)?,
            "server.graceful_shutdown_secs" => self.server.graceful_shutdown_secs = parse(raw)?,
            "logging.level" => self.logging.level = raw.to_string(),
            "logging.format" => self.logging.format = parse(raw)?,
            _ => return Err(InvalidValue),
        }
        Ok(())
    }

    fn apply_env(&mut self) -> Result<(), ConfigError> {
        for setting in SETTINGS {
            let key = env_key(setting);
            let Some(value) = env::var(&key).ok().filter(|value| !value.trim().is_empty()) else {
                continue;
            };
            if self.set(setting, value.trim()).is_err() {
                return Err(ConfigError::InvalidEnvOverride { key, value });
            }
        }
        Ok(())
    }

    fn apply_overrides(&mut self, overrides: ConfigOverrides) {
        let ConfigOverrides { database_url, log_level, bind_address, port } = overrides;
        if let Some(url) = database_url {
            self.database.url = url;
        }
        if let Some(level) = log_level {
            self.logging.level = level;
        }
        if let Some(address) = bind_address {
            self.server.bind_address = address;
        }
        self.server.port = port.unwrap_or(self.server.port);
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let url = self.database.url.trim();
        let level = self.logging.level.trim().to_ascii_lowercase();
        let rules = [
            (
                url.starts_with("sqlite:") || url == ":memory:",
                "database.url must be a sqlite URL such as `sqlite://customers.db`",
            ),
            (self.database.max_connections > 0, "database.max_connections must be at least 1"),
            (
                (1..=300).contains(&self.database.timeout_secs),
                "database.timeout_secs must be between 1 and 300",
            ),
            (!self.server.bind_address.trim().is_empty(), "server.bind_address is empty"),
            (self.server.port != 0, "server.port must not be 0"),
            (
                self.server.graceful_shutdown_secs > 0,
                "server.graceful_shutdown_secs must be at least 1",
            ),
            (
                LOG_LEVELS.contains(&level.as_str()),
                "logging.level must be trace|debug|info|warn|error",
            ),
        ];

        match rules.iter().find(|(holds, _)| !holds) {
            Some((_, message)) => Err(ConfigError::Validation(message.to_string())),
            None => Ok(()),
        }
    }
}

/// Replaces each `${VAR}` in a config file with the value of `VAR`.
fn expand_env(raw: &str) -> Result<String, ConfigError> {
    let mut expanded = String::with_capacity(raw.len());
    let mut rest = raw;

    while let Some(start) = rest.find("${") {
        expanded.push_str(&rest[..start]);
        let tail = &rest[start + 2..];
        let end = tail.find('}').ok_or(ConfigError::UnterminatedInterpolation)?;
        let var = &tail[..end];
        let value = env::var(var)
            .map_err(|_| ConfigError::MissingEnvInterpolation { var: var.to_string() })?;
        expanded.push_str(&value);
        rest = &tail[end + 1..];
    }

    expanded.push_str(rest);
    Ok(expanded)
}
