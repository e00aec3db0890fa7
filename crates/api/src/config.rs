use serde::Deserialize;
use std::net::SocketAddr;

use domain::services::CoordinationSettings;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub logging: LoggingConfig,
    #[serde(default)]
    pub security: SecurityConfig,
    #[serde(default)]
    pub coordination: CoordinationConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,

    #[serde(default = "default_max_connections")]
    pub max_connections: u32,

    #[serde(default = "default_min_connections")]
    pub min_connections: u32,

    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_secs: u64,

    #[serde(default = "default_idle_timeout")]
    pub idle_timeout_secs: u64,
}

impl From<&DatabaseConfig> for persistence::db::DatabaseConfig {
    fn from(c: &DatabaseConfig) -> Self {
        Self {
            url: c.url.clone(),
            max_connections: c.max_connections,
            min_connections: c.min_connections,
            connect_timeout_secs: c.connect_timeout_secs,
            idle_timeout_secs: c.idle_timeout_secs,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,

    /// `json` or `pretty`
    #[serde(default = "default_log_format")]
    pub format: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SecurityConfig {
    /// Empty allows any origin.
    #[serde(default)]
    pub cors_origins: Vec<String>,

    /// Only enable behind TLS termination.
    #[serde(default)]
    pub hsts_enabled: bool,
}

/// Group-coordination rules and the expiry sweep cadence.
#[derive(Debug, Clone, Deserialize)]
pub struct CoordinationConfig {
    #[serde(default = "default_interest_threshold")]
    pub interest_threshold: usize,

    #[serde(default = "default_chat_quorum")]
    pub chat_quorum: usize,

    #[serde(default = "default_action_item_ttl_days")]
    pub action_item_ttl_days: i64,

    #[serde(default = "default_highlight_threshold")]
    pub highlight_threshold: usize,

    /// Zero disables the background sweep.
    #[serde(default = "default_expire_sweep_minutes")]
    pub expire_sweep_minutes: u64,
}

impl Default for CoordinationConfig {
    fn default() -> Self {
        Self {
            interest_threshold: default_interest_threshold(),
            chat_quorum: default_chat_quorum(),
            action_item_ttl_days: default_action_item_ttl_days(),
            highlight_threshold: default_highlight_threshold(),
            expire_sweep_minutes: default_expire_sweep_minutes(),
        }
    }
}

impl CoordinationConfig {
    pub fn settings(&self) -> CoordinationSettings {
        CoordinationSettings {
            interest_threshold: self.interest_threshold,
            chat_quorum: self.chat_quorum,
            action_item_ttl_days: self.action_item_ttl_days,
            highlight_threshold: self.highlight_threshold,
        }
    }
}

// Default value functions
fn default_host() -> String {
    "0.0.0.0".to_string()
}
fn default_port() -> u16 {
    8080
}
fn default_request_timeout() -> u64 {
    30
}
fn default_max_connections() -> u32 {
    20
}
fn default_min_connections() -> u32 {
    2
}
fn default_connect_timeout() -> u64 {
    10
}
fn default_idle_timeout() -> u64 {
    600
}
fn default_log_level() -> String {
    "info".to_string()
}
fn default_log_format() -> String {
    "json".to_string()
}
fn default_interest_threshold() -> usize {
    5
}
fn default_chat_quorum() -> usize {
    2
}
fn default_action_item_ttl_days() -> i64 {
    90
}
fn default_highlight_threshold() -> usize {
    5
}
fn default_expire_sweep_minutes() -> u64 {
    15
}

/// Ten years.
pub const MAX_ACTION_ITEM_TTL_DAYS: i64 = 3650;
/// One day.
pub const MAX_EXPIRE_SWEEP_MINUTES: u64 = 1440;

/// Configuration validation error
#[derive(Debug, thiserror::Error)]
pub enum ConfigValidationError {
    #[error("Missing required configuration: {0}")]
    MissingRequired(String),

    #[error("Invalid configuration value: {0}")]
    InvalidValue(String),
}

impl Config {
    /// Load configuration from files and environment variables.
    ///
    /// Loading order (later sources override earlier):
    /// 1. config/default.toml - base configuration with defaults
    /// 2. config/local.toml - local overrides (optional, not in git)
    /// 3. Environment variables with RALLY__ prefix
    pub fn load() -> Result<Self, config::ConfigError> {
        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default"))
            .add_source(config::File::with_name("config/local").required(false))
            .add_source(config::Environment::with_prefix("RALLY").separator("__"))
            .build()?;

        let cfg: Self = config.try_deserialize()?;
        cfg.validate()
            .map_err(|e| config::ConfigError::Message(e.to_string()))?;
        Ok(cfg)
    }

    /// Load configuration for testing with custom overrides.
    ///
    /// Defaults are embedded so tests do not depend on the working directory.
    #[cfg(test)]
    pub fn load_for_test(overrides: &[(&str, &str)]) -> Result<Self, config::ConfigError> {
        let defaults = r#"
            [server]
            host = "0.0.0.0"
            port = 8080
            request_timeout_secs = 30

            [database]
            url = ""
            max_connections = 20
            min_connections = 2
            connect_timeout_secs = 10
            idle_timeout_secs = 600

            [logging]
            level = "info"
            format = "json"
        "#;

        let mut builder = config::Config::builder()
            .add_source(config::File::from_str(defaults, config::FileFormat::Toml));
        for (key, value) in overrides {
            builder = builder.set_override(*key, *value)?;
        }
        builder.build()?.try_deserialize()
    }

    /// Validate configuration values.
    pub fn validate(&self) -> Result<(), ConfigValidationError> {
        if self.database.url.is_empty() {
            return Err(ConfigValidationError::MissingRequired(
                "RALLY__DATABASE__URL environment variable must be set".to_string(),
            ));
        }

        if self.server.port == 0 {
            return Err(ConfigValidationError::InvalidValue(
                "Server port cannot be 0".to_string(),
            ));
        }

        if self.database.min_connections > self.database.max_connections {
            return Err(ConfigValidationError::InvalidValue(
                "min_connections cannot exceed max_connections".to_string(),
            ));
        }

        if !matches!(self.logging.format.as_str(), "json" | "pretty") {
            return Err(ConfigValidationError::InvalidValue(format!(
                "logging.format must be json or pretty, got {}",
                self.logging.format
            )));
        }

        let c = &self.coordination;
        if c.interest_threshold == 0 || c.chat_quorum == 0 || c.highlight_threshold == 0 {
            return Err(ConfigValidationError::InvalidValue(
                "coordination thresholds must be at least 1".to_string(),
            ));
        }
        if !(1..=MAX_ACTION_ITEM_TTL_DAYS).contains(&c.action_item_ttl_days) {
            return Err(ConfigValidationError::InvalidValue(format!(
                "coordination.action_item_ttl_days must be between 1 and {}",
                MAX_ACTION_ITEM_TTL_DAYS
            )));
        }
        if c.expire_sweep_minutes > MAX_EXPIRE_SWEEP_MINUTES {
            return Err(ConfigValidationError::InvalidValue(format!(
                "coordination.expire_sweep_minutes must not exceed {}",
                MAX_EXPIRE_SWEEP_MINUTES
            )));
        }

        Ok(())
    }

    pub fn socket_addr(&self) -> Result<SocketAddr, ConfigValidationError> {
        format!("{}:{}", self.server.host, self.server.port)
            .parse()
            .map_err(|_| {
                ConfigValidationError::InvalidValue(format!(
                    "invalid listen address {}:{}",
                    self.server.host, self.server.port
                ))
            })
    }
}
