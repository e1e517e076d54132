//! Configuration module for Cabinet.

use serde::Deserialize;
use std::path::Path;

use crate::{CabinetError, Result};

/// HTTP server configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Host address to bind.
    #[serde(default = "default_host")]
    pub host: String,
    /// Port number to listen on.
    #[serde(default = "default_port")]
    pub port: u16,
    /// Allowed CORS origins. Empty means any origin without credentials.
    #[serde(default)]
    pub cors_origins: Vec<String>,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    5000
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            cors_origins: Vec::new(),
        }
    }
}

/// Database configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    /// Path to the SQLite database file.
    #[serde(default = "default_db_path")]
    pub path: String,
}

fn default_db_path() -> String {
    "data/cabinet.db".to_string()
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: default_db_path(),
        }
    }
}

/// File storage configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct FilesConfig {
    /// Root directory that holds every user's folders.
    #[serde(default = "default_upload_root")]
    pub upload_root: String,
}

fn default_upload_root() -> String {
    "uploads".to_string()
}

impl Default for FilesConfig {
    fn default() -> Self {
        Self {
            upload_root: default_upload_root(),
        }
    }
}

/// Session configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct SessionConfig {
    /// Session lifetime in seconds, renewed on activity.
    #[serde(default = "default_session_ttl")]
    pub ttl_secs: u64,
    /// Interval between expired-session sweeps.
    #[serde(default = "default_sweep_interval")]
    pub sweep_interval_secs: u64,
    /// Name of the session cookie.
    #[serde(default = "default_cookie_name")]
    pub cookie_name: String,
    /// Mark the session cookie `Secure`.
    #[serde(default)]
    pub cookie_secure: bool,
}

fn default_session_ttl() -> u64 {
    24 * 60 * 60
}

fn default_sweep_interval() -> u64 {
    120
}

fn default_cookie_name() -> String {
    "cabinet_session".to_string()
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            ttl_secs: default_session_ttl(),
            sweep_interval_secs: default_sweep_interval(),
            cookie_name: default_cookie_name(),
            cookie_secure: false,
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Path to the log file.
    #[serde(default = "default_log_file")]
    pub file: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_file() -> String {
    "logs/cabinet.log".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            file: default_log_file(),
        }
    }
}

/// Main configuration structure.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct Config {
    /// HTTP server configuration.
    #[serde(default)]
    pub server: ServerConfig,
    /// Database configuration.
    #[serde(default)]
    pub database: DatabaseConfig,
    /// File storage configuration.
    #[serde(default)]
    pub files: FilesConfig,
    /// Session configuration.
    #[serde(default)]
    pub session: SessionConfig,
    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref()).map_err(CabinetError::Io)?;
        Self::parse(&content)
    }

    /// Parse configuration from a TOML string.
    pub fn parse(s: &str) -> Result<Self> {
        toml::from_str(s).map_err(|e| CabinetError::Config(format!("config parse error: {e}")))
    }

    /// Apply environment variable overrides to the configuration.
    ///
    /// Supported environment variables:
    /// - `PORT`: listening port
    /// - `CABINET_DATABASE_PATH`: SQLite database file
    /// - `CABINET_UPLOAD_ROOT`: upload root directory
    pub fn apply_env_overrides(&mut self) {
        self.apply_overrides(|key| std::env::var(key).ok());
    }

    /// Apply overrides from an arbitrary lookup. Empty values are ignored.
    fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        let lookup = |key: &str| lookup(key).filter(|v| !v.is_empty());

        if let Some(port) = lookup("PORT") {
            match port.parse() {
                Ok(port) => self.server.port = port,
                Err(_) => tracing::warn!(value = %port, "Ignoring invalid PORT"),
            }
        }
        if let Some(path) = lookup("CABINET_DATABASE_PATH") {
            self.database.path = path;
        }
        if let Some(root) = lookup("CABINET_UPLOAD_ROOT") {
            self.files.upload_root = root;
        }
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<()> {
        if self.session.ttl_secs == 0 {
            return Err(CabinetError::Config(
                "session.ttl_secs must be greater than zero".to_string(),
            ));
        }
        if self.session.sweep_interval_secs == 0 {
            return Err(CabinetError::Config(
                "session.sweep_interval_secs must be greater than zero".to_string(),
            ));
        }
        if self.files.upload_root.trim().is_empty() {
            return Err(CabinetError::Config(
                "files.upload_root must not be empty".to_string(),
            ));
        }
        if self.session.cookie_name.is_empty() {
            return Err(CabinetError::Config(
                "session.cookie_name must not be empty".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_default_config() {
        let config = Config::default();

        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.server.port, 5000);
        assert!(config.server.cors_origins.is_empty());

        assert_eq!(config.database.path, "data/cabinet.db");
        assert_eq!(config.files.upload_root, "uploads");

        assert_eq!(config.session.ttl_secs, 86400);
        assert_eq!(config.session.sweep_interval_secs, 120);
        assert_eq!(config.session.cookie_name, "cabinet_session");
        assert!(!config.session.cookie_secure);

        assert_eq!(config.logging.level, "info");
        assert_eq!(config.logging.file, "logs/cabinet.log");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_parse_full_config() {
        let toml = r#"
[server]
host = "127.0.0.1"
port = 8080
cors_origins = ["http://localhost:3000"]

[database]
path = "custom/db.sqlite"

[files]
upload_root = "/srv/cabinet"

[session]
ttl_secs = 3600
sweep_interval_secs = 30
cookie_name = "sid"
cookie_secure = true

[logging]
level = "debug"
file = "custom/cabinet.log"
"#;

        let config = Config::parse(toml).unwrap();

        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.server.cors_origins, vec!["http://localhost:3000"]);
        assert_eq!(config.database.path, "custom/db.sqlite");
        assert_eq!(config.files.upload_root, "/srv/cabinet");
        assert_eq!(config.session.ttl_secs, 3600);
        assert_eq!(config.session.sweep_interval_secs, 30);
        assert_eq!(config.session.cookie_name, "sid");
        assert!(config.session.cookie_secure);
        assert_eq!(config.logging.level, "debug");
        assert_eq!(config.logging.file, "custom/cabinet.log");
    }

    #[test]
    fn test_parse_partial_config() {
        let toml = r#"
[session]
ttl_secs = 60
"#;

        let config = Config::parse(toml).unwrap();

        assert_eq!(config.session.ttl_secs, 60);
        assert_eq!(config.session.sweep_interval_secs, 120);
        assert_eq!(config.server.port, 5000);
    }

    #[test]
    fn test_parse_empty_config() {
        let config = Config::parse("").unwrap();
        assert_eq!(config.server.port, 5000);
        assert_eq!(config.files.upload_root, "uploads");
    }

    #[test]
    fn test_parse_invalid_config() {
        let result = Config::parse("[server\nport = ");

        if let Err(CabinetError::Config(msg)) = result {
            assert!(msg.contains("config parse error"));
        } else {
            panic!("Expected Config error");
        }
    }

    #[test]
    fn test_load_nonexistent_file() {
        let result = Config::load("nonexistent.toml");
        assert!(matches!(result, Err(CabinetError::Io(_))));
    }

    #[test]
    fn test_apply_overrides() {
        let vars: HashMap<&str, &str> = [
            ("PORT", "4321"),
            ("CABINET_DATABASE_PATH", "/tmp/c.db"),
            ("CABINET_UPLOAD_ROOT", "/tmp/up"),
        ]
        .into_iter()
        .collect();

        let mut config = Config::default();
        config.apply_overrides(|key| vars.get(key).map(|v| v.to_string()));

        assert_eq!(config.server.port, 4321);
        assert_eq!(config.database.path, "/tmp/c.db");
        assert_eq!(config.files.upload_root, "/tmp/up");
    }

    #[test]
    fn test_apply_overrides_ignores_empty_and_invalid() {
        let mut config = Config::default();
        config.apply_overrides(|key| match key {
            "PORT" => Some("not-a-port".to_string()),
            "CABINET_UPLOAD_ROOT" => Some(String::new()),
            _ => None,
        });

        assert_eq!(config.server.port, 5000);
        assert_eq!(config.files.upload_root, "uploads");
    }

    #[test]
    fn test_validate_zero_ttl() {
        let mut config = Config::default();
        config.session.ttl_secs = 0;
        assert!(matches!(config.validate(), Err(CabinetError::Config(_))));
    }

    #[test]
    fn test_validate_empty_upload_root() {
        let mut config = Config::default();
        config.files.upload_root = "  ".to_string();
        assert!(matches!(config.validate(), Err(CabinetError::Config(_))));
    }
}
