//! Configuration types and loading
//!
//! Config precedence: CLI args > env vars > config file > defaults.
//! The account password is loaded from the MOODLE_PASSWORD env var or
//! password_file, never stored in the TOML directly to avoid leaking secrets.

use common::Secret;
use serde::Deserialize;
use std::path::{Path, PathBuf};

use moodle_auth::DEFAULT_SERVICE;

/// Root configuration
#[derive(Debug, Deserialize)]
pub struct Config {
    pub server: ServerConfig,
    pub auth: AuthConfig,
}

/// Target site settings
#[derive(Debug, Deserialize)]
pub struct ServerConfig {
    pub wwwroot: String,
    /// Web-service the token is requested for
    #[serde(default = "default_service")]
    pub service: String,
}

/// Account settings
#[derive(Debug, Deserialize)]
pub struct AuthConfig {
    pub username: String,
    #[serde(skip)]
    pub password: Option<Secret<String>>,
    /// Path to a file containing the password (alternative to MOODLE_PASSWORD env var)
    #[serde(default)]
    pub password_file: Option<PathBuf>,
}

fn default_service() -> String {
    DEFAULT_SERVICE.to_string()
}

impl Config {
    /// Load configuration from a TOML file, then overlay environment variables.
    ///
    /// Password resolution order:
    /// 1. MOODLE_PASSWORD env var
    /// 2. password_file path from config
    pub fn load(path: &Path) -> common::Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        let mut config: Config = toml::from_str(&contents)?;

        // Validate wwwroot is a valid URL with http(s) scheme
        if !config.server.wwwroot.starts_with("http://")
            && !config.server.wwwroot.starts_with("https://")
        {
            return Err(common::Error::Config(format!(
                "wwwroot must start with http:// or https://, got: {}",
                config.server.wwwroot
            )));
        }

        if config.auth.username.is_empty() {
            return Err(common::Error::Config("username must not be empty".into()));
        }

        if config.server.service.is_empty() {
            return Err(common::Error::Config("service must not be empty".into()));
        }

        // Resolve password: env var takes precedence over file
        if let Ok(password) = std::env::var("MOODLE_PASSWORD") {
            config.auth.password = Some(Secret::new(password));
        } else if let Some(ref password_file) = config.auth.password_file {
            let password = std::fs::read_to_string(password_file).map_err(|e| {
                common::Error::Config(format!(
                    "failed to read password_file {}: {e}",
                    password_file.display()
                ))
            })?;
            let password = password.trim().to_owned();
            if !password.is_empty() {
                config.auth.password = Some(Secret::new(password));
            }
        }

        Ok(config)
    }

    /// Resolve config file path from CLI arg or MOODLE_CONFIG env var.
    pub fn resolve_path(cli_path: Option<&str>) -> PathBuf {
        if let Some(p) = cli_path {
            return PathBuf::from(p);
        }
        if let Ok(p) = std::env::var("MOODLE_CONFIG") {
            return PathBuf::from(p);
        }
        PathBuf::from("moodle-token.toml")
    }
}
