use std::path::PathBuf;

use anyhow::{bail, Context};
use config::builder::DefaultState;
use config::{Config, ConfigBuilder, Environment, File};
use serde::Deserialize;

/// Origins always allowed by CORS, besides `frontend_url`.
pub const DEV_ORIGINS: [&str; 2] = ["http://localhost:3000", "http://localhost:5173"];

/// Runtime configuration.
///
/// Sources, lowest precedence first: built-in defaults, an optional
/// `portfolio.toml` in the working directory, then environment variables
/// (`MONGODB_URI`, `JWT_SECRET`, `PORT`, ...).
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub mongodb_uri: String,
    pub mongodb_database: String,
    pub jwt_secret: String,
    pub admin_email: Option<String>,
    pub admin_password: Option<String>,
    pub port: u16,
    pub frontend_url: Option<String>,
    pub upload_dir: PathBuf,
}

impl AppConfig {
    fn defaults() -> Result<ConfigBuilder<DefaultState>, config::ConfigError> {
        Config::builder()
            .set_default("mongodb_uri", "mongodb://localhost:27017")?
            .set_default("mongodb_database", "portfolio")?
            .set_default("port", 5000_i64)?
            .set_default("upload_dir", "uploads")
    }

    /// Load from `portfolio.toml` (if present) and the environment.
    pub fn load() -> anyhow::Result<Self> {
        let config = Self::defaults()?
            .add_source(File::with_name("portfolio").required(false))
            .add_source(Environment::default().try_parsing(true))
            .build()
            .context("Failed to read configuration")?;
        Self::from_config(config)
    }

    fn from_config(config: Config) -> anyhow::Result<Self> {
        let app_config: Self = config
            .try_deserialize()
            .context("Invalid configuration (is JWT_SECRET set?)")?;
        if app_config.jwt_secret.trim().is_empty() {
            bail!("JWT_SECRET must not be empty");
        }
        Ok(app_config)
    }

    /// Bootstrap credentials, when both are configured and non-empty.
    pub fn admin_credentials(&self) -> Option<(&str, &str)> {
        match (self.admin_email.as_deref(), self.admin_password.as_deref()) {
            (Some(email), Some(password)) if !email.trim().is_empty() && !password.is_empty() => {
                Some((email, password))
            }
            _ => None,
        }
    }

    /// Origins allowed to call the API with credentials.
    pub fn cors_origins(&self) -> Vec<String> {
        let mut origins: Vec<String> = DEV_ORIGINS.iter().map(|o| o.to_string()).collect();
        if let Some(url) = self
            .frontend_url
            .as_deref()
            .map(|u| u.trim().trim_end_matches('/'))
            .filter(|u| !u.is_empty())
        {
            if !origins.iter().any(|o| o == url) {
                origins.push(url.to_string());
            }
        }
        origins
    }
}
