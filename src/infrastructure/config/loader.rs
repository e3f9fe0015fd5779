use std::path::Path;

use anyhow::{Context, Result};
use figment::providers::{Env, Format, Serialized, Yaml};
use figment::Figment;
use thiserror::Error;

use crate::domain::models::config::Config;

/// Directory holding project-local configuration.
pub const CONFIG_DIR: &str = ".tasklink";

/// Plain environment variables honoured alongside the `TASKLINK_` prefix.
const GITHUB_ENV_VARS: [&str; 4] = [
    "GITHUB_TOKEN",
    "GITHUB_OWNER",
    "GITHUB_REPO",
    "GITHUB_PROJECT_NUMBER",
];

/// Configuration error types
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("GitHub token is not set (use GITHUB_TOKEN or TASKLINK_GITHUB__TOKEN)")]
    MissingToken,

    #[error("GitHub owner is not set (use GITHUB_OWNER or github.owner)")]
    MissingOwner,

    #[error("GitHub repo is not set (use GITHUB_REPO or github.repo)")]
    MissingRepo,

    #[error("Invalid project_number: 0. Project numbers start at 1")]
    InvalidProjectNumber,

    #[error("Invalid timeout_secs: 0. Must be at least 1")]
    InvalidTimeout,

    #[error("Invalid {field}: {url}. Must be an http or https URL")]
    InvalidUrl { field: &'static str, url: String },

    #[error("Invalid log level: {0}. Must be one of: trace, debug, info, warn, error")]
    InvalidLogLevel(String),

    #[error("Invalid log format: {0}. Must be one of: json, pretty")]
    InvalidLogFormat(String),

    #[error("Invalid max_retries: {0}. Cannot be 0")]
    InvalidMaxRetries(u32),

    #[error(
        "Invalid backoff configuration: initial_backoff_ms ({0}) must be less than max_backoff_ms ({1})"
    )]
    InvalidBackoff(u64, u64),
}

/// Configuration loader with hierarchical merging
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration relative to the current directory.
    ///
    /// Precedence (lowest to highest):
    /// 1. Programmatic defaults (Serialized)
    /// 2. .tasklink/config.yaml
    /// 3. .tasklink/local.yaml (optional, uncommitted overrides)
    /// 4. GITHUB_TOKEN, GITHUB_OWNER, GITHUB_REPO, GITHUB_PROJECT_NUMBER
    /// 5. TASKLINK_* environment variables, `__` separating nested keys
    pub fn load() -> Result<Config> {
        Self::load_from_dir(".")
    }

    /// Load configuration with `root` standing in for the current directory.
    pub fn load_from_dir(root: impl AsRef<Path>) -> Result<Config> {
        let dir = root.as_ref().join(CONFIG_DIR);
        let config: Config = Self::with_env(
            Figment::new()
                .merge(Serialized::defaults(Config::default()))
                .merge(Yaml::file(dir.join("config.yaml")))
                .merge(Yaml::file(dir.join("local.yaml"))),
        )
        .extract()
        .context("Failed to extract configuration from figment")?;

        Self::validate(&config)?;
        Ok(config)
    }

    /// Load configuration from a specific file, still honouring the
    /// environment overrides.
    pub fn load_from_file(path: impl AsRef<Path>) -> Result<Config> {
        let config: Config = Self::with_env(
            Figment::new()
                .merge(Serialized::defaults(Config::default()))
                .merge(Yaml::file(path.as_ref())),
        )
        .extract()
        .context(format!(
            "Failed to load config from {}",
            path.as_ref().display()
        ))?;

        Self::validate(&config)?;
        Ok(config)
    }

    fn with_env(figment: Figment) -> Figment {
        figment
            .merge(
                Env::raw()
                    .only(&GITHUB_ENV_VARS)
                    .map(|key| key.as_str().to_ascii_lowercase().replacen('_', ".", 1).into()),
            )
            .merge(Env::prefixed("TASKLINK_").split("__"))
    }

    /// Validate configuration after loading
    pub fn validate(config: &Config) -> Result<(), ConfigError> {
        let github = &config.github;
        if github.token.trim().is_empty() {
            return Err(ConfigError::MissingToken);
        }
        if github.owner.trim().is_empty() {
            return Err(ConfigError::MissingOwner);
        }
        if github.repo.trim().is_empty() {
            return Err(ConfigError::MissingRepo);
        }
        if github.project_number == Some(0) {
            return Err(ConfigError::InvalidProjectNumber);
        }
        if github.timeout_secs == 0 {
            return Err(ConfigError::InvalidTimeout);
        }
        validate_url("api_url", &github.api_url)?;
        if let Some(url) = &github.graphql_url {
            validate_url("graphql_url", url)?;
        }

        let valid_log_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_log_levels.contains(&config.logging.level.to_lowercase().as_str()) {
            return Err(ConfigError::InvalidLogLevel(config.logging.level.clone()));
        }

        let valid_log_formats = ["json", "pretty"];
        if !valid_log_formats.contains(&config.logging.format.as_str()) {
            return Err(ConfigError::InvalidLogFormat(config.logging.format.clone()));
        }

        if config.retry.max_retries == 0 {
            return Err(ConfigError::InvalidMaxRetries(config.retry.max_retries));
        }

        if config.retry.initial_backoff_ms >= config.retry.max_backoff_ms {
            return Err(ConfigError::InvalidBackoff(
                config.retry.initial_backoff_ms,
                config.retry.max_backoff_ms,
            ));
        }

        Ok(())
    }
}

fn validate_url(field: &'static str, url: &str) -> Result<(), ConfigError> {
    if url.starts_with("https://") || url.starts_with("http://") {
        Ok(())
    } else {
        Err(ConfigError::InvalidUrl {
            field,
            url: url.to_string(),
        })
    }
}
