//! Runtime configuration: optional `config.json` in the platform config directory,
//! then `FORGE_*` environment overrides.

use std::{
    fs, io,
    path::{Path, PathBuf},
    time::Duration,
};

use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::domain::MissingIngredientPolicy;
use crate::infra::{
    bazaar::{DEFAULT_BAZAAR_URL, DEFAULT_TIMEOUT},
    cache::{default_snapshot_path, SNAPSHOT_MAX_AGE},
    recipes::DEFAULT_RECIPES_FILE,
};

const APP_QUALIFIER: &str = "com";
const APP_ORG: &str = "ForgeProfitScanner";
const APP_NAME: &str = "ForgeProfitScanner";
const CONFIG_FILENAME: &str = "config.json";

pub const ENV_PRODUCTS_PATH: &str = "FORGE_PRODUCTS_PATH";
pub const ENV_RECIPES_PATH: &str = "FORGE_RECIPES_PATH";
pub const ENV_BAZAAR_URL: &str = "FORGE_BAZAAR_URL";
pub const ENV_MAX_SNAPSHOT_AGE: &str = "FORGE_MAX_SNAPSHOT_AGE_SECS";
pub const ENV_MISSING_INGREDIENT: &str = "FORGE_MISSING_INGREDIENT";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read config file {}: {source}", path.display())]
    FileError {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to parse config file: {0}")]
    ParseError(#[from] serde_json::Error),

    #[error("invalid value for {key}: {reason}")]
    ValidationError { key: &'static str, reason: String },
}

pub fn project_dirs() -> Option<ProjectDirs> {
    ProjectDirs::from(APP_QUALIFIER, APP_ORG, APP_NAME)
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct AppConfig {
    pub bazaar_url: String,
    pub snapshot_path: PathBuf,
    pub recipes_path: PathBuf,
    pub max_snapshot_age_secs: u64,
    pub request_timeout_secs: u64,
    pub on_missing_ingredient: MissingIngredientPolicy,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            bazaar_url: DEFAULT_BAZAAR_URL.to_string(),
            snapshot_path: default_snapshot_path(),
            recipes_path: PathBuf::from(DEFAULT_RECIPES_FILE),
            max_snapshot_age_secs: SNAPSHOT_MAX_AGE.as_secs(),
            request_timeout_secs: DEFAULT_TIMEOUT.as_secs(),
            on_missing_ingredient: MissingIngredientPolicy::default(),
        }
    }
}

impl AppConfig {
    /// Config file (if any) plus process environment.
    pub fn load() -> Result<Self, ConfigError> {
        let mut config = match project_dirs().map(|dirs| dirs.config_dir().join(CONFIG_FILENAME)) {
            Some(path) if path.exists() => {
                debug!("Reading config from {}", path.display());
                Self::from_file(&path)?
            }
            _ => Self::default(),
        };
        config.apply_env(|key| std::env::var(key).ok())?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|source| ConfigError::FileError {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(serde_json::from_str(&content)?)
    }

    /// Applies `FORGE_*` overrides read through `lookup`.
    pub fn apply_env<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(path) = lookup(ENV_PRODUCTS_PATH) {
            self.snapshot_path = PathBuf::from(path);
        }
        if let Some(path) = lookup(ENV_RECIPES_PATH) {
            self.recipes_path = PathBuf::from(path);
        }
        if let Some(url) = lookup(ENV_BAZAAR_URL) {
            self.bazaar_url = url;
        }
        if let Some(raw) = lookup(ENV_MAX_SNAPSHOT_AGE) {
            self.max_snapshot_age_secs =
                raw.trim()
                    .parse::<u64>()
                    .map_err(|err| ConfigError::ValidationError {
                        key: ENV_MAX_SNAPSHOT_AGE,
                        reason: format!("'{raw}' is not a number of seconds ({err})"),
                    })?;
        }
        if let Some(raw) = lookup(ENV_MISSING_INGREDIENT) {
            self.on_missing_ingredient =
                raw.parse::<MissingIngredientPolicy>()
                    .map_err(|reason| ConfigError::ValidationError {
                        key: ENV_MISSING_INGREDIENT,
                        reason,
                    })?;
        }
        Ok(())
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        url::Url::parse(&self.bazaar_url).map_err(|err| ConfigError::ValidationError {
            key: "bazaarUrl",
            reason: err.to_string(),
        })?;
        if self.request_timeout_secs == 0 {
            return Err(ConfigError::ValidationError {
                key: "requestTimeoutSecs",
                reason: "must be greater than zero".to_string(),
            });
        }
        Ok(())
    }

    pub fn max_snapshot_age(&self) -> Duration {
        Duration::from_secs(self.max_snapshot_age_secs)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_match_bazaar_refresh_policy() {
        let config = AppConfig::default();
        assert_eq!(config.max_snapshot_age(), Duration::from_secs(600));
        assert_eq!(config.on_missing_ingredient, MissingIngredientPolicy::Zero);
        assert_eq!(config.recipes_path, PathBuf::from("forge_recipes.json"));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn env_overrides_take_precedence() {
        let mut config = AppConfig::default();
        config
            .apply_env(env(&[
                (ENV_PRODUCTS_PATH, "/tmp/products.json"),
                (ENV_MAX_SNAPSHOT_AGE, "120"),
                (ENV_MISSING_INGREDIENT, "drop"),
            ]))
            .unwrap();

        assert_eq!(config.snapshot_path, PathBuf::from("/tmp/products.json"));
        assert_eq!(config.max_snapshot_age_secs, 120);
        assert_eq!(config.on_missing_ingredient, MissingIngredientPolicy::Drop);
    }

    #[test]
    fn bad_env_values_are_reported() {
        let mut config = AppConfig::default();
        let err = config
            .apply_env(env(&[(ENV_MISSING_INGREDIENT, "ignore")]))
            .unwrap_err();
        assert!(matches!(
            err,
            ConfigError::ValidationError { key: ENV_MISSING_INGREDIENT, .. }
        ));

        let err = config
            .apply_env(env(&[(ENV_MAX_SNAPSHOT_AGE, "ten minutes")]))
            .unwrap_err();
        assert!(matches!(err, ConfigError::ValidationError { .. }));
    }

    #[test]
    fn partial_config_file_keeps_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILENAME);
        fs::write(
            &path,
            r#"{"recipesPath": "data/recipes.json", "onMissingIngredient": "error"}"#,
        )
        .unwrap();

        let config = AppConfig::from_file(&path).unwrap();

        assert_eq!(config.recipes_path, PathBuf::from("data/recipes.json"));
        assert_eq!(config.on_missing_ingredient, MissingIngredientPolicy::Error);
        assert_eq!(config.bazaar_url, DEFAULT_BAZAAR_URL);
    }

    #[test]
    fn invalid_url_fails_validation() {
        let config = AppConfig {
            bazaar_url: "not a url".to_string(),
            ..AppConfig::default()
        };
        assert!(config.validate().is_err());
    }
}
