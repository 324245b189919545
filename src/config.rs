use dotenvy::dotenv;
use log::{debug, error};
use serde::Deserialize;
use std::{
    env,
    path::{Path, PathBuf},
};

use crate::{
    error::{CollectError, Result},
    models::region::Region,
};

const CONFIG_PATH_ENV: &str = "CONFIG_PATH";
const SERVICE_KEY_ENV: &str = "SERVICE_KEY";
const DEFAULT_CONFIG_PATH: &str = "config.toml";

pub const DEFAULT_BASE_URL: &str = "https://apis.data.go.kr/1613000";

/// What the detail collector does when a single identifier cannot be fetched.
#[derive(Deserialize, Debug, Default, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum FailurePolicy {
    /// Record the identifier in the failure log and keep going.
    #[default]
    Skip,
    /// Stop at the first failure and write nothing.
    Abort,
}

#[derive(Deserialize, Debug, Clone)]
#[serde(default)]
pub struct Config {
    pub regions: Vec<String>,
    pub base_url: String,
    pub page_size: u32,
    pub request_timeout_seconds: u64,
    pub request_delay_ms: u64,
    pub list_table: PathBuf,
    pub detail_table: PathBuf,
    pub failure_log: PathBuf,
    pub detail_failure_policy: FailurePolicy,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            regions: Vec::new(),
            base_url: DEFAULT_BASE_URL.to_string(),
            page_size: 100,
            request_timeout_seconds: 30,
            request_delay_ms: 100,
            list_table: PathBuf::from("apt_list.csv"),
            detail_table: PathBuf::from("apt_detail.csv"),
            failure_log: PathBuf::from("apt_detail_failures.csv"),
            detail_failure_policy: FailurePolicy::Skip,
        }
    }
}

impl Config {
    /// Validated region list. `overrides` wins over the configured regions when non-empty.
    pub fn regions(&self, overrides: &[String]) -> Result<Vec<Region>> {
        let codes = if overrides.is_empty() {
            &self.regions
        } else {
            overrides
        };

        if codes.is_empty() {
            return Err(CollectError::Configuration(
                "no regions configured, set `regions` in the config file or pass --region".into(),
            ));
        }

        codes.iter().map(|code| Region::parse(code)).collect()
    }

    /// Output paths resolved against `dir`, used when the tables live outside the working directory.
    pub fn with_output_dir(mut self, dir: &Path) -> Config {
        self.list_table = dir.join(&self.list_table);
        self.detail_table = dir.join(&self.detail_table);
        self.failure_log = dir.join(&self.failure_log);
        self
    }
}

pub fn create_test_config() -> Config {
    Config {
        regions: vec!["11110".to_string()],
        base_url: "http://localhost:0".to_string(),
        page_size: 3,
        request_timeout_seconds: 1,
        request_delay_ms: 0,
        ..Config::default()
    }
}

pub fn read_config() -> Result<Config> {
    dotenv().ok();

    let (config_path, explicit) = match env::var(CONFIG_PATH_ENV) {
        Ok(path) => (PathBuf::from(path), true),
        Err(_) => (PathBuf::from(DEFAULT_CONFIG_PATH), false),
    };

    if !config_path.exists() && !explicit {
        debug!(
            "{} not found, using default configuration",
            config_path.display()
        );
        return Ok(Config::default());
    }

    std::fs::read(&config_path)
        .map_err(|e| format!("{}: {e}", config_path.display()))
        .and_then(|bytes| toml::from_slice(&bytes).map_err(|e| e.to_string()))
        .map_err(|err| {
            error!("failed to read config: {err}");
            CollectError::Configuration(err)
        })
}

/// Reads the data portal credential from the environment (or `.env`).
pub fn read_service_key() -> Result<String> {
    dotenv().ok();
    match env::var(SERVICE_KEY_ENV) {
        Ok(key) if !key.trim().is_empty() => Ok(key.trim().to_string()),
        _ => Err(CollectError::Configuration(format!(
            "{SERVICE_KEY_ENV} is not set"
        ))),
    }
}
