use std::{path::PathBuf, time::Duration};

use serde::{Deserialize, de::DeserializeOwned};

use crate::Result;

pub const DEFAULT_SCHEDULE_URL: &str = "https://schedule.cpp.edu";
pub const DEFAULT_WAIT_TIMEOUT_SECS: u64 = 10;

fn default_schedule_url() -> String {
    DEFAULT_SCHEDULE_URL.to_string()
}

fn default_wait_timeout_secs() -> u64 {
    DEFAULT_WAIT_TIMEOUT_SECS
}

fn default_output_dir() -> PathBuf {
    PathBuf::from(".")
}

/// The env config env vars needed for scraping.
#[derive(Debug, Deserialize)]
pub struct ScrapingEnv {
    #[serde(default = "default_schedule_url")]
    schedule_url: String,
    #[serde(default = "default_wait_timeout_secs")]
    wait_timeout_secs: u64,
    #[serde(default = "default_output_dir")]
    output_dir: PathBuf,
}

#[derive(Debug, Clone)]
pub struct ScrapingConfig {
    pub schedule_url: String,
    /// Budget for each post-action element to appear.
    pub wait_timeout: Duration,
    pub output_dir: PathBuf,
}

impl ScrapingConfig {
    pub fn new() -> Result<Self> {
        Ok(ScrapingEnv::load_from_env()?.into())
    }
}

impl Default for ScrapingConfig {
    fn default() -> Self {
        Self {
            schedule_url: default_schedule_url(),
            wait_timeout: Duration::from_secs(DEFAULT_WAIT_TIMEOUT_SECS),
            output_dir: default_output_dir(),
        }
    }
}

impl From<ScrapingEnv> for ScrapingConfig {
    fn from(env: ScrapingEnv) -> Self {
        Self {
            schedule_url: env.schedule_url,
            wait_timeout: Duration::from_secs(env.wait_timeout_secs),
            output_dir: env.output_dir,
        }
    }
}

// Extension trait.
pub trait LoadFromEnv: DeserializeOwned {
    fn load_from_env() -> Result<Self> {
        // Don't throw an error if .env file doesn't exist.
        let _ = dotenv::dotenv();
        let config = envy::from_env::<Self>()?;
        Ok(config)
    }
}

impl<T: DeserializeOwned> LoadFromEnv for T {}
