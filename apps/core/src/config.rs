//! Runtime settings read from the environment (and `.env`, when present).

use serde::Serialize;
use std::env;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;
use validator::Validate;

use crate::error::AppError;

// --- Defaults ---
pub const DEFAULT_KNOWLEDGE_BASE: &str = "knowledge_base.json";
pub const DEFAULT_ANALYTICS_URL: &str = "https://api.example.com";
pub const DEFAULT_ANALYTICS_TIMEOUT_SECS: u64 = 10;
pub const DEFAULT_POPULATION_URL: &str =
    "https://api.worldbank.org/v2/country/WLD/indicator/SP.POP.TOTL?per_page=1000&format=json";
pub const DEFAULT_PROJECTION_YEARS: u32 = 50;

/// Output format of log records
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Human-readable lines
    #[default]
    Pretty,
    /// Bunyan-style JSON lines
    Json,
}

impl FromStr for LogFormat {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "pretty" | "text" => Ok(LogFormat::Pretty),
            "json" | "bunyan" => Ok(LogFormat::Json),
            other => Err(AppError::Config(format!("unknown LOG_FORMAT '{}'", other))),
        }
    }
}

#[derive(Debug, Clone, Serialize, Validate)]
pub struct Settings {
    /// Knowledge base JSON file (`CHATBOT_KNOWLEDGE_BASE`)
    pub knowledge_base_path: PathBuf,
    /// Base URL; records go to `{base}/analytics` (`CHATBOT_ANALYTICS_URL`)
    #[validate(url)]
    pub analytics_base_url: String,
    /// Per-request timeout of the analytics POST (`CHATBOT_ANALYTICS_TIMEOUT_SECS`)
    #[validate(range(min = 1, max = 300))]
    pub analytics_timeout_secs: u64,
    /// World Bank series endpoint (`POPULATION_DATASET_URL`)
    #[validate(url)]
    pub population_dataset_url: String,
    /// Directory receiving the chart file (`POPULATION_OUTPUT_DIR`)
    pub chart_output_dir: PathBuf,
    /// Number of future years to project (`POPULATION_PROJECTION_YEARS`)
    #[validate(range(min = 1, max = 500))]
    pub projection_years: u32,
    /// `LOG_FORMAT`
    pub log_format: LogFormat,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            knowledge_base_path: PathBuf::from(DEFAULT_KNOWLEDGE_BASE),
            analytics_base_url: DEFAULT_ANALYTICS_URL.to_string(),
            analytics_timeout_secs: DEFAULT_ANALYTICS_TIMEOUT_SECS,
            population_dataset_url: DEFAULT_POPULATION_URL.to_string(),
            chart_output_dir: PathBuf::from("."),
            projection_years: DEFAULT_PROJECTION_YEARS,
            log_format: LogFormat::Pretty,
        }
    }
}

impl Settings {
    /// Loads `.env` if present, then reads the process environment.
    pub fn load() -> Result<Self, AppError> {
        // A missing .env file is the normal case.
        let _ = dotenv::dotenv();
        Self::from_env()
    }

    /// Reads settings from the process environment only; unset keys keep their defaults.
    pub fn from_env() -> Result<Self, AppError> {
        let defaults = Self::default();
        let settings = Self {
            knowledge_base_path: env::var("CHATBOT_KNOWLEDGE_BASE")
                .map(PathBuf::from)
                .unwrap_or(defaults.knowledge_base_path),
            analytics_base_url: env::var("CHATBOT_ANALYTICS_URL")
                .unwrap_or(defaults.analytics_base_url),
            analytics_timeout_secs: parse_var(
                "CHATBOT_ANALYTICS_TIMEOUT_SECS",
                defaults.analytics_timeout_secs,
            )?,
            population_dataset_url: env::var("POPULATION_DATASET_URL")
                .unwrap_or(defaults.population_dataset_url),
            chart_output_dir: env::var("POPULATION_OUTPUT_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.chart_output_dir),
            projection_years: parse_var("POPULATION_PROJECTION_YEARS", defaults.projection_years)?,
            log_format: match env::var("LOG_FORMAT") {
                Ok(value) => value.parse()?,
                Err(_) => defaults.log_format,
            },
        };

        settings
            .validate()
            .map_err(|e| AppError::Config(format!("invalid settings: {}", e)))?;
        Ok(settings)
    }

    pub fn analytics_timeout(&self) -> Duration {
        Duration::from_secs(self.analytics_timeout_secs)
    }
}

fn parse_var<T>(key: &str, default: T) -> Result<T, AppError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse()
            .map_err(|e| AppError::Config(format!("{} = '{}': {}", key, raw, e))),
        Err(_) => Ok(default),
    }
}
