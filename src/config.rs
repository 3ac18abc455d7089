//! Run configuration.
//!
//! The endpoint and output conventions are fixed, but a few knobs can be
//! overridden from the environment (or a `.env` file) for testing against a
//! mirror or writing somewhere other than the working directory:
//!
//! | Variable           | Field             |
//! |--------------------|-------------------|
//! | `FXQ_API_BASE`     | `api_base`        |
//! | `FXQ_OUTPUT_DIR`   | `output_dir`      |
//! | `FXQ_TIMEOUT_SECS` | `request_timeout` |
//! | `FXQ_MAX_PAGES`    | `max_pages`       |
//! | `FXQ_LOG_LEVEL`    | `log_level`       |

use std::path::PathBuf;
use std::time::Duration;

use crate::error::AppError;

pub const ENV_PREFIX: &str = "FXQ_";

pub const DEFAULT_API_BASE: &str = "https://api.fiscaldata.treasury.gov/services/api";
pub const RATES_OF_EXCHANGE_PATH: &str = "/fiscal_service/v1/accounting/od/rates_of_exchange";
pub const RATES_FIELDS: &str = "country_currency_desc,exchange_rate,record_date";

const DEFAULT_TIMEOUT_SECS: u64 = 30;
const DEFAULT_MAX_PAGES: usize = 10_000;

/// Immutable settings handed to each pipeline component.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RatesConfig {
    pub api_base: String,
    pub output_dir: PathBuf,
    pub request_timeout: Duration,
    /// Upper bound on pages per session; a continuation chain longer than
    /// this is treated as a broken server.
    pub max_pages: usize,
    pub log_level: String,
}

impl Default for RatesConfig {
    fn default() -> Self {
        Self {
            api_base: DEFAULT_API_BASE.to_string(),
            output_dir: PathBuf::from("."),
            request_timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            max_pages: DEFAULT_MAX_PAGES,
            log_level: "warn".to_string(),
        }
    }
}

impl RatesConfig {
    /// Defaults plus overrides from the process environment and `.env`.
    pub fn from_env() -> Result<Self, AppError> {
        dotenvy::dotenv().ok();
        Self::from_source(&ProcessEnv)
    }

    pub fn from_source<E: EnvSource>(env: &E) -> Result<Self, AppError> {
        let mut config = Self::default();

        if let Some(base) = env_string(env, "API_BASE") {
            config.api_base = base.trim_end_matches('/').to_string();
        }
        if let Some(dir) = env_string(env, "OUTPUT_DIR") {
            config.output_dir = PathBuf::from(dir);
        }
        if let Some(secs) = env_parse::<u64, _>(env, "TIMEOUT_SECS")? {
            config.request_timeout = Duration::from_secs(secs);
        }
        if let Some(pages) = env_parse::<usize, _>(env, "MAX_PAGES")? {
            if pages == 0 {
                return Err(AppError::config(format!("{ENV_PREFIX}MAX_PAGES must be at least 1.")));
            }
            config.max_pages = pages;
        }
        if let Some(level) = env_string(env, "LOG_LEVEL") {
            config.log_level = level;
        }

        Ok(config)
    }

    /// Full URL of the exchange-rate dataset, without a query string.
    pub fn endpoint(&self) -> String {
        format!("{}{}", self.api_base, RATES_OF_EXCHANGE_PATH)
    }
}

/// Source of `FXQ_*` overrides, so tests don't have to touch the process
/// environment.
pub trait EnvSource {
    fn get(&self, key: &str) -> Option<String>;
}

struct ProcessEnv;

impl EnvSource for ProcessEnv {
    fn get(&self, key: &str) -> Option<String> {
        std::env::var(format!("{ENV_PREFIX}{key}")).ok()
    }
}

fn env_string<E: EnvSource>(env: &E, key: &str) -> Option<String> {
    env.get(key)
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn env_parse<T, E>(env: &E, key: &str) -> Result<Option<T>, AppError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
    E: EnvSource,
{
    match env_string(env, key) {
        Some(raw) => raw
            .parse::<T>()
            .map(Some)
            .map_err(|e| AppError::config(format!("Invalid {ENV_PREFIX}{key} value '{raw}': {e}"))),
        None => Ok(None),
    }
}
