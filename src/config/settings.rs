//! Process-wide runtime settings: logging and the warm-up/debounce
//! interval. Loaded once at startup, independent of any `SourceConfig`.

use std::time::Duration;

use serde::Deserialize;

use crate::observability::logging::LogConfig;

const DEFAULT_WARM_UP_SECS: u64 = 5;

#[derive(Debug, Deserialize)]
struct RawRuntimeSettings {
    #[serde(default = "default_log_level")]
    log_level: String,
    #[serde(default = "default_log_format")]
    log_format: String,
    #[serde(default = "default_warm_up_secs")]
    warm_up_secs: u64,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

fn default_warm_up_secs() -> u64 {
    DEFAULT_WARM_UP_SECS
}

impl Default for RawRuntimeSettings {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            log_format: default_log_format(),
            warm_up_secs: default_warm_up_secs(),
        }
    }
}

/// Logging configuration and the warm-up interval used throughout the
/// autoscaler (post-creation settling, inter-sample debounce, stop grace).
#[derive(Debug, Clone)]
pub struct RuntimeSettings {
    pub log: LogConfig,
    pub warm_up: Duration,
}

impl Default for RuntimeSettings {
    fn default() -> Self {
        Self::from_raw(RawRuntimeSettings::default())
    }
}

impl RuntimeSettings {
    fn from_raw(raw: RawRuntimeSettings) -> Self {
        Self {
            log: LogConfig {
                level: raw.log_level,
                format: raw.log_format.as_str().into(),
                include_target: true,
                include_file: false,
                include_line: false,
            },
            warm_up: Duration::from_secs(raw.warm_up_secs),
        }
    }

    /// Loads settings from `config/default.{toml,yaml,...}`, an optional
    /// `config/local` override, and `APP__`-prefixed environment variables
    /// (double underscore separating nested keys), in that precedence
    /// order. A `.env` file in the working directory is loaded first, if
    /// present, so local overrides can live outside the shell environment.
    pub fn load() -> Result<Self, config::ConfigError> {
        dotenvy::dotenv().ok();

        let builder = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name("config/local").required(false))
            .add_source(config::Environment::with_prefix("APP").separator("__"));

        let raw: RawRuntimeSettings = match builder.build() {
            Ok(built) => built.try_deserialize().unwrap_or_default(),
            Err(config::ConfigError::NotFound(_)) => RawRuntimeSettings::default(),
            Err(e) => return Err(e),
        };
        Ok(Self::from_raw(raw))
    }
}
