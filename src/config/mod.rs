//! Configuration for rtcontrol
//!
//! Defaults for output and sorting, plus the location of the item source.
//! Settings are read from `<config dir>/rtcontrol/config.toml` and can be
//! overridden with `RTCONTROL_*` environment variables, e.g.
//! `RTCONTROL_SORT_FIELDS=size`. A missing config file is not an error.
//!
//! ```toml
//! sort_fields = "alias,name"
//! output_format = "name,size.sz,ratio"
//! source = "/var/lib/rtorrent/snapshot.json"
//! ```

use std::path::{Path, PathBuf};

use config::{Config, ConfigError, Environment, File, FileFormat};
use serde::{Deserialize, Serialize};

/// Prefix of environment overrides
pub const ENV_PREFIX: &str = "RTCONTROL";

/// Display format used when no action is selected
pub const DEFAULT_OUTPUT_FORMAT: &str = concat!(
    r"\ $(name)s {$(alias)s, $(completed)s}\n",
    r"  $(is_open)s $(is_complete)s $(is_ignored)s P$(prio)s $(done)5.1f$(pc)s",
    r" R:$(ratio)6.2f SZ:$(size.sz)s U:$(up.sz)s/s D:$(down.sz)s/s",
);

/// Display format used while an action runs
pub const DEFAULT_ACTION_FORMAT: &str = r"$(action)8s $(hash)s $(name)s";

/// Fields used to sort matches when `--sort-fields` is not given
pub const DEFAULT_SORT_FIELDS: &str = "name,alias";

fn default_output_format() -> String {
    DEFAULT_OUTPUT_FORMAT.to_string()
}

fn default_action_format() -> String {
    DEFAULT_ACTION_FORMAT.to_string()
}

fn default_sort_fields() -> String {
    DEFAULT_SORT_FIELDS.to_string()
}

/// Process-wide settings, loaded once and passed to the components that
/// need them
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct ControlConfig {
    /// Sort order when `--sort-fields` is not given
    #[serde(default = "default_sort_fields")]
    pub sort_fields: String,

    /// Output format when no action is selected; `-` disables output
    #[serde(default = "default_output_format")]
    pub output_format: String,

    /// Output format while an action runs; `-` disables output
    #[serde(default = "default_action_format")]
    pub action_format: String,

    /// Snapshot file to read torrents from
    #[serde(default)]
    pub source: Option<PathBuf>,
}

impl Default for ControlConfig {
    fn default() -> Self {
        Self {
            sort_fields: default_sort_fields(),
            output_format: default_output_format(),
            action_format: default_action_format(),
            source: None,
        }
    }
}

impl ControlConfig {
    /// Get the path to the config file
    ///
    /// Uses `config_dir` when given, the system config directory otherwise.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if the system config directory cannot be determined.
    pub fn config_path(config_dir: Option<&Path>) -> Result<PathBuf, ConfigError> {
        if let Some(dir) = config_dir {
            return Ok(dir.join("config.toml"));
        }
        let config_dir = dirs::config_dir()
            .ok_or_else(|| ConfigError::Message("Could not determine config directory".to_string()))?;
        Ok(config_dir.join("rtcontrol").join("config.toml"))
    }

    /// Load configuration from the config directory and the environment
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if the config file cannot be parsed.
    pub fn load(config_dir: Option<&Path>) -> Result<Self, ConfigError> {
        let config_path = Self::config_path(config_dir)?;
        Self::load_from(&config_path, Environment::with_prefix(ENV_PREFIX))
    }

    /// Load configuration from a specific file, then apply `env` overrides
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if the config file cannot be parsed.
    pub fn load_from(config_path: &Path, env: Environment) -> Result<Self, ConfigError> {
        tracing::debug!(path = %config_path.display(), "loading configuration");

        let settings = Config::builder()
            .add_source(
                File::from(config_path)
                    .format(FileFormat::Toml)
                    .required(false),
            )
            .add_source(env)
            .build()?;

        settings.try_deserialize()
    }
}
