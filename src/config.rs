//! Configuration for evalia-cal

use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Config file looked up in the working directory when `--config` isn't given
pub(crate) const DEFAULT_CONFIG_PATH: &str = "evalia.toml";

#[derive(Clone, Debug, Deserialize, Eq, PartialEq)]
#[serde(deny_unknown_fields)]
pub(crate) struct Config {
    /// Saved `/subjects` response to read classes from (`-` for stdin)
    #[serde(default = "default_subjects")]
    pub(crate) subjects: PathBuf,
    /// File to write log records to.  Without one, logs only go to stderr in
    /// `--list` mode.
    #[serde(default)]
    pub(crate) log_file: Option<PathBuf>,
    /// Log filter directive used when `EVALIA_LOG` is unset
    #[serde(default = "default_log")]
    pub(crate) log: String,
}

fn default_subjects() -> PathBuf {
    PathBuf::from("subjects.json")
}

fn default_log() -> String {
    "warn".to_string()
}

impl Default for Config {
    fn default() -> Config {
        Config {
            subjects: default_subjects(),
            log_file: None,
            log: default_log(),
        }
    }
}

impl Config {
    /// Load configuration from `path`, or from `evalia.toml` if it exists,
    /// then apply environment overrides
    pub(crate) fn load(path: Option<&Path>) -> Result<Config> {
        let mut config = match path {
            Some(path) => Self::load_from(path)?,
            None if Path::new(DEFAULT_CONFIG_PATH).exists() => {
                Self::load_from(Path::new(DEFAULT_CONFIG_PATH))?
            }
            None => Config::default(),
        };
        config.apply_env(|var| std::env::var(var).ok());
        Ok(config)
    }

    fn load_from(path: &Path) -> Result<Config> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config from {}", path.display()))?;
        Self::from_toml(&content)
            .with_context(|| format!("failed to parse config from {}", path.display()))
    }

    pub(crate) fn from_toml(content: &str) -> Result<Config, toml::de::Error> {
        toml::from_str(content)
    }

    /// Override fields from `EVALIA_SUBJECTS` and `EVALIA_LOG_FILE`
    fn apply_env<F>(&mut self, var: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(subjects) = var("EVALIA_SUBJECTS").filter(|s| !s.is_empty()) {
            self.subjects = PathBuf::from(subjects);
        }
        if let Some(log_file) = var("EVALIA_LOG_FILE").filter(|s| !s.is_empty()) {
            self.log_file = Some(PathBuf::from(log_file));
        }
    }
}
