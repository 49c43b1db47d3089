//! Run configuration.
//!
//! Sources are merged in this order, later ones winning:
//! 1. [`RunConfig::default()`]
//! 2. a TOML file (an explicit path, or `conformance.toml` in the working
//!    directory if present)
//! 3. `FC_`-prefixed environment variables, `__` separating nested keys
//!    (e.g. `FC_WORKERS=4`, `FC_LOGGING__LEVEL=debug`)

use std::path::{Path, PathBuf};

use figment::providers::{Env, Format, Serialized, Toml};
use figment::Figment;
use serde::{Deserialize, Serialize};

/// Default configuration file name.
pub const CONFIG_FILE: &str = "conformance.toml";

/// Prefix of configuration environment variables.
pub const ENV_PREFIX: &str = "FC_";

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("configuration file {} not found", path.display())]
    FileNotFound { path: PathBuf },

    #[error("failed to extract configuration: {0}")]
    Extract(#[from] figment::Error),

    #[error("invalid configuration: {0}")]
    Invalid(String),

    #[error("failed to initialize logging: {0}")]
    Logging(String),
}

/// Report output format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "cli", derive(clap::ValueEnum))]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

/// Logging settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Level filter (trace, debug, info, warn, error); `FC_LOG` overrides it
    pub level: String,
    /// Emit JSON log lines
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "warn".to_string(),
            json: false,
        }
    }
}

/// Configuration of one harness run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RunConfig {
    /// Corpus root directory
    pub root: PathBuf,
    /// Concurrent evaluations
    pub workers: usize,
    /// Report format
    pub format: OutputFormat,
    /// Built-in rules left unregistered
    pub disabled_rules: Vec<String>,
    /// File extensions treated as fixtures; empty means every file
    pub extensions: Vec<String>,
    /// Report rules lacking a pass or fail fixture
    pub audit_pairs: bool,
    pub logging: LoggingConfig,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            root: PathBuf::from("fixtures"),
            workers: num_cpus::get().max(1),
            format: OutputFormat::Text,
            disabled_rules: Vec::new(),
            extensions: Vec::new(),
            audit_pairs: true,
            logging: LoggingConfig::default(),
        }
    }
}

impl RunConfig {
    /// Single worker; for debugging evaluators.
    pub fn sequential() -> Self {
        Self {
            workers: 1,
            ..Default::default()
        }
    }

    /// Machine-readable output for CI.
    pub fn ci() -> Self {
        Self {
            format: OutputFormat::Json,
            logging: LoggingConfig {
                level: "info".to_string(),
                json: true,
            },
            ..Default::default()
        }
    }

    /// Check value ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.workers == 0 {
            return Err(ConfigError::Invalid("workers must be at least 1".to_string()));
        }
        crate::logging::parse_log_level(&self.logging.level)?;
        Ok(())
    }
}

/// Loads [`RunConfig`] from defaults, a TOML file and the environment.
#[derive(Debug, Clone, Default)]
pub struct ConfigLoader {
    config_path: Option<PathBuf>,
}

impl ConfigLoader {
    pub fn new() -> Self {
        Self::default()
    }

    /// Read this file instead of looking for `conformance.toml`.
    ///
    /// The file must exist.
    pub fn with_config_path<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.config_path = Some(path.as_ref().to_path_buf());
        self
    }

    /// The explicit configuration path, if any.
    pub fn config_path(&self) -> Option<&Path> {
        self.config_path.as_deref()
    }

    /// The merged configuration sources.
    pub fn figment(&self) -> Result<Figment, ConfigError> {
        let mut figment = Figment::new().merge(Serialized::defaults(RunConfig::default()));

        match &self.config_path {
            Some(path) => {
                if !path.is_file() {
                    return Err(ConfigError::FileNotFound { path: path.clone() });
                }
                figment = figment.merge(Toml::file(path));
                tracing::debug!(path = %path.display(), "Configuration file loaded");
            }
            None => {
                let default_path = Path::new(CONFIG_FILE);
                if default_path.is_file() {
                    figment = figment.merge(Toml::file(default_path));
                    tracing::debug!(path = CONFIG_FILE, "Configuration file loaded");
                }
            }
        }

        Ok(figment.merge(Env::prefixed(ENV_PREFIX).split("__")))
    }

    /// Load and validate the configuration.
    pub fn load(&self) -> Result<RunConfig, ConfigError> {
        let config: RunConfig = self.figment()?.extract()?;
        config.validate()?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use figment::Jail;

    use super::*;

    fn to_figment_error(err: ConfigError) -> figment::Error {
        figment::Error::from(err.to_string())
    }

    #[test]
    fn test_presets() {
        assert!(RunConfig::default().workers >= 1);
        assert_eq!(RunConfig::sequential().workers, 1);
        assert_eq!(RunConfig::ci().format, OutputFormat::Json);
        assert!(RunConfig::ci().logging.json);
    }

    #[test]
    fn test_validate() {
        let config = RunConfig {
            workers: 0,
            ..RunConfig::default()
        };
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));

        let config = RunConfig {
            logging: LoggingConfig {
                level: "loud".to_string(),
                json: false,
            },
            ..RunConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_load_defaults_without_file() {
        Jail::expect_with(|_jail| {
            let config = ConfigLoader::new().load().map_err(to_figment_error)?;
            assert_eq!(config.root, PathBuf::from("fixtures"));
            assert_eq!(config.format, OutputFormat::Text);
            assert!(config.audit_pairs);
            Ok(())
        });
    }

    #[test]
    fn test_load_default_file_and_env() {
        Jail::expect_with(|jail| {
            jail.create_file(
                CONFIG_FILE,
                r#"
                root = "corpus"
                workers = 2
                format = "json"
                disabled_rules = ["C-03-04"]

                [logging]
                level = "debug"
                "#,
            )?;
            jail.set_env("FC_WORKERS", "6");
            jail.set_env("FC_LOGGING__JSON", "true");

            let config = ConfigLoader::new().load().map_err(to_figment_error)?;
            assert_eq!(config.root, PathBuf::from("corpus"));
            assert_eq!(config.workers, 6);
            assert_eq!(config.format, OutputFormat::Json);
            assert_eq!(config.disabled_rules, vec!["C-03-04".to_string()]);
            assert_eq!(config.logging.level, "debug");
            assert!(config.logging.json);
            Ok(())
        });
    }

    #[test]
    fn test_explicit_path_must_exist() {
        Jail::expect_with(|_jail| {
            let err = ConfigLoader::new()
                .with_config_path("missing.toml")
                .load()
                .unwrap_err();
            assert!(matches!(err, ConfigError::FileNotFound { .. }));
            Ok(())
        });
    }

    #[test]
    fn test_invalid_workers_rejected() {
        Jail::expect_with(|jail| {
            jail.create_file("zero.toml", "workers = 0\n")?;
            let result = ConfigLoader::new().with_config_path("zero.toml").load();
            assert!(matches!(result, Err(ConfigError::Invalid(_))));
            Ok(())
        });
    }
}
