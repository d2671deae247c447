//! Configuration file discovery and loading
//!
//! Base files have a single dot in their name (`app.ini`); environment
//! overrides follow `{name}.{env}.ini` (`app.develop.ini`). Files are
//! returned base first, then overrides, so that later files win when they
//! are layered by [`ConfigManagement::load`].

use std::env;
use std::path::{Path, PathBuf};

use config::{Config, File, FileFormat};
use serde::de::DeserializeOwned;
use thiserror::Error;

use super::environment::{Environment, DEFAULT_ENV_VAR};

/// Extension of discoverable configuration files
pub const CONFIG_EXTENSION: &str = "ini";

/// Configuration loading errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config directory {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to load configuration: {0}")]
    Load(#[from] config::ConfigError),
}

/// Options controlling which environment overrides are picked up
#[derive(Debug, Clone)]
pub struct DiscoveryOptions {
    /// Environment variable naming the active environment
    pub env_var: String,
    /// Environment used when the variable is unset
    pub default_env: String,
}

impl Default for DiscoveryOptions {
    fn default() -> Self {
        Self {
            env_var: DEFAULT_ENV_VAR.to_string(),
            default_env: Environment::default().as_str().to_string(),
        }
    }
}

impl DiscoveryOptions {
    /// The environment name currently selected, lowercased
    pub fn target_env(&self) -> String {
        env::var(&self.env_var)
            .unwrap_or_else(|_| self.default_env.clone())
            .to_lowercase()
    }
}

/// Scanning, loading and materializing configuration files
pub struct ConfigManagement;

impl ConfigManagement {
    /// Scan `search_paths` for config files using the default options
    pub fn get_config_files<P: AsRef<Path>>(search_paths: &[P]) -> Result<Vec<PathBuf>, ConfigError> {
        Self::get_config_files_with(search_paths, &DiscoveryOptions::default())
    }

    /// Scan `search_paths` for config files, reading the environment from `options`
    pub fn get_config_files_with<P: AsRef<Path>>(
        search_paths: &[P],
        options: &DiscoveryOptions,
    ) -> Result<Vec<PathBuf>, ConfigError> {
        Self::discover(search_paths, &options.target_env())
    }

    /// Scan `search_paths` for base files and overrides of `target_env`.
    ///
    /// Missing directories are skipped. Within a directory files are sorted
    /// by name.
    pub fn discover<P: AsRef<Path>>(
        search_paths: &[P],
        target_env: &str,
    ) -> Result<Vec<PathBuf>, ConfigError> {
        let target_env = target_env.to_lowercase();
        let mut base_files = Vec::new();
        let mut env_files = Vec::new();

        for dir in search_paths.iter().map(AsRef::as_ref) {
            if !dir.is_dir() {
                continue;
            }
            let dir = dir.canonicalize().map_err(|source| ConfigError::Io {
                path: dir.to_path_buf(),
                source,
            })?;

            let entries = std::fs::read_dir(&dir).map_err(|source| ConfigError::Io {
                path: dir.clone(),
                source,
            })?;
            let mut files: Vec<PathBuf> = entries
                .filter_map(|entry| entry.ok())
                .map(|entry| entry.path())
                .filter(|path| {
                    path.is_file()
                        && path.extension().and_then(|ext| ext.to_str()) == Some(CONFIG_EXTENSION)
                })
                .collect();
            files.sort();

            for path in files {
                let Some(filename) = path.file_name().and_then(|name| name.to_str()) else {
                    continue;
                };

                if is_base_config_file(filename) {
                    base_files.push(path);
                    continue;
                }

                let candidate = configuration_env(filename);
                if candidate == target_env {
                    env_files.push(path);
                } else if !Environment::is_known(&candidate) {
                    tracing::debug!(
                        "Ignored config file (unknown env/format): {}",
                        path.display()
                    );
                }
            }
        }

        base_files.extend(env_files);
        Ok(base_files)
    }

    /// Layer `files` in order; later files override earlier ones.
    ///
    /// The format is taken from each file's extension (`ini`, `toml`).
    pub fn load<P: AsRef<Path>>(files: &[P]) -> Result<Config, ConfigError> {
        let builder = files.iter().fold(Config::builder(), |builder, path| {
            let path = path.as_ref();
            let format = match path.extension().and_then(|ext| ext.to_str()) {
                Some("toml") => FileFormat::Toml,
                _ => FileFormat::Ini,
            };
            builder.add_source(File::from(path).format(format))
        });
        Ok(builder.build()?)
    }

    /// Materialize a loaded configuration into a typed struct
    pub fn provide<T: DeserializeOwned>(config: &Config) -> Result<T, ConfigError> {
        Ok(config.clone().try_deserialize()?)
    }

    /// Discover, load and materialize in one step
    pub fn from_dirs<T, P>(search_paths: &[P], options: &DiscoveryOptions) -> Result<T, ConfigError>
    where
        T: DeserializeOwned,
        P: AsRef<Path>,
    {
        let files = Self::get_config_files_with(search_paths, options)?;
        tracing::debug!(files = ?files, "Loading configuration files");
        let config = Self::load(&files)?;
        Self::provide(&config)
    }
}

/// Base files have exactly one dot: `{name}.ini`
fn is_base_config_file(filename: &str) -> bool {
    filename.matches('.').count() == 1
}

/// Environment segment of `{name}.{env}.ini`
fn configuration_env(filename: &str) -> String {
    filename
        .rsplit('.')
        .nth(1)
        .unwrap_or_default()
        .to_lowercase()
}
