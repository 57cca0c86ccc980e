use crate::model::Config;
use anyhow::{Context, Result};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

const CONFIG_ENV: &str = "DIRPLAY_CONFIG";
const CONFIG_FILE: &str = "dirplay.json";

/// Resolves the config file: explicit flag, then `DIRPLAY_CONFIG`, then the working directory.
pub fn config_path(explicit: Option<&Path>) -> PathBuf {
    if let Some(path) = explicit {
        return path.to_path_buf();
    }
    if let Ok(override_path) = env::var(CONFIG_ENV)
        && !override_path.trim().is_empty()
    {
        return PathBuf::from(override_path);
    }
    PathBuf::from(CONFIG_FILE)
}

pub fn load_config(path: &Path) -> Result<Config> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("failed to read config file {}", path.display()))?;
    let mut config: Config = serde_json::from_str(&raw)
        .with_context(|| format!("failed to parse config file {}", path.display()))?;
    config.sanitize();
    Ok(config)
}

pub fn save_config(path: &Path, config: &Config) -> Result<()> {
    if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("failed to create {}", parent.display()))?;
    }
    let json = serde_json::to_string_pretty(config)?;
    fs::write(path, json).with_context(|| format!("failed to write {}", path.display()))?;
    Ok(())
}

/// The persisted settings together with the file they live in.
#[derive(Debug, Clone)]
pub struct ConfigStore {
    path: PathBuf,
    pub config: Config,
}

impl ConfigStore {
    /// Loads the config, regenerating and writing back defaults when the file
    /// is missing or unreadable.
    pub fn open(path: PathBuf) -> Self {
        match load_config(&path) {
            Ok(config) => Self { path, config },
            Err(err) => {
                tracing::warn!("using default configuration: {err:#}");
                let store = Self {
                    path,
                    config: Config::default(),
                };
                if let Err(err) = store.save() {
                    tracing::warn!("could not write default configuration: {err:#}");
                }
                store
            }
        }
    }

    pub fn in_memory(path: PathBuf, config: Config) -> Self {
        Self { path, config }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn save(&self) -> Result<()> {
        save_config(&self.path, &self.config)
    }
}

/// Canonical absolute form of `path`, or the path itself when it cannot be resolved.
pub fn normalize_path(path: &Path) -> PathBuf {
    path.canonicalize().unwrap_or_else(|_| path.to_path_buf())
}
