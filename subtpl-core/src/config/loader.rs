//! Configuration file loading and merging

use super::builtin;
use super::schema::{EngineConfig, MarkerConfig, TemplateConfig};
use crate::error::{Result, TemplateError};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use subtpl_filter::{CatalogValidator, RegionCatalog};

pub struct ConfigLoader;

impl ConfigLoader {
    /// Find user config by checking environment and standard locations
    pub fn find_user_config() -> Option<PathBuf> {
        // 1. $SUBTPL_CONFIG
        if let Ok(path) = env::var("SUBTPL_CONFIG") {
            let p = PathBuf::from(path);
            if p.exists() {
                return Some(p);
            }
        }

        // 2. $XDG_CONFIG_HOME/subtpl/config.toml
        if let Ok(xdg) = env::var("XDG_CONFIG_HOME") {
            let p = PathBuf::from(xdg).join("subtpl/config.toml");
            if p.exists() {
                return Some(p);
            }
        }

        // 3. ~/.config/subtpl/config.toml
        if let Ok(home) = env::var("HOME") {
            let p = PathBuf::from(home).join(".config/subtpl/config.toml");
            if p.exists() {
                return Some(p);
            }
        }

        None
    }

    /// Load config from a file
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<EngineConfig> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path).map_err(|source| TemplateError::ConfigLoad {
            path: path.to_path_buf(),
            source,
        })?;

        let config: EngineConfig = toml::from_str(&contents)?;
        Ok(config)
    }

    /// Load built-in configuration embedded in the binary
    pub fn load_builtin() -> Result<EngineConfig> {
        Ok(builtin::get_builtin().clone())
    }

    /// Merge user config on top of built-in config
    ///
    /// Sections the user changed from their defaults replace the builtin
    /// ones; a non-empty user region list replaces the builtin list.
    pub fn merge_configs(mut base: EngineConfig, override_cfg: EngineConfig) -> EngineConfig {
        base.common = override_cfg.common;

        if override_cfg.template != TemplateConfig::default() {
            base.template = override_cfg.template;
        }

        if override_cfg.markers != MarkerConfig::default() {
            base.markers = override_cfg.markers;
        }

        let defaults = RegionCatalog::default();
        let regions = override_cfg.regions;
        if regions.other_name != defaults.other_name {
            base.regions.other_name = regions.other_name;
        }
        if regions.group_type != defaults.group_type {
            base.regions.group_type = regions.group_type;
        }
        if regions.url != defaults.url {
            base.regions.url = regions.url;
        }
        if regions.interval != defaults.interval {
            base.regions.interval = regions.interval;
        }
        if regions.tolerance != defaults.tolerance {
            base.regions.tolerance = regions.tolerance;
        }
        if !regions.entries.is_empty() {
            base.regions.entries = regions.entries;
        }

        base
    }

    /// Load config with built-in as lowest-priority fallback
    /// Priority: User config > Built-in config
    pub fn load_with_builtins() -> Result<EngineConfig> {
        let builtin = Self::load_builtin()?;

        let config = match Self::find_user_config() {
            Some(path) => {
                tracing::debug!("Loading user config from {:?}", path);
                let user = Self::load_from_file(&path)?;
                Self::merge_configs(builtin, user)
            }
            None => {
                tracing::debug!("No user config found, using built-in defaults");
                builtin
            }
        };

        Self::validate(&config)?;
        Ok(config)
    }

    /// Load config from optional path or default with built-in merge
    /// Priority: Explicit path > User config > Built-in config
    pub fn load_or_builtin(path: Option<PathBuf>) -> Result<EngineConfig> {
        if let Some(p) = path {
            let user = Self::load_from_file(&p)?;
            let config = Self::merge_configs(Self::load_builtin()?, user);
            Self::validate(&config)?;
            Ok(config)
        } else {
            Self::load_with_builtins()
        }
    }

    fn validate(config: &EngineConfig) -> Result<()> {
        CatalogValidator::validate(&config.regions)?;
        Ok(())
    }
}
