// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Context, Result, anyhow, bail};
use permia_app::{CapacityPolicy, DEFAULT_PAGE_SIZE, EntityKind, TableOptions};
use serde::Deserialize;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

pub const APP_NAME: &str = "permia";
const CONFIG_VERSION: i64 = 1;
const DEFAULT_LOG_LEVEL: &str = "info";

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub version: i64,
    #[serde(default)]
    pub data: Data,
    #[serde(default)]
    pub ui: Ui,
    #[serde(default)]
    pub filters: Filters,
    #[serde(default)]
    pub log: Log,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            version: CONFIG_VERSION,
            data: Data::default(),
            ui: Ui::default(),
            filters: Filters::default(),
            log: Log::default(),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Data {
    pub fixtures_path: Option<String>,
    pub demo_rows: Option<usize>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Ui {
    pub page_size: Option<usize>,
    pub start_tab: Option<String>,
}

impl Default for Ui {
    fn default() -> Self {
        Self {
            page_size: Some(DEFAULT_PAGE_SIZE),
            start_tab: Some(EntityKind::Users.as_str().to_owned()),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct Filters {
    pub capacity_low_max: Option<f64>,
    pub capacity_high_min: Option<f64>,
}

impl Default for Filters {
    fn default() -> Self {
        let policy = CapacityPolicy::default();
        Self {
            capacity_low_max: Some(policy.low_max),
            capacity_high_min: Some(policy.high_min),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct Log {
    pub enabled: Option<bool>,
    pub level: Option<String>,
    pub path: Option<String>,
}

impl Default for Log {
    fn default() -> Self {
        Self {
            enabled: Some(true),
            level: Some(DEFAULT_LOG_LEVEL.to_owned()),
            path: None,
        }
    }
}

impl Config {
    pub fn default_path() -> Result<PathBuf> {
        if let Some(path) = env::var_os("PERMIA_CONFIG_PATH") {
            return Ok(PathBuf::from(path));
        }

        let config_root = dirs::config_dir().ok_or_else(|| {
            anyhow!("cannot resolve config directory; set PERMIA_CONFIG_PATH to the config file")
        })?;
        Ok(config_root.join(APP_NAME).join("config.toml"))
    }

    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let raw = fs::read_to_string(path)
            .with_context(|| format!("read config file {}", path.display()))?;
        let value: toml::Value = toml::from_str(&raw)
            .with_context(|| format!("parse TOML config {}", path.display()))?;

        let version = value
            .get("version")
            .and_then(toml::Value::as_integer)
            .ok_or_else(|| {
                anyhow!(
                    "config file {} is not versioned. Add `version = 1` and put values under [data], [ui], [filters], and [log]",
                    path.display()
                )
            })?;

        if version != CONFIG_VERSION {
            bail!(
                "unsupported config version {} in {}; expected version = 1",
                version,
                path.display()
            );
        }

        let config: Config = value
            .try_into()
            .with_context(|| format!("decode config {}", path.display()))?;
        config.validate(path)?;
        Ok(config)
    }

    fn validate(&self, path: &Path) -> Result<()> {
        if self.version != CONFIG_VERSION {
            bail!(
                "config {} has version {}; expected 1",
                path.display(),
                self.version
            );
        }

        if self.ui.page_size == Some(0) {
            bail!(
                "ui.page_size in {} must be positive -- set it to 10 or more and retry",
                path.display()
            );
        }

        if let Some(tab) = &self.ui.start_tab
            && EntityKind::parse(tab).is_none()
        {
            let known = EntityKind::ALL
                .iter()
                .map(|kind| kind.as_str())
                .collect::<Vec<_>>()
                .join(", ");
            bail!(
                "ui.start_tab {tab:?} in {} is not a table; use one of: {known}",
                path.display()
            );
        }

        for (key, value) in [
            ("capacity_low_max", self.filters.capacity_low_max),
            ("capacity_high_min", self.filters.capacity_high_min),
        ] {
            if let Some(value) = value
                && !(0.0..=1.0).contains(&value)
            {
                bail!(
                    "filters.{key} in {} must be between 0 and 1, got {value}",
                    path.display()
                );
            }
        }

        let policy = self.capacity_policy();
        if policy.low_max > policy.high_min {
            bail!(
                "filters.capacity_low_max ({}) in {} exceeds filters.capacity_high_min ({}) -- lower it and retry",
                policy.low_max,
                path.display(),
                policy.high_min
            );
        }

        if let Some(level) = &self.log.level {
            tracing_subscriber::EnvFilter::try_new(level).with_context(|| {
                format!(
                    "log.level {level:?} in {} is not a valid filter; use error, warn, info, debug or trace",
                    path.display()
                )
            })?;
        }

        Ok(())
    }

    pub fn fixtures_path(&self) -> Option<PathBuf> {
        self.data.fixtures_path.as_deref().map(PathBuf::from)
    }

    pub fn demo_rows(&self) -> usize {
        self.data.demo_rows.unwrap_or(0)
    }

    pub fn page_size(&self) -> usize {
        self.ui.page_size.unwrap_or(DEFAULT_PAGE_SIZE)
    }

    pub fn start_tab(&self) -> EntityKind {
        self.ui
            .start_tab
            .as_deref()
            .and_then(EntityKind::parse)
            .unwrap_or(EntityKind::Users)
    }

    pub fn capacity_policy(&self) -> CapacityPolicy {
        let defaults = CapacityPolicy::default();
        CapacityPolicy {
            low_max: self.filters.capacity_low_max.unwrap_or(defaults.low_max),
            high_min: self.filters.capacity_high_min.unwrap_or(defaults.high_min),
        }
    }

    pub fn table_options(&self) -> TableOptions {
        TableOptions {
            page_size: self.page_size(),
            capacity: self.capacity_policy(),
        }
    }

    pub fn log_enabled(&self) -> bool {
        self.log.enabled.unwrap_or(true)
    }

    pub fn log_level(&self) -> &str {
        self.log.level.as_deref().unwrap_or(DEFAULT_LOG_LEVEL)
    }

    pub fn log_path(&self) -> Result<PathBuf> {
        if let Some(path) = &self.log.path {
            return Ok(PathBuf::from(path));
        }
        let data_root = dirs::data_local_dir().ok_or_else(|| {
            anyhow!("cannot resolve data directory; set [log].path in the config file")
        })?;
        Ok(data_root.join(APP_NAME).join("permia.log"))
    }

    pub fn example_config(path: &Path) -> String {
        let policy = CapacityPolicy::default();
        format!(
            "# permia config\n# Place this file at: {}\n\nversion = 1\n\n[data]\n# Optional JSON dataset. Built-in fixtures are used when unset.\n# fixtures_path = \"/absolute/path/to/dataset.json\"\n# Generate this many rows per table instead (0 = off).\ndemo_rows = 0\n\n[ui]\npage_size = {}\nstart_tab = \"users\"\n\n[filters]\ncapacity_low_max = {}\ncapacity_high_min = {}\n\n[log]\nenabled = true\nlevel = \"{}\"\n# Optional. Default is platform data dir (for example ~/.local/share/permia/permia.log)\n# path = \"/absolute/path/to/permia.log\"\n",
            path.display(),
            DEFAULT_PAGE_SIZE,
            policy.low_max,
            policy.high_min,
            DEFAULT_LOG_LEVEL,
        )
    }
}
