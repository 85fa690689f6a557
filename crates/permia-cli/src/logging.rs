// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Context, Result};
use std::fs::{self, File, OpenOptions};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer, fmt};

use crate::config::Config;

/// Crates whose chatter drowns out table events at debug level.
const QUIET_TARGETS: &[(&str, &str)] = &[("ratatui", "warn"), ("crossterm", "warn")];

fn build_env_filter(level: &str) -> Result<EnvFilter> {
    let mut directives = vec![level.to_owned()];
    for (target, target_level) in QUIET_TARGETS {
        directives.push(format!("{target}={target_level}"));
    }
    let filter = directives.join(",");
    EnvFilter::try_new(&filter).with_context(|| format!("invalid log filter {filter:?}"))
}

fn open_log_file(path: &Path) -> Result<File> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("create log directory {}", parent.display()))?;
    }
    OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| {
            format!(
                "open log file {} -- set [log].path to a writable file or [log].enabled = false",
                path.display()
            )
        })
}

/// Installs the global subscriber. The terminal belongs to the TUI, so
/// events only go to the log file. Returns the file path when logging is on.
pub fn init_logging(config: &Config) -> Result<Option<PathBuf>> {
    if !config.log_enabled() {
        return Ok(None);
    }

    let path = config.log_path()?;
    let file = open_log_file(&path)?;
    let file_layer = fmt::layer()
        .with_ansi(false)
        .with_target(true)
        .with_writer(Mutex::new(file))
        .with_filter(build_env_filter(config.log_level())?);

    tracing_subscriber::registry()
        .with(file_layer)
        .try_init()
        .context("install log subscriber")?;

    tracing::debug!(path = %path.display(), level = config.log_level(), "logging initialized");
    Ok(Some(path))
}

#[cfg(test)]
mod tests {
    use super::{build_env_filter, open_log_file};
    use anyhow::Result;

    #[test]
    fn filter_keeps_base_level_and_quiets_terminal_crates() -> Result<()> {
        let filter = build_env_filter("debug")?.to_string();
        assert!(filter.contains("debug"), "{filter}");
        assert!(filter.contains("ratatui=warn"), "{filter}");
        Ok(())
    }

    #[test]
    fn log_file_parent_is_created() -> Result<()> {
        let temp = tempfile::tempdir()?;
        let path = temp.path().join("nested").join("permia.log");
        open_log_file(&path)?;
        assert!(path.exists());
        Ok(())
    }

    #[test]
    fn bad_level_reports_the_filter() {
        let error = build_env_filter("permia=loud").expect_err("invalid level");
        assert!(error.to_string().contains("invalid log filter"));
    }
}
