// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Context, Result};
use permia_app::{BroadcastReceipt, Dataset, EntityKind, schema_for};
use permia_testkit::{ConsoleFaker, fixture_dataset};
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use tracing::info;

use crate::config::Config;

const DEMO_SEED: u64 = 7;

/// Where the console's rows come from. Reload re-reads the same source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DataSource {
    Fixtures,
    File(PathBuf),
    Demo { rows: usize },
}

impl DataSource {
    /// Command-line choices win over the config file.
    pub fn resolve(config: &Config, data_path: Option<&Path>, demo_rows: Option<usize>) -> Self {
        if let Some(rows) = demo_rows {
            return Self::Demo { rows };
        }
        if let Some(path) = data_path {
            return Self::File(path.to_path_buf());
        }
        if config.demo_rows() > 0 {
            return Self::Demo {
                rows: config.demo_rows(),
            };
        }
        match config.fixtures_path() {
            Some(path) => Self::File(path),
            None => Self::Fixtures,
        }
    }

    pub fn load(&self) -> Result<Dataset> {
        match self {
            Self::Fixtures => Ok(fixture_dataset()),
            Self::File(path) => load_dataset_file(path),
            Self::Demo { rows } => Ok(ConsoleFaker::new(DEMO_SEED).dataset(*rows)),
        }
    }

    pub fn describe(&self) -> String {
        match self {
            Self::Fixtures => "built-in fixtures".to_owned(),
            Self::File(path) => path.display().to_string(),
            Self::Demo { rows } => format!("{rows} generated rows per table"),
        }
    }
}

pub fn load_dataset_file(path: &Path) -> Result<Dataset> {
    let raw = fs::read_to_string(path).with_context(|| {
        format!(
            "read dataset {} -- check [data].fixtures_path or --data",
            path.display()
        )
    })?;
    serde_json::from_str(&raw).with_context(|| format!("parse dataset JSON {}", path.display()))
}

pub fn total_rows(dataset: &Dataset) -> usize {
    EntityKind::ALL
        .iter()
        .map(|kind| dataset.row_count(*kind))
        .sum()
}

/// Host side of the TUI: data reloads, OSC 52 clipboard, and the hand-off
/// points for record creation and broadcast delivery.
pub struct ConsoleRuntime<W: Write = io::Stdout> {
    source: DataSource,
    clipboard: W,
}

impl ConsoleRuntime {
    pub fn new(source: DataSource) -> Self {
        Self::with_clipboard(source, io::stdout())
    }
}

impl<W: Write> ConsoleRuntime<W> {
    pub fn with_clipboard(source: DataSource, clipboard: W) -> Self {
        Self { source, clipboard }
    }
}

impl<W: Write> permia_tui::AppRuntime for ConsoleRuntime<W> {
    fn load_dataset(&mut self) -> Result<Dataset> {
        let dataset = self.source.load()?;
        info!(
            source = %self.source.describe(),
            rows = total_rows(&dataset),
            "dataset reloaded"
        );
        Ok(dataset)
    }

    fn copy_to_clipboard(&mut self, text: &str) -> Result<()> {
        permia_tui::clipboard::copy_osc52(&mut self.clipboard, text)
    }

    fn request_add(&mut self, kind: EntityKind, action: &'static str) -> Result<String> {
        let label = schema_for(kind)
            .add_action(action)
            .map_or(action, |spec| spec.label);
        info!(kind = kind.as_str(), action, "add request handed off");
        Ok(format!("{label}: request logged for the admin backend"))
    }

    fn deliver_broadcast(&mut self, receipt: &BroadcastReceipt) -> Result<()> {
        info!(
            title = %receipt.title,
            audience = receipt.audience.as_str(),
            recipients = receipt.recipients,
            channels = ?receipt.channels,
            "broadcast handed off"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::{ConsoleRuntime, DataSource, load_dataset_file, total_rows};
    use crate::config::Config;
    use anyhow::Result;
    use permia_app::{BroadcastAudience, BroadcastReceipt, EntityKind};
    use permia_testkit::{fixture_dataset, temp_dataset_file};
    use permia_tui::AppRuntime;
    use std::path::{Path, PathBuf};

    #[test]
    fn cli_flags_override_config_sources() {
        let config = Config::default();
        assert_eq!(DataSource::resolve(&config, None, None), DataSource::Fixtures);
        assert_eq!(
            DataSource::resolve(&config, Some(Path::new("/tmp/rows.json")), None),
            DataSource::File(PathBuf::from("/tmp/rows.json"))
        );
        assert_eq!(
            DataSource::resolve(&config, Some(Path::new("/tmp/rows.json")), Some(50)),
            DataSource::Demo { rows: 50 }
        );

        let mut config = Config::default();
        config.data.fixtures_path = Some("/srv/rows.json".to_owned());
        assert_eq!(
            DataSource::resolve(&config, None, None),
            DataSource::File(PathBuf::from("/srv/rows.json"))
        );
        config.data.demo_rows = Some(20);
        assert_eq!(
            DataSource::resolve(&config, None, None),
            DataSource::Demo { rows: 20 }
        );
    }

    #[test]
    fn dataset_file_round_trips_fixtures() -> Result<()> {
        let (_temp, path) = temp_dataset_file(&fixture_dataset())?;
        let loaded = load_dataset_file(&path)?;
        assert_eq!(loaded, fixture_dataset());
        Ok(())
    }

    #[test]
    fn missing_dataset_file_names_the_setting() {
        let error = load_dataset_file(Path::new("/nonexistent/permia/rows.json"))
            .expect_err("missing file");
        assert!(error.to_string().contains("[data].fixtures_path"));
    }

    #[test]
    fn malformed_dataset_is_a_parse_error() -> Result<()> {
        let temp = tempfile::tempdir()?;
        let path = temp.path().join("rows.json");
        std::fs::write(&path, "{\"users\": [{\"id\": 1}]}")?;
        let error = load_dataset_file(&path).expect_err("bad rows");
        assert!(error.to_string().contains("parse dataset JSON"));
        Ok(())
    }

    #[test]
    fn demo_source_fills_every_table() -> Result<()> {
        let dataset = DataSource::Demo { rows: 12 }.load()?;
        for kind in EntityKind::ALL {
            assert_eq!(dataset.row_count(kind), 12, "{}", kind.as_str());
        }
        assert_eq!(total_rows(&dataset), 72);
        Ok(())
    }

    #[test]
    fn clipboard_goes_through_osc52() -> Result<()> {
        let mut runtime = ConsoleRuntime::with_clipboard(DataSource::Fixtures, Vec::new());
        runtime.copy_to_clipboard("P@ssw0rd-01")?;
        assert!(runtime.clipboard.starts_with(b"\x1b]52;c;"));
        Ok(())
    }

    #[test]
    fn add_and_broadcast_hand_offs_succeed() -> Result<()> {
        let mut runtime = ConsoleRuntime::with_clipboard(DataSource::Fixtures, Vec::new());
        let message = runtime.request_add(EntityKind::VirtualCards, "bulk")?;
        assert!(message.starts_with("bulk import"), "{message}");

        runtime.deliver_broadcast(&BroadcastReceipt {
            title: "Maintenance".to_owned(),
            audience: BroadcastAudience::All,
            recipients: 4,
            channels: vec!["email"],
        })?;
        assert_eq!(runtime.load_dataset()?, fixture_dataset());
        Ok(())
    }
}
