use std::{
    fs,
    path::{Path, PathBuf},
};

use anyhow::Context;
use serde::{Deserialize, Serialize};

use crate::{
    cli::{Cli, DEFAULT_REFRESH_SECS, ScaleArg, TerrainArg},
    scene::{catalog::DisplayScale, tuning::StageTuning},
};

const CONFIG_DIR_ENV: &str = "WEATHER_DIORAMA_CONFIG_DIR";

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RuntimeSettings {
    pub terrain: TerrainArg,
    pub scale: DisplayScale,
    pub refresh_interval_secs: u64,
    pub tuning: StageTuning,
}

impl Default for RuntimeSettings {
    fn default() -> Self {
        Self {
            terrain: TerrainArg::default(),
            scale: DisplayScale::default(),
            refresh_interval_secs: DEFAULT_REFRESH_SECS,
            tuning: StageTuning::default(),
        }
    }
}

impl RuntimeSettings {
    pub fn from_cli_defaults(cli: &Cli) -> Self {
        Self {
            terrain: cli.terrain,
            scale: cli.scale.into(),
            refresh_interval_secs: cli.refresh_interval,
            tuning: StageTuning::default(),
        }
    }

    /// CLI flags that differ from their defaults win over saved values.
    fn apply_cli_overrides(&mut self, cli: &Cli) {
        if cli.terrain != TerrainArg::default() {
            self.terrain = cli.terrain;
        }
        if cli.scale != ScaleArg::default() {
            self.scale = cli.scale.into();
        }
        if cli.refresh_interval != DEFAULT_REFRESH_SECS {
            self.refresh_interval_secs = cli.refresh_interval;
        }
    }
}

pub fn load_runtime_settings(cli: &Cli, enable_disk: bool) -> (RuntimeSettings, Option<PathBuf>) {
    if !enable_disk {
        return (RuntimeSettings::from_cli_defaults(cli), None);
    }
    load_runtime_settings_from(cli, settings_path())
}

/// Reads `path` when it holds a usable settings file, then layers the CLI
/// on top. Tuning that fails validation is replaced by the defaults.
pub fn load_runtime_settings_from(
    cli: &Cli,
    path: Option<PathBuf>,
) -> (RuntimeSettings, Option<PathBuf>) {
    let mut settings = RuntimeSettings::from_cli_defaults(cli);
    let Some(path) = path else {
        return (settings, None);
    };

    if let Ok(content) = fs::read_to_string(&path) {
        match serde_json::from_str::<RuntimeSettings>(&content) {
            Ok(saved) => settings = saved,
            Err(err) => log::warn!("ignoring unreadable settings at {}: {err}", path.display()),
        }
    }

    if let Err(err) = settings.tuning.validate() {
        log::warn!("saved tuning rejected, using defaults: {err}");
        settings.tuning = StageTuning::default();
    }
    settings.apply_cli_overrides(cli);

    (settings, Some(path))
}

pub fn save_runtime_settings(path: &Path, settings: &RuntimeSettings) -> anyhow::Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).context("creating settings directory failed")?;
    }
    let payload =
        serde_json::to_string_pretty(settings).context("serializing settings payload failed")?;
    fs::write(path, payload).context("writing settings file failed")
}

fn settings_path() -> Option<PathBuf> {
    if let Some(base) = std::env::var_os(CONFIG_DIR_ENV) {
        return Some(PathBuf::from(base).join("settings.json"));
    }

    let home = std::env::var_os("HOME")?;
    Some(
        PathBuf::from(home)
            .join(".config")
            .join("weather-diorama")
            .join("settings.json"),
    )
}
