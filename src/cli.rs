#![allow(clippy::missing_errors_doc)]

use clap::{Parser, ValueEnum};
use serde::{Deserialize, Serialize};

use crate::{
    domain::weather::{Location, samples::sample_location},
    scene::catalog::DisplayScale,
};

pub const DEFAULT_REFRESH_SECS: u64 = 600;

#[derive(Debug, Clone, Copy, ValueEnum, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum TerrainArg {
    #[default]
    Field,
    Village,
    Town,
}

impl TerrainArg {
    /// Row of the stage catalog this terrain lives in.
    #[must_use]
    pub fn catalog_index(self) -> usize {
        match self {
            TerrainArg::Field => 0,
            TerrainArg::Village => 1,
            TerrainArg::Town => 2,
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum, PartialEq, Eq, Default)]
pub enum ScaleArg {
    #[default]
    Small,
    Medium,
    Large,
}

impl From<ScaleArg> for DisplayScale {
    fn from(value: ScaleArg) -> Self {
        match value {
            ScaleArg::Small => DisplayScale::Small,
            ScaleArg::Medium => DisplayScale::Medium,
            ScaleArg::Large => DisplayScale::Large,
        }
    }
}

#[allow(clippy::struct_excessive_bools)]
#[derive(Debug, Parser, Clone)]
#[command(
    name = "weather-diorama",
    version,
    about = "Weather-driven animated 3D diorama, simulated headless"
)]
pub struct Cli {
    /// Terrain to stage
    #[arg(long, value_enum, default_value_t = TerrainArg::Field)]
    pub terrain: TerrainArg,

    /// Display size preset
    #[arg(long, value_enum, default_value_t = ScaleArg::Small)]
    pub scale: ScaleArg,

    /// Direct latitude (requires --lon)
    #[arg(long, allow_hyphen_values = true)]
    pub lat: Option<f64>,

    /// Direct longitude (requires --lat)
    #[arg(long, allow_hyphen_values = true)]
    pub lon: Option<f64>,

    /// Forecast endpoint override
    #[arg(long)]
    pub forecast_url: Option<String>,

    /// Which hourly entry to stage (0 = current hour)
    #[arg(long, default_value_t = 0)]
    pub hour_offset: usize,

    /// Target FPS (15..60)
    #[arg(long, default_value_t = 30, value_parser = clap::value_parser!(u8).range(15..=60))]
    pub fps: u8,

    /// Refresh interval in seconds
    #[arg(long, default_value_t = DEFAULT_REFRESH_SECS)]
    pub refresh_interval: u64,

    /// Seed for cloud layout and curtain jitter
    #[arg(long)]
    pub seed: Option<u64>,

    /// Stop after this many frames
    #[arg(long)]
    pub frames: Option<u64>,

    /// Cycle built-in sample forecasts instead of fetching
    #[arg(long)]
    pub demo: bool,

    /// Build one stage, print its summary as JSON and exit
    #[arg(long)]
    pub one_shot: bool,

    /// Ignore and never write the settings file
    #[arg(long)]
    pub no_settings: bool,
}

impl Cli {
    pub fn validate(&self) -> anyhow::Result<()> {
        match (self.lat, self.lon) {
            (Some(_), None) | (None, Some(_)) => {
                anyhow::bail!("--lat and --lon must be provided together")
            }
            (Some(lat), Some(lon)) => {
                anyhow::ensure!((-90.0..=90.0).contains(&lat), "--lat {lat} is out of range");
                anyhow::ensure!((-180.0..=180.0).contains(&lon), "--lon {lon} is out of range");
                Ok(())
            }
            (None, None) => Ok(()),
        }
    }

    /// Requested coordinates, or the sample park when none were given.
    #[must_use]
    pub fn location(&self) -> Location {
        match (self.lat, self.lon) {
            (Some(lat), Some(lon)) => Location::from_coords(lat, lon),
            _ => sample_location(),
        }
    }
}
