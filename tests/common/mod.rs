#![allow(dead_code)]

use clap::Parser;
use rand::{SeedableRng, rngs::StdRng};
use weather_diorama::{
    cli::Cli,
    domain::weather::{Condition, WeatherSnapshot},
    scene::{SceneComposer, assets::AssetCache, tuning::StageTuning},
};

pub const FIELD: usize = 0;

pub fn cli(args: &[&str]) -> Cli {
    Cli::parse_from(
        ["weather-diorama", "--no-settings"]
            .into_iter()
            .chain(args.iter().copied()),
    )
}

pub fn composer(seed: u64) -> SceneComposer {
    SceneComposer::new(
        AssetCache::default(),
        StageTuning::default(),
        StdRng::seed_from_u64(seed),
    )
}

pub fn field_composer(seed: u64) -> SceneComposer {
    let mut composer = composer(seed);
    composer.setup(FIELD).expect("field terrain");
    composer.start();
    composer
}

pub fn snapshot(condition: Condition, cover: f64, precipitation_mm: f64) -> WeatherSnapshot {
    WeatherSnapshot {
        is_daylight: true,
        condition,
        cloud_cover: cover,
        precipitation_mm,
        wind_speed_kph: 20.0,
        wind_direction_deg: 45.0,
    }
}

pub fn forecast_payload(hours: usize, weather_code: u8, precipitation: f64) -> serde_json::Value {
    let time: Vec<String> = (0..hours)
        .map(|hour| format!("2026-02-12T{:02}:00", hour % 24))
        .collect();
    serde_json::json!({
        "latitude": 37.89,
        "longitude": -119.54,
        "hourly": {
            "time": time,
            "is_day": vec![1; hours],
            "weather_code": vec![weather_code; hours],
            "cloud_cover": vec![50.0; hours],
            "precipitation": vec![precipitation; hours],
            "wind_speed_10m": vec![20.0; hours],
            "wind_direction_10m": vec![45.0; hours],
        }
    })
}
