mod methods_fetch;

use std::{path::PathBuf, time::Instant};

use anyhow::{Context, Result};
use chrono::Utc;
use tokio::sync::mpsc;

use crate::{
    app::{
        events::{AppEvent, schedule_retry, start_frame_task, start_refresh_task},
        settings::{RuntimeSettings, save_runtime_settings},
    },
    cli::Cli,
    data::forecast::ForecastClient,
    domain::weather::{ForecastBundle, Location, RefreshMetadata, WeatherSnapshot},
    resilience::{backoff::Backoff, freshness::evaluate_freshness},
    scene::{SceneComposer, SceneSummary},
};

/// How often, in frames, the running stage is summarised at `info`.
const SUMMARY_EVERY_FRAMES: u64 = 900;
/// Sample forecasts advance on this period in demo mode.
const DEMO_STEP_SECS: u64 = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppMode {
    Loading,
    Ready,
    Error,
    Quit,
}

#[derive(Debug)]
pub struct AppState {
    pub mode: AppMode,
    pub running: bool,
    pub last_error: Option<String>,
    pub location: Location,
    pub weather: Option<ForecastBundle>,
    pub refresh_meta: RefreshMetadata,
    pub hour_offset: usize,
    pub settings: RuntimeSettings,
    pub settings_path: Option<PathBuf>,
    pub composer: SceneComposer,
    pub backoff: Backoff,
    pub fetch_in_flight: bool,
    pub last_frame_at: Instant,
    pub frame_tick: u64,
    forecast_client: ForecastClient,
}

impl AppState {
    pub fn new(cli: &Cli, settings: RuntimeSettings, settings_path: Option<PathBuf>) -> Result<Self> {
        let mut composer = SceneComposer::seeded(settings.tuning, cli.seed);
        composer
            .setup(settings.terrain.catalog_index())
            .context("selecting terrain failed")?;
        let forecast_client = match &cli.forecast_url {
            Some(url) => ForecastClient::with_base_url(url.clone()),
            None => ForecastClient::new(),
        };

        Ok(Self {
            mode: AppMode::Loading,
            running: true,
            last_error: None,
            location: cli.location(),
            weather: None,
            refresh_meta: RefreshMetadata::default(),
            hour_offset: cli.hour_offset,
            settings,
            settings_path,
            composer,
            backoff: Backoff::for_fetch(),
            fetch_in_flight: false,
            last_frame_at: Instant::now(),
            frame_tick: 0,
            forecast_client,
        })
    }

    pub async fn handle_event(
        &mut self,
        event: AppEvent,
        tx: &mpsc::Sender<AppEvent>,
        cli: &Cli,
    ) -> Result<()> {
        match event {
            AppEvent::Bootstrap => {
                cli.validate()?;
                if !cli.one_shot {
                    start_frame_task(tx.clone(), cli.fps);
                    let period = if cli.demo {
                        DEMO_STEP_SECS
                    } else {
                        self.settings.refresh_interval_secs
                    };
                    start_refresh_task(tx.clone(), period);
                }
                self.start_fetch(tx, cli).await?;
            }
            AppEvent::TickFrame => self.on_frame(cli),
            AppEvent::TickRefresh => {
                if cli.demo && self.weather.is_some() {
                    self.step_demo()?;
                } else {
                    self.start_fetch(tx, cli).await?;
                }
            }
            AppEvent::FetchStarted => {
                self.fetch_in_flight = true;
                if self.weather.is_none() {
                    self.mode = AppMode::Loading;
                }
                self.refresh_meta.last_attempt = Some(Utc::now());
            }
            AppEvent::FetchSucceeded(bundle) => {
                self.fetch_in_flight = false;
                self.refresh_meta.mark_success(bundle.fetched_at);
                self.backoff.reset();
                self.last_error = None;
                log::info!(
                    "forecast for {} received ({} hours)",
                    bundle.location.name,
                    bundle.hourly.len()
                );
                self.weather = Some(bundle);
                self.apply_forecast(cli)?;
                self.mode = AppMode::Ready;
                if cli.one_shot {
                    tx.send(AppEvent::Quit).await?;
                }
            }
            AppEvent::FetchFailed(err) => {
                self.fetch_in_flight = false;
                self.refresh_meta.mark_failure();
                self.refresh_meta.state = evaluate_freshness(
                    self.refresh_meta.last_success,
                    self.refresh_meta.consecutive_failures,
                    Utc::now(),
                );
                if cli.one_shot {
                    anyhow::bail!("forecast unavailable: {err}");
                }
                let delay = self.backoff.next_delay();
                log::warn!("forecast fetch failed: {err}; retrying in {}s", delay.as_secs());
                if self.weather.is_none() {
                    self.mode = AppMode::Error;
                }
                self.last_error = Some(err);
                schedule_retry(tx.clone(), delay);
            }
            AppEvent::Quit => self.quit(cli),
        }

        Ok(())
    }

    pub fn summary(&self) -> SceneSummary {
        self.composer.summary()
    }

    fn on_frame(&mut self, cli: &Cli) {
        let now = Instant::now();
        let delta = now.duration_since(self.last_frame_at);
        self.last_frame_at = now;
        self.frame_tick = self.frame_tick.saturating_add(1);

        self.composer.advance_frame(delta.as_secs_f64());
        self.refresh_meta.state = evaluate_freshness(
            self.refresh_meta.last_success,
            self.refresh_meta.consecutive_failures,
            Utc::now(),
        );

        if self.frame_tick % SUMMARY_EVERY_FRAMES == 0 {
            let summary = self.composer.summary();
            log::info!(
                "frame {}: {} of {} clouds visible, {} curtains, freshness {:?}",
                self.frame_tick,
                summary.clouds_visible,
                summary.clouds_active,
                summary.precipitation_units,
                self.refresh_meta.state
            );
        }
        if cli.frames.is_some_and(|limit| self.frame_tick >= limit) {
            log::info!("frame limit {} reached", self.frame_tick);
            self.quit(cli);
        }
    }

    /// Stops the stage and saves settings; every exit path ends here.
    fn quit(&mut self, cli: &Cli) {
        self.composer.stop();
        self.mode = AppMode::Quit;
        self.persist_settings(cli);
    }

    /// Index into the hourly list for the hour that should be on stage.
    fn current_index(&self, cli: &Cli) -> usize {
        if cli.demo {
            return self.hour_offset;
        }
        let elapsed = self
            .weather
            .as_ref()
            .map_or(0, |bundle| (Utc::now() - bundle.fetched_at).num_hours().max(0));
        self.hour_offset + usize::try_from(elapsed).unwrap_or(0)
    }

    pub fn current_snapshot(&self, cli: &Cli) -> Option<WeatherSnapshot> {
        self.weather
            .as_ref()
            .and_then(|bundle| bundle.snapshot_at(self.current_index(cli)))
    }

    fn apply_forecast(&mut self, cli: &Cli) -> Result<()> {
        let Some(snapshot) = self.current_snapshot(cli) else {
            return Ok(());
        };
        let unchanged = self.composer.root().is_some()
            && self.composer.scale() == self.settings.scale
            && self.composer.forecast() == Some(&snapshot.sanitized());
        if unchanged {
            log::debug!("displayed hour unchanged; keeping the live stage");
        } else {
            self.composer
                .update(snapshot, self.settings.scale)
                .context("rebuilding stage failed")?;
            log::debug!("stage updated: {snapshot:?}");
        }
        self.composer.start();
        Ok(())
    }

    fn step_demo(&mut self) -> Result<()> {
        let Some(hours) = self.weather.as_ref().map(|b| b.hourly.len()) else {
            return Ok(());
        };
        if hours == 0 {
            return Ok(());
        }
        self.hour_offset = (self.hour_offset + 1) % hours;
        let Some(snapshot) = self.weather.as_ref().and_then(|b| b.snapshot_at(self.hour_offset)) else {
            return Ok(());
        };
        log::info!("demo hour {}: {:?}", self.hour_offset, snapshot.condition);
        self.composer
            .update(snapshot, self.settings.scale)
            .context("rebuilding stage failed")
    }

    fn persist_settings(&self, cli: &Cli) {
        if cli.no_settings {
            return;
        }
        let Some(path) = &self.settings_path else {
            return;
        };
        if let Err(err) = save_runtime_settings(path, &self.settings) {
            log::warn!("settings not saved: {err:#}");
        }
    }
}

#[cfg(test)]
mod tests;
