use std::time::Duration;

use rand::Rng;
use tokio::{
    sync::mpsc::Sender,
    time::{MissedTickBehavior, interval, sleep},
};

use crate::domain::weather::ForecastBundle;

#[derive(Debug)]
pub enum AppEvent {
    Bootstrap,
    TickFrame,
    TickRefresh,
    FetchStarted,
    FetchSucceeded(ForecastBundle),
    FetchFailed(String),
    Quit,
}

/// Frame period for a target rate; rates under 15 fps are raised to 15.
pub fn frame_period(fps: u8) -> Duration {
    Duration::from_millis(1000_u64 / u64::from(fps.max(15)))
}

pub fn start_frame_task(tx: Sender<AppEvent>, fps: u8) {
    let period = frame_period(fps);
    tokio::spawn(async move {
        let mut ticker = interval(period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        loop {
            ticker.tick().await;
            if tx.send(AppEvent::TickFrame).await.is_err() {
                break;
            }
        }
    });
}

pub fn start_refresh_task(tx: Sender<AppEvent>, refresh_secs: u64) {
    tokio::spawn(async move {
        let base = refresh_secs.max(10);
        loop {
            let wait_secs = {
                let mut rng = rand::rng();
                let jitter = rng.random_range(-0.1f32..0.1f32);
                ((base as f32) * (1.0 + jitter)).max(1.0)
            };
            sleep(Duration::from_secs_f32(wait_secs)).await;
            if tx.send(AppEvent::TickRefresh).await.is_err() {
                break;
            }
        }
    });
}

pub fn schedule_retry(tx: Sender<AppEvent>, delay: Duration) {
    tokio::spawn(async move {
        sleep(delay.max(Duration::from_secs(1))).await;
        let _ = tx.send(AppEvent::TickRefresh).await;
    });
}
