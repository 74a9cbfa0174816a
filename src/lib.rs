pub mod app;
pub mod cli;
pub mod data;
pub mod domain;
pub mod resilience;
pub mod scene;

use anyhow::{Context, Result};
use app::{
    events::AppEvent,
    settings::load_runtime_settings,
    state::{AppMode, AppState},
};
use cli::Cli;
use tokio::sync::mpsc;

pub async fn run(cli: Cli) -> Result<()> {
    cli.validate()?;
    let (settings, settings_path) = load_runtime_settings(&cli, !cli.no_settings);
    let mut app = AppState::new(&cli, settings, settings_path)?;
    let (tx, mut rx) = mpsc::channel::<AppEvent>(256);

    tx.send(AppEvent::Bootstrap).await?;

    while app.running {
        tokio::select! {
            maybe_event = rx.recv() => {
                match maybe_event {
                    Some(event) => app.handle_event(event, &tx, &cli).await?,
                    None => app.mode = AppMode::Quit,
                }
            }
            _ = tokio::signal::ctrl_c() => {
                log::info!("interrupted");
                app.handle_event(AppEvent::Quit, &tx, &cli).await?;
            }
        }

        if app.mode == AppMode::Quit {
            app.running = false;
        }
    }

    if cli.one_shot {
        let summary =
            serde_json::to_string_pretty(&app.summary()).context("serializing scene summary failed")?;
        println!("{summary}");
    } else {
        log::info!("stopped after {} frames", app.frame_tick);
    }
    Ok(())
}
