use super::*;
use crate::{domain::weather::samples::sample_bundle, resilience::freshness::can_reuse};

impl AppState {
    pub(crate) async fn start_fetch(&mut self, tx: &mpsc::Sender<AppEvent>, cli: &Cli) -> Result<()> {
        if self.fetch_in_flight {
            return Ok(());
        }
        if cli.demo {
            tx.send(AppEvent::FetchSucceeded(sample_bundle())).await?;
            return Ok(());
        }
        if self.try_reuse_cached(cli)? {
            return Ok(());
        }

        tx.send(AppEvent::FetchStarted).await?;
        self.fetch_in_flight = true;
        self.fetch_forecast(tx, self.location.clone());
        Ok(())
    }

    /// Re-stages the cached forecast when it is recent and close enough.
    fn try_reuse_cached(&mut self, cli: &Cli) -> Result<bool> {
        let reusable = self
            .weather
            .as_ref()
            .is_some_and(|cached| can_reuse(cached, &self.location, Utc::now()));
        if !reusable {
            return Ok(false);
        }
        log::debug!("reusing cached forecast for {}", self.location.name);
        self.apply_forecast(cli)?;
        Ok(true)
    }

    pub(crate) fn fetch_forecast(&self, tx: &mpsc::Sender<AppEvent>, location: Location) {
        let client = self.forecast_client.clone();
        let tx2 = tx.clone();
        tokio::spawn(async move {
            match client.fetch(location).await {
                Ok(data) => {
                    let _ = tx2.send(AppEvent::FetchSucceeded(data)).await;
                }
                Err(err) => {
                    let _ = tx2.send(AppEvent::FetchFailed(format!("{err:#}"))).await;
                }
            }
        });
    }
}
