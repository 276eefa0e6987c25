use std::sync::Arc;

use anyhow::Result;
use tracing::Level;

use ratewatch::config::Config;
use ratewatch::core::{PERMISSION_ADVISORY, RateNotifier, TriggerOutcome};
use ratewatch::rate::ExchangeRateApiSource;
use ratewatch::surface::ConsoleSurface;
use ratewatch::task::IntervalScheduler;

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::load()?;
    let level = config
        .logging_level()
        .parse::<Level>()
        .unwrap_or(Level::INFO);
    tracing_subscriber::fmt().with_max_level(level).init();

    let surface = Arc::new(ConsoleSurface::new());
    let scheduler = Arc::new(IntervalScheduler::new());
    let source = Arc::new(ExchangeRateApiSource::new(config.rate().endpoint())?);
    let notifier = RateNotifier::new(surface, scheduler, source, &config);

    if notifier.ensure_permission().await {
        notifier.initialize_background_schedule().await;
    } else {
        tracing::warn!("{PERMISSION_ADVISORY}");
    }

    match notifier.trigger_now().await {
        Ok(TriggerOutcome::Delivered(handle)) => {
            tracing::info!(handle = %handle.id(), "manual rate update delivered");
        }
        Ok(TriggerOutcome::PermissionRequired) => {
            tracing::warn!("{PERMISSION_ADVISORY}");
        }
        Err(err) => {
            tracing::error!(error = %err, "manual rate update failed");
        }
    }

    tokio::signal::ctrl_c().await?;
    notifier.shutdown().await;
    Ok(())
}
