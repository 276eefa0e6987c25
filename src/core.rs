use std::sync::Arc;

use tokio::sync::Mutex;

use crate::config::Config;
use crate::notify::{DeliveryChannel, DispatchError, Dispatcher};
use crate::permissions::{PermissionManager, PermissionState};
use crate::rate::{CurrencyPair, FetchError, RateSource};
use crate::surface::{NotificationHandle, NotificationSurface, Subscription};
use crate::task::{BackgroundScheduler, RegistrationError, TaskRegistration, rate_update_work};

/// Advisory text for the UI when the user has declined notifications.
pub const PERMISSION_ADVISORY: &str = "请在设置中开启通知权限以接收汇率更新。";

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error(transparent)]
    Fetch(#[from] FetchError),
    #[error(transparent)]
    Dispatch(#[from] DispatchError),
    #[error(transparent)]
    Registration(#[from] RegistrationError),
}

/// Result of a manual trigger. A missing permission is a valid outcome the
/// UI presents as an advisory, not an error.
#[derive(Debug)]
pub enum TriggerOutcome {
    Delivered(NotificationHandle),
    PermissionRequired,
}

/// The boundary the UI talks to: permission setup at startup, the manual
/// refresh button, background-schedule registration, and teardown.
pub struct RateNotifier {
    surface: Arc<dyn NotificationSurface>,
    scheduler: Arc<dyn BackgroundScheduler>,
    source: Arc<dyn RateSource>,
    permissions: Arc<PermissionManager>,
    dispatcher: Arc<Dispatcher>,
    pair: CurrencyPair,
    registration: TaskRegistration,
    subscriptions: Mutex<Vec<Subscription>>,
}

impl RateNotifier {
    pub fn new(
        surface: Arc<dyn NotificationSurface>,
        scheduler: Arc<dyn BackgroundScheduler>,
        source: Arc<dyn RateSource>,
        config: &Config,
    ) -> Self {
        surface.set_notification_handler(config.notifications().behavior());
        let permissions = Arc::new(PermissionManager::new(
            Arc::clone(&surface),
            config.notifications().authorization_options(),
        ));
        let dispatcher = Arc::new(Dispatcher::new(
            Arc::clone(&surface),
            Arc::clone(&permissions),
        ));
        let subscriptions = vec![
            surface.add_received_listener(Arc::new(|payload| {
                tracing::debug!(title = %payload.title, "notification received");
            })),
            surface.add_response_listener(Arc::new(|payload| {
                tracing::debug!(title = %payload.title, "notification response");
            })),
        ];
        Self {
            scheduler,
            source,
            permissions,
            dispatcher,
            pair: config.rate().pair(),
            registration: config.task().registration(),
            subscriptions: Mutex::new(subscriptions),
            surface,
        }
    }

    pub async fn ensure_permission(&self) -> bool {
        self.permissions.ensure_permission().await
    }

    /// Runs one fetch-dispatch cycle on the manual channel. Resolves to
    /// [`TriggerOutcome::PermissionRequired`] without touching the dispatcher
    /// when the user has not granted notifications; fetch and dispatch
    /// failures propagate to the caller for presentation.
    pub async fn trigger_now(&self) -> Result<TriggerOutcome, Error> {
        if self.permissions.state().await != PermissionState::Granted
            && !self.permissions.ensure_permission().await
        {
            tracing::warn!("notification permission not granted; manual update skipped");
            return Ok(TriggerOutcome::PermissionRequired);
        }
        let snapshot = self.source.fetch_rate(&self.pair).await?;
        let handle = self
            .dispatcher
            .dispatch(&snapshot, DeliveryChannel::Manual)
            .await?;
        Ok(TriggerOutcome::Delivered(handle))
    }

    /// Registers the periodic wake-up. Best-effort: a declined registration
    /// is logged and the application continues without periodic updates.
    pub async fn initialize_background_schedule(&self) {
        let work = rate_update_work(
            Arc::clone(&self.source),
            Arc::clone(&self.dispatcher),
            self.pair.clone(),
        );
        match self
            .scheduler
            .register(self.registration.clone(), work)
            .await
        {
            Ok(()) => tracing::info!(
                task_id = %self.registration.task_id,
                interval_secs = self.registration.minimum_interval.as_secs(),
                "background rate task registered"
            ),
            Err(err) => tracing::warn!(
                error = %err,
                "background task registration declined; continuing without periodic updates"
            ),
        }
    }

    /// Releases listener subscriptions and unregisters the background task.
    /// Safe to call even when nothing was registered.
    pub async fn shutdown(&self) {
        for subscription in self.subscriptions.lock().await.drain(..) {
            self.surface.remove_subscription(subscription);
        }
        if let Err(err) = self.scheduler.unregister(&self.registration.task_id).await {
            tracing::warn!(error = %err, "background task unregister failed");
        }
    }
}
