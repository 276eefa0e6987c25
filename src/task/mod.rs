pub mod error;
pub mod interval;

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use futures::FutureExt;
use futures::future::BoxFuture;

use crate::notify::{DeliveryChannel, Dispatcher};
use crate::rate::{CurrencyPair, RateSource};

pub use error::RegistrationError;
pub use interval::IntervalScheduler;

pub const EXCHANGE_RATE_TASK: &str = "exchange_rate_update";

/// What a background invocation reports back to the scheduler. The host uses
/// this signal to adapt how often it wakes the task, so the work body must
/// never let an error escape instead of returning `Failed`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskOutcome {
    NewData,
    NoData,
    Failed,
}

/// Created once at setup and immutable afterwards; destroyed only by an
/// explicit `unregister`.
#[derive(Debug, Clone)]
pub struct TaskRegistration {
    pub task_id: String,
    pub minimum_interval: Duration,
    pub persist_across_termination: bool,
    pub start_on_boot: bool,
}

pub type TaskWork = Arc<dyn Fn() -> BoxFuture<'static, TaskOutcome> + Send + Sync>;

/// The host background-execution facility. Registration is best-effort from
/// the caller's point of view; a decline is logged and the application keeps
/// running without periodic updates.
#[async_trait]
pub trait BackgroundScheduler: Send + Sync {
    async fn register(
        &self,
        registration: TaskRegistration,
        work: TaskWork,
    ) -> Result<(), RegistrationError>;

    /// Idempotent; unregistering a task that was never registered is a no-op.
    async fn unregister(&self, task_id: &str) -> Result<(), RegistrationError>;
}

/// The work unit a wake-up runs: fetch, dispatch on the background channel,
/// map the result to a [`TaskOutcome`]. Every cycle builds its own snapshot
/// and payload; nothing is shared with a concurrent manual trigger.
pub fn rate_update_work(
    source: Arc<dyn RateSource>,
    dispatcher: Arc<Dispatcher>,
    pair: CurrencyPair,
) -> TaskWork {
    Arc::new(move || {
        let source = Arc::clone(&source);
        let dispatcher = Arc::clone(&dispatcher);
        let pair = pair.clone();
        async move {
            let snapshot = match source.fetch_rate(&pair).await {
                Ok(snapshot) => snapshot,
                Err(err) => {
                    tracing::warn!(error = %err, "background rate fetch failed");
                    return TaskOutcome::Failed;
                }
            };
            match dispatcher
                .dispatch(&snapshot, DeliveryChannel::Background)
                .await
            {
                Ok(handle) => {
                    tracing::debug!(handle = %handle.id(), "background rate update delivered");
                    TaskOutcome::NewData
                }
                Err(err) => {
                    tracing::warn!(error = %err, "background rate dispatch failed");
                    TaskOutcome::Failed
                }
            }
        }
        .boxed()
    })
}
