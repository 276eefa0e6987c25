use async_trait::async_trait;
use dashmap::DashMap;
use tokio_util::sync::CancellationToken;

use crate::task::error::RegistrationError;
use crate::task::{BackgroundScheduler, TaskRegistration, TaskWork};

struct RunningTask {
    registration: TaskRegistration,
    token: CancellationToken,
}

/// In-process stand-in for an OS background-fetch facility: one tokio timer
/// loop per task id, awaiting the work inline so a given id never runs two
/// invocations concurrently. `persist_across_termination` and
/// `start_on_boot` only have meaning for OS-backed adapters; this one
/// records them and moves on.
#[derive(Default)]
pub struct IntervalScheduler {
    tasks: DashMap<String, RunningTask>,
}

impl IntervalScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_registered(&self, task_id: &str) -> bool {
        self.tasks.contains_key(task_id)
    }
}

#[async_trait]
impl BackgroundScheduler for IntervalScheduler {
    async fn register(
        &self,
        registration: TaskRegistration,
        work: TaskWork,
    ) -> Result<(), RegistrationError> {
        let task_id = registration.task_id.clone();
        if self.tasks.contains_key(&task_id) {
            return Err(RegistrationError::AlreadyRegistered(task_id));
        }
        if registration.persist_across_termination || registration.start_on_boot {
            tracing::debug!(
                task_id = %task_id,
                "persistence flags recorded; inert for the in-process scheduler"
            );
        }
        let token = CancellationToken::new();
        let loop_token = token.clone();
        let minimum_interval = registration.minimum_interval;
        self.tasks.insert(
            task_id.clone(),
            RunningTask {
                registration,
                token,
            },
        );
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(minimum_interval);
            interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
            // The first tick fires immediately; the first wake-up should only
            // happen after one full interval has passed.
            interval.tick().await;
            loop {
                tokio::select! {
                    _ = loop_token.cancelled() => break,
                    _ = interval.tick() => {
                        let outcome = work().await;
                        tracing::debug!(task_id = %task_id, outcome = ?outcome, "background task completed");
                    }
                }
            }
        });
        Ok(())
    }

    async fn unregister(&self, task_id: &str) -> Result<(), RegistrationError> {
        match self.tasks.remove(task_id) {
            Some((_, task)) => {
                task.token.cancel();
                tracing::info!(
                    task_id = %task.registration.task_id,
                    "background task unregistered"
                );
            }
            None => {
                tracing::debug!(task_id, "unregister for unknown task; nothing to do");
            }
        }
        Ok(())
    }
}
