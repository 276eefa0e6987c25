use std::sync::OnceLock;

use async_trait::async_trait;
use dashmap::DashMap;
use tokio::sync::Mutex;

use crate::surface::{
    AuthorizationOptions, AuthorizationStatus, CategoryAction, NotificationBehavior,
    NotificationHandle, NotificationListener, NotificationPayload, NotificationSurface,
    Subscription, SurfaceError,
};

/// Surface adapter for hosts without a native notification facility.
/// Deliveries are rendered as tracing events; authorization is granted on
/// first request so the rest of the pipeline behaves as on a real platform.
#[derive(Default)]
pub struct ConsoleSurface {
    status: Mutex<Option<AuthorizationStatus>>,
    handler: OnceLock<NotificationBehavior>,
    categories: DashMap<String, Vec<CategoryAction>>,
    received_listeners: DashMap<String, NotificationListener>,
    response_listeners: DashMap<String, NotificationListener>,
}

impl ConsoleSurface {
    pub fn new() -> Self {
        Self::default()
    }

    fn deliver(&self, channel: &str, payload: &NotificationPayload) {
        let behavior = self.handler.get().copied().unwrap_or_default();
        let data = serde_json::to_string(&payload.data).unwrap_or_default();
        tracing::info!(
            channel,
            title = %payload.title,
            body = %payload.body,
            category = %payload.category,
            data = %data,
            show_alert = behavior.show_alert,
            play_sound = behavior.play_sound,
            "notification delivered"
        );
        for listener in self.received_listeners.iter() {
            listener.value()(payload);
        }
    }
}

#[async_trait]
impl NotificationSurface for ConsoleSurface {
    async fn authorization_status(&self) -> AuthorizationStatus {
        self.status
            .lock()
            .await
            .unwrap_or(AuthorizationStatus::NotDetermined)
    }

    async fn request_authorization(&self, _options: AuthorizationOptions) -> AuthorizationStatus {
        let mut status = self.status.lock().await;
        let granted = status.get_or_insert(AuthorizationStatus::Granted);
        *granted
    }

    async fn register_category(
        &self,
        id: &str,
        actions: Vec<CategoryAction>,
    ) -> Result<(), SurfaceError> {
        self.categories.insert(id.to_string(), actions);
        Ok(())
    }

    fn set_notification_handler(&self, behavior: NotificationBehavior) {
        let _ = self.handler.set(behavior);
    }

    async fn schedule_notification(
        &self,
        payload: NotificationPayload,
    ) -> Result<NotificationHandle, SurfaceError> {
        let handle = NotificationHandle::new(uuid::Uuid::new_v4().to_string());
        self.deliver("scheduled", &payload);
        Ok(handle)
    }

    async fn present_notification(&self, payload: NotificationPayload) -> Result<(), SurfaceError> {
        self.deliver("present", &payload);
        Ok(())
    }

    fn add_received_listener(&self, listener: NotificationListener) -> Subscription {
        let subscription = Subscription::new(uuid::Uuid::new_v4().to_string());
        self.received_listeners
            .insert(subscription.id().to_string(), listener);
        subscription
    }

    fn add_response_listener(&self, listener: NotificationListener) -> Subscription {
        let subscription = Subscription::new(uuid::Uuid::new_v4().to_string());
        self.response_listeners
            .insert(subscription.id().to_string(), listener);
        subscription
    }

    fn remove_subscription(&self, subscription: Subscription) {
        self.received_listeners.remove(subscription.id());
        self.response_listeners.remove(subscription.id());
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::ConsoleSurface;
    use crate::surface::{
        AuthorizationOptions, AuthorizationStatus, NotificationData, NotificationPayload,
        NotificationSurface,
    };

    fn payload() -> NotificationPayload {
        NotificationPayload {
            title: "t".to_string(),
            subtitle: "s".to_string(),
            body: "b".to_string(),
            category: "c".to_string(),
            data: NotificationData {
                kind: "k".to_string(),
                rate: "1.0000".to_string(),
                timestamp: chrono::Utc::now(),
            },
        }
    }

    #[tokio::test]
    async fn grants_on_first_request_and_sticks() {
        let surface = ConsoleSurface::new();
        assert_eq!(
            surface.authorization_status().await,
            AuthorizationStatus::NotDetermined
        );
        let status = surface
            .request_authorization(AuthorizationOptions::default())
            .await;
        assert_eq!(status, AuthorizationStatus::Granted);
        assert_eq!(
            surface.authorization_status().await,
            AuthorizationStatus::Granted
        );
    }

    #[tokio::test]
    async fn removed_subscription_no_longer_fires() {
        let surface = ConsoleSurface::new();
        let hits = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&hits);
        let subscription = surface.add_received_listener(Arc::new(move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
        }));
        surface.present_notification(payload()).await.unwrap();
        assert_eq!(hits.load(Ordering::SeqCst), 1);
        surface.remove_subscription(subscription);
        surface.present_notification(payload()).await.unwrap();
        assert_eq!(hits.load(Ordering::SeqCst), 1);
    }
}
