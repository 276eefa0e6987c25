use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use ratewatch::notify::{DeliveryChannel, DispatchError, Dispatcher};
use ratewatch::permissions::{PermissionManager, PermissionState};
use ratewatch::rate::RateSnapshot;
use ratewatch::surface::{
    AuthorizationOptions, AuthorizationStatus, CategoryAction, NotificationBehavior,
    NotificationHandle, NotificationListener, NotificationPayload, NotificationSurface,
    Subscription, SurfaceError,
};

struct MockSurface {
    status: Mutex<AuthorizationStatus>,
    request_result: AuthorizationStatus,
    request_calls: AtomicUsize,
    category_calls: AtomicUsize,
}

impl MockSurface {
    fn new(status: AuthorizationStatus, request_result: AuthorizationStatus) -> Arc<Self> {
        Arc::new(Self {
            status: Mutex::new(status),
            request_result,
            request_calls: AtomicUsize::new(0),
            category_calls: AtomicUsize::new(0),
        })
    }

    fn set_status(&self, status: AuthorizationStatus) {
        *self.status.lock().unwrap() = status;
    }
}

#[async_trait]
impl NotificationSurface for MockSurface {
    async fn authorization_status(&self) -> AuthorizationStatus {
        *self.status.lock().unwrap()
    }

    async fn request_authorization(&self, _options: AuthorizationOptions) -> AuthorizationStatus {
        self.request_calls.fetch_add(1, Ordering::SeqCst);
        *self.status.lock().unwrap() = self.request_result;
        self.request_result
    }

    async fn register_category(
        &self,
        _id: &str,
        _actions: Vec<CategoryAction>,
    ) -> Result<(), SurfaceError> {
        self.category_calls.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    fn set_notification_handler(&self, _behavior: NotificationBehavior) {}

    async fn schedule_notification(
        &self,
        _payload: NotificationPayload,
    ) -> Result<NotificationHandle, SurfaceError> {
        Ok(NotificationHandle::new("scheduled-1"))
    }

    async fn present_notification(
        &self,
        _payload: NotificationPayload,
    ) -> Result<(), SurfaceError> {
        Ok(())
    }

    fn add_received_listener(&self, _listener: NotificationListener) -> Subscription {
        Subscription::new("received")
    }

    fn add_response_listener(&self, _listener: NotificationListener) -> Subscription {
        Subscription::new("response")
    }

    fn remove_subscription(&self, _subscription: Subscription) {}
}

fn manager(surface: &Arc<MockSurface>) -> PermissionManager {
    let surface: Arc<dyn NotificationSurface> = surface.clone();
    PermissionManager::new(surface, AuthorizationOptions::default())
}

#[tokio::test]
async fn repeated_calls_issue_at_most_one_request() {
    let surface = MockSurface::new(
        AuthorizationStatus::NotDetermined,
        AuthorizationStatus::Granted,
    );
    let manager = manager(&surface);

    assert!(manager.ensure_permission().await);
    assert!(manager.ensure_permission().await);
    assert_eq!(surface.request_calls.load(Ordering::SeqCst), 1);
    assert_eq!(surface.category_calls.load(Ordering::SeqCst), 1);
    assert_eq!(manager.state().await, PermissionState::Granted);
}

#[tokio::test]
async fn denial_is_terminal_but_not_an_error() {
    let surface = MockSurface::new(
        AuthorizationStatus::NotDetermined,
        AuthorizationStatus::Denied,
    );
    let manager = manager(&surface);

    assert!(!manager.ensure_permission().await);
    assert!(!manager.ensure_permission().await);
    // The second call sees the OS-reported denial and does not prompt again.
    assert_eq!(surface.request_calls.load(Ordering::SeqCst), 1);
    assert_eq!(manager.state().await, PermissionState::Denied);
}

#[tokio::test]
async fn os_reported_status_overrides_cached_state() {
    let surface = MockSurface::new(AuthorizationStatus::Granted, AuthorizationStatus::Granted);
    let manager = manager(&surface);

    assert!(manager.ensure_permission().await);
    assert_eq!(surface.request_calls.load(Ordering::SeqCst), 0);

    // The user revokes access in system settings.
    surface.set_status(AuthorizationStatus::Denied);
    assert!(!manager.ensure_permission().await);
    assert_eq!(manager.state().await, PermissionState::Denied);
    assert_eq!(surface.request_calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn dispatch_without_a_grant_is_a_contract_violation() {
    let surface = MockSurface::new(
        AuthorizationStatus::NotDetermined,
        AuthorizationStatus::Granted,
    );
    let permissions = Arc::new(manager(&surface));
    let dyn_surface: Arc<dyn NotificationSurface> = surface.clone();
    let dispatcher = Dispatcher::new(dyn_surface, Arc::clone(&permissions));

    let snapshot = RateSnapshot {
        base: "CNY".to_string(),
        quote: "JPY".to_string(),
        rate: 20.0,
        observed_at: chrono::Utc::now(),
    };
    let err = dispatcher
        .dispatch(&snapshot, DeliveryChannel::Background)
        .await
        .unwrap_err();
    assert!(matches!(err, DispatchError::PermissionMissing));
}

#[tokio::test]
async fn concurrent_callers_share_one_request() {
    let surface = MockSurface::new(
        AuthorizationStatus::NotDetermined,
        AuthorizationStatus::Granted,
    );
    let manager = Arc::new(manager(&surface));

    let tasks: Vec<_> = (0..8)
        .map(|_| {
            let manager = Arc::clone(&manager);
            tokio::spawn(async move { manager.ensure_permission().await })
        })
        .collect();
    for task in tasks {
        assert!(task.await.unwrap());
    }
    assert_eq!(surface.request_calls.load(Ordering::SeqCst), 1);
}
