pub mod console;

use std::sync::Arc;

use async_trait::async_trait;
use serde::Serialize;

pub use console::ConsoleSurface;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthorizationStatus {
    NotDetermined,
    Granted,
    Denied,
}

/// Options forwarded to the OS when asking the user for notification access.
#[derive(Debug, Clone, Copy)]
pub struct AuthorizationOptions {
    pub allow_alert: bool,
    pub allow_badge: bool,
    pub allow_sound: bool,
}

impl Default for AuthorizationOptions {
    fn default() -> Self {
        Self {
            allow_alert: true,
            allow_badge: true,
            allow_sound: true,
        }
    }
}

/// Process-wide presentation behavior for incoming notifications. Set once
/// at startup and read by the surface for every delivery.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NotificationBehavior {
    pub show_alert: bool,
    pub play_sound: bool,
    pub set_badge: bool,
}

impl Default for NotificationBehavior {
    fn default() -> Self {
        Self {
            show_alert: true,
            play_sound: true,
            set_badge: false,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct NotificationData {
    pub kind: String,
    pub rate: String,
    pub timestamp: chrono::DateTime<chrono::Utc>,
}

#[derive(Debug, Clone, Serialize)]
pub struct NotificationPayload {
    pub title: String,
    pub subtitle: String,
    pub body: String,
    pub category: String,
    pub data: NotificationData,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotificationHandle {
    id: String,
}

impl NotificationHandle {
    pub fn new(id: impl Into<String>) -> Self {
        Self { id: id.into() }
    }

    pub fn id(&self) -> &str {
        &self.id
    }
}

#[derive(Debug, Clone)]
pub struct CategoryAction {
    pub id: String,
    pub title: String,
    pub foregrounds_app: bool,
}

/// An owned listener registration. Holders are responsible for passing it
/// back to [`NotificationSurface::remove_subscription`] on teardown.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Subscription {
    id: String,
}

impl Subscription {
    pub fn new(id: impl Into<String>) -> Self {
        Self { id: id.into() }
    }

    pub fn id(&self) -> &str {
        &self.id
    }
}

pub type NotificationListener = Arc<dyn Fn(&NotificationPayload) + Send + Sync>;

/// Failures reported by platform adapters. The in-process adapters cannot
/// fail these paths; OS-backed ones construct the variants from the host's
/// error codes.
#[derive(Debug, thiserror::Error)]
pub enum SurfaceError {
    #[error("notification delivery failed: {0}")]
    Delivery(String),
    #[error("category registration failed: {0}")]
    Category(String),
}

/// The OS notification facility, behind a trait so each target platform can
/// supply its own adapter without touching the core cycle.
#[async_trait]
pub trait NotificationSurface: Send + Sync {
    async fn authorization_status(&self) -> AuthorizationStatus;

    async fn request_authorization(&self, options: AuthorizationOptions) -> AuthorizationStatus;

    async fn register_category(
        &self,
        id: &str,
        actions: Vec<CategoryAction>,
    ) -> Result<(), SurfaceError>;

    fn set_notification_handler(&self, behavior: NotificationBehavior);

    /// Schedule with no trigger, meaning deliver as soon as possible.
    async fn schedule_notification(
        &self,
        payload: NotificationPayload,
    ) -> Result<NotificationHandle, SurfaceError>;

    /// Deliver directly, bypassing the scheduling queue.
    async fn present_notification(&self, payload: NotificationPayload) -> Result<(), SurfaceError>;

    fn add_received_listener(&self, listener: NotificationListener) -> Subscription;

    fn add_response_listener(&self, listener: NotificationListener) -> Subscription;

    fn remove_subscription(&self, subscription: Subscription);
}
