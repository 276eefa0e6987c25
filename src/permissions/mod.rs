use std::sync::Arc;

use tokio::sync::{Mutex, RwLock};

use crate::surface::{
    AuthorizationOptions, AuthorizationStatus, CategoryAction, NotificationSurface,
};

pub const EXCHANGE_RATE_CATEGORY: &str = "exchange_rate";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PermissionState {
    Unknown,
    Granted,
    Denied,
}

struct RequestGuard {
    category_registered: bool,
}

/// Sole writer of [`PermissionState`]. The OS is the authority on the actual
/// status (the user can flip it in system settings at any time), so every
/// `ensure_permission` call re-reads it before deciding whether to ask.
pub struct PermissionManager {
    surface: Arc<dyn NotificationSurface>,
    options: AuthorizationOptions,
    state: RwLock<PermissionState>,
    // Serializes permission requests; concurrent callers queue here instead
    // of issuing duplicate OS prompts.
    request: Mutex<RequestGuard>,
}

impl PermissionManager {
    pub fn new(surface: Arc<dyn NotificationSurface>, options: AuthorizationOptions) -> Self {
        Self {
            surface,
            options,
            state: RwLock::new(PermissionState::Unknown),
            request: Mutex::new(RequestGuard {
                category_registered: false,
            }),
        }
    }

    pub async fn state(&self) -> PermissionState {
        *self.state.read().await
    }

    /// Returns whether notifications are authorized, prompting the user only
    /// when the OS reports an undetermined status. Denial is a valid terminal
    /// answer, not an error.
    pub async fn ensure_permission(&self) -> bool {
        let mut guard = self.request.lock().await;
        let mut status = self.surface.authorization_status().await;
        if status == AuthorizationStatus::NotDetermined {
            if !guard.category_registered {
                if let Err(err) = self
                    .surface
                    .register_category(EXCHANGE_RATE_CATEGORY, category_actions())
                    .await
                {
                    tracing::warn!(error = %err, "notification category setup failed");
                    return false;
                }
                guard.category_registered = true;
            }
            status = self.surface.request_authorization(self.options).await;
        }
        let state = match status {
            AuthorizationStatus::Granted => PermissionState::Granted,
            AuthorizationStatus::Denied => PermissionState::Denied,
            AuthorizationStatus::NotDetermined => PermissionState::Unknown,
        };
        *self.state.write().await = state;
        tracing::debug!(state = ?state, "notification permission state");
        state == PermissionState::Granted
    }
}

fn category_actions() -> Vec<CategoryAction> {
    vec![CategoryAction {
        id: "view".to_string(),
        title: "查看详情".to_string(),
        foregrounds_app: true,
    }]
}
