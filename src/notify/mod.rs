pub mod error;

use std::sync::Arc;

use crate::permissions::{EXCHANGE_RATE_CATEGORY, PermissionManager, PermissionState};
use crate::rate::RateSnapshot;
use crate::surface::{
    NotificationData, NotificationHandle, NotificationPayload, NotificationSurface,
};

pub use error::DispatchError;

const TITLE: &str = "日元汇率更新";
const SUBTITLE: &str = "实时汇率信息";
const DATA_KIND: &str = "exchange_rate";

/// Which path asked for the delivery. The manual path adds a direct present
/// on top of the scheduled one because some platforms defer scheduled
/// notifications while the app is foregrounded; the user may therefore see
/// the same update twice. That at-least-once behavior is deliberate and is
/// not deduplicated here.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeliveryChannel {
    Background,
    Manual,
}

pub struct Dispatcher {
    surface: Arc<dyn NotificationSurface>,
    permissions: Arc<PermissionManager>,
}

impl Dispatcher {
    pub fn new(surface: Arc<dyn NotificationSurface>, permissions: Arc<PermissionManager>) -> Self {
        Self {
            surface,
            permissions,
        }
    }

    /// Callers must have gone through the permission manager first; reaching
    /// this without a grant is a contract violation, reported as
    /// [`DispatchError::PermissionMissing`].
    pub async fn dispatch(
        &self,
        snapshot: &RateSnapshot,
        channel: DeliveryChannel,
    ) -> Result<NotificationHandle, DispatchError> {
        if self.permissions.state().await != PermissionState::Granted {
            return Err(DispatchError::PermissionMissing);
        }
        let payload = build_payload(snapshot);
        let handle = self.surface.schedule_notification(payload.clone()).await?;
        if channel == DeliveryChannel::Manual {
            self.surface.present_notification(payload).await?;
        }
        tracing::info!(
            handle = %handle.id(),
            channel = ?channel,
            rate = snapshot.rate,
            "rate notification dispatched"
        );
        Ok(handle)
    }
}

pub fn build_payload(snapshot: &RateSnapshot) -> NotificationPayload {
    let rate = format_rate(snapshot.rate);
    NotificationPayload {
        title: TITLE.to_string(),
        subtitle: SUBTITLE.to_string(),
        body: format!(
            "当前汇率: 1 {} = {} {}",
            snapshot.base, rate, snapshot.quote
        ),
        category: EXCHANGE_RATE_CATEGORY.to_string(),
        data: NotificationData {
            kind: DATA_KIND.to_string(),
            rate,
            timestamp: snapshot.observed_at,
        },
    }
}

fn format_rate(rate: f64) -> String {
    format!("{rate:.4}")
}
