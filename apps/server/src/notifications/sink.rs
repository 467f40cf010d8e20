use std::sync::Arc;

use nestegg_core::events::{NotificationEvent, NotificationRepositoryTrait, NotificationSink};
use tokio::sync::mpsc;

use super::worker::notification_worker;

/// Sends notification events to a background worker over an unbounded channel.
pub struct ServerNotificationSink {
    tx: mpsc::UnboundedSender<NotificationEvent>,
}

impl ServerNotificationSink {
    /// Creates the sink and spawns its worker. Must be called from within a
    /// tokio runtime.
    pub fn start(repository: Arc<dyn NotificationRepositoryTrait>) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        tokio::spawn(notification_worker(rx, repository));
        Self { tx }
    }
}

impl NotificationSink for ServerNotificationSink {
    fn emit(&self, event: NotificationEvent) {
        if let Err(err) = self.tx.send(event) {
            tracing::warn!(
                "Notification worker is gone, dropping event {}",
                err.0.id
            );
        }
    }
}
