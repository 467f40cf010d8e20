use std::sync::Arc;
use std::time::Duration;

use nestegg_core::events::{NotificationEvent, NotificationRepositoryTrait};
use tokio::sync::mpsc;

/// Collection window for batching events that arrive together.
const BATCH_WINDOW: Duration = Duration::from_millis(100);

/// Drains the channel and persists events in batches until every sender is dropped.
pub(super) async fn notification_worker(
    mut rx: mpsc::UnboundedReceiver<NotificationEvent>,
    repository: Arc<dyn NotificationRepositoryTrait>,
) {
    tracing::info!("Notification worker started");

    while let Some(first) = rx.recv().await {
        let mut batch = vec![first];
        let deadline = tokio::time::Instant::now() + BATCH_WINDOW;
        loop {
            match tokio::time::timeout_at(deadline, rx.recv()).await {
                Ok(Some(event)) => batch.push(event),
                Ok(None) | Err(_) => break,
            }
        }
        deliver(&batch, repository.as_ref()).await;
    }

    tracing::info!("Notification worker stopped");
}

async fn deliver(batch: &[NotificationEvent], repository: &dyn NotificationRepositoryTrait) {
    for event in batch {
        tracing::info!(
            user_id = %event.user_id,
            target_kind = %event.target_kind,
            target_id = %event.target_id,
            kind = event.kind.as_str(),
            "{}",
            event.message
        );
    }
    match repository.insert_notifications(batch.to_vec()).await {
        Ok(count) => tracing::debug!("Persisted {} notifications", count),
        Err(err) => tracing::error!("Failed to persist {} notifications: {}", batch.len(), err),
    }
}
