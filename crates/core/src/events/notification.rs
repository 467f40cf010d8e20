//! Notification event types.

use async_trait::async_trait;
use chrono::{NaiveDateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::Result;
use crate::savings::TargetKind;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum NotificationKind {
    /// The target reached its required total.
    Completed,
    /// The target's deadline passed before it was funded.
    Unresolved,
}

impl NotificationKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            NotificationKind::Completed => "COMPLETED",
            NotificationKind::Unresolved => "UNRESOLVED",
        }
    }
}

/// A fact produced when a target completes or lapses.
///
/// The engine only constructs these; persistence and delivery belong to the
/// [`NotificationSink`](super::NotificationSink) implementation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NotificationEvent {
    pub id: String,
    pub user_id: String,
    pub target_kind: TargetKind,
    pub target_id: String,
    pub kind: NotificationKind,
    pub message: String,
    pub balance_at_event: Decimal,
    pub created_at: NaiveDateTime,
}

impl NotificationEvent {
    pub fn new(
        user_id: &str,
        target_kind: TargetKind,
        target_id: &str,
        kind: NotificationKind,
        message: String,
        balance_at_event: Decimal,
    ) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            user_id: user_id.to_string(),
            target_kind,
            target_id: target_id.to_string(),
            kind,
            message,
            balance_at_event,
            created_at: Utc::now().naive_utc(),
        }
    }
}

/// Storage for delivered notifications.
#[async_trait]
pub trait NotificationRepositoryTrait: Send + Sync {
    async fn insert_notifications(&self, events: Vec<NotificationEvent>) -> Result<usize>;

    /// Most recent first.
    fn list_for_user(&self, user_id: &str) -> Result<Vec<NotificationEvent>>;
}
