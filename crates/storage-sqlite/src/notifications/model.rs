use chrono::NaiveDateTime;
use diesel::prelude::*;
use std::str::FromStr;

use nestegg_core::events::{NotificationEvent, NotificationKind};
use nestegg_core::savings::TargetKind;
use nestegg_core::Result;

use crate::errors::StorageError;
use crate::savings::parse_decimal;

/// Database model for notifications
#[derive(Queryable, Selectable, Insertable, Debug, Clone, PartialEq)]
#[diesel(table_name = crate::schema::notifications)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct NotificationDB {
    pub id: String,
    pub user_id: String,
    pub target_kind: String,
    pub target_id: String,
    pub kind: String,
    pub message: String,
    pub balance_at_event: String,
    pub created_at: NaiveDateTime,
}

fn parse_kind(value: &str) -> Result<NotificationKind> {
    match value {
        "COMPLETED" => Ok(NotificationKind::Completed),
        "UNRESOLVED" => Ok(NotificationKind::Unresolved),
        other => Err(StorageError::InvalidRow(format!("unknown notification kind '{}'", other)).into()),
    }
}

impl TryFrom<NotificationDB> for NotificationEvent {
    type Error = nestegg_core::Error;

    fn try_from(db: NotificationDB) -> Result<Self> {
        Ok(Self {
            target_kind: TargetKind::from_str(&db.target_kind)?,
            kind: parse_kind(&db.kind)?,
            balance_at_event: parse_decimal(&db.balance_at_event, "balance_at_event")?,
            id: db.id,
            user_id: db.user_id,
            target_id: db.target_id,
            message: db.message,
            created_at: db.created_at,
        })
    }
}

impl From<NotificationEvent> for NotificationDB {
    fn from(domain: NotificationEvent) -> Self {
        Self {
            id: domain.id,
            user_id: domain.user_id,
            target_kind: domain.target_kind.as_str().to_string(),
            target_id: domain.target_id,
            kind: domain.kind.as_str().to_string(),
            message: domain.message,
            balance_at_event: domain.balance_at_event.to_string(),
            created_at: domain.created_at,
        }
    }
}
