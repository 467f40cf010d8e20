use async_trait::async_trait;
use diesel::prelude::*;
use diesel::SqliteConnection;
use std::sync::Arc;

use nestegg_core::events::{NotificationEvent, NotificationRepositoryTrait};
use nestegg_core::Result;

use super::model::NotificationDB;
use crate::db::{get_connection, DbPool, WriteHandle};
use crate::errors::StorageError;
use crate::schema::notifications;

pub struct NotificationRepository {
    pool: Arc<DbPool>,
    writer: WriteHandle,
}

impl NotificationRepository {
    pub fn new(pool: Arc<DbPool>, writer: WriteHandle) -> Self {
        NotificationRepository { pool, writer }
    }
}

#[async_trait]
impl NotificationRepositoryTrait for NotificationRepository {
    async fn insert_notifications(&self, events: Vec<NotificationEvent>) -> Result<usize> {
        let rows: Vec<NotificationDB> = events.into_iter().map(NotificationDB::from).collect();
        self.writer
            .exec(move |conn: &mut SqliteConnection| -> Result<usize> {
                Ok(diesel::insert_into(notifications::table)
                    .values(&rows)
                    .execute(conn)
                    .map_err(StorageError::from)?)
            })
            .await
    }

    fn list_for_user(&self, user_id: &str) -> Result<Vec<NotificationEvent>> {
        let mut conn = get_connection(&self.pool)?;
        notifications::table
            .filter(notifications::user_id.eq(user_id))
            .order(notifications::created_at.desc())
            .select(NotificationDB::as_select())
            .load::<NotificationDB>(&mut conn)
            .map_err(StorageError::from)?
            .into_iter()
            .map(NotificationEvent::try_from)
            .collect()
    }
}
