use async_trait::async_trait;
use chrono::Utc;
use diesel::prelude::*;
use diesel::SqliteConnection;
use log::debug;
use std::collections::BTreeSet;
use std::sync::Arc;

use nestegg_core::savings::{
    SavingsRepositoryTrait, SavingsTarget, TargetChangeset, TargetKind, UserTargets,
};
use nestegg_core::Result;

use super::model::{AssetDB, HouseSelectionDB, RetirementPlanDB, UserRows};
use crate::db::{get_connection, DbPool, WriteHandle};
use crate::errors::StorageError;
use crate::schema::{house_selections, retirement_plans, savings_assets};

pub struct SavingsRepository {
    pool: Arc<DbPool>,
    writer: WriteHandle,
}

impl SavingsRepository {
    pub fn new(pool: Arc<DbPool>, writer: WriteHandle) -> Self {
        SavingsRepository { pool, writer }
    }

    fn load_rows(&self, conn: &mut SqliteConnection, user_id: &str) -> Result<UserRows> {
        let assets = savings_assets::table
            .filter(savings_assets::user_id.eq(user_id))
            .order((savings_assets::created_at.asc(), savings_assets::id.asc()))
            .select(AssetDB::as_select())
            .load::<AssetDB>(conn)
            .map_err(StorageError::from)?;
        let house = house_selections::table
            .filter(house_selections::user_id.eq(user_id))
            .select(HouseSelectionDB::as_select())
            .first::<HouseSelectionDB>(conn)
            .optional()
            .map_err(StorageError::from)?;
        let plan = retirement_plans::table
            .filter(retirement_plans::user_id.eq(user_id))
            .select(RetirementPlanDB::as_select())
            .first::<RetirementPlanDB>(conn)
            .optional()
            .map_err(StorageError::from)?;
        Ok(UserRows {
            assets,
            house,
            plan,
        })
    }
}

fn save_target(conn: &mut SqliteConnection, target: SavingsTarget) -> Result<()> {
    let now = Utc::now().naive_utc();
    match target {
        SavingsTarget::Asset(asset) => {
            let row = AssetDB {
                updated_at: now,
                ..AssetDB::from(asset)
            };
            diesel::insert_into(savings_assets::table)
                .values(&row)
                .on_conflict(savings_assets::id)
                .do_update()
                .set(&row)
                .execute(conn)
                .map_err(StorageError::from)?;
        }
        SavingsTarget::House(house) => {
            let row = HouseSelectionDB {
                updated_at: now,
                ..HouseSelectionDB::from(house)
            };
            diesel::insert_into(house_selections::table)
                .values(&row)
                .on_conflict(house_selections::id)
                .do_update()
                .set(&row)
                .execute(conn)
                .map_err(StorageError::from)?;
        }
        SavingsTarget::Plan(plan) => {
            let row = RetirementPlanDB {
                updated_at: now,
                ..RetirementPlanDB::from(plan)
            };
            diesel::insert_into(retirement_plans::table)
                .values(&row)
                .on_conflict(retirement_plans::id)
                .do_update()
                .set(&row)
                .execute(conn)
                .map_err(StorageError::from)?;
        }
    }
    Ok(())
}

#[async_trait]
impl SavingsRepositoryTrait for SavingsRepository {
    fn load_user_targets(&self, user_id: &str) -> Result<UserTargets> {
        let mut conn = get_connection(&self.pool)?;
        self.load_rows(&mut conn, user_id)?
            .into_targets(user_id, Utc::now().naive_utc())
    }

    fn load_target(
        &self,
        user_id: &str,
        kind: TargetKind,
        name: &str,
    ) -> Result<Option<SavingsTarget>> {
        let targets = self.load_user_targets(user_id)?;
        Ok(match kind {
            TargetKind::Asset => targets
                .asset_by_name(name)
                .cloned()
                .map(SavingsTarget::Asset),
            TargetKind::House => Some(SavingsTarget::House(targets.house)),
            TargetKind::Plan => targets.plan.map(SavingsTarget::Plan),
        })
    }

    fn list_user_ids(&self) -> Result<Vec<String>> {
        let mut conn = get_connection(&self.pool)?;
        let mut ids = BTreeSet::new();
        ids.extend(
            savings_assets::table
                .select(savings_assets::user_id)
                .distinct()
                .load::<String>(&mut conn)
                .map_err(StorageError::from)?,
        );
        ids.extend(
            house_selections::table
                .select(house_selections::user_id)
                .load::<String>(&mut conn)
                .map_err(StorageError::from)?,
        );
        ids.extend(
            retirement_plans::table
                .select(retirement_plans::user_id)
                .load::<String>(&mut conn)
                .map_err(StorageError::from)?,
        );
        Ok(ids.into_iter().collect())
    }

    async fn commit(&self, changeset: TargetChangeset) -> Result<()> {
        debug!(
            "Committing {} saved targets and {} deleted assets",
            changeset.saved.len(),
            changeset.deleted_asset_ids.len()
        );
        self.writer
            .exec(move |conn: &mut SqliteConnection| -> Result<()> {
                for target in changeset.saved {
                    save_target(conn, target)?;
                }
                if !changeset.deleted_asset_ids.is_empty() {
                    diesel::delete(
                        savings_assets::table
                            .filter(savings_assets::id.eq_any(&changeset.deleted_asset_ids)),
                    )
                    .execute(conn)
                    .map_err(StorageError::from)?;
                }
                Ok(())
            })
            .await
    }
}
