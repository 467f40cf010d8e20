use chrono::{NaiveDate, Utc};
use dashmap::DashMap;
use log::{debug, info};
use rust_decimal::Decimal;
use std::sync::Arc;
use tokio::sync::Mutex;
use uuid::Uuid;

use super::allocation_engine::AllocationEngine;
use super::projection_calculator::{
    annuity_payment, monthly_rate, project_monthly_contribution, round_money,
};
use super::savings_model::{
    AllocationRequest, Asset, AssetUpdate, HouseChoice, HouseSelection, NewAsset,
    RetirementPlan, RetirementPlanInput, RetirementProjection, SavingsOutcome, SavingsTarget,
    TargetKind, TargetStatus, TransferRequest, UserTargets,
};
use super::savings_traits::{SavingsRepositoryTrait, SavingsServiceTrait};
use crate::constants::{NOT_TRACKING_MONTH, RATIO_DECIMAL_PRECISION};
use crate::errors::{Error, Result, SavingsError, ValidationError};
use crate::events::NotificationSink;
use crate::utils::time_utils::{today, YearMonth};

/// Source of "today" for accrual and deadlines.
pub type Clock = Arc<dyn Fn() -> NaiveDate + Send + Sync>;

/// Service for managing savings targets.
///
/// Every mutation loads the user's targets, runs the allocation engine on
/// them, commits the result as one changeset and only then hands the
/// produced notifications to the sink. Mutations for the same user are
/// serialized.
pub struct SavingsService {
    repository: Arc<dyn SavingsRepositoryTrait>,
    notification_sink: Arc<dyn NotificationSink>,
    clock: Clock,
    user_locks: DashMap<String, Arc<Mutex<()>>>,
}

impl SavingsService {
    pub fn new(
        repository: Arc<dyn SavingsRepositoryTrait>,
        notification_sink: Arc<dyn NotificationSink>,
    ) -> Self {
        Self {
            repository,
            notification_sink,
            clock: Arc::new(today),
            user_locks: DashMap::new(),
        }
    }

    /// Replaces the clock, mainly so tests can pin the current month.
    pub fn with_clock(mut self, clock: Clock) -> Self {
        self.clock = clock;
        self
    }

    fn current_month(&self) -> YearMonth {
        YearMonth::from_date((self.clock)())
    }

    fn user_lock(&self, user_id: &str) -> Arc<Mutex<()>> {
        self.user_locks
            .entry(user_id.to_string())
            .or_default()
            .clone()
    }

    /// Drops the user's lock entry once nobody else holds or waits on it.
    fn release_user_lock(&self, user_id: &str) {
        self.user_locks
            .remove_if(user_id, |_, lock| Arc::strong_count(lock) == 1);
    }

    #[cfg(test)]
    pub(super) fn tracked_user_locks(&self) -> usize {
        self.user_locks.len()
    }

    /// Runs one engine operation for a user under the user's lock.
    async fn run_engine<F>(
        &self,
        user_id: &str,
        as_of: YearMonth,
        operation: F,
    ) -> Result<(UserTargets, SavingsOutcome)>
    where
        F: FnOnce(&mut AllocationEngine) -> Result<()> + Send,
    {
        let lock = self.user_lock(user_id);
        let result = {
            let _guard = lock.lock().await;
            self.run_engine_locked(user_id, as_of, operation).await
        };
        drop(lock);
        self.release_user_lock(user_id);
        result
    }

    async fn run_engine_locked<F>(
        &self,
        user_id: &str,
        as_of: YearMonth,
        operation: F,
    ) -> Result<(UserTargets, SavingsOutcome)>
    where
        F: FnOnce(&mut AllocationEngine) -> Result<()> + Send,
    {
        let targets = self.repository.load_user_targets(user_id)?;
        let mut engine = AllocationEngine::new(targets, as_of);
        operation(&mut engine)?;
        let (targets, outcome) = engine.finish();

        if !outcome.is_empty() {
            self.repository.commit(outcome.changeset()).await?;
        }
        if !outcome.notifications.is_empty() {
            debug!(
                "Emitting {} savings notifications for user {}",
                outcome.notifications.len(),
                user_id
            );
            self.notification_sink
                .emit_batch(outcome.notifications.clone());
        }
        Ok((targets, outcome))
    }
}

fn ensure_time_left(end_year: i32, as_of: YearMonth) -> Result<()> {
    if YearMonth::end_of_year(end_year).months_since(as_of) <= 0 {
        return Err(Error::Validation(ValidationError::InvalidInput(format!(
            "End year {} leaves no month to save in",
            end_year
        ))));
    }
    Ok(())
}

#[async_trait::async_trait]
impl SavingsServiceTrait for SavingsService {
    fn get_user_targets(&self, user_id: &str) -> Result<UserTargets> {
        self.repository.load_user_targets(user_id)
    }

    fn get_target(&self, user_id: &str, kind: TargetKind, name: &str) -> Result<SavingsTarget> {
        self.repository
            .load_target(user_id, kind, name)?
            .ok_or_else(|| {
                SavingsError::TargetNotFound {
                    kind,
                    name: name.to_string(),
                }
                .into()
            })
    }

    fn list_assets(&self, user_id: &str) -> Result<Vec<Asset>> {
        Ok(self.repository.load_user_targets(user_id)?.assets)
    }

    async fn create_asset(&self, user_id: &str, new_asset: NewAsset) -> Result<Asset> {
        let as_of = self.current_month();
        new_asset.validate(as_of)?;
        ensure_time_left(new_asset.end_year, as_of)?;
        debug!("Creating asset '{}' for user {}", new_asset.name, user_id);

        let now = Utc::now().naive_utc();
        let asset = Asset {
            id: Uuid::new_v4().to_string(),
            user_id: user_id.to_string(),
            name: new_asset.name.trim().to_string(),
            total_cost: new_asset.total_cost,
            current_money: new_asset.current_money,
            monthly_contribution: Decimal::ZERO,
            last_calculated_month: NOT_TRACKING_MONTH,
            end_year: new_asset.end_year,
            status: TargetStatus::Active,
            created_at: now,
            updated_at: now,
        };
        let asset_id = asset.id.clone();

        let (targets, _) = self
            .run_engine(user_id, as_of, move |engine| engine.add_asset(asset))
            .await?;
        targets
            .asset_by_id(&asset_id)
            .cloned()
            .ok_or_else(|| Error::Unexpected(format!("Asset {} vanished after create", asset_id)))
    }

    async fn update_asset(
        &self,
        user_id: &str,
        asset_id: &str,
        update: AssetUpdate,
    ) -> Result<Asset> {
        let as_of = self.current_month();
        ensure_time_left(update.end_year, as_of)?;

        let id = asset_id.to_string();
        let (targets, _) = self
            .run_engine(user_id, as_of, move |engine| {
                let current_money = engine
                    .targets()
                    .asset_by_id(&id)
                    .map(|a| a.current_money)
                    .ok_or_else(|| SavingsError::TargetNotFound {
                        kind: TargetKind::Asset,
                        name: id.clone(),
                    })?;
                update.validate(current_money, engine.as_of())?;
                engine.edit_asset(&id, update.name.trim(), update.total_cost, update.end_year)
            })
            .await?;

        targets.asset_by_id(asset_id).cloned().ok_or_else(|| {
            SavingsError::TargetNotFound {
                kind: TargetKind::Asset,
                name: asset_id.to_string(),
            }
            .into()
        })
    }

    async fn delete_asset_with_transfers(
        &self,
        user_id: &str,
        asset_id: &str,
        transfers: Vec<TransferRequest>,
    ) -> Result<SavingsOutcome> {
        let as_of = self.current_month();
        let id = asset_id.to_string();
        let (_, outcome) = self
            .run_engine(user_id, as_of, move |engine| {
                engine.close_asset(&id, &transfers)
            })
            .await?;
        info!("Closed asset {} for user {}", asset_id, user_id);
        Ok(outcome)
    }

    async fn upsert_retirement_plan(
        &self,
        user_id: &str,
        input: RetirementPlanInput,
    ) -> Result<RetirementPlan> {
        input.validate()?;
        // Fail on bad assumptions before taking the user's lock.
        let projection =
            project_monthly_contribution(&input.assumptions(), Decimal::ZERO, Decimal::ZERO)?;

        let as_of = self.current_month();
        let now = Utc::now().naive_utc();
        let plan = RetirementPlan {
            id: Uuid::new_v4().to_string(),
            user_id: user_id.to_string(),
            age: input.age,
            retirement_age: input.retirement_age,
            expect_lifespan: input.expect_lifespan,
            expected_monthly_expense: input.expected_monthly_expense,
            annual_expense_increase: input.annual_expense_increase,
            expected_inflation: input.expected_inflation,
            expected_return_rate: input.expected_return_rate,
            current_savings: input.current_savings,
            current_total_investment: input.current_total_investment,
            required_funds: projection.required_funds,
            required_monthly_savings: projection.required_monthly_savings,
            monthly_contribution: Decimal::ZERO,
            last_calculated_month: NOT_TRACKING_MONTH,
            status: TargetStatus::Active,
            start_year: as_of.year,
            start_month: as_of.month,
            created_at: now,
            updated_at: now,
        };

        let (targets, _) = self
            .run_engine(user_id, as_of, move |engine| engine.upsert_plan(plan))
            .await?;
        targets
            .plan
            .ok_or_else(|| Error::Unexpected("Retirement plan vanished after upsert".to_string()))
    }

    async fn select_house(&self, user_id: &str, choice: HouseChoice) -> Result<HouseSelection> {
        choice.validate()?;
        let as_of = self.current_month();
        let (targets, _) = self
            .run_engine(user_id, as_of, move |engine| engine.select_house(&choice))
            .await?;
        Ok(targets.house)
    }

    async fn clear_house_selection(&self, user_id: &str) -> Result<HouseSelection> {
        let as_of = self.current_month();
        let (targets, _) = self
            .run_engine(user_id, as_of, |engine| engine.clear_house())
            .await?;
        Ok(targets.house)
    }

    async fn deposit(&self, user_id: &str, request: AllocationRequest) -> Result<SavingsOutcome> {
        let as_of = self.current_month();
        let (_, outcome) = self
            .run_engine(user_id, as_of, move |engine| engine.deposit(&request))
            .await?;
        Ok(outcome)
    }

    async fn withdraw(&self, user_id: &str, request: AllocationRequest) -> Result<SavingsOutcome> {
        let as_of = self.current_month();
        let (_, outcome) = self
            .run_engine(user_id, as_of, move |engine| engine.withdraw(&request))
            .await?;
        Ok(outcome)
    }

    async fn recalculate_all_for_user(
        &self,
        user_id: &str,
        as_of: NaiveDate,
    ) -> Result<SavingsOutcome> {
        let (_, outcome) = self
            .run_engine(user_id, YearMonth::from_date(as_of), |engine| {
                engine.recalculate_all()
            })
            .await?;
        debug!(
            "Recalculated savings for user {}: {} targets changed",
            user_id,
            outcome.targets.len()
        );
        Ok(outcome)
    }

    fn calculate_retirement_projection(&self, user_id: &str) -> Result<RetirementProjection> {
        let targets = self.repository.load_user_targets(user_id)?;
        let plan = targets.plan.as_ref().ok_or_else(|| SavingsError::TargetNotFound {
            kind: TargetKind::Plan,
            name: "retirement plan".to_string(),
        })?;

        let house_price = if targets.house.is_selected() {
            targets.house.monthly_price
        } else {
            Decimal::ZERO
        };
        let projection = project_monthly_contribution(
            &plan.assumptions(),
            house_price,
            targets.asset_monthly_contributions(),
        )?;

        let current_assets = plan.total_assets();
        let required = projection.required_funds + projection.house_lifetime_cost;
        let funding_ratio = if required.is_zero() {
            Decimal::ONE
        } else {
            (current_assets / required).round_dp(RATIO_DECIMAL_PRECISION)
        };

        let months_until_retirement = plan
            .retirement_month()
            .months_since(self.current_month())
            .max(0);
        let outstanding = required - current_assets;
        let periods = u32::try_from(months_until_retirement).unwrap_or(u32::MAX);
        let invested_monthly_savings =
            annuity_payment(outstanding, monthly_rate(plan.expected_return_rate), periods)?;

        Ok(RetirementProjection {
            required_funds: projection.required_funds,
            house_lifetime_cost: round_money(projection.house_lifetime_cost),
            asset_monthly_contributions: projection.asset_monthly_contributions,
            required_monthly_savings: projection.required_monthly_savings,
            current_assets,
            funding_ratio,
            invested_monthly_savings,
            months_until_retirement,
        })
    }

    fn list_user_ids(&self) -> Result<Vec<String>> {
        self.repository.list_user_ids()
    }
}
