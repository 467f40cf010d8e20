//! Savings repository, service and target capability traits.

use async_trait::async_trait;
use chrono::NaiveDate;
use rust_decimal::Decimal;

use super::savings_model::{
    AllocationRequest, Asset, AssetUpdate, HouseChoice, HouseSelection, NewAsset,
    RetirementPlan, RetirementPlanInput, RetirementProjection, SavingsOutcome, SavingsTarget,
    TargetChangeset, TargetKind, TargetRef, TargetStatus, TransferRequest, UserTargets,
};
use crate::errors::Result;
use crate::utils::time_utils::YearMonth;

/// The capabilities the accrual recalculator, allocation engine and
/// lifecycle state machine need from a savings target, whatever its kind.
pub trait SavingsGoal {
    fn kind(&self) -> TargetKind;
    fn id(&self) -> &str;
    fn user_id(&self) -> &str;
    /// Human readable name used in notifications.
    fn label(&self) -> &str;
    /// Money counted towards the goal.
    fn balance(&self) -> Decimal;
    fn required_total(&self) -> Decimal;
    /// Last month in which contributions can still be made; `None` when the
    /// deadline cannot be determined yet.
    fn deadline(&self) -> Option<YearMonth>;
    fn status(&self) -> TargetStatus;
    fn set_status(&mut self, status: TargetStatus);
    fn monthly_contribution(&self) -> Decimal;
    fn set_monthly_contribution(&mut self, amount: Decimal);
    fn last_calculated_month(&self) -> u32;
    fn set_last_calculated_month(&mut self, month: u32);
    /// Adds money to the pool that allocations feed.
    fn credit(&mut self, amount: Decimal);
    /// Removes money from the pool that allocations feed, rejecting overdrafts
    /// without changing anything.
    fn debit(&mut self, amount: Decimal) -> Result<()>;

    /// Balance of the pool `credit` and `debit` act on.
    fn pool_balance(&self) -> Decimal {
        self.balance()
    }

    /// Whether automatic accrual and lifecycle evaluation apply.
    fn is_tracked(&self) -> bool {
        true
    }

    fn reference(&self) -> TargetRef {
        TargetRef {
            kind: self.kind(),
            id: self.id().to_string(),
        }
    }
}

/// Persistence gateway for savings targets.
///
/// Implementations must apply a `TargetChangeset` atomically: either every
/// write in it takes effect or none does.
#[async_trait]
pub trait SavingsRepositoryTrait: Send + Sync {
    /// Loads all targets of a user. A user without a stored house selection
    /// gets the "no selection" sentinel.
    fn load_user_targets(&self, user_id: &str) -> Result<UserTargets>;

    /// Loads a single target by kind and name. The house and the plan are
    /// per-user singletons, so `name` only matters for assets.
    fn load_target(
        &self,
        user_id: &str,
        kind: TargetKind,
        name: &str,
    ) -> Result<Option<SavingsTarget>>;

    /// IDs of every user owning at least one target.
    fn list_user_ids(&self) -> Result<Vec<String>>;

    /// Commits a set of target writes as one transaction.
    async fn commit(&self, changeset: TargetChangeset) -> Result<()>;

    /// Saves targets as one transaction.
    async fn save_all(&self, targets: Vec<SavingsTarget>) -> Result<()> {
        self.commit(TargetChangeset::saving(targets)).await
    }
}

/// Caller-facing savings operations.
#[async_trait]
pub trait SavingsServiceTrait: Send + Sync {
    fn get_user_targets(&self, user_id: &str) -> Result<UserTargets>;

    fn get_target(&self, user_id: &str, kind: TargetKind, name: &str) -> Result<SavingsTarget>;

    fn list_assets(&self, user_id: &str) -> Result<Vec<Asset>>;

    async fn create_asset(&self, user_id: &str, new_asset: NewAsset) -> Result<Asset>;

    async fn update_asset(&self, user_id: &str, asset_id: &str, update: AssetUpdate)
        -> Result<Asset>;

    /// Deletes an asset and redistributes its balance.
    async fn delete_asset_with_transfers(
        &self,
        user_id: &str,
        asset_id: &str,
        transfers: Vec<TransferRequest>,
    ) -> Result<SavingsOutcome>;

    async fn upsert_retirement_plan(
        &self,
        user_id: &str,
        input: RetirementPlanInput,
    ) -> Result<RetirementPlan>;

    async fn select_house(&self, user_id: &str, choice: HouseChoice) -> Result<HouseSelection>;

    async fn clear_house_selection(&self, user_id: &str) -> Result<HouseSelection>;

    async fn deposit(&self, user_id: &str, request: AllocationRequest) -> Result<SavingsOutcome>;

    async fn withdraw(&self, user_id: &str, request: AllocationRequest) -> Result<SavingsOutcome>;

    /// The monthly sweep. Idempotent within a calendar month.
    async fn recalculate_all_for_user(
        &self,
        user_id: &str,
        as_of: NaiveDate,
    ) -> Result<SavingsOutcome>;

    fn calculate_retirement_projection(&self, user_id: &str) -> Result<RetirementProjection>;

    fn list_user_ids(&self) -> Result<Vec<String>>;
}
