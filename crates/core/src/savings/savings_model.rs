//! Savings target domain models.

use chrono::NaiveDateTime;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use super::savings_traits::SavingsGoal;
use crate::constants::{NOT_TRACKING_MONTH, NO_HOUSE_SELECTED, RETIREMENT_SAVINGS_POOL};
use crate::errors::{Error, Result, SavingsError, ValidationError};
use crate::events::NotificationEvent;
use crate::utils::time_utils::YearMonth;

/// The three concrete kinds of savings target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TargetKind {
    Asset,
    House,
    Plan,
}

impl TargetKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            TargetKind::Asset => "ASSET",
            TargetKind::House => "HOUSE",
            TargetKind::Plan => "PLAN",
        }
    }
}

impl fmt::Display for TargetKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            TargetKind::Asset => "asset",
            TargetKind::House => "house",
            TargetKind::Plan => "plan",
        };
        f.write_str(label)
    }
}

impl FromStr for TargetKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_uppercase().as_str() {
            "ASSET" => Ok(TargetKind::Asset),
            "HOUSE" => Ok(TargetKind::House),
            "PLAN" => Ok(TargetKind::Plan),
            other => Err(Error::Validation(ValidationError::InvalidInput(format!(
                "Unknown target kind '{}'",
                other
            )))),
        }
    }
}

/// Lifecycle status of a savings target. Owned by the lifecycle state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TargetStatus {
    #[default]
    Active,
    Completed,
    Paused,
}

impl TargetStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TargetStatus::Active => "ACTIVE",
            TargetStatus::Completed => "COMPLETED",
            TargetStatus::Paused => "PAUSED",
        }
    }

    pub fn is_active(&self) -> bool {
        matches!(self, TargetStatus::Active)
    }
}

impl FromStr for TargetStatus {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "ACTIVE" => Ok(TargetStatus::Active),
            "COMPLETED" => Ok(TargetStatus::Completed),
            "PAUSED" => Ok(TargetStatus::Paused),
            other => Err(Error::Validation(ValidationError::InvalidInput(format!(
                "Unknown target status '{}'",
                other
            )))),
        }
    }
}

/// Identity of a target within a user's target set.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TargetRef {
    pub kind: TargetKind,
    pub id: String,
}

/// A discrete savings goal owned by a user (a car, a trip, a renovation...).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Asset {
    pub id: String,
    pub user_id: String,
    pub name: String,
    pub total_cost: Decimal,
    pub current_money: Decimal,
    pub monthly_contribution: Decimal,
    pub last_calculated_month: u32,
    /// The goal must be funded by December of this year.
    pub end_year: i32,
    pub status: TargetStatus,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

/// Input model for creating a new asset
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewAsset {
    pub name: String,
    pub total_cost: Decimal,
    #[serde(default)]
    pub current_money: Decimal,
    pub end_year: i32,
}

impl NewAsset {
    /// Validates the new asset. Over-funded inputs are rejected outright.
    pub fn validate(&self, as_of: YearMonth) -> Result<()> {
        validate_asset_fields(&self.name, self.total_cost, self.end_year, as_of)?;
        if self.current_money.is_sign_negative() {
            return Err(invalid_input("Current money cannot be negative"));
        }
        if self.total_cost < self.current_money {
            return Err(SavingsError::NegativeRemainingFunds {
                required: self.total_cost,
                saved: self.current_money,
            }
            .into());
        }
        Ok(())
    }
}

/// Input model for editing an existing asset. Balances only move through
/// deposits, withdrawals and transfers.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssetUpdate {
    pub name: String,
    pub total_cost: Decimal,
    pub end_year: i32,
}

impl AssetUpdate {
    pub fn validate(&self, current_money: Decimal, as_of: YearMonth) -> Result<()> {
        validate_asset_fields(&self.name, self.total_cost, self.end_year, as_of)?;
        if self.total_cost < current_money {
            return Err(SavingsError::NegativeRemainingFunds {
                required: self.total_cost,
                saved: current_money,
            }
            .into());
        }
        Ok(())
    }
}

fn validate_asset_fields(
    name: &str,
    total_cost: Decimal,
    end_year: i32,
    as_of: YearMonth,
) -> Result<()> {
    if name.trim().is_empty() {
        return Err(invalid_input("Asset name cannot be empty"));
    }
    if total_cost <= Decimal::ZERO {
        return Err(invalid_input("Total cost must be greater than zero"));
    }
    if end_year < as_of.year {
        return Err(invalid_input("End year cannot be in the past"));
    }
    Ok(())
}

fn invalid_input(message: &str) -> Error {
    Error::Validation(ValidationError::InvalidInput(message.to_string()))
}

/// The user's nursing-home selection. Exactly one exists per user; when no
/// home is chosen it holds the `NO_HOUSE_SELECTED` sentinel and stays
/// completed and inert.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct HouseSelection {
    pub id: String,
    pub user_id: String,
    pub house_id: String,
    pub monthly_price: Decimal,
    pub current_money: Decimal,
    pub monthly_contribution: Decimal,
    pub last_calculated_month: u32,
    pub status: TargetStatus,
    /// Lifetime cost of the chosen home, derived from the owner's retirement plan.
    pub total_cost: Decimal,
    /// Retirement month of the owner's plan; `None` while no plan exists.
    pub deadline: Option<YearMonth>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

impl HouseSelection {
    /// The "no selection" sentinel row.
    pub fn unselected(user_id: &str, now: NaiveDateTime) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            user_id: user_id.to_string(),
            house_id: NO_HOUSE_SELECTED.to_string(),
            monthly_price: Decimal::ZERO,
            current_money: Decimal::ZERO,
            monthly_contribution: Decimal::ZERO,
            last_calculated_month: NOT_TRACKING_MONTH,
            status: TargetStatus::Completed,
            total_cost: Decimal::ZERO,
            deadline: None,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn is_selected(&self) -> bool {
        self.house_id != NO_HOUSE_SELECTED
    }

    /// Refreshes the plan-derived lifetime cost and deadline.
    pub fn sync_with_plan(&mut self, plan: Option<&RetirementPlan>) {
        match plan {
            Some(plan) if self.is_selected() => {
                self.total_cost = super::projection_calculator::house_lifetime_cost(
                    self.monthly_price,
                    plan.years_of_retirement(),
                );
                self.deadline = Some(plan.retirement_month());
            }
            _ => {
                self.total_cost = Decimal::ZERO;
                self.deadline = None;
            }
        }
    }
}

/// Input for choosing a nursing home.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HouseChoice {
    pub house_id: String,
    pub monthly_price: Decimal,
}

impl HouseChoice {
    pub fn validate(&self) -> Result<()> {
        let house_id = self.house_id.trim();
        if house_id.is_empty() || house_id == NO_HOUSE_SELECTED {
            return Err(invalid_input("A house id is required"));
        }
        if self.monthly_price <= Decimal::ZERO {
            return Err(invalid_input("Monthly price must be greater than zero"));
        }
        Ok(())
    }
}

/// Demographic and economic inputs of the retirement expense projection.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlanAssumptions {
    pub age: u32,
    pub retirement_age: u32,
    pub expect_lifespan: u32,
    pub expected_monthly_expense: Decimal,
    pub annual_expense_increase: Decimal,
    pub expected_inflation: Decimal,
}

/// The user's retirement plan. Created once and never deleted.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RetirementPlan {
    pub id: String,
    pub user_id: String,
    pub age: u32,
    pub retirement_age: u32,
    pub expect_lifespan: u32,
    pub expected_monthly_expense: Decimal,
    pub annual_expense_increase: Decimal,
    pub expected_inflation: Decimal,
    pub expected_return_rate: Decimal,
    pub current_savings: Decimal,
    pub current_total_investment: Decimal,
    pub required_funds: Decimal,
    pub required_monthly_savings: Decimal,
    pub monthly_contribution: Decimal,
    pub last_calculated_month: u32,
    pub status: TargetStatus,
    /// Month in which `age` was recorded; retirement falls
    /// `retirement_age - age` years later.
    pub start_year: i32,
    pub start_month: u32,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

impl RetirementPlan {
    pub fn assumptions(&self) -> PlanAssumptions {
        PlanAssumptions {
            age: self.age,
            retirement_age: self.retirement_age,
            expect_lifespan: self.expect_lifespan,
            expected_monthly_expense: self.expected_monthly_expense,
            annual_expense_increase: self.annual_expense_increase,
            expected_inflation: self.expected_inflation,
        }
    }

    pub fn start_month(&self) -> YearMonth {
        YearMonth {
            year: self.start_year,
            month: self.start_month,
        }
    }

    pub fn retirement_month(&self) -> YearMonth {
        self.start_month()
            .add_years(self.retirement_age.saturating_sub(self.age))
    }

    pub fn years_of_retirement(&self) -> u32 {
        self.expect_lifespan.saturating_sub(self.retirement_age)
    }

    /// Savings plus investments.
    pub fn total_assets(&self) -> Decimal {
        self.current_savings + self.current_total_investment
    }

    pub fn invest(&mut self, amount: Decimal) {
        self.current_total_investment += amount;
    }

    pub fn divest(&mut self, amount: Decimal) -> Result<()> {
        debit_pool(
            &mut self.current_total_investment,
            amount,
            crate::constants::RETIREMENT_INVESTMENT_POOL,
        )
    }
}

/// Input for creating or re-planning a retirement plan.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RetirementPlanInput {
    pub age: u32,
    pub retirement_age: u32,
    pub expect_lifespan: u32,
    pub expected_monthly_expense: Decimal,
    #[serde(default)]
    pub annual_expense_increase: Decimal,
    pub expected_inflation: Decimal,
    #[serde(default)]
    pub expected_return_rate: Decimal,
    /// Opening balances; only used when the plan is first created.
    #[serde(default)]
    pub current_savings: Decimal,
    #[serde(default)]
    pub current_total_investment: Decimal,
}

impl RetirementPlanInput {
    pub fn assumptions(&self) -> PlanAssumptions {
        PlanAssumptions {
            age: self.age,
            retirement_age: self.retirement_age,
            expect_lifespan: self.expect_lifespan,
            expected_monthly_expense: self.expected_monthly_expense,
            annual_expense_increase: self.annual_expense_increase,
            expected_inflation: self.expected_inflation,
        }
    }

    /// Validates the fields the projection calculator does not look at.
    pub fn validate(&self) -> Result<()> {
        if self.expected_return_rate.is_sign_negative() {
            return Err(SavingsError::InvalidAssumptions(
                "expected return rate cannot be negative".to_string(),
            )
            .into());
        }
        if self.current_savings.is_sign_negative() || self.current_total_investment.is_sign_negative()
        {
            return Err(invalid_input("Opening balances cannot be negative"));
        }
        Ok(())
    }
}

/// Any one of the three target kinds, as persisted and reported to callers.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "kind", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SavingsTarget {
    Asset(Asset),
    House(HouseSelection),
    Plan(RetirementPlan),
}

impl SavingsTarget {
    pub fn as_goal(&self) -> &dyn SavingsGoal {
        match self {
            SavingsTarget::Asset(asset) => asset,
            SavingsTarget::House(house) => house,
            SavingsTarget::Plan(plan) => plan,
        }
    }

    pub fn kind(&self) -> TargetKind {
        self.as_goal().kind()
    }

    pub fn id(&self) -> &str {
        self.as_goal().id()
    }

    pub fn status(&self) -> TargetStatus {
        self.as_goal().status()
    }
}

/// Everything the engine needs to know about one user's targets.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct UserTargets {
    pub user_id: String,
    pub assets: Vec<Asset>,
    pub house: HouseSelection,
    pub plan: Option<RetirementPlan>,
}

impl UserTargets {
    pub fn new(
        user_id: &str,
        assets: Vec<Asset>,
        house: HouseSelection,
        plan: Option<RetirementPlan>,
    ) -> Self {
        let mut targets = Self {
            user_id: user_id.to_string(),
            assets,
            house,
            plan,
        };
        targets.sync_house_with_plan();
        targets
    }

    pub fn sync_house_with_plan(&mut self) {
        self.house.sync_with_plan(self.plan.as_ref());
    }

    pub fn asset_by_name(&self, name: &str) -> Option<&Asset> {
        self.assets.iter().find(|a| a.name == name)
    }

    pub fn asset_by_id(&self, asset_id: &str) -> Option<&Asset> {
        self.assets.iter().find(|a| a.id == asset_id)
    }

    /// Sum of the monthly contributions currently expected for active assets.
    pub fn asset_monthly_contributions(&self) -> Decimal {
        self.assets
            .iter()
            .filter(|a| a.status.is_active())
            .map(|a| a.monthly_contribution)
            .sum()
    }

    /// References to every target in a stable order: assets, house, plan.
    pub fn refs(&self) -> Vec<TargetRef> {
        let mut refs: Vec<TargetRef> = self.assets.iter().map(|a| a.reference()).collect();
        refs.push(self.house.reference());
        if let Some(plan) = &self.plan {
            refs.push(plan.reference());
        }
        refs
    }

    pub fn goal(&self, target: &TargetRef) -> Option<&dyn SavingsGoal> {
        match target.kind {
            TargetKind::Asset => self
                .assets
                .iter()
                .find(|a| a.id == target.id)
                .map(|a| a as &dyn SavingsGoal),
            TargetKind::House if self.house.id == target.id => Some(&self.house),
            TargetKind::House => None,
            TargetKind::Plan => self
                .plan
                .as_ref()
                .filter(|p| p.id == target.id)
                .map(|p| p as &dyn SavingsGoal),
        }
    }

    pub fn goal_mut(&mut self, target: &TargetRef) -> Option<&mut dyn SavingsGoal> {
        match target.kind {
            TargetKind::Asset => self
                .assets
                .iter_mut()
                .find(|a| a.id == target.id)
                .map(|a| a as &mut dyn SavingsGoal),
            TargetKind::House if self.house.id == target.id => Some(&mut self.house),
            TargetKind::House => None,
            TargetKind::Plan => self
                .plan
                .as_mut()
                .filter(|p| p.id == target.id)
                .map(|p| p as &mut dyn SavingsGoal),
        }
    }

    /// Owned copy of a target's current state.
    pub fn snapshot(&self, target: &TargetRef) -> Option<SavingsTarget> {
        match target.kind {
            TargetKind::Asset => self
                .asset_by_id(&target.id)
                .cloned()
                .map(SavingsTarget::Asset),
            TargetKind::House if self.house.id == target.id => {
                Some(SavingsTarget::House(self.house.clone()))
            }
            TargetKind::House => None,
            TargetKind::Plan => self
                .plan
                .as_ref()
                .filter(|p| p.id == target.id)
                .cloned()
                .map(SavingsTarget::Plan),
        }
    }
}

/// Destination kind of a transfer. Unrecognized kinds are kept verbatim so
/// the allocation engine can decide what to do with them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum TransferTargetKind {
    Asset,
    House,
    Plan,
    Unrecognized(String),
}

impl From<String> for TransferTargetKind {
    fn from(value: String) -> Self {
        match value.parse::<TargetKind>() {
            Ok(TargetKind::Asset) => TransferTargetKind::Asset,
            Ok(TargetKind::House) => TransferTargetKind::House,
            Ok(TargetKind::Plan) => TransferTargetKind::Plan,
            Err(_) => TransferTargetKind::Unrecognized(value),
        }
    }
}

impl From<TransferTargetKind> for String {
    fn from(value: TransferTargetKind) -> Self {
        match value {
            TransferTargetKind::Asset => TargetKind::Asset.as_str().to_string(),
            TransferTargetKind::House => TargetKind::House.as_str().to_string(),
            TransferTargetKind::Plan => TargetKind::Plan.as_str().to_string(),
            TransferTargetKind::Unrecognized(raw) => raw,
        }
    }
}

/// Instruction to move part of a released balance into another target.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransferRequest {
    pub target_kind: TransferTargetKind,
    /// Asset name; ignored for the house and the plan, which are per-user singletons.
    #[serde(default)]
    pub target_name: String,
    pub amount: Decimal,
}

/// Where a deposit or withdrawal is booked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AllocationCategory {
    /// Split across the user's savings pools (or a single named asset).
    SavingPool,
    /// Booked against the retirement plan's investments, never split.
    Investment,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AllocationRequest {
    pub amount: Decimal,
    pub category: AllocationCategory,
    /// Name of a single asset to book a saving-pool movement against.
    /// `None` splits the amount evenly across all pools.
    #[serde(default)]
    pub target_name: Option<String>,
}

/// A lifecycle transition observed during one engine call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusChange {
    pub target: TargetRef,
    pub from: TargetStatus,
    pub to: TargetStatus,
}

/// Result of one engine call: the targets whose state changed (in their
/// final state), the lifecycle transitions, and the notifications produced.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SavingsOutcome {
    pub targets: Vec<SavingsTarget>,
    pub status_changes: Vec<StatusChange>,
    pub notifications: Vec<NotificationEvent>,
    pub deleted_asset_ids: Vec<String>,
}

impl SavingsOutcome {
    pub fn is_empty(&self) -> bool {
        self.targets.is_empty() && self.deleted_asset_ids.is_empty()
    }

    /// The persistence changes this outcome implies.
    pub fn changeset(&self) -> TargetChangeset {
        TargetChangeset {
            saved: self.targets.clone(),
            deleted_asset_ids: self.deleted_asset_ids.clone(),
        }
    }
}

/// A set of target writes that must be committed atomically.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TargetChangeset {
    pub saved: Vec<SavingsTarget>,
    pub deleted_asset_ids: Vec<String>,
}

impl TargetChangeset {
    pub fn saving(saved: Vec<SavingsTarget>) -> Self {
        Self {
            saved,
            deleted_asset_ids: Vec::new(),
        }
    }
}

/// Plan-level projection returned to callers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RetirementProjection {
    pub required_funds: Decimal,
    pub house_lifetime_cost: Decimal,
    pub asset_monthly_contributions: Decimal,
    pub required_monthly_savings: Decimal,
    pub current_assets: Decimal,
    pub funding_ratio: Decimal,
    /// Monthly amount that, invested at the plan's expected return, covers the
    /// outstanding need by retirement.
    pub invested_monthly_savings: Decimal,
    pub months_until_retirement: i64,
}

// === SavingsGoal adapters ===

fn debit_pool(pool: &mut Decimal, amount: Decimal, pool_name: &str) -> Result<()> {
    if amount > *pool {
        return Err(SavingsError::InsufficientFunds {
            pool: pool_name.to_string(),
            available: *pool,
            requested: amount,
        }
        .into());
    }
    *pool -= amount;
    Ok(())
}

impl SavingsGoal for Asset {
    fn kind(&self) -> TargetKind {
        TargetKind::Asset
    }
    fn id(&self) -> &str {
        &self.id
    }
    fn user_id(&self) -> &str {
        &self.user_id
    }
    fn label(&self) -> &str {
        &self.name
    }
    fn balance(&self) -> Decimal {
        self.current_money
    }
    fn required_total(&self) -> Decimal {
        self.total_cost
    }
    fn deadline(&self) -> Option<YearMonth> {
        Some(YearMonth::end_of_year(self.end_year))
    }
    fn status(&self) -> TargetStatus {
        self.status
    }
    fn set_status(&mut self, status: TargetStatus) {
        self.status = status;
    }
    fn monthly_contribution(&self) -> Decimal {
        self.monthly_contribution
    }
    fn set_monthly_contribution(&mut self, amount: Decimal) {
        self.monthly_contribution = amount;
    }
    fn last_calculated_month(&self) -> u32 {
        self.last_calculated_month
    }
    fn set_last_calculated_month(&mut self, month: u32) {
        self.last_calculated_month = month;
    }
    fn credit(&mut self, amount: Decimal) {
        self.current_money += amount;
    }
    fn debit(&mut self, amount: Decimal) -> Result<()> {
        debit_pool(&mut self.current_money, amount, &self.name)
    }
}

impl SavingsGoal for HouseSelection {
    fn kind(&self) -> TargetKind {
        TargetKind::House
    }
    fn id(&self) -> &str {
        &self.id
    }
    fn user_id(&self) -> &str {
        &self.user_id
    }
    fn label(&self) -> &str {
        &self.house_id
    }
    fn balance(&self) -> Decimal {
        self.current_money
    }
    fn required_total(&self) -> Decimal {
        self.total_cost
    }
    fn deadline(&self) -> Option<YearMonth> {
        self.deadline
    }
    fn status(&self) -> TargetStatus {
        self.status
    }
    fn set_status(&mut self, status: TargetStatus) {
        self.status = status;
    }
    fn monthly_contribution(&self) -> Decimal {
        self.monthly_contribution
    }
    fn set_monthly_contribution(&mut self, amount: Decimal) {
        self.monthly_contribution = amount;
    }
    fn last_calculated_month(&self) -> u32 {
        self.last_calculated_month
    }
    fn set_last_calculated_month(&mut self, month: u32) {
        self.last_calculated_month = month;
    }
    fn credit(&mut self, amount: Decimal) {
        self.current_money += amount;
    }
    fn debit(&mut self, amount: Decimal) -> Result<()> {
        let pool_name = format!("house {}", self.house_id);
        debit_pool(&mut self.current_money, amount, &pool_name)
    }
    fn is_tracked(&self) -> bool {
        self.is_selected() && self.deadline.is_some()
    }
}

impl SavingsGoal for RetirementPlan {
    fn kind(&self) -> TargetKind {
        TargetKind::Plan
    }
    fn id(&self) -> &str {
        &self.id
    }
    fn user_id(&self) -> &str {
        &self.user_id
    }
    fn label(&self) -> &str {
        "retirement plan"
    }
    fn balance(&self) -> Decimal {
        self.total_assets()
    }
    fn required_total(&self) -> Decimal {
        self.required_funds
    }
    fn deadline(&self) -> Option<YearMonth> {
        Some(self.retirement_month())
    }
    fn status(&self) -> TargetStatus {
        self.status
    }
    fn set_status(&mut self, status: TargetStatus) {
        self.status = status;
    }
    fn monthly_contribution(&self) -> Decimal {
        self.monthly_contribution
    }
    fn set_monthly_contribution(&mut self, amount: Decimal) {
        self.monthly_contribution = amount;
    }
    fn last_calculated_month(&self) -> u32 {
        self.last_calculated_month
    }
    fn set_last_calculated_month(&mut self, month: u32) {
        self.last_calculated_month = month;
    }
    fn credit(&mut self, amount: Decimal) {
        self.current_savings += amount;
    }
    fn debit(&mut self, amount: Decimal) -> Result<()> {
        debit_pool(&mut self.current_savings, amount, RETIREMENT_SAVINGS_POOL)
    }
    fn pool_balance(&self) -> Decimal {
        self.current_savings
    }
}
