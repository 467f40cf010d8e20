//! Allocation engine.
//!
//! Applies one operation (deposit, withdrawal, close-with-transfers, monthly
//! recompute, user edit) to a user's targets in memory. The engine works on
//! its own copy: when any step fails the caller drops the engine and nothing
//! it touched is persisted.

use log::{debug, warn};
use rust_decimal::prelude::*;

use super::accrual_calculator::{self, Accrual, AccrualMode};
use super::lifecycle;
use super::projection_calculator::project_monthly_contribution;
use super::savings_model::{
    AllocationCategory, AllocationRequest, Asset, HouseChoice, HouseSelection, RetirementPlan,
    SavingsOutcome, StatusChange, TargetKind, TargetRef, TransferRequest, TransferTargetKind,
    UserTargets,
};
use super::savings_traits::SavingsGoal;
use crate::constants::{MONEY_DECIMAL_PRECISION, NOT_TRACKING_MONTH};
use crate::errors::{Error, Result, SavingsError, ValidationError};
use crate::events::NotificationEvent;
use crate::utils::time_utils::YearMonth;

/// Splits `amount` into `parts` shares truncated to the cent. The leftover
/// cents go to the last share. `None` when there is nothing to split into.
pub fn split_evenly(amount: Decimal, parts: usize) -> Option<Vec<Decimal>> {
    if parts == 0 {
        return None;
    }
    let count = Decimal::from(parts);
    let share = (amount / count)
        .round_dp_with_strategy(MONEY_DECIMAL_PRECISION, RoundingStrategy::ToZero);
    let mut shares = vec![share; parts];
    if let Some(last) = shares.last_mut() {
        *last += amount - share * count;
    }
    Some(shares)
}

fn ensure_positive(amount: Decimal) -> Result<()> {
    if amount <= Decimal::ZERO {
        return Err(Error::Validation(ValidationError::InvalidInput(
            "Amount must be greater than zero".to_string(),
        )));
    }
    Ok(())
}

fn not_found(kind: TargetKind, name: &str) -> Error {
    SavingsError::TargetNotFound {
        kind,
        name: name.to_string(),
    }
    .into()
}

pub struct AllocationEngine {
    targets: UserTargets,
    original: UserTargets,
    as_of: YearMonth,
    status_changes: Vec<StatusChange>,
    notifications: Vec<NotificationEvent>,
    deleted_asset_ids: Vec<String>,
}

impl AllocationEngine {
    pub fn new(targets: UserTargets, as_of: YearMonth) -> Self {
        Self {
            original: targets.clone(),
            targets,
            as_of,
            status_changes: Vec::new(),
            notifications: Vec::new(),
            deleted_asset_ids: Vec::new(),
        }
    }

    pub fn targets(&self) -> &UserTargets {
        &self.targets
    }

    pub fn as_of(&self) -> YearMonth {
        self.as_of
    }

    fn goal_mut(&mut self, target: &TargetRef) -> Result<&mut dyn SavingsGoal> {
        self.targets
            .goal_mut(target)
            .ok_or_else(|| not_found(target.kind, &target.id))
    }

    /// Runs the lifecycle rule on one target and records what happened.
    fn evaluate(&mut self, target: &TargetRef, missed_months: Option<u32>) -> Result<()> {
        let as_of = self.as_of;
        let goal = self.goal_mut(target)?;
        if let Some(change) = lifecycle::apply(goal, as_of, missed_months) {
            self.status_changes.push(change.status_change);
            self.notifications.push(change.notification);
        }
        Ok(())
    }

    /// Brings a target's monthly contribution up to date, then re-evaluates
    /// its status.
    fn refresh(&mut self, target: &TargetRef, mode: AccrualMode, force: bool) -> Result<()> {
        let as_of = self.as_of;
        let goal = self.goal_mut(target)?;
        let accrual = accrual_calculator::recalculate(goal, as_of, mode, force)?;
        let missed_months = match accrual {
            Accrual::Lapsed { missed_months } => missed_months,
            _ => None,
        };
        self.evaluate(target, missed_months)
    }

    fn credit(&mut self, target: &TargetRef, amount: Decimal) -> Result<()> {
        self.refresh(target, AccrualMode::Lenient, false)?;
        self.goal_mut(target)?.credit(amount);
        self.evaluate(target, None)
    }

    fn debit(&mut self, target: &TargetRef, amount: Decimal) -> Result<()> {
        self.refresh(target, AccrualMode::Lenient, false)?;
        self.goal_mut(target)?.debit(amount)?;
        self.evaluate(target, None)
    }

    /// Pools an unnamed saving-pool movement is split across: active assets,
    /// the chosen house and the plan, in that order.
    pub fn distribution_slots(&self) -> Vec<TargetRef> {
        let mut slots: Vec<TargetRef> = self
            .targets
            .assets
            .iter()
            .filter(|a| a.status.is_active())
            .map(|a| a.reference())
            .collect();
        if self.targets.house.is_selected() {
            slots.push(self.targets.house.reference());
        }
        if let Some(plan) = &self.targets.plan {
            slots.push(plan.reference());
        }
        slots
    }

    fn named_asset(&self, name: &str) -> Result<TargetRef> {
        self.targets
            .asset_by_name(name)
            .map(|a| a.reference())
            .ok_or_else(|| not_found(TargetKind::Asset, name))
    }

    fn plan_ref(&self) -> Result<TargetRef> {
        self.targets
            .plan
            .as_ref()
            .map(|p| p.reference())
            .ok_or_else(|| not_found(TargetKind::Plan, "retirement plan"))
    }

    pub fn deposit(&mut self, request: &AllocationRequest) -> Result<()> {
        ensure_positive(request.amount)?;
        match (request.category, request.target_name.as_deref()) {
            (AllocationCategory::Investment, _) => {
                let plan = self.plan_ref()?;
                self.refresh(&plan, AccrualMode::Lenient, false)?;
                if let Some(plan) = self.targets.plan.as_mut() {
                    plan.invest(request.amount);
                }
                self.evaluate(&plan, None)
            }
            (AllocationCategory::SavingPool, Some(name)) => {
                let asset = self.named_asset(name)?;
                self.credit(&asset, request.amount)
            }
            (AllocationCategory::SavingPool, None) => {
                let slots = self.distribution_slots();
                let shares = split_evenly(request.amount, slots.len())
                    .ok_or(SavingsError::NoDistributionTargets)?;
                debug!(
                    "Splitting deposit of {} across {} pools",
                    request.amount,
                    slots.len()
                );
                for (slot, share) in slots.iter().zip(shares) {
                    self.credit(slot, share)?;
                }
                Ok(())
            }
        }
    }

    /// Withdraws from the pools. Any share exceeding its pool fails the whole
    /// withdrawal.
    pub fn withdraw(&mut self, request: &AllocationRequest) -> Result<()> {
        ensure_positive(request.amount)?;
        match (request.category, request.target_name.as_deref()) {
            (AllocationCategory::Investment, _) => {
                let plan = self.plan_ref()?;
                self.refresh(&plan, AccrualMode::Lenient, false)?;
                if let Some(plan) = self.targets.plan.as_mut() {
                    plan.divest(request.amount)?;
                }
                self.evaluate(&plan, None)
            }
            (AllocationCategory::SavingPool, Some(name)) => {
                let asset = self.named_asset(name)?;
                self.debit(&asset, request.amount)
            }
            (AllocationCategory::SavingPool, None) => {
                let slots = self.distribution_slots();
                let shares = split_evenly(request.amount, slots.len())
                    .ok_or(SavingsError::NoDistributionTargets)?;
                for (slot, share) in slots.iter().zip(&shares) {
                    let goal = self
                        .targets
                        .goal(slot)
                        .ok_or_else(|| not_found(slot.kind, &slot.id))?;
                    if goal.pool_balance() < *share {
                        return Err(SavingsError::InsufficientFunds {
                            pool: goal.label().to_string(),
                            available: goal.pool_balance(),
                            requested: *share,
                        }
                        .into());
                    }
                }
                for (slot, share) in slots.iter().zip(shares) {
                    self.debit(slot, share)?;
                }
                Ok(())
            }
        }
    }

    /// Moves parts of a closing asset's balance into other targets.
    ///
    /// Transfers with an unrecognized destination kind are skipped.
    pub fn transfer_on_close(
        &mut self,
        source_id: &str,
        source_amount: Decimal,
        transfers: &[TransferRequest],
    ) -> Result<()> {
        for transfer in transfers {
            ensure_positive(transfer.amount)?;
        }
        let requested: Decimal = transfers.iter().map(|t| t.amount).sum();
        if requested > source_amount {
            return Err(SavingsError::TransferExceedsSource {
                requested,
                available: source_amount,
            }
            .into());
        }

        for transfer in transfers {
            let destination = match &transfer.target_kind {
                TransferTargetKind::Asset => self
                    .targets
                    .assets
                    .iter()
                    .find(|a| a.name == transfer.target_name && a.id != source_id)
                    .map(|a| a.reference())
                    .ok_or_else(|| not_found(TargetKind::Asset, &transfer.target_name))?,
                TransferTargetKind::House if self.targets.house.is_selected() => {
                    self.targets.house.reference()
                }
                TransferTargetKind::House => {
                    return Err(not_found(TargetKind::House, &transfer.target_name))
                }
                TransferTargetKind::Plan => self.plan_ref()?,
                TransferTargetKind::Unrecognized(kind) => {
                    warn!(
                        "Skipping transfer of {} to unknown target kind '{}'",
                        transfer.amount, kind
                    );
                    continue;
                }
            };

            let goal = self
                .targets
                .goal(&destination)
                .ok_or_else(|| not_found(destination.kind, &destination.id))?;
            if !goal.status().is_active() {
                return Err(SavingsError::TargetInactive {
                    kind: destination.kind,
                    name: goal.label().to_string(),
                }
                .into());
            }
            self.credit(&destination, transfer.amount)?;
        }
        Ok(())
    }

    /// Deletes an asset after moving its balance as requested.
    pub fn close_asset(&mut self, asset_id: &str, transfers: &[TransferRequest]) -> Result<()> {
        let source_amount = self
            .targets
            .asset_by_id(asset_id)
            .map(|a| a.current_money)
            .ok_or_else(|| not_found(TargetKind::Asset, asset_id))?;
        self.transfer_on_close(asset_id, source_amount, transfers)?;
        self.targets.assets.retain(|a| a.id != asset_id);
        self.deleted_asset_ids.push(asset_id.to_string());
        self.reproject_plan()
    }

    /// Adds a new asset and prices its first month.
    pub fn add_asset(&mut self, asset: Asset) -> Result<()> {
        if self.targets.asset_by_name(&asset.name).is_some() {
            return Err(Error::Validation(ValidationError::InvalidInput(format!(
                "An asset named '{}' already exists",
                asset.name
            ))));
        }
        let target = asset.reference();
        self.targets.assets.push(asset);
        self.refresh(&target, AccrualMode::Strict, true)?;
        self.reproject_plan()
    }

    /// Applies a user edit to an active asset and reprices it.
    pub fn edit_asset(
        &mut self,
        asset_id: &str,
        name: &str,
        total_cost: Decimal,
        end_year: i32,
    ) -> Result<()> {
        if self
            .targets
            .assets
            .iter()
            .any(|a| a.name == name && a.id != asset_id)
        {
            return Err(Error::Validation(ValidationError::InvalidInput(format!(
                "An asset named '{}' already exists",
                name
            ))));
        }
        let asset = self
            .targets
            .assets
            .iter_mut()
            .find(|a| a.id == asset_id)
            .ok_or_else(|| not_found(TargetKind::Asset, asset_id))?;
        if !asset.status.is_active() {
            return Err(SavingsError::TargetInactive {
                kind: TargetKind::Asset,
                name: asset.name.clone(),
            }
            .into());
        }
        asset.name = name.to_string();
        asset.total_cost = total_cost;
        asset.end_year = end_year;
        let target = asset.reference();
        self.refresh(&target, AccrualMode::Strict, true)?;
        self.reproject_plan()
    }

    /// Creates the plan or replaces its assumptions, restarting its clock at
    /// the current month.
    pub fn upsert_plan(&mut self, plan: RetirementPlan) -> Result<()> {
        let plan = match self.targets.plan.take() {
            Some(existing) => RetirementPlan {
                id: existing.id,
                current_savings: existing.current_savings,
                current_total_investment: existing.current_total_investment,
                status: existing.status,
                created_at: existing.created_at,
                ..plan
            },
            None => plan,
        };
        let target = plan.reference();
        self.targets.plan = Some(plan);
        self.targets.sync_house_with_plan();
        self.reproject_plan()?;
        self.refresh_house(true)?;
        self.refresh(&target, AccrualMode::Lenient, true)
    }

    /// Replaces the house choice. A previous choice's balance carries over.
    pub fn select_house(&mut self, choice: &HouseChoice) -> Result<()> {
        let previous = self.targets.house.clone();
        let carried = if previous.is_selected() {
            previous.current_money
        } else {
            Decimal::ZERO
        };
        self.targets.house = HouseSelection {
            house_id: choice.house_id.trim().to_string(),
            monthly_price: choice.monthly_price,
            current_money: carried,
            monthly_contribution: Decimal::ZERO,
            last_calculated_month: NOT_TRACKING_MONTH,
            status: Default::default(),
            ..previous
        };
        self.targets.sync_house_with_plan();
        self.reproject_plan()?;
        self.refresh_house(true)
    }

    /// Reverts to the "no selection" sentinel. Money saved for the house
    /// moves into the plan's savings.
    pub fn clear_house(&mut self) -> Result<()> {
        let house = &self.targets.house;
        if !house.is_selected() {
            return Ok(());
        }
        let released = house.current_money;
        if released > Decimal::ZERO {
            let Some(plan) = self.targets.plan.as_mut() else {
                return Err(Error::Validation(ValidationError::InvalidInput(
                    "Withdraw the money saved for the house before clearing it".to_string(),
                )));
            };
            plan.credit(released);
        }

        let previous = self.targets.house.clone();
        self.targets.house = HouseSelection {
            id: previous.id,
            created_at: previous.created_at,
            ..HouseSelection::unselected(&previous.user_id, previous.updated_at)
        };
        self.targets.sync_house_with_plan();
        self.reproject_plan()?;
        if let Some(plan) = self.targets.plan.as_ref().map(|p| p.reference()) {
            self.evaluate(&plan, None)?;
        }
        Ok(())
    }

    fn refresh_house(&mut self, force: bool) -> Result<()> {
        let house = self.targets.house.reference();
        self.refresh(&house, AccrualMode::Lenient, force)
    }

    /// Refreshes the plan's projected funding need and monthly savings from
    /// its assumptions, the house price and the active assets' contributions.
    pub fn reproject_plan(&mut self) -> Result<()> {
        let house_price = if self.targets.house.is_selected() {
            self.targets.house.monthly_price
        } else {
            Decimal::ZERO
        };
        let asset_contributions = self.targets.asset_monthly_contributions();
        let Some(plan) = self.targets.plan.as_mut() else {
            return Ok(());
        };
        if !plan.status.is_active() {
            return Ok(());
        }
        let projection =
            project_monthly_contribution(&plan.assumptions(), house_price, asset_contributions)?;
        plan.required_funds = projection.required_funds;
        plan.required_monthly_savings = projection.required_monthly_savings;
        Ok(())
    }

    /// The monthly sweep: assets, then the house, then the plan.
    pub fn recalculate_all(&mut self) -> Result<()> {
        let assets: Vec<TargetRef> = self.targets.assets.iter().map(|a| a.reference()).collect();
        for asset in &assets {
            self.refresh(asset, AccrualMode::Lenient, false)?;
        }

        self.targets.sync_house_with_plan();
        self.refresh_house(false)?;

        if let Some(plan) = self.targets.plan.as_ref().map(|p| p.reference()) {
            self.reproject_plan()?;
            self.refresh(&plan, AccrualMode::Lenient, false)?;
        }
        Ok(())
    }

    /// Consumes the engine, returning the final targets and what changed.
    pub fn finish(self) -> (UserTargets, SavingsOutcome) {
        let changed = self
            .targets
            .refs()
            .iter()
            .filter_map(|target| {
                let current = self.targets.snapshot(target)?;
                match self.original.snapshot(target) {
                    Some(before) if before == current => None,
                    _ => Some(current),
                }
            })
            .collect();

        let outcome = SavingsOutcome {
            targets: changed,
            status_changes: self.status_changes,
            notifications: self.notifications,
            deleted_asset_ids: self.deleted_asset_ids,
        };
        (self.targets, outcome)
    }
}
