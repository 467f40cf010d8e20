//! Database models for savings targets.
//!
//! Money and rates are stored as decimal strings so no precision is lost.

use chrono::NaiveDateTime;
use diesel::prelude::*;
use rust_decimal::Decimal;
use std::str::FromStr;

use nestegg_core::savings::{Asset, HouseSelection, RetirementPlan, TargetStatus, UserTargets};
use nestegg_core::Result;

use crate::errors::StorageError;

pub(crate) fn parse_decimal(value: &str, field: &str) -> Result<Decimal> {
    Decimal::from_str(value).map_err(|e| {
        log::error!("Stored {} '{}' is not a decimal: {}", field, value, e);
        StorageError::InvalidRow(format!("{} '{}' is not a decimal", field, value)).into()
    })
}

fn parse_status(value: &str) -> Result<TargetStatus> {
    TargetStatus::from_str(value)
        .map_err(|_| StorageError::InvalidRow(format!("unknown status '{}'", value)).into())
}

fn to_u32(value: i32, field: &str) -> Result<u32> {
    u32::try_from(value)
        .map_err(|_| StorageError::InvalidRow(format!("{} {} is negative", field, value)).into())
}

fn to_i32(value: u32) -> i32 {
    i32::try_from(value).unwrap_or(i32::MAX)
}

/// Database model for savings assets
#[derive(Queryable, Selectable, Insertable, AsChangeset, Identifiable, Debug, Clone, PartialEq)]
#[diesel(table_name = crate::schema::savings_assets)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct AssetDB {
    pub id: String,
    pub user_id: String,
    pub name: String,
    pub total_cost: String,
    pub current_money: String,
    pub monthly_contribution: String,
    pub last_calculated_month: i32,
    pub end_year: i32,
    pub status: String,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

impl TryFrom<AssetDB> for Asset {
    type Error = nestegg_core::Error;

    fn try_from(db: AssetDB) -> Result<Self> {
        Ok(Self {
            total_cost: parse_decimal(&db.total_cost, "total_cost")?,
            current_money: parse_decimal(&db.current_money, "current_money")?,
            monthly_contribution: parse_decimal(&db.monthly_contribution, "monthly_contribution")?,
            last_calculated_month: to_u32(db.last_calculated_month, "last_calculated_month")?,
            status: parse_status(&db.status)?,
            id: db.id,
            user_id: db.user_id,
            name: db.name,
            end_year: db.end_year,
            created_at: db.created_at,
            updated_at: db.updated_at,
        })
    }
}

impl From<Asset> for AssetDB {
    fn from(domain: Asset) -> Self {
        Self {
            id: domain.id,
            user_id: domain.user_id,
            name: domain.name,
            total_cost: domain.total_cost.to_string(),
            current_money: domain.current_money.to_string(),
            monthly_contribution: domain.monthly_contribution.to_string(),
            last_calculated_month: to_i32(domain.last_calculated_month),
            end_year: domain.end_year,
            status: domain.status.as_str().to_string(),
            created_at: domain.created_at,
            updated_at: domain.updated_at,
        }
    }
}

/// Database model for the nursing-home selection. The plan-derived lifetime
/// cost and deadline are not stored.
#[derive(Queryable, Selectable, Insertable, AsChangeset, Identifiable, Debug, Clone, PartialEq)]
#[diesel(table_name = crate::schema::house_selections)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct HouseSelectionDB {
    pub id: String,
    pub user_id: String,
    pub house_id: String,
    pub monthly_price: String,
    pub current_money: String,
    pub monthly_contribution: String,
    pub last_calculated_month: i32,
    pub status: String,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

impl TryFrom<HouseSelectionDB> for HouseSelection {
    type Error = nestegg_core::Error;

    fn try_from(db: HouseSelectionDB) -> Result<Self> {
        Ok(Self {
            monthly_price: parse_decimal(&db.monthly_price, "monthly_price")?,
            current_money: parse_decimal(&db.current_money, "current_money")?,
            monthly_contribution: parse_decimal(&db.monthly_contribution, "monthly_contribution")?,
            last_calculated_month: to_u32(db.last_calculated_month, "last_calculated_month")?,
            status: parse_status(&db.status)?,
            total_cost: Decimal::ZERO,
            deadline: None,
            id: db.id,
            user_id: db.user_id,
            house_id: db.house_id,
            created_at: db.created_at,
            updated_at: db.updated_at,
        })
    }
}

impl From<HouseSelection> for HouseSelectionDB {
    fn from(domain: HouseSelection) -> Self {
        Self {
            id: domain.id,
            user_id: domain.user_id,
            house_id: domain.house_id,
            monthly_price: domain.monthly_price.to_string(),
            current_money: domain.current_money.to_string(),
            monthly_contribution: domain.monthly_contribution.to_string(),
            last_calculated_month: to_i32(domain.last_calculated_month),
            status: domain.status.as_str().to_string(),
            created_at: domain.created_at,
            updated_at: domain.updated_at,
        }
    }
}

/// Database model for retirement plans
#[derive(Queryable, Selectable, Insertable, AsChangeset, Identifiable, Debug, Clone, PartialEq)]
#[diesel(table_name = crate::schema::retirement_plans)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct RetirementPlanDB {
    pub id: String,
    pub user_id: String,
    pub age: i32,
    pub retirement_age: i32,
    pub expect_lifespan: i32,
    pub expected_monthly_expense: String,
    pub annual_expense_increase: String,
    pub expected_inflation: String,
    pub expected_return_rate: String,
    pub current_savings: String,
    pub current_total_investment: String,
    pub required_funds: String,
    pub required_monthly_savings: String,
    pub monthly_contribution: String,
    pub last_calculated_month: i32,
    pub status: String,
    pub start_year: i32,
    pub start_month: i32,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

impl TryFrom<RetirementPlanDB> for RetirementPlan {
    type Error = nestegg_core::Error;

    fn try_from(db: RetirementPlanDB) -> Result<Self> {
        Ok(Self {
            age: to_u32(db.age, "age")?,
            retirement_age: to_u32(db.retirement_age, "retirement_age")?,
            expect_lifespan: to_u32(db.expect_lifespan, "expect_lifespan")?,
            expected_monthly_expense: parse_decimal(
                &db.expected_monthly_expense,
                "expected_monthly_expense",
            )?,
            annual_expense_increase: parse_decimal(
                &db.annual_expense_increase,
                "annual_expense_increase",
            )?,
            expected_inflation: parse_decimal(&db.expected_inflation, "expected_inflation")?,
            expected_return_rate: parse_decimal(&db.expected_return_rate, "expected_return_rate")?,
            current_savings: parse_decimal(&db.current_savings, "current_savings")?,
            current_total_investment: parse_decimal(
                &db.current_total_investment,
                "current_total_investment",
            )?,
            required_funds: parse_decimal(&db.required_funds, "required_funds")?,
            required_monthly_savings: parse_decimal(
                &db.required_monthly_savings,
                "required_monthly_savings",
            )?,
            monthly_contribution: parse_decimal(&db.monthly_contribution, "monthly_contribution")?,
            last_calculated_month: to_u32(db.last_calculated_month, "last_calculated_month")?,
            status: parse_status(&db.status)?,
            start_month: to_u32(db.start_month, "start_month")?,
            start_year: db.start_year,
            id: db.id,
            user_id: db.user_id,
            created_at: db.created_at,
            updated_at: db.updated_at,
        })
    }
}

impl From<RetirementPlan> for RetirementPlanDB {
    fn from(domain: RetirementPlan) -> Self {
        Self {
            id: domain.id,
            user_id: domain.user_id,
            age: to_i32(domain.age),
            retirement_age: to_i32(domain.retirement_age),
            expect_lifespan: to_i32(domain.expect_lifespan),
            expected_monthly_expense: domain.expected_monthly_expense.to_string(),
            annual_expense_increase: domain.annual_expense_increase.to_string(),
            expected_inflation: domain.expected_inflation.to_string(),
            expected_return_rate: domain.expected_return_rate.to_string(),
            current_savings: domain.current_savings.to_string(),
            current_total_investment: domain.current_total_investment.to_string(),
            required_funds: domain.required_funds.to_string(),
            required_monthly_savings: domain.required_monthly_savings.to_string(),
            monthly_contribution: domain.monthly_contribution.to_string(),
            last_calculated_month: to_i32(domain.last_calculated_month),
            status: domain.status.as_str().to_string(),
            start_year: domain.start_year,
            start_month: to_i32(domain.start_month),
            created_at: domain.created_at,
            updated_at: domain.updated_at,
        }
    }
}

/// Rows of one user, as loaded from the three target tables.
pub(crate) struct UserRows {
    pub assets: Vec<AssetDB>,
    pub house: Option<HouseSelectionDB>,
    pub plan: Option<RetirementPlanDB>,
}

impl UserRows {
    pub fn into_targets(self, user_id: &str, now: NaiveDateTime) -> Result<UserTargets> {
        let assets = self
            .assets
            .into_iter()
            .map(Asset::try_from)
            .collect::<Result<Vec<_>>>()?;
        let house = match self.house {
            Some(row) => HouseSelection::try_from(row)?,
            None => HouseSelection::unselected(user_id, now),
        };
        let plan = self.plan.map(RetirementPlan::try_from).transpose()?;
        Ok(UserTargets::new(user_id, assets, house, plan))
    }
}
