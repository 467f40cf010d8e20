//! Retirement expense and contribution projections.
//!
//! Pure functions over plan assumptions. All arithmetic is exact `Decimal`
//! arithmetic; results are rounded to cents with banker's rounding.

use rust_decimal::prelude::*;
use rust_decimal::MathematicalOps;
use rust_decimal_macros::dec;

use super::savings_model::PlanAssumptions;
use crate::constants::{MAX_PLAN_AGE, MONEY_DECIMAL_PRECISION, MONTHS_PER_YEAR};
use crate::errors::{Result, SavingsError};

/// Output of [`project_monthly_contribution`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ContributionProjection {
    pub required_funds: Decimal,
    pub house_lifetime_cost: Decimal,
    pub asset_monthly_contributions: Decimal,
    pub required_monthly_savings: Decimal,
}

pub fn round_money(amount: Decimal) -> Decimal {
    amount.round_dp_with_strategy(
        MONEY_DECIMAL_PRECISION,
        RoundingStrategy::MidpointNearestEven,
    )
}

fn invalid(message: impl Into<String>) -> SavingsError {
    SavingsError::InvalidAssumptions(message.into())
}

/// Checks the ordering `age < retirement_age < expect_lifespan <= MAX_PLAN_AGE`
/// and that no amount or rate is negative.
pub fn validate_assumptions(assumptions: &PlanAssumptions) -> Result<()> {
    if assumptions.expect_lifespan > MAX_PLAN_AGE {
        return Err(invalid(format!(
            "life expectancy cannot exceed {} years",
            MAX_PLAN_AGE
        ))
        .into());
    }
    if assumptions.age >= assumptions.retirement_age {
        return Err(invalid("age must be lower than retirement age").into());
    }
    if assumptions.retirement_age >= assumptions.expect_lifespan {
        return Err(invalid("retirement age must be lower than life expectancy").into());
    }
    if assumptions.expected_monthly_expense.is_sign_negative() {
        return Err(invalid("expected monthly expense cannot be negative").into());
    }
    if assumptions.annual_expense_increase.is_sign_negative() {
        return Err(invalid("annual expense increase cannot be negative").into());
    }
    if assumptions.expected_inflation.is_sign_negative() {
        return Err(invalid("expected inflation cannot be negative").into());
    }
    Ok(())
}

/// Total inflation-adjusted expense the plan must fund.
///
/// Every one of the `retirement_age - age` pre-retirement years adds the full
/// post-retirement expense curve of `expect_lifespan - age - 1` years, where
/// year `j` costs `monthly_expense * 12 * (1 + increase + inflation)^j`.
/// The cumulative horizon is intentional and kept as is.
pub fn project_retirement_expense(assumptions: &PlanAssumptions) -> Result<Decimal> {
    validate_assumptions(assumptions)?;

    let years_until_retirement = assumptions.retirement_age - assumptions.age;
    let consumption_years = assumptions.expect_lifespan - assumptions.age - 1;
    let growth = Decimal::ONE + assumptions.annual_expense_increase + assumptions.expected_inflation;
    let annual_expense = assumptions.expected_monthly_expense * Decimal::from(MONTHS_PER_YEAR);
    let overflow = || invalid("projected expense exceeds the representable range");

    let mut total = Decimal::ZERO;
    for _ in 0..years_until_retirement {
        let mut factor = Decimal::ONE;
        for _ in 0..consumption_years {
            let yearly = annual_expense.checked_mul(factor).ok_or_else(overflow)?;
            total = total.checked_add(yearly).ok_or_else(overflow)?;
            factor = factor.checked_mul(growth).ok_or_else(overflow)?;
        }
    }

    Ok(round_money(total))
}

/// Lifetime cost of a nursing home over the retirement years.
pub fn house_lifetime_cost(monthly_price: Decimal, years_of_retirement: u32) -> Decimal {
    monthly_price * Decimal::from(years_of_retirement)
}

/// Monthly amount needed until retirement to fund the plan, the chosen
/// nursing home and the active assets' current contributions.
pub fn project_monthly_contribution(
    assumptions: &PlanAssumptions,
    house_monthly_price: Decimal,
    asset_monthly_contributions: Decimal,
) -> Result<ContributionProjection> {
    let required_funds = project_retirement_expense(assumptions)?;

    let years_until_retirement = assumptions.retirement_age.saturating_sub(assumptions.age);
    let years_of_retirement = assumptions
        .expect_lifespan
        .saturating_sub(assumptions.retirement_age);
    let house_cost = house_lifetime_cost(house_monthly_price, years_of_retirement);
    let months = Decimal::from(years_until_retirement) * Decimal::from(MONTHS_PER_YEAR);

    let per_month = (required_funds + house_cost)
        .checked_div(months)
        .ok_or_else(|| invalid("no months left until retirement"))?;

    Ok(ContributionProjection {
        required_funds,
        house_lifetime_cost: house_cost,
        asset_monthly_contributions,
        required_monthly_savings: round_money(per_month + asset_monthly_contributions),
    })
}

/// Future value interest factor of an annuity: what a contribution of 1 per
/// period grows to after `periods` periods at `rate` per period.
pub fn future_value_annuity_factor(rate: Decimal, periods: u32) -> Result<Decimal> {
    if rate.is_zero() {
        return Ok(Decimal::from(periods));
    }
    let overflow = || invalid("expected return rate is too high to project");
    let growth = (Decimal::ONE + rate)
        .checked_powu(u64::from(periods))
        .ok_or_else(overflow)?;
    Ok((growth - Decimal::ONE).checked_div(rate).ok_or_else(overflow)?)
}

/// Periodic contribution that accumulates `target` after `periods` periods at
/// `rate` per period. With no periods left the whole target is due now.
pub fn annuity_payment(target: Decimal, rate: Decimal, periods: u32) -> Result<Decimal> {
    if target <= Decimal::ZERO {
        return Ok(Decimal::ZERO);
    }
    if periods == 0 {
        return Ok(round_money(target));
    }
    let factor = future_value_annuity_factor(rate, periods)?;
    if factor <= Decimal::ZERO {
        return Ok(round_money(target));
    }
    Ok(round_money(target / factor))
}

/// Converts an annual rate to the equivalent simple monthly rate.
pub fn monthly_rate(annual_rate: Decimal) -> Decimal {
    annual_rate / dec!(12)
}
