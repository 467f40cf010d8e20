//! Monthly accrual recalculation.
//!
//! Works out how much a target still needs per remaining month. A target is
//! charged at most once per calendar month: `last_calculated_month` records
//! the month the current contribution was computed for.

use rust_decimal::Decimal;

use super::projection_calculator::round_money;
use super::savings_traits::SavingsGoal;
use crate::errors::{Result, SavingsError};
use crate::utils::time_utils::{months_elapsed, YearMonth};

/// How a negative remaining need is treated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccrualMode {
    /// User edits: an over-funded target is rejected.
    Strict,
    /// Background recompute: an over-funded target simply needs nothing more.
    Lenient,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Accrual {
    /// Untracked or not active.
    Skipped,
    /// The contribution for this month was already computed.
    AlreadyCharged,
    Recalculated {
        monthly_contribution: Decimal,
        remaining_periods: i64,
    },
    /// No contribution period is left. Carries the number of months that
    /// went by without a calculation, when more than one did.
    Lapsed { missed_months: Option<u32> },
}

/// Whole months left to contribute before `deadline`. The deadline month
/// itself is not a contribution period.
pub fn remaining_periods(deadline: YearMonth, as_of: YearMonth) -> i64 {
    deadline.months_since(as_of)
}

fn missed_months(last_calculated_month: u32, current_month: u32) -> Option<u32> {
    months_elapsed(last_calculated_month, current_month)
        .filter(|elapsed| *elapsed > 1)
        .map(|elapsed| elapsed - 1)
}

/// Recomputes `goal`'s monthly contribution for `as_of`.
///
/// With `force` the month guard is ignored, which user edits rely on to
/// reprice a target that was already charged this month.
pub fn recalculate(
    goal: &mut dyn SavingsGoal,
    as_of: YearMonth,
    mode: AccrualMode,
    force: bool,
) -> Result<Accrual> {
    if !goal.is_tracked() || !goal.status().is_active() {
        return Ok(Accrual::Skipped);
    }
    if !force && goal.last_calculated_month() == as_of.month {
        return Ok(Accrual::AlreadyCharged);
    }
    let Some(deadline) = goal.deadline() else {
        return Ok(Accrual::Skipped);
    };

    let remaining_need = goal.required_total() - goal.balance();
    if mode == AccrualMode::Strict && remaining_need.is_sign_negative() {
        return Err(SavingsError::NegativeRemainingFunds {
            required: goal.required_total(),
            saved: goal.balance(),
        }
        .into());
    }

    let periods = remaining_periods(deadline, as_of);
    if periods <= 0 {
        return Ok(Accrual::Lapsed {
            missed_months: missed_months(goal.last_calculated_month(), as_of.month),
        });
    }

    let contribution = round_money(remaining_need.max(Decimal::ZERO) / Decimal::from(periods));
    goal.set_monthly_contribution(contribution);
    goal.set_last_calculated_month(as_of.month);

    Ok(Accrual::Recalculated {
        monthly_contribution: contribution,
        remaining_periods: periods,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::savings::{Asset, TargetStatus};
    use chrono::NaiveDate;
    use rust_decimal_macros::dec;

    fn asset(total_cost: Decimal, current_money: Decimal, end_year: i32) -> Asset {
        let ts = NaiveDate::from_ymd_opt(2026, 1, 1)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap();
        Asset {
            id: "asset-1".to_string(),
            user_id: "user-1".to_string(),
            name: "Kitchen".to_string(),
            total_cost,
            current_money,
            monthly_contribution: Decimal::ZERO,
            last_calculated_month: 0,
            end_year,
            status: TargetStatus::Active,
            created_at: ts,
            updated_at: ts,
        }
    }

    fn ym(year: i32, month: u32) -> YearMonth {
        YearMonth::new(year, month).unwrap()
    }

    #[test]
    fn test_month_guard_and_rollover() {
        let mut target = asset(dec!(100000), dec!(10000), 2026);

        let first = recalculate(&mut target, ym(2026, 6), AccrualMode::Lenient, false).unwrap();
        assert_eq!(
            first,
            Accrual::Recalculated {
                monthly_contribution: dec!(15000),
                remaining_periods: 6
            }
        );
        assert_eq!(target.last_calculated_month, 6);

        let again = recalculate(&mut target, ym(2026, 6), AccrualMode::Lenient, false).unwrap();
        assert_eq!(again, Accrual::AlreadyCharged);
        assert_eq!(target.monthly_contribution, dec!(15000));

        let next = recalculate(&mut target, ym(2026, 7), AccrualMode::Lenient, false).unwrap();
        assert_eq!(
            next,
            Accrual::Recalculated {
                monthly_contribution: dec!(18000),
                remaining_periods: 5
            }
        );
        assert_eq!(target.last_calculated_month, 7);
    }

    #[test]
    fn test_remaining_periods_exclude_the_deadline_month() {
        let december_2027 = YearMonth::end_of_year(2027);
        assert_eq!(remaining_periods(december_2027, ym(2026, 6)), 18);
        assert_eq!(remaining_periods(december_2027, ym(2027, 11)), 1);
        assert_eq!(remaining_periods(december_2027, ym(2027, 12)), 0);
    }

    #[test]
    fn test_overfunded_target_is_clamped_in_lenient_mode() {
        let mut target = asset(dec!(1000), dec!(1200), 2030);
        let result = recalculate(&mut target, ym(2026, 6), AccrualMode::Lenient, false).unwrap();
        assert!(matches!(
            result,
            Accrual::Recalculated { monthly_contribution, .. } if monthly_contribution == Decimal::ZERO
        ));
    }

    #[test]
    fn test_overfunded_target_is_rejected_in_strict_mode() {
        let mut target = asset(dec!(1000), dec!(1200), 2030);
        let err = recalculate(&mut target, ym(2026, 6), AccrualMode::Strict, false).unwrap_err();
        assert!(matches!(
            err.as_savings(),
            Some(SavingsError::NegativeRemainingFunds { .. })
        ));
        assert_eq!(target.last_calculated_month, 0);
    }

    #[test]
    fn test_deadline_month_lapses() {
        let mut target = asset(dec!(1000), dec!(10), 2026);
        target.last_calculated_month = 9;
        let result = recalculate(&mut target, ym(2026, 12), AccrualMode::Lenient, false).unwrap();
        assert_eq!(
            result,
            Accrual::Lapsed {
                missed_months: Some(2)
            }
        );
        // Lapsing is left to the lifecycle state machine.
        assert_eq!(target.status, TargetStatus::Active);
    }

    #[test]
    fn test_inactive_targets_are_skipped() {
        let mut target = asset(dec!(1000), dec!(10), 2030);
        target.status = TargetStatus::Paused;
        let result = recalculate(&mut target, ym(2026, 6), AccrualMode::Lenient, true).unwrap();
        assert_eq!(result, Accrual::Skipped);
    }

    #[test]
    fn test_force_ignores_month_guard() {
        let mut target = asset(dec!(1200), Decimal::ZERO, 2026);
        target.last_calculated_month = 6;
        target.monthly_contribution = dec!(1);
        let result = recalculate(&mut target, ym(2026, 6), AccrualMode::Strict, true).unwrap();
        assert!(matches!(result, Accrual::Recalculated { .. }));
        assert_eq!(target.monthly_contribution, dec!(200));
    }

    #[test]
    fn test_missed_months() {
        assert_eq!(missed_months(0, 5), None);
        assert_eq!(missed_months(4, 5), None);
        assert_eq!(missed_months(3, 5), Some(1));
        assert_eq!(missed_months(11, 3), Some(3));
    }
}
