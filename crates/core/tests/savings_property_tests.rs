//! Property-based integration tests for the savings engine.
//!
//! These tests verify that universal properties hold across all valid inputs,
//! using the `proptest` crate for random test case generation.

use chrono::{NaiveDate, NaiveDateTime};
use nestegg_core::savings::allocation_engine::split_evenly;
use nestegg_core::savings::projection_calculator::project_retirement_expense;
use nestegg_core::savings::{
    AllocationCategory, AllocationEngine, AllocationRequest, Asset, HouseSelection,
    PlanAssumptions, RetirementPlan, TargetStatus, UserTargets,
};
use nestegg_core::utils::time_utils::YearMonth;
use proptest::prelude::*;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

// =============================================================================
// Generators
// =============================================================================

/// Generates a positive amount in cents, up to one million.
fn arb_amount() -> impl Strategy<Value = Decimal> {
    (1i64..100_000_000).prop_map(|cents| Decimal::new(cents, 2))
}

/// Generates a yearly rate between 0% and 10% with basis-point precision.
fn arb_rate() -> impl Strategy<Value = Decimal> {
    (0i64..1000).prop_map(|bps| Decimal::new(bps, 4))
}

/// Generates assumptions with `age < retirement_age < expect_lifespan`.
fn arb_assumptions() -> impl Strategy<Value = PlanAssumptions> {
    (20u32..50, 1u32..20, 1u32..25, arb_amount(), arb_rate()).prop_map(
        |(age, until_retirement, retired_years, expense, increase)| PlanAssumptions {
            age,
            retirement_age: age + until_retirement,
            expect_lifespan: age + until_retirement + retired_years,
            expected_monthly_expense: expense,
            annual_expense_increase: increase,
            expected_inflation: Decimal::ZERO,
        },
    )
}

#[derive(Debug, Clone)]
enum Movement {
    Deposit(AllocationRequest),
    Withdraw(AllocationRequest),
}

fn arb_request() -> impl Strategy<Value = AllocationRequest> {
    (
        arb_amount(),
        prop_oneof![
            Just(AllocationCategory::SavingPool),
            Just(AllocationCategory::Investment)
        ],
        proptest::option::of(prop_oneof![Just("Car"), Just("Trip")]),
    )
        .prop_map(|(amount, category, name)| AllocationRequest {
            amount,
            category,
            target_name: name.map(str::to_string),
        })
}

fn arb_movement() -> impl Strategy<Value = Movement> {
    prop_oneof![
        arb_request().prop_map(Movement::Deposit),
        arb_request().prop_map(Movement::Withdraw),
    ]
}

// =============================================================================
// Fixtures
// =============================================================================

fn ts() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2026, 1, 1)
        .unwrap()
        .and_hms_opt(0, 0, 0)
        .unwrap()
}

fn asset(id: &str, name: &str) -> Asset {
    Asset {
        id: id.to_string(),
        user_id: "user-1".to_string(),
        name: name.to_string(),
        total_cost: dec!(100000000),
        current_money: Decimal::ZERO,
        monthly_contribution: Decimal::ZERO,
        last_calculated_month: 0,
        end_year: 2040,
        status: TargetStatus::Active,
        created_at: ts(),
        updated_at: ts(),
    }
}

fn targets() -> UserTargets {
    let plan = RetirementPlan {
        id: "plan-1".to_string(),
        user_id: "user-1".to_string(),
        age: 40,
        retirement_age: 65,
        expect_lifespan: 85,
        expected_monthly_expense: dec!(2000),
        annual_expense_increase: Decimal::ZERO,
        expected_inflation: dec!(0.02),
        expected_return_rate: Decimal::ZERO,
        current_savings: Decimal::ZERO,
        current_total_investment: Decimal::ZERO,
        required_funds: dec!(1000000000),
        required_monthly_savings: Decimal::ZERO,
        monthly_contribution: Decimal::ZERO,
        last_calculated_month: 0,
        status: TargetStatus::Active,
        start_year: 2026,
        start_month: 6,
        created_at: ts(),
        updated_at: ts(),
    };
    UserTargets::new(
        "user-1",
        vec![asset("a1", "Car"), asset("a2", "Trip")],
        HouseSelection::unselected("user-1", ts()),
        Some(plan),
    )
}

fn total_money(targets: &UserTargets) -> Decimal {
    let assets: Decimal = targets.assets.iter().map(|a| a.current_money).sum();
    let plan = targets
        .plan
        .as_ref()
        .map(|p| p.total_assets())
        .unwrap_or_default();
    assets + targets.house.current_money + plan
}

fn balances(targets: &UserTargets) -> Vec<Decimal> {
    let mut balances: Vec<Decimal> = targets.assets.iter().map(|a| a.current_money).collect();
    balances.push(targets.house.current_money);
    if let Some(plan) = &targets.plan {
        balances.push(plan.current_savings);
        balances.push(plan.current_total_investment);
    }
    balances
}

// =============================================================================
// Property Tests
// =============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    /// Higher inflation never lowers the projected retirement expense.
    #[test]
    fn prop_expense_is_monotonic_in_inflation(
        assumptions in arb_assumptions(),
        low in arb_rate(),
        extra in arb_rate(),
    ) {
        let at_low = PlanAssumptions { expected_inflation: low, ..assumptions };
        let at_high = PlanAssumptions { expected_inflation: low + extra, ..assumptions };

        let low_expense = project_retirement_expense(&at_low).unwrap();
        let high_expense = project_retirement_expense(&at_high).unwrap();

        prop_assert!(
            high_expense >= low_expense,
            "expense at {} inflation ({}) fell below expense at {} ({})",
            low + extra,
            high_expense,
            low,
            low_expense
        );
    }

    /// An even split always adds back up to the amount, and only the last
    /// share carries leftover cents.
    #[test]
    fn prop_split_preserves_amount(amount in arb_amount(), parts in 1usize..12) {
        let shares = split_evenly(amount, parts).unwrap();

        prop_assert_eq!(shares.len(), parts);
        prop_assert_eq!(shares.iter().copied().sum::<Decimal>(), amount);
        let first = shares[0];
        for share in &shares[..parts - 1] {
            prop_assert_eq!(*share, first);
        }
        let last = shares[parts - 1];
        prop_assert!(last >= first);
        prop_assert!(last - first < Decimal::new(parts as i64, 2));
    }

    /// Deposits and withdrawals never drive a balance below zero, and money
    /// is conserved: a successful movement changes the total by exactly its
    /// amount, a failed one changes nothing.
    #[test]
    fn prop_movements_keep_balances_non_negative(
        movements in proptest::collection::vec(arb_movement(), 1..30)
    ) {
        let as_of = YearMonth::new(2026, 6).unwrap();
        let mut state = targets();

        for movement in movements {
            let before = total_money(&state);
            let mut engine = AllocationEngine::new(state.clone(), as_of);
            let (result, expected) = match &movement {
                Movement::Deposit(request) => (engine.deposit(request), before + request.amount),
                Movement::Withdraw(request) => (engine.withdraw(request), before - request.amount),
            };

            if result.is_ok() {
                state = engine.finish().0;
                prop_assert_eq!(total_money(&state), expected);
            }

            for balance in balances(&state) {
                prop_assert!(balance >= Decimal::ZERO, "negative balance after {:?}", movement);
            }
        }
    }
}
