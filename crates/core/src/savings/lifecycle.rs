//! Target lifecycle state machine.
//!
//! `Active -> Completed` is terminal. `Active -> Paused` happens when the
//! deadline passes unfunded. A paused target can still be completed by money
//! that meets its goal.

use rust_decimal::Decimal;

use super::savings_model::{StatusChange, TargetStatus};
use super::savings_traits::SavingsGoal;
use crate::constants::NOT_TRACKING_MONTH;
use crate::events::{completed_message, unresolved_message, NotificationEvent, NotificationKind};
use crate::utils::time_utils::YearMonth;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    Unchanged,
    Complete,
    Pause,
}

/// The transition rule. Pure: depends only on its arguments.
pub fn evaluate(
    current_money: Decimal,
    required_total: Decimal,
    deadline_passed: bool,
    current_status: TargetStatus,
) -> Transition {
    match current_status {
        TargetStatus::Completed => Transition::Unchanged,
        TargetStatus::Active | TargetStatus::Paused if current_money >= required_total => {
            Transition::Complete
        }
        TargetStatus::Active if deadline_passed => Transition::Pause,
        TargetStatus::Active | TargetStatus::Paused => Transition::Unchanged,
    }
}

/// Whether no contribution period is left before the target's deadline.
pub fn deadline_passed(goal: &dyn SavingsGoal, as_of: YearMonth) -> bool {
    goal.deadline()
        .map(|deadline| deadline.months_since(as_of) <= 0)
        .unwrap_or(false)
}

/// A status transition applied to a target, with the notification it produced.
#[derive(Debug, Clone, PartialEq)]
pub struct LifecycleChange {
    pub status_change: StatusChange,
    pub notification: NotificationEvent,
}

/// Evaluates the transition rule for `goal` and applies it.
///
/// `missed_months` is only used to word the lapse notification.
pub fn apply(
    goal: &mut dyn SavingsGoal,
    as_of: YearMonth,
    missed_months: Option<u32>,
) -> Option<LifecycleChange> {
    if !goal.is_tracked() {
        return None;
    }

    let from = goal.status();
    let transition = evaluate(
        goal.balance(),
        goal.required_total(),
        deadline_passed(goal, as_of),
        from,
    );

    let (to, kind, message) = match transition {
        Transition::Unchanged => return None,
        Transition::Complete => (
            TargetStatus::Completed,
            NotificationKind::Completed,
            completed_message(goal.kind(), goal.label()),
        ),
        Transition::Pause => (
            TargetStatus::Paused,
            NotificationKind::Unresolved,
            unresolved_message(goal.kind(), goal.label(), missed_months),
        ),
    };

    goal.set_status(to);
    goal.set_monthly_contribution(Decimal::ZERO);
    goal.set_last_calculated_month(NOT_TRACKING_MONTH);

    log::debug!(
        "{} {} moved from {:?} to {:?}",
        goal.kind(),
        goal.id(),
        from,
        to
    );

    Some(LifecycleChange {
        status_change: StatusChange {
            target: goal.reference(),
            from,
            to,
        },
        notification: NotificationEvent::new(
            goal.user_id(),
            goal.kind(),
            goal.id(),
            kind,
            message,
            goal.balance(),
        ),
    })
}
