//! Background scheduler for the savings recalculation sweep.
//!
//! Every interval, recalculates each user's targets for the current month.
//! The sweep is idempotent within a month, so restarts and short intervals
//! only repeat no-op work.

use std::sync::Arc;
use std::time::Duration;
use tokio::time::interval;
use tracing::{debug, info, warn};

use nestegg_core::utils::time_utils::today;

use crate::main_lib::AppState;

/// Starts the recalculation scheduler.
pub fn start_recalculation_scheduler(
    state: Arc<AppState>,
    initial_delay: Duration,
    period: Duration,
) {
    tokio::spawn(async move {
        info!(
            "Savings recalculation scheduler started ({}s interval)",
            period.as_secs()
        );

        tokio::time::sleep(initial_delay).await;

        // First tick is immediate.
        let mut sweep_interval = interval(period);

        loop {
            sweep_interval.tick().await;
            run_scheduled_sweep(&state).await;
        }
    });
}

/// Runs one sweep over every user. Per-user failures are logged and skipped.
pub async fn run_scheduled_sweep(state: &AppState) -> usize {
    let user_ids = match state.savings_service.list_user_ids() {
        Ok(ids) => ids,
        Err(e) => {
            warn!("Scheduled recalculation skipped: failed to list users: {}", e);
            return 0;
        }
    };

    let as_of = today();
    let mut failures = 0;
    for user_id in &user_ids {
        match state
            .savings_service
            .recalculate_all_for_user(user_id, as_of)
            .await
        {
            Ok(outcome) => debug!(
                "Recalculated user {}: {} targets changed, {} notifications",
                user_id,
                outcome.targets.len(),
                outcome.notifications.len()
            ),
            Err(e) => {
                failures += 1;
                warn!("Recalculation failed for user {}: {}", user_id, e);
            }
        }
    }

    info!(
        "Scheduled recalculation finished: {} users, {} failures",
        user_ids.len(),
        failures
    );
    user_ids.len() - failures
}
