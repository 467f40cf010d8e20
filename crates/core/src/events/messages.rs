//! Notification message templates.

use rand::seq::SliceRandom;

use crate::savings::TargetKind;

const ASSET_COMPLETED: &[&str] = &[
    "Congratulations! You have saved everything you need for {name}.",
    "Goal reached: {name} is fully funded. Time to enjoy it!",
    "Well done! Your savings for {name} are complete.",
];

const HOUSE_COMPLETED: &[&str] = &[
    "Your nursing home stay at {name} is now fully funded.",
    "Great news: you have saved enough to cover {name}.",
];

const PLAN_COMPLETED: &[&str] = &[
    "Your retirement plan is fully funded. Congratulations!",
    "You have reached your retirement savings goal.",
    "Retirement goal achieved: your savings now cover the projected expenses.",
];

fn templates(kind: TargetKind) -> &'static [&'static str] {
    match kind {
        TargetKind::Asset => ASSET_COMPLETED,
        TargetKind::House => HOUSE_COMPLETED,
        TargetKind::Plan => PLAN_COMPLETED,
    }
}

/// A randomly chosen celebratory message for a completed target.
pub fn completed_message(kind: TargetKind, name: &str) -> String {
    let options = templates(kind);
    let template = options
        .choose(&mut rand::thread_rng())
        .copied()
        .unwrap_or("Your savings goal {name} is complete.");
    template.replace("{name}", name)
}

/// Message for a target whose deadline passed before it was funded.
pub fn unresolved_message(kind: TargetKind, name: &str, missed_months: Option<u32>) -> String {
    let subject = match kind {
        TargetKind::Plan => "Your retirement plan".to_string(),
        _ => format!("Your {} '{}'", kind, name),
    };
    match missed_months {
        Some(months) if months > 0 => format!(
            "{} reached its deadline unfunded after {} month(s) without contributions. Please review it.",
            subject, months
        ),
        _ => format!(
            "{} reached its deadline without being fully funded. Please review it.",
            subject
        ),
    }
}
