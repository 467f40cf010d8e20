/// Decimal places money amounts are stored with
pub const MONEY_DECIMAL_PRECISION: u32 = 2;

/// Decimal places used for ratios such as the funding ratio
pub const RATIO_DECIMAL_PRECISION: u32 = 4;

pub const MONTHS_PER_YEAR: u32 = 12;

/// House id stored on the per-user house selection when no nursing home is chosen.
/// A selection carrying this id is permanently completed and never accrues.
pub const NO_HOUSE_SELECTED: &str = "NONE";

/// `last_calculated_month` value of a target that is not being tracked.
pub const NOT_TRACKING_MONTH: u32 = 0;

/// Pool name used in errors when the retirement plan's savings are debited
pub const RETIREMENT_SAVINGS_POOL: &str = "retirement savings";

/// Pool name used in errors when the retirement plan's investments are debited
pub const RETIREMENT_INVESTMENT_POOL: &str = "retirement investments";

/// Highest age, in years, a retirement plan may use. Keeps the expense
/// projection bounded.
pub const MAX_PLAN_AGE: u32 = 150;
