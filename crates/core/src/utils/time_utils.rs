use chrono::{Datelike, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::constants::MONTHS_PER_YEAR;

/// A calendar month. All savings deadlines and accrual periods are month granular.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct YearMonth {
    pub year: i32,
    /// 1-12
    pub month: u32,
}

impl YearMonth {
    /// Builds a `YearMonth`, returning `None` when `month` is outside 1-12.
    pub fn new(year: i32, month: u32) -> Option<Self> {
        (1..=MONTHS_PER_YEAR)
            .contains(&month)
            .then_some(Self { year, month })
    }

    pub fn from_date(date: NaiveDate) -> Self {
        Self {
            year: date.year(),
            month: date.month(),
        }
    }

    /// December of `year`.
    pub fn end_of_year(year: i32) -> Self {
        Self {
            year,
            month: MONTHS_PER_YEAR,
        }
    }

    pub fn add_years(self, years: u32) -> Self {
        Self {
            year: self.year.saturating_add_unsigned(years),
            month: self.month,
        }
    }

    /// Whole months from `from` until `self`. Zero when both are the same month,
    /// negative when `self` is already in the past.
    pub fn months_since(self, from: YearMonth) -> i64 {
        i64::from(self.year - from.year) * i64::from(MONTHS_PER_YEAR) + i64::from(self.month)
            - i64::from(from.month)
    }
}

impl fmt::Display for YearMonth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

/// Today's date in UTC.
pub fn today() -> NaiveDate {
    Utc::now().date_naive()
}

/// Calendar months elapsed between two month-of-year values (1-12), wrapping
/// across a year boundary. Returns `None` when `from` is 0 ("not tracking").
pub fn months_elapsed(from_month: u32, to_month: u32) -> Option<u32> {
    if from_month == 0 || from_month > MONTHS_PER_YEAR {
        return None;
    }
    Some((to_month + MONTHS_PER_YEAR - from_month) % MONTHS_PER_YEAR)
}
