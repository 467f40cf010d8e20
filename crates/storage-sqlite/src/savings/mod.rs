//! SQLite storage implementation for savings targets.

mod model;
mod repository;

pub use model::{AssetDB, HouseSelectionDB, RetirementPlanDB};
pub(crate) use model::parse_decimal;
pub use repository::SavingsRepository;
