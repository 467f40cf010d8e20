//! Savings targets: assets, the nursing-home selection and the retirement plan.
//!
//! Holds the projection calculator, the monthly accrual recalculator, the
//! lifecycle state machine and the allocation engine, plus the service that
//! ties them to persistence and notifications.

pub mod accrual_calculator;
pub mod allocation_engine;
pub mod lifecycle;
pub mod projection_calculator;
mod savings_model;
mod savings_service;
mod savings_traits;

pub use allocation_engine::AllocationEngine;
pub use savings_model::*;
pub use savings_service::*;
pub use savings_traits::*;
