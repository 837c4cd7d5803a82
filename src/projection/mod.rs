//! Projection generator for scheduled withdrawals and increased annuities

mod engine;
mod points;
mod state;

pub use engine::{IncreaseSchedule, ProjectionConfig, ProjectionEngine};
pub use points::{Phase, Projection, ProjectionPoint};
pub use state::WithdrawalState;
