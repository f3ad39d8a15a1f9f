//! Amortization schedule engine: EMI formula, event timeline, simulators and solvers

pub mod emi;
pub mod timeline;
mod state;
mod engine;
mod entry;
pub mod solvers;

pub use emi::{calculate_emi, monthly_rate};
pub use timeline::{expand_part_payments, EventTimeline, RateChangeEvent};
pub use state::SimulationState;
pub use engine::{generate_schedule, ScheduleConfig, ScheduleEngine};
pub use entry::{LoanSummary, ScheduleEntry, ScheduleResult, YearlyTotals};
pub use solvers::{
    emi_delta_for_tenure_preservation, part_payment_for_emi_preservation,
    DEFAULT_SOLVER_TOLERANCE,
};
