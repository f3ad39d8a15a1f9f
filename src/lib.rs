//! Home Loan Planner - amortization engine for mortgage-style loans
//!
//! This library provides:
//! - EMI calculation and month-by-month amortization schedules
//! - Staged (multi-tranche) disbursement with a pre-EMI phase
//! - Floating-rate changes under "adjust EMI" or "adjust tenure" bank policies
//! - One-time and annually recurring part payments
//! - What-if solvers and a parallel scenario runner

pub mod error;
pub mod loan;
pub mod schedule;
pub mod costs;
pub mod scenario;

// Re-export commonly used types
pub use error::LoanError;
pub use loan::{
    Disbursement, LoanDetails, LoanEvents, LoanTerms, PartPayment, RateAdjustment, RateChange,
};
pub use schedule::{
    calculate_emi, generate_schedule, LoanSummary, ScheduleConfig, ScheduleEngine, ScheduleEntry,
    ScheduleResult,
};
pub use costs::HomeownerExpenses;
pub use scenario::ScenarioRunner;
