//! Loan inputs: terms, dated events, loading and validation

mod data;
pub mod loader;
pub mod month;
pub mod validation;

pub use data::{
    Disbursement, LoanDetails, LoanEvents, LoanTerms, PartPayment, RateAdjustment, RateChange,
};
pub use loader::{load_scenario, load_scenario_from_reader, save_scenario, ScenarioFile};
pub use validation::validate;
