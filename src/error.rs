//! Error types for the loan input boundary
//!
//! The schedule engine itself never fails; these errors only come from
//! loading and validating caller-supplied inputs.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum LoanError {
    #[error("Invalid input: {field} - {reason}")]
    InvalidInput { field: String, reason: String },

    #[error("Invalid month '{value}': expected yyyy-MM")]
    InvalidMonth { value: String },

    #[error("Disbursements total {disbursed:.2} exceeds loan principal {principal:.2}")]
    OverDisbursed { disbursed: f64, principal: f64 },

    #[error("Unknown rate adjustment '{0}': expected 'emi' or 'tenure'")]
    UnknownAdjustment(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}

impl LoanError {
    pub fn invalid(field: impl Into<String>, reason: impl Into<String>) -> Self {
        LoanError::InvalidInput {
            field: field.into(),
            reason: reason.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, LoanError>;
