//! Loan input structures matching the persisted planner format

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

use super::month::{first_of_month, serde_month};

/// Loan details as entered by the borrower
///
/// Field names follow the persisted JSON layout (`homeValue`, `interestRate`, ...).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoanDetails {
    /// Property price
    pub home_value: f64,

    /// Borrower's own contribution
    pub down_payment: f64,

    /// Upfront loan insurance premium (not amortized)
    #[serde(default)]
    pub loan_insurance: f64,

    /// Annual interest rate in percent (8.5 = 8.5%)
    #[serde(rename = "interestRate")]
    pub annual_rate: f64,

    /// Loan term in years
    pub tenure_years: u32,

    /// Processing and legal fees (not amortized)
    #[serde(default)]
    pub loan_fees: f64,

    /// Month of the first installment
    #[serde(with = "serde_month")]
    pub start_date: NaiveDate,
}

impl LoanDetails {
    /// Amount borrowed: home value less down payment
    pub fn principal(&self) -> f64 {
        self.home_value - self.down_payment
    }

    /// Term in months, saturating for out-of-range year counts
    pub fn tenure_months(&self) -> u32 {
        self.tenure_years.saturating_mul(12)
    }

    /// Normalised terms consumed by the schedule engine
    pub fn terms(&self) -> LoanTerms {
        LoanTerms::new(
            self.principal(),
            self.annual_rate,
            self.tenure_months(),
            self.start_date,
        )
    }
}

/// Normalised, immutable terms for one simulation run
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LoanTerms {
    pub principal: f64,

    /// Annual rate in percent
    pub annual_rate: f64,

    pub tenure_months: u32,

    /// Always the 1st of a month
    #[serde(with = "serde_month")]
    pub start_date: NaiveDate,
}

impl LoanTerms {
    pub fn new(principal: f64, annual_rate: f64, tenure_months: u32, start_date: NaiveDate) -> Self {
        Self {
            principal,
            annual_rate,
            tenure_months,
            start_date: first_of_month(start_date),
        }
    }

    /// Terms that can never produce a schedule
    pub fn is_degenerate(&self) -> bool {
        self.principal <= 0.0 || self.tenure_months == 0
    }

    pub fn start_year(&self) -> i32 {
        self.start_date.year()
    }
}

/// How the bank reacts to a floating-rate change
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum RateAdjustment {
    /// "Adjust EMI": re-size the installment from the outstanding balance over
    /// the months left in the original term
    #[serde(rename = "emi")]
    PreserveEmi,

    /// Keep the installment amount; the number of installments drifts
    #[default]
    #[serde(rename = "tenure")]
    PreserveTenure,
}

impl RateAdjustment {
    pub fn recomputes_installment(&self) -> bool {
        matches!(self, RateAdjustment::PreserveEmi)
    }
}

/// Floating-rate reset taking effect from a given month
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RateChange {
    #[serde(with = "serde_month")]
    pub date: NaiveDate,

    /// New annual rate in percent
    pub new_rate: f64,

    #[serde(default)]
    pub adjustment_type: RateAdjustment,
}

impl RateChange {
    pub fn new(date: NaiveDate, new_rate: f64, adjustment_type: RateAdjustment) -> Self {
        Self {
            date: first_of_month(date),
            new_rate,
            adjustment_type,
        }
    }
}

/// Extra principal repayment, either once or every year in the same month
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PartPayment {
    #[serde(with = "serde_month")]
    pub date: NaiveDate,

    pub amount: f64,

    #[serde(default)]
    pub is_recurring: bool,
}

impl PartPayment {
    pub fn one_time(date: NaiveDate, amount: f64) -> Self {
        Self {
            date: first_of_month(date),
            amount,
            is_recurring: false,
        }
    }

    pub fn recurring(date: NaiveDate, amount: f64) -> Self {
        Self {
            is_recurring: true,
            ..Self::one_time(date, amount)
        }
    }
}

/// One tranche of a staged loan
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Disbursement {
    #[serde(with = "serde_month")]
    pub date: NaiveDate,

    pub amount: f64,

    /// Pre-EMI figure quoted by the bank, kept for display only.
    /// The schedule engine does not read it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub manual_pre_emi: Option<f64>,
}

impl Disbursement {
    pub fn new(date: NaiveDate, amount: f64) -> Self {
        Self {
            date: first_of_month(date),
            amount,
            manual_pre_emi: None,
        }
    }

    pub fn with_manual_pre_emi(mut self, pre_emi: f64) -> Self {
        self.manual_pre_emi = Some(pre_emi);
        self
    }
}

/// All dated events applied to a loan
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoanEvents {
    #[serde(default)]
    pub rate_changes: Vec<RateChange>,

    #[serde(default)]
    pub part_payments: Vec<PartPayment>,

    #[serde(default)]
    pub disbursements: Vec<Disbursement>,
}

impl LoanEvents {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_rate_change(mut self, change: RateChange) -> Self {
        self.rate_changes.push(change);
        self
    }

    pub fn with_part_payment(mut self, payment: PartPayment) -> Self {
        self.part_payments.push(payment);
        self
    }

    pub fn with_disbursement(mut self, disbursement: Disbursement) -> Self {
        self.disbursements.push(disbursement);
        self
    }

    pub fn total_disbursed(&self) -> f64 {
        self.disbursements.iter().map(|d| d.amount).sum()
    }
}
