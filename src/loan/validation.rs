//! Business-rule checks applied by callers before running a schedule
//!
//! The engine degrades gracefully on bad input; these checks exist so a
//! front end can reject it with a message instead.

use super::{LoanDetails, LoanEvents};
use crate::error::{LoanError, Result};

/// Longest term the planner accepts
pub const MAX_TENURE_YEARS: u32 = 30;

/// Highest annual rate (percent) accepted for the loan or a rate change
pub const MAX_INTEREST_RATE: f64 = 30.0;

/// Validate loan details and events together
pub fn validate(details: &LoanDetails, events: &LoanEvents) -> Result<()> {
    validate_details(details)?;
    validate_events(details.principal(), events)
}

pub fn validate_details(details: &LoanDetails) -> Result<()> {
    if !details.home_value.is_finite() || details.home_value <= 0.0 {
        return Err(LoanError::invalid("homeValue", "must be greater than zero"));
    }
    if details.down_payment < 0.0 {
        return Err(LoanError::invalid("downPayment", "cannot be negative"));
    }
    if details.principal() <= 0.0 {
        return Err(LoanError::invalid(
            "downPayment",
            "must be less than the home value",
        ));
    }
    if !details.annual_rate.is_finite() || details.annual_rate < 0.0 {
        return Err(LoanError::invalid("interestRate", "cannot be negative"));
    }
    if details.annual_rate > MAX_INTEREST_RATE {
        return Err(LoanError::invalid("interestRate", "cannot exceed 30%"));
    }
    if details.tenure_years == 0 {
        return Err(LoanError::invalid("tenureYears", "must be at least one year"));
    }
    if details.tenure_years > MAX_TENURE_YEARS {
        return Err(LoanError::invalid("tenureYears", "cannot exceed 30 years"));
    }
    if details.loan_insurance < 0.0 || details.loan_fees < 0.0 {
        return Err(LoanError::invalid("loanFees", "charges cannot be negative"));
    }
    Ok(())
}

/// Validate event amounts and that staged disbursements fit inside the principal
pub fn validate_events(principal: f64, events: &LoanEvents) -> Result<()> {
    for change in &events.rate_changes {
        if !change.new_rate.is_finite() || change.new_rate < 0.0 {
            return Err(LoanError::invalid("rateChanges.newRate", "cannot be negative"));
        }
        if change.new_rate > MAX_INTEREST_RATE {
            return Err(LoanError::invalid("rateChanges.newRate", "cannot exceed 30%"));
        }
    }

    for payment in &events.part_payments {
        if !payment.amount.is_finite() || payment.amount <= 0.0 {
            return Err(LoanError::invalid(
                "partPayments.amount",
                "must be greater than zero",
            ));
        }
    }

    for disbursement in &events.disbursements {
        if !disbursement.amount.is_finite() || disbursement.amount <= 0.0 {
            return Err(LoanError::invalid(
                "disbursements.amount",
                "must be greater than zero",
            ));
        }
    }

    let disbursed = events.total_disbursed();
    if disbursed > principal {
        return Err(LoanError::OverDisbursed {
            disbursed,
            principal,
        });
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::loan::month::year_month;
    use crate::loan::{Disbursement, PartPayment, RateAdjustment, RateChange};

    fn details() -> LoanDetails {
        LoanDetails {
            home_value: 1_500_000.0,
            down_payment: 500_000.0,
            loan_insurance: 0.0,
            annual_rate: 8.0,
            tenure_years: 20,
            loan_fees: 0.0,
            start_date: year_month(2025, 1).unwrap(),
        }
    }

    #[test]
    fn test_valid_inputs_pass() {
        let start = year_month(2025, 1).unwrap();
        let events = LoanEvents::new()
            .with_disbursement(Disbursement::new(start, 600_000.0))
            .with_disbursement(Disbursement::new(year_month(2025, 7).unwrap(), 400_000.0))
            .with_part_payment(PartPayment::recurring(start, 50_000.0))
            .with_rate_change(RateChange::new(start, 9.0, RateAdjustment::PreserveEmi));

        assert!(validate(&details(), &events).is_ok());
    }

    #[test]
    fn test_over_disbursement_rejected() {
        let start = year_month(2025, 1).unwrap();
        let events = LoanEvents::new()
            .with_disbursement(Disbursement::new(start, 700_000.0))
            .with_disbursement(Disbursement::new(start, 400_000.0));

        match validate(&details(), &events) {
            Err(LoanError::OverDisbursed { disbursed, principal }) => {
                assert_eq!(disbursed, 1_100_000.0);
                assert_eq!(principal, 1_000_000.0);
            }
            other => panic!("expected OverDisbursed, got {:?}", other),
        }
    }

    #[test]
    fn test_down_payment_must_leave_a_loan() {
        let mut d = details();
        d.down_payment = d.home_value;
        assert!(matches!(
            validate_details(&d),
            Err(LoanError::InvalidInput { .. })
        ));
    }

    #[test]
    fn test_non_positive_part_payment_rejected() {
        let start = year_month(2025, 1).unwrap();
        let events = LoanEvents::new().with_part_payment(PartPayment::one_time(start, 0.0));
        assert!(validate_events(1_000_000.0, &events).is_err());
    }

    #[test]
    fn test_negative_rate_rejected() {
        let mut d = details();
        d.annual_rate = -1.0;
        assert!(validate_details(&d).is_err());
    }

    #[test]
    fn test_tenure_upper_bound() {
        let mut d = details();
        d.tenure_years = MAX_TENURE_YEARS;
        assert!(validate_details(&d).is_ok());

        d.tenure_years = MAX_TENURE_YEARS + 1;
        assert!(matches!(
            validate_details(&d),
            Err(LoanError::InvalidInput { field, .. }) if field == "tenureYears"
        ));
    }

    #[test]
    fn test_huge_tenure_rejected_without_overflow() {
        let json = r#"{
            "loanDetails": {
                "homeValue": 1500000, "downPayment": 500000, "interestRate": 8,
                "tenureYears": 400000000, "startDate": "2025-01"
            }
        }"#;
        let scenario = crate::loan::load_scenario_from_reader(json.as_bytes()).unwrap();
        assert!(validate(&scenario.loan_details, &scenario.events).is_err());
        assert_eq!(scenario.loan_details.terms().tenure_months, u32::MAX);
    }

    #[test]
    fn test_interest_rate_upper_bound() {
        let mut d = details();
        d.annual_rate = MAX_INTEREST_RATE;
        assert!(validate_details(&d).is_ok());

        d.annual_rate = 30.5;
        assert!(matches!(
            validate_details(&d),
            Err(LoanError::InvalidInput { field, .. }) if field == "interestRate"
        ));
    }

    #[test]
    fn test_rate_change_upper_bound() {
        let start = year_month(2025, 1).unwrap();
        let events = LoanEvents::new()
            .with_rate_change(RateChange::new(start, 31.0, RateAdjustment::PreserveTenure));
        assert!(validate_events(1_000_000.0, &events).is_err());
    }
}
