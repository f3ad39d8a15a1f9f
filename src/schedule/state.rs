//! Mutable state carried month to month through one simulation run

use crate::loan::LoanTerms;
use super::emi::{calculate_emi, monthly_rate};
use super::timeline::RateChangeEvent;

/// State of the loan at the start of a simulated month
#[derive(Debug, Clone)]
pub struct SimulationState {
    /// Month offset from loan start (0-indexed)
    pub month_index: u32,

    /// Outstanding principal
    pub balance: f64,

    /// Annual rate in force (percent)
    pub current_rate: f64,

    /// Scheduled installment in force
    pub current_emi: f64,

    /// Principal released so far (staged loans)
    pub disbursed_principal: f64,

    /// Whether installments have begun
    pub emi_started: bool,

    /// Original term in months, never changed by events
    pub original_tenure: u32,
}

impl SimulationState {
    /// Fully disbursed loan: installment phase from month 0
    pub fn upfront(terms: &LoanTerms) -> Self {
        Self {
            month_index: 0,
            balance: terms.principal,
            current_rate: terms.annual_rate,
            current_emi: calculate_emi(terms.principal, terms.annual_rate, terms.tenure_months),
            disbursed_principal: terms.principal,
            emi_started: true,
            original_tenure: terms.tenure_months,
        }
    }

    /// Staged loan: nothing disbursed and no installment yet
    pub fn staged(terms: &LoanTerms) -> Self {
        Self {
            month_index: 0,
            balance: 0.0,
            current_rate: terms.annual_rate,
            current_emi: 0.0,
            disbursed_principal: 0.0,
            emi_started: false,
            original_tenure: terms.tenure_months,
        }
    }

    /// Months left in the original term (0 once it has run out)
    pub fn remaining_months(&self) -> u32 {
        self.original_tenure.saturating_sub(self.month_index)
    }

    pub fn monthly_rate(&self) -> f64 {
        monthly_rate(self.current_rate)
    }

    /// Switch to the new rate; an "adjust EMI" reset re-sizes the installment
    /// over the remaining original term, but only once installments have begun
    pub fn apply_rate_change(&mut self, change: &RateChangeEvent) {
        self.current_rate = change.new_rate;

        if self.emi_started && change.adjustment.recomputes_installment() {
            self.current_emi =
                calculate_emi(self.balance, self.current_rate, self.remaining_months());
        }
    }

    /// Release a tranche. The installment is re-sized as a fresh loan of the
    /// cumulative disbursed amount over the original full term.
    pub fn apply_disbursement(&mut self, amount: f64) {
        self.disbursed_principal += amount;
        self.balance += amount;

        if self.disbursed_principal > 0.0 {
            self.current_emi =
                calculate_emi(self.disbursed_principal, self.current_rate, self.original_tenure);
            self.emi_started = true;
        }
    }

    /// Reduce the balance, snapping dust below `tolerance` to zero
    pub fn repay(&mut self, principal: f64, tolerance: f64) {
        self.balance -= principal;
        if self.balance < tolerance {
            self.balance = 0.0;
        }
    }

    pub fn is_closed(&self) -> bool {
        self.balance == 0.0 && self.emi_started
    }

    /// Advance to next month
    pub fn advance_month(&mut self) {
        self.month_index += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::loan::month::year_month;
    use crate::loan::RateAdjustment;

    fn terms() -> LoanTerms {
        LoanTerms::new(1_000_000.0, 8.0, 240, year_month(2025, 1).unwrap())
    }

    #[test]
    fn test_rate_change_before_emi_start_keeps_emi() {
        let mut state = SimulationState::staged(&terms());
        state.apply_rate_change(&RateChangeEvent {
            month: 0,
            new_rate: 9.0,
            adjustment: RateAdjustment::PreserveEmi,
        });
        assert_eq!(state.current_rate, 9.0);
        assert_eq!(state.current_emi, 0.0);
    }

    #[test]
    fn test_disbursement_uses_original_tenure() {
        let mut state = SimulationState::staged(&terms());
        state.month_index = 6;
        state.apply_disbursement(400_000.0);
        assert!(state.emi_started);
        assert_eq!(state.current_emi, calculate_emi(400_000.0, 8.0, 240));
    }

    #[test]
    fn test_repay_snaps_dust() {
        let mut state = SimulationState::upfront(&terms());
        state.repay(999_999.5, 1.0);
        assert_eq!(state.balance, 0.0);
        assert!(state.is_closed());
    }

    #[test]
    fn test_remaining_months_saturates() {
        let mut state = SimulationState::upfront(&terms());
        state.month_index = 300;
        assert_eq!(state.remaining_months(), 0);
    }
}
