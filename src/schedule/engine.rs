//! Core schedule engine for month-by-month amortization
//!
//! Two simulators share the same month step: the single-tranche path for a
//! loan disbursed upfront, and the multi-tranche path for staged releases
//! with a pre-EMI phase. Both are bounded by a hard iteration cap.

use crate::loan::month::add_months;
use crate::loan::{LoanEvents, LoanTerms};
use super::entry::{ScheduleEntry, ScheduleResult};
use super::state::SimulationState;
use super::timeline::EventTimeline;

/// Policy constants for a schedule run
#[derive(Debug, Clone)]
pub struct ScheduleConfig {
    /// Balances below this are treated as fully repaid
    pub balance_tolerance: f64,

    /// Single-tranche cap: tenure x factor months
    pub single_tranche_bound_factor: u32,

    /// Multi-tranche cap: tenure x factor months (also limited by
    /// last disbursement + tenure + 1)
    pub multi_tranche_bound_factor: u32,
}

impl Default for ScheduleConfig {
    fn default() -> Self {
        Self {
            balance_tolerance: 1.0,
            single_tranche_bound_factor: 2,
            multi_tranche_bound_factor: 3,
        }
    }
}

/// Stateless amortization engine; identical inputs give identical schedules
#[derive(Debug, Clone, Default)]
pub struct ScheduleEngine {
    config: ScheduleConfig,
}

impl ScheduleEngine {
    pub fn new(config: ScheduleConfig) -> Self {
        Self { config }
    }

    /// Expand recurring part payments, index all events and simulate
    pub fn generate(&self, terms: &LoanTerms, events: &LoanEvents) -> ScheduleResult {
        if terms.is_degenerate() {
            log::debug!(
                "degenerate terms (principal {:.2}, tenure {}): empty schedule",
                terms.principal,
                terms.tenure_months
            );
            return ScheduleResult::new();
        }

        let timeline = EventTimeline::from_events(terms, events);
        self.simulate(terms, &timeline)
    }

    /// Simulate from an already-built timeline, staged if it has disbursements
    pub fn simulate(&self, terms: &LoanTerms, timeline: &EventTimeline) -> ScheduleResult {
        if timeline.has_disbursements() {
            self.project_staged(terms, timeline)
        } else {
            self.project_upfront(terms, timeline)
        }
    }

    /// Single-tranche schedule: full principal disbursed at month 0
    pub fn project_upfront(&self, terms: &LoanTerms, timeline: &EventTimeline) -> ScheduleResult {
        let mut result = ScheduleResult::new();
        if terms.is_degenerate() {
            return result;
        }

        let tolerance = self.config.balance_tolerance;
        let max_months = terms
            .tenure_months
            .saturating_mul(self.config.single_tranche_bound_factor);
        let mut state = SimulationState::upfront(terms);

        while state.balance > tolerance && state.month_index < max_months {
            let month = state.month_index as i64;
            let mut entry = ScheduleEntry::new(
                state.month_index + 1,
                add_months(terms.start_date, state.month_index),
            );

            // Rate change
            if let Some(change) = timeline.rate_change_at(month) {
                state.apply_rate_change(change);
                entry.is_rate_change = true;
            }

            let interest = state.balance * state.monthly_rate();
            let principal = (state.current_emi - interest).min(state.balance).max(0.0);
            entry.installment = state.current_emi;
            entry.payment = state.current_emi;

            // Part payment
            let part_payment = match timeline.part_payment_at(month) {
                Some(amount) => {
                    entry.has_part_payment = true;
                    amount
                }
                None => 0.0,
            };
            entry.payment += part_payment;

            state.repay(principal + part_payment, tolerance);

            entry.principal = principal;
            entry.interest = interest;
            entry.part_payment = part_payment;
            entry.balance = state.balance;
            entry.rate = state.current_rate;
            result.add_entry(entry);

            state.advance_month();
            if state.balance == 0.0 {
                break;
            }
        }

        result.hit_safety_bound = state.balance > 0.0 && state.month_index >= max_months;
        self.log_bound(&result, max_months);
        result
    }

    /// Multi-tranche schedule with a pre-EMI phase before the first release.
    ///
    /// Per month: rate change, then disbursement (installment re-sized over the
    /// original full term), then interest on the post-disbursement balance,
    /// then installment and part payment.
    pub fn project_staged(&self, terms: &LoanTerms, timeline: &EventTimeline) -> ScheduleResult {
        let Some(last_disbursement) = timeline.last_disbursement_month() else {
            return self.project_upfront(terms, timeline);
        };

        let mut result = ScheduleResult::new();
        if terms.is_degenerate() {
            return result;
        }

        let tolerance = self.config.balance_tolerance;
        let tenure = terms.tenure_months as i64;
        let natural_end = (last_disbursement + tenure + 1).max(0);
        let hard_cap = tenure * self.config.multi_tranche_bound_factor as i64;
        let max_months = natural_end.min(hard_cap).min(u32::MAX as i64) as u32;
        let mut state = SimulationState::staged(terms);

        while state.month_index < max_months {
            let month = state.month_index as i64;
            let mut entry = ScheduleEntry::new(
                state.month_index + 1,
                add_months(terms.start_date, state.month_index),
            );

            // Rate change first so a same-month tranche is sized at the new rate
            if let Some(change) = timeline.rate_change_at(month) {
                state.apply_rate_change(change);
                entry.is_rate_change = true;
            }

            // Disbursement
            if let Some(amount) = timeline.disbursement_at(month) {
                state.apply_disbursement(amount);
                entry.disbursement = amount;
                entry.has_disbursement = true;
            }

            let mut interest = state.balance * state.monthly_rate();
            let mut principal = 0.0;

            if state.emi_started && state.balance > 0.0 {
                principal = (state.current_emi - interest).min(state.balance).max(0.0);
                entry.installment = state.current_emi;
                entry.payment = state.current_emi;
            } else {
                interest = 0.0;
            }

            // Part payment
            let part_payment = match timeline.part_payment_at(month) {
                Some(amount) => {
                    entry.has_part_payment = true;
                    amount
                }
                None => 0.0,
            };
            entry.payment += part_payment;

            state.repay(principal + part_payment, tolerance);

            entry.principal = principal;
            entry.interest = interest;
            entry.part_payment = part_payment;
            entry.balance = state.balance;
            entry.rate = state.current_rate;
            entry.is_pre_emi = !state.emi_started;
            result.add_entry(entry);

            state.advance_month();
            if state.is_closed() {
                break;
            }
        }

        result.hit_safety_bound = !state.is_closed() && state.month_index >= max_months;
        self.log_bound(&result, max_months);
        result
    }

    fn log_bound(&self, result: &ScheduleResult, max_months: u32) {
        if result.hit_safety_bound {
            log::warn!(
                "schedule stopped at its {}-month cap with balance {:.2} outstanding",
                max_months,
                result.final_balance()
            );
        }
    }
}

/// Generate a schedule with the default configuration
pub fn generate_schedule(terms: &LoanTerms, events: &LoanEvents) -> ScheduleResult {
    ScheduleEngine::default().generate(terms, events)
}
