//! Scenario runner for what-if comparisons
//!
//! Holds the base loan once and runs event variations against it. Every run
//! is independent, so batches fan out across threads with no locking.

use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::loan::month::month_offset;
use crate::loan::{LoanEvents, LoanTerms, PartPayment, RateAdjustment, RateChange};
use crate::schedule::{
    emi_delta_for_tenure_preservation, part_payment_for_emi_preservation, LoanSummary,
    ScheduleEngine, ScheduleResult, DEFAULT_SOLVER_TOLERANCE,
};

/// Advisory figures at the month a rate change takes effect
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RateChangeAdvice {
    /// Month offset of the change from loan start
    pub month: u32,

    /// Outstanding balance going into that month
    pub balance: f64,

    pub remaining_months: u32,

    /// Installment before the change
    pub current_emi: f64,

    /// Extra installment needed to keep the remaining term
    pub emi_delta: f64,

    /// Lump sum that keeps the current installment at the new rate
    pub part_payment_to_keep_emi: f64,
}

/// Base case against both bank policies for one rate change
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RateChangeComparison {
    pub base: LoanSummary,
    pub preserve_emi: LoanSummary,
    pub preserve_tenure: LoanSummary,

    /// Installment charged the month after the change under "adjust EMI"
    pub adjusted_installment: Option<f64>,

    pub advice: Option<RateChangeAdvice>,
}

/// Effect of one extra payment versus the base case
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PrepaymentSavings {
    pub base: LoanSummary,
    pub with_prepayment: LoanSummary,
    pub interest_saved: f64,
    pub months_saved: i64,
}

/// Pre-loaded runner for a single loan
///
/// # Example
/// ```ignore
/// let runner = ScenarioRunner::new(terms, LoanEvents::new());
/// let comparison = runner.compare_rate_change(change);
/// println!("{:.2}", comparison.preserve_emi.total_interest);
/// ```
#[derive(Debug, Clone)]
pub struct ScenarioRunner {
    engine: ScheduleEngine,
    terms: LoanTerms,
    base_events: LoanEvents,
}

impl ScenarioRunner {
    /// Runner with the default engine configuration
    pub fn new(terms: LoanTerms, base_events: LoanEvents) -> Self {
        Self::with_engine(ScheduleEngine::default(), terms, base_events)
    }

    pub fn with_engine(engine: ScheduleEngine, terms: LoanTerms, base_events: LoanEvents) -> Self {
        Self {
            engine,
            terms,
            base_events,
        }
    }

    pub fn terms(&self) -> &LoanTerms {
        &self.terms
    }

    pub fn base_events(&self) -> &LoanEvents {
        &self.base_events
    }

    /// Schedule for the base events
    pub fn base(&self) -> ScheduleResult {
        self.run(&self.base_events)
    }

    /// Schedule for an arbitrary event set on the same loan
    pub fn run(&self, events: &LoanEvents) -> ScheduleResult {
        self.engine.generate(&self.terms, events)
    }

    /// Run many event sets in parallel, results in input order
    pub fn run_batch(&self, scenarios: &[LoanEvents]) -> Vec<ScheduleResult> {
        scenarios.par_iter().map(|events| self.run(events)).collect()
    }

    /// Base events plus `change` under each bank policy
    pub fn compare_rate_change(&self, change: RateChange) -> RateChangeComparison {
        let variants = [
            self.base_events.clone(),
            self.base_events.clone().with_rate_change(RateChange {
                adjustment_type: RateAdjustment::PreserveEmi,
                ..change
            }),
            self.base_events.clone().with_rate_change(RateChange {
                adjustment_type: RateAdjustment::PreserveTenure,
                ..change
            }),
        ];
        let results = self.run_batch(&variants);
        let (base, preserve_emi, preserve_tenure) = (&results[0], &results[1], &results[2]);

        let offset = month_offset(self.terms.start_date, change.date);
        let adjusted_installment = usize::try_from(offset)
            .ok()
            .and_then(|month| preserve_emi.entries.get(month))
            .map(|entry| entry.installment);

        RateChangeComparison {
            base: base.summary(),
            preserve_emi: preserve_emi.summary(),
            preserve_tenure: preserve_tenure.summary(),
            adjusted_installment,
            advice: self.advise(base, offset, change.new_rate),
        }
    }

    /// Interest and months saved by adding `payment` to the base events
    pub fn part_payment_savings(&self, payment: PartPayment) -> PrepaymentSavings {
        let variants = [
            self.base_events.clone(),
            self.base_events.clone().with_part_payment(payment),
        ];
        let results = self.run_batch(&variants);
        let base = results[0].summary();
        let with_prepayment = results[1].summary();

        PrepaymentSavings {
            base,
            with_prepayment,
            interest_saved: base.total_interest - with_prepayment.total_interest,
            months_saved: base.actual_tenure_months as i64 - with_prepayment.actual_tenure_months as i64,
        }
    }

    /// Solver figures at `offset` against the base schedule, if that month
    /// falls inside the installment phase
    fn advise(&self, base: &ScheduleResult, offset: i64, new_rate: f64) -> Option<RateChangeAdvice> {
        let month = u32::try_from(offset).ok()?;
        let entry = base.entries.get(month as usize)?;
        if entry.is_pre_emi {
            return None;
        }

        let balance = match month {
            0 => self.terms.principal,
            m => base.entries[(m - 1) as usize].balance + entry.disbursement,
        };
        let remaining_months = self.terms.tenure_months.saturating_sub(month);
        let current_emi = entry.installment;

        Some(RateChangeAdvice {
            month,
            balance,
            remaining_months,
            current_emi,
            emi_delta: emi_delta_for_tenure_preservation(
                balance,
                entry.rate,
                new_rate,
                remaining_months,
            ),
            part_payment_to_keep_emi: part_payment_for_emi_preservation(
                balance,
                current_emi,
                new_rate,
                remaining_months,
                DEFAULT_SOLVER_TOLERANCE,
            ),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::loan::month::year_month;
    use crate::schedule::calculate_emi;
    use approx::assert_relative_eq;
    use chrono::NaiveDate;

    fn ym(year: i32, month: u32) -> NaiveDate {
        year_month(year, month).unwrap()
    }

    fn runner() -> ScenarioRunner {
        ScenarioRunner::new(
            LoanTerms::new(3_000_000.0, 8.5, 240, ym(2025, 1)),
            LoanEvents::new(),
        )
    }

    #[test]
    fn test_run_batch_preserves_order() {
        let runner = runner();
        let scenarios: Vec<_> = [0.0, 100_000.0, 300_000.0]
            .iter()
            .map(|&amount| {
                if amount > 0.0 {
                    LoanEvents::new().with_part_payment(PartPayment::one_time(ym(2026, 1), amount))
                } else {
                    LoanEvents::new()
                }
            })
            .collect();

        let results = runner.run_batch(&scenarios);
        assert_eq!(results.len(), 3);
        // Bigger prepayment, shorter loan
        assert!(results[0].len() > results[1].len());
        assert!(results[1].len() > results[2].len());
    }

    #[test]
    fn test_compare_rate_rise() {
        let runner = runner();
        let change = RateChange::new(ym(2027, 1), 9.5, RateAdjustment::PreserveTenure);
        let comparison = runner.compare_rate_change(change);

        // "Adjust EMI" closes on the original term, the other drifts longer
        assert_eq!(comparison.base.actual_tenure_months, 240);
        assert_eq!(comparison.preserve_emi.actual_tenure_months, 240);
        assert!(comparison.preserve_tenure.actual_tenure_months > 240);
        assert!(comparison.preserve_tenure.total_interest > comparison.preserve_emi.total_interest);

        let advice = comparison.advice.unwrap();
        assert_eq!(advice.month, 24);
        assert_eq!(advice.remaining_months, 216);
        assert_relative_eq!(
            comparison.adjusted_installment.unwrap(),
            calculate_emi(advice.balance, 9.5, 216),
            max_relative = 1e-12
        );
        assert!(advice.emi_delta > 0.0);
        assert!(advice.part_payment_to_keep_emi > 0.0);
        assert!(calculate_emi(advice.balance - advice.part_payment_to_keep_emi, 9.5, 216) <= advice.current_emi);
    }

    #[test]
    fn test_change_before_start_has_no_advice() {
        let change = RateChange::new(ym(2024, 6), 9.0, RateAdjustment::PreserveEmi);
        let comparison = runner().compare_rate_change(change);
        assert!(comparison.advice.is_none());
        assert!(comparison.adjusted_installment.is_none());
    }

    #[test]
    fn test_part_payment_savings() {
        let savings = runner().part_payment_savings(PartPayment::one_time(ym(2026, 1), 500_000.0));
        assert!(savings.interest_saved > 0.0);
        assert!(savings.months_saved > 0);
        assert_eq!(savings.base.actual_tenure_months, 240);
    }
}
