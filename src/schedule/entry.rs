//! Schedule output structures and summary aggregation

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::loan::month::serde_month;

/// One simulated month of the amortization ledger
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScheduleEntry {
    /// Month number (1-indexed)
    pub month: u32,

    #[serde(with = "serde_month")]
    pub date: NaiveDate,

    /// Cash outflow: installment plus any part payment
    pub payment: f64,

    /// Scheduled installment in force (0 during pre-EMI)
    pub installment: f64,

    /// Principal repaid by the installment, excluding part payment
    pub principal: f64,

    pub interest: f64,
    pub part_payment: f64,
    pub disbursement: f64,

    /// Closing balance
    pub balance: f64,

    /// Annual rate in force (percent)
    pub rate: f64,

    // Flags
    pub is_pre_emi: bool,
    pub is_rate_change: bool,
    pub has_part_payment: bool,
    pub has_disbursement: bool,
}

impl ScheduleEntry {
    pub fn new(month: u32, date: NaiveDate) -> Self {
        Self {
            month,
            date,
            payment: 0.0,
            installment: 0.0,
            principal: 0.0,
            interest: 0.0,
            part_payment: 0.0,
            disbursement: 0.0,
            balance: 0.0,
            rate: 0.0,
            is_pre_emi: false,
            is_rate_change: false,
            has_part_payment: false,
            has_disbursement: false,
        }
    }

    /// Principal, interest and part payment paid this month
    pub fn total_paid(&self) -> f64 {
        self.principal + self.interest + self.part_payment
    }
}

/// Complete schedule for one set of inputs
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScheduleResult {
    pub entries: Vec<ScheduleEntry>,

    /// Simulation stopped at its iteration cap with the balance still open.
    /// Usually an installment too small to cover interest.
    pub hit_safety_bound: bool,
}

impl ScheduleResult {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_entry(&mut self, entry: ScheduleEntry) {
        self.entries.push(entry);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Aggregate totals over the whole schedule
    pub fn summary(&self) -> LoanSummary {
        LoanSummary::from_entries(&self.entries)
    }

    /// Month of the final entry
    pub fn completion_date(&self) -> Option<NaiveDate> {
        self.entries.last().map(|e| e.date)
    }

    /// First scheduled installment once the installment phase starts
    pub fn first_installment(&self) -> Option<f64> {
        self.entries
            .iter()
            .find(|e| !e.is_pre_emi && e.installment > 0.0)
            .map(|e| e.installment)
    }

    pub fn final_balance(&self) -> f64 {
        self.entries.last().map(|e| e.balance).unwrap_or(0.0)
    }

    /// Every `step`-th entry plus the last one, for charting
    pub fn sampled(&self, step: usize) -> Vec<&ScheduleEntry> {
        let step = step.max(1);
        let last = self.entries.len().saturating_sub(1);
        self.entries
            .iter()
            .enumerate()
            .filter(|(i, _)| i % step == 0 || *i == last)
            .map(|(_, e)| e)
            .collect()
    }

    /// Totals grouped by calendar year
    pub fn yearly_breakdown(&self) -> Vec<YearlyTotals> {
        let mut years: Vec<YearlyTotals> = Vec::new();

        for entry in &self.entries {
            let year = entry.date.year();
            let needs_new = years.last().map(|y| y.year != year).unwrap_or(true);
            if needs_new {
                years.push(YearlyTotals {
                    year,
                    ..Default::default()
                });
            }
            if let Some(totals) = years.last_mut() {
                totals.months += 1;
                totals.principal += entry.principal;
                totals.interest += entry.interest;
                totals.part_payments += entry.part_payment;
                totals.disbursed += entry.disbursement;
                totals.closing_balance = entry.balance;
            }
        }

        years
    }
}

/// Aggregate totals for a schedule
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoanSummary {
    pub total_interest: f64,
    pub total_principal: f64,
    pub total_part_payments: f64,
    pub total_payable: f64,
    pub actual_tenure_months: u32,
}

impl LoanSummary {
    /// Fold entries by straight summation; an empty slice gives all zeros
    pub fn from_entries(entries: &[ScheduleEntry]) -> Self {
        let total_interest: f64 = entries.iter().map(|e| e.interest).sum();
        let total_principal: f64 = entries.iter().map(|e| e.principal).sum();
        let total_part_payments: f64 = entries.iter().map(|e| e.part_payment).sum();
        let total_payable: f64 = entries.iter().map(ScheduleEntry::total_paid).sum();

        Self {
            total_interest,
            total_principal,
            total_part_payments,
            total_payable,
            actual_tenure_months: entries.len() as u32,
        }
    }
}

/// Calendar-year slice of a schedule
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct YearlyTotals {
    pub year: i32,
    pub months: u32,
    pub principal: f64,
    pub interest: f64,
    pub part_payments: f64,
    pub disbursed: f64,
    pub closing_balance: f64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::loan::month::{add_months, year_month};
    use approx::assert_relative_eq;

    fn entry(month: u32, principal: f64, interest: f64, part_payment: f64, balance: f64) -> ScheduleEntry {
        let start = year_month(2025, 11).unwrap();
        ScheduleEntry {
            principal,
            interest,
            part_payment,
            balance,
            installment: principal + interest,
            payment: principal + interest + part_payment,
            ..ScheduleEntry::new(month, add_months(start, month - 1))
        }
    }

    fn result() -> ScheduleResult {
        ScheduleResult {
            entries: vec![
                entry(1, 100.0, 50.0, 0.0, 900.0),
                entry(2, 110.0, 45.0, 200.0, 590.0),
                entry(3, 120.0, 30.0, 0.0, 470.0),
            ],
            hit_safety_bound: false,
        }
    }

    #[test]
    fn test_empty_summary_is_zero() {
        assert_eq!(ScheduleResult::new().summary(), LoanSummary::default());
    }

    #[test]
    fn test_summary_totals() {
        let summary = result().summary();
        assert_relative_eq!(summary.total_principal, 330.0);
        assert_relative_eq!(summary.total_interest, 125.0);
        assert_relative_eq!(summary.total_part_payments, 200.0);
        assert_relative_eq!(summary.total_payable, 655.0);
        assert_eq!(summary.actual_tenure_months, 3);
    }

    #[test]
    fn test_yearly_breakdown_splits_calendar_years() {
        let years = result().yearly_breakdown();
        assert_eq!(years.len(), 2);
        assert_eq!(years[0].year, 2025);
        assert_eq!(years[0].months, 2);
        assert_relative_eq!(years[0].part_payments, 200.0);
        assert_eq!(years[1].year, 2026);
        assert_eq!(years[1].closing_balance, 470.0);
    }

    #[test]
    fn test_sampled_keeps_last() {
        let r = result();
        let months: Vec<u32> = r.sampled(2).iter().map(|e| e.month).collect();
        assert_eq!(months, vec![1, 3]);
        let months: Vec<u32> = r.sampled(12).iter().map(|e| e.month).collect();
        assert_eq!(months, vec![1, 3]);
    }

    #[test]
    fn test_completion_and_first_installment() {
        let r = result();
        assert_eq!(r.completion_date(), year_month(2026, 1));
        assert_eq!(r.first_installment(), Some(150.0));
        assert_eq!(r.final_balance(), 470.0);
    }
}
