//! Event timeline: dated events indexed by month offset from loan start
//!
//! Rate changes and part payments keep only the last event seen for a
//! month (input order). Disbursements in the same month add up.

use std::collections::BTreeMap;

use chrono::Datelike;

use crate::loan::month::{month_offset, year_month};
use crate::loan::{LoanEvents, LoanTerms, PartPayment, RateAdjustment, RateChange};

/// Rate change resolved to a month offset
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RateChangeEvent {
    pub month: i64,
    pub new_rate: f64,
    pub adjustment: RateAdjustment,
}

/// Dated events keyed by month offset (0 = loan start month)
#[derive(Debug, Clone, Default)]
pub struct EventTimeline {
    rate_changes: BTreeMap<i64, RateChangeEvent>,
    part_payments: BTreeMap<i64, f64>,
    disbursements: BTreeMap<i64, f64>,
}

impl EventTimeline {
    /// Index already-expanded events relative to `terms.start_date`
    pub fn build(terms: &LoanTerms, events: &LoanEvents) -> Self {
        let mut timeline = Self::default();

        for change in &events.rate_changes {
            timeline.insert_rate_change(terms, change);
        }
        for payment in &events.part_payments {
            let month = month_offset(terms.start_date, payment.date);
            timeline.part_payments.insert(month, payment.amount);
        }
        for disbursement in &events.disbursements {
            let month = month_offset(terms.start_date, disbursement.date);
            *timeline.disbursements.entry(month).or_insert(0.0) += disbursement.amount;
            if disbursement.manual_pre_emi.is_some() {
                log::debug!(
                    "disbursement at month {} carries a manual pre-EMI figure; it is display-only",
                    month
                );
            }
        }

        timeline
    }

    /// Expand recurring part payments, then index everything
    pub fn from_events(terms: &LoanTerms, events: &LoanEvents) -> Self {
        let expanded = LoanEvents {
            part_payments: expand_part_payments(&events.part_payments, terms),
            ..events.clone()
        };
        Self::build(terms, &expanded)
    }

    fn insert_rate_change(&mut self, terms: &LoanTerms, change: &RateChange) {
        let month = month_offset(terms.start_date, change.date);
        self.rate_changes.insert(
            month,
            RateChangeEvent {
                month,
                new_rate: change.new_rate,
                adjustment: change.adjustment_type,
            },
        );
    }

    pub fn rate_change_at(&self, month: i64) -> Option<&RateChangeEvent> {
        self.rate_changes.get(&month)
    }

    pub fn part_payment_at(&self, month: i64) -> Option<f64> {
        self.part_payments.get(&month).copied()
    }

    pub fn disbursement_at(&self, month: i64) -> Option<f64> {
        self.disbursements.get(&month).copied()
    }

    pub fn has_disbursements(&self) -> bool {
        !self.disbursements.is_empty()
    }

    /// Latest month offset carrying a disbursement
    pub fn last_disbursement_month(&self) -> Option<i64> {
        self.disbursements.keys().next_back().copied()
    }

    pub fn rate_change_count(&self) -> usize {
        self.rate_changes.len()
    }

    pub fn part_payment_count(&self) -> usize {
        self.part_payments.len()
    }
}

/// Replace each recurring part payment by one payment per year in the same
/// calendar month, from its own year through `start year + ceil(tenure / 12)`.
/// Occurrences before the loan start are dropped; one-time payments pass through.
pub fn expand_part_payments(payments: &[PartPayment], terms: &LoanTerms) -> Vec<PartPayment> {
    let end_year = terms.start_year() + terms.tenure_months.div_ceil(12) as i32;
    let mut expanded = Vec::with_capacity(payments.len());

    for payment in payments {
        if !payment.is_recurring {
            expanded.push(*payment);
            continue;
        }

        let month = payment.date.month();
        for year in payment.date.year()..=end_year {
            let Some(date) = year_month(year, month) else {
                continue;
            };
            if date >= terms.start_date {
                expanded.push(PartPayment::one_time(date, payment.amount));
            }
        }
    }

    expanded
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::loan::{Disbursement, RateAdjustment};
    use chrono::NaiveDate;

    fn ym(year: i32, month: u32) -> NaiveDate {
        year_month(year, month).unwrap()
    }

    fn terms() -> LoanTerms {
        LoanTerms::new(1_000_000.0, 8.0, 240, ym(2025, 1))
    }

    #[test]
    fn test_rate_change_last_write_wins() {
        let events = LoanEvents::new()
            .with_rate_change(RateChange::new(ym(2026, 1), 9.0, RateAdjustment::PreserveEmi))
            .with_rate_change(RateChange::new(ym(2026, 1), 7.5, RateAdjustment::PreserveTenure));

        let timeline = EventTimeline::build(&terms(), &events);
        let change = timeline.rate_change_at(12).unwrap();
        assert_eq!(change.new_rate, 7.5);
        assert_eq!(change.adjustment, RateAdjustment::PreserveTenure);
        assert_eq!(timeline.rate_change_count(), 1);
    }

    #[test]
    fn test_part_payment_last_write_wins() {
        let events = LoanEvents::new()
            .with_part_payment(PartPayment::one_time(ym(2025, 6), 10_000.0))
            .with_part_payment(PartPayment::one_time(ym(2025, 6), 25_000.0));

        let timeline = EventTimeline::build(&terms(), &events);
        assert_eq!(timeline.part_payment_at(5), Some(25_000.0));
        assert_eq!(timeline.part_payment_count(), 1);
    }

    #[test]
    fn test_disbursements_accumulate() {
        let events = LoanEvents::new()
            .with_disbursement(Disbursement::new(ym(2025, 3), 200_000.0))
            .with_disbursement(Disbursement::new(ym(2025, 3), 300_000.0))
            .with_disbursement(Disbursement::new(ym(2025, 9), 500_000.0));

        let timeline = EventTimeline::build(&terms(), &events);
        assert_eq!(timeline.disbursement_at(2), Some(500_000.0));
        assert_eq!(timeline.disbursement_at(8), Some(500_000.0));
        assert_eq!(timeline.last_disbursement_month(), Some(8));
    }

    #[test]
    fn test_events_before_start_get_negative_offsets() {
        let events = LoanEvents::new()
            .with_part_payment(PartPayment::one_time(ym(2024, 10), 5_000.0));
        let timeline = EventTimeline::build(&terms(), &events);
        assert_eq!(timeline.part_payment_at(-3), Some(5_000.0));
    }

    #[test]
    fn test_recurring_expansion_years() {
        // Loan starts 2024-06, 20 years: expansion runs through 2044
        let terms = LoanTerms::new(1_000_000.0, 8.0, 240, ym(2024, 6));
        let payments = [PartPayment::recurring(ym(2025, 3), 50_000.0)];

        let expanded = expand_part_payments(&payments, &terms);
        assert_eq!(expanded.len(), 20);
        assert_eq!(expanded.first().unwrap().date, ym(2025, 3));
        assert_eq!(expanded.last().unwrap().date, ym(2044, 3));
        assert!(expanded.iter().all(|p| !p.is_recurring && p.amount == 50_000.0));
    }

    #[test]
    fn test_recurring_expansion_drops_dates_before_start() {
        let terms = LoanTerms::new(1_000_000.0, 8.0, 24, ym(2025, 6));
        let payments = [PartPayment::recurring(ym(2024, 3), 10_000.0)];

        let expanded = expand_part_payments(&payments, &terms);
        let dates: Vec<_> = expanded.iter().map(|p| p.date).collect();
        assert_eq!(dates, vec![ym(2026, 3), ym(2027, 3)]);
    }

    #[test]
    fn test_one_time_payments_pass_through() {
        let payments = [PartPayment::one_time(ym(2023, 1), 10_000.0)];
        let expanded = expand_part_payments(&payments, &terms());
        assert_eq!(expanded, payments.to_vec());
    }

    #[test]
    fn test_from_events_expands_recurring() {
        let events = LoanEvents::new()
            .with_part_payment(PartPayment::recurring(ym(2025, 1), 20_000.0));
        let timeline = EventTimeline::from_events(&terms(), &events);
        // 2025 through 2045 inclusive
        assert_eq!(timeline.part_payment_count(), 21);
        assert_eq!(timeline.part_payment_at(0), Some(20_000.0));
        assert_eq!(timeline.part_payment_at(12), Some(20_000.0));
        assert_eq!(timeline.part_payment_at(1), None);
    }
}
