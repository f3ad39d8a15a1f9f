//! Homeowner running and upfront costs alongside the loan
//!
//! None of these figures enter the amortization; they sit next to the
//! installment when showing the full monthly outgo.

use serde::{Deserialize, Serialize};

use crate::loan::LoanDetails;

/// Costs of owning the home that are not part of the loan
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HomeownerExpenses {
    /// Registration, stamp duty, furnishing
    #[serde(default, rename = "oneTimeExpenses")]
    pub one_time: f64,

    #[serde(default)]
    pub property_tax_annual: f64,

    #[serde(default)]
    pub home_insurance_annual: f64,

    #[serde(default)]
    pub maintenance_monthly: f64,
}

impl HomeownerExpenses {
    /// Recurring costs spread to a monthly figure
    pub fn monthly_expenses(&self) -> f64 {
        self.maintenance_monthly
            + self.property_tax_annual / 12.0
            + self.home_insurance_annual / 12.0
    }

    /// Installment plus recurring homeowner costs
    pub fn total_monthly_cost(&self, installment: f64) -> f64 {
        installment + self.monthly_expenses()
    }

    /// Cash needed upfront: down payment, insurance, fees and one-time expenses
    pub fn initial_costs(&self, details: &LoanDetails) -> f64 {
        details.down_payment + details.loan_insurance + details.loan_fees + self.one_time
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::loan::month::year_month;
    use approx::assert_relative_eq;

    fn expenses() -> HomeownerExpenses {
        HomeownerExpenses {
            one_time: 200_000.0,
            property_tax_annual: 24_000.0,
            home_insurance_annual: 12_000.0,
            maintenance_monthly: 5_000.0,
        }
    }

    #[test]
    fn test_monthly_expenses() {
        assert_relative_eq!(expenses().monthly_expenses(), 8_000.0);
        assert_relative_eq!(expenses().total_monthly_cost(30_000.0), 38_000.0);
    }

    #[test]
    fn test_initial_costs() {
        let details = LoanDetails {
            home_value: 5_000_000.0,
            down_payment: 1_000_000.0,
            loan_insurance: 50_000.0,
            annual_rate: 8.5,
            tenure_years: 20,
            loan_fees: 25_000.0,
            start_date: year_month(2025, 1).unwrap(),
        };
        assert_relative_eq!(expenses().initial_costs(&details), 1_275_000.0);
    }

    #[test]
    fn test_missing_fields_default_to_zero() {
        let parsed: HomeownerExpenses = serde_json::from_str(r#"{ "maintenanceMonthly": 3000 }"#).unwrap();
        assert_eq!(parsed.one_time, 0.0);
        assert_relative_eq!(parsed.monthly_expenses(), 3_000.0);
    }
}
