//! What-if calculators for a floating-rate change
//!
//! Advisory only: the simulators never call these.

use super::emi::calculate_emi;

/// Default bisection exit width, in currency units
pub const DEFAULT_SOLVER_TOLERANCE: f64 = 1.0;

/// Iteration guard for the bisection; far more than any loan balance needs
const MAX_BISECTION_STEPS: u32 = 200;

/// Installment increase needed to keep the remaining term after a rate change
pub fn emi_delta_for_tenure_preservation(
    balance: f64,
    old_rate: f64,
    new_rate: f64,
    remaining_months: u32,
) -> f64 {
    let old_emi = calculate_emi(balance, old_rate, remaining_months);
    let new_emi = calculate_emi(balance, new_rate, remaining_months);
    new_emi - old_emi
}

/// Lump-sum prepayment that brings the installment at `new_rate` back down
/// to `target_emi` over `remaining_months`.
///
/// Bisects the reduction over `[0, balance]`; EMI is strictly decreasing in
/// principal, so the bracket always holds. Stops once the bracket is narrower
/// than `tolerance` and returns its upper end, which always satisfies
/// `EMI(balance - x) <= target_emi`.
pub fn part_payment_for_emi_preservation(
    balance: f64,
    target_emi: f64,
    new_rate: f64,
    remaining_months: u32,
    tolerance: f64,
) -> f64 {
    if balance <= 0.0 {
        return 0.0;
    }

    let tolerance = if tolerance > 0.0 { tolerance } else { DEFAULT_SOLVER_TOLERANCE };
    let mut low = 0.0_f64;
    let mut high = balance;

    for _ in 0..MAX_BISECTION_STEPS {
        if high - low <= tolerance {
            break;
        }

        let mid = (low + high) / 2.0;
        let emi = calculate_emi(balance - mid, new_rate, remaining_months);

        if emi > target_emi {
            low = mid;
        } else {
            high = mid;
        }
    }

    high
}
