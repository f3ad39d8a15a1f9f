//! Equated monthly installment (EMI) formula

/// Monthly rate as a decimal from an annual percentage (8.5 -> 0.0070833...)
pub fn monthly_rate(annual_rate_percent: f64) -> f64 {
    annual_rate_percent / 12.0 / 100.0
}

/// Level monthly installment that repays `principal` over `tenure_months`.
///
/// EMI = P * r * (1 + r)^n / ((1 + r)^n - 1), with r the monthly rate,
/// evaluated as P * r / (1 - (1 + r)^-n) so very long terms approach the
/// interest-only installment instead of overflowing.
/// Returns 0 for a non-positive principal or zero tenure, and P / n at a
/// zero rate.
pub fn calculate_emi(principal: f64, annual_rate_percent: f64, tenure_months: u32) -> f64 {
    if principal <= 0.0 || tenure_months == 0 {
        return 0.0;
    }
    if annual_rate_percent == 0.0 {
        return principal / tenure_months as f64;
    }

    let rate = monthly_rate(annual_rate_percent);
    let discount = (-(tenure_months as f64) * rate.ln_1p()).exp();
    principal * rate / (1.0 - discount)
}
