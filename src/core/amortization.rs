use super::types::MONTHS_PER_YEAR;

/// Fixed monthly payment that retires `principal` over `term_years` at a nominal `annual_rate`.
///
/// Total over its numeric domain: a non-positive principal pays nothing, a zero rate is repaid
/// straight-line, a non-finite rate counts as zero and a non-finite or sub-one-year term counts as
/// one year.
pub fn monthly_payment(principal: f64, annual_rate: f64, term_years: f64) -> f64 {
    if !principal.is_finite() || principal <= 0.0 {
        return 0.0;
    }
    let rate = if annual_rate.is_finite() {
        annual_rate
    } else {
        0.0
    };
    let years = if term_years.is_finite() {
        term_years.max(1.0)
    } else {
        1.0
    };
    let months = years * MONTHS_PER_YEAR as f64;

    if rate == 0.0 {
        return principal / months;
    }

    let r = rate / MONTHS_PER_YEAR as f64;
    let denom = 1.0 - (1.0 + r).powf(-months);
    if !denom.is_finite() || denom.abs() < 1e-12 {
        // (1+r) collapsed to ~1 or to a pole; fall back to straight-line.
        return principal / months;
    }
    let payment = principal * r / denom;
    if payment.is_finite() {
        payment.max(0.0)
    } else {
        principal / months
    }
}
