//! Rate and money arithmetic shared across the engine.

use serde::{Deserialize, Serialize};

/// Average weeks per calendar month (365.2425 / 12 / 7).
pub const WEEKS_PER_MONTH: f64 = 4.34524;

/// Round to whole cents. Balances and payments are kept in cents precision
/// so repeated accrual doesn't drift below the penny.
#[inline]
pub fn round_cents(amount: f64) -> f64 {
    (amount * 100.0).round() / 100.0
}

/// Convert a whole-number percentage (e.g. `7.5`) to a fraction (`0.075`).
#[inline]
pub fn percent(rate: f64) -> f64 {
    rate / 100.0
}

/// Effective monthly growth rate for an annual compounding rate given in
/// whole percent: `(1 + r)^(1/12) - 1`.
#[inline]
pub fn monthly_growth_rate(annual_percent: f64) -> f64 {
    (1.0 + percent(annual_percent)).powf(1.0 / 12.0) - 1.0
}

/// Simple-interest monthly fee for an APR given in whole percent: `r / 12`.
///
/// Debt interest accrues on this schedule, not the compounding one.
#[inline]
pub fn monthly_interest_fee(annual_percent: f64) -> f64 {
    percent(annual_percent) / 12.0
}

/// Format a dollar amount for alert text, e.g. `$12,345.67`.
pub fn dollars(amount: f64) -> String {
    let negative = amount < 0.0;
    let cents = (amount.abs() * 100.0).round() as u64;
    let (whole, frac) = (cents / 100, cents % 100);

    let digits = whole.to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(c);
    }

    let sign = if negative { "-" } else { "" };
    format!("{sign}${grouped}.{frac:02}")
}

/// How often a stream amount recurs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum RatePeriod {
    Weekly,
    #[default]
    Monthly,
    BiMonthly,
    Annually,
}

impl RatePeriod {
    /// Normalize an amount quoted at this period to a monthly amount.
    pub fn to_monthly(self, amount: f64) -> f64 {
        match self {
            RatePeriod::Weekly => amount * WEEKS_PER_MONTH,
            RatePeriod::Monthly => amount,
            RatePeriod::BiMonthly => amount * 2.0,
            RatePeriod::Annually => amount / 12.0,
        }
    }

    /// Normalize an amount quoted at this period to a yearly amount.
    pub fn to_yearly(self, amount: f64) -> f64 {
        self.to_monthly(amount) * 12.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cents_rounding() {
        assert_eq!(round_cents(10.005), 10.01);
        assert_eq!(round_cents(10.004), 10.0);
        assert_eq!(round_cents(-2.675), -2.68);
    }

    #[test]
    fn monthly_rates() {
        // 10% annual compounds to just under 10%/12 per month
        let m = monthly_growth_rate(10.0);
        assert!((m - 0.007974).abs() < 1e-6, "rate was {m}");
        assert!(((1.0 + m).powi(12) - 1.10).abs() < 1e-9);

        assert!((monthly_interest_fee(24.0) - 0.02).abs() < 1e-12);
    }

    #[test]
    fn dollar_formatting() {
        assert_eq!(dollars(0.0), "$0.00");
        assert_eq!(dollars(1_234.5), "$1,234.50");
        assert_eq!(dollars(1_234_567.891), "$1,234,567.89");
        assert_eq!(dollars(-45.0), "-$45.00");
    }

    #[test]
    fn period_normalization() {
        assert!((RatePeriod::Weekly.to_monthly(100.0) - 434.524).abs() < 1e-9);
        assert_eq!(RatePeriod::BiMonthly.to_monthly(500.0), 1000.0);
        assert_eq!(RatePeriod::Annually.to_monthly(1200.0), 100.0);
        assert_eq!(RatePeriod::Monthly.to_yearly(100.0), 1200.0);
    }
}
