//! Annual tax engine and contribution-limit rules.
//!
//! [`Irs`] resolves the household's filing situation against the embedded
//! tables: federal/state/local income tax, partial taxability of social
//! security benefits, long-term capital gains stacked on ordinary income,
//! and the year's IRA / Roth / 401k contribution limits. Future simulation
//! years reuse the latest carried tables with federal bracket bounds
//! inflated relative to the reference year.

pub mod brackets;
pub mod solver;
pub mod tables;
pub mod withholding;

use serde::{Deserialize, Serialize};

use crate::util::percent;
use brackets::Brackets;
use tables::FilingStatus;

// ============================================================================
// Taxable income and the annual bill
// ============================================================================

/// Income the household accumulates toward the yearly reconciliation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaxableIncome {
    /// Wages, interest, taxed retirement distributions.
    pub ordinary: f64,
    /// Social security benefits received (taxability resolved at year end).
    pub social_security: f64,
    pub long_term_capital_gains: f64,
}

/// One year's computed taxes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaxBill {
    pub year: i16,
    pub federal: f64,
    pub state: f64,
    pub local: f64,
    pub long_term_capital_gains: f64,
    /// Portion of social security benefits that was taxable.
    pub social_security_taxable: f64,
    pub total: f64,
}

/// The year's contribution ceilings, resolved once at each year boundary.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContributionLimits {
    pub roth: f64,
    pub ira: f64,
    pub employee_401k: f64,
    pub combined_401k: f64,
}

/// IRA money put away so far this year, counted against the limits.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IraDeposits {
    pub roth: f64,
    pub traditional: f64,
}

impl IraDeposits {
    pub fn total(&self) -> f64 {
        self.roth + self.traditional
    }
}

// ============================================================================
// Irs
// ============================================================================

#[derive(Debug, Clone)]
pub struct Irs {
    pub filing_status: FilingStatus,
    pub state: String,
    /// Flat override in whole percent; replaces the federal bracket walk.
    pub effective_tax_rate: Option<f64>,
    /// Annual growth of federal bracket bounds, whole percent.
    pub tax_inflation_rate: f64,
    /// The year bracket inflation is anchored to.
    pub reference_year: i16,
}

impl Irs {
    pub fn new(
        filing_status: FilingStatus,
        state: impl Into<String>,
        effective_tax_rate: Option<f64>,
        tax_inflation_rate: f64,
        reference_year: i16,
    ) -> Self {
        Irs {
            filing_status,
            state: state.into(),
            effective_tax_rate,
            tax_inflation_rate,
            reference_year,
        }
    }

    /// Cumulative bracket-bound inflation between the reference year and a
    /// simulated year.
    pub fn bracket_inflation(&self, year: i16) -> f64 {
        let rate = percent(self.tax_inflation_rate);
        (1.0 + rate).powi((year - self.reference_year) as i32) - 1.0
    }

    fn inflated(&self, brackets: Brackets, year: i16) -> Brackets {
        brackets.scaled(self.bracket_inflation(year))
    }

    pub fn federal_brackets(&self, year: i16) -> Brackets {
        self.inflated(tables::federal_brackets(year, self.filing_status), year)
    }

    /// Standard deduction plus the senior addition for each filer 65 or over.
    pub fn deduction(&self, year: i16, filer_ages: &[f64]) -> f64 {
        let base = tables::standard_deduction(year, self.filing_status);
        let senior = tables::senior_deduction(year, self.filing_status);
        base + filer_ages.iter().filter(|&&a| a >= 65.0).count() as f64 * senior
    }

    /// Federal tax on ordinary income after the standard deduction.
    pub fn federal_tax(&self, ordinary: f64, year: i16, filer_ages: &[f64]) -> f64 {
        let taxable = (ordinary - self.deduction(year, filer_ages)).max(0.0);
        match self.effective_tax_rate {
            Some(rate) => taxable * percent(rate),
            None => self.federal_brackets(year).marginal_tax(taxable),
        }
    }

    pub fn state_tax(&self, ordinary: f64, _year: i16) -> f64 {
        let brackets = tables::state_brackets(&self.state, self.filing_status);
        if brackets.is_empty() {
            return 0.0;
        }
        let deduction = tables::state_standard_deduction(&self.state, self.filing_status);
        brackets.marginal_tax((ordinary - deduction).max(0.0))
    }

    pub fn local_tax(&self, ordinary: f64, _year: i16) -> f64 {
        tables::local_brackets(&self.state, self.filing_status).marginal_tax(ordinary.max(0.0))
    }

    /// Taxable portion of social security benefits, per the Publication 915
    /// worksheet tiers.
    pub fn social_security_taxable(&self, benefits: f64, other_income: f64) -> f64 {
        if benefits <= 0.0 {
            return 0.0;
        }
        let (base, upper) = match self.filing_status {
            FilingStatus::MarriedFilingJointly => (32_000.0, 44_000.0),
            _ => (25_000.0, 34_000.0),
        };
        let provisional = other_income + 0.5 * benefits;
        if provisional <= base {
            0.0
        } else if provisional <= upper {
            (0.5 * (provisional - base)).min(0.5 * benefits)
        } else {
            let tier_one = (0.5 * (upper - base)).min(0.5 * benefits);
            (0.85 * (provisional - upper) + tier_one).min(0.85 * benefits)
        }
    }

    /// Long-term gains tax, stacked on top of ordinary income so the gains
    /// fill the bracket space ordinary income left open.
    pub fn capital_gains_tax(&self, gains: f64, ordinary: f64, year: i16) -> f64 {
        if gains <= 0.0 {
            return 0.0;
        }
        let brackets = self.inflated(tables::ltcg_brackets(year, self.filing_status), year);
        brackets.marginal_tax(ordinary + gains) - brackets.marginal_tax(ordinary)
    }

    /// The full yearly reconciliation.
    pub fn income_tax(&self, income: &TaxableIncome, year: i16, filer_ages: &[f64]) -> TaxBill {
        let ss_taxable = self.social_security_taxable(income.social_security, income.ordinary);
        let ordinary = income.ordinary + ss_taxable;
        let federal = self.federal_tax(ordinary, year, filer_ages);
        let state = self.state_tax(ordinary, year);
        let local = self.local_tax(ordinary, year);
        let ltcg = self.capital_gains_tax(income.long_term_capital_gains, ordinary, year);
        TaxBill {
            year,
            federal,
            state,
            local,
            long_term_capital_gains: ltcg,
            social_security_taxable: ss_taxable,
            total: federal + state + local + ltcg,
        }
    }

    /// Modified adjusted gross income for the Roth phase-out.
    pub fn magi(&self, income: &TaxableIncome) -> f64 {
        income.ordinary + income.long_term_capital_gains
    }

    /// Roth IRA limit after the MAGI phase-out.
    pub fn roth_limit(&self, year: i16, age: f64, magi: f64) -> f64 {
        let full = tables::ira_limit(year, age);
        let (lower, upper) = tables::roth_phase_out(year, self.filing_status);
        if magi < lower {
            full
        } else if magi >= upper {
            0.0
        } else {
            full * (upper - magi) / (upper - lower)
        }
    }

    pub fn contribution_limits(&self, year: i16, age: f64, magi: f64) -> ContributionLimits {
        ContributionLimits {
            roth: self.roth_limit(year, age, magi),
            ira: tables::ira_limit(year, age),
            employee_401k: tables::limit_401k_employee(year),
            combined_401k: tables::limit_401k_combined(year),
        }
    }

    /// Withholding schedules for paychecks, anchored at the reference year.
    pub fn withholding_schedules(&self) -> withholding::WithholdingSchedules {
        let year = self.reference_year;
        withholding::WithholdingSchedules::new(
            tables::federal_brackets(year, self.filing_status),
            tables::state_brackets(&self.state, self.filing_status),
            tables::local_brackets(&self.state, self.filing_status),
            tables::fica_rates(year),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn irs() -> Irs {
        Irs::new(FilingStatus::Single, "NY", None, 2.0, 2020)
    }

    #[test]
    fn federal_tax_single_2020() {
        // 60k - 12.4k deduction = 47.6k taxable:
        // 9_875 @ 10% + 30_250 @ 12% + 7_475 @ 22%
        let tax = irs().federal_tax(60_000.0, 2020, &[30.0]);
        assert!((tax - (987.50 + 3_630.0 + 1_644.50)).abs() < 0.01, "tax was {tax}");
    }

    #[test]
    fn senior_deduction_applies_at_65() {
        let young = irs().federal_tax(60_000.0, 2020, &[64.0]);
        let senior = irs().federal_tax(60_000.0, 2020, &[65.0]);
        assert!(senior < young);
    }

    #[test]
    fn effective_rate_overrides_brackets() {
        let mut i = irs();
        i.effective_tax_rate = Some(25.0);
        let tax = i.federal_tax(60_000.0, 2020, &[30.0]);
        assert!((tax - (60_000.0 - 12_400.0) * 0.25).abs() < 0.01);
    }

    #[test]
    fn bracket_inflation_grows_future_years() {
        let i = irs();
        assert!((i.bracket_inflation(2020)).abs() < 1e-12);
        assert!((i.bracket_inflation(2021) - 0.02).abs() < 1e-12);
        // the same nominal income owes less tax in later years
        let now = i.federal_tax(200_000.0, 2020, &[30.0]);
        let later = i.federal_tax(200_000.0, 2030, &[40.0]);
        assert!(later < now, "{later} vs {now}");
    }

    #[test]
    fn social_security_tiers() {
        let i = irs();
        // below the base threshold nothing is taxable
        assert_eq!(i.social_security_taxable(12_000.0, 10_000.0), 0.0);
        // middle tier taxes half the excess
        let mid = i.social_security_taxable(12_000.0, 24_000.0);
        assert!((mid - 2_500.0).abs() < 0.01, "mid was {mid}");
        // high incomes cap at 85% of benefits
        let high = i.social_security_taxable(12_000.0, 200_000.0);
        assert!((high - 0.85 * 12_000.0).abs() < 0.01);
    }

    #[test]
    fn capital_gains_stack_on_ordinary_income() {
        let i = irs();
        // gains inside the 0% space are free
        assert_eq!(i.capital_gains_tax(10_000.0, 20_000.0, 2020), 0.0);
        // ordinary income pushes the same gains into the 15% step
        let pushed = i.capital_gains_tax(10_000.0, 60_000.0, 2020);
        assert!((pushed - 1_500.0).abs() < 0.01, "pushed was {pushed}");
    }

    #[test]
    fn roth_limit_phases_out() {
        let i = irs();
        assert_eq!(i.roth_limit(2020, 30.0, 100_000.0), 6_000.0);
        assert_eq!(i.roth_limit(2020, 30.0, 150_000.0), 0.0);
        let reduced = i.roth_limit(2020, 30.0, 131_500.0);
        assert!((reduced - 3_000.0).abs() < 0.01, "reduced was {reduced}");
    }

    #[test]
    fn yearly_bill_sums_components() {
        let i = irs();
        let income = TaxableIncome {
            ordinary: 90_000.0,
            social_security: 0.0,
            long_term_capital_gains: 5_000.0,
        };
        let bill = i.income_tax(&income, 2020, &[40.0]);
        assert!(bill.federal > 0.0);
        assert!(bill.state > 0.0);
        assert!(bill.local > 0.0);
        assert!(bill.long_term_capital_gains > 0.0);
        let sum = bill.federal + bill.state + bill.local + bill.long_term_capital_gains;
        assert!((bill.total - sum).abs() < 0.01);
    }
}
