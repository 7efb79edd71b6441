//! Paycheck withholding: gross-to-net and the grossed-up inverse.
//!
//! Withholding walks one merged schedule built from the federal, state and
//! local income-tax brackets plus the two payroll schedules (social security
//! up to its wage cap, medicare with its surcharge step). Each segment
//! between adjacent bounds is taxed at the sum of every schedule's rate for
//! that segment, which makes net pay a piecewise-linear function of gross
//! pay that the Newton solver inverts exactly.

use crate::error::SolveError;
use crate::irs::brackets::Brackets;
use crate::irs::solver::solve_newton;
use crate::irs::tables::FicaRates;

/// The five schedules a paycheck is withheld against.
#[derive(Debug, Clone)]
pub struct WithholdingSchedules {
    pub federal: Brackets,
    pub state: Brackets,
    pub local: Brackets,
    pub social_security: Brackets,
    pub medicare: Brackets,
}

impl WithholdingSchedules {
    pub fn new(federal: Brackets, state: Brackets, local: Brackets, fica: FicaRates) -> Self {
        let social_security = Brackets::from_steps(&[
            (fica.social_security_wage_cap, fica.social_security_rate),
            (f64::INFINITY, 0.0),
        ]);
        let medicare = Brackets::from_steps(&[
            (fica.medicare_surcharge_threshold, fica.medicare_rate),
            (f64::INFINITY, fica.medicare_surcharge_rate),
        ]);
        WithholdingSchedules { federal, state, local, social_security, medicare }
    }

    fn schedules(&self) -> [&Brackets; 5] {
        [&self.federal, &self.state, &self.local, &self.social_security, &self.medicare]
    }

    /// Every finite bound across all five schedules, ascending and deduped.
    fn merged_bounds(&self) -> Vec<f64> {
        let mut bounds: Vec<f64> = self
            .schedules()
            .iter()
            .flat_map(|b| b.bounds())
            .filter(|b| b.is_finite())
            .collect();
        bounds.sort_by(f64::total_cmp);
        bounds.dedup();
        bounds
    }

    /// Withhold an annual paycheck. `deductions` (pre-tax retirement
    /// contributions) come off the top before any schedule applies.
    pub fn gross_to_net(&self, gross: f64, deductions: f64) -> Withheld {
        let taxable = gross - deductions;
        let mut w = Withheld { gross, taxable, ..Withheld::default() };
        if taxable <= 0.0 {
            w.net = taxable.max(0.0);
            return w;
        }

        let mut lower = 0.0;
        let mut bounds = self.merged_bounds();
        bounds.push(f64::INFINITY);
        for upper in bounds {
            if taxable <= lower {
                break;
            }
            let segment = taxable.min(upper) - lower;
            let at = taxable.min(upper);
            w.federal += segment * self.federal.rate_at(at);
            w.state += segment * self.state.rate_at(at);
            w.local += segment * self.local.rate_at(at);
            w.social_security += segment * self.social_security.rate_at(at);
            w.medicare += segment * self.medicare.rate_at(at);
            lower = upper;
        }
        w.net = taxable - w.income_tax() - w.fica();
        w
    }

    /// Gross pay that nets to `net` after withholding, to the dollar.
    pub fn net_to_gross(&self, net: f64, deductions: f64) -> Result<f64, SolveError> {
        solve_newton(|gross| self.gross_to_net(gross, deductions).net - net, net)
    }
}

/// Annual withholding breakdown.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Withheld {
    pub gross: f64,
    pub taxable: f64,
    pub federal: f64,
    pub state: f64,
    pub local: f64,
    pub social_security: f64,
    pub medicare: f64,
    pub net: f64,
}

impl Withheld {
    pub fn income_tax(&self) -> f64 {
        self.federal + self.state + self.local
    }

    pub fn fica(&self) -> f64 {
        self.social_security + self.medicare
    }

    /// Effective income-tax withholding rate on taxable gross.
    pub fn income_tax_rate(&self) -> f64 {
        if self.taxable > 0.0 { self.income_tax() / self.taxable } else { 0.0 }
    }

    /// Effective payroll-tax rate on taxable gross.
    pub fn fica_rate(&self) -> f64 {
        if self.taxable > 0.0 { self.fica() / self.taxable } else { 0.0 }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn schedules() -> WithholdingSchedules {
        let federal = Brackets::from_steps(&[
            (10_000.0, 0.10),
            (50_000.0, 0.20),
            (f64::INFINITY, 0.30),
        ]);
        let state = Brackets::from_steps(&[(25_000.0, 0.04), (f64::INFINITY, 0.06)]);
        let fica = FicaRates {
            social_security_rate: 0.062,
            social_security_wage_cap: 137_700.0,
            medicare_rate: 0.0145,
            medicare_surcharge_threshold: 200_000.0,
            medicare_surcharge_rate: 0.0235,
        };
        WithholdingSchedules::new(federal, state, Brackets::default(), fica)
    }

    #[test]
    fn segments_sum_every_schedule() {
        let w = schedules().gross_to_net(30_000.0, 0.0);
        // federal: 10k @ 10% + 20k @ 20%
        assert!((w.federal - 5_000.0).abs() < 0.01, "federal was {}", w.federal);
        // state: 25k @ 4% + 5k @ 6%
        assert!((w.state - 1_300.0).abs() < 0.01, "state was {}", w.state);
        assert!((w.social_security - 30_000.0 * 0.062).abs() < 0.01);
        assert!((w.medicare - 30_000.0 * 0.0145).abs() < 0.01);
        assert!((w.net - (30_000.0 - 5_000.0 - 1_300.0 - w.fica())).abs() < 0.01);
    }

    #[test]
    fn social_security_stops_at_wage_cap() {
        let s = schedules();
        let at_cap = s.gross_to_net(137_700.0, 0.0);
        let over_cap = s.gross_to_net(250_000.0, 0.0);
        assert!((at_cap.social_security - 137_700.0 * 0.062).abs() < 0.01);
        assert!((over_cap.social_security - at_cap.social_security).abs() < 0.01);
        // medicare surcharge applies above 200k
        let expected_medicare = 200_000.0 * 0.0145 + 50_000.0 * 0.0235;
        assert!((over_cap.medicare - expected_medicare).abs() < 0.01);
    }

    #[test]
    fn deductions_come_off_the_top() {
        let s = schedules();
        let with = s.gross_to_net(60_000.0, 19_500.0);
        let without = s.gross_to_net(40_500.0, 0.0);
        assert!((with.federal - without.federal).abs() < 0.01);
        assert!((with.net - without.net).abs() < 0.01);
        assert_eq!(with.taxable, 40_500.0);
    }

    #[test]
    fn net_to_gross_round_trips() {
        let s = schedules();
        for target in [20_000.0, 55_000.0, 150_000.0] {
            let gross = s.net_to_gross(target, 0.0).unwrap();
            let net = s.gross_to_net(gross, 0.0).net;
            assert!((net - target).abs() <= 1.0, "net {net} for target {target}");
        }
    }

    #[test]
    fn zero_taxable_withholds_nothing() {
        let w = schedules().gross_to_net(10_000.0, 15_000.0);
        assert_eq!(w.net, 0.0);
        assert_eq!(w.income_tax(), 0.0);
        assert_eq!(w.income_tax_rate(), 0.0);
    }
}
