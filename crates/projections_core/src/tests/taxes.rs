//! Year-end tax behavior across filing status, bracket inflation and the
//! special income categories.

use crate::irs::tables::FilingStatus;
use crate::irs::{Irs, TaxableIncome};

fn single() -> Irs {
    Irs::new(FilingStatus::Single, "NY", None, 2.0, 2025)
}

fn married() -> Irs {
    Irs::new(FilingStatus::MarriedFilingJointly, "NY", None, 2.0, 2025)
}

fn ordinary(amount: f64) -> TaxableIncome {
    TaxableIncome { ordinary: amount, ..TaxableIncome::default() }
}

#[test]
fn bracket_inflation_lowers_tax_on_a_fixed_income() {
    let irs = single();
    let now = irs.federal_tax(120_000.0, 2025, &[40.0]);
    let later = irs.federal_tax(120_000.0, 2035, &[50.0]);
    assert!(
        later < now,
        "inflated brackets should tax a fixed income less: {later} vs {now}"
    );
}

#[test]
fn effective_rate_override_is_flat() {
    let irs = Irs::new(FilingStatus::Single, "NY", Some(20.0), 2.0, 2025);
    let deduction = irs.deduction(2025, &[40.0]);
    let tax = irs.federal_tax(100_000.0, 2025, &[40.0]);
    assert!((tax - (100_000.0 - deduction) * 0.20).abs() < 0.01);
}

#[test]
fn joint_filers_owe_less_federal_tax_on_the_same_income() {
    let tax_single = single().federal_tax(150_000.0, 2025, &[40.0]);
    let tax_married = married().federal_tax(150_000.0, 2025, &[40.0, 40.0]);
    assert!(tax_married < tax_single);
}

#[test]
fn seniors_get_a_larger_deduction() {
    let irs = single();
    assert!(irs.deduction(2025, &[66.0]) > irs.deduction(2025, &[40.0]));
    // the senior deduction is per qualifying filer
    let irs = married();
    let one = irs.deduction(2025, &[66.0, 40.0]);
    let two = irs.deduction(2025, &[66.0, 70.0]);
    assert!(two > one);
}

#[test]
fn social_security_taxability_tiers() {
    let irs = single();
    // low provisional income: benefits untouched
    assert_eq!(irs.social_security_taxable(20_000.0, 10_000.0), 0.0);
    // high provisional income: capped at 85% of benefits
    let taxable = irs.social_security_taxable(20_000.0, 200_000.0);
    assert!((taxable - 17_000.0).abs() < 0.01, "taxable was {taxable}");
    // middle tier sits strictly between
    let mid = irs.social_security_taxable(20_000.0, 25_000.0);
    assert!(mid > 0.0 && mid < 17_000.0, "mid-tier was {mid}");
}

#[test]
fn capital_gains_stack_on_ordinary_income() {
    let irs = single();
    let on_low_income = irs.capital_gains_tax(50_000.0, 20_000.0, 2025);
    let on_high_income = irs.capital_gains_tax(50_000.0, 500_000.0, 2025);
    assert!(
        on_high_income > on_low_income,
        "gains above a high income fill higher rate space: {on_high_income} vs {on_low_income}"
    );
    assert_eq!(irs.capital_gains_tax(0.0, 100_000.0, 2025), 0.0);
}

#[test]
fn the_bill_adds_every_component() {
    let irs = single();
    let income = TaxableIncome { long_term_capital_gains: 10_000.0, ..ordinary(90_000.0) };
    let bill = irs.income_tax(&income, 2025, &[40.0]);
    assert!(bill.federal > 0.0);
    assert!(bill.state > 0.0, "NY levies state income tax");
    assert!(bill.long_term_capital_gains > 0.0);
    let sum = bill.federal + bill.state + bill.local + bill.long_term_capital_gains;
    assert!((bill.total - sum).abs() < 0.01);
}

#[test]
fn roth_limit_phases_out_with_magi() {
    let irs = single();
    let full = irs.roth_limit(2025, 40.0, 0.0);
    assert!(full > 0.0);
    assert_eq!(irs.roth_limit(2025, 40.0, 1_000_000.0), 0.0);

    // somewhere inside the phase-out window the limit is partial
    let mut saw_partial = false;
    for magi in (120_000..180_000).step_by(5_000) {
        let limit = irs.roth_limit(2025, 40.0, magi as f64);
        if limit > 0.0 && limit < full {
            saw_partial = true;
        }
    }
    assert!(saw_partial, "no partial limit found in the phase-out window");
}

#[test]
fn catch_up_raises_the_ira_limit_at_fifty() {
    use crate::irs::tables;
    assert!(tables::ira_limit(2025, 55.0) > tables::ira_limit(2025, 40.0));
    assert!(tables::limit_401k_combined(2025) > tables::limit_401k_employee(2025));
}
