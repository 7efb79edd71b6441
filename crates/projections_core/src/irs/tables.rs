//! Embedded federal, state and payroll tax data.
//!
//! Values are static configuration, keyed by tax year and filing status.
//! Full tables are carried for 2020 and 2024; a lookup for any other year
//! clamps to the nearest carried year. Simulated future years reuse the
//! latest table with bracket bounds inflated by the caller (see
//! [`crate::irs::Irs`]), which is why the raw tables never extrapolate.

use serde::{Deserialize, Serialize};

use crate::irs::brackets::Brackets;

/// Federal filing status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum FilingStatus {
    #[default]
    Single,
    MarriedFilingJointly,
    MarriedFilingSeparately,
    HeadOfHousehold,
}

impl FilingStatus {
    pub fn is_married(self) -> bool {
        matches!(
            self,
            FilingStatus::MarriedFilingJointly | FilingStatus::MarriedFilingSeparately
        )
    }
}

/// Payroll tax parameters for one year.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FicaRates {
    pub social_security_rate: f64,
    pub social_security_wage_cap: f64,
    pub medicare_rate: f64,
    pub medicare_surcharge_threshold: f64,
    /// Combined medicare rate above the surcharge threshold.
    pub medicare_surcharge_rate: f64,
}

const INF: f64 = f64::INFINITY;

/// Carried tax years, ascending.
const YEARS: [i16; 2] = [2020, 2024];

fn clamp_year(year: i16) -> i16 {
    let mut best = YEARS[0];
    for &y in &YEARS {
        if (year - y).abs() < (year - best).abs() {
            best = y;
        }
    }
    best
}

// ============================================================================
// Federal income tax
// ============================================================================

pub fn federal_brackets(year: i16, status: FilingStatus) -> Brackets {
    use FilingStatus::*;
    let steps: &[(f64, f64)] = match (clamp_year(year), status) {
        (2020, Single) => &[
            (9_875.0, 0.10),
            (40_125.0, 0.12),
            (85_525.0, 0.22),
            (163_300.0, 0.24),
            (207_350.0, 0.32),
            (518_400.0, 0.35),
            (INF, 0.37),
        ],
        (2020, MarriedFilingJointly) => &[
            (19_750.0, 0.10),
            (80_250.0, 0.12),
            (171_050.0, 0.22),
            (326_600.0, 0.24),
            (414_700.0, 0.32),
            (622_050.0, 0.35),
            (INF, 0.37),
        ],
        (2020, MarriedFilingSeparately) => &[
            (9_875.0, 0.10),
            (40_125.0, 0.12),
            (85_525.0, 0.22),
            (163_300.0, 0.24),
            (207_350.0, 0.32),
            (311_025.0, 0.35),
            (INF, 0.37),
        ],
        (2020, HeadOfHousehold) => &[
            (14_100.0, 0.10),
            (53_700.0, 0.12),
            (85_500.0, 0.22),
            (163_300.0, 0.24),
            (207_350.0, 0.32),
            (518_400.0, 0.35),
            (INF, 0.37),
        ],
        (_, Single) => &[
            (11_600.0, 0.10),
            (47_150.0, 0.12),
            (100_525.0, 0.22),
            (191_950.0, 0.24),
            (243_725.0, 0.32),
            (609_350.0, 0.35),
            (INF, 0.37),
        ],
        (_, MarriedFilingJointly) => &[
            (23_200.0, 0.10),
            (94_300.0, 0.12),
            (201_050.0, 0.22),
            (383_900.0, 0.24),
            (487_450.0, 0.32),
            (731_200.0, 0.35),
            (INF, 0.37),
        ],
        (_, MarriedFilingSeparately) => &[
            (11_600.0, 0.10),
            (47_150.0, 0.12),
            (100_525.0, 0.22),
            (191_950.0, 0.24),
            (243_725.0, 0.32),
            (365_600.0, 0.35),
            (INF, 0.37),
        ],
        (_, HeadOfHousehold) => &[
            (16_550.0, 0.10),
            (63_100.0, 0.12),
            (100_500.0, 0.22),
            (191_950.0, 0.24),
            (243_700.0, 0.32),
            (609_350.0, 0.35),
            (INF, 0.37),
        ],
    };
    Brackets::from_steps(steps)
}

pub fn standard_deduction(year: i16, status: FilingStatus) -> f64 {
    use FilingStatus::*;
    match (clamp_year(year), status) {
        (2020, Single) | (2020, MarriedFilingSeparately) => 12_400.0,
        (2020, MarriedFilingJointly) => 24_800.0,
        (2020, HeadOfHousehold) => 18_650.0,
        (_, Single) | (_, MarriedFilingSeparately) => 14_600.0,
        (_, MarriedFilingJointly) => 29_200.0,
        (_, HeadOfHousehold) => 21_900.0,
    }
}

/// Additional standard deduction for a filer aged 65 or over.
pub fn senior_deduction(year: i16, status: FilingStatus) -> f64 {
    match (clamp_year(year), status.is_married()) {
        (2020, false) => 1_650.0,
        (2020, true) => 1_300.0,
        (_, false) => 1_950.0,
        (_, true) => 1_550.0,
    }
}

// ============================================================================
// Payroll (FICA)
// ============================================================================

pub fn fica_rates(year: i16) -> FicaRates {
    let social_security_wage_cap = match clamp_year(year) {
        2020 => 137_700.0,
        _ => 168_600.0,
    };
    FicaRates {
        social_security_rate: 0.062,
        social_security_wage_cap,
        medicare_rate: 0.0145,
        medicare_surcharge_threshold: 200_000.0,
        medicare_surcharge_rate: 0.0235,
    }
}

// ============================================================================
// Long-term capital gains
// ============================================================================

pub fn ltcg_brackets(year: i16, status: FilingStatus) -> Brackets {
    use FilingStatus::*;
    let steps: &[(f64, f64)] = match (clamp_year(year), status) {
        (2020, Single) | (2020, MarriedFilingSeparately) => {
            &[(40_000.0, 0.0), (441_450.0, 0.15), (INF, 0.20)]
        }
        (2020, MarriedFilingJointly) => &[(80_000.0, 0.0), (496_600.0, 0.15), (INF, 0.20)],
        (2020, HeadOfHousehold) => &[(53_600.0, 0.0), (469_050.0, 0.15), (INF, 0.20)],
        (_, Single) => &[(47_025.0, 0.0), (518_900.0, 0.15), (INF, 0.20)],
        (_, MarriedFilingSeparately) => &[(47_025.0, 0.0), (291_850.0, 0.15), (INF, 0.20)],
        (_, MarriedFilingJointly) => &[(94_050.0, 0.0), (583_750.0, 0.15), (INF, 0.20)],
        (_, HeadOfHousehold) => &[(63_000.0, 0.0), (551_350.0, 0.15), (INF, 0.20)],
    };
    Brackets::from_steps(steps)
}

// ============================================================================
// State and local income tax
// ============================================================================

pub fn state_brackets(state: &str, status: FilingStatus) -> Brackets {
    let married = status.is_married();
    let steps: &[(f64, f64)] = match (state, married) {
        ("NY", false) => &[
            (8_500.0, 0.04),
            (11_700.0, 0.045),
            (13_900.0, 0.0525),
            (21_400.0, 0.059),
            (80_650.0, 0.0609),
            (215_400.0, 0.0641),
            (1_077_550.0, 0.0685),
            (INF, 0.0882),
        ],
        ("NY", true) => &[
            (17_150.0, 0.04),
            (23_600.0, 0.045),
            (27_900.0, 0.0525),
            (43_000.0, 0.059),
            (161_550.0, 0.0609),
            (323_200.0, 0.0641),
            (2_155_350.0, 0.0685),
            (INF, 0.0882),
        ],
        ("CA", false) => &[
            (8_932.0, 0.01),
            (21_175.0, 0.02),
            (33_421.0, 0.04),
            (46_394.0, 0.06),
            (58_634.0, 0.08),
            (299_508.0, 0.093),
            (359_407.0, 0.103),
            (599_012.0, 0.113),
            (INF, 0.123),
        ],
        ("CA", true) => &[
            (17_864.0, 0.01),
            (42_350.0, 0.02),
            (66_842.0, 0.04),
            (92_788.0, 0.06),
            (117_268.0, 0.08),
            (599_016.0, 0.093),
            (718_814.0, 0.103),
            (1_198_024.0, 0.113),
            (INF, 0.123),
        ],
        // States with no table contribute no state income tax
        _ => &[],
    };
    Brackets::from_steps(steps)
}

pub fn state_standard_deduction(state: &str, status: FilingStatus) -> f64 {
    use FilingStatus::*;
    match (state, status) {
        ("NY", Single) | ("NY", MarriedFilingSeparately) => 8_000.0,
        ("NY", MarriedFilingJointly) => 16_050.0,
        ("NY", HeadOfHousehold) => 11_200.0,
        ("CA", Single) | ("CA", MarriedFilingSeparately) => 4_601.0,
        ("CA", MarriedFilingJointly) | ("CA", HeadOfHousehold) => 9_202.0,
        _ => 0.0,
    }
}

/// Local income tax schedule. New York City is the only carried locality;
/// households outside NY have no local tax.
pub fn local_brackets(state: &str, status: FilingStatus) -> Brackets {
    let steps: &[(f64, f64)] = match (state, status.is_married()) {
        ("NY", false) => {
            &[(12_000.0, 0.03078), (25_000.0, 0.03762), (50_000.0, 0.03819), (INF, 0.03876)]
        }
        ("NY", true) => {
            &[(21_600.0, 0.03078), (45_000.0, 0.03762), (90_000.0, 0.03819), (INF, 0.03876)]
        }
        _ => &[],
    };
    Brackets::from_steps(steps)
}

// ============================================================================
// Contribution limits
// ============================================================================

pub fn ira_limit(year: i16, age: f64) -> f64 {
    match (clamp_year(year), age < 50.0) {
        (2020, true) => 6_000.0,
        (2020, false) => 7_000.0,
        (_, true) => 7_000.0,
        (_, false) => 8_000.0,
    }
}

pub fn limit_401k_employee(year: i16) -> f64 {
    match clamp_year(year) {
        2020 => 19_500.0,
        _ => 23_000.0,
    }
}

/// Cap on employee plus employer contributions per person.
pub fn limit_401k_combined(year: i16) -> f64 {
    match clamp_year(year) {
        2020 => 57_000.0,
        _ => 69_000.0,
    }
}

/// MAGI bounds of the Roth IRA phase-out: full limit below the first bound,
/// nothing at or above the second.
pub fn roth_phase_out(year: i16, status: FilingStatus) -> (f64, f64) {
    use FilingStatus::*;
    match (clamp_year(year), status) {
        (_, MarriedFilingSeparately) => (0.0, 10_000.0),
        (2020, MarriedFilingJointly) => (196_000.0, 206_000.0),
        (2020, _) => (124_000.0, 139_000.0),
        (_, MarriedFilingJointly) => (230_000.0, 240_000.0),
        (_, _) => (146_000.0, 161_000.0),
    }
}

pub fn hsa_limit(year: i16, status: FilingStatus) -> f64 {
    match (clamp_year(year), status.is_married()) {
        (2020, false) => 3_550.0,
        (2020, true) => 7_100.0,
        (_, false) => 4_150.0,
        (_, true) => 8_300.0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn year_lookup_clamps_to_nearest() {
        assert_eq!(clamp_year(2018), 2020);
        assert_eq!(clamp_year(2021), 2020);
        assert_eq!(clamp_year(2023), 2024);
        assert_eq!(clamp_year(2040), 2024);
    }

    #[test]
    fn federal_top_bracket_is_open_ended() {
        for status in [
            FilingStatus::Single,
            FilingStatus::MarriedFilingJointly,
            FilingStatus::MarriedFilingSeparately,
            FilingStatus::HeadOfHousehold,
        ] {
            let b = federal_brackets(2020, status);
            assert!(b.0.last().unwrap().upper.is_infinite());
            assert_eq!(b.0.last().unwrap().rate, 0.37);
        }
    }

    #[test]
    fn unknown_state_has_no_tax() {
        assert!(state_brackets("TX", FilingStatus::Single).is_empty());
        assert_eq!(state_standard_deduction("TX", FilingStatus::Single), 0.0);
        assert!(local_brackets("CA", FilingStatus::Single).is_empty());
    }

    #[test]
    fn ira_limit_rises_at_fifty() {
        assert_eq!(ira_limit(2020, 35.0), 6_000.0);
        assert_eq!(ira_limit(2020, 50.0), 7_000.0);
    }
}
