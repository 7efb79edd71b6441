//! Progressive bracket schedules.
//!
//! A schedule is a sorted list of `(upper bound, rate)` steps; the top step
//! carries `f64::INFINITY`. Looking up tax for an amount and scaling the
//! bounds for inflation are deliberately separate operations so callers
//! scale a schedule once per year and then query it freely.

use serde::{Deserialize, Serialize};

/// One step of a progressive schedule: `rate` applies to dollars up to
/// `upper` and above the previous step's bound.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BracketStep {
    pub upper: f64,
    pub rate: f64,
}

/// A sorted progressive schedule.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Brackets(pub Vec<BracketStep>);

impl Brackets {
    /// Build from `(upper, rate)` pairs. Rates are fractions, not percents.
    pub fn from_steps(steps: &[(f64, f64)]) -> Self {
        let mut v: Vec<BracketStep> =
            steps.iter().map(|&(upper, rate)| BracketStep { upper, rate }).collect();
        v.sort_by(|a, b| a.upper.total_cmp(&b.upper));
        Brackets(v)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Total progressive tax on `amount`.
    pub fn marginal_tax(&self, amount: f64) -> f64 {
        if amount <= 0.0 {
            return 0.0;
        }
        let mut tax = 0.0;
        let mut lower = 0.0;
        for step in &self.0 {
            if amount <= lower {
                break;
            }
            let taxed_here = amount.min(step.upper) - lower;
            tax += taxed_here * step.rate;
            lower = step.upper;
        }
        tax
    }

    /// Marginal rate at `amount`: the rate of the first step whose upper
    /// bound is at or above it.
    pub fn rate_at(&self, amount: f64) -> f64 {
        self.0
            .iter()
            .find(|step| step.upper >= amount)
            .map_or(0.0, |step| step.rate)
    }

    /// The same schedule with every finite bound grown by `inflation`
    /// (a fraction; `0.04` widens every bracket by 4%).
    pub fn scaled(&self, inflation: f64) -> Brackets {
        Brackets(
            self.0
                .iter()
                .map(|step| BracketStep {
                    upper: if step.upper.is_finite() {
                        step.upper * (1.0 + inflation)
                    } else {
                        step.upper
                    },
                    rate: step.rate,
                })
                .collect(),
        )
    }

    /// Finite bounds, for merging schedules into one threshold walk.
    pub fn bounds(&self) -> impl Iterator<Item = f64> + '_ {
        self.0.iter().map(|s| s.upper)
    }
}
