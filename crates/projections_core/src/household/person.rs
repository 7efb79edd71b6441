//! One member of the household: date of birth plus their cash-flow streams.

use jiff::civil::Date;

use crate::config::{PersonInput, DEFAULT_AGE};
use crate::date_math::{years_before, years_between};
use crate::error::{ConfigError, ProjectionError};
use crate::household::income::{Income, PlanParams, Spending};
use crate::irs::withholding::WithholdingSchedules;
use crate::irs::ContributionLimits;
use crate::model::{Owner, Period};

#[derive(Debug, Clone, PartialEq)]
pub struct Person {
    pub owner: Owner,
    pub date_of_birth: Date,
    pub incomes: Vec<Income>,
    pub spendings: Vec<Spending>,
}

impl Person {
    /// Resolve a person's streams, joining each employer plan account to
    /// the income that funds it. A plan pointing at an income key nobody
    /// has is a configuration error.
    pub fn resolve(
        input: &PersonInput,
        owner: Owner,
        start: Date,
        schedules: &WithholdingSchedules,
        limits: &ContributionLimits,
        first_year: i16,
        last_year: i16,
    ) -> Result<Person, ProjectionError> {
        let reference_year = start.year();
        let date_of_birth =
            input.date_of_birth.unwrap_or_else(|| years_before(start, DEFAULT_AGE));

        let mut incomes = Vec::with_capacity(input.incomes.len());
        for income_input in &input.incomes {
            let plan = Self::plan_for_income(input, income_input.shadow_key.as_ref());
            incomes.push(Income::resolve(
                income_input,
                owner,
                plan,
                schedules,
                limits,
                reference_year,
                first_year,
                last_year,
            )?);
        }

        // a plan naming a missing income would silently never contribute
        for account in &input.investment_accounts {
            if let Some(key) = &account.plan_income_key {
                let found = input
                    .incomes
                    .iter()
                    .any(|i| i.shadow_key.as_ref() == Some(key));
                if !found {
                    return Err(ConfigError::UnknownEmployerPlan {
                        income: key.0.clone(),
                        account_key: account
                            .shadow_key
                            .as_ref()
                            .map(|k| k.0.clone())
                            .unwrap_or_default(),
                    }
                    .into());
                }
            }
        }

        let spendings = input
            .spendings
            .iter()
            .map(|s| Spending::resolve(s, owner, reference_year, first_year, last_year))
            .collect();

        Ok(Person { owner, date_of_birth, incomes, spendings })
    }

    fn plan_for_income(
        input: &PersonInput,
        income_key: Option<&crate::model::ShadowKey>,
    ) -> Option<PlanParams> {
        let income_key = income_key?;
        let account = input
            .investment_accounts
            .iter()
            .find(|a| a.plan_income_key.as_ref() == Some(income_key))?;
        Some(PlanParams {
            account_key: account.shadow_key.clone()?,
            contributing_max: account.plan_contributing_max,
            employer_contributing_max: account.plan_employer_contributing_max,
            contribution_amount: account.plan_contribution_amount,
            employer_match_amount: account.plan_employer_match_amount,
            contribution_rate: account.plan_contribution_rate,
        })
    }

    /// Age in fractional years at the start of a month.
    pub fn age(&self, period: Period) -> f64 {
        years_between(self.date_of_birth, period.first_day())
    }
}
