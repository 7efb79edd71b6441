//! Income and spending streams as the household carries them.
//!
//! An [`Income`] wraps the resolved gross-pay stream together with the
//! withholding worked out for it: effective income-tax and FICA rates on
//! salary, plus per-month tables of withheld tax and pre-tax retirement
//! contributions. Take-home amounts are grossed back up through the
//! withholding schedules before projection, so the engine always simulates
//! on gross pay.

use serde::Serialize;

use crate::config::{IncomeInput, SpendingInput};
use crate::error::ProjectionError;
use crate::irs::withholding::WithholdingSchedules;
use crate::irs::ContributionLimits;
use crate::model::{
    AccountId, IncomeKind, IncomeStreamInfo, Owner, ShadowKey, SpendingKind, SpendingStreamInfo,
    StreamItem, YearTable,
};
use crate::util::{dollars, RatePeriod};

// ============================================================================
// Employer plan linkage
// ============================================================================

/// Plan settings copied off the investment account that names this income
/// as its payroll funding source.
#[derive(Debug, Clone, PartialEq)]
pub struct PlanParams {
    /// Shadow key of the employer plan account the deductions land in.
    pub account_key: ShadowKey,
    pub contributing_max: bool,
    pub employer_contributing_max: bool,
    pub contribution_amount: f64,
    pub employer_match_amount: f64,
    pub contribution_rate: RatePeriod,
}

/// Pre-tax retirement deductions resolved for an income.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Deductions {
    pub annual_contribution: f64,
    pub annual_employer_match: f64,
    pub monthly_contribution: f64,
    pub monthly_employer_match: f64,
    /// Limit trouble spotted while resolving, surfaced with the stream info.
    pub warnings: Vec<String>,
}

impl Deductions {
    /// Resolve the plan settings against the year's 401k limits. Reported
    /// amounts over the limit are kept as-is but flagged; the monthly
    /// allocator enforces the caps while the simulation runs.
    fn resolve(plan: &PlanParams, limits: &ContributionLimits) -> Deductions {
        let mut warnings = Vec::new();

        let annual_contribution = if plan.contributing_max {
            limits.employee_401k
        } else {
            plan.contribution_rate.to_yearly(plan.contribution_amount)
        };
        let annual_employer_match = if plan.employer_contributing_max {
            limits.combined_401k - annual_contribution
        } else {
            plan.contribution_rate.to_yearly(plan.employer_match_amount)
        };

        if annual_contribution > limits.employee_401k {
            warnings.push(format!(
                "Warning: annual contribution of {} exceeds maximum of {}. The excess is moved \
                 to taxable income; you may need to ask your employer for an excess contribution \
                 correction.",
                dollars(annual_contribution),
                dollars(limits.employee_401k),
            ));
        }
        if annual_contribution + annual_employer_match > limits.combined_401k {
            warnings.push(format!(
                "Warning: combined contribution of {} exceeds maximum of {}. Employer matches \
                 stop once an excess is detected for the year.",
                dollars(annual_contribution + annual_employer_match),
                dollars(limits.combined_401k),
            ));
        }

        Deductions {
            annual_contribution,
            annual_employer_match,
            monthly_contribution: annual_contribution / 12.0,
            monthly_employer_match: annual_employer_match / 12.0,
            warnings,
        }
    }
}

// ============================================================================
// Income
// ============================================================================

/// A resolved income stream with its withholding tables.
#[derive(Debug, Clone, PartialEq)]
pub struct Income {
    pub owner: Owner,
    pub kind: IncomeKind,
    pub shadow_key: Option<ShadowKey>,
    /// Gross pay stream; the amount is per month at the start date.
    pub stream: StreamItem,
    /// Effective income-tax withholding rate on taxable gross, a fraction.
    pub income_tax_rate: f64,
    /// Effective FICA withholding rate on taxable gross, a fraction.
    pub fica_tax_rate: f64,
    pub net_monthly: f64,
    pub gross: YearTable,
    pub income_tax_withheld: YearTable,
    pub fica_withheld: YearTable,
    pub pre_tax_contributions: YearTable,
    pub deductions: Deductions,
    /// Set when an employer plan account funds itself from this paycheck.
    pub plan: Option<PlanParams>,
}

impl Income {
    /// Resolve an income input into a projected stream.
    ///
    /// Only salaries are withheld against; other income kinds land gross
    /// and are reconciled in the yearly tax pass.
    pub fn resolve(
        input: &IncomeInput,
        owner: Owner,
        plan: Option<PlanParams>,
        schedules: &WithholdingSchedules,
        limits: &ContributionLimits,
        reference_year: i16,
        first_year: i16,
        last_year: i16,
    ) -> Result<Income, ProjectionError> {
        let name = input
            .description
            .clone()
            .or_else(|| input.shadow_key.as_ref().map(|k| k.0.clone()))
            .unwrap_or_else(|| "income".to_string());
        let monthly = input.rate.to_monthly(input.amount);

        let deductions = match &plan {
            Some(p) => Deductions::resolve(p, limits),
            None => Deductions::default(),
        };

        let (gross_monthly, net_monthly, income_tax_rate, fica_tax_rate) =
            if input.kind == IncomeKind::Salary {
                Self::withhold(&name, monthly, input.is_take_home, &deductions, schedules)?
            } else {
                (monthly, monthly, 0.0, 0.0)
            };

        let stream = StreamItem::resolve(
            name,
            gross_monthly,
            input.start_date,
            input.end_date,
            input.resolved_inflation_rate(),
            input.is_present_value,
            reference_year,
        );
        let gross = stream.project(first_year, last_year);

        let mut income = Income {
            owner,
            kind: input.kind,
            shadow_key: input.shadow_key.clone(),
            stream,
            income_tax_rate,
            fica_tax_rate,
            net_monthly,
            gross,
            income_tax_withheld: YearTable::new(),
            fica_withheld: YearTable::new(),
            pre_tax_contributions: YearTable::new(),
            deductions,
            plan,
        };
        income.project_withholdings();
        Ok(income)
    }

    /// Annual withholding for a salary. Returns monthly gross, monthly net
    /// and the two effective rates.
    fn withhold(
        name: &str,
        monthly: f64,
        is_take_home: bool,
        deductions: &Deductions,
        schedules: &WithholdingSchedules,
    ) -> Result<(f64, f64, f64, f64), ProjectionError> {
        let d = deductions.annual_contribution;

        if is_take_home {
            let net_yearly = monthly * 12.0;
            let gross_yearly = schedules.net_to_gross(net_yearly, d).map_err(|source| {
                ProjectionError::Withholding { income: name.to_string(), source }
            })?;
            let w = schedules.gross_to_net(gross_yearly, d);
            return Ok((gross_yearly / 12.0, monthly, w.income_tax_rate(), w.fica_rate()));
        }

        let gross_yearly = monthly * 12.0;
        if gross_yearly < d {
            // deductions swallow the whole paycheck; nothing to withhold
            return Ok((monthly, monthly, 0.0, 0.0));
        }
        let w = schedules.gross_to_net(gross_yearly, d);
        Ok((monthly, w.net / 12.0, w.income_tax_rate(), w.fica_rate()))
    }

    /// Fill the monthly withholding tables from the projected gross pay.
    /// Months with no pay withhold nothing and make no plan contribution.
    fn project_withholdings(&mut self) {
        let monthly_contribution = self.deductions.monthly_contribution;
        let mut income_tax = YearTable::new();
        let mut fica = YearTable::new();
        let mut pre_tax = YearTable::new();

        for (year, months) in &self.gross.0 {
            for (i, gross_month) in months.iter().enumerate() {
                if *gross_month <= 0.0 {
                    continue;
                }
                let period = crate::model::Period::new(*year, (i + 1) as i8);
                let taxable_gross = gross_month - monthly_contribution;
                pre_tax.set(period, monthly_contribution);
                income_tax.set(period, self.income_tax_rate * taxable_gross);
                fica.set(period, self.fica_tax_rate * taxable_gross);
            }
        }

        self.income_tax_withheld = income_tax;
        self.fica_withheld = fica;
        self.pre_tax_contributions = pre_tax;
    }

    pub fn info(&self) -> IncomeStreamInfo {
        IncomeStreamInfo {
            name: self.stream.name.clone(),
            kind: self.kind,
            start: self.stream.start,
            end: self.stream.end,
            inflation_rate: self.stream.inflation_rate,
            income_tax_rate: self.income_tax_rate,
            fica_tax_rate: self.fica_tax_rate,
            gross_monthly: self.stream.amount_monthly,
            gross_yearly: self.stream.amount_monthly * 12.0,
            net_monthly: self.net_monthly,
            net_yearly: self.net_monthly * 12.0,
            notes: self.deductions.warnings.clone(),
        }
    }
}

// ============================================================================
// Spending
// ============================================================================

/// A resolved spending stream.
#[derive(Debug, Clone, PartialEq)]
pub struct Spending {
    pub owner: Owner,
    pub kind: SpendingKind,
    pub stream: StreamItem,
    pub table: YearTable,
    /// Debt account a scripted loan payment goes against.
    pub account_id: Option<AccountId>,
}

impl Spending {
    pub fn resolve(
        input: &SpendingInput,
        owner: Owner,
        reference_year: i16,
        first_year: i16,
        last_year: i16,
    ) -> Spending {
        let name = input
            .description
            .clone()
            .or_else(|| input.shadow_key.as_ref().map(|k| k.0.clone()))
            .unwrap_or_else(|| "spending".to_string());
        let stream = StreamItem::resolve(
            name,
            input.rate.to_monthly(input.amount),
            input.start_date,
            input.end_date,
            input.resolved_inflation_rate(),
            input.is_present_value,
            reference_year,
        );
        let table = stream.project(first_year, last_year);
        Spending { owner, kind: input.kind, stream, table, account_id: input.account_id }
    }

    pub fn info(&self) -> SpendingStreamInfo {
        SpendingStreamInfo {
            name: self.stream.name.clone(),
            kind: self.kind,
            start: self.stream.start,
            end: self.stream.end,
            inflation_rate: self.stream.inflation_rate,
            amount_monthly: self.stream.amount_monthly,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::irs::tables::FilingStatus;
    use crate::irs::Irs;
    use crate::model::Period;

    fn salary_input(amount: f64) -> IncomeInput {
        IncomeInput {
            kind: IncomeKind::Salary,
            amount,
            rate: RatePeriod::Annually,
            ..IncomeInput::default()
        }
    }

    fn setup() -> (WithholdingSchedules, ContributionLimits) {
        let irs = Irs::new(FilingStatus::Single, "NY", None, 2.0, 2025);
        (irs.withholding_schedules(), irs.contribution_limits(2025, 30.0, 0.0))
    }

    #[test]
    fn salary_withholding_produces_positive_rates() {
        let (schedules, limits) = setup();
        let income = Income::resolve(
            &salary_input(90_000.0),
            Owner::User,
            None,
            &schedules,
            &limits,
            2025,
            2024,
            2030,
        )
        .unwrap();

        assert!(income.income_tax_rate > 0.0);
        assert!(income.fica_tax_rate > 0.0);
        assert!(income.net_monthly < 90_000.0 / 12.0);

        let p = Period::new(2026, 5);
        let gross = income.gross.amount(p);
        let withheld = income.income_tax_withheld.amount(p);
        assert!((withheld - income.income_tax_rate * gross).abs() < 0.01);
    }

    #[test]
    fn take_home_amounts_gross_up() {
        let (schedules, limits) = setup();
        let mut input = salary_input(60_000.0);
        input.is_take_home = true;
        let income =
            Income::resolve(&input, Owner::User, None, &schedules, &limits, 2025, 2024, 2030)
                .unwrap();

        // grossed-up pay must exceed the stated take-home
        assert!(income.stream.amount_monthly > 5_000.0);
        assert!((income.net_monthly - 5_000.0).abs() < 0.01);

        // net of the grossed-up amount lands back on the take-home figure
        let w = schedules
            .gross_to_net(income.stream.amount_monthly * 12.0, 0.0);
        assert!((w.net - 60_000.0).abs() <= 1.0, "net was {}", w.net);
    }

    #[test]
    fn non_salary_income_is_not_withheld() {
        let (schedules, limits) = setup();
        let mut input = salary_input(1_000.0);
        input.kind = IncomeKind::Unemployment;
        input.rate = RatePeriod::Monthly;
        let income =
            Income::resolve(&input, Owner::User, None, &schedules, &limits, 2025, 2024, 2030)
                .unwrap();

        assert_eq!(income.income_tax_rate, 0.0);
        assert_eq!(income.fica_tax_rate, 0.0);
        assert_eq!(income.income_tax_withheld.amount(Period::new(2026, 2)), 0.0);
        assert!((income.net_monthly - 1_000.0).abs() < 0.01);
    }

    #[test]
    fn plan_deductions_fill_the_pre_tax_table() {
        let (schedules, limits) = setup();
        let plan = PlanParams {
            account_key: ShadowKey::from("wk-401k"),
            contributing_max: false,
            employer_contributing_max: false,
            contribution_amount: 500.0,
            employer_match_amount: 250.0,
            contribution_rate: RatePeriod::Monthly,
        };
        let income = Income::resolve(
            &salary_input(90_000.0),
            Owner::User,
            Some(plan),
            &schedules,
            &limits,
            2025,
            2024,
            2030,
        )
        .unwrap();

        assert!((income.deductions.annual_contribution - 6_000.0).abs() < 0.01);
        assert!((income.deductions.annual_employer_match - 3_000.0).abs() < 0.01);
        assert!(income.deductions.warnings.is_empty());
        let p = Period::new(2026, 7);
        assert!((income.pre_tax_contributions.amount(p) - 500.0).abs() < 0.01);

        // withholding applies to gross net of the contribution
        let taxable = income.gross.amount(p) - 500.0;
        let expected = income.income_tax_rate * taxable;
        assert!((income.income_tax_withheld.amount(p) - expected).abs() < 0.01);
    }

    #[test]
    fn over_limit_contributions_are_flagged_not_clamped() {
        let (schedules, limits) = setup();
        let plan = PlanParams {
            account_key: ShadowKey::from("wk-401k"),
            contributing_max: false,
            employer_contributing_max: false,
            contribution_amount: 3_000.0,
            employer_match_amount: 0.0,
            contribution_rate: RatePeriod::Monthly,
        };
        let income = Income::resolve(
            &salary_input(200_000.0),
            Owner::User,
            Some(plan),
            &schedules,
            &limits,
            2025,
            2024,
            2030,
        )
        .unwrap();

        assert!((income.deductions.annual_contribution - 36_000.0).abs() < 0.01);
        assert!(!income.deductions.warnings.is_empty());
    }
}
