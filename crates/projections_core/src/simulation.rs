//! The month-by-month projection loop.
//!
//! Each simulated month follows the same order: loan events fire, payroll
//! money moves into employer plans, income covers spending (falling back to
//! bank and then growth withdrawals), the debt waterfall runs, surplus cash
//! flows into IRAs and then taxable accounts, and every balance accrues a
//! month of growth. December settles the year's taxes and penalties, rolling
//! anything owed into January's spending.

use jiff::civil::Date;

use crate::config::{DebtPolicy, ProjectionInput};
use crate::error::ProjectionError;
use crate::household::Household;
use crate::model::{
    Action, Alert, Alerts, MonthlyAnalysis, MonthlyRecord, Period, Projection, ProjectionRecord,
    YearIncomeRecord, YearRecord, YearTaxSummary,
};
use crate::util::{dollars, round_cents};

/// Resolve the input into a household and simulate it month by month.
/// `start_date` defaults to today.
pub fn run_projections(input: &ProjectionInput) -> Result<Projection, ProjectionError> {
    let start = input.start_date.unwrap_or_else(|| jiff::Zoned::now().date());
    run_projections_from(input, start)
}

/// [`run_projections`] with an explicit start date.
pub fn run_projections_from(
    input: &ProjectionInput,
    start: Date,
) -> Result<Projection, ProjectionError> {
    let household = Household::new(input, start)?;
    let streams = household.stream_info();
    let accounts = household.account_info(household.start);

    let mut simulation = Simulation::new(household);
    simulation.run();

    Ok(Projection {
        generated_at: jiff::Zoned::now(),
        flags: simulation.household.flags.clone(),
        streams,
        accounts,
        record: simulation.record,
        alerts: simulation.alerts,
    })
}

pub struct Simulation {
    pub household: Household,
    pub record: ProjectionRecord,
    pub alerts: Alerts,
    start: Period,
    end: Period,
    stop: bool,
    last_month: Option<MonthlyRecord>,
}

impl Simulation {
    pub fn new(household: Household) -> Simulation {
        let start = household.start;
        let end = Period::new(start.year + household.flags.years, 12);
        Simulation {
            household,
            record: ProjectionRecord::new(),
            alerts: Alerts::default(),
            start,
            end,
            stop: false,
            last_month: None,
        }
    }

    fn year_record(&mut self, year: i16) -> &mut YearRecord {
        self.record.entry(year).or_insert_with(YearRecord::new)
    }

    /// Record the year before the run so callers can compare against it.
    fn set_previous_year(&mut self) {
        let year = self.start.year - 1;
        let income = YearIncomeRecord {
            ordinary: self.household.annual_income_for_income_tax(year),
            social_security: self.household.social_security_income.year_total(year),
        };
        self.year_record(year).income = income;
    }

    pub fn run(&mut self) {
        tracing::info!(
            start = %self.start.first_day(),
            years = self.household.flags.years,
            "running projection"
        );
        self.set_previous_year();
        self.household.yearly_account_reset(self.start);

        let mut period = self.start;
        while period <= self.end {
            self.run_month(period);
            if self.stop {
                tracing::warn!(year = period.year, month = period.month, "projection stopped");
                break;
            }
            period = period.next();
        }
    }

    fn run_month(&mut self, period: Period) {
        tracing::debug!(year = period.year, month = period.month, "simulating month");

        let start_snapshots = self
            .last_month
            .as_ref()
            .map(|m| m.snapshots.clone())
            .unwrap_or_else(|| self.household.account_snapshots(period));

        if period.month == 1 {
            self.household.yearly_account_reset(period);
        }

        let mut actions = self.household.run_events(period);

        // this month's projected cash flows
        let fica = self.household.fica_withheld.amount(period);
        let income_tax = self.household.income_tax_withheld.amount(period);
        let pre_tax = self.household.pre_tax_contributions.amount(period);
        let taxes_withheld = fica + income_tax;
        let gross_income = self.household.income_for_month(period);
        let loan_income = self.household.loan_income.amount(period);
        let additional_income = self.household.additional_income.amount(period);
        let budgeted_spending = self.household.spending_for_month(period);
        let total_spending = budgeted_spending + taxes_withheld + pre_tax;
        let total_income = gross_income + loan_income + additional_income;
        let shortfall = round_cents(total_spending - total_income);

        let plan = self.household.deposit_to_employer_plans(period);
        let (plan_contribution, employer_plan_contribution) = (plan.employee, plan.employer);
        for warning in plan.warnings {
            self.alerts.push(period, warning);
        }
        actions.extend(plan.actions);

        let mut deficit = 0.0;
        if shortfall < 0.0 {
            actions.push(self.household.deposit(-shortfall, period));
        } else if shortfall > 0.0 {
            let (withdrawn, bank_actions) = self.household.withdraw_from_bank(shortfall, period);
            actions.extend(bank_actions);
            let mut remaining = round_cents(shortfall - withdrawn);
            if remaining > 0.0 {
                remaining = self.meet_deficit(remaining, period, &mut actions);
            }
            if remaining > 0.0 {
                let mut notes = vec![
                    "Add additional assets if you are missing any".to_string(),
                    "You could try increasing your emergency fund".to_string(),
                ];
                if !self.household.flags.make_hardship_distributions {
                    notes.push(
                        "If you have retirement accounts, enable hardship distributions"
                            .to_string(),
                    );
                }
                self.alerts.push(period, Alert::severe("You could not pay your spending", notes));
                self.household.add_to_next_month_spending(period, remaining);
                self.stop = true;
                deficit = remaining;
            }
        }

        // debt waterfall
        let mut debt_paid = 0.0;
        let mut debt_minimum_needed = 0.0;
        let mut debt_avoid_interest_needed = 0.0;
        let mut surplus;
        match self.household.flags.debt_policy {
            DebtPolicy::Project => {
                let minimum = self.household.pay_minimum_debt(None, period);
                debt_minimum_needed = minimum.amount_needed;
                debt_paid += minimum.paid;
                if !minimum.paid_in_full {
                    self.alerts.push(
                        period,
                        Alert::warning(format!(
                            "You could not pay your minimum debt payments of {}.",
                            dollars(minimum.amount_needed)
                        )),
                    );
                }
                actions.extend(minimum.actions);

                surplus = self.surplus_available(period);
                if surplus > 0.0 {
                    let avoid = self.household.pay_debt_to_avoid_fees(Some(surplus), period);
                    debt_avoid_interest_needed = avoid.amount_needed;
                    debt_paid += avoid.paid;
                    surplus = round_cents(surplus - avoid.paid);
                    actions.extend(avoid.actions);
                }
            }
            DebtPolicy::ManualGoal => {
                let goal = self.household.flags.manual_debt_goal;
                let minimum = self.household.pay_minimum_debt(Some(goal), period);
                debt_minimum_needed = minimum.amount_needed;
                debt_paid += minimum.paid;
                if !minimum.paid_in_full {
                    self.alerts.push(
                        period,
                        Alert::warning(format!(
                            "You could not pay your minimum debt payments of {}.",
                            dollars(minimum.amount_needed)
                        )),
                    );
                }
                actions.extend(minimum.actions);

                surplus = self.surplus_available(period);
                let cap = (goal - debt_paid).min(surplus);
                if cap > 0.0 {
                    let avoid = self.household.pay_debt_to_avoid_fees(Some(cap), period);
                    debt_avoid_interest_needed = avoid.amount_needed;
                    debt_paid += avoid.paid;
                    surplus = round_cents(surplus - avoid.paid);
                    actions.extend(avoid.actions);
                }
                let cap = (goal - debt_paid).min(surplus);
                if cap > 0.0 {
                    let payoff = self.household.pay_all_debt(Some(cap), period);
                    debt_paid += payoff.paid;
                    surplus = round_cents(surplus - payoff.paid);
                    actions.extend(payoff.actions);
                }
                // no warning once the debt is gone, even if the goal went unmet
                if goal > debt_paid && self.household.minimum_debt_payment(period) > 0.0 {
                    self.alerts.push(
                        period,
                        Alert::warning(format!(
                            "You could not meet your debt payment goal of {}.",
                            dollars(goal)
                        )),
                    );
                }
            }
            DebtPolicy::ManualPay => {
                let manual = self.household.pay_manual_debt(period);
                debt_paid += manual.paid;
                if !manual.paid_in_full {
                    self.alerts.push(
                        period,
                        Alert::warning(format!(
                            "You could not pay your manual debt payment of {}.",
                            dollars(manual.amount_needed)
                        )),
                    );
                }
                actions.extend(manual.actions);
                surplus = self.surplus_available(period);
            }
        }

        // surplus allocation
        let mut invested = 0.0;
        if surplus > 0.0 {
            let retirement = self.household.deposit_into_retirement_accounts(surplus, period);
            for warning in retirement.warnings {
                self.alerts.push(period, warning);
            }
            invested += retirement.deposited;
            surplus = round_cents(surplus - retirement.deposited);
            actions.extend(retirement.actions);
        }
        if self.household.flags.debt_policy == DebtPolicy::Project
            && self.household.flags.loan_early_payoff
            && surplus > 0.0
        {
            let payoff = self.household.pay_all_debt(Some(surplus), period);
            debt_paid += payoff.paid;
            surplus = round_cents(surplus - payoff.paid);
            actions.extend(payoff.actions);
        }
        if surplus > 0.0 {
            let to_invest =
                round_cents(surplus * self.household.flags.percent_surplus_to_invest);
            if to_invest > 0.0 {
                let brokerage = self.household.deposit_into_brokerage_accounts(to_invest, period);
                for warning in brokerage.warnings {
                    self.alerts.push(period, warning);
                }
                invested += brokerage.deposited;
                actions.extend(brokerage.actions);
            }
        }

        self.household.grow_accounts(period);

        if period.is_december() {
            self.settle_year_end(period);
        }

        // record the month
        let end_snapshots = self.household.account_snapshots(period);
        let mut analysis = MonthlyAnalysis {
            contribution_limits: self.household.contribution_limits,
            ira_deposits_so_far: self.household.deposited,
            gross_income,
            loan_income,
            total_income,
            budgeted_spending,
            total_spending,
            pre_tax_contributions: pre_tax,
            income_tax_withheld: income_tax,
            fica_withheld: fica,
            taxes_withheld,
            debt_paid,
            invested,
            deficit,
            debt_minimum_needed,
            debt_avoid_interest_needed,
            plan_contribution,
            employer_plan_contribution,
            ..MonthlyAnalysis::default()
        };
        analysis.set_balances(&start_snapshots, &end_snapshots);

        let record = MonthlyRecord {
            actions,
            warnings: self.alerts.for_month(period),
            snapshots: end_snapshots,
            analysis,
        };
        self.year_record(period.year).months[period.month_index()] = Some(record.clone());
        self.last_month = Some(record);
    }

    /// Cover a spending deficit from growth accounts, then hardship money.
    /// Returns what is still unpaid.
    fn meet_deficit(&mut self, amount: f64, period: Period, actions: &mut Vec<Action>) -> f64 {
        let (withdrawn, growth_actions) =
            self.household.withdraw_from_growth_accounts(amount, period);
        if withdrawn > 0.0 {
            let sources: Vec<String> = growth_actions
                .iter()
                .filter_map(|action| match action {
                    Action::Distribution { from, .. } => Some(from.name.clone()),
                    _ => None,
                })
                .collect();
            self.alerts.push(
                period,
                Alert::warning(format!(
                    "Withdrew {} from {}",
                    dollars(withdrawn),
                    sources.join(", ")
                )),
            );
            actions.extend(growth_actions);
        }

        let mut remaining = round_cents(amount - withdrawn);
        if remaining > 0.0 && self.household.flags.make_hardship_distributions {
            let (hardship, hardship_actions) = self.household.hardship_withdrawal();
            if hardship > 0.0 {
                self.alerts.push(
                    period,
                    Alert::warning(format!(
                        "Withdrew {} as hardship withdrawal",
                        dollars(hardship)
                    )),
                );
                actions.extend(hardship_actions);
                remaining = round_cents(remaining - hardship);
            }
        }
        remaining
    }

    // ------------------------------------------------------------------
    // Year end
    // ------------------------------------------------------------------

    /// The year's taxable income once every account's interest, taxed
    /// distributions and realized gains are folded in.
    fn year_end_taxable_income(&self, period: Period) -> crate::irs::TaxableIncome {
        let mut income = self.household.taxable_income;
        for idx in self.household.open_indices(period) {
            income.ordinary += self.household.accounts[idx].annual.income;
            income.long_term_capital_gains += self.household.accounts[idx].annual.realized_gains;
        }
        income
    }

    fn year_taxes(&self, income: &crate::irs::TaxableIncome, period: Period) -> YearTaxSummary {
        let ages = self.household.filer_ages(period);
        let taxes = self.household.irs.income_tax(income, period.year, &ages);
        let withheld = self.household.income_tax_withheld.year_total(period.year);
        YearTaxSummary {
            taxes,
            withheld,
            tax_owed: round_cents((taxes.total - withheld).max(0.0)),
            tax_refund: round_cents((withheld - taxes.total).max(0.0)),
        }
    }

    /// December: commit the year's taxable income, file the return, and
    /// roll anything owed (plus penalties) into January's spending.
    fn settle_year_end(&mut self, period: Period) {
        let income = self.year_end_taxable_income(period);
        self.household.taxable_income = income;
        let summary = self.year_taxes(&income, period);

        if summary.tax_owed > 0.0 {
            let mut alert =
                Alert::notice(format!("You may owe taxes of about {}.", dollars(summary.tax_owed)));
            alert.notes =
                vec!["This amount was added to next January's spending".to_string()];
            self.alerts.push(period, alert);
            self.household.add_to_next_month_spending(period, summary.tax_owed);
        } else if summary.tax_refund > 0.0 {
            let mut alert = Alert::notice(format!(
                "You may get a tax refund of {}",
                dollars(summary.tax_refund)
            ));
            alert.notes = vec!["Refunds are not added back to the budget".to_string()];
            self.alerts.push(period, alert);
        }

        let record = self.year_record(period.year);
        record.taxes = Some(summary);
        record.income = YearIncomeRecord {
            ordinary: income.ordinary,
            social_security: income.social_security,
        };

        let penalty = self.household.penalties(period);
        if penalty > 0.0 {
            self.household.add_to_next_month_spending(period, penalty);
            self.alerts
                .push(period, Alert::warning(format!("You have a penalty of {}", dollars(penalty))));
        }
    }

    // ------------------------------------------------------------------
    // Surplus
    // ------------------------------------------------------------------

    /// Next month's bills less next month's income, floored at zero.
    /// One-off additional income is deliberately left out of the estimate.
    fn next_month_spending_prediction(&self, period: Period) -> f64 {
        let next = period.next();
        let spending = self.household.spending_for_month(next);
        let minimum_debt = self.household.minimum_debt_payment(next);
        let taxes = self.household.fica_withheld.amount(next)
            + self.household.income_tax_withheld.amount(next);
        let pre_tax = self.household.pre_tax_contributions.amount(next);
        let income = self.household.income_for_month(next);
        (spending + minimum_debt + taxes + pre_tax - income).max(0.0)
    }

    /// Bank money free after next month's prediction and the emergency
    /// fund. Loan proceeds received this month are earmarked, and December
    /// reserves the estimated tax bill and penalties.
    fn surplus_available(&self, period: Period) -> f64 {
        let mut surplus = self.household.bank_funds(period)
            - self.household.loan_income.amount(period)
            - self.next_month_spending_prediction(period)
            - self.household.flags.emergency_fund;
        if period.is_december() {
            let income = self.year_end_taxable_income(period);
            surplus -= self.year_taxes(&income, period).tax_owed;
            surplus -= self.household.penalties(period);
        }
        round_cents(surplus)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{
        BankAccountInput, CreditCardInput, FlagsInput, IncomeInput, PersonInput, SpendingInput,
    };
    use crate::model::{AlertLevel, BankKind, IncomeKind};
    use crate::util::RatePeriod;
    use jiff::civil::date;

    fn salary(amount_yearly: f64) -> IncomeInput {
        IncomeInput {
            kind: IncomeKind::Salary,
            amount: amount_yearly,
            rate: RatePeriod::Annually,
            ..IncomeInput::default()
        }
    }

    fn spending(amount_monthly: f64) -> SpendingInput {
        SpendingInput {
            amount: amount_monthly,
            rate: RatePeriod::Monthly,
            ..SpendingInput::default()
        }
    }

    fn checking(balance: f64) -> BankAccountInput {
        BankAccountInput { kind: BankKind::Checking, balance, ..BankAccountInput::default() }
    }

    fn run(input: &ProjectionInput) -> Projection {
        run_projections_from(input, date(2025, 1, 1)).unwrap()
    }

    #[test]
    fn a_balanced_household_runs_to_the_end() {
        let input = ProjectionInput {
            user: PersonInput {
                incomes: vec![salary(90_000.0)],
                spendings: vec![spending(2_000.0)],
                bank_accounts: vec![checking(20_000.0)],
                ..PersonInput::default()
            },
            flags: FlagsInput { years: Some(3), ..FlagsInput::default() },
            ..ProjectionInput::default()
        };
        let projection = run(&input);

        // 2024 (previous year) through 2028
        let last = projection.record.get(&2028).expect("final year recorded");
        assert!(last.months[11].is_some(), "December of the final year ran");
        assert!(last.taxes.is_some());
        assert!(
            !projection.alerts.all.iter().any(|a| a.level == AlertLevel::Severe),
            "alerts: {:?}",
            projection.alerts.all
        );
    }

    #[test]
    fn an_underwater_household_stops_with_a_severe_alert() {
        let input = ProjectionInput {
            user: PersonInput {
                spendings: vec![spending(3_000.0)],
                bank_accounts: vec![checking(5_000.0)],
                ..PersonInput::default()
            },
            flags: FlagsInput { years: Some(5), ..FlagsInput::default() },
            ..ProjectionInput::default()
        };
        let projection = run(&input);

        assert!(projection
            .alerts
            .all
            .iter()
            .any(|a| a.level == AlertLevel::Severe && a.message.contains("could not pay")));
        // the run stopped well short of five years
        assert!(projection.record.get(&2030).map_or(true, |y| y.months[11].is_none()));
    }

    #[test]
    fn surplus_pays_down_expensive_debt() {
        let input = ProjectionInput {
            user: PersonInput {
                incomes: vec![salary(120_000.0)],
                spendings: vec![spending(1_500.0)],
                bank_accounts: vec![checking(30_000.0)],
                credit: vec![CreditCardInput {
                    balance: 8_000.0,
                    apr: 24.0,
                    ..CreditCardInput::default()
                }],
                ..PersonInput::default()
            },
            flags: FlagsInput { years: Some(2), ..FlagsInput::default() },
            ..ProjectionInput::default()
        };
        let projection = run(&input);

        let december = projection.record[&2025].months[11].as_ref().unwrap();
        assert!(
            (december.analysis.total_debt).abs() < 0.01,
            "card balance remaining: {}",
            december.analysis.total_debt
        );
    }

    #[test]
    fn december_files_the_years_taxes() {
        let input = ProjectionInput {
            user: PersonInput {
                incomes: vec![salary(100_000.0)],
                spendings: vec![spending(2_000.0)],
                bank_accounts: vec![checking(15_000.0)],
                ..PersonInput::default()
            },
            flags: FlagsInput { years: Some(1), ..FlagsInput::default() },
            ..ProjectionInput::default()
        };
        let projection = run(&input);

        let year = &projection.record[&2025];
        let taxes = year.taxes.as_ref().expect("taxes filed in December");
        assert!(taxes.taxes.total > 0.0);
        assert!((year.income.ordinary - 100_000.0).abs() < 1_000.0);
        // withholding tracked the liability, so owed and refund stay small
        assert!(taxes.tax_owed == 0.0 || taxes.tax_refund == 0.0);
    }

    #[test]
    fn the_previous_year_is_recorded_for_comparison() {
        let input = ProjectionInput {
            user: PersonInput {
                incomes: vec![salary(60_000.0)],
                bank_accounts: vec![checking(10_000.0)],
                ..PersonInput::default()
            },
            flags: FlagsInput { years: Some(1), ..FlagsInput::default() },
            ..ProjectionInput::default()
        };
        let projection = run(&input);

        let previous = projection.record.get(&2024).expect("previous year present");
        assert!(previous.income.ordinary > 0.0);
        assert!(previous.months.iter().all(|m| m.is_none()));
    }

    #[test]
    fn monthly_records_balance_income_against_spending() {
        let input = ProjectionInput {
            user: PersonInput {
                incomes: vec![salary(90_000.0)],
                spendings: vec![spending(2_500.0)],
                bank_accounts: vec![checking(10_000.0)],
                ..PersonInput::default()
            },
            flags: FlagsInput { years: Some(1), ..FlagsInput::default() },
            ..ProjectionInput::default()
        };
        let projection = run(&input);

        let june = projection.record[&2025].months[5].as_ref().unwrap();
        assert!((june.analysis.gross_income - 7_500.0).abs() < 1.0);
        assert!(june.analysis.budgeted_spending > 2_500.0 - 1.0);
        assert!(
            june.analysis.total_spending
                > june.analysis.budgeted_spending + june.analysis.taxes_withheld - 0.01
        );
        assert_eq!(june.analysis.deficit, 0.0);
    }
}
