//! Investment allocation: payroll plan deposits, IRA limit tracking,
//! surplus deposits and deficit withdrawals.

use super::{owner_index, Household};
use crate::irs::IraDeposits;
use crate::model::{Action, Alert, InvestmentKind, Owner, Period};
use crate::util::{dollars, round_cents};

/// Fraction of a penalized early withdrawal owed at year end.
const EARLY_WITHDRAWAL_PENALTY_RATE: f64 = 0.10;

/// Money moved into investment accounts by one allocation pass.
#[derive(Debug, Default)]
pub struct DepositOutcome {
    pub deposited: f64,
    pub actions: Vec<Action>,
    pub warnings: Vec<Alert>,
}

/// Payroll money that reached employer plans this month.
#[derive(Debug, Default)]
pub struct PlanContributionOutcome {
    pub employee: f64,
    pub employer: f64,
    pub actions: Vec<Action>,
    pub warnings: Vec<Alert>,
}

impl Household {
    fn investment_rates(&self, idx: usize) -> (f64, f64) {
        self.accounts[idx]
            .as_investment()
            .map_or((0.0, 0.0), |inv| (inv.bond_interest_rate, inv.stock_growth_rate))
    }

    // ------------------------------------------------------------------
    // Orderings
    // ------------------------------------------------------------------

    /// IRAs the household can fund directly: Roth before traditional, then
    /// highest bond rate, then highest stock growth.
    pub fn retirement_deposit_order(&self, period: Period) -> Vec<usize> {
        let mut order: Vec<usize> = self
            .open_indices(period)
            .into_iter()
            .filter(|&i| {
                self.accounts[i]
                    .as_investment()
                    .is_some_and(|inv| inv.kind.is_individual_plan())
            })
            .collect();
        order.sort_by(|&a, &b| {
            let rank = |i: usize| match self.accounts[i].as_investment().map(|inv| inv.kind) {
                Some(InvestmentKind::RothIra) => 0,
                _ => 1,
            };
            let (a_bond, a_growth) = self.investment_rates(a);
            let (b_bond, b_growth) = self.investment_rates(b);
            rank(a)
                .cmp(&rank(b))
                .then(b_bond.total_cmp(&a_bond))
                .then(b_growth.total_cmp(&a_growth))
        });
        order
    }

    /// Taxable accounts for surplus cash, highest bond rate then highest
    /// stock growth.
    pub fn taxable_deposit_order(&self, period: Period) -> Vec<usize> {
        let mut order: Vec<usize> = self
            .open_indices(period)
            .into_iter()
            .filter(|&i| {
                self.accounts[i].as_investment().is_some_and(|inv| inv.kind.is_taxable())
            })
            .collect();
        order.sort_by(|&a, &b| {
            let (a_bond, a_growth) = self.investment_rates(a);
            let (b_bond, b_growth) = self.investment_rates(b);
            b_bond.total_cmp(&a_bond).then(b_growth.total_cmp(&a_growth))
        });
        order
    }

    /// Accounts to liquidate for a deficit, slowest growers first within
    /// each priority band.
    pub fn withdrawal_order(&self, period: Period) -> Vec<usize> {
        let mut order: Vec<(usize, u8)> = self
            .open_indices(period)
            .into_iter()
            .filter_map(|i| {
                let age = self.owner_age(self.accounts[i].owner, period);
                let priority = self.accounts[i].as_investment()?.withdraw_priority(age)?;
                Some((i, priority))
            })
            .collect();
        order.sort_by(|&(a, a_priority), &(b, b_priority)| {
            let (a_bond, a_growth) = self.investment_rates(a);
            let (b_bond, b_growth) = self.investment_rates(b);
            a_priority
                .cmp(&b_priority)
                .then(a_growth.total_cmp(&b_growth))
                .then(a_bond.total_cmp(&b_bond))
        });
        order.into_iter().map(|(i, _)| i).collect()
    }

    // ------------------------------------------------------------------
    // IRA capacity
    // ------------------------------------------------------------------

    fn roth_capacity(&self, deposited: &IraDeposits) -> f64 {
        if self.contribution_limits.ira > deposited.total()
            && self.contribution_limits.roth > deposited.roth
        {
            self.contribution_limits.roth - deposited.roth
        } else {
            0.0
        }
    }

    fn traditional_capacity(&self, deposited: &IraDeposits) -> f64 {
        (self.contribution_limits.ira - deposited.total()).max(0.0)
    }

    fn ira_capacity(&self, kind: InvestmentKind, deposited: &IraDeposits) -> f64 {
        match kind {
            InvestmentKind::RothIra => self.roth_capacity(deposited),
            _ => self.traditional_capacity(deposited),
        }
    }

    // ------------------------------------------------------------------
    // Employer plans
    // ------------------------------------------------------------------

    /// Route this month's payroll deductions into each income's employer
    /// plan, employee money first and the match behind it.
    pub fn deposit_to_employer_plans(&mut self, period: Period) -> PlanContributionOutcome {
        let open = self.open_indices(period);
        let flows: Vec<(Owner, usize, f64, f64)> = self
            .incomes()
            .filter(|income| income.gross.amount(period) > 0.0)
            .filter_map(|income| {
                let plan = income.plan.as_ref()?;
                let account = open.iter().copied().find(|&i| {
                    self.accounts[i].is_investment()
                        && self.accounts[i].shadow_key == plan.account_key
                })?;
                Some((
                    income.owner,
                    account,
                    income.deductions.monthly_contribution,
                    income.deductions.monthly_employer_match,
                ))
            })
            .collect();

        let mut outcome = PlanContributionOutcome::default();
        for (owner, account, contribution, employer_match) in flows {
            self.pretax_contribution(owner, account, contribution, period, &mut outcome);
            self.employer_match_contribution(owner, account, employer_match, period, &mut outcome);
        }
        outcome
    }

    fn pretax_contribution(
        &mut self,
        owner: Owner,
        idx: usize,
        monthly: f64,
        period: Period,
        outcome: &mut PlanContributionOutcome,
    ) {
        if monthly <= 0.0 {
            return;
        }
        let person = owner_index(owner);
        let contributed = self.plan_deposits[person].employee;
        let matched = self.plan_deposits[person].employer;
        let limits = self.contribution_limits;
        let mut excess = 0.0;

        if contributed >= limits.employee_401k || contributed + matched >= limits.combined_401k {
            outcome.warnings.push(Alert::warning(
                "401k Contribution exceeds yearly maximum allowed, excess deposited to your account and added as taxable income",
            ));
            excess = monthly;
        } else {
            let amount = (limits.employee_401k - contributed).min(monthly);
            let deposited = self.accounts[idx].deposit(round_cents(amount));
            self.plan_deposits[person].employee += deposited;
            outcome.employee += deposited;
            outcome.actions.push(Action::Contribution {
                amount: deposited,
                to: self.snapshot_of(idx, period),
            });
            if monthly > amount {
                excess = monthly - amount;
                let mut alert = Alert::warning("401k contribution exceeds yearly maximum allowed");
                alert.notes = vec![
                    format!("You reported {}.", dollars(monthly)),
                    format!(
                        "Contribution decreased to {} and excess deposited to your account and added as taxable income",
                        dollars(amount)
                    ),
                ];
                outcome.warnings.push(alert);
            }
        }

        if excess > 0.0 {
            outcome.actions.push(self.plan_excess_to_income(round_cents(excess), period));
        }
    }

    /// Refused plan money lands in the bank and is taxed as wages.
    fn plan_excess_to_income(&mut self, excess: f64, period: Period) -> Action {
        self.add_to_taxable_ordinary_income(excess);
        self.deposit(excess, period)
    }

    fn employer_match_contribution(
        &mut self,
        owner: Owner,
        idx: usize,
        monthly: f64,
        period: Period,
        outcome: &mut PlanContributionOutcome,
    ) {
        if monthly <= 0.0 {
            return;
        }
        let person = owner_index(owner);
        let contributed = self.plan_deposits[person].employee;
        let matched = self.plan_deposits[person].employer;
        let combined = self.contribution_limits.combined_401k;

        if contributed + matched >= combined {
            let mut alert =
                Alert::warning("Employer match exceeds maximum combined contribution");
            alert.notes =
                vec![format!("Your reported employer match of {} was not deposited.", dollars(monthly))];
            outcome.warnings.push(alert);
            return;
        }

        let amount = (combined - (contributed + matched)).min(monthly);
        let deposited = self.accounts[idx].employer_deposit(round_cents(amount));
        self.plan_deposits[person].employer += deposited;
        outcome.employer += deposited;
        outcome.actions.push(Action::EmployerContribution {
            amount: deposited,
            to: self.snapshot_of(idx, period),
        });
        if amount < monthly {
            let mut alert =
                Alert::warning("Employer match exceeds maximum combined contribution");
            alert.notes = vec![format!(
                "Your reported employer match of {} was decreased to {}.",
                dollars(monthly),
                dollars(amount)
            )];
            outcome.warnings.push(alert);
        }
    }

    // ------------------------------------------------------------------
    // Deposit ceilings
    // ------------------------------------------------------------------

    /// How much the ordered taxable accounts will take, `None` for
    /// unlimited.
    fn max_brokerage_deposit(&self, order: &[usize]) -> Option<f64> {
        let mut total = 0.0;
        for &idx in order {
            let Some(inv) = self.accounts[idx].as_investment() else { continue };
            // only a configured ceiling limits the account
            if inv.contributing_max_allowed || inv.contributing_max_amount <= 0.0 {
                return None;
            }
            total += (inv.contributing_max_amount - self.accounts[idx].annual.deposited).max(0.0);
        }
        Some(total)
    }

    /// How much the ordered IRAs can take, walking the yearly limits as if
    /// the deposits had been made.
    fn max_ira_deposit(&self, order: &[usize]) -> f64 {
        let mut planned = self.deposited;
        let mut total = 0.0;
        for &idx in order {
            let Some(inv) = self.accounts[idx].as_investment() else { continue };
            let capacity = self.ira_capacity(inv.kind, &planned);
            let remaining_reported =
                (inv.contributing_max_amount - self.accounts[idx].annual.deposited).max(0.0);
            let amount = if inv.contributing_max_allowed {
                capacity
            } else if inv.contributing_max_amount > 0.0 {
                capacity.min(remaining_reported)
            } else {
                0.0
            };
            match inv.kind {
                InvestmentKind::RothIra => planned.roth += amount,
                _ => planned.traditional += amount,
            }
            total += amount;
        }
        total
    }

    // ------------------------------------------------------------------
    // Deposits and withdrawals
    // ------------------------------------------------------------------

    /// Spread `amount` across the ordered accounts, honoring the IRA
    /// limits and each account's reported contribution cap.
    pub fn make_deposit(&mut self, amount: f64, order: &[usize], period: Period) -> DepositOutcome {
        let mut outcome = DepositOutcome::default();
        let mut remaining = round_cents(amount);
        for &idx in order {
            if remaining <= 0.0 {
                break;
            }
            let Some(inv) = self.accounts[idx].as_investment() else { continue };
            let (kind, max_allowed, max_amount) =
                (inv.kind, inv.contributing_max_allowed, inv.contributing_max_amount);

            let limit = if kind.is_individual_plan() {
                let capacity = self.ira_capacity(kind, &self.deposited);
                if max_allowed {
                    Some(capacity)
                } else if max_amount > 0.0 {
                    if max_amount > capacity {
                        let mut alert = Alert::warning(
                            "Reported contributions exceeds maximum.  You may need to adjust your contributions",
                        );
                        alert.notes = vec![format!(
                            "You reported contributing {} which exceeds the limit of {}. Your contribution was lowered to meet the maximum.",
                            dollars(max_amount),
                            dollars(capacity)
                        )];
                        outcome.warnings.push(alert);
                    }
                    Some(capacity.min(max_amount))
                } else {
                    Some(0.0)
                }
            } else {
                None
            };

            let to_deposit = match limit {
                Some(limit) => limit.min(remaining),
                None => remaining,
            };
            if to_deposit <= 0.0 {
                continue;
            }
            let deposited = self.accounts[idx].deposit(round_cents(to_deposit));
            if deposited <= 0.0 {
                continue;
            }
            match kind {
                InvestmentKind::RothIra => self.deposited.roth += deposited,
                InvestmentKind::TraditionalIra => self.deposited.traditional += deposited,
                _ => {}
            }
            remaining = round_cents(remaining - deposited);
            outcome.deposited = round_cents(outcome.deposited + deposited);
            outcome.actions.push(Action::Contribution {
                amount: deposited,
                to: self.snapshot_of(idx, period),
            });
        }
        outcome
    }

    /// Liquidate growth accounts toward `amount`, respecting each
    /// account's withdrawal rules. Returns what came out.
    pub fn withdraw_from_growth_accounts(
        &mut self,
        amount: f64,
        period: Period,
    ) -> (f64, Vec<Action>) {
        let order = self.withdrawal_order(period);
        let mut remaining = round_cents(amount);
        let mut actions = Vec::new();
        for idx in order {
            if remaining <= 0.0 {
                break;
            }
            let owner_age = self.owner_age(self.accounts[idx].owner, period);
            let cap = self.accounts[idx]
                .as_investment()
                .map_or(0.0, |inv| inv.withdrawable_amount(owner_age));
            let to_take = remaining.min(cap);
            if to_take <= 0.0 {
                continue;
            }
            let taken = self.accounts[idx].withdraw(round_cents(to_take), owner_age, period);
            if taken <= 0.0 {
                continue;
            }
            remaining = round_cents(remaining - taken);
            actions.push(Action::Distribution {
                amount: taken,
                from: self.snapshot_of(idx, period),
            });
        }
        (round_cents(amount) - remaining, actions)
    }

    /// Move surplus cash from the bank into taxable accounts.
    pub fn deposit_into_brokerage_accounts(&mut self, amount: f64, period: Period) -> DepositOutcome {
        let order = self.taxable_deposit_order(period);
        let available = self.bank_funds(period).min(amount);
        let to_withdraw = match self.max_brokerage_deposit(&order) {
            None => available,
            Some(max) => max.min(available),
        };
        if to_withdraw <= 0.0 {
            return DepositOutcome::default();
        }
        let (withdrawn, mut actions) = self.withdraw_from_bank(round_cents(to_withdraw), period);
        let mut outcome = self.make_deposit(withdrawn, &order, period);
        actions.append(&mut outcome.actions);
        outcome.actions = actions;
        outcome
    }

    /// Move surplus cash from the bank into IRAs, up to this year's
    /// remaining limits.
    pub fn deposit_into_retirement_accounts(
        &mut self,
        amount: f64,
        period: Period,
    ) -> DepositOutcome {
        let order = self.retirement_deposit_order(period);
        let available = self.bank_funds(period).min(amount);
        let to_withdraw = self.max_ira_deposit(&order).min(available);
        if to_withdraw <= 0.0 {
            return DepositOutcome::default();
        }
        let (withdrawn, mut actions) = self.withdraw_from_bank(round_cents(to_withdraw), period);
        let mut outcome = self.make_deposit(withdrawn, &order, period);
        actions.append(&mut outcome.actions);
        outcome.actions = actions;
        outcome
    }

    /// Locked plans do not release hardship money in this model.
    pub fn hardship_withdrawal(&mut self) -> (f64, Vec<Action>) {
        (0.0, Vec::new())
    }

    /// Early-withdrawal penalty owed on this year's penalized amounts.
    pub fn penalties(&self, period: Period) -> f64 {
        round_cents(
            self.open_indices(period)
                .into_iter()
                .map(|i| self.accounts[i].annual.penalized)
                .filter(|penalized| *penalized > 0.0)
                .map(|penalized| penalized * EARLY_WITHDRAWAL_PENALTY_RATE)
                .sum(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{
        BankAccountInput, IncomeInput, InvestmentAccountInput, PersonInput, ProjectionInput,
    };
    use crate::irs::ContributionLimits;
    use crate::model::{BankKind, IncomeKind, ShadowKey};
    use crate::util::RatePeriod;
    use jiff::civil::date;

    fn investment(kind: InvestmentKind, balance: f64) -> InvestmentAccountInput {
        InvestmentAccountInput { kind, balance, ..InvestmentAccountInput::default() }
    }

    fn household_with_accounts(accounts: Vec<InvestmentAccountInput>) -> Household {
        let input = ProjectionInput {
            user: PersonInput {
                bank_accounts: vec![BankAccountInput {
                    kind: BankKind::Checking,
                    balance: 50_000.0,
                    ..BankAccountInput::default()
                }],
                investment_accounts: accounts,
                ..PersonInput::default()
            },
            ..ProjectionInput::default()
        };
        let mut household = Household::new(&input, date(2025, 1, 1)).unwrap();
        household.yearly_account_reset(Period::new(2025, 1));
        household
    }

    #[test]
    fn roth_ira_is_funded_before_traditional() {
        let household = household_with_accounts(vec![
            investment(InvestmentKind::TraditionalIra, 1_000.0),
            investment(InvestmentKind::RothIra, 1_000.0),
        ]);
        let order = household.retirement_deposit_order(Period::new(2025, 6));
        let kinds: Vec<InvestmentKind> = order
            .iter()
            .map(|&i| household.accounts[i].as_investment().unwrap().kind)
            .collect();
        assert_eq!(kinds, vec![InvestmentKind::RothIra, InvestmentKind::TraditionalIra]);
    }

    #[test]
    fn ira_deposits_stop_at_the_yearly_limit() {
        let mut roth = investment(InvestmentKind::RothIra, 0.0);
        roth.contributing_max_allowed = true;
        let mut household = household_with_accounts(vec![roth]);
        household.contribution_limits =
            ContributionLimits { roth: 7_000.0, ira: 7_000.0, ..ContributionLimits::default() };

        let p = Period::new(2025, 6);
        let outcome = household.deposit_into_retirement_accounts(20_000.0, p);
        assert!((outcome.deposited - 7_000.0).abs() < 0.01);
        assert!((household.deposited.roth - 7_000.0).abs() < 0.01);

        // the limit is used up, a second pass deposits nothing
        let again = household.deposit_into_retirement_accounts(20_000.0, p);
        assert_eq!(again.deposited, 0.0);
    }

    #[test]
    fn brokerage_deposits_are_capped_by_bank_funds() {
        let mut brokerage = investment(InvestmentKind::Brokerage, 0.0);
        brokerage.contributing_max_allowed = true;
        let mut household = household_with_accounts(vec![brokerage]);

        let p = Period::new(2025, 6);
        let outcome = household.deposit_into_brokerage_accounts(80_000.0, p);
        assert!((outcome.deposited - 50_000.0).abs() < 0.01);
        assert!((household.bank_funds(p) - 0.0).abs() < 0.01);
    }

    #[test]
    fn an_unconfigured_brokerage_takes_every_dollar_offered() {
        let mut household =
            household_with_accounts(vec![investment(InvestmentKind::Brokerage, 0.0)]);

        let p = Period::new(2025, 6);
        let outcome = household.deposit_into_brokerage_accounts(2_000.0, p);
        assert!((outcome.deposited - 2_000.0).abs() < 0.01);
    }

    #[test]
    fn a_configured_ceiling_caps_the_brokerage_deposit() {
        let mut brokerage = investment(InvestmentKind::Brokerage, 0.0);
        brokerage.contributing_max_amount = 1_000.0;
        let mut household = household_with_accounts(vec![brokerage]);

        let p = Period::new(2025, 6);
        let outcome = household.deposit_into_brokerage_accounts(2_000.0, p);
        assert!((outcome.deposited - 1_000.0).abs() < 0.01);
    }

    #[test]
    fn growth_withdrawals_respect_account_rules() {
        let mut household = household_with_accounts(vec![
            investment(InvestmentKind::Plan401k, 30_000.0),
            investment(InvestmentKind::Brokerage, 5_000.0),
        ]);

        // owner defaults to age 25; the plan is locked, only the brokerage
        // can cover the deficit
        let p = Period::new(2025, 6);
        let (withdrawn, actions) = household.withdraw_from_growth_accounts(10_000.0, p);
        assert!((withdrawn - 5_000.0).abs() < 0.01);
        assert_eq!(actions.len(), 1);
    }

    #[test]
    fn plan_contributions_route_payroll_money_to_the_plan() {
        let input = ProjectionInput {
            user: PersonInput {
                incomes: vec![IncomeInput {
                    shadow_key: Some(ShadowKey::from("job")),
                    kind: IncomeKind::Salary,
                    amount: 120_000.0,
                    rate: RatePeriod::Annually,
                    ..IncomeInput::default()
                }],
                bank_accounts: vec![BankAccountInput {
                    kind: BankKind::Checking,
                    balance: 10_000.0,
                    ..BankAccountInput::default()
                }],
                investment_accounts: vec![InvestmentAccountInput {
                    kind: InvestmentKind::Plan401k,
                    shadow_key: Some(ShadowKey::from("job-401k")),
                    plan_income_key: Some(ShadowKey::from("job")),
                    plan_contribution_amount: 500.0,
                    plan_employer_match_amount: 250.0,
                    plan_contribution_rate: RatePeriod::Monthly,
                    ..InvestmentAccountInput::default()
                }],
                ..PersonInput::default()
            },
            ..ProjectionInput::default()
        };
        let mut household = Household::new(&input, date(2025, 1, 1)).unwrap();
        household.yearly_account_reset(Period::new(2025, 1));

        let p = Period::new(2025, 6);
        let outcome = household.deposit_to_employer_plans(p);
        assert!((outcome.employee - 500.0).abs() < 0.01);
        assert!((outcome.employer - 250.0).abs() < 0.01);
        assert!(outcome.warnings.is_empty(), "warnings: {:?}", outcome.warnings);

        let plan_balance: f64 = household
            .accounts
            .iter()
            .filter(|a| a.is_investment())
            .map(|a| a.balance())
            .sum();
        assert!((plan_balance - 750.0).abs() < 0.01);
    }

    #[test]
    fn excess_plan_contributions_become_taxable_income() {
        let input = ProjectionInput {
            user: PersonInput {
                incomes: vec![IncomeInput {
                    shadow_key: Some(ShadowKey::from("job")),
                    kind: IncomeKind::Salary,
                    amount: 400_000.0,
                    rate: RatePeriod::Annually,
                    ..IncomeInput::default()
                }],
                investment_accounts: vec![InvestmentAccountInput {
                    kind: InvestmentKind::Plan401k,
                    shadow_key: Some(ShadowKey::from("job-401k")),
                    plan_income_key: Some(ShadowKey::from("job")),
                    plan_contribution_amount: 4_000.0,
                    plan_contribution_rate: RatePeriod::Monthly,
                    ..InvestmentAccountInput::default()
                }],
                ..PersonInput::default()
            },
            ..ProjectionInput::default()
        };
        let mut household = Household::new(&input, date(2025, 1, 1)).unwrap();
        household.yearly_account_reset(Period::new(2025, 1));
        let limit = household.contribution_limits.employee_401k;

        // burn through the employee limit
        let mut month = Period::new(2025, 1);
        let mut contributed = 0.0;
        for _ in 0..12 {
            let outcome = household.deposit_to_employer_plans(month);
            contributed += outcome.employee;
            month = month.next();
        }
        assert!((contributed - limit).abs() < 0.01, "contributed {contributed}");

        // the over-limit months flagged the excess and taxed it
        let ordinary = household.taxable_income.ordinary;
        assert!(ordinary > household.annual_income_for_income_tax(2025));
    }

    #[test]
    fn penalties_charge_ten_percent_of_penalized_withdrawals() {
        let mut household =
            household_with_accounts(vec![investment(InvestmentKind::TraditionalIra, 20_000.0)]);
        let p = Period::new(2025, 6);
        // force an early distribution straight through the account
        let owner_age = household.owner_age(crate::model::Owner::User, p);
        let idx = household
            .open_indices(p)
            .into_iter()
            .find(|&i| household.accounts[i].is_investment())
            .unwrap();
        household.accounts[idx].withdraw(5_000.0, owner_age, p);
        assert!((household.penalties(p) - 500.0).abs() < 0.01);
    }
}
