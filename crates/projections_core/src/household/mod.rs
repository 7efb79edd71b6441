//! The household: people, accounts, projected cash flows and year state.
//!
//! [`Household`] is built once from the caller's input and then driven
//! month by month. Construction resolves every stream into projected
//! [`YearTable`]s (gross income, spending, withholding, pre-tax
//! contributions), turns each account input into an [`Account`], and picks
//! the main deposit account. The allocation routines live in the submodules:
//! banking, the debt waterfall, and investment deposits and withdrawals.

mod bank;
mod debt;
pub mod income;
mod investments;
mod person;

pub use debt::DebtPaymentOutcome;
pub use income::{Income, PlanParams, Spending};
pub use investments::{DepositOutcome, PlanContributionOutcome};
pub use person::Person;

use jiff::civil::Date;
use serde::Serialize;

use crate::config::{Flags, ProjectionInput};
use crate::date_math::years_before;
use crate::error::ProjectionError;
use crate::irs::{ContributionLimits, IraDeposits, Irs, TaxableIncome};
use crate::model::{
    Account, AccountId, AccountKind, AccountSnapshot, Action, BankAccount, CreditCard,
    FixedRateLoan, InvestmentAccount, InvestmentInput, Owner, Period, ShadowKey, StreamInfo,
    YearTable,
};

/// Money put into one person's employer plan this year.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlanDeposits {
    pub employee: f64,
    pub employer: f64,
}

fn owner_index(owner: Owner) -> usize {
    match owner {
        Owner::User => 0,
        Owner::Spouse => 1,
    }
}

pub struct Household {
    pub persons: Vec<Person>,
    pub accounts: Vec<Account>,
    pub flags: Flags,
    pub irs: Irs,
    pub start: Period,

    // combined projected tables
    pub spending: YearTable,
    pub medical_expenses: YearTable,
    /// All projected income streams, social security included.
    pub ordinary_income: YearTable,
    pub social_security_income: YearTable,
    /// One-off income added while the simulation runs (e.g. rolled refunds).
    pub additional_income: YearTable,
    /// Loan proceeds arriving as loans open.
    pub loan_income: YearTable,
    pub fica_withheld: YearTable,
    pub income_tax_withheld: YearTable,
    pub pre_tax_contributions: YearTable,

    // year state, reset each January
    pub taxable_income: TaxableIncome,
    pub contribution_limits: ContributionLimits,
    pub deposited: IraDeposits,
    pub plan_deposits: [PlanDeposits; 2],

    main_deposit: Option<usize>,
}

impl Household {
    pub fn new(input: &ProjectionInput, start: Date) -> Result<Household, ProjectionError> {
        let flags = input.flags.resolve(input.is_married());
        let reference_year = start.year();
        let irs = Irs::new(
            flags.filing_status,
            flags.state.clone(),
            flags.effective_tax_rate,
            flags.tax_inflation_rate,
            reference_year,
        );

        // one year before the run for already-running streams, one after for
        // December's next-month lookahead
        let first_year = reference_year - 1;
        let last_year = reference_year + flags.years + 1;

        let schedules = irs.withholding_schedules();
        let limits = irs.contribution_limits(reference_year, 0.0, 0.0);

        let mut persons = vec![Person::resolve(
            &input.user,
            Owner::User,
            start,
            &schedules,
            &limits,
            first_year,
            last_year,
        )?];
        if let Some(spouse) = &input.spouse {
            persons.push(Person::resolve(
                spouse,
                Owner::Spouse,
                start,
                &schedules,
                &limits,
                first_year,
                last_year,
            )?);
        }

        let accounts = build_accounts(input, start);

        let all_incomes = || persons.iter().flat_map(|p| p.incomes.iter());
        let all_spendings = || persons.iter().flat_map(|p| p.spendings.iter());

        let spending = YearTable::combined(
            all_spendings()
                .filter(|s| s.kind != crate::model::SpendingKind::LoanPay)
                .map(|s| &s.table),
        );
        let medical_expenses = YearTable::combined(
            all_spendings()
                .filter(|s| s.kind == crate::model::SpendingKind::Medical)
                .map(|s| &s.table),
        );
        let ordinary_income = YearTable::combined(all_incomes().map(|i| &i.gross));
        let social_security_income = YearTable::combined(
            all_incomes()
                .filter(|i| i.kind == crate::model::IncomeKind::SocialSecurity)
                .map(|i| &i.gross),
        );
        let fica_withheld = YearTable::combined(all_incomes().map(|i| &i.fica_withheld));
        let income_tax_withheld =
            YearTable::combined(all_incomes().map(|i| &i.income_tax_withheld));
        let pre_tax_contributions =
            YearTable::combined(all_incomes().map(|i| &i.pre_tax_contributions));

        let mut household = Household {
            persons,
            accounts,
            flags,
            irs,
            start: Period::from_date(start),
            spending,
            medical_expenses,
            ordinary_income,
            social_security_income,
            additional_income: YearTable::new(),
            loan_income: YearTable::new(),
            fica_withheld,
            income_tax_withheld,
            pre_tax_contributions,
            taxable_income: TaxableIncome::default(),
            contribution_limits: ContributionLimits::default(),
            deposited: IraDeposits::default(),
            plan_deposits: [PlanDeposits::default(); 2],
            main_deposit: None,
        };
        household.set_main_deposit_account();
        Ok(household)
    }

    // ------------------------------------------------------------------
    // People
    // ------------------------------------------------------------------

    pub fn owner_age(&self, owner: Owner, period: Period) -> f64 {
        self.persons
            .iter()
            .find(|p| p.owner == owner)
            .or(self.persons.first())
            .map_or(0.0, |p| p.age(period))
    }

    /// Ages of every filer, for the senior standard deduction.
    pub fn filer_ages(&self, period: Period) -> Vec<f64> {
        self.persons.iter().map(|p| p.age(period)).collect()
    }

    pub fn incomes(&self) -> impl Iterator<Item = &Income> {
        self.persons.iter().flat_map(|p| p.incomes.iter())
    }

    pub fn spendings(&self) -> impl Iterator<Item = &Spending> {
        self.persons.iter().flat_map(|p| p.spendings.iter())
    }

    // ------------------------------------------------------------------
    // Projected tables
    // ------------------------------------------------------------------

    pub fn income_for_month(&self, period: Period) -> f64 {
        self.ordinary_income.amount(period)
    }

    pub fn spending_for_month(&self, period: Period) -> f64 {
        self.spending.amount(period)
    }

    /// Ordinary income for a year, social security excluded.
    pub fn annual_income_for_income_tax(&self, year: i16) -> f64 {
        self.ordinary_income.year_total(year) - self.social_security_income.year_total(year)
    }

    pub fn add_to_next_month_spending(&mut self, period: Period, amount: f64) {
        self.spending.add(period.next(), amount);
    }

    pub fn add_to_next_month_additional_income(&mut self, period: Period, amount: f64) {
        self.additional_income.add(period.next(), amount);
    }

    pub fn add_to_taxable_ordinary_income(&mut self, amount: f64) {
        self.taxable_income.ordinary += amount;
    }

    // ------------------------------------------------------------------
    // Year boundary
    // ------------------------------------------------------------------

    /// January reset: rebase the year's taxable income on the projected
    /// streams, resolve this year's contribution limits, and clear every
    /// account's annual totals.
    pub fn yearly_account_reset(&mut self, period: Period) {
        self.taxable_income = TaxableIncome {
            ordinary: self.annual_income_for_income_tax(period.year),
            social_security: self.social_security_income.year_total(period.year),
            long_term_capital_gains: 0.0,
        };
        self.contribution_limits = self.resolve_contribution_limits(period);
        self.deposited = IraDeposits::default();
        self.plan_deposits = [PlanDeposits::default(); 2];
        for account in &mut self.accounts {
            account.yearly_reset();
        }
    }

    /// Roth and IRA ceilings summed across both filers; the 401k limits
    /// are per person.
    fn resolve_contribution_limits(&self, period: Period) -> ContributionLimits {
        use crate::irs::tables;

        let magi = self.irs.magi(&self.taxable_income);
        let mut roth = 0.0;
        let mut ira = 0.0;
        for person in &self.persons {
            let age = person.age(period);
            roth += self.irs.roth_limit(period.year, age, magi);
            ira += tables::ira_limit(period.year, age);
        }
        ContributionLimits {
            roth,
            ira,
            employee_401k: tables::limit_401k_employee(period.year),
            combined_401k: tables::limit_401k_combined(period.year),
        }
    }

    // ------------------------------------------------------------------
    // Events
    // ------------------------------------------------------------------

    /// Disburse any loan whose open month has arrived: the principal moves
    /// onto the loan balance and the proceeds land as loan income.
    pub fn run_events(&mut self, period: Period) -> Vec<Action> {
        let mut actions = Vec::new();
        for idx in 0..self.accounts.len() {
            let open = self.accounts[idx].is_open(period);
            if let AccountKind::Loan(loan) = &mut self.accounts[idx].kind {
                if open && !loan.disbursed {
                    let proceeds = loan.disburse();
                    self.loan_income.add(period, proceeds);
                    actions.push(Action::LoanDisbursement {
                        amount: proceeds,
                        from: self.snapshot_of(idx, period),
                    });
                }
            }
        }
        actions
    }

    // ------------------------------------------------------------------
    // Account access
    // ------------------------------------------------------------------

    pub fn snapshot_of(&self, idx: usize, period: Period) -> AccountSnapshot {
        let account = &self.accounts[idx];
        account.snapshot(self.owner_age(account.owner, period))
    }

    pub fn open_indices(&self, period: Period) -> Vec<usize> {
        (0..self.accounts.len())
            .filter(|&i| self.accounts[i].is_open(period))
            .collect()
    }

    /// Snapshots of every open account: banks, then investments, then debt.
    pub fn account_snapshots(&self, period: Period) -> Vec<AccountSnapshot> {
        let mut order: Vec<usize> = self.open_indices(period);
        order.sort_by_key(|&i| match self.accounts[i].kind {
            AccountKind::Bank(_) => 0,
            AccountKind::Investment(_) => 1,
            AccountKind::Credit(_) | AccountKind::Loan(_) => 2,
        });
        order.into_iter().map(|i| self.snapshot_of(i, period)).collect()
    }

    /// Snapshots of every account, open or not, for the run header.
    pub fn account_info(&self, period: Period) -> Vec<AccountSnapshot> {
        (0..self.accounts.len()).map(|i| self.snapshot_of(i, period)).collect()
    }

    pub fn stream_info(&self) -> StreamInfo {
        StreamInfo {
            income: self.incomes().map(|i| i.info()).collect(),
            spending: self.spendings().map(|s| s.info()).collect(),
        }
    }

    /// End-of-month accrual on every open account.
    pub fn grow_accounts(&mut self, period: Period) {
        for idx in 0..self.accounts.len() {
            if self.accounts[idx].is_open(period) {
                self.accounts[idx].grow(period);
            }
        }
    }

    pub(crate) fn main_deposit_index(&self) -> usize {
        // set during construction
        self.main_deposit.expect("main deposit account is set in Household::new")
    }

    fn set_main_deposit_account(&mut self) {
        let period = self.start;
        let mut open_banks: Vec<usize> = (0..self.accounts.len())
            .filter(|&i| self.accounts[i].is_bank() && self.accounts[i].is_open(period))
            .collect();

        if open_banks.is_empty() {
            // nowhere to put money; give the household a zero-balance checking
            let id = self.next_account_id();
            self.accounts.push(Account {
                id,
                shadow_key: ShadowKey::from("main-checking"),
                owner: Owner::User,
                name: "Checking".to_string(),
                open_date: years_before(period.first_day(), 1),
                annual: Default::default(),
                kind: AccountKind::Bank(BankAccount::new(
                    crate::model::BankKind::Checking,
                    0.0,
                    None,
                    0.0,
                )),
            });
            self.main_deposit = Some(self.accounts.len() - 1);
            return;
        }

        // best home for cash: highest rate, then largest balance
        open_banks.sort_by(|&a, &b| {
            let (ra, rb) = (
                self.accounts[a].as_bank().map_or(0.0, |b| b.interest_rate),
                self.accounts[b].as_bank().map_or(0.0, |b| b.interest_rate),
            );
            rb.total_cmp(&ra)
                .then(self.accounts[b].balance().total_cmp(&self.accounts[a].balance()))
        });
        self.main_deposit = Some(open_banks[0]);
    }

    fn next_account_id(&self) -> AccountId {
        AccountId(self.accounts.iter().map(|a| a.id.0).max().map_or(1, |m| m + 1))
    }
}

// ============================================================================
// Account construction
// ============================================================================

fn build_accounts(input: &ProjectionInput, start: Date) -> Vec<Account> {
    let mut accounts = Vec::new();
    let mut next_id = {
        let mut max = 0;
        for owner in [Owner::User, Owner::Spouse] {
            let Some(person) = input.person(owner) else { continue };
            let ids = person
                .bank_accounts
                .iter()
                .map(|a| a.account_id)
                .chain(person.investment_accounts.iter().map(|a| a.account_id))
                .chain(person.loans.iter().map(|a| a.account_id))
                .chain(person.credit.iter().map(|a| a.account_id));
            max = ids.flatten().map(|id| id.0).fold(max, u32::max);
        }
        max + 1
    };
    let mut assign_id = move |given: Option<AccountId>| {
        given.unwrap_or_else(|| {
            let id = AccountId(next_id);
            next_id += 1;
            id
        })
    };
    let default_open = years_before(start, 1);
    let already_open = |open: Date| (start.year(), start.month()) > (open.year(), open.month());

    for owner in [Owner::User, Owner::Spouse] {
        let Some(person) = input.person(owner) else { continue };

        for bank in &person.bank_accounts {
            let open_date = bank.open_date.unwrap_or(default_open);
            accounts.push(Account {
                id: assign_id(bank.account_id),
                shadow_key: bank.shadow_key.clone().unwrap_or(ShadowKey(String::new())),
                owner,
                name: bank.name.clone().unwrap_or_else(|| "Bank account".to_string()),
                open_date,
                annual: Default::default(),
                kind: AccountKind::Bank(BankAccount::new(
                    bank.kind,
                    bank.balance,
                    bank.contributions,
                    bank.interest_rate,
                )),
            });
        }

        for inv in &person.investment_accounts {
            let open_date = inv.open_date.unwrap_or(default_open);
            accounts.push(Account {
                id: assign_id(inv.account_id),
                shadow_key: inv.shadow_key.clone().unwrap_or(ShadowKey(String::new())),
                owner,
                name: inv.name.clone().unwrap_or_else(|| "Investment account".to_string()),
                open_date,
                annual: Default::default(),
                kind: AccountKind::Investment(InvestmentAccount::new(InvestmentInput {
                    kind: inv.kind,
                    balance: inv.balance,
                    contributions: inv.contributions,
                    stock_growth_rate: inv.growth_rate_stock,
                    bond_interest_rate: inv.interest_rate_bond,
                    percent_stocks: inv.percent_stocks,
                    stock_price: inv.latest_stock_price,
                    bond_price: inv.latest_bond_price,
                    avg_cost_basis: inv.avg_cost_basis,
                    contributing_max_allowed: inv.contributing_max_allowed,
                    contributing_max_amount: inv.contributing_max_amount,
                })),
            });
        }

        for loan in &person.loans {
            let open_date = loan.open_date.unwrap_or(default_open);
            accounts.push(Account {
                id: assign_id(loan.account_id),
                shadow_key: loan.shadow_key.clone().unwrap_or(ShadowKey(String::new())),
                owner,
                name: loan.name.clone().unwrap_or_else(|| "Loan".to_string()),
                open_date,
                annual: Default::default(),
                kind: AccountKind::Loan(FixedRateLoan::new(
                    loan.principal,
                    loan.interest_rate,
                    loan.term_in_months,
                    loan.balance,
                    already_open(open_date),
                )),
            });
        }

        for card in &person.credit {
            let open_date = card.open_date.unwrap_or(default_open);
            accounts.push(Account {
                id: assign_id(card.account_id),
                shadow_key: card.shadow_key.clone().unwrap_or(ShadowKey(String::new())),
                owner,
                name: card.name.clone().unwrap_or_else(|| "Credit card".to_string()),
                open_date,
                annual: Default::default(),
                kind: AccountKind::Credit(CreditCard::new(
                    card.balance,
                    card.apr,
                    card.promo_apr,
                    card.apr_start_date.unwrap_or(start),
                    card.credit_limit,
                    card.minimum_payment_percentage,
                )),
            });
        }
    }
    accounts
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{
        BankAccountInput, IncomeInput, LoanInput, PersonInput, SpendingInput,
    };
    use crate::model::{BankKind, IncomeKind};
    use crate::util::RatePeriod;
    use jiff::civil::date;

    fn basic_input() -> ProjectionInput {
        ProjectionInput {
            user: PersonInput {
                incomes: vec![IncomeInput {
                    kind: IncomeKind::Salary,
                    amount: 90_000.0,
                    rate: RatePeriod::Annually,
                    ..IncomeInput::default()
                }],
                spendings: vec![SpendingInput {
                    amount: 2_500.0,
                    rate: RatePeriod::Monthly,
                    ..SpendingInput::default()
                }],
                bank_accounts: vec![
                    BankAccountInput {
                        kind: BankKind::Checking,
                        balance: 4_000.0,
                        ..BankAccountInput::default()
                    },
                    BankAccountInput {
                        kind: BankKind::Savings,
                        balance: 12_000.0,
                        interest_rate: 4.0,
                        ..BankAccountInput::default()
                    },
                ],
                ..PersonInput::default()
            },
            ..ProjectionInput::default()
        }
    }

    #[test]
    fn main_deposit_prefers_the_highest_rate() {
        let household = Household::new(&basic_input(), date(2025, 1, 1)).unwrap();
        let idx = household.main_deposit_index();
        let bank = household.accounts[idx].as_bank().unwrap();
        assert_eq!(bank.interest_rate, 4.0);
    }

    #[test]
    fn empty_household_gets_a_checking_account() {
        let household =
            Household::new(&ProjectionInput::default(), date(2025, 1, 1)).unwrap();
        let idx = household.main_deposit_index();
        let account = &household.accounts[idx];
        assert!(account.is_bank());
        assert!(account.is_open(household.start));
        assert_eq!(account.balance(), 0.0);
    }

    #[test]
    fn yearly_reset_rebases_taxable_income() {
        let mut household = Household::new(&basic_input(), date(2025, 1, 1)).unwrap();
        household.yearly_account_reset(Period::new(2025, 1));
        // salary projects 7.5k/month
        assert!((household.taxable_income.ordinary - 90_000.0).abs() < 1.0);
        assert_eq!(household.taxable_income.long_term_capital_gains, 0.0);
        assert!(household.contribution_limits.roth > 0.0);
        assert_eq!(household.deposited, IraDeposits::default());
    }

    #[test]
    fn future_loans_disburse_when_they_open() {
        let mut input = basic_input();
        input.user.loans.push(LoanInput {
            principal: 10_000.0,
            interest_rate: 6.0,
            term_in_months: 36,
            open_date: Some(date(2025, 6, 1)),
            ..LoanInput::default()
        });
        let mut household = Household::new(&input, date(2025, 1, 1)).unwrap();

        assert!(household.run_events(Period::new(2025, 5)).is_empty());
        let actions = household.run_events(Period::new(2025, 7));
        assert_eq!(actions.len(), 1);
        assert!((actions[0].amount() - 10_000.0).abs() < 0.01);
        assert!((household.loan_income.amount(Period::new(2025, 7)) - 10_000.0).abs() < 0.01);
        // second pass is a no-op
        assert!(household.run_events(Period::new(2025, 8)).is_empty());
    }

    #[test]
    fn next_month_spending_rolls_across_the_year_boundary() {
        let mut household = Household::new(&basic_input(), date(2025, 1, 1)).unwrap();
        let before = household.spending.amount(Period::new(2026, 1));
        household.add_to_next_month_spending(Period::new(2025, 12), 750.0);
        let after = household.spending.amount(Period::new(2026, 1));
        assert!((after - before - 750.0).abs() < 0.01);
    }
}
