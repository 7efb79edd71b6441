//! Household accounts.
//!
//! [`Account`] wraps the four account flavors behind one identity: the id
//! and shadow key from the input, the owner, the open date, and the year's
//! running tax totals. Flavor-specific math lives in the kind modules; the
//! wrapper dispatches and rolls the tax-relevant outcomes into
//! [`AnnualActivity`], which the year-end tax pass reads and January resets.

mod bank;
mod debt;
mod investment;

pub use bank::{BankAccount, BankKind};
pub use debt::{CreditCard, DebtBalance, FixedRateLoan};
pub use investment::{
    GrowthOutcome, InvestmentAccount, InvestmentInput, InvestmentKind, WithdrawalOutcome,
    RETIREMENT_WITHDRAWAL_AGE,
};

use jiff::civil::Date;
use serde::{Deserialize, Serialize};

use crate::date_math::{months_between, years_between};
use crate::model::ids::{AccountId, Owner, ShadowKey};
use crate::model::Period;

/// Tax-relevant activity accumulated over a calendar year and reset each
/// January.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnnualActivity {
    /// Interest and taxed distributions, added to ordinary income.
    pub income: f64,
    /// Realized long-term capital gains.
    pub realized_gains: f64,
    pub deposited: f64,
    pub employer_deposited: f64,
    pub withdrawn: f64,
    /// Early withdrawals subject to the penalty.
    pub penalized: f64,
}

impl AnnualActivity {
    pub fn reset(&mut self) {
        *self = AnnualActivity::default();
    }
}

/// The four account flavors, tagged by kind in serialized form.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum AccountKind {
    Bank(BankAccount),
    Credit(CreditCard),
    Loan(FixedRateLoan),
    Investment(InvestmentAccount),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Account {
    pub id: AccountId,
    pub shadow_key: ShadowKey,
    pub owner: Owner,
    pub name: String,
    pub open_date: Date,
    pub annual: AnnualActivity,
    pub kind: AccountKind,
}

impl Account {
    /// Accounts open strictly after their open month. A loan dated in the
    /// future stays closed until the simulation reaches it.
    pub fn is_open(&self, period: Period) -> bool {
        (period.year, period.month) > (self.open_date.year(), self.open_date.month())
    }

    /// Account age in fractional years at the start of a month.
    pub fn age_years(&self, period: Period) -> f64 {
        years_between(self.open_date, period.first_day())
    }

    pub fn age_months(&self, period: Period) -> i32 {
        months_between(self.open_date, period.first_day())
    }

    pub fn balance(&self) -> f64 {
        match &self.kind {
            AccountKind::Bank(bank) => bank.balance,
            AccountKind::Credit(card) => card.debt.balance,
            AccountKind::Loan(loan) => loan.debt.balance,
            AccountKind::Investment(inv) => inv.balance,
        }
    }

    pub fn is_debt(&self) -> bool {
        matches!(self.kind, AccountKind::Credit(_) | AccountKind::Loan(_))
    }

    pub fn is_bank(&self) -> bool {
        matches!(self.kind, AccountKind::Bank(_))
    }

    pub fn is_investment(&self) -> bool {
        matches!(self.kind, AccountKind::Investment(_))
    }

    pub fn as_bank(&self) -> Option<&BankAccount> {
        match &self.kind {
            AccountKind::Bank(bank) => Some(bank),
            _ => None,
        }
    }

    pub fn as_bank_mut(&mut self) -> Option<&mut BankAccount> {
        match &mut self.kind {
            AccountKind::Bank(bank) => Some(bank),
            _ => None,
        }
    }

    pub fn as_investment(&self) -> Option<&InvestmentAccount> {
        match &self.kind {
            AccountKind::Investment(inv) => Some(inv),
            _ => None,
        }
    }

    pub fn as_investment_mut(&mut self) -> Option<&mut InvestmentAccount> {
        match &mut self.kind {
            AccountKind::Investment(inv) => Some(inv),
            _ => None,
        }
    }

    /// End-of-month growth or interest accrual, folded into the year's
    /// running totals.
    pub fn grow(&mut self, period: Period) {
        match &mut self.kind {
            AccountKind::Bank(bank) => {
                self.annual.income += bank.accrue_interest();
            }
            AccountKind::Credit(card) => {
                card.accrue(period);
            }
            AccountKind::Loan(loan) => {
                loan.accrue();
            }
            AccountKind::Investment(inv) => {
                let outcome = inv.grow();
                self.annual.income += outcome.interest_income;
                self.annual.realized_gains += outcome.realized_gains;
            }
        }
    }

    /// Withdraw from a bank or investment account. Returns the amount
    /// actually withdrawn; debt accounts give nothing.
    pub fn withdraw(&mut self, amount: f64, owner_age: f64, period: Period) -> f64 {
        let account_age = self.age_years(period);
        match &mut self.kind {
            AccountKind::Bank(bank) => {
                let taken = bank.withdraw(amount);
                self.annual.withdrawn += taken;
                taken
            }
            AccountKind::Investment(inv) => {
                let outcome = inv.withdraw(amount, owner_age, account_age);
                self.annual.withdrawn += outcome.amount;
                self.annual.income += outcome.taxable_income;
                self.annual.realized_gains += outcome.realized_gains;
                self.annual.penalized += outcome.penalized;
                outcome.amount
            }
            _ => 0.0,
        }
    }

    /// Deposit into a bank or investment account. Returns the amount
    /// deposited; debt accounts take nothing.
    pub fn deposit(&mut self, amount: f64) -> f64 {
        match &mut self.kind {
            AccountKind::Bank(bank) => {
                let deposited = bank.deposit(amount);
                self.annual.deposited += deposited;
                deposited
            }
            AccountKind::Investment(inv) => {
                let deposited = inv.deposit(amount, false);
                self.annual.deposited += deposited;
                deposited
            }
            _ => 0.0,
        }
    }

    /// Employer-side deposit into a retirement plan.
    pub fn employer_deposit(&mut self, amount: f64) -> f64 {
        match &mut self.kind {
            AccountKind::Investment(inv) => {
                let deposited = inv.deposit(amount, true);
                self.annual.employer_deposited += deposited;
                deposited
            }
            _ => 0.0,
        }
    }

    /// January reset of the year's tax totals.
    pub fn yearly_reset(&mut self) {
        self.annual.reset();
    }

    pub fn snapshot(&self, owner_age: f64) -> AccountSnapshot {
        let (category, contributions, earnings, accrued_interest, withdrawable) = match &self.kind {
            AccountKind::Bank(bank) => {
                (AccountCategory::Bank, bank.contributions, bank.earnings, 0.0, bank.balance)
            }
            AccountKind::Credit(card) => {
                (AccountCategory::Debt, 0.0, 0.0, card.debt.accrued_interest, 0.0)
            }
            AccountKind::Loan(loan) => {
                (AccountCategory::Debt, 0.0, 0.0, loan.debt.accrued_interest, 0.0)
            }
            AccountKind::Investment(inv) => (
                AccountCategory::Growth,
                inv.contributions,
                inv.earnings,
                0.0,
                inv.withdrawable_amount(owner_age),
            ),
        };
        AccountSnapshot {
            id: self.id,
            shadow_key: self.shadow_key.clone(),
            name: self.name.clone(),
            owner: self.owner,
            category,
            balance: self.balance(),
            contributions,
            earnings,
            accrued_interest,
            withdrawable,
        }
    }
}

/// Coarse account grouping used by records and month-end analysis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum AccountCategory {
    Bank,
    Debt,
    Growth,
}

/// Point-in-time view of an account for the monthly record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountSnapshot {
    pub id: AccountId,
    pub shadow_key: ShadowKey,
    pub name: String,
    pub owner: Owner,
    pub category: AccountCategory,
    pub balance: f64,
    pub contributions: f64,
    pub earnings: f64,
    pub accrued_interest: f64,
    /// What the account's withdrawal rules allow out right now.
    pub withdrawable: f64,
}
