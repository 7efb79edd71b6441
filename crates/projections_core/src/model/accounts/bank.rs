//! Checking and savings accounts.

use serde::{Deserialize, Serialize};

use crate::util::{monthly_growth_rate, round_cents};

/// A cash account with an annual interest rate compounded monthly.
///
/// The balance is split into `contributions` (money paid in) and `earnings`
/// (accrued interest) so interest income can be reported separately.
/// Withdrawals come out of contributions first.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BankAccount {
    pub balance: f64,
    pub contributions: f64,
    pub earnings: f64,
    /// Annual interest in whole percent.
    pub interest_rate: f64,
    pub kind: BankKind,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum BankKind {
    #[default]
    Checking,
    Savings,
}

impl BankAccount {
    /// Build from input, assuming the whole opening balance was paid in
    /// unless contributions are given.
    pub fn new(kind: BankKind, balance: f64, contributions: Option<f64>, interest_rate: f64) -> Self {
        let contributions = contributions.unwrap_or(balance);
        BankAccount {
            balance,
            contributions,
            earnings: balance - contributions,
            interest_rate,
            kind,
        }
    }

    pub fn deposit(&mut self, amount: f64) -> f64 {
        self.balance += amount;
        self.contributions += amount;
        amount
    }

    /// Take up to `amount` from the balance, contributions first.
    /// Returns the amount actually withdrawn.
    pub fn withdraw(&mut self, amount: f64) -> f64 {
        let taken = amount.min(self.balance);
        let from_contributions = taken.min(self.contributions);
        self.contributions -= from_contributions;
        self.earnings -= taken - from_contributions;
        self.balance -= taken;
        taken
    }

    /// End-of-month interest accrual. Returns the interest earned, which is
    /// taxable income for the year.
    pub fn accrue_interest(&mut self) -> f64 {
        let interest = round_cents(self.balance * monthly_growth_rate(self.interest_rate));
        self.earnings += interest;
        self.balance += interest;
        interest
    }
}
