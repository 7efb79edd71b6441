//! Ledger entries describing what the engine did to an account in a month.

use serde::{Deserialize, Serialize};

use crate::model::accounts::AccountSnapshot;

/// Why a debt payment was made.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum DebtPaymentKind {
    /// Required minimum on a credit card.
    MinimumCredit,
    /// Fixed monthly payment on an amortized loan.
    FixedRateLoan,
    /// Extra payment knocking out balance that would keep collecting
    /// interest.
    AvoidInterest,
    /// Surplus thrown at remaining balances.
    Payoff,
    /// Scripted by a caller-provided payment stream.
    Manual,
}

/// One movement of money, recorded in the monthly ledger.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum Action {
    /// Money into a bank account.
    Deposit { amount: f64, to: AccountSnapshot },
    /// Money out of a bank account.
    Withdrawal { amount: f64, from: AccountSnapshot },
    /// Money into an investment account.
    Contribution { amount: f64, to: AccountSnapshot },
    /// Money out of an investment account.
    Distribution { amount: f64, from: AccountSnapshot },
    /// Employer money into a retirement plan.
    EmployerContribution { amount: f64, to: AccountSnapshot },
    /// Payment against a debt balance.
    DebtPayment {
        kind: DebtPaymentKind,
        amount: f64,
        to: AccountSnapshot,
    },
    /// Draw against a credit line to cover a shortfall.
    Borrow { amount: f64, from: AccountSnapshot },
    /// Loan proceeds arriving when a loan opens.
    LoanDisbursement { amount: f64, from: AccountSnapshot },
}

impl Action {
    pub fn amount(&self) -> f64 {
        match self {
            Action::Deposit { amount, .. }
            | Action::Withdrawal { amount, .. }
            | Action::Contribution { amount, .. }
            | Action::Distribution { amount, .. }
            | Action::EmployerContribution { amount, .. }
            | Action::DebtPayment { amount, .. }
            | Action::Borrow { amount, .. }
            | Action::LoanDisbursement { amount, .. } => *amount,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::accounts::{Account, AccountKind, AnnualActivity, BankAccount, BankKind};
    use crate::model::ids::{AccountId, Owner, ShadowKey};
    use jiff::civil::date;

    #[test]
    fn actions_serialize_with_a_type_tag() {
        let account = Account {
            id: AccountId(1),
            shadow_key: ShadowKey::from("savings"),
            owner: Owner::User,
            name: "Savings".to_string(),
            open_date: date(2020, 1, 1),
            annual: AnnualActivity::default(),
            kind: AccountKind::Bank(BankAccount::new(BankKind::Savings, 100.0, None, 0.0)),
        };
        let action = Action::Deposit { amount: 25.0, to: account.snapshot(30.0) };
        let json = serde_json::to_value(&action).unwrap();
        assert_eq!(json["type"], "deposit");
        assert_eq!(json["amount"], 25.0);
        assert_eq!(json["to"]["shadowKey"], "savings");
    }
}
