//! Banking: the main deposit account and cash withdrawals.

use crate::household::Household;
use crate::model::{Action, Period};
use crate::util::round_cents;

impl Household {
    /// Open bank accounts with money in them, cheapest first: withdrawals
    /// drain the lowest-rate, smallest-balance accounts before touching
    /// better ones.
    pub fn withdrawal_bank_indices(&self, period: Period) -> Vec<usize> {
        let mut indices: Vec<usize> = (0..self.accounts.len())
            .filter(|&i| {
                self.accounts[i].is_bank()
                    && self.accounts[i].is_open(period)
                    && self.accounts[i].balance() > 0.0
            })
            .collect();
        indices.sort_by(|&a, &b| {
            let (ra, rb) = (
                self.accounts[a].as_bank().map_or(0.0, |bk| bk.interest_rate),
                self.accounts[b].as_bank().map_or(0.0, |bk| bk.interest_rate),
            );
            ra.total_cmp(&rb)
                .then(self.accounts[a].balance().total_cmp(&self.accounts[b].balance()))
        });
        indices
    }

    /// Cash on hand across every open bank account.
    pub fn bank_funds(&self, period: Period) -> f64 {
        self.withdrawal_bank_indices(period)
            .into_iter()
            .map(|i| self.accounts[i].balance())
            .sum()
    }

    /// Take up to `amount` out of the bank, cheapest accounts first.
    /// Returns what was actually withdrawn with one action per account hit.
    pub fn withdraw_from_bank(&mut self, amount: f64, period: Period) -> (f64, Vec<Action>) {
        let mut remaining = round_cents(amount);
        let mut actions = Vec::new();
        for idx in self.withdrawal_bank_indices(period) {
            if remaining <= 0.0 {
                break;
            }
            let age = self.owner_age(self.accounts[idx].owner, period);
            let taken = self.accounts[idx].withdraw(remaining, age, period);
            if taken > 0.0 {
                remaining = round_cents(remaining - taken);
                actions.push(Action::Withdrawal {
                    amount: taken,
                    from: self.snapshot_of(idx, period),
                });
            }
        }
        (round_cents(amount) - remaining, actions)
    }

    /// Deposit into the main deposit account.
    pub fn deposit(&mut self, amount: f64, period: Period) -> Action {
        let idx = self.main_deposit_index();
        let deposited = self.accounts[idx].deposit(round_cents(amount));
        Action::Deposit { amount: deposited, to: self.snapshot_of(idx, period) }
    }
}
