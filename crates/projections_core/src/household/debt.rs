//! The debt waterfall: scheduled minimums, interest avoidance, payoff.

use crate::household::Household;
use crate::model::{Action, AccountKind, DebtPaymentKind, Period};
use crate::util::round_cents;

/// One planned payment against a debt account.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScheduledPayment {
    pub idx: usize,
    pub amount: f64,
    pub kind: DebtPaymentKind,
}

/// What a debt-payment pass accomplished.
#[derive(Debug, Default)]
pub struct DebtPaymentOutcome {
    pub paid: f64,
    pub paid_in_full: bool,
    pub amount_needed: f64,
    pub actions: Vec<Action>,
}

impl Household {
    /// Annualized rate a debt currently charges.
    fn debt_rate(&self, idx: usize, period: Period) -> f64 {
        match &self.accounts[idx].kind {
            AccountKind::Credit(card) => card.effective_apr(period),
            AccountKind::Loan(loan) => loan.rate,
            _ => 0.0,
        }
    }

    fn open_debt_indices_with_balances(&self, period: Period) -> Vec<usize> {
        (0..self.accounts.len())
            .filter(|&i| {
                self.accounts[i].is_debt()
                    && self.accounts[i].is_open(period)
                    && self.accounts[i].balance() > 0.0
            })
            .collect()
    }

    /// Minimum credit card payments followed by fixed loan payments; the
    /// amounts due this month regardless of surplus.
    pub fn scheduled_minimums(&self, period: Period) -> Vec<ScheduledPayment> {
        let mut payments = Vec::new();
        for idx in self.open_debt_indices_with_balances(period) {
            if let AccountKind::Credit(card) = &self.accounts[idx].kind {
                payments.push(ScheduledPayment {
                    idx,
                    amount: card.minimum_payment(period),
                    kind: DebtPaymentKind::MinimumCredit,
                });
            }
        }
        for idx in self.open_debt_indices_with_balances(period) {
            if let AccountKind::Loan(loan) = &self.accounts[idx].kind {
                payments.push(ScheduledPayment {
                    idx,
                    amount: loan.payment.min(loan.debt.balance),
                    kind: DebtPaymentKind::FixedRateLoan,
                });
            }
        }
        payments
    }

    pub fn minimum_debt_payment(&self, period: Period) -> f64 {
        self.scheduled_minimums(period).iter().map(|p| p.amount).sum()
    }

    /// Credit balances beyond the minimum that will keep collecting
    /// interest, worst rate first.
    pub fn interest_collecting_payments(&self, period: Period) -> Vec<ScheduledPayment> {
        let mut payments: Vec<ScheduledPayment> = self
            .open_debt_indices_with_balances(period)
            .into_iter()
            .filter_map(|idx| match &self.accounts[idx].kind {
                AccountKind::Credit(card) if card.effective_apr(period) > 0.0 => {
                    Some(ScheduledPayment {
                        idx,
                        amount: card.balance_beyond_minimum(period),
                        kind: DebtPaymentKind::AvoidInterest,
                    })
                }
                _ => None,
            })
            .collect();
        self.sort_worst_rate_first(&mut payments, period);
        payments
    }

    /// Every open balance in full, worst rate first.
    pub fn all_debt_owed(&self, period: Period) -> Vec<ScheduledPayment> {
        let mut payments: Vec<ScheduledPayment> = self
            .open_debt_indices_with_balances(period)
            .into_iter()
            .map(|idx| ScheduledPayment {
                idx,
                amount: self.accounts[idx].balance(),
                kind: DebtPaymentKind::Payoff,
            })
            .collect();
        self.sort_worst_rate_first(&mut payments, period);
        payments
    }

    fn sort_worst_rate_first(&self, payments: &mut [ScheduledPayment], period: Period) {
        payments.sort_by(|a, b| {
            self.debt_rate(b.idx, period)
                .total_cmp(&self.debt_rate(a.idx, period))
                .then(b.amount.total_cmp(&a.amount))
        });
    }

    /// Withdraw from the bank and apply payments in order until either the
    /// money or the schedule runs out.
    pub fn pay_debt(
        &mut self,
        payments: &[ScheduledPayment],
        cap: Option<f64>,
        period: Period,
    ) -> DebtPaymentOutcome {
        let bank_funds = self.bank_funds(period);
        let amount_to_pay = match cap {
            Some(c) if c > 0.0 => c.min(bank_funds),
            Some(_) => 0.0,
            None => bank_funds,
        };
        let amount_needed: f64 = payments.iter().map(|p| p.amount).sum();
        let to_withdraw = round_cents(amount_to_pay.min(amount_needed));

        if to_withdraw <= 0.0 {
            return DebtPaymentOutcome {
                paid: 0.0,
                paid_in_full: amount_needed <= 0.0,
                amount_needed,
                actions: Vec::new(),
            };
        }

        let (withdrawn, mut actions) = self.withdraw_from_bank(to_withdraw, period);
        let mut available = withdrawn;
        for payment in payments {
            if available <= 0.0 {
                break;
            }
            let to_pay = available.min(payment.amount);
            let paid = match &mut self.accounts[payment.idx].kind {
                AccountKind::Credit(card) => card.debt.make_payment(to_pay),
                AccountKind::Loan(loan) => loan.debt.make_payment(to_pay),
                _ => 0.0,
            };
            available = round_cents(available - paid);
            actions.push(Action::DebtPayment {
                kind: payment.kind,
                amount: paid,
                to: self.snapshot_of(payment.idx, period),
            });
        }

        DebtPaymentOutcome {
            paid: withdrawn,
            paid_in_full: amount_needed <= withdrawn,
            amount_needed,
            actions,
        }
    }

    pub fn pay_minimum_debt(&mut self, cap: Option<f64>, period: Period) -> DebtPaymentOutcome {
        let payments = self.scheduled_minimums(period);
        self.pay_debt(&payments, cap, period)
    }

    pub fn pay_debt_to_avoid_fees(
        &mut self,
        cap: Option<f64>,
        period: Period,
    ) -> DebtPaymentOutcome {
        let payments = self.interest_collecting_payments(period);
        self.pay_debt(&payments, cap, period)
    }

    pub fn pay_all_debt(&mut self, cap: Option<f64>, period: Period) -> DebtPaymentOutcome {
        let payments = self.all_debt_owed(period);
        self.pay_debt(&payments, cap, period)
    }

    /// Replay the caller's scripted loan-pay streams against the debt
    /// accounts they name.
    pub fn pay_manual_debt(&mut self, period: Period) -> DebtPaymentOutcome {
        let open_debt = self.open_debt_indices_with_balances(period);
        let payments: Vec<ScheduledPayment> = self
            .spendings()
            .filter(|s| s.kind == crate::model::SpendingKind::LoanPay && s.account_id.is_some())
            .filter_map(|s| {
                let idx = open_debt
                    .iter()
                    .copied()
                    .find(|&i| Some(self.accounts[i].id) == s.account_id)?;
                Some(ScheduledPayment {
                    idx,
                    amount: s.stream.amount_monthly,
                    kind: DebtPaymentKind::Manual,
                })
            })
            .collect();
        self.pay_debt(&payments, None, period)
    }

    /// Draw on credit lines to cover a shortfall, cheapest card first.
    pub fn borrow(&mut self, amount: f64, period: Period) -> (f64, Vec<Action>) {
        let mut order: Vec<usize> = (0..self.accounts.len())
            .filter(|&i| match &self.accounts[i].kind {
                AccountKind::Credit(card) => card.available_credit() > 0.0,
                _ => false,
            })
            .collect();
        order.sort_by(|&a, &b| {
            self.debt_rate(a, period)
                .total_cmp(&self.debt_rate(b, period))
                .then(self.accounts[a].balance().total_cmp(&self.accounts[b].balance()))
        });

        let mut remaining = round_cents(amount);
        let mut actions = Vec::new();
        for idx in order {
            if remaining <= 0.0 {
                break;
            }
            if let AccountKind::Credit(card) = &mut self.accounts[idx].kind {
                let borrowed = card.borrow(remaining);
                if borrowed > 0.0 {
                    remaining = round_cents(remaining - borrowed);
                    actions.push(Action::Borrow {
                        amount: borrowed,
                        from: self.snapshot_of(idx, period),
                    });
                }
            }
        }
        (round_cents(amount) - remaining, actions)
    }
}
