//! Credit cards and fixed-rate loans.
//!
//! Both debt kinds share the same balance bookkeeping: interest accrues into
//! the balance once a month, and payments retire accrued interest before
//! principal. [`CreditCard`] adds a promo-rate window, a credit limit and a
//! minimum payment; [`FixedRateLoan`] adds an amortized payment and a
//! deferred disbursement at the account's open date.

use jiff::civil::Date;
use serde::{Deserialize, Serialize};

use crate::model::Period;
use crate::util::{monthly_interest_fee, percent, round_cents};

/// Smallest credit card payment before the percentage minimum kicks in.
const MINIMUM_CREDIT_PAYMENT: f64 = 35.0;

/// Default minimum payment as a percent of the balance.
const DEFAULT_MINIMUM_PERCENT: f64 = 1.0;

/// Balance and payment bookkeeping common to every debt.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DebtBalance {
    pub balance: f64,
    /// Interest accrued into the balance but not yet paid off.
    pub accrued_interest: f64,
    pub total_interest_paid: f64,
    pub total_paid: f64,
}

impl DebtBalance {
    pub fn new(balance: f64) -> Self {
        DebtBalance { balance, ..Default::default() }
    }

    /// Accrue one month of simple interest into the balance.
    /// Returns the interest charged.
    pub fn accrue(&mut self, monthly_rate: f64) -> f64 {
        let interest = round_cents(monthly_rate * self.balance);
        self.accrued_interest += interest;
        self.balance += interest;
        interest
    }

    /// Pay down the balance, interest before principal.
    /// Overpayments are clipped to the balance; returns the amount paid.
    pub fn make_payment(&mut self, amount: f64) -> f64 {
        let paid = if amount >= self.balance {
            let paid = self.balance;
            self.total_interest_paid += self.accrued_interest;
            self.accrued_interest = 0.0;
            self.balance = 0.0;
            paid
        } else {
            self.balance -= amount;
            let interest_portion = self.accrued_interest.min(amount);
            self.accrued_interest -= interest_portion;
            self.total_interest_paid += interest_portion;
            amount
        };
        self.total_paid += paid;
        paid
    }
}

// ============================================================================
// Credit cards
// ============================================================================

/// Revolving credit with a promo window and a minimum payment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreditCard {
    pub debt: DebtBalance,
    /// Annual rate in whole percent once the promo window ends.
    pub apr: f64,
    /// Annual rate in whole percent while the promo window is active.
    pub promo_apr: f64,
    /// First day the full APR applies.
    pub apr_start: Date,
    pub credit_limit: f64,
    /// Minimum payment as a percent of the balance.
    pub minimum_percent: f64,
}

impl CreditCard {
    pub fn new(
        balance: f64,
        apr: f64,
        promo_apr: f64,
        apr_start: Date,
        credit_limit: f64,
        minimum_percent: Option<f64>,
    ) -> Self {
        CreditCard {
            debt: DebtBalance::new(balance),
            apr,
            promo_apr,
            apr_start,
            credit_limit,
            minimum_percent: minimum_percent.unwrap_or(DEFAULT_MINIMUM_PERCENT),
        }
    }

    /// Annual rate in effect for a month. The promo rate holds while the
    /// month still ends before the APR start date.
    pub fn effective_apr(&self, period: Period) -> f64 {
        if period.last_day() < self.apr_start {
            self.promo_apr
        } else {
            self.apr
        }
    }

    pub fn monthly_rate(&self, period: Period) -> f64 {
        monthly_interest_fee(self.effective_apr(period))
    }

    pub fn accrue(&mut self, period: Period) -> f64 {
        let rate = self.monthly_rate(period);
        self.debt.accrue(rate)
    }

    /// This month's minimum payment: the card minimum, or interest plus the
    /// percent-of-balance floor, whichever is larger.
    pub fn minimum_payment(&self, period: Period) -> f64 {
        let balance = self.debt.balance;
        let monthly_interest = self.monthly_rate(period) * balance;
        let percent_floor = monthly_interest + percent(self.minimum_percent) * balance;
        round_cents(balance.min(MINIMUM_CREDIT_PAYMENT).max(percent_floor))
    }

    /// The balance still collecting interest after the minimum is paid.
    pub fn balance_beyond_minimum(&self, period: Period) -> f64 {
        (self.debt.balance - self.minimum_payment(period)).max(0.0)
    }

    pub fn available_credit(&self) -> f64 {
        (self.credit_limit - self.debt.balance).max(0.0)
    }

    /// Draw on the card up to its limit. Returns the amount borrowed.
    pub fn borrow(&mut self, amount: f64) -> f64 {
        let borrowed = amount.min(self.available_credit());
        self.debt.balance += borrowed;
        borrowed
    }
}

// ============================================================================
// Fixed-rate loans
// ============================================================================

/// An amortized loan. The principal is not owed until the loan's open date,
/// when [`FixedRateLoan::disburse`] moves it onto the balance and the
/// proceeds arrive as loan income.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FixedRateLoan {
    pub debt: DebtBalance,
    /// Annual rate in whole percent.
    pub rate: f64,
    pub principal: f64,
    pub term_months: u32,
    /// Fixed monthly payment from the amortization formula.
    pub payment: f64,
    pub disbursed: bool,
}

impl FixedRateLoan {
    /// A loan already open carries its reported balance (the principal if
    /// none was given); a future loan starts at zero and waits for
    /// disbursement.
    pub fn new(
        principal: f64,
        rate: f64,
        term_months: u32,
        balance: Option<f64>,
        already_open: bool,
    ) -> Self {
        FixedRateLoan {
            debt: DebtBalance::new(if already_open { balance.unwrap_or(principal) } else { 0.0 }),
            rate,
            principal,
            term_months,
            payment: amortized_payment(principal, rate, term_months),
            disbursed: already_open,
        }
    }

    pub fn monthly_rate(&self) -> f64 {
        monthly_interest_fee(self.rate)
    }

    pub fn accrue(&mut self) -> f64 {
        let rate = self.monthly_rate();
        self.debt.accrue(rate)
    }

    /// Move the principal onto the balance at the open date.
    /// Returns the proceeds, or zero if already disbursed.
    pub fn disburse(&mut self) -> f64 {
        if self.disbursed {
            return 0.0;
        }
        self.disbursed = true;
        self.debt.balance += self.principal;
        self.principal
    }
}

/// Standard amortization: `P * r * (1+r)^n / ((1+r)^n - 1)` rounded to cents.
fn amortized_payment(principal: f64, annual_rate: f64, term_months: u32) -> f64 {
    if annual_rate == 0.0 || term_months == 0 {
        return 0.0;
    }
    let r = monthly_interest_fee(annual_rate);
    let f = (1.0 + r).powi(term_months as i32);
    round_cents(principal * f * r / (f - 1.0))
}
