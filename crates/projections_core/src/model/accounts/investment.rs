//! Investment accounts: brokerage, employer retirement plans and IRAs.
//!
//! Each account models a two-asset portfolio of a stock fund and a bond
//! fund, rebalanced to a target split every month. Withdrawals sell both
//! assets proportionally and realize long-term gains against the average
//! cost basis when the account is taxable. The kind drives the withdrawal
//! rules: Roth-style accounts give back contributions any time, traditional
//! accounts are locked (with a penalty) before age 59.5.

use serde::{Deserialize, Serialize};

use crate::util::monthly_growth_rate;

/// Age after which retirement plan withdrawals are penalty-free.
pub const RETIREMENT_WITHDRAWAL_AGE: f64 = 59.5;

/// Roth earnings withdrawn before the account is this old are taxed.
const ROTH_SEASONING_YEARS: f64 = 5.0;

/// Balances below a dollar are treated as dust and zeroed.
const DUST_BALANCE: f64 = 1.0;

/// Tax flavor of an investment account.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum InvestmentKind {
    #[default]
    #[serde(rename = "brokerage")]
    Brokerage,
    #[serde(rename = "ugma")]
    Ugma,
    #[serde(rename = "utma")]
    Utma,
    #[serde(rename = "401k")]
    Plan401k,
    #[serde(rename = "403b")]
    Plan403b,
    #[serde(rename = "401a")]
    Plan401a,
    #[serde(rename = "Roth 401k")]
    Roth401k,
    #[serde(rename = "Roth IRA")]
    RothIra,
    #[serde(rename = "Traditional IRA")]
    TraditionalIra,
    #[serde(rename = "Health Savings Account")]
    Hsa,
}

impl InvestmentKind {
    /// Realized gains and dividends are taxable in the year they occur.
    pub fn is_taxable(self) -> bool {
        matches!(self, InvestmentKind::Brokerage | InvestmentKind::Ugma | InvestmentKind::Utma)
    }

    /// Locked before 59.5; the whole withdrawal is ordinary income.
    pub fn has_traditional_rules(self) -> bool {
        matches!(
            self,
            InvestmentKind::Plan401k
                | InvestmentKind::Plan403b
                | InvestmentKind::Plan401a
                | InvestmentKind::TraditionalIra
        )
    }

    /// Contributions withdrawable any time; early earnings are taxed.
    pub fn has_roth_rules(self) -> bool {
        matches!(self, InvestmentKind::Roth401k | InvestmentKind::RothIra)
    }

    /// Funded through payroll with an employer attached.
    pub fn is_employer_plan(self) -> bool {
        matches!(
            self,
            InvestmentKind::Plan401k
                | InvestmentKind::Plan403b
                | InvestmentKind::Plan401a
                | InvestmentKind::Roth401k
        )
    }

    /// IRAs the household funds directly.
    pub fn is_individual_plan(self) -> bool {
        matches!(self, InvestmentKind::RothIra | InvestmentKind::TraditionalIra)
    }
}

/// What a withdrawal (or deposit, as its mirror) changed.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct WithdrawalOutcome {
    pub amount: f64,
    /// Long-term gains realized by the sale (taxable accounts only).
    pub realized_gains: f64,
    /// Portion taxed as ordinary income in the year of withdrawal.
    pub taxable_income: f64,
    /// Amount subject to the early-withdrawal penalty.
    pub penalized: f64,
}

/// What a month of growth produced.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct GrowthOutcome {
    /// Bond interest paid out as taxable income.
    pub interest_income: f64,
    /// Gains realized by rebalancing sales.
    pub realized_gains: f64,
    /// Change in account value over the month.
    pub earnings: f64,
}

/// A stock/bond portfolio with average-cost-basis tracking.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InvestmentAccount {
    pub kind: InvestmentKind,
    pub balance: f64,
    /// Money paid in; not taxed when withdrawn.
    pub contributions: f64,
    /// Growth since opening; taxed when withdrawn from Roth-style accounts.
    pub earnings: f64,
    /// Annual stock growth in whole percent.
    pub stock_growth_rate: f64,
    /// Annual bond interest in whole percent.
    pub bond_interest_rate: f64,
    /// Target fraction of the portfolio held in stocks.
    pub percent_stocks: f64,
    pub stock_price: f64,
    pub bond_price: f64,
    pub stock_quantity: f64,
    pub bond_quantity: f64,
    pub stock_cost_basis: f64,
    pub bond_cost_basis: f64,
    /// Household is already contributing the yearly maximum to this account.
    pub contributing_max_allowed: bool,
    /// Household contributes this much per year outside the simulation's
    /// own allocation.
    pub contributing_max_amount: f64,
}

pub struct InvestmentInput {
    pub kind: InvestmentKind,
    pub balance: f64,
    pub contributions: Option<f64>,
    pub stock_growth_rate: f64,
    pub bond_interest_rate: f64,
    pub percent_stocks: f64,
    pub stock_price: f64,
    pub bond_price: f64,
    /// Average dollar cost basis; defaults to the current prices.
    pub avg_cost_basis: Option<f64>,
    pub contributing_max_allowed: bool,
    pub contributing_max_amount: f64,
}

impl InvestmentAccount {
    pub fn new(input: InvestmentInput) -> Self {
        let contributions = input.contributions.unwrap_or(input.balance);
        let stock_value = input.balance * input.percent_stocks;
        let bond_value = input.balance - stock_value;
        InvestmentAccount {
            kind: input.kind,
            balance: input.balance,
            contributions,
            earnings: input.balance - contributions,
            stock_growth_rate: input.stock_growth_rate,
            bond_interest_rate: input.bond_interest_rate,
            percent_stocks: input.percent_stocks,
            stock_quantity: stock_value / input.stock_price,
            bond_quantity: bond_value / input.bond_price,
            stock_cost_basis: input
                .avg_cost_basis
                .map_or(input.stock_price, |b| b / input.stock_price),
            bond_cost_basis: input
                .avg_cost_basis
                .map_or(input.bond_price, |b| b / input.bond_price),
            stock_price: input.stock_price,
            bond_price: input.bond_price,
            contributing_max_allowed: input.contributing_max_allowed,
            contributing_max_amount: input.contributing_max_amount,
        }
    }

    pub fn percent_bonds(&self) -> f64 {
        1.0 - self.percent_stocks
    }

    fn market_value(&self) -> f64 {
        let value = self.stock_quantity * self.stock_price + self.bond_quantity * self.bond_price;
        if value < DUST_BALANCE { 0.0 } else { value }
    }

    // ------------------------------------------------------------------
    // Withdrawal rules
    // ------------------------------------------------------------------

    /// Liquidation priority for covering a deficit, or `None` when the
    /// account can't be tapped. Roth accounts first; before retirement age
    /// the brokerage goes before locked accounts, after it the order flips.
    pub fn withdraw_priority(&self, owner_age: f64) -> Option<u8> {
        if self.kind.has_roth_rules() {
            return Some(0);
        }
        let early = owner_age < RETIREMENT_WITHDRAWAL_AGE;
        match (self.kind, early) {
            (InvestmentKind::Brokerage, true) => Some(1),
            (k, true) if k.has_traditional_rules() => Some(2),
            (k, false) if k.has_traditional_rules() => Some(1),
            (InvestmentKind::Brokerage, false) => Some(2),
            _ => None,
        }
    }

    /// How much can be taken out under the account's withdrawal rules.
    pub fn withdrawable_amount(&self, owner_age: f64) -> f64 {
        if self.kind.has_roth_rules() {
            if owner_age < RETIREMENT_WITHDRAWAL_AGE {
                return self.contributions;
            }
            return self.balance;
        }
        if self.kind.has_traditional_rules() {
            if owner_age < RETIREMENT_WITHDRAWAL_AGE {
                return 0.0;
            }
            return self.balance;
        }
        self.balance
    }

    fn is_penalty_withdrawal(&self, owner_age: f64) -> bool {
        self.kind.has_traditional_rules() && owner_age < RETIREMENT_WITHDRAWAL_AGE
    }

    fn is_early_roth_withdrawal(&self, owner_age: f64, account_age: f64) -> bool {
        self.kind.has_roth_rules()
            && (owner_age < RETIREMENT_WITHDRAWAL_AGE || account_age < ROTH_SEASONING_YEARS)
    }

    /// Ordinary income generated by a withdrawal. Traditional accounts tax
    /// the whole amount; early Roth withdrawals tax the earnings portion.
    fn taxed_withdrawal(&self, total: f64, from_earnings: f64, owner_age: f64, account_age: f64) -> f64 {
        if self.kind.has_traditional_rules() {
            return total.max(0.0);
        }
        if self.is_early_roth_withdrawal(owner_age, account_age) {
            return from_earnings.max(0.0);
        }
        0.0
    }

    // ------------------------------------------------------------------
    // Withdrawals and deposits
    // ------------------------------------------------------------------

    /// Sell stock and bonds proportionally to raise `amount`, capped at the
    /// account value. Ages are in fractional years.
    pub fn withdraw(&mut self, amount: f64, owner_age: f64, account_age: f64) -> WithdrawalOutcome {
        let available = self.stock_quantity * self.stock_price + self.bond_quantity * self.bond_price;
        let withdrawn = amount.min(available);

        let stock_sold =
            (withdrawn * self.percent_stocks / self.stock_price).min(self.stock_quantity);
        let bond_sold =
            (withdrawn * self.percent_bonds() / self.bond_price).min(self.bond_quantity);

        let realized_gains = if self.kind.is_taxable() {
            (self.stock_price - self.stock_cost_basis) * stock_sold
                + (self.bond_price - self.bond_cost_basis) * bond_sold
        } else {
            0.0
        };

        self.stock_quantity -= stock_sold;
        self.bond_quantity -= bond_sold;
        self.balance = self.market_value();

        // Contributions come out first; earnings only once they're gone.
        let from_earnings = if withdrawn > self.contributions {
            let from_earnings = withdrawn - self.contributions;
            self.contributions = 0.0;
            self.earnings -= from_earnings;
            from_earnings
        } else {
            self.contributions -= withdrawn;
            0.0
        };

        let taxable_income = self.taxed_withdrawal(withdrawn, from_earnings, owner_age, account_age);
        let penalized = if self.is_penalty_withdrawal(owner_age) { withdrawn } else { 0.0 };

        WithdrawalOutcome { amount: withdrawn, realized_gains, taxable_income, penalized }
    }

    /// Buy into the portfolio at the current prices, keeping the stock/bond
    /// split and updating the average cost basis of each side.
    pub fn deposit(&mut self, amount: f64, employer: bool) -> f64 {
        if amount <= 0.0 {
            return 0.0;
        }
        let stock_bought = amount * self.percent_stocks / self.stock_price;
        let bond_bought = amount * self.percent_bonds() / self.bond_price;

        self.stock_cost_basis = weighted_cost_basis(
            self.stock_quantity,
            self.stock_cost_basis,
            stock_bought,
            self.stock_price,
        );
        self.bond_cost_basis = weighted_cost_basis(
            self.bond_quantity,
            self.bond_cost_basis,
            bond_bought,
            self.bond_price,
        );
        self.stock_quantity += stock_bought;
        self.bond_quantity += bond_bought;
        self.balance = self.market_value();

        // Employer money in a Roth plan is taxed on the way out, so it
        // counts as earnings rather than contributions.
        if employer {
            self.earnings += amount;
        } else {
            self.contributions += amount;
        }
        amount
    }

    // ------------------------------------------------------------------
    // Monthly growth
    // ------------------------------------------------------------------

    /// Compound both prices one month, pay out bond interest on taxable
    /// accounts, then rebalance back to the target stock/bond split.
    pub fn grow(&mut self) -> GrowthOutcome {
        let stock_rate = monthly_growth_rate(self.stock_growth_rate);
        let bond_rate = monthly_growth_rate(self.bond_interest_rate);

        let interest_income = if self.kind.is_taxable() {
            self.bond_quantity * self.bond_price * bond_rate
        } else {
            0.0
        };

        self.stock_price *= 1.0 + stock_rate;
        self.bond_price *= 1.0 + bond_rate;
        // Bond interest is reinvested, so its basis rides the price.
        self.bond_cost_basis = self.bond_price;

        // Rebalance to the target split at the new prices.
        let stock_value = self.stock_quantity * self.stock_price;
        let bond_value = self.bond_quantity * self.bond_price;
        let total = stock_value + bond_value;

        let stock_delta = (total * self.percent_stocks - stock_value) / self.stock_price;
        let bond_delta = (total * self.percent_bonds() - bond_value) / self.bond_price;

        let mut realized_gains = 0.0;
        let old_stock_quantity = self.stock_quantity;
        let old_bond_quantity = self.bond_quantity;
        let old_stock_basis = self.stock_cost_basis;
        let old_bond_basis = self.bond_cost_basis;
        self.stock_quantity += stock_delta;
        self.bond_quantity += bond_delta;

        if stock_delta > 0.0 {
            self.stock_cost_basis =
                weighted_cost_basis(old_stock_quantity, old_stock_basis, stock_delta, self.stock_price);
        } else if stock_delta < 0.0 && self.kind.is_taxable() {
            realized_gains += (self.stock_price - old_stock_basis) * stock_delta.abs();
        }

        if bond_delta > 0.0 {
            self.bond_cost_basis =
                weighted_cost_basis(old_bond_quantity, old_bond_basis, bond_delta, self.bond_price);
        } else if bond_delta < 0.0 && self.kind.is_taxable() {
            realized_gains += (self.bond_price - old_bond_basis) * bond_delta.abs();
        }

        let new_balance = self.market_value();
        let earnings = new_balance - self.balance;
        self.earnings += earnings;
        self.balance = new_balance;

        GrowthOutcome { interest_income, realized_gains, earnings }
    }
}

/// New average basis after buying `added` units at `price`.
fn weighted_cost_basis(quantity: f64, basis: f64, added: f64, price: f64) -> f64 {
    if quantity + added == 0.0 {
        return price;
    }
    (quantity * basis + added * price) / (quantity + added)
}
