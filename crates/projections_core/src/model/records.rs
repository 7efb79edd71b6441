//! The month-by-month record a projection produces, plus the alert log.

use std::collections::BTreeMap;

use rustc_hash::FxHashSet;
use serde::{Deserialize, Serialize};

use crate::irs::{ContributionLimits, IraDeposits, TaxBill};
use crate::model::accounts::AccountSnapshot;
use crate::model::actions::Action;
use crate::model::Period;

// ============================================================================
// Alerts
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum AlertLevel {
    /// Informational, e.g. a tax refund.
    Notice,
    /// Something went wrong but the projection continued.
    Warning,
    /// The household ran out of money and the projection stopped.
    Severe,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Alert {
    pub message: String,
    pub level: AlertLevel,
    /// Extra context lines shown with the alert.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub notes: Vec<String>,
}

impl Alert {
    pub fn notice(message: impl Into<String>) -> Self {
        Alert { message: message.into(), level: AlertLevel::Notice, notes: Vec::new() }
    }

    pub fn warning(message: impl Into<String>) -> Self {
        Alert { message: message.into(), level: AlertLevel::Warning, notes: Vec::new() }
    }

    pub fn severe(message: impl Into<String>, notes: Vec<String>) -> Self {
        Alert { message: message.into(), level: AlertLevel::Severe, notes }
    }
}

/// Every alert raised during a run, indexed by month and deduplicated into
/// a flat timestamped list.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Alerts {
    /// Unique alert messages, in the order first raised.
    pub unique: Vec<String>,
    /// Unique alerts with a `- M/YYYY` suffix, in the order first raised.
    pub all: Vec<Alert>,
    pub by_year: BTreeMap<i16, BTreeMap<i8, Vec<Alert>>>,
    #[serde(skip)]
    seen: FxHashSet<String>,
}

impl Alerts {
    pub fn push(&mut self, period: Period, alert: Alert) {
        if self.seen.insert(alert.message.clone()) {
            self.unique.push(alert.message.clone());
            let mut stamped = alert.clone();
            stamped.message = format!("{} - {}/{}", alert.message, period.month, period.year);
            self.all.push(stamped);
        }
        self.by_year
            .entry(period.year)
            .or_default()
            .entry(period.month)
            .or_default()
            .push(alert);
    }

    /// Alerts raised in a specific month.
    pub fn for_month(&self, period: Period) -> Vec<Alert> {
        self.by_year
            .get(&period.year)
            .and_then(|months| months.get(&period.month))
            .cloned()
            .unwrap_or_default()
    }
}

// ============================================================================
// Monthly records
// ============================================================================

/// Derived figures for one simulated month.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MonthlyAnalysis {
    pub total_debt: f64,
    pub total_debt_start_of_month: f64,
    pub bank_balance: f64,
    pub bank_balance_start_of_month: f64,
    pub growth_balance: f64,
    pub growth_balance_start_of_month: f64,
    /// Investment dollars the withdrawal rules would let out.
    pub withdrawable_from_growth: f64,
    pub withdrawable_from_growth_start_of_month: f64,
    pub locked_in_growth: f64,
    pub locked_in_growth_start_of_month: f64,
    pub contribution_limits: ContributionLimits,
    pub ira_deposits_so_far: IraDeposits,
    pub gross_income: f64,
    pub loan_income: f64,
    pub total_income: f64,
    pub budgeted_spending: f64,
    /// Budgeted spending plus withheld taxes and pre-tax contributions.
    pub total_spending: f64,
    pub pre_tax_contributions: f64,
    pub income_tax_withheld: f64,
    pub fica_withheld: f64,
    pub taxes_withheld: f64,
    pub debt_paid: f64,
    pub invested: f64,
    /// Spending the household could not cover this month.
    pub deficit: f64,
    pub debt_minimum_needed: f64,
    pub debt_avoid_interest_needed: f64,
    pub plan_contribution: f64,
    pub employer_plan_contribution: f64,
}

impl MonthlyAnalysis {
    /// Fill in the balance aggregates from start and end of month snapshots.
    pub fn set_balances(&mut self, start: &[AccountSnapshot], end: &[AccountSnapshot]) {
        use crate::model::accounts::AccountCategory;

        let sum = |snaps: &[AccountSnapshot], category| {
            snaps
                .iter()
                .filter(|s| s.category == category)
                .map(|s| s.balance)
                .sum::<f64>()
        };
        let withdrawable = |snaps: &[AccountSnapshot]| {
            snaps
                .iter()
                .filter(|s| s.category == AccountCategory::Growth)
                .map(|s| s.withdrawable)
                .sum::<f64>()
        };

        self.total_debt_start_of_month = sum(start, AccountCategory::Debt);
        self.total_debt = sum(end, AccountCategory::Debt);
        self.bank_balance_start_of_month = sum(start, AccountCategory::Bank);
        self.bank_balance = sum(end, AccountCategory::Bank);
        self.growth_balance_start_of_month = sum(start, AccountCategory::Growth);
        self.growth_balance = sum(end, AccountCategory::Growth);
        self.withdrawable_from_growth_start_of_month = withdrawable(start);
        self.withdrawable_from_growth = withdrawable(end);
        self.locked_in_growth_start_of_month =
            self.growth_balance_start_of_month - self.withdrawable_from_growth_start_of_month;
        self.locked_in_growth = self.growth_balance - self.withdrawable_from_growth;
    }
}

/// Everything recorded for one simulated month.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MonthlyRecord {
    pub actions: Vec<Action>,
    pub warnings: Vec<Alert>,
    pub snapshots: Vec<AccountSnapshot>,
    pub analysis: MonthlyAnalysis,
}

/// The April reckoning for one tax year.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct YearTaxSummary {
    pub taxes: TaxBill,
    pub withheld: f64,
    pub tax_owed: f64,
    pub tax_refund: f64,
}

/// Taxable income figures recorded per calendar year.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct YearIncomeRecord {
    pub ordinary: f64,
    pub social_security: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct YearRecord {
    /// One slot per calendar month; `None` for months outside the run.
    pub months: Vec<Option<MonthlyRecord>>,
    pub taxes: Option<YearTaxSummary>,
    pub income: YearIncomeRecord,
}

impl YearRecord {
    pub fn new() -> Self {
        YearRecord { months: vec![None; 12], taxes: None, income: YearIncomeRecord::default() }
    }
}

/// The full timeline, keyed by calendar year.
pub type ProjectionRecord = BTreeMap<i16, YearRecord>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn duplicate_alert_messages_are_logged_once() {
        let mut alerts = Alerts::default();
        alerts.push(Period::new(2025, 3), Alert::warning("overdrawn"));
        alerts.push(Period::new(2025, 4), Alert::warning("overdrawn"));
        alerts.push(Period::new(2025, 4), Alert::notice("refund"));

        let messages: Vec<&str> = alerts.all.iter().map(|a| a.message.as_str()).collect();
        assert_eq!(messages, vec!["overdrawn - 3/2025", "refund - 4/2025"]);
        assert_eq!(alerts.unique, vec!["overdrawn", "refund"]);
        assert_eq!(alerts.for_month(Period::new(2025, 4)).len(), 2);
        assert_eq!(alerts.for_month(Period::new(2025, 5)).len(), 0);
    }

    #[test]
    fn analysis_balances_come_from_snapshots() {
        use crate::model::accounts::{
            Account, AccountKind, AnnualActivity, BankAccount, BankKind, CreditCard,
        };
        use crate::model::ids::{AccountId, Owner, ShadowKey};
        use jiff::civil::date;

        let bank = Account {
            id: AccountId(1),
            shadow_key: ShadowKey::from("checking"),
            owner: Owner::User,
            name: "Checking".to_string(),
            open_date: date(2020, 1, 1),
            annual: AnnualActivity::default(),
            kind: AccountKind::Bank(BankAccount::new(BankKind::Checking, 2_500.0, None, 0.0)),
        };
        let card = Account {
            id: AccountId(2),
            shadow_key: ShadowKey::from("card"),
            owner: Owner::User,
            name: "Card".to_string(),
            open_date: date(2020, 1, 1),
            annual: AnnualActivity::default(),
            kind: AccountKind::Credit(CreditCard::new(
                800.0,
                20.0,
                0.0,
                date(2020, 1, 1),
                5_000.0,
                None,
            )),
        };

        let start = vec![bank.snapshot(30.0), card.snapshot(30.0)];
        let mut analysis = MonthlyAnalysis::default();
        analysis.set_balances(&start, &start);
        assert!((analysis.bank_balance - 2_500.0).abs() < 0.01);
        assert!((analysis.total_debt - 800.0).abs() < 0.01);
        assert_eq!(analysis.growth_balance, 0.0);
    }
}
