//! Caller-facing input types.
//!
//! Everything here derives `Deserialize` with lenient defaults so a partial
//! JSON household still resolves: a missing open date means the account was
//! already open a year before the run, a missing date of birth assumes a
//! 25-year-old, and flag shorthands are normalized into a [`Flags`] value
//! before the simulation sees them.

use jiff::civil::Date;
use serde::{Deserialize, Serialize};

use crate::irs::tables::FilingStatus;
use crate::model::{AccountId, IncomeKind, Owner, ShadowKey, SpendingKind};
use crate::util::{percent, RatePeriod};

/// Age assumed when a person has no date of birth.
pub const DEFAULT_AGE: i16 = 25;

/// Emergency fund kept on hand when the input doesn't set one.
pub const DEFAULT_EMERGENCY_FUND: f64 = 100.0;

/// Simulated years when the input doesn't set a horizon.
pub const DEFAULT_SIMULATION_YEARS: i16 = 10;

/// Annual inflation applied to streams that don't name a rate, whole percent.
pub const GENERAL_INFLATION_RATE: f64 = 2.0;

// ============================================================================
// Streams
// ============================================================================

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct IncomeInput {
    pub shadow_key: Option<ShadowKey>,
    pub description: Option<String>,
    #[serde(rename = "type")]
    pub kind: IncomeKind,
    pub amount: f64,
    pub rate: RatePeriod,
    /// Amount is take-home pay; gross it back up through withholding.
    pub is_take_home: bool,
    /// Annual raise in whole percent. Salaries default to no raise,
    /// other income tracks general inflation.
    pub inflation_rate: Option<f64>,
    pub start_date: Option<Date>,
    pub end_date: Option<Date>,
    pub is_present_value: bool,
}

impl IncomeInput {
    pub fn resolved_inflation_rate(&self) -> f64 {
        match self.inflation_rate {
            Some(rate) => rate,
            None => match self.kind {
                IncomeKind::Salary | IncomeKind::Unemployment => 0.0,
                _ => GENERAL_INFLATION_RATE,
            },
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SpendingInput {
    pub shadow_key: Option<ShadowKey>,
    pub description: Option<String>,
    #[serde(rename = "type")]
    pub kind: SpendingKind,
    pub amount: f64,
    pub rate: RatePeriod,
    pub start_date: Option<Date>,
    pub end_date: Option<Date>,
    pub is_present_value: bool,
    /// Debt account a scripted loan payment goes to.
    pub account_id: Option<AccountId>,
}

impl SpendingInput {
    /// Scripted debt payments don't inflate; everything else follows
    /// general inflation.
    pub fn resolved_inflation_rate(&self) -> f64 {
        match self.kind {
            SpendingKind::LoanPay => 0.0,
            _ => GENERAL_INFLATION_RATE,
        }
    }
}

// ============================================================================
// Accounts
// ============================================================================

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct BankAccountInput {
    pub shadow_key: Option<ShadowKey>,
    pub account_id: Option<AccountId>,
    pub name: Option<String>,
    #[serde(rename = "type")]
    pub kind: crate::model::BankKind,
    pub balance: f64,
    pub contributions: Option<f64>,
    /// Annual interest in whole percent.
    pub interest_rate: f64,
    pub open_date: Option<Date>,
}

fn default_apr() -> f64 {
    20.0
}

fn default_credit_limit() -> f64 {
    10_000.0
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CreditCardInput {
    pub shadow_key: Option<ShadowKey>,
    pub account_id: Option<AccountId>,
    pub name: Option<String>,
    pub balance: f64,
    #[serde(rename = "APR")]
    pub apr: f64,
    #[serde(rename = "promoAPR")]
    pub promo_apr: f64,
    /// Day the full APR kicks in; promo rate applies before it.
    #[serde(rename = "APRStartDate")]
    pub apr_start_date: Option<Date>,
    pub credit_limit: f64,
    pub minimum_payment_percentage: Option<f64>,
    pub open_date: Option<Date>,
}

impl Default for CreditCardInput {
    fn default() -> Self {
        CreditCardInput {
            shadow_key: None,
            account_id: None,
            name: None,
            balance: 0.0,
            apr: default_apr(),
            promo_apr: 0.0,
            apr_start_date: None,
            credit_limit: default_credit_limit(),
            minimum_payment_percentage: None,
            open_date: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LoanInput {
    pub shadow_key: Option<ShadowKey>,
    pub account_id: Option<AccountId>,
    pub name: Option<String>,
    /// Balance owed today for a loan that is already open.
    pub balance: Option<f64>,
    #[serde(alias = "principle")]
    pub principal: f64,
    /// Annual rate in whole percent.
    pub interest_rate: f64,
    pub term_in_months: u32,
    /// A future open date defers the principal until the loan opens.
    pub open_date: Option<Date>,
}

impl Default for LoanInput {
    fn default() -> Self {
        LoanInput {
            shadow_key: None,
            account_id: None,
            name: None,
            balance: None,
            principal: 0.0,
            interest_rate: 10.0,
            term_in_months: 36,
            open_date: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct InvestmentAccountInput {
    pub shadow_key: Option<ShadowKey>,
    pub account_id: Option<AccountId>,
    pub name: Option<String>,
    #[serde(rename = "type")]
    pub kind: crate::model::InvestmentKind,
    pub balance: f64,
    pub contributions: Option<f64>,
    pub avg_cost_basis: Option<f64>,
    /// Annual stock growth in whole percent.
    pub growth_rate_stock: f64,
    /// Annual bond interest in whole percent.
    pub interest_rate_bond: f64,
    pub percent_stocks: f64,
    pub latest_stock_price: f64,
    pub latest_bond_price: f64,
    pub open_date: Option<Date>,
    /// Already contributing the yearly maximum outside this projection.
    pub contributing_max_allowed: bool,
    /// Annual amount already being contributed outside this projection.
    pub contributing_max_amount: f64,
    /// Income stream funding this plan through payroll.
    #[serde(rename = "_401kIncomeKey")]
    pub plan_income_key: Option<ShadowKey>,
    #[serde(rename = "_401kContributingMax")]
    pub plan_contributing_max: bool,
    #[serde(rename = "_401kEmployerContributingMax")]
    pub plan_employer_contributing_max: bool,
    #[serde(rename = "_401kContributionAmount")]
    pub plan_contribution_amount: f64,
    #[serde(rename = "_401kEmployerMatchAmount")]
    pub plan_employer_match_amount: f64,
    #[serde(rename = "_401kContributionRate")]
    pub plan_contribution_rate: RatePeriod,
}

impl Default for InvestmentAccountInput {
    fn default() -> Self {
        InvestmentAccountInput {
            shadow_key: None,
            account_id: None,
            name: None,
            kind: crate::model::InvestmentKind::Brokerage,
            balance: 0.0,
            contributions: None,
            avg_cost_basis: None,
            growth_rate_stock: 10.0,
            interest_rate_bond: 2.9,
            percent_stocks: 0.6,
            latest_stock_price: 1.0,
            latest_bond_price: 1.0,
            open_date: None,
            contributing_max_allowed: false,
            contributing_max_amount: 0.0,
            plan_income_key: None,
            plan_contributing_max: false,
            plan_employer_contributing_max: false,
            plan_contribution_amount: 0.0,
            plan_employer_match_amount: 0.0,
            plan_contribution_rate: RatePeriod::Monthly,
        }
    }
}

// ============================================================================
// People and flags
// ============================================================================

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PersonInput {
    pub date_of_birth: Option<Date>,
    pub incomes: Vec<IncomeInput>,
    pub spendings: Vec<SpendingInput>,
    pub bank_accounts: Vec<BankAccountInput>,
    pub investment_accounts: Vec<InvestmentAccountInput>,
    pub loans: Vec<LoanInput>,
    pub credit: Vec<CreditCardInput>,
}

/// How surplus is split against outstanding debt each month.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum DebtPolicy {
    /// Engine decides: minimums, then interest-avoiding payments, then
    /// optional early loan payoff.
    #[default]
    Project,
    /// Caller scripts payments through loan-pay spending streams.
    ManualPay,
    /// Caller sets a monthly dollar goal; engine allocates it.
    ManualGoal,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum DebtPayTypeInput {
    Project,
    ProjectWithEarlyLoanPayoff,
    ManualDebtPay,
    ManualDebtGoal,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FlagsInput {
    pub debt_pay_type: Option<DebtPayTypeInput>,
    pub loan_early_payoff: bool,
    pub manual_debt_pay: bool,
    pub manual_debt_goal: f64,
    pub emergency_fund: Option<f64>,
    /// Whole percent of surplus routed to brokerage accounts.
    pub percent_surplus_to_invest: f64,
    pub years: Option<i16>,
    pub filing_status: Option<FilingStatus>,
    /// Flat tax override in whole percent.
    pub effective_tax_rate: Option<f64>,
    /// Annual growth of tax bracket bounds, whole percent.
    pub tax_inflation_rate: Option<f64>,
    pub make_hardship_distributions: bool,
    pub state_province: Option<String>,
}

/// Normalized run settings, echoed verbatim into the projection output.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Flags {
    pub years: i16,
    pub debt_policy: DebtPolicy,
    pub loan_early_payoff: bool,
    pub manual_debt_goal: f64,
    pub emergency_fund: f64,
    /// Fraction of surplus routed to brokerage accounts.
    pub percent_surplus_to_invest: f64,
    pub filing_status: FilingStatus,
    pub effective_tax_rate: Option<f64>,
    pub tax_inflation_rate: f64,
    pub make_hardship_distributions: bool,
    pub state: String,
}

impl FlagsInput {
    /// Resolve shorthands into engine settings. Filing status falls back on
    /// whether a spouse was given.
    pub fn resolve(&self, married: bool) -> Flags {
        let (debt_policy, loan_early_payoff) = match self.debt_pay_type {
            Some(DebtPayTypeInput::Project) => (DebtPolicy::Project, self.loan_early_payoff),
            Some(DebtPayTypeInput::ProjectWithEarlyLoanPayoff) => (DebtPolicy::Project, true),
            Some(DebtPayTypeInput::ManualDebtPay) => (DebtPolicy::ManualPay, self.loan_early_payoff),
            Some(DebtPayTypeInput::ManualDebtGoal) => (DebtPolicy::ManualGoal, self.loan_early_payoff),
            None if self.manual_debt_goal > 0.0 => (DebtPolicy::ManualGoal, self.loan_early_payoff),
            None if self.manual_debt_pay => (DebtPolicy::ManualPay, self.loan_early_payoff),
            None => (DebtPolicy::Project, self.loan_early_payoff),
        };

        let filing_status = self.filing_status.unwrap_or(if married {
            FilingStatus::MarriedFilingJointly
        } else {
            FilingStatus::Single
        });

        Flags {
            years: self.years.unwrap_or(DEFAULT_SIMULATION_YEARS),
            debt_policy,
            loan_early_payoff,
            manual_debt_goal: self.manual_debt_goal,
            emergency_fund: self.emergency_fund.unwrap_or(DEFAULT_EMERGENCY_FUND),
            percent_surplus_to_invest: percent(self.percent_surplus_to_invest),
            filing_status,
            effective_tax_rate: self.effective_tax_rate,
            tax_inflation_rate: self.tax_inflation_rate.unwrap_or(GENERAL_INFLATION_RATE),
            make_hardship_distributions: self.make_hardship_distributions,
            state: self.state_province.clone().unwrap_or_else(|| "NY".to_string()),
        }
    }
}

/// Top-level input to a projection run.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ProjectionInput {
    pub user: PersonInput,
    pub spouse: Option<PersonInput>,
    pub flags: FlagsInput,
    /// First simulated month; required for a reproducible run.
    pub start_date: Option<Date>,
}

impl ProjectionInput {
    pub fn is_married(&self) -> bool {
        self.spouse.is_some()
    }

    pub fn person(&self, owner: Owner) -> Option<&PersonInput> {
        match owner {
            Owner::User => Some(&self.user),
            Owner::Spouse => self.spouse.as_ref(),
        }
    }
}
