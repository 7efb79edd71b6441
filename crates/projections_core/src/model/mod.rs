mod accounts;
mod actions;
mod ids;
mod period;
mod records;
mod results;
mod streams;

pub use accounts::{
    Account, AccountCategory, AccountKind, AccountSnapshot, AnnualActivity, BankAccount, BankKind,
    CreditCard, DebtBalance, FixedRateLoan, GrowthOutcome, InvestmentAccount, InvestmentInput,
    InvestmentKind, RETIREMENT_WITHDRAWAL_AGE, WithdrawalOutcome,
};
pub use actions::{Action, DebtPaymentKind};
pub use ids::{AccountId, Owner, ShadowKey};
pub use period::Period;
pub use records::{
    Alert, AlertLevel, Alerts, MonthlyAnalysis, MonthlyRecord, ProjectionRecord, YearIncomeRecord,
    YearRecord, YearTaxSummary,
};
pub use results::{IncomeStreamInfo, Projection, SpendingStreamInfo, StreamInfo};
pub use streams::{IncomeKind, SpendingKind, StreamItem, YearTable};
