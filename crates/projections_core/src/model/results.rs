//! The final output of a projection run.

use jiff::Zoned;
use jiff::civil::Date;
use serde::{Deserialize, Serialize};

use crate::config::Flags;
use crate::model::accounts::AccountSnapshot;
use crate::model::records::{Alerts, ProjectionRecord};
use crate::model::streams::{IncomeKind, SpendingKind};

/// Summary of an income stream after withholding was worked out.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IncomeStreamInfo {
    pub name: String,
    pub kind: IncomeKind,
    pub start: Date,
    pub end: Date,
    pub inflation_rate: f64,
    /// Effective income tax withholding rate, as a fraction.
    pub income_tax_rate: f64,
    /// Effective FICA withholding rate, as a fraction.
    pub fica_tax_rate: f64,
    pub gross_monthly: f64,
    pub gross_yearly: f64,
    pub net_monthly: f64,
    pub net_yearly: f64,
    /// Warnings raised while resolving the stream, e.g. over-limit plan
    /// contributions.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub notes: Vec<String>,
}

/// Summary of a spending stream as resolved from the input.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SpendingStreamInfo {
    pub name: String,
    pub kind: SpendingKind,
    pub start: Date,
    pub end: Date,
    pub inflation_rate: f64,
    pub amount_monthly: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StreamInfo {
    pub income: Vec<IncomeStreamInfo>,
    pub spending: Vec<SpendingStreamInfo>,
}

/// Everything a projection run produces.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Projection {
    /// Wall-clock time the run was generated.
    pub generated_at: Zoned,
    /// The run settings after shorthand resolution.
    pub flags: Flags,
    /// Streams as resolved at the start of the run.
    pub streams: StreamInfo,
    /// Accounts as they stood at the start of the run.
    pub accounts: Vec<AccountSnapshot>,
    /// Month-by-month timeline, keyed by year.
    pub record: ProjectionRecord,
    pub alerts: Alerts,
}
