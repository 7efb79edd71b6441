//! Recurring cash-flow streams and their month-by-month projections.
//!
//! A [`StreamItem`] is a recurring amount with a start date, an end date and
//! an annual inflation rate. [`StreamItem::project`] expands it into a
//! [`YearTable`]: one dollar figure per simulated calendar month, with
//! boundary months prorated by day count. Projection is a pure function of
//! the stream, so projecting twice always yields the same table.

use std::collections::BTreeMap;

use jiff::civil::{Date, date};
use serde::{Deserialize, Serialize};

use crate::date_math::days_in_month;
use crate::model::Period;
use crate::util::percent;

/// How far past the reference year an open-ended stream is assumed to run.
const OPEN_ENDED_YEARS: i16 = 100;

// ============================================================================
// YearTable
// ============================================================================

/// Dollar amounts per simulated month, keyed by year.
///
/// `BTreeMap` keeps iteration in calendar order for records and serde output.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct YearTable(pub BTreeMap<i16, [f64; 12]>);

impl YearTable {
    pub fn new() -> Self {
        YearTable(BTreeMap::new())
    }

    /// Amount in a given month; zero for months outside the table.
    pub fn amount(&self, period: Period) -> f64 {
        self.0
            .get(&period.year)
            .map_or(0.0, |months| months[period.month_index()])
    }

    pub fn set(&mut self, period: Period, value: f64) {
        self.0.entry(period.year).or_insert([0.0; 12])[period.month_index()] = value;
    }

    pub fn add(&mut self, period: Period, value: f64) {
        self.0.entry(period.year).or_insert([0.0; 12])[period.month_index()] += value;
    }

    /// Sum of all twelve months of a year.
    pub fn year_total(&self, year: i16) -> f64 {
        self.0.get(&year).map_or(0.0, |months| months.iter().sum())
    }

    /// Element-wise accumulate another table into this one.
    pub fn merge(&mut self, other: &YearTable) {
        for (year, months) in &other.0 {
            let slot = self.0.entry(*year).or_insert([0.0; 12]);
            for (i, v) in months.iter().enumerate() {
                slot[i] += v;
            }
        }
    }

    /// A new table holding the element-wise sum of the given tables.
    pub fn combined<'a>(tables: impl IntoIterator<Item = &'a YearTable>) -> YearTable {
        let mut out = YearTable::new();
        for t in tables {
            out.merge(t);
        }
        out
    }
}

// ============================================================================
// StreamItem
// ============================================================================

/// Kinds of spending streams.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SpendingKind {
    #[default]
    General,
    #[serde(alias = "medicalExpense")]
    Medical,
    /// A caller-scripted debt payment. Excluded from budgeted spending and
    /// never inflated; the manual debt-pay policy replays these directly.
    #[serde(alias = "loan_pay")]
    LoanPay,
}

/// Kinds of income streams.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum IncomeKind {
    #[default]
    Salary,
    Unemployment,
    SocialSecurity,
    Additional,
}

/// A recurring cash flow with a lifetime and an inflation schedule.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StreamItem {
    pub name: String,
    /// Monthly amount at the stream's start date.
    pub amount_monthly: f64,
    pub start: Date,
    pub end: Date,
    /// Annual inflation in whole percent, compounded from the start year.
    pub inflation_rate: f64,
}

impl StreamItem {
    /// Resolve a stream from raw input.
    ///
    /// A stream with no start date is treated as already running: it starts
    /// on January 1 of the year before `reference_year` and its amount is
    /// read as a present value in `reference_year` dollars, so it is
    /// deflated back to its nominal start-year amount before projection.
    /// A stream with no end date runs for [`OPEN_ENDED_YEARS`].
    pub fn resolve(
        name: impl Into<String>,
        amount_monthly: f64,
        start: Option<Date>,
        end: Option<Date>,
        inflation_rate: f64,
        is_present_value: bool,
        reference_year: i16,
    ) -> Self {
        let (start, present_value) = match start {
            Some(d) => (d, is_present_value),
            None => (date(reference_year - 1, 1, 1), true),
        };
        let end = end.unwrap_or_else(|| date(reference_year + OPEN_ENDED_YEARS, 12, 31));

        let amount_monthly = if present_value {
            let infl = percent(inflation_rate);
            amount_monthly * (1.0 + infl).powi((start.year() - reference_year) as i32)
        } else {
            amount_monthly
        };

        StreamItem { name: name.into(), amount_monthly, start, end, inflation_rate }
    }

    /// Yearly amount in a given calendar year, inflated from the start year.
    pub fn yearly_amount(&self, year: i16) -> f64 {
        let infl = percent(self.inflation_rate);
        self.amount_monthly * 12.0 * (1.0 + infl).powi((year - self.start.year()) as i32)
    }

    /// Fraction of a month the stream is active, prorated by day count at
    /// the boundary months.
    fn month_fraction(&self, year: i16, month: i8) -> f64 {
        let days = days_in_month(year, month) as f64;
        let starts_here = year == self.start.year() && month == self.start.month();
        let ends_here = year == self.end.year() && month == self.end.month();

        let before = (year, month) < (self.start.year(), self.start.month());
        let after = (year, month) > (self.end.year(), self.end.month());
        if before || after {
            return 0.0;
        }

        match (starts_here, ends_here) {
            (true, true) => (self.end.day() - self.start.day() + 1) as f64 / days,
            (true, false) => (days - self.start.day() as f64 + 1.0) / days,
            (false, true) => self.end.day() as f64 / days,
            (false, false) => 1.0,
        }
    }

    /// Expand the stream over the given inclusive year range.
    pub fn project(&self, first_year: i16, last_year: i16) -> YearTable {
        let mut table = YearTable::new();
        for year in first_year..=last_year {
            let monthly = self.yearly_amount(year) / 12.0;
            let mut months = [0.0; 12];
            let mut any = false;
            for (i, slot) in months.iter_mut().enumerate() {
                let fraction = self.month_fraction(year, (i + 1) as i8);
                if fraction > 0.0 {
                    *slot = monthly * fraction;
                    any = true;
                }
            }
            if any {
                table.0.insert(year, months);
            }
        }
        table
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn period(year: i16, month: i8) -> Period {
        Period::new(year, month)
    }

    #[test]
    fn projection_is_idempotent() {
        let s = StreamItem::resolve(
            "salary",
            5_000.0,
            Some(date(2025, 1, 1)),
            None,
            2.0,
            false,
            2025,
        );
        assert_eq!(s.project(2025, 2030), s.project(2025, 2030));
    }

    #[test]
    fn inflation_compounds_from_start_year() {
        let s = StreamItem::resolve(
            "rent",
            1_000.0,
            Some(date(2025, 1, 1)),
            None,
            2.0,
            false,
            2025,
        );
        let t = s.project(2025, 2027);
        assert!((t.amount(period(2025, 6)) - 1_000.0).abs() < 0.01);
        assert!((t.amount(period(2026, 6)) - 1_020.0).abs() < 0.01);
        assert!((t.amount(period(2027, 6)) - 1_040.40).abs() < 0.01);
    }

    #[test]
    fn present_value_deflates_to_start_year() {
        // Amount stated in 2025 dollars for a stream already running since 2024
        let s = StreamItem::resolve("groceries", 500.0, None, None, 2.0, true, 2025);
        assert_eq!(s.start, date(2024, 1, 1));
        let t = s.project(2024, 2025);
        assert!((t.amount(period(2024, 3)) - 500.0 / 1.02).abs() < 0.01);
        assert!((t.amount(period(2025, 3)) - 500.0).abs() < 0.01);
    }

    #[test]
    fn boundary_months_prorated_by_days() {
        let s = StreamItem::resolve(
            "contract",
            3_000.0,
            Some(date(2025, 4, 16)),
            Some(date(2025, 9, 15)),
            0.0,
            false,
            2025,
        );
        let t = s.project(2025, 2025);
        // April has 30 days; active on days 16..=30
        assert!((t.amount(period(2025, 4)) - 3_000.0 * 15.0 / 30.0).abs() < 0.01);
        assert!((t.amount(period(2025, 6)) - 3_000.0).abs() < 0.01);
        // September has 30 days; active on days 1..=15
        assert!((t.amount(period(2025, 9)) - 3_000.0 * 15.0 / 30.0).abs() < 0.01);
        assert_eq!(t.amount(period(2025, 3)), 0.0);
        assert_eq!(t.amount(period(2025, 10)), 0.0);
    }

    #[test]
    fn single_month_stream_prorates_by_span() {
        let s = StreamItem::resolve(
            "bonus",
            3_100.0,
            Some(date(2025, 1, 11)),
            Some(date(2025, 1, 20)),
            0.0,
            false,
            2025,
        );
        let t = s.project(2025, 2025);
        assert!((t.amount(period(2025, 1)) - 3_100.0 * 10.0 / 31.0).abs() < 0.01);
        assert_eq!(t.year_total(2025) > 0.0, true);
        assert_eq!(t.amount(period(2025, 2)), 0.0);
    }

    #[test]
    fn tables_merge_elementwise() {
        let a = StreamItem::resolve("a", 100.0, Some(date(2025, 1, 1)), None, 0.0, false, 2025)
            .project(2025, 2025);
        let b = StreamItem::resolve("b", 50.0, Some(date(2025, 1, 1)), None, 0.0, false, 2025)
            .project(2025, 2025);
        let sum = YearTable::combined([&a, &b]);
        assert!((sum.amount(period(2025, 7)) - 150.0).abs() < 0.01);
        assert!((sum.year_total(2025) - 1_800.0).abs() < 0.01);
    }
}
