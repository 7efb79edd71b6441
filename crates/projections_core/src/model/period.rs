//! The simulation clock position, passed explicitly to anything that needs it.

use jiff::civil::Date;
use serde::{Deserialize, Serialize};

use crate::date_math::{days_in_month, end_of_month, next_month};

/// A single simulated calendar month.
///
/// Months are 1-based. `Period` is `Copy` and handed down to accounts and
/// allocation routines rather than shared as mutable clock state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Period {
    pub year: i16,
    pub month: i8,
}

impl Period {
    pub fn new(year: i16, month: i8) -> Self {
        debug_assert!((1..=12).contains(&month));
        Period { year, month }
    }

    pub fn from_date(date: Date) -> Self {
        Period { year: date.year(), month: date.month() }
    }

    /// The following calendar month.
    pub fn next(self) -> Self {
        let (year, month) = next_month(self.year, self.month);
        Period { year, month }
    }

    pub fn first_day(self) -> Date {
        Date::constant(self.year, self.month, 1)
    }

    pub fn last_day(self) -> Date {
        end_of_month(self.year, self.month)
    }

    pub fn days_in_month(self) -> i8 {
        days_in_month(self.year, self.month)
    }

    pub fn is_december(self) -> bool {
        self.month == 12
    }

    /// Zero-based index into a 12-slot year table.
    pub fn month_index(self) -> usize {
        (self.month - 1) as usize
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use jiff::civil::date;

    #[test]
    fn period_stepping_and_bounds() {
        let p = Period::from_date(date(2025, 12, 18));
        assert_eq!(p, Period::new(2025, 12));
        assert!(p.is_december());
        assert_eq!(p.next(), Period::new(2026, 1));
        assert_eq!(p.first_day(), date(2025, 12, 1));
        assert_eq!(p.last_day(), date(2025, 12, 31));
        assert_eq!(p.month_index(), 11);
    }
}
