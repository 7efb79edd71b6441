//! Calendar arithmetic helpers for the monthly projection loop.
//!
//! The loop only ever needs whole-month stepping, day counts within a month,
//! and fractional-year differences for ages. These avoid `jiff::Span`
//! construction on the hot path and work directly on `(year, month)` pairs.

use jiff::civil::Date;

/// Fast leap year check.
#[inline]
pub fn is_leap_year(year: i16) -> bool {
    (year % 4 == 0 && year % 100 != 0) || (year % 400 == 0)
}

/// Days in a civil month without building a `jiff::civil::Date`.
#[inline]
pub fn days_in_month(year: i16, month: i8) -> i8 {
    const DAYS: [i8; 12] = [31, 28, 31, 30, 31, 30, 31, 31, 30, 31, 30, 31];
    if month == 2 && is_leap_year(year) {
        29
    } else {
        DAYS[(month - 1) as usize]
    }
}

/// Step a `(year, month)` pair forward by one calendar month.
#[inline]
pub fn next_month(year: i16, month: i8) -> (i16, i8) {
    if month == 12 { (year + 1, 1) } else { (year, month + 1) }
}

/// Whole months from `from` to `to`, ignoring day-of-month.
///
/// Negative when `to` is before `from`.
#[inline]
pub fn months_between(from: Date, to: Date) -> i32 {
    (to.year() as i32 - from.year() as i32) * 12 + (to.month() as i32 - from.month() as i32)
}

/// Fractional years from `from` to `to`, at month resolution.
///
/// Used for ages, where the rules care about thresholds like 59.5.
#[inline]
pub fn years_between(from: Date, to: Date) -> f64 {
    months_between(from, to) as f64 / 12.0
}

/// Last day of the month containing the given year/month.
#[inline]
pub fn end_of_month(year: i16, month: i8) -> Date {
    Date::constant(year, month, days_in_month(year, month))
}

/// The same calendar day `years` back, clamping Feb 29 to Feb 28.
pub fn years_before(day: Date, years: i16) -> Date {
    let year = day.year() - years;
    let clamped = day.day().min(days_in_month(year, day.month()));
    Date::constant(year, day.month(), clamped)
}

#[cfg(test)]
mod tests {
    use super::*;
    use jiff::civil::date;

    #[test]
    fn leap_years() {
        assert!(is_leap_year(2024));
        assert!(is_leap_year(2000));
        assert!(!is_leap_year(1900));
        assert!(!is_leap_year(2023));
    }

    #[test]
    fn month_lengths() {
        assert_eq!(days_in_month(2024, 2), 29);
        assert_eq!(days_in_month(2023, 2), 28);
        assert_eq!(days_in_month(2025, 4), 30);
        assert_eq!(days_in_month(2025, 12), 31);
    }

    #[test]
    fn month_stepping_wraps_year() {
        assert_eq!(next_month(2025, 11), (2025, 12));
        assert_eq!(next_month(2025, 12), (2026, 1));
    }

    #[test]
    fn month_and_year_differences() {
        let a = date(2020, 3, 15);
        let b = date(2021, 3, 1);
        assert_eq!(months_between(a, b), 12);
        assert_eq!(months_between(b, a), -12);

        let dob = date(1990, 6, 1);
        let now = date(2049, 12, 1);
        let age = years_between(dob, now);
        assert!((age - 59.5).abs() < 1e-9, "age was {age}");
    }

    #[test]
    fn end_of_month_handles_february() {
        assert_eq!(end_of_month(2024, 2), date(2024, 2, 29));
        assert_eq!(end_of_month(2025, 2), date(2025, 2, 28));
    }

    #[test]
    fn years_before_clamps_leap_days() {
        assert_eq!(years_before(date(2025, 3, 15), 25), date(2000, 3, 15));
        assert_eq!(years_before(date(2024, 2, 29), 1), date(2023, 2, 28));
    }
}
