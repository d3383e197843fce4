use chrono::{Datelike, NaiveDate};

/// Gregorian leap-year rule.
pub fn is_leap_year(year: i32) -> bool {
    (year % 4 == 0 && year % 100 != 0) || year % 400 == 0
}

fn days_in_year(year: i32) -> u32 {
    if is_leap_year(year) { 366 } else { 365 }
}

/// Encodes a date as `year + day_of_year / days_in_year`, with a 1-based day of year.
///
/// Jan 1 therefore encodes slightly above the integer year, and Dec 31 of
/// every year reaches `year + 1.0`.
pub fn encode(date: NaiveDate) -> f64 {
    let year = date.year();
    f64::from(year) + f64::from(date.ordinal()) / f64::from(days_in_year(year))
}

/// The same month and day `years` calendar years earlier.
///
/// Feb 29 clamps to Feb 28 when the target year is not a leap year.
pub fn years_before(date: NaiveDate, years: u32) -> Option<NaiveDate> {
    let year = date.year() - i32::try_from(years).ok()?;
    NaiveDate::from_ymd_opt(year, date.month(), date.day())
        .or_else(|| NaiveDate::from_ymd_opt(year, date.month(), date.day() - 1))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn leap_year_rule() {
        assert!(is_leap_year(2024));
        assert!(!is_leap_year(2023));
        assert!(!is_leap_year(1900));
        assert!(is_leap_year(2000));
    }

    #[test]
    fn jan_first_and_dec_thirty_first() {
        assert!((encode(date(2023, 1, 1)) - (2023.0 + 1.0 / 365.0)).abs() < 1e-12);
        assert!((encode(date(2024, 1, 1)) - (2024.0 + 1.0 / 366.0)).abs() < 1e-12);
        // Dec 31 reaches the next integer in leap and common years alike.
        assert_eq!(encode(date(2024, 12, 31)), 2025.0);
        assert_eq!(encode(date(2023, 12, 31)), 2024.0);
        assert!((encode(date(2024, 12, 30)) - (2024.0 + 365.0 / 366.0)).abs() < 1e-12);
    }

    #[test]
    fn fractional_part_stays_within_bounds() {
        let mut day = date(2023, 1, 1);
        let end = date(2025, 1, 1);
        while day < end {
            let frac = encode(day) - f64::from(day.year());
            assert!(frac > 0.0 && frac <= 1.0, "{day}: {frac}");
            if frac == 1.0 {
                assert_eq!((day.month(), day.day()), (12, 31), "{day}");
            }
            day = day.succ_opt().unwrap();
        }
    }

    #[test]
    fn encoding_is_monotonic() {
        let mut day = date(2019, 12, 25);
        let mut previous = encode(day);
        for _ in 0..800 {
            day = day.succ_opt().unwrap();
            let current = encode(day);
            assert!(current > previous || (current - previous).abs() < 1e-12);
            previous = current;
        }
    }

    #[test]
    fn years_before_clamps_leap_day() {
        assert_eq!(years_before(date(2024, 2, 29), 1), Some(date(2023, 2, 28)));
        assert_eq!(years_before(date(2024, 2, 29), 4), Some(date(2020, 2, 29)));
        assert_eq!(years_before(date(2024, 6, 15), 3), Some(date(2021, 6, 15)));
    }
}
