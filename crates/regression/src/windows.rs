use crate::calendar::years_before;
use chrono::{Datelike, NaiveDate};
use core_types::{CoreError, Window, WindowLabel};

/// The latest calendar year that has fully ended before `as_of`.
///
/// The year containing `as_of` is never complete, including on Dec 31: the
/// as-of date is normally the day of the run, whose close may not exist yet.
pub fn most_recent_complete_year(as_of: NaiveDate) -> i32 {
    as_of.year() - 1
}

/// Produces the analysis windows for a run, in `WindowLabel::ALL` order.
///
/// Trailing windows end on `as_of` and start the same month and day one, two,
/// or three years earlier. `PriorYear2` and `PriorYear3` are the two full
/// calendar years (Jan 1 through Dec 31) preceding the most recent complete
/// year.
pub fn generate_windows(as_of: NaiveDate) -> Result<Vec<Window>, CoreError> {
    let complete = most_recent_complete_year(as_of);

    WindowLabel::ALL
        .iter()
        .map(|&label| match label.trailing_years() {
            Some(years) => {
                let start = years_before(as_of, years).ok_or_else(|| {
                    CoreError::DateOutOfRange(format!("{years} years before {as_of}"))
                })?;
                Window::new(label, start, as_of)
            }
            None => {
                let year = match label {
                    WindowLabel::PriorYear2 => complete - 1,
                    _ => complete - 2,
                };
                calendar_year(label, year)
            }
        })
        .collect()
}

fn calendar_year(label: WindowLabel, year: i32) -> Result<Window, CoreError> {
    let start = NaiveDate::from_ymd_opt(year, 1, 1)
        .ok_or_else(|| CoreError::DateOutOfRange(format!("Jan 1 of {year}")))?;
    let end = NaiveDate::from_ymd_opt(year, 12, 31)
        .ok_or_else(|| CoreError::DateOutOfRange(format!("Dec 31 of {year}")))?;
    Window::new(label, start, end)
}
