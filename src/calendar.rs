//! Calendar-month helpers for the reporting and stats queries.

use time::{Date, Month};

/// The first and last day of the given calendar month.
pub fn month_bounds(year: i32, month: Month) -> (Date, Date) {
    let first = Date::from_calendar_date(year, month, 1)
        .expect("the first of a month is a valid calendar date");
    let last = Date::from_calendar_date(year, month, month.length(year))
        .expect("the last of a month is a valid calendar date");

    (first, last)
}

/// The calendar month `count` months before the given one.
pub fn months_before(year: i32, month: Month, count: u32) -> (i32, Month) {
    let mut year = year;
    let mut month = month;

    for _ in 0..count {
        month = month.previous();
        if month == Month::December {
            year -= 1;
        }
    }

    (year, month)
}

/// The three-letter label for a month, as shown in spending charts.
pub fn short_month_name(month: Month) -> &'static str {
    match month {
        Month::January => "Jan",
        Month::February => "Feb",
        Month::March => "Mar",
        Month::April => "Apr",
        Month::May => "May",
        Month::June => "Jun",
        Month::July => "Jul",
        Month::August => "Aug",
        Month::September => "Sep",
        Month::October => "Oct",
        Month::November => "Nov",
        Month::December => "Dec",
    }
}
