//! Month arithmetic on calendar dates.

use std::ops::RangeInclusive;

use time::{Date, Duration};

/// The first day of the month that `date` falls in.
pub fn first_day_of_month(date: Date) -> Date {
    date - Duration::days(i64::from(date.day() - 1))
}

/// The last day of the month that `date` falls in.
pub fn last_day_of_month(date: Date) -> Date {
    let days_in_month = date.month().length(date.year());

    date + Duration::days(i64::from(days_in_month - date.day()))
}

/// Every day of the month that `date` falls in.
pub fn month_range(date: Date) -> RangeInclusive<Date> {
    first_day_of_month(date)..=last_day_of_month(date)
}

/// The date with the same day of the month as `date`, in the month and year
/// of `month`.
///
/// Days that do not exist in the target month (e.g. the 31st in April)
/// become the last day of that month.
pub fn same_day_in_month(date: Date, month: Date) -> Date {
    month
        .replace_day(date.day())
        .unwrap_or_else(|_| last_day_of_month(month))
}
