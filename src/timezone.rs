//! Resolving "today" in a named time zone.

use time::{Date, OffsetDateTime, UtcOffset};
use time_tz::{Offset, TimeZone};

use crate::Error;

/// The time zone used when none is configured.
pub const DEFAULT_TIMEZONE: &str = "Etc/UTC";

/// The current UTC offset of a canonical time zone, e.g. "Pacific/Auckland".
///
/// Returns `None` if the time zone is not known.
pub fn get_local_offset(canonical_timezone: &str) -> Option<UtcOffset> {
    time_tz::timezones::get_by_name(canonical_timezone)
        .map(|tz| tz.get_offset_utc(&OffsetDateTime::now_utc()).to_utc())
}

/// Today's date in `canonical_timezone`.
///
/// # Errors
/// Returns an [Error::InvalidTimezone] if the time zone is not known.
pub fn local_today(canonical_timezone: &str) -> Result<Date, Error> {
    let offset = get_local_offset(canonical_timezone)
        .ok_or_else(|| Error::InvalidTimezone(canonical_timezone.to_owned()))?;

    Ok(OffsetDateTime::now_utc().to_offset(offset).date())
}

#[cfg(test)]
mod tests {
    use time::OffsetDateTime;

    use crate::Error;

    use super::{DEFAULT_TIMEZONE, get_local_offset, local_today};

    #[test]
    fn utc_has_zero_offset() {
        assert_eq!(get_local_offset(DEFAULT_TIMEZONE), Some(time::UtcOffset::UTC));
    }

    #[test]
    fn unknown_timezone_is_an_error() {
        assert_eq!(get_local_offset("Mars/Olympus_Mons"), None);
        assert_eq!(
            local_today("Mars/Olympus_Mons"),
            Err(Error::InvalidTimezone("Mars/Olympus_Mons".to_owned()))
        );
    }

    #[test]
    fn today_is_within_a_day_of_utc() {
        let utc_today = OffsetDateTime::now_utc().date();

        let today = local_today("Pacific/Auckland").expect("Could not get local date");

        assert!((today - utc_today).whole_days().abs() <= 1);
    }
}
