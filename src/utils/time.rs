use chrono::{DateTime, Duration, NaiveDate, NaiveTime, TimeZone, Utc};

/// The only date format accepted from users and used for storing day buckets.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Short format used when listing days on the dashboard.
pub const SHORT_DATE_FORMAT: &str = "%m/%d/%Y";

pub fn parse_date(value: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(value.trim(), DATE_FORMAT).ok()
}

pub fn short_date(date: NaiveDate) -> String {
    date.format(SHORT_DATE_FORMAT).to_string()
}

/// Returns the first instant of `date` in `tz`. When midnight falls into a DST gap the day starts
/// at the first local time that exists.
pub fn day_start<Tz: TimeZone>(date: NaiveDate, tz: &Tz) -> Option<DateTime<Utc>> {
    let midnight = date.and_time(NaiveTime::MIN);
    (0..=3)
        .map(|hours| midnight + Duration::hours(hours))
        .find_map(|local| tz.from_local_datetime(&local).earliest())
        .map(|v| v.with_timezone(&Utc))
}

/// Returns the half open interval of instants that make up `date` in `tz`.
pub fn day_bounds<Tz: TimeZone>(date: NaiveDate, tz: &Tz) -> Option<(DateTime<Utc>, DateTime<Utc>)> {
    let start = day_start(date, tz)?;
    let end = day_start(date.succ_opt()?, tz)?;
    Some((start, end))
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, NaiveDate, TimeZone, Utc};
    use chrono_tz::America::{New_York, Santiago};

    use super::{day_bounds, day_start, parse_date, short_date};

    #[test]
    fn test_parse_date() {
        assert_eq!(parse_date("2023-03-15"), NaiveDate::from_ymd_opt(2023, 3, 15));
        assert_eq!(parse_date("15/03/2023"), None);
        assert_eq!(parse_date("2023-02-30"), None);
    }

    #[test]
    fn test_short_date() {
        assert_eq!(short_date(NaiveDate::from_ymd_opt(2023, 3, 5).unwrap()), "03/05/2023");
    }

    #[test]
    fn test_dst_day_is_shorter() {
        let date = NaiveDate::from_ymd_opt(2023, 3, 12).unwrap();
        let (start, end) = day_bounds(date, &New_York).unwrap();
        assert_eq!(start, Utc.with_ymd_and_hms(2023, 3, 12, 5, 0, 0).unwrap());
        assert_eq!(end - start, Duration::hours(23));
    }

    #[test]
    fn test_midnight_in_gap() {
        // Chile moved clocks from 00:00 to 01:00 on 2022-09-11.
        let date = NaiveDate::from_ymd_opt(2022, 9, 11).unwrap();
        let start = day_start(date, &Santiago).unwrap();
        assert_eq!(start, Utc.with_ymd_and_hms(2022, 9, 11, 4, 0, 0).unwrap());
    }
}
