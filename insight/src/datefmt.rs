use chrono::{DateTime, Datelike, Days, Utc};

/// Label shown for articles published on the current calendar day.
pub const TODAY_LABEL: &str = "TODAY 🔥";
/// Label shown for articles published one calendar day earlier.
pub const YESTERDAY_LABEL: &str = "YESTERDAY";

/// Maps an ISO-8601 timestamp string to a coarse human label: "TODAY 🔥",
/// "YESTERDAY", or the date as `DD.MM.YYYY`.
///
/// Comparison is by calendar date in the timestamp's own offset, not by
/// elapsed hours: 23:50 yesterday is "YESTERDAY" even ten minutes later.
/// A string that does not parse is returned unchanged so a malformed record
/// never breaks the feed.
pub fn friendly_date(raw: &str, now: DateTime<Utc>) -> String {
    let dt = match DateTime::parse_from_rfc3339(raw) {
        Ok(dt) => dt,
        Err(_) => return raw.to_string(),
    };

    // Shift "now" into the timestamp's offset before comparing dates.
    let local_now = now.with_timezone(dt.offset());
    let date = dt.date_naive();

    if date == local_now.date_naive() {
        TODAY_LABEL.to_string()
    } else if Some(date) == local_now.date_naive().checked_sub_days(Days::new(1)) {
        YESTERDAY_LABEL.to_string()
    } else {
        format!("{:02}.{:02}.{:04}", date.day(), date.month(), date.year())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 2, 10, 0, 0).unwrap()
    }

    #[test]
    fn same_calendar_day_is_today() {
        assert_eq!(friendly_date("2024-01-02T08:00:00Z", now()), TODAY_LABEL);
        // Late in the day still counts
        assert_eq!(friendly_date("2024-01-02T23:59:59Z", now()), TODAY_LABEL);
    }

    #[test]
    fn previous_calendar_day_is_yesterday() {
        assert_eq!(
            friendly_date("2024-01-01T08:00:00Z", now()),
            YESTERDAY_LABEL
        );
        // Calendar comparison, not elapsed hours: 23:00 the day before is
        // "yesterday" even though fewer than 12 hours have passed.
        assert_eq!(
            friendly_date("2024-01-01T23:00:00Z", now()),
            YESTERDAY_LABEL
        );
    }

    #[test]
    fn older_dates_use_literal_format() {
        assert_eq!(friendly_date("2023-12-24T12:00:00Z", now()), "24.12.2023");
        assert_eq!(friendly_date("2022-07-01T00:00:00Z", now()), "01.07.2022");
    }

    #[test]
    fn comparison_uses_the_timestamps_own_offset() {
        // 2024-01-02 01:00 +03:00 is 2024-01-01 22:00 UTC, but in its own
        // offset the calendar date is the 2nd, so it is "today".
        assert_eq!(
            friendly_date("2024-01-02T01:00:00+03:00", now()),
            TODAY_LABEL
        );
    }

    #[test]
    fn unparsable_input_is_returned_unchanged() {
        assert_eq!(friendly_date("not-a-date", now()), "not-a-date");
        assert_eq!(friendly_date("", now()), "");
        assert_eq!(friendly_date("2024-13-45", now()), "2024-13-45");
    }
}
