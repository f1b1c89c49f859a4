use anyhow::{anyhow, bail, Result};
use chrono::{Duration, NaiveDate, NaiveDateTime};

/// Format of the timestamp column in the log file.
pub const RECORD_TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// This is the standard way of converting a timestamp to a string in tasktimer.
pub fn datetime_to_record_time(moment: NaiveDateTime) -> String {
    moment.format(RECORD_TIME_FORMAT).to_string()
}

pub fn record_time_to_datetime(value: &str) -> Result<NaiveDateTime> {
    Ok(NaiveDateTime::parse_from_str(value, RECORD_TIME_FORMAT)?)
}

/// Formats a duration as zero padded `HH:MM:SS`. Hours are not wrapped at 24, and
/// negative durations are shown as zero.
pub fn format_hms(duration: Duration) -> String {
    let seconds = duration.num_seconds().max(0);
    format!(
        "{:02}:{:02}:{:02}",
        seconds / 3600,
        (seconds % 3600) / 60,
        seconds % 60
    )
}

/// Inverse of [format_hms]. Minutes and seconds have to be below 60.
pub fn parse_hms(value: &str) -> Result<Duration> {
    let mut parts = value.trim().split(':');
    let (Some(hours), Some(minutes), Some(seconds), None) =
        (parts.next(), parts.next(), parts.next(), parts.next())
    else {
        bail!("Expected HH:MM:SS, got {value:?}");
    };
    let field = |v: &str| -> Result<i64> {
        if v.is_empty() || !v.bytes().all(|b| b.is_ascii_digit()) {
            Err(anyhow!("Illegal duration component {v:?} in {value:?}"))
        } else {
            Ok(v.parse::<i64>()?)
        }
    };
    let (hours, minutes, seconds) = (field(hours)?, field(minutes)?, field(seconds)?);
    if minutes >= 60 || seconds >= 60 {
        bail!("Minutes and seconds should be below 60 in {value:?}");
    }
    hours
        .checked_mul(3600)
        .and_then(|v| v.checked_add(minutes * 60 + seconds))
        .and_then(Duration::try_seconds)
        .ok_or_else(|| anyhow!("Duration {value:?} is out of range"))
}

/// Adds durations, sticking at [Duration::MAX] instead of overflowing.
pub fn saturating_add(a: Duration, b: Duration) -> Duration {
    a.checked_add(&b).unwrap_or(if b < Duration::zero() {
        Duration::MIN
    } else {
        Duration::MAX
    })
}

/// Returns `n` days going backwards starting from `today` (inclusive).
pub fn last_n_days(today: NaiveDate, n: u32) -> impl Iterator<Item = NaiveDate> {
    std::iter::successors(Some(today), |day| day.pred_opt()).take(n as usize)
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, NaiveDate};

    use super::{format_hms, last_n_days, parse_hms, saturating_add};

    #[test]
    fn test_format_hms() {
        assert_eq!(format_hms(Duration::seconds(125)), "00:02:05");
        assert_eq!(format_hms(Duration::zero()), "00:00:00");
        assert_eq!(format_hms(Duration::seconds(3600 * 27 + 61)), "27:01:01");
        assert_eq!(format_hms(Duration::milliseconds(1999)), "00:00:01");
        assert_eq!(format_hms(Duration::seconds(-5)), "00:00:00");
    }

    #[test]
    fn test_parse_hms() {
        assert_eq!(parse_hms("00:02:05").unwrap(), Duration::seconds(125));
        assert_eq!(parse_hms(" 101:00:00 ").unwrap(), Duration::hours(101));
        assert!(parse_hms("00:60:00").is_err());
        assert!(parse_hms("00:00").is_err());
        assert!(parse_hms("00:00:00:00").is_err());
        assert!(parse_hms("-1:00:00").is_err());
        assert!(parse_hms("aa:00:00").is_err());
    }

    #[test]
    fn test_parse_hms_out_of_range() {
        assert!(parse_hms("3000000000000:00:00").is_err());
        assert!(parse_hms("99999999999999999999:00:00").is_err());
        assert!(parse_hms("2562047788016:00:00").is_err());
    }

    #[test]
    fn test_saturating_add() {
        let big = parse_hms("2000000000000:00:00").unwrap();
        assert_eq!(saturating_add(big, big), Duration::MAX);
        assert_eq!(
            saturating_add(Duration::seconds(5), Duration::seconds(7)),
            Duration::seconds(12)
        );
    }

    #[test]
    fn test_last_n_days() {
        let today = NaiveDate::from_ymd_opt(2018, 3, 2).unwrap();
        let days = last_n_days(today, 3).collect::<Vec<_>>();
        assert_eq!(
            days,
            vec![
                today,
                NaiveDate::from_ymd_opt(2018, 3, 1).unwrap(),
                NaiveDate::from_ymd_opt(2018, 2, 28).unwrap(),
            ]
        );
        assert_eq!(last_n_days(today, 0).count(), 0);
    }
}
