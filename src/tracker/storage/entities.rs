use std::{fmt::Display, str::FromStr, sync::Arc};

use chrono::{Duration, NaiveDateTime, Timelike};

use crate::utils::time::{datetime_to_record_time, format_hms, parse_hms, record_time_to_datetime};

/// Name of an activity. Task names are shared between the task list, the timer and every
/// record, hence the [Arc].
pub type Task = Arc<str>;

/// One line of the log file. Records are only ever appended, never edited.
///
/// On disk a record looks like `2018-07-04 10:15:00, Work on Project, 01:02:03`, where the
/// timestamp is the local time the interval ended at.
#[derive(PartialEq, Eq, Debug, Clone)]
pub struct LogRecord {
    pub recorded_at: NaiveDateTime,
    pub task: Task,
    /// Always whole seconds.
    pub duration: Duration,
}

impl LogRecord {
    pub fn new(recorded_at: NaiveDateTime, task: Task, duration: Duration) -> Self {
        Self {
            recorded_at: recorded_at.with_nanosecond(0).unwrap_or(recorded_at),
            task,
            duration: Duration::seconds(duration.num_seconds().max(0)),
        }
    }

    /// The record as a full line, newline included.
    pub fn to_line(&self) -> String {
        let mut line = self.to_string();
        line.push('\n');
        line
    }
}

impl Display for LogRecord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}, {}, {}",
            datetime_to_record_time(self.recorded_at),
            self.task,
            format_hms(self.duration)
        )
    }
}

#[derive(Debug, PartialEq, Eq)]
pub enum RecordParseError {
    MissingFields,
    Timestamp(String),
    EmptyTask,
    Duration(String),
}

impl Display for RecordParseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RecordParseError::MissingFields => {
                write!(f, "expected `timestamp, task, duration`")
            }
            RecordParseError::Timestamp(e) => write!(f, "illegal timestamp: {e}"),
            RecordParseError::EmptyTask => write!(f, "task name is empty"),
            RecordParseError::Duration(e) => write!(f, "illegal duration: {e}"),
        }
    }
}

impl std::error::Error for RecordParseError {}

impl FromStr for LogRecord {
    type Err = RecordParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let line = s.trim_end_matches(['\r', '\n']);
        // Task names may contain commas themselves, so only the outer fields are split off.
        let (timestamp, rest) = line
            .split_once(',')
            .ok_or(RecordParseError::MissingFields)?;
        let (task, duration) = rest
            .rsplit_once(',')
            .ok_or(RecordParseError::MissingFields)?;

        let recorded_at = record_time_to_datetime(timestamp.trim())
            .map_err(|e| RecordParseError::Timestamp(e.to_string()))?;
        let task = task.trim();
        if task.is_empty() {
            return Err(RecordParseError::EmptyTask);
        }
        let duration = parse_hms(duration).map_err(|e| RecordParseError::Duration(e.to_string()))?;

        Ok(LogRecord {
            recorded_at,
            task: task.into(),
            duration,
        })
    }
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, NaiveDate, NaiveDateTime, NaiveTime};

    use super::{LogRecord, RecordParseError};

    const TEST_MOMENT: NaiveDateTime = NaiveDateTime::new(
        NaiveDate::from_ymd_opt(2018, 7, 4).unwrap(),
        NaiveTime::from_hms_opt(9, 5, 3).unwrap(),
    );

    #[test]
    fn test_record_line_format() {
        let record = LogRecord::new(TEST_MOMENT, "Break".into(), Duration::milliseconds(125_900));
        assert_eq!(record.to_line(), "2018-07-04 09:05:03, Break, 00:02:05\n");
    }

    #[test]
    fn test_record_parsing() {
        let record = "2018-07-04 09:05:03, Work on Project, 01:00:01"
            .parse::<LogRecord>()
            .unwrap();
        assert_eq!(record.recorded_at, TEST_MOMENT);
        assert_eq!(&*record.task, "Work on Project");
        assert_eq!(record.duration, Duration::seconds(3601));
    }

    #[test]
    fn test_record_parsing_task_with_comma() {
        let record = "2018-07-04 09:05:03, Email, chat, 00:00:10\r\n"
            .parse::<LogRecord>()
            .unwrap();
        assert_eq!(&*record.task, "Email, chat");
        assert_eq!(record.duration, Duration::seconds(10));
    }

    #[test]
    fn test_record_parsing_errors() {
        assert_eq!(
            "garbage".parse::<LogRecord>(),
            Err(RecordParseError::MissingFields)
        );
        assert_eq!(
            "2018-07-04 09:05:03, 00:00:10".parse::<LogRecord>(),
            Err(RecordParseError::MissingFields)
        );
        assert_eq!(
            "2018-07-04 09:05:03, , 00:00:10".parse::<LogRecord>(),
            Err(RecordParseError::EmptyTask)
        );
        assert!(matches!(
            "yesterday, Break, 00:00:10".parse::<LogRecord>(),
            Err(RecordParseError::Timestamp(_))
        ));
        assert!(matches!(
            "2018-07-04 09:05:03, Break, ten".parse::<LogRecord>(),
            Err(RecordParseError::Duration(_))
        ));
    }
}
