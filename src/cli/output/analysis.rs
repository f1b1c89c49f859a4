use std::collections::HashMap;

use chrono::{Duration, NaiveDate};

use crate::{
    tracker::{
        storage::entities::{LogRecord, Task},
        InProgress,
    },
    utils::time::{last_n_days, saturating_add},
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskUsage {
    pub task: Task,
    pub duration: Duration,
}

/// Per-task duration sums. Tasks keep the order they first showed up in, so the same log always
/// produces the same chart. Sums saturate, a hand-edited log can hold absurd durations.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Bucket {
    usages: Vec<TaskUsage>,
    positions: HashMap<Task, usize>,
}

impl Bucket {
    pub fn add(&mut self, task: &Task, duration: Duration) {
        match self.positions.get(task) {
            Some(&index) => {
                let usage = &mut self.usages[index];
                usage.duration = saturating_add(usage.duration, duration);
            }
            None => {
                self.positions.insert(task.clone(), self.usages.len());
                self.usages.push(TaskUsage {
                    task: task.clone(),
                    duration,
                });
            }
        }
    }

    pub fn merge(&mut self, other: &Bucket) {
        for usage in &other.usages {
            self.add(&usage.task, usage.duration);
        }
    }

    pub fn get(&self, task: &str) -> Option<Duration> {
        self.positions.get(task).map(|&i| self.usages[i].duration)
    }

    pub fn usages(&self) -> &[TaskUsage] {
        &self.usages
    }

    pub fn total(&self) -> Duration {
        self.usages
            .iter()
            .fold(Duration::zero(), |sum, usage| saturating_add(sum, usage.duration))
    }

    pub fn is_empty(&self) -> bool {
        self.usages.is_empty()
    }
}

/// Sums records logged on `date`. When a task is in progress, `today` is the day it counts
/// towards: its elapsed time is added if `date` is `today`.
pub fn bucket_for_day(
    records: &[LogRecord],
    date: NaiveDate,
    today: NaiveDate,
    in_progress: Option<&InProgress>,
) -> Bucket {
    let mut bucket = Bucket::default();
    for record in records.iter().filter(|r| r.recorded_at.date() == date) {
        bucket.add(&record.task, record.duration);
    }
    if let Some(in_progress) = in_progress.filter(|_| date == today) {
        bucket.add(&in_progress.task, in_progress.elapsed);
    }
    bucket
}

/// Merges [bucket_for_day] of `today` and the `n - 1` days before it.
pub fn bucket_for_last_n_days(
    records: &[LogRecord],
    today: NaiveDate,
    n: u32,
    in_progress: Option<&InProgress>,
) -> Bucket {
    last_n_days(today, n).fold(Bucket::default(), |mut bucket, day| {
        bucket.merge(&bucket_for_day(records, day, today, in_progress));
        bucket
    })
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, NaiveDate, NaiveDateTime, NaiveTime};

    use crate::tracker::{storage::entities::LogRecord, InProgress};

    use super::{bucket_for_day, bucket_for_last_n_days, Bucket};

    const TODAY: NaiveDate = NaiveDate::from_ymd_opt(2018, 7, 10).unwrap();

    fn record(days_ago: i64, hour: u32, task: &str, seconds: i64) -> LogRecord {
        LogRecord::new(
            NaiveDateTime::new(
                TODAY - Duration::days(days_ago),
                NaiveTime::from_hms_opt(hour, 0, 0).unwrap(),
            ),
            task.into(),
            Duration::seconds(seconds),
        )
    }

    fn test_records() -> Vec<LogRecord> {
        vec![
            record(8, 9, "Break", 1000),
            record(6, 9, "Meeting", 60),
            record(1, 23, "Break", 30),
            record(0, 0, "Work on Project", 600),
            record(0, 9, "Break", 20),
            record(0, 12, "Work on Project", 400),
            record(6, 10, "Break", 5),
            record(7, 10, "Meeting", 5000),
        ]
    }

    fn as_pairs(bucket: &Bucket) -> Vec<(&str, i64)> {
        bucket
            .usages()
            .iter()
            .map(|u| (&*u.task, u.duration.num_seconds()))
            .collect()
    }

    #[test]
    fn test_bucket_for_day() {
        let records = test_records();
        let bucket = bucket_for_day(&records, TODAY, TODAY, None);

        assert_eq!(as_pairs(&bucket), vec![("Work on Project", 1000), ("Break", 20)]);
        assert_eq!(bucket.total(), Duration::seconds(1020));
    }

    #[test]
    fn test_bucket_total_matches_records() {
        let records = test_records();
        for days_ago in 0..10 {
            let date = TODAY - Duration::days(days_ago);
            let expected = records
                .iter()
                .filter(|r| r.recorded_at.date() == date)
                .fold(Duration::zero(), |sum, r| sum + r.duration);
            assert_eq!(bucket_for_day(&records, date, TODAY, None).total(), expected);
        }
    }

    #[test]
    fn test_in_progress_only_counts_today() {
        let records = test_records();
        let in_progress = InProgress {
            task: "Meeting".into(),
            elapsed: Duration::seconds(42),
        };

        let today = bucket_for_day(&records, TODAY, TODAY, Some(&in_progress));
        assert_eq!(
            as_pairs(&today),
            vec![("Work on Project", 1000), ("Break", 20), ("Meeting", 42)]
        );

        let yesterday = bucket_for_day(&records, TODAY - Duration::days(1), TODAY, Some(&in_progress));
        assert_eq!(as_pairs(&yesterday), vec![("Break", 30)]);
    }

    #[test]
    fn test_in_progress_adds_to_existing_entry() {
        let records = test_records();
        let in_progress = InProgress {
            task: "Break".into(),
            elapsed: Duration::seconds(5),
        };
        let today = bucket_for_day(&records, TODAY, TODAY, Some(&in_progress));
        assert_eq!(today.get("Break"), Some(Duration::seconds(25)));
    }

    #[test]
    fn test_huge_durations_saturate() {
        let records = vec![
            record(0, 9, "Break", 2_000_000_000_000 * 3600),
            record(0, 10, "Break", 2_000_000_000_000 * 3600),
            record(0, 11, "Meeting", 2_000_000_000_000 * 3600),
        ];

        let bucket = bucket_for_day(&records, TODAY, TODAY, None);

        assert_eq!(bucket.get("Break"), Some(Duration::MAX));
        assert_eq!(bucket.total(), Duration::MAX);
        let week = bucket_for_last_n_days(&records, TODAY, 7, None);
        assert_eq!(week.get("Meeting"), Some(Duration::seconds(2_000_000_000_000 * 3600)));
    }

    #[test]
    fn test_last_n_days() {
        let records = test_records();
        let week = bucket_for_last_n_days(&records, TODAY, 7, None);

        // 8 and 7 days ago are outside of the window.
        assert_eq!(
            as_pairs(&week),
            vec![("Work on Project", 1000), ("Break", 55), ("Meeting", 60)]
        );

        let mut expected = Bucket::default();
        for days_ago in 0..7 {
            expected.merge(&bucket_for_day(
                &records,
                TODAY - Duration::days(days_ago),
                TODAY,
                None,
            ));
        }
        assert_eq!(week, expected);
        assert_eq!(week, bucket_for_last_n_days(&records, TODAY, 7, None));
    }

    #[test]
    fn test_last_n_days_with_in_progress() {
        let records = test_records();
        let in_progress = InProgress {
            task: "Read Documentation".into(),
            elapsed: Duration::seconds(7),
        };
        let week = bucket_for_last_n_days(&records, TODAY, 7, Some(&in_progress));
        assert_eq!(week.get("Read Documentation"), Some(Duration::seconds(7)));
        assert!(bucket_for_last_n_days(&records, TODAY, 0, Some(&in_progress)).is_empty());
    }
}
