use chrono::{DateTime, Duration, Local};

use super::storage::entities::{LogRecord, Task};

/// State of the single timer. There is never more than one task running.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum TimerState {
    #[default]
    Idle,
    Running {
        task: Task,
        started_at: DateTime<Local>,
    },
}

/// What a user action did to the timer. `closed` holds the record that has to be logged.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transition {
    pub closed: Option<LogRecord>,
    pub started: Option<Task>,
}

impl TimerState {
    pub fn is_running(&self) -> bool {
        matches!(self, TimerState::Running { .. })
    }

    pub fn active_task(&self) -> Option<&Task> {
        match self {
            TimerState::Idle => None,
            TimerState::Running { task, .. } => Some(task),
        }
    }

    /// Elapsed time of the running task rounded down to whole seconds.
    pub fn elapsed(&self, now: DateTime<Local>) -> Option<Duration> {
        match self {
            TimerState::Idle => None,
            TimerState::Running { started_at, .. } => Some(whole_seconds(now - *started_at)),
        }
    }

    /// Clicking a task. Starts it when idle, stops it when it's already running, and closes the
    /// running task and starts the new one at the same instant otherwise.
    pub fn click(&mut self, task: Task, now: DateTime<Local>) -> Transition {
        if self.active_task() == Some(&task) {
            return Transition {
                closed: self.close(now),
                started: None,
            };
        }
        let closed = self.close(now);
        *self = TimerState::Running {
            task: task.clone(),
            started_at: now,
        };
        Transition {
            closed,
            started: Some(task),
        }
    }

    /// Stops whatever is running. Stopping an idle timer does nothing.
    pub fn stop(&mut self, now: DateTime<Local>) -> Transition {
        Transition {
            closed: self.close(now),
            started: None,
        }
    }

    fn close(&mut self, now: DateTime<Local>) -> Option<LogRecord> {
        match std::mem::take(self) {
            TimerState::Idle => None,
            TimerState::Running { task, started_at } => Some(LogRecord::new(
                now.naive_local(),
                task,
                whole_seconds(now - started_at),
            )),
        }
    }
}

fn whole_seconds(duration: Duration) -> Duration {
    Duration::seconds(duration.num_seconds().max(0))
}
