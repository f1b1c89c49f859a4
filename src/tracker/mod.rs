//! The core of the application: a single timer and the log it writes into.
//! [Tracker] glues [state::TimerState] transitions to a [storage::log_store::LogStore], so every
//! closed interval ends up on disk the moment it's closed.

pub mod state;
pub mod storage;

use anyhow::Result;
use chrono::{DateTime, Duration, Local};
use state::{TimerState, Transition};
use storage::{
    entities::{LogRecord, Task},
    log_store::{LogContents, LogStore},
};
use tracing::{debug, info, instrument};

use crate::utils::clock::Clock;

/// Elapsed time of the task currently running, counted into today's numbers before it is logged.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InProgress {
    pub task: Task,
    pub elapsed: Duration,
}

pub struct Tracker<S: LogStore> {
    state: TimerState,
    store: S,
    clock: Box<dyn Clock>,
}

impl<S: LogStore> Tracker<S> {
    pub fn new(store: S, clock: Box<dyn Clock>) -> Self {
        Self {
            state: TimerState::Idle,
            store,
            clock,
        }
    }

    pub fn state(&self) -> &TimerState {
        &self.state
    }

    pub fn clock(&self) -> &dyn Clock {
        self.clock.as_ref()
    }

    pub fn now(&self) -> DateTime<Local> {
        self.clock.time()
    }

    /// Clicks `task`, see [TimerState::click]. When the closed interval can't be written the
    /// timer is left as it was, so the action can be retried.
    #[instrument(skip(self))]
    pub async fn click(&mut self, task: Task) -> Result<Transition> {
        let now = self.clock.time();
        let mut next = self.state.clone();
        let transition = next.click(task, now);
        self.persist(&transition).await?;
        self.state = next;
        debug!("Timer is now {:?}", self.state);
        Ok(transition)
    }

    #[instrument(skip(self))]
    pub async fn stop(&mut self) -> Result<Transition> {
        let now = self.clock.time();
        let mut next = self.state.clone();
        let transition = next.stop(now);
        self.persist(&transition).await?;
        self.state = next;
        debug!("Timer is now {:?}", self.state);
        Ok(transition)
    }

    /// Running task and how long it has been running for.
    pub fn in_progress(&self) -> Option<InProgress> {
        let now = self.clock.time();
        Some(InProgress {
            task: self.state.active_task()?.clone(),
            elapsed: self.state.elapsed(now)?,
        })
    }

    pub async fn read_log(&self) -> Result<LogContents> {
        self.store.read_all().await
    }

    /// Appends a record that wasn't produced by the timer.
    pub async fn log_manual(&self, task: Task, duration: Duration) -> Result<LogRecord> {
        let record = LogRecord::new(self.clock.time().naive_local(), task, duration);
        self.store.append(&record).await?;
        info!("Manually logged {record}");
        Ok(record)
    }

    async fn persist(&self, transition: &Transition) -> Result<()> {
        if let Some(record) = &transition.closed {
            self.store.append(record).await?;
            info!("Logged {record}");
        }
        if let Some(task) = &transition.started {
            info!("Started {task}");
        }
        Ok(())
    }
}
