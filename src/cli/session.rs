//! Interactive `track` session. A single cooperative loop waits on user input, the elapsed time
//! tick and the chart refresh, whichever comes first.

use std::{fmt::Write as _, io::Write, time::Duration};

use anyhow::Result;
use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use crate::{
    config::TrackerConfig,
    tracker::{
        state::Transition,
        storage::{entities::Task, log_store::LogStore, task_list::TaskList},
        Tracker,
    },
    utils::time::format_hms,
};

use super::output::{render_dashboard, DashboardConfig};

const CLEAR_SCREEN: &str = "\x1b[2J\x1b[H";
const CLEAR_LINE: &str = "\r\x1b[K";

const HELP: &str = "Commands: <number or task name> start/stop a task, stop, list, report, help, quit";

#[derive(Debug, Clone)]
pub struct SessionConfig {
    pub tick: Duration,
    pub refresh: Duration,
    pub history_days: u32,
    pub stop_on_exit: bool,
    /// Use escape codes to redraw in place. Off when stdout isn't a terminal.
    pub ansi: bool,
}

impl SessionConfig {
    pub fn from_tracker_config(config: &TrackerConfig, ansi: bool) -> Self {
        Self {
            tick: config.tick(),
            refresh: config.refresh(),
            history_days: config.history_days,
            stop_on_exit: config.stop_on_exit,
            ansi,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionCommand {
    /// Number or name of a task.
    Click(String),
    Stop,
    List,
    Report,
    Help,
    Quit,
}

impl SessionCommand {
    /// A line naming one of `tasks` exactly always clicks that task, even when the name is also a
    /// command word like `stop` or `report`.
    pub fn parse(line: &str, tasks: &TaskList) -> Option<Self> {
        let line = line.trim();
        if line.is_empty() {
            return None;
        }
        if tasks.find_by_name(line).is_some() {
            return Some(SessionCommand::Click(line.to_string()));
        }
        let command = match line.to_ascii_lowercase().as_str() {
            "stop" | "s" => SessionCommand::Stop,
            "list" | "tasks" | "l" => SessionCommand::List,
            "report" | "refresh" | "r" => SessionCommand::Report,
            "help" | "?" | "h" => SessionCommand::Help,
            "quit" | "exit" | "q" => SessionCommand::Quit,
            _ => SessionCommand::Click(line.to_string()),
        };
        Some(command)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Exit,
}

pub struct Session<S: LogStore> {
    tracker: Tracker<S>,
    tasks: TaskList,
    config: SessionConfig,
}

impl<S: LogStore> Session<S> {
    pub fn new(tracker: Tracker<S>, tasks: TaskList, config: SessionConfig) -> Self {
        Self {
            tracker,
            tasks,
            config,
        }
    }

    pub fn tracker(&self) -> &Tracker<S> {
        &self.tracker
    }

    pub async fn handle(&mut self, command: SessionCommand, out: &mut impl Write) -> Result<Flow> {
        debug!("Handling {command:?}");
        match command {
            SessionCommand::Click(selector) => {
                let Some(task) = self.tasks.find(&selector).cloned() else {
                    writeln!(out, "Unknown task or command {selector:?}. {HELP}")?;
                    return Ok(Flow::Continue);
                };
                let transition = self.tracker.click(task).await?;
                write_transition(out, &transition)?;
            }
            SessionCommand::Stop => {
                let transition = self.tracker.stop().await?;
                if transition.closed.is_none() {
                    writeln!(out, "Nothing is running")?;
                }
                write_transition(out, &transition)?;
            }
            SessionCommand::List => {
                write!(
                    out,
                    "{}",
                    render_task_menu(&self.tasks, self.tracker.state().active_task())
                )?;
            }
            SessionCommand::Report => self.redraw(out).await?,
            SessionCommand::Help => writeln!(out, "{HELP}")?,
            SessionCommand::Quit => return Ok(Flow::Exit),
        }
        Ok(Flow::Continue)
    }

    /// `Elapsed Time: HH:MM:SS (task)` while running, `Idle` otherwise.
    pub fn status_line(&self) -> String {
        match self.tracker.in_progress() {
            Some(in_progress) => format!(
                "Elapsed Time: {} ({})",
                format_hms(in_progress.elapsed),
                in_progress.task
            ),
            None => "Idle".to_string(),
        }
    }

    /// Elapsed time refresh. Nothing is printed while idle.
    pub fn tick(&self, out: &mut impl Write) -> Result<()> {
        if !self.tracker.state().is_running() {
            return Ok(());
        }
        if self.config.ansi {
            write!(out, "{CLEAR_LINE}{}", self.status_line())?;
        } else {
            writeln!(out, "{}", self.status_line())?;
        }
        out.flush()?;
        Ok(())
    }

    /// Re-reads the log and draws the task menu, both charts and the status line.
    pub async fn redraw(&self, out: &mut impl Write) -> Result<()> {
        let contents = self.tracker.read_log().await?;
        let today = self.tracker.now().date_naive();
        let in_progress = self.tracker.in_progress();

        let mut screen = String::new();
        if self.config.ansi {
            screen.push_str(CLEAR_SCREEN);
        }
        screen += &render_task_menu(&self.tasks, self.tracker.state().active_task());
        screen.push('\n');
        screen += &render_dashboard(
            &contents,
            in_progress.as_ref(),
            &DashboardConfig {
                day: today,
                today,
                history_days: self.config.history_days,
                colored: self.config.ansi,
            },
        );
        let _ = writeln!(screen, "\n{HELP}");
        screen += &self.status_line();
        if !self.config.ansi {
            screen.push('\n');
        }

        write!(out, "{screen}")?;
        out.flush()?;
        Ok(())
    }

    /// Ends the session. The running task is logged or dropped depending on `stop_on_exit`.
    pub async fn finish(&mut self, out: &mut impl Write) -> Result<()> {
        if self.config.ansi {
            writeln!(out)?;
        }
        if !self.config.stop_on_exit {
            if let Some(task) = self.tracker.state().active_task() {
                warn!("Dropping running interval of {task}");
                writeln!(out, "Discarded running {task}")?;
            }
            return Ok(());
        }
        let transition = self.tracker.stop().await?;
        write_transition(out, &transition)?;
        Ok(())
    }
}

fn write_transition(out: &mut impl Write, transition: &Transition) -> Result<()> {
    if let Some(record) = &transition.closed {
        writeln!(out, "Logged {} for {}", format_hms(record.duration), record.task)?;
    }
    if let Some(task) = &transition.started {
        writeln!(out, "Started {task}")?;
    }
    Ok(())
}

/// Numbered list of tasks, the running one is marked with `*`.
pub fn render_task_menu(tasks: &TaskList, active: Option<&Task>) -> String {
    let mut out = String::new();
    for (index, task) in tasks.tasks().iter().enumerate() {
        let marker = if Some(task) == active { '*' } else { ' ' };
        let _ = writeln!(out, "{marker} {}. {task}", index + 1);
    }
    out
}

/// Executes the session event loop until `quit`, end of input or `shutdown`.
pub async fn run_session<S: LogStore>(
    mut session: Session<S>,
    input: impl AsyncBufRead + Unpin,
    out: &mut impl Write,
    shutdown: CancellationToken,
) -> Result<()> {
    let mut lines = input.lines();
    let tick = session.config.tick;
    let refresh = session.config.refresh;

    if let Err(e) = session.redraw(out).await {
        error!("Failed to draw charts {e:?}");
        writeln!(out, "Error: {e}")?;
    }
    let start = session.tracker.clock().instant();
    let mut next_tick = start + tick;
    let mut next_refresh = start + refresh;

    loop {
        tokio::select! {
            biased;
            _ = shutdown.cancelled() => {
                info!("Shutdown requested");
                break;
            }
            line = lines.next_line() => {
                let Some(line) = line? else {
                    info!("Input closed");
                    break;
                };
                let Some(command) = SessionCommand::parse(&line, &session.tasks) else {
                    continue;
                };
                match session.handle(command, out).await {
                    Ok(Flow::Exit) => break,
                    Ok(Flow::Continue) => (),
                    Err(e) => {
                        error!("Failed to handle {line:?}: {e:?}");
                        writeln!(out, "Error: {e}")?;
                    }
                }
            }
            _ = session.tracker.clock().sleep_until(next_tick) => {
                next_tick += tick;
                session.tick(out)?;
            }
            _ = session.tracker.clock().sleep_until(next_refresh) => {
                next_refresh += refresh;
                if let Err(e) = session.redraw(out).await {
                    error!("Failed to refresh charts {e:?}");
                }
            }
        }
    }

    session.finish(out).await
}
