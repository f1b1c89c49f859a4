use std::{io::ErrorKind, path::Path};

use anyhow::{Context, Result};
use tracing::{info, warn};

use super::entities::Task;

pub const DEFAULT_TASKS: [&str; 5] = [
    "Check Email",
    "Work on Project",
    "Read Documentation",
    "Break",
    "Meeting",
];

/// Tasks the user can pick from. Order follows the task file, so the 1-based position of a task
/// is stable between runs and can be used to select it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskList {
    tasks: Vec<Task>,
}

impl Default for TaskList {
    fn default() -> Self {
        Self {
            tasks: DEFAULT_TASKS.iter().map(|&v| v.into()).collect(),
        }
    }
}

impl TaskList {
    /// Loads the list from `path`, one task per line. A missing file is created with the
    /// default tasks; a file without any names falls back to the defaults as well.
    pub async fn load_or_create(path: &Path) -> Result<Self> {
        match tokio::fs::read_to_string(path).await {
            Ok(content) => {
                let list = Self::parse(&content);
                if list.tasks.is_empty() {
                    warn!("Task file {path:?} has no tasks, using defaults");
                    Ok(Self::default())
                } else {
                    Ok(list)
                }
            }
            Err(e) if e.kind() == ErrorKind::NotFound => {
                let list = Self::default();
                info!("Task file {path:?} is missing, creating it with defaults");
                if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                    tokio::fs::create_dir_all(parent).await?;
                }
                tokio::fs::write(path, list.tasks.join("\n"))
                    .await
                    .with_context(|| format!("Failed to create task file {path:?}"))?;
                Ok(list)
            }
            Err(e) => Err(e).with_context(|| format!("Failed to read task file {path:?}")),
        }
    }

    pub fn new(tasks: Vec<Task>) -> Self {
        Self { tasks }
    }

    fn parse(content: &str) -> Self {
        Self::new(
            content
                .lines()
                .map(str::trim)
                .filter(|v| !v.is_empty())
                .map(Task::from)
                .collect(),
        )
    }

    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    /// Finds a task by its name (case insensitive) or else by its 1-based number. A task named
    /// like a number wins over the task at that position.
    pub fn find(&self, selector: &str) -> Option<&Task> {
        let selector = selector.trim();
        self.find_by_name(selector).or_else(|| {
            selector
                .parse::<usize>()
                .ok()?
                .checked_sub(1)
                .and_then(|i| self.tasks.get(i))
        })
    }

    pub fn find_by_name(&self, name: &str) -> Option<&Task> {
        let name = name.trim();
        self.tasks
            .iter()
            .find(|task| task.eq_ignore_ascii_case(name))
    }
}
