use std::{
    io::ErrorKind,
    path::{Path, PathBuf},
    time::Duration,
};

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use tracing::debug;

pub const CONFIG_FILE_NAME: &str = "config.json";

/// Settings of a tracker. Loaded from `config.json` inside of the application directory, every
/// field is optional there.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TrackerConfig {
    pub tasks_file: PathBuf,
    pub log_file: PathBuf,
    /// How often the elapsed time is redrawn.
    pub tick_seconds: u64,
    /// How often the log is re-read and the charts redrawn.
    pub refresh_seconds: u64,
    pub history_days: u32,
    /// Log the running task when the session ends instead of dropping it.
    pub stop_on_exit: bool,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            tasks_file: "tasks.txt".into(),
            log_file: "time_log.txt".into(),
            tick_seconds: 1,
            refresh_seconds: 10,
            history_days: 7,
            stop_on_exit: true,
        }
    }
}

impl TrackerConfig {
    /// Reads `config.json` from `app_dir` (defaults when it doesn't exist) and resolves relative
    /// paths against `app_dir`.
    pub fn load(app_dir: &Path) -> Result<Self> {
        let path = app_dir.join(CONFIG_FILE_NAME);
        let config = match std::fs::read_to_string(&path) {
            Ok(content) => serde_json::from_str::<TrackerConfig>(&content)
                .with_context(|| format!("Failed to parse {path:?}"))?,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!("No config at {path:?}, using defaults");
                TrackerConfig::default()
            }
            Err(e) => return Err(e).with_context(|| format!("Failed to read {path:?}")),
        };
        config.validate()?;
        Ok(config.resolve(app_dir))
    }

    fn validate(&self) -> Result<()> {
        if self.tick_seconds == 0 || self.refresh_seconds == 0 {
            bail!("tick_seconds and refresh_seconds should be above 0");
        }
        if self.history_days == 0 {
            bail!("history_days should be above 0");
        }
        Ok(())
    }

    fn resolve(self, app_dir: &Path) -> Self {
        Self {
            tasks_file: app_dir.join(self.tasks_file),
            log_file: app_dir.join(self.log_file),
            ..self
        }
    }

    pub fn tick(&self) -> Duration {
        Duration::from_secs(self.tick_seconds)
    }

    pub fn refresh(&self) -> Duration {
        Duration::from_secs(self.refresh_seconds)
    }
}

#[cfg(test)]
mod tests {
    use anyhow::Result;
    use tempfile::tempdir;

    use super::{TrackerConfig, CONFIG_FILE_NAME};

    #[test]
    fn test_defaults_without_file() -> Result<()> {
        let dir = tempdir()?;
        let config = TrackerConfig::load(dir.path())?;
        assert_eq!(config.tasks_file, dir.path().join("tasks.txt"));
        assert_eq!(config.log_file, dir.path().join("time_log.txt"));
        assert_eq!(config.tick_seconds, 1);
        assert_eq!(config.refresh_seconds, 10);
        assert_eq!(config.history_days, 7);
        Ok(())
    }

    #[test]
    fn test_partial_file() -> Result<()> {
        let dir = tempdir()?;
        let log = dir.path().join("elsewhere").join("log.txt");
        std::fs::write(
            dir.path().join(CONFIG_FILE_NAME),
            serde_json::json!({ "log_file": log, "refresh_seconds": 30 }).to_string(),
        )?;

        let config = TrackerConfig::load(dir.path())?;

        assert_eq!(config.log_file, log);
        assert_eq!(config.refresh_seconds, 30);
        assert_eq!(config.tick_seconds, 1);
        Ok(())
    }

    #[test]
    fn test_invalid_file() -> Result<()> {
        let dir = tempdir()?;
        std::fs::write(dir.path().join(CONFIG_FILE_NAME), r#"{ "tick_seconds": 0 }"#)?;
        assert!(TrackerConfig::load(dir.path()).is_err());
        std::fs::write(dir.path().join(CONFIG_FILE_NAME), r#"{ "colour": "red" }"#)?;
        assert!(TrackerConfig::load(dir.path()).is_err());
        Ok(())
    }
}
