//! Everything that touches the disk.
//!  - The task list is a text file with a task name per line.
//!  - The log is an append-only text file, a [entities::LogRecord] per line.

pub mod entities;
pub mod log_store;
pub mod task_list;
