//! Terminal time tracker. Pick a task, the timer starts; pick it again (or another task) and the
//! interval lands in a plain text log. The same log is summed up into charts for today and the
//! last days.
//!

pub mod cli;
pub mod config;
pub mod tracker;
pub mod utils;
