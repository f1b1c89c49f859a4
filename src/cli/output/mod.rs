pub mod analysis;
pub mod chart;

use std::fmt::Write;

use analysis::{bucket_for_day, bucket_for_last_n_days};
use chart::render_chart;
use chrono::NaiveDate;

use crate::tracker::{storage::log_store::LogContents, InProgress};

pub struct DashboardConfig {
    /// Day the first chart is drawn for.
    pub day: NaiveDate,
    /// Day an in-progress task counts towards. Usually the same as `day`.
    pub today: NaiveDate,
    pub history_days: u32,
    pub colored: bool,
}

/// Both charts: the day and the last `history_days` days ending with it. The running task is
/// only counted when the charts end today.
pub fn render_dashboard(
    contents: &LogContents,
    in_progress: Option<&InProgress>,
    config: &DashboardConfig,
) -> String {
    let records = &contents.records;
    let in_progress = in_progress.filter(|_| config.day == config.today);
    let day = bucket_for_day(records, config.day, config.today, in_progress);
    let history = bucket_for_last_n_days(records, config.day, config.history_days, in_progress);

    let day_title = if config.day == config.today {
        "Today".to_string()
    } else {
        config.day.format("%Y-%m-%d").to_string()
    };

    let mut out = render_chart(&day_title, &day, config.colored);
    out.push('\n');
    out += &render_chart(
        &format!("Last {} days", config.history_days),
        &history,
        config.colored,
    );

    if !contents.malformed.is_empty() {
        let _ = writeln!(
            out,
            "\nSkipped {} malformed log line(s):",
            contents.malformed.len()
        );
        for line in &contents.malformed {
            let _ = writeln!(out, "  line {}: {} ({})", line.line_number, line.content, line.reason);
        }
    }
    out
}
