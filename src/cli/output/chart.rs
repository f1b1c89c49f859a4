use std::fmt::Write;

use ansi_term::{Colour, Style};

use crate::utils::{percentage::duration_percentage, time::format_hms};

use super::analysis::Bucket;

const BAR_WIDTH: usize = 30;

const PALETTE: [Colour; 6] = [
    Colour::Cyan,
    Colour::Yellow,
    Colour::Green,
    Colour::Purple,
    Colour::Blue,
    Colour::Red,
];

/// Terminal take on a donut chart: one proportional bar per task plus the share of the total.
pub fn render_chart(title: &str, bucket: &Bucket, colored: bool) -> String {
    let paint = |style: Style, text: &str| {
        if colored {
            style.paint(text).to_string()
        } else {
            text.to_string()
        }
    };

    let total = bucket.total();
    let mut out = String::new();
    let _ = writeln!(out, "{}", paint(Style::new().bold(), title));

    if bucket.is_empty() {
        let _ = writeln!(out, "  No data");
        return out;
    }

    let name_width = bucket
        .usages()
        .iter()
        .map(|u| u.task.chars().count())
        .max()
        .unwrap_or(0);

    for (index, usage) in bucket.usages().iter().enumerate() {
        let percentage = duration_percentage(usage.duration, total);
        let filled = ((*percentage / 100. * BAR_WIDTH as f64).round() as usize).min(BAR_WIDTH);
        let bar = format!("{}{}", "█".repeat(filled), "·".repeat(BAR_WIDTH - filled));
        let _ = writeln!(
            out,
            "  {:<name_width$}  {}  {:>4}  {}",
            usage.task,
            paint(PALETTE[index % PALETTE.len()].normal(), &bar),
            percentage.to_string(),
            format_hms(usage.duration),
        );
    }
    let _ = writeln!(
        out,
        "  {:<name_width$}  {}  {:>4}  {}",
        "Total",
        " ".repeat(BAR_WIDTH),
        "",
        format_hms(total)
    );
    out
}
