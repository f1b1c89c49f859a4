use std::{fmt::Display, io::IsTerminal};

use anyhow::Result;
use chrono::{DateTime, Local, NaiveDate};
use chrono_english::parse_date_string;
use clap::{CommandFactory, Parser, ValueEnum};

use crate::tracker::storage::log_store::LogStore;

use super::{
    output::{render_dashboard, DashboardConfig},
    Args,
};

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum DateStyle {
    Uk,
    Us,
}

impl From<DateStyle> for chrono_english::Dialect {
    fn from(value: DateStyle) -> Self {
        match value {
            DateStyle::Uk => Self::Uk,
            DateStyle::Us => Self::Us,
        }
    }
}

impl Display for DateStyle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DateStyle::Uk => write!(f, "uk"),
            DateStyle::Us => write!(f, "us"),
        }
    }
}

#[derive(Debug, Parser)]
pub struct ReportCommand {
    #[arg(
        long,
        short,
        help = "Day to report on. Examples are \"yesterday\", \"3 days ago\", \"15/03/2025\". Defaults to today"
    )]
    date: Option<String>,
    #[arg(long, default_value_t = DateStyle::Uk, help = "Style of dates used during parsing. For Uk it's day/month/year. For Us it's month/day/year")]
    date_style: DateStyle,
    #[arg(
        long,
        help = "Number of days in the second chart, ending with the reported day. Defaults to history_days from config"
    )]
    days: Option<u32>,
}

/// Prints both charts once. There's no running timer outside of `track`, so only logged
/// intervals are counted.
pub async fn process_report_command(
    ReportCommand {
        date,
        date_style,
        days,
    }: ReportCommand,
    store: &impl LogStore,
    default_days: u32,
) -> Result<()> {
    let now = Local::now();
    let day = parse_day(date.as_deref(), date_style, now)?;
    let history_days = match days {
        Some(0) => {
            return Err(Args::command()
                .error(
                    clap::error::ErrorKind::ValueValidation,
                    "--days should be above 0",
                )
                .into());
        }
        Some(days) => days,
        None => default_days,
    };

    let contents = store.read_all().await?;
    print!(
        "{}",
        render_dashboard(
            &contents,
            None,
            &DashboardConfig {
                day,
                today: now.date_naive(),
                history_days,
                colored: std::io::stdout().is_terminal(),
            },
        )
    );
    Ok(())
}

fn parse_day(date: Option<&str>, date_style: DateStyle, now: DateTime<Local>) -> Result<NaiveDate> {
    match date.map(|s| parse_date_string(s, now, date_style.into())) {
        Some(Ok(v)) => Ok(v.date_naive()),
        Some(Err(e)) => Err(Args::command()
            .error(
                clap::error::ErrorKind::ValueValidation,
                format!("Failed to validate date {e}"),
            )
            .into()),
        None => Ok(now.date_naive()),
    }
}

#[cfg(test)]
mod tests {
    use chrono::{Local, NaiveDate, TimeZone};

    use super::{parse_day, DateStyle};

    #[test]
    fn test_parse_day() {
        let now = Local.with_ymd_and_hms(2018, 7, 4, 12, 0, 0).unwrap();
        assert_eq!(
            parse_day(None, DateStyle::Uk, now).unwrap(),
            NaiveDate::from_ymd_opt(2018, 7, 4).unwrap()
        );
        assert_eq!(
            parse_day(Some("yesterday"), DateStyle::Uk, now).unwrap(),
            NaiveDate::from_ymd_opt(2018, 7, 3).unwrap()
        );
        assert_eq!(
            parse_day(Some("02/03/2018"), DateStyle::Uk, now).unwrap(),
            NaiveDate::from_ymd_opt(2018, 3, 2).unwrap()
        );
        assert_eq!(
            parse_day(Some("02/03/2018"), DateStyle::Us, now).unwrap(),
            NaiveDate::from_ymd_opt(2018, 2, 3).unwrap()
        );
        assert!(parse_day(Some("not a date at all"), DateStyle::Uk, now).is_err());
    }
}
