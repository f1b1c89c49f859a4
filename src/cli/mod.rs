pub mod output;
pub mod report;
pub mod session;
pub mod shutdown;

use std::{io::IsTerminal, path::PathBuf};

use anyhow::Result;
use chrono::Duration;
use clap::{CommandFactory, Parser, Subcommand};
use report::{process_report_command, ReportCommand};
use session::{run_session, Session, SessionConfig};
use tokio::io::BufReader;
use tokio_util::sync::CancellationToken;
use tracing::{info, level_filters::LevelFilter};

use crate::{
    config::TrackerConfig,
    tracker::{
        storage::{log_store::LogFile, task_list::TaskList},
        Tracker,
    },
    utils::{
        clock::DefaultClock,
        dir::{create_application_default_path, create_application_path},
        logging::{enable_logging, CLI_PREFIX},
        time::{format_hms, parse_hms},
    },
};

#[derive(Parser, Debug)]
#[command(name = "tasktimer", version, long_about = None)]
#[command(about = "Time your tasks and see where the day went", long_about = None)]
struct Args {
    #[command(subcommand)]
    commands: Commands,
    #[arg(
        long,
        global = true,
        help = "Application directory. By default $XDG_STATE_HOME/tasktimer or $HOME/.local/state/tasktimer"
    )]
    dir: Option<PathBuf>,
    #[arg(long, global = true, help = "Print logs to the console")]
    log: bool,
}

#[derive(Subcommand, Debug)]
#[command(version, about, long_about = None)]
enum Commands {
    #[command(about = "Start an interactive session. Type a task number or name to start or stop it")]
    Track {},
    #[command(about = "Print today's and the last days' charts")]
    Report {
        #[command(flatten)]
        command: ReportCommand,
    },
    #[command(about = "List available tasks")]
    Tasks {},
    #[command(about = "Append a finished interval to the log by hand")]
    Log {
        #[arg(help = "Task number or name")]
        task: String,
        #[arg(value_parser = parse_hms, help = "Duration as HH:MM:SS")]
        duration: Duration,
    },
}

pub async fn run_cli() -> Result<()> {
    let args = Args::parse();

    let app_dir = match args.dir {
        Some(dir) => create_application_path(dir)?,
        None => create_application_default_path()?,
    };

    let logging_level = if args.log {
        Some(LevelFilter::TRACE)
    } else {
        None
    };
    enable_logging(CLI_PREFIX, &app_dir, logging_level, args.log)?;

    let config = TrackerConfig::load(&app_dir)?;
    info!("Using {config:?}");
    let tasks = TaskList::load_or_create(&config.tasks_file).await?;
    let store = LogFile::new(config.log_file.clone());

    match args.commands {
        Commands::Track {} => {
            let colored = std::io::stdout().is_terminal();
            let session = Session::new(
                Tracker::new(store, Box::new(DefaultClock)),
                tasks,
                SessionConfig::from_tracker_config(&config, colored),
            );
            let shutdown_token = CancellationToken::new();
            let input = BufReader::new(tokio::io::stdin());
            let mut stdout = std::io::stdout();
            let (_, result) = tokio::join!(shutdown::detect_shutdown(shutdown_token.clone()), async {
                let result = run_session(session, input, &mut stdout, shutdown_token.clone()).await;
                shutdown_token.cancel();
                result
            });
            result
        }
        Commands::Report { command } => {
            process_report_command(command, &store, config.history_days).await
        }
        Commands::Tasks {} => {
            print!("{}", session::render_task_menu(&tasks, None));
            println!();
            println!("Task list: {}", config.tasks_file.display());
            println!("Log: {}", config.log_file.display());
            Ok(())
        }
        Commands::Log { task, duration } => {
            let Some(task) = tasks.find(&task).cloned() else {
                return Err(Args::command()
                    .error(
                        clap::error::ErrorKind::ValueValidation,
                        format!("Unknown task {task:?}. See `tasktimer tasks`"),
                    )
                    .into());
            };
            let record = Tracker::new(store, Box::new(DefaultClock))
                .log_manual(task, duration)
                .await?;
            println!("Logged {} for {}", format_hms(record.duration), record.task);
            Ok(())
        }
    }
}
