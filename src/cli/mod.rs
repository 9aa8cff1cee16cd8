pub mod status;

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use status::render_status;
use tracing::level_filters::LevelFilter;

use crate::{
    store::{aggregator::Aggregator, export::generate_csv, persist, persist::STORE_FILE_NAME},
    tracker::start_tracker,
    utils::{clock::DefaultClock, dir::create_application_default_path, logging::enable_logging},
};

#[derive(Parser, Debug)]
#[command(name = "Devtrack", version, long_about = None)]
#[command(about = "Local telemetry for developer activity inside an editor", long_about = None)]
struct Args {
    #[command(subcommand)]
    commands: Commands,
    #[arg(long, help = "Enable console logging")]
    log: bool,
}

#[derive(Subcommand, Debug)]
#[command(version, about, long_about = None)]
enum Commands {
    #[command(
        about = "Run the tracker, reading host editor events from stdin until the pipe closes"
    )]
    Serve {
        #[arg(
            long,
            help = "Application directory. By default tries to save into $XDG_STATE_HOME or $HOME/.local/state"
        )]
        dir: Option<PathBuf>,
        #[arg(
            long = "emit-state",
            help = "Print a JSON state snapshot to stdout after every applied event"
        )]
        emit_state: bool,
    },
    #[command(about = "Export all recorded project days as CSV")]
    Export {
        #[arg(long, help = "Application directory")]
        dir: Option<PathBuf>,
        #[arg(long, help = "Write to a file instead of stdout")]
        output: Option<PathBuf>,
    },
    #[command(about = "Set the daily time goal")]
    Goal {
        #[arg(help = "Daily goal in hours, greater than 0", value_parser = parse_positive_hours)]
        hours: f64,
        #[arg(long, help = "Application directory")]
        dir: Option<PathBuf>,
    },
    #[command(about = "Show today's tracked time against the daily goal")]
    Status {
        #[arg(long, help = "Application directory")]
        dir: Option<PathBuf>,
    },
}

pub async fn run_cli() -> Result<()> {
    let args = Args::parse();

    let logging_level = if args.log {
        Some(LevelFilter::TRACE)
    } else {
        None
    };

    match args.commands {
        Commands::Serve { dir, emit_state } => {
            let dir = resolve_dir(dir)?;
            enable_logging(&dir, logging_level, args.log)?;
            start_tracker(dir, emit_state).await
        }
        Commands::Export { dir, output } => {
            let dir = resolve_dir(dir)?;
            enable_logging(&dir, logging_level, args.log)?;
            let store = persist::load_or_default(&dir.join(STORE_FILE_NAME)).await;
            let csv = generate_csv(&store);
            match output {
                Some(path) => {
                    tokio::fs::write(&path, csv).await?;
                    println!("Exported usage data to {}", path.display());
                }
                None => print!("{csv}"),
            }
            Ok(())
        }
        Commands::Goal { hours, dir } => {
            let dir = resolve_dir(dir)?;
            enable_logging(&dir, logging_level, args.log)?;
            let store_path = dir.join(STORE_FILE_NAME);
            let store = persist::load_or_default(&store_path).await;
            let mut aggregator = Aggregator::new(store, Box::new(DefaultClock));
            aggregator.set_daily_goal(hours);
            persist::flush(&store_path, aggregator.store()).await?;
            println!(
                "Daily goal set to {}",
                status::format_duration(aggregator.daily_goal())
            );
            Ok(())
        }
        Commands::Status { dir } => {
            let dir = resolve_dir(dir)?;
            enable_logging(&dir, logging_level, args.log)?;
            let store = persist::load_or_default(&dir.join(STORE_FILE_NAME)).await;
            let aggregator = Aggregator::new(store, Box::new(DefaultClock));
            println!(
                "{}",
                render_status(aggregator.today_total_seconds(), aggregator.daily_goal())
            );
            Ok(())
        }
    }
}

fn resolve_dir(dir: Option<PathBuf>) -> Result<PathBuf> {
    dir.map_or_else(create_application_default_path, Ok)
}

fn parse_positive_hours(value: &str) -> Result<f64, String> {
    let hours: f64 = value
        .parse()
        .map_err(|_| format!("`{value}` is not a number"))?;
    if hours > 0.0 {
        Ok(hours)
    } else {
        Err("the daily goal must be greater than 0 hours".into())
    }
}
