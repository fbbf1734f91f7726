use clap::Parser;
use owo_colors::{OwoColorize, Style};
use tasklane_core::db;
use tasklane_core::error::CoreError;
use tasklane_core::repository::StoreTaskRepository;
use tasklane_core::store::SqliteStore;
use tracing::debug;
use tracing_subscriber::EnvFilter;

mod cli;
mod commands;
mod config;
mod parser;
mod views;

const LOG_ENV: &str = "TASKLANE_LOG";

#[tokio::main]
async fn main() {
    let cli = cli::Cli::parse();

    let config = match config::Config::new() {
        Ok(config) => config,
        Err(e) => {
            eprintln!(
                "{} Could not load configuration, using defaults: {}",
                "Warning:".yellow().bold(),
                e
            );
            config::Config::default()
        }
    };

    init_logging(cli.verbose, &config.log_level);
    debug!(database = %config.database_path, "starting");

    // previews never touch the database
    let result = match cli.command {
        cli::Commands::Preview(command) => commands::preview::preview_recurrence(command),
        command => run(command, &config).await,
    };

    if let Err(e) = result {
        handle_error(e);
    }
}

async fn run(command: cli::Commands, config: &config::Config) -> anyhow::Result<()> {
    let db_pool = db::establish_connection(&config.database_path).await?;
    let repository = StoreTaskRepository::new(SqliteStore::new(db_pool));

    match command {
        cli::Commands::Add(command) => commands::add::add_task(&repository, command, config).await,
        cli::Commands::List(command) => commands::list::list_tasks(&repository, command).await,
        cli::Commands::Edit(command) => commands::edit::edit_task(&repository, command).await,
        cli::Commands::Done(command) => commands::done::toggle_task(&repository, command).await,
        cli::Commands::Delete(command) => {
            commands::delete::delete_tasks(&repository, command).await
        }
        cli::Commands::Reorder(command) => {
            commands::reorder::reorder_task(&repository, command).await
        }
        cli::Commands::Preview(_) => unreachable!("previews are dispatched before the database is opened"),
    }
}

/// `TASKLANE_LOG` wins; otherwise `-v` raises the configured level.
fn init_logging(verbose: u8, configured: &str) {
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| {
        let level = match verbose {
            0 => configured,
            1 => "info",
            2 => "debug",
            _ => "trace",
        };
        EnvFilter::new(level)
    });

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(verbose >= 2)
        .with_line_number(verbose >= 3)
        .init();
}

fn handle_error(err: anyhow::Error) -> ! {
    let error_style = Style::new().red().bold();

    match err.downcast_ref::<CoreError>() {
        Some(CoreError::NotFound(id)) => {
            eprintln!("{} Task with ID '{}' not found.", "Error:".style(error_style), id);
        }
        Some(CoreError::Validation(s)) => {
            eprintln!("{} Invalid input: {}", "Error:".style(error_style), s);
        }
        Some(CoreError::Store(s)) => {
            eprintln!("{} The task store rejected the request: {}", "Error:".style(error_style), s.yellow());
        }
        _ => eprintln!("{} {:#}", "Error:".style(error_style), err),
    }

    std::process::exit(1);
}
