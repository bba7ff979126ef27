pub mod report;

use std::{path::PathBuf, sync::Arc};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use report::{process_graph_command, process_report_command, GraphCommand, ReportCommand};
use tracing::{info, level_filters::LevelFilter};

use crate::{
    auth::hash_password_blocking,
    server::{args::ServeArgs, start_server},
    storage::{sqlite::SqliteStore, store::SharedStore},
    utils::{
        clock::DefaultClock,
        dir::{create_application_default_path, create_dir, default_database_url},
        logging::{enable_logging, CLI_PREFIX, SERVER_PREFIX},
    },
};

#[derive(Parser, Debug)]
#[command(name = "Tracktime", version, long_about = None)]
#[command(about = "Personal time tracking web application", long_about = None)]
struct Args {
    #[command(subcommand)]
    commands: Commands,
    #[arg(
        long,
        global = true,
        env = "TRACKTIME_DIR",
        help = "Application directory. By default tries to save into $XDG_STATE_HOME or $HOME/.local/state"
    )]
    dir: Option<PathBuf>,
    #[arg(
        long,
        global = true,
        env = "DATABASE_URL",
        help = "Database to use. Defaults to tracktime.db inside the application directory"
    )]
    database_url: Option<String>,
    #[arg(
        long,
        global = true,
        help = "Log level, overrides RUST_LOG. One of off, error, warn, info, debug, trace"
    )]
    log_filter: Option<LevelFilter>,
    #[arg(long, global = true, help = "Also print logs to stdout")]
    log_console: bool,
}

#[derive(Subcommand, Debug)]
#[command(version, about, long_about = None)]
enum Commands {
    #[command(about = "Serve the web application")]
    Serve {
        #[command(flatten)]
        args: ServeArgs,
    },
    #[command(about = "Print the report of a day")]
    Report {
        #[command(flatten)]
        command: ReportCommand,
    },
    #[command(about = "Print the graph JSON of a day")]
    Graph {
        #[command(flatten)]
        command: GraphCommand,
    },
    #[command(about = "Create a user account")]
    CreateUser {
        #[arg(long = "user")]
        username: String,
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
    },
}

pub async fn run_cli() -> Result<()> {
    let args = Args::parse();

    let dir = match args.dir {
        Some(dir) => create_dir(dir)?,
        None => create_application_default_path()?,
    };
    let prefix = match args.commands {
        Commands::Serve { .. } => SERVER_PREFIX,
        _ => CLI_PREFIX,
    };
    let log_dir = create_dir(dir.join("logs"))?;
    enable_logging(prefix, &log_dir, args.log_filter, args.log_console)?;

    let database_url = args
        .database_url
        .unwrap_or_else(|| default_database_url(&dir));
    let store: SharedStore = Arc::new(
        SqliteStore::connect(&database_url)
            .await
            .with_context(|| format!("Failed to open database {database_url}"))?,
    );

    let clock = DefaultClock;
    match args.commands {
        Commands::Serve { args } => start_server(args, store).await,
        Commands::Report { command } => {
            process_report_command(command, &*store, &clock, &mut std::io::stdout()).await
        }
        Commands::Graph { command } => {
            process_graph_command(command, &*store, &clock, &mut std::io::stdout()).await
        }
        Commands::CreateUser {
            username,
            email,
            password,
        } => {
            let hash = hash_password_blocking(password).await?;
            let user = store
                .create_user(&username, &email, &hash)
                .await
                .with_context(|| format!("Failed to create user {username}"))?;
            info!("Created user {} from cli", user.id);
            println!("Created user {} with id {}", user.username, user.id);
            Ok(())
        }
    }
}
