use bikehero::cli;
use bikehero::cli::Cli;
use bikehero::cli::Commands;
use bikehero::config::AppConfig;
use bikehero::Result;
use clap::Parser;
use tracing::error;
use tracing::info;
use tracing_appender::non_blocking::WorkerGuard;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    let mut log_guard = None;

    if let Err(e) = run(cli, &mut log_guard).await {
        error!("{}", e);
        cli::print_error(&e.to_string());
        // exit() skips destructors; flush the log file first
        drop(log_guard);
        std::process::exit(1);
    }
}

async fn run(cli: Cli, log_guard: &mut Option<WorkerGuard>) -> Result<()> {
    // Load configuration
    let config = match &cli.config {
        Some(path) => AppConfig::from_file(path)?,
        None => AppConfig::load()?,
    };

    // Initialize logging
    let guard = if cli.verbose {
        bikehero::logging::init_logging_with_level("debug")?
    } else {
        bikehero::logging::init_logging_with_config(Some(&config))?
    };
    *log_guard = Some(guard);
    info!("Configuration loaded successfully");

    match cli.command {
        Commands::Init { reset } => cli::handle_init_command(&config, reset).await,
        Commands::Serve {
            host,
            port,
            no_cors,
        } => cli::handle_serve_api(&config, host, port, no_cors).await,
        Commands::Index { catalog } => {
            cli::handle_index_command(&config, catalog.as_deref()).await
        }
        Commands::Ask { message, save } => {
            cli::handle_ask_command(&config, &message, save).await
        }
        Commands::History { limit } => cli::handle_history_command(&config, limit).await,
        Commands::Config => cli::handle_config_command(&config),
    }
}
