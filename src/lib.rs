pub mod cli;
pub mod commands;
pub mod config;
pub mod db;
pub mod history;
pub mod models;
pub mod pipeline;

use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use cli::{Cli, Commands, HistoryCommand};
use commands::{AppState, CommandOutput};

pub fn run() -> ExitCode {
    // Initialize tracing (stderr, so stdout stays clean for --json)
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(config::default_log_filter())),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    tracing::debug!("{} starting v{}", config::APP_NAME, config::APP_VERSION);

    let json = cli.json;
    match dispatch(cli) {
        Ok(output) => {
            println!("{}", output.render(json));
            ExitCode::SUCCESS
        }
        Err(message) => {
            eprintln!("error: {message}");
            ExitCode::FAILURE
        }
    }
}

/// Route a parsed command line to its handler. The history is opened only
/// for commands that use it.
pub fn dispatch(cli: Cli) -> Result<CommandOutput, String> {
    let (memory, data_dir) = (cli.memory, cli.data_dir);
    let open_state = move || {
        if memory {
            AppState::in_memory()
        } else {
            AppState::open(data_dir)
        }
    };

    match cli.command {
        Commands::Levels => commands::analysis::list_levels(),
        Commands::Reference { level, output, noise, seed } => {
            commands::analysis::write_reference(level, &output, noise, seed)
        }
        Commands::Analyze { image, no_save, confidence } => {
            commands::analysis::analyze_strip(&open_state(), &image, !no_save, confidence.into())
        }
        Commands::Compare { id } => commands::history::compare_result(&open_state(), &id),
        Commands::History { command } => {
            let state = open_state();
            match command {
                HistoryCommand::List => commands::history::list_results(&state),
                HistoryCommand::Show { id } => commands::history::show_result(&state, &id),
                HistoryCommand::Delete { id } => commands::history::delete_result(&state, &id),
                HistoryCommand::Clear => commands::history::clear_results(&state),
                HistoryCommand::Stats => commands::history::result_stats(&state),
                HistoryCommand::Export { output } => {
                    commands::history::export_results(&state, output.as_deref())
                }
                HistoryCommand::Import { file } => commands::history::import_results(&state, &file),
                HistoryCommand::SeedSamples => commands::history::seed_samples(&state),
                HistoryCommand::ClearSamples => commands::history::remove_samples(&state),
            }
        }
    }
}
