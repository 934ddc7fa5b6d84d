use clap::Parser;
use tracing_subscriber::EnvFilter;

use intentsim::{app::AppFactory, cli};

fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    // stdout carries JSON/CSV output, logs go to stderr
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> anyhow::Result<()> {
    let args = cli::Args::parse();
    init_logging();

    let paths = AppFactory::get_paths()?;
    let service = AppFactory::create_service(&paths, args.model)?;

    match args.command {
        cli::Command::Score { text_args } => cli::handle_score(text_args, &service),
        cli::Command::Match { text_args } => cli::handle_match(text_args, &service),
        cli::Command::Analyze {
            input,
            column,
            output,
            json,
        } => cli::handle_analyze(input, column, output, json, &service),
        cli::Command::Normalize { texts } => cli::handle_normalize(texts, &service),
        cli::Command::Intents {} => cli::handle_intents(&service),
    }
}
