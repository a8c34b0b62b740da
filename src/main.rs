use clap::Parser;
use tracing_subscriber::EnvFilter;

use relato::cli::{self, Cli};
use relato::errors::to_exit_code;

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli::run(cli).await {
        Ok(code) => std::process::exit(code),
        Err(err) => {
            eprintln!("Error [{}]: {}", err.code(), err);
            std::process::exit(to_exit_code(&err));
        }
    }
}
