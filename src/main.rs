//! Authentiscan CLI entry point.

use authentiscan::cli::{self, Cli, Commands, EXIT_ERROR};
use clap::Parser;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let default_level = match cli.command {
        Commands::Serve(_) => "info",
        _ => "warn",
    };
    authentiscan::init_logging(default_level);

    let result = match &cli.command {
        Commands::Serve(args) => cli::run_serve(args).await,
        Commands::Text(args) => cli::run_text(args).await,
        Commands::Image(args) => cli::run_image(args).await,
        Commands::Init(args) => cli::run_init(args),
    };

    let exit_code = match result {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {}", e);
            EXIT_ERROR
        }
    };

    std::process::exit(exit_code);
}
