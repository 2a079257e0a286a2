use clap::Parser;
use gigachat::cli::Cli;
use std::process::ExitCode;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    gigachat::cli::init_logging(cli.verbose);
    gigachat::cli::run(cli).await
}
