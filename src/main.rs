use autocorrelate::app::{handle_fatal_error, init_logging, AppConfig};
use autocorrelate::cli::{execute_command, Cli};
use clap::Parser;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    let app_config = AppConfig::new(cli.verbose);
    init_logging(&app_config);

    if let Err(error) = execute_command(cli.command, cli.verbose).await {
        handle_fatal_error(error, cli.verbose);
    }
}
