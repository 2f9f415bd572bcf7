use clap::Parser;
use jobboard_api::cli::{self, Cli, Command};
use jobboard_api::infrastructure::logging;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    logging::install_panic_hook();

    let cli = Cli::parse();

    match cli.command {
        Command::Serve(args) => cli::serve::run(args).await,
    }
}
