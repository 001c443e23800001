use clap::Parser;
use tracing::error;

use pressroom_server::cli::{Cli, Command};
use pressroom_server::{commands, logging};

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    logging::init_tracing(cli.json_logs);

    if let Err(e) = dispatch(cli).await {
        error!("Fatal error: {:#}", e);
        std::process::exit(1);
    }
}

async fn dispatch(cli: Cli) -> anyhow::Result<()> {
    let config = commands::load(cli.config.as_deref())?;

    match cli.command {
        Command::Run { root, concurrency } => commands::run(config, root, concurrency).await,
        Command::Serve => commands::serve(config).await,
        Command::InitDb => commands::init_db(config).await,
    }
}
