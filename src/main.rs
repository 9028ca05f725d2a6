use clap::Parser;
use legal_crag::cli::{self, Cli, Command};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = cli::bootstrap(cli.config.as_deref())?;

    match cli.command {
        Command::Ask(args) => cli::ask::run(config, args).await,
        Command::Serve => cli::serve::run(config).await,
    }
}
