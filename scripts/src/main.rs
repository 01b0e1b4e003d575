use clap::Parser;
use dotenv::dotenv;
use scripts::{cli::Cli, errors::ScriptError};

#[tokio::main]
async fn main() -> Result<(), ScriptError> {
    // Load .env file
    dotenv().ok();

    let cli = Cli::parse();

    tracing_subscriber::fmt().pretty().init();

    // Resolve network, deployer key and workflow options once
    let config = cli.deploy_config()?;

    cli.command.run(config).await
}
