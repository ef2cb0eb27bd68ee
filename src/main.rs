use clap::Parser;

use catalog_api::{cli::Cli, config::Config};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    catalog_api::init_tracing();

    let cli = Cli::parse();
    let config = Config::from_env()?;

    catalog_api::cli::run(cli, config).await
}
