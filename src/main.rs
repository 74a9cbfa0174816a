use anyhow::Result;
use clap::Parser;
use weather_diorama::cli::Cli;

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let cli = Cli::parse();
    weather_diorama::run(cli).await
}
