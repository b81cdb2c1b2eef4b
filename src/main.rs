//! Binary entry point: parse flags, load config, start the proxy.

use clap::Parser;
use std::path::PathBuf;

use tickrelay::config::Config;

#[derive(Parser, Debug)]
#[command(name = "tickrelay", version, about = "Dida365 / TickTick backend proxy")]
struct Cli {
    /// Path to a TOML config file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Bind host, overrides the config file
    #[arg(long)]
    host: Option<String>,

    /// Bind port, overrides the config file
    #[arg(long)]
    port: Option<u16>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    let mut config = Config::load(cli.config.as_deref())?;
    if let Some(host) = cli.host {
        config.server.host = host;
    }
    if let Some(port) = cli.port {
        config.server.port = port;
    }

    tickrelay::run(config).await
}
