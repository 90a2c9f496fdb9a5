mod config;
#[cfg(windows)]
mod host_window;

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;
use webhost_domain::HostConfig;

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .compact()
        .init();

    let args = config::Args::parse();
    let config = args.resolve()?;
    tracing::info!(
        url = %config.initial_url,
        width = config.width,
        height = config.height,
        emulation = ?config.emulation,
        "starting webhost"
    );

    run(&config)
}

#[cfg(windows)]
fn run(config: &HostConfig) -> Result<()> {
    host_window::run(config)
}

#[cfg(not(windows))]
fn run(_config: &HostConfig) -> Result<()> {
    anyhow::bail!("webhost embeds the system WebBrowser control and only runs on Windows")
}
