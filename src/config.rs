use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Parser;
use webhost_domain::{EmulationMode, HostConfig};

#[derive(Debug, Parser)]
#[command(name = "webhost", version, about = "Host the system WebBrowser control in a native window")]
pub struct Args {
    /// Page to open once the control is active
    pub url: Option<String>,

    /// JSON file with host settings; flags override its values
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    #[arg(long)]
    pub width: Option<u32>,

    #[arg(long)]
    pub height: Option<u32>,

    #[arg(long)]
    pub title: Option<String>,

    /// Leave FEATURE_BROWSER_EMULATION untouched
    #[arg(long)]
    pub no_emulation: bool,
}

impl Args {
    pub fn resolve(&self) -> Result<HostConfig> {
        let base = match &self.config {
            Some(path) => load_file(path)?,
            None => HostConfig::default(),
        };
        Ok(self.apply(base))
    }

    fn apply(&self, mut config: HostConfig) -> HostConfig {
        if let Some(url) = &self.url {
            config.initial_url = url.clone();
        }
        if let Some(width) = self.width {
            config.width = width;
        }
        if let Some(height) = self.height {
            config.height = height;
        }
        if let Some(title) = &self.title {
            config.title = title.clone();
        }
        if self.no_emulation {
            config.emulation = EmulationMode::None;
        }
        config
    }
}

pub fn load_file(path: &Path) -> Result<HostConfig> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("reading config {}", path.display()))?;
    parse(&raw).with_context(|| format!("parsing config {}", path.display()))
}

pub fn parse(raw: &str) -> Result<HostConfig> {
    Ok(serde_json::from_str(raw)?)
}
