//! Interactive console command.

use std::path::PathBuf;

use drydock_harness::{ui, Config};
use smol_str::SmolStr;

pub fn run_console(project: Option<PathBuf>, endpoint: Option<String>) -> anyhow::Result<()> {
    let root = project.unwrap_or_else(|| PathBuf::from("."));
    let mut config = Config::load(&root)?;
    if let Some(endpoint) = endpoint {
        if !endpoint.starts_with("http://") && !endpoint.starts_with("https://") {
            anyhow::bail!("invalid endpoint '{endpoint}': expected http:// or https://");
        }
        config.console.endpoint = SmolStr::new(endpoint);
    }
    ui::run_console(&config.console)
}
