//! Control requests against a running server.

use std::path::PathBuf;

use drydock_harness::{Config, ControlClient};

use crate::cli::CtlAction;
use crate::style;

pub fn run_control(
    project: Option<PathBuf>,
    endpoint: Option<String>,
    action: CtlAction,
) -> anyhow::Result<()> {
    let endpoint = match endpoint {
        Some(endpoint) => endpoint,
        None => {
            let root = project.unwrap_or_else(|| PathBuf::from("."));
            Config::load(&root)?.console.endpoint.to_string()
        }
    };
    let client = ControlClient::new(endpoint);
    match action {
        CtlAction::Stop => {
            let reply = client.stop()?;
            println!("{}", style::success(reply));
        }
    }
    Ok(())
}
