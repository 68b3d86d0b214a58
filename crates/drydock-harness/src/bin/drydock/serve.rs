//! Control server command.

use std::path::PathBuf;

use drydock_harness::{AssetManifest, Config, ControlServer, PanelApp};
use smol_str::SmolStr;

use crate::style;

pub fn run_serve(project: Option<PathBuf>, listen: Option<String>) -> anyhow::Result<()> {
    let root = project.unwrap_or_else(|| PathBuf::from("."));
    let mut config = Config::load(&root)?;
    if let Some(listen) = listen {
        config.server.listen = SmolStr::new(listen);
    }

    let manifest = if config.server.manifest.is_file() {
        AssetManifest::load(&config.server.manifest)?
    } else {
        eprintln!(
            "{}",
            style::warning(format!(
                "Warning: no asset manifest at {}; asset paths pass through unresolved.",
                config.server.manifest.display()
            ))
        );
        AssetManifest::empty()
    };

    let server = ControlServer::start(&config.server, Box::new(PanelApp::new()), manifest)?;
    println!(
        "{}",
        style::success(format!(
            "drydock control server on http://{}",
            server.listen()
        ))
    );
    println!("  {}  initial snapshot", style::accent("GET  /load"));
    println!("  {}  execute a console command", style::accent("POST /command"));
    println!("  {}  stylesheet text", style::accent("GET  /styling"));
    println!("  {}  command index", style::accent("GET  /commands"));
    println!("  {}  shut down", style::accent("GET  /stop"));
    server.wait();
    Ok(())
}
