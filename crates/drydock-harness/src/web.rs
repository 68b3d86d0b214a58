//! Control server exposing the application under test over HTTP.

#![allow(missing_docs)]

use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use drydock_console::{CommandRequest, CommandResponse, CommandsResponse, LoadResponse};
use smol_str::SmolStr;
use tiny_http::{Header, Method, Response, Server};
use tracing::{debug, info, warn};

use crate::app::Application;
use crate::config::ServerConfig;
use crate::error::HarnessError;
use crate::manifest::AssetManifest;

/// Handle to a running control server.
///
/// The request loop runs on its own thread and owns the application, so
/// commands execute one at a time in arrival order. The handle only
/// carries the listening flag and the bound address.
pub struct ControlServer {
    handle: thread::JoinHandle<()>,
    listening: Arc<AtomicBool>,
    listen: String,
    poll_interval: Duration,
}

impl ControlServer {
    /// Binds the configured address and starts serving requests.
    pub fn start(
        config: &ServerConfig,
        app: Box<dyn Application>,
        manifest: AssetManifest,
    ) -> Result<Self, HarnessError> {
        let listen = config.listen.to_string();
        let server = Server::http(&listen)
            .map_err(|err| HarnessError::WebServer(format!("bind {listen}: {err}").into()))?;
        let listening = Arc::new(AtomicBool::new(true));
        let flag = Arc::clone(&listening);
        let stylesheets = config.stylesheets.clone();
        let assets_dir = config.assets_dir.clone();
        info!(listen = %listen, assets = %assets_dir.display(), "control server listening");
        let handle = thread::spawn(move || {
            serve(&server, app, &manifest, &stylesheets, &assets_dir, &flag);
        });
        Ok(Self {
            handle,
            listening,
            listen,
            poll_interval: config.poll_interval,
        })
    }

    /// The address the server is bound to.
    pub fn listen(&self) -> &str {
        &self.listen
    }

    /// Whether a stop request has been served yet.
    pub fn is_listening(&self) -> bool {
        self.listening.load(Ordering::SeqCst)
    }

    /// Blocks until `GET /stop` clears the listening flag, then joins the
    /// request loop.
    pub fn wait(self) {
        while self.listening.load(Ordering::SeqCst) {
            thread::sleep(self.poll_interval);
        }
        let _ = self.handle.join();
        info!("control server stopped");
    }
}

fn serve(
    server: &Server,
    mut app: Box<dyn Application>,
    manifest: &AssetManifest,
    stylesheets: &[SmolStr],
    assets_dir: &Path,
    listening: &AtomicBool,
) {
    for mut request in server.incoming_requests() {
        let method = request.method().clone();
        let url = request.url().to_string();
        debug!(method = %method, url = %url, "control request");
        if method == Method::Get && url == "/load" {
            let payload = LoadResponse {
                html: manifest.rewrite_html(&app.render()),
                css_files: manifest.stylesheets(stylesheets),
            };
            let body = serde_json::to_string(&payload).unwrap_or_else(|_| "{}".to_string());
            let response = Response::from_string(body)
                .with_header(Header::from_bytes("Content-Type", "application/json").unwrap());
            let _ = request.respond(response);
            continue;
        }
        if method == Method::Post && url == "/command" {
            let mut body = String::new();
            if request.as_reader().read_to_string(&mut body).is_err() {
                let response = Response::from_string("invalid body").with_status_code(400);
                let _ = request.respond(response);
                continue;
            }
            let payload: CommandRequest = match serde_json::from_str(&body) {
                Ok(value) => value,
                Err(_) => {
                    let response = Response::from_string("invalid json").with_status_code(400);
                    let _ = request.respond(response);
                    continue;
                }
            };
            let error = match app.execute(&payload.command) {
                Ok(()) => None,
                Err(err) => {
                    warn!(command = %payload.command, error = %err, "command failed");
                    Some(err.to_string())
                }
            };
            // The snapshot goes back even for a failed command so the
            // console always shows the live document.
            let reply = CommandResponse {
                html: manifest.rewrite_html(&app.render()),
                error,
            };
            let body = serde_json::to_string(&reply).unwrap_or_else(|_| "{}".to_string());
            let response = Response::from_string(body)
                .with_header(Header::from_bytes("Content-Type", "application/json").unwrap());
            let _ = request.respond(response);
            continue;
        }
        if method == Method::Get && url == "/styling" {
            match primary_stylesheet(manifest, stylesheets, assets_dir) {
                Ok(css) => {
                    let response = Response::from_string(css)
                        .with_header(Header::from_bytes("Content-Type", "text/css").unwrap());
                    let _ = request.respond(response);
                }
                Err(err) => {
                    let response =
                        Response::from_string(format!("error: {err}")).with_status_code(404);
                    let _ = request.respond(response);
                }
            }
            continue;
        }
        if method == Method::Get && url.starts_with("/assets/") {
            let name = url.trim_start_matches("/assets/");
            match read_asset(manifest, assets_dir, name) {
                Ok(bytes) => {
                    let response = Response::from_data(bytes).with_header(
                        Header::from_bytes("Content-Type", content_type_for(name)).unwrap(),
                    );
                    let _ = request.respond(response);
                }
                Err(err) => {
                    let response =
                        Response::from_string(format!("error: {err}")).with_status_code(404);
                    let _ = request.respond(response);
                }
            }
            continue;
        }
        if method == Method::Get && url == "/commands" {
            let payload = CommandsResponse::from_index(&app.commands());
            let body = serde_json::to_string(&payload).unwrap_or_else(|_| "{}".to_string());
            let response = Response::from_string(body)
                .with_header(Header::from_bytes("Content-Type", "application/json").unwrap());
            let _ = request.respond(response);
            continue;
        }
        if method == Method::Get && url == "/stop" {
            listening.store(false, Ordering::SeqCst);
            let response = Response::from_string("stopping");
            let _ = request.respond(response);
            info!("stop requested");
            break;
        }
        let response = Response::from_string("not found").with_status_code(404);
        let _ = request.respond(response);
    }
}

fn primary_stylesheet(
    manifest: &AssetManifest,
    stylesheets: &[SmolStr],
    assets_dir: &Path,
) -> Result<String, HarnessError> {
    let key = stylesheets
        .first()
        .ok_or_else(|| HarnessError::AssetNotFound("no stylesheet configured".into()))?;
    let bytes = read_asset(manifest, assets_dir, key)?;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

/// Reads a named asset, resolving it through the manifest first. Requests
/// that escape the assets directory are rejected.
fn read_asset(
    manifest: &AssetManifest,
    assets_dir: &Path,
    name: &str,
) -> Result<Vec<u8>, HarnessError> {
    if name.is_empty() {
        return Err(HarnessError::AssetNotFound("empty asset name".into()));
    }
    let resolved = manifest.resolve(name);
    let requested = assets_dir.join(&resolved);
    let assets_dir = assets_dir
        .canonicalize()
        .map_err(|err| HarnessError::WebServer(format!("assets dir unavailable: {err}").into()))?;
    let requested = requested
        .canonicalize()
        .map_err(|_| HarnessError::AssetNotFound(SmolStr::new(name)))?;
    if !requested.starts_with(&assets_dir) {
        return Err(HarnessError::AssetNotFound(SmolStr::new(name)));
    }
    std::fs::read(&requested).map_err(|_| HarnessError::AssetNotFound(SmolStr::new(name)))
}

fn content_type_for(name: &str) -> &'static str {
    match Path::new(name).extension().and_then(|ext| ext.to_str()) {
        Some("css") => "text/css",
        Some("js") => "application/javascript",
        Some("html") => "text/html",
        Some("json") => "application/json",
        Some("svg") => "image/svg+xml",
        Some("png") => "image/png",
        _ => "application/octet-stream",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_assets(name: &str) -> std::path::PathBuf {
        let mut dir = std::env::temp_dir();
        dir.push(format!("drydock-assets-{name}-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[test]
    fn asset_reads_resolve_through_the_manifest() {
        let dir = temp_assets("resolve");
        std::fs::write(dir.join("main.abc123.css"), "body {}").unwrap();
        let manifest =
            AssetManifest::from_json(r#"{"files": {"main.css": "main.abc123.css"}}"#).unwrap();

        let bytes = read_asset(&manifest, &dir, "main.css").unwrap();
        assert_eq!(bytes, b"body {}");

        let _ = std::fs::remove_dir_all(dir);
    }

    #[test]
    fn asset_reads_reject_traversal() {
        let dir = temp_assets("traversal");
        let outside = dir.parent().unwrap().join("drydock-escape-target");
        std::fs::write(&outside, "secret").unwrap();

        let err =
            read_asset(&AssetManifest::empty(), &dir, "../drydock-escape-target").unwrap_err();
        assert!(matches!(err, HarnessError::AssetNotFound(_)));
        assert!(read_asset(&AssetManifest::empty(), &dir, "").is_err());
        assert!(read_asset(&AssetManifest::empty(), &dir, "missing.css").is_err());

        let _ = std::fs::remove_file(outside);
        let _ = std::fs::remove_dir_all(dir);
    }

    #[test]
    fn content_types_follow_the_extension() {
        assert_eq!(content_type_for("main.abc123.css"), "text/css");
        assert_eq!(content_type_for("logo.svg"), "image/svg+xml");
        assert_eq!(content_type_for("blob"), "application/octet-stream");
    }
}
