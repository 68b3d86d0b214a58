//! `drydock-harness` - control server and terminal console for driving a
//! live application under test.

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![allow(clippy::module_name_repetitions)]

/// Application-under-test seam.
pub mod app;
/// Harness configuration (`drydock.toml`).
pub mod config;
/// Harness errors.
pub mod error;
/// Built-in status panel fixture application.
pub mod fixture;
/// Asset manifest loading, resolution, and markup rewriting.
pub mod manifest;
/// HTTP client for the console and `ctl` commands.
pub mod transport;
/// Terminal console UI.
pub mod ui;
/// Control server.
pub mod web;

pub use app::Application;
pub use config::{Config, ConsoleConfig, ServerConfig};
pub use error::HarnessError;
pub use fixture::PanelApp;
pub use manifest::AssetManifest;
pub use transport::ControlClient;
pub use web::ControlServer;
