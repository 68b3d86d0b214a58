//! Harness configuration loading.

#![allow(missing_docs)]

use std::path::{Path, PathBuf};
use std::time::Duration;

use drydock_console::{Chord, Keymap};
use serde::Deserialize;
use smol_str::SmolStr;

use crate::error::HarnessError;

/// Configuration file name, looked up in the project root.
pub const CONFIG_FILE: &str = "drydock.toml";

const DEFAULT_LISTEN: &str = "127.0.0.1:3001";
const DEFAULT_ENDPOINT: &str = "http://127.0.0.1:3001";
const DEFAULT_POLL_INTERVAL_MS: u64 = 50;
const DEFAULT_REFRESH_MS: u64 = 250;

/// Validated harness configuration.
#[derive(Debug, Clone)]
pub struct Config {
    pub server: ServerConfig,
    pub console: ConsoleConfig,
}

/// Control server settings.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub listen: SmolStr,
    pub poll_interval: Duration,
    pub assets_dir: PathBuf,
    pub manifest: PathBuf,
    pub stylesheets: Vec<SmolStr>,
}

/// Console client settings.
#[derive(Debug, Clone)]
pub struct ConsoleConfig {
    pub endpoint: SmolStr,
    pub refresh_interval: Duration,
    pub keymap: Keymap,
}

impl Config {
    /// Loads `drydock.toml` from the project root. A missing file yields
    /// the default configuration; a present but invalid file is an error.
    pub fn load(root: impl AsRef<Path>) -> Result<Self, HarnessError> {
        let root = root.as_ref();
        let path = root.join(CONFIG_FILE);
        if !path.is_file() {
            return Ok(Self::default_for(root));
        }
        let text = std::fs::read_to_string(&path)
            .map_err(|err| HarnessError::InvalidConfig(format!("drydock.toml: {err}").into()))?;
        parse(&text, root)
    }

    fn default_for(root: &Path) -> Self {
        Self {
            server: ServerConfig {
                listen: SmolStr::new(DEFAULT_LISTEN),
                poll_interval: Duration::from_millis(DEFAULT_POLL_INTERVAL_MS),
                assets_dir: root.join("build"),
                manifest: root.join("build/asset-manifest.json"),
                stylesheets: vec![SmolStr::new("main.css")],
            },
            console: ConsoleConfig {
                endpoint: SmolStr::new(DEFAULT_ENDPOINT),
                refresh_interval: Duration::from_millis(DEFAULT_REFRESH_MS),
                keymap: Keymap::default(),
            },
        }
    }
}

fn parse(text: &str, root: &Path) -> Result<Config, HarnessError> {
    let raw: DrydockToml = toml::from_str(text)
        .map_err(|err| HarnessError::InvalidConfig(format!("drydock.toml: {err}").into()))?;
    raw.into_config(root)
}

fn chord(binding: Option<&str>, default: Chord) -> Result<Chord, HarnessError> {
    match binding {
        Some(text) => Chord::parse(text)
            .map_err(|err| HarnessError::InvalidConfig(format!("console.keys: {err}").into())),
        None => Ok(default),
    }
}

#[derive(Debug, Default, Deserialize)]
struct DrydockToml {
    server: Option<ServerSection>,
    console: Option<ConsoleSection>,
}

#[derive(Debug, Default, Deserialize)]
struct ServerSection {
    listen: Option<String>,
    poll_interval_ms: Option<u64>,
    assets_dir: Option<String>,
    manifest: Option<String>,
    stylesheets: Option<Vec<String>>,
}

#[derive(Debug, Default, Deserialize)]
struct ConsoleSection {
    endpoint: Option<String>,
    refresh_ms: Option<u64>,
    keys: Option<KeysSection>,
}

#[derive(Debug, Default, Deserialize)]
struct KeysSection {
    submit: Option<String>,
    history_prev: Option<String>,
    history_next: Option<String>,
}

impl DrydockToml {
    fn into_config(self, root: &Path) -> Result<Config, HarnessError> {
        let defaults = Config::default_for(root);
        let server = self.server.unwrap_or_default();
        let console = self.console.unwrap_or_default();

        let poll_interval_ms = server
            .poll_interval_ms
            .unwrap_or(DEFAULT_POLL_INTERVAL_MS);
        if poll_interval_ms == 0 {
            return Err(HarnessError::InvalidConfig(
                "server.poll_interval_ms must be positive".into(),
            ));
        }

        let endpoint = console
            .endpoint
            .map_or(defaults.console.endpoint, SmolStr::new);
        if !endpoint.starts_with("http://") && !endpoint.starts_with("https://") {
            return Err(HarnessError::InvalidConfig(
                format!("invalid console.endpoint '{endpoint}'").into(),
            ));
        }

        let keys = console.keys.unwrap_or_default();
        let default_keymap = Keymap::default();
        let keymap = Keymap {
            submit: chord(keys.submit.as_deref(), default_keymap.submit)?,
            history_prev: chord(keys.history_prev.as_deref(), default_keymap.history_prev)?,
            history_next: chord(keys.history_next.as_deref(), default_keymap.history_next)?,
        };

        Ok(Config {
            server: ServerConfig {
                listen: server.listen.map_or(defaults.server.listen, SmolStr::new),
                poll_interval: Duration::from_millis(poll_interval_ms),
                assets_dir: server
                    .assets_dir
                    .map_or(defaults.server.assets_dir, |dir| root.join(dir)),
                manifest: server
                    .manifest
                    .map_or(defaults.server.manifest, |path| root.join(path)),
                stylesheets: server.stylesheets.map_or(defaults.server.stylesheets, |keys| {
                    keys.into_iter().map(SmolStr::new).collect()
                }),
            },
            console: ConsoleConfig {
                endpoint,
                refresh_interval: Duration::from_millis(
                    console.refresh_ms.unwrap_or(DEFAULT_REFRESH_MS),
                ),
                keymap,
            },
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use drydock_console::ChordKey;

    #[test]
    fn defaults_cover_a_missing_file() {
        let config = Config::default_for(Path::new("/tmp/project"));

        assert_eq!(config.server.listen, DEFAULT_LISTEN);
        assert_eq!(config.server.poll_interval, Duration::from_millis(50));
        assert_eq!(config.server.assets_dir, Path::new("/tmp/project/build"));
        assert_eq!(config.console.endpoint, DEFAULT_ENDPOINT);
        assert_eq!(config.console.keymap, Keymap::default());
    }

    #[test]
    fn sections_override_the_defaults() {
        let text = r#"
[server]
listen = "127.0.0.1:4100"
poll_interval_ms = 10
assets_dir = "dist"
manifest = "dist/manifest.json"
stylesheets = ["main.css", "theme.css"]

[console]
endpoint = "http://127.0.0.1:4100"
refresh_ms = 100

[console.keys]
submit = "ctrl-s"
"#;
        let config = parse(text, Path::new("/work")).unwrap();

        assert_eq!(config.server.listen, "127.0.0.1:4100");
        assert_eq!(config.server.assets_dir, Path::new("/work/dist"));
        assert_eq!(config.server.manifest, Path::new("/work/dist/manifest.json"));
        assert_eq!(config.server.stylesheets.len(), 2);
        assert_eq!(config.console.refresh_interval, Duration::from_millis(100));
        assert_eq!(config.console.keymap.submit.key, ChordKey::Char('s'));
        // Unset bindings keep their defaults.
        assert_eq!(
            config.console.keymap.history_prev,
            Keymap::default().history_prev
        );
    }

    #[test]
    fn rejects_a_zero_poll_interval() {
        let text = "[server]\npoll_interval_ms = 0\n";
        assert!(parse(text, Path::new("/work")).is_err());
    }

    #[test]
    fn rejects_a_non_http_endpoint() {
        let text = "[console]\nendpoint = \"ftp://nowhere\"\n";
        assert!(parse(text, Path::new("/work")).is_err());
    }

    #[test]
    fn rejects_an_unparseable_chord() {
        let text = "[console.keys]\nsubmit = \"hyper-enter\"\n";
        let err = parse(text, Path::new("/work")).unwrap_err();
        assert!(err.to_string().contains("console.keys"));
    }

    #[test]
    fn rejects_invalid_toml() {
        assert!(parse("not toml [", Path::new("/work")).is_err());
    }
}
