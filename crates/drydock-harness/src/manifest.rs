//! Asset manifest loading, resolution, and markup rewriting.
//!
//! Build tools emit a JSON manifest mapping logical asset paths to their
//! content-hashed outputs. Rendered snapshots refer to assets by logical
//! path; the control server rewrites every `src`/`href` attribute through
//! the manifest before a snapshot goes over the wire.

use std::path::Path;

use rustc_hash::FxHashMap;
use smol_str::SmolStr;

use crate::error::HarnessError;

/// Mapping from logical asset paths to built (content-hashed) paths.
#[derive(Debug, Clone, Default)]
pub struct AssetManifest {
    files: FxHashMap<String, String>,
}

impl AssetManifest {
    /// Creates an empty manifest. Every resolution falls through unchanged.
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    /// Reads a manifest file from disk.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, HarnessError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|err| {
            HarnessError::InvalidManifest(format!("{}: {err}", path.display()).into())
        })?;
        Self::from_json(&text)
    }

    /// Parses manifest JSON.
    ///
    /// Accepts the common build-tool shape `{ "files": { ... } }` as well
    /// as a bare object of path mappings.
    pub fn from_json(text: &str) -> Result<Self, HarnessError> {
        let value: serde_json::Value = serde_json::from_str(text)
            .map_err(|err| HarnessError::InvalidManifest(format!("{err}").into()))?;
        let map = value.get("files").unwrap_or(&value);
        let Some(object) = map.as_object() else {
            return Err(HarnessError::InvalidManifest(
                "expected an object of path mappings".into(),
            ));
        };

        let mut files = FxHashMap::default();
        for (key, entry) in object {
            let Some(resolved) = entry.as_str() else {
                return Err(HarnessError::InvalidManifest(
                    format!("non-string entry for '{key}'").into(),
                ));
            };
            files.insert(key.clone(), resolved.to_string());
        }
        Ok(Self { files })
    }

    /// Number of mapped assets.
    #[must_use]
    pub fn len(&self) -> usize {
        self.files.len()
    }

    /// Returns true if the manifest maps nothing.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    /// The built path for `path`, if the manifest knows it under the exact
    /// key or under the `static/media/` prefix.
    #[must_use]
    pub fn lookup(&self, path: &str) -> Option<&str> {
        if let Some(hit) = self.files.get(path) {
            return Some(hit);
        }
        self.files
            .get(&format!("static/media/{path}"))
            .map(String::as_str)
    }

    /// Resolves `path`: exact key match, then the `static/media/` prefix
    /// fallback, then the path unchanged.
    #[must_use]
    pub fn resolve(&self, path: &str) -> String {
        match self.lookup(path) {
            Some(hit) => hit.to_string(),
            None => path.to_string(),
        }
    }

    /// Built paths for the configured stylesheet keys, skipping keys the
    /// manifest does not know.
    #[must_use]
    pub fn stylesheets(&self, keys: &[SmolStr]) -> Vec<String> {
        keys.iter()
            .filter_map(|key| self.lookup(key))
            .map(ToString::to_string)
            .collect()
    }

    /// Rewrites every `src="..."` and `href="..."` attribute value in
    /// `html` through [`AssetManifest::resolve`].
    #[must_use]
    pub fn rewrite_html(&self, html: &str) -> String {
        let mut out = String::with_capacity(html.len());
        let mut rest = html;
        loop {
            let src = rest.find("src=\"");
            let href = rest.find("href=\"");
            let (at, attr) = match (src, href) {
                (Some(s), Some(h)) if s <= h => (s, "src=\""),
                (Some(s), None) => (s, "src=\""),
                (_, Some(h)) => (h, "href=\""),
                (None, None) => break,
            };
            let value_start = at + attr.len();
            // Attribute without a closing quote: leave the tail untouched.
            let Some(value_len) = rest[value_start..].find('"') else {
                break;
            };
            out.push_str(&rest[..value_start]);
            out.push_str(&self.resolve(&rest[value_start..value_start + value_len]));
            out.push('"');
            rest = &rest[value_start + value_len + 1..];
        }
        out.push_str(rest);
        out
    }
}
