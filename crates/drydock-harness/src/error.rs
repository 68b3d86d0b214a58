//! Harness errors.

#![allow(missing_docs)]

use smol_str::SmolStr;
use thiserror::Error;

/// Errors for configuration, the control server, the fixture application,
/// and the console transport.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HarnessError {
    /// Configuration error.
    #[error("invalid config '{0}'")]
    InvalidConfig(SmolStr),

    /// Asset manifest could not be read or parsed.
    #[error("invalid manifest '{0}'")]
    InvalidManifest(SmolStr),

    /// Asset lookup failed.
    #[error("asset not found '{0}'")]
    AssetNotFound(SmolStr),

    /// Command line could not be parsed.
    #[error("malformed command: {0}")]
    MalformedCommand(SmolStr),

    /// Command addressed an object the application does not expose.
    #[error("unknown object '{0}'")]
    UnknownObject(SmolStr),

    /// Command addressed an unknown member on a known object.
    #[error("unknown member '{object}.{member}'")]
    UnknownMember { object: SmolStr, member: SmolStr },

    /// Command argument had the wrong count or type.
    #[error("invalid argument for '{member}': {reason}")]
    InvalidArgument { member: SmolStr, reason: SmolStr },

    /// Web server could not be started.
    #[error("web server error '{0}'")]
    WebServer(SmolStr),

    /// Client-side HTTP transport failure.
    #[error("transport error '{0}'")]
    Transport(SmolStr),
}
