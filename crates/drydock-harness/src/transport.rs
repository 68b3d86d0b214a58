//! HTTP client side of the submission protocol.

use std::time::Duration;

use drydock_console::{CommandRequest, CommandResponse, CommandsResponse, LoadResponse};
use tracing::debug;

use crate::error::HarnessError;

/// Client for a running control server.
///
/// The console session refuses to overlap submissions, so one blocking
/// client per session is enough.
pub struct ControlClient {
    agent: ureq::Agent,
    endpoint: String,
}

impl ControlClient {
    /// Creates a client for an endpoint such as `http://127.0.0.1:3001`.
    pub fn new(endpoint: impl Into<String>) -> Self {
        let agent = ureq::AgentBuilder::new()
            .timeout_connect(Duration::from_millis(1_000))
            .timeout_read(Duration::from_millis(5_000))
            .build();
        Self {
            agent,
            endpoint: endpoint.into().trim_end_matches('/').to_string(),
        }
    }

    /// The endpoint this client talks to.
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Fetches the initial snapshot and stylesheet list.
    pub fn load(&self) -> Result<LoadResponse, HarnessError> {
        let url = format!("{}/load", self.endpoint);
        let body = self.get_text(&url)?;
        serde_json::from_str(&body)
            .map_err(|err| HarnessError::Transport(format!("load: {err}").into()))
    }

    /// Submits one command and returns the server's verdict.
    ///
    /// A command that fails inside the application still comes back as
    /// `Ok`, with the failure in [`CommandResponse::error`]; only transport
    /// and protocol problems are `Err`.
    pub fn submit(&self, command: &str) -> Result<CommandResponse, HarnessError> {
        let url = format!("{}/command", self.endpoint);
        let payload = CommandRequest {
            command: command.to_string(),
        };
        let body = serde_json::to_string(&payload)
            .map_err(|err| HarnessError::Transport(format!("command: {err}").into()))?;
        debug!(command = %command, "posting command");
        let response = self
            .agent
            .post(&url)
            .set("Content-Type", "application/json")
            .send_string(&body)
            .map_err(transport_error)?;
        let body = response
            .into_string()
            .map_err(|err| HarnessError::Transport(format!("command: {err}").into()))?;
        serde_json::from_str(&body)
            .map_err(|err| HarnessError::Transport(format!("command: {err}").into()))
    }

    /// Fetches the application's command index for completion.
    pub fn commands(&self) -> Result<CommandsResponse, HarnessError> {
        let url = format!("{}/commands", self.endpoint);
        let body = self.get_text(&url)?;
        serde_json::from_str(&body)
            .map_err(|err| HarnessError::Transport(format!("commands: {err}").into()))
    }

    /// Fetches the stylesheet text.
    pub fn styling(&self) -> Result<String, HarnessError> {
        self.get_text(&format!("{}/styling", self.endpoint))
    }

    /// Asks the server to stop and returns its acknowledgement.
    pub fn stop(&self) -> Result<String, HarnessError> {
        self.get_text(&format!("{}/stop", self.endpoint))
    }

    fn get_text(&self, url: &str) -> Result<String, HarnessError> {
        let response = self.agent.get(url).call().map_err(transport_error)?;
        response
            .into_string()
            .map_err(|err| HarnessError::Transport(format!("{err}").into()))
    }
}

fn transport_error(err: ureq::Error) -> HarnessError {
    match err {
        ureq::Error::Status(code, response) => {
            let body = response.into_string().unwrap_or_default();
            HarnessError::Transport(format!("status {code}: {body}").into())
        }
        other => HarnessError::Transport(format!("{other}").into()),
    }
}
