//! The application-under-test seam.

use drydock_console::CommandIndex;

use crate::error::HarnessError;

/// A live application the control server drives.
///
/// The server owns its application exclusively and calls it from the
/// request loop: [`Application::execute`] for each submitted command,
/// [`Application::render`] for every snapshot, [`Application::commands`]
/// for the completion index. Implementations hold whatever state the
/// application accumulates across commands; the harness never inspects it
/// beyond the rendered markup.
pub trait Application: Send {
    /// Executes one console command against the live application.
    ///
    /// A failure is reported back to the client in the response's `error`
    /// field; the application should leave itself in a renderable state
    /// either way.
    fn execute(&mut self, command: &str) -> Result<(), HarnessError>;

    /// Renders the current state as an HTML snapshot.
    ///
    /// Asset references are written with their logical paths; the server
    /// rewrites them through the manifest before responding.
    fn render(&self) -> String;

    /// The objects and members the application exposes to completion.
    fn commands(&self) -> CommandIndex;
}
