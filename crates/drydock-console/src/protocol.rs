//! Wire types shared by the control server and the console client.
//!
//! The field names are part of the HTTP contract, so the structs here pin
//! them down once for both sides. `cssFiles` keeps its camel-case spelling
//! on the wire.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::completion::CommandIndex;

/// Body of `POST /command`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommandRequest {
    /// The command text to execute.
    pub command: String,
}

/// Response to `POST /command`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommandResponse {
    /// Rendered snapshot of the application, asset paths resolved.
    pub html: String,
    /// Execution error, when the command failed. The snapshot is still
    /// returned so the view reflects whatever state the failure left.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Response to `GET /load`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoadResponse {
    /// Rendered snapshot of the application, asset paths resolved.
    pub html: String,
    /// Resolved stylesheet paths for the snapshot.
    #[serde(rename = "cssFiles")]
    pub css_files: Vec<String>,
}

/// Response to `GET /commands`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommandsResponse {
    /// Object to member-names mapping, in declaration order.
    pub commands: IndexMap<String, Vec<String>>,
}

impl CommandsResponse {
    /// Builds the wire shape from an application's command index.
    #[must_use]
    pub fn from_index(index: &CommandIndex) -> Self {
        let commands = index
            .iter()
            .map(|(object, members)| {
                (
                    object.to_string(),
                    members.iter().map(ToString::to_string).collect(),
                )
            })
            .collect();
        Self { commands }
    }

    /// Rebuilds the command index on the client side.
    #[must_use]
    pub fn into_index(self) -> CommandIndex {
        let mut index = CommandIndex::new();
        for (object, members) in self.commands {
            index.insert(object, members);
        }
        index
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn command_response_omits_a_missing_error() {
        let response = CommandResponse {
            html: "<p>ok</p>".into(),
            error: None,
        };
        let json = serde_json::to_string(&response).unwrap();
        assert_eq!(json, r#"{"html":"<p>ok</p>"}"#);

        let parsed: CommandResponse = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, response);
    }

    #[test]
    fn command_response_carries_an_error_when_present() {
        let json = r#"{"html":"<p/>","error":"unknown member"}"#;
        let parsed: CommandResponse = serde_json::from_str(json).unwrap();
        assert_eq!(parsed.error.as_deref(), Some("unknown member"));
    }

    #[test]
    fn load_response_keeps_the_camel_case_field() {
        let response = LoadResponse {
            html: "<div/>".into(),
            css_files: vec!["static/css/main.abc123.css".into()],
        };
        let json = serde_json::to_string(&response).unwrap();
        assert!(json.contains(r#""cssFiles":["static/css/main.abc123.css"]"#));
    }

    #[test]
    fn commands_response_round_trips_declaration_order() {
        let mut index = CommandIndex::new();
        index.insert("lamp", ["turn_on", "turn_off"]);
        index.insert("app", ["start"]);

        let wire = CommandsResponse::from_index(&index);
        let json = serde_json::to_string(&wire).unwrap();
        let parsed: CommandsResponse = serde_json::from_str(&json).unwrap();
        let rebuilt = parsed.into_index();

        let objects: Vec<&str> = rebuilt.objects().map(|object| object.as_str()).collect();
        assert_eq!(objects, vec!["lamp", "app"]);
        assert_eq!(rebuilt.members("lamp").map(|members| members.len()), Some(2));
    }
}
