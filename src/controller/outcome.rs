//! What a controller pass tells the display surface

use crate::session::Turn;
use serde::Serialize;

/// How the display must update after a pass
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Render {
    /// Show these turns after the ones already on screen
    Append { turns: Vec<Turn> },
    /// Discard the current view and re-render from a full snapshot before
    /// accepting the next event
    Rebuild,
}

impl Render {
    pub fn is_rebuild(&self) -> bool {
        matches!(self, Render::Rebuild)
    }
}

/// Category of a user-visible notice
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum NoticeKind {
    /// The API key could not be configured
    Credential,
    /// A question or replay arrived before any key was configured
    CredentialRequired,
    /// Greeting generation failed; retried next pass
    Greeting,
    /// Translation generation failed
    Generation,
    /// Replay index does not point at an asked question
    InvalidSelection,
}

/// Message surfaced to the user in place of an error
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notice {
    pub kind: NoticeKind,
    pub message: String,
}

impl Notice {
    pub fn new(kind: NoticeKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

/// Result of one controller pass
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PassOutcome {
    pub render: Render,
    pub notices: Vec<Notice>,
}

impl PassOutcome {
    #[cfg(test)]
    pub fn has_notice(&self, kind: NoticeKind) -> bool {
        self.notices.iter().any(|n| n.kind == kind)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::Role;
    use serde_json::json;

    #[test]
    fn test_render_wire_format() {
        assert_eq!(
            serde_json::to_value(Render::Rebuild).unwrap(),
            json!({ "type": "rebuild" })
        );

        let append = serde_json::to_value(Render::Append {
            turns: vec![Turn::new(Role::Assistant, "Hi")],
        })
        .unwrap();
        assert_eq!(append["type"], "append");
        assert_eq!(append["turns"][0]["role"], "assistant");
        assert_eq!(append["turns"][0]["text"], "Hi");
    }

    #[test]
    fn test_notice_kind_wire_format() {
        let notice = Notice::new(NoticeKind::CredentialRequired, "Enter an API key first");
        assert_eq!(
            serde_json::to_value(notice).unwrap(),
            json!({ "kind": "credential_required", "message": "Enter an API key first" })
        );
    }
}
