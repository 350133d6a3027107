//! Events that drive a controller pass

use std::fmt;

/// One user action, processed as exactly one controller pass
#[derive(Clone, PartialEq, Eq)]
pub enum Event {
    /// API key typed into the credential field
    Credential { api_key: String },
    /// Question typed into the live chat input
    Question { text: String },
    /// Question picked from the asked-questions list (zero-based)
    Replay { index: usize },
    /// Clear-history button
    ClearHistory,
    /// Resynchronization pass the host runs after a rebuild directive
    Refresh,
}

impl Event {
    pub fn name(&self) -> &'static str {
        match self {
            Event::Credential { .. } => "credential",
            Event::Question { .. } => "question",
            Event::Replay { .. } => "replay",
            Event::ClearHistory => "clear_history",
            Event::Refresh => "refresh",
        }
    }
}

// Keys must never end up in logs
impl fmt::Debug for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Event::Credential { api_key } => f
                .debug_struct("Credential")
                .field("api_key", &format_args!("<{} chars>", api_key.chars().count()))
                .finish(),
            Event::Question { text } => f.debug_struct("Question").field("text", text).finish(),
            Event::Replay { index } => f.debug_struct("Replay").field("index", index).finish(),
            Event::ClearHistory => f.write_str("ClearHistory"),
            Event::Refresh => f.write_str("Refresh"),
        }
    }
}
