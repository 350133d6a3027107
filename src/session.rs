//! Per-user session state
//!
//! Holds the transcript, the log of asked questions and the two flags that
//! drive greeting and display resynchronization. All mutation goes through
//! the methods here so the invariants live in one place.

#[cfg(test)]
mod proptests;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Who authored a transcript turn
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    User,
    Assistant,
}

impl Role {
    pub fn as_str(self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Assistant => "assistant",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = SessionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "user" => Ok(Role::User),
            "assistant" => Ok(Role::Assistant),
            other => Err(SessionError::InvalidRole(other.to_string())),
        }
    }
}

/// Errors from misuse of the session store
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SessionError {
    #[error("invalid transcript role: {0:?} (expected \"user\" or \"assistant\")")]
    InvalidRole(String),
}

/// One entry in the conversation transcript
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Turn {
    pub role: Role,
    pub text: String,
    pub at: DateTime<Utc>,
}

impl Turn {
    pub fn new(role: Role, text: impl Into<String>) -> Self {
        Self {
            role,
            text: text.into(),
            at: Utc::now(),
        }
    }
}

/// State for a single user interaction context
#[derive(Debug, Clone, Default)]
pub struct Session {
    api_key: Option<String>,
    greeted: bool,
    transcript: Vec<Turn>,
    asked_questions: Vec<String>,
    refresh_pending: bool,
}

impl Session {
    pub fn api_key(&self) -> Option<&str> {
        self.api_key.as_deref()
    }

    pub fn greeted(&self) -> bool {
        self.greeted
    }

    pub fn transcript(&self) -> &[Turn] {
        &self.transcript
    }

    pub fn asked_questions(&self) -> &[String] {
        &self.asked_questions
    }

    pub fn asked_question(&self, index: usize) -> Option<&str> {
        self.asked_questions.get(index).map(String::as_str)
    }

    #[cfg(test)]
    pub fn refresh_pending(&self) -> bool {
        self.refresh_pending
    }

    /// Record the credential that the generation client was configured with
    pub(crate) fn set_api_key(&mut self, api_key: impl Into<String>) {
        self.api_key = Some(api_key.into());
    }

    /// Mark the greeting as delivered.
    ///
    /// Only valid right after the greeting turn was appended; callers outside
    /// the controller should not need this.
    pub(crate) fn mark_greeted(&mut self) {
        debug_assert!(
            self.transcript.iter().any(|t| t.role == Role::Assistant),
            "greeted without an assistant turn"
        );
        self.greeted = true;
    }

    /// Drop the whole conversation and request a display rebuild.
    ///
    /// The credential survives; the next controller pass greets again.
    pub fn reset(&mut self) {
        self.transcript.clear();
        self.asked_questions.clear();
        self.greeted = false;
        self.refresh_pending = true;
    }

    /// Append a turn. User turns are also logged as asked questions.
    pub fn append_turn(&mut self, role: Role, text: impl Into<String>) -> &Turn {
        let text = text.into();
        if role == Role::User {
            self.asked_questions.push(text.clone());
        }
        self.transcript.push(Turn::new(role, text));
        &self.transcript[self.transcript.len() - 1]
    }

    /// Append a turn whose role arrives as a name (e.g. from a wire format).
    ///
    /// Fails without touching the transcript if the name is not a known role.
    #[allow(dead_code)] // Internal callers use the typed `append_turn`
    pub fn append_named_turn(
        &mut self,
        role: &str,
        text: impl Into<String>,
    ) -> Result<&Turn, SessionError> {
        let role = role.parse::<Role>()?;
        Ok(self.append_turn(role, text))
    }

    /// Replace the transcript with a single user turn for history replay.
    ///
    /// `asked_questions` is left alone: the replayed question is already there.
    pub fn replace_transcript_with_single_user_turn(&mut self, text: impl Into<String>) {
        self.transcript.clear();
        self.transcript.push(Turn::new(Role::User, text));
        self.refresh_pending = true;
    }

    /// Consume the refresh flag, returning whether a rebuild was pending
    pub fn take_refresh(&mut self) -> bool {
        std::mem::take(&mut self.refresh_pending)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn roles(session: &Session) -> Vec<Role> {
        session.transcript().iter().map(|t| t.role).collect()
    }

    #[test]
    fn test_new_session_is_empty() {
        let session = Session::default();
        assert!(session.api_key().is_none());
        assert!(!session.greeted());
        assert!(session.transcript().is_empty());
        assert!(session.asked_questions().is_empty());
        assert!(!session.refresh_pending());
    }

    #[test]
    fn test_user_turn_is_logged_as_question() {
        let mut session = Session::default();
        session.append_turn(Role::Assistant, "Hello!");
        session.append_turn(Role::User, "How many customers?");

        assert_eq!(roles(&session), vec![Role::Assistant, Role::User]);
        assert_eq!(session.asked_questions(), ["How many customers?"]);
    }

    #[test]
    fn test_repeated_question_is_logged_twice() {
        let mut session = Session::default();
        session.append_turn(Role::User, "same");
        session.append_turn(Role::User, "same");
        assert_eq!(session.asked_questions().len(), 2);
    }

    #[test]
    fn test_named_turn_rejects_unknown_role() {
        let mut session = Session::default();
        session.append_turn(Role::User, "q");

        let err = session.append_named_turn("system", "nope").unwrap_err();
        assert_eq!(err, SessionError::InvalidRole("system".to_string()));
        assert_eq!(session.transcript().len(), 1);
        assert_eq!(session.asked_questions().len(), 1);
    }

    #[test]
    fn test_named_turn_accepts_known_roles() {
        let mut session = Session::default();
        session.append_named_turn("user", "q").unwrap();
        session.append_named_turn("assistant", "a").unwrap();
        assert_eq!(roles(&session), vec![Role::User, Role::Assistant]);
    }

    #[test]
    fn test_reset_clears_everything_but_credential() {
        let mut session = Session::default();
        session.set_api_key("key");
        session.append_turn(Role::Assistant, "Hi");
        session.mark_greeted();
        session.append_turn(Role::User, "q");

        session.reset();

        assert!(session.transcript().is_empty());
        assert!(session.asked_questions().is_empty());
        assert!(!session.greeted());
        assert!(session.refresh_pending());
        assert_eq!(session.api_key(), Some("key"));
    }

    #[test]
    fn test_replace_keeps_asked_questions() {
        let mut session = Session::default();
        session.append_turn(Role::Assistant, "Hi");
        session.append_turn(Role::User, "first");
        session.append_turn(Role::Assistant, "SELECT 1;");
        session.append_turn(Role::User, "second");

        session.replace_transcript_with_single_user_turn("first");

        assert_eq!(session.transcript().len(), 1);
        assert_eq!(session.transcript()[0].role, Role::User);
        assert_eq!(session.transcript()[0].text, "first");
        assert_eq!(session.asked_questions(), ["first", "second"]);
        assert!(session.refresh_pending());
    }

    #[test]
    fn test_take_refresh_consumes_flag() {
        let mut session = Session::default();
        assert!(!session.take_refresh());
        session.reset();
        assert!(session.take_refresh());
        assert!(!session.take_refresh());
    }

    #[test]
    fn test_role_round_trips_through_str() {
        for role in [Role::User, Role::Assistant] {
            assert_eq!(role.as_str().parse::<Role>().unwrap(), role);
        }
        assert!("User".parse::<Role>().is_err());
    }
}
