//! Conversation controller
//!
//! Each user action is one `Event`, handled as one pass over a
//! `Conversation`. A pass may call the generation service, mutates the
//! session, and returns a `PassOutcome` telling the display how to update.
//! Generation and credential failures are caught here and become notices;
//! nothing propagates out of `handle`.

mod event;
mod outcome;

#[cfg(test)]
mod proptests;
#[cfg(test)]
pub mod testing;

pub use event::Event;
pub use outcome::{Notice, NoticeKind, PassOutcome, Render};

use crate::llm::{ClientFactory, GenerationError, LlmRequest, LlmService};
use crate::prompt;
use crate::session::{Role, Session, Turn};
use serde::Serialize;
use std::sync::Arc;

/// Where a conversation is in its lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    /// No API key configured; generation is disabled
    Unconfigured,
    /// Configured, greeting not yet delivered
    AwaitingGreeting,
    Greeted,
}

/// Session state plus the generation client configured for it
#[derive(Default)]
pub struct Conversation {
    session: Session,
    client: Option<Arc<dyn LlmService>>,
}

impl Conversation {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn phase(&self) -> Phase {
        match (&self.client, self.session.greeted()) {
            (None, _) => Phase::Unconfigured,
            (Some(_), false) => Phase::AwaitingGreeting,
            (Some(_), true) => Phase::Greeted,
        }
    }
}

/// Turns appended and notices raised during a pass
#[derive(Default)]
struct Pass {
    appended: Vec<Turn>,
    notices: Vec<Notice>,
}

impl Pass {
    fn append(&mut self, session: &mut Session, role: Role, text: String) {
        let turn = session.append_turn(role, text).clone();
        self.appended.push(turn);
    }

    fn notice(&mut self, kind: NoticeKind, message: impl Into<String>) {
        self.notices.push(Notice::new(kind, message));
    }

    /// Close the pass, consuming any pending refresh into the render directive
    fn finish(self, session: &mut Session) -> PassOutcome {
        let render = if session.take_refresh() {
            Render::Rebuild
        } else {
            Render::Append {
                turns: self.appended,
            }
        };
        PassOutcome {
            render,
            notices: self.notices,
        }
    }
}

/// Drives conversations using clients built by `F`
pub struct Controller<F> {
    factory: F,
}

impl<F: ClientFactory> Controller<F> {
    pub fn new(factory: F) -> Self {
        Self { factory }
    }

    /// Process one event as a single pass
    pub async fn handle(&self, conv: &mut Conversation, event: Event) -> PassOutcome {
        tracing::debug!(event = event.name(), phase = ?conv.phase(), "Controller pass");
        let mut pass = Pass::default();

        match event {
            Event::Credential { api_key } => {
                self.configure(conv, &api_key, &mut pass);
                self.greet_if_needed(conv, &mut pass).await;
            }
            Event::Question { text } => {
                self.greet_if_needed(conv, &mut pass).await;
                self.submit_fresh(conv, text, &mut pass).await;
            }
            Event::Replay { index } => {
                self.greet_if_needed(conv, &mut pass).await;
                self.submit_replay(conv, index, &mut pass).await;
            }
            Event::ClearHistory => {
                conv.session.reset();
                tracing::info!("History cleared");
            }
            Event::Refresh => {
                self.greet_if_needed(conv, &mut pass).await;
            }
        }

        pass.finish(&mut conv.session)
    }

    fn configure(&self, conv: &mut Conversation, api_key: &str, pass: &mut Pass) {
        let api_key = api_key.trim();
        if api_key.is_empty() {
            return;
        }
        if conv.client.is_some() && conv.session.api_key() == Some(api_key) {
            tracing::debug!("API key unchanged; keeping current client");
            return;
        }

        match self.factory.configure(api_key) {
            Ok(client) => {
                tracing::info!(model = client.model_id(), "Generation client configured");
                conv.client = Some(client);
                conv.session.set_api_key(api_key);
            }
            Err(e) => {
                tracing::warn!(error = %e, "Rejected API key");
                pass.notice(
                    NoticeKind::Credential,
                    format!("Error configuring API key: {e}"),
                );
            }
        }
    }

    async fn greet_if_needed(&self, conv: &mut Conversation, pass: &mut Pass) {
        if conv.session.greeted() {
            return;
        }
        let Some(client) = conv.client.clone() else {
            return;
        };

        match self.generate(client.as_ref(), prompt::greeting().to_string()).await {
            Ok(greeting) => {
                pass.append(&mut conv.session, Role::Assistant, greeting);
                conv.session.mark_greeted();
            }
            Err(e) => {
                pass.notice(
                    NoticeKind::Greeting,
                    format!("Error generating AI greeting: {e}"),
                );
            }
        }
    }

    async fn submit_fresh(&self, conv: &mut Conversation, text: String, pass: &mut Pass) {
        if text.trim().is_empty() {
            return;
        }
        let Some(client) = conv.client.clone() else {
            pass.notice(
                NoticeKind::CredentialRequired,
                "Enter your Gemini API key before asking a question.",
            );
            return;
        };

        // Recorded before the call; a failed call leaves the question in place
        pass.append(&mut conv.session, Role::User, text);
        let request = prompt::translation(conv.session.transcript());

        match self.generate(client.as_ref(), request).await {
            Ok(answer) => pass.append(&mut conv.session, Role::Assistant, answer),
            Err(e) => pass.notice(
                NoticeKind::Generation,
                format!("Error generating AI response: {e}"),
            ),
        }
    }

    async fn submit_replay(&self, conv: &mut Conversation, index: usize, pass: &mut Pass) {
        let Some(question) = conv.session.asked_question(index).map(str::to_owned) else {
            pass.notice(
                NoticeKind::InvalidSelection,
                format!("No question #{} in history.", index.saturating_add(1)),
            );
            return;
        };
        let Some(client) = conv.client.clone() else {
            pass.notice(
                NoticeKind::CredentialRequired,
                "Enter your Gemini API key before replaying a question.",
            );
            return;
        };

        let request = prompt::replay(&question);
        conv.session.replace_transcript_with_single_user_turn(question);
        tracing::info!(index, "Replaying question from history");

        match self.generate(client.as_ref(), request).await {
            Ok(answer) => pass.append(&mut conv.session, Role::Assistant, answer),
            Err(e) => pass.notice(
                NoticeKind::Generation,
                format!("Error generating AI response: {e}"),
            ),
        }
    }

    async fn generate(
        &self,
        client: &dyn LlmService,
        prompt: String,
    ) -> Result<String, GenerationError> {
        let request = LlmRequest::prompt(prompt).with_max_tokens(self.factory.max_output_tokens());
        let response = client.complete(&request).await?;
        Ok(response.full_text())
    }
}
