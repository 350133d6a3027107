//! Session hosting
//!
//! Owns every live conversation, runs one controller pass at a time per
//! session, and fans render updates out to display subscribers.

use crate::controller::{Controller, Conversation, Event, Notice, PassOutcome, Phase, Render};
use crate::llm::ClientFactory;
use crate::markdown;
use crate::session::{Role, Turn};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::HashMap;
use std::sync::{Arc, Mutex as StdMutex};
use std::time::{Duration, Instant};
use thiserror::Error;
use tokio::sync::{broadcast, Mutex, RwLock};
use tracing::Instrument;

const BROADCAST_CAPACITY: usize = 64;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum RuntimeError {
    #[error("Session not found: {0}")]
    SessionNotFound(String),
}

/// A transcript turn as the display renders it
#[derive(Debug, Clone, Serialize)]
pub struct TurnView {
    pub role: Role,
    pub text: String,
    /// `text` rendered from markdown
    pub html: String,
    pub at: DateTime<Utc>,
}

impl From<&Turn> for TurnView {
    fn from(turn: &Turn) -> Self {
        Self {
            role: turn.role,
            text: turn.text.clone(),
            html: markdown::to_html(&turn.text),
            at: turn.at,
        }
    }
}

/// Entry in the asked-questions side list
#[derive(Debug, Clone, Serialize)]
pub struct HistoryItem {
    pub index: usize,
    /// `"1. <question>"`, numbered from one
    pub label: String,
    pub question: String,
}

/// Full display state of a session
#[derive(Debug, Clone, Serialize)]
pub struct Snapshot {
    pub session_id: String,
    pub phase: Phase,
    pub transcript: Vec<TurnView>,
    pub history: Vec<HistoryItem>,
}

impl Snapshot {
    fn capture(session_id: &str, conv: &Conversation) -> Self {
        let session = conv.session();
        Self {
            session_id: session_id.to_string(),
            phase: conv.phase(),
            transcript: session.transcript().iter().map(TurnView::from).collect(),
            history: session
                .asked_questions()
                .iter()
                .enumerate()
                .map(|(index, question)| HistoryItem {
                    index,
                    label: format!("{}. {question}", index + 1),
                    question: question.clone(),
                })
                .collect(),
        }
    }
}

/// Events sent to display subscribers
#[derive(Debug, Clone)]
pub enum SseEvent {
    /// Initial state for a new subscriber
    Snapshot(Snapshot),
    /// Turns to show after the current ones
    Turns { turns: Vec<TurnView>, phase: Phase },
    /// Replace the whole view with this state
    Rebuild(Snapshot),
    Notice(Notice),
}

/// Result of dispatching one user action
#[derive(Debug, Clone, Serialize)]
pub struct Dispatched {
    #[serde(flatten)]
    pub outcome: PassOutcome,
    pub phase: Phase,
    /// Present whenever `outcome.render` is a rebuild
    #[serde(skip_serializing_if = "Option::is_none")]
    pub snapshot: Option<Snapshot>,
}

/// Handle to one live session
pub struct SessionHandle {
    conversation: Mutex<Conversation>,
    broadcast_tx: broadcast::Sender<SseEvent>,
    last_used: StdMutex<Instant>,
}

impl SessionHandle {
    fn new() -> Self {
        let (broadcast_tx, _) = broadcast::channel(BROADCAST_CAPACITY);
        Self {
            conversation: Mutex::new(Conversation::new()),
            broadcast_tx,
            last_used: StdMutex::new(Instant::now()),
        }
    }

    fn touch(&self) {
        if let Ok(mut last_used) = self.last_used.lock() {
            *last_used = Instant::now();
        }
    }

    fn idle_since(&self) -> Option<Instant> {
        self.last_used.lock().ok().map(|t| *t)
    }

    fn publish(&self, event: SseEvent) {
        // No subscribers is fine; the HTTP response still carries the outcome
        let _ = self.broadcast_tx.send(event);
    }
}

/// Manager for all live sessions
pub struct SessionManager<F> {
    controller: Controller<F>,
    sessions: RwLock<HashMap<String, Arc<SessionHandle>>>,
    idle_timeout: Duration,
}

impl<F: ClientFactory + 'static> SessionManager<F> {
    pub fn new(factory: F, idle_timeout: Duration) -> Self {
        Self {
            controller: Controller::new(factory),
            sessions: RwLock::new(HashMap::new()),
            idle_timeout,
        }
    }

    /// Create a session and return its id
    pub async fn create(&self) -> String {
        let id = uuid::Uuid::new_v4().to_string();
        self.sessions
            .write()
            .await
            .insert(id.clone(), Arc::new(SessionHandle::new()));
        tracing::info!(session_id = %id, "Session created");
        id
    }

    pub async fn remove(&self, id: &str) -> Result<(), RuntimeError> {
        self.sessions
            .write()
            .await
            .remove(id)
            .map(|_| tracing::info!(session_id = %id, "Session removed"))
            .ok_or_else(|| RuntimeError::SessionNotFound(id.to_string()))
    }

    pub async fn session_count(&self) -> usize {
        self.sessions.read().await.len()
    }

    async fn handle(&self, id: &str) -> Result<Arc<SessionHandle>, RuntimeError> {
        self.sessions
            .read()
            .await
            .get(id)
            .cloned()
            .ok_or_else(|| RuntimeError::SessionNotFound(id.to_string()))
    }

    /// Current display state
    pub async fn snapshot(&self, id: &str) -> Result<Snapshot, RuntimeError> {
        let handle = self.handle(id).await?;
        handle.touch();
        let conv = handle.conversation.lock().await;
        Ok(Snapshot::capture(id, &conv))
    }

    /// Snapshot plus a receiver for every later update
    pub async fn subscribe(
        &self,
        id: &str,
    ) -> Result<(Snapshot, broadcast::Receiver<SseEvent>), RuntimeError> {
        let handle = self.handle(id).await?;
        handle.touch();
        // Subscribe under the lock so no update falls between snapshot and stream
        let conv = handle.conversation.lock().await;
        let rx = handle.broadcast_tx.subscribe();
        Ok((Snapshot::capture(id, &conv), rx))
    }

    /// Run one user action against a session.
    ///
    /// A rebuild directive is acted on before the session lock is released:
    /// subscribers get the rebuilt snapshot and a refresh pass runs (which
    /// re-greets after a clear), so the next event always sees a synced view.
    pub async fn dispatch(&self, id: &str, event: Event) -> Result<Dispatched, RuntimeError> {
        let handle = self.handle(id).await?;
        handle.touch();

        let span = tracing::info_span!("pass", session_id = %id, event = event.name());
        async {
            let mut conv = handle.conversation.lock().await;
            let first = self.controller.handle(&mut conv, event).await;
            publish_notices(&handle, &first.notices);

            if !first.render.is_rebuild() {
                publish_turns(&handle, &first.render, conv.phase());
                return Ok(Dispatched {
                    phase: conv.phase(),
                    outcome: first,
                    snapshot: None,
                });
            }

            tracing::debug!("Rebuild requested; running refresh pass");
            handle.publish(SseEvent::Rebuild(Snapshot::capture(id, &conv)));
            let refresh = self.controller.handle(&mut conv, Event::Refresh).await;
            publish_notices(&handle, &refresh.notices);
            publish_turns(&handle, &refresh.render, conv.phase());

            let mut notices = first.notices;
            notices.extend(refresh.notices);
            Ok(Dispatched {
                outcome: PassOutcome {
                    render: Render::Rebuild,
                    notices,
                },
                phase: conv.phase(),
                snapshot: Some(Snapshot::capture(id, &conv)),
            })
        }
        .instrument(span)
        .await
    }

    /// Drop sessions idle for longer than the timeout, returning how many
    pub async fn sweep_idle(&self, now: Instant) -> usize {
        let mut sessions = self.sessions.write().await;
        let before = sessions.len();
        sessions.retain(|id, handle| {
            let keep = handle
                .idle_since()
                .map_or(true, |t| now.saturating_duration_since(t) < self.idle_timeout);
            if !keep {
                tracing::info!(session_id = %id, "Expiring idle session");
            }
            keep
        });
        before - sessions.len()
    }

    /// Periodically expire idle sessions
    pub fn spawn_idle_sweeper(self: Arc<Self>) -> tokio::task::JoinHandle<()> {
        let period = (self.idle_timeout / 4).max(Duration::from_secs(1));
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(period);
            loop {
                interval.tick().await;
                let expired = self.sweep_idle(Instant::now()).await;
                if expired > 0 {
                    let remaining = self.session_count().await;
                    tracing::debug!(expired, remaining, "Idle sweep finished");
                }
            }
        })
    }
}

fn publish_notices(handle: &SessionHandle, notices: &[Notice]) {
    for notice in notices {
        handle.publish(SseEvent::Notice(notice.clone()));
    }
}

fn publish_turns(handle: &SessionHandle, render: &Render, phase: Phase) {
    if let Render::Append { turns } = render {
        if !turns.is_empty() {
            handle.publish(SseEvent::Turns {
                turns: turns.iter().map(TurnView::from).collect(),
                phase,
            });
        }
    }
}
