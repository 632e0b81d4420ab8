//! The chat pipeline: the message log for the active session and the
//! `Idle -> Sending -> Revealing -> Idle` cycle of one question.
//!
//! The pipeline never performs I/O. Each operation validates and mutates
//! local state, then hands back what the caller has to run (a query, a
//! reveal, a persistence call). Responses are folded back in with the ids
//! they were issued under, and anything that no longer matches is reported
//! as stale.

use std::time::Duration;

use tokio_util::sync::CancellationToken;

use crate::api::PersistMessageRequest;
use crate::core::error::{BackendError, ClientError, PreconditionError, StaleResponseError};
use crate::core::message::{Message, TranscriptRole};
use crate::core::reveal::{split_words, RevealPlan};
use crate::core::session::SessionId;

/// Local greeting shown when a freshly processed document has no history.
pub const WELCOME_MESSAGE: &str =
    "Your document is loaded and ready. Ask me anything about its contents!";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreamingPhase {
    Idle,
    Sending,
    Revealing,
}

#[derive(Debug)]
struct ActiveReveal {
    reveal_id: u64,
    session_id: SessionId,
    words: Vec<String>,
    shown: usize,
    answer: String,
}

#[derive(Debug)]
enum StreamingState {
    Idle,
    Sending {
        request_id: u64,
        session_id: SessionId,
    },
    Revealing(ActiveReveal),
}

/// A question accepted by the pipeline, waiting to be persisted and queried.
#[derive(Debug, Clone)]
pub struct PendingQuestion {
    pub request_id: u64,
    pub session_id: SessionId,
    pub question: String,
    pub cancel_token: CancellationToken,
}

impl PendingQuestion {
    pub fn persist_request(&self) -> PersistMessageRequest {
        PersistMessageRequest {
            session_id: self.session_id.clone(),
            role: TranscriptRole::User,
            content: self.question.clone(),
        }
    }
}

/// What the partially revealed answer looks like right now.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RevealView {
    pub reveal_id: u64,
    pub shown: usize,
    pub total: usize,
    pub text: String,
}

#[derive(Debug)]
pub struct ChatPipeline {
    messages: Vec<Message>,
    owner: Option<SessionId>,
    state: StreamingState,
    /// Log length when the outstanding history load was issued.
    history_base: Option<usize>,
    /// Bumped whenever the log is cleared or replaced wholesale.
    log_generation: u64,
    next_id: u64,
    cancel_token: Option<CancellationToken>,
    last_error: Option<ClientError>,
}

impl Default for ChatPipeline {
    fn default() -> Self {
        Self::new()
    }
}

impl ChatPipeline {
    pub fn new() -> Self {
        Self {
            messages: Vec::new(),
            owner: None,
            state: StreamingState::Idle,
            history_base: None,
            log_generation: 0,
            next_id: 0,
            cancel_token: None,
            last_error: None,
        }
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn phase(&self) -> StreamingPhase {
        match self.state {
            StreamingState::Idle => StreamingPhase::Idle,
            StreamingState::Sending { .. } => StreamingPhase::Sending,
            StreamingState::Revealing(_) => StreamingPhase::Revealing,
        }
    }

    pub fn is_busy(&self) -> bool {
        self.phase() != StreamingPhase::Idle
    }

    pub fn is_loading_history(&self) -> bool {
        self.history_base.is_some()
    }

    pub fn log_generation(&self) -> u64 {
        self.log_generation
    }

    pub fn last_error(&self) -> Option<&ClientError> {
        self.last_error.as_ref()
    }

    pub fn clear_error(&mut self) {
        self.last_error = None;
    }

    fn next_id(&mut self) -> u64 {
        self.next_id += 1;
        self.next_id
    }

    fn cancel_in_flight(&mut self) {
        if let Some(token) = self.cancel_token.take() {
            token.cancel();
        }
        self.state = StreamingState::Idle;
    }

    fn stale(&self, received: &SessionId) -> ClientError {
        ClientError::Stale(StaleResponseError {
            expected: self.owner.clone(),
            received: received.clone(),
        })
    }

    /// Follow the lifecycle's active session. When it changes, the log is
    /// dropped and any query or reveal for the old session is cancelled.
    ///
    /// Returns true when the new session needs its history loaded.
    pub fn on_session_changed(&mut self, session: Option<SessionId>) -> bool {
        if self.owner == session {
            return false;
        }
        self.cancel_in_flight();
        self.messages.clear();
        self.log_generation += 1;
        self.last_error = None;
        self.history_base = session.as_ref().map(|_| 0);
        self.owner = session;
        self.history_base.is_some()
    }

    /// Start a reload of the current session's history.
    pub fn begin_history_reload(&mut self) -> Result<SessionId, PreconditionError> {
        let owner = self.owner.clone().ok_or(PreconditionError::NoDocument)?;
        if self.is_busy() {
            return Err(PreconditionError::RequestInFlight);
        }
        self.history_base = Some(self.messages.len());
        Ok(owner)
    }

    /// Replace the log with the persisted history for `session_id`.
    ///
    /// Messages appended locally while the load was outstanding are kept
    /// after the loaded history. On failure the log is left as it was and
    /// chat stays usable.
    pub fn apply_history(
        &mut self,
        session_id: &SessionId,
        result: Result<Vec<Message>, BackendError>,
        seed_welcome: bool,
    ) -> Result<(), ClientError> {
        if self.owner.as_ref() != Some(session_id) {
            return Err(self.stale(session_id));
        }
        let base = self.history_base.take().unwrap_or(self.messages.len());

        match result {
            Ok(history) => {
                let local = self.messages.split_off(base.min(self.messages.len()));
                self.messages = history;
                if self.messages.is_empty() && local.is_empty() && seed_welcome {
                    self.messages.push(Message::assistant(WELCOME_MESSAGE));
                }
                self.messages.extend(local);
                self.log_generation += 1;
                Ok(())
            }
            Err(err) => {
                let err = ClientError::Backend(err);
                self.last_error = Some(err.clone());
                Err(err)
            }
        }
    }

    /// Accept a question: append it optimistically and hand back the work
    /// needed to persist and answer it.
    ///
    /// Blank input is ignored. Without a session or a stored credential the
    /// question is refused with the precondition that is missing.
    pub fn begin_send(
        &mut self,
        text: &str,
        session: Option<&SessionId>,
        credential_stored: bool,
    ) -> Result<Option<PendingQuestion>, PreconditionError> {
        let question = text.trim();
        if question.is_empty() {
            return Ok(None);
        }
        let session_id = match session {
            Some(session_id) if self.owner.as_ref() == Some(session_id) => session_id.clone(),
            _ => return Err(PreconditionError::NoDocument),
        };
        if !credential_stored {
            return Err(PreconditionError::NoCredential);
        }
        if self.is_busy() {
            return Err(PreconditionError::RequestInFlight);
        }

        self.last_error = None;
        self.messages.push(Message::user(question));

        let request_id = self.next_id();
        let cancel_token = CancellationToken::new();
        self.cancel_token = Some(cancel_token.clone());
        self.state = StreamingState::Sending {
            request_id,
            session_id: session_id.clone(),
        };

        Ok(Some(PendingQuestion {
            request_id,
            session_id,
            question: question.to_string(),
            cancel_token,
        }))
    }

    /// Fold a query response back in. A successful answer moves the pipeline
    /// to `Revealing` and returns the reveal to schedule. A failure keeps the
    /// user's question in the log and returns to `Idle`.
    pub fn apply_query_result(
        &mut self,
        request_id: u64,
        session_id: &SessionId,
        result: Result<String, BackendError>,
        delay: Duration,
    ) -> Result<RevealPlan, ClientError> {
        match &self.state {
            StreamingState::Sending {
                request_id: current,
                session_id: owner,
            } if *current == request_id && owner == session_id => {}
            _ => return Err(self.stale(session_id)),
        }

        let answer = match result {
            Ok(answer) => answer,
            Err(err) => {
                self.state = StreamingState::Idle;
                self.cancel_token = None;
                let err = ClientError::Query(err);
                self.last_error = Some(err.clone());
                return Err(err);
            }
        };

        let words = split_words(&answer);
        let reveal_id = self.next_id();
        let cancel_token = self.cancel_token.get_or_insert_with(CancellationToken::new).clone();
        let plan = RevealPlan {
            reveal_id,
            session_id: session_id.clone(),
            word_count: words.len(),
            delay,
            cancel_token,
        };
        self.state = StreamingState::Revealing(ActiveReveal {
            reveal_id,
            session_id: session_id.clone(),
            words,
            shown: 0,
            answer,
        });
        Ok(plan)
    }

    /// Returns false when the step belongs to a reveal that is no longer current.
    pub fn apply_reveal_step(&mut self, reveal_id: u64, shown: usize) -> bool {
        match &mut self.state {
            StreamingState::Revealing(reveal) if reveal.reveal_id == reveal_id => {
                reveal.shown = reveal.shown.max(shown.min(reveal.words.len()));
                true
            }
            _ => false,
        }
    }

    /// Commit the fully revealed answer to the log. Returns the persistence
    /// call for it, or `None` when the reveal is no longer current.
    pub fn apply_reveal_finished(&mut self, reveal_id: u64) -> Option<PersistMessageRequest> {
        match &self.state {
            StreamingState::Revealing(reveal) if reveal.reveal_id == reveal_id => {}
            _ => return None,
        }
        let StreamingState::Revealing(reveal) =
            std::mem::replace(&mut self.state, StreamingState::Idle)
        else {
            return None;
        };
        self.cancel_token = None;
        self.messages.push(Message::assistant(reveal.answer.clone()));
        Some(PersistMessageRequest {
            session_id: reveal.session_id,
            role: TranscriptRole::Assistant,
            content: reveal.answer,
        })
    }

    pub fn reveal_view(&self) -> Option<RevealView> {
        match &self.state {
            StreamingState::Revealing(reveal) => Some(RevealView {
                reveal_id: reveal.reveal_id,
                shown: reveal.shown,
                total: reveal.words.len(),
                text: reveal.words[..reveal.shown].join(" "),
            }),
            _ => None,
        }
    }

    /// The visible part of the answer being revealed, if any.
    pub fn partial_text(&self) -> Option<String> {
        self.reveal_view().map(|view| view.text)
    }
}
