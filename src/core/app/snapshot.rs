//! Read-only view of the app published to observers after each change.

use super::{App, CredentialState, Notice, ProcessingStatus, RevealView, StreamingPhase};
use crate::core::document::Document;
use crate::core::message::Message;
use crate::core::session::SessionId;

#[derive(Debug, Clone, PartialEq)]
pub struct AppSnapshot {
    pub backend_connected: Option<bool>,
    pub credential: CredentialState,
    pub credential_in_flight: bool,
    pub session_id: Option<SessionId>,
    pub document: Option<Document>,
    pub processing: ProcessingStatus,
    pub reset_epoch: u64,
    pub phase: StreamingPhase,
    pub reveal: Option<RevealView>,
    pub log_generation: u64,
    pub messages: Vec<Message>,
    pub notices: Vec<Notice>,
    pub exit_requested: bool,
}

impl Default for AppSnapshot {
    fn default() -> Self {
        Self {
            backend_connected: None,
            credential: CredentialState::Absent,
            credential_in_flight: false,
            session_id: None,
            document: None,
            processing: ProcessingStatus::NoDocument,
            reset_epoch: 0,
            phase: StreamingPhase::Idle,
            reveal: None,
            log_generation: 0,
            messages: Vec::new(),
            notices: Vec::new(),
            exit_requested: false,
        }
    }
}

impl AppSnapshot {
    pub(crate) fn capture(app: &App) -> Self {
        let lifecycle = &app.lifecycle;
        Self {
            backend_connected: lifecycle.backend_connected(),
            credential: lifecycle.credential().clone(),
            credential_in_flight: lifecycle.credential_in_flight(),
            session_id: lifecycle.session_id().cloned(),
            document: lifecycle.document().cloned(),
            processing: lifecycle.processing_status(),
            reset_epoch: lifecycle.reset_epoch(),
            phase: app.chat.phase(),
            reveal: app.chat.reveal_view(),
            log_generation: app.chat.log_generation(),
            messages: app.chat.messages().to_vec(),
            notices: app.notices().to_vec(),
            exit_requested: app.exit_requested(),
        }
    }
}
