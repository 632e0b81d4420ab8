mod chat;
mod input;
mod lifecycle;

use std::path::PathBuf;

use tokio::sync::mpsc;

use super::{App, PendingQuestion, UploadTicket};
use crate::api::{
    CredentialStatus, DocumentInfo, PersistMessageRequest, QueryRequest, StoreCredentialRequest,
    UploadReceipt,
};
use crate::core::error::BackendError;
use crate::core::message::Message;
use crate::core::reveal::RevealPlan;
use crate::core::session::SessionId;

#[derive(Debug)]
pub enum AppAction {
    Bootstrap {
        resume: Option<SessionId>,
    },
    HealthChecked {
        result: Result<(), BackendError>,
    },
    CredentialStatusLoaded {
        result: Result<CredentialStatus, BackendError>,
    },
    SelectModel {
        model: String,
    },
    SubmitCredential {
        api_key: String,
    },
    CredentialStored {
        model: String,
        result: Result<(), BackendError>,
    },
    UploadDocument {
        path: PathBuf,
    },
    UploadFinished {
        ticket: UploadTicket,
        result: Result<UploadReceipt, BackendError>,
    },
    RemoveDocument,
    RestoreFinished {
        session_id: SessionId,
        result: Result<DocumentInfo, BackendError>,
    },
    ReloadHistory,
    HistoryLoaded {
        session_id: SessionId,
        seed_welcome: bool,
        result: Result<Vec<Message>, BackendError>,
    },
    SendQuestion {
        text: String,
    },
    QueryFinished {
        request_id: u64,
        session_id: SessionId,
        result: Result<String, BackendError>,
    },
    RevealStep {
        reveal_id: u64,
        shown: usize,
    },
    RevealFinished {
        reveal_id: u64,
    },
    SubmitInput {
        line: String,
    },
    DismissNotices,
    Quit,
}

#[derive(Clone)]
pub struct AppActionDispatcher {
    tx: mpsc::UnboundedSender<AppAction>,
}

impl AppActionDispatcher {
    pub fn new(tx: mpsc::UnboundedSender<AppAction>) -> Self {
        Self { tx }
    }

    pub fn dispatch(&self, action: AppAction) {
        let _ = self.tx.send(action);
    }
}

/// Side effects requested by a handler, run by the UI's executors.
#[derive(Debug)]
pub enum AppCommand {
    Bootstrap { resume: Option<SessionId> },
    StoreCredential(StoreCredentialRequest),
    Upload(UploadTicket),
    LoadHistory { session_id: SessionId, seed_welcome: bool },
    /// Persist the question, then query for its answer.
    SendQuestion {
        pending: PendingQuestion,
        query: QueryRequest,
    },
    Reveal(RevealPlan),
    PersistMessage(PersistMessageRequest),
}

pub fn apply_actions(app: &mut App, actions: impl IntoIterator<Item = AppAction>) -> Vec<AppCommand> {
    let mut commands = Vec::new();
    for action in actions {
        if let Some(cmd) = apply_action(app, action) {
            commands.push(cmd);
        }
    }
    app.publish();
    commands
}

pub fn apply_action(app: &mut App, action: AppAction) -> Option<AppCommand> {
    match action {
        AppAction::Bootstrap { .. }
        | AppAction::HealthChecked { .. }
        | AppAction::CredentialStatusLoaded { .. }
        | AppAction::SelectModel { .. }
        | AppAction::SubmitCredential { .. }
        | AppAction::CredentialStored { .. }
        | AppAction::UploadDocument { .. }
        | AppAction::UploadFinished { .. }
        | AppAction::RemoveDocument
        | AppAction::RestoreFinished { .. } => lifecycle::handle_lifecycle_action(app, action),

        AppAction::ReloadHistory
        | AppAction::HistoryLoaded { .. }
        | AppAction::SendQuestion { .. }
        | AppAction::QueryFinished { .. }
        | AppAction::RevealStep { .. }
        | AppAction::RevealFinished { .. } => chat::handle_chat_action(app, action),

        AppAction::SubmitInput { .. } | AppAction::DismissNotices | AppAction::Quit => {
            input::handle_input_action(app, action)
        }
    }
}
