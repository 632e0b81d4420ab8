use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;

use async_trait::async_trait;

use crate::api::{
    BackendGateway, CredentialStatus, DocumentInfo, PersistMessageRequest, QueryRequest,
    StoreCredentialRequest, UploadReceipt,
};
use crate::core::app::App;
use crate::core::config::Config;
use crate::core::document::DocumentFile;
use crate::core::error::BackendError;
use crate::core::message::Message;
use crate::core::session::SessionId;
use crate::utils::logging::LoggingState;

pub fn create_test_app() -> App {
    create_test_app_with_config(Config::default())
}

pub fn create_test_app_with_config(config: Config) -> App {
    App::new(config, LoggingState::default())
}

pub fn upload_receipt(session_id: &str, from_cache: bool) -> UploadReceipt {
    UploadReceipt {
        session_id: SessionId::from(session_id),
        chunk_count: Some(12),
        page_count: Some(4),
        from_cache,
        processing_time_secs: Some(1.5),
        uploaded_at: None,
    }
}

/// Write a small file with the given name into `dir` and return its path.
pub fn write_document(dir: &tempfile::TempDir, name: &str, contents: &[u8]) -> std::path::PathBuf {
    let path = dir.path().join(name);
    std::fs::write(&path, contents).expect("write test document");
    path
}

/// A gateway call as observed by [`FakeGateway`].
#[derive(Debug, Clone, PartialEq)]
pub enum GatewayCall {
    Health,
    CredentialStatus,
    StoreCredential { model: String },
    Upload { file_name: String },
    SendMessage(Message, SessionId),
    GetMessages(SessionId),
    Query { session_id: SessionId, question: String },
    DocumentInfo(SessionId),
}

/// Scripted in-memory backend. Each method pops the next scripted result
/// and falls back to a benign default once its queue is empty.
///
/// Messages that persist successfully are kept per session, and an
/// unscripted `get_messages` returns them in the order they arrived.
#[derive(Default)]
pub struct FakeGateway {
    calls: Mutex<Vec<GatewayCall>>,
    health: Mutex<VecDeque<Result<(), BackendError>>>,
    credential_status: Mutex<VecDeque<Result<CredentialStatus, BackendError>>>,
    store_credential: Mutex<VecDeque<Result<(), BackendError>>>,
    uploads: Mutex<VecDeque<Result<UploadReceipt, BackendError>>>,
    send_message: Mutex<VecDeque<Result<(), BackendError>>>,
    messages: Mutex<VecDeque<Result<Vec<Message>, BackendError>>>,
    answers: Mutex<VecDeque<Result<String, BackendError>>>,
    document_info: Mutex<VecDeque<Result<DocumentInfo, BackendError>>>,
    stored: Mutex<HashMap<SessionId, Vec<Message>>>,
}

fn push<T>(queue: &Mutex<VecDeque<T>>, value: T) {
    queue.lock().expect("fake gateway lock").push_back(value);
}

fn pop<T>(queue: &Mutex<VecDeque<T>>) -> Option<T> {
    queue.lock().expect("fake gateway lock").pop_front()
}

impl FakeGateway {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn calls(&self) -> Vec<GatewayCall> {
        self.calls.lock().expect("fake gateway lock").clone()
    }

    fn record(&self, call: GatewayCall) {
        self.calls.lock().expect("fake gateway lock").push(call);
    }

    pub fn script_health(&self, result: Result<(), BackendError>) {
        push(&self.health, result);
    }

    pub fn script_credential_status(&self, result: Result<CredentialStatus, BackendError>) {
        push(&self.credential_status, result);
    }

    pub fn script_store_credential(&self, result: Result<(), BackendError>) {
        push(&self.store_credential, result);
    }

    pub fn script_upload(&self, result: Result<UploadReceipt, BackendError>) {
        push(&self.uploads, result);
    }

    pub fn script_send_message(&self, result: Result<(), BackendError>) {
        push(&self.send_message, result);
    }

    pub fn script_messages(&self, result: Result<Vec<Message>, BackendError>) {
        push(&self.messages, result);
    }

    pub fn script_answer(&self, result: Result<String, BackendError>) {
        push(&self.answers, result);
    }

    pub fn script_document_info(&self, result: Result<DocumentInfo, BackendError>) {
        push(&self.document_info, result);
    }
}

#[async_trait]
impl BackendGateway for FakeGateway {
    async fn health(&self) -> Result<(), BackendError> {
        self.record(GatewayCall::Health);
        pop(&self.health).unwrap_or(Ok(()))
    }

    async fn credential_status(&self) -> Result<CredentialStatus, BackendError> {
        self.record(GatewayCall::CredentialStatus);
        pop(&self.credential_status).unwrap_or_else(|| Ok(CredentialStatus::default()))
    }

    async fn store_credential(
        &self,
        request: &StoreCredentialRequest,
    ) -> Result<(), BackendError> {
        self.record(GatewayCall::StoreCredential {
            model: request.model.clone(),
        });
        pop(&self.store_credential).unwrap_or(Ok(()))
    }

    async fn upload(&self, file: &DocumentFile) -> Result<UploadReceipt, BackendError> {
        self.record(GatewayCall::Upload {
            file_name: file.name.clone(),
        });
        pop(&self.uploads)
            .unwrap_or_else(|| Err(BackendError::Transport("no scripted upload".to_string())))
    }

    async fn send_message(&self, request: &PersistMessageRequest) -> Result<(), BackendError> {
        let message = Message::new(request.role, request.content.clone());
        self.record(GatewayCall::SendMessage(
            message.clone(),
            request.session_id.clone(),
        ));
        let result = pop(&self.send_message).unwrap_or(Ok(()));
        if result.is_ok() {
            self.stored
                .lock()
                .expect("fake gateway lock")
                .entry(request.session_id.clone())
                .or_default()
                .push(message);
        }
        result
    }

    async fn get_messages(&self, session_id: &SessionId) -> Result<Vec<Message>, BackendError> {
        self.record(GatewayCall::GetMessages(session_id.clone()));
        pop(&self.messages).unwrap_or_else(|| {
            let stored = self.stored.lock().expect("fake gateway lock");
            Ok(stored.get(session_id).cloned().unwrap_or_default())
        })
    }

    async fn query(&self, request: &QueryRequest) -> Result<String, BackendError> {
        self.record(GatewayCall::Query {
            session_id: request.session_id.clone(),
            question: request.question.clone(),
        });
        pop(&self.answers).unwrap_or(Err(BackendError::EmptyAnswer))
    }

    async fn document_info(&self, session_id: &SessionId) -> Result<DocumentInfo, BackendError> {
        self.record(GatewayCall::DocumentInfo(session_id.clone()));
        pop(&self.document_info).unwrap_or_else(|| {
            Err(BackendError::Status {
                status: 404,
                detail: "Session not found".to_string(),
            })
        })
    }
}
