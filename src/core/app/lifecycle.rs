//! Session, document and credential lifecycle.
//!
//! The manager is the single owner of which document is loaded, which
//! backend session it belongs to, and whether a provider credential is
//! stored. Like the chat pipeline it performs no I/O: `begin_*` operations
//! validate and return the request to run, `complete_*` operations fold the
//! response back in.

use chrono::Utc;
use tracing::debug;

use crate::api::{CredentialStatus, DocumentInfo, StoreCredentialRequest, UploadReceipt};
use crate::core::config::data::UploadConfig;
use crate::core::document::{validate_upload, Document, DocumentFile, DocumentMetadata};
use crate::core::error::{
    BackendError, ClientError, PreconditionError, StaleResponseError, ValidationError,
};
use crate::core::session::SessionId;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CredentialState {
    Absent,
    ModelSelected { model: String },
    /// Terminal for the life of the process. The key itself is never kept.
    Stored { model: Option<String> },
}

impl CredentialState {
    pub fn is_stored(&self) -> bool {
        matches!(self, CredentialState::Stored { .. })
    }

    pub fn model(&self) -> Option<&str> {
        match self {
            CredentialState::Absent => None,
            CredentialState::ModelSelected { model } => Some(model),
            CredentialState::Stored { model } => model.as_deref(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UploadState {
    Idle,
    Uploading { upload_id: u64, file_name: String },
    Error(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct ActiveSession {
    pub id: SessionId,
    pub document: Document,
}

/// Derived from the upload state and whether a document is present.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProcessingStatus {
    NoDocument,
    Uploading { file_name: String },
    Failed(String),
    Ready,
}

/// An accepted upload, to be sent and then passed back to
/// [`LifecycleManager::complete_upload`].
#[derive(Debug, Clone)]
pub struct UploadTicket {
    pub upload_id: u64,
    pub epoch: u64,
    pub file: DocumentFile,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UploadOutcome {
    Processed {
        session_id: SessionId,
        session_changed: bool,
        newly_processed: bool,
    },
    /// The upload finished after the document was removed.
    Discarded,
}

#[derive(Debug)]
pub struct LifecycleManager {
    upload_config: UploadConfig,
    credential: CredentialState,
    credential_in_flight: Option<String>,
    upload: UploadState,
    session: Option<ActiveSession>,
    restoring: Option<SessionId>,
    reset_epoch: u64,
    backend_connected: Option<bool>,
    next_upload_id: u64,
}

impl LifecycleManager {
    pub fn new(upload_config: UploadConfig) -> Self {
        Self {
            upload_config,
            credential: CredentialState::Absent,
            credential_in_flight: None,
            upload: UploadState::Idle,
            session: None,
            restoring: None,
            reset_epoch: 0,
            backend_connected: None,
            next_upload_id: 0,
        }
    }

    pub fn credential(&self) -> &CredentialState {
        &self.credential
    }

    pub fn credential_stored(&self) -> bool {
        self.credential.is_stored()
    }

    pub fn credential_in_flight(&self) -> bool {
        self.credential_in_flight.is_some()
    }

    pub fn selected_model(&self) -> Option<&str> {
        self.credential.model()
    }

    pub fn upload_state(&self) -> &UploadState {
        &self.upload
    }

    pub fn is_uploading(&self) -> bool {
        matches!(self.upload, UploadState::Uploading { .. })
    }

    pub fn session(&self) -> Option<&ActiveSession> {
        self.session.as_ref()
    }

    pub fn session_id(&self) -> Option<&SessionId> {
        self.session.as_ref().map(|session| &session.id)
    }

    pub fn document(&self) -> Option<&Document> {
        self.session.as_ref().map(|session| &session.document)
    }

    pub fn restoring(&self) -> Option<&SessionId> {
        self.restoring.as_ref()
    }

    pub fn reset_epoch(&self) -> u64 {
        self.reset_epoch
    }

    pub fn backend_connected(&self) -> Option<bool> {
        self.backend_connected
    }

    pub fn processing_status(&self) -> ProcessingStatus {
        match &self.upload {
            UploadState::Uploading { file_name, .. } => ProcessingStatus::Uploading {
                file_name: file_name.clone(),
            },
            UploadState::Error(message) => ProcessingStatus::Failed(message.clone()),
            UploadState::Idle if self.session.is_some() => ProcessingStatus::Ready,
            UploadState::Idle => ProcessingStatus::NoDocument,
        }
    }

    /// Choose the model the credential will be stored for.
    ///
    /// Returns `Ok(false)` without changing anything once a credential is
    /// stored, since the model is then fixed.
    pub fn select_model(&mut self, model_id: &str) -> Result<bool, ValidationError> {
        let model_id = model_id.trim();
        if model_id.is_empty() {
            return Err(ValidationError::EmptyModel);
        }
        if self.credential.is_stored() {
            return Ok(false);
        }
        self.credential = CredentialState::ModelSelected {
            model: model_id.to_string(),
        };
        Ok(true)
    }

    pub fn begin_credential(&mut self, api_key: &str) -> Result<StoreCredentialRequest, ClientError> {
        if self.credential.is_stored() {
            return Err(PreconditionError::CredentialLocked.into());
        }
        if self.credential_in_flight.is_some() {
            return Err(PreconditionError::RequestInFlight.into());
        }
        let api_key = api_key.trim();
        if api_key.is_empty() {
            return Err(ValidationError::EmptyCredential.into());
        }
        let CredentialState::ModelSelected { model } = &self.credential else {
            return Err(ValidationError::NoModelSelected.into());
        };

        self.credential_in_flight = Some(model.clone());
        Ok(StoreCredentialRequest {
            api_key: api_key.to_string(),
            model: model.clone(),
        })
    }

    /// On success the credential is stored for the model it was submitted
    /// with. On failure nothing changes and the caller surfaces the reason.
    pub fn complete_credential(
        &mut self,
        model: String,
        result: Result<(), BackendError>,
    ) -> Result<(), BackendError> {
        self.credential_in_flight = None;
        result?;
        if !self.credential.is_stored() {
            self.credential = CredentialState::Stored { model: Some(model) };
        }
        Ok(())
    }

    /// Validate a file against the upload policy and mark the upload as in
    /// flight. Nothing changes when validation fails.
    pub fn begin_upload(&mut self, mut file: DocumentFile) -> Result<UploadTicket, ValidationError> {
        let accepted = validate_upload(&file, &self.upload_config)?;
        if file.mime.is_none() {
            file.mime = Some(accepted.mime.clone());
        }

        self.next_upload_id += 1;
        self.upload = UploadState::Uploading {
            upload_id: self.next_upload_id,
            file_name: file.name.clone(),
        };
        Ok(UploadTicket {
            upload_id: self.next_upload_id,
            epoch: self.reset_epoch,
            file,
        })
    }

    /// Apply an upload response. Success replaces document and session in
    /// one step; failure leaves the previous document and session alone.
    pub fn complete_upload(
        &mut self,
        ticket: UploadTicket,
        result: Result<UploadReceipt, BackendError>,
    ) -> Result<UploadOutcome, ClientError> {
        let is_current = matches!(
            self.upload,
            UploadState::Uploading { upload_id, .. } if upload_id == ticket.upload_id
        );
        if ticket.epoch != self.reset_epoch {
            debug!(upload_id = ticket.upload_id, "discarding upload finished after reset");
            if is_current {
                self.upload = UploadState::Idle;
            }
            return Ok(UploadOutcome::Discarded);
        }

        match result {
            Ok(receipt) => {
                let document = document_from_upload(&ticket.file, &receipt);
                let newly_processed = document.newly_processed();
                let session_changed = self.session_id() != Some(&receipt.session_id);
                self.session = Some(ActiveSession {
                    id: receipt.session_id.clone(),
                    document,
                });
                self.restoring = None;
                if is_current {
                    self.upload = UploadState::Idle;
                }
                Ok(UploadOutcome::Processed {
                    session_id: receipt.session_id,
                    session_changed,
                    newly_processed,
                })
            }
            Err(err) => {
                let err = match err {
                    BackendError::Status { status, detail } if (400..500).contains(&status) => {
                        ClientError::Validation(ValidationError::Rejected {
                            file_name: ticket.file.name.clone(),
                            detail,
                        })
                    }
                    err => ClientError::Backend(err),
                };
                if is_current {
                    self.upload = UploadState::Error(err.to_string());
                }
                Err(err)
            }
        }
    }

    /// Forget the document and its session. The credential is untouched and
    /// no backend call is made.
    pub fn remove_document(&mut self) -> Option<SessionId> {
        let previous = self.session.take().map(|session| session.id);
        self.restoring = None;
        if matches!(self.upload, UploadState::Error(_)) {
            self.upload = UploadState::Idle;
        }
        self.reset_epoch += 1;
        previous
    }

    pub fn dismiss_error(&mut self) -> bool {
        if matches!(self.upload, UploadState::Error(_)) {
            self.upload = UploadState::Idle;
            return true;
        }
        false
    }

    pub fn apply_health(&mut self, result: Result<(), BackendError>) -> bool {
        if let Err(err) = &result {
            debug!(error = %err, "backend health check failed");
        }
        let connected = result.is_ok();
        self.backend_connected = Some(connected);
        connected
    }

    /// Restore a credential the backend already holds, along with its model.
    /// A failed status check counts as "not configured".
    pub fn apply_credential_status(&mut self, result: Result<CredentialStatus, BackendError>) {
        let status = match result {
            Ok(status) => status,
            Err(err) => {
                debug!(error = %err, "credential status unavailable");
                return;
            }
        };

        if status.has_api_key {
            let model = status
                .model
                .or_else(|| self.credential.model().map(str::to_owned));
            self.credential = CredentialState::Stored { model };
        } else if let Some(model) = status.model.filter(|model| !model.trim().is_empty()) {
            if !self.credential.is_stored() {
                self.credential = CredentialState::ModelSelected { model };
            }
        }
    }

    /// Resume a session from a previous run. It becomes active once its
    /// document info has been fetched.
    pub fn begin_restore(&mut self, session_id: SessionId) {
        self.restoring = Some(session_id);
    }

    pub fn complete_restore(
        &mut self,
        session_id: &SessionId,
        result: Result<DocumentInfo, BackendError>,
    ) -> Result<(), ClientError> {
        if self.restoring.as_ref() != Some(session_id) {
            return Err(ClientError::Stale(StaleResponseError {
                expected: self.restoring.clone(),
                received: session_id.clone(),
            }));
        }
        self.restoring = None;

        let info = result?;
        self.session = Some(ActiveSession {
            id: session_id.clone(),
            document: document_from_info(info),
        });
        Ok(())
    }
}

fn document_from_upload(file: &DocumentFile, receipt: &UploadReceipt) -> Document {
    Document {
        file_name: file.name.clone(),
        size: file.size,
        mime: file.mime.clone(),
        metadata: DocumentMetadata {
            chunk_count: receipt.chunk_count,
            page_count: receipt.page_count,
            from_cache: receipt.from_cache,
            processing_time_secs: receipt.processing_time_secs,
            uploaded_at: receipt.uploaded_at.unwrap_or_else(Utc::now),
        },
    }
}

fn document_from_info(info: DocumentInfo) -> Document {
    Document {
        file_name: info.file_name.unwrap_or_else(|| "Unknown".to_string()),
        size: info.file_size.unwrap_or(0),
        mime: info.file_type,
        metadata: DocumentMetadata {
            chunk_count: info.chunk_count,
            page_count: info.page_count,
            from_cache: info.from_cache,
            processing_time_secs: info.processing_time_secs,
            uploaded_at: info.uploaded_at.unwrap_or_else(Utc::now),
        },
    }
}
