//! Error taxonomy for the client core.
//!
//! Validation and precondition errors are resolved locally and shown as
//! inline guidance. Backend errors leave prior state intact and surface as a
//! dismissible banner. Stale responses are swallowed by the state machines
//! and only ever reach the debug log.

use std::error::Error;
use std::fmt;

use crate::core::document::format_file_size;
use crate::core::session::SessionId;

/// Bad input rejected before any network call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    EmptyCredential,
    NoModelSelected,
    EmptyModel,
    UnsupportedFileType { file_name: String },
    FileTooLarge { file_name: String, size: u64, max: u64 },
    UnreadableFile { path: String, reason: String },
    /// The backend refused the upload with a 4xx.
    Rejected { file_name: String, detail: String },
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationError::EmptyCredential => write!(f, "API key cannot be empty"),
            ValidationError::NoModelSelected => write!(f, "Please select a model first"),
            ValidationError::EmptyModel => write!(f, "Model id cannot be empty"),
            ValidationError::UnsupportedFileType { file_name } => {
                write!(f, "Unsupported file type for {file_name}")
            }
            ValidationError::FileTooLarge {
                file_name,
                size,
                max,
            } => write!(
                f,
                "{file_name} is {} which exceeds the {} upload limit",
                format_file_size(*size),
                format_file_size(*max)
            ),
            ValidationError::UnreadableFile { path, reason } => {
                write!(f, "Cannot read {path}: {reason}")
            }
            ValidationError::Rejected { file_name, detail } => {
                write!(f, "{file_name} was rejected: {detail}")
            }
        }
    }
}

impl Error for ValidationError {}

/// An action attempted before the state it needs exists.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PreconditionError {
    /// No document is loaded, so there is no session to talk to.
    NoDocument,
    /// No provider credential has been stored yet.
    NoCredential,
    /// The credential is stored and the model choice is locked.
    CredentialLocked,
    /// A question is still being sent or revealed.
    RequestInFlight,
    /// An upload is still in flight.
    UploadInFlight,
}

impl PreconditionError {
    /// Where the user should go to fix the problem.
    pub fn remediation(self) -> &'static str {
        match self {
            PreconditionError::NoDocument => "Upload a PDF or TXT document with /upload <path>.",
            PreconditionError::NoCredential => "Add an API key with /key <api-key>.",
            PreconditionError::CredentialLocked => {
                "The model is fixed once an API key is stored."
            }
            PreconditionError::RequestInFlight => "Wait for the current answer to finish.",
            PreconditionError::UploadInFlight => "Wait for the current upload to finish.",
        }
    }
}

impl fmt::Display for PreconditionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            PreconditionError::NoDocument => "No document loaded",
            PreconditionError::NoCredential => "API key is required",
            PreconditionError::CredentialLocked => "API key already stored",
            PreconditionError::RequestInFlight => "A question is already in progress",
            PreconditionError::UploadInFlight => "An upload is already in progress",
        };
        write!(f, "{text}. {}", self.remediation())
    }
}

impl Error for PreconditionError {}

/// Non-2xx response, transport failure, or undecodable body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BackendError {
    Transport(String),
    Status { status: u16, detail: String },
    Decode(String),
    /// The backend answered 2xx but reported that it did not do the work.
    Rejected(String),
    /// The backend answered successfully but without any answer text.
    EmptyAnswer,
}

impl BackendError {
    pub fn is_client_error(&self) -> bool {
        matches!(self, BackendError::Status { status, .. } if (400..500).contains(status))
    }
}

impl fmt::Display for BackendError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BackendError::Transport(reason) => write!(f, "Backend unreachable: {reason}"),
            BackendError::Status { status, detail } => {
                write!(f, "Backend returned {status}: {detail}")
            }
            BackendError::Decode(reason) => write!(f, "Unexpected backend response: {reason}"),
            BackendError::Rejected(reason) => write!(f, "Backend rejected the request: {reason}"),
            BackendError::EmptyAnswer => write!(f, "Backend returned no answer text"),
        }
    }
}

impl Error for BackendError {}

/// A response that arrived for a session or request that is no longer current.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StaleResponseError {
    pub expected: Option<SessionId>,
    pub received: SessionId,
}

impl fmt::Display for StaleResponseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.expected {
            Some(expected) => write!(
                f,
                "discarded response for session {} (current session {expected})",
                self.received
            ),
            None => write!(
                f,
                "discarded response for session {} (no active session)",
                self.received
            ),
        }
    }
}

impl Error for StaleResponseError {}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClientError {
    Validation(ValidationError),
    Precondition(PreconditionError),
    Backend(BackendError),
    /// A failed retrieval query. The optimistic user message stays in place.
    Query(BackendError),
    Stale(StaleResponseError),
}

impl ClientError {
    /// Inline guidance rather than a banner.
    pub fn is_guidance(&self) -> bool {
        matches!(
            self,
            ClientError::Validation(_) | ClientError::Precondition(_)
        )
    }
}

impl fmt::Display for ClientError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ClientError::Validation(err) => fmt::Display::fmt(err, f),
            ClientError::Precondition(err) => fmt::Display::fmt(err, f),
            ClientError::Backend(err) => fmt::Display::fmt(err, f),
            ClientError::Query(err) => write!(f, "Query failed: {err}"),
            ClientError::Stale(err) => fmt::Display::fmt(err, f),
        }
    }
}

impl Error for ClientError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            ClientError::Validation(err) => Some(err),
            ClientError::Precondition(err) => Some(err),
            ClientError::Backend(err) | ClientError::Query(err) => Some(err),
            ClientError::Stale(err) => Some(err),
        }
    }
}

impl From<ValidationError> for ClientError {
    fn from(err: ValidationError) -> Self {
        ClientError::Validation(err)
    }
}

impl From<PreconditionError> for ClientError {
    fn from(err: PreconditionError) -> Self {
        ClientError::Precondition(err)
    }
}

impl From<BackendError> for ClientError {
    fn from(err: BackendError) -> Self {
        ClientError::Backend(err)
    }
}

impl From<StaleResponseError> for ClientError {
    fn from(err: StaleResponseError) -> Self {
        ClientError::Stale(err)
    }
}
