//! Request and response payloads for the retrieval backend.
//!
//! Requests are strongly typed. Responses are decoded from loose JSON
//! through [`fields`] because the backend reports the same value under
//! several names depending on the route and version.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::core::message::TranscriptRole;
use crate::core::session::SessionId;

pub mod fields;
pub mod gateway;

pub use gateway::{BackendGateway, HttpGateway};

#[derive(Serialize, Clone, PartialEq, Eq)]
pub struct StoreCredentialRequest {
    pub api_key: String,
    pub model: String,
}

// Never print the key.
impl fmt::Debug for StoreCredentialRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StoreCredentialRequest")
            .field("api_key", &"<redacted>")
            .field("model", &self.model)
            .finish()
    }
}

#[derive(Deserialize, Debug, Clone, Default, PartialEq, Eq)]
pub struct CredentialStatus {
    #[serde(default, alias = "hasKey")]
    pub has_api_key: bool,
    #[serde(default)]
    pub model: Option<String>,
}

#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
pub struct PersistMessageRequest {
    pub session_id: SessionId,
    pub role: TranscriptRole,
    pub content: String,
}

#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
pub struct QueryRequest {
    pub session_id: SessionId,
    pub question: String,
    pub n_results: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
}

/// What the backend reports after processing an upload.
#[derive(Debug, Clone, PartialEq)]
pub struct UploadReceipt {
    pub session_id: SessionId,
    pub chunk_count: Option<u64>,
    pub page_count: Option<u64>,
    pub from_cache: bool,
    pub processing_time_secs: Option<f64>,
    pub uploaded_at: Option<DateTime<Utc>>,
}

/// Stored metadata for a session's document, used to rehydrate after restart.
#[derive(Debug, Clone, PartialEq)]
pub struct DocumentInfo {
    pub file_name: Option<String>,
    pub file_size: Option<u64>,
    pub file_type: Option<String>,
    pub chunk_count: Option<u64>,
    pub page_count: Option<u64>,
    pub from_cache: bool,
    pub processing_time_secs: Option<f64>,
    pub uploaded_at: Option<DateTime<Utc>>,
}
