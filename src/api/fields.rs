//! Tolerant extraction of loosely named response fields.
//!
//! Each logical field has an ordered list of candidate keys. The first
//! candidate holding a usable value wins, so adding a new backend spelling
//! means adding one entry to a list rather than another fallback at the
//! call site.

use chrono::{DateTime, Utc};
use serde_json::Value;
use tracing::debug;

use crate::api::{DocumentInfo, UploadReceipt};
use crate::core::error::BackendError;
use crate::core::message::{Message, TranscriptRole};
use crate::core::session::SessionId;

#[derive(Debug, Clone, Copy)]
pub struct FieldCandidates(&'static [&'static str]);

pub const ANSWER_TEXT: FieldCandidates =
    FieldCandidates(&["text", "response", "reply", "content", "answer"]);
pub const SESSION_ID: FieldCandidates = FieldCandidates(&["session_id", "sessionId"]);
pub const CHUNK_COUNT: FieldCandidates =
    FieldCandidates(&["chunk_count", "chunkCount", "chunks"]);
pub const PAGE_COUNT: FieldCandidates = FieldCandidates(&["page_count", "pageCount", "pages"]);
pub const FROM_CACHE: FieldCandidates =
    FieldCandidates(&["from_cache", "fromCache", "was_processed"]);
pub const PROCESSING_TIME: FieldCandidates =
    FieldCandidates(&["processing_time", "processingTime"]);
pub const UPLOADED_AT: FieldCandidates = FieldCandidates(&["uploaded_at", "uploadedAt"]);
pub const FILE_NAME: FieldCandidates = FieldCandidates(&["filename", "file_name"]);
pub const FILE_SIZE: FieldCandidates = FieldCandidates(&["file_size", "fileSize"]);
pub const FILE_TYPE: FieldCandidates = FieldCandidates(&["file_type", "fileType"]);

impl FieldCandidates {
    pub fn names(&self) -> &'static [&'static str] {
        self.0
    }

    fn values<'v>(&self, value: &'v Value) -> impl Iterator<Item = &'v Value> {
        self.0.iter().filter_map(move |name| value.get(*name))
    }

    /// First string candidate that is non-empty after trimming.
    pub fn first_str(&self, value: &Value) -> Option<String> {
        self.values(value)
            .filter_map(Value::as_str)
            .find(|text| !text.trim().is_empty())
            .map(str::to_owned)
    }

    pub fn first_u64(&self, value: &Value) -> Option<u64> {
        self.values(value).find_map(|candidate| match candidate {
            Value::Number(number) => number.as_u64(),
            Value::String(text) => text.trim().parse().ok(),
            _ => None,
        })
    }

    pub fn first_f64(&self, value: &Value) -> Option<f64> {
        self.values(value).find_map(|candidate| match candidate {
            Value::Number(number) => number.as_f64(),
            Value::String(text) => text.trim().parse().ok(),
            _ => None,
        })
    }

    /// True when any candidate is `true`.
    pub fn any_true(&self, value: &Value) -> bool {
        self.values(value)
            .any(|candidate| candidate.as_bool().unwrap_or(false))
    }

    pub fn first_timestamp(&self, value: &Value) -> Option<DateTime<Utc>> {
        self.values(value)
            .filter_map(Value::as_str)
            .find_map(|text| DateTime::parse_from_rfc3339(text).ok())
            .map(|parsed| parsed.with_timezone(&Utc))
    }
}

pub fn extract_answer(value: &Value) -> Option<String> {
    ANSWER_TEXT.first_str(value)
}

pub fn parse_upload_receipt(value: &Value) -> Result<UploadReceipt, BackendError> {
    let session_id = SESSION_ID
        .first_str(value)
        .ok_or_else(|| BackendError::Decode("upload response has no session id".to_string()))?;

    Ok(UploadReceipt {
        session_id: SessionId::new(session_id),
        chunk_count: CHUNK_COUNT.first_u64(value),
        page_count: PAGE_COUNT.first_u64(value),
        from_cache: FROM_CACHE.any_true(value),
        processing_time_secs: PROCESSING_TIME.first_f64(value),
        uploaded_at: UPLOADED_AT.first_timestamp(value),
    })
}

pub fn parse_document_info(value: &Value) -> Result<DocumentInfo, BackendError> {
    if !value.is_object() {
        return Err(BackendError::Decode(
            "document info is not an object".to_string(),
        ));
    }

    Ok(DocumentInfo {
        file_name: FILE_NAME.first_str(value),
        file_size: FILE_SIZE.first_u64(value),
        file_type: FILE_TYPE.first_str(value),
        chunk_count: CHUNK_COUNT.first_u64(value),
        page_count: PAGE_COUNT.first_u64(value),
        from_cache: FROM_CACHE.any_true(value),
        processing_time_secs: PROCESSING_TIME.first_f64(value),
        uploaded_at: UPLOADED_AT.first_timestamp(value),
    })
}

/// Decode a persisted message list, skipping entries with roles the chat
/// log does not hold. Accepts a bare array or one wrapped in `messages`.
pub fn parse_messages(value: &Value) -> Result<Vec<Message>, BackendError> {
    let entries = value
        .as_array()
        .or_else(|| value.get("messages").and_then(Value::as_array))
        .ok_or_else(|| BackendError::Decode("message list is not an array".to_string()))?;

    let mut messages = Vec::with_capacity(entries.len());
    for entry in entries {
        let role = entry.get("role").and_then(Value::as_str).unwrap_or_default();
        let Ok(role) = TranscriptRole::try_from(role) else {
            debug!(role, "skipping persisted message with unsupported role");
            continue;
        };
        let content = entry
            .get("content")
            .and_then(Value::as_str)
            .unwrap_or_default();
        messages.push(Message::new(role, content));
    }
    Ok(messages)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn answer_takes_first_non_empty_candidate() {
        assert_eq!(
            extract_answer(&json!({"answer": "The conclusion is X."})).as_deref(),
            Some("The conclusion is X.")
        );
        assert_eq!(
            extract_answer(&json!({"text": "", "response": "  ", "reply": "r", "answer": "a"}))
                .as_deref(),
            Some("r")
        );
        assert_eq!(
            extract_answer(&json!({"content": 7, "answer": "a"})).as_deref(),
            Some("a")
        );
        assert_eq!(extract_answer(&json!({"status": "success"})), None);
    }

    #[test]
    fn candidate_order_matches_backend_drift_history() {
        assert_eq!(
            ANSWER_TEXT.names(),
            &["text", "response", "reply", "content", "answer"]
        );
    }

    #[test]
    fn upload_receipt_reads_duplicated_keys() {
        let body = json!({
            "status": "success",
            "session_id": "abc-123",
            "newlyProcessed": true,
            "wasProcessed": false,
            "was_processed": false,
            "from_cache": false,
            "page_count": 12,
            "chunk_count": 40,
            "chunks": 40,
            "processing_time": 1.25,
            "uploaded_at": "2024-05-01T10:00:00Z"
        });
        let receipt = parse_upload_receipt(&body).expect("receipt");
        assert_eq!(receipt.session_id.as_str(), "abc-123");
        assert_eq!(receipt.chunk_count, Some(40));
        assert_eq!(receipt.page_count, Some(12));
        assert!(!receipt.from_cache);
        assert_eq!(receipt.processing_time_secs, Some(1.25));
        assert!(receipt.uploaded_at.is_some());
    }

    #[test]
    fn upload_receipt_accepts_camel_case_and_cache_hits() {
        let body = json!({"sessionId": "s1", "chunkCount": "7", "fromCache": true});
        let receipt = parse_upload_receipt(&body).expect("receipt");
        assert_eq!(receipt.session_id.as_str(), "s1");
        assert_eq!(receipt.chunk_count, Some(7));
        assert!(receipt.from_cache);
        assert_eq!(receipt.page_count, None);
    }

    #[test]
    fn upload_receipt_requires_session() {
        assert!(matches!(
            parse_upload_receipt(&json!({"status": "success"})),
            Err(BackendError::Decode(_))
        ));
    }

    #[test]
    fn document_info_normalizes_names() {
        let info = parse_document_info(&json!({
            "filename": "report.pdf",
            "file_size": 2048,
            "file_type": "application/pdf",
            "chunks": 5,
            "was_processed": true
        }))
        .expect("info");
        assert_eq!(info.file_name.as_deref(), Some("report.pdf"));
        assert_eq!(info.file_size, Some(2048));
        assert_eq!(info.chunk_count, Some(5));
        assert!(info.from_cache);
    }

    #[test]
    fn messages_skip_unknown_roles() {
        let messages = parse_messages(&json!([
            {"role": "assistant", "content": "Hello!", "timestamp": null},
            {"role": "system", "content": "hidden"},
            {"role": "user", "content": "Q"}
        ]))
        .expect("messages");
        assert_eq!(
            messages,
            vec![Message::assistant("Hello!"), Message::user("Q")]
        );
        let wrapped = parse_messages(&json!({"messages": [{"role": "user", "content": "Q"}]}))
            .expect("wrapped messages");
        assert_eq!(wrapped, vec![Message::user("Q")]);
        assert!(parse_messages(&json!({"status": "ok"})).is_err());
    }
}
