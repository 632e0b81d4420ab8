//! The backend contract and its HTTP implementation.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use serde::Serialize;
use serde_json::Value;
use tracing::debug;

use crate::api::fields::{extract_answer, parse_document_info, parse_messages, parse_upload_receipt};
use crate::api::{
    CredentialStatus, DocumentInfo, PersistMessageRequest, QueryRequest, StoreCredentialRequest,
    UploadReceipt,
};
use crate::core::document::DocumentFile;
use crate::core::error::BackendError;
use crate::core::message::Message;
use crate::core::session::SessionId;
use crate::utils::url::{construct_api_url, construct_resource_url};

/// Stateless request/response operations against the retrieval backend.
#[async_trait]
pub trait BackendGateway: Send + Sync {
    async fn health(&self) -> Result<(), BackendError>;
    async fn credential_status(&self) -> Result<CredentialStatus, BackendError>;
    async fn store_credential(&self, request: &StoreCredentialRequest)
        -> Result<(), BackendError>;
    async fn upload(&self, file: &DocumentFile) -> Result<UploadReceipt, BackendError>;
    async fn send_message(&self, request: &PersistMessageRequest) -> Result<(), BackendError>;
    async fn get_messages(&self, session_id: &SessionId) -> Result<Vec<Message>, BackendError>;
    /// Returns the answer text. An answer with no usable text is an error.
    async fn query(&self, request: &QueryRequest) -> Result<String, BackendError>;
    async fn document_info(&self, session_id: &SessionId) -> Result<DocumentInfo, BackendError>;
}

#[derive(Clone)]
pub struct HttpGateway {
    client: reqwest::Client,
    base_url: String,
}

impl HttpGateway {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, BackendError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|err| BackendError::Transport(err.to_string()))?;
        Ok(Self {
            client,
            base_url: base_url.into(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, endpoint: &str) -> String {
        construct_api_url(&self.base_url, endpoint)
    }

    fn session_url(&self, endpoint: &str, session_id: &SessionId) -> String {
        construct_resource_url(&self.base_url, endpoint, session_id.as_str())
    }

    async fn get_json(&self, url: String) -> Result<Value, BackendError> {
        debug!(%url, "GET");
        let response = self.client.get(url).send().await.map_err(transport)?;
        read_json(response).await
    }

    async fn post_json<T: Serialize + Sync>(
        &self,
        endpoint: &str,
        body: &T,
    ) -> Result<Value, BackendError> {
        let url = self.url(endpoint);
        debug!(%url, "POST");
        let response = self
            .client
            .post(url)
            .header("Content-Type", "application/json")
            .json(body)
            .send()
            .await
            .map_err(transport)?;
        read_json(response).await
    }
}

#[async_trait]
impl BackendGateway for HttpGateway {
    async fn health(&self) -> Result<(), BackendError> {
        self.get_json(self.url("health")).await.map(|_| ())
    }

    async fn credential_status(&self) -> Result<CredentialStatus, BackendError> {
        let value = self.get_json(self.url("api-key-status")).await?;
        serde_json::from_value(value).map_err(|err| BackendError::Decode(err.to_string()))
    }

    async fn store_credential(
        &self,
        request: &StoreCredentialRequest,
    ) -> Result<(), BackendError> {
        let value = self.post_json("api-key", request).await?;
        check_success_status(&value)
    }

    async fn upload(&self, file: &DocumentFile) -> Result<UploadReceipt, BackendError> {
        let bytes = tokio::fs::read(&file.path)
            .await
            .map_err(|err| BackendError::Transport(format!("reading {}: {err}", file.name)))?;

        let mut part = Part::bytes(bytes).file_name(file.name.clone());
        if let Some(mime) = &file.mime {
            part = part
                .mime_str(mime)
                .map_err(|err| BackendError::Transport(err.to_string()))?;
        }
        let form = Form::new().part("file", part);

        let url = self.url("upload");
        debug!(%url, file = %file.name, size = file.size, "POST multipart");
        let response = self
            .client
            .post(url)
            .multipart(form)
            .send()
            .await
            .map_err(transport)?;
        let value = read_json(response).await?;
        parse_upload_receipt(&value)
    }

    async fn send_message(&self, request: &PersistMessageRequest) -> Result<(), BackendError> {
        self.post_json("messages", request).await.map(|_| ())
    }

    async fn get_messages(&self, session_id: &SessionId) -> Result<Vec<Message>, BackendError> {
        let value = self.get_json(self.session_url("messages", session_id)).await?;
        parse_messages(&value)
    }

    async fn query(&self, request: &QueryRequest) -> Result<String, BackendError> {
        let value = self.post_json("query", request).await?;
        extract_answer(&value).ok_or(BackendError::EmptyAnswer)
    }

    async fn document_info(&self, session_id: &SessionId) -> Result<DocumentInfo, BackendError> {
        let value = self.get_json(self.session_url("document", session_id)).await?;
        parse_document_info(&value)
    }
}

fn transport(err: reqwest::Error) -> BackendError {
    BackendError::Transport(err.to_string())
}

async fn read_json(response: reqwest::Response) -> Result<Value, BackendError> {
    let status = response.status();
    let body = response.text().await.map_err(transport)?;

    if !status.is_success() {
        return Err(BackendError::Status {
            status: status.as_u16(),
            detail: error_detail(&body, status.canonical_reason()),
        });
    }

    if body.trim().is_empty() {
        return Ok(Value::Null);
    }
    serde_json::from_str(&body).map_err(|err| BackendError::Decode(err.to_string()))
}

/// `{"status": "success"}` is the only acknowledgement the credential store gives.
fn check_success_status(value: &Value) -> Result<(), BackendError> {
    match value.get("status").and_then(Value::as_str) {
        Some("success") => Ok(()),
        Some(other) => Err(BackendError::Rejected(
            extract_error_summary(value).unwrap_or_else(|| format!("status {other}")),
        )),
        None => Err(BackendError::Rejected(
            extract_error_summary(value).unwrap_or_else(|| "no status in response".to_string()),
        )),
    }
}

fn extract_error_summary(value: &Value) -> Option<String> {
    let summary = value
        .get("detail")
        .and_then(|v| v.as_str().map(str::to_owned))
        .or_else(|| {
            value
                .pointer("/error/message")
                .and_then(|v| v.as_str())
                .map(str::to_owned)
        })
        .or_else(|| value.get("error").and_then(|v| v.as_str().map(str::to_owned)))
        .or_else(|| {
            value
                .get("message")
                .and_then(|v| v.as_str().map(str::to_owned))
        });

    summary
        .map(|text| text.split_whitespace().collect::<Vec<_>>().join(" "))
        .filter(|text| !text.is_empty())
}

fn error_detail(body: &str, reason: Option<&str>) -> String {
    let trimmed = body.trim();
    if let Ok(value) = serde_json::from_str::<Value>(trimmed) {
        if let Some(summary) = extract_error_summary(&value) {
            return summary;
        }
    }
    if trimmed.is_empty() {
        reason.unwrap_or("<empty>").to_string()
    } else {
        trimmed.to_string()
    }
}
