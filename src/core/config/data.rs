use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const DEFAULT_BACKEND_URL: &str = "http://localhost:8000";
pub const DEFAULT_REVEAL_DELAY_MS: u64 = 40;
pub const DEFAULT_QUERY_RESULTS: u32 = 3;
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 120;
pub const DEFAULT_MAX_UPLOAD_BYTES: u64 = 25 * 1024 * 1024;

/// A file class the upload surface accepts.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct AcceptedType {
    pub extension: String,
    pub mime: String,
}

impl AcceptedType {
    pub fn new(extension: &str, mime: &str) -> Self {
        Self {
            extension: extension.to_string(),
            mime: mime.to_string(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct UploadConfig {
    #[serde(default = "default_max_upload_bytes")]
    pub max_bytes: u64,
    #[serde(default = "default_accepted_types")]
    pub accepted: Vec<AcceptedType>,
}

impl Default for UploadConfig {
    fn default() -> Self {
        Self {
            max_bytes: default_max_upload_bytes(),
            accepted: default_accepted_types(),
        }
    }
}

fn default_max_upload_bytes() -> u64 {
    DEFAULT_MAX_UPLOAD_BYTES
}

fn default_accepted_types() -> Vec<AcceptedType> {
    vec![
        AcceptedType::new("pdf", "application/pdf"),
        AcceptedType::new("txt", "text/plain"),
    ]
}

/// A model the backend can be configured with.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct ModelOption {
    pub id: String,
    pub display_name: String,
}

impl ModelOption {
    pub fn new(id: &str, display_name: &str) -> Self {
        Self {
            id: id.to_string(),
            display_name: display_name.to_string(),
        }
    }
}

pub(crate) fn default_models() -> Vec<ModelOption> {
    vec![
        ModelOption::new("llama-3.1-8b-instant", "Llama 3.1 8B Instant"),
        ModelOption::new("llama-3.3-70b-versatile", "Llama 3.3 70B Versatile"),
    ]
}

#[derive(Debug, Serialize, Deserialize, Default, Clone, PartialEq)]
pub struct Config {
    /// Base URL of the retrieval backend
    pub backend_url: Option<String>,
    /// Delay between revealed words of an answer, in milliseconds
    pub reveal_delay_ms: Option<u64>,
    /// Number of retrieved chunks requested per query
    pub query_results: Option<u32>,
    /// Per-request timeout for backend calls, in seconds
    pub request_timeout_secs: Option<u64>,
    /// Model preselected at startup when no credential is stored yet
    pub default_model: Option<String>,
    #[serde(default)]
    pub upload: UploadConfig,
    /// Models offered for selection. Empty means the built-in list.
    #[serde(default)]
    pub models: Vec<ModelOption>,
}

/// Get a user-friendly display string for a path
/// Converts absolute paths to use ~ notation on Unix-like systems when possible
pub fn path_display<P: AsRef<Path>>(path: P) -> String {
    let path = path.as_ref();

    #[cfg(unix)]
    {
        if let Some(home) = std::env::var_os("HOME") {
            let home_path = PathBuf::from(home);
            if let Ok(relative) = path.strip_prefix(&home_path) {
                return format!("~/{}", relative.display());
            }
        }
    }

    path.display().to_string()
}
