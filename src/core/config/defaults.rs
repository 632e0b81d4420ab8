use std::time::Duration;

use crate::core::config::data::{
    default_models, Config, ModelOption, DEFAULT_BACKEND_URL, DEFAULT_QUERY_RESULTS,
    DEFAULT_REQUEST_TIMEOUT_SECS, DEFAULT_REVEAL_DELAY_MS,
};

pub const BACKEND_URL_ENV: &str = "RAGLINE_BACKEND_URL";

impl Config {
    /// Backend URL with the environment override applied.
    pub fn backend_url(&self) -> String {
        self.backend_url_with_env(std::env::var(BACKEND_URL_ENV).ok())
    }

    pub(crate) fn backend_url_with_env(&self, env_value: Option<String>) -> String {
        env_value
            .filter(|value| !value.trim().is_empty())
            .or_else(|| self.backend_url.clone())
            .unwrap_or_else(|| DEFAULT_BACKEND_URL.to_string())
    }

    pub fn reveal_delay(&self) -> Duration {
        Duration::from_millis(self.reveal_delay_ms.unwrap_or(DEFAULT_REVEAL_DELAY_MS))
    }

    pub fn query_results(&self) -> u32 {
        self.query_results.unwrap_or(DEFAULT_QUERY_RESULTS)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(
            self.request_timeout_secs
                .unwrap_or(DEFAULT_REQUEST_TIMEOUT_SECS),
        )
    }

    pub fn model_options(&self) -> Vec<ModelOption> {
        if self.models.is_empty() {
            default_models()
        } else {
            self.models.clone()
        }
    }

    pub fn display_name_for(&self, model_id: &str) -> String {
        self.model_options()
            .into_iter()
            .find(|option| option.id == model_id)
            .map(|option| option.display_name)
            .unwrap_or_else(|| model_id.to_string())
    }

    /// Apply a `set <key> <value>` from the command line.
    pub fn set_value(&mut self, key: &str, value: &str) -> Result<(), String> {
        let value = value.trim();
        if value.is_empty() {
            return Err(format!("A value is required for {key}"));
        }
        match key {
            "backend-url" => self.backend_url = Some(value.to_string()),
            "default-model" => self.default_model = Some(value.to_string()),
            "reveal-delay" => {
                let ms = value
                    .parse::<u64>()
                    .map_err(|_| format!("reveal-delay must be milliseconds, got '{value}'"))?;
                self.reveal_delay_ms = Some(ms);
            }
            "max-upload-mb" => {
                let mb = value
                    .parse::<u64>()
                    .map_err(|_| format!("max-upload-mb must be a whole number, got '{value}'"))?;
                self.upload.max_bytes = mb
                    .checked_mul(1024 * 1024)
                    .ok_or_else(|| format!("max-upload-mb is too large, got '{value}'"))?;
            }
            _ => return Err(format!("Unknown config key: {key}")),
        }
        Ok(())
    }

    pub fn unset_value(&mut self, key: &str) -> Result<(), String> {
        match key {
            "backend-url" => self.backend_url = None,
            "default-model" => self.default_model = None,
            "reveal-delay" => self.reveal_delay_ms = None,
            "max-upload-mb" => {
                self.upload.max_bytes = crate::core::config::data::DEFAULT_MAX_UPLOAD_BYTES
            }
            _ => return Err(format!("Unknown config key: {key}")),
        }
        Ok(())
    }
}
