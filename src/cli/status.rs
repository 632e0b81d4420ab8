//! One-shot backend check for `ragline status`.

use std::error::Error;

use crate::api::{BackendGateway, HttpGateway};
use crate::core::config::Config;

/// Report reachability and stored-key state. An unreachable backend is part
/// of the report, not an error.
pub async fn status_report(gateway: &dyn BackendGateway, backend_url: &str) -> String {
    let mut lines = vec![format!("Backend: {backend_url}")];

    match gateway.health().await {
        Ok(()) => lines.push("Health:  ok".to_string()),
        Err(err) => {
            lines.push(format!("Health:  {err}"));
            return lines.join("\n");
        }
    }

    match gateway.credential_status().await {
        Ok(status) if status.has_api_key => {
            let model = status.model.as_deref().unwrap_or("unknown model");
            lines.push(format!("API key: stored ({model})"));
        }
        Ok(_) => lines.push("API key: not stored".to_string()),
        Err(err) => lines.push(format!("API key: {err}")),
    }
    lines.join("\n")
}

pub async fn print_status(config: &Config) -> Result<(), Box<dyn Error>> {
    let backend_url = config.backend_url();
    let gateway = HttpGateway::new(backend_url.clone(), config.request_timeout())?;
    println!("{}", status_report(&gateway, &backend_url).await);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::CredentialStatus;
    use crate::core::error::BackendError;
    use crate::utils::test_utils::{FakeGateway, GatewayCall};

    #[tokio::test]
    async fn healthy_backend_with_stored_key() {
        let gateway = FakeGateway::new();
        gateway.script_credential_status(Ok(CredentialStatus {
            has_api_key: true,
            model: Some("llama-3.3-70b-versatile".to_string()),
        }));

        let report = status_report(&gateway, "http://localhost:8000").await;

        assert_eq!(
            report,
            "Backend: http://localhost:8000\nHealth:  ok\nAPI key: stored (llama-3.3-70b-versatile)"
        );
    }

    #[tokio::test]
    async fn unreachable_backend_skips_credential_check() {
        let gateway = FakeGateway::new();
        gateway.script_health(Err(BackendError::Transport("connection refused".to_string())));

        let report = status_report(&gateway, "http://localhost:8000").await;

        assert!(report.contains("Health:  Backend unreachable: connection refused"));
        assert!(!report.contains("API key"));
        assert_eq!(gateway.calls(), vec![GatewayCall::Health]);
    }

    #[tokio::test]
    async fn missing_key_is_reported() {
        let gateway = FakeGateway::new();
        let report = status_report(&gateway, "http://b").await;
        assert!(report.ends_with("API key: not stored"));
    }
}
