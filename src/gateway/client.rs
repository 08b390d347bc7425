use std::time::{Duration, Instant};

use serde_json::Value;
use ureq::Agent;

use crate::config::BackendSettings;
use crate::error::{DashboardError, Result};

/// Invokes one named procedure with a JSON parameter record.
///
/// Implementations are shared by reference across the batch workers.
pub trait RpcTransport: Sync {
    fn call(&self, endpoint: &str, params: &Value) -> Result<Value>;
}

/// PostgREST-style RPC client: `POST {url}{rpc_path}/{endpoint}`
pub struct PostgrestClient {
    agent: Agent,
    base_url: String,
    api_key: Option<String>,
}

impl PostgrestClient {
    pub fn new(settings: &BackendSettings) -> Result<Self> {
        let url = settings.url.trim();
        if url.is_empty() {
            return Err(DashboardError::MissingBackendUrl);
        }

        let agent: Agent = Agent::config_builder()
            .timeout_global(settings.timeout_secs.map(Duration::from_secs))
            .http_status_as_error(false)
            .build()
            .into();

        let base_url = format!(
            "{}/{}",
            url.trim_end_matches('/'),
            settings.rpc_path.trim_matches('/')
        );

        Ok(Self {
            agent,
            base_url,
            api_key: settings.api_key.clone().filter(|k| !k.is_empty()),
        })
    }

    pub fn endpoint_url(&self, endpoint: &str) -> String {
        format!("{}/{}", self.base_url, endpoint)
    }
}

impl RpcTransport for PostgrestClient {
    fn call(&self, endpoint: &str, params: &Value) -> Result<Value> {
        let started = Instant::now();
        let transport_err = |source| DashboardError::Transport {
            endpoint: endpoint.to_string(),
            source,
        };

        let mut request = self
            .agent
            .post(self.endpoint_url(endpoint))
            .header("Accept", "application/json")
            .header("Content-Type", "application/json");
        if let Some(key) = &self.api_key {
            request = request
                .header("apikey", key)
                .header("Authorization", format!("Bearer {key}"));
        }

        let body = params.to_string();
        let mut response = request
            .send(body.as_bytes())
            .map_err(transport_err)?;

        let status = response.status().as_u16();
        let text = response
            .body_mut()
            .read_to_string()
            .map_err(transport_err)?;

        tracing::debug!(
            endpoint,
            status,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "rpc call finished"
        );

        if !(200..300).contains(&status) {
            return Err(DashboardError::Backend {
                endpoint: endpoint.to_string(),
                status,
                message: backend_message(&text),
            });
        }

        if text.trim().is_empty() {
            return Ok(Value::Null);
        }
        serde_json::from_str(&text).map_err(|source| DashboardError::Decode {
            endpoint: endpoint.to_string(),
            source,
        })
    }
}

/// Error bodies carry a `message` field; fall back to the raw text
fn backend_message(body: &str) -> String {
    serde_json::from_str::<Value>(body)
        .ok()
        .and_then(|v| v.get("message").and_then(Value::as_str).map(str::to_string))
        .unwrap_or_else(|| body.trim().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn settings(url: &str, rpc_path: &str) -> BackendSettings {
        BackendSettings {
            url: url.to_string(),
            rpc_path: rpc_path.to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn builds_endpoint_urls_without_double_slashes() {
        let client = PostgrestClient::new(&settings("https://db.example.com/", "/rest/v1/rpc/"))
            .unwrap();
        assert_eq!(
            client.endpoint_url("top_tenants"),
            "https://db.example.com/rest/v1/rpc/top_tenants"
        );
    }

    #[test]
    fn rejects_blank_url() {
        let err = PostgrestClient::new(&settings("  ", "/rpc")).err().unwrap();
        assert!(matches!(err, DashboardError::MissingBackendUrl));
    }

    #[test]
    fn extracts_backend_error_message() {
        assert_eq!(
            backend_message(r#"{"code":"42883","message":"function missing"}"#),
            "function missing"
        );
        assert_eq!(backend_message(" Bad Gateway \n"), "Bad Gateway");
    }
}
