//! ERP client for the `generate_item_best_month` report method
//!
//! Talks to a Frappe-style site: `POST /api/method/<dotted.path>` with token
//! authentication. Successful answers are wrapped as `{"message": ...}`;
//! failures carry `exception` and `_server_messages` fields.

use async_trait::async_trait;
use reqwest::{header::AUTHORIZATION, Client};
use serde_json::Value;
use shared::{normalize_results, NormalizedResults, ReportResponse, ResolvedQuery, ShapeSetting};
use std::time::Duration;

use super::{FetchError, ReportSource};
use crate::config::ErpConfig;
use crate::error::{AppError, AppResult};

/// ERP API client
#[derive(Clone)]
pub struct ErpClient {
    client: Client,
    base_url: String,
    method: String,
    credentials: Option<(String, String)>,
    response_shape: ShapeSetting,
}

impl ErpClient {
    /// Create a new ErpClient from configuration
    pub fn new(config: &ErpConfig) -> AppResult<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| AppError::Configuration(format!("Failed to build ERP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            method: config.method.clone(),
            credentials: config
                .credentials()
                .map(|(key, secret)| (key.to_string(), secret.to_string())),
            response_shape: config.response_shape,
        })
    }

    /// Create a new ErpClient with custom base URL (for testing)
    pub fn with_base_url(base_url: String, method: String, response_shape: ShapeSetting) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            method,
            credentials: None,
            response_shape,
        }
    }

    pub fn with_credentials(mut self, api_key: String, api_secret: String) -> Self {
        self.credentials = Some((api_key, api_secret));
        self
    }

    fn method_url(&self) -> String {
        format!("{}/api/method/{}", self.base_url, self.method)
    }
}

#[async_trait]
impl ReportSource for ErpClient {
    async fn fetch_best_months(&self, query: &ResolvedQuery) -> Result<NormalizedResults, FetchError> {
        let mut request = self.client.post(self.method_url()).json(query);
        if let Some((key, secret)) = &self.credentials {
            request = request.header(AUTHORIZATION, format!("token {}:{}", key, secret));
        }

        let response = request.send().await.map_err(|e| {
            if e.is_timeout() {
                FetchError::Network(format!("request timed out: {}", e))
            } else {
                FetchError::Network(e.to_string())
            }
        })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = frappe_error_message(&body).unwrap_or(body);
            tracing::warn!(status = status.as_u16(), %message, "ERP report call failed");
            return Err(if status.is_client_error() {
                FetchError::Validation(message)
            } else {
                FetchError::Server {
                    status: status.as_u16(),
                    message,
                }
            });
        }

        let body: Value = response
            .json()
            .await
            .map_err(|e| FetchError::Decode(format!("Failed to parse ERP response: {}", e)))?;

        parse_report_body(body, self.response_shape)
    }
}

/// Unwrap the `message` envelope and normalize the rows
pub fn parse_report_body(body: Value, shape: ShapeSetting) -> Result<NormalizedResults, FetchError> {
    let payload = match body {
        Value::Object(mut map) if map.contains_key("message") && !map.contains_key("results") => {
            map.remove("message").unwrap_or(Value::Null)
        }
        other => other,
    };

    let report: ReportResponse = match payload {
        Value::Object(_) => serde_json::from_value(payload)
            .map_err(|e| FetchError::Decode(format!("Unexpected report body: {}", e)))?,
        Value::Array(rows) => ReportResponse { results: rows },
        Value::Null => ReportResponse::default(),
        other => {
            return Err(FetchError::Decode(format!(
                "Unexpected report body: {}",
                other
            )))
        }
    };

    normalize_results(report.results, shape).map_err(|e| FetchError::Decode(e.to_string()))
}

/// Best human-readable message of a Frappe error body
pub fn frappe_error_message(body: &str) -> Option<String> {
    let value: Value = serde_json::from_str(body).ok()?;

    if let Some(raw) = value.get("_server_messages").and_then(Value::as_str) {
        let first = serde_json::from_str::<Vec<String>>(raw)
            .ok()
            .and_then(|messages| messages.into_iter().next());
        if let Some(first) = first {
            let message = serde_json::from_str::<Value>(&first)
                .ok()
                .and_then(|m| m.get("message").and_then(Value::as_str).map(String::from))
                .unwrap_or(first);
            return Some(message);
        }
    }

    value
        .get("exception")
        .or_else(|| value.get("message"))
        .and_then(Value::as_str)
        .map(String::from)
}
