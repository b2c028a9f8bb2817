// file: src/enrichment/backend.rs
// description: ipinfo.io lookup backend behind a mockable trait
// reference: https://ipinfo.io/developers

use crate::error::{PipelineError, Result};
use crate::models::IpDetails;
use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use std::time::Duration;
use tracing::debug;

/// Single external lookup used for enrichment.
#[async_trait]
pub trait LookupBackend: Send + Sync {
    fn name(&self) -> &'static str;

    async fn lookup(&self, ip: &str) -> Result<IpDetails>;
}

pub struct IpInfoBackend {
    client: Client,
    base_url: String,
    token: String,
}

impl IpInfoBackend {
    pub fn new(base_url: &str, token: String, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| PipelineError::Config(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            token,
        })
    }

    fn lookup_error(ip: &str, message: impl ToString) -> PipelineError {
        PipelineError::EnrichmentLookup {
            ip: ip.to_string(),
            message: message.to_string(),
        }
    }
}

#[async_trait]
impl LookupBackend for IpInfoBackend {
    fn name(&self) -> &'static str {
        "ipinfo"
    }

    async fn lookup(&self, ip: &str) -> Result<IpDetails> {
        let url = format!("{}/{}", self.base_url, ip);
        debug!("Requesting {} details for {}", self.name(), ip);

        let response = self
            .client
            .get(&url)
            .header("Authorization", format!("Bearer {}", self.token))
            .header("Accept", "application/json")
            .send()
            .await
            .map_err(|e| Self::lookup_error(ip, format!("request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(Self::lookup_error(
                ip,
                format!("status {}: {}", status, body.trim()),
            ));
        }

        let body: Value = response
            .json()
            .await
            .map_err(|e| Self::lookup_error(ip, format!("malformed response: {}", e)))?;

        parse_details(ip, body)
    }
}

fn parse_details(ip: &str, body: Value) -> Result<IpDetails> {
    let Value::Object(object) = body else {
        return Err(IpInfoBackend::lookup_error(
            ip,
            "malformed response: expected a JSON object",
        ));
    };

    if let Some(error) = object.get("error") {
        return Err(IpInfoBackend::lookup_error(ip, flatten(error)));
    }

    if object.get("bogon").and_then(Value::as_bool).unwrap_or(false) {
        return Err(IpInfoBackend::lookup_error(ip, "bogon address"));
    }

    let attributes: BTreeMap<String, String> = object
        .iter()
        .map(|(key, value)| (key.clone(), flatten(value)))
        .collect();

    Ok(IpDetails {
        city: attributes.get("city").cloned(),
        country: attributes.get("country").cloned(),
        organization: attributes.get("org").cloned(),
        attributes,
    })
}

fn flatten(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        Value::Object(map) => map
            .get("message")
            .or_else(|| map.get("title"))
            .map(flatten)
            .unwrap_or_else(|| value.to_string()),
        other => other.to_string(),
    }
}

/// Reads the access token from the first line of `path`.
pub fn read_token(path: &Path) -> Result<String> {
    let content = fs::read_to_string(path).map_err(|e| {
        PipelineError::Config(format!(
            "Could not load access token from {}: {}. Use --skip-enrich to run without enrichment",
            path.display(),
            e
        ))
    })?;

    let token = content.lines().next().unwrap_or_default().trim().to_string();
    if token.is_empty() {
        return Err(PipelineError::Config(format!(
            "Access token file {} is empty",
            path.display()
        )));
    }

    Ok(token)
}
