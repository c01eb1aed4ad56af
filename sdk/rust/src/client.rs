//! Async client for the deploy webhook.

use reqwest::header::HOST;
use reqwest::Client;
use serde::{Deserialize, Serialize};

/// Decoded JSON body. Fields absent from a given outcome stay `None`.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct HookBody {
    pub ok: bool,
    pub pong: Option<bool>,
    pub result: Option<String>,
    pub id: Option<String>,
    pub host: Option<String>,
    pub repo: Option<String>,
    #[serde(rename = "ref")]
    pub git_ref: Option<String>,
    pub ignored: Option<String>,
    pub error: Option<String>,
    pub details: Option<String>,
}

/// Status code plus decoded body.
#[derive(Debug, Clone)]
pub struct HookResponse {
    pub status: u16,
    pub request_id: Option<String>,
    pub body: HookBody,
}

impl HookResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

pub struct HookClient {
    client: Client,
    base_url: String,
}

impl HookClient {
    pub fn new(base_url: &str) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    /// Liveness check.
    pub async fn health(&self) -> Result<HookResponse, Box<dyn std::error::Error>> {
        let resp = self
            .client
            .get(format!("{}/_deploy/health", self.base_url))
            .send()
            .await?;
        decode(resp).await
    }

    /// Fire a simple hook. `host` overrides the Host header.
    pub async fn trigger(
        &self,
        path: &str,
        secret: &str,
        host: Option<&str>,
    ) -> Result<HookResponse, Box<dyn std::error::Error>> {
        let mut req = self
            .client
            .post(format!("{}{}", self.base_url, path))
            .header("X-Webhook-Secret", secret);
        if let Some(host) = host {
            req = req.header(HOST, host);
        }
        decode(req.send().await?).await
    }

    /// Deliver a GitHub-style event. The body is sent exactly as given.
    pub async fn send_github_event(
        &self,
        path: &str,
        event: &str,
        signature: Option<&str>,
        body: Vec<u8>,
    ) -> Result<HookResponse, Box<dyn std::error::Error>> {
        let mut req = self
            .client
            .post(format!("{}{}", self.base_url, path))
            .header("X-GitHub-Event", event)
            .header("Content-Type", "application/json")
            .body(body);
        if let Some(signature) = signature {
            req = req.header("X-Hub-Signature-256", signature);
        }
        decode(req.send().await?).await
    }
}

async fn decode(resp: reqwest::Response) -> Result<HookResponse, Box<dyn std::error::Error>> {
    let status = resp.status().as_u16();
    let request_id = resp
        .headers()
        .get("x-request-id")
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);
    let text = resp.text().await?;

    match serde_json::from_str::<HookBody>(&text) {
        Ok(body) => Ok(HookResponse {
            status,
            request_id,
            body,
        }),
        Err(e) => Err(format!("webhook returned status {} with non-JSON body {:?}: {}", status, text, e).into()),
    }
}
