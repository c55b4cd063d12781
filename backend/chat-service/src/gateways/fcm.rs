use async_trait::async_trait;
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::time::Duration;
use tracing::{debug, error};

use super::notification::{PushMessage, PushSender};
use crate::config::FcmConfig;
use crate::error::{AppError, AppResult};

#[derive(Serialize)]
struct FcmNotification<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    title: Option<&'a str>,
    body: &'a str,
}

#[derive(Serialize)]
struct FcmRequest<'a> {
    registration_ids: [&'a str; 1],
    priority: &'static str,
    content_available: bool,
    notification: FcmNotification<'a>,
    data: &'a BTreeMap<String, String>,
}

#[derive(Deserialize)]
struct FcmResponse {
    #[serde(default)]
    failure: u32,
    #[serde(default)]
    results: Vec<FcmResult>,
}

#[derive(Deserialize)]
struct FcmResult {
    error: Option<String>,
}

/// Firebase Cloud Messaging sender (legacy HTTP API).
#[derive(Clone)]
pub struct FcmPushSender {
    client: reqwest::Client,
    endpoint: String,
    server_key: String,
}

impl FcmPushSender {
    pub fn new(cfg: &FcmConfig) -> AppResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(10))
            .build()
            .map_err(|e| AppError::Config(format!("fcm client: {e}")))?;
        Ok(Self {
            client,
            endpoint: cfg.endpoint.clone(),
            server_key: cfg.server_key.clone(),
        })
    }
}

fn token_prefix(token: &str) -> &str {
    token.get(..8).unwrap_or(token)
}

#[async_trait]
impl PushSender for FcmPushSender {
    async fn send(&self, message: PushMessage) -> AppResult<()> {
        let request = FcmRequest {
            registration_ids: [message.token.as_str()],
            priority: "high",
            content_available: true,
            notification: FcmNotification {
                title: message.title.as_deref(),
                body: &message.body,
            },
            data: &message.data,
        };

        let response = self
            .client
            .post(&self.endpoint)
            .header(AUTHORIZATION, format!("key={}", self.server_key))
            .header(CONTENT_TYPE, "application/json")
            .json(&request)
            .send()
            .await
            .map_err(|e| AppError::Dependency(format!("fcm request: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            error!(%status, token = token_prefix(&message.token), "fcm rejected push");
            return Err(AppError::Dependency(format!("fcm status {status}")));
        }

        let body: FcmResponse = response
            .json()
            .await
            .map_err(|e| AppError::Dependency(format!("fcm response: {e}")))?;
        if body.failure > 0 {
            let reason = body
                .results
                .into_iter()
                .find_map(|r| r.error)
                .unwrap_or_else(|| "unknown".into());
            return Err(AppError::Dependency(format!("fcm delivery failed: {reason}")));
        }

        debug!(token = token_prefix(&message.token), "fcm push sent");
        Ok(())
    }
}
