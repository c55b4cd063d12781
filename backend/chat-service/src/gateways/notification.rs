use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::{debug, warn};

use crate::error::{AppError, AppResult};

/// `type` value carried by message pushes.
pub const MESSAGING_PUSH_TYPE: &str = "messaging";

/// Outbound push notifications.
#[async_trait]
pub trait NotificationGateway: Send + Sync {
    /// Plain-text notification to every device the user registered.
    async fn notify(&self, user_id: i64, text: String) -> AppResult<()>;

    /// Message push to the user's primary push token.
    async fn send_targeted(&self, destination_user_id: i64, push: TargetedPush) -> AppResult<()>;
}

/// Metadata of a message push.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TargetedPush {
    pub message_id: i64,
    pub sender_id: i64,
    pub conversation_id: i64,
    pub sender_name: String,
    pub body: String,
    pub sent_at: DateTime<Utc>,
}

impl TargetedPush {
    pub fn into_push(self, token: String) -> PushMessage {
        let mut data = BTreeMap::new();
        data.insert("type".to_string(), MESSAGING_PUSH_TYPE.to_string());
        data.insert("messageID".to_string(), self.message_id.to_string());
        data.insert("senderID".to_string(), self.sender_id.to_string());
        data.insert("convID".to_string(), self.conversation_id.to_string());
        data.insert("time".to_string(), self.sent_at.timestamp().to_string());
        data.insert("message".to_string(), self.body.clone());

        PushMessage {
            token,
            title: Some(self.sender_name),
            body: self.body,
            data,
        }
    }
}

/// A single push addressed to one device token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PushMessage {
    pub token: String,
    pub title: Option<String>,
    pub body: String,
    pub data: BTreeMap<String, String>,
}

/// Delivers one push to a provider.
#[async_trait]
pub trait PushSender: Send + Sync {
    async fn send(&self, message: PushMessage) -> AppResult<()>;
}

/// Looks up device tokens in Postgres and hands pushes to a [`PushSender`].
#[derive(Clone)]
pub struct PushNotificationGateway {
    pool: PgPool,
    sender: Arc<dyn PushSender>,
}

impl PushNotificationGateway {
    pub fn new(pool: PgPool, sender: Arc<dyn PushSender>) -> Self {
        Self { pool, sender }
    }
}

#[async_trait]
impl NotificationGateway for PushNotificationGateway {
    async fn notify(&self, user_id: i64, text: String) -> AppResult<()> {
        let endpoints: Vec<String> =
            sqlx::query_scalar("SELECT endpoint FROM user_device_tokens WHERE user_id = $1")
                .bind(user_id)
                .fetch_all(&self.pool)
                .await?;

        debug!(user_id, devices = endpoints.len(), "publishing notification");
        for token in endpoints {
            let push = PushMessage {
                token,
                title: None,
                body: text.clone(),
                data: BTreeMap::new(),
            };
            // Stale device tokens are common; skip them.
            if let Err(e) = self.sender.send(push).await {
                warn!(user_id, error = %e, "device push failed");
            }
        }
        Ok(())
    }

    async fn send_targeted(&self, destination_user_id: i64, push: TargetedPush) -> AppResult<()> {
        let token: Option<Option<String>> =
            sqlx::query_scalar("SELECT fcm_token FROM users WHERE id = $1")
                .bind(destination_user_id)
                .fetch_optional(&self.pool)
                .await?;

        let token = token
            .flatten()
            .filter(|t| !t.trim().is_empty())
            .ok_or_else(|| {
                AppError::Dependency(format!(
                    "no push token registered for user {destination_user_id}"
                ))
            })?;

        self.sender.send(push.into_push(token)).await
    }
}
