use chrono::{DateTime, Utc};
use serde::Serialize;

use super::User;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, sqlx::FromRow)]
pub struct Message {
    pub id: i64,
    pub conversation_id: i64,
    pub from_user_id: i64,
    pub body: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewMessage {
    pub conversation_id: i64,
    pub from_user_id: i64,
    pub body: String,
}

/// A message with its sender resolved. `from` is `None` when the sender
/// could not be found.
#[derive(Debug, Clone, Serialize)]
pub struct MessageWithSender {
    #[serde(flatten)]
    pub message: Message,
    pub from: Option<User>,
}
