pub mod conversation_service;
pub mod message_service;

pub use conversation_service::{ConversationService, GetOrCreateOutcome};
pub use message_service::MessagingService;

use crate::error::{AppError, AppResult};
use crate::models::Conversation;
use crate::repository::ConversationStore;

/// Loads a conversation the caller participates in.
///
/// Existence is checked before membership, so outsiders learn that an id
/// exists but nothing about its contents.
pub(crate) async fn load_for_participant(
    store: &dyn ConversationStore,
    caller_id: i64,
    conversation_id: i64,
) -> AppResult<Conversation> {
    let conversation = store
        .get_conversation(conversation_id)
        .await?
        .ok_or_else(|| AppError::NotFound("conversation not found".into()))?;

    if !conversation.is_participant(caller_id) {
        return Err(AppError::Unauthorized);
    }
    Ok(conversation)
}
