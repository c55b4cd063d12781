//! Persistence of conversations, memberships and messages.

mod memory;
mod postgres;

pub use memory::InMemoryConversationStore;
pub use postgres::PgConversationStore;

use async_trait::async_trait;

use crate::error::AppResult;
use crate::models::{Conversation, CreatedConversation, Message, NewMessage};

#[async_trait]
pub trait ConversationStore: Send + Sync {
    async fn find_by_post_and_starter(
        &self,
        post_id: i64,
        started_by_user_id: i64,
    ) -> AppResult<Option<Conversation>>;

    async fn get_conversation(&self, conversation_id: i64) -> AppResult<Option<Conversation>>;

    /// Creates the conversation and its memberships atomically.
    ///
    /// If a conversation for `(post_id, started_by_user_id)` already exists,
    /// including one created concurrently, it is returned with
    /// `created = false` and nothing is written.
    async fn create_conversation(
        &self,
        post_id: i64,
        started_by_user_id: i64,
        participant_ids: &[i64],
    ) -> AppResult<CreatedConversation>;

    /// Conversations `user_id` participates in, ascending by id.
    async fn list_for_participant(
        &self,
        user_id: i64,
        post_id: Option<i64>,
        limit: i64,
    ) -> AppResult<Vec<Conversation>>;

    async fn insert_message(&self, message: NewMessage) -> AppResult<Message>;

    /// Messages newest first, restricted to ids below `before_id` when given.
    async fn list_messages(
        &self,
        conversation_id: i64,
        before_id: Option<i64>,
        limit: i64,
    ) -> AppResult<Vec<Message>>;
}
