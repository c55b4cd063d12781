use async_trait::async_trait;
use chrono::Utc;
use std::collections::BTreeMap;
use tokio::sync::RwLock;

use super::ConversationStore;
use crate::error::AppResult;
use crate::models::{Conversation, CreatedConversation, Message, NewMessage};

#[derive(Default)]
struct State {
    next_conversation_id: i64,
    next_message_id: i64,
    conversations: BTreeMap<i64, Conversation>,
    messages: BTreeMap<i64, Message>,
}

/// Process-local store with the same ordering and uniqueness rules as the
/// Postgres store. Used by tests and local runs without a database.
#[derive(Default)]
pub struct InMemoryConversationStore {
    state: RwLock<State>,
}

impl InMemoryConversationStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn message_count(&self) -> usize {
        self.state.read().await.messages.len()
    }

    pub async fn conversation_count(&self) -> usize {
        self.state.read().await.conversations.len()
    }
}

fn find_pair(state: &State, post_id: i64, started_by_user_id: i64) -> Option<&Conversation> {
    state
        .conversations
        .values()
        .find(|c| c.post_id == post_id && c.started_by_user_id == started_by_user_id)
}

#[async_trait]
impl ConversationStore for InMemoryConversationStore {
    async fn find_by_post_and_starter(
        &self,
        post_id: i64,
        started_by_user_id: i64,
    ) -> AppResult<Option<Conversation>> {
        let state = self.state.read().await;
        Ok(find_pair(&state, post_id, started_by_user_id).cloned())
    }

    async fn get_conversation(&self, conversation_id: i64) -> AppResult<Option<Conversation>> {
        Ok(self
            .state
            .read()
            .await
            .conversations
            .get(&conversation_id)
            .cloned())
    }

    async fn create_conversation(
        &self,
        post_id: i64,
        started_by_user_id: i64,
        participant_ids: &[i64],
    ) -> AppResult<CreatedConversation> {
        let mut state = self.state.write().await;
        if let Some(existing) = find_pair(&state, post_id, started_by_user_id) {
            return Ok(CreatedConversation {
                conversation: existing.clone(),
                created: false,
            });
        }

        state.next_conversation_id += 1;
        let conversation = Conversation::new(
            state.next_conversation_id,
            post_id,
            started_by_user_id,
            participant_ids.to_vec(),
            Utc::now(),
        );
        state
            .conversations
            .insert(conversation.id, conversation.clone());

        Ok(CreatedConversation {
            conversation,
            created: true,
        })
    }

    async fn list_for_participant(
        &self,
        user_id: i64,
        post_id: Option<i64>,
        limit: i64,
    ) -> AppResult<Vec<Conversation>> {
        let state = self.state.read().await;
        Ok(state
            .conversations
            .values()
            .filter(|c| c.is_participant(user_id))
            .filter(|c| post_id.map_or(true, |p| c.post_id == p))
            .take(usize::try_from(limit).unwrap_or(0))
            .cloned()
            .collect())
    }

    async fn insert_message(&self, message: NewMessage) -> AppResult<Message> {
        let mut state = self.state.write().await;
        state.next_message_id += 1;
        let stored = Message {
            id: state.next_message_id,
            conversation_id: message.conversation_id,
            from_user_id: message.from_user_id,
            body: message.body,
            created_at: Utc::now(),
        };
        state.messages.insert(stored.id, stored.clone());
        Ok(stored)
    }

    async fn list_messages(
        &self,
        conversation_id: i64,
        before_id: Option<i64>,
        limit: i64,
    ) -> AppResult<Vec<Message>> {
        let state = self.state.read().await;
        let upper = before_id.unwrap_or(i64::MAX);
        Ok(state
            .messages
            .range(..upper)
            .rev()
            .map(|(_, m)| m)
            .filter(|m| m.conversation_id == conversation_id)
            .take(usize::try_from(limit).unwrap_or(0))
            .cloned()
            .collect())
    }
}
