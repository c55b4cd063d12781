use std::sync::Arc;

use page_cursor::{clamp_limit, Page, PageRequest, CONVERSATIONS, MESSAGES};
use tracing::{debug, info};

use super::load_for_participant;
use crate::config::PaginationConfig;
use crate::error::{AppError, AppResult};
use crate::gateways::IdentityGateway;
use crate::metrics;
use crate::models::{Conversation, ConversationDetails, MessageWithSender, Post, User};
use crate::repository::ConversationStore;
use crate::validation::{GetOrCreateConversationInput, InputValidator};

#[derive(Debug, Clone)]
pub struct GetOrCreateOutcome {
    pub conversation: Conversation,
    pub post: Post,
    pub created: bool,
}

pub struct ConversationService {
    store: Arc<dyn ConversationStore>,
    identity: Arc<dyn IdentityGateway>,
    validator: InputValidator,
    pagination: PaginationConfig,
}

impl ConversationService {
    pub fn new(
        store: Arc<dyn ConversationStore>,
        identity: Arc<dyn IdentityGateway>,
        validator: InputValidator,
        pagination: PaginationConfig,
    ) -> Self {
        Self {
            store,
            identity,
            validator,
            pagination,
        }
    }

    /// Returns the caller's conversation about a post, creating it on first use.
    pub async fn get_or_create_conversation(
        &self,
        caller_id: i64,
        input: &GetOrCreateConversationInput,
    ) -> AppResult<GetOrCreateOutcome> {
        let request = self.validator.conversation_request(input)?;

        let post = self
            .identity
            .get_post(request.post_id)
            .await?
            .ok_or_else(|| AppError::NotFound("post not found".into()))?;

        if post.owner_id == caller_id {
            return Err(AppError::InvalidOperation(
                "cannot start a conversation on your own post".into(),
            ));
        }

        if let Some(conversation) = self
            .store
            .find_by_post_and_starter(post.id, caller_id)
            .await?
        {
            debug!(conversation_id = conversation.id, "reusing existing conversation");
            return Ok(GetOrCreateOutcome {
                conversation,
                post,
                created: false,
            });
        }

        let created = self
            .store
            .create_conversation(post.id, caller_id, &[caller_id, post.owner_id])
            .await?;

        if created.created {
            metrics::record_conversation_created();
            info!(
                conversation_id = created.conversation.id,
                post_id = post.id,
                started_by = caller_id,
                "conversation created"
            );
        }

        Ok(GetOrCreateOutcome {
            conversation: created.conversation,
            post,
            created: created.created,
        })
    }

    /// Conversations the caller participates in, ascending by id.
    ///
    /// The token is validated but not applied, and no continuation token is
    /// ever returned: the listing is capped at the configured ceiling.
    pub async fn list_conversations(
        &self,
        caller_id: i64,
        post_id: Option<i64>,
        page_token: Option<&str>,
        limit: Option<i64>,
    ) -> AppResult<Page<Conversation>> {
        CONVERSATIONS.decode(page_token)?;
        let limit = clamp_limit(limit, self.pagination.conversations_limit);

        let conversations = self
            .store
            .list_for_participant(caller_id, post_id, limit)
            .await?;
        Ok(Page::complete(conversations))
    }

    pub async fn get_conversation_by_id(
        &self,
        caller_id: i64,
        conversation_id: i64,
    ) -> AppResult<Conversation> {
        load_for_participant(self.store.as_ref(), caller_id, conversation_id).await
    }

    /// Messages newest first. Membership is re-checked on every page.
    pub async fn list_messages(
        &self,
        caller_id: i64,
        conversation_id: i64,
        page_token: Option<&str>,
        limit: Option<i64>,
    ) -> AppResult<Page<MessageWithSender>> {
        let conversation =
            load_for_participant(self.store.as_ref(), caller_id, conversation_id).await?;
        let request = PageRequest::new(
            &MESSAGES,
            page_token,
            limit,
            self.pagination.messages_limit,
        )?;

        let rows = self
            .store
            .list_messages(conversation.id, request.after(), request.fetch_limit())
            .await?;
        let page = Page::from_rows(rows, request.limit, &MESSAGES, |m| m.id);

        let mut sender_ids: Vec<i64> = page.items.iter().map(|m| m.from_user_id).collect();
        sender_ids.sort_unstable();
        sender_ids.dedup();
        let senders = self.identity.get_users(&sender_ids).await?;

        Ok(page.map(|message| MessageWithSender {
            from: senders.get(&message.from_user_id).cloned(),
            message,
        }))
    }

    /// Participant records, ascending by user id.
    pub async fn participants(&self, conversation: &Conversation) -> AppResult<Vec<User>> {
        let mut users = self.identity.get_users(&conversation.participant_ids).await?;
        conversation
            .participant_ids
            .iter()
            .map(|id| {
                users
                    .remove(id)
                    .ok_or_else(|| AppError::NotFound("user not found".into()))
            })
            .collect()
    }

    /// Resolves the post, the initiator and the participants of a conversation.
    pub async fn describe(&self, conversation: Conversation) -> AppResult<ConversationDetails> {
        let post = self
            .identity
            .get_post(conversation.post_id)
            .await?
            .ok_or_else(|| AppError::NotFound("post not found".into()))?;
        let participants = self.participants(&conversation).await?;
        let started_by = match participants
            .iter()
            .find(|u| u.id == conversation.started_by_user_id)
        {
            Some(user) => user.clone(),
            None => {
                self.identity
                    .get_user(conversation.started_by_user_id)
                    .await?
            }
        };

        Ok(ConversationDetails {
            conversation,
            post,
            started_by,
            participants,
        })
    }
}
