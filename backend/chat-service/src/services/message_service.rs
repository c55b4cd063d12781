use std::sync::Arc;

use chrono::Utc;
use tracing::{info, warn};

use super::load_for_participant;
use crate::error::AppResult;
use crate::gateways::{IdentityGateway, NotificationGateway, TargetedPush};
use crate::metrics;
use crate::models::{MessageWithSender, NewMessage, User, FALLBACK_DISPLAY_NAME};
use crate::repository::ConversationStore;
use crate::validation::{InputValidator, SendMessageInput};

pub struct MessagingService {
    store: Arc<dyn ConversationStore>,
    identity: Arc<dyn IdentityGateway>,
    notifications: Arc<dyn NotificationGateway>,
    validator: InputValidator,
}

impl MessagingService {
    pub fn new(
        store: Arc<dyn ConversationStore>,
        identity: Arc<dyn IdentityGateway>,
        notifications: Arc<dyn NotificationGateway>,
        validator: InputValidator,
    ) -> Self {
        Self {
            store,
            identity,
            notifications,
            validator,
        }
    }

    /// Stores a message and notifies the other participants.
    ///
    /// Participant notifications are best effort. The targeted push to
    /// `destination_user_id` is not: if it fails the call fails, although the
    /// message has already been stored.
    pub async fn send_message(
        &self,
        caller_id: i64,
        input: &SendMessageInput,
    ) -> AppResult<MessageWithSender> {
        let request = self.validator.message_request(input)?;
        let conversation =
            load_for_participant(self.store.as_ref(), caller_id, request.conversation_id).await?;

        let message = self
            .store
            .insert_message(NewMessage {
                conversation_id: conversation.id,
                from_user_id: caller_id,
                body: request.body,
            })
            .await?;
        metrics::record_message_sent();
        info!(
            conversation_id = conversation.id,
            message_id = message.id,
            from_user_id = caller_id,
            "message stored"
        );

        let sender = self.identity.get_user(caller_id).await;
        let sender_name = sender
            .as_ref()
            .map(User::display_name)
            .unwrap_or(FALLBACK_DISPLAY_NAME);

        let text = format!("{sender_name} replied to your post");
        for user_id in conversation.others(caller_id) {
            if let Err(e) = self.notifications.notify(user_id, text.clone()).await {
                metrics::record_notification_failure("fanout");
                warn!(
                    conversation_id = conversation.id,
                    user_id,
                    error = %e,
                    "participant notification failed"
                );
            }
        }

        let sender = sender?;
        let push = TargetedPush {
            message_id: message.id,
            sender_id: caller_id,
            conversation_id: conversation.id,
            sender_name: sender.display_name().to_string(),
            body: message.body.clone(),
            sent_at: Utc::now(),
        };
        if let Err(e) = self
            .notifications
            .send_targeted(request.destination_user_id, push)
            .await
        {
            metrics::record_notification_failure("targeted");
            warn!(
                message_id = message.id,
                destination_user_id = request.destination_user_id,
                error = %e,
                "targeted push failed"
            );
            return Err(e);
        }

        Ok(MessageWithSender {
            message,
            from: Some(sender),
        })
    }
}
