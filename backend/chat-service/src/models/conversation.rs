use chrono::{DateTime, Utc};
use serde::Serialize;

use super::{Post, User};

/// A two-party conversation about a post.
///
/// `participant_ids` is always sorted ascending without duplicates.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Conversation {
    pub id: i64,
    pub post_id: i64,
    pub started_by_user_id: i64,
    pub participant_ids: Vec<i64>,
    pub created_at: DateTime<Utc>,
}

impl Conversation {
    pub fn new(
        id: i64,
        post_id: i64,
        started_by_user_id: i64,
        mut participant_ids: Vec<i64>,
        created_at: DateTime<Utc>,
    ) -> Self {
        participant_ids.sort_unstable();
        participant_ids.dedup();
        Self {
            id,
            post_id,
            started_by_user_id,
            participant_ids,
            created_at,
        }
    }

    pub fn is_participant(&self, user_id: i64) -> bool {
        self.participant_ids.binary_search(&user_id).is_ok()
    }

    /// Participants except `user_id`, in ascending order.
    pub fn others(&self, user_id: i64) -> impl Iterator<Item = i64> + '_ {
        self.participant_ids
            .iter()
            .copied()
            .filter(move |id| *id != user_id)
    }
}

/// Result of get-or-create.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreatedConversation {
    pub conversation: Conversation,
    pub created: bool,
}

/// A conversation with its related records resolved.
#[derive(Debug, Clone, Serialize)]
pub struct ConversationDetails {
    #[serde(flatten)]
    pub conversation: Conversation,
    pub post: Post,
    pub started_by: User,
    pub participants: Vec<User>,
}
