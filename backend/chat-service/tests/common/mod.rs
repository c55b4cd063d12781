//! Shared fixtures: in-memory store plus fake identity and notification gateways.
#![allow(dead_code)]

use async_trait::async_trait;
use chat_service::config::PaginationConfig;
use chat_service::error::{AppError, AppResult};
use chat_service::gateways::{IdentityGateway, NotificationGateway, TargetedPush};
use chat_service::models::{Post, User};
use chat_service::repository::InMemoryConversationStore;
use chat_service::services::{ConversationService, MessagingService};
use chat_service::validation::{GetOrCreateConversationInput, InputValidator, SendMessageInput};
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};

pub const ALICE: i64 = 1;
pub const BOB: i64 = 2;
pub const CAROL: i64 = 3;
pub const DAN: i64 = 4;

/// Post owned by Alice.
pub const ALICE_POST: i64 = 100;
/// Post owned by Bob.
pub const BOB_POST: i64 = 200;

#[derive(Default)]
pub struct FakeIdentity {
    posts: HashMap<i64, Post>,
    users: HashMap<i64, User>,
}

impl FakeIdentity {
    pub fn with_post(mut self, id: i64, owner_id: i64) -> Self {
        self.posts.insert(id, Post { id, owner_id });
        self
    }

    pub fn with_user(mut self, id: i64, name: Option<&str>) -> Self {
        self.users.insert(
            id,
            User {
                id,
                name: name.map(str::to_string),
            },
        );
        self
    }
}

#[async_trait]
impl IdentityGateway for FakeIdentity {
    async fn get_post(&self, post_id: i64) -> AppResult<Option<Post>> {
        Ok(self.posts.get(&post_id).cloned())
    }

    async fn get_user(&self, user_id: i64) -> AppResult<User> {
        self.users
            .get(&user_id)
            .cloned()
            .ok_or_else(|| AppError::NotFound("user not found".into()))
    }

    async fn get_users(&self, user_ids: &[i64]) -> AppResult<HashMap<i64, User>> {
        Ok(user_ids
            .iter()
            .filter_map(|id| self.users.get(id).map(|u| (*id, u.clone())))
            .collect())
    }
}

/// Records every dispatch; failures can be switched on per user.
#[derive(Default)]
pub struct RecordingNotifier {
    pub notified: Mutex<Vec<(i64, String)>>,
    pub targeted: Mutex<Vec<(i64, TargetedPush)>>,
    pub failing_notify: Mutex<HashSet<i64>>,
    pub fail_targeted: Mutex<bool>,
}

impl RecordingNotifier {
    pub fn fail_notify_for(&self, user_id: i64) {
        self.failing_notify.lock().unwrap().insert(user_id);
    }

    pub fn fail_targeted(&self) {
        *self.fail_targeted.lock().unwrap() = true;
    }

    pub fn notified(&self) -> Vec<(i64, String)> {
        self.notified.lock().unwrap().clone()
    }

    pub fn targeted(&self) -> Vec<(i64, TargetedPush)> {
        self.targeted.lock().unwrap().clone()
    }
}

#[async_trait]
impl NotificationGateway for RecordingNotifier {
    async fn notify(&self, user_id: i64, text: String) -> AppResult<()> {
        if self.failing_notify.lock().unwrap().contains(&user_id) {
            return Err(AppError::Dependency("device unreachable".into()));
        }
        self.notified.lock().unwrap().push((user_id, text));
        Ok(())
    }

    async fn send_targeted(&self, destination_user_id: i64, push: TargetedPush) -> AppResult<()> {
        if *self.fail_targeted.lock().unwrap() {
            return Err(AppError::Dependency(format!(
                "no push token registered for user {destination_user_id}"
            )));
        }
        self.targeted.lock().unwrap().push((destination_user_id, push));
        Ok(())
    }
}

pub fn default_identity() -> FakeIdentity {
    FakeIdentity::default()
        .with_user(ALICE, Some("Alice"))
        .with_user(BOB, Some("Bob"))
        .with_user(CAROL, None)
        .with_user(DAN, Some("Dan"))
        .with_post(ALICE_POST, ALICE)
        .with_post(BOB_POST, BOB)
}

pub struct Fixture {
    pub store: Arc<InMemoryConversationStore>,
    pub notifier: Arc<RecordingNotifier>,
    pub conversations: ConversationService,
    pub messaging: MessagingService,
}

impl Fixture {
    pub fn new() -> Self {
        Self::with_notifier(Arc::new(RecordingNotifier::default()))
    }

    pub fn with_notifier(notifier: Arc<RecordingNotifier>) -> Self {
        let store = Arc::new(InMemoryConversationStore::new());
        let identity = Arc::new(default_identity());
        let validator = InputValidator::new(4000);
        let conversations = ConversationService::new(
            store.clone(),
            identity.clone(),
            validator.clone(),
            PaginationConfig::default(),
        );
        let messaging =
            MessagingService::new(store.clone(), identity, notifier.clone(), validator);
        Self {
            store,
            notifier,
            conversations,
            messaging,
        }
    }

    /// Opens `caller`'s conversation about `post_id` and returns its id.
    pub async fn open(&self, caller: i64, post_id: i64) -> i64 {
        self.conversations
            .get_or_create_conversation(caller, &conversation_input(post_id))
            .await
            .unwrap()
            .conversation
            .id
    }
}

pub fn conversation_input(post_id: i64) -> GetOrCreateConversationInput {
    GetOrCreateConversationInput {
        post_id: post_id.to_string(),
    }
}

pub fn message_input(conversation_id: i64, destination: i64, body: &str) -> SendMessageInput {
    SendMessageInput {
        conversation_id: conversation_id.to_string(),
        destination_user_id: destination.to_string(),
        body: body.to_string(),
    }
}
