use crate::middleware::auth::JwtVerifier;
use crate::services::{ConversationService, MessagingService};
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub conversations: Arc<ConversationService>,
    pub messaging: Arc<MessagingService>,
    pub auth: Arc<JwtVerifier>,
}
