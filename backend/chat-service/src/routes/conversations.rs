use actix_web::{get, post, web, HttpResponse};
use serde::{Deserialize, Serialize};

use super::IdValue;
use crate::error::AppError;
use crate::middleware::Caller;
use crate::models::{Conversation, Post};
use crate::state::AppState;
use crate::validation::{parse_id, GetOrCreateConversationInput};

#[derive(Deserialize)]
pub struct CreateConversationRequest {
    #[serde(default)]
    pub post_id: IdValue,
}

#[derive(Serialize)]
pub struct CreateConversationResponse {
    pub conversation: Conversation,
    pub post: Post,
    pub created: bool,
}

#[derive(Deserialize)]
pub struct ListConversationsQuery {
    pub post_id: Option<String>,
    pub page_token: Option<String>,
    pub limit: Option<i64>,
}

/// POST /conversations
/// Get or create the caller's conversation about a post
#[post("/conversations")]
pub async fn create_conversation(
    state: web::Data<AppState>,
    caller: Caller,
    body: web::Json<CreateConversationRequest>,
) -> Result<HttpResponse, AppError> {
    let input = GetOrCreateConversationInput {
        post_id: body.into_inner().post_id.into_string(),
    };
    let outcome = state
        .conversations
        .get_or_create_conversation(caller.id, &input)
        .await?;

    let response = CreateConversationResponse {
        conversation: outcome.conversation,
        post: outcome.post,
        created: outcome.created,
    };
    Ok(if response.created {
        HttpResponse::Created().json(response)
    } else {
        HttpResponse::Ok().json(response)
    })
}

/// GET /conversations
#[get("/conversations")]
pub async fn list_conversations(
    state: web::Data<AppState>,
    caller: Caller,
    query: web::Query<ListConversationsQuery>,
) -> Result<HttpResponse, AppError> {
    let query = query.into_inner();
    let post_id = query
        .post_id
        .as_deref()
        .map(|raw| parse_id("post_id", raw))
        .transpose()?;

    let page = state
        .conversations
        .list_conversations(caller.id, post_id, query.page_token.as_deref(), query.limit)
        .await?;
    Ok(HttpResponse::Ok().json(page))
}

/// GET /conversations/{id}
#[get("/conversations/{id}")]
pub async fn get_conversation(
    state: web::Data<AppState>,
    caller: Caller,
    path: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    let conversation_id = parse_id("conversation_id", &path.into_inner())?;
    let conversation = state
        .conversations
        .get_conversation_by_id(caller.id, conversation_id)
        .await?;
    let details = state.conversations.describe(conversation).await?;
    Ok(HttpResponse::Ok().json(details))
}
