use actix_web::{get, post, web, HttpResponse};
use serde::Deserialize;

use super::IdValue;
use crate::error::AppError;
use crate::middleware::Caller;
use crate::state::AppState;
use crate::validation::{parse_id, SendMessageInput};

#[derive(Deserialize)]
pub struct SendMessageRequest {
    #[serde(default)]
    pub destination_user_id: IdValue,
    #[serde(default)]
    pub body: String,
}

#[derive(Deserialize)]
pub struct ListMessagesQuery {
    pub page_token: Option<String>,
    pub limit: Option<i64>,
}

/// GET /conversations/{id}/messages
/// Newest first; pass `next_page_token` back as `page_token` for older messages
#[get("/conversations/{id}/messages")]
pub async fn list_messages(
    state: web::Data<AppState>,
    caller: Caller,
    path: web::Path<String>,
    query: web::Query<ListMessagesQuery>,
) -> Result<HttpResponse, AppError> {
    let conversation_id = parse_id("conversation_id", &path.into_inner())?;
    let query = query.into_inner();
    let page = state
        .conversations
        .list_messages(
            caller.id,
            conversation_id,
            query.page_token.as_deref(),
            query.limit,
        )
        .await?;
    Ok(HttpResponse::Ok().json(page))
}

/// POST /conversations/{id}/messages
#[post("/conversations/{id}/messages")]
pub async fn send_message(
    state: web::Data<AppState>,
    caller: Caller,
    path: web::Path<String>,
    body: web::Json<SendMessageRequest>,
) -> Result<HttpResponse, AppError> {
    let body = body.into_inner();
    let input = SendMessageInput {
        conversation_id: path.into_inner(),
        destination_user_id: body.destination_user_id.into_string(),
        body: body.body,
    };
    let message = state.messaging.send_message(caller.id, &input).await?;
    Ok(HttpResponse::Created().json(message))
}
