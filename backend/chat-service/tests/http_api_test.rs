mod common;

use actix_web::{http::StatusCode, test, web, App};
use chat_service::config::PaginationConfig;
use chat_service::middleware::{Claims, JwtVerifier};
use chat_service::repository::InMemoryConversationStore;
use chat_service::routes;
use chat_service::services::{ConversationService, MessagingService};
use chat_service::state::AppState;
use chat_service::validation::InputValidator;
use common::*;
use jsonwebtoken::{encode, EncodingKey, Header};
use serde_json::{json, Value};
use std::sync::Arc;

const SECRET: &str = "http-test-secret";

fn state() -> AppState {
    let store = Arc::new(InMemoryConversationStore::new());
    let identity = Arc::new(default_identity());
    let notifier = Arc::new(RecordingNotifier::default());
    let validator = InputValidator::new(4000);
    AppState {
        conversations: Arc::new(ConversationService::new(
            store.clone(),
            identity.clone(),
            validator.clone(),
            PaginationConfig::default(),
        )),
        messaging: Arc::new(MessagingService::new(store, identity, notifier, validator)),
        auth: Arc::new(JwtVerifier::new(SECRET)),
    }
}

fn bearer(user_id: i64) -> (&'static str, String) {
    let claims = Claims {
        user_id,
        exp: (chrono::Utc::now().timestamp() + 3600) as usize,
    };
    let token = encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(SECRET.as_bytes()),
    )
    .unwrap();
    ("Authorization", format!("Bearer {token}"))
}

macro_rules! app {
    () => {
        test::init_service(
            App::new()
                .app_data(web::Data::new(state()))
                .configure(routes::configure),
        )
        .await
    };
}

#[actix_web::test]
async fn requests_without_a_token_are_unauthorized() {
    let app = app!();
    let req = test::TestRequest::get().uri("/conversations").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["error_type"], "authorization_error");
}

#[actix_web::test]
async fn conversation_lifecycle_over_http() {
    let app = app!();

    let req = test::TestRequest::post()
        .uri("/conversations")
        .insert_header(bearer(BOB))
        .set_json(json!({ "post_id": ALICE_POST }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::CREATED);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["created"], true);
    let id = body["conversation"]["id"].as_i64().unwrap();

    // second call returns the same conversation
    let req = test::TestRequest::post()
        .uri("/conversations")
        .insert_header(bearer(BOB))
        .set_json(json!({ "post_id": ALICE_POST.to_string() }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["conversation"]["id"].as_i64(), Some(id));

    for text in ["one", "two", "three"] {
        let req = test::TestRequest::post()
            .uri(&format!("/conversations/{id}/messages"))
            .insert_header(bearer(BOB))
            .set_json(json!({ "destination_user_id": ALICE, "body": text }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::CREATED);
    }

    let req = test::TestRequest::get()
        .uri(&format!("/conversations/{id}/messages?limit=2"))
        .insert_header(bearer(ALICE))
        .to_request();
    let page: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(page["items"].as_array().map(Vec::len), Some(2));
    assert_eq!(page["items"][0]["body"], "three");
    assert_eq!(page["items"][0]["from"]["name"], "Bob");
    let token = page["next_page_token"].as_str().unwrap().to_string();

    let req = test::TestRequest::get()
        .uri(&format!("/conversations/{id}/messages?limit=2&page_token={token}"))
        .insert_header(bearer(ALICE))
        .to_request();
    let page: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(page["items"][0]["body"], "one");
    assert!(page["next_page_token"].is_null());

    let req = test::TestRequest::get()
        .uri(&format!("/conversations/{id}"))
        .insert_header(bearer(ALICE))
        .to_request();
    let details: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(details["started_by"]["id"], BOB);
    assert_eq!(details["participants"][0]["id"], ALICE);
    assert_eq!(details["participants"][1]["id"], BOB);

    let req = test::TestRequest::get()
        .uri(&format!("/conversations/{id}"))
        .insert_header(bearer(DAN))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}

#[actix_web::test]
async fn own_post_is_unprocessable() {
    let app = app!();
    let req = test::TestRequest::post()
        .uri("/conversations")
        .insert_header(bearer(ALICE))
        .set_json(json!({ "post_id": ALICE_POST }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);
}

#[actix_web::test]
async fn bad_ids_and_cursors_are_client_errors() {
    let app = app!();

    let req = test::TestRequest::get()
        .uri("/conversations/abc/messages")
        .insert_header(bearer(ALICE))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let req = test::TestRequest::get()
        .uri("/conversations?page_token=bm90LWEtY3Vyc29y")
        .insert_header(bearer(ALICE))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["message"], "invalid cursor");

    let req = test::TestRequest::post()
        .uri("/conversations")
        .insert_header(bearer(BOB))
        .set_json(json!({}))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}
