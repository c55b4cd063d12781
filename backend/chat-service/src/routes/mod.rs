pub mod conversations;
pub mod messages;

use actix_web::web;
use serde::Deserialize;

/// An id sent either as a JSON number or as a string.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum IdValue {
    Number(i64),
    Text(String),
}

impl Default for IdValue {
    fn default() -> Self {
        IdValue::Text(String::new())
    }
}

impl IdValue {
    pub fn into_string(self) -> String {
        match self {
            IdValue::Number(n) => n.to_string(),
            IdValue::Text(s) => s,
        }
    }
}

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(conversations::create_conversation)
        .service(conversations::list_conversations)
        .service(conversations::get_conversation)
        .service(messages::list_messages)
        .service(messages::send_message);
}
