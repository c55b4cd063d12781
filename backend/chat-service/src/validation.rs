//! Input validation for mutating operations.
//!
//! Everything here runs before any storage or gateway call, so a rejected
//! request has no side effects.

use serde::Deserialize;
use validator::Validate;

use crate::error::{AppError, AppResult};

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct GetOrCreateConversationInput {
    #[validate(length(min = 1, message = "post_id is required"))]
    pub post_id: String,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct SendMessageInput {
    #[validate(length(min = 1, message = "conversation_id is required"))]
    pub conversation_id: String,
    #[validate(length(min = 1, message = "destination_user_id is required"))]
    pub destination_user_id: String,
    #[validate(length(min = 1, message = "body is required"))]
    pub body: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConversationRequest {
    pub post_id: i64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageRequest {
    pub conversation_id: i64,
    pub destination_user_id: i64,
    pub body: String,
}

/// Validates raw inputs and parses them into typed requests.
#[derive(Debug, Clone)]
pub struct InputValidator {
    max_body_chars: usize,
}

impl InputValidator {
    pub fn new(max_body_chars: usize) -> Self {
        Self { max_body_chars }
    }

    pub fn conversation_request(
        &self,
        input: &GetOrCreateConversationInput,
    ) -> AppResult<ConversationRequest> {
        input
            .validate()
            .map_err(|e| AppError::BadRequest(e.to_string()))?;
        Ok(ConversationRequest {
            post_id: parse_id("post_id", &input.post_id)?,
        })
    }

    pub fn message_request(&self, input: &SendMessageInput) -> AppResult<MessageRequest> {
        input
            .validate()
            .map_err(|e| AppError::BadRequest(e.to_string()))?;

        if input.body.trim().is_empty() {
            return Err(AppError::BadRequest("body is required".into()));
        }
        if input.body.chars().count() > self.max_body_chars {
            return Err(AppError::BadRequest(format!(
                "body exceeds {} characters",
                self.max_body_chars
            )));
        }

        Ok(MessageRequest {
            conversation_id: parse_id("conversation_id", &input.conversation_id)?,
            destination_user_id: parse_id("destination_user_id", &input.destination_user_id)?,
            body: input.body.clone(),
        })
    }
}

/// Parses a positive integer id.
pub fn parse_id(field: &str, raw: &str) -> AppResult<i64> {
    match raw.trim().parse::<i64>() {
        Ok(id) if id > 0 => Ok(id),
        _ => Err(AppError::BadRequest(format!("{field} is not a valid id"))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn message(conversation_id: &str, destination: &str, body: &str) -> SendMessageInput {
        SendMessageInput {
            conversation_id: conversation_id.into(),
            destination_user_id: destination.into(),
            body: body.into(),
        }
    }

    #[test]
    fn accepts_well_formed_message() {
        let validator = InputValidator::new(10);
        let req = validator.message_request(&message("3", "7", "hello")).unwrap();
        assert_eq!(
            req,
            MessageRequest {
                conversation_id: 3,
                destination_user_id: 7,
                body: "hello".into(),
            }
        );
    }

    #[test]
    fn rejects_missing_fields() {
        let validator = InputValidator::new(10);
        for input in [message("", "7", "hi"), message("3", "", "hi"), message("3", "7", "")] {
            assert!(matches!(
                validator.message_request(&input),
                Err(AppError::BadRequest(_))
            ));
        }
    }

    #[test]
    fn rejects_blank_and_oversized_bodies() {
        let validator = InputValidator::new(5);
        assert!(validator.message_request(&message("3", "7", "   ")).is_err());
        assert!(validator.message_request(&message("3", "7", "toolong")).is_err());
        // multi-byte characters count once
        assert!(validator.message_request(&message("3", "7", "héllo")).is_ok());
    }

    #[test]
    fn rejects_non_integer_ids() {
        let validator = InputValidator::new(10);
        let err = validator
            .conversation_request(&GetOrCreateConversationInput {
                post_id: "abc".into(),
            })
            .unwrap_err();
        assert_eq!(err, AppError::BadRequest("post_id is not a valid id".into()));
        assert!(parse_id("id", "0").is_err());
        assert_eq!(parse_id("id", " 42 ").unwrap(), 42);
    }
}
