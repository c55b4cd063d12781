//! Caller identity from `Authorization: Bearer <jwt>`.

use actix_web::{dev::Payload, http::header, web, FromRequest, HttpRequest};
use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use serde::{Deserialize, Serialize};
use std::future::{ready, Ready};

use crate::error::AppError;
use crate::state::AppState;

#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    #[serde(rename = "UserID")]
    pub user_id: i64,
    pub exp: usize,
}

/// HS256 verifier for tokens minted by the account service.
pub struct JwtVerifier {
    key: DecodingKey,
    validation: Validation,
}

impl JwtVerifier {
    pub fn new(secret: &str) -> Self {
        Self {
            key: DecodingKey::from_secret(secret.as_bytes()),
            validation: Validation::new(Algorithm::HS256),
        }
    }

    pub fn verify(&self, token: &str) -> Result<i64, AppError> {
        let data = decode::<Claims>(token, &self.key, &self.validation).map_err(|e| {
            tracing::debug!(error = %e, "rejected bearer token");
            AppError::Unauthorized
        })?;
        if data.claims.user_id <= 0 {
            return Err(AppError::Unauthorized);
        }
        Ok(data.claims.user_id)
    }
}

fn bearer_token(req: &HttpRequest) -> Option<&str> {
    req.headers()
        .get(header::AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
        .map(str::trim)
}

/// The authenticated user making the request.
#[derive(Debug, Clone, Copy)]
pub struct Caller {
    pub id: i64,
}

impl FromRequest for Caller {
    type Error = AppError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        let result = match (req.app_data::<web::Data<AppState>>(), bearer_token(req)) {
            (None, _) => Err(AppError::Internal),
            (Some(_), None) => Err(AppError::Unauthorized),
            (Some(state), Some(token)) => state.auth.verify(token).map(|id| Caller { id }),
        };
        ready(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use jsonwebtoken::{encode, EncodingKey, Header};

    fn token(secret: &str, user_id: i64, exp: usize) -> String {
        encode(
            &Header::new(Algorithm::HS256),
            &Claims { user_id, exp },
            &EncodingKey::from_secret(secret.as_bytes()),
        )
        .unwrap()
    }

    fn future_exp() -> usize {
        (chrono::Utc::now().timestamp() + 3600) as usize
    }

    #[test]
    fn accepts_valid_token() {
        let verifier = JwtVerifier::new("secret");
        assert_eq!(verifier.verify(&token("secret", 42, future_exp())), Ok(42));
    }

    #[test]
    fn rejects_wrong_secret_and_expired_tokens() {
        let verifier = JwtVerifier::new("secret");
        assert_eq!(
            verifier.verify(&token("other", 42, future_exp())),
            Err(AppError::Unauthorized)
        );
        assert_eq!(
            verifier.verify(&token("secret", 42, 1_000)),
            Err(AppError::Unauthorized)
        );
        assert_eq!(verifier.verify("garbage"), Err(AppError::Unauthorized));
    }
}
