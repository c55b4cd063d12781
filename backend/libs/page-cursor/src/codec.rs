//! Opaque cursor tokens.
//!
//! Format: URL-safe base64 (no padding) of `"<scope>:after=<id>"`.
//! Tokens are not signed. They only bound a `WHERE id < $n` clause and never
//! grant access to anything.

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use thiserror::Error;

/// Value returned by [`CursorCodec::decode`] when the client sent no token.
pub const NO_CURSOR: i64 = -1;

const AFTER_KEY: &str = "after=";

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CursorError {
    #[error("invalid cursor: not base64")]
    Encoding,

    #[error("invalid cursor: not issued for {expected}")]
    Scope { expected: &'static str },

    #[error("invalid cursor: bad position value")]
    Position,
}

/// Encodes and decodes cursors for one listing scope.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CursorCodec {
    scope: &'static str,
}

impl CursorCodec {
    pub const fn new(scope: &'static str) -> Self {
        Self { scope }
    }

    /// Returns `None` for `0`, which marks "nothing was returned".
    pub fn encode(&self, last_id: i64) -> Option<String> {
        if last_id == 0 {
            return None;
        }
        let raw = format!("{}:{}{}", self.scope, AFTER_KEY, last_id);
        Some(URL_SAFE_NO_PAD.encode(raw))
    }

    /// Decodes a client token into the last-seen id.
    ///
    /// An absent token yields [`NO_CURSOR`]. Callers apply the id as a filter
    /// only when it is positive.
    pub fn decode(&self, token: Option<&str>) -> Result<i64, CursorError> {
        let Some(token) = token else {
            return Ok(NO_CURSOR);
        };

        let bytes = URL_SAFE_NO_PAD
            .decode(token.trim())
            .map_err(|_| CursorError::Encoding)?;
        let raw = String::from_utf8(bytes).map_err(|_| CursorError::Encoding)?;

        let position = raw
            .strip_prefix(self.scope)
            .and_then(|rest| rest.strip_prefix(':'))
            .and_then(|rest| rest.strip_prefix(AFTER_KEY))
            .ok_or(CursorError::Scope {
                expected: self.scope,
            })?;

        position.parse::<i64>().map_err(|_| CursorError::Position)
    }
}
