pub mod auth;
pub mod error_handling;

pub use auth::{Caller, Claims, JwtVerifier};
