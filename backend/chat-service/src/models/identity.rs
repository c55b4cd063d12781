use serde::Serialize;

/// Shown in place of a user without a usable name.
pub const FALLBACK_DISPLAY_NAME: &str = "Somebody";

/// Post record owned by the content service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, sqlx::FromRow)]
pub struct Post {
    pub id: i64,
    #[sqlx(rename = "user_id")]
    pub owner_id: i64,
}

/// User record owned by the identity service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, sqlx::FromRow)]
pub struct User {
    pub id: i64,
    pub name: Option<String>,
}

impl User {
    /// Name shown in push notifications.
    pub fn display_name(&self) -> &str {
        match self.name.as_deref().map(str::trim) {
            Some(name) if !name.is_empty() => name,
            _ => FALLBACK_DISPLAY_NAME,
        }
    }
}
