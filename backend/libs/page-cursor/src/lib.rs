//! Keyset pagination shared by every listing endpoint.
//!
//! A listing query fetches `limit + 1` rows past the last id the client has
//! seen, trims the surplus row, and hands back an opaque token wrapping the
//! id of the last row it returned. Tokens are scoped per listing so that a
//! token issued by one endpoint is rejected by another.

pub mod codec;
pub mod page;

pub use codec::{CursorCodec, CursorError, NO_CURSOR};
pub use page::{clamp_limit, Page, PageRequest};

/// Cursor scope for message listings.
pub const MESSAGES: CursorCodec = CursorCodec::new("messages");
/// Cursor scope for conversation listings.
pub const CONVERSATIONS: CursorCodec = CursorCodec::new("conversations");
