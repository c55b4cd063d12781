mod conversation;
mod identity;
mod message;

pub use conversation::{Conversation, ConversationDetails, CreatedConversation};
pub use identity::{Post, User, FALLBACK_DISPLAY_NAME};
pub use message::{Message, MessageWithSender, NewMessage};
