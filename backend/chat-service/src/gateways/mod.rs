//! Collaborators owned by other services.

pub mod fcm;
pub mod identity;
pub mod notification;

pub use fcm::FcmPushSender;
pub use identity::{IdentityGateway, PgIdentityGateway};
pub use notification::{
    NotificationGateway, PushMessage, PushNotificationGateway, PushSender, TargetedPush,
};
