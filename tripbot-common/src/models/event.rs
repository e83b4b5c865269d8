// File: tripbot-common/src/models/event.rs

use serde::{Deserialize, Serialize};

/// What the user sent, after the platform envelope has been stripped.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum InboundPayload {
    Text { text: String },
    Sticker { package_id: String, sticker_id: String },
    Image { message_id: String },
    /// The user added the bot as a friend.
    Follow,
}

/// One webhook event the bridge is able to answer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InboundEvent {
    pub user_id: String,
    pub reply_token: String,
    pub payload: InboundPayload,
}
