// File: src/platforms/line/webhook.rs

use serde::Deserialize;
use tripbot_common::models::{InboundEvent, InboundPayload};

/// Body of one webhook delivery.
#[derive(Debug, Deserialize)]
pub struct WebhookBody {
    pub destination: Option<String>,
    #[serde(default)]
    pub events: Vec<WebhookEvent>,
}

#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum WebhookEvent {
    Message(MessageEvent),
    Follow(FollowEvent),
    Unfollow(UnfollowEvent),
    /// postback, join, beacon, ... not answered by this bot.
    #[serde(other)]
    Other,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MessageEvent {
    pub reply_token: String,
    pub source: EventSource,
    pub message: WebhookMessage,
    #[serde(default)]
    pub timestamp: i64,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FollowEvent {
    pub reply_token: String,
    pub source: EventSource,
}

#[derive(Debug, Deserialize)]
pub struct UnfollowEvent {
    pub source: EventSource,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventSource {
    #[serde(rename = "type")]
    pub source_type: String,
    pub user_id: Option<String>,
    pub group_id: Option<String>,
    pub room_id: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum WebhookMessage {
    Text(TextMessage),
    Sticker(StickerMessage),
    Image(ImageMessage),
    /// video, audio, file, location
    #[serde(other)]
    Other,
}

#[derive(Debug, Deserialize)]
pub struct TextMessage {
    pub id: String,
    pub text: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StickerMessage {
    pub id: String,
    pub package_id: String,
    pub sticker_id: String,
}

#[derive(Debug, Deserialize)]
pub struct ImageMessage {
    pub id: String,
}

impl WebhookEvent {
    pub fn kind(&self) -> &'static str {
        match self {
            WebhookEvent::Message(_) => "message",
            WebhookEvent::Follow(_) => "follow",
            WebhookEvent::Unfollow(_) => "unfollow",
            WebhookEvent::Other => "other",
        }
    }

    /// Converts to the bridge's event model. `None` for events that get no
    /// reply: unsupported kinds, or sources without a user id.
    pub fn into_inbound(self) -> Option<InboundEvent> {
        match self {
            WebhookEvent::Message(ev) => {
                let payload = match ev.message {
                    WebhookMessage::Text(m) => InboundPayload::Text { text: m.text },
                    WebhookMessage::Sticker(m) => InboundPayload::Sticker {
                        package_id: m.package_id,
                        sticker_id: m.sticker_id,
                    },
                    WebhookMessage::Image(m) => InboundPayload::Image { message_id: m.id },
                    WebhookMessage::Other => return None,
                };
                Some(InboundEvent {
                    user_id: ev.source.user_id?,
                    reply_token: ev.reply_token,
                    payload,
                })
            }
            WebhookEvent::Follow(ev) => Some(InboundEvent {
                user_id: ev.source.user_id?,
                reply_token: ev.reply_token,
                payload: InboundPayload::Follow,
            }),
            WebhookEvent::Unfollow(_) | WebhookEvent::Other => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(json: serde_json::Value) -> WebhookBody {
        serde_json::from_value(json).unwrap()
    }

    #[test]
    fn mixed_delivery_keeps_order_and_drops_unsupported() {
        let body = parse(serde_json::json!({
            "destination": "Ubot",
            "events": [
                {
                    "type": "message", "replyToken": "r1", "timestamp": 1,
                    "source": { "type": "user", "userId": "U1" },
                    "message": { "type": "text", "id": "m1", "text": "แผนที่ ดอยสุเทพ" }
                },
                {
                    "type": "message", "replyToken": "r2",
                    "source": { "type": "user", "userId": "U1" },
                    "message": { "type": "sticker", "id": "m2", "packageId": "446", "stickerId": "1988" }
                },
                { "type": "postback", "replyToken": "r3", "source": { "type": "user", "userId": "U1" } },
                {
                    "type": "message", "replyToken": "r4",
                    "source": { "type": "user", "userId": "U1" },
                    "message": { "type": "audio", "id": "m4", "duration": 100 }
                },
                { "type": "follow", "replyToken": "r5", "source": { "type": "user", "userId": "U2" } }
            ]
        }));

        let inbound: Vec<InboundEvent> = body.events.into_iter().filter_map(|e| e.into_inbound()).collect();
        assert_eq!(inbound.len(), 3);
        assert_eq!(inbound[0].reply_token, "r1");
        assert!(matches!(&inbound[0].payload, InboundPayload::Text { text } if text == "แผนที่ ดอยสุเทพ"));
        assert!(matches!(&inbound[1].payload, InboundPayload::Sticker { sticker_id, .. } if sticker_id == "1988"));
        assert_eq!(inbound[2].payload, InboundPayload::Follow);
        assert_eq!(inbound[2].user_id, "U2");
    }

    #[test]
    fn kinds_name_every_event_including_unsupported() {
        let body = parse(serde_json::json!({
            "events": [
                {
                    "type": "message", "replyToken": "r1",
                    "source": { "type": "user", "userId": "U1" },
                    "message": { "type": "text", "id": "m1", "text": "hi" }
                },
                { "type": "unfollow", "source": { "type": "user", "userId": "U1" } },
                { "type": "beacon", "replyToken": "r3", "source": { "type": "user", "userId": "U1" } },
                { "type": "follow", "replyToken": "r4", "source": { "type": "user", "userId": "U2" } }
            ]
        }));
        let kinds: Vec<&str> = body.events.iter().map(WebhookEvent::kind).collect();
        assert_eq!(kinds, ["message", "unfollow", "other", "follow"]);
    }

    #[test]
    fn group_event_without_user_is_skipped() {
        let body = parse(serde_json::json!({
            "events": [{
                "type": "message", "replyToken": "r1",
                "source": { "type": "group", "groupId": "G1" },
                "message": { "type": "image", "id": "m1" }
            }]
        }));
        assert!(body.events.into_iter().next().unwrap().into_inbound().is_none());
    }
}
