// File: tripbot-common/src/models/message.rs

use serde::{Deserialize, Serialize};
use crate::error::Error;

pub const MAX_TEXT_LEN: usize = 5000;
pub const MAX_CAROUSEL_CARDS: usize = 10;
pub const MAX_QUICK_REPLY_ITEMS: usize = 13;
pub const MAX_QUICK_REPLY_LABEL: usize = 20;
pub const MAX_MESSAGES_PER_BATCH: usize = 5;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum QuickReplyAction {
    /// Sends `text` back as if the user had typed it.
    Message { label: String, text: String },
    Uri { label: String, uri: String },
}

impl QuickReplyAction {
    pub fn label(&self) -> &str {
        match self {
            QuickReplyAction::Message { label, .. } | QuickReplyAction::Uri { label, .. } => label,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct QuickReply {
    pub items: Vec<QuickReplyAction>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CardButton {
    pub label: String,
    pub uri: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RatingBlock {
    pub rating: f64,
    pub count: u32,
}

/// Platform-neutral content of one rich card.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct InfoCard {
    pub title: String,
    pub hero_image_url: Option<String>,
    pub address: Option<String>,
    pub rating: Option<RatingBlock>,
    pub hours: Vec<String>,
    pub buttons: Vec<CardButton>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImagemapArea {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ImagemapAction {
    Uri { link_uri: String, area: ImagemapArea },
    Message { text: String, area: ImagemapArea },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum ReplyMessage {
    Text {
        text: String,
        quick_reply: Option<QuickReply>,
    },
    Image {
        original_url: String,
        preview_url: String,
        quick_reply: Option<QuickReply>,
    },
    Location {
        title: String,
        address: String,
        latitude: f64,
        longitude: f64,
        quick_reply: Option<QuickReply>,
    },
    FlexCard {
        alt_text: String,
        card: InfoCard,
        quick_reply: Option<QuickReply>,
    },
    FlexCarousel {
        alt_text: String,
        cards: Vec<InfoCard>,
        quick_reply: Option<QuickReply>,
    },
    Imagemap {
        base_url: String,
        alt_text: String,
        width: u32,
        height: u32,
        actions: Vec<ImagemapAction>,
        quick_reply: Option<QuickReply>,
    },
}

impl ReplyMessage {
    pub fn text(text: impl Into<String>) -> Self {
        ReplyMessage::Text { text: text.into(), quick_reply: None }
    }

    pub fn image(url: impl Into<String>) -> Self {
        let url = url.into();
        ReplyMessage::Image {
            original_url: url.clone(),
            preview_url: url,
            quick_reply: None,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            ReplyMessage::Text { .. } => "text",
            ReplyMessage::Image { .. } => "image",
            ReplyMessage::Location { .. } => "location",
            ReplyMessage::FlexCard { .. } => "flexCard",
            ReplyMessage::FlexCarousel { .. } => "flexCarousel",
            ReplyMessage::Imagemap { .. } => "imagemap",
        }
    }

    pub fn quick_reply(&self) -> Option<&QuickReply> {
        match self {
            ReplyMessage::Text { quick_reply, .. }
            | ReplyMessage::Image { quick_reply, .. }
            | ReplyMessage::Location { quick_reply, .. }
            | ReplyMessage::FlexCard { quick_reply, .. }
            | ReplyMessage::FlexCarousel { quick_reply, .. }
            | ReplyMessage::Imagemap { quick_reply, .. } => quick_reply.as_ref(),
        }
    }

    pub fn set_quick_reply(&mut self, menu: QuickReply) {
        match self {
            ReplyMessage::Text { quick_reply, .. }
            | ReplyMessage::Image { quick_reply, .. }
            | ReplyMessage::Location { quick_reply, .. }
            | ReplyMessage::FlexCard { quick_reply, .. }
            | ReplyMessage::FlexCarousel { quick_reply, .. }
            | ReplyMessage::Imagemap { quick_reply, .. } => *quick_reply = Some(menu),
        }
    }

    /// Structural checks that must pass before a message reaches the transport.
    pub fn validate(&self) -> Result<(), Error> {
        match self {
            ReplyMessage::Text { text, .. } => {
                if text.trim().is_empty() {
                    return Err(Error::InvalidMessage("text message without text".into()));
                }
                if text.chars().count() > MAX_TEXT_LEN {
                    return Err(Error::InvalidMessage(format!(
                        "text message longer than {MAX_TEXT_LEN} characters"
                    )));
                }
            }
            ReplyMessage::Image { original_url, preview_url, .. } => {
                if !original_url.starts_with("https://") || !preview_url.starts_with("https://") {
                    return Err(Error::InvalidMessage("image urls must be https".into()));
                }
            }
            ReplyMessage::Location { title, latitude, longitude, .. } => {
                if title.trim().is_empty() {
                    return Err(Error::InvalidMessage("location without title".into()));
                }
                if !latitude.is_finite() || !longitude.is_finite() {
                    return Err(Error::InvalidMessage("location with invalid coordinates".into()));
                }
            }
            ReplyMessage::FlexCard { alt_text, card, .. } => {
                require_alt_text(alt_text)?;
                validate_card(card)?;
            }
            ReplyMessage::FlexCarousel { alt_text, cards, .. } => {
                require_alt_text(alt_text)?;
                if cards.is_empty() || cards.len() > MAX_CAROUSEL_CARDS {
                    return Err(Error::InvalidMessage(format!(
                        "carousel must hold 1..={MAX_CAROUSEL_CARDS} cards, got {}",
                        cards.len()
                    )));
                }
                for card in cards {
                    validate_card(card)?;
                }
            }
            ReplyMessage::Imagemap { base_url, alt_text, actions, .. } => {
                require_alt_text(alt_text)?;
                if !base_url.starts_with("https://") {
                    return Err(Error::InvalidMessage("imagemap base url must be https".into()));
                }
                if actions.is_empty() {
                    return Err(Error::InvalidMessage("imagemap without actions".into()));
                }
            }
        }

        if let Some(menu) = self.quick_reply() {
            if menu.items.len() > MAX_QUICK_REPLY_ITEMS {
                return Err(Error::InvalidMessage("too many quick reply items".into()));
            }
            for item in &menu.items {
                let len = item.label().chars().count();
                if len == 0 || len > MAX_QUICK_REPLY_LABEL {
                    return Err(Error::InvalidMessage(format!(
                        "quick reply label '{}' must be 1..={MAX_QUICK_REPLY_LABEL} characters",
                        item.label()
                    )));
                }
            }
        }
        Ok(())
    }
}

fn require_alt_text(alt_text: &str) -> Result<(), Error> {
    if alt_text.trim().is_empty() {
        return Err(Error::InvalidMessage("flex/imagemap message without alt text".into()));
    }
    Ok(())
}

fn validate_card(card: &InfoCard) -> Result<(), Error> {
    if card.title.trim().is_empty() {
        return Err(Error::InvalidMessage("card without title".into()));
    }
    if let Some(url) = &card.hero_image_url {
        if !url.starts_with("https://") {
            return Err(Error::InvalidMessage("card hero image must be https".into()));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_text_is_rejected() {
        let err = ReplyMessage::text("   ").validate().unwrap_err();
        assert!(matches!(err, Error::InvalidMessage(_)));
    }

    #[test]
    fn empty_carousel_is_rejected() {
        let msg = ReplyMessage::FlexCarousel {
            alt_text: "places".into(),
            cards: vec![],
            quick_reply: None,
        };
        assert!(msg.validate().is_err());
    }

    #[test]
    fn long_quick_reply_label_is_rejected() {
        let mut msg = ReplyMessage::text("hi");
        msg.set_quick_reply(QuickReply {
            items: vec![QuickReplyAction::Message {
                label: "x".repeat(21),
                text: "x".into(),
            }],
        });
        assert!(msg.validate().is_err());
    }

    #[test]
    fn quick_reply_is_attached_to_any_variant() {
        let mut msg = ReplyMessage::image("https://example.com/a.png");
        assert!(msg.quick_reply().is_none());
        msg.set_quick_reply(QuickReply::default());
        assert!(msg.quick_reply().is_some());
        assert!(msg.validate().is_ok());
    }
}
