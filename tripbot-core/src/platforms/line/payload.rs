// File: src/platforms/line/payload.rs
//
// Renders ReplyMessage values into LINE Messaging API JSON. The match over
// ReplyMessage is exhaustive, so every variant has exactly one wire shape.

use serde_json::{json, Value};
use tripbot_common::models::{
    ImagemapAction, InfoCard, QuickReply, QuickReplyAction, ReplyMessage, MAX_MESSAGES_PER_BATCH,
};
use crate::Error;

const ACCENT_COLOR: &str = "#1DB446";
const MUTED_COLOR: &str = "#8C8C8C";

/// Validates the whole batch first so a bad message never produces a
/// partially delivered reply.
pub fn render_batch(messages: &[ReplyMessage]) -> Result<Vec<Value>, Error> {
    if messages.is_empty() {
        return Err(Error::InvalidMessage("empty message batch".into()));
    }
    if messages.len() > MAX_MESSAGES_PER_BATCH {
        return Err(Error::InvalidMessage(format!(
            "batch of {} messages exceeds the limit of {}",
            messages.len(),
            MAX_MESSAGES_PER_BATCH
        )));
    }
    for message in messages {
        message.validate()?;
    }
    Ok(messages.iter().map(render_message).collect())
}

pub fn render_message(message: &ReplyMessage) -> Value {
    let mut rendered = match message {
        ReplyMessage::Text { text, .. } => json!({
            "type": "text",
            "text": text,
        }),
        ReplyMessage::Image { original_url, preview_url, .. } => json!({
            "type": "image",
            "originalContentUrl": original_url,
            "previewImageUrl": preview_url,
        }),
        ReplyMessage::Location { title, address, latitude, longitude, .. } => json!({
            "type": "location",
            "title": title,
            "address": address,
            "latitude": latitude,
            "longitude": longitude,
        }),
        ReplyMessage::FlexCard { alt_text, card, .. } => json!({
            "type": "flex",
            "altText": alt_text,
            "contents": render_bubble(card),
        }),
        ReplyMessage::FlexCarousel { alt_text, cards, .. } => json!({
            "type": "flex",
            "altText": alt_text,
            "contents": {
                "type": "carousel",
                "contents": cards.iter().map(render_bubble).collect::<Vec<_>>(),
            },
        }),
        ReplyMessage::Imagemap { base_url, alt_text, width, height, actions, .. } => json!({
            "type": "imagemap",
            "baseUrl": base_url,
            "altText": alt_text,
            "baseSize": { "width": width, "height": height },
            "actions": actions.iter().map(render_imagemap_action).collect::<Vec<_>>(),
        }),
    };

    if let Some(menu) = message.quick_reply() {
        rendered["quickReply"] = render_quick_reply(menu);
    }
    rendered
}

fn render_quick_reply(menu: &QuickReply) -> Value {
    let items: Vec<Value> = menu
        .items
        .iter()
        .map(|item| {
            let action = match item {
                QuickReplyAction::Message { label, text } => json!({
                    "type": "message",
                    "label": label,
                    "text": text,
                }),
                QuickReplyAction::Uri { label, uri } => json!({
                    "type": "uri",
                    "label": label,
                    "uri": uri,
                }),
            };
            json!({ "type": "action", "action": action })
        })
        .collect();
    json!({ "items": items })
}

fn render_imagemap_action(action: &ImagemapAction) -> Value {
    match action {
        ImagemapAction::Uri { link_uri, area } => json!({
            "type": "uri",
            "linkUri": link_uri,
            "area": { "x": area.x, "y": area.y, "width": area.width, "height": area.height },
        }),
        ImagemapAction::Message { text, area } => json!({
            "type": "message",
            "text": text,
            "area": { "x": area.x, "y": area.y, "width": area.width, "height": area.height },
        }),
    }
}

fn render_bubble(card: &InfoCard) -> Value {
    let mut body = vec![json!({
        "type": "text",
        "text": card.title,
        "weight": "bold",
        "size": "lg",
        "wrap": true,
    })];

    if let Some(rating) = card.rating {
        body.push(json!({
            "type": "box",
            "layout": "baseline",
            "margin": "md",
            "contents": [
                { "type": "text", "text": "★", "size": "sm", "color": "#FFB400", "flex": 0 },
                {
                    "type": "text",
                    "text": format!("{:.1} ({} รีวิว)", rating.rating, rating.count),
                    "size": "sm",
                    "color": MUTED_COLOR,
                    "margin": "sm",
                },
            ],
        }));
    }

    if let Some(address) = card.address.as_deref().filter(|a| !a.is_empty()) {
        body.push(json!({
            "type": "text",
            "text": address,
            "size": "sm",
            "color": MUTED_COLOR,
            "wrap": true,
            "margin": "md",
        }));
    }

    for line in &card.hours {
        body.push(json!({
            "type": "text",
            "text": line,
            "size": "xs",
            "color": MUTED_COLOR,
            "wrap": true,
        }));
    }

    let mut bubble = json!({
        "type": "bubble",
        "body": {
            "type": "box",
            "layout": "vertical",
            "spacing": "sm",
            "contents": body,
        },
    });

    if let Some(url) = &card.hero_image_url {
        bubble["hero"] = json!({
            "type": "image",
            "url": url,
            "size": "full",
            "aspectRatio": "20:13",
            "aspectMode": "cover",
        });
    }

    if !card.buttons.is_empty() {
        let buttons: Vec<Value> = card
            .buttons
            .iter()
            .map(|b| {
                json!({
                    "type": "button",
                    "style": "primary",
                    "color": ACCENT_COLOR,
                    "height": "sm",
                    "action": { "type": "uri", "label": b.label, "uri": b.uri },
                })
            })
            .collect();
        bubble["footer"] = json!({
            "type": "box",
            "layout": "vertical",
            "spacing": "sm",
            "contents": buttons,
        });
    }

    bubble
}
