// File: src/platforms/line/mod.rs
//
// LINE Messaging API: webhook decoding, signature checks, outbound payload
// rendering and the HTTP client.

pub mod client;
pub mod payload;
pub mod signature;
pub mod webhook;

pub use client::LineMessagingClient;
pub use signature::verify_signature;
pub use webhook::{WebhookBody, WebhookEvent};
