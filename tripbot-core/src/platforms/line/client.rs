// File: tripbot-core/src/platforms/line/client.rs

use async_trait::async_trait;
use reqwest::Client as ReqwestClient;
use serde_json::json;
use tracing::{debug, info};

use tripbot_common::models::ReplyMessage;
use tripbot_common::traits::MessagingTransport;
use crate::Error;
use crate::platforms::expect_success;
use super::payload::render_batch;

pub const LINE_API_BASE: &str = "https://api.line.me";
pub const LINE_DATA_API_BASE: &str = "https://api-data.line.me";

/// The loading animation accepts 5..=60 seconds in steps of 5.
const LOADING_MIN_SECONDS: u32 = 5;
const LOADING_MAX_SECONDS: u32 = 60;

/// LINE Messaging API client: reply, push, loading animation and message
/// content download.
pub struct LineMessagingClient {
    http: ReqwestClient,
    access_token: String,
    api_base: String,
    data_base: String,
}

impl LineMessagingClient {
    pub fn new(http: ReqwestClient, access_token: &str) -> Self {
        Self {
            http,
            access_token: access_token.to_string(),
            api_base: LINE_API_BASE.to_string(),
            data_base: LINE_DATA_API_BASE.to_string(),
        }
    }

    /// Points both API hosts somewhere else (a local stub in tests).
    pub fn with_api_bases(mut self, api_base: &str, data_base: &str) -> Self {
        self.api_base = api_base.trim_end_matches('/').to_string();
        self.data_base = data_base.trim_end_matches('/').to_string();
        self
    }

    async fn post_json(&self, path: &str, body: serde_json::Value, context: &str) -> Result<(), Error> {
        let response = self
            .http
            .post(format!("{}{}", self.api_base, path))
            .bearer_auth(&self.access_token)
            .json(&body)
            .send()
            .await
            .map_err(|e| Error::Platform(format!("{} network error: {}", context, e)))?;
        expect_success(response, context).await
    }
}

pub(crate) fn loading_seconds(requested: u32) -> u32 {
    let clamped = requested.clamp(LOADING_MIN_SECONDS, LOADING_MAX_SECONDS);
    // round up to the next multiple of 5
    clamped.div_ceil(5) * 5
}

#[async_trait]
impl MessagingTransport for LineMessagingClient {
    async fn reply(&self, reply_token: &str, messages: &[ReplyMessage]) -> Result<(), Error> {
        let rendered = render_batch(messages)?;
        debug!("line reply: {} message(s)", rendered.len());
        self.post_json(
            "/v2/bot/message/reply",
            json!({ "replyToken": reply_token, "messages": rendered }),
            "line reply",
        )
        .await
    }

    async fn push(&self, user_id: &str, messages: &[ReplyMessage]) -> Result<(), Error> {
        let rendered = render_batch(messages)?;
        info!("line push to {}: {} message(s)", user_id, rendered.len());
        self.post_json(
            "/v2/bot/message/push",
            json!({ "to": user_id, "messages": rendered }),
            "line push",
        )
        .await
    }

    async fn start_loading(&self, user_id: &str, seconds: u32) -> Result<(), Error> {
        self.post_json(
            "/v2/bot/chat/loading/start",
            json!({ "chatId": user_id, "loadingSeconds": loading_seconds(seconds) }),
            "line loading",
        )
        .await
    }

    async fn fetch_media(&self, message_id: &str) -> Result<Vec<u8>, Error> {
        let response = self
            .http
            .get(format!("{}/v2/bot/message/{}/content", self.data_base, message_id))
            .bearer_auth(&self.access_token)
            .send()
            .await
            .map_err(|e| Error::Platform(format!("line content network error: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(Error::Platform(format!("line content: HTTP {} => {}", status, body)));
        }
        Ok(response.bytes().await?.to_vec())
    }
}
