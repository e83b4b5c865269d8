// File: tripbot-core/src/config.rs
//! Startup configuration.
//!
//! Read once from the process environment (after loading `.env`) and passed
//! by value to every client and service constructor. Nothing reads the
//! environment after startup.

use std::net::SocketAddr;
use tracing::{debug, warn};

use tripbot_common::models::MAX_HISTORY_TURNS;
use crate::Error;

pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0:3000";
pub const DEFAULT_GEMINI_MODEL: &str = "gemini-1.5-flash";
pub const DEFAULT_TRIP_PLANNER_URL: &str = "https://www.google.com/travel/";
pub const DEFAULT_ASSET_BASE_URL: &str = "https://storage.googleapis.com/tripbot-assets";

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub line_channel_access_token: String,
    pub line_channel_secret: String,

    pub gemini_api_key: String,
    pub gemini_model: String,

    pub places_api_key: String,
    pub search_api_key: String,
    pub search_engine_id: String,
    pub translate_api_key: String,
    pub vision_api_key: String,

    /// External page the third quick-reply button links to.
    pub trip_planner_url: String,
    /// Where the static imagemap and placeholder assets are hosted.
    pub asset_base_url: String,
    pub placeholder_image_url: String,

    /// When absent, chat history is kept in memory only.
    pub database_url: Option<String>,
    pub bind_addr: SocketAddr,
    pub chat_history_limit: usize,
}

impl AppConfig {
    /// Loads `.env` (if present) and reads the process environment.
    pub fn from_env() -> Result<Self, Error> {
        if let Err(e) = dotenv::dotenv() {
            debug!("No .env file loaded: {}", e);
        }
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the config from an arbitrary key lookup. Blank values count as missing.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, Error>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());
        let require = |key: &str| {
            get(key).ok_or_else(|| Error::Config(format!("missing required environment variable {key}")))
        };

        let places_api_key = require("GOOGLE_PLACES_API_KEY")?;
        let asset_base_url = get("ASSET_BASE_URL")
            .unwrap_or_else(|| DEFAULT_ASSET_BASE_URL.to_string())
            .trim_end_matches('/')
            .to_string();

        let bind_addr = get("BIND_ADDR")
            .unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string())
            .parse::<SocketAddr>()?;

        let chat_history_limit = match get("CHAT_HISTORY_LIMIT") {
            Some(raw) => {
                let n = raw
                    .parse::<usize>()
                    .map_err(|e| Error::Config(format!("CHAT_HISTORY_LIMIT '{raw}': {e}")))?;
                if n > MAX_HISTORY_TURNS {
                    warn!("CHAT_HISTORY_LIMIT {} exceeds {}, clamping", n, MAX_HISTORY_TURNS);
                }
                n.min(MAX_HISTORY_TURNS)
            }
            None => MAX_HISTORY_TURNS,
        };

        Ok(Self {
            line_channel_access_token: require("LINE_CHANNEL_ACCESS_TOKEN")?,
            line_channel_secret: require("LINE_CHANNEL_SECRET")?,
            gemini_api_key: require("GEMINI_API_KEY")?,
            gemini_model: get("GEMINI_MODEL").unwrap_or_else(|| DEFAULT_GEMINI_MODEL.to_string()),
            search_api_key: require("GOOGLE_SEARCH_API_KEY")?,
            search_engine_id: require("GOOGLE_SEARCH_ENGINE_ID")?,
            translate_api_key: get("GOOGLE_TRANSLATE_API_KEY").unwrap_or_else(|| places_api_key.clone()),
            vision_api_key: get("GOOGLE_VISION_API_KEY").unwrap_or_else(|| places_api_key.clone()),
            places_api_key,
            trip_planner_url: get("TRIP_PLANNER_URL").unwrap_or_else(|| DEFAULT_TRIP_PLANNER_URL.to_string()),
            placeholder_image_url: get("PLACEHOLDER_IMAGE_URL")
                .unwrap_or_else(|| format!("{asset_base_url}/placeholder.jpg")),
            asset_base_url,
            database_url: get("DATABASE_URL"),
            bind_addr,
            chat_history_limit,
        })
    }
}
