// File: tripbot-common/src/traits/api.rs
//
// Capability interfaces for every remote collaborator the bridge talks to.
// Concrete HTTP clients live in tripbot-core (Google, LINE) and tripbot-ai
// (Gemini); tests substitute in-process fakes.

use async_trait::async_trait;
use crate::error::Error;
use crate::models::{
    ChatTurn, ImageAnnotation, PlaceCandidate, PlaceDetails, ReplyMessage, SearchResult,
};

#[async_trait]
pub trait CompletionService: Send + Sync {
    /// Produces a plain-text completion for `prompt`, given a persona preamble
    /// and the prior conversation (oldest first).
    async fn complete(
        &self,
        persona: &str,
        prior_turns: &[ChatTurn],
        prompt: &str,
    ) -> Result<String, Error>;
}

#[async_trait]
pub trait TranslationService: Send + Sync {
    async fn detect(&self, text: &str) -> Result<String, Error>;
    async fn translate(&self, text: &str, target_lang: &str) -> Result<String, Error>;
}

#[async_trait]
pub trait PlacesApi: Send + Sync {
    async fn text_search(&self, query: &str, place_type: &str) -> Result<Vec<PlaceCandidate>, Error>;
    async fn details(&self, place_id: &str) -> Result<Option<PlaceDetails>, Error>;
    async fn nearby(
        &self,
        lat: f64,
        lng: f64,
        radius_m: u32,
        place_type: &str,
    ) -> Result<Vec<PlaceCandidate>, Error>;
}

#[async_trait]
pub trait WebSearchApi: Send + Sync {
    async fn query(
        &self,
        q: &str,
        result_count: u8,
        lang: &str,
        country: &str,
    ) -> Result<Vec<SearchResult>, Error>;
}

#[async_trait]
pub trait VisionService: Send + Sync {
    async fn annotate(&self, image: &[u8]) -> Result<ImageAnnotation, Error>;
}

#[async_trait]
pub trait MessagingTransport: Send + Sync {
    async fn reply(&self, reply_token: &str, messages: &[ReplyMessage]) -> Result<(), Error>;
    async fn push(&self, user_id: &str, messages: &[ReplyMessage]) -> Result<(), Error>;
    async fn start_loading(&self, user_id: &str, seconds: u32) -> Result<(), Error>;
    async fn fetch_media(&self, message_id: &str) -> Result<Vec<u8>, Error>;
}
