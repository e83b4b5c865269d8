// File: src/services/dispatcher.rs
//
// Turns one inbound payload into the ordered list of replies for it.
// Remote failures never escape a branch: they are reported to Diagnostics and
// replaced with a localized apology.

use std::sync::Arc;
use tracing::{debug, info};

use tripbot_ai::{AiClient, DEFAULT_PERSONA};
use tripbot_common::models::{
    HotelRecord, InboundPayload, PlanRequest, PlaceRecord, ReplyMessage, SearchContext, SearchResult,
    DEFAULT_LANG, MAX_MESSAGES_PER_BATCH, MAX_TEXT_LEN,
};
use tripbot_common::traits::{
    ChatHistoryRepository, CompletionService, Diagnostics, MessagingTransport, PlacesApi,
    TranslationService, VisionService, WebSearchApi,
};

use crate::config::AppConfig;
use crate::Error;
use super::concurrent::join_successes;
use super::formatter::{
    FormatterSettings, MessageFormatter, APOLOGY, FOLLOW_UP, GENERIC_ERROR, GREETING,
    PLACE_NOT_FOUND, REGION_GUIDANCE,
};
use super::hotel_finder::HotelFinder;
use super::intent::{classify, extract_numbered_list, Intent, SHOW_IMAGE_MARKER};
use super::language::LanguageNormalizer;
use super::place_resolver::PlaceResolver;
use super::region::{is_supported_destination, REGION_NAME};
use super::search_enricher::SearchEnricher;

/// How many candidate places the model is asked for.
pub const RECOMMENDATION_COUNT: usize = 5;

/// Places whose web links are listed under a carousel.
const LINKED_PLACES: usize = 3;

const UNRECOGNIZED_IMAGE: &str = "ขออภัย ไม่สามารถระบุสิ่งที่อยู่ในภาพได้ ลองส่งภาพสถานที่อีกครั้งนะคะ";

#[derive(Debug, Clone)]
pub struct DispatcherSettings {
    pub formatter: FormatterSettings,
    pub persona: String,
    pub history_limit: usize,
}

impl DispatcherSettings {
    pub fn from_config(config: &AppConfig) -> Self {
        Self {
            formatter: FormatterSettings::from(config),
            persona: DEFAULT_PERSONA.to_string(),
            history_limit: config.chat_history_limit,
        }
    }
}

/// Every remote capability the dispatcher consumes.
#[derive(Clone)]
pub struct Collaborators {
    pub completion: Arc<dyn CompletionService>,
    pub history: Arc<dyn ChatHistoryRepository>,
    pub translator: Arc<dyn TranslationService>,
    pub places: Arc<dyn PlacesApi>,
    pub search: Arc<dyn WebSearchApi>,
    pub vision: Arc<dyn VisionService>,
    pub transport: Arc<dyn MessagingTransport>,
    pub diagnostics: Arc<dyn Diagnostics>,
}

pub struct Dispatcher {
    ai: AiClient,
    resolver: Arc<PlaceResolver>,
    hotels: HotelFinder,
    enricher: SearchEnricher,
    formatter: MessageFormatter,
    language: LanguageNormalizer,
    vision: Arc<dyn VisionService>,
    media: Arc<dyn MessagingTransport>,
    diagnostics: Arc<dyn Diagnostics>,
}

impl Dispatcher {
    pub fn new(settings: DispatcherSettings, c: Collaborators) -> Self {
        let resolver = Arc::new(PlaceResolver::new(c.places.clone()));
        Self {
            ai: AiClient::new(c.completion, c.history, settings.persona)
                .with_context_size(settings.history_limit),
            hotels: HotelFinder::new(resolver.clone(), c.places, c.diagnostics.clone()),
            resolver,
            enricher: SearchEnricher::new(c.search),
            formatter: MessageFormatter::new(settings.formatter),
            language: LanguageNormalizer::new(c.translator, c.diagnostics.clone()),
            vision: c.vision,
            media: c.transport,
            diagnostics: c.diagnostics,
        }
    }

    pub fn formatter(&self) -> &MessageFormatter {
        &self.formatter
    }

    /// Replies for one inbound event. Never empty; the last message carries
    /// the quick-reply menu in the user's language.
    pub async fn dispatch(&self, user_id: &str, payload: &InboundPayload) -> Vec<ReplyMessage> {
        let lang = self.reply_language(payload).await;
        self.dispatch_in(user_id, payload, &lang).await
    }

    /// Language replies to `payload` are written in. Only text is detected;
    /// stickers, follows and images are answered in Thai.
    pub async fn reply_language(&self, payload: &InboundPayload) -> String {
        match payload {
            InboundPayload::Text { text } => self.language.detect(text).await,
            _ => DEFAULT_LANG.to_string(),
        }
    }

    /// [`Dispatcher::dispatch`] with the reply language already known.
    pub async fn dispatch_in(&self, user_id: &str, payload: &InboundPayload, lang: &str) -> Vec<ReplyMessage> {
        let messages = match payload {
            InboundPayload::Sticker { .. } | InboundPayload::Follow => {
                debug!("greeting {}", user_id);
                vec![self.localized_text(GREETING, lang).await]
            }
            InboundPayload::Text { text } => {
                let intent = classify(text);
                info!("user {} => intent {} (lang {})", user_id, intent.name(), lang);
                let result = self.route(user_id, &intent, lang).await;
                self.recover(intent.name(), result, lang).await
            }
            InboundPayload::Image { message_id } => {
                let result = self.describe_image(message_id).await;
                self.recover("image", result, lang).await
            }
        };
        self.finish(messages, lang)
    }

    /// Replies for a submitted trip-plan form, pushed later by the caller.
    pub async fn dispatch_plan(&self, request: &PlanRequest) -> Vec<ReplyMessage> {
        let result = self.plan(request).await;
        let messages = self.recover("plan", result, DEFAULT_LANG).await;
        self.finish(messages, DEFAULT_LANG)
    }

    /// The reply sent when handling failed outside any branch.
    pub async fn generic_error(&self, lang: &str) -> Vec<ReplyMessage> {
        let text = self.language.localize(GENERIC_ERROR, lang).await;
        self.formatter.with_menu(vec![ReplyMessage::text(text)], lang)
    }

    async fn route(&self, user_id: &str, intent: &Intent, lang: &str) -> Result<Vec<ReplyMessage>, Error> {
        match intent {
            Intent::RecommendPlaces { destination } => {
                self.recommend_places(user_id, destination, lang).await
            }
            Intent::PlaceInfo { place } => self.place_info(place, lang).await,
            Intent::RecommendHotels { destination } => self.recommend_hotels(destination, lang).await,
            Intent::Weather { place } => self.weather(place, lang).await,
            Intent::Map { place } => self.map(place, lang).await,
            Intent::ContactAuthorities => {
                let mut messages = self.formatter.contact_imagemaps();
                messages.push(self.follow_up(lang).await);
                Ok(messages)
            }
            Intent::Chat { text } => {
                let reply = self.ai.chat_with_user_context(user_id, text).await?;
                Ok(self.answer_completion(&reply, REGION_NAME, lang).await)
            }
        }
    }

    /// Substitutes the apology for a failed branch.
    async fn recover(
        &self,
        operation: &str,
        result: Result<Vec<ReplyMessage>, Error>,
        lang: &str,
    ) -> Vec<ReplyMessage> {
        match result {
            Ok(messages) => messages,
            Err(e) => {
                self.diagnostics.remote_failure(operation, &e);
                vec![self.localized_text(APOLOGY, lang).await]
            }
        }
    }

    fn finish(&self, mut messages: Vec<ReplyMessage>, lang: &str) -> Vec<ReplyMessage> {
        if messages.is_empty() {
            self.diagnostics.degraded("dispatch", "branch produced no messages");
            messages.push(ReplyMessage::text(APOLOGY));
        }
        if messages.len() > MAX_MESSAGES_PER_BATCH {
            // keep the follow-up text that carries the menu
            let last = messages.pop();
            messages.truncate(MAX_MESSAGES_PER_BATCH - 1);
            messages.extend(last);
        }
        self.formatter.with_menu(messages, lang)
    }

    async fn localized_text(&self, text: &str, lang: &str) -> ReplyMessage {
        ReplyMessage::text(clip(&self.language.localize(text, lang).await))
    }

    async fn follow_up(&self, lang: &str) -> ReplyMessage {
        self.localized_text(FOLLOW_UP, lang).await
    }

    /// Sentinel texts from the formatter are authored in Thai too.
    async fn localize_message(&self, message: ReplyMessage, lang: &str) -> ReplyMessage {
        match message {
            ReplyMessage::Text { text, .. } => self.localized_text(&text, lang).await,
            other => other,
        }
    }

    async fn recommend_places(
        &self,
        user_id: &str,
        destination: &str,
        lang: &str,
    ) -> Result<Vec<ReplyMessage>, Error> {
        if !is_supported_destination(destination) {
            info!("destination '{}' outside the region", destination);
            return Ok(vec![self.localized_text(REGION_GUIDANCE, lang).await]);
        }

        let prompt = recommendation_prompt(destination);
        let reply = self.ai.chat_with_user_context(user_id, &prompt).await?;
        let names = extract_numbered_list(&reply);
        debug!("model suggested {} place(s) for '{}'", names.len(), destination);
        Ok(self.recommendation_path(&names, destination, lang).await)
    }

    /// Carousel of resolved places, nearby hotels, search links, follow-up.
    async fn recommendation_path(&self, names: &[String], destination: &str, lang: &str) -> Vec<ReplyMessage> {
        let (carousel, places) = self
            .formatter
            .recommendation_carousel(&self.resolver, names, self.diagnostics.as_ref())
            .await;

        let linked: Vec<String> = places.iter().take(LINKED_PLACES).map(|p| p.name.clone()).collect();
        let (hotels, links) = tokio::join!(
            self.hotels_or_empty(destination),
            self.search_groups(&linked, SearchContext::Travel),
        );

        let mut messages = vec![self.localize_message(carousel, lang).await];
        if !hotels.is_empty() {
            messages.push(self.formatter.hotel_carousel(&hotels));
        }
        messages.extend(self.formatter.search_links(&links));
        messages.push(self.follow_up(lang).await);
        messages
    }

    async fn hotels_or_empty(&self, destination: &str) -> Vec<HotelRecord> {
        match self.hotels.find_hotels(destination).await {
            Ok(hotels) => hotels,
            Err(e) => {
                self.diagnostics.remote_failure("find_hotels", &e);
                Vec::new()
            }
        }
    }

    /// Enrichment for each name concurrently; failed searches are dropped.
    async fn search_groups(&self, names: &[String], context: SearchContext) -> Vec<(String, Vec<SearchResult>)> {
        join_successes(names, move |name| async move {
            match self.enricher.search(name, context).await {
                Ok(results) => Some((name.clone(), results)),
                Err(e) => {
                    self.diagnostics.remote_failure("search", &e);
                    None
                }
            }
        })
        .await
    }

    async fn lookup(&self, place: &str) -> Result<Option<PlaceRecord>, Error> {
        if place.trim().is_empty() {
            return Ok(None);
        }
        let found = self.resolver.resolve_attraction(place).await?;
        if found.is_none() {
            info!("place '{}' not found", place);
        }
        Ok(found)
    }

    async fn place_info(&self, place: &str, lang: &str) -> Result<Vec<ReplyMessage>, Error> {
        let Some(record) = self.lookup(place).await? else {
            return Ok(vec![self.localized_text(PLACE_NOT_FOUND, lang).await]);
        };

        let details = match self.resolver.details(&record.place_id).await {
            Ok(details) => details,
            Err(e) => {
                self.diagnostics.remote_failure("place_details", &e);
                None
            }
        };
        let links = self
            .search_groups(std::slice::from_ref(&record.name), SearchContext::Travel)
            .await;

        let mut messages = vec![self.formatter.info_card(&record, details.as_ref())];
        messages.extend(self.formatter.search_links(&links));
        messages.push(self.follow_up(lang).await);
        Ok(messages)
    }

    async fn recommend_hotels(&self, destination: &str, lang: &str) -> Result<Vec<ReplyMessage>, Error> {
        if !is_supported_destination(destination) {
            info!("hotel destination '{}' outside the region", destination);
            return Ok(vec![self.localized_text(REGION_GUIDANCE, lang).await]);
        }

        let destination_owned = destination.to_string();
        let (hotels, links) = tokio::join!(
            self.hotels.find_hotels(destination),
            self.search_groups(std::slice::from_ref(&destination_owned), SearchContext::Hotel),
        );
        let hotels = hotels?;

        let carousel = self.formatter.hotel_carousel(&hotels);
        let mut messages = vec![self.localize_message(carousel, lang).await];
        messages.extend(self.formatter.search_links(&links));
        messages.push(self.follow_up(lang).await);
        Ok(messages)
    }

    /// No forecast source is wired in; the reply is the location card.
    async fn weather(&self, place: &str, lang: &str) -> Result<Vec<ReplyMessage>, Error> {
        let Some(record) = self.lookup(place).await? else {
            return Ok(vec![self.localized_text(PLACE_NOT_FOUND, lang).await]);
        };
        Ok(vec![self.formatter.weather_card(&record), self.follow_up(lang).await])
    }

    async fn map(&self, place: &str, lang: &str) -> Result<Vec<ReplyMessage>, Error> {
        let Some(record) = self.lookup(place).await? else {
            return Ok(vec![self.localized_text(PLACE_NOT_FOUND, lang).await]);
        };
        Ok(vec![self.formatter.location_pin(&record), self.follow_up(lang).await])
    }

    /// A numbered list becomes recommendations, the image marker becomes the
    /// placeholder picture, anything else is sent back as text.
    async fn answer_completion(&self, reply: &str, destination: &str, lang: &str) -> Vec<ReplyMessage> {
        let names = extract_numbered_list(reply);
        if !names.is_empty() {
            return self.recommendation_path(&names, destination, lang).await;
        }

        if reply.contains(SHOW_IMAGE_MARKER) {
            let stripped = reply.replace(SHOW_IMAGE_MARKER, "");
            let mut messages = Vec::new();
            if !stripped.trim().is_empty() {
                messages.push(self.localized_text(stripped.trim(), lang).await);
            }
            messages.push(self.formatter.placeholder_image());
            return messages;
        }

        if reply.trim().is_empty() {
            self.diagnostics.degraded("completion", "empty model reply");
            return vec![self.localized_text(APOLOGY, lang).await];
        }
        vec![self.localized_text(reply.trim(), lang).await]
    }

    async fn describe_image(&self, message_id: &str) -> Result<Vec<ReplyMessage>, Error> {
        let bytes = self.media.fetch_media(message_id).await?;
        let annotation = self.vision.annotate(&bytes).await?;
        debug!(
            "image {}: {} label(s), {} landmark(s)",
            message_id,
            annotation.labels.len(),
            annotation.landmarks.len()
        );

        if let Some(landmark) = annotation.landmarks.first() {
            match self.resolver.resolve_attraction(&landmark.description).await {
                Ok(Some(place)) => {
                    return Ok(vec![
                        self.formatter.info_card(&place, None),
                        self.follow_up(DEFAULT_LANG).await,
                    ]);
                }
                Ok(None) => {
                    self.diagnostics.degraded("image_landmark", &format!("'{}' not found", landmark.description));
                }
                Err(e) => self.diagnostics.remote_failure("image_landmark", &e),
            }
        }

        let labels: Vec<&str> = annotation
            .labels
            .iter()
            .take(3)
            .map(|l| l.description.as_str())
            .filter(|d| !d.is_empty())
            .collect();
        if labels.is_empty() {
            return Ok(vec![ReplyMessage::text(UNRECOGNIZED_IMAGE)]);
        }
        Ok(vec![ReplyMessage::text(format!("ภาพนี้น่าจะเกี่ยวกับ: {}", labels.join(", ")))])
    }

    async fn plan(&self, request: &PlanRequest) -> Result<Vec<ReplyMessage>, Error> {
        if !is_supported_destination(&request.destination) {
            info!("plan destination '{}' outside the region", request.destination);
            return Ok(vec![ReplyMessage::text(REGION_GUIDANCE)]);
        }
        let reply = self
            .ai
            .chat_with_user_context(&request.user_id, &plan_prompt(request))
            .await?;
        Ok(self.answer_completion(&reply, &request.destination, DEFAULT_LANG).await)
    }
}

pub fn recommendation_prompt(destination: &str) -> String {
    format!(
        "แนะนำสถานที่ท่องเที่ยวใน{} จำนวน {} แห่ง ตอบเป็นรายการลำดับเลข \
         ในรูปแบบ \"1. ชื่อสถานที่: คำอธิบายสั้น ๆ\"",
        destination, RECOMMENDATION_COUNT
    )
}

pub fn plan_prompt(request: &PlanRequest) -> String {
    let mut prompt = format!(
        "ช่วยวางแผนเที่ยว{} เดินทางจาก{} วันที่ {} ถึง {} ({} วัน)",
        request.destination,
        request.origin,
        request.start_date,
        request.end_date,
        request.days()
    );
    let extras = [
        ("งบประมาณ", &request.budget),
        ("ความสนใจ", &request.preference),
        ("เดินทางกับ", &request.companions),
        ("การเดินทาง", &request.transport),
    ];
    for (label, value) in extras {
        if let Some(v) = value.as_deref().map(str::trim).filter(|v| !v.is_empty()) {
            prompt.push_str(&format!("\n{}: {}", label, v));
        }
    }
    prompt.push_str(&format!(
        "\nแนะนำสถานที่ {} แห่งเป็นรายการลำดับเลขในรูปแบบ \"1. ชื่อสถานที่: คำอธิบายสั้น ๆ\"",
        RECOMMENDATION_COUNT
    ));
    prompt
}

fn clip(text: &str) -> String {
    if text.chars().count() <= MAX_TEXT_LEN {
        return text.to_string();
    }
    text.chars().take(MAX_TEXT_LEN - 1).chain(std::iter::once('…')).collect()
}
