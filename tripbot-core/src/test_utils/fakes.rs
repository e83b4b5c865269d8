// File: tripbot-core/src/test_utils/fakes.rs
//
// In-process stand-ins for the remote collaborators. Each one counts its
// calls so tests can assert on what was (or was not) contacted.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use async_trait::async_trait;

use tripbot_ai::InMemoryChatHistory;
use tripbot_common::models::{
    ChatTurn, ImageAnnotation, LatLng, PlaceCandidate, PlaceDetails, ReplyMessage, SearchResult,
};
use tripbot_common::traits::{
    CompletionService, MessagingTransport, PlacesApi, TranslationService, VisionService,
    WebSearchApi,
};

use crate::services::diagnostics::RecordingDiagnostics;
use crate::services::dispatcher::Collaborators;
use crate::Error;

fn lock<T: Clone>(m: &Mutex<T>) -> T {
    m.lock().map(|v| v.clone()).unwrap_or_else(|p| p.into_inner().clone())
}

/// Returns a canned reply and remembers every prompt.
#[derive(Default)]
pub struct FakeCompletion {
    reply: Mutex<String>,
    fail: bool,
    prompts: Mutex<Vec<String>>,
    prior_counts: Mutex<Vec<usize>>,
}

impl FakeCompletion {
    pub fn replying(reply: &str) -> Self {
        Self { reply: Mutex::new(reply.to_string()), ..Default::default() }
    }

    pub fn failing() -> Self {
        Self { fail: true, ..Default::default() }
    }

    pub fn prompts(&self) -> Vec<String> {
        lock(&self.prompts)
    }

    pub fn prior_counts(&self) -> Vec<usize> {
        lock(&self.prior_counts)
    }

    pub fn calls(&self) -> usize {
        self.prompts().len()
    }
}

#[async_trait]
impl CompletionService for FakeCompletion {
    async fn complete(&self, _persona: &str, prior_turns: &[ChatTurn], prompt: &str) -> Result<String, Error> {
        if let Ok(mut p) = self.prompts.lock() {
            p.push(prompt.to_string());
        }
        if let Ok(mut c) = self.prior_counts.lock() {
            c.push(prior_turns.len());
        }
        if self.fail {
            return Err(Error::Platform("completion unavailable".into()));
        }
        Ok(lock(&self.reply))
    }
}

/// Text in Thai script detects as `th`, anything else as the configured
/// language. Translations are tagged `[lang] text`.
pub struct FakeTranslation {
    detected: String,
    fail_translate: bool,
    pub detect_calls: AtomicUsize,
    pub translate_calls: AtomicUsize,
}

impl FakeTranslation {
    pub fn detecting(lang: &str) -> Self {
        Self {
            detected: lang.to_string(),
            fail_translate: false,
            detect_calls: AtomicUsize::new(0),
            translate_calls: AtomicUsize::new(0),
        }
    }

    pub fn with_failing_translate(mut self) -> Self {
        self.fail_translate = true;
        self
    }

    pub fn translate_count(&self) -> usize {
        self.translate_calls.load(Ordering::SeqCst)
    }
}

impl Default for FakeTranslation {
    fn default() -> Self {
        Self::detecting("th")
    }
}

#[async_trait]
impl TranslationService for FakeTranslation {
    async fn detect(&self, text: &str) -> Result<String, Error> {
        self.detect_calls.fetch_add(1, Ordering::SeqCst);
        if text.chars().any(|c| ('\u{0E00}'..='\u{0E7F}').contains(&c)) {
            return Ok("th".to_string());
        }
        Ok(self.detected.clone())
    }

    async fn translate(&self, text: &str, target_lang: &str) -> Result<String, Error> {
        self.translate_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_translate {
            return Err(Error::Platform("translate unavailable".into()));
        }
        Ok(format!("[{}] {}", target_lang, text))
    }
}

/// Places keyed by query substring. Unknown queries return nothing.
#[derive(Default)]
pub struct FakePlaces {
    by_query: Mutex<Vec<(String, Vec<PlaceCandidate>)>>,
    details: Mutex<HashMap<String, PlaceDetails>>,
    lodging: Mutex<Vec<PlaceCandidate>>,
    fail_text_search: bool,
    text_queries: Mutex<Vec<String>>,
    nearby_calls: Mutex<Vec<(f64, f64, u32, String)>>,
    pub details_calls: AtomicUsize,
}

impl FakePlaces {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing() -> Self {
        Self { fail_text_search: true, ..Default::default() }
    }

    /// Any query containing `needle` answers with `candidates`.
    pub fn with_search(self, needle: &str, candidates: Vec<PlaceCandidate>) -> Self {
        if let Ok(mut q) = self.by_query.lock() {
            q.push((needle.to_string(), candidates));
        }
        self
    }

    pub fn with_details(self, details: PlaceDetails) -> Self {
        if let Ok(mut d) = self.details.lock() {
            d.insert(details.place_id.clone(), details);
        }
        self
    }

    pub fn with_lodging(self, hotels: Vec<PlaceCandidate>) -> Self {
        if let Ok(mut l) = self.lodging.lock() {
            *l = hotels;
        }
        self
    }

    pub fn text_queries(&self) -> Vec<String> {
        lock(&self.text_queries)
    }

    pub fn nearby_calls(&self) -> Vec<(f64, f64, u32, String)> {
        lock(&self.nearby_calls)
    }

    pub fn total_calls(&self) -> usize {
        self.text_queries().len() + self.nearby_calls().len() + self.details_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl PlacesApi for FakePlaces {
    async fn text_search(&self, query: &str, _place_type: &str) -> Result<Vec<PlaceCandidate>, Error> {
        if let Ok(mut q) = self.text_queries.lock() {
            q.push(query.to_string());
        }
        if self.fail_text_search {
            return Err(Error::Platform("places unavailable".into()));
        }
        Ok(lock(&self.by_query)
            .into_iter()
            .find(|(needle, _)| query.contains(needle.as_str()))
            .map(|(_, found)| found)
            .unwrap_or_default())
    }

    async fn details(&self, place_id: &str) -> Result<Option<PlaceDetails>, Error> {
        self.details_calls.fetch_add(1, Ordering::SeqCst);
        Ok(lock(&self.details).get(place_id).cloned())
    }

    async fn nearby(&self, lat: f64, lng: f64, radius_m: u32, place_type: &str) -> Result<Vec<PlaceCandidate>, Error> {
        if let Ok(mut n) = self.nearby_calls.lock() {
            n.push((lat, lng, radius_m, place_type.to_string()));
        }
        Ok(lock(&self.lodging))
    }
}

/// Returns the same results for every query.
#[derive(Default)]
pub struct FakeSearch {
    results: Vec<SearchResult>,
    queries: Mutex<Vec<String>>,
}

impl FakeSearch {
    pub fn returning(results: Vec<SearchResult>) -> Self {
        Self { results, ..Default::default() }
    }

    pub fn queries(&self) -> Vec<String> {
        lock(&self.queries)
    }
}

#[async_trait]
impl WebSearchApi for FakeSearch {
    async fn query(&self, q: &str, _count: u8, _lang: &str, _country: &str) -> Result<Vec<SearchResult>, Error> {
        if let Ok(mut qs) = self.queries.lock() {
            qs.push(q.to_string());
        }
        Ok(self.results.clone())
    }
}

#[derive(Default)]
pub struct FakeVision {
    annotation: ImageAnnotation,
    pub calls: AtomicUsize,
}

impl FakeVision {
    pub fn returning(annotation: ImageAnnotation) -> Self {
        Self { annotation, calls: AtomicUsize::new(0) }
    }
}

#[async_trait]
impl VisionService for FakeVision {
    async fn annotate(&self, _image: &[u8]) -> Result<ImageAnnotation, Error> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.annotation.clone())
    }
}

/// Records everything sent. Replies can be made to fail.
#[derive(Default)]
pub struct RecordingTransport {
    fail_reply: bool,
    fail_push: bool,
    replies: Mutex<Vec<(String, Vec<ReplyMessage>)>>,
    pushes: Mutex<Vec<(String, Vec<ReplyMessage>)>>,
    loading: Mutex<Vec<String>>,
}

impl RecordingTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing_replies(mut self) -> Self {
        self.fail_reply = true;
        self
    }

    pub fn failing_pushes(mut self) -> Self {
        self.fail_push = true;
        self
    }

    pub fn replies(&self) -> Vec<(String, Vec<ReplyMessage>)> {
        lock(&self.replies)
    }

    pub fn pushes(&self) -> Vec<(String, Vec<ReplyMessage>)> {
        lock(&self.pushes)
    }

    pub fn loading(&self) -> Vec<String> {
        lock(&self.loading)
    }
}

#[async_trait]
impl MessagingTransport for RecordingTransport {
    async fn reply(&self, reply_token: &str, messages: &[ReplyMessage]) -> Result<(), Error> {
        if self.fail_reply {
            return Err(Error::Platform("reply token expired".into()));
        }
        for m in messages {
            m.validate()?;
        }
        if let Ok(mut r) = self.replies.lock() {
            r.push((reply_token.to_string(), messages.to_vec()));
        }
        Ok(())
    }

    async fn push(&self, user_id: &str, messages: &[ReplyMessage]) -> Result<(), Error> {
        if self.fail_push {
            return Err(Error::Platform("push rejected".into()));
        }
        if let Ok(mut p) = self.pushes.lock() {
            p.push((user_id.to_string(), messages.to_vec()));
        }
        Ok(())
    }

    async fn start_loading(&self, user_id: &str, _seconds: u32) -> Result<(), Error> {
        if let Ok(mut l) = self.loading.lock() {
            l.push(user_id.to_string());
        }
        Ok(())
    }

    async fn fetch_media(&self, _message_id: &str) -> Result<Vec<u8>, Error> {
        Ok(vec![0xFF, 0xD8, 0xFF])
    }
}

/// Geometry-bearing candidate for building fixtures.
pub fn candidate(id: &str, name: &str, lat: f64, lng: f64, rating: f64, count: u32) -> PlaceCandidate {
    PlaceCandidate {
        place_id: id.to_string(),
        name: name.to_string(),
        address: Some(format!("{} address", name)),
        location: Some(LatLng { lat, lng }),
        photo_ref: Some(format!("photo-{}", id)),
        rating: Some(rating),
        rating_count: Some(count),
    }
}

/// Every fake, typed concretely so tests can inspect them after the run.
pub struct FakeWorld {
    pub completion: Arc<FakeCompletion>,
    pub history: Arc<InMemoryChatHistory>,
    pub translator: Arc<FakeTranslation>,
    pub places: Arc<FakePlaces>,
    pub search: Arc<FakeSearch>,
    pub vision: Arc<FakeVision>,
    pub transport: Arc<RecordingTransport>,
    pub diagnostics: Arc<RecordingDiagnostics>,
}

impl FakeWorld {
    pub fn new(completion: FakeCompletion, places: FakePlaces) -> Self {
        Self {
            completion: Arc::new(completion),
            history: Arc::new(InMemoryChatHistory::default()),
            translator: Arc::new(FakeTranslation::default()),
            places: Arc::new(places),
            search: Arc::new(FakeSearch::default()),
            vision: Arc::new(FakeVision::default()),
            transport: Arc::new(RecordingTransport::new()),
            diagnostics: Arc::new(RecordingDiagnostics::new()),
        }
    }

    pub fn collaborators(&self) -> Collaborators {
        Collaborators {
            completion: self.completion.clone(),
            history: self.history.clone(),
            translator: self.translator.clone(),
            places: self.places.clone(),
            search: self.search.clone(),
            vision: self.vision.clone(),
            transport: self.transport.clone(),
            diagnostics: self.diagnostics.clone(),
        }
    }
}
