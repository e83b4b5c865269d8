// File: src/services/search_enricher.rs

use std::sync::Arc;
use tracing::debug;

use tripbot_common::models::{SearchContext, SearchResult};
use tripbot_common::traits::WebSearchApi;
use crate::Error;
use super::region::REGION_NAME;

pub const RESULT_COUNT: u8 = 3;
pub const SEARCH_LANG: &str = "th";
pub const SEARCH_COUNTRY: &str = "th";

/// Hotel results must mention one of these.
pub const HOTEL_KEYWORDS: [&str; 2] = ["โรงแรม", "hotel"];

/// Web search filtered down to results that actually mention the place.
pub struct SearchEnricher {
    search: Arc<dyn WebSearchApi>,
}

impl SearchEnricher {
    pub fn new(search: Arc<dyn WebSearchApi>) -> Self {
        Self { search }
    }

    pub fn build_query(place_name: &str, context: SearchContext) -> String {
        match context {
            SearchContext::Travel => format!("{} ท่องเที่ยว {}", place_name, REGION_NAME),
            SearchContext::Hotel => format!("โรงแรม ที่พัก ใกล้ {}", place_name),
        }
    }

    pub fn is_relevant(result: &SearchResult, place_name: &str, context: SearchContext) -> bool {
        let haystack = format!("{} {}", result.title, result.snippet).to_lowercase();
        if !haystack.contains(&place_name.to_lowercase()) {
            return false;
        }
        match context {
            SearchContext::Travel => true,
            SearchContext::Hotel => HOTEL_KEYWORDS.iter().any(|k| haystack.contains(k)),
        }
    }

    pub async fn search(&self, place_name: &str, context: SearchContext) -> Result<Vec<SearchResult>, Error> {
        let place_name = place_name.trim();
        if place_name.is_empty() {
            return Ok(Vec::new());
        }

        let query = Self::build_query(place_name, context);
        let results = self
            .search
            .query(&query, RESULT_COUNT, SEARCH_LANG, SEARCH_COUNTRY)
            .await?;
        let total = results.len();

        let kept: Vec<SearchResult> = results
            .into_iter()
            .filter(|r| Self::is_relevant(r, place_name, context))
            .take(RESULT_COUNT as usize)
            .collect();
        debug!("search '{}': kept {}/{}", query, kept.len(), total);
        Ok(kept)
    }
}
