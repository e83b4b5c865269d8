// File: tripbot-core/src/platforms/google/search.rs

use async_trait::async_trait;
use reqwest::Client as ReqwestClient;
use serde::Deserialize;
use tracing::debug;

use tripbot_common::models::SearchResult;
use tripbot_common::traits::WebSearchApi;
use crate::Error;
use crate::platforms::read_json;

pub const CUSTOM_SEARCH_URL: &str = "https://www.googleapis.com/customsearch/v1";

#[derive(Debug, Deserialize)]
pub struct CustomSearchResponse {
    /// Absent when the query has no hits.
    #[serde(default)]
    pub items: Vec<CustomSearchItem>,
}

#[derive(Debug, Deserialize)]
pub struct CustomSearchItem {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub link: String,
    #[serde(default)]
    pub snippet: String,
}

/// Google Programmable Search (Custom Search JSON API) client.
pub struct GoogleCustomSearchClient {
    http: ReqwestClient,
    api_key: String,
    engine_id: String,
    endpoint: String,
}

impl GoogleCustomSearchClient {
    pub fn new(http: ReqwestClient, api_key: &str, engine_id: &str) -> Self {
        Self {
            http,
            api_key: api_key.to_string(),
            engine_id: engine_id.to_string(),
            endpoint: CUSTOM_SEARCH_URL.to_string(),
        }
    }

    pub fn with_endpoint(mut self, endpoint: &str) -> Self {
        self.endpoint = endpoint.to_string();
        self
    }
}

#[async_trait]
impl WebSearchApi for GoogleCustomSearchClient {
    async fn query(
        &self,
        q: &str,
        result_count: u8,
        lang: &str,
        country: &str,
    ) -> Result<Vec<SearchResult>, Error> {
        // The API accepts 1..=10 results per page.
        let num = result_count.clamp(1, 10).to_string();
        let lr = format!("lang_{}", lang);

        let response = self
            .http
            .get(&self.endpoint)
            .query(&[
                ("key", self.api_key.as_str()),
                ("cx", self.engine_id.as_str()),
                ("q", q),
                ("num", num.as_str()),
                ("lr", lr.as_str()),
                ("gl", country),
            ])
            .send()
            .await
            .map_err(|e| Error::Platform(format!("custom search network error: {}", e)))?;

        let body: CustomSearchResponse = read_json(response, "custom search").await?;
        debug!("custom search '{}' returned {} items", q, body.items.len());

        Ok(body
            .items
            .into_iter()
            .map(|item| SearchResult {
                title: item.title,
                link: item.link,
                snippet: item.snippet,
            })
            .collect())
    }
}
