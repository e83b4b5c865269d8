// File: src/services/place_resolver.rs

use std::sync::Arc;
use tracing::debug;

use tripbot_common::models::{rank_candidates, ExtendedPlaceRecord, PlaceRecord};
use tripbot_common::traits::PlacesApi;
use crate::Error;
use super::region::{matching_province, REGION_NAME};

pub const DEFAULT_CATEGORY: &str = "tourist_attraction";

/// Appended to names that are not a province, so the search stays in the north.
pub const REGION_QUALIFIER: &str = "ประเทศไทย";

/// Turns free-text place names into coordinates plus metadata.
pub struct PlaceResolver {
    places: Arc<dyn PlacesApi>,
}

impl PlaceResolver {
    pub fn new(places: Arc<dyn PlacesApi>) -> Self {
        Self { places }
    }

    /// Trims, strips bold markup and drops anything after the first colon.
    pub fn clean_name(raw: &str) -> String {
        raw.replace("**", "")
            .split(':')
            .next()
            .unwrap_or_default()
            .trim()
            .to_string()
    }

    /// Provinces (and the region itself) are searched verbatim; anything else
    /// gets the region appended.
    pub fn search_query(name: &str) -> String {
        if matching_province(name).is_some() || name.contains(REGION_NAME) {
            name.to_string()
        } else {
            format!("{} {} {}", name, REGION_NAME, REGION_QUALIFIER)
        }
    }

    /// Best-rated geometry-bearing match for `name`, or `None`.
    pub async fn resolve(&self, name: &str, category: &str) -> Result<Option<PlaceRecord>, Error> {
        let cleaned = Self::clean_name(name);
        if cleaned.is_empty() {
            return Ok(None);
        }

        let query = Self::search_query(&cleaned);
        let candidates = self.places.text_search(&query, category).await?;
        let total = candidates.len();
        let best = rank_candidates(candidates)
            .into_iter()
            .next()
            .and_then(PlaceRecord::from_candidate);

        debug!(
            "resolve '{}' => {} candidate(s), picked {:?}",
            query,
            total,
            best.as_ref().map(|p| p.name.as_str())
        );
        Ok(best)
    }

    pub async fn resolve_attraction(&self, name: &str) -> Result<Option<PlaceRecord>, Error> {
        self.resolve(name, DEFAULT_CATEGORY).await
    }

    /// Opening hours, website and canonical url on top of the basic record.
    pub async fn details(&self, place_id: &str) -> Result<Option<ExtendedPlaceRecord>, Error> {
        Ok(self
            .places
            .details(place_id)
            .await?
            .and_then(ExtendedPlaceRecord::from_details))
    }
}
