// File: src/services/hotel_finder.rs

use std::sync::Arc;
use tracing::{debug, info};

use tripbot_common::models::{rank_candidates, HotelRecord, LatLng, PlaceRecord};
use tripbot_common::traits::{Diagnostics, PlacesApi};
use crate::Error;
use super::place_resolver::PlaceResolver;

/// Tried in order when the requested destination cannot be resolved.
pub const DEFAULT_CITIES: [&str; 2] = ["เชียงใหม่", "เชียงราย"];

/// Chiang Mai old city. Last resort anchor.
pub const FALLBACK_ANCHOR: LatLng = LatLng { lat: 18.7883, lng: 98.9853 };

pub const LODGING_RADIUS_M: u32 = 20_000;
pub const LODGING_TYPE: &str = "lodging";
pub const MAX_HOTELS: usize = 3;

pub struct HotelFinder {
    resolver: Arc<PlaceResolver>,
    places: Arc<dyn PlacesApi>,
    diagnostics: Arc<dyn Diagnostics>,
}

impl HotelFinder {
    pub fn new(
        resolver: Arc<PlaceResolver>,
        places: Arc<dyn PlacesApi>,
        diagnostics: Arc<dyn Diagnostics>,
    ) -> Self {
        Self { resolver, places, diagnostics }
    }

    /// Coordinates to search around: the destination, then each default
    /// city, then [`FALLBACK_ANCHOR`]. A failed lookup just moves down the chain.
    pub async fn anchor(&self, destination: &str) -> LatLng {
        let attempts = std::iter::once(destination).chain(DEFAULT_CITIES.iter().copied());
        for name in attempts {
            match self.resolver.resolve_attraction(name).await {
                Ok(Some(place)) => {
                    debug!("hotel anchor '{}' => {}", name, place.name);
                    return anchor_of(&place);
                }
                Ok(None) => {
                    self.diagnostics.degraded("hotel_anchor", &format!("'{}' not found", name));
                }
                Err(e) => self.diagnostics.remote_failure("hotel_anchor", &e),
            }
        }
        info!("no anchor resolved for '{}', using fixed coordinates", destination);
        FALLBACK_ANCHOR
    }

    /// Up to three located hotels near `destination`, best rated first.
    pub async fn find_hotels(&self, destination: &str) -> Result<Vec<HotelRecord>, Error> {
        let anchor = self.anchor(destination).await;
        let candidates = self
            .places
            .nearby(anchor.lat, anchor.lng, LODGING_RADIUS_M, LODGING_TYPE)
            .await?;

        Ok(rank_candidates(candidates)
            .into_iter()
            .filter_map(PlaceRecord::from_candidate)
            .map(HotelRecord::from)
            .take(MAX_HOTELS)
            .collect())
    }
}

fn anchor_of(place: &PlaceRecord) -> LatLng {
    LatLng { lat: place.latitude, lng: place.longitude }
}
