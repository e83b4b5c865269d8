// ========================================================
// File: tripbot-core/src/platforms/google/places.rs
// ========================================================
use async_trait::async_trait;
use reqwest::Client as ReqwestClient;
use serde::Deserialize;
use tracing::{debug, warn};

use tripbot_common::models::{LatLng, PlaceCandidate, PlaceDetails};
use tripbot_common::traits::PlacesApi;
use crate::Error;
use crate::platforms::read_json;

pub const PLACES_API_BASE: &str = "https://maps.googleapis.com/maps/api/place";

/// Photo endpoint URL for a photo reference. Embeds the API key.
pub fn photo_url(api_key: &str, photo_ref: &str, max_width: u32) -> String {
    format!(
        "{}/photo?maxwidth={}&photo_reference={}&key={}",
        PLACES_API_BASE,
        max_width,
        urlencoding::encode(photo_ref),
        urlencoding::encode(api_key)
    )
}

/// Response envelope shared by text search and nearby search.
#[derive(Debug, Deserialize)]
pub struct SearchResponse {
    pub status: String,
    #[serde(default)]
    pub results: Vec<RawPlace>,
    pub error_message: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct DetailsResponse {
    pub status: String,
    pub result: Option<RawPlace>,
    pub error_message: Option<String>,
}

/// One place as the Places API returns it.
#[derive(Debug, Deserialize, Default)]
pub struct RawPlace {
    #[serde(default)]
    pub place_id: String,
    #[serde(default)]
    pub name: String,
    pub formatted_address: Option<String>,
    /// Nearby search returns this instead of `formatted_address`.
    pub vicinity: Option<String>,
    pub geometry: Option<RawGeometry>,
    #[serde(default)]
    pub photos: Vec<RawPhoto>,
    pub rating: Option<f64>,
    pub user_ratings_total: Option<u32>,
    pub opening_hours: Option<RawOpeningHours>,
    pub website: Option<String>,
    pub url: Option<String>,
    pub formatted_phone_number: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct RawGeometry {
    pub location: Option<RawLocation>,
}

#[derive(Debug, Deserialize)]
pub struct RawLocation {
    pub lat: f64,
    pub lng: f64,
}

#[derive(Debug, Deserialize)]
pub struct RawPhoto {
    pub photo_reference: String,
}

#[derive(Debug, Deserialize)]
pub struct RawOpeningHours {
    #[serde(default)]
    pub weekday_text: Vec<String>,
}

impl RawPlace {
    fn location(&self) -> Option<LatLng> {
        self.geometry
            .as_ref()
            .and_then(|g| g.location.as_ref())
            .map(|l| LatLng { lat: l.lat, lng: l.lng })
    }

    fn address(&self) -> Option<String> {
        self.formatted_address.clone().or_else(|| self.vicinity.clone())
    }

    fn photo_ref(&self) -> Option<String> {
        self.photos.first().map(|p| p.photo_reference.clone())
    }
}

impl From<RawPlace> for PlaceCandidate {
    fn from(raw: RawPlace) -> Self {
        PlaceCandidate {
            location: raw.location(),
            address: raw.address(),
            photo_ref: raw.photo_ref(),
            place_id: raw.place_id,
            name: raw.name,
            rating: raw.rating,
            rating_count: raw.user_ratings_total,
        }
    }
}

impl From<RawPlace> for PlaceDetails {
    fn from(raw: RawPlace) -> Self {
        PlaceDetails {
            location: raw.location(),
            address: raw.address(),
            photo_ref: raw.photo_ref(),
            opening_hours: raw.opening_hours.map(|h| h.weekday_text).unwrap_or_default(),
            place_id: raw.place_id,
            name: raw.name,
            rating: raw.rating,
            rating_count: raw.user_ratings_total,
            website: raw.website,
            url: raw.url,
            phone: raw.formatted_phone_number,
        }
    }
}

/// `OK` and `ZERO_RESULTS` are successes; everything else is a platform error.
fn check_status(status: &str, error_message: Option<&str>, context: &str) -> Result<(), Error> {
    match status {
        "OK" | "ZERO_RESULTS" => Ok(()),
        other => Err(Error::Platform(format!(
            "{}: status {} ({})",
            context,
            other,
            error_message.unwrap_or("no message")
        ))),
    }
}

/// Client for the Places text-search, details and nearby-search endpoints.
pub struct GooglePlacesClient {
    http: ReqwestClient,
    api_key: String,
    api_base: String,
    language: String,
}

impl GooglePlacesClient {
    pub fn new(http: ReqwestClient, api_key: &str) -> Self {
        Self {
            http,
            api_key: api_key.to_string(),
            api_base: PLACES_API_BASE.to_string(),
            language: "th".to_string(),
        }
    }

    pub fn with_api_base(mut self, api_base: &str) -> Self {
        self.api_base = api_base.trim_end_matches('/').to_string();
        self
    }

    async fn search(&self, endpoint: &str, params: &[(&str, String)]) -> Result<Vec<PlaceCandidate>, Error> {
        let url = format!("{}/{}/json", self.api_base, endpoint);
        let response = self
            .http
            .get(&url)
            .query(params)
            .query(&[("language", self.language.as_str()), ("key", self.api_key.as_str())])
            .send()
            .await
            .map_err(|e| Error::Platform(format!("places {} network error: {}", endpoint, e)))?;

        let body: SearchResponse = read_json(response, endpoint).await?;
        check_status(&body.status, body.error_message.as_deref(), endpoint)?;
        debug!("places {} returned {} results", endpoint, body.results.len());

        Ok(body.results.into_iter().map(PlaceCandidate::from).collect())
    }
}

#[async_trait]
impl PlacesApi for GooglePlacesClient {
    async fn text_search(&self, query: &str, place_type: &str) -> Result<Vec<PlaceCandidate>, Error> {
        self.search(
            "textsearch",
            &[("query", query.to_string()), ("type", place_type.to_string())],
        )
        .await
    }

    async fn details(&self, place_id: &str) -> Result<Option<PlaceDetails>, Error> {
        let url = format!("{}/details/json", self.api_base);
        let response = self
            .http
            .get(&url)
            .query(&[
                ("place_id", place_id),
                (
                    "fields",
                    "place_id,name,formatted_address,geometry,rating,user_ratings_total,opening_hours,website,url,formatted_phone_number,photos",
                ),
                ("language", self.language.as_str()),
                ("key", self.api_key.as_str()),
            ])
            .send()
            .await
            .map_err(|e| Error::Platform(format!("places details network error: {}", e)))?;

        let body: DetailsResponse = read_json(response, "details").await?;
        if body.status == "NOT_FOUND" {
            warn!("place {} not found", place_id);
            return Ok(None);
        }
        check_status(&body.status, body.error_message.as_deref(), "details")?;
        Ok(body.result.map(PlaceDetails::from))
    }

    async fn nearby(
        &self,
        lat: f64,
        lng: f64,
        radius_m: u32,
        place_type: &str,
    ) -> Result<Vec<PlaceCandidate>, Error> {
        self.search(
            "nearbysearch",
            &[
                ("location", format!("{},{}", lat, lng)),
                ("radius", radius_m.to_string()),
                ("type", place_type.to_string()),
            ],
        )
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nearby_result_uses_vicinity_and_first_photo() {
        let body: SearchResponse = serde_json::from_value(serde_json::json!({
            "status": "OK",
            "results": [{
                "place_id": "p1",
                "name": "Riverside Lodge",
                "vicinity": "Chang Klan Rd",
                "geometry": { "location": { "lat": 18.78, "lng": 99.0 } },
                "photos": [{ "photo_reference": "ref-a" }, { "photo_reference": "ref-b" }],
                "rating": 4.4
            }, {
                "place_id": "p2",
                "name": "No Geometry Inn"
            }]
        }))
        .unwrap();

        let candidates: Vec<PlaceCandidate> = body.results.into_iter().map(Into::into).collect();
        assert_eq!(candidates[0].address.as_deref(), Some("Chang Klan Rd"));
        assert_eq!(candidates[0].photo_ref.as_deref(), Some("ref-a"));
        assert_eq!(candidates[0].rating_count, None);
        assert!(candidates[1].location.is_none());
    }

    #[test]
    fn denied_status_is_an_error() {
        assert!(check_status("ZERO_RESULTS", None, "textsearch").is_ok());
        let err = check_status("REQUEST_DENIED", Some("bad key"), "textsearch").unwrap_err();
        assert!(err.to_string().contains("bad key"));
    }

    #[test]
    fn photo_url_escapes_reference() {
        let url = photo_url("k", "a/b", 800);
        assert!(url.contains("photo_reference=a%2Fb"));
        assert!(url.starts_with("https://"));
    }
}
