// File: tripbot-common/src/models/place.rs

use std::cmp::Ordering;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LatLng {
    pub lat: f64,
    pub lng: f64,
}

/// A raw entry from a text or nearby search. Coordinates may be missing.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct PlaceCandidate {
    pub place_id: String,
    pub name: String,
    pub address: Option<String>,
    pub location: Option<LatLng>,
    pub photo_ref: Option<String>,
    pub rating: Option<f64>,
    pub rating_count: Option<u32>,
}

/// Normalized projection of a resolved place. Always carries coordinates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlaceRecord {
    pub place_id: String,
    pub name: String,
    pub address: String,
    pub latitude: f64,
    pub longitude: f64,
    pub photo_ref: Option<String>,
    pub rating: f64,
    pub rating_count: u32,
    pub opening_hours: Option<Vec<String>>,
    pub website: Option<String>,
}

impl PlaceRecord {
    /// Returns `None` for candidates without geometry.
    pub fn from_candidate(candidate: PlaceCandidate) -> Option<Self> {
        let location = candidate.location?;
        Some(Self {
            place_id: candidate.place_id,
            name: candidate.name,
            address: candidate.address.unwrap_or_default(),
            latitude: location.lat,
            longitude: location.lng,
            photo_ref: candidate.photo_ref,
            rating: candidate.rating.unwrap_or(0.0),
            rating_count: candidate.rating_count.unwrap_or(0),
            opening_hours: None,
            website: None,
        })
    }
}

/// Body of a place-details lookup.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct PlaceDetails {
    pub place_id: String,
    pub name: String,
    pub address: Option<String>,
    pub location: Option<LatLng>,
    pub photo_ref: Option<String>,
    pub rating: Option<f64>,
    pub rating_count: Option<u32>,
    pub opening_hours: Vec<String>,
    pub website: Option<String>,
    pub url: Option<String>,
    pub phone: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtendedPlaceRecord {
    pub place: PlaceRecord,
    pub opening_hours: Vec<String>,
    pub website: Option<String>,
    pub canonical_url: Option<String>,
    pub phone: Option<String>,
}

impl ExtendedPlaceRecord {
    pub fn from_details(details: PlaceDetails) -> Option<Self> {
        let PlaceDetails {
            place_id,
            name,
            address,
            location,
            photo_ref,
            rating,
            rating_count,
            opening_hours,
            website,
            url,
            phone,
        } = details;

        let mut place = PlaceRecord::from_candidate(PlaceCandidate {
            place_id,
            name,
            address,
            location,
            photo_ref,
            rating,
            rating_count,
        })?;
        place.opening_hours = (!opening_hours.is_empty()).then(|| opening_hours.clone());
        place.website = website.clone();

        Some(Self {
            place,
            opening_hours,
            website,
            canonical_url: url,
            phone,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HotelRecord {
    pub place_id: String,
    pub name: String,
    pub address: String,
    pub latitude: f64,
    pub longitude: f64,
    pub photo_ref: Option<String>,
    pub rating: f64,
    pub rating_count: u32,
}

impl From<PlaceRecord> for HotelRecord {
    fn from(p: PlaceRecord) -> Self {
        Self {
            place_id: p.place_id,
            name: p.name,
            address: p.address,
            latitude: p.latitude,
            longitude: p.longitude,
            photo_ref: p.photo_ref,
            rating: p.rating,
            rating_count: p.rating_count,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchResult {
    pub title: String,
    pub link: String,
    pub snippet: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchContext {
    Travel,
    Hotel,
}

/// Orders by rating then rating count, both descending. Missing values count as zero.
pub fn compare_by_rating(a: &PlaceCandidate, b: &PlaceCandidate) -> Ordering {
    let ra = a.rating.unwrap_or(0.0);
    let rb = b.rating.unwrap_or(0.0);
    rb.partial_cmp(&ra)
        .unwrap_or(Ordering::Equal)
        .then_with(|| b.rating_count.unwrap_or(0).cmp(&a.rating_count.unwrap_or(0)))
}

/// Drops candidates lacking coordinates and sorts the rest best-first.
pub fn rank_candidates(candidates: Vec<PlaceCandidate>) -> Vec<PlaceCandidate> {
    let mut kept: Vec<PlaceCandidate> = candidates
        .into_iter()
        .filter(|c| c.location.is_some())
        .collect();
    kept.sort_by(compare_by_rating);
    kept
}
