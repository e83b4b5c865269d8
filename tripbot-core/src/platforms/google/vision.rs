// File: tripbot-core/src/platforms/google/vision.rs

use async_trait::async_trait;
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use reqwest::Client as ReqwestClient;
use serde::Deserialize;
use serde_json::json;

use tripbot_common::models::{ImageAnnotation, ImageLabel, LatLng, Landmark};
use tripbot_common::traits::VisionService;
use crate::Error;
use crate::platforms::read_json;

pub const VISION_ANNOTATE_URL: &str = "https://vision.googleapis.com/v1/images:annotate";

#[derive(Debug, Deserialize)]
pub struct AnnotateResponse {
    #[serde(default)]
    pub responses: Vec<AnnotateResult>,
}

#[derive(Debug, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct AnnotateResult {
    #[serde(default)]
    pub label_annotations: Vec<EntityAnnotation>,
    #[serde(default)]
    pub landmark_annotations: Vec<EntityAnnotation>,
    pub error: Option<AnnotateError>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EntityAnnotation {
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub score: f32,
    #[serde(default)]
    pub locations: Vec<LocationInfo>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LocationInfo {
    pub lat_lng: Option<VisionLatLng>,
}

#[derive(Debug, Deserialize)]
pub struct VisionLatLng {
    #[serde(default)]
    pub latitude: f64,
    #[serde(default)]
    pub longitude: f64,
}

#[derive(Debug, Deserialize)]
pub struct AnnotateError {
    pub message: String,
}

impl AnnotateResult {
    fn into_annotation(self) -> Result<ImageAnnotation, Error> {
        if let Some(err) = self.error {
            return Err(Error::Platform(format!("vision annotate error: {}", err.message)));
        }
        Ok(ImageAnnotation {
            labels: self
                .label_annotations
                .into_iter()
                .map(|l| ImageLabel { description: l.description, score: l.score })
                .collect(),
            landmarks: self
                .landmark_annotations
                .into_iter()
                .map(|l| Landmark {
                    location: l
                        .locations
                        .iter()
                        .find_map(|loc| loc.lat_lng.as_ref())
                        .map(|ll| LatLng { lat: ll.latitude, lng: ll.longitude }),
                    description: l.description,
                    score: l.score,
                })
                .collect(),
        })
    }
}

/// Google Cloud Vision client, label + landmark detection only.
pub struct GoogleVisionClient {
    http: ReqwestClient,
    api_key: String,
    endpoint: String,
}

impl GoogleVisionClient {
    pub fn new(http: ReqwestClient, api_key: &str) -> Self {
        Self {
            http,
            api_key: api_key.to_string(),
            endpoint: VISION_ANNOTATE_URL.to_string(),
        }
    }
}

#[async_trait]
impl VisionService for GoogleVisionClient {
    async fn annotate(&self, image: &[u8]) -> Result<ImageAnnotation, Error> {
        let payload = json!({
            "requests": [{
                "image": { "content": STANDARD.encode(image) },
                "features": [
                    { "type": "LABEL_DETECTION", "maxResults": 5 },
                    { "type": "LANDMARK_DETECTION", "maxResults": 3 }
                ]
            }]
        });

        let response = self
            .http
            .post(&self.endpoint)
            .query(&[("key", self.api_key.as_str())])
            .json(&payload)
            .send()
            .await
            .map_err(|e| Error::Platform(format!("vision network error: {}", e)))?;

        let body: AnnotateResponse = read_json(response, "vision annotate").await?;
        body.responses
            .into_iter()
            .next()
            .unwrap_or_default()
            .into_annotation()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn landmark_location_is_extracted() {
        let body: AnnotateResponse = serde_json::from_value(serde_json::json!({
            "responses": [{
                "labelAnnotations": [{ "description": "Temple", "score": 0.93 }],
                "landmarkAnnotations": [{
                    "description": "Wat Phra That Doi Suthep",
                    "score": 0.81,
                    "locations": [{ "latLng": { "latitude": 18.8048, "longitude": 98.9216 } }]
                }]
            }]
        }))
        .unwrap();

        let annotation = body.responses.into_iter().next().unwrap().into_annotation().unwrap();
        assert_eq!(annotation.labels[0].description, "Temple");
        let landmark = &annotation.landmarks[0];
        assert_eq!(landmark.description, "Wat Phra That Doi Suthep");
        assert!((landmark.location.unwrap().lat - 18.8048).abs() < 1e-9);
    }

    #[test]
    fn per_image_error_is_surfaced() {
        let result = AnnotateResult {
            error: Some(AnnotateError { message: "Bad image data".into() }),
            ..Default::default()
        };
        assert!(result.into_annotation().is_err());
    }
}
