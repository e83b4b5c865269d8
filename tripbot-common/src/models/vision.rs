// File: tripbot-common/src/models/vision.rs

use serde::{Deserialize, Serialize};
use crate::models::place::LatLng;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImageLabel {
    pub description: String,
    pub score: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Landmark {
    pub description: String,
    pub score: f32,
    pub location: Option<LatLng>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ImageAnnotation {
    pub labels: Vec<ImageLabel>,
    pub landmarks: Vec<Landmark>,
}
